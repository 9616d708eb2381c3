//! Tree to HTML serialization.

use crate::hast::{Element, Node};

/// Elements written without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Serialize a tree to an HTML string
pub fn to_html(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Root(children) => {
            for child in children {
                write_node(child, out);
            }
        }
        Node::Element(element) => write_element(element, out),
        Node::Text(text) => escape_into(text, false, out),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::Raw(html) => out.push_str(html),
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag_name);
    if let Some(properties) = &element.properties {
        for (name, value) in properties {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_into(value, true, out);
            out.push('"');
        }
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&element.tag_name.as_str()) {
        return;
    }

    for child in &element.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&element.tag_name);
    out.push('>');
}

/// HTML-escape text; attribute values also get `"` escaped
fn escape_into(s: &str, attribute: bool, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_image_html() {
        let tree = Node::root(vec![Node::element(
            Element::new("a")
                .with_attr("href", "/x.png")
                .with_attr("target", "_blank")
                .with_attr("rel", "noopener noreferrer")
                .with_children(vec![Node::element(
                    Element::new("img").with_attr("src", "/x.png").with_attr("alt", ""),
                )]),
        )]);

        assert_eq!(
            to_html(&tree),
            r#"<a href="/x.png" target="_blank" rel="noopener noreferrer"><img src="/x.png" alt=""></a>"#
        );
    }

    #[test]
    fn test_escapes_text_and_attributes() {
        let tree = Node::element(
            Element::new("p")
                .with_attr("title", "say \"hi\" & <go>")
                .with_children(vec![Node::text("1 < 2 && \"quoted\"")]),
        );
        assert_eq!(
            to_html(&tree),
            "<p title=\"say &quot;hi&quot; &amp; &lt;go&gt;\">1 &lt; 2 &amp;&amp; \"quoted\"</p>"
        );
    }

    #[test]
    fn test_raw_and_comments_verbatim() {
        let tree = Node::root(vec![
            Node::Comment(" note ".to_string()),
            Node::Raw("<span class=\"x\">&nbsp;</span>".to_string()),
        ]);
        assert_eq!(
            to_html(&tree),
            "<!-- note --><span class=\"x\">&nbsp;</span>"
        );
    }

    #[test]
    fn test_void_and_empty_elements() {
        let tree = Node::root(vec![
            Node::element(Element::new("br")),
            Node::element(Element::new("div")),
        ]);
        assert_eq!(to_html(&tree), "<br><div></div>");
    }
}
