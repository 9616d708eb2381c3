//! Markdown to tree conversion using pulldown-cmark.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::hast::{Element, Node};

/// Options for markdown conversion
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub task_lists: bool,
    /// `# Heading {#custom-id .class}`
    pub heading_attributes: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: true,
        }
    }
}

impl MarkdownOptions {
    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        opts
    }
}

/// Convert markdown source into a `Node::Root`
pub fn markdown_to_tree(markdown: &str, options: &MarkdownOptions) -> Node {
    let parser = Parser::new_ext(markdown, options.to_pulldown_options());
    let mut converter = Converter::new();
    for event in parser {
        converter.handle_event(event);
    }
    converter.finish()
}

/// An open element, or `None` for containers that produce no element of
/// their own (HTML blocks, metadata blocks)
type Frame = Option<Element>;

struct Converter {
    stack: Vec<Frame>,
    root_children: Vec<Node>,
    in_table_head: bool,
}

impl Converter {
    fn new() -> Self {
        Self {
            stack: Vec::new(),
            root_children: Vec::new(),
            in_table_head: false,
        }
    }

    fn finish(mut self) -> Node {
        // Unbalanced input can't come out of pulldown-cmark, but close
        // anything left open rather than dropping it.
        while !self.stack.is_empty() {
            self.close();
        }
        Node::Root(self.root_children)
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.add_text(&text),
            Event::Code(code) => self.add_element(
                Element::new("code").with_children(vec![Node::text(code.to_string())]),
            ),
            Event::InlineMath(math) => self.add_element(
                Element::new("code")
                    .with_attr("class", "math-inline")
                    .with_children(vec![Node::text(math.to_string())]),
            ),
            Event::DisplayMath(math) => self.add_element(
                Element::new("code")
                    .with_attr("class", "math-display")
                    .with_children(vec![Node::text(math.to_string())]),
            ),
            Event::Html(html) | Event::InlineHtml(html) => {
                self.add_node(Node::Raw(html.to_string()))
            }
            Event::FootnoteReference(name) => {
                let link = Element::new("a")
                    .with_attr("href", format!("#fn-{}", &*name))
                    .with_attr("id", format!("fnref-{}", &*name))
                    .with_children(vec![Node::text(name.to_string())]);
                self.add_element(Element::new("sup").with_children(vec![Node::Element(link)]));
            }
            Event::SoftBreak => self.add_text("\n"),
            Event::HardBreak => self.add_element(Element::new("br")),
            Event::Rule => self.add_element(Element::new("hr")),
            Event::TaskListMarker(checked) => {
                let mut input = Element::new("input")
                    .with_attr("type", "checkbox")
                    .with_attr("disabled", "");
                if checked {
                    input.set("checked", "");
                }
                self.add_element(input);
            }
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::TableHead => {
                self.in_table_head = true;
                self.open(Element::new("thead"));
                self.open(Element::new("tr"));
            }
            Tag::TableRow => {
                if self.top_is("table") {
                    self.open(Element::new("tbody"));
                }
                self.open(Element::new("tr"));
            }
            Tag::TableCell => {
                let cell = if self.in_table_head { "th" } else { "td" };
                self.open(Element::new(cell));
            }
            Tag::CodeBlock(kind) => {
                self.open(Element::new("pre"));
                let mut code = Element::new("code");
                if let CodeBlockKind::Fenced(info) = kind
                    && let Some(lang) = info.split_whitespace().next()
                {
                    code.set("class", format!("language-{}", lang));
                }
                self.open(code);
            }
            Tag::HtmlBlock | Tag::MetadataBlock(_) => self.stack.push(None),
            other => self.open(element_for(other)),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::TableHead => {
                self.close(); // tr
                self.close(); // thead
                self.in_table_head = false;
            }
            TagEnd::Table => {
                if self.top_is("tbody") {
                    self.close();
                }
                self.close();
            }
            TagEnd::CodeBlock => {
                self.close(); // code
                self.close(); // pre
            }
            TagEnd::Image => {
                if let Some(Some(mut img)) = self.stack.pop() {
                    // Inline content of an image is its alt text
                    let alt = img.text_content();
                    img.children.clear();
                    img.set("alt", alt);
                    self.add_element(img);
                }
            }
            _ => self.close(),
        }
    }

    fn top_is(&self, tag_name: &str) -> bool {
        matches!(self.stack.last(), Some(Some(e)) if e.is(tag_name))
    }

    fn open(&mut self, element: Element) {
        self.stack.push(Some(element));
    }

    fn close(&mut self) {
        if let Some(Some(element)) = self.stack.pop() {
            self.add_element(element);
        }
    }

    fn add_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.add_node(Node::text(text));
    }

    fn add_element(&mut self, element: Element) {
        self.add_node(Node::Element(element));
    }

    /// Append to the innermost open element
    fn add_node(&mut self, node: Node) {
        match self.stack.iter_mut().rev().find_map(Option::as_mut) {
            Some(parent) => parent.children.push(node),
            None => self.root_children.push(node),
        }
    }
}

/// Element for a start tag that maps one-to-one onto an element
fn element_for(tag: Tag) -> Element {
    match tag {
        Tag::Paragraph => Element::new("p"),
        Tag::Heading {
            level,
            id,
            classes,
            attrs,
        } => {
            let mut heading = Element::new(heading_tag(level));
            if let Some(id) = id {
                heading.set("id", id.to_string());
            }
            if !classes.is_empty() {
                let classes: Vec<&str> = classes.iter().map(|c| &**c).collect();
                heading.set("class", classes.join(" "));
            }
            for (name, value) in attrs {
                heading.set(name.to_string(), value.as_deref().unwrap_or(""));
            }
            heading
        }
        Tag::BlockQuote(_) => Element::new("blockquote"),
        Tag::List(Some(start)) => {
            let mut list = Element::new("ol");
            if start != 1 {
                list.set("start", start.to_string());
            }
            list
        }
        Tag::List(None) => Element::new("ul"),
        Tag::Item => Element::new("li"),
        Tag::FootnoteDefinition(name) => Element::new("div")
            .with_attr("class", "footnote-definition")
            .with_attr("id", format!("fn-{}", &*name)),
        Tag::Table(_) => Element::new("table"),
        Tag::Emphasis => Element::new("em"),
        Tag::Strong => Element::new("strong"),
        Tag::Strikethrough => Element::new("del"),
        Tag::Link {
            dest_url, title, ..
        } => {
            let mut link = Element::new("a").with_attr("href", dest_url.to_string());
            if !title.is_empty() {
                link.set("title", title.to_string());
            }
            link
        }
        Tag::Image {
            dest_url, title, ..
        } => {
            let mut img = Element::new("img").with_attr("src", dest_url.to_string());
            if !title.is_empty() {
                img.set("title", title.to_string());
            }
            img
        }
        Tag::DefinitionList => Element::new("dl"),
        Tag::DefinitionListTitle => Element::new("dt"),
        Tag::DefinitionListDefinition => Element::new("dd"),
        _ => Element::new("div"),
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(md: &str) -> Vec<Node> {
        match markdown_to_tree(md, &MarkdownOptions::default()) {
            Node::Root(children) => children,
            other => panic!("expected root, got {:?}", other),
        }
    }

    #[test]
    fn test_paragraph_with_image() {
        let children = convert("See ![A cat](/cat.png \"Cat\") here.");
        assert_eq!(children.len(), 1);

        let p = children[0].as_element().unwrap();
        assert!(p.is("p"));
        assert_eq!(p.children.len(), 3);
        assert_eq!(p.children[0], Node::text("See "));

        let img = p.children[1].as_element().unwrap();
        assert!(img.is("img"));
        assert_eq!(img.get("src"), Some("/cat.png"));
        assert_eq!(img.get("alt"), Some("A cat"));
        assert_eq!(img.get("title"), Some("Cat"));
        assert!(img.children.is_empty());
    }

    #[test]
    fn test_linked_image_stays_inside_link() {
        let children = convert("[![logo](/logo.svg)](https://example.com)");
        let p = children[0].as_element().unwrap();
        let a = p.children[0].as_element().unwrap();
        assert!(a.is("a"));
        assert_eq!(a.get("href"), Some("https://example.com"));
        assert!(a.children[0].as_element().unwrap().is("img"));
    }

    #[test]
    fn test_headings_and_custom_id() {
        let children = convert("# Title\n\n## Section {#custom .note}\n");
        let h1 = children[0].as_element().unwrap();
        assert!(h1.is("h1"));
        assert_eq!(h1.get("id"), None);

        let h2 = children[1].as_element().unwrap();
        assert!(h2.is("h2"));
        assert_eq!(h2.get("id"), Some("custom"));
        assert_eq!(h2.get("class"), Some("note"));
        assert_eq!(h2.text_content(), "Section");
    }

    #[test]
    fn test_fenced_code_block() {
        let children = convert("```rust ignore\nfn main() {}\n```\n");
        let pre = children[0].as_element().unwrap();
        assert!(pre.is("pre"));
        let code = pre.children[0].as_element().unwrap();
        assert_eq!(code.get("class"), Some("language-rust"));
        assert_eq!(code.text_content(), "fn main() {}\n");
    }

    #[test]
    fn test_table_structure() {
        let children = convert("| a | b |\n|---|---|\n| 1 | 2 |\n");
        let table = children[0].as_element().unwrap();
        assert!(table.is("table"));
        assert_eq!(table.children.len(), 2);

        let thead = table.children[0].as_element().unwrap();
        assert!(thead.is("thead"));
        let head_row = thead.children[0].as_element().unwrap();
        assert!(head_row.children[0].as_element().unwrap().is("th"));

        let tbody = table.children[1].as_element().unwrap();
        assert!(tbody.is("tbody"));
        let row = tbody.children[0].as_element().unwrap();
        assert!(row.children[0].as_element().unwrap().is("td"));
        assert_eq!(row.text_content(), "12");
    }

    #[test]
    fn test_raw_html_passes_through() {
        let children = convert("<div class=\"note\">\n<img src=\"/raw.png\">\n</div>\n");
        assert!(!children.is_empty());
        assert!(children.iter().all(|n| matches!(n, Node::Raw(_))));
    }

    #[test]
    fn test_ordered_list_start_and_tasks() {
        let children = convert("3. three\n4. four\n\n- [x] done\n");
        let ol = children[0].as_element().unwrap();
        assert!(ol.is("ol"));
        assert_eq!(ol.get("start"), Some("3"));
        assert_eq!(ol.children.len(), 2);

        let ul = children[1].as_element().unwrap();
        let li = ul.children[0].as_element().unwrap();
        let input = li.children[0].as_element().unwrap();
        assert!(input.is("input"));
        assert_eq!(input.get("checked"), Some(""));
    }
}
