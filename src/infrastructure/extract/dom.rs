//! Owned document tree used by the extractor.
//!
//! Post bodies are parsed once with `scraper` and converted into plain
//! elements and text nodes, so the heading/table walk below does not depend
//! on the parser's own tree API.

use scraper::{ElementRef, Html};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.name.as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// All descendant elements in document order, `self` excluded.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, out: &mut Vec<&'a Element>) {
        for child in self.child_elements() {
            out.push(child);
            child.collect_descendants(out);
        }
    }

    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        self.descendants()
            .into_iter()
            .filter(|el| el.name == name)
            .collect()
    }

    /// Text pieces, each trimmed, concatenated without separator.
    pub fn stripped_text(&self) -> String {
        let mut pieces = Vec::new();
        self.collect_text(&mut pieces);
        pieces.iter().map(|p| p.trim()).collect()
    }

    /// Text with every whitespace run collapsed to a single space.
    pub fn normalized_text(&self) -> String {
        let mut pieces = Vec::new();
        self.collect_text(&mut pieces);
        pieces.concat().split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push(text),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parses an HTML fragment such as a post's rendered content.
    pub fn parse_fragment(html: &str) -> Self {
        let parsed = Html::parse_fragment(html);
        Self {
            root: convert(parsed.root_element()),
        }
    }

    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        self.root.find_all(name)
    }

    /// Every `table` paired with the heading nearest before it.
    ///
    /// Only preceding siblings are considered headings for a table. A table
    /// without such a sibling inherits the heading in effect at its
    /// enclosing level, so `<h3/><figure><table/></figure>` still pairs the
    /// table with the `h3`.
    pub fn tables_with_headings(&self) -> Vec<(&Element, Option<&Element>)> {
        let mut out = Vec::new();
        walk_tables(&self.root, None, &mut out);
        out
    }
}

fn walk_tables<'a>(
    parent: &'a Element,
    inherited: Option<&'a Element>,
    out: &mut Vec<(&'a Element, Option<&'a Element>)>,
) {
    let mut nearest: Option<&Element> = None;
    for child in parent.child_elements() {
        if child.is_heading() {
            nearest = Some(child);
        } else if child.name == "table" {
            out.push((child, nearest.or(inherited)));
        } else {
            walk_tables(child, nearest.or(inherited), out);
        }
    }
}

fn convert(element: ElementRef<'_>) -> Element {
    let value = element.value();
    let children = element
        .children()
        .filter_map(|child| match child.value() {
            scraper::Node::Text(text) => Some(Node::Text(String::from(&**text))),
            scraper::Node::Element(_) => ElementRef::wrap(child).map(|el| Node::Element(convert(el))),
            _ => None,
        })
        .collect();

    Element {
        name: value.name().to_ascii_lowercase(),
        attrs: value
            .attrs()
            .map(|(key, val)| (key.to_string(), val.to_string()))
            .collect(),
        children,
    }
}
