//! Owned element tree for ODE catalog responses, built on quick-xml.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::OdeError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    children: Vec<Node>,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self, OdeError> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|err| OdeError::XmlParse(err.to_string()))?
            .to_string();
        Ok(Self {
            name,
            children: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every element below this one named `tag`, in document order.
    pub fn descendants(&self, tag: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_descendants(tag, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, tag: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if let Node::Element(element) = child {
                if element.name == tag {
                    found.push(element);
                }
                element.collect_descendants(tag, found);
            }
        }
    }

    /// Direct text children joined with a single space. Nested elements and
    /// CDATA sections do not contribute.
    pub fn direct_text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Direct text of the first descendant named `tag`.
    pub fn first_text(&self, tag: &str) -> Option<String> {
        read_first_text(&self.descendants(tag))
    }
}

/// Text content of the first element in `nodes`, or `None` when empty.
pub fn read_first_text(nodes: &[&Element]) -> Option<String> {
    nodes.first().map(|element| element.direct_text())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: Element,
}

impl XmlDocument {
    pub fn parse(xml: &str) -> Result<Self, OdeError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);
        reader.check_end_names(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    ensure_single_root(&root)?;
                    stack.push(Element::open(&e)?);
                }
                Ok(Event::Empty(e)) => {
                    ensure_single_root(&root)?;
                    let element = Element::open(&e)?;
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::End(e)) => {
                    let element = stack.pop().ok_or_else(|| {
                        OdeError::XmlParse(format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(e.name().as_ref())
                        ))
                    })?;
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|err| OdeError::XmlParse(err.to_string()))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::Text(text.into_owned())),
                        None if text.trim().is_empty() => {}
                        None => {
                            return Err(OdeError::XmlParse(
                                "text outside of the root element".to_string(),
                            ));
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(err) => {
                    return Err(OdeError::XmlParse(format!(
                        "at position {}: {err}",
                        reader.buffer_position()
                    )));
                }
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(OdeError::XmlParse(format!("unclosed element <{}>", open.name)));
        }
        let root =
            root.ok_or_else(|| OdeError::XmlParse("document has no root element".to_string()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Every element named `tag`, root included, in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        if self.root.name == tag {
            found.push(&self.root);
        }
        found.extend(self.root.descendants(tag));
        found
    }
}

fn ensure_single_root(root: &Option<Element>) -> Result<(), OdeError> {
    if root.is_some() {
        return Err(OdeError::XmlParse("multiple root elements".to_string()));
    }
    Ok(())
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => *root = Some(element),
    }
}
