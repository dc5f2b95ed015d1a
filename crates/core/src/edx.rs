//! edX problem XML as a small owned element tree.
//!
//! The tree is built from `quick-xml` events. Besides names, attributes and
//! children, every element remembers the span of the source document it was
//! read from, so unrecognized content can be passed through verbatim. All
//! elements of a document share one copy of the source.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::ops::Range;
use std::sync::Arc;

use crate::error::ConvertError;

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element of an edX problem document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
    source: Arc<str>,
    span: Range<usize>,
}

struct OpenElement {
    element: Element,
    start: usize,
}

impl Element {
    /// Parse an XML document and return its root element.
    ///
    /// Comments, processing instructions, declarations and doctypes are
    /// skipped. CDATA sections become text nodes.
    pub fn parse(xml: &str) -> Result<Element, ConvertError> {
        let source: Arc<str> = Arc::from(xml);
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<OpenElement> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let start = reader.buffer_position() as usize;
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    return Err(ConvertError::parse(
                        reader.buffer_position() as usize,
                        err.to_string(),
                    ))
                }
            };
            let end = reader.buffer_position() as usize;

            match event {
                Event::Start(tag) => {
                    let element = open_element(&tag, &source, start)?;
                    stack.push(OpenElement { element, start });
                }
                Event::Empty(tag) => {
                    let mut element = open_element(&tag, &source, start)?;
                    element.span = start..end;
                    attach(element, &mut stack, &mut root, start)?;
                }
                Event::End(_) => {
                    let Some(OpenElement {
                        mut element,
                        start: opened_at,
                    }) = stack.pop()
                    else {
                        return Err(ConvertError::parse(start, "unexpected end tag"));
                    };
                    element.span = opened_at..end;
                    attach(element, &mut stack, &mut root, start)?;
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| ConvertError::parse(start, e.to_string()))?;
                    push_text(text.into_owned(), &mut stack, start)?;
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    push_text(text, &mut stack, start)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(ConvertError::parse(
                xml.len(),
                format!("unclosed element <{}>", open.element.name),
            ));
        }

        root.ok_or_else(|| ConvertError::parse(xml.len(), "document has no root element"))
    }

    /// Source text of the element, from the `<` of its start tag to the `>`
    /// of its end tag. Entity references are kept as written.
    pub fn markup(&self) -> &str {
        &self.source[self.span.clone()]
    }

    /// Value of the attribute called `name`, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct child elements, in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First direct child element called `name`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// Elements reached by following a slash separated path of direct
    /// children, e.g. `choicegroup/choice`.
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        let mut current = vec![self];
        for step in path.split('/').filter(|step| !step.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|element| element.elements().filter(move |child| child.name == step))
                .collect();
        }
        current
    }

    /// Character content before the first nested element. Text following
    /// a nested element is not included.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .map_while(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// All character content of this element and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        let mut pending: Vec<std::slice::Iter<'_, Node>> = vec![self.children.iter()];

        while let Some(children) = pending.last_mut() {
            match children.next() {
                Some(Node::Text(text)) => out.push_str(text),
                Some(Node::Element(child)) => pending.push(child.children.iter()),
                None => {
                    pending.pop();
                }
            }
        }
        out
    }
}

// Children are torn down from a work list so a deep chain does not recurse.
impl Drop for Element {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let Node::Element(mut element) = node {
                pending.append(&mut element.children);
            }
        }
    }
}

fn open_element(
    tag: &BytesStart<'_>,
    source: &Arc<str>,
    position: usize,
) -> Result<Element, ConvertError> {
    let name = std::str::from_utf8(tag.name().as_ref())
        .map_err(|e| ConvertError::parse(position, format!("invalid element name: {e}")))?
        .to_string();

    let mut attributes = Vec::new();
    for attribute in tag.attributes() {
        let attribute = attribute.map_err(|e| ConvertError::parse(position, e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| ConvertError::parse(position, e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
        source: Arc::clone(source),
        span: position..position,
    })
}

fn attach(
    element: Element,
    stack: &mut [OpenElement],
    root: &mut Option<Element>,
    position: usize,
) -> Result<(), ConvertError> {
    if let Some(parent) = stack.last_mut() {
        parent.element.children.push(Node::Element(element));
        return Ok(());
    }

    if root.is_some() {
        return Err(ConvertError::parse(
            position,
            format!("unexpected element <{}> after the root element", element.name),
        ));
    }

    *root = Some(element);
    Ok(())
}

fn push_text(text: String, stack: &mut [OpenElement], position: usize) -> Result<(), ConvertError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.element.children.push(Node::Text(text));
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ConvertError::parse(
            position,
            "text outside of the root element",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_builds_nested_tree() {
        let root = Element::parse("<problem><p>Prompt</p><choiceresponse/></problem>").unwrap();
        assert_eq!(root.name, "problem");

        let names: Vec<&str> = root.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["p", "choiceresponse"]);
        assert_eq!(root.find("p").unwrap().text(), "Prompt");
    }

    #[test]
    fn test_parse_keeps_verbatim_markup() {
        let xml = r#"<problem>
            <p class="lead">Is 1 &lt; 2 <b>really</b>?</p>
            <img src="a.png" />
        </problem>"#;
        let root = Element::parse(xml).unwrap();

        let p = root.find("p").unwrap();
        assert_eq!(
            p.markup(),
            r#"<p class="lead">Is 1 &lt; 2 <b>really</b>?</p>"#
        );
        assert_eq!(root.find("img").unwrap().markup(), r#"<img src="a.png" />"#);
        assert_eq!(root.markup(), xml);
    }

    #[test]
    fn test_parse_unescapes_text_and_attributes() {
        let root = Element::parse(r#"<p title="a &amp; b">1 &lt; 2</p>"#).unwrap();
        assert_eq!(root.attribute("title"), Some("a & b"));
        assert_eq!(root.text(), "1 < 2");
    }

    #[test]
    fn test_parse_skips_declaration_and_comments() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- exported from studio -->
<problem><!-- note --><p>Hi</p></problem>
"#;
        let root = Element::parse(xml).unwrap();
        assert_eq!(root.name, "problem");
        assert_eq!(root.elements().count(), 1);
    }

    #[test]
    fn test_parse_cdata_is_text() {
        let root = Element::parse("<p><![CDATA[a {b} c]]></p>").unwrap();
        assert_eq!(root.text(), "a {b} c");
    }

    #[test]
    fn test_parse_rejects_mismatched_end_tag() {
        let result = Element::parse("<problem><p>text</b></problem>");
        assert!(matches!(result, Err(ConvertError::Parse { .. })));
    }

    #[test]
    fn test_parse_rejects_unclosed_element() {
        let result = Element::parse("<problem><p>text</p>");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_empty_document() {
        assert!(Element::parse("").is_err());
        assert!(Element::parse("   \n ").is_err());
    }

    #[test]
    fn test_parse_rejects_plain_text() {
        assert!(Element::parse("this is not xml").is_err());
    }

    #[test]
    fn test_parse_rejects_multiple_roots() {
        let result = Element::parse("<a/><b/>");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("after the root element"));
    }

    #[test]
    fn test_find_all_follows_direct_children() {
        let xml = r#"<multiplechoiceresponse>
            <choicegroup>
                <choice correct="true">A</choice>
                <choice correct="false">B</choice>
            </choicegroup>
            <choice>not in a group</choice>
        </multiplechoiceresponse>"#;
        let root = Element::parse(xml).unwrap();

        let choices = root.find_all("choicegroup/choice");
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0].attribute("correct"), Some("true"));
        assert_eq!(choices[1].text(), "B");
        assert!(root.find_all("checkboxgroup/choice").is_empty());
    }

    #[test]
    fn test_text_ignores_nested_elements() {
        let root = Element::parse(r#"<choice correct="true"><img src="f"/></choice>"#).unwrap();
        assert_eq!(root.text(), "");

        let root = Element::parse("<p>one <b>two</b> three</p>").unwrap();
        assert_eq!(root.text(), "one ");
        assert_eq!(root.text_content(), "one two three");
    }

    #[test]
    fn test_text_content_of_deep_chain() {
        let depth = 10_000;
        let xml = format!("{}x{}", "<b>".repeat(depth), "</b>".repeat(depth));

        let text = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || Element::parse(&xml).unwrap().text_content())
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(text, "x");
    }
}
