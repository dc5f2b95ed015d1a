//! edX problem XML to Moodle GIFT transduction.
//!
//! The walk visits the children of an element in document order. Response
//! elements become GIFT question blocks, `problem` elements are descended
//! into with the same [`QuestionCounter`], and everything else feeds
//! the title of the next question (see [`TitleMode`]).
//!
//! Output is produced as a sequence of fragments which are only ever
//! appended, so any prefix of [`Conversion::fragments`] is valid GIFT.

mod escape;
mod weights;

pub use escape::{escape_text, RESERVED};
pub use weights::{checkbox_weights, format_percentage, SIGNIFICANT_DIGITS};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::edx::Element;
use crate::error::ConvertError;

/// Marker telling GIFT consumers that the question text is HTML.
pub const HTML_MARKER: &str = "[html]";

/// How unrecognized elements contribute to question titles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleMode {
    /// Append the escaped source markup of every unrecognized element and
    /// mark the question as HTML.
    #[default]
    Markup,
    /// Use the escaped text of `p` elements only. Other unrecognized
    /// elements are skipped with a warning.
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Identifier given to the first question.
    pub start_id: usize,
    pub title_mode: TitleMode,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            start_id: 1,
            title_mode: TitleMode::Markup,
        }
    }
}

/// Running question identifier, shared by every level of a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionCounter {
    first: usize,
    next: usize,
}

impl QuestionCounter {
    pub fn starting_at(first: usize) -> Self {
        Self { first, next: first }
    }

    /// Identifier the next question will get.
    pub fn peek(&self) -> usize {
        self.next
    }

    /// Number of identifiers handed out so far.
    pub fn issued(&self) -> usize {
        self.next - self.first
    }

    fn is_first(&self, id: usize) -> bool {
        id == self.first
    }

    fn advance(&mut self) -> Result<(), ConvertError> {
        self.next = self
            .next
            .checked_add(1)
            .ok_or(ConvertError::IdentifierOverflow { last: self.next })?;
        Ok(())
    }
}

/// Something worth telling the user that did not stop the conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// An element that is neither a response nor title content.
    UnsupportedElement { tag: String },
    /// Title content with no response element after it.
    DroppedTitle { title: String },
    /// A numerical response without an `answer` attribute.
    MissingAnswer { id: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnsupportedElement { tag } => write!(f, "Unsupported question <{tag}>"),
            Warning::DroppedTitle { title } => {
                write!(f, "Dropped title without a response: {title}")
            }
            Warning::MissingAnswer { id } => {
                write!(f, "Numerical response Q{id} has no answer attribute")
            }
        }
    }
}

/// Result of a transduction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub fragments: Vec<String>,
    pub warnings: Vec<Warning>,
    /// Number of questions emitted.
    pub questions: usize,
    /// First identifier not used by this conversion.
    pub next_id: usize,
}

impl Conversion {
    /// The GIFT document.
    pub fn gift(&self) -> String {
        self.fragments.concat()
    }

    fn push(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }
}

/// Tags the walk knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Problem,
    MultipleChoice,
    Checkbox,
    Numerical,
    Paragraph,
    Other,
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        match name {
            "problem" => Tag::Problem,
            "multiplechoiceresponse" => Tag::MultipleChoice,
            "choiceresponse" => Tag::Checkbox,
            "numericalresponse" => Tag::Numerical,
            "p" => Tag::Paragraph,
            _ => Tag::Other,
        }
    }
}

/// Parse `xml` and convert the children of its root element.
pub fn convert_edx_to_gift(xml: &str, options: &ConvertOptions) -> Result<Conversion, ConvertError> {
    let root = Element::parse(xml)?;
    let mut counter = QuestionCounter::starting_at(options.start_id);
    let mut out = Conversion::default();

    transduce(&root, &mut counter, options.title_mode, &mut out)?;

    out.questions = counter.issued();
    out.next_id = counter.peek();
    Ok(out)
}

/// Convert the children of `element`, appending to `out`.
///
/// `counter` is advanced once per emitted question, including the ones
/// emitted by nested `problem` elements, so numbering continues across
/// levels. Nesting depth is bounded by memory only: open levels are kept on
/// an explicit stack, each with its own title.
pub fn transduce(
    element: &Element,
    counter: &mut QuestionCounter,
    mode: TitleMode,
    out: &mut Conversion,
) -> Result<(), ConvertError> {
    let mut levels = vec![(element.elements(), Title::new(mode))];

    while let Some((children, title)) = levels.last_mut() {
        let Some(child) = children.next() else {
            if let Some(title) = title.take() {
                out.warnings.push(Warning::DroppedTitle { title });
            }
            levels.pop();
            continue;
        };

        match Tag::from(child.name.as_str()) {
            Tag::Problem => levels.push((child.elements(), Title::new(mode))),
            Tag::MultipleChoice => {
                open_question(counter, title, out);
                render_multiple_choice(child, out);
                counter.advance()?;
            }
            Tag::Checkbox => {
                open_question(counter, title, out);
                render_checkbox(child, out);
                counter.advance()?;
            }
            Tag::Numerical => {
                open_question(counter, title, out);
                render_numerical(child, counter.peek(), out);
                counter.advance()?;
            }
            Tag::Paragraph | Tag::Other => title.absorb(child, out),
        }
    }

    Ok(())
}

/// Title content collected for the next question of one level.
struct Title {
    mode: TitleMode,
    parts: Vec<String>,
}

impl Title {
    fn new(mode: TitleMode) -> Self {
        Self {
            mode,
            parts: Vec::new(),
        }
    }

    fn absorb(&mut self, element: &Element, out: &mut Conversion) {
        match self.mode {
            TitleMode::Markup => self.parts.push(escape_text(element.markup())),
            TitleMode::Text if Tag::from(element.name.as_str()) == Tag::Paragraph => {
                self.parts.push(escape_text(&element.text_content()))
            }
            TitleMode::Text => out.warnings.push(Warning::UnsupportedElement {
                tag: element.name.clone(),
            }),
        }
    }

    /// The pending title, or `None` when nothing was collected.
    fn take(&mut self) -> Option<String> {
        let parts = std::mem::take(&mut self.parts);
        let separator = match self.mode {
            TitleMode::Markup => "",
            TitleMode::Text => " ",
        };
        let title = parts
            .iter()
            .filter(|part| !part.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(separator);

        (!title.is_empty()).then_some(title)
    }

    fn marker(&self) -> &'static str {
        match self.mode {
            TitleMode::Markup => HTML_MARKER,
            TitleMode::Text => "",
        }
    }
}

fn open_question(counter: &QuestionCounter, title: &mut Title, out: &mut Conversion) {
    let id = counter.peek();
    let newline = if counter.is_first(id) { "" } else { "\n" };
    let marker = title.marker();
    let text = title.take().unwrap_or_default();

    out.push(format!("{newline}::Q{id}::{marker}{text}{{"));
}

fn is_correct(choice: &Element) -> bool {
    choice.attribute("correct") == Some("true")
}

fn render_multiple_choice(response: &Element, out: &mut Conversion) {
    out.push("\n");
    for choice in response.find_all("choicegroup/choice") {
        let sign = if is_correct(choice) { '=' } else { '~' };
        out.push(format!("\t{sign}{}\n", escape_text(&choice.text())));
    }
    out.push("}\n");
}

fn render_checkbox(response: &Element, out: &mut Conversion) {
    out.push("\n");
    let choices = response.find_all("checkboxgroup/choice");
    let correct: Vec<bool> = choices.iter().map(|choice| is_correct(choice)).collect();

    for (choice, weight) in choices.iter().zip(checkbox_weights(&correct)) {
        out.push(format!(
            "\t~%{}%{}\n",
            format_percentage(weight),
            escape_text(&choice.text())
        ));
    }
    out.push("}\n");
}

fn render_numerical(response: &Element, id: usize, out: &mut Conversion) {
    out.push("#\n");

    let answer = match response.attribute("answer") {
        Some(answer) => escape_text(answer),
        None => {
            out.warnings.push(Warning::MissingAnswer { id });
            String::new()
        }
    };

    // Tolerances are written as fractions without the leading zero (".1").
    let tolerance = response
        .find("responseparam")
        .filter(|param| param.attribute("type") == Some("tolerance"))
        .and_then(|param| param.attribute("default"))
        .map(|default| format!(":0{default}"))
        .unwrap_or_default();

    out.push(format!("\t=%100%{answer}{tolerance}\n"));
    out.push("}\n");
}
