//! Question page parsing.
//!
//! Converts an archive question page into a [`Response`]. Parsing is pure: it
//! needs no network access and works on any decoded HTML string, which makes
//! it usable on saved pages and fixtures.
//!
//! # Page layout
//!
//! Four landmarks are located, always the first match in document order:
//!
//! - question: the element right after `div.main.kako > h3.qno`
//! - selections: `div.main.kako > div.ansbg > ul.selectList`
//! - answer: `span#answerChar` inside `div.main.kako > div.answerBox`
//! - explanation: the first `div.ansbg` sibling following the answer box
//!
//! # Example
//!
//! ```
//! use kakomon_core::parser::parse_html;
//!
//! let html = r#"<div class="main kako">
//!   <h3 class="qno">問1</h3><div>What is 1 + 1?</div>
//!   <div class="ansbg"><ul class="selectList">
//!     <li><a class="selectBtn"><button>ア</button></a><div>2</div></li>
//!     <li><a class="selectBtn"><button>イ</button></a><div>3</div></li>
//!   </ul></div>
//!   <div class="answerBox">正解 <span id="answerChar">ア</span></div>
//!   <h3>解説</h3>
//!   <div class="ansbg">Addition.</div>
//! </div>"#;
//!
//! let res = parse_html(html).unwrap();
//! assert_eq!(res.question, "What is 1 + 1?");
//! assert_eq!(res.selections, ["ア: 2", "イ: 3"]);
//! assert_eq!(res.answer, "ア");
//! ```

mod error;

pub use error::{Anchor, ParseError};

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, instrument};

use crate::response::{JSON_VERSION, Response};

static QUESTION_HEADING: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("div.main.kako > h3.qno"));
static SELECTION_LIST: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("div.main.kako > div.ansbg > ul.selectList"));
static ANSWER_BOX: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("div.main.kako > div.answerBox"));
static ANSWER_CHAR: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("span#answerChar"));
static SELECTION_LABEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("a.selectBtn > button"));
static SELECTION_TEXT: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("div"));
static IMAGE: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("img"));
static FIRST_CHOICE_NOTE: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("ul > li.lia"));

/// Explanation paragraph classes and the choice label each one comments on.
const CHOICE_NOTES: [(&str, &str); 4] = [("lia", "ア"), ("lii", "イ"), ("liu", "ウ"), ("lie", "エ")];

fn compile_static_selector(selector: &str) -> Selector {
    Selector::parse(selector)
        .unwrap_or_else(|e| panic!("invalid static selector '{selector}': {e:?}"))
}

/// Parses a decoded HTML page into a [`Response`].
///
/// The returned record has an empty `url`; the fetcher fills it in.
///
/// # Errors
///
/// Returns [`ParseError::MissingAnchor`] when the page does not have the
/// question layout.
pub fn parse_html(html: &str) -> Result<Response, ParseError> {
    let document = Html::parse_document(html);
    parse_document(&document)
}

/// Parses an already built document into a [`Response`].
///
/// # Errors
///
/// Returns [`ParseError::MissingAnchor`] when the page does not have the
/// question layout.
#[instrument(level = "debug", skip_all)]
pub fn parse_document(document: &Html) -> Result<Response, ParseError> {
    let question = document
        .select(&QUESTION_HEADING)
        .next()
        .and_then(next_element_sibling)
        .ok_or(ParseError::MissingAnchor(Anchor::Question))?;

    let selection_list = document
        .select(&SELECTION_LIST)
        .next()
        .ok_or(ParseError::MissingAnchor(Anchor::Selections))?;

    let answer_box = document
        .select(&ANSWER_BOX)
        .next()
        .ok_or(ParseError::MissingAnchor(Anchor::Answer))?;
    let answer = answer_box
        .select(&ANSWER_CHAR)
        .next()
        .map(|marker| collect_text(marker).trim().to_string())
        .filter(|answer| !answer.is_empty())
        .ok_or(ParseError::MissingAnchor(Anchor::Answer))?;

    let explanation = answer_box
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "div" && el.value().classes().any(|c| c == "ansbg"))
        .ok_or(ParseError::MissingAnchor(Anchor::Explanation))?;

    let selections = parse_selections(selection_list);
    let has_image = [question, selection_list, answer_box]
        .iter()
        .any(|block| block.select(&IMAGE).next().is_some());

    debug!(
        selections = selections.len(),
        answer = %answer,
        has_image,
        "parsed question page"
    );

    Ok(Response {
        question: collect_text(question).trim().to_string(),
        selections,
        answer,
        explanation: explanation_text(explanation).trim().to_string(),
        has_image,
        url: String::new(),
        version: JSON_VERSION.to_string(),
    })
}

fn next_element_sibling(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

fn collect_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// One `"<label>: <text>"` entry per `li` child, in document order.
fn parse_selections(list: ElementRef<'_>) -> Vec<String> {
    list.children()
        .filter_map(ElementRef::wrap)
        .filter(|item| item.value().name() == "li")
        .map(|item| {
            let label: String = item.select(&SELECTION_LABEL).flat_map(|b| b.text()).collect();
            let text: String = item.select(&SELECTION_TEXT).flat_map(|d| d.text()).collect();
            format!("{}: {}", label.trim(), text.trim())
        })
        .collect()
}

/// Explanation text with per-choice paragraphs labelled.
///
/// When the block comments on each choice (`ul > li.lia` and friends), every
/// such paragraph becomes `"ア:<text>\n"` and a newline opens the list that
/// holds the first one. Otherwise the plain text is returned.
fn explanation_text(block: ElementRef<'_>) -> String {
    let Some(first_note) = block.select(&FIRST_CHOICE_NOTE).next() else {
        return collect_text(block);
    };
    let notes_list = first_note.parent().and_then(ElementRef::wrap);

    let mut out = String::new();
    write_labelled_text(block, notes_list, &mut out);
    out
}

fn write_labelled_text<'a>(
    element: ElementRef<'a>,
    notes_list: Option<ElementRef<'a>>,
    out: &mut String,
) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                if Some(child) == notes_list {
                    out.push('\n');
                }
                if let Some(label) = choice_note_label(child) {
                    out.push_str(label);
                    out.push(':');
                    out.extend(child.text());
                    out.push('\n');
                } else {
                    write_labelled_text(child, notes_list, out);
                }
            }
            _ => {}
        }
    }
}

/// Label for an `li` inside a `ul` carrying one of the per-choice classes.
fn choice_note_label(element: ElementRef<'_>) -> Option<&'static str> {
    if element.value().name() != "li" {
        return None;
    }
    let in_list = element
        .parent()
        .and_then(ElementRef::wrap)
        .is_some_and(|parent| parent.value().name() == "ul");
    if !in_list {
        return None;
    }
    CHOICE_NOTES
        .iter()
        .find(|(class, _)| element.value().classes().any(|c| c == *class))
        .map(|(_, label)| *label)
}
