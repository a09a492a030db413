//! Integration tests for question page parsing against saved pages.

use kakomon_core::parser::{Anchor, ParseError, parse_html};
use kakomon_core::{JSON_VERSION, Response};

const NOTES_PAGE: &str = include_str!("fixtures/question_notes.html");
const IMAGE_PAGE: &str = include_str!("fixtures/question_image.html");
const NOT_FOUND_PAGE: &str = include_str!("fixtures/not_found.html");

#[test]
fn test_parse_fixture_question_and_answer() {
    let res = parse_html(NOTES_PAGE).expect("fixture should parse");

    assert_eq!(
        res.question,
        "10進数の演算式 7÷32 の結果を2進数で表したものはどれか。"
    );
    assert_eq!(res.answer, "ウ");
    assert!(!res.has_image);
    assert!(res.url.is_empty());
    assert_eq!(res.version, JSON_VERSION);
}

#[test]
fn test_parse_fixture_selections_in_page_order() {
    let res = parse_html(NOTES_PAGE).expect("fixture should parse");
    assert_eq!(
        res.selections,
        [
            "ア: 0.001011",
            "イ: 0.001101",
            "ウ: 0.00111",
            "エ: 0.0111"
        ]
    );
}

#[test]
fn test_parse_fixture_labels_each_choice_note() {
    let res = parse_html(NOTES_PAGE).expect("fixture should parse");
    assert_eq!(
        res.explanation,
        "7÷32 = 7÷25 なので、7 を右に5ビットシフトします。\n\
         ア:0.001011 は 11/64 です。\n\
         イ:0.001101 は 13/64 です。\n\
         ウ:正しい。\n\
         エ:0.0111 は 7/16 です。"
    );
}

#[test]
fn test_parse_fixture_uses_first_explanation_block() {
    let res = parse_html(NOTES_PAGE).expect("fixture should parse");
    assert!(
        !res.explanation.contains("関連する問題"),
        "later ansbg blocks must be ignored: {}",
        res.explanation
    );
}

#[test]
fn test_parse_fixture_detects_question_image() {
    let res = parse_html(IMAGE_PAGE).expect("fixture should parse");
    assert!(res.has_image);
    assert_eq!(
        res.question,
        "図の2分木を後行順に探索したときの節点の順序はどれか。"
    );
    assert_eq!(res.answer, "イ");
    assert_eq!(
        res.explanation,
        "後行順では左部分木、右部分木、節点の順に訪問します。"
    );
}

#[test]
fn test_parse_error_page_is_structure_error() {
    let err = parse_html(NOT_FOUND_PAGE).unwrap_err();
    assert_eq!(err, ParseError::MissingAnchor(Anchor::Question));
}

#[test]
fn test_parsed_record_serializes_with_wire_names() {
    let res = parse_html(IMAGE_PAGE).expect("fixture should parse");
    let value = serde_json::to_value(&res).expect("record should serialize");

    for key in [
        "question",
        "selections",
        "answer",
        "explanation",
        "hasImage",
        "url",
        "version",
    ] {
        assert!(value.get(key).is_some(), "missing key {key}: {value}");
    }
    assert_eq!(value["hasImage"], true);

    let back: Response = serde_json::from_value(value).expect("record should deserialize");
    assert_eq!(back, res);
}
