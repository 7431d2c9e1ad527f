use codesage_lib::pipelines::assessment::QualityAssessment;
use codesage_lib::pipelines::complexity::ComplexityAnalysis;
use codesage_lib::pipelines::hinting::{HintLevel, HintResponse};
use codesage_lib::pipelines::ollama::collect_stream;
use codesage_lib::pipelines::ollama_utils::extract_json;

#[test]
fn test_hint_from_fenced_answer() {
    let text = r#"
    Sure! Here is my hint:
    ```json
    {"hint": "What lookup structure gives O(1) membership?", "newHintLevel": "Guide"}
    ```
    "#;

    let json = extract_json(text).unwrap();
    let response: HintResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(response.new_hint_level, HintLevel::Guide);
}

#[test]
fn test_assessment_with_trailing_comma_and_smart_quotes() {
    let text = "{\u{201C}style\u{201D}: \"Good naming\", \"readability\": \"Clear\", \"adherence\": \"PEP 8\", \"problemSolving\": \"Effective\", \"suggestions\": \"None\",}";

    let json = extract_json(text).unwrap();
    let report: QualityAssessment = serde_json::from_str(&json).unwrap();
    assert_eq!(report.style, "Good naming");
    assert_eq!(report.suggestions, "None");
}

#[test]
fn test_braces_inside_strings_do_not_end_the_object() {
    let text = r#"Analysis: {"complexity": "O(n)", "explanation": "one pass, uses a dict {}", "syntaxErrors": []} done"#;

    let json = extract_json(text).unwrap();
    let analysis: ComplexityAnalysis = serde_json::from_str(&json).unwrap();
    assert_eq!(analysis.explanation, "one pass, uses a dict {}");
}

#[test]
fn test_no_json_is_an_error() {
    let err = extract_json("I cannot help with that.").unwrap_err();
    assert!(err.to_string().contains("Failed to extract"));
}

#[test]
fn test_stream_chunks_are_joined_until_done() {
    let body = concat!(
        "{\"response\":\"{\\\"hint\\\":\",\"done\":false}\n",
        "{\"response\":\"\\\"Try a set.\\\",\\\"newHintLevel\\\":\\\"Nudge\\\"}\",\"done\":false}\n",
        "{\"response\":\"\",\"done\":true}\n",
        "{\"response\":\"ignored\",\"done\":false}\n",
    );

    let joined = collect_stream(body);
    let response: HintResponse = serde_json::from_str(&joined).unwrap();
    assert_eq!(response.hint, "Try a set.");
    assert_eq!(response.new_hint_level, HintLevel::Nudge);
}
