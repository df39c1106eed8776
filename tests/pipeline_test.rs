//! Integration tests for the analysis pipeline using the scripted mock client
//!
//! These exercise the gates, the short-circuit error propagation, and the
//! external outcome shape without any real provider.

use serde_json::{json, Value};
use std::sync::Arc;
use vitascan::llm::{MockInferenceClient, MockResponse, RemoteServiceError};
use vitascan::pipeline::{
    AnalysisPipeline, Disease, ImageAsset, ParseError, PipelineError, PipelineOutcome,
    PipelineState,
};
use vitascan::DEFAULT_CONFIDENCE_THRESHOLD;

const ACCEPTED: &str = r#"{"is_medical_image": true, "reason": "visible skin lesion"}"#;
const REJECTED: &str = r#"{"is_medical_image": false, "reason": "appears to be a houseplant"}"#;

const DEFICIENCIES: &str = r#"{
    "vitamin_deficiencies": [
        {
            "vitamin": "Vitamin A",
            "reason": "supports epithelial repair",
            "recommended_foods": ["Carrots", "Spinach", "Eggs"]
        }
    ]
}"#;

fn diagnosis(disease: &str, confidence: f64) -> String {
    format!(r#"{{"detected_disease": "{disease}", "confidence_score": {confidence}}}"#)
}

fn test_image() -> ImageAsset {
    ImageAsset::from_bytes("uploads/lesion.jpg", "image/jpeg", b"jpeg-bytes".to_vec())
}

fn scripted(responses: Vec<MockResponse>) -> (Arc<MockInferenceClient>, AnalysisPipeline) {
    let client = Arc::new(MockInferenceClient::new());
    client.add_responses(responses);
    let pipeline = AnalysisPipeline::new(client.clone(), DEFAULT_CONFIDENCE_THRESHOLD);
    (client, pipeline)
}

/// Round-trips serialization so float comparisons go through the wire form
fn to_wire_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::from_str(&serde_json::to_string(value).unwrap()).unwrap()
}

#[tokio::test]
async fn rejected_image_halts_before_classification() {
    let (client, pipeline) = scripted(vec![MockResponse::text(REJECTED)]);

    let err = pipeline.process(&test_image()).await.unwrap_err();

    match &err {
        PipelineError::ValidationRejected { reason } => {
            assert_eq!(reason, "appears to be a houseplant");
        }
        other => panic!("expected ValidationRejected, got {other:?}"),
    }
    assert_eq!(err.terminal_state(), PipelineState::Rejected);
    assert!(err.is_client_error());

    // Stages 2 and 3 never ran
    assert_eq!(client.invocation_count(), 1);
}

#[tokio::test]
async fn low_confidence_halts_before_deficiency_inference() {
    // Regardless of which disease was named
    for disease in ["Acne", "Rash", "Unknown"] {
        let (client, pipeline) = scripted(vec![
            MockResponse::text(ACCEPTED),
            MockResponse::text(diagnosis(disease, 0.59)),
        ]);

        let err = pipeline.process(&test_image()).await.unwrap_err();

        assert!(matches!(err, PipelineError::LowConfidence { .. }));
        assert_eq!(err.terminal_state(), PipelineState::LowConfidence);
        assert_eq!(client.invocation_count(), 2);
    }
}

#[tokio::test]
async fn threshold_pass_is_inclusive() {
    let (client, pipeline) = scripted(vec![
        MockResponse::text(ACCEPTED),
        MockResponse::text(diagnosis("Eczema", 0.6)),
        MockResponse::text(DEFICIENCIES),
    ]);

    let analysis = pipeline.process(&test_image()).await.unwrap();

    assert_eq!(analysis.detected_disease, Disease::Eczema);
    assert_eq!(client.invocation_count(), 3);
}

#[tokio::test]
async fn deficiency_stage_receives_disease_name_only() {
    let (client, pipeline) = scripted(vec![
        MockResponse::text(ACCEPTED),
        MockResponse::text(diagnosis("Psoriasis", 0.9)),
        MockResponse::text(DEFICIENCIES),
    ]);

    pipeline.process(&test_image()).await.unwrap();

    assert_eq!(client.invocation_count(), 3);

    // Stage 3 is invoked exactly once, text-only, naming the detected disease
    let stage3_request = client.request_at(2).unwrap();
    assert!(!stage3_request.has_image());
    let prompt = match &stage3_request.parts[0] {
        vitascan::llm::ContentPart::Text(text) => text.clone(),
        other => panic!("expected text part, got {other:?}"),
    };
    assert!(prompt.contains("Psoriasis"));
}

#[tokio::test]
async fn identical_stage_outputs_yield_identical_outcomes() {
    let script = || {
        vec![
            MockResponse::text(ACCEPTED),
            MockResponse::text(diagnosis("Acne", 0.82)),
            MockResponse::text(DEFICIENCIES),
        ]
    };

    let (_, first_pipeline) = scripted(script());
    let (_, second_pipeline) = scripted(script());

    let first = first_pipeline.run(&test_image()).await;
    let second = second_pipeline.run(&test_image()).await;

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[tokio::test]
async fn malformed_json_is_a_parse_error_not_a_crash() {
    // Stage 1 garbage
    let (_, pipeline) = scripted(vec![MockResponse::text("I cannot tell")]);
    let err = pipeline.process(&test_image()).await.unwrap_err();
    assert!(matches!(err, PipelineError::Parse(_)));
    assert!(!err.is_client_error());
    assert_eq!(err.terminal_state(), PipelineState::Failed);

    // Stage 2 garbage halts before stage 3
    let (client, pipeline) = scripted(vec![
        MockResponse::text(ACCEPTED),
        MockResponse::text("```json\n{\"detected_disease\": \"Acne\"}\n```"),
    ]);
    let err = pipeline.process(&test_image()).await.unwrap_err();
    assert!(matches!(err, PipelineError::Parse(_)));
    assert_eq!(client.invocation_count(), 2);

    // Stage 3 garbage
    let (_, pipeline) = scripted(vec![
        MockResponse::text(ACCEPTED),
        MockResponse::text(diagnosis("Acne", 0.82)),
        MockResponse::text("no deficiencies found"),
    ]);
    let err = pipeline.process(&test_image()).await.unwrap_err();
    assert!(matches!(err, PipelineError::Parse(_)));
}

// The source this replaces read a missing confidence as 0 and reported "low
// confidence"; here a dropped key is a provider contract violation instead.
#[tokio::test]
async fn missing_confidence_is_a_parse_error_not_low_confidence() {
    let (client, pipeline) = scripted(vec![
        MockResponse::text(ACCEPTED),
        MockResponse::text(r#"{"detected_disease": "Acne"}"#),
    ]);

    let err = pipeline.process(&test_image()).await.unwrap_err();

    match &err {
        PipelineError::Parse(ParseError::MissingField(field)) => {
            assert_eq!(*field, "confidence_score");
        }
        other => panic!("expected MissingField parse error, got {other:?}"),
    }
    assert!(!err.is_client_error());
    assert_eq!(client.invocation_count(), 2);
}

#[tokio::test]
async fn out_of_vocabulary_disease_is_a_parse_error() {
    let (_, pipeline) = scripted(vec![
        MockResponse::text(ACCEPTED),
        MockResponse::text(diagnosis("Melanoma", 0.95)),
    ]);

    let err = pipeline.process(&test_image()).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Parse(ParseError::UnknownDisease(_))
    ));
}

#[tokio::test]
async fn remote_failure_short_circuits_the_run() {
    let (client, pipeline) = scripted(vec![
        MockResponse::text(ACCEPTED),
        MockResponse::error(RemoteServiceError::Timeout { seconds: 60 }),
    ]);

    let err = pipeline.process(&test_image()).await.unwrap_err();

    assert!(matches!(err, PipelineError::Remote(_)));
    assert!(!err.is_client_error());
    assert_eq!(err.terminal_state(), PipelineState::Failed);
    assert_eq!(client.invocation_count(), 2);
}

#[tokio::test]
async fn completed_run_produces_the_aggregate_outcome() {
    let (_, pipeline) = scripted(vec![
        MockResponse::text(ACCEPTED),
        MockResponse::text(diagnosis("Acne", 0.82)),
        MockResponse::text(DEFICIENCIES),
    ]);

    let outcome = pipeline.run(&test_image()).await;

    assert_eq!(
        to_wire_json(&outcome),
        json!({
            "detected_disease": "Acne",
            "confidence_score": 0.82,
            "vitamin_deficiencies": [
                {
                    "vitamin": "Vitamin A",
                    "reason": "supports epithelial repair",
                    "recommended_foods": ["Carrots", "Spinach", "Eggs"]
                }
            ]
        })
    );
}

#[tokio::test]
async fn low_confidence_outcome_has_only_the_error_descriptor() {
    let (client, pipeline) = scripted(vec![
        MockResponse::text(ACCEPTED),
        MockResponse::text(diagnosis("Rash", 0.4)),
    ]);

    let outcome = pipeline.run(&test_image()).await;

    assert_eq!(
        to_wire_json(&outcome),
        json!({
            "error": "Unable to determine condition with sufficient confidence."
        })
    );
    assert!(matches!(outcome, PipelineOutcome::Halted { .. }));
    assert_eq!(client.invocation_count(), 2);
}

#[tokio::test]
async fn rejected_outcome_carries_the_model_reason() {
    let (_, pipeline) = scripted(vec![MockResponse::text(REJECTED)]);

    let outcome = pipeline.run(&test_image()).await;

    assert_eq!(
        to_wire_json(&outcome),
        json!({
            "error": "Uploaded image is not medically relevant.",
            "reason": "appears to be a houseplant"
        })
    );
}
