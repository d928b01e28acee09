// Tolerant parsing of AI service responses and the HTTP client

use anyhow::Result;
use axum::{
    body::Bytes,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use podium_interview::ai::{
    parse_questions, parse_review, HttpAiClient, QuestionService, ReviewParseError, ReviewRequest, ReviewService,
    ScoreRange,
};
use podium_interview::config::AiConfig;
use podium_interview::session::{MediaPayload, SetupMetadata};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

// ============================================================================
// Question layouts
// ============================================================================

#[test]
fn test_questions_object_with_list() {
    let value = json!({"questions": ["Why Rust?", "Describe a hard bug."]});
    assert_eq!(parse_questions(&value, 5), vec!["Why Rust?", "Describe a hard bug."]);
}

#[test]
fn test_questions_bare_array_is_truncated() {
    let value = json!(["One?", "Two?", "Three?"]);
    assert_eq!(parse_questions(&value, 2), vec!["One?", "Two?"]);
}

#[test]
fn test_questions_numeric_keys_are_ordered() {
    let value = json!({"10": "Tenth question", "2": "Second question", "1": "First question"});
    assert_eq!(
        parse_questions(&value, 8),
        vec!["First question", "Second question", "Tenth question"]
    );
}

#[test]
fn test_questions_long_string_values_as_last_resort() {
    let value = json!({"status": "ok", "q": "What motivates you at work?"});
    assert_eq!(parse_questions(&value, 8), vec!["What motivates you at work?"]);
}

#[test]
fn test_questions_unusable_shape_is_empty() {
    assert!(parse_questions(&json!(42), 3).is_empty());
    assert!(parse_questions(&json!({"questions": []}), 3).is_empty());
}

// ============================================================================
// Review bodies
// ============================================================================

#[test]
fn test_review_full_body() {
    let body = r#"{
        "score": 8,
        "strengths": ["Concise", "Confident"],
        "weaknesses": ["No metrics"],
        "overall_feedback": "Good answer",
        "summary": "Solid interview",
        "tips": ["Quantify impact"]
    }"#;

    let review = parse_review(body, ScoreRange::default()).unwrap();
    assert_eq!(review.score, 8);
    assert_eq!(review.strengths, vec!["Concise", "Confident"]);
    assert_eq!(review.weaknesses, vec!["No metrics"]);
    assert_eq!(review.overall_feedback, "Good answer");
    assert_eq!(review.summary.as_deref(), Some("Solid interview"));
    assert_eq!(review.tips, Some(vec!["Quantify impact".to_string()]));
}

#[test]
fn test_review_tolerates_loose_fields() {
    let body = r#"{"score": "11.6", "overallFeedback": "Rambling"}"#;

    let review = parse_review(body, ScoreRange::default()).unwrap();
    assert_eq!(review.score, 10, "Clamped into range");
    assert!(review.strengths.is_empty());
    assert!(review.weaknesses.is_empty());
    assert_eq!(review.overall_feedback, "Rambling");
    assert!(review.summary.is_none());
    assert!(review.tips.is_none());
}

#[test]
fn test_review_low_score_is_clamped_up() {
    let review = parse_review(r#"{"score": 0}"#, ScoreRange::default()).unwrap();
    assert_eq!(review.score, 1);
}

#[test]
fn test_review_errors() {
    let range = ScoreRange::default();

    assert!(matches!(parse_review("not json", range), Err(ReviewParseError::NotJson(_))));
    assert_eq!(parse_review("[1, 2]", range), Err(ReviewParseError::NotAnObject));
    assert_eq!(
        parse_review(r#"{"error": "quota exceeded"}"#, range),
        Err(ReviewParseError::ServiceError("quota exceeded".to_string()))
    );
    assert_eq!(
        parse_review(r#"{"strengths": []}"#, range),
        Err(ReviewParseError::MissingScore)
    );
    assert_eq!(
        parse_review(r#"{"score": "high"}"#, range),
        Err(ReviewParseError::MissingScore)
    );
}

// ============================================================================
// HTTP client against a local stub service
// ============================================================================

async fn spawn_stub(router: Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{}", addr))
}

fn client_for(base_url: String) -> Result<HttpAiClient> {
    HttpAiClient::new(AiConfig {
        base_url,
        request_timeout_secs: 5,
        ..AiConfig::default()
    })
}

#[tokio::test]
async fn test_generate_questions_sends_configured_field_names() -> Result<()> {
    let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let captured = Arc::clone(&seen);

    let router = Router::new().route(
        "/generate-questions",
        post(move |Json(body): Json<Value>| {
            let captured = Arc::clone(&captured);
            async move {
                *captured.lock().unwrap() = Some(body);
                Json(json!({"1": "Tell me about yourself", "2": "Why this company?"}))
            }
        }),
    );
    let client = client_for(spawn_stub(router).await?)?;

    let setup = SetupMetadata::new("Acme", "Backend Developer", "Senior", 2);
    let questions = client.generate_questions(&setup).await?;

    assert_eq!(questions, vec!["Tell me about yourself", "Why this company?"]);
    let body = seen.lock().unwrap().clone().expect("request body captured");
    assert_eq!(body["company"], "Acme");
    assert_eq!(body["positionTitle"], "Backend Developer");
    assert_eq!(body["experience"], "Senior");
    assert_eq!(body["count"], 2);

    Ok(())
}

#[tokio::test]
async fn test_review_uploads_video_as_multipart() -> Result<()> {
    let router = Router::new().route(
        "/review-answer",
        post(|headers: HeaderMap, body: Bytes| async move {
            let content_type = headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let text = String::from_utf8_lossy(&body).to_ascii_lowercase();

            if content_type.starts_with("multipart/form-data")
                && text.contains("name=\"video\"")
                && text.contains("content-type: video/webm")
                && text.contains("fakevideo")
            {
                (StatusCode::OK, Json(json!({"score": 7.6, "strengths": "Clear"})))
            } else {
                (StatusCode::BAD_REQUEST, Json(json!({"error": "bad upload"})))
            }
        }),
    );
    let client = client_for(spawn_stub(router).await?)?;

    let review = client
        .review(&ReviewRequest {
            question_index: 0,
            question: "Why Rust?".to_string(),
            setup: SetupMetadata::new("Acme", "Backend Developer", "Senior", 1),
            video: MediaPayload::new(b"FAKEVIDEO".to_vec(), "video/webm;codecs=vp8,opus"),
        })
        .await?;

    assert_eq!(review.score, 8);
    assert_eq!(review.strengths, vec!["Clear"]);

    Ok(())
}

#[tokio::test]
async fn test_review_service_error_status_fails() -> Result<()> {
    let router = Router::new().route(
        "/review-answer",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model overloaded") }),
    );
    let client = client_for(spawn_stub(router).await?)?;

    let result = client
        .review(&ReviewRequest {
            question_index: 1,
            question: "Why Rust?".to_string(),
            setup: SetupMetadata::new("Acme", "Backend Developer", "Senior", 1),
            video: MediaPayload::new(b"FAKEVIDEO".to_vec(), "video/webm"),
        })
        .await;

    let err = result.unwrap_err();
    assert!(format!("{:#}", err).contains("model overloaded"));

    Ok(())
}
