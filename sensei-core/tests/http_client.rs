//! HttpReviewService against a wiremock server.
//!
//! Exercises: request bodies for /analyze, /chat, /feedback; structured error
//! detail; non-JSON error bodies; malformed 2xx payloads; unreachable host;
//! request timeout through the session controller.

use std::time::Duration;

use pretty_assertions::assert_eq;
use sensei_core::client::{HttpReviewService, ReviewService};
use sensei_core::error::CONNECTIVITY_MESSAGE;
use sensei_core::types::{
    AnalysisRequest, ChatRequest, ConversationEntry, FeedbackRequest, Language, Rating, Severity,
    SourceDocument,
};
use sensei_core::{ApiError, SessionController, SessionStatus};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpReviewService {
    // Trailing slash on purpose: it must not produce `//analyze`.
    HttpReviewService::new(&format!("{}/", server.uri()), Duration::from_secs(5)).unwrap()
}

fn analysis_request() -> AnalysisRequest {
    AnalysisRequest { code: "def f():\n    return 1".to_owned(), language: Language::Python }
}

#[tokio::test]
async fn analyze_decodes_results_and_null_analyses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(body_json(json!({ "code": "def f():\n    return 1", "language": "python" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "meta": { "function_name": "f", "start_line": 1, "end_line": 2,
                              "code": "def f():\n    return 1" },
                    "analysis": {
                        "quality_score": 6.5,
                        "complexity_estimate": "O(1)",
                        "plain_english_explanation": "Returns one.",
                        "issues": [
                            { "issue_type": "Naming", "severity": "low",
                              "description": "f is vague", "fix_suggestion": "def one():" },
                            { "issue_type": "Style", "severity": "critical",
                              "description": "odd" }
                        ]
                    }
                },
                {
                    "meta": { "function_name": "g", "start_line": 4, "end_line": 5, "code": "" },
                    "analysis": null
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).analyze(&analysis_request()).await.unwrap();

    assert_eq!(result.results.len(), 2);
    assert!(result.results[1].analysis.is_none());
    let report = result.results[0].analysis.as_ref().unwrap();
    assert_eq!(report.quality_score, 6.5);
    assert_eq!(report.issues[0].severity, Severity::Low);
    assert_eq!(report.issues[0].fix_suggestion.as_deref(), Some("def one():"));
    assert_eq!(report.issues[1].severity, Severity::Other("critical".to_owned()));
    assert_eq!(report.issues[1].fix_suggestion, None);
}

#[tokio::test]
async fn structured_error_detail_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "Unsupported syntax" })),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).analyze(&analysis_request()).await.unwrap_err();
    assert!(matches!(err, ApiError::Service { status: 400, .. }));
    assert_eq!(err.user_message(), "Unsupported syntax");
}

#[tokio::test]
async fn unstructured_error_body_is_generic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = client_for(&server).analyze(&analysis_request()).await.unwrap_err();
    assert!(matches!(err, ApiError::UnexpectedStatus { status: 500 }));
    assert_eq!(err.user_message(), CONNECTIVITY_MESSAGE);
}

#[tokio::test]
async fn missing_results_field_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let err = client_for(&server).analyze(&analysis_request()).await.unwrap_err();
    assert!(matches!(err, ApiError::Malformed(_)), "got {err:?}");
    assert_eq!(err.user_message(), CONNECTIVITY_MESSAGE);
}

#[tokio::test]
async fn chat_sends_history_and_returns_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({
            "message": "Make it O(n)?",
            "code_context": "def f(): pass",
            "language": "cpp",
            "history": [
                { "role": "user", "content": "Why slow?" },
                { "role": "assistant", "content": "Nested loops." }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "Use a set." })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatRequest {
        message: "Make it O(n)?".to_owned(),
        code_context: "def f(): pass".to_owned(),
        language: Language::Cpp,
        history: vec![
            ConversationEntry::user("Why slow?"),
            ConversationEntry::assistant("Nested loops."),
        ],
    };
    let reply = client_for(&server).chat(&request).await.unwrap();
    assert_eq!(reply, "Use a set.");
}

#[tokio::test]
async fn feedback_posts_numeric_rating() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/feedback"))
        .and(body_json(json!({
            "function_name": "f",
            "code": "def f(): pass",
            "explanation": "Does nothing.",
            "rating": -1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "saved" })))
        .expect(1)
        .mount(&server)
        .await;

    let request = FeedbackRequest {
        function_name: "f".to_owned(),
        code: "def f(): pass".to_owned(),
        explanation: "Does nothing.".to_owned(),
        rating: Rating::NotHelpful,
    };
    client_for(&server).feedback(&request).await.unwrap();
}

#[tokio::test]
async fn unreachable_service_is_a_transport_failure() {
    // Port 9 (discard) on localhost is closed in test environments.
    let client = HttpReviewService::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let err = client.analyze(&analysis_request()).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
    assert_eq!(err.user_message(), CONNECTIVITY_MESSAGE);
}

#[tokio::test]
async fn slow_service_times_out_and_leaves_loading() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "results": [] }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = HttpReviewService::new(&server.uri(), Duration::from_millis(50)).unwrap();
    let mut session = SessionController::new(SourceDocument::default());
    let pending = session.begin_analysis().unwrap();
    assert_eq!(session.status(), SessionStatus::Loading);

    let outcome = client.analyze(&pending.request).await;
    assert!(matches!(outcome, Err(ApiError::Transport(_))), "got {outcome:?}");

    assert!(session.finish_analysis(&pending, outcome));
    assert_eq!(session.status(), SessionStatus::Error);
    assert_eq!(session.error(), Some(CONNECTIVITY_MESSAGE));
    assert!(session.displayed_result().is_none());
}
