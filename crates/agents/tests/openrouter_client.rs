use std::time::Duration;

use agents::openrouter::{ChatCompletionRequest, ChatMessage};
use agents::{AgentConfig, AgentError, AgentRoster, DebateAgents, OpenRouterClient, RetryPolicy};
use debate_core::{FramedIssue, Sector};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn quick_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        initial_backoff: Duration::from_millis(5),
        multiplier: 1.5,
    }
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "gen-1",
        "model": "test/model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    }))
}

fn client_for(server: &MockServer) -> OpenRouterClient {
    OpenRouterClient::new("test-key", server.uri()).with_retry_policy(quick_retry())
}

fn request() -> ChatCompletionRequest {
    ChatCompletionRequest::new("test/model", vec![ChatMessage::user("hello")])
}

#[tokio::test]
async fn rate_limited_request_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(completion("done"))
        .expect(1)
        .mount(&server)
        .await;

    let text = client_for(&server).complete(request(), "test").await.unwrap();
    assert_eq!(text, "done");
}

#[tokio::test]
async fn quota_message_counts_as_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"message": "Quota exceeded for this model"}
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(completion("recovered"))
        .mount(&server)
        .await;

    let text = client_for(&server).complete(request(), "test").await.unwrap();
    assert_eq!(text, "recovered");
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"message": "Internal failure"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .complete(request(), "test")
        .await
        .unwrap_err();
    match err {
        AgentError::Api {
            message,
            status_code,
        } => {
            assert_eq!(message, "Internal failure");
            assert_eq!(status_code, Some(500));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn retries_give_up_after_policy_limit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .expect(4)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .complete(request(), "test")
        .await
        .unwrap_err();
    assert!(err.is_rate_limited());
}

#[tokio::test]
async fn framing_uses_web_search_and_reads_fenced_json() {
    let server = MockServer::start().await;

    let body = "Here is the framing:\n```json\n{\"refined_issue\": \"Should the city cap rents?\", \
                \"definition\": \"Rent caps limit annual increases.\", \
                \"scope\": {\"country\": \"US\", \"timeframe\": \"2020-2025\"}, \
                \"positions\": {\"pro\": \"Caps protect tenants\", \"con\": \"Caps shrink supply\"}, \
                \"clarification_needed\": false}\n```";
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"plugins": [{"id": "web"}]})))
        .respond_with(completion(body))
        .expect(1)
        .mount(&server)
        .await;

    let roster = AgentRoster::new(client_for(&server), AgentConfig::default().with_retry(quick_retry()));
    let issue = roster.frame_issue("rent control").await.unwrap();
    assert_eq!(issue.refined_issue, "Should the city cap rents?");
    assert_eq!(issue.positions.con, "Caps shrink supply");
}

#[tokio::test]
async fn unreadable_research_answer_yields_empty_sector() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(completion("I could not find anything useful."))
        .mount(&server)
        .await;

    let roster = AgentRoster::new(client_for(&server), AgentConfig::default().with_retry(quick_retry()));
    let issue = FramedIssue::new("Should the city cap rents?");
    let items = roster
        .research_sector(&issue, Sector::PublicOpinion)
        .await
        .unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn research_scores_and_filters_items() {
    let server = MockServer::start().await;

    let data = json!({"data": [
        {"c": "Tenants back caps", "d": "Support reached **62%** in 2024.", "src": "Pew",
         "u": "https://example.org/poll", "pub_year": 2024, "source_tier": "Tier1",
         "has_stats": true, "op_fit": "Direct", "st_type": null},
        {"c": "Blog says no", "d": "Some people dislike caps.", "src": "Blog",
         "u": "https://blog.example.com", "pub_year": 2010, "source_tier": "Tier3",
         "has_stats": false, "op_fit": "Weak", "st_type": null}
    ]});
    Mock::given(method("POST"))
        .respond_with(completion(&data.to_string()))
        .mount(&server)
        .await;

    let config = AgentConfig::default()
        .with_retry(quick_retry())
        .with_current_year(2025);
    let roster = AgentRoster::new(client_for(&server), config);
    let issue = FramedIssue::new("Should the city cap rents?");
    let items = roster
        .research_sector(&issue, Sector::PublicOpinion)
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "EV-PUB-01");
    assert_eq!(items[0].score, 100);
}
