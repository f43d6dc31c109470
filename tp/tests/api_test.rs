//! HTTP server tests over a real socket

mod common;

use std::sync::Arc;

use reqwest::header::{ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN};
use serde_json::Value;
use tokio::net::TcpListener;

use common::{PanickingClient, ScriptedClient, TODO_DEPENDENCIES, TODO_TASKS, TODO_TIMELINE, pipeline};
use taskplanner::api::{ApiServer, ApiServerConfig};
use taskplanner::llm::LlmClient;

async fn spawn_server(client: Arc<dyn LlmClient>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = ApiServer::new(ApiServerConfig::default(), Arc::new(pipeline(client)));
    tokio::spawn(server.serve(listener));
    format!("http://{}", addr)
}

fn data_events(body: &str) -> Vec<Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|json| serde_json::from_str(json.trim()).unwrap())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let base = spawn_server(ScriptedClient::new(&[])).await;
    let response = reqwest::get(format!("{}/api/health", base)).await.unwrap();

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_generate_plan_event_sequence() {
    let base = spawn_server(ScriptedClient::new(&[TODO_TASKS, TODO_TIMELINE, TODO_DEPENDENCIES])).await;
    let response = reqwest::Client::new()
        .post(format!("{}/api/generate-plan", base))
        .json(&serde_json::json!({"project_statement": "Build a todo app"}))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let events = data_events(&response.text().await.unwrap());
    let steps: Vec<(&str, &str)> = events
        .iter()
        .map(|e| (e["status"].as_str().unwrap(), e["agent"].as_str().unwrap()))
        .collect();
    assert_eq!(
        steps,
        vec![
            ("starting", "system"),
            ("running", "planner"),
            ("running", "timeline"),
            ("running", "dependency"),
            ("running", "formatter"),
            ("completed", "system"),
        ]
    );

    let last = events.last().unwrap();
    assert_eq!(last["message"], "Plan generation completed!");
    assert_eq!(last["data"]["project_statement"], "Build a todo app");
    assert_eq!(last["data"]["formatted_output"]["summary"]["total_tasks"], 1);
    assert!(events[..5].iter().all(|e| e.get("data").is_none()));
}

#[tokio::test]
async fn test_generate_plan_with_failing_model_still_completes() {
    let base = spawn_server(ScriptedClient::new(&[])).await;
    let body = reqwest::Client::new()
        .post(format!("{}/api/generate-plan", base))
        .json(&serde_json::json!({"project_statement": "Build a todo app"}))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    let events = data_events(&body);
    let last = events.last().unwrap();
    assert_eq!(last["status"], "completed");
    assert_eq!(last["data"]["errors"].as_array().unwrap().len(), 1);
    assert_eq!(last["data"]["formatted_output"]["summary"]["total_tasks"], 0);
}

#[tokio::test]
async fn test_generate_plan_reports_crashed_pipeline() {
    let base = spawn_server(Arc::new(PanickingClient)).await;
    let body = reqwest::Client::new()
        .post(format!("{}/api/generate-plan", base))
        .json(&serde_json::json!({"project_statement": "Build a todo app"}))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    let events = data_events(&body);
    assert_eq!(events[0]["status"], "starting");
    assert_eq!(events[1]["status"], "running");

    let last = events.last().unwrap();
    assert_eq!(last["status"], "error");
    assert_eq!(last["agent"], "system");
    assert!(last["message"].as_str().unwrap().starts_with("Error:"));
    assert!(last.get("data").is_none());
    assert!(events.iter().all(|e| e["status"] != "completed"));
}

#[tokio::test]
async fn test_generate_plan_rejects_missing_statement() {
    let base = spawn_server(ScriptedClient::new(&[])).await;
    let response = reqwest::Client::new()
        .post(format!("{}/api/generate-plan", base))
        .json(&serde_json::json!({"statement": "wrong field"}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let base = spawn_server(ScriptedClient::new(&[])).await;
    let client = reqwest::Client::new();

    let allowed = client
        .get(format!("{}/api/health", base))
        .header(ORIGIN, "http://localhost:5173")
        .send()
        .await
        .unwrap();
    assert_eq!(allowed.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:5173");
    assert_eq!(allowed.headers()[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

    let denied = client
        .get(format!("{}/api/health", base))
        .header(ORIGIN, "http://evil.example")
        .send()
        .await
        .unwrap();
    assert!(denied.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
