/// 端到端测试：HTTP 审查端点
///
/// 真实起一个审查服务监听随机端口，供应商一侧用 wiremock
/// 顶替 Ollama，验证请求转发、提示词拼接与错误降级。
use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ai_review::ai::providers::OllamaProvider;
use ai_review::server::{build_router, ReviewServerContext};

/// 起一个指向给定供应商地址的审查服务，返回其基础 URL
async fn spawn_review_server(provider_base: &str) -> String {
    let provider = OllamaProvider::new(
        Arc::new(reqwest::Client::new()),
        Some(provider_base.to_string()),
        Some("test-model".to_string()),
    );
    let ctx = Arc::new(ReviewServerContext {
        provider: Box::new(provider),
    });
    let router = build_router(ctx);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_code_review_endpoint_forwards_to_provider() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "# 1️⃣ Review Report\nall good\n",
            "done": true
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let base = spawn_review_server(&provider.uri()).await;

    let reply = reqwest::Client::new()
        .post(format!("{}/api/codereview", base))
        .json(&json!({
            "code": "def add(a, b):\n    return a + b\n",
            "systemInstruction": "Review the code."
        }))
        .send()
        .await
        .expect("request review");

    assert_eq!(reply.status().as_u16(), 200);
    let body: Value = reply.json().await.expect("json reply");
    assert_eq!(body["text"], json!("# 1️⃣ Review Report\nall good\n"));

    // 系统指令与代码拼进同一个提示词转发给供应商
    let requests = provider.received_requests().await.expect("provider called");
    assert_eq!(requests.len(), 1);
    let forwarded: Value = requests[0].body_json().expect("valid provider body");
    assert_eq!(forwarded["model"], json!("test-model"));
    assert_eq!(forwarded["stream"], json!(false));
    let prompt = forwarded["prompt"].as_str().expect("prompt is a string");
    assert!(prompt.starts_with("Review the code."));
    assert!(prompt.contains("\n\nHere is the code to review:\n"));
    assert!(prompt.ends_with("def add(a, b):\n    return a + b\n"));
}

#[tokio::test]
async fn test_code_review_endpoint_masks_provider_failure() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "error": "model not found" })),
        )
        .expect(1)
        .mount(&provider)
        .await;

    let base = spawn_review_server(&provider.uri()).await;

    let reply = reqwest::Client::new()
        .post(format!("{}/api/codereview", base))
        .json(&json!({
            "code": "def add(a, b):\n    return a + b\n",
            "systemInstruction": "Review the code."
        }))
        .send()
        .await
        .expect("request review");

    // 供应商细节不外泄，统一返回固定错误体
    assert_eq!(reply.status().as_u16(), 500);
    let body: Value = reply.json().await.expect("json reply");
    assert_eq!(body, json!({ "error": "Failed to generate content" }));
}

#[tokio::test]
async fn test_code_review_endpoint_rejects_incomplete_body() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "unused",
            "done": true
        })))
        .expect(0)
        .mount(&provider)
        .await;

    let base = spawn_review_server(&provider.uri()).await;

    // 缺少 systemInstruction 字段
    let reply = reqwest::Client::new()
        .post(format!("{}/api/codereview", base))
        .json(&json!({ "code": "def f():\n    pass\n" }))
        .send()
        .await
        .expect("request review");
    assert_eq!(reply.status().as_u16(), 422);

    // snake_case 字段名不被接受
    let reply = reqwest::Client::new()
        .post(format!("{}/api/codereview", base))
        .json(&json!({
            "code": "def f():\n    pass\n",
            "system_instruction": "Review the code."
        }))
        .send()
        .await
        .expect("request review");
    assert_eq!(reply.status().as_u16(), 422);
}
