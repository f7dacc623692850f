//! 审查 HTTP 服务
//!
//! 暴露单个 `POST /api/codereview` 接口：请求体带代码与系统提示词，
//! 服务端拼装完整提示词后交给配置的 AI 提供商生成审查文本。

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::ai::{create_provider, AiProvider};
use crate::config::Config;
use crate::review::compose_provider_prompt;

/// 服务端共享上下文
pub struct ReviewServerContext {
    pub provider: Box<dyn AiProvider>,
}

/// `/api/codereview` 请求体
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeReviewRequest {
    pub code: String,
    pub system_instruction: String,
}

pub fn build_router(ctx: Arc<ReviewServerContext>) -> Router {
    Router::new()
        .route("/api/codereview", post(code_review))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

pub async fn run_server(config: &Config, port: u16) -> Result<()> {
    let provider = create_provider(config)?;
    info!("review provider: {}", provider.name());

    let ctx = Arc::new(ReviewServerContext { provider });
    let bind = format!("127.0.0.1:{port}");
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("Code review API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

/// 生成一次代码审查
///
/// 成功返回 `{"text": ...}`；提供商出错时记录真实原因，对外只返回
/// 统一的错误消息。
pub async fn code_review(
    State(ctx): State<Arc<ReviewServerContext>>,
    Json(body): Json<CodeReviewRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let prompt = compose_provider_prompt(&body.system_instruction, &body.code);

    match ctx.provider.generate_review(&prompt).await {
        Ok(text) => Ok(Json(json!({ "text": text }))),
        Err(e) => {
            error!("Error generating content: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to generate content" })),
            ))
        }
    }
}
