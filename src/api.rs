use anyhow::Result;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::review::prompt::get_review_prompt;

// 全局 HTTP 客户端复用
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("Failed to create HTTP client")
});

/// 审查接口请求体，与服务端字段一致
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequestBody<'a> {
    pub code: &'a str,
    pub system_instruction: &'a str,
}

/// 审查接口响应体，成功与失败分支互斥
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ReviewReplyBody {
    Success { text: String },
    Failure { error: String },
}

/// `/api/codereview` 接口客户端
#[derive(Debug, Clone)]
pub struct ReviewApiClient {
    endpoint: String,
}

impl ReviewApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            endpoint: format!("{}/api/codereview", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 发送一次审查请求，返回模型生成的审查文本
    ///
    /// 非 2xx 响应优先取响应体里的 error 字段作为错误消息，
    /// 取不到时退化为带状态码的通用消息。
    pub async fn request_review(&self, code: &str) -> Result<String> {
        let system_instruction = get_review_prompt();
        let body = ReviewRequestBody {
            code,
            system_instruction: &system_instruction,
        };

        let res = HTTP_CLIENT.post(&self.endpoint).json(&body).send().await?;

        let status = res.status();
        if !status.is_success() {
            let body_text = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body_text)
                .ok()
                .and_then(|value| {
                    value
                        .get("error")
                        .and_then(|error| error.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| format!("Request failed with {}", status.as_u16()));
            anyhow::bail!(message);
        }

        match res.json::<ReviewReplyBody>().await? {
            ReviewReplyBody::Success { text } => Ok(text),
            // 成功状态码却带着错误体，按空响应处理
            ReviewReplyBody::Failure { .. } => Ok(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = ReviewApiClient::new("http://127.0.0.1:3000");
        assert_eq!(client.endpoint(), "http://127.0.0.1:3000/api/codereview");

        let client = ReviewApiClient::new("http://127.0.0.1:3000/");
        assert_eq!(client.endpoint(), "http://127.0.0.1:3000/api/codereview");
    }

    #[test]
    fn test_request_body_uses_camel_case() {
        let body = ReviewRequestBody {
            code: "let x = 1;",
            system_instruction: "review it",
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"systemInstruction\""));
        assert!(json.contains("\"code\""));
    }

    #[test]
    fn test_reply_body_success_variant() {
        let reply: ReviewReplyBody = serde_json::from_str(r#"{"text": "the review"}"#).unwrap();
        assert!(matches!(reply, ReviewReplyBody::Success { text } if text == "the review"));
    }

    #[test]
    fn test_reply_body_failure_variant() {
        let reply: ReviewReplyBody =
            serde_json::from_str(r#"{"error": "Failed to generate content"}"#).unwrap();
        assert!(
            matches!(reply, ReviewReplyBody::Failure { error } if error == "Failed to generate content")
        );
    }
}
