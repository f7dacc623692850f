use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ai::AiProvider;

/// Gemini AI 提供商
///
/// 走 generateContent REST 接口，密钥通过 URL query 传递。
#[derive(Debug)]
pub struct GeminiProvider {
    client: Arc<reqwest::Client>,
    config: GeminiProviderConfig,
}

#[derive(Debug, Clone)]
struct GeminiProviderConfig {
    api_key: String,
    base_url: String,
    model: String,
}

/// Gemini API 请求结构
#[derive(Debug, Serialize)]
struct GeminiApiRequest {
    contents: Vec<GeminiContent>,
}

/// 对话内容，请求与响应共用
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

/// Gemini API 响应结构
#[derive(Debug, Deserialize)]
struct GeminiApiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

/// Gemini 错误响应
#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

impl GeminiProvider {
    /// 创建新的 Gemini 提供商
    pub fn new(
        client: Arc<reqwest::Client>,
        api_key: String,
        base_url: Option<String>,
        model: Option<String>,
    ) -> Self {
        let config = GeminiProviderConfig {
            api_key,
            base_url: base_url
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string()),
            model: model.unwrap_or_else(|| "gemini-2.0-flash".to_string()),
        };

        Self { client, config }
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            self.config.api_key
        )
    }

    async fn send_request(&self, request: &GeminiApiRequest) -> Result<GeminiApiResponse> {
        let response = self
            .client
            .post(self.generate_url())
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send request to Gemini: {}", e))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read Gemini response: {}", e))?;

        if !status.is_success() {
            // 尝试解析错误响应
            if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(&response_text)
            {
                return Err(anyhow!("Gemini API error: {}", error_response.error.message));
            } else {
                return Err(anyhow!("Gemini API error {}: {}", status, response_text));
            }
        }

        let api_response: GeminiApiResponse = serde_json::from_str(&response_text)
            .map_err(|e| anyhow!("Failed to parse Gemini response: {}", e))?;

        Ok(api_response)
    }

    /// 拼合首个候选的全部文本分片
    fn extract_text(response: GeminiApiResponse) -> Result<String> {
        let text = response
            .candidates
            .and_then(|mut candidates| {
                if candidates.is_empty() {
                    None
                } else {
                    candidates.swap_remove(0).content
                }
            })
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            })
            .ok_or_else(|| anyhow!("Gemini API returned no candidates"))?;

        Ok(text)
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate_review(&self, prompt: &str) -> Result<String> {
        let request = GeminiApiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self.send_request(&request).await?;
        Self::extract_text(response)
    }

    fn is_available(&self) -> bool {
        !self.config.api_key.is_empty() && !self.config.model.is_empty()
    }
}
