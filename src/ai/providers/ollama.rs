use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ai::AiProvider;

/// Ollama AI 提供商
#[derive(Debug)]
pub struct OllamaProvider {
    client: Arc<reqwest::Client>,
    config: OllamaProviderConfig,
}

#[derive(Debug, Clone)]
struct OllamaProviderConfig {
    base_url: String,
    model: String,
}

/// Ollama API 请求结构
#[derive(Debug, Serialize)]
struct OllamaApiRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Ollama API 响应结构
#[derive(Debug, Deserialize)]
struct OllamaApiResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

/// Ollama 错误响应
#[derive(Debug, Deserialize)]
struct OllamaErrorResponse {
    error: String,
}

impl OllamaProvider {
    /// 创建新的 Ollama 提供商
    pub fn new(
        client: Arc<reqwest::Client>,
        base_url: Option<String>,
        model: Option<String>,
    ) -> Self {
        let config = OllamaProviderConfig {
            base_url: base_url.unwrap_or_else(|| "http://localhost:11434".to_string()),
            model: model.unwrap_or_else(|| "qwen2.5-coder:7b".to_string()),
        };

        Self { client, config }
    }

    /// 发送非流式请求
    async fn send_request(&self, request: &OllamaApiRequest<'_>) -> Result<OllamaApiResponse> {
        let url = format!(
            "{}/api/generate",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send request to Ollama: {}", e))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read Ollama response: {}", e))?;

        if !status.is_success() {
            // 尝试解析错误响应
            if let Ok(error_response) = serde_json::from_str::<OllamaErrorResponse>(&response_text)
            {
                return Err(anyhow!("Ollama API error: {}", error_response.error));
            } else {
                return Err(anyhow!("Ollama API error {}: {}", status, response_text));
            }
        }

        let api_response: OllamaApiResponse = serde_json::from_str(&response_text)
            .map_err(|e| anyhow!("Failed to parse Ollama response: {}", e))?;

        Ok(api_response)
    }
}

#[async_trait]
impl AiProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate_review(&self, prompt: &str) -> Result<String> {
        let request = OllamaApiRequest {
            model: &self.config.model,
            prompt,
            stream: false,
        };

        let response = self.send_request(&request).await?;
        Ok(response.response)
    }

    fn is_available(&self) -> bool {
        !self.config.base_url.is_empty() && !self.config.model.is_empty()
    }
}
