use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;

use crate::config::Config;

pub mod providers;

pub use providers::{GeminiProvider, OllamaProvider};

// 全局 HTTP 客户端复用，生成审查耗时较长所以超时放宽
static PROVIDER_CLIENT: Lazy<Arc<Client>> = Lazy::new(|| {
    Arc::new(
        Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client"),
    )
});

/// AI 提供商统一接口
///
/// 接收拼装好的完整提示词，返回模型生成的审查 Markdown。
#[async_trait]
pub trait AiProvider: Send + Sync + std::fmt::Debug {
    /// 提供商名称
    fn name(&self) -> &str;

    /// 生成一段代码审查文本
    async fn generate_review(&self, prompt: &str) -> Result<String>;

    /// 检查当前配置下提供商是否可用
    fn is_available(&self) -> bool;
}

/// 按配置创建提供商实例
pub fn create_provider(config: &Config) -> Result<Box<dyn AiProvider>> {
    let client = Arc::clone(&PROVIDER_CLIENT);
    match config.provider.as_str() {
        "gemini" => Ok(Box::new(GeminiProvider::new(
            client,
            config.gemini_api_key.clone().unwrap_or_default(),
            Some(config.gemini_url.clone()),
            config.model.clone(),
        ))),
        "ollama" => Ok(Box::new(OllamaProvider::new(
            client,
            Some(config.ollama_url.clone()),
            config.model.clone(),
        ))),
        other => anyhow::bail!("Unsupported provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            provider: "gemini".to_string(),
            model: None,
            gemini_api_key: Some("test-key".to_string()),
            gemini_url: "https://generativelanguage.googleapis.com".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            api_url: "http://127.0.0.1:3000".to_string(),
            debug: false,
        }
    }

    #[test]
    fn test_create_gemini_provider() {
        let config = base_config();
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "gemini");
        assert!(provider.is_available());
    }

    #[test]
    fn test_create_ollama_provider() {
        let mut config = base_config();
        config.provider = "ollama".to_string();
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "ollama");
        assert!(provider.is_available());
    }

    #[test]
    fn test_create_unknown_provider_fails() {
        let mut config = base_config();
        config.provider = "chatgpt".to_string();
        let result = create_provider(&config);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unsupported provider"));
    }

    #[test]
    fn test_provider_client_singleton() {
        let client1 = &*PROVIDER_CLIENT;
        let client2 = &*PROVIDER_CLIENT;
        assert!(std::ptr::eq(client1, client2));
    }
}
