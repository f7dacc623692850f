use std::env;
use std::path::PathBuf;

/// 默认的审查服务地址，`--serve` 模式与客户端共用同一端口
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: String,
    pub model: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_url: String,
    pub ollama_url: String,
    pub api_url: String,
    pub debug: bool,
}

impl Config {
    pub fn new() -> Self {
        // 默认配置
        let mut config = Config {
            provider: "gemini".to_string(),
            model: None,
            gemini_api_key: None,
            gemini_url: "https://generativelanguage.googleapis.com".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            debug: false,
        };

        // 加载配置文件
        #[cfg(not(test))]
        config.load_from_env_file();
        // 加载环境变量（覆盖配置文件）
        config.load_from_env();

        config
    }

    pub fn load_from_env_file(&mut self) {
        // 尝试从用户主目录加载
        if let Ok(home) = env::var("HOME") {
            let user_env_path = PathBuf::from(format!("{}/.ai-review/.env", home));
            if user_env_path.exists() {
                dotenvy::from_path(user_env_path).ok();
            }
        }

        // 尝试从当前目录加载
        dotenvy::dotenv().ok();
    }

    pub fn load_from_env(&mut self) {
        if let Ok(provider) = env::var("AI_REVIEW_PROVIDER") {
            self.provider = provider;
        }
        if let Ok(model) = env::var("AI_REVIEW_MODEL") {
            self.model = Some(model);
        }
        // 兼容审查服务原生的 GEMINI_API_KEY 变量名
        if let Ok(api_key) = env::var("AI_REVIEW_GEMINI_API_KEY") {
            self.gemini_api_key = Some(api_key);
        } else if let Ok(api_key) = env::var("GEMINI_API_KEY") {
            self.gemini_api_key = Some(api_key);
        }
        if let Ok(url) = env::var("AI_REVIEW_GEMINI_URL") {
            self.gemini_url = url;
        }
        if let Ok(url) = env::var("AI_REVIEW_OLLAMA_URL") {
            self.ollama_url = url;
        }
        if let Ok(url) = env::var("AI_REVIEW_API_URL") {
            self.api_url = url;
        }
        if let Ok(debug) = env::var("AI_REVIEW_DEBUG") {
            self.debug = debug == "1" || debug.eq_ignore_ascii_case("true");
        }
    }

    pub fn update_from_args(&mut self, args: &crate::cli::args::Args) {
        // 命令行参数优先级最高
        if !args.provider.is_empty() {
            self.provider = args.provider.clone();
        }
        if !args.model.is_empty() {
            self.model = Some(args.model.clone());
        }
        if !args.api_url.is_empty() {
            self.api_url = args.api_url.clone();
        }
        if args.debug {
            self.debug = true;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        // 验证配置的有效性
        match self.provider.as_str() {
            "gemini" => {
                if self.gemini_api_key.is_none() {
                    anyhow::bail!("Gemini API key is required but not set. Please set AI_REVIEW_GEMINI_API_KEY environment variable or in .env file");
                }
            }
            "ollama" => {
                // Ollama 使用本地服务，不需要 API key
            }
            _ => {
                anyhow::bail!("Unsupported provider: {}", self.provider);
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
