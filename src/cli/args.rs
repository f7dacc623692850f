use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(
    name = "ai-review",
    version,
    about = "AI 代码审查工具 - 粘贴代码即可获得带评分的审查报告",
    long_about = "ai-review 把一段代码交给 AI 审查：先做启发式语言检测并与声明语言比对，匹配后请求审查服务，输出带 0-100 评分、问题清单与修复代码的 Markdown 报告。支持命令行、HTTP 服务和终端界面三种形态。"
)]
pub struct Args {
    /// 待审查的代码文件（不指定时从标准输入读取）
    #[arg(short = 'f', long, value_name = "PATH")]
    pub file: Option<String>,

    /// 声明的编程语言（javascript, python, java, c, cpp, csharp, go, php, sql）
    #[arg(short = 'l', long, default_value = "javascript")]
    pub language: String,

    /// AI provider to use (gemini or ollama)
    #[arg(short = 'P', long, default_value = "")] // 空字符串表示未指定
    pub provider: String,

    /// Model to use (default: provider 自带默认值)
    #[arg(short = 'm', long, default_value = "")] // 空字符串表示未指定
    pub model: String,

    /// 审查服务地址（如 http://127.0.0.1:3000）
    #[arg(long = "api-url", value_name = "URL", default_value = "")]
    pub api_url: String,

    /// 启动审查 HTTP 服务
    #[arg(long = "serve", default_value_t = false)]
    pub serve: bool,

    /// 审查服务监听端口
    #[arg(long = "port", value_name = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// 启动终端交互界面
    #[arg(long = "tui", default_value_t = false)]
    pub tui: bool,

    /// 把审查报告写到指定文件
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<String>,

    /// 审查完成后把修复代码写回 --file 指定的文件
    #[arg(long = "apply", default_value_t = false)]
    pub apply: bool,

    /// 打印当前生效的审查提示词后退出
    #[arg(long = "show-prompt", default_value_t = false)]
    pub show_prompt: bool,

    /// 输出调试信息
    #[arg(short = 'd', long = "debug", default_value_t = false)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_args_default_values() {
        // 测试默认参数解析
        let args = Args::try_parse_from(["ai-review"]).unwrap();

        assert_eq!(args.file, None);
        assert_eq!(args.language, "javascript");
        assert_eq!(args.provider, "");
        assert_eq!(args.model, "");
        assert_eq!(args.api_url, "");
        assert!(!args.serve);
        assert_eq!(args.port, 3000);
        assert!(!args.tui);
        assert_eq!(args.output, None);
        assert!(!args.apply);
        assert!(!args.show_prompt);
        assert!(!args.debug);
    }

    #[test]
    fn test_args_short_flags() {
        // 测试短参数
        let args = Args::try_parse_from([
            "ai-review",
            "-f",
            "main.py",
            "-l",
            "python",
            "-P",
            "ollama",
            "-m",
            "qwen2.5-coder:7b",
            "-o",
            "review.md",
            "-d",
        ])
        .unwrap();

        assert_eq!(args.file, Some("main.py".to_string()));
        assert_eq!(args.language, "python");
        assert_eq!(args.provider, "ollama");
        assert_eq!(args.model, "qwen2.5-coder:7b");
        assert_eq!(args.output, Some("review.md".to_string()));
        assert!(args.debug);
    }

    #[test]
    fn test_args_long_flags() {
        // 测试长参数
        let args = Args::try_parse_from([
            "ai-review",
            "--file",
            "query.sql",
            "--language",
            "sql",
            "--provider",
            "gemini",
            "--model",
            "gemini-2.0-flash",
            "--api-url",
            "http://127.0.0.1:8099",
            "--output",
            "report.md",
            "--apply",
        ])
        .unwrap();

        assert_eq!(args.file, Some("query.sql".to_string()));
        assert_eq!(args.language, "sql");
        assert_eq!(args.provider, "gemini");
        assert_eq!(args.model, "gemini-2.0-flash");
        assert_eq!(args.api_url, "http://127.0.0.1:8099");
        assert_eq!(args.output, Some("report.md".to_string()));
        assert!(args.apply);
    }

    #[test]
    fn test_args_serve_mode() {
        let args = Args::try_parse_from(["ai-review", "--serve", "--port", "8099"]).unwrap();
        assert!(args.serve);
        assert_eq!(args.port, 8099);

        // 不带 --port 时使用默认端口
        let args = Args::try_parse_from(["ai-review", "--serve"]).unwrap();
        assert!(args.serve);
        assert_eq!(args.port, 3000);
    }

    #[test]
    fn test_args_tui_mode() {
        let args = Args::try_parse_from(["ai-review", "--tui"]).unwrap();
        assert!(args.tui);
        assert!(!args.serve);
    }

    #[test]
    fn test_args_show_prompt() {
        let args = Args::try_parse_from(["ai-review", "--show-prompt"]).unwrap();
        assert!(args.show_prompt);
    }

    #[test]
    fn test_args_language_variations() {
        // 别名留给运行期归一化处理，参数层照单全收
        let languages = vec![
            "javascript",
            "python",
            "java",
            "c",
            "cpp",
            "csharp",
            "go",
            "php",
            "sql",
            "JS",
        ];

        for language in languages {
            let args = Args::try_parse_from(["ai-review", "-l", language]).unwrap();
            assert_eq!(args.language, language);
        }
    }

    #[test]
    fn test_args_provider_variations() {
        for provider in ["gemini", "ollama"] {
            let args = Args::try_parse_from(["ai-review", "-P", provider]).unwrap();
            assert_eq!(args.provider, provider);

            let args = Args::try_parse_from(["ai-review", "--provider", provider]).unwrap();
            assert_eq!(args.provider, provider);
        }
    }

    #[test]
    fn test_args_apply_requires_separate_flag() {
        // --apply 与 --file 组合
        let args =
            Args::try_parse_from(["ai-review", "--file", "app.js", "--apply"]).unwrap();
        assert_eq!(args.file, Some("app.js".to_string()));
        assert!(args.apply);
    }

    #[test]
    fn test_args_mixed_flags() {
        // 测试混合使用短参数和长参数
        let args = Args::try_parse_from([
            "ai-review",
            "-f",
            "service.go",
            "--language",
            "go",
            "-P",
            "ollama",
            "--debug",
        ])
        .unwrap();

        assert_eq!(args.file, Some("service.go".to_string()));
        assert_eq!(args.language, "go");
        assert_eq!(args.provider, "ollama");
        assert!(args.debug);
    }

    #[test]
    fn test_args_help_and_version() {
        // help 和 version 会提前退出，解析返回错误是预期行为
        let result = Args::try_parse_from(["ai-review", "--help"]);
        assert!(result.is_err());

        let result = Args::try_parse_from(["ai-review", "--version"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_args_invalid_arguments() {
        let result = Args::try_parse_from(["ai-review", "--invalid-flag"]);
        assert!(result.is_err());

        let result = Args::try_parse_from(["ai-review", "-x"]);
        assert!(result.is_err());

        // 端口必须是数字
        let result = Args::try_parse_from(["ai-review", "--serve", "--port", "abc"]);
        assert!(result.is_err());
    }
}
