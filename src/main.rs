use std::io::Read;
use std::path::Path;
use std::time::Instant;

use anyhow::Context;

use ai_review::api::ReviewApiClient;
use ai_review::cli::args::Args;
use ai_review::config::Config;
use ai_review::languages::{detect, Language};
use ai_review::review::{
    get_review_prompt, score_label, Notifier, ReviewOrchestrator, ReviewRequest, LOW_CONFIDENCE,
};
use ai_review::server;
use ai_review::tui;
use clap::Parser;

/// 命令行提示出口：成功类消息走标准输出，告警与错误走标准错误
struct CliNotifier;

impl Notifier for CliNotifier {
    fn success(&self, message: &str) {
        println!("{message}");
    }

    fn warn(&self, message: &str) {
        eprintln!("{message}");
    }

    fn error(&self, message: &str) {
        eprintln!("{message}");
    }

    fn info(&self, message: &str) {
        println!("{message}");
    }
}

fn init_tracing(args: &Args, config: &Config) {
    let default_directive = if config.debug {
        "debug"
    } else if args.serve {
        "info"
    } else {
        "warn"
    };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_directive.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}

/// 读取待审查代码，返回代码内容与来源文件名
fn read_input(args: &Args) -> anyhow::Result<(String, Option<String>)> {
    if let Some(path) = &args.file {
        let code = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path))?;
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        Ok((code, Some(name)))
    } else {
        let mut code = String::new();
        std::io::stdin().read_to_string(&mut code)?;
        Ok((code, None))
    }
}

async fn handle_review(args: &Args, config: &Config) -> anyhow::Result<()> {
    let (code, source_name) = read_input(args)?;
    let mut declared: Language = args.language.parse().map_err(anyhow::Error::msg)?;

    let notifier = CliNotifier;

    // 文件模式下按内容自动校正声明语言，检测不可信时保持原样
    if let Some(name) = &source_name {
        let detection = detect(&code);
        match Language::from_label(&detection.label) {
            Some(language) if detection.relevance >= LOW_CONFIDENCE => {
                declared = language;
                notifier.info(&format!("📄 Loaded {} ({})", name, language.as_str()));
            }
            _ => notifier.info(&format!("📄 Loaded {}", name)),
        }
    }

    let mut orchestrator = ReviewOrchestrator::new(ReviewApiClient::new(&config.api_url));
    let request = ReviewRequest::new(code, declared);

    let start_time = Instant::now();
    let completed = match orchestrator.run_review(&request, &notifier).await {
        Ok(completed) => completed,
        // 拒绝原因已经通过 notifier 提示过了
        Err(_) => std::process::exit(1),
    };
    let elapsed_time = start_time.elapsed();

    if config.debug {
        println!("AI 生成审查报告耗时: {:.2?}", elapsed_time);
    }

    println!();
    println!("{}", completed.review);
    println!();
    println!(
        "📊 Code Score: {}/100 {}",
        completed.score,
        score_label(completed.score)
    );

    if let Some(output_file) = &args.output {
        std::fs::write(output_file, &completed.review)
            .with_context(|| format!("Failed to write report to: {}", output_file))?;
        println!("✅ 审查报告已保存到: {}", output_file);
    }

    if args.apply {
        match (&completed.fixed_code, &args.file) {
            (Some(fixed), Some(path)) => {
                std::fs::write(path, fixed)
                    .with_context(|| format!("Failed to write fixed code to: {}", path))?;
                println!("✅ 修复代码已写回: {}", path);
            }
            (None, _) => eprintln!("❌ No fixed code found in the review."),
            (_, None) => eprintln!("⚠️ --apply 需要配合 --file 使用"),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = Config::new();

    config.update_from_args(&args);
    init_tracing(&args, &config);

    // 查看当前生效的审查提示词
    if args.show_prompt {
        print!("{}", get_review_prompt());
        return Ok(());
    }

    // 服务模式
    if args.serve {
        config.validate()?;
        server::run_server(&config, args.port).await?;
        return Ok(());
    }

    // 终端交互界面
    if args.tui {
        tui::run(&args, &config).await?;
        return Ok(());
    }

    handle_review(&args, &config).await
}
