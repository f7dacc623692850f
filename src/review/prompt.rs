use once_cell::sync::Lazy;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

// 审查指令模板缓存
static PROMPT_CACHE: Lazy<RwLock<Option<String>>> = Lazy::new(|| RwLock::new(None));

const DEFAULT_PROMPT_FILE: &str = "review-prompt.txt";

fn home_prompt_path() -> Option<PathBuf> {
    env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".ai-review").join(DEFAULT_PROMPT_FILE))
}

// 加载审查指令模板（仅执行一次）
//
// 查找顺序：当前目录、AI_REVIEW_PROMPT_FILE 指定的路径、用户目录，
// 都不可用时退回编译期内置的模板。
fn load_prompt_template() -> String {
    let mut candidates = vec![PathBuf::from(DEFAULT_PROMPT_FILE)];
    if let Ok(path) = env::var("AI_REVIEW_PROMPT_FILE") {
        candidates.push(PathBuf::from(path));
    }
    if let Some(path) = home_prompt_path() {
        candidates.push(path);
    }

    for path in candidates {
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => return content,
                Err(e) => {
                    eprintln!("无法读取提示词文件 {}: {}，使用内置模板", path.display(), e);
                }
            }
        }
    }

    include_str!("../../review-prompt.txt").to_owned()
}

/// 获取审查系统指令，首次调用后走缓存
pub fn get_review_prompt() -> String {
    {
        let cache = PROMPT_CACHE.read().unwrap();
        if let Some(ref template) = *cache {
            return template.clone();
        }
    }

    let template = load_prompt_template();
    *PROMPT_CACHE.write().unwrap() = Some(template.clone());
    template
}

/// 组装发给模型的完整提示词
pub fn compose_provider_prompt(system_instruction: &str, code: &str) -> String {
    format!(
        "{}\n\nHere is the code to review:\n{}",
        system_instruction, code
    )
}
