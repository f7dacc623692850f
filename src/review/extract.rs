use once_cell::sync::Lazy;
use regex::Regex;

// 第一个围栏代码块，语言标签可选，标签后必须换行
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:\w+)?\n(.*?)```").expect("Failed to compile fenced block regex")
});

/// 从审查文本中提取修复后的代码
///
/// 只取第一个围栏代码块的去空白内容，文本中没有围栏时返回 None。
pub fn extract_fixed_code(text: &str) -> Option<String> {
    FENCED_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|block| block.as_str().trim().to_string())
}
