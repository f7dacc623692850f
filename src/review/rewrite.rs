use once_cell::sync::Lazy;
use regex::Regex;

/// 评分小节的规范标题
pub const SCORE_HEADING: &str = "# 2️⃣ Code Score";

// 标题连同紧随其后的旧 "NN/100" 记号一并吞掉，避免新旧分数并存。
// 记号只在标题后的第一行内查找，不会越过后续小节。
static SCORE_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"# 2️⃣ Code Score(?:\s*.*?\d{1,3}\s*/?\s*100)?")
        .expect("Failed to compile score section regex")
});

/// 把归一化后的评分写回审查文本
///
/// 标题存在时替换整个评分小节，否则在文末追加；对同一评分重复调用结果不变。
pub fn inject_score(text: &str, score: u8) -> String {
    let section = format!("{}\n{}/100", SCORE_HEADING, score);
    if text.contains(SCORE_HEADING) {
        SCORE_SECTION.replace(text, section.as_str()).into_owned()
    } else {
        format!("{}\n\n{}", text, section)
    }
}
