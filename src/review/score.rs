use once_cell::sync::Lazy;
use regex::Regex;

// 审查文本中的 "NN/100" 评分记号，斜杠可省略
static SCORE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,3})\s*/?\s*100").expect("Failed to compile score token regex")
});

/// 从审查文本中提取原始评分
///
/// 取第一个 "NN/100" 记号的数字部分并收敛到 [0, 100]，找不到时返回 0。
pub fn extract_raw_score(text: &str) -> u8 {
    SCORE_TOKEN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse::<u32>().ok())
        .map(|score| score.min(100) as u8)
        .unwrap_or(0)
}

/// 根据审查文本中的定性关键词归一化评分
///
/// 关键词按固定次序检查，先命中者生效；定性描述比数字更可信，
/// 全部未命中时退回收敛后的原始评分。
pub fn normalize_score(text: &str, raw_score: u8) -> u8 {
    let lower = text.to_lowercase();

    if lower.contains("dangerous") {
        return 30;
    }
    if lower.contains("poor") {
        return 55;
    }
    if lower.contains("good") && !lower.contains("very") {
        return 65;
    }
    if lower.contains("very good") {
        return 75;
    }
    if lower.contains("excellent") || lower.contains("perfect") {
        return 100;
    }

    raw_score.min(100)
}

/// 评分对应的用户可见档位描述
pub fn score_label(score: u8) -> &'static str {
    if score < 50 {
        "❌ Dangerous (Unusable code, cannot run)"
    } else if score < 60 {
        "⚠️ Poor (Runs, but breaks coding rules)"
    } else if score < 70 {
        "👌 Good (Basic quality, some issues)"
    } else if score < 80 {
        "👍 Very Good (Mostly clean, minor issues)"
    } else {
        "🌟 Excellent (Production-level code)"
    }
}
