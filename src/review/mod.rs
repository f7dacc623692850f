//! 代码审查流水线：提示词、编排、结果解析
//!
//! 上游接收用户代码与声明语言，经过语言检测与匹配校验后请求审查
//! 服务，下游把返回的 Markdown 解析成分数、改写稿与修复代码。

pub mod extract;
pub mod orchestrator;
pub mod prompt;
pub mod rewrite;
pub mod score;

pub use extract::extract_fixed_code;
pub use orchestrator::{
    CompletedReview, Notifier, ReviewError, ReviewOrchestrator, ReviewPhase, ReviewRequest,
    SilentNotifier, UiState, EMPTY_REPLY_FALLBACK, LOW_CONFIDENCE,
};
pub use prompt::{compose_provider_prompt, get_review_prompt};
pub use rewrite::inject_score;
pub use score::{extract_raw_score, normalize_score, score_label};
