use thiserror::Error;
use tracing::debug;

use crate::api::ReviewApiClient;
use crate::languages::{detect, is_match, DetectionResult, Language};
use crate::review::extract::extract_fixed_code;
use crate::review::rewrite::inject_score;
use crate::review::score::{extract_raw_score, normalize_score};

/// 检测分数低于该阈值时认为语言不可信，拒绝发起审查
pub const LOW_CONFIDENCE: u32 = 8;

/// 模型返回空文本时填充的占位审查内容
pub const EMPTY_REPLY_FALLBACK: &str = "❌ Error: No response from AI.";

/// 单次审查的流转阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewPhase {
    Idle,
    Validating,
    Detecting,
    Rejected,
    Requesting,
    Parsing,
    Failed,
    Done,
}

/// 一次用户提交的审查请求
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub code: String,
    pub declared: Language,
}

impl ReviewRequest {
    pub fn new(code: impl Into<String>, declared: Language) -> Self {
        Self {
            code: code.into(),
            declared,
        }
    }
}

/// 审查面板状态，只通过下面的迁移方法更新
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub loading: bool,
    pub review: String,
    pub fixed_code: Option<String>,
    pub code_score: Option<u8>,
}

impl UiState {
    /// 请求发出前清空上一轮结果并进入加载态
    pub fn begin_request(&mut self) {
        self.loading = true;
        self.review.clear();
        self.fixed_code = None;
        self.code_score = None;
    }

    /// 请求成功后一次性写入全部结果
    pub fn complete(&mut self, review: String, score: u8, fixed_code: Option<String>) {
        self.review = review;
        self.code_score = Some(score);
        self.fixed_code = fixed_code;
        self.loading = false;
    }

    /// 请求失败后只退出加载态，不保留半成品结果
    pub fn fail(&mut self) {
        self.loading = false;
    }

    /// 把修复代码写回编辑区后清除暂存
    pub fn take_fixed_code(&mut self) -> Option<String> {
        self.fixed_code.take()
    }
}

/// 审查流程中面向用户的失败类别
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("⚠️ Please paste some code first.")]
    EmptyInput,
    #[error("🤔 Couldn’t detect language confidently. Please check your code.")]
    LowConfidence { label: String, relevance: u32 },
    #[error("❌ Language mismatch: you selected \"{selected}\", but your code looks like \"{detected}\".")]
    LanguageMismatch { selected: String, detected: String },
    #[error("❌ Failed to analyze code. {message}")]
    Service { message: String },
}

/// 向用户冒泡即时消息的出口，命令行打印与终端界面状态栏各自实现
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    fn info(&self, message: &str);
}

/// 静默实现，供不需要提示的调用方使用
#[derive(Debug, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn success(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
}

/// 一次成功审查的产物
#[derive(Debug, Clone)]
pub struct CompletedReview {
    pub review: String,
    pub score: u8,
    pub fixed_code: Option<String>,
    pub detected: DetectionResult,
}

/// 审查编排器：校验、检测、请求、解析一条龙
///
/// 持有接口客户端与界面状态，校验失败时不发出任何网络请求。
pub struct ReviewOrchestrator {
    client: ReviewApiClient,
    state: UiState,
    phase: ReviewPhase,
}

impl ReviewOrchestrator {
    pub fn new(client: ReviewApiClient) -> Self {
        Self {
            client,
            state: UiState::default(),
            phase: ReviewPhase::Idle,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut UiState {
        &mut self.state
    }

    pub fn phase(&self) -> ReviewPhase {
        self.phase
    }

    /// 执行一次完整审查
    ///
    /// 失败路径（空输入、低置信检测、语言不匹配、服务错误）都会先通过
    /// notifier 冒泡提示再返回错误；成功路径冒泡开场提示并返回结果。
    pub async fn run_review(
        &mut self,
        request: &ReviewRequest,
        notifier: &dyn Notifier,
    ) -> Result<CompletedReview, ReviewError> {
        self.phase = ReviewPhase::Validating;
        if request.code.trim().is_empty() {
            return Err(self.reject(ReviewError::EmptyInput, notifier));
        }

        self.phase = ReviewPhase::Detecting;
        let detection = detect(&request.code);
        debug!(
            label = %detection.label,
            relevance = detection.relevance,
            "language detection finished"
        );

        if detection.label.is_empty() || detection.relevance < LOW_CONFIDENCE {
            let err = ReviewError::LowConfidence {
                label: detection.label,
                relevance: detection.relevance,
            };
            return Err(self.reject(err, notifier));
        }

        let selected = request.declared.as_str();
        if !is_match(selected, &detection.label) {
            let err = ReviewError::LanguageMismatch {
                selected: selected.to_string(),
                detected: detection.label,
            };
            self.phase = ReviewPhase::Rejected;
            return Err(self.reject(err, notifier));
        }

        notifier.success(&format!(
            "✅ Correct! You selected \"{}\" and wrote {}. Starting review...",
            selected, detection.label
        ));

        self.phase = ReviewPhase::Requesting;
        self.state.begin_request();

        let text = match self.client.request_review(&request.code).await {
            Ok(text) => text,
            Err(err) => {
                self.phase = ReviewPhase::Failed;
                self.state.fail();
                let err = ReviewError::Service {
                    message: err.to_string(),
                };
                return Err(self.reject(err, notifier));
            }
        };

        self.phase = ReviewPhase::Parsing;
        let text = if text.is_empty() {
            EMPTY_REPLY_FALLBACK.to_string()
        } else {
            text
        };

        let raw_score = extract_raw_score(&text);
        let score = normalize_score(&text, raw_score);
        let review = inject_score(&text, score);
        let fixed_code = extract_fixed_code(&review);

        self.state
            .complete(review.clone(), score, fixed_code.clone());
        self.phase = ReviewPhase::Done;

        Ok(CompletedReview {
            review,
            score,
            fixed_code,
            detected: detection,
        })
    }

    /// 冒泡失败提示并把阶段收回空闲态
    fn reject(&mut self, err: ReviewError, notifier: &dyn Notifier) -> ReviewError {
        match &err {
            ReviewError::LowConfidence { .. } => notifier.warn(&err.to_string()),
            other => notifier.error(&other.to_string()),
        }
        self.phase = ReviewPhase::Idle;
        err
    }
}
