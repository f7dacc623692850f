//! 终端交互界面
//!
//! 左侧代码区、右侧审查报告区，底部状态栏显示即时提示。
//! 审查流程在后台任务中执行，结果通过通道送回界面线程。

pub mod markdown;

use std::io::{self, Stdout};
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use arboard::Clipboard;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use crate::api::ReviewApiClient;
use crate::cli::Args;
use crate::config::Config;
use crate::languages::{detect, Language, ALL_LANGUAGES};
use crate::review::{
    score_label, CompletedReview, Notifier, ReviewOrchestrator, ReviewRequest, UiState,
    LOW_CONFIDENCE,
};

/// 焦点所在面板，Tab 键切换
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Code,
    Review,
}

/// 输入模式：普通按键、语言选择弹窗、文件路径输入
#[derive(Debug, Clone, PartialEq, Eq)]
enum InputMode {
    Normal,
    LanguagePicker { selected: usize },
    OpenFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToastKind {
    Success,
    Warn,
    Error,
    Info,
}

/// 后台审查任务送回界面的事件
#[derive(Debug)]
enum UiEvent {
    Toast(ToastKind, String),
    Completed(Box<CompletedReview>),
    Failed,
}

/// 把编排器的提示转发到界面通道
struct ChannelNotifier {
    sender: mpsc::UnboundedSender<UiEvent>,
}

impl Notifier for ChannelNotifier {
    fn success(&self, message: &str) {
        let _ = self
            .sender
            .send(UiEvent::Toast(ToastKind::Success, message.to_string()));
    }

    fn warn(&self, message: &str) {
        let _ = self
            .sender
            .send(UiEvent::Toast(ToastKind::Warn, message.to_string()));
    }

    fn error(&self, message: &str) {
        let _ = self
            .sender
            .send(UiEvent::Toast(ToastKind::Error, message.to_string()));
    }

    fn info(&self, message: &str) {
        let _ = self
            .sender
            .send(UiEvent::Toast(ToastKind::Info, message.to_string()));
    }
}

struct App {
    code: String,
    declared: Language,
    state: UiState,
    focus: Focus,
    code_scroll: u16,
    review_scroll: u16,
    input_mode: InputMode,
    input_buffer: String,
    toast: Option<(ToastKind, String)>,
    file_name: Option<String>,
    should_quit: bool,
}

impl App {
    fn new(declared: Language) -> Self {
        Self {
            code: String::new(),
            declared,
            state: UiState::default(),
            focus: Focus::Code,
            code_scroll: 0,
            review_scroll: 0,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            toast: None,
            file_name: None,
            should_quit: false,
        }
    }

    fn set_toast(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.toast = Some((kind, message.into()));
    }

    /// 读取文件进编辑区，置信度足够时自动切换声明语言
    fn load_file(&mut self, path: &str) {
        match std::fs::read_to_string(path) {
            Ok(code) => {
                let name = Path::new(path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.to_string());
                let detection = detect(&code);
                self.code = code;
                self.code_scroll = 0;
                self.file_name = Some(name.clone());
                match Language::from_label(&detection.label) {
                    Some(language) if detection.relevance >= LOW_CONFIDENCE => {
                        self.declared = language;
                        self.set_toast(
                            ToastKind::Info,
                            format!("📄 Loaded {} ({})", name, language.as_str()),
                        );
                    }
                    _ => self.set_toast(ToastKind::Info, format!("📄 Loaded {}", name)),
                }
            }
            Err(e) => self.set_toast(ToastKind::Error, format!("❌ Failed to load file: {}", e)),
        }
    }

    /// 把暂存的修复代码写回编辑区
    fn apply_fix(&mut self) {
        match self.state.take_fixed_code() {
            Some(fixed) => {
                self.code = fixed;
                self.code_scroll = 0;
                self.set_toast(ToastKind::Success, "✅ Code fixed and updated in the editor!");
            }
            None => self.set_toast(ToastKind::Error, "❌ No fixed code found in the review."),
        }
    }

    fn copy_code(&mut self) {
        if self.code.is_empty() {
            self.set_toast(ToastKind::Warn, "⚠️ Nothing to copy.");
            return;
        }
        self.copy_to_clipboard(self.code.clone(), "📋 Code copied!");
    }

    fn copy_review(&mut self) {
        if self.state.review.is_empty() {
            self.set_toast(ToastKind::Warn, "⚠️ Nothing to copy.");
            return;
        }
        self.copy_to_clipboard(self.state.review.clone(), "📋 Review copied!");
    }

    fn copy_to_clipboard(&mut self, contents: String, success_message: &str) {
        match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(contents)) {
            Ok(()) => self.set_toast(ToastKind::Success, success_message),
            Err(e) => self.set_toast(ToastKind::Error, format!("❌ Clipboard error: {}", e)),
        }
    }

    /// 在后台任务里跑完整审查流程，校验未通过时不会进入加载态
    fn start_review(&mut self, sender: &mpsc::UnboundedSender<UiEvent>, client: &ReviewApiClient) {
        if self.state.loading {
            return;
        }
        let request = ReviewRequest::new(self.code.clone(), self.declared);
        let client = client.clone();
        let sender = sender.clone();
        tokio::spawn(async move {
            let notifier = ChannelNotifier {
                sender: sender.clone(),
            };
            let mut flow = ReviewOrchestrator::new(client);
            match flow.run_review(&request, &notifier).await {
                Ok(completed) => {
                    let _ = sender.send(UiEvent::Completed(Box::new(completed)));
                }
                Err(_) => {
                    let _ = sender.send(UiEvent::Failed);
                }
            }
        });
    }

    fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Toast(kind, message) => {
                // 成功提示只在校验全部通过、请求即将发出时出现，与加载态同步
                if kind == ToastKind::Success {
                    self.state.begin_request();
                    self.review_scroll = 0;
                }
                self.toast = Some((kind, message));
            }
            UiEvent::Completed(completed) => {
                self.state
                    .complete(completed.review, completed.score, completed.fixed_code);
                self.review_scroll = 0;
            }
            UiEvent::Failed => self.state.fail(),
        }
    }

    fn scroll_up(&mut self, step: u16) {
        match self.focus {
            Focus::Code => self.code_scroll = self.code_scroll.saturating_sub(step),
            Focus::Review => self.review_scroll = self.review_scroll.saturating_sub(step),
        }
    }

    fn scroll_down(&mut self, step: u16) {
        match self.focus {
            Focus::Code => self.code_scroll = self.code_scroll.saturating_add(step),
            Focus::Review => self.review_scroll = self.review_scroll.saturating_add(step),
        }
    }

    fn open_language_picker(&mut self) {
        let selected = ALL_LANGUAGES
            .iter()
            .position(|language| *language == self.declared)
            .unwrap_or(0);
        self.input_mode = InputMode::LanguagePicker { selected };
    }

    fn handle_key(
        &mut self,
        code: KeyCode,
        sender: &mpsc::UnboundedSender<UiEvent>,
        client: &ReviewApiClient,
    ) -> bool {
        match self.input_mode.clone() {
            InputMode::Normal => match code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                    true
                }
                KeyCode::Tab => {
                    self.focus = match self.focus {
                        Focus::Code => Focus::Review,
                        Focus::Review => Focus::Code,
                    };
                    true
                }
                KeyCode::Enter => {
                    self.start_review(sender, client);
                    true
                }
                KeyCode::Char('l') => {
                    self.open_language_picker();
                    true
                }
                KeyCode::Char('o') => {
                    self.input_buffer.clear();
                    self.input_mode = InputMode::OpenFile;
                    true
                }
                KeyCode::Char('a') => {
                    self.apply_fix();
                    true
                }
                KeyCode::Char('c') => {
                    self.copy_code();
                    true
                }
                KeyCode::Char('y') => {
                    self.copy_review();
                    true
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.scroll_up(1);
                    true
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    self.scroll_down(1);
                    true
                }
                KeyCode::PageUp => {
                    self.scroll_up(10);
                    true
                }
                KeyCode::PageDown => {
                    self.scroll_down(10);
                    true
                }
                _ => false,
            },
            InputMode::LanguagePicker { selected } => match code {
                KeyCode::Esc | KeyCode::Char('q') => {
                    self.input_mode = InputMode::Normal;
                    true
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    let next = (selected + 1).min(ALL_LANGUAGES.len() - 1);
                    self.input_mode = InputMode::LanguagePicker { selected: next };
                    true
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    let prev = selected.saturating_sub(1);
                    self.input_mode = InputMode::LanguagePicker { selected: prev };
                    true
                }
                KeyCode::Enter => {
                    self.declared = ALL_LANGUAGES[selected];
                    self.input_mode = InputMode::Normal;
                    true
                }
                _ => false,
            },
            InputMode::OpenFile => match code {
                KeyCode::Esc => {
                    self.input_buffer.clear();
                    self.input_mode = InputMode::Normal;
                    true
                }
                KeyCode::Enter => {
                    let path = self.input_buffer.clone();
                    self.input_buffer.clear();
                    self.input_mode = InputMode::Normal;
                    if !path.trim().is_empty() {
                        self.load_file(path.trim());
                    }
                    true
                }
                KeyCode::Backspace => {
                    self.input_buffer.pop();
                    true
                }
                KeyCode::Char(c) => {
                    self.input_buffer.push(c);
                    true
                }
                _ => false,
            },
        }
    }
}

/// 终端界面入口
pub async fn run(args: &Args, config: &Config) -> Result<()> {
    let declared: Language = args.language.parse().map_err(anyhow::Error::msg)?;
    let mut app = App::new(declared);
    if let Some(file) = &args.file {
        app.load_file(file);
    }
    let client = ReviewApiClient::new(&config.api_url);

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app, &client).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<ratatui::backend::CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(
    terminal: &mut Terminal<ratatui::backend::CrosstermBackend<Stdout>>,
) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<ratatui::backend::CrosstermBackend<Stdout>>,
    app: &mut App,
    client: &ReviewApiClient,
) -> Result<()> {
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let mut needs_render = true;
    let mut last_frame = Instant::now();

    loop {
        while let Ok(event) = receiver.try_recv() {
            app.apply_event(event);
            needs_render = true;
        }

        if needs_render || last_frame.elapsed().as_millis() >= 250 {
            terminal.draw(|f| ui(f, app))?;
            last_frame = Instant::now();
            needs_render = false;
        }

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key.code, &sender, client) {
                    needs_render = true;
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

// --- 渲染 ---

fn ui(frame: &mut Frame, app: &App) {
    let layout = Layout::vertical([
        Constraint::Min(3),    // 代码与审查面板
        Constraint::Length(1), // 评分行
        Constraint::Length(1), // 状态栏
    ])
    .split(frame.area());

    let panes = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[0]);

    render_code_pane(frame, app, panes[0]);
    render_review_pane(frame, app, panes[1]);
    render_score_line(frame, app, layout[1]);
    render_status_line(frame, app, layout[2]);

    match &app.input_mode {
        InputMode::LanguagePicker { selected } => render_language_picker(frame, *selected),
        InputMode::OpenFile => render_open_file_overlay(frame, app),
        InputMode::Normal => {}
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_code_pane(frame: &mut Frame, app: &App, area: Rect) {
    let title = match &app.file_name {
        Some(name) => format!(" {} ({}) ", name, app.declared.display_name()),
        None => format!(" Code ({}) ", app.declared.display_name()),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == Focus::Code));
    let paragraph = Paragraph::new(app.code.as_str())
        .block(block)
        .scroll((app.code_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_review_pane(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.state.loading {
        " Review (Analyzing...) "
    } else {
        " Review "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == Focus::Review));
    let body = if app.state.review.is_empty() {
        let hint = if app.state.loading {
            "Waiting for the review service..."
        } else {
            "No review yet. Load a file with [o] and press [Enter]."
        };
        Text::from(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray),
        )))
    } else {
        markdown::render_markdown_text(&app.state.review)
    };
    let paragraph = Paragraph::new(body)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.review_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_score_line(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.state.code_score {
        Some(score) => Line::from(Span::styled(
            format!("📊 Code Score: {}/100 {}", score, score_label(score)),
            Style::default()
                .fg(score_color(score))
                .add_modifier(Modifier::BOLD),
        )),
        None => Line::from(Span::styled(
            if app.state.loading { "Analyzing..." } else { "" },
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_status_line(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.toast {
        Some((kind, message)) => Line::from(Span::styled(
            message.clone(),
            Style::default().fg(toast_color(*kind)),
        )),
        None => Line::from(Span::styled(
            "[Enter] review  [l] language  [o] open file  [a] apply fix  [c/y] copy  [Tab] focus  [q] quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_language_picker(frame: &mut Frame, selected: usize) {
    let area = centered_rect(frame.area(), 30, 60);
    frame.render_widget(Clear, area);

    let mut lines = Vec::new();
    for (idx, language) in ALL_LANGUAGES.iter().enumerate() {
        let prefix = if idx == selected { "> " } else { "  " };
        let style = if idx == selected {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("{prefix}{}", language.display_name()),
            style,
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Enter] select  [j/k] move  [Esc] cancel",
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default().title(" Language ").borders(Borders::ALL);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn render_open_file_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect(frame.area(), 60, 20);
    frame.render_widget(Clear, area);

    let block = Block::default().title(" Open file ").borders(Borders::ALL);
    let lines = vec![
        Line::from(format!("{}_", app.input_buffer)),
        Line::from(""),
        Line::from(Span::styled(
            "Enter to load  Esc to cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn centered_rect(r: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

/// 评分行颜色与评分档位一致
fn score_color(score: u8) -> Color {
    match score {
        0..=49 => Color::Red,
        50..=59 => Color::LightRed,
        60..=69 => Color::Yellow,
        70..=79 => Color::LightGreen,
        _ => Color::Green,
    }
}

fn toast_color(kind: ToastKind) -> Color {
    match kind {
        ToastKind::Success => Color::Green,
        ToastKind::Warn => Color::Yellow,
        ToastKind::Error => Color::Red,
        ToastKind::Info => Color::Cyan,
    }
}
