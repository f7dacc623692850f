//! 审查 Markdown 到终端文本的轻量渲染
//!
//! 只覆盖审查报告会出现的结构：标题、段落、列表、围栏代码块、
//! 行内样式。表格等少见结构按纯文本降级处理。

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

pub fn render_markdown_text(input: &str) -> Text<'static> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(input, options);
    let mut writer = Writer::new(parser);
    writer.run();
    writer.text
}

struct Writer<'a, I>
where
    I: Iterator<Item = Event<'a>>,
{
    iter: I,
    text: Text<'static>,
    current: Vec<Span<'static>>,
    inline_styles: Vec<Style>,
    list_indices: Vec<Option<u64>>,
    needs_newline: bool,
    in_code_block: bool,
}

impl<'a, I> Writer<'a, I>
where
    I: Iterator<Item = Event<'a>>,
{
    fn new(iter: I) -> Self {
        Self {
            iter,
            text: Text::default(),
            current: Vec::new(),
            inline_styles: Vec::new(),
            list_indices: Vec::new(),
            needs_newline: false,
            in_code_block: false,
        }
    }

    fn run(&mut self) {
        while let Some(event) = self.iter.next() {
            self.handle_event(event);
        }
        self.flush_line();
    }

    fn handle_event(&mut self, event: Event<'a>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => self.current.push(Span::styled(
                code.to_string(),
                self.current_style().fg(Color::Yellow),
            )),
            Event::SoftBreak | Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.flush_line();
                self.text.lines.push(Line::from(Span::styled(
                    "────────",
                    Style::default().fg(Color::DarkGray),
                )));
                self.needs_newline = true;
            }
            Event::Html(html) | Event::InlineHtml(html) => self.push_text(&html),
            Event::FootnoteReference(_) | Event::TaskListMarker(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'a>) {
        match tag {
            Tag::Paragraph => self.blank_line_if_needed(),
            Tag::Heading { level, .. } => {
                self.blank_line_if_needed();
                let style = Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD);
                self.current.push(Span::styled(
                    format!("{} ", "#".repeat(level as usize)),
                    style,
                ));
                self.push_inline_style(style);
            }
            Tag::CodeBlock(kind) => {
                self.blank_line_if_needed();
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.text.lines.push(Line::from(Span::styled(
                            format!("[{lang}]"),
                            Style::default().fg(Color::DarkGray),
                        )));
                    }
                }
                self.in_code_block = true;
            }
            Tag::List(start) => {
                if self.list_indices.is_empty() {
                    self.blank_line_if_needed();
                }
                self.list_indices.push(start);
            }
            Tag::Item => {
                self.flush_line();
                let depth = self.list_indices.len().saturating_sub(1);
                let marker = match self.list_indices.last_mut() {
                    Some(Some(index)) => {
                        let marker = format!("{index}. ");
                        *index += 1;
                        marker
                    }
                    _ => "- ".to_string(),
                };
                self.current
                    .push(Span::raw(format!("{}{}", "  ".repeat(depth), marker)));
            }
            Tag::Emphasis => self.push_inline_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_inline_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_inline_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { .. } => self.push_inline_style(
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
            Tag::BlockQuote
            | Tag::HtmlBlock
            | Tag::FootnoteDefinition(_)
            | Tag::Table(_)
            | Tag::TableHead
            | Tag::TableRow
            | Tag::TableCell
            | Tag::Image { .. }
            | Tag::MetadataBlock(_) => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_line();
                self.needs_newline = true;
            }
            TagEnd::Heading(_) => {
                self.flush_line();
                self.pop_inline_style();
                self.needs_newline = true;
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.needs_newline = true;
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.list_indices.pop();
                if self.list_indices.is_empty() {
                    self.needs_newline = true;
                }
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.pop_inline_style()
            }
            TagEnd::BlockQuote
            | TagEnd::HtmlBlock
            | TagEnd::FootnoteDefinition
            | TagEnd::Table
            | TagEnd::TableHead
            | TagEnd::TableRow
            | TagEnd::TableCell
            | TagEnd::Image
            | TagEnd::MetadataBlock(_) => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.in_code_block {
            for line in text.lines() {
                self.text.lines.push(Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(Color::Green),
                )));
            }
            return;
        }

        let style = self.current_style();
        self.current.push(Span::styled(text.to_string(), style));
    }

    fn blank_line_if_needed(&mut self) {
        self.flush_line();
        if self.needs_newline {
            self.text.lines.push(Line::default());
            self.needs_newline = false;
        }
    }

    fn flush_line(&mut self) {
        if !self.current.is_empty() {
            let spans = std::mem::take(&mut self.current);
            self.text.lines.push(Line::from(spans));
        }
    }

    fn push_inline_style(&mut self, style: Style) {
        let merged = self.current_style().patch(style);
        self.inline_styles.push(merged);
    }

    fn pop_inline_style(&mut self) {
        self.inline_styles.pop();
    }

    fn current_style(&self) -> Style {
        self.inline_styles.last().copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_to_string(line: &Line<'_>) -> String {
        line.spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect()
    }

    fn rendered_lines(input: &str) -> Vec<String> {
        render_markdown_text(input)
            .lines
            .iter()
            .map(line_to_string)
            .collect()
    }

    #[test]
    fn test_heading_and_paragraph() {
        let lines = rendered_lines("# 2️⃣ Code Score\n88/100");
        assert_eq!(lines, vec!["# 2️⃣ Code Score".to_string(), String::new(), "88/100".to_string()]);
    }

    #[test]
    fn test_heading_keeps_marker_prefix() {
        let text = render_markdown_text("## Issues Found");
        assert_eq!(line_to_string(&text.lines[0]), "## Issues Found");
    }

    #[test]
    fn test_unordered_list_markers() {
        let lines = rendered_lines("- first\n- second");
        assert_eq!(lines, vec!["- first".to_string(), "- second".to_string()]);
    }

    #[test]
    fn test_ordered_list_markers() {
        let lines = rendered_lines("1. one\n2. two\n3. three");
        assert_eq!(
            lines,
            vec!["1. one".to_string(), "2. two".to_string(), "3. three".to_string()]
        );
    }

    #[test]
    fn test_fenced_code_block_lines() {
        let lines = rendered_lines("Before\n\n```python\ndef f():\n    return 1\n```\n\nAfter");
        assert!(lines.contains(&"[python]".to_string()));
        assert!(lines.contains(&"def f():".to_string()));
        assert!(lines.contains(&"    return 1".to_string()));
        assert!(lines.contains(&"After".to_string()));
    }

    #[test]
    fn test_inline_styles_preserve_content() {
        let lines = rendered_lines("This is **bold** and `inline` text.");
        assert_eq!(lines, vec!["This is bold and inline text.".to_string()]);
    }

    #[test]
    fn test_code_block_lines_are_green() {
        let text = render_markdown_text("```\nlet x = 1;\n```");
        let code_line = text
            .lines
            .iter()
            .find(|line| line_to_string(line) == "let x = 1;")
            .expect("code line present");
        assert_eq!(code_line.spans[0].style.fg, Some(Color::Green));
    }
}
