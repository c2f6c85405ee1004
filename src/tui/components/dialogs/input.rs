//! Single-line text input dialog
//!
//! Starts empty with the hint shown as a placeholder. Enter submits the
//! current text as `Success(text)`; Escape or a click outside cancel. The
//! Submit and Cancel buttons do the same with the mouse.

use super::handle::OnResult;
use super::types::{DialogRequest, SPINNER_FRAMES};
use crate::tui::{styles::Theme, Frame};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Text prompt request
#[derive(Debug, Clone)]
pub struct InputRequest {
    title: String,
    hint: String,
    auto_dismiss: bool,
    text: String,
    /// Cursor position in graphemes
    cursor: usize,
    submitted: bool,
    spinner_frame: usize,
    /// Submit and cancel button rectangles from the last render
    button_areas: Option<(Rect, Rect)>,
}

impl InputRequest {
    pub fn new(title: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            hint: hint.into(),
            auto_dismiss: true,
            text: String::new(),
            cursor: 0,
            submitted: false,
            spinner_frame: 0,
            button_areas: None,
        }
    }

    /// Keep the dialog mounted after submitting until the caller dismisses it
    pub fn with_auto_dismiss(mut self, auto_dismiss: bool) -> Self {
        self.auto_dismiss = auto_dismiss;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    fn grapheme_count(&self) -> usize {
        self.text.graphemes(true).count()
    }

    /// Byte offset of the grapheme at `index`, or the end of the text
    fn byte_offset(&self, index: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .nth(index)
            .map(|(offset, _)| offset)
            .unwrap_or(self.text.len())
    }

    /// Insert at the cursor and leave the cursor after the inserted char
    ///
    /// A combining mark merges into the grapheme before it, so the cursor
    /// is recomputed from the byte offset instead of advanced by one.
    fn insert_char(&mut self, c: char) {
        let offset = self.byte_offset(self.cursor);
        self.text.insert(offset, c);
        let end = offset + c.len_utf8();
        self.cursor = self
            .text
            .grapheme_indices(true)
            .take_while(|(start, _)| *start < end)
            .count();
    }

    fn delete_previous(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = self.byte_offset(self.cursor - 1);
        let end = self.byte_offset(self.cursor);
        self.text.replace_range(start..end, "");
        self.cursor -= 1;
    }

    fn delete_next(&mut self) {
        if self.cursor >= self.grapheme_count() {
            return;
        }
        let start = self.byte_offset(self.cursor);
        let end = self.byte_offset(self.cursor + 1);
        self.text.replace_range(start..end, "");
    }

    fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn submit(&mut self, on_result: &OnResult<String>) {
        if !self.auto_dismiss {
            self.submitted = true;
        }
        on_result.success(self.text.clone());
    }

    fn render_buttons(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let button_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let style = if self.submitted {
            theme.disabled_style()
        } else {
            theme.text_style()
        };
        for (label, button_area) in [(" Submit ", button_layout[0]), (" Cancel ", button_layout[1])] {
            let button = Paragraph::new(label)
                .style(style)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(button, button_area);
        }

        self.button_areas = Some((button_layout[0], button_layout[1]));
    }

    /// Spans for the field, scrolled so the cursor stays visible
    fn field_line(&self, width: usize, theme: &Theme) -> Line<'static> {
        if self.text.is_empty() {
            let mut spans = Vec::new();
            if !self.submitted {
                spans.push(Span::styled(" ", theme.cursor_style()));
            }
            spans.push(Span::styled(self.hint.clone(), theme.placeholder_style()));
            return Line::from(spans);
        }

        let graphemes: Vec<&str> = self.text.graphemes(true).collect();
        let mut start = 0;
        while start < self.cursor
            && graphemes[start..self.cursor].concat().width() + 1 > width.max(1)
        {
            start += 1;
        }

        let style = if self.submitted {
            theme.disabled_style()
        } else {
            theme.text_style()
        };
        let before = graphemes[start..self.cursor].concat();
        let mut spans = vec![Span::styled(before, style)];
        if !self.submitted {
            let under_cursor = graphemes.get(self.cursor).copied().unwrap_or(" ").to_string();
            spans.push(Span::styled(under_cursor, theme.cursor_style()));
            if self.cursor + 1 < graphemes.len() {
                spans.push(Span::styled(graphemes[self.cursor + 1..].concat(), style));
            }
        } else if self.cursor < graphemes.len() {
            spans.push(Span::styled(graphemes[self.cursor..].concat(), style));
        }
        Line::from(spans)
    }
}

impl DialogRequest for InputRequest {
    type Output = String;

    fn auto_dismiss(&self) -> bool {
        self.auto_dismiss
    }

    fn kind(&self) -> &'static str {
        "input"
    }

    fn title(&self) -> Option<&str> {
        Some(&self.title)
    }

    fn preferred_size(&self) -> (u16, u16) {
        (50, 10)
    }

    fn tick(&mut self, _on_result: &OnResult<String>) {
        if self.submitted {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        let field_block = Block::default().borders(Borders::ALL).border_style(if self.submitted {
            theme.border_style()
        } else {
            theme.focused_border_style()
        });
        let inner_width = usize::from(chunks[0].width.saturating_sub(2));
        let field = Paragraph::new(self.field_line(inner_width, theme)).block(field_block);
        frame.render_widget(field, chunks[0]);

        self.render_buttons(frame, chunks[2], theme);

        let help = if self.submitted {
            Line::from(Span::styled(
                format!("{} Submitting...", SPINNER_FRAMES[self.spinner_frame]),
                theme.text_style().add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(Span::styled("Enter: Submit • Esc: Cancel", theme.help_style()))
        };
        frame.render_widget(Paragraph::new(help).alignment(Alignment::Center), chunks[3]);
    }

    fn handle_key_event(&mut self, key: KeyEvent, on_result: &OnResult<String>) {
        if self.submitted {
            return;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.submit(on_result),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => self.clear(),
            (KeyCode::Char(c), modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert_char(c)
            }
            (KeyCode::Backspace, _) => self.delete_previous(),
            (KeyCode::Delete, _) => self.delete_next(),
            (KeyCode::Left, _) => self.cursor = self.cursor.saturating_sub(1),
            (KeyCode::Right, _) => self.cursor = (self.cursor + 1).min(self.grapheme_count()),
            (KeyCode::Home, _) => self.cursor = 0,
            (KeyCode::End, _) => self.cursor = self.grapheme_count(),
            _ => {}
        }
    }

    fn handle_mouse_event(&mut self, event: MouseEvent, _area: Rect, on_result: &OnResult<String>) {
        if self.submitted || event.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let Some((submit_area, cancel_area)) = self.button_areas else {
            return;
        };

        let hit = |area: Rect| {
            event.column >= area.x
                && event.column < area.x + area.width
                && event.row >= area.y
                && event.row < area.y + area.height
        };
        if hit(submit_area) {
            self.submit(on_result);
        } else if hit(cancel_area) {
            on_result.cancel();
        }
    }

    fn on_dismiss_request(&mut self, on_result: &OnResult<String>) {
        if !self.submitted {
            on_result.cancel();
        }
    }
}
