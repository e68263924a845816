//! Description bar component
//!
//! Free-text product description that becomes the generation prompt.

use crate::action::Action;
use crate::component::Component;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const PROMPT: &str = "› ";
const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Description input bar
#[derive(Debug, Default)]
pub struct DescriptionBar {
    text: String,
    focused: bool,
    /// Seconds since the in-flight request started, when generating
    generating: Option<f64>,
}

impl DescriptionBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the state to render on the next draw
    pub fn set_state(&mut self, text: &str, focused: bool, generating: Option<f64>) {
        self.text = text.to_string();
        self.focused = focused;
        self.generating = generating;
    }
}

/// The end of `text` that fits in `width` columns, with a leading ellipsis
/// when the start had to be dropped
fn visible_tail(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut tail = Vec::new();
    let mut used = 1;
    for ch in text.chars().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        tail.push(ch);
        used += w;
    }
    std::iter::once('…').chain(tail.into_iter().rev()).collect()
}

impl Component for DescriptionBar {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Enter => Some(Action::Generate),
            KeyCode::Esc | KeyCode::Tab => Some(Action::FocusGrid),
            KeyCode::Backspace => Some(Action::DescriptionBackspace),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::DescriptionInput(c))
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let border_color = if self.focused { Color::Cyan } else { Color::DarkGray };

        let mut spans = vec![Span::styled(
            PROMPT,
            Style::default().fg(border_color).add_modifier(Modifier::BOLD),
        )];
        if self.text.is_empty() && !self.focused {
            spans.push(Span::styled(
                "Describe the products to compare, e.g. \"project management tools for small teams\"",
                Style::default().fg(Color::DarkGray),
            ));
        } else {
            // Keep the end of the text and the cursor in view
            let cursor = usize::from(self.focused);
            let room = (area.width.saturating_sub(2) as usize)
                .saturating_sub(PROMPT.width() + cursor);
            spans.push(Span::styled(
                visible_tail(&self.text, room),
                Style::default().fg(Color::White),
            ));
        }
        if self.focused {
            spans.push(Span::styled("_", Style::default().fg(Color::Cyan)));
        }

        // Generate control, disabled while a request is in flight
        let title_right = match self.generating {
            Some(secs) => {
                let frame_idx = (secs * 4.0) as usize % SPINNER.len();
                Line::from(Span::styled(
                    format!(" {} Generating… {:.0}s ", SPINNER[frame_idx], secs),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ))
            }
            None => Line::from(Span::styled(
                " Enter: Generate ",
                Style::default().fg(Color::Green),
            )),
        };

        let paragraph = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .title(" Description ")
                .title_style(
                    Style::default()
                        .fg(border_color)
                        .add_modifier(Modifier::BOLD),
                )
                .title(Title::from(title_right).alignment(Alignment::Right)),
        );

        frame.render_widget(paragraph, area);
        Ok(())
    }
}
