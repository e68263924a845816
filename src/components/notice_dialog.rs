//! Notice dialog component
//!
//! Shows a validation, transport or parse failure until acknowledged.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

#[derive(Debug, Default)]
pub struct NoticeDialog {
    title: String,
    message: String,
}

impl NoticeDialog {
    pub fn set_notice(&mut self, title: &str, message: &str) {
        self.title = title.to_string();
        self.message = message.to_string();
    }
}

impl Component for NoticeDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char(' ') => {
                Some(Action::CloseModal)
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let width = area.width.saturating_sub(8).clamp(20, 70);
        // Rough wrap estimate: border, padding, footer
        let text_width = width.saturating_sub(4).max(1) as usize;
        let wrapped = self.message.chars().count().div_ceil(text_width) as u16;
        let popup_area = centered_popup(area, width, wrapped + 6);

        frame.render_widget(Clear, popup_area);

        let content = vec![
            Line::from(""),
            Line::from(Span::styled(
                self.message.clone(),
                Style::default().fg(Color::White),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter or Esc to dismiss",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title(format!(" {} ", self.title))
                    .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            )
            .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, popup_area);
        Ok(())
    }
}
