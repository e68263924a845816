//! Main screen rendering
//!
//! Lays out the description bar, the grid, a status line and the key hints.

use super::grid::{draw_grid, GridComponent};
use super::layout::{calculate_main_layout, MainLayout};
use super::DescriptionBar;
use crate::component::Component;
use crate::model::{CursorRow, Focus, Table};
use anyhow::Result;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Context needed for rendering the main screen
pub struct MainRenderContext<'a> {
    pub table: &'a Table,
    pub description: &'a str,
    pub focus: Focus,
    /// Seconds since the in-flight request started
    pub generating: Option<f64>,
    pub status_message: Option<&'a str>,
}

/// Draw the main screen, returning the areas used for mouse routing
pub fn draw_main_screen(
    frame: &mut Frame,
    area: Rect,
    grid: &mut GridComponent,
    description: &mut DescriptionBar,
    ctx: &MainRenderContext,
) -> Result<MainLayout> {
    let layout = calculate_main_layout(area);

    description.set_state(ctx.description, ctx.focus == Focus::Description, ctx.generating);
    description.draw(frame, layout.description)?;

    draw_grid(frame, layout.grid, grid, ctx.table, ctx.focus == Focus::Grid);

    render_status_bar(frame, layout.status, grid, ctx);
    render_help_bar(frame, layout.help, grid, ctx.focus);

    Ok(layout)
}

fn render_status_bar(frame: &mut Frame, area: Rect, grid: &GridComponent, ctx: &MainRenderContext) {
    let mut spans = vec![];
    let col = grid.cursor.col;

    match grid.cursor.row {
        CursorRow::Header => {
            spans.push(Span::styled(
                format!(" Header {} ", col + 1),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
            if let Some(header) = ctx.table.headers().get(col) {
                spans.push(Span::styled(
                    format!(" {}", header),
                    Style::default().fg(Color::White),
                ));
            }
        }
        CursorRow::Body(row) => {
            spans.push(Span::styled(
                format!(" R{}C{} ", row + 1, col + 1),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
            if let Some(cell) = ctx.table.cell(row, col) {
                spans.push(Span::styled(
                    format!(" {} {} ", cell.kind.marker(), cell.kind),
                    Style::default().fg(Color::Magenta),
                ));
                spans.push(Span::styled(
                    format!("raw: {:?}", cell.value),
                    Style::default().fg(Color::DarkGray),
                ));
            }
        }
    }

    if let Some(dragged) = grid.dragging() {
        if let Some(header) = ctx.table.headers().get(dragged) {
            spans.push(Span::styled(
                format!("  moving \"{}\"", header),
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            ));
        }
    }

    if let Some(status) = ctx.status_message {
        spans.push(Span::styled(
            format!("  {} ", status),
            Style::default().fg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn hint(key: &str, color: Color, label: &str) -> Vec<Span<'static>> {
    vec![
        Span::styled(
            format!(" {} ", key),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("{}  ", label)),
    ]
}

fn render_help_bar(frame: &mut Frame, area: Rect, grid: &GridComponent, focus: Focus) {
    let hints: Vec<Span> = if grid.is_editing() {
        [
            hint("Enter", Color::Green, "Commit"),
            hint("Esc", Color::Yellow, "Cancel"),
        ]
        .concat()
    } else if focus == Focus::Description {
        [
            hint("Enter", Color::Green, "Generate"),
            hint("Esc", Color::Yellow, "Back to grid"),
        ]
        .concat()
    } else {
        [
            hint("Enter", Color::Cyan, "Edit"),
            hint("t", Color::Cyan, "Kind"),
            hint("a/c", Color::Cyan, "Add row/col"),
            hint("d/D", Color::Cyan, "Delete"),
            hint("</>", Color::Cyan, "Move col"),
            hint("g", Color::Green, "Generate"),
            hint("s", Color::Green, "Save"),
            hint("?", Color::Yellow, "Help"),
            hint("q", Color::Red, "Quit"),
        ]
        .concat()
    };

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}
