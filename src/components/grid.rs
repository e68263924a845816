//! Comparison grid component
//!
//! Cursor navigation, inline editing and column dragging for the table.
//! The table itself lives in `DomainState`; the App passes it in and the
//! grid answers with Actions.

use crate::action::Action;
use crate::model::{CellKind, CursorRow, GridCursor, Table, FEATURE_COLUMN};
use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const MIN_COLUMN_WIDTH: usize = 8;
const MAX_COLUMN_WIDTH: usize = 32;
const COLUMN_SEPARATOR: &str = " │ ";
const TOTAL_LABEL: &str = "Total";

/// Lines that are always drawn around the body: header, two rules, totals
const FIXED_LINES: u16 = 4;

/// What the inline editor is writing to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Header(usize),
    Cell { row: usize, col: usize },
}

/// Inline editor state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEditor {
    pub target: EditTarget,
    pub buffer: String,
}

impl CellEditor {
    fn commit(self) -> Action {
        match self.target {
            EditTarget::Header(col) => Action::UpdateHeader {
                col,
                text: self.buffer,
            },
            EditTarget::Cell { row, col } => Action::UpdateCellValue {
                row,
                col,
                text: self.buffer,
            },
        }
    }
}

/// Screen positions from the last draw, used for mouse hit testing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridGeometry {
    header_y: u16,
    body_y: u16,
    body_height: u16,
    scroll: usize,
    /// (column, x, width) of every drawn column, separator included
    columns: Vec<(usize, u16, u16)>,
}

impl GridGeometry {
    pub fn compute(area: Rect, widths: &[usize], visible: &[usize], scroll: usize) -> Self {
        let inner = Block::default().borders(Borders::ALL).inner(area);
        let separator = COLUMN_SEPARATOR.width() as u16;

        let mut x = inner.x;
        let mut columns = Vec::with_capacity(visible.len());
        for &col in visible {
            let span = (widths[col] as u16).saturating_add(separator);
            columns.push((col, x, span));
            x = x.saturating_add(span);
        }

        Self {
            header_y: inner.y,
            body_y: inner.y.saturating_add(2),
            body_height: body_height(area),
            scroll,
            columns,
        }
    }

    fn column_at(&self, x: u16) -> Option<usize> {
        self.columns
            .iter()
            .find(|(_, start, width)| x >= *start && x < start.saturating_add(*width))
            .map(|(col, _, _)| *col)
    }

    /// x position of a drawn column
    #[cfg(test)]
    fn column_x(&self, col: usize) -> Option<u16> {
        self.columns
            .iter()
            .find(|(c, _, _)| *c == col)
            .map(|(_, x, _)| *x)
    }

    fn body_row_at(&self, y: u16) -> Option<usize> {
        if y < self.body_y || y >= self.body_y.saturating_add(self.body_height) {
            return None;
        }
        Some(self.scroll + (y - self.body_y) as usize)
    }
}

/// Rows of the body that fit inside a bordered grid area
fn body_height(area: Rect) -> u16 {
    area.height.saturating_sub(2).saturating_sub(FIXED_LINES)
}

/// Display width of a run of columns, separators included
fn span_width(widths: &[usize], cols: impl IntoIterator<Item = usize>) -> usize {
    let separator = COLUMN_SEPARATOR.width();
    cols.into_iter().map(|col| widths[col] + separator).sum()
}

/// The feature column followed by as many data columns from `offset` as fit
fn visible_columns(widths: &[usize], offset: usize, available: usize) -> Vec<usize> {
    let mut visible = vec![FEATURE_COLUMN];
    let mut used = span_width(widths, [FEATURE_COLUMN]);
    for col in offset.max(FEATURE_COLUMN + 1)..widths.len() {
        let needed = span_width(widths, [col]);
        // Always show at least one data column, even if it gets clipped
        if used + needed > available && visible.len() > 1 {
            break;
        }
        visible.push(col);
        used += needed;
    }
    visible
}

/// Grid component state
#[derive(Debug, Default)]
pub struct GridComponent {
    pub cursor: GridCursor,
    pub editor: Option<CellEditor>,
    /// Column currently being dragged by its header
    dragging: Option<usize>,
    /// Column the pointer is over while dragging; the dragged column walks
    /// toward it one swap at a time
    drag_target: Option<usize>,
    scroll: usize,
    /// First data column drawn after the pinned feature column
    col_offset: usize,
    geometry: Option<GridGeometry>,
}

impl GridComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self) -> bool {
        self.editor.is_some()
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    /// Put the cursor back to the top-left after the table was replaced
    pub fn reset(&mut self) {
        self.cursor = GridCursor::default();
        self.editor = None;
        self.dragging = None;
        self.drag_target = None;
        self.scroll = 0;
        self.col_offset = 0;
    }

    /// Keep the cursor and editor inside the table after a structural change
    pub fn sync(&mut self, table: &Table) {
        let cols = table.column_count();
        let rows = table.row_count();

        if self.cursor.col >= cols {
            self.cursor.col = cols.saturating_sub(1);
        }
        if let CursorRow::Body(row) = self.cursor.row {
            self.cursor.row = match rows {
                0 => CursorRow::Header,
                _ if row >= rows => CursorRow::Body(rows - 1),
                _ => CursorRow::Body(row),
            };
        }

        let stale = match self.editor.as_ref().map(|e| e.target) {
            Some(EditTarget::Header(col)) => col >= cols,
            Some(EditTarget::Cell { row, col }) => row >= rows || col >= cols,
            None => false,
        };
        if stale {
            self.editor = None;
        }
        if self.dragging.is_some_and(|col| col >= cols)
            || self.drag_target.is_some_and(|col| col >= cols)
        {
            self.dragging = None;
            self.drag_target = None;
        }
        self.col_offset = self.col_offset.min(cols.saturating_sub(1));
        self.scroll = self.scroll.min(rows.saturating_sub(1));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────

    pub fn move_up(&mut self) {
        self.cursor.row = match self.cursor.row {
            CursorRow::Header | CursorRow::Body(0) => CursorRow::Header,
            CursorRow::Body(row) => CursorRow::Body(row - 1),
        };
    }

    pub fn move_down(&mut self, table: &Table) {
        let rows = table.row_count();
        self.cursor.row = match self.cursor.row {
            CursorRow::Header if rows > 0 => CursorRow::Body(0),
            CursorRow::Body(row) if row + 1 < rows => CursorRow::Body(row + 1),
            other => other,
        };
    }

    pub fn move_left(&mut self) {
        self.cursor.col = self.cursor.col.saturating_sub(1);
    }

    pub fn move_right(&mut self, table: &Table) {
        if self.cursor.col + 1 < table.column_count() {
            self.cursor.col += 1;
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Editing
    // ─────────────────────────────────────────────────────────────────────────

    /// Open the inline editor on the cursor, seeded with the raw text
    pub fn start_editing(&mut self, table: &Table) {
        let col = self.cursor.col;
        let (target, buffer) = match self.cursor.row {
            CursorRow::Header => match table.headers().get(col) {
                Some(header) => (EditTarget::Header(col), header.clone()),
                None => return,
            },
            CursorRow::Body(row) => match table.cell(row, col) {
                Some(cell) => (EditTarget::Cell { row, col }, cell.value.clone()),
                None => return,
            },
        };
        self.editor = Some(CellEditor { target, buffer });
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> Option<Action> {
        let editor = self.editor.as_mut()?;
        match key.code {
            KeyCode::Esc => {
                self.editor = None;
                None
            }
            KeyCode::Enter | KeyCode::Tab => self.editor.take().map(CellEditor::commit),
            KeyCode::Backspace => {
                editor.buffer.pop();
                None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                editor.buffer.push(c);
                None
            }
            _ => None,
        }
    }

    fn cycle_kind(&self, table: &Table) -> Option<Action> {
        let CursorRow::Body(row) = self.cursor.row else {
            return Some(Action::SetStatus("Select a cell to change its kind".to_string()));
        };
        if self.cursor.col == FEATURE_COLUMN {
            return Some(Action::SetStatus(
                "Feature names are always text".to_string(),
            ));
        }
        let cell = table.cell(row, self.cursor.col)?;
        Some(Action::UpdateCellKind {
            row,
            col: self.cursor.col,
            kind: cell.kind.cycle(),
        })
    }

    fn move_column(&self, table: &Table, forward: bool) -> Option<Action> {
        let from = self.cursor.col;
        let to = if forward {
            from + 1
        } else {
            from.checked_sub(1)?
        };
        if from == FEATURE_COLUMN || to == FEATURE_COLUMN || to >= table.column_count() {
            return Some(Action::SetStatus(
                "The feature column stays pinned on the left".to_string(),
            ));
        }
        Some(Action::ReorderColumn { from, to })
    }

    /// Translate a key into an Action while the grid has focus
    pub fn handle_key(&mut self, key: KeyEvent, table: &Table) -> Option<Action> {
        if self.is_editing() {
            return self.handle_editor_key(key);
        }

        match key.code {
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_up();
                None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_down(table);
                None
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.move_left();
                None
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.move_right(table);
                None
            }
            KeyCode::Enter | KeyCode::Char('e') | KeyCode::F(2) => {
                self.start_editing(table);
                None
            }

            // Structure
            KeyCode::Char('a') => Some(Action::AddRow),
            KeyCode::Char('c') => Some(Action::AddColumn),
            KeyCode::Char('d') => match self.cursor.row {
                CursorRow::Body(row) => Some(Action::DeleteRow(row)),
                CursorRow::Header => None,
            },
            KeyCode::Char('D') if self.cursor.col == FEATURE_COLUMN => Some(Action::SetStatus(
                "The feature column cannot be deleted".to_string(),
            )),
            KeyCode::Char('D') => Some(Action::DeleteColumn(self.cursor.col)),
            KeyCode::Char('<') => self.move_column(table, false),
            KeyCode::Char('>') => self.move_column(table, true),
            KeyCode::Char('t') => self.cycle_kind(table),

            // Session
            KeyCode::Char('g') => Some(Action::Generate),
            KeyCode::Char('s') => Some(Action::Save),
            KeyCode::Tab | KeyCode::Char('i') => Some(Action::FocusDescription),
            KeyCode::Char('?') => Some(Action::OpenHelp),
            KeyCode::Char('q') => Some(Action::OpenQuitDialog),
            _ => None,
        }
    }

    /// Next swap of an ongoing header drag, if the dragged column has not
    /// reached the column under the pointer yet
    pub fn continue_drag(&mut self) -> Option<Action> {
        let from = self.dragging?;
        let target = self.drag_target?;
        let to = match target.cmp(&from) {
            std::cmp::Ordering::Greater => from + 1,
            std::cmp::Ordering::Less => from - 1,
            std::cmp::Ordering::Equal => {
                self.drag_target = None;
                return None;
            }
        };
        self.dragging = Some(to);
        Some(Action::ReorderColumn { from, to })
    }

    /// Translate a mouse event into an Action
    ///
    /// Pressing on a data column header starts a drag. When the pointer
    /// enters another data column the dragged column moves toward it one
    /// adjacent swap at a time: the first swap is returned here and the App
    /// asks `continue_drag` for the rest.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, table: &Table) -> Option<Action> {
        let geometry = self.geometry.as_ref()?;

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let col = geometry.column_at(mouse.column)?;
                if col >= table.column_count() {
                    return None;
                }
                if mouse.row == geometry.header_y {
                    self.cursor = GridCursor {
                        row: CursorRow::Header,
                        col,
                    };
                    self.dragging = (col != FEATURE_COLUMN).then_some(col);
                } else if let Some(row) = geometry.body_row_at(mouse.row) {
                    if row < table.row_count() {
                        self.cursor = GridCursor {
                            row: CursorRow::Body(row),
                            col,
                        };
                    }
                }
                self.editor = None;
                Some(Action::FocusGrid)
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let from = self.dragging?;
                let to = geometry.column_at(mouse.column)?;
                if to == from || to == FEATURE_COLUMN || to >= table.column_count() {
                    return None;
                }
                self.drag_target = Some(to);
                self.continue_drag()
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.dragging = None;
                self.drag_target = None;
                None
            }
            MouseEventKind::ScrollDown => {
                self.move_down(table);
                None
            }
            MouseEventKind::ScrollUp => {
                self.move_up();
                None
            }
            _ => None,
        }
    }

    fn ensure_cursor_visible(&mut self, visible: usize, rows: usize) {
        if let CursorRow::Body(row) = self.cursor.row {
            if row < self.scroll {
                self.scroll = row;
            } else if visible > 0 && row >= self.scroll + visible {
                self.scroll = row + 1 - visible;
            }
        }
        self.scroll = self.scroll.min(rows.saturating_sub(visible.max(1)));
    }

    /// Slide the data columns so the cursor column is drawn. The feature
    /// column is always drawn first.
    fn ensure_cursor_column_visible(&mut self, widths: &[usize], available: usize) {
        let first_data = FEATURE_COLUMN + 1;
        self.col_offset = self
            .col_offset
            .clamp(first_data, widths.len().saturating_sub(1).max(first_data));

        let col = self.cursor.col;
        if col == FEATURE_COLUMN || col >= widths.len() {
            return;
        }
        if col < self.col_offset {
            self.col_offset = col;
        }
        let pinned = span_width(widths, [FEATURE_COLUMN]);
        while self.col_offset < col && pinned + span_width(widths, self.col_offset..=col) > available {
            self.col_offset += 1;
        }
    }

    /// Keep the cursor on the column it was on after a swap
    pub fn follow_reorder(&mut self, from: usize, to: usize) {
        if self.cursor.col == from {
            self.cursor.col = to;
        } else if self.cursor.col == to {
            self.cursor.col = from;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════════════════════════

/// Display width for each column, bounded so one long value can't take over
pub fn column_widths(table: &Table, editor: Option<&CellEditor>) -> Vec<usize> {
    (0..table.column_count())
        .map(|col| {
            let header = table.headers()[col].width();
            let body = (0..table.row_count())
                .filter_map(|row| table.display_value(row, col))
                .map(|value| value.width())
                .max()
                .unwrap_or(0);
            let total = if col == FEATURE_COLUMN {
                TOTAL_LABEL.width()
            } else {
                table
                    .compute_column_total(col)
                    .map(|t| t.width())
                    .unwrap_or(0)
            };
            let editing = match editor {
                Some(CellEditor {
                    target: EditTarget::Header(c) | EditTarget::Cell { col: c, .. },
                    buffer,
                }) if *c == col => buffer.width() + 1,
                _ => 0,
            };

            header
                .max(body)
                .max(total)
                .max(editing)
                .clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Pad or truncate `text` to exactly `width` display columns
fn fit(text: &str, width: usize, align_right: bool) -> String {
    let fitted = if text.width() > width {
        let mut out = String::new();
        let mut used = 0;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0);
            if used + w + 1 > width {
                break;
            }
            out.push(ch);
            used += w;
        }
        out.push('…');
        out
    } else {
        text.to_string()
    };

    let pad = " ".repeat(width.saturating_sub(fitted.width()));
    if align_right {
        format!("{}{}", pad, fitted)
    } else {
        format!("{}{}", fitted, pad)
    }
}

fn kind_color(kind: CellKind) -> Color {
    match kind {
        CellKind::Text => Color::White,
        CellKind::Number => Color::LightBlue,
        CellKind::Currency => Color::Green,
    }
}

fn separator_span() -> Span<'static> {
    Span::styled(COLUMN_SEPARATOR, Style::default().fg(Color::DarkGray))
}

fn rule_line(widths: &[usize], visible: &[usize]) -> Line<'static> {
    let rule: String = visible
        .iter()
        .map(|col| "─".repeat(widths[*col]))
        .collect::<Vec<_>>()
        .join("─┼─");
    Line::from(Span::styled(rule, Style::default().fg(Color::DarkGray)))
}

/// Build the grid text: header, rule, visible body rows, rule, totals
fn build_grid_lines(
    table: &Table,
    grid: &GridComponent,
    widths: &[usize],
    visible: &[usize],
    visible_rows: usize,
    focused: bool,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let editing = grid.editor.as_ref();
    let selected = |row: CursorRow, col: usize| {
        focused && grid.cursor.row == row && grid.cursor.col == col
    };

    // Header
    let header_spans: Vec<Span> = visible
        .iter()
        .map(|&col| (col, &table.headers()[col]))
        .flat_map(|(col, header)| {
            let text = match editing {
                Some(e) if e.target == EditTarget::Header(col) => format!("{}_", e.buffer),
                _ => header.clone(),
            };
            let mut style = Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD);
            if grid.dragging == Some(col) {
                style = style.bg(Color::Magenta).fg(Color::White);
            } else if selected(CursorRow::Header, col) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            vec![Span::styled(fit(&text, widths[col], false), style), separator_span()]
        })
        .collect();
    lines.push(Line::from(header_spans));
    lines.push(rule_line(widths, visible));

    // Body
    if table.row_count() == 0 {
        lines.push(Line::from(Span::styled(
            "No rows. Press a to add one.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for row in grid.scroll..(grid.scroll + visible_rows).min(table.row_count()) {
        let spans: Vec<Span> = visible
            .iter()
            .flat_map(|&col| {
                let kind = table.cell(row, col).map(|c| c.kind).unwrap_or_default();
                let is_editing = matches!(
                    editing,
                    Some(e) if e.target == (EditTarget::Cell { row, col })
                );
                let text = match editing {
                    Some(e) if is_editing => format!("{}_", e.buffer),
                    _ => table.display_value(row, col).unwrap_or_default(),
                };
                let numeric = col != FEATURE_COLUMN && kind.is_numeric() && !is_editing;

                let mut style = if col == FEATURE_COLUMN {
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(kind_color(kind))
                };
                if selected(CursorRow::Body(row), col) {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                vec![Span::styled(fit(&text, widths[col], numeric), style), separator_span()]
            })
            .collect();
        lines.push(Line::from(spans));
    }

    // Totals
    lines.push(rule_line(widths, visible));
    let total_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let total_spans: Vec<Span> = visible
        .iter()
        .flat_map(|&col| {
            let text = if col == FEATURE_COLUMN {
                fit(TOTAL_LABEL, widths[col], false)
            } else {
                fit(
                    &table.compute_column_total(col).unwrap_or_default(),
                    widths[col],
                    true,
                )
            };
            vec![Span::styled(text, total_style), separator_span()]
        })
        .collect();
    lines.push(Line::from(total_spans));

    lines
}

/// Draw the grid and remember its geometry for mouse hit testing
pub fn draw_grid(
    frame: &mut Frame,
    area: Rect,
    grid: &mut GridComponent,
    table: &Table,
    focused: bool,
) {
    let visible_rows = body_height(area) as usize;
    grid.ensure_cursor_visible(visible_rows, table.row_count());

    let widths = column_widths(table, grid.editor.as_ref());
    let available = area.width.saturating_sub(2) as usize;
    grid.ensure_cursor_column_visible(&widths, available);
    let visible = visible_columns(&widths, grid.col_offset, available);
    grid.geometry = Some(GridGeometry::compute(area, &widths, &visible, grid.scroll));

    let lines = build_grid_lines(table, grid, &widths, &visible, visible_rows, focused);

    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let hidden_left = visible.get(1).is_some_and(|&col| col > FEATURE_COLUMN + 1);
    let hidden_right = visible.last().is_some_and(|&col| col + 1 < table.column_count());
    let title = format!(
        " Comparison ({} rows × {} columns){}{} ",
        table.row_count(),
        table.column_count(),
        if hidden_left { " ◀" } else { "" },
        if hidden_right { " ▶" } else { "" },
    );
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(title)
            .title_style(
                Style::default()
                    .fg(border_color)
                    .add_modifier(Modifier::BOLD),
            ),
    );

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cell::Cell;
    use ratatui::{backend::TestBackend, Terminal};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn pricing_table() -> Table {
        Table::from_parts(
            vec!["Feature".into(), "Acme".into(), "Globex".into()],
            vec![
                vec![
                    Cell::text("Price"),
                    Cell::new("1234.5", CellKind::Currency),
                    Cell::new("100", CellKind::Currency),
                ],
                vec![
                    Cell::text("Seats"),
                    Cell::new("10", CellKind::Number),
                    Cell::text("unlimited"),
                ],
            ],
        )
    }

    fn render_to_string(grid: &mut GridComponent, table: &Table) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 14)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                draw_grid(frame, area, grid, table, true)
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_navigation_stays_inside_table() {
        let table = Table::new();
        let mut grid = GridComponent::new();

        for _ in 0..5 {
            grid.handle_key(key(KeyCode::Right), &table);
        }
        assert_eq!(grid.cursor.col, 2);

        grid.handle_key(key(KeyCode::Down), &table);
        assert_eq!(grid.cursor.row, CursorRow::Body(0));

        grid.handle_key(key(KeyCode::Up), &table);
        grid.handle_key(key(KeyCode::Up), &table);
        assert_eq!(grid.cursor.row, CursorRow::Header);

        grid.handle_key(key(KeyCode::Down), &table);
        assert_eq!(grid.cursor.row, CursorRow::Body(0));
    }

    #[test]
    fn test_edit_cell_commits_update() {
        let table = pricing_table();
        let mut grid = GridComponent::new();
        grid.handle_key(key(KeyCode::Right), &table);

        assert_eq!(grid.handle_key(key(KeyCode::Enter), &table), None);
        assert_eq!(grid.editor.as_ref().unwrap().buffer, "1234.5");

        for _ in 0..6 {
            grid.handle_key(key(KeyCode::Backspace), &table);
        }
        grid.handle_key(key(KeyCode::Char('9')), &table);
        // Shortcut letters are plain input while editing
        grid.handle_key(key(KeyCode::Char('q')), &table);

        let action = grid.handle_key(key(KeyCode::Enter), &table);
        assert_eq!(
            action,
            Some(Action::UpdateCellValue {
                row: 0,
                col: 1,
                text: "9q".to_string(),
            })
        );
        assert!(!grid.is_editing());
    }

    #[test]
    fn test_edit_header_and_cancel() {
        let table = pricing_table();
        let mut grid = GridComponent::new();
        grid.handle_key(key(KeyCode::Up), &table);
        grid.handle_key(key(KeyCode::Right), &table);
        grid.handle_key(key(KeyCode::Char('e')), &table);
        grid.handle_key(key(KeyCode::Char('!')), &table);

        assert_eq!(
            grid.handle_key(key(KeyCode::Enter), &table),
            Some(Action::UpdateHeader {
                col: 1,
                text: "Acme!".to_string(),
            })
        );

        grid.handle_key(key(KeyCode::Enter), &table);
        assert!(grid.is_editing());
        assert_eq!(grid.handle_key(key(KeyCode::Esc), &table), None);
        assert!(!grid.is_editing());
    }

    #[test]
    fn test_kind_cycle_skips_feature_column() {
        let table = pricing_table();
        let mut grid = GridComponent::new();

        assert!(matches!(
            grid.handle_key(key(KeyCode::Char('t')), &table),
            Some(Action::SetStatus(_))
        ));

        grid.handle_key(key(KeyCode::Right), &table);
        assert_eq!(
            grid.handle_key(key(KeyCode::Char('t')), &table),
            Some(Action::UpdateCellKind {
                row: 0,
                col: 1,
                kind: CellKind::Text,
            })
        );
    }

    #[test]
    fn test_keyboard_column_move_and_cursor_follow() {
        let table = pricing_table();
        let mut grid = GridComponent::new();
        grid.handle_key(key(KeyCode::Right), &table);

        assert!(matches!(
            grid.handle_key(key(KeyCode::Char('<')), &table),
            Some(Action::SetStatus(_))
        ));

        let action = grid.handle_key(key(KeyCode::Char('>')), &table).unwrap();
        assert_eq!(action, Action::ReorderColumn { from: 1, to: 2 });

        if let Action::ReorderColumn { from, to } = action {
            grid.follow_reorder(from, to);
        }
        assert_eq!(grid.cursor.col, 2);

        grid.handle_key(key(KeyCode::Right), &table);
        assert!(matches!(
            grid.handle_key(key(KeyCode::Char('>')), &table),
            Some(Action::SetStatus(_))
        ));
    }

    #[test]
    fn test_delete_shortcuts() {
        let table = pricing_table();
        let mut grid = GridComponent::new();

        assert_eq!(
            grid.handle_key(key(KeyCode::Char('d')), &table),
            Some(Action::DeleteRow(0))
        );
        assert!(matches!(
            grid.handle_key(key(KeyCode::Char('D')), &table),
            Some(Action::SetStatus(_))
        ));

        grid.handle_key(key(KeyCode::Right), &table);
        assert_eq!(
            grid.handle_key(key(KeyCode::Char('D')), &table),
            Some(Action::DeleteColumn(1))
        );
    }

    #[test]
    fn test_header_drag_emits_successive_swaps() {
        let mut table = Table::new();
        table.add_column();
        let mut grid = GridComponent::new();
        let widths = column_widths(&table, None);
        let geometry = GridGeometry::compute(Rect::new(0, 0, 80, 12), &widths, &[0, 1, 2, 3], 0);
        let x_of = |col: usize| geometry.column_x(col).unwrap() + 1;
        let header_y = geometry.header_y;
        grid.geometry = Some(geometry.clone());

        grid.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), x_of(1), header_y), &table);
        assert_eq!(grid.dragging(), Some(1));

        let first = grid.handle_mouse(
            mouse(MouseEventKind::Drag(MouseButton::Left), x_of(2), header_y),
            &table,
        );
        assert_eq!(first, Some(Action::ReorderColumn { from: 1, to: 2 }));
        table.reorder_column(1, 2);

        let second = grid.handle_mouse(
            mouse(MouseEventKind::Drag(MouseButton::Left), x_of(3), header_y),
            &table,
        );
        assert_eq!(second, Some(Action::ReorderColumn { from: 2, to: 3 }));
        table.reorder_column(2, 3);
        assert_eq!(table.headers(), &["Feature", "Vendor 2", "Vendor 3", "Vendor 1"]);

        // Staying put or entering the feature column does nothing
        let same = grid.handle_mouse(
            mouse(MouseEventKind::Drag(MouseButton::Left), x_of(3), header_y),
            &table,
        );
        assert_eq!(same, None);
        let pinned = grid.handle_mouse(
            mouse(MouseEventKind::Drag(MouseButton::Left), x_of(0), header_y),
            &table,
        );
        assert_eq!(pinned, None);

        grid.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), x_of(0), header_y), &table);
        assert_eq!(grid.dragging(), None);
    }

    #[test]
    fn test_drag_across_several_columns_swaps_one_at_a_time() {
        let mut table = Table::new();
        table.add_column();
        table.add_column();
        let mut grid = GridComponent::new();
        let widths = column_widths(&table, None);
        let geometry =
            GridGeometry::compute(Rect::new(0, 0, 100, 12), &widths, &[0, 1, 2, 3, 4], 0);
        let x_of = |col: usize| geometry.column_x(col).unwrap() + 1;
        let header_y = geometry.header_y;
        grid.geometry = Some(geometry.clone());

        grid.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), x_of(1), header_y), &table);

        // The pointer jumps straight from column 1 to column 3
        let mut swaps = Vec::new();
        let mut next = grid.handle_mouse(
            mouse(MouseEventKind::Drag(MouseButton::Left), x_of(3), header_y),
            &table,
        );
        while let Some(Action::ReorderColumn { from, to }) = next {
            swaps.push((from, to));
            table.reorder_column(from, to);
            grid.follow_reorder(from, to);
            next = grid.continue_drag();
        }

        assert_eq!(swaps, vec![(1, 2), (2, 3)]);
        assert_eq!(
            table.headers(),
            &["Feature", "Vendor 2", "Vendor 3", "Vendor 1", "Vendor 4"]
        );
        assert_eq!(grid.dragging(), Some(3));
        assert_eq!(grid.cursor.col, 3);

        // And back again past two columns
        next = grid.handle_mouse(
            mouse(MouseEventKind::Drag(MouseButton::Left), x_of(1), header_y),
            &table,
        );
        swaps.clear();
        while let Some(Action::ReorderColumn { from, to }) = next {
            swaps.push((from, to));
            table.reorder_column(from, to);
            next = grid.continue_drag();
        }
        assert_eq!(swaps, vec![(3, 2), (2, 1)]);
        assert_eq!(
            table.headers(),
            &["Feature", "Vendor 1", "Vendor 2", "Vendor 3", "Vendor 4"]
        );
    }

    #[test]
    fn test_wide_table_scrolls_to_cursor_column() {
        let mut table = Table::new();
        for _ in 0..7 {
            table.add_column();
        }
        table.update_header(9, "LastVendor");
        let mut grid = GridComponent::new();
        grid.cursor.col = 9;

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                draw_grid(frame, area, &mut grid, &table, true)
            })
            .unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();

        assert!(screen.contains("LastVendor"));
        assert!(screen.contains("Feature"));
        assert!(!screen.contains("Vendor 1 "));
        assert!(screen.contains("◀"));

        // Clicks land on the scrolled column, not on the one at that index
        let geometry = grid.geometry.clone().unwrap();
        let x = geometry.column_x(9).unwrap();
        assert_eq!(geometry.column_at(x), Some(9));
        assert_eq!(geometry.column_x(1), None);

        // Moving back to the left brings the first data columns back
        grid.cursor.col = 1;
        let screen = render_to_string(&mut grid, &table);
        assert!(screen.contains("Vendor 1"));
        assert!(!screen.contains("LastVendor"));
    }

    #[test]
    fn test_feature_header_does_not_start_drag() {
        let table = Table::new();
        let mut grid = GridComponent::new();
        let geometry =
            GridGeometry::compute(Rect::new(0, 0, 80, 12), &column_widths(&table, None), &[0, 1, 2], 0);
        let header_y = geometry.header_y;
        let x = geometry.column_x(0).unwrap();
        grid.geometry = Some(geometry);

        grid.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), x, header_y), &table);
        assert_eq!(grid.dragging(), None);
        assert_eq!(grid.cursor.row, CursorRow::Header);
    }

    #[test]
    fn test_sync_clamps_cursor_after_deletes() {
        let mut table = pricing_table();
        let mut grid = GridComponent::new();
        grid.cursor = GridCursor {
            row: CursorRow::Body(1),
            col: 2,
        };
        grid.start_editing(&table);

        table.delete_column(2);
        table.delete_row(1);
        grid.sync(&table);

        assert_eq!(grid.cursor, GridCursor { row: CursorRow::Body(0), col: 1 });
        assert!(!grid.is_editing());

        table.delete_row(0);
        grid.sync(&table);
        assert_eq!(grid.cursor.row, CursorRow::Header);
    }

    #[test]
    fn test_fit_truncates_by_display_width() {
        assert_eq!(fit("abc", 5, false), "abc  ");
        assert_eq!(fit("abc", 5, true), "  abc");
        assert_eq!(fit("abcdefgh", 5, false), "abcd…");
        assert_eq!(fit("日本語テキスト", 6, false).width(), 6);
    }

    #[test]
    fn test_render_shows_formatted_values_and_totals() {
        let table = pricing_table();
        let mut grid = GridComponent::new();
        let screen = render_to_string(&mut grid, &table);

        assert!(screen.contains("$1,234.50"));
        assert!(screen.contains("$100.00"));
        assert!(screen.contains("unlimited"));
        assert!(screen.contains("Total"));
        assert!(screen.contains("$1,244.50"));
        assert!(grid.geometry.is_some());
    }
}
