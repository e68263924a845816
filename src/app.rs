//! Root application component
//!
//! The App struct implements the Component trait, acting as the root component
//! that delegates event handling and rendering to child components. Every
//! table mutation arrives here as an Action and is applied to the domain
//! state in one place.

use crate::action::Action;
use crate::component::Component;
use crate::components::{
    draw_main_screen, DescriptionBar, GridComponent, HelpDialog, MainLayout, MainRenderContext,
    NoticeDialog, QuitDialog,
};
use crate::error::GenerationError;
use crate::model::modal::{Modal, ModalStack};
use crate::model::{CursorRow, DomainState, Focus};
use crate::services::{build_prompt, CompletionService, GenerationOutcome, GenerationRunner};
use anyhow::Result;
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Position, Rect},
    Frame,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates between components
pub struct App {
    /// Domain state (table, description, generation flag)
    pub domain: DomainState,

    /// Which part of the screen receives keystrokes
    pub focus: Focus,

    /// Modal overlay stack
    pub modals: ModalStack,

    /// Completion backend used for generation
    completion: Arc<dyn CompletionService>,

    /// Background runner for the outstanding generation request
    generation: GenerationRunner,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: Option<String>,

    /// Areas from the last draw, for mouse routing
    layout: MainLayout,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub grid: GridComponent,
    pub description_bar: DescriptionBar,
    pub quit_dialog: QuitDialog,
    pub help_dialog: HelpDialog,
    pub notice_dialog: NoticeDialog,
}

impl App {
    pub fn new(completion: Arc<dyn CompletionService>) -> App {
        App {
            domain: DomainState::new(),
            focus: Focus::default(),
            modals: ModalStack::new(),
            completion,
            generation: GenerationRunner::new(),
            should_quit: false,
            status_message: None,
            layout: MainLayout::default(),
            grid: GridComponent::new(),
            description_bar: DescriptionBar::new(),
            quit_dialog: QuitDialog,
            help_dialog: HelpDialog::default(),
            notice_dialog: NoticeDialog::default(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Generation
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate the description and spawn a completion request
    fn start_generation(&mut self) -> Result<(), GenerationError> {
        let description = self.domain.description.trim();
        if description.is_empty() {
            return Err(GenerationError::EmptyDescription);
        }
        if self.domain.is_generating() || self.generation.is_pending() {
            return Err(GenerationError::AlreadyInFlight);
        }

        let prompt = build_prompt(description);
        info!(description_len = description.len(), "requesting generated table");

        self.domain.begin_generation();
        self.generation.spawn(Arc::clone(&self.completion), prompt);
        self.status_message = Some("Generating table…".to_string());
        Ok(())
    }

    /// Apply a finished request: replace the table, or report and keep it
    fn finish_generation(&mut self, outcome: GenerationOutcome) {
        let elapsed = self.domain.finish_generation().unwrap_or_default();

        let result = outcome.map_err(GenerationError::from).and_then(|text| {
            self.domain
                .table
                .populate_from_description(&text)
                .map_err(GenerationError::from)
        });

        match result {
            Ok(()) => {
                let table = &self.domain.table;
                info!(
                    rows = table.row_count(),
                    columns = table.column_count(),
                    elapsed_secs = elapsed,
                    "generated table applied"
                );
                self.status_message = Some(format!(
                    "Generated {} rows in {:.1}s",
                    table.row_count(),
                    elapsed
                ));
                self.grid.reset();
                self.focus = Focus::Grid;
            }
            Err(e) => {
                warn!(error = %e, elapsed_secs = elapsed, "generation failed");
                self.status_message = None;
                self.show_error(&e);
            }
        }
    }

    fn show_error(&mut self, error: &GenerationError) {
        self.modals.push(Modal::notice(error.title(), error.to_string()));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Table edits
    // ─────────────────────────────────────────────────────────────────────────

    fn apply_table_action(&mut self, action: Action) -> Result<Option<Action>> {
        let table = &mut self.domain.table;

        match action {
            Action::AddRow => {
                table.add_row();
                self.grid.cursor.row = CursorRow::Body(table.row_count() - 1);
            }
            Action::AddColumn => {
                table.add_column();
                self.grid.cursor.col = table.column_count() - 1;
            }
            Action::DeleteRow(row) => {
                table.delete_row(row);
            }
            Action::DeleteColumn(col) => {
                if !table.delete_column(col) {
                    self.status_message =
                        Some("A table keeps at least two columns".to_string());
                }
            }
            Action::ReorderColumn { from, to } => {
                if table.reorder_column(from, to) {
                    self.grid.follow_reorder(from, to);
                    self.grid.sync(table);
                    // A header drag may still have columns to cross
                    return Ok(self.grid.continue_drag());
                }
            }
            Action::UpdateHeader { col, ref text } => {
                table.update_header(col, text);
            }
            Action::UpdateCellValue { row, col, ref text } => {
                table.update_cell_value(row, col, text);
            }
            Action::UpdateCellKind { row, col, kind } => {
                table.update_cell_kind(row, col, kind);
            }
            _ => return Ok(None),
        }

        self.grid.sync(&self.domain.table);
        Ok(None)
    }

    /// Write the table to the log as JSON
    fn save(&mut self) {
        let saved_at = Local::now();
        match serde_json::to_string(&self.domain.table) {
            Ok(json) => {
                info!(
                    target: "compare_tui::save",
                    saved_at = %saved_at.to_rfc3339(),
                    rows = self.domain.table.row_count(),
                    table = %json,
                    "table saved"
                );
                self.status_message = Some(format!(
                    "Saved {} rows to the log at {}",
                    self.domain.table.row_count(),
                    saved_at.format("%H:%M:%S")
                ));
            }
            Err(e) => {
                error!(error = %e, "could not serialize table");
                self.modals
                    .push(Modal::notice("Save failed", e.to_string()));
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for App {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(Some(Action::ForceQuit));
        }

        if let Some(modal) = self.modals.top().cloned() {
            return self.handle_modal_key_event(&modal, key);
        }

        match self.focus {
            Focus::Description => self.description_bar.handle_key_event(key),
            Focus::Grid => Ok(self.grid.handle_key(key, &self.domain.table)),
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if !self.modals.is_empty() {
            return Ok(None);
        }

        let position = Position::new(mouse.column, mouse.row);
        if mouse.kind == MouseEventKind::Down(MouseButton::Left)
            && self.layout.description.contains(position)
        {
            return Ok(Some(Action::FocusDescription));
        }

        Ok(self.grid.handle_mouse(mouse, &self.domain.table))
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        if action != Action::Tick {
            debug!(action = %action, "update");
        }

        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => {
                if let Some(outcome) = self.generation.poll() {
                    self.finish_generation(outcome);
                }
            }
            Action::Resize(_, _) => {}
            Action::ForceQuit => {
                self.should_quit = true;
            }

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => {
                self.modals.push(Modal::QuitConfirm);
            }
            Action::OpenHelp => {
                self.help_dialog.scroll_offset = 0;
                self.modals.push(Modal::Help);
            }
            Action::CloseModal => {
                self.modals.pop();
            }
            Action::ConfirmModal => {
                if let Some(Modal::QuitConfirm) = self.modals.pop() {
                    self.should_quit = true;
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Focus & Description
            // ─────────────────────────────────────────────────────────────────
            Action::FocusDescription => self.focus = Focus::Description,
            Action::FocusGrid => self.focus = Focus::Grid,
            Action::DescriptionInput(c) => self.domain.description.push(c),
            Action::DescriptionBackspace => {
                self.domain.description.pop();
            }
            Action::Generate => match self.start_generation() {
                Ok(()) => {}
                Err(GenerationError::AlreadyInFlight) => {
                    debug!("generate ignored, request already in flight");
                    self.status_message =
                        Some(GenerationError::AlreadyInFlight.to_string());
                }
                Err(e) => {
                    warn!(error = %e, "generation refused");
                    self.show_error(&e);
                }
            },

            // ─────────────────────────────────────────────────────────────────
            // Grid
            // ─────────────────────────────────────────────────────────────────
            Action::AddRow
            | Action::AddColumn
            | Action::DeleteRow(_)
            | Action::DeleteColumn(_)
            | Action::ReorderColumn { .. }
            | Action::UpdateHeader { .. }
            | Action::UpdateCellValue { .. }
            | Action::UpdateCellKind { .. } => {
                self.status_message = None;
                return self.apply_table_action(action);
            }

            // ─────────────────────────────────────────────────────────────────
            // Session
            // ─────────────────────────────────────────────────────────────────
            Action::Save => self.save(),
            Action::SetStatus(msg) => {
                self.status_message = Some(msg);
            }
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let ctx = MainRenderContext {
            table: &self.domain.table,
            description: &self.domain.description,
            focus: self.focus,
            generating: self.domain.generation_elapsed_secs(),
            status_message: self.status_message.as_deref(),
        };

        self.layout = draw_main_screen(
            frame,
            area,
            &mut self.grid,
            &mut self.description_bar,
            &ctx,
        )?;

        if let Some(modal) = self.modals.top().cloned() {
            self.draw_modal(frame, area, &modal)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helper Methods
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    fn handle_modal_key_event(&mut self, modal: &Modal, key: KeyEvent) -> Result<Option<Action>> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.handle_key_event(key),
            Modal::Help => self.help_dialog.handle_key_event(key),
            Modal::Notice { .. } => self.notice_dialog.handle_key_event(key),
        }
    }

    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: &Modal) -> Result<()> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.draw(frame, area)?,
            Modal::Help => self.help_dialog.draw(frame, area)?,
            Modal::Notice { title, message } => {
                self.notice_dialog.set_notice(title, message);
                self.notice_dialog.draw(frame, area)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellKind, GridCursor};
    use crate::services::CompletionError;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::Mutex;
    use std::thread;
    use std::time::{Duration, Instant};

    const GENERATED: &str = r#"Here you go:
```json
{
  "headers": ["Feature", "Asana", "Trello"],
  "rows": [
    {"feature": "Price per seat", "kind": "currency", "vendor1": 10.99, "vendor2": "5"},
    {"feature": "Integrations", "kind": "number", "vendor1": "200", "vendor2": "150"}
  ]
}
```"#;

    struct StaticService(&'static str);

    impl CompletionService for StaticService {
        fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingService;

    impl CompletionService for FailingService {
        fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            Err(CompletionError::Http {
                status: 503,
                message: "upstream unavailable".to_string(),
            })
        }
    }

    /// Blocks every request until the test releases it
    struct GatedService {
        calls: AtomicUsize,
        gate: Mutex<Receiver<()>>,
    }

    impl CompletionService for GatedService {
        fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gate.lock().unwrap();
            gate.recv_timeout(Duration::from_secs(5))
                .map_err(|e| CompletionError::Network(e.to_string()))?;
            Ok(GENERATED.to_string())
        }
    }

    fn gated() -> (Arc<GatedService>, Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let service = Arc::new(GatedService {
            calls: AtomicUsize::new(0),
            gate: Mutex::new(rx),
        });
        (service, tx)
    }

    fn app_with(service: impl CompletionService + 'static) -> App {
        App::new(Arc::new(service))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    /// Feed a key through the app the way the event loop does
    fn press(app: &mut App, code: KeyCode) {
        let mut action = app.handle_key_event(key(code)).unwrap();
        while let Some(a) = action {
            action = app.update(a).unwrap();
        }
    }

    fn type_description(app: &mut App, text: &str) {
        for c in text.chars() {
            app.update(Action::DescriptionInput(c)).unwrap();
        }
    }

    fn tick_until_idle(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.domain.is_generating() {
            assert!(Instant::now() < deadline, "generation did not finish");
            app.update(Action::Tick).unwrap();
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn top_notice_title(app: &App) -> Option<String> {
        match app.modals.top() {
            Some(Modal::Notice { title, .. }) => Some(title.clone()),
            _ => None,
        }
    }

    #[test]
    fn test_generate_requires_description() {
        let mut app = app_with(StaticService(GENERATED));
        type_description(&mut app, "   ");

        app.update(Action::Generate).unwrap();

        assert!(!app.domain.is_generating());
        assert_eq!(top_notice_title(&app).as_deref(), Some("Description required"));
        assert_eq!(app.domain.table, crate::model::Table::new());
    }

    #[test]
    fn test_generate_replaces_table() {
        let mut app = app_with(StaticService(GENERATED));
        app.grid.cursor = GridCursor {
            row: CursorRow::Header,
            col: 2,
        };
        type_description(&mut app, "project management tools");

        app.update(Action::Generate).unwrap();
        assert!(app.domain.is_generating());
        tick_until_idle(&mut app);

        let table = &app.domain.table;
        assert_eq!(table.headers(), &["Feature", "Asana", "Trello"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.display_value(0, 1).as_deref(), Some("$10.99"));
        assert_eq!(table.compute_column_total(1).as_deref(), Some("$210.99"));
        assert_eq!(app.grid.cursor, GridCursor::default());
        assert!(app.modals.is_empty());
    }

    #[test]
    fn test_transport_failure_keeps_table() {
        let mut app = app_with(FailingService);
        app.update(Action::UpdateCellValue {
            row: 0,
            col: 0,
            text: "Uptime".to_string(),
        })
        .unwrap();
        let before = app.domain.table.clone();
        type_description(&mut app, "CRMs");

        app.update(Action::Generate).unwrap();
        tick_until_idle(&mut app);

        assert_eq!(app.domain.table, before);
        assert_eq!(top_notice_title(&app).as_deref(), Some("Generation failed"));

        // Dismissing the notice allows another attempt
        press(&mut app, KeyCode::Esc);
        assert!(app.modals.is_empty());
        app.update(Action::Generate).unwrap();
        assert!(app.domain.is_generating());
        tick_until_idle(&mut app);
    }

    #[test]
    fn test_unusable_payload_keeps_table() {
        let mut app = app_with(StaticService("Sorry, I can't help with that."));
        let before = app.domain.table.clone();
        type_description(&mut app, "CRMs");

        app.update(Action::Generate).unwrap();
        tick_until_idle(&mut app);

        assert_eq!(app.domain.table, before);
        assert_eq!(top_notice_title(&app).as_deref(), Some("Unusable response"));
    }

    #[test]
    fn test_second_generate_while_in_flight_is_ignored() {
        let (service, release) = gated();
        let mut app = App::new(service.clone());
        type_description(&mut app, "note-taking apps");

        app.update(Action::Generate).unwrap();
        app.update(Action::Generate).unwrap();
        app.update(Action::Tick).unwrap();

        assert!(app.domain.is_generating());
        assert!(app.modals.is_empty());
        assert!(app.status_message.as_deref().unwrap().contains("already"));

        release.send(()).unwrap();
        tick_until_idle(&mut app);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.domain.table.row_count(), 2);
    }

    #[test]
    fn test_delete_column_refused_at_minimum() {
        let mut app = app_with(FailingService);
        app.update(Action::DeleteColumn(2)).unwrap();
        app.update(Action::DeleteColumn(1)).unwrap();

        assert_eq!(app.domain.table.column_count(), 2);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_keyboard_edit_flow() {
        let mut app = app_with(FailingService);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char('t'));
        press(&mut app, KeyCode::Enter);
        for c in "1500".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        let cell = app.domain.table.cell(0, 1).unwrap();
        assert_eq!(cell.value, "1500");
        assert_eq!(cell.kind, CellKind::Number);
        assert_eq!(app.domain.table.display_value(0, 1).as_deref(), Some("1,500"));
    }

    #[test]
    fn test_add_row_and_column_move_cursor() {
        let mut app = app_with(FailingService);
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('c'));

        assert_eq!(app.domain.table.row_count(), 2);
        assert_eq!(app.domain.table.column_count(), 4);
        assert_eq!(
            app.grid.cursor,
            GridCursor {
                row: CursorRow::Body(1),
                col: 3,
            }
        );
    }

    #[test]
    fn test_reorder_moves_cursor_with_column() {
        let mut app = app_with(FailingService);
        app.update(Action::UpdateHeader {
            col: 1,
            text: "Acme".to_string(),
        })
        .unwrap();
        app.grid.cursor.col = 1;

        press(&mut app, KeyCode::Char('>'));

        assert_eq!(app.domain.table.headers()[2], "Acme");
        assert_eq!(app.grid.cursor.col, 2);
    }

    #[test]
    fn test_quit_requires_confirmation() {
        let mut app = app_with(FailingService);
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.modals.top(), Some(&Modal::QuitConfirm));
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Char('n'));
        assert!(app.modals.is_empty());

        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_description_focus_routes_typing() {
        let mut app = app_with(FailingService);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Description);

        // Grid shortcuts are plain text here
        for c in "a q".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.domain.description, "a ");
        assert_eq!(app.domain.table.row_count(), 1);
        assert!(app.modals.is_empty());

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.focus, Focus::Grid);
    }

    #[test]
    fn test_save_leaves_table_untouched() {
        let mut app = app_with(FailingService);
        let before = app.domain.table.clone();
        app.update(Action::Save).unwrap();

        assert_eq!(app.domain.table, before);
        assert!(app.status_message.as_deref().unwrap().starts_with("Saved 1 rows"));
    }

    #[test]
    fn test_draw_smoke() {
        let mut app = app_with(FailingService);
        app.update(Action::OpenHelp).unwrap();

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                app.draw(frame, area).unwrap();
            })
            .unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Description"));
        assert!(screen.contains("Controls"));
    }
}
