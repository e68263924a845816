//! Action enum - All possible application actions
//!
//! Actions are discrete operations that the application can perform.
//! Components emit Actions in response to events, and the App processes
//! them to update state. Every grid mutation travels as one of these.

use crate::model::CellKind;
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick for polling and redraws
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Force quit without confirmation
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    /// Open quit confirmation dialog
    OpenQuitDialog,
    /// Open help dialog showing all keyboard shortcuts
    OpenHelp,
    /// Close the current modal
    CloseModal,
    /// Confirm the current modal action
    ConfirmModal,

    // ─────────────────────────────────────────────────────────────────────────
    // Focus & Description
    // ─────────────────────────────────────────────────────────────────────────
    /// Move focus to the description bar
    FocusDescription,
    /// Move focus to the grid
    FocusGrid,
    /// Add character to the description
    DescriptionInput(char),
    /// Remove last character from the description
    DescriptionBackspace,
    /// Request a table from the completion service
    Generate,

    // ─────────────────────────────────────────────────────────────────────────
    // Grid Structure
    // ─────────────────────────────────────────────────────────────────────────
    AddRow,
    AddColumn,
    DeleteRow(usize),
    DeleteColumn(usize),
    /// Swap two columns (one step of a drag or a keyboard move)
    ReorderColumn { from: usize, to: usize },

    // ─────────────────────────────────────────────────────────────────────────
    // Grid Content
    // ─────────────────────────────────────────────────────────────────────────
    UpdateHeader { col: usize, text: String },
    UpdateCellValue { row: usize, col: usize, text: String },
    UpdateCellKind { row: usize, col: usize, kind: CellKind },

    // ─────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────
    /// Write the current table to the log
    Save,
    /// Show a message in the status bar
    SetStatus(String),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::CloseModal => write!(f, "CloseModal"),
            Action::ConfirmModal => write!(f, "ConfirmModal"),
            Action::FocusDescription => write!(f, "FocusDescription"),
            Action::FocusGrid => write!(f, "FocusGrid"),
            Action::DescriptionInput(c) => write!(f, "DescriptionInput('{}')", c),
            Action::DescriptionBackspace => write!(f, "DescriptionBackspace"),
            Action::Generate => write!(f, "Generate"),
            Action::AddRow => write!(f, "AddRow"),
            Action::AddColumn => write!(f, "AddColumn"),
            Action::DeleteRow(row) => write!(f, "DeleteRow({})", row),
            Action::DeleteColumn(col) => write!(f, "DeleteColumn({})", col),
            Action::ReorderColumn { from, to } => write!(f, "ReorderColumn({} -> {})", from, to),
            Action::UpdateHeader { col, text } => write!(f, "UpdateHeader({}, {:?})", col, text),
            Action::UpdateCellValue { row, col, text } => {
                write!(f, "UpdateCellValue({}, {}, {:?})", row, col, text)
            }
            Action::UpdateCellKind { row, col, kind } => {
                write!(f, "UpdateCellKind({}, {}, {})", row, col, kind)
            }
            Action::Save => write!(f, "Save"),
            Action::SetStatus(msg) => write!(f, "SetStatus({})", msg),
        }
    }
}
