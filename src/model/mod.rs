//! Model layer - centralized state management
//!
//! This module contains all state-related types:
//! - `Table` - The typed comparison grid and its operations
//! - `DomainState` - Session data (table, description, generation flag)
//! - `ModalStack` - Modal overlay management

pub mod cell;
pub mod domain;
pub mod format;
pub mod modal;
pub mod payload;
pub mod table;
pub mod ui;

// Re-export commonly used types
pub use cell::CellKind;
pub use domain::DomainState;
pub use payload::PopulateError;
pub use table::{Table, FEATURE_COLUMN};
pub use ui::{CursorRow, Focus, GridCursor};
