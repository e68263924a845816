//! UI state - which part of the screen receives keystrokes

/// Input focus in the main screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Typing into the description bar
    Description,
    /// Navigating and editing the grid
    #[default]
    Grid,
}

/// Row the grid cursor sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorRow {
    Header,
    Body(usize),
}

/// Grid cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCursor {
    pub row: CursorRow,
    pub col: usize,
}

impl Default for GridCursor {
    fn default() -> Self {
        Self {
            row: CursorRow::Body(0),
            col: 0,
        }
    }
}
