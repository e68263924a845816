//! Domain state - business/data state separate from UI concerns

use super::table::Table;
use std::time::Instant;

/// Domain state for one editing session
#[derive(Debug, Default)]
pub struct DomainState {
    /// The comparison table being edited
    pub table: Table,

    /// Free-text product description used as the generation prompt
    pub description: String,

    /// When the in-flight generation request started (if any)
    generation_started: Option<Instant>,
}

impl DomainState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a generation request is outstanding
    ///
    /// The description bar disables its generate control while this is set;
    /// the app checks it before issuing a new request.
    pub fn is_generating(&self) -> bool {
        self.generation_started.is_some()
    }

    /// Mark a generation request as in flight
    pub fn begin_generation(&mut self) {
        self.generation_started = Some(Instant::now());
    }

    /// Clear the in-flight flag, returning how long the request took
    pub fn finish_generation(&mut self) -> Option<f64> {
        self.generation_started
            .take()
            .map(|started| started.elapsed().as_secs_f64())
    }

    /// Seconds since the in-flight request started
    pub fn generation_elapsed_secs(&self) -> Option<f64> {
        self.generation_started
            .map(|started| started.elapsed().as_secs_f64())
    }
}
