// src/present/mod.rs

//! Terminal presentation of a batch's aggregate stream.

pub mod printer;
pub mod style;

pub use printer::Printer;

/// Output flags, passed through the engine untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentOptions {
    pub color: bool,
    pub silent: bool,
}

impl Default for PresentOptions {
    fn default() -> Self {
        Self {
            color: true,
            silent: false,
        }
    }
}

/// Terminal outcome of a whole batch as seen by the printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Complete,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Number of `Data` events observed.
    pub data_events: usize,
    pub outcome: BatchOutcome,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.outcome == BatchOutcome::Complete
    }

    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}
