// src/engine/mod.rs

//! Batch execution engine.
//!
//! - [`queue`] admits commands FIFO under a concurrency limit and hands each
//!   one to the retry policy.
//! - [`stream`] holds the per-command and aggregate event streams and the
//!   merge combinator that fans them in.
//! - [`runtime`] wires queue and aggregator together for one invocation.

pub mod queue;
pub mod runtime;
pub mod stream;

pub use queue::{AdmissionQueue, effective_limit};
pub use runtime::{BatchOptions, Runtime};
pub use stream::EventStream;

/// Event emitted by a per-command or aggregate stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultEvent {
    /// A piece of a command's output, as it arrived. The first piece of each
    /// command starts with its `$ <name>` header line.
    Data(String),
    /// The stream finished normally. Terminal.
    Complete,
    /// The stream failed. Terminal.
    Failed(String),
}

impl ResultEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ResultEvent::Data(_))
    }
}

/// Lifecycle of an [`EventStream`].
///
/// `Pending` until first polled, `Active` while events flow, then exactly
/// one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Pending,
    Active,
    Complete,
    Failed,
}

impl StreamState {
    pub fn is_terminal(self) -> bool {
        matches!(self, StreamState::Complete | StreamState::Failed)
    }
}
