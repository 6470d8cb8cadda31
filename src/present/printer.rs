// src/present/printer.rs

use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::engine::{EventStream, ResultEvent};

use super::style::{Style, paint};
use super::{BatchOutcome, BatchSummary, PresentOptions};

/// Writes the events of an aggregate stream to a terminal (or any writer).
///
/// - `Data`: written as-is and flushed right away, unless `silent`. Chunks
///   of concurrent commands interleave in arrival order.
/// - `Failed`: written in red on a line of its own, even when `silent`; it
///   is the only trace of a batch-level failure.
pub struct Printer<W> {
    writer: W,
    options: PresentOptions,
    at_line_start: bool,
}

impl<W: AsyncWrite + Unpin> Printer<W> {
    pub fn new(writer: W, options: PresentOptions) -> Self {
        Self {
            writer,
            options,
            at_line_start: true,
        }
    }

    /// Drain `stream` to completion.
    pub async fn consume(&mut self, mut stream: EventStream) -> std::io::Result<BatchSummary> {
        let mut summary = BatchSummary {
            data_events: 0,
            outcome: BatchOutcome::Complete,
        };

        while let Some(event) = stream.next().await {
            match event {
                ResultEvent::Data(text) => {
                    summary.data_events += 1;
                    if !self.options.silent {
                        self.write(&text).await?;
                        self.writer.flush().await?;
                    }
                }
                ResultEvent::Failed(msg) => {
                    if !self.at_line_start {
                        self.write("\n").await?;
                    }
                    let line = paint(&msg, Style::Red, self.options.color);
                    self.write(&line).await?;
                    self.write("\n").await?;
                    summary.outcome = BatchOutcome::Failed(msg);
                }
                ResultEvent::Complete => {
                    summary.outcome = BatchOutcome::Complete;
                }
            }
        }

        self.writer.flush().await?;
        debug!(data_events = summary.data_events, outcome = ?summary.outcome, "batch output drained");
        Ok(summary)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    async fn write(&mut self, text: &str) -> std::io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.writer.write_all(text.as_bytes()).await?;
        self.at_line_start = text.ends_with('\n');
        Ok(())
    }
}
