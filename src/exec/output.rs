// src/exec/output.rs

//! Live output of one command.
//!
//! An [`OutputSink`] turns raw stdout chunks into `Data` events on the
//! command's event channel as they arrive. The first event a command emits
//! carries its `$ <name>` header; later chunks are forwarded as-is.

use tokio::sync::mpsc;
use tracing::trace;

use crate::engine::ResultEvent;

/// Capacity of a command's event channel.
///
/// A full channel stops the runner from reading stdout, which in turn
/// blocks the child on its pipe.
pub const EVENT_BUFFER: usize = 64;

pub struct OutputSink {
    tx: mpsc::Sender<ResultEvent>,
    header: Option<String>,
    /// Trailing bytes of an incomplete UTF-8 sequence.
    pending: Vec<u8>,
    at_line_start: bool,
    attempt_bytes: usize,
}

impl std::fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSink")
            .field("header_sent", &self.header.is_none())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl OutputSink {
    /// `header` is emitted (followed by a newline) in front of the first
    /// event.
    pub fn new(tx: mpsc::Sender<ResultEvent>, header: impl Into<String>) -> Self {
        Self {
            tx,
            header: Some(header.into()),
            pending: Vec::new(),
            at_line_start: true,
            attempt_bytes: 0,
        }
    }

    /// A sink plus the receiving end of its channel.
    pub fn channel(header: impl Into<String>) -> (Self, mpsc::Receiver<ResultEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        (Self::new(tx, header), rx)
    }

    /// Forward one raw stdout chunk.
    ///
    /// Bytes of a character split across chunks are held back until the
    /// rest arrives.
    pub async fn chunk(&mut self, bytes: &[u8]) {
        self.attempt_bytes += bytes.len();
        let text = self.decode(bytes);
        if !text.is_empty() {
            self.emit(text).await;
        }
    }

    /// Emit `line` on a line of its own.
    pub async fn line(&mut self, line: &str) {
        let mut text = String::with_capacity(line.len() + 2);
        if !self.at_line_start {
            text.push('\n');
        }
        text.push_str(line);
        text.push('\n');
        self.emit(text).await;
    }

    /// Mark the start of a new attempt.
    pub fn begin_attempt(&mut self) {
        self.attempt_bytes = 0;
    }

    /// Whether the current attempt produced any stdout.
    pub fn attempt_had_output(&self) -> bool {
        self.attempt_bytes > 0
    }

    /// Flush bytes still waiting for the rest of a character. The next
    /// attempt starts a fresh byte stream.
    pub async fn end_attempt(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        self.emit(text).await;
    }

    /// Emit the header alone if nothing was emitted yet.
    pub async fn finish(&mut self) {
        if self.header.is_some() {
            self.emit(String::new()).await;
        }
    }

    /// Send the command's terminal event, closing the sink.
    pub async fn close(self, terminal: ResultEvent) {
        let _ = self.tx.send(terminal).await;
    }

    fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match err.error_len() {
                        // Incomplete sequence at the end; wait for more bytes.
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                    }
                }
            }
        }
    }

    async fn emit(&mut self, text: String) {
        let text = match self.header.take() {
            Some(header) => format!("{header}\n{text}"),
            None => text,
        };
        if let Some(last) = text.chars().last() {
            self.at_line_start = last == '\n';
        }
        trace!(bytes = text.len(), "output event");
        // A dropped receiver means nobody is watching; the command keeps running.
        let _ = self.tx.send(ResultEvent::Data(text)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(mut rx: mpsc::Receiver<ResultEvent>) -> Vec<ResultEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn data(s: &str) -> ResultEvent {
        ResultEvent::Data(s.to_string())
    }

    #[tokio::test]
    async fn header_rides_on_first_chunk_only() {
        let (mut sink, rx) = OutputSink::channel("$ ls");
        sink.chunk(b"a\n").await;
        sink.chunk(b"b\n").await;
        sink.finish().await;
        sink.close(ResultEvent::Complete).await;

        assert_eq!(
            drain(rx),
            vec![data("$ ls\na\n"), data("b\n"), ResultEvent::Complete]
        );
    }

    #[tokio::test]
    async fn silent_command_still_gets_its_header() {
        let (mut sink, rx) = OutputSink::channel("$ true");
        sink.finish().await;
        drop(sink);
        assert_eq!(drain(rx), vec![data("$ true\n")]);
    }

    #[tokio::test]
    async fn character_split_across_chunks_is_reassembled() {
        let bytes = "héllo".as_bytes();
        let (mut sink, rx) = OutputSink::channel("$ x");
        sink.chunk(&bytes[..2]).await;
        sink.chunk(&bytes[2..]).await;
        drop(sink);
        assert_eq!(drain(rx), vec![data("$ x\nh"), data("éllo")]);
    }

    #[tokio::test]
    async fn invalid_bytes_are_replaced() {
        let (mut sink, rx) = OutputSink::channel("$ x");
        sink.chunk(b"a\xffb").await;
        drop(sink);
        assert_eq!(drain(rx), vec![data("$ x\na\u{fffd}b")]);
    }

    #[tokio::test]
    async fn dangling_bytes_are_flushed_at_attempt_end() {
        let (mut sink, rx) = OutputSink::channel("$ x");
        sink.chunk(&"é".as_bytes()[..1]).await;
        sink.end_attempt().await;
        drop(sink);
        assert_eq!(drain(rx), vec![data("$ x\n\u{fffd}")]);
    }

    #[tokio::test]
    async fn line_starts_on_a_fresh_line() {
        let (mut sink, rx) = OutputSink::channel("$ x");
        sink.chunk(b"partial").await;
        sink.line("boom").await;
        sink.line("again").await;
        drop(sink);
        assert_eq!(
            drain(rx),
            vec![data("$ x\npartial"), data("\nboom\n"), data("again\n")]
        );
    }

    #[tokio::test]
    async fn attempt_output_is_tracked_per_attempt() {
        let (mut sink, _rx) = OutputSink::channel("$ x");
        sink.begin_attempt();
        assert!(!sink.attempt_had_output());
        sink.chunk(b"x").await;
        assert!(sink.attempt_had_output());
        sink.begin_attempt();
        assert!(!sink.attempt_had_output());
    }
}
