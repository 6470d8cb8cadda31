// src/engine/stream.rs

//! Event streams and the fan-in merge.
//!
//! An [`EventStream`] delivers any number of `Data` events followed by
//! exactly one terminal event (`Complete` or `Failed`), then ends. The
//! wrapper enforces this even when the inner stream misbehaves: an inner
//! stream that simply ends is reported as `Complete`, and nothing is polled
//! after a terminal event.
//!
//! Merging two streams relays every `Data` event from both, completes once
//! both completed, and fails as soon as either fails.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{self, FusedStream, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::errors::ExecError;

use super::{ResultEvent, StreamState};

type BoxedEvents = Pin<Box<dyn Stream<Item = ResultEvent> + Send + 'static>>;

pub struct EventStream {
    inner: BoxedEvents,
    state: StreamState,
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl EventStream {
    pub fn new<S>(inner: S) -> Self
    where
        S: Stream<Item = ResultEvent> + Send + 'static,
    {
        Self {
            inner: Box::pin(inner),
            state: StreamState::Pending,
        }
    }

    /// Stream of the events a command task sends on `rx`.
    ///
    /// If every sender is dropped before a terminal event was sent, the
    /// stream fails with [`ExecError::Lost`] instead of completing.
    pub fn from_channel(rx: mpsc::Receiver<ResultEvent>) -> Self {
        let lost = stream::once(async { ResultEvent::Failed(ExecError::Lost.to_string()) });
        Self::new(ReceiverStream::new(rx).chain(lost))
    }

    pub fn from_events(events: Vec<ResultEvent>) -> Self {
        Self::new(stream::iter(events))
    }

    /// A stream that completes immediately without data.
    pub fn completed() -> Self {
        Self::from_events(vec![ResultEvent::Complete])
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::from_events(vec![ResultEvent::Failed(message.into())])
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Fan `self` and `other` into a new stream.
    ///
    /// Both inputs are consumed; the merged handle is the only way to observe
    /// them afterwards.
    pub fn merge(self, other: EventStream) -> EventStream {
        EventStream::new(Merge::new(self, other))
    }

    /// Fan any number of streams into one.
    ///
    /// Streams are merged pairwise, layer by layer, so the merge tree stays
    /// balanced. An empty list gives a stream that completes immediately.
    pub fn merge_all(streams: impl IntoIterator<Item = EventStream>) -> EventStream {
        let mut layer: Vec<EventStream> = streams.into_iter().collect();

        while layer.len() > 1 {
            let mut next = Vec::with_capacity(layer.len().div_ceil(2));
            let mut iter = layer.into_iter();
            while let Some(first) = iter.next() {
                match iter.next() {
                    Some(second) => next.push(first.merge(second)),
                    None => next.push(first),
                }
            }
            layer = next;
        }

        layer.pop().unwrap_or_else(EventStream::completed)
    }

    fn finish(&mut self, state: StreamState) {
        self.state = state;
        // Release whatever the inner stream holds; it is never polled again.
        self.inner = Box::pin(stream::empty());
    }
}

impl Stream for EventStream {
    type Item = ResultEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<ResultEvent>> {
        if self.state.is_terminal() {
            return Poll::Ready(None);
        }
        if self.state == StreamState::Pending {
            self.state = StreamState::Active;
        }

        match self.inner.as_mut().poll_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(ResultEvent::Data(text))) => Poll::Ready(Some(ResultEvent::Data(text))),
            Poll::Ready(Some(ResultEvent::Failed(msg))) => {
                self.finish(StreamState::Failed);
                Poll::Ready(Some(ResultEvent::Failed(msg)))
            }
            Poll::Ready(Some(ResultEvent::Complete)) | Poll::Ready(None) => {
                self.finish(StreamState::Complete);
                Poll::Ready(Some(ResultEvent::Complete))
            }
        }
    }
}

impl FusedStream for EventStream {
    fn is_terminated(&self) -> bool {
        self.state.is_terminal()
    }
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Binary fan-in of two event streams.
struct Merge {
    left: EventStream,
    right: EventStream,
    left_done: bool,
    right_done: bool,
    /// Flipped on every poll so neither side can starve the other.
    right_first: bool,
}

impl Merge {
    fn new(left: EventStream, right: EventStream) -> Self {
        Self {
            left,
            right,
            left_done: false,
            right_done: false,
            right_first: false,
        }
    }

    fn side(&mut self, side: Side) -> (&mut EventStream, &mut bool) {
        match side {
            Side::Left => (&mut self.left, &mut self.left_done),
            Side::Right => (&mut self.right, &mut self.right_done),
        }
    }
}

impl Stream for Merge {
    type Item = ResultEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<ResultEvent>> {
        let this = self.get_mut();

        let order = if this.right_first {
            [Side::Right, Side::Left]
        } else {
            [Side::Left, Side::Right]
        };
        this.right_first = !this.right_first;

        for side in order {
            let (stream, done) = this.side(side);
            if *done {
                continue;
            }
            match stream.poll_next_unpin(cx) {
                Poll::Ready(Some(ResultEvent::Data(text))) => {
                    return Poll::Ready(Some(ResultEvent::Data(text)));
                }
                Poll::Ready(Some(ResultEvent::Failed(msg))) => {
                    return Poll::Ready(Some(ResultEvent::Failed(msg)));
                }
                Poll::Ready(Some(ResultEvent::Complete)) | Poll::Ready(None) => {
                    *done = true;
                }
                Poll::Pending => {}
            }
        }

        if this.left_done && this.right_done {
            Poll::Ready(Some(ResultEvent::Complete))
        } else {
            Poll::Pending
        }
    }
}
