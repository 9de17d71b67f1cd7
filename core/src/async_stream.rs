//! Async streaming support.
//!
//! The assembler itself is synchronous; this module moves it behind async
//! boundaries so events can arrive from a task reading a socket or a file.
//!
//! # Architecture
//!
//! - **Source task** sends [`SourceEvent`]s into a channel
//! - **AssemblerTask** processes them and sends [`Event`]s to the consumer
//! - **Consumer** receives start/end pass-through, elements, lifecycle and errors
//!
//! Bounded channels give natural backpressure: a consumer that stops
//! receiving eventually blocks the assembler, which blocks the source.
//! Dropping the receiving end cancels the pipeline.
//!
//! # Example
//!
//! ```ignore
//! use xml_object_stream_core::async_stream::{StreamConfig, tokio_impl};
//!
//! let (source_tx, mut events, task) =
//!     tokio_impl::channel(TreeAssembler::default(), StreamConfig::default());
//! tokio::spawn(task.run());
//!
//! tokio::spawn(async move {
//!     for event in read_events() {
//!         source_tx.send(event).await?;
//!     }
//! });
//!
//! while let Some(event) = events.recv().await {
//!     if let Event::Element(node) = event {
//!         handle(node);
//!     }
//! }
//! ```

use std::collections::VecDeque;

use crate::assembler::TreeAssembler;
use crate::event::{Event, SourceEvent};

/// Error type for async streaming operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The consumer dropped its receiver.
    #[error("channel closed unexpectedly")]
    ChannelClosed,
}

/// Channel sizing for the async pipeline.
///
/// # Presets
///
/// - [`StreamConfig::small()`]: low memory
/// - [`StreamConfig::medium()`]: balanced (default)
/// - [`StreamConfig::large()`]: high throughput
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Capacity of the source event channel. Default: 1024.
    pub source_buffer_size: usize,
    /// Capacity of the output event channel. Default: 64.
    pub event_buffer_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::medium()
    }
}

impl StreamConfig {
    pub const fn small() -> Self {
        Self {
            source_buffer_size: 128,
            event_buffer_size: 16,
        }
    }

    pub const fn medium() -> Self {
        Self {
            source_buffer_size: 1024,
            event_buffer_size: 64,
        }
    }

    pub const fn large() -> Self {
        Self {
            source_buffer_size: 8192,
            event_buffer_size: 512,
        }
    }
}

#[cfg(feature = "tokio")]
pub mod tokio_impl {
    //! Tokio-based async pipeline.

    use super::*;
    use ::tokio::sync::mpsc;
    use tracing::debug;

    /// Creates the channels around an [`AssemblerTask`].
    ///
    /// Returns the sender for source events, the receiver for assembler
    /// events, and the task that must be driven (usually spawned).
    pub fn channel(
        assembler: TreeAssembler,
        config: StreamConfig,
    ) -> (
        mpsc::Sender<SourceEvent>,
        mpsc::Receiver<Event>,
        AssemblerTask,
    ) {
        let (source_tx, source_rx) = mpsc::channel(config.source_buffer_size.max(1));
        let (event_tx, event_rx) = mpsc::channel(config.event_buffer_size.max(1));
        (
            source_tx,
            event_rx,
            AssemblerTask::new(source_rx, event_tx, assembler),
        )
    }

    /// Async task that receives source events and emits assembler events.
    #[derive(Debug)]
    pub struct AssemblerTask {
        source_rx: mpsc::Receiver<SourceEvent>,
        event_tx: mpsc::Sender<Event>,
        assembler: TreeAssembler,
        out: VecDeque<Event>,
    }

    impl AssemblerTask {
        pub fn new(
            source_rx: mpsc::Receiver<SourceEvent>,
            event_tx: mpsc::Sender<Event>,
            assembler: TreeAssembler,
        ) -> Self {
            Self {
                source_rx,
                event_tx,
                assembler,
                out: VecDeque::new(),
            }
        }

        /// Runs until every source sender is dropped.
        ///
        /// Returns the assembler so callers can inspect unclosed state.
        pub async fn run(mut self) -> Result<TreeAssembler, StreamError> {
            while let Some(event) = self.source_rx.recv().await {
                self.assembler.process(event, &mut self.out);
                while let Some(event) = self.out.pop_front() {
                    self.event_tx
                        .send(event)
                        .await
                        .map_err(|_| StreamError::ChannelClosed)?;
                }
            }
            debug!(depth = self.assembler.depth(), "source channel closed");
            Ok(self.assembler)
        }
    }
}

#[cfg(feature = "futures")]
pub mod futures_impl {
    //! Futures-based stream adapter (runtime-agnostic).

    use super::*;
    use core::pin::Pin;
    use core::task::{Context, Poll};
    use futures_core::Stream;

    /// A stream of assembler events over a stream of source events.
    #[derive(Debug)]
    pub struct EventStream<S> {
        inner: S,
        assembler: TreeAssembler,
        pending: VecDeque<Event>,
    }

    impl<S> EventStream<S>
    where
        S: Stream<Item = SourceEvent>,
    {
        pub fn new(inner: S, assembler: TreeAssembler) -> Self {
            Self {
                inner,
                assembler,
                pending: VecDeque::new(),
            }
        }

        pub fn assembler(&self) -> &TreeAssembler {
            &self.assembler
        }
    }

    impl<S> Stream for EventStream<S>
    where
        S: Stream<Item = SourceEvent> + Unpin,
    {
        type Item = Event;

        fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            let this = self.get_mut();
            loop {
                if let Some(event) = this.pending.pop_front() {
                    return Poll::Ready(Some(event));
                }
                match Pin::new(&mut this.inner).poll_next(cx) {
                    Poll::Ready(Some(event)) => {
                        this.assembler.process(event, &mut this.pending);
                    }
                    Poll::Ready(None) => return Poll::Ready(None),
                    Poll::Pending => return Poll::Pending,
                }
            }
        }
    }
}
