//! Tests for the async pipeline adapters.
//!
//! The same event sequence is pushed through the tokio task and the
//! futures stream and compared with the synchronous assembler.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};

use futures_core::Stream;
use xml_object_stream::async_stream::{
    StreamConfig, StreamError, futures_impl::EventStream, tokio_impl,
};
use xml_object_stream::{AssemblerConfig, Event, Lifecycle, SourceEvent, TreeAssembler};

fn feed(items: usize) -> Vec<SourceEvent> {
    let mut events = vec![SourceEvent::start("feed")];
    for i in 0..items {
        events.push(SourceEvent::start_with("item", [("id", i.to_string())]));
        events.push(SourceEvent::text(format!(" item {i} ")));
        events.push(SourceEvent::end("item"));
    }
    events.push(SourceEvent::end("feed"));
    events.push(SourceEvent::Lifecycle(Lifecycle::End));
    events
}

fn assemble_sync(events: Vec<SourceEvent>) -> Vec<Event> {
    let mut assembler = TreeAssembler::default();
    let mut out = Vec::new();
    for event in events {
        assembler.process(event, &mut out);
    }
    out
}

#[test]
fn test_stream_config_default() {
    let config = StreamConfig::default();
    assert_eq!(config.source_buffer_size, 1024);
    assert_eq!(config.event_buffer_size, 64);
    assert_eq!(config, StreamConfig::medium());
}

#[test]
fn test_stream_config_presets_grow() {
    let small = StreamConfig::small();
    let large = StreamConfig::large();
    assert!(small.source_buffer_size < large.source_buffer_size);
    assert!(small.event_buffer_size < large.event_buffer_size);
}

#[test]
fn test_stream_error_display() {
    assert_eq!(
        StreamError::ChannelClosed.to_string(),
        "channel closed unexpectedly"
    );
}

mod tokio_tests {
    use super::*;

    #[tokio::test]
    async fn test_task_matches_sync_assembler() {
        let (source_tx, mut events, task) =
            tokio_impl::channel(TreeAssembler::default(), StreamConfig::small());
        let handle = tokio::spawn(task.run());

        tokio::spawn(async move {
            for event in feed(50) {
                source_tx.send(event).await.unwrap();
            }
        });

        let mut received = Vec::new();
        while let Some(event) = events.recv().await {
            received.push(event);
        }

        let assembler = handle.await.unwrap().unwrap();
        assert_eq!(assembler.depth(), 0);
        assert_eq!(received, assemble_sync(feed(50)));
        assert_eq!(
            received.iter().filter(|e| e.as_element().is_some()).count(),
            50
        );
    }

    #[tokio::test]
    async fn test_task_reports_closed_consumer() {
        let (source_tx, events, task) =
            tokio_impl::channel(TreeAssembler::default(), StreamConfig::default());
        drop(events);

        source_tx.send(SourceEvent::start("feed")).await.unwrap();
        drop(source_tx);

        assert_eq!(task.run().await.unwrap_err(), StreamError::ChannelClosed);
    }

    #[tokio::test]
    async fn test_task_keeps_unclosed_state() {
        let assembler = TreeAssembler::new(AssemblerConfig::new().with_element_depth(2)).unwrap();
        let (source_tx, mut events, task) = tokio_impl::channel(assembler, StreamConfig::default());
        let handle = tokio::spawn(task.run());

        for name in ["a", "b", "c"] {
            source_tx.send(SourceEvent::start(name)).await.unwrap();
        }
        drop(source_tx);

        let mut starts = 0;
        while let Some(event) = events.recv().await {
            assert!(matches!(event, Event::StartElement { .. }));
            starts += 1;
        }
        assert_eq!(starts, 3);

        let assembler = handle.await.unwrap().unwrap();
        assert_eq!(assembler.depth(), 3);
        assert_eq!(assembler.open_nodes(), 1);
    }
}

mod futures_tests {
    use super::*;

    /// Stream over a queue that reports `Pending` every other poll.
    struct Stuttering {
        events: VecDeque<SourceEvent>,
        ready: bool,
    }

    impl Stream for Stuttering {
        type Item = SourceEvent;

        fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<SourceEvent>> {
            self.ready = !self.ready;
            if self.ready {
                Poll::Ready(self.events.pop_front())
            } else {
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    fn drain<S: Stream + Unpin>(mut stream: S) -> Vec<S::Item> {
        let mut cx = Context::from_waker(Waker::noop());
        let mut out = Vec::new();
        loop {
            match Pin::new(&mut stream).poll_next(&mut cx) {
                Poll::Ready(Some(item)) => out.push(item),
                Poll::Ready(None) => return out,
                Poll::Pending => continue,
            }
        }
    }

    #[test]
    fn test_event_stream_matches_sync_assembler() {
        let source = Stuttering {
            events: feed(10).into(),
            ready: false,
        };
        let stream = EventStream::new(source, TreeAssembler::default());
        assert_eq!(drain(stream), assemble_sync(feed(10)));
    }

    #[test]
    fn test_event_stream_relays_lifecycle_last() {
        let source = Stuttering {
            events: feed(1).into(),
            ready: false,
        };
        let events = drain(EventStream::new(source, TreeAssembler::default()));
        assert_eq!(events.last(), Some(&Event::Lifecycle(Lifecycle::End)));
    }
}
