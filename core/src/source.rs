//! Token sources: producers of [`SourceEvent`]s.

use std::collections::VecDeque;

use crate::event::{Lifecycle, SourceEvent};

/// Producer of low-level parsing events in document order.
///
/// `next_event` returns `None` whenever nothing can be produced right now:
/// the source is paused, its input is exhausted, or it was destroyed.
/// Calling [`pause`](TokenSource::pause) or [`resume`](TokenSource::resume)
/// queues the matching [`Lifecycle`] notification, which is still delivered
/// by the next `next_event` call.
pub trait TokenSource {
    fn next_event(&mut self) -> Option<SourceEvent>;

    fn pause(&mut self);

    fn resume(&mut self);

    /// Releases the underlying input. One-way.
    fn destroy(&mut self);

    /// True while paused.
    fn is_paused(&self) -> bool {
        false
    }
}

impl<T: TokenSource + ?Sized> TokenSource for Box<T> {
    fn next_event(&mut self) -> Option<SourceEvent> {
        (**self).next_event()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn resume(&mut self) {
        (**self).resume()
    }

    fn destroy(&mut self) {
        (**self).destroy()
    }

    fn is_paused(&self) -> bool {
        (**self).is_paused()
    }
}

/// Token source over any iterator of events.
///
/// # Example
///
/// ```ignore
/// let source = IterSource::new(vec![
///     SourceEvent::start("feed"),
///     SourceEvent::start("item"),
///     SourceEvent::end("item"),
///     SourceEvent::end("feed"),
/// ]);
/// ```
#[derive(Debug)]
pub struct IterSource<I> {
    inner: Option<I>,
    notifications: VecDeque<SourceEvent>,
    paused: bool,
}

impl<I: Iterator<Item = SourceEvent>> IterSource<I> {
    pub fn new(events: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            inner: Some(events.into_iter()),
            notifications: VecDeque::new(),
            paused: false,
        }
    }

    /// True once [`destroy`](TokenSource::destroy) has been called.
    pub fn is_destroyed(&self) -> bool {
        self.inner.is_none()
    }
}

impl<I: Iterator<Item = SourceEvent>> TokenSource for IterSource<I> {
    fn next_event(&mut self) -> Option<SourceEvent> {
        if let Some(event) = self.notifications.pop_front() {
            return Some(event);
        }
        if self.paused {
            return None;
        }
        self.inner.as_mut()?.next()
    }

    fn pause(&mut self) {
        if !self.paused && self.inner.is_some() {
            self.paused = true;
            self.notifications
                .push_back(SourceEvent::Lifecycle(Lifecycle::Pause));
        }
    }

    fn resume(&mut self) {
        if self.paused && self.inner.is_some() {
            self.paused = false;
            self.notifications
                .push_back(SourceEvent::Lifecycle(Lifecycle::Resume));
        }
    }

    fn destroy(&mut self) {
        self.inner = None;
        self.notifications.clear();
        self.paused = false;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pause_queues_notification_and_stops_input() {
        let mut source = IterSource::new(vec![SourceEvent::start("a"), SourceEvent::end("a")]);

        assert_eq!(source.next_event(), Some(SourceEvent::start("a")));
        source.pause();
        assert!(source.is_paused());
        assert_eq!(
            source.next_event(),
            Some(SourceEvent::Lifecycle(Lifecycle::Pause))
        );
        assert_eq!(source.next_event(), None);

        source.resume();
        assert_eq!(
            source.next_event(),
            Some(SourceEvent::Lifecycle(Lifecycle::Resume))
        );
        assert_eq!(source.next_event(), Some(SourceEvent::end("a")));
        assert_eq!(source.next_event(), None);
    }

    #[test]
    fn repeated_pause_notifies_once() {
        let mut source = IterSource::new(Vec::<SourceEvent>::new());
        source.pause();
        source.pause();
        assert_eq!(
            source.next_event(),
            Some(SourceEvent::Lifecycle(Lifecycle::Pause))
        );
        assert_eq!(source.next_event(), None);
    }

    #[test]
    fn destroy_drops_input() {
        let mut source = IterSource::new(vec![SourceEvent::start("a")]);
        source.pause();
        source.destroy();
        assert!(source.is_destroyed());
        assert_eq!(source.next_event(), None);
        source.resume();
        assert_eq!(source.next_event(), None);
    }
}
