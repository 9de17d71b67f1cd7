//! Events consumed from a token source and events emitted to consumers.

use std::collections::VecDeque;

use crate::{Attributes, Error, Node};

/// Stream lifecycle signals, relayed from the source unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum Lifecycle {
    /// The source reached the end of its input.
    End,
    /// The underlying stream was closed.
    Close,
    /// The source stopped producing events.
    Pause,
    /// The source started producing events again.
    Resume,
}

/// Low-level parsing event delivered by a [`TokenSource`](crate::TokenSource).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum SourceEvent {
    StartElement { name: String, attributes: Attributes },
    EndElement { name: String },
    Text(String),
    Lifecycle(Lifecycle),
    /// Error reported by the source; relayed as [`Error::Source`].
    Error(String),
}

impl SourceEvent {
    /// Element-start event without attributes.
    pub fn start(name: impl Into<String>) -> Self {
        SourceEvent::StartElement {
            name: name.into(),
            attributes: Attributes::new(),
        }
    }

    /// Element-start event with attributes.
    pub fn start_with<I, K, V>(name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        SourceEvent::StartElement {
            name: name.into(),
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn end(name: impl Into<String>) -> Self {
        SourceEvent::EndElement { name: name.into() }
    }

    pub fn text(chunk: impl Into<String>) -> Self {
        SourceEvent::Text(chunk.into())
    }
}

/// Notification emitted by the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Pass-through of every accepted open tag.
    StartElement { name: String, attributes: Attributes },
    /// Pass-through of every accepted close tag.
    EndElement { name: String },
    /// A completed subtree selected by the emission policy.
    Element(Node),
    Lifecycle(Lifecycle),
    Error(Error),
}

impl Event {
    /// Returns the published node, if this is an element event.
    pub fn into_element(self) -> Option<Node> {
        match self {
            Event::Element(node) => Some(node),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element(&self) -> Option<&Node> {
        match self {
            Event::Element(node) => Some(node),
            _ => None,
        }
    }

    #[inline]
    pub fn as_error(&self) -> Option<&Error> {
        match self {
            Event::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// Receiver of assembler output.
pub trait EventSink {
    fn emit(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    #[inline]
    fn emit(&mut self, event: Event) {
        self.push(event);
    }
}

impl EventSink for VecDeque<Event> {
    #[inline]
    fn emit(&mut self, event: Event) {
        self.push_back(event);
    }
}

type Callback<T> = Box<dyn FnMut(&T) + Send>;

enum Listener {
    Any(Callback<Event>),
    Element(Callback<Node>),
    Error(Callback<Error>),
}

/// Observer registry.
///
/// Callbacks of every kind share one list and run in registration order;
/// each is skipped for events it does not observe.
///
/// # Example
///
/// ```ignore
/// let mut listeners = Listeners::new()
///     .on_element(|node| println!("{}", node.path()))
///     .on_error(|err| eprintln!("{err}"));
///
/// assembler.process(event, &mut listeners);
/// ```
#[derive(Default)]
pub struct Listeners {
    listeners: Vec<Listener>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for every event.
    pub fn on_event(mut self, f: impl FnMut(&Event) + Send + 'static) -> Self {
        self.listeners.push(Listener::Any(Box::new(f)));
        self
    }

    /// Registers a callback for published nodes.
    pub fn on_element(mut self, f: impl FnMut(&Node) + Send + 'static) -> Self {
        self.listeners.push(Listener::Element(Box::new(f)));
        self
    }

    /// Registers a callback for structural and source errors.
    pub fn on_error(mut self, f: impl FnMut(&Error) + Send + 'static) -> Self {
        self.listeners.push(Listener::Error(Box::new(f)));
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl EventSink for Listeners {
    fn emit(&mut self, event: Event) {
        for listener in &mut self.listeners {
            match (listener, &event) {
                (Listener::Any(f), event) => f(event),
                (Listener::Element(f), Event::Element(node)) => f(node),
                (Listener::Error(f), Event::Error(err)) => f(err),
                _ => {}
            }
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}
