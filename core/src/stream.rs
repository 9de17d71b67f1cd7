//! Pull-based object stream.
//!
//! [`ObjectStream`] wires a [`TokenSource`] to a [`TreeAssembler`] and
//! yields the assembler's [`Event`]s as an iterator. One source event may
//! produce several output events (a close tag yields `EndElement` and maybe
//! `Element`), so output is queued and drained before the source is polled
//! again.

use std::collections::VecDeque;

use tracing::debug;

use crate::assembler::TreeAssembler;
use crate::config::AssemblerConfig;
use crate::event::Event;
use crate::source::TokenSource;
use crate::{Error, Node};

/// Iterator of assembler events over a token source.
#[derive(Debug)]
pub struct ObjectStream<S> {
    source: S,
    assembler: TreeAssembler,
    pending: VecDeque<Event>,
    destroyed: bool,
}

impl<S: TokenSource> ObjectStream<S> {
    /// Creates a stream with a freshly configured assembler.
    pub fn new(source: S, config: AssemblerConfig) -> Result<Self, Error> {
        Ok(Self::with_assembler(source, TreeAssembler::new(config)?))
    }

    pub fn with_assembler(source: S, assembler: TreeAssembler) -> Self {
        Self {
            source,
            assembler,
            pending: VecDeque::new(),
            destroyed: false,
        }
    }

    /// Asks the source to stop producing events.
    pub fn pause(&mut self) {
        if !self.destroyed {
            self.source.pause();
        }
    }

    /// Asks the source to produce events again.
    pub fn resume(&mut self) {
        if !self.destroyed {
            self.source.resume();
        }
    }

    /// Releases the source and discards undelivered output.
    ///
    /// Every later call is a no-op and iteration ends.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        debug!(discarded = self.pending.len(), "destroying object stream");
        self.source.destroy();
        self.pending.clear();
        self.destroyed = true;
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.source.is_paused()
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    #[inline]
    pub fn assembler(&self) -> &TreeAssembler {
        &self.assembler
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Consumes the stream, keeping only published nodes.
    pub fn elements(self) -> impl Iterator<Item = Node> {
        self.filter_map(Event::into_element)
    }

    pub fn into_parts(self) -> (S, TreeAssembler) {
        (self.source, self.assembler)
    }
}

#[cfg(feature = "quick-xml")]
impl<R: std::io::BufRead> ObjectStream<crate::xml::XmlSource<R>> {
    /// Creates a stream reading XML from `reader`.
    pub fn from_reader(reader: R, config: AssemblerConfig) -> Result<Self, Error> {
        Self::new(crate::xml::XmlSource::new(reader), config)
    }
}

impl<S: TokenSource> Iterator for ObjectStream<S> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            if self.destroyed {
                return None;
            }
            let event = self.source.next_event()?;
            self.assembler.process(event, &mut self.pending);
        }
    }
}
