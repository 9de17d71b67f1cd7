//! Token source backed by `quick-xml`.
//!
//! [`XmlSource`] turns any [`BufRead`] into [`SourceEvent`]s. Self-closing
//! tags are expanded into a start/end pair, entity references in text and
//! attribute values are unescaped by the reader, and everything that is not
//! an element or character data (comments, processing instructions, the XML
//! declaration, doctype) is skipped.
//!
//! # Example
//!
//! ```ignore
//! use std::io::BufReader;
//! use xml_object_stream_core::{AssemblerConfig, ObjectStream};
//!
//! let file = BufReader::new(std::fs::File::open("feed.xml")?);
//! let stream = ObjectStream::from_reader(file, AssemblerConfig::default())?;
//! for item in stream.elements() {
//!     println!("{:?}", item.first("title").and_then(|t| t.text()));
//! }
//! ```

use std::collections::VecDeque;
use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use tracing::{debug, warn};

use crate::event::{Lifecycle, SourceEvent};
use crate::source::TokenSource;
use crate::Attributes;

/// Initial capacity of the read buffer.
const READ_BUFFER_CAPACITY: usize = 4096;

/// Token source reading XML through `quick-xml`.
pub struct XmlSource<R: BufRead> {
    reader: Option<Reader<R>>,
    buf: Vec<u8>,
    pending: VecDeque<SourceEvent>,
    paused: bool,
    finished: bool,
}

impl<R: BufRead> XmlSource<R> {
    pub fn new(input: R) -> Self {
        let mut reader = Reader::from_reader(input);
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        // Close-tag matching is the assembler's job.
        config.check_end_names = false;

        Self {
            reader: Some(reader),
            buf: Vec::with_capacity(READ_BUFFER_CAPACITY),
            pending: VecDeque::new(),
            paused: false,
            finished: false,
        }
    }

    /// Byte offset of the reader in the input.
    pub fn position(&self) -> u64 {
        self.reader
            .as_ref()
            .map_or(0, |reader| reader.buffer_position())
    }

    /// True once end of input, a reader error, or `destroy` was reached.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn read_next(&mut self) -> Option<SourceEvent> {
        let reader = self.reader.as_mut()?;
        let decoder = reader.decoder();
        loop {
            self.buf.clear();
            let event = match reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(err) => {
                    let position = reader.error_position();
                    return Some(self.fail(err, position));
                }
            };

            let result = match event {
                XmlEvent::Start(e) => start_event(&e, decoder),
                XmlEvent::End(e) => decoder
                    .decode(e.name().as_ref())
                    .map(|name| SourceEvent::EndElement {
                        name: name.into_owned(),
                    }),
                XmlEvent::Text(e) => e
                    .unescape()
                    .map(|text| SourceEvent::Text(text.into_owned())),
                XmlEvent::CData(e) => decoder
                    .decode(&e)
                    .map(|text| SourceEvent::Text(text.into_owned())),
                XmlEvent::Eof => {
                    debug!("end of xml input");
                    self.finished = true;
                    self.pending
                        .push_back(SourceEvent::Lifecycle(Lifecycle::Close));
                    return Some(SourceEvent::Lifecycle(Lifecycle::End));
                }
                _ => continue,
            };

            return match result {
                Ok(event) => Some(event),
                // Decoding runs after the read, so the reader's own error
                // offset does not cover it.
                Err(err) => {
                    let position = reader.buffer_position();
                    Some(self.fail(err, position))
                }
            };
        }
    }

    /// Ends the source after an error, queueing `Close` behind it.
    fn fail(&mut self, err: quick_xml::Error, position: u64) -> SourceEvent {
        warn!(%err, position, "xml reader error");
        self.finished = true;
        self.pending
            .push_back(SourceEvent::Lifecycle(Lifecycle::Close));
        SourceEvent::Error(format!("{err} at position {position}"))
    }
}

impl<R: BufRead> TokenSource for XmlSource<R> {
    fn next_event(&mut self) -> Option<SourceEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        if self.paused || self.finished {
            return None;
        }
        self.read_next()
    }

    fn pause(&mut self) {
        if !self.paused && !self.finished {
            self.paused = true;
            self.pending
                .push_back(SourceEvent::Lifecycle(Lifecycle::Pause));
        }
    }

    fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.pending
                .push_back(SourceEvent::Lifecycle(Lifecycle::Resume));
        }
    }

    fn destroy(&mut self) {
        self.reader = None;
        self.pending.clear();
        self.buf = Vec::new();
        self.finished = true;
        self.paused = false;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}

impl<R: BufRead> std::fmt::Debug for XmlSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlSource")
            .field("position", &self.position())
            .field("pending", &self.pending)
            .field("paused", &self.paused)
            .field("finished", &self.finished)
            .finish()
    }
}

fn start_event(e: &BytesStart<'_>, decoder: Decoder) -> Result<SourceEvent, quick_xml::Error> {
    let name = decoder.decode(e.name().as_ref())?.into_owned();
    let mut attributes = Attributes::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = decoder.decode(attr.key.as_ref())?.into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.insert(key, value);
    }
    Ok(SourceEvent::StartElement { name, attributes })
}
