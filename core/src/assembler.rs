//! Event-to-tree assembly.
//!
//! [`TreeAssembler`] keeps two stacks: the names of every open element and
//! the nodes materialized for open elements deeper than the depth threshold.
//! Elements at or above the threshold (typically just the document root) are
//! tracked by name only, so a wrapper around millions of records never grows
//! into a tree.
//!
//! ```text
//! <feed>              names: [feed]             nodes: []
//!   <item id="1">     names: [feed, item]       nodes: [item]
//!     <title>         names: [feed, item, title] nodes: [item, title]
//!     </title>        -> title moved into item
//!   </item>           -> Element(item) published (depth back to 1)
//! ```

use std::collections::HashSet;

use tracing::{debug, trace, warn};

use crate::config::{AssemblerConfig, MismatchPolicy};
use crate::event::{Event, EventSink, SourceEvent};
use crate::{Attributes, Error, Node};

#[derive(Debug, Clone)]
enum Emission {
    /// Publish elements closing at the depth threshold.
    Depth,
    /// Publish elements whose name is in the set.
    Named(HashSet<String>),
}

/// Stack-based tree builder.
///
/// Feed it [`SourceEvent`]s in document order through [`process`](Self::process);
/// it writes pass-through, element, lifecycle and error events to the sink.
/// Nothing is ever returned as an `Err` from `process`: structural problems
/// become [`Event::Error`].
#[derive(Debug, Clone)]
pub struct TreeAssembler {
    config: AssemblerConfig,
    emission: Emission,
    names: Vec<String>,
    nodes: Vec<Node>,
    halted: bool,
}

impl TreeAssembler {
    /// Creates an assembler, rejecting invalid configuration.
    pub fn new(config: AssemblerConfig) -> Result<Self, Error> {
        config.validate()?;
        let emission = if config.emits_by_name() {
            Emission::Named(config.emit_elements.clone())
        } else {
            Emission::Depth
        };
        Ok(Self {
            config,
            emission,
            names: Vec::new(),
            nodes: Vec::new(),
            halted: false,
        })
    }

    #[inline]
    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Number of currently open elements.
    #[inline]
    pub fn depth(&self) -> usize {
        self.names.len()
    }

    /// Number of currently open materialized nodes.
    #[inline]
    pub fn open_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// True after a mismatch under [`MismatchPolicy::Halt`].
    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Drops all open state so the assembler can take a new document.
    pub fn reset(&mut self) {
        self.names.clear();
        self.nodes.clear();
        self.halted = false;
    }

    /// Handles one source event.
    pub fn process<S: EventSink + ?Sized>(&mut self, event: SourceEvent, sink: &mut S) {
        trace!(?event, depth = self.names.len(), "process");
        match event {
            SourceEvent::StartElement { name, attributes } => {
                self.start_element(name, attributes, sink)
            }
            SourceEvent::EndElement { name } => self.end_element(name, sink),
            SourceEvent::Text(chunk) => self.text(&chunk),
            SourceEvent::Lifecycle(lifecycle) => {
                debug!(?lifecycle, "relaying lifecycle event");
                sink.emit(Event::Lifecycle(lifecycle));
            }
            SourceEvent::Error(message) => {
                warn!(%message, "token source error");
                sink.emit(Event::Error(Error::Source(message)));
            }
        }
    }

    fn start_element<S: EventSink + ?Sized>(
        &mut self,
        name: String,
        attributes: Attributes,
        sink: &mut S,
    ) {
        if name.is_empty() || self.halted {
            return;
        }

        sink.emit(Event::StartElement {
            name: name.clone(),
            attributes: attributes.clone(),
        });
        self.names.push(name.clone());

        if self.names.len() <= self.config.element_depth {
            return;
        }

        let path = self.names.join(&self.config.path_separator);

        if let (Some(parent), Some(limit)) = (self.nodes.last(), self.config.children_limit()) {
            let count = parent.children().count(&name) + 1;
            if count > limit {
                let err = Error::MaxChildren {
                    parent: parent.name().to_string(),
                    name: name.clone(),
                    count,
                    limit,
                };
                warn!(%path, count, limit, "children bound exceeded");
                sink.emit(Event::Error(err));
            }
        }

        self.nodes.push(Node::new(path, name, attributes));
    }

    fn end_element<S: EventSink + ?Sized>(&mut self, name: String, sink: &mut S) {
        if name.is_empty() || self.halted {
            return;
        }

        sink.emit(Event::EndElement { name: name.clone() });

        let materialized = self.names.len() > self.config.element_depth;
        let open = self.names.pop();
        let node = if materialized {
            self.nodes.pop().map(|mut node| {
                node.seal();
                node
            })
        } else {
            None
        };

        if open.as_deref() != Some(name.as_str()) {
            warn!(%name, expected = ?open, "unexpected end of element");
            if let Some(node) = node {
                self.attach(node);
            }
            sink.emit(Event::Error(Error::UnexpectedEnd {
                name,
                expected: open,
            }));
            if self.config.on_mismatch == MismatchPolicy::Halt {
                debug!("halting after mismatched close tag");
                self.halted = true;
            }
            return;
        }

        let Some(node) = node else {
            return;
        };

        let publish = match &self.emission {
            Emission::Depth => self.names.len() == self.config.element_depth,
            Emission::Named(names) => names.contains(&name),
        };

        if !publish {
            self.attach(node);
            return;
        }

        debug!(path = node.path(), "emitting element");
        // A named element inside an open parent is published as a deep copy
        // and the original stays in the parent, so a subtree nested under k
        // named ancestors is copied k times.
        match self.nodes.last_mut() {
            Some(parent) => {
                sink.emit(Event::Element(node.clone()));
                parent.children_mut().push(node);
            }
            None => sink.emit(Event::Element(node)),
        }
    }

    fn text(&mut self, chunk: &str) {
        if self.halted {
            return;
        }
        if let Some(current) = self.nodes.last_mut() {
            current.push_text(chunk);
        }
    }

    /// Moves a sealed node into the open parent, or drops it at top level.
    fn attach(&mut self, node: Node) {
        if let Some(parent) = self.nodes.last_mut() {
            parent.children_mut().push(node);
        }
    }
}

impl Default for TreeAssembler {
    fn default() -> Self {
        Self {
            config: AssemblerConfig::default(),
            emission: Emission::Depth,
            names: Vec::new(),
            nodes: Vec::new(),
            halted: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Lifecycle;
    use test_case::test_case;

    fn run(config: AssemblerConfig, events: Vec<SourceEvent>) -> Vec<Event> {
        let mut assembler = TreeAssembler::new(config).unwrap();
        let mut out = Vec::new();
        for event in events {
            assembler.process(event, &mut out);
        }
        out
    }

    fn elements(events: &[Event]) -> Vec<&Node> {
        events.iter().filter_map(Event::as_element).collect()
    }

    #[test]
    fn stacks_stay_in_lock_step() {
        let mut assembler = TreeAssembler::new(AssemblerConfig::new().with_element_depth(2)).unwrap();
        let mut out = Vec::new();

        assembler.process(SourceEvent::start("a"), &mut out);
        assembler.process(SourceEvent::start("b"), &mut out);
        assert_eq!((assembler.depth(), assembler.open_nodes()), (2, 0));

        assembler.process(SourceEvent::start("c"), &mut out);
        assembler.process(SourceEvent::start("d"), &mut out);
        assert_eq!((assembler.depth(), assembler.open_nodes()), (4, 2));

        assembler.process(SourceEvent::end("d"), &mut out);
        assembler.process(SourceEvent::end("c"), &mut out);
        assert_eq!((assembler.depth(), assembler.open_nodes()), (2, 0));
    }

    #[test]
    fn default_assembler_matches_default_config() {
        let assembler = TreeAssembler::default();
        assert_eq!(assembler.config(), &AssemblerConfig::default());
        assert!(!assembler.is_halted());
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(TreeAssembler::new(AssemblerConfig::new().with_element_depth(0)).is_err());
    }

    #[test_case(SourceEvent::start(""); "start")]
    #[test_case(SourceEvent::end(""); "end")]
    fn empty_names_are_ignored(event: SourceEvent) {
        let mut assembler = TreeAssembler::default();
        let mut out = Vec::new();
        assembler.process(event, &mut out);
        assert!(out.is_empty());
        assert_eq!(assembler.depth(), 0);
    }

    #[test]
    fn nested_named_element_is_published_and_kept() {
        let out = run(
            AssemblerConfig::new().with_emit_elements(["b", "a"]),
            vec![
                SourceEvent::start("root"),
                SourceEvent::start("a"),
                SourceEvent::start("b"),
                SourceEvent::text("x"),
                SourceEvent::end("b"),
                SourceEvent::end("a"),
                SourceEvent::end("root"),
            ],
        );

        let published = elements(&out);
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].path(), "root/a/b");
        assert_eq!(published[1].name(), "a");
        assert_eq!(published[1].first("b"), Some(published[0]));
    }

    #[test]
    fn lifecycle_is_relayed() {
        let out = run(
            AssemblerConfig::default(),
            vec![
                SourceEvent::Lifecycle(Lifecycle::Pause),
                SourceEvent::Lifecycle(Lifecycle::Resume),
                SourceEvent::Error("boom".to_string()),
                SourceEvent::Lifecycle(Lifecycle::End),
            ],
        );
        assert_eq!(
            out,
            vec![
                Event::Lifecycle(Lifecycle::Pause),
                Event::Lifecycle(Lifecycle::Resume),
                Event::Error(Error::Source("boom".to_string())),
                Event::Lifecycle(Lifecycle::End),
            ]
        );
    }

    #[test]
    fn reset_clears_halt_and_stacks() {
        let mut assembler = TreeAssembler::new(
            AssemblerConfig::new().with_mismatch_policy(MismatchPolicy::Halt),
        )
        .unwrap();
        let mut out = Vec::new();
        assembler.process(SourceEvent::start("a"), &mut out);
        assembler.process(SourceEvent::start("b"), &mut out);
        assembler.process(SourceEvent::end("a"), &mut out);
        assert!(assembler.is_halted());

        assembler.reset();
        assert!(!assembler.is_halted());
        assert_eq!(assembler.depth(), 0);
        assert_eq!(assembler.open_nodes(), 0);
    }
}
