#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! Assembles flat XML parsing events into nested [`Node`] trees and emits
//! completed subtrees as they close.

pub mod assembler;
pub mod config;
mod error;
pub mod event;
mod node;
pub mod source;
pub mod stream;

#[cfg(feature = "quick-xml")]
pub mod xml;

#[cfg(any(feature = "tokio", feature = "futures"))]
pub mod async_stream;

pub use assembler::TreeAssembler;
pub use config::{AssemblerConfig, MismatchPolicy};
pub use error::Error;
pub use event::{Event, EventSink, Lifecycle, Listeners, SourceEvent};
pub use node::{Attributes, Child, Children, Node};
pub use source::{IterSource, TokenSource};
pub use stream::ObjectStream;

#[cfg(feature = "quick-xml")]
pub use xml::XmlSource;
