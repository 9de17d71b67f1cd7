#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! XML to JSON Lines
//!
//! This example converts an XML document into JSON Lines, one line per
//! element published by the assembler. Each record is written and released
//! as soon as its closing tag is read, so memory stays flat for documents of
//! any length.
//!
//! # Format
//!
//! ```text
//! <feed><item id="1"><title>A</title></item><item id="2"/></feed>
//! ```
//!
//! becomes
//!
//! ```text
//! {"$path":"feed/item","$name":"item","$":{"id":"1"},"title":{...}}
//! {"$path":"feed/item","$name":"item","$":{"id":"2"}}
//! ```

use std::io::{BufRead, Write};

use thiserror::Error;
use tracing::{debug, warn};
use xml_object_stream::{AssemblerConfig, Event, Lifecycle, ObjectStream};

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] xml_object_stream::Error),

    #[error("malformed xml: {0}")]
    Source(String),
}

/// Outcome of a conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Records written.
    pub records: usize,
    /// Structural problems reported along the way (advisory).
    pub warnings: Vec<String>,
}

/// Converts XML from `input` into JSON Lines on `output`.
///
/// Structural errors from the assembler are collected in
/// [`Summary::warnings`]; an error from the XML reader aborts the
/// conversion.
pub fn convert<R, W>(input: R, mut output: W, config: AssemblerConfig) -> Result<Summary, ConvertError>
where
    R: BufRead,
    W: Write,
{
    let stream = ObjectStream::from_reader(input, config)?;
    let mut summary = Summary::default();

    for event in stream {
        match event {
            Event::Element(node) => {
                serde_json::to_writer(&mut output, &node)?;
                output.write_all(b"\n")?;
                summary.records += 1;
            }
            Event::Error(err) if err.is_structural() => {
                warn!(%err, "structural problem");
                summary.warnings.push(err.to_string());
            }
            Event::Error(err) => return Err(ConvertError::Source(err.to_string())),
            Event::Lifecycle(Lifecycle::End) => {
                debug!(records = summary.records, "end of document");
            }
            _ => {}
        }
    }

    output.flush()?;
    Ok(summary)
}

/// Converts an in-memory document, returning the JSON Lines as a string.
pub fn convert_str(xml: &str, config: AssemblerConfig) -> Result<(String, Summary), ConvertError> {
    let mut out = Vec::with_capacity(xml.len());
    let summary = convert(xml.as_bytes(), &mut out, config)?;
    let text = String::from_utf8(out).map_err(|e| ConvertError::Source(e.to_string()))?;
    Ok((text, summary))
}
