#![warn(missing_docs)]
#![allow(clippy::result_large_err)]
//! A KDL 2.0.0 document parser and serializer.
//!
//! The core entry points are [`parse`] (build a [`Document`]),
//! [`parse_with_sink`] (drive your own [`EventSink`]), [`serialize`] (render
//! a `Document` back to canonical text), [`find_partitions`]/
//! [`merge_documents`] (split and recombine large inputs across threads),
//! and [`decode`] (populate a typed destination directly).

extern crate alloc;

/// `trace!`, forwarding to the `log` crate when the `log-trace` feature is
/// enabled and compiled away entirely otherwise, so the hot tokenizer path
/// never pays for a disabled log call's argument formatting.
#[cfg(feature = "log-trace")]
macro_rules! trace {
    ($($arg:tt)*) => { log::trace!($($arg)*) };
}
#[cfg(not(feature = "log-trace"))]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// `debug!`, see [`trace!`].
#[cfg(feature = "log-trace")]
macro_rules! debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}
#[cfg(not(feature = "log-trace"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

pub(crate) use debug;
pub(crate) use trace;

mod classify;
mod decode;
mod document;
mod error;
mod event;
mod lexer;
mod node;
mod number;
mod partition;
mod parser;
mod pool;
mod prescan;
#[cfg(feature = "std")]
mod reader;
mod serializer;
mod token;
mod value;

pub use decode::{decode, Decode, DecodeOptions, FromValue};
pub use document::Document;
pub use error::{Error, GrammaticalError, Kind, LexicalError, ResourceError, Result, SemanticError, Span};
pub use event::{DOMBuilder, Event, EventSink, NullSink};
pub use node::{NodeHandle, NodeRecord, NodeStore};
pub use parser::{parse, parse_with_sink, ParseOptions, Strategy};
pub use partition::{find_partitions, merge_documents, VirtualDocument, VirtualHandle};
pub use pool::{StringPool, StringRef};
pub use prescan::StructuralIndex;
#[cfg(feature = "std")]
pub use reader::{EventReader, StreamIterator};
pub use serializer::{serialize, SerializeOptions};
pub use value::{Entry, Property, Range, TypedValue, Value, ValueStore};

#[cfg(feature = "std")]
pub use serializer::{serialize_to_writer, to_string};
