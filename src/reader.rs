//! Reader support: collect parse events from a `std::io::Read` source.
//!
//! The tokenizer/parser pair is not coroutine-based, so this buffers the
//! entire input before producing events (unlike a true incremental
//! streaming parser), but the event sequence itself is still exposed as a
//! plain iterator, so a caller processing a large document doesn't need to
//! hold a [`Document`](crate::document::Document) in memory, only the
//! (typically much smaller) event list.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{Error, ResourceError, Result};
use crate::event::{Event, EventSink};
use crate::parser::{parse_with_sink, ParseOptions};
use crate::pool::{StringPool, StringRef};

struct CollectingSink {
    events: Vec<Event>,
    pool: StringPool,
}

impl EventSink for CollectingSink {
    fn accept(&mut self, event: Event) -> Result<()> {
        self.events.push(event);
        Ok(())
    }

    fn intern(&mut self, s: &str) -> StringRef {
        self.pool.intern(s)
    }
}

/// Reads an entire `std::io::Read` source, parses it, and holds the
/// resulting event sequence plus whatever the parse needed to intern or
/// borrow from the source text.
pub struct EventReader {
    source: String,
    pool: StringPool,
    events: Vec<Event>,
}

impl EventReader {
    /// Read all of `reader` (in chunks of `buf_size` bytes) and parse it.
    pub fn new<R: std::io::Read>(mut reader: R, buf_size: usize) -> Result<Self> {
        let mut bytes = Vec::new();
        let mut chunk = alloc::vec![0u8; buf_size.max(1)];
        loop {
            let n = reader.read(&mut chunk).map_err(io_error)?;
            if n == 0 {
                break;
            }
            bytes.extend_from_slice(&chunk[..n]);
        }
        let source = String::from_utf8(bytes).map_err(|e| Error::from(ResourceError::Io(format!("{e}"))))?;

        let mut sink = CollectingSink {
            events: Vec::new(),
            pool: StringPool::new(),
        };
        parse_with_sink(&source, ParseOptions::new(), &mut sink)?;
        Ok(EventReader {
            source,
            pool: sink.pool,
            events: sink.events,
        })
    }

    /// Resolve a `StringRef` carried by one of this reader's events.
    pub fn resolve(&self, r: StringRef) -> &str {
        r.resolve(&self.pool, &self.source)
    }

    /// Iterate the parsed event sequence in document order.
    pub fn iter(&self) -> StreamIterator<'_> {
        StreamIterator {
            inner: self.events.iter(),
        }
    }
}

fn io_error(e: std::io::Error) -> Error {
    Error::from(ResourceError::Io(format!("{e}")))
}

/// A lazy(-looking) sequence of parse events over an [`EventReader`]'s
/// already-parsed event list.
pub struct StreamIterator<'a> {
    inner: core::slice::Iter<'a, Event>,
}

impl<'a> Iterator for StreamIterator<'a> {
    type Item = &'a Event;

    fn next(&mut self) -> Option<&'a Event> {
        self.inner.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_and_parses_from_a_reader() {
        let kdl = b"host \"localhost\"\nport 8080";
        let reader = Cursor::new(&kdl[..]);
        let events = EventReader::new(reader, 8).unwrap();
        let mut names = Vec::new();
        for event in events.iter() {
            if let Event::StartNode { name, .. } = event {
                names.push(events.resolve(*name));
            }
        }
        assert_eq!(names, vec!["host", "port"]);
    }

    #[test]
    fn propagates_parse_errors() {
        let reader = Cursor::new(&b"node {"[..]);
        let err = EventReader::new(reader, 4096).unwrap_err();
        assert!(matches!(
            err.kind,
            crate::error::Kind::Grammatical(crate::error::GrammaticalError::UnterminatedBlock)
        ));
    }
}
