//! Value store: typed values and the SoA arrays of arguments/properties.

use alloc::vec::Vec;

use crate::pool::StringRef;

/// A node's argument or property value. Tagged variant, never a base class
/// with subclasses.
///
/// Numbers preserve textual precision: integers that fit in
/// `i64` use `Integer`; anything wider, or a float literal whose f64
/// round-trip isn't exact, uses `FloatRaw` with the original text kept
/// verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// A quoted, raw, or multi-line string value.
    String(StringRef),
    /// An integer literal that fits in a signed 64-bit integer.
    Integer(i64),
    /// A float literal whose `f64` value round-trips exactly to the same text.
    Float(f64),
    /// A number literal (integer or float) that can't be represented exactly
    /// as `i64`/`f64`; the original text is kept verbatim.
    FloatRaw(StringRef),
    /// `#true` / `#false`.
    Bool(bool),
    /// `#null`.
    Null,
    /// `#inf`.
    Inf,
    /// `#-inf`.
    NegInf,
    /// `#nan`.
    Nan,
}

impl TypedValue {
    /// A short name for this variant's kind, used in error messages.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            TypedValue::String(_) => "string",
            TypedValue::Integer(_) => "integer",
            TypedValue::Float(_) => "float",
            TypedValue::FloatRaw(_) => "float_raw",
            TypedValue::Bool(_) => "bool",
            TypedValue::Null => "null",
            TypedValue::Inf => "inf",
            TypedValue::NegInf => "neg_inf",
            TypedValue::Nan => "nan",
        }
    }
}

/// A value together with its optional type annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    /// The value itself.
    pub value: TypedValue,
    /// An optional `(type)` annotation immediately preceding the value.
    pub type_annotation: Option<StringRef>,
}

impl Value {
    /// Construct an unannotated value.
    pub const fn new(value: TypedValue) -> Self {
        Value {
            value,
            type_annotation: None,
        }
    }

    /// Construct a value with a type annotation.
    pub const fn with_type(value: TypedValue, type_annotation: StringRef) -> Self {
        Value {
            value,
            type_annotation: Some(type_annotation),
        }
    }
}

/// A `name=value` property. Within a node, a later occurrence of the same
/// name overrides an earlier one at DOM-construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// The property's key.
    pub name: StringRef,
    /// The property's value.
    pub value: Value,
}

/// A contiguous, non-fragmented range into a SoA array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Range {
    /// Index of the first element.
    pub start: u32,
    /// Number of elements.
    pub count: u32,
}

impl Range {
    /// The empty range.
    pub const EMPTY: Range = Range { start: 0, count: 0 };

    /// Construct a range.
    pub const fn new(start: u32, count: u32) -> Self {
        Range { start, count }
    }

    /// This range as a `usize` index range, for slicing a SoA array.
    pub const fn as_slice_range(&self) -> core::ops::Range<usize> {
        self.start as usize..(self.start as usize + self.count as usize)
    }

    /// True if this range addresses no elements.
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// One step in a node's source-order argument/property interleave log.
/// Carries the index of the referenced element into `arguments` or
/// `properties` respectively; replaying a node's entries in order
/// reproduces the exact interleave order its source used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// Index into `ValueStore::arguments`.
    Argument(u32),
    /// Index into `ValueStore::properties`.
    Property(u32),
}

/// SoA storage for arguments and properties, shared by every node in a
/// `Document`. Nodes address their slice via a [`Range`] into these arrays.
#[derive(Debug, Default)]
pub struct ValueStore {
    /// All arguments across all nodes, in document order, sliced per node by [`Range`].
    pub arguments: Vec<Value>,
    /// All properties across all nodes, in document order, sliced per node by [`Range`].
    pub properties: Vec<Property>,
    /// Per-node interleave order of the two arrays above, in document order,
    /// sliced per node by [`Range`].
    pub entries: Vec<Entry>,
}

impl ValueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        ValueStore::default()
    }

    /// Append an argument, returning its index.
    pub fn push_argument(&mut self, value: Value) -> u32 {
        let idx = self.arguments.len() as u32;
        self.arguments.push(value);
        idx
    }

    /// Append a property, returning its index.
    pub fn push_property(&mut self, property: Property) -> u32 {
        let idx = self.properties.len() as u32;
        self.properties.push(property);
        idx
    }

    /// Append an interleave-order entry, returning its index.
    pub fn push_entry(&mut self, entry: Entry) -> u32 {
        let idx = self.entries.len() as u32;
        self.entries.push(entry);
        idx
    }

    /// The arguments addressed by `range`, in source order.
    pub fn arguments_in(&self, range: Range) -> &[Value] {
        &self.arguments[range.as_slice_range()]
    }

    /// The properties addressed by `range`. The builder already folds
    /// repeated property names down to their last-written value before
    /// appending here, keeping the
    /// position of the name's first occurrence, so this always returns at
    /// most one entry per distinct name.
    pub fn properties_in(&self, range: Range) -> &[Property] {
        &self.properties[range.as_slice_range()]
    }

    /// The interleave-order log addressed by `range`: replaying these in
    /// order against `arguments`/`properties` reproduces the original
    /// argument/property emission order for one node.
    pub fn entries_in(&self, range: Range) -> &[Entry] {
        &self.entries[range.as_slice_range()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_slices_match() {
        let r = Range::new(2, 3);
        assert_eq!(r.as_slice_range(), 2..5);
        assert!(!r.is_empty());
        assert!(Range::EMPTY.is_empty());
    }

    #[test]
    fn store_appends_and_slices() {
        let mut store = ValueStore::new();
        let i0 = store.push_argument(Value::new(TypedValue::Integer(1)));
        let i1 = store.push_argument(Value::new(TypedValue::Integer(2)));
        assert_eq!(i0, 0);
        assert_eq!(i1, 1);
        let slice = store.arguments_in(Range::new(0, 2));
        assert_eq!(slice.len(), 2);
    }
}
