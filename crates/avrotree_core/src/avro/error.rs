use thiserror::Error;

use crate::avro::SchemaKind;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, AvroError>;

/// Coarse failure classes callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// Malformed schema, unresolvable reference, shape mismatch or invalid encoded data.
	Schema,
	/// Stream ended before a complete encoded unit was read.
	TruncatedInput,
	/// Decoded integer does not fit the target width.
	Overflow,
	/// Underlying stream failure unrelated to encoding.
	Io,
}

/// Errors produced while building, decoding, skipping and encoding value trees.
#[derive(Debug, Error)]
pub enum AvroError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Not enough bytes remained for a requested read.
	#[error("truncated input at offset {at}, need {need} more bytes")]
	TruncatedInput {
		/// Stream offset where the read was attempted.
		at: u64,
		/// Bytes still required to finish the unit.
		need: usize,
	},
	/// Varint wider than 64 bits.
	#[error("varint at offset {at} overflows 64 bits")]
	VarintOverflow {
		/// Stream offset of the first byte of the varint.
		at: u64,
	},
	/// Decoded long does not fit an `int`.
	#[error("value {value} does not fit in 32 bits")]
	IntOverflow {
		/// Decoded 64-bit value.
		value: i64,
	},
	/// Schema text is not valid JSON.
	#[error("schema is not valid json: {0}")]
	SchemaJson(#[from] serde_json::Error),
	/// Schema node has a shape that names no Avro type.
	#[error("invalid schema node: {detail}")]
	InvalidSchema {
		/// Short description of the offending node.
		detail: String,
	},
	/// Required attribute is absent.
	#[error("{kind} schema is missing required attribute {attr:?}")]
	MissingAttribute {
		/// Type whose attribute is missing.
		kind: SchemaKind,
		/// Attribute name.
		attr: &'static str,
	},
	/// Attribute is present but has the wrong shape.
	#[error("{kind} schema attribute {attr:?} is invalid: {detail}")]
	InvalidAttribute {
		/// Type owning the attribute.
		kind: SchemaKind,
		/// Attribute name.
		attr: &'static str,
		/// What was wrong.
		detail: String,
	},
	/// Named-type reference could not be resolved.
	#[error("unknown type {name:?}")]
	UnknownType {
		/// Reference text after namespace qualification.
		name: String,
	},
	/// Two named types share a full name.
	#[error("duplicate named type {name:?}")]
	DuplicateName {
		/// Colliding full name.
		name: String,
	},
	/// Operation or value does not match the node's type.
	#[error("type mismatch: expected {expected}, got {got}")]
	TypeMismatch {
		/// Node type.
		expected: SchemaKind,
		/// Description of what was supplied.
		got: String,
	},
	/// Write or get was invoked on a node with no current value.
	#[error("{kind} value is not set")]
	ValueNotSet {
		/// Node type.
		kind: SchemaKind,
	},
	/// Negative byte or string length prefix.
	#[error("negative length {len} at offset {at}")]
	NegativeLength {
		/// Decoded length.
		len: i64,
		/// Stream offset after the prefix.
		at: u64,
	},
	/// Length prefix larger than the configured ceiling.
	#[error("length {len} exceeds limit {max}")]
	LengthTooLarge {
		/// Decoded length.
		len: u64,
		/// Configured ceiling.
		max: usize,
	},
	/// Negative-count block carried an unusable byte size.
	#[error("invalid block byte size {size} for block of {count} items")]
	InvalidBlockSize {
		/// Decoded byte size.
		size: i64,
		/// Item count of the block.
		count: u64,
	},
	/// Block item count larger than the configured ceiling.
	#[error("block of {count} items exceeds limit {max}")]
	BlockTooLarge {
		/// Item count of the block.
		count: u64,
		/// Configured ceiling.
		max: usize,
	},
	/// Boolean byte was neither 0 nor 1.
	#[error("invalid boolean byte 0x{byte:02x}")]
	InvalidBoolean {
		/// Offending byte.
		byte: u8,
	},
	/// String payload was not UTF-8.
	#[error("string is not valid utf-8: {0}")]
	InvalidUtf8(#[from] std::string::FromUtf8Error),
	/// Enum index outside the symbol table.
	#[error("enum index {index} out of range (symbols={symbols})")]
	EnumIndexOutOfRange {
		/// Decoded index.
		index: i64,
		/// Number of symbols.
		symbols: usize,
	},
	/// Union branch index outside the branch list.
	#[error("union branch {index} out of range (branches={branches})")]
	UnionBranchOutOfRange {
		/// Decoded index.
		index: i64,
		/// Number of branches.
		branches: usize,
	},
	/// Fixed payload length differs from the declared size.
	#[error("fixed size mismatch: expected {expected}, got {got}")]
	FixedSizeMismatch {
		/// Declared size.
		expected: usize,
		/// Supplied length.
		got: usize,
	},
	/// Record assignment named a field the schema does not declare, or omitted one.
	#[error("record {record} field mismatch: {field}")]
	FieldMismatch {
		/// Record full name.
		record: String,
		/// Offending field name.
		field: String,
	},
	/// Recursion through a self-referential schema exceeded the configured depth.
	#[error("value depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured ceiling.
		max_depth: u32,
	},
}

impl AvroError {
	/// Map this error onto its coarse failure class.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Io(_) => ErrorKind::Io,
			Self::TruncatedInput { .. } => ErrorKind::TruncatedInput,
			Self::VarintOverflow { .. } | Self::IntOverflow { .. } => ErrorKind::Overflow,
			_ => ErrorKind::Schema,
		}
	}

	/// Build an [`AvroError::InvalidAttribute`].
	pub(crate) fn attr(kind: SchemaKind, attr: &'static str, detail: impl Into<String>) -> Self {
		Self::InvalidAttribute {
			kind,
			attr,
			detail: detail.into(),
		}
	}

	/// Build an [`AvroError::TypeMismatch`].
	pub(crate) fn mismatch(expected: SchemaKind, got: impl Into<String>) -> Self {
		Self::TypeMismatch { expected, got: got.into() }
	}
}
