mod arena;
mod array;
mod block;
mod context;
mod datum;
mod error;
mod io;
mod json;
mod map;
mod named;
mod print;
mod record;
mod scalar;
mod schema;
mod skip;
mod union;
mod value;
/// Zig-zag varint codec.
pub mod varint;

/// Slot-recycling element storage.
pub use arena::Arena;
/// Tree construction entry points and limits.
pub use context::{ValueContext, ValueOptions};
/// Owned value snapshots.
pub use datum::Datum;
/// Error and result aliases.
pub use error::{AvroError, ErrorKind, Result};
/// Byte sources and sinks.
pub use io::{AvroRead, AvroWrite, SliceReader, StreamReader};
/// Avro JSON bridge.
pub use json::{datum_to_json, json_to_datum};
/// Decoded map entry.
pub use map::MapEntry;
/// Structural dump options and type labels.
pub use print::{PrintOptions, type_label};
/// Decoded record field.
pub use record::RecordField;
/// Schema document and node views.
pub use schema::{Schema, SchemaKind, SchemaNode, Shape};
/// Runtime value nodes.
pub use value::{ParentLink, ValueNode};
