//! Schema-driven Avro binary value trees: build once, then read, skip, write and print.

/// Schemas, value nodes, the binary codec and the JSON bridge.
pub mod avro;
