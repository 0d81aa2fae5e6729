use std::io;
use std::path::PathBuf;

use avrotree::avro::AvroError;
use thiserror::Error;

/// Schema inspection command.
pub mod check;
/// Binary-to-dump/JSON decode command.
pub mod decode;
/// JSON-lines-to-binary encode command.
pub mod encode;
/// Datum counting by skip.
pub mod skip;
/// Shared file, schema and output helpers.
pub(crate) mod util;

/// Command result alias.
pub type Result<T> = std::result::Result<T, CliError>;

/// Failures surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
	/// Schema or tree construction failure.
	#[error(transparent)]
	Avro(#[from] AvroError),
	/// Input file could not be opened or read.
	#[error("read {}: {source}", .path.display())]
	Open {
		/// Offending path.
		path: PathBuf,
		/// Underlying IO error.
		source: io::Error,
	},
	/// Output could not be written.
	#[error("write: {0}")]
	Io(#[from] io::Error),
	/// Datum at `index` failed to decode or skip.
	#[error("datum {index} at offset {offset}: {source}")]
	Datum {
		/// Zero-based datum index.
		index: usize,
		/// Stream offset where the datum starts.
		offset: u64,
		/// Decode failure.
		source: AvroError,
	},
	/// JSON input line is not valid JSON.
	#[error("line {line}: invalid json: {source}")]
	JsonLine {
		/// One-based line number.
		line: usize,
		/// Parse failure.
		source: serde_json::Error,
	},
	/// JSON input line does not match the schema.
	#[error("line {line}: {source}")]
	Encode {
		/// One-based line number.
		line: usize,
		/// Import or encode failure.
		source: AvroError,
	},
	/// JSON summary could not be rendered.
	#[error("render json: {0}")]
	Render(serde_json::Error),
}
