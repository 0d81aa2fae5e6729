use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use avrotree::avro::{Schema, StreamReader};
use serde::Serialize;

use crate::cmd::{CliError, Result};

/// Read and parse a schema file.
pub(crate) fn load_schema(path: &Path) -> Result<Schema> {
	let text = std::fs::read_to_string(path).map_err(|source| CliError::Open {
		path: path.to_owned(),
		source,
	})?;
	let schema = Schema::parse_str(&text)?;
	tracing::info!(path = %path.display(), "schema loaded");
	Ok(schema)
}

/// Open a data file as a buffered Avro stream.
pub(crate) fn open_data(path: &Path) -> Result<StreamReader<BufReader<File>>> {
	let file = File::open(path).map_err(|source| CliError::Open {
		path: path.to_owned(),
		source,
	})?;
	Ok(StreamReader::new(BufReader::new(file)))
}

/// Print `payload` as pretty JSON on stdout.
pub(crate) fn emit_json(payload: &impl Serialize) -> Result<()> {
	let text = serde_json::to_string_pretty(payload).map_err(CliError::Render)?;
	println!("{text}");
	Ok(())
}
