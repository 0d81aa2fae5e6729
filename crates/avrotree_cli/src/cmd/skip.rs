use std::path::PathBuf;

use avrotree::avro::{AvroRead, ValueContext};

use crate::cmd::util::{emit_json, load_schema, open_data};
use crate::cmd::{CliError, Result};

#[derive(clap::Args)]
pub struct Args {
	pub schema: PathBuf,
	pub data: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Count concatenated datums by skipping them.
pub fn run(args: Args) -> Result<()> {
	let schema = load_schema(&args.schema)?;
	let cx = ValueContext::new(&schema)?;
	let mut root = cx.create_root()?;
	let mut reader = open_data(&args.data)?;

	let mut count = 0;
	while !reader.at_eof()? {
		let offset = reader.position();
		root.skip(&mut reader).map_err(|source| CliError::Datum { index: count, offset, source })?;
		count += 1;
	}
	let bytes = reader.position();
	tracing::info!(datums = count, bytes, "skip finished");

	if args.json {
		return emit_json(&SkipJson {
			data: args.data.display().to_string(),
			datums: count,
			bytes,
		});
	}

	println!("data: {}", args.data.display());
	println!("datums: {count}");
	println!("bytes: {bytes}");
	Ok(())
}

#[derive(serde::Serialize)]
struct SkipJson {
	data: String,
	datums: usize,
	bytes: u64,
}
