use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use avrotree::avro::{ValueContext, ValueOptions};

use crate::cmd::util::load_schema;
use crate::cmd::{CliError, Result};

#[derive(clap::Args)]
pub struct Args {
	pub schema: PathBuf,
	/// One JSON value per line; blank lines are ignored.
	pub input: PathBuf,
	#[arg(short, long)]
	pub output: PathBuf,
	/// Split arrays and maps into blocks of at most this many items.
	#[arg(long)]
	pub block_items: Option<NonZeroUsize>,
	/// Prefix every block with its byte size.
	#[arg(long)]
	pub block_sizes: bool,
}

/// Import JSON lines and write their binary encoding.
pub fn run(args: Args) -> Result<()> {
	let schema = load_schema(&args.schema)?;
	let options = ValueOptions {
		write_block_items: args.block_items,
		write_block_sizes: args.block_sizes,
		..ValueOptions::default()
	};
	let cx = ValueContext::with_options(&schema, options)?;
	let mut root = cx.create_root()?;

	let input = File::open(&args.input).map_err(|source| CliError::Open {
		path: args.input.clone(),
		source,
	})?;
	let mut out = BufWriter::new(File::create(&args.output)?);

	let mut count = 0;
	for (idx, line) in BufReader::new(input).lines().enumerate() {
		let line_no = idx + 1;
		let line = line?;
		if line.trim().is_empty() {
			continue;
		}
		let json: serde_json::Value = serde_json::from_str(&line).map_err(|source| CliError::JsonLine { line: line_no, source })?;
		root.set_json(&json).map_err(|source| CliError::Encode { line: line_no, source })?;
		root.write(&mut out).map_err(|source| CliError::Encode { line: line_no, source })?;
		count += 1;
	}
	out.flush()?;
	let bytes = std::fs::metadata(&args.output)?.len();
	tracing::info!(datums = count, bytes, "encode finished");

	println!("output: {}", args.output.display());
	println!("datums: {count}");
	println!("bytes: {bytes}");
	Ok(())
}
