use std::path::PathBuf;

use avrotree::avro::{AvroRead, PrintOptions, ValueContext, ValueOptions};

use crate::cmd::util::{load_schema, open_data};
use crate::cmd::{CliError, Result};

#[derive(clap::Args)]
pub struct Args {
	pub schema: PathBuf,
	pub data: PathBuf,
	/// Stop after this many datums.
	#[arg(long)]
	pub limit: Option<usize>,
	/// Print one JSON line per datum instead of a dump.
	#[arg(long)]
	pub json: bool,
	/// Collapse dump nesting below this level.
	#[arg(long)]
	pub print_depth: Option<u32>,
	/// Reject array and map blocks with more items than this.
	#[arg(long)]
	pub max_block_items: Option<usize>,
}

/// Decode concatenated datums with one reused tree and print each.
pub fn run(args: Args) -> Result<()> {
	let schema = load_schema(&args.schema)?;
	let mut options = ValueOptions::default();
	if let Some(max) = args.max_block_items {
		options.max_block_items = max;
	}
	let cx = ValueContext::with_options(&schema, options)?;
	let mut root = cx.create_root()?;
	let mut reader = open_data(&args.data)?;

	let mut print_options = PrintOptions::default();
	if let Some(depth) = args.print_depth {
		print_options.max_depth = depth;
	}

	let mut count = 0;
	while args.limit.is_none_or(|limit| count < limit) && !reader.at_eof()? {
		let offset = reader.position();
		root.read(&mut reader).map_err(|source| CliError::Datum { index: count, offset, source })?;

		if args.json {
			println!("{}", root.to_json()?);
		} else {
			let mut dump = String::new();
			root.print_with(&mut dump, print_options).map_err(|_| std::io::Error::other("dump formatting failed"))?;
			println!("# datum {count} @ {offset}");
			print!("{dump}");
		}
		count += 1;
	}

	tracing::info!(datums = count, bytes = reader.position(), "decode finished");
	if !args.json {
		println!("datums: {count}");
	}
	Ok(())
}
