use std::path::PathBuf;

use avrotree::avro::{ValueContext, type_label};

use crate::cmd::Result;
use crate::cmd::util::{emit_json, load_schema};

#[derive(clap::Args)]
pub struct Args {
	pub schema: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Build the value tree for a schema and report its shape.
pub fn run(args: Args) -> Result<()> {
	let Args { schema: path, json } = args;
	let schema = load_schema(&path)?;
	let cx = ValueContext::new(&schema)?;
	let root = cx.create_root()?;
	let named_types: Vec<String> = cx.named_types().into_iter().map(str::to_owned).collect();

	if json {
		return emit_json(&CheckJson {
			schema: path.display().to_string(),
			kind: root.kind().to_string(),
			type_label: type_label(root.schema()),
			named_types,
		});
	}

	println!("schema: {}", path.display());
	println!("type: {}", type_label(root.schema()));
	println!("named: {}", if named_types.is_empty() { "-".to_owned() } else { named_types.join(", ") });
	println!("tree:");
	print!("{root}");
	Ok(())
}

#[derive(serde::Serialize)]
struct CheckJson {
	schema: String,
	kind: String,
	type_label: String,
	named_types: Vec<String>,
}
