#![allow(missing_docs)]

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "avrotree", about = "Schema-driven Avro binary tools")]
struct Cli {
	/// Raise log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides.
	#[arg(short, long, action = ArgAction::Count, global = true)]
	verbose: u8,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Build the value tree for a schema and print its unset structure.
	Check(cmd::check::Args),
	/// Decode concatenated datums and print each one.
	Decode(cmd::decode::Args),
	/// Count concatenated datums without decoding them.
	Skip(cmd::skip::Args),
	/// Encode JSON lines into Avro binary.
	Encode(cmd::encode::Args),
}

fn main() {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	if let Err(err) = run(cli.command) {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run(command: Commands) -> cmd::Result<()> {
	match command {
		Commands::Check(args) => cmd::check::run(args),
		Commands::Decode(args) => cmd::decode::run(args),
		Commands::Skip(args) => cmd::skip::run(args),
		Commands::Encode(args) => cmd::encode::run(args),
	}
}

fn init_tracing(verbose: u8) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
		0 => EnvFilter::new("warn"),
		1 => EnvFilter::new("info"),
		2 => EnvFilter::new("debug"),
		_ => EnvFilter::new("trace"),
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.with_writer(std::io::stderr)
		.init();
}
