//! Shared test helpers for workspace crates.

use std::path::{Path, PathBuf};

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve a fixture path under `<workspace>/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
	workspace_root().join("fixtures").join(name)
}

/// Read a fixture file as text.
pub fn fixture_text(name: &str) -> String {
	let path = fixture_path(name);
	std::fs::read_to_string(&path).unwrap_or_else(|err| panic!("read fixture {}: {err}", path.display()))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Fresh path under `<target>/avrotree-scratch` for files a test writes; the directory exists.
pub fn scratch_path(name: &str) -> PathBuf {
	let dir = target_dir().join("avrotree-scratch");
	std::fs::create_dir_all(&dir).unwrap_or_else(|err| panic!("create {}: {err}", dir.display()));
	let path = dir.join(format!("{}-{name}", std::process::id()));
	let _ = std::fs::remove_file(&path);
	path
}

/// Hand-rolled Avro binary encoder for building test inputs.
#[derive(Debug, Default, Clone)]
pub struct AvroBytes {
	out: Vec<u8>,
}

impl AvroBytes {
	/// Start an empty buffer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a zig-zag varint.
	pub fn long(mut self, value: i64) -> Self {
		let mut raw = ((value << 1) ^ (value >> 63)) as u64;
		while raw >= 0x80 {
			self.out.push((raw as u8) | 0x80);
			raw >>= 7;
		}
		self.out.push(raw as u8);
		self
	}

	/// Append a boolean byte.
	pub fn boolean(mut self, value: bool) -> Self {
		self.out.push(u8::from(value));
		self
	}

	/// Append a little-endian double.
	pub fn double(mut self, value: f64) -> Self {
		self.out.extend_from_slice(&value.to_le_bytes());
		self
	}

	/// Append a length-prefixed byte string.
	pub fn bytes(self, value: &[u8]) -> Self {
		self.long(value.len() as i64).raw(value)
	}

	/// Append a length-prefixed UTF-8 string.
	pub fn string(self, value: &str) -> Self {
		self.bytes(value.as_bytes())
	}

	/// Append bytes verbatim.
	pub fn raw(mut self, value: &[u8]) -> Self {
		self.out.extend_from_slice(value);
		self
	}

	/// Append a negative-count block with its byte size, then the items.
	pub fn sized_block(self, count: i64, items: &AvroBytes) -> Self {
		self.long(-count).long(items.out.len() as i64).raw(&items.out)
	}

	/// Encoded bytes so far.
	pub fn as_slice(&self) -> &[u8] {
		&self.out
	}

	/// Take the encoded bytes.
	pub fn finish(self) -> Vec<u8> {
		self.out
	}
}

/// Parse a JSON document, panicking with context on failure.
pub fn json(text: &str) -> serde_json::Value {
	serde_json::from_str(text).unwrap_or_else(|err| panic!("parse json {text:?}: {err}"))
}
