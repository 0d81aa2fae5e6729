use std::fmt::{self, Write as _};

use crate::avro::value::State;
use crate::avro::{Datum, SchemaKind, SchemaNode, Shape, ValueNode};

/// Truncation limits for structural dumps.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
	/// Maximum number of elements or entries printed per container.
	pub max_items: usize,
	/// Maximum number of characters printed for strings.
	pub max_string_len: usize,
	/// Maximum number of bytes shown for `bytes` and `fixed`.
	pub max_bytes: usize,
	/// Nesting below this level is collapsed.
	pub max_depth: u32,
}

impl Default for PrintOptions {
	fn default() -> Self {
		Self {
			max_items: 16,
			max_string_len: 200,
			max_bytes: 16,
			max_depth: 8,
		}
	}
}

pub(crate) struct Printer<'w> {
	sink: &'w mut dyn fmt::Write,
	options: PrintOptions,
	base_depth: u32,
}

impl<'w> Printer<'w> {
	pub(crate) fn new(sink: &'w mut dyn fmt::Write, options: PrintOptions, base_depth: u32) -> Self {
		Self { sink, options, base_depth }
	}

	pub(crate) fn node(&mut self, node: &ValueNode<'_>, label: Option<&str>) -> fmt::Result {
		let level = node.depth().saturating_sub(self.base_depth);
		let pad = "  ".repeat(level as usize);
		let label = label.map(|label| format!("{label}: ")).unwrap_or_default();
		let ty = type_label(node.schema());
		let origin = match node.parent() {
			Some(parent) if level == 0 => format!(" (in {})", parent.kind),
			_ => String::new(),
		};
		let node = node.resolved();

		if level >= self.options.max_depth && matches!(node.kind(), SchemaKind::Array | SchemaKind::Map | SchemaKind::Record | SchemaKind::Union) {
			return writeln!(self.sink, "{pad}{label}{ty} {{ ... }}{origin}");
		}

		match &node.state {
			State::Deferred(_) => writeln!(self.sink, "{pad}{label}{ty} <deferred>{origin}"),
			State::Array(array) => {
				writeln!(self.sink, "{pad}{label}{ty} [{}]{}{origin}", array.elements.len(), unset_suffix(node))?;
				for item in array.elements.live().iter().take(self.options.max_items) {
					self.node(item, None)?;
				}
				self.more(&pad, array.elements.len())
			}
			State::Map(map) => {
				writeln!(self.sink, "{pad}{label}{ty} {{{}}}{}{origin}", map.entries.len(), unset_suffix(node))?;
				for entry in map.entries.live().iter().take(self.options.max_items) {
					let key = format!("{:?}", truncate(entry.key(), self.options.max_string_len));
					self.node(entry.value(), Some(&key))?;
				}
				self.more(&pad, map.entries.len())
			}
			State::Record(record) => {
				writeln!(self.sink, "{pad}{label}{ty}{origin}")?;
				for field in &record.fields {
					self.node(field.value(), Some(field.name()))?;
				}
				Ok(())
			}
			State::Union(union) => match &union.selected {
				Some((index, branch)) => {
					writeln!(self.sink, "{pad}{label}{ty} #{index}{origin}")?;
					self.node(branch, None)
				}
				None => writeln!(self.sink, "{pad}{label}{ty} <unset>{origin}"),
			},
			_ => {
				let text = match node.get() {
					Ok(datum) => self.scalar(&datum),
					Err(_) => "<unset>".to_owned(),
				};
				writeln!(self.sink, "{pad}{label}{ty} {text}{origin}")
			}
		}
	}

	fn more(&mut self, pad: &str, len: usize) -> fmt::Result {
		if len > self.options.max_items {
			writeln!(self.sink, "{pad}  ... {} more", len - self.options.max_items)?;
		}
		Ok(())
	}

	fn scalar(&self, datum: &Datum) -> String {
		match datum {
			Datum::Null => "null".to_owned(),
			Datum::Boolean(value) => value.to_string(),
			Datum::Int(value) => value.to_string(),
			Datum::Long(value) => value.to_string(),
			Datum::Float(value) => value.to_string(),
			Datum::Double(value) => value.to_string(),
			Datum::Bytes(bytes) | Datum::Fixed(bytes) => self.hex(bytes),
			Datum::String(text) => format!("{:?}", truncate(text, self.options.max_string_len)),
			Datum::Enum(symbol) => symbol.clone(),
			other => other.label().to_owned(),
		}
	}

	fn hex(&self, bytes: &[u8]) -> String {
		let mut out = format!("[{}]", bytes.len());
		if !bytes.is_empty() {
			out.push(' ');
		}
		for byte in bytes.iter().take(self.options.max_bytes) {
			let _ = write!(out, "{byte:02x}");
		}
		if bytes.len() > self.options.max_bytes {
			out.push_str("..");
		}
		out
	}
}

fn unset_suffix(node: &ValueNode<'_>) -> &'static str {
	if node.is_set() { "" } else { " <unset>" }
}

/// Compact type name for a schema node, without following references.
pub fn type_label(schema: SchemaNode<'_>) -> String {
	match schema.shape() {
		Ok(Shape::Kind(kind)) => match kind {
			SchemaKind::Array => format!("array<{}>", schema.attr("items").map_or_else(|| "?".to_owned(), type_label)),
			SchemaKind::Map => format!("map<{}>", schema.attr("values").map_or_else(|| "?".to_owned(), type_label)),
			SchemaKind::Record | SchemaKind::Enum | SchemaKind::Fixed => match schema.fullname() {
				Some(name) => format!("{kind} {name}"),
				None => kind.name().to_owned(),
			},
			SchemaKind::Union => {
				let branches: Vec<String> = schema.list().map(|list| list.map(type_label).collect()).unwrap_or_default();
				format!("union[{}]", branches.join(", "))
			}
			_ => kind.name().to_owned(),
		},
		Ok(Shape::Reference(name)) => name.to_owned(),
		Ok(Shape::Wrapped(inner)) => type_label(inner),
		Err(_) => "?".to_owned(),
	}
}

fn truncate(input: &str, max_len: usize) -> String {
	if input.chars().count() <= max_len {
		return input.to_owned();
	}
	let out: String = input.chars().take(max_len).collect();
	format!("{out}...")
}
