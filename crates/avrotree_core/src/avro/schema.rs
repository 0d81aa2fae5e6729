use std::fmt;

use serde_json::Value as Json;

use crate::avro::{AvroError, Result};

/// Closed set of Avro type discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
	/// `null`
	Null,
	/// `boolean`
	Boolean,
	/// `int`
	Int,
	/// `long`
	Long,
	/// `float`
	Float,
	/// `double`
	Double,
	/// `bytes`
	Bytes,
	/// `string`
	String,
	/// `fixed`
	Fixed,
	/// `enum`
	Enum,
	/// `array`
	Array,
	/// `map`
	Map,
	/// `record` (and `error`)
	Record,
	/// union, written as a JSON list
	Union,
}

impl SchemaKind {
	/// Parse a primitive type name.
	pub fn primitive(name: &str) -> Option<Self> {
		Some(match name {
			"null" => Self::Null,
			"boolean" => Self::Boolean,
			"int" => Self::Int,
			"long" => Self::Long,
			"float" => Self::Float,
			"double" => Self::Double,
			"bytes" => Self::Bytes,
			"string" => Self::String,
			_ => return None,
		})
	}

	/// Parse a complex `type` keyword.
	pub fn complex(name: &str) -> Option<Self> {
		Some(match name {
			"fixed" => Self::Fixed,
			"enum" => Self::Enum,
			"array" => Self::Array,
			"map" => Self::Map,
			"record" | "error" => Self::Record,
			_ => return None,
		})
	}

	/// Canonical lower-case name.
	pub fn name(self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Boolean => "boolean",
			Self::Int => "int",
			Self::Long => "long",
			Self::Float => "float",
			Self::Double => "double",
			Self::Bytes => "bytes",
			Self::String => "string",
			Self::Fixed => "fixed",
			Self::Enum => "enum",
			Self::Array => "array",
			Self::Map => "map",
			Self::Record => "record",
			Self::Union => "union",
		}
	}

	/// Whether values of this kind are registered by full name.
	pub fn is_named(self) -> bool {
		matches!(self, Self::Fixed | Self::Enum | Self::Record)
	}
}

impl fmt::Display for SchemaKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Parsed schema document.
///
/// Owns the JSON attribute tree every [`SchemaNode`] borrows from. The tree is
/// immutable, so one `Schema` can back any number of value trees on any thread.
#[derive(Debug, Clone)]
pub struct Schema {
	root: Json,
}

impl Schema {
	/// Parse schema text.
	pub fn parse_str(text: &str) -> Result<Self> {
		Ok(Self::from_json(serde_json::from_str(text)?))
	}

	/// Adopt an already-parsed JSON tree.
	pub fn from_json(root: Json) -> Self {
		Self { root }
	}

	/// Top-level node.
	pub fn root(&self) -> SchemaNode<'_> {
		SchemaNode {
			json: &self.root,
			namespace: None,
		}
	}

	/// Underlying JSON tree.
	pub fn json(&self) -> &Json {
		&self.root
	}
}

/// How a schema node denotes its type.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'s> {
	/// The node itself defines a type of this kind.
	Kind(SchemaKind),
	/// The node names a type defined elsewhere.
	Reference(&'s str),
	/// An object whose `type` attribute is itself a full schema.
	Wrapped(SchemaNode<'s>),
}

/// Borrowed view of one node in a [`Schema`], with its enclosing namespace.
#[derive(Debug, Clone, Copy)]
pub struct SchemaNode<'s> {
	json: &'s Json,
	namespace: Option<&'s str>,
}

impl<'s> SchemaNode<'s> {
	/// Raw JSON for this node.
	pub fn json(&self) -> &'s Json {
		self.json
	}

	/// Namespace in effect where this node appears.
	pub fn enclosing_namespace(&self) -> Option<&'s str> {
		self.namespace
	}

	/// Classify the node.
	pub fn shape(&self) -> Result<Shape<'s>> {
		match self.json {
			Json::String(name) => Ok(match SchemaKind::primitive(name) {
				Some(kind) => Shape::Kind(kind),
				None => Shape::Reference(name),
			}),
			Json::Array(_) => Ok(Shape::Kind(SchemaKind::Union)),
			Json::Object(map) => match map.get("type") {
				Some(Json::String(name)) => Ok(match SchemaKind::primitive(name).or_else(|| SchemaKind::complex(name)) {
					Some(kind) => Shape::Kind(kind),
					None => Shape::Reference(name),
				}),
				Some(inner) => Ok(Shape::Wrapped(SchemaNode {
					json: inner,
					namespace: self.namespace,
				})),
				None => Err(AvroError::InvalidSchema {
					detail: format!("object without \"type\": {}", preview(self.json)),
				}),
			},
			other => Err(AvroError::InvalidSchema {
				detail: format!("expected string, object or list, got {}", preview(other)),
			}),
		}
	}

	/// Look up an attribute; the child inherits this node's namespace scope.
	pub fn attr(&self, name: &str) -> Option<SchemaNode<'s>> {
		let json = self.json.as_object()?.get(name)?;
		Some(SchemaNode {
			json,
			namespace: self.child_namespace(),
		})
	}

	/// String-valued attribute.
	pub fn attr_str(&self, name: &str) -> Option<&'s str> {
		self.json.as_object()?.get(name)?.as_str()
	}

	/// Unsigned integer attribute.
	pub fn attr_u64(&self, name: &str) -> Option<u64> {
		self.json.as_object()?.get(name)?.as_u64()
	}

	/// Child nodes when this node is a JSON list.
	pub fn list(&self) -> Option<impl Iterator<Item = SchemaNode<'s>> + use<'s>> {
		let namespace = self.namespace;
		let items = self.json.as_array()?;
		Some(items.iter().map(move |json| SchemaNode { json, namespace }))
	}

	/// Full name of a named type definition (`namespace.name`).
	pub fn fullname(&self) -> Option<String> {
		let name = self.attr_str("name")?;
		if name.contains('.') {
			return Some(name.to_owned());
		}
		match self.attr_str("namespace").or(self.namespace) {
			Some(ns) if !ns.is_empty() => Some(format!("{ns}.{name}")),
			_ => Some(name.to_owned()),
		}
	}

	/// Candidate full names for a reference appearing at this node, most specific first.
	pub fn qualify(&self, reference: &str) -> Vec<String> {
		if reference.contains('.') {
			return vec![reference.to_owned()];
		}
		match self.namespace {
			Some(ns) if !ns.is_empty() => vec![format!("{ns}.{reference}"), reference.to_owned()],
			_ => vec![reference.to_owned()],
		}
	}

	/// Namespace children of this node are resolved against.
	fn child_namespace(&self) -> Option<&'s str> {
		let Some(map) = self.json.as_object() else {
			return self.namespace;
		};
		let named = map.get("type").and_then(Json::as_str).and_then(SchemaKind::complex).is_some_and(SchemaKind::is_named);
		if !named {
			return self.namespace;
		}
		if let Some(name) = map.get("name").and_then(Json::as_str)
			&& let Some((ns, _)) = name.rsplit_once('.')
		{
			return Some(ns);
		}
		map.get("namespace").and_then(Json::as_str).or(self.namespace)
	}
}

fn preview(json: &Json) -> String {
	let text = json.to_string();
	if text.chars().count() <= 60 {
		return text;
	}
	let out: String = text.chars().take(60).collect();
	format!("{out}...")
}

#[cfg(test)]
mod tests;
