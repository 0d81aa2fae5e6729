//! Avro JSON encoding of value trees.
//!
//! Unions other than `null` are wrapped in a single-key object naming the
//! branch, `bytes` and `fixed` travel as strings of code points 0..=255, and
//! non-finite floats are spelled `"NaN"`, `"Infinity"` and `"-Infinity"`.

use serde_json::{Map as JsonMap, Number, Value as Json};

use crate::avro::record::record_fields;
use crate::avro::union::union_branches;
use crate::avro::{AvroError, Datum, Result, SchemaKind, SchemaNode, ValueContext, ValueNode};

impl<'s> ValueNode<'s> {
	/// Render the current value as Avro JSON.
	pub fn to_json(&self) -> Result<Json> {
		datum_to_json(&self.cx, self.schema, &self.get()?, self.depth())
	}

	/// Assign a value from Avro JSON; record fields missing from `json` take their schema default.
	pub fn set_json(&mut self, json: &Json) -> Result<()> {
		let datum = json_to_datum(&self.cx, self.schema, json, self.depth())?;
		self.set(&datum)
	}
}

/// Render `datum` as Avro JSON under `schema`.
pub fn datum_to_json<'s>(cx: &ValueContext<'s>, schema: SchemaNode<'s>, datum: &Datum, depth: u32) -> Result<Json> {
	check_depth(cx, depth)?;
	let (kind, def) = cx.resolve(schema)?;
	Ok(match (kind, datum) {
		(SchemaKind::Null, Datum::Null) => Json::Null,
		(SchemaKind::Boolean, Datum::Boolean(value)) => Json::Bool(*value),
		(SchemaKind::Int, Datum::Int(value)) => Json::from(*value),
		(SchemaKind::Long, Datum::Long(value)) => Json::from(*value),
		(SchemaKind::Float, Datum::Float(value)) => float_json(f64::from(*value)),
		(SchemaKind::Double, Datum::Double(value)) => float_json(*value),
		(SchemaKind::Bytes, Datum::Bytes(bytes)) | (SchemaKind::Fixed, Datum::Fixed(bytes)) => Json::String(bytes.iter().copied().map(char::from).collect()),
		(SchemaKind::String, Datum::String(text)) | (SchemaKind::Enum, Datum::Enum(text)) => Json::String(text.clone()),
		(SchemaKind::Array, Datum::Array(items)) => {
			let items_schema = def.attr("items").ok_or(AvroError::MissingAttribute { kind, attr: "items" })?;
			let items = items.iter().map(|item| datum_to_json(cx, items_schema, item, depth + 1)).collect::<Result<Vec<_>>>()?;
			Json::Array(items)
		}
		(SchemaKind::Map, Datum::Map(entries)) => {
			let values = def.attr("values").ok_or(AvroError::MissingAttribute { kind, attr: "values" })?;
			let mut out = JsonMap::new();
			for (key, value) in entries {
				out.insert(key.clone(), datum_to_json(cx, values, value, depth + 1)?);
			}
			Json::Object(out)
		}
		(SchemaKind::Record, Datum::Record(_)) => {
			let mut out = JsonMap::new();
			for (name, ty) in record_fields(def)? {
				let value = datum.field(name).ok_or_else(|| AvroError::FieldMismatch {
					record: def.fullname().unwrap_or_default(),
					field: name.to_owned(),
				})?;
				out.insert(name.to_owned(), datum_to_json(cx, ty, value, depth + 1)?);
			}
			Json::Object(out)
		}
		(SchemaKind::Union, Datum::Union(index, inner)) => {
			let branches = union_branches(cx, def)?;
			let branch = *branches.get(*index).ok_or(AvroError::UnionBranchOutOfRange {
				index: *index as i64,
				branches: branches.len(),
			})?;
			let (branch_kind, _) = cx.resolve(branch)?;
			if branch_kind == SchemaKind::Null {
				Json::Null
			} else {
				let mut out = JsonMap::new();
				out.insert(branch_name(cx, branch)?, datum_to_json(cx, branch, inner, depth + 1)?);
				Json::Object(out)
			}
		}
		(kind, other) => return Err(AvroError::mismatch(kind, other.label())),
	})
}

/// Parse Avro JSON into a [`Datum`] shaped by `schema`.
pub fn json_to_datum<'s>(cx: &ValueContext<'s>, schema: SchemaNode<'s>, json: &Json, depth: u32) -> Result<Datum> {
	check_depth(cx, depth)?;
	let (kind, def) = cx.resolve(schema)?;
	let mismatch = || AvroError::mismatch(kind, json_label(json));
	Ok(match kind {
		SchemaKind::Null => match json {
			Json::Null => Datum::Null,
			_ => return Err(mismatch()),
		},
		SchemaKind::Boolean => Datum::Boolean(json.as_bool().ok_or_else(mismatch)?),
		SchemaKind::Int => {
			let value = json.as_i64().ok_or_else(mismatch)?;
			Datum::Int(i32::try_from(value).map_err(|_| AvroError::IntOverflow { value })?)
		}
		SchemaKind::Long => Datum::Long(json.as_i64().ok_or_else(mismatch)?),
		SchemaKind::Float => Datum::Float(json_float(json).ok_or_else(mismatch)? as f32),
		SchemaKind::Double => Datum::Double(json_float(json).ok_or_else(mismatch)?),
		SchemaKind::Bytes => Datum::Bytes(json_bytes(json).ok_or_else(mismatch)?),
		SchemaKind::Fixed => Datum::Fixed(json_bytes(json).ok_or_else(mismatch)?),
		SchemaKind::String => Datum::String(json.as_str().ok_or_else(mismatch)?.to_owned()),
		SchemaKind::Enum => Datum::Enum(json.as_str().ok_or_else(mismatch)?.to_owned()),
		SchemaKind::Array => {
			let items_schema = def.attr("items").ok_or(AvroError::MissingAttribute { kind, attr: "items" })?;
			let items = json.as_array().ok_or_else(mismatch)?;
			Datum::Array(items.iter().map(|item| json_to_datum(cx, items_schema, item, depth + 1)).collect::<Result<_>>()?)
		}
		SchemaKind::Map => {
			let values = def.attr("values").ok_or(AvroError::MissingAttribute { kind, attr: "values" })?;
			let object = json.as_object().ok_or_else(mismatch)?;
			let entries = object
				.iter()
				.map(|(key, value)| Ok((key.clone(), json_to_datum(cx, values, value, depth + 1)?)))
				.collect::<Result<_>>()?;
			Datum::Map(entries)
		}
		SchemaKind::Record => {
			let object = json.as_object().ok_or_else(mismatch)?;
			let record = def.fullname().unwrap_or_default();
			let fields = record_fields(def)?;
			if let Some(unknown) = object.keys().find(|key| !fields.iter().any(|(name, _)| *name == key.as_str())) {
				return Err(AvroError::FieldMismatch {
					record,
					field: unknown.clone(),
				});
			}
			let mut out = Vec::with_capacity(fields.len());
			for (name, ty) in fields {
				let value = match object.get(name) {
					Some(value) => json_to_datum(cx, ty, value, depth + 1)?,
					None => match field_default(def, name) {
						Some(default) => default_to_datum(cx, ty, default, depth + 1)?,
						None => {
							return Err(AvroError::FieldMismatch {
								record,
								field: name.to_owned(),
							});
						}
					},
				};
				out.push((name.to_owned(), value));
			}
			Datum::Record(out)
		}
		SchemaKind::Union => {
			let branches = union_branches(cx, def)?;
			let (index, branch, value) = match json {
				Json::Null => {
					let index = find_branch(cx, &branches, |kind, _| kind == SchemaKind::Null)?.ok_or_else(mismatch)?;
					(index, branches[index], json)
				}
				Json::Object(object) if object.len() == 1 => {
					let Some((key, value)) = object.iter().next() else {
						return Err(mismatch());
					};
					let index = find_branch(cx, &branches, |kind, node| branch_matches(kind, node, key))?.ok_or_else(mismatch)?;
					(index, branches[index], value)
				}
				_ => return Err(mismatch()),
			};
			Datum::Union(index, Box::new(json_to_datum(cx, branch, value, depth + 1)?))
		}
	})
}

/// A union field default applies to the union's first branch, unwrapped.
fn default_to_datum<'s>(cx: &ValueContext<'s>, schema: SchemaNode<'s>, default: &Json, depth: u32) -> Result<Datum> {
	let (kind, def) = cx.resolve(schema)?;
	if kind != SchemaKind::Union {
		return json_to_datum(cx, schema, default, depth);
	}
	let branches = union_branches(cx, def)?;
	Ok(Datum::Union(0, Box::new(json_to_datum(cx, branches[0], default, depth + 1)?)))
}

fn field_default<'s>(record: SchemaNode<'s>, name: &str) -> Option<&'s Json> {
	record
		.attr("fields")?
		.list()?
		.find(|field| field.attr_str("name") == Some(name))
		.and_then(|field| field.json().get("default"))
}

fn find_branch<'s>(cx: &ValueContext<'s>, branches: &[SchemaNode<'s>], mut pred: impl FnMut(SchemaKind, SchemaNode<'s>) -> bool) -> Result<Option<usize>> {
	for (idx, branch) in branches.iter().enumerate() {
		let (kind, def) = cx.resolve(*branch)?;
		if pred(kind, def) {
			return Ok(Some(idx));
		}
	}
	Ok(None)
}

fn branch_matches(kind: SchemaKind, def: SchemaNode<'_>, key: &str) -> bool {
	if !kind.is_named() {
		return kind.name() == key;
	}
	match def.fullname() {
		Some(full) => full == key || full.rsplit('.').next() == Some(key),
		None => false,
	}
}

fn branch_name<'s>(cx: &ValueContext<'s>, branch: SchemaNode<'s>) -> Result<String> {
	let (kind, def) = cx.resolve(branch)?;
	if kind.is_named() {
		return def.fullname().ok_or(AvroError::MissingAttribute { kind, attr: "name" });
	}
	Ok(kind.name().to_owned())
}

fn check_depth(cx: &ValueContext<'_>, depth: u32) -> Result<()> {
	let max_depth = cx.options().max_depth;
	if depth > max_depth {
		return Err(AvroError::DepthExceeded { max_depth });
	}
	Ok(())
}

fn float_json(value: f64) -> Json {
	if let Some(number) = Number::from_f64(value) {
		return Json::Number(number);
	}
	let text = if value.is_nan() {
		"NaN"
	} else if value.is_sign_positive() {
		"Infinity"
	} else {
		"-Infinity"
	};
	Json::String(text.to_owned())
}

fn json_float(json: &Json) -> Option<f64> {
	match json {
		Json::Number(number) => number.as_f64(),
		Json::String(text) => match text.as_str() {
			"NaN" => Some(f64::NAN),
			"Infinity" => Some(f64::INFINITY),
			"-Infinity" => Some(f64::NEG_INFINITY),
			_ => None,
		},
		_ => None,
	}
}

fn json_bytes(json: &Json) -> Option<Vec<u8>> {
	json.as_str()?.chars().map(|ch| u8::try_from(u32::from(ch)).ok()).collect()
}

fn json_label(json: &Json) -> &'static str {
	match json {
		Json::Null => "json null",
		Json::Bool(_) => "json boolean",
		Json::Number(_) => "json number",
		Json::String(_) => "json string",
		Json::Array(_) => "json list",
		Json::Object(_) => "json object",
	}
}

#[cfg(test)]
mod tests;
