use std::sync::Arc;

use crate::avro::context::Builder;
use crate::avro::io::{AvroRead, AvroWrite};
use crate::avro::value::ValueType;
use crate::avro::{AvroError, Datum, ParentLink, Result, SchemaKind, SchemaNode, ValueContext, ValueNode};

/// One named record field and its value node.
pub struct RecordField<'s> {
	name: &'s str,
	value: ValueNode<'s>,
}

impl<'s> RecordField<'s> {
	/// Declared field name.
	pub fn name(&self) -> &'s str {
		self.name
	}

	/// Field value node.
	pub fn value(&self) -> &ValueNode<'s> {
		&self.value
	}

	/// Mutable field value node.
	pub fn value_mut(&mut self) -> &mut ValueNode<'s> {
		&mut self.value
	}
}

/// Record state: one eagerly built node per declared field.
///
/// `set` records a completed read or assignment, so a record without fields
/// is still unset until one happens.
pub(crate) struct RecordValue<'s> {
	pub(crate) name: String,
	pub(crate) fields: Vec<RecordField<'s>>,
	pub(crate) set: bool,
}

impl<'s> RecordValue<'s> {
	pub(crate) fn create(builder: &mut Builder<'_, 's>, schema: SchemaNode<'s>, link: ParentLink) -> Result<Self> {
		let name = schema.fullname().ok_or(AvroError::MissingAttribute {
			kind: SchemaKind::Record,
			attr: "name",
		})?;
		let mut fields = Vec::new();
		for (field_name, field_type) in record_fields(schema)? {
			let value = builder.node(field_type, Some(link))?;
			fields.push(RecordField { name: field_name, value });
		}
		Ok(Self { name, fields, set: false })
	}
}

/// Validate a record's `fields` list, yielding each field's name and type node.
pub(crate) fn record_fields<'s>(schema: SchemaNode<'s>) -> Result<Vec<(&'s str, SchemaNode<'s>)>> {
	let list = schema
		.attr("fields")
		.ok_or(AvroError::MissingAttribute {
			kind: SchemaKind::Record,
			attr: "fields",
		})?
		.list()
		.ok_or_else(|| AvroError::attr(SchemaKind::Record, "fields", "expected a list"))?;

	let mut out: Vec<(&'s str, SchemaNode<'s>)> = Vec::new();
	for field in list {
		let name = field
			.attr_str("name")
			.ok_or_else(|| AvroError::attr(SchemaKind::Record, "fields", format!("field without a name: {}", field.json())))?;
		if out.iter().any(|(seen, _)| *seen == name) {
			return Err(AvroError::attr(SchemaKind::Record, "fields", format!("duplicate field {name:?}")));
		}
		let ty = field
			.attr("type")
			.ok_or_else(|| AvroError::attr(SchemaKind::Record, "fields", format!("field {name:?} has no type")))?;
		out.push((name, ty));
	}
	Ok(out)
}

impl<'s> ValueType<'s> for RecordValue<'s> {
	fn is_set(&self) -> bool {
		self.set && self.fields.iter().all(|field| field.value.is_set())
	}

	fn reset(&mut self) {
		self.set = false;
		for field in &mut self.fields {
			field.value.clear();
		}
	}

	fn read(&mut self, _cx: &Arc<ValueContext<'s>>, reader: &mut dyn AvroRead) -> Result<()> {
		self.reset();
		for field in &mut self.fields {
			field.value.read_dyn(reader)?;
		}
		self.set = true;
		Ok(())
	}

	fn write(&self, _cx: &ValueContext<'s>, writer: &mut dyn AvroWrite) -> Result<()> {
		for field in &self.fields {
			field.value.write_dyn(writer)?;
		}
		Ok(())
	}

	fn get(&self) -> Result<Datum> {
		let fields = self
			.fields
			.iter()
			.map(|field| Ok((field.name.to_owned(), field.value.get()?)))
			.collect::<Result<Vec<_>>>()?;
		Ok(Datum::Record(fields))
	}

	fn set(&mut self, _cx: &Arc<ValueContext<'s>>, datum: &Datum) -> Result<()> {
		let Datum::Record(values) = datum else {
			return Err(AvroError::mismatch(SchemaKind::Record, datum.label()));
		};
		if let Some((unknown, _)) = values.iter().find(|(key, _)| !self.fields.iter().any(|field| field.name == key.as_str())) {
			return Err(AvroError::FieldMismatch {
				record: self.name.clone(),
				field: unknown.clone(),
			});
		}
		for field in &mut self.fields {
			let value = datum.field(field.name).ok_or_else(|| AvroError::FieldMismatch {
				record: self.name.clone(),
				field: field.name.to_owned(),
			})?;
			field.value.set(value)?;
		}
		self.set = true;
		Ok(())
	}
}
