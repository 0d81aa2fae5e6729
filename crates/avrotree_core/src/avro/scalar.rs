use std::sync::Arc;

use crate::avro::io::{AvroRead, AvroWrite};
use crate::avro::value::ValueType;
use crate::avro::{AvroError, Datum, Result, SchemaKind, ValueContext, ValueOptions};

/// Fixed-layout primitive carried by a [`Scalar`] node.
pub(crate) trait Primitive: Sized {
	const KIND: SchemaKind;

	fn decode(reader: &mut dyn AvroRead, options: &ValueOptions) -> Result<Self>;

	fn encode(&self, writer: &mut dyn AvroWrite) -> Result<()>;

	fn to_datum(&self) -> Datum;

	fn from_datum(datum: &Datum) -> Option<Self>;
}

/// Single decoded primitive plus its "is set" state.
#[derive(Debug)]
pub(crate) struct Scalar<T> {
	pub(crate) value: Option<T>,
}

impl<T> Scalar<T> {
	pub(crate) fn new() -> Self {
		Self { value: None }
	}
}

impl<'s, T: Primitive> ValueType<'s> for Scalar<T> {
	fn is_set(&self) -> bool {
		self.value.is_some()
	}

	fn reset(&mut self) {
		self.value = None;
	}

	fn read(&mut self, cx: &Arc<ValueContext<'s>>, reader: &mut dyn AvroRead) -> Result<()> {
		self.value = None;
		self.value = Some(T::decode(reader, cx.options())?);
		Ok(())
	}

	fn write(&self, _cx: &ValueContext<'s>, writer: &mut dyn AvroWrite) -> Result<()> {
		match &self.value {
			Some(value) => value.encode(writer),
			None => Err(AvroError::ValueNotSet { kind: T::KIND }),
		}
	}

	fn get(&self) -> Result<Datum> {
		self.value.as_ref().map(Primitive::to_datum).ok_or(AvroError::ValueNotSet { kind: T::KIND })
	}

	fn set(&mut self, _cx: &Arc<ValueContext<'s>>, datum: &Datum) -> Result<()> {
		let value = T::from_datum(datum).ok_or_else(|| AvroError::mismatch(T::KIND, datum.label()))?;
		self.value = Some(value);
		Ok(())
	}
}

impl Primitive for () {
	const KIND: SchemaKind = SchemaKind::Null;

	fn decode(_reader: &mut dyn AvroRead, _options: &ValueOptions) -> Result<Self> {
		Ok(())
	}

	fn encode(&self, _writer: &mut dyn AvroWrite) -> Result<()> {
		Ok(())
	}

	fn to_datum(&self) -> Datum {
		Datum::Null
	}

	fn from_datum(datum: &Datum) -> Option<Self> {
		matches!(datum, Datum::Null).then_some(())
	}
}

impl Primitive for bool {
	const KIND: SchemaKind = SchemaKind::Boolean;

	fn decode(reader: &mut dyn AvroRead, _options: &ValueOptions) -> Result<Self> {
		match reader.read_u8()? {
			0 => Ok(false),
			1 => Ok(true),
			byte => Err(AvroError::InvalidBoolean { byte }),
		}
	}

	fn encode(&self, writer: &mut dyn AvroWrite) -> Result<()> {
		writer.write_bytes(&[u8::from(*self)])
	}

	fn to_datum(&self) -> Datum {
		Datum::Boolean(*self)
	}

	fn from_datum(datum: &Datum) -> Option<Self> {
		match datum {
			Datum::Boolean(value) => Some(*value),
			_ => None,
		}
	}
}

impl Primitive for i32 {
	const KIND: SchemaKind = SchemaKind::Int;

	fn decode(reader: &mut dyn AvroRead, _options: &ValueOptions) -> Result<Self> {
		reader.read_int()
	}

	fn encode(&self, writer: &mut dyn AvroWrite) -> Result<()> {
		writer.write_long(i64::from(*self))
	}

	fn to_datum(&self) -> Datum {
		Datum::Int(*self)
	}

	fn from_datum(datum: &Datum) -> Option<Self> {
		match datum {
			Datum::Int(value) => Some(*value),
			_ => None,
		}
	}
}

impl Primitive for i64 {
	const KIND: SchemaKind = SchemaKind::Long;

	fn decode(reader: &mut dyn AvroRead, _options: &ValueOptions) -> Result<Self> {
		reader.read_long()
	}

	fn encode(&self, writer: &mut dyn AvroWrite) -> Result<()> {
		writer.write_long(*self)
	}

	fn to_datum(&self) -> Datum {
		Datum::Long(*self)
	}

	fn from_datum(datum: &Datum) -> Option<Self> {
		match datum {
			Datum::Long(value) => Some(*value),
			Datum::Int(value) => Some(i64::from(*value)),
			_ => None,
		}
	}
}

impl Primitive for f32 {
	const KIND: SchemaKind = SchemaKind::Float;

	fn decode(reader: &mut dyn AvroRead, _options: &ValueOptions) -> Result<Self> {
		let mut buf = [0_u8; 4];
		reader.read_exact(&mut buf)?;
		Ok(f32::from_le_bytes(buf))
	}

	fn encode(&self, writer: &mut dyn AvroWrite) -> Result<()> {
		writer.write_bytes(&self.to_le_bytes())
	}

	fn to_datum(&self) -> Datum {
		Datum::Float(*self)
	}

	fn from_datum(datum: &Datum) -> Option<Self> {
		match datum {
			Datum::Float(value) => Some(*value),
			_ => None,
		}
	}
}

impl Primitive for f64 {
	const KIND: SchemaKind = SchemaKind::Double;

	fn decode(reader: &mut dyn AvroRead, _options: &ValueOptions) -> Result<Self> {
		let mut buf = [0_u8; 8];
		reader.read_exact(&mut buf)?;
		Ok(f64::from_le_bytes(buf))
	}

	fn encode(&self, writer: &mut dyn AvroWrite) -> Result<()> {
		writer.write_bytes(&self.to_le_bytes())
	}

	fn to_datum(&self) -> Datum {
		Datum::Double(*self)
	}

	fn from_datum(datum: &Datum) -> Option<Self> {
		match datum {
			Datum::Double(value) => Some(*value),
			Datum::Float(value) => Some(f64::from(*value)),
			_ => None,
		}
	}
}

impl Primitive for Vec<u8> {
	const KIND: SchemaKind = SchemaKind::Bytes;

	fn decode(reader: &mut dyn AvroRead, options: &ValueOptions) -> Result<Self> {
		let len = read_len(reader, options)?;
		reader.read_vec(len)
	}

	fn encode(&self, writer: &mut dyn AvroWrite) -> Result<()> {
		write_len_prefixed(writer, self)
	}

	fn to_datum(&self) -> Datum {
		Datum::Bytes(self.clone())
	}

	fn from_datum(datum: &Datum) -> Option<Self> {
		match datum {
			Datum::Bytes(value) => Some(value.clone()),
			_ => None,
		}
	}
}

impl Primitive for String {
	const KIND: SchemaKind = SchemaKind::String;

	fn decode(reader: &mut dyn AvroRead, options: &ValueOptions) -> Result<Self> {
		read_string(reader, options)
	}

	fn encode(&self, writer: &mut dyn AvroWrite) -> Result<()> {
		write_len_prefixed(writer, self.as_bytes())
	}

	fn to_datum(&self) -> Datum {
		Datum::String(self.clone())
	}

	fn from_datum(datum: &Datum) -> Option<Self> {
		match datum {
			Datum::String(value) => Some(value.clone()),
			_ => None,
		}
	}
}

/// Read a `long` length prefix, rejecting negative and oversized values.
pub(crate) fn read_len(reader: &mut dyn AvroRead, options: &ValueOptions) -> Result<usize> {
	let len = reader.read_long()?;
	if len < 0 {
		return Err(AvroError::NegativeLength { len, at: reader.position() });
	}
	let len = len as u64;
	match usize::try_from(len) {
		Ok(value) if value <= options.max_bytes_len => Ok(value),
		_ => Err(AvroError::LengthTooLarge {
			len,
			max: options.max_bytes_len,
		}),
	}
}

/// Read a length-prefixed UTF-8 string.
pub(crate) fn read_string(reader: &mut dyn AvroRead, options: &ValueOptions) -> Result<String> {
	let len = read_len(reader, options)?;
	Ok(String::from_utf8(reader.read_vec(len)?)?)
}

/// Write a `long` length prefix followed by the payload.
pub(crate) fn write_len_prefixed(writer: &mut dyn AvroWrite, bytes: &[u8]) -> Result<()> {
	writer.write_long(bytes.len() as i64)?;
	writer.write_bytes(bytes)
}
