/// Owned snapshot of a value, detached from any value tree.
///
/// [`crate::avro::ValueNode::get`] produces one and
/// [`crate::avro::ValueNode::set`] assigns one after checking it against the
/// node's schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
	/// `null`
	Null,
	/// `boolean`
	Boolean(bool),
	/// `int`
	Int(i32),
	/// `long`
	Long(i64),
	/// `float`
	Float(f32),
	/// `double`
	Double(f64),
	/// `bytes`
	Bytes(Vec<u8>),
	/// `string`
	String(String),
	/// `fixed`; length must equal the declared size.
	Fixed(Vec<u8>),
	/// `enum`, by symbol.
	Enum(String),
	/// `array` elements in order.
	Array(Vec<Datum>),
	/// `map` entries in stream order.
	Map(Vec<(String, Datum)>),
	/// `record` fields in declared order.
	Record(Vec<(String, Datum)>),
	/// Union branch index and the branch value.
	Union(usize, Box<Datum>),
}

impl Datum {
	/// Short label used in mismatch diagnostics.
	pub fn label(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Boolean(_) => "boolean",
			Self::Int(_) => "int",
			Self::Long(_) => "long",
			Self::Float(_) => "float",
			Self::Double(_) => "double",
			Self::Bytes(_) => "bytes",
			Self::String(_) => "string",
			Self::Fixed(_) => "fixed",
			Self::Enum(_) => "enum",
			Self::Array(_) => "array",
			Self::Map(_) => "map",
			Self::Record(_) => "record",
			Self::Union(..) => "union",
		}
	}

	/// Look up a record field by name.
	pub fn field(&self, name: &str) -> Option<&Datum> {
		match self {
			Self::Record(fields) => fields.iter().find(|(key, _)| key == name).map(|(_, value)| value),
			_ => None,
		}
	}
}
