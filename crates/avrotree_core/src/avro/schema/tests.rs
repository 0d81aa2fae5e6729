use crate::avro::{AvroError, ErrorKind, Schema, SchemaKind, Shape};

#[test]
fn classifies_node_shapes() {
	let schema = Schema::parse_str(r#"["null", "Thing", {"type": "array", "items": "int"}, {"type": {"type": "map", "values": "long"}}, {"type": "int"}]"#)
		.expect("schema parses");
	let nodes: Vec<_> = schema.root().list().expect("union list").collect();

	assert!(matches!(schema.root().shape(), Ok(Shape::Kind(SchemaKind::Union))));
	assert!(matches!(nodes[0].shape(), Ok(Shape::Kind(SchemaKind::Null))));
	assert!(matches!(nodes[1].shape(), Ok(Shape::Reference("Thing"))));
	assert!(matches!(nodes[2].shape(), Ok(Shape::Kind(SchemaKind::Array))));
	let Ok(Shape::Wrapped(inner)) = nodes[3].shape() else {
		panic!("object with schema-valued type is a wrapper");
	};
	assert!(matches!(inner.shape(), Ok(Shape::Kind(SchemaKind::Map))));
	assert!(matches!(nodes[4].shape(), Ok(Shape::Kind(SchemaKind::Int))));
}

#[test]
fn rejects_nodes_naming_no_type() {
	let schema = Schema::parse_str(r#"[42, {"items": "int"}]"#).expect("schema parses");
	for node in schema.root().list().expect("list") {
		let err = node.shape().expect_err("not a schema node");
		assert!(matches!(err, AvroError::InvalidSchema { .. }));
	}
}

#[test]
fn invalid_json_is_a_schema_error() {
	let err = Schema::parse_str("{\"type\":").expect_err("truncated json");
	assert!(matches!(err, AvroError::SchemaJson(_)));
	assert_eq!(err.kind(), ErrorKind::Schema);
}

#[test]
fn error_keyword_is_a_record() {
	assert_eq!(SchemaKind::complex("error"), Some(SchemaKind::Record));
	assert_eq!(SchemaKind::complex("int"), None);
	assert_eq!(SchemaKind::Record.to_string(), "record");
}

#[test]
fn fullname_follows_namespace_rules() {
	let schema = Schema::parse_str(
		r#"{
			"type": "record", "name": "Outer", "namespace": "a.b",
			"fields": [
				{"name": "x", "type": {"type": "enum", "name": "Color", "symbols": ["R"]}},
				{"name": "y", "type": {"type": "fixed", "name": "c.Hash", "size": 4}},
				{"name": "z", "type": {"type": "record", "name": "Inner", "namespace": "", "fields": []}}
			]
		}"#,
	)
	.expect("schema parses");

	let root = schema.root();
	assert_eq!(root.fullname().as_deref(), Some("a.b.Outer"));

	let types: Vec<_> = root
		.attr("fields")
		.and_then(|fields| fields.list())
		.expect("fields")
		.map(|field| field.attr("type").expect("field type"))
		.collect();
	assert_eq!(types[0].fullname().as_deref(), Some("a.b.Color"));
	assert_eq!(types[1].fullname().as_deref(), Some("c.Hash"));
	assert_eq!(types[2].fullname().as_deref(), Some("Inner"));
	assert_eq!(types[0].enclosing_namespace(), Some("a.b"));
}

#[test]
fn references_qualify_against_enclosing_namespace() {
	let schema = Schema::parse_str(r#"{"type": "record", "name": "x.y.R", "fields": [{"name": "f", "type": "T"}]}"#).expect("schema parses");
	let field_type = schema
		.root()
		.attr("fields")
		.and_then(|fields| fields.list())
		.and_then(|mut fields| fields.next())
		.and_then(|field| field.attr("type"))
		.expect("field type");

	assert_eq!(field_type.qualify("T"), ["x.y.T", "T"]);
	assert_eq!(field_type.qualify("z.T"), ["z.T"]);
}
