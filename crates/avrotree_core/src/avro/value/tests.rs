use avrotree_testkit::AvroBytes;

use crate::avro::{AvroError, Datum, ErrorKind, ParentLink, Schema, SchemaKind, SliceReader, ValueContext};

const USER: &str = r#"{
	"type": "record", "name": "User", "namespace": "app",
	"fields": [
		{"name": "name", "type": "string"},
		{"name": "age", "type": ["null", "int"]},
		{"name": "prefs", "type": {"type": "map", "values": "boolean"}},
		{"name": "role", "type": {"type": "enum", "name": "Role", "symbols": ["ADMIN", "GUEST"]}},
		{"name": "key", "type": {"type": "fixed", "name": "Key", "size": 2}}
	]
}"#;

fn user_bytes() -> Vec<u8> {
	AvroBytes::new()
		.string("ada")
		.long(1)
		.long(36)
		.long(2)
		.string("dark")
		.boolean(true)
		.string("beta")
		.boolean(false)
		.long(0)
		.long(1)
		.raw(&[0xbe, 0xef])
		.finish()
}

fn user_datum() -> Datum {
	Datum::Record(vec![
		("name".to_owned(), Datum::String("ada".to_owned())),
		("age".to_owned(), Datum::Union(1, Box::new(Datum::Int(36)))),
		(
			"prefs".to_owned(),
			Datum::Map(vec![("dark".to_owned(), Datum::Boolean(true)), ("beta".to_owned(), Datum::Boolean(false))]),
		),
		("role".to_owned(), Datum::Enum("GUEST".to_owned())),
		("key".to_owned(), Datum::Fixed(vec![0xbe, 0xef])),
	])
}

#[test]
fn record_reads_every_field_in_order() {
	let schema = Schema::parse_str(USER).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let mut user = cx.create_root().expect("tree builds");
	assert!(!user.is_set());

	let bytes = user_bytes();
	user.read(&mut SliceReader::new(&bytes)).expect("record decodes");

	assert!(user.is_set());
	assert_eq!(user.get().expect("set"), user_datum());
	let names: Vec<_> = user.fields().iter().map(|field| field.name()).collect();
	assert_eq!(names, ["name", "age", "prefs", "role", "key"]);

	let prefs = user.field("prefs").expect("prefs field");
	let keys: Vec<_> = prefs.entries().iter().map(|entry| entry.key()).collect();
	assert_eq!(keys, ["dark", "beta"]);
	assert_eq!(prefs.entries()[0].value().parent(), Some(ParentLink { kind: SchemaKind::Map, depth: 1 }));

	assert_eq!(user.to_bytes().expect("encodes"), bytes);
}

#[test]
fn set_builds_the_same_encoding_as_read() {
	let schema = Schema::parse_str(USER).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let mut user = cx.create_root().expect("tree builds");

	user.set(&user_datum()).expect("datum matches schema");
	assert_eq!(user.to_bytes().expect("encodes"), user_bytes());
}

#[test]
fn record_set_rejects_unknown_and_missing_fields() {
	let schema = Schema::parse_str(USER).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let mut user = cx.create_root().expect("tree builds");

	let Datum::Record(mut fields) = user_datum() else {
		unreachable!();
	};
	fields.push(("extra".to_owned(), Datum::Null));
	let err = user.set(&Datum::Record(fields.clone())).expect_err("unknown field");
	assert!(matches!(err, AvroError::FieldMismatch { ref record, ref field } if record == "app.User" && field == "extra"));

	fields.truncate(2);
	let err = user.set(&Datum::Record(fields)).expect_err("missing fields");
	assert!(matches!(err, AvroError::FieldMismatch { ref field, .. } if field == "prefs"));
	assert!(!user.is_set());
}

#[test]
fn partially_read_record_is_not_writable() {
	let schema = Schema::parse_str(USER).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let mut user = cx.create_root().expect("tree builds");

	let bytes = user_bytes();
	let err = user.read(&mut SliceReader::new(&bytes[..bytes.len() - 1])).expect_err("fixed cut short");
	assert_eq!(err.kind(), ErrorKind::TruncatedInput);
	assert!(user.field("name").expect("name").is_set());
	assert!(matches!(user.to_bytes(), Err(AvroError::ValueNotSet { kind: SchemaKind::Record })));
	let key = user.field("key").expect("key");
	assert!(matches!(key.to_bytes(), Err(AvroError::ValueNotSet { kind: SchemaKind::Fixed })));
}

#[test]
fn enum_index_is_validated() {
	let schema = Schema::parse_str(r#"{"type": "enum", "name": "E", "symbols": ["A", "B"]}"#).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let mut node = cx.create_root().expect("tree builds");

	let err = node.read(&mut SliceReader::new(&[0x04])).expect_err("index 2 of 2");
	assert!(matches!(err, AvroError::EnumIndexOutOfRange { index: 2, symbols: 2 }));

	let err = node.set(&Datum::Enum("C".to_owned())).expect_err("unknown symbol");
	assert!(matches!(err, AvroError::TypeMismatch { expected: SchemaKind::Enum, .. }));

	node.set(&Datum::Enum("B".to_owned())).expect("known symbol");
	assert_eq!(node.to_bytes().expect("encodes"), [0x02]);
}

#[test]
fn enum_symbols_must_be_unique_strings() {
	for text in [
		r#"{"type": "enum", "name": "E", "symbols": ["A", "A"]}"#,
		r#"{"type": "enum", "name": "E", "symbols": [1]}"#,
		r#"{"type": "enum", "name": "E", "symbols": "A"}"#,
	] {
		let schema = Schema::parse_str(text).expect("schema parses");
		let cx = ValueContext::new(&schema).expect("context builds");
		let err = cx.create_root().expect_err("bad symbols");
		assert!(matches!(err, AvroError::InvalidAttribute { attr: "symbols", .. }), "{text}");
	}
}

#[test]
fn fixed_size_is_enforced() {
	let schema = Schema::parse_str(r#"{"type": "fixed", "name": "F", "size": 4}"#).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let mut node = cx.create_root().expect("tree builds");

	let err = node.set(&Datum::Fixed(vec![1, 2, 3])).expect_err("three of four bytes");
	assert!(matches!(err, AvroError::FixedSizeMismatch { expected: 4, got: 3 }));

	node.read(&mut SliceReader::new(&[9, 8, 7, 6])).expect("four bytes decode");
	assert_eq!(node.get().expect("set"), Datum::Fixed(vec![9, 8, 7, 6]));

	let schema = Schema::parse_str(r#"{"type": "fixed", "name": "F"}"#).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	assert!(matches!(cx.create_root(), Err(AvroError::MissingAttribute { attr: "size", .. })));
}

#[test]
fn union_branch_changes_rebuild_the_node() {
	let schema = Schema::parse_str(r#"["null", "string", {"type": "array", "items": "long"}]"#).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let mut node = cx.create_root().expect("tree builds");
	assert!(node.branch().is_none());

	node.read(&mut SliceReader::new(&AvroBytes::new().long(1).string("s").finish())).expect("string branch");
	assert_eq!(node.branch().map(|(idx, branch)| (idx, branch.kind())), Some((1, SchemaKind::String)));

	node.read(&mut SliceReader::new(&AvroBytes::new().long(2).long(1).long(5).long(0).finish())).expect("array branch");
	let (idx, branch) = node.branch().expect("selected");
	assert_eq!(idx, 2);
	assert_eq!(branch.get().expect("set"), Datum::Array(vec![Datum::Long(5)]));

	node.read(&mut SliceReader::new(&[0x00])).expect("null branch");
	assert_eq!(node.get().expect("set"), Datum::Union(0, Box::new(Datum::Null)));
	assert_eq!(node.to_bytes().expect("encodes"), [0x00]);
}

#[test]
fn union_rejects_bad_indices_and_shapes() {
	let schema = Schema::parse_str(r#"["null", "int"]"#).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let mut node = cx.create_root().expect("tree builds");

	let err = node.read(&mut SliceReader::new(&[0x04])).expect_err("branch 2 of 2");
	assert!(matches!(err, AvroError::UnionBranchOutOfRange { index: 2, branches: 2 }));
	assert!(matches!(node.select_branch(5), Err(AvroError::UnionBranchOutOfRange { index: 5, .. })));

	for text in ["[]", r#"["null", ["int"]]"#] {
		let schema = Schema::parse_str(text).expect("schema parses");
		let cx = ValueContext::new(&schema).expect("context builds");
		assert!(matches!(cx.create_root(), Err(AvroError::InvalidSchema { .. })), "{text}");
	}
}

#[test]
fn select_branch_keeps_current_node() {
	let schema = Schema::parse_str(r#"["null", "int"]"#).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let mut node = cx.create_root().expect("tree builds");

	node.select_branch(1).expect("int branch").set(&Datum::Int(4)).expect("set");
	assert!(node.select_branch(1).expect("same branch").is_set());
	assert!(!node.select_branch(0).expect("null branch").is_set());
	assert_eq!(node.get().map(|datum| datum.label()).ok(), None, "fresh null branch is unset");
}

#[test]
fn deferred_node_materializes_on_set() {
	let schema = Schema::parse_str(
		r#"{"type": "record", "name": "Box", "fields": [{"name": "inner", "type": {"type": "array", "items": "Box"}}]}"#,
	)
	.expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let root = cx.create_root().expect("tree builds");

	let template = root.field("inner").and_then(|inner| inner.template()).expect("template");
	assert!(template.is_deferred());
	assert!(!template.is_set());
	assert!(matches!(template.get(), Err(AvroError::ValueNotSet { kind: SchemaKind::Record })));

	let mut standalone = cx.create(template.schema()).expect("standalone box");
	let nested = Datum::Record(vec![("inner".to_owned(), Datum::Array(vec![Datum::Record(vec![("inner".to_owned(), Datum::Array(vec![]))])]))]);
	standalone.set(&nested).expect("nested boxes");
	assert_eq!(standalone.to_bytes().expect("encodes"), [0x02, 0x00, 0x00]);
}

#[test]
fn clear_unsets_the_whole_tree() {
	let schema = Schema::parse_str(USER).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let mut user = cx.create_root().expect("tree builds");
	user.read(&mut SliceReader::new(&user_bytes())).expect("decodes");

	user.clear();
	assert!(!user.is_set());
	assert!(user.field("prefs").expect("prefs").is_empty());
	assert!(matches!(user.to_bytes(), Err(AvroError::ValueNotSet { .. })));
}

#[test]
fn field_mut_edits_in_place() {
	let schema = Schema::parse_str(USER).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let mut user = cx.create_root().expect("tree builds");
	user.read(&mut SliceReader::new(&user_bytes())).expect("decodes");

	user.field_mut("name").expect("name").set(&Datum::String("bob".to_owned())).expect("set");
	let bytes = user.to_bytes().expect("encodes");
	assert_eq!(&bytes[..4], AvroBytes::new().string("bob").as_slice());
}

#[test]
fn trees_move_across_threads() {
	fn assert_send<T: Send>() {}
	assert_send::<crate::avro::ValueNode<'static>>();

	let schema = Schema::parse_str(r#"{"type": "array", "items": "long"}"#).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let mut node = cx.create_root().expect("tree builds");
	let bytes = AvroBytes::new().long(2).long(7).long(-3).long(0).finish();

	std::thread::scope(|scope| {
		scope.spawn(|| node.read(&mut SliceReader::new(&bytes)).expect("decodes"));
	});
	assert_eq!(node.element(1).and_then(|item| item.get().ok()), Some(Datum::Long(-3)));
	assert!(node.element(2).is_none());
}

#[test]
fn empty_record_is_unset_until_read_or_set() {
	let schema = Schema::parse_str(r#"{"type": "record", "name": "Empty", "fields": []}"#).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let mut empty = cx.create_root().expect("tree builds");

	assert!(!empty.is_set());
	assert!(matches!(empty.to_bytes(), Err(AvroError::ValueNotSet { kind: SchemaKind::Record })));

	empty.read(&mut SliceReader::new(&[])).expect("nothing to decode");
	assert!(empty.is_set());
	assert_eq!(empty.to_bytes().expect("encodes"), Vec::<u8>::new());

	empty.clear();
	assert!(!empty.is_set());
	empty.set(&Datum::Record(Vec::new())).expect("set");
	assert!(empty.is_set());
}

#[test]
fn field_mut_reaches_through_materialized_references() {
	let schema = Schema::parse_str(
		r#"{"type": "record", "name": "Chain", "fields": [{"name": "n", "type": "int"}, {"name": "inner", "type": "Chain"}]}"#,
	)
	.expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let mut chain = cx.create_root().expect("tree builds");
	assert!(chain.field("inner").expect("inner").is_deferred());

	// The schema has no finite encoding, so decoding always runs out of input.
	let err = chain.read(&mut SliceReader::new(&[0x02, 0x04])).expect_err("chain never ends");
	assert_eq!(err.kind(), ErrorKind::TruncatedInput);

	let inner = chain.field_mut("inner").expect("inner");
	assert!(!inner.is_deferred());
	let n = inner.field_mut("n").expect("materialized field");
	assert_eq!(n.get().expect("decoded before truncation"), Datum::Int(2));
	n.set(&Datum::Int(9)).expect("set");
	assert_eq!(chain.field("inner").and_then(|inner| inner.field("n")).and_then(|n| n.get().ok()), Some(Datum::Int(9)));
}
