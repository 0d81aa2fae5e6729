use avrotree_testkit::json;
use serde_json::json as jv;

use super::{datum_to_json, json_to_datum};
use crate::avro::{AvroError, Datum, Schema, SliceReader, ValueContext};

const ORDER: &str = r#"{
	"type": "record", "name": "Order", "namespace": "shop",
	"fields": [
		{"name": "id", "type": "long"},
		{"name": "note", "type": ["null", "string"], "default": null},
		{"name": "qty", "type": "int", "default": 1},
		{"name": "item", "type": ["null", {"type": "record", "name": "Item", "fields": [{"name": "sku", "type": "string"}]}]},
		{"name": "hash", "type": {"type": "fixed", "name": "Hash", "size": 2}},
		{"name": "ratio", "type": "double"}
	]
}"#;

#[test]
fn json_round_trips_through_binary() {
	let schema = Schema::parse_str(ORDER).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let mut order = cx.create_root().expect("tree builds");

	let input = json(r#"{"id": 7, "note": {"string": "rush"}, "qty": 3, "item": {"shop.Item": {"sku": "A-1"}}, "hash": "ÿ\u0001", "ratio": "NaN"}"#);
	order.set_json(&input).expect("json matches schema");

	let bytes = order.to_bytes().expect("encodes");
	let mut decoded = cx.create_root().expect("tree builds");
	decoded.read(&mut SliceReader::new(&bytes)).expect("decodes");

	let output = decoded.to_json().expect("renders");
	assert_eq!(output["id"], jv!(7));
	assert_eq!(output["note"], jv!({"string": "rush"}));
	assert_eq!(output["item"], jv!({"shop.Item": {"sku": "A-1"}}));
	assert_eq!(output["hash"], jv!("\u{ff}\u{1}"));
	assert_eq!(output["ratio"], jv!("NaN"));
}

#[test]
fn missing_fields_take_defaults() {
	let schema = Schema::parse_str(ORDER).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let mut order = cx.create_root().expect("tree builds");

	order.set_json(&json(r#"{"id": 1, "item": null, "hash": "ab", "ratio": 0.5}"#)).expect("defaults fill gaps");
	assert_eq!(order.field("qty").and_then(|qty| qty.get().ok()), Some(Datum::Int(1)));
	assert_eq!(order.field("note").and_then(|note| note.get().ok()), Some(Datum::Union(0, Box::new(Datum::Null))));

	let err = order.set_json(&json(r#"{"id": 1, "item": null, "ratio": 0.5}"#)).expect_err("hash has no default");
	assert!(matches!(err, AvroError::FieldMismatch { ref field, .. } if field == "hash"));
}

#[test]
fn short_union_branch_names_resolve() {
	let schema = Schema::parse_str(ORDER).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let item = cx.lookup("shop.Order").expect("registered");
	let datum = json_to_datum(&cx, item, &json(r#"{"id": 2, "item": {"Item": {"sku": "z"}}, "hash": "zz", "ratio": 1}"#), 0).expect("short name");
	let Some(Datum::Union(index, _)) = datum.field("item") else {
		panic!("item is a union");
	};
	assert_eq!(*index, 1);
}

#[test]
fn shape_errors_are_type_mismatches() {
	let schema = Schema::parse_str(r#"{"type": "array", "items": "int"}"#).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let root = cx.root_schema();

	assert!(matches!(json_to_datum(&cx, root, &jv!({"a": 1}), 0), Err(AvroError::TypeMismatch { .. })));
	assert!(matches!(json_to_datum(&cx, root, &jv!([1, "2"]), 0), Err(AvroError::TypeMismatch { .. })));
	assert!(matches!(json_to_datum(&cx, root, &jv!([4_000_000_000_i64]), 0), Err(AvroError::IntOverflow { .. })));
	assert!(matches!(datum_to_json(&cx, root, &Datum::Int(1), 0), Err(AvroError::TypeMismatch { .. })));
}

#[test]
fn bytes_outside_latin1_are_rejected() {
	let schema = Schema::parse_str(r#""bytes""#).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let err = json_to_datum(&cx, cx.root_schema(), &jv!("\u{100}"), 0).expect_err("code point 256");
	assert!(matches!(err, AvroError::TypeMismatch { .. }));
}

#[test]
fn infinities_use_string_spellings() {
	let schema = Schema::parse_str(r#"{"type": "array", "items": "float"}"#).expect("schema parses");
	let cx = ValueContext::new(&schema).expect("context builds");
	let datum = Datum::Array(vec![Datum::Float(f32::INFINITY), Datum::Float(f32::NEG_INFINITY), Datum::Float(0.5)]);
	let out = datum_to_json(&cx, cx.root_schema(), &datum, 0).expect("renders");
	assert_eq!(out, jv!(["Infinity", "-Infinity", 0.5]));
	assert_eq!(json_to_datum(&cx, cx.root_schema(), &out, 0).expect("parses back"), datum);
}
