#![allow(missing_docs)]

use std::num::NonZeroUsize;

use avrotree::avro::{AvroRead, Datum, Schema, SliceReader, ValueContext, ValueOptions};
use proptest::prelude::*;

const RECORD: &str = r#"{
	"type": "record", "name": "Sample",
	"fields": [
		{"name": "ints", "type": {"type": "array", "items": "int"}},
		{"name": "words", "type": {"type": "map", "values": "string"}},
		{"name": "maybe", "type": ["null", "long"]}
	]
}"#;

fn sample() -> impl Strategy<Value = Datum> {
	(
		prop::collection::vec(any::<i32>(), 0..40),
		prop::collection::btree_map("[a-z]{1,6}", "\\PC{0,12}", 0..8),
		prop::option::of(any::<i64>()),
	)
		.prop_map(|(ints, words, maybe)| {
			Datum::Record(vec![
				("ints".to_owned(), Datum::Array(ints.into_iter().map(Datum::Int).collect())),
				(
					"words".to_owned(),
					Datum::Map(words.into_iter().map(|(key, value)| (key, Datum::String(value))).collect()),
				),
				(
					"maybe".to_owned(),
					match maybe {
						Some(value) => Datum::Union(1, Box::new(Datum::Long(value))),
						None => Datum::Union(0, Box::new(Datum::Null)),
					},
				),
			])
		})
}

fn options(chunk: Option<usize>, sized: bool) -> ValueOptions {
	ValueOptions {
		write_block_items: chunk.and_then(NonZeroUsize::new),
		write_block_sizes: sized,
		..ValueOptions::default()
	}
}

proptest! {
	#[test]
	fn write_read_round_trip(datum in sample(), chunk in prop::option::of(1_usize..8), sized in any::<bool>()) {
		let schema = Schema::parse_str(RECORD).expect("schema parses");
		let cx = ValueContext::with_options(&schema, options(chunk, sized)).expect("context builds");
		let mut node = cx.create_root().expect("tree builds");
		node.set(&datum).expect("datum matches schema");
		let bytes = node.to_bytes().expect("encodes");

		let mut decoded = cx.create_root().expect("tree builds");
		let mut reader = SliceReader::new(&bytes);
		decoded.read(&mut reader).expect("decodes");
		prop_assert!(reader.is_empty());
		prop_assert_eq!(decoded.get().expect("set"), datum);

		let mut skipper = SliceReader::new(&bytes);
		decoded.skip(&mut skipper).expect("skips");
		prop_assert_eq!(skipper.position(), bytes.len() as u64);
	}

	#[test]
	fn every_strict_prefix_is_truncated(datum in sample()) {
		let schema = Schema::parse_str(RECORD).expect("schema parses");
		let cx = ValueContext::new(&schema).expect("context builds");
		let mut node = cx.create_root().expect("tree builds");
		node.set(&datum).expect("datum matches schema");
		let bytes = node.to_bytes().expect("encodes");

		for cut in 0..bytes.len() {
			let err = node.read(&mut SliceReader::new(&bytes[..cut])).expect_err("prefix is incomplete");
			prop_assert_eq!(err.kind(), avrotree::avro::ErrorKind::TruncatedInput);
		}
	}
}
