use avrotree_testkit::AvroBytes;
use proptest::prelude::*;

use super::{MAX_VARINT_LEN, decode_long, encode_long, read_int, read_long, skip_varint, unzigzag, zigzag};
use crate::avro::{AvroError, ErrorKind, SliceReader};

#[test]
fn zigzag_interleaves_signs() {
	assert_eq!(zigzag(0), 0);
	assert_eq!(zigzag(-1), 1);
	assert_eq!(zigzag(1), 2);
	assert_eq!(zigzag(-2), 3);
	assert_eq!(zigzag(i64::MAX), u64::MAX - 1);
	assert_eq!(zigzag(i64::MIN), u64::MAX);
	assert_eq!(unzigzag(3), -2);
}

#[test]
fn known_encodings() {
	assert_eq!(encode_long(0), [0x00]);
	assert_eq!(encode_long(-1), [0x01]);
	assert_eq!(encode_long(1), [0x02]);
	assert_eq!(encode_long(63), [0x7e]);
	assert_eq!(encode_long(-64), [0x7f]);
	assert_eq!(encode_long(64), [0x80, 0x01]);
	assert_eq!(encode_long(i64::MIN).len(), MAX_VARINT_LEN);
}

#[test]
fn decode_reports_consumed_length() {
	let (value, used) = decode_long(&[0x80, 0x01, 0xff]).expect("varint decodes");
	assert_eq!(value, 64);
	assert_eq!(used, 2);
}

#[test]
fn decode_of_unterminated_varint_is_truncated() {
	let err = decode_long(&[0x80, 0x80]).expect_err("continuation bit without follow-up");
	assert_eq!(err.kind(), ErrorKind::TruncatedInput);

	let err = decode_long(&[]).expect_err("empty input");
	assert!(matches!(err, AvroError::TruncatedInput { at: 0, need: 1 }));
}

#[test]
fn eleven_byte_varint_overflows() {
	let mut bytes = vec![0x80_u8; 10];
	bytes.push(0x00);
	let err = decode_long(&bytes).expect_err("more than ten groups");
	assert_eq!(err.kind(), ErrorKind::Overflow);

	let err = read_long(&mut SliceReader::new(&bytes)).expect_err("stream decode agrees");
	assert!(matches!(err, AvroError::VarintOverflow { at: 0 }));
}

#[test]
fn tenth_byte_may_only_carry_one_bit() {
	let mut bytes = vec![0xff_u8; 9];
	bytes.push(0x01);
	assert_eq!(decode_long(&bytes).expect("max width").0, i64::MIN);

	bytes[9] = 0x02;
	assert_eq!(decode_long(&bytes).expect_err("bit 64 set").kind(), ErrorKind::Overflow);
}

#[test]
fn read_int_rejects_wide_values() {
	let bytes = AvroBytes::new().long(i64::from(i32::MAX) + 1).finish();
	let err = read_int(&mut SliceReader::new(&bytes)).expect_err("does not fit 32 bits");
	assert!(matches!(err, AvroError::IntOverflow { value } if value == i64::from(i32::MAX) + 1));

	let bytes = AvroBytes::new().long(i64::from(i32::MIN)).finish();
	assert_eq!(read_int(&mut SliceReader::new(&bytes)).expect("fits"), i32::MIN);
}

#[test]
fn skip_consumes_exactly_one_varint() {
	let bytes = AvroBytes::new().long(300).long(-5).finish();
	let mut reader = SliceReader::new(&bytes);
	skip_varint(&mut reader).expect("skip first");
	assert_eq!(read_long(&mut reader).expect("second decodes"), -5);
	assert!(reader.is_empty());
}

proptest! {
	#[test]
	fn encode_matches_reference(value in any::<i64>()) {
		prop_assert_eq!(encode_long(value), AvroBytes::new().long(value).finish());
	}

	#[test]
	fn decode_inverts_encode(value in any::<i64>()) {
		let bytes = encode_long(value);
		prop_assert_eq!(decode_long(&bytes).expect("encoded varint decodes"), (value, bytes.len()));
		prop_assert_eq!(read_long(&mut SliceReader::new(&bytes)).expect("stream decode"), value);
	}
}
