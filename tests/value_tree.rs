//! End-to-end tests of the value tree API.

use berbind::{BitString, ErrorKind, Tag, Time, Value};
use berbind::value::Structured;


#[test]
fn certificate_subject_roundtrip() {
    // An X.509-flavoured RDN: SET of SEQUENCE of (OID, value).
    let subject = Value::sequence(vec![
        Value::set(vec![Value::sequence(vec![
            Value::oid_from_dotted_str("2.5.4.6").unwrap(),
            Value::printable_string("SE").unwrap(),
        ])]),
        Value::set(vec![Value::sequence(vec![
            Value::oid_from_dotted_str("2.5.4.3").unwrap(),
            Value::utf8_string("Example Root CA"),
        ])]),
    ]);
    let encoded = subject.encode();
    let (decoded, consumed) = berbind::decode_first(&encoded).unwrap();
    assert_eq!(consumed, encoded.len());
    assert_eq!(decoded, subject);

    // Drill into the second RDN's value.
    let Value::Structured(ref rdns) = decoded else { panic!() };
    let Value::Structured(ref set) = rdns.elements()[1] else { panic!() };
    let Value::Structured(ref atv) = set.elements()[0] else { panic!() };
    assert_eq!(
        atv.elements()[0],
        Value::oid_from_dotted_str("2.5.4.3").unwrap()
    );
    assert_eq!(
        atv.elements()[1],
        Value::utf8_string("Example Root CA")
    );
}

#[test]
fn validity_window() {
    let not_before = Time::new(2023, 1, 1, 0, 0, 0).unwrap();
    let not_after = Time::new(2048, 1, 1, 0, 0, 0).unwrap();
    let validity = Value::sequence(vec![
        Value::utc_time(not_before).unwrap(),
        Value::utc_time(not_after).unwrap(),
    ]);
    let (decoded, _) = berbind::decode_first(&validity.encode()).unwrap();
    let Value::Structured(ref inner) = decoded else { panic!() };
    assert_eq!(inner.elements()[0], Value::UtcTime(not_before));
    assert_eq!(inner.elements()[1], Value::UtcTime(not_after));
}

#[test]
fn enumerated_roundtrip_drops_name() {
    let status = Value::enumerated_named(2, "revoked");
    let (decoded, _) = berbind::decode_first(&status.encode()).unwrap();
    // The symbolic name is construction-side only.
    assert_eq!(decoded, Value::enumerated(2));
    match decoded {
        Value::Enumerated(inner) => {
            assert_eq!(inner.value().to_i64().unwrap(), 2);
            assert_eq!(inner.name(), None);
        }
        other => panic!("expected ENUMERATED, got {:?}", other),
    }
}

#[test]
fn choice_encodes_as_alternative() {
    // A CHOICE between a name and a number, built both ways.
    let by_name = Value::choice_with_id(
        Value::utf8_string("registrar"), "name",
    );
    let by_number = Value::choice(Value::integer(47));

    let (decoded, _) = berbind::decode_first(&by_name.encode()).unwrap();
    assert_eq!(decoded, Value::utf8_string("registrar"));
    let (decoded, _) = berbind::decode_first(&by_number.encode()).unwrap();
    assert_eq!(decoded, Value::integer(47));
}

#[test]
fn application_class_payloads() {
    // An application-tagged wrapper around a sequence, as session
    // protocols like to do.
    let pdu = Value::structured(
        Tag::new(berbind::Class::Application, true, 0),
        vec![
            Value::integer(1),
            Value::octet_string(b"\x01\x02\x03".as_ref()),
        ],
    );
    let encoded = pdu.encode();
    assert_eq!(encoded[0], 0x60);
    let (decoded, _) = berbind::decode_first(&encoded).unwrap();
    assert_eq!(decoded, pdu);
}

#[test]
fn decode_all_streams_values() {
    let mut stream = Vec::new();
    stream.extend_from_slice(&Value::integer(1).encode());
    stream.extend_from_slice(&Value::boolean(true).encode());
    stream.extend_from_slice(
        &Value::bit_string(BitString::from_bit_str("11001").unwrap())
            .encode()
    );
    let values = berbind::decode_all(&stream).unwrap();
    assert_eq!(values.len(), 3);
    assert_eq!(values[0], Value::integer(1));
    assert_eq!(values[1], Value::boolean(true));
    match values[2] {
        Value::BitString(ref bits) => {
            assert_eq!(bits.to_bit_string(), "11001")
        }
        ref other => panic!("expected BIT STRING, got {:?}", other),
    }

    // A truncated tail fails the whole call.
    stream.push(0x02);
    assert_eq!(
        berbind::decode_all(&stream).unwrap_err().kind(),
        ErrorKind::TruncatedInput
    );
}

#[test]
fn structured_builder() {
    let mut seq = Structured::new(Tag::SEQUENCE, Vec::new());
    assert!(seq.is_empty());
    seq.push(Value::null());
    seq.push(Value::integer(5));
    assert_eq!(seq.len(), 2);
    let value = Value::Structured(seq);
    assert_eq!(value.encode().as_ref(), b"\x30\x05\x05\x00\x02\x01\x05");
}

#[test]
fn big_integer_payload() {
    // A 2048 bit modulus-sized INTEGER survives untouched.
    let mut content = vec![0x7Fu8];
    content.extend(std::iter::repeat(0xAB).take(255));
    let int = berbind::Int::from_content(&content).unwrap();
    let value = Value::Integer(int.clone());
    let encoded = value.encode();
    // Long-form length: 0x82 0x01 0x00.
    assert_eq!(&encoded[..4], b"\x02\x82\x01\x00");
    let (decoded, _) = berbind::decode_first(&encoded).unwrap();
    match decoded {
        Value::Integer(ref back) => {
            assert_eq!(back, &int);
            assert_eq!(
                back.to_i64().unwrap_err().kind(),
                ErrorKind::Overflow
            );
        }
        ref other => panic!("expected INTEGER, got {:?}", other),
    }
}
