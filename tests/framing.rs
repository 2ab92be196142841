//! C1 properties and end-to-end scenarios that span both framing codecs
//! (spec.md §8: S1-S3, S6, universal properties 1-5).

use dap_proxy::framing::{content_length, websocket};
use dap_proxy::Error;

#[test]
fn s1_framing_literal_scenario() {
    let body = r#"{"seq":1}"#;
    let encoded = content_length::encode(body);
    assert_eq!(encoded, b"Content-Length: 9\r\n\r\n{\"seq\":1}".to_vec());
    let (decoded, consumed) = content_length::decode(&encoded).unwrap();
    assert_eq!(decoded, body);
    assert_eq!(consumed, 30);
}

#[test]
fn s2_multi_header_scenario() {
    let raw = b"Content-Type: application/json\r\nContent-Length: 11\r\n\r\n{\"hello\":1}";
    let (decoded, _) = content_length::decode(raw).unwrap();
    assert_eq!(decoded, r#"{"hello":1}"#);
}

#[test]
fn s3_truncation_scenario() {
    let raw = b"Content-Length: 100\r\n\r\nshort";
    assert!(matches!(
        content_length::decode(raw),
        Err(Error::TruncatedBody { needed: 100, .. })
    ));
}

#[test]
fn property_1_round_trip_for_arbitrary_bodies() {
    for body in ["", "a", "{\"x\":1}", &"z".repeat(5000)] {
        let encoded = content_length::encode(body);
        let (decoded, consumed) = content_length::decode(&encoded).unwrap();
        assert_eq!(decoded, body);
        assert_eq!(consumed, encoded.len());
    }
}

#[test]
fn property_5_underrun_never_reports_an_unrelated_error() {
    let full = content_length::encode(r#"{"a":1}"#);
    for len in 0..full.len() {
        match content_length::decode(&full[..len]) {
            Err(Error::MissingHeader) | Err(Error::TruncatedBody { .. }) => {}
            Ok(_) => panic!("prefix of length {len} should not decode successfully"),
            Err(other) => panic!("unexpected error at prefix length {len}: {other:?}"),
        }
    }
}

#[test]
fn property_3_websocket_round_trip_across_length_boundaries() {
    for len in [0usize, 1, 125, 126, 127, 65535, 65536] {
        let payload = vec![0x42u8; len];
        let encoded = websocket::encode(&payload, websocket::Opcode::Binary);
        let (decoded, consumed) = websocket::decode(&encoded).unwrap();
        assert_eq!(decoded.payload, payload);
        assert_eq!(decoded.opcode, websocket::Opcode::Binary);
        assert!(decoded.fin);
        assert_eq!(consumed, encoded.len());
    }
}

#[test]
fn property_4_masked_round_trip() {
    let payload = b"hello websocket".to_vec();
    let key = [0x11, 0x22, 0x33, 0x44];
    let encoded = websocket::encode_masked(&payload, websocket::Opcode::Text, key);
    assert_ne!(&encoded[6..6 + payload.len()], payload.as_slice());
    let (decoded, _) = websocket::decode(&encoded).unwrap();
    assert_eq!(decoded.payload, payload);
}

#[test]
fn s6_websocket_close_scenario() {
    let body = websocket::close_payload(1001, "going away");
    let encoded = websocket::encode(&body, websocket::Opcode::Close);
    let (decoded, _) = websocket::decode(&encoded).unwrap();
    assert!(decoded.fin);
    assert_eq!(decoded.opcode, websocket::Opcode::Close);
    assert_eq!(&decoded.payload[..2], &[0x03, 0xE9]);
    assert_eq!(&decoded.payload[2..], b"going away");
    let (status, reason) = websocket::parse_close_payload(&decoded.payload).unwrap();
    assert_eq!(status, 1001);
    assert_eq!(reason, "going away");
}
