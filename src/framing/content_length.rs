//! Content-Length framing, as used by the Debug Adapter Protocol's stdio
//! transport: `Content-Length: <N>\r\n\r\n<N bytes of body>`.

use crate::error::{Error, Result};

const HEADER_PREFIX: &str = "Content-Length: ";
const SEPARATOR: &str = "\r\n\r\n";

/// Encode `body` into a full Content-Length-framed message.
pub fn encode(body: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 32);
    out.extend_from_slice(format!("{HEADER_PREFIX}{}\r\n\r\n", body.len()).as_bytes());
    out.extend_from_slice(body.as_bytes());
    out
}

/// Decode a single framed message from the front of `buf`.
///
/// On success, returns `(body, bytes_consumed)`. `bytes_consumed` lets the
/// caller advance its reassembly buffer past exactly the decoded message,
/// leaving any trailing bytes (the start of the next message) untouched.
///
/// Header order does not matter; headers other than `Content-Length` (e.g.
/// `Content-Type`) are accepted and ignored.
pub fn decode(buf: &[u8]) -> Result<(String, usize)> {
    let header_end = find(buf, SEPARATOR.as_bytes()).ok_or(Error::MissingHeader)?;
    let header_block = std::str::from_utf8(&buf[..header_end]).map_err(|_| {
        Error::InvalidHeader("header block is not valid UTF-8".to_string())
    })?;

    let mut content_length: Option<usize> = None;
    for line in header_block.split("\r\n") {
        if let Some(value) = line.strip_prefix(HEADER_PREFIX) {
            let parsed: usize = value
                .trim()
                .parse()
                .map_err(|_| Error::InvalidHeader(format!("bad Content-Length value: {value:?}")))?;
            content_length = Some(parsed);
        }
    }
    let length = content_length
        .ok_or_else(|| Error::InvalidHeader("missing Content-Length header".to_string()))?;

    let body_start = header_end + SEPARATOR.len();
    let have = buf.len().saturating_sub(body_start);
    if have < length {
        return Err(Error::TruncatedBody {
            needed: length,
            have,
        });
    }

    let body_bytes = &buf[body_start..body_start + length];
    let body = String::from_utf8(body_bytes.to_vec())
        .map_err(|_| Error::InvalidHeader("body is not valid UTF-8".to_string()))?;
    Ok((body, body_start + length))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let body = r#"{"seq":1}"#;
        let framed = encode(body);
        let (decoded, consumed) = decode(&framed).unwrap();
        assert_eq!(decoded, body);
        assert_eq!(consumed, framed.len());
    }

    #[test]
    fn s1_framing_literal() {
        let framed = encode(r#"{"seq":1}"#);
        assert_eq!(framed, b"Content-Length: 9\r\n\r\n{\"seq\":1}");
        let (body, consumed) = decode(&framed).unwrap();
        assert_eq!(body, r#"{"seq":1}"#);
        assert_eq!(consumed, 30);
    }

    #[test]
    fn s2_multi_header() {
        let raw = b"Content-Type: application/json\r\nContent-Length: 11\r\n\r\n{\"hello\":1}";
        let (body, _) = decode(raw).unwrap();
        assert_eq!(body, r#"{"hello":1}"#);
    }

    #[test]
    fn header_order_irrelevant() {
        let raw = b"Content-Length: 2\r\nX-Custom: whatever\r\n\r\n{}";
        let (body, _) = decode(raw).unwrap();
        assert_eq!(body, "{}");
    }

    #[test]
    fn s3_truncation() {
        let raw = b"Content-Length: 100\r\n\r\nshort";
        let err = decode(raw).unwrap_err();
        assert!(matches!(err, Error::TruncatedBody { needed: 100, have: 5 }));
    }

    #[test]
    fn missing_separator_is_missing_header() {
        let raw = b"Content-Length: 5\r\nincomplete";
        assert!(matches!(decode(raw).unwrap_err(), Error::MissingHeader));
    }

    #[test]
    fn missing_length_header_is_invalid_header() {
        let raw = b"Content-Type: text/plain\r\n\r\nbody";
        assert!(matches!(decode(raw).unwrap_err(), Error::InvalidHeader(_)));
    }

    #[test]
    fn non_numeric_length_is_invalid_header() {
        let raw = b"Content-Length: not-a-number\r\n\r\nbody";
        assert!(matches!(decode(raw).unwrap_err(), Error::InvalidHeader(_)));
    }

    #[test]
    fn decode_consumes_only_one_message() {
        let mut framed = encode(r#"{"a":1}"#);
        framed.extend_from_slice(&encode(r#"{"b":2}"#));
        let (first, consumed) = decode(&framed).unwrap();
        assert_eq!(first, r#"{"a":1}"#);
        let (second, _) = decode(&framed[consumed..]).unwrap();
        assert_eq!(second, r#"{"b":2}"#);
    }

    #[test]
    fn property_round_trip_for_arbitrary_bodies() {
        for body in ["", "x", &"y".repeat(5000), r#"{"nested":{"a":[1,2,3]}}"#] {
            let framed = encode(body);
            let (decoded, consumed) = decode(&framed).unwrap();
            assert_eq!(decoded, body);
            assert_eq!(consumed, framed.len());
        }
    }
}
