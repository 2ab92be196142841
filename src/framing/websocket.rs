//! RFC 6455 WebSocket frame encode/decode, used by the CDP-style alternate
//! transport (see §6 of spec.md). Only single-frame messages (FIN always
//! set) are produced; decoding reports whatever FIN bit was actually sent.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Continuation,
    Text,
    Binary,
    Close,
    Ping,
    Pong,
}

impl Opcode {
    fn to_bits(self) -> u8 {
        match self {
            Opcode::Continuation => 0x0,
            Opcode::Text => 0x1,
            Opcode::Binary => 0x2,
            Opcode::Close => 0x8,
            Opcode::Ping => 0x9,
            Opcode::Pong => 0xA,
        }
    }

    fn from_bits(bits: u8) -> Result<Self> {
        Ok(match bits {
            0x0 => Opcode::Continuation,
            0x1 => Opcode::Text,
            0x2 => Opcode::Binary,
            0x8 => Opcode::Close,
            0x9 => Opcode::Ping,
            0xA => Opcode::Pong,
            other => return Err(Error::InvalidOpcode(other)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub fin: bool,
    pub opcode: Opcode,
    pub payload: Vec<u8>,
}

/// Encode an unmasked frame (server -> client direction, or any transport
/// where masking is not required).
pub fn encode(payload: &[u8], opcode: Opcode) -> Vec<u8> {
    encode_inner(payload, opcode, None)
}

/// Encode a masked frame (client -> server direction per RFC 6455, which
/// mandates masking on all client-originated frames).
pub fn encode_masked(payload: &[u8], opcode: Opcode, key: [u8; 4]) -> Vec<u8> {
    encode_inner(payload, opcode, Some(key))
}

fn encode_inner(payload: &[u8], opcode: Opcode, key: Option<[u8; 4]>) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 14);
    out.push(0x80 | opcode.to_bits());

    let mask_bit = if key.is_some() { 0x80 } else { 0x00 };
    let len = payload.len();
    if len < 126 {
        out.push(mask_bit | len as u8);
    } else if len <= 0xFFFF {
        out.push(mask_bit | 126);
        out.extend_from_slice(&(len as u16).to_be_bytes());
    } else {
        out.push(mask_bit | 127);
        out.extend_from_slice(&(len as u64).to_be_bytes());
    }

    match key {
        None => out.extend_from_slice(payload),
        Some(key) => {
            out.extend_from_slice(&key);
            out.extend(
                payload
                    .iter()
                    .enumerate()
                    .map(|(i, byte)| byte ^ key[i % 4]),
            );
        }
    }
    out
}

/// Decode a single frame from the front of `buf`, returning `(frame, bytes_consumed)`.
pub fn decode(buf: &[u8]) -> Result<(Frame, usize)> {
    if buf.len() < 2 {
        return Err(Error::TooSmall);
    }

    let fin = buf[0] & 0x80 != 0;
    let opcode = Opcode::from_bits(buf[0] & 0x0F)?;
    let masked = buf[1] & 0x80 != 0;
    let len_byte = buf[1] & 0x7F;

    let mut offset = 2usize;
    let payload_len: usize = if len_byte < 126 {
        len_byte as usize
    } else if len_byte == 126 {
        if buf.len() < offset + 2 {
            return Err(Error::TooSmall);
        }
        let len = u16::from_be_bytes([buf[offset], buf[offset + 1]]) as usize;
        offset += 2;
        len
    } else {
        if buf.len() < offset + 8 {
            return Err(Error::TooSmall);
        }
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&buf[offset..offset + 8]);
        offset += 8;
        u64::from_be_bytes(bytes) as usize
    };

    let mask_key = if masked {
        if buf.len() < offset + 4 {
            return Err(Error::TooSmall);
        }
        let mut key = [0u8; 4];
        key.copy_from_slice(&buf[offset..offset + 4]);
        offset += 4;
        Some(key)
    } else {
        None
    };

    if buf.len() < offset + payload_len {
        return Err(Error::TruncatedPayload);
    }

    let mut payload = buf[offset..offset + payload_len].to_vec();
    if let Some(key) = mask_key {
        for (i, byte) in payload.iter_mut().enumerate() {
            *byte ^= key[i % 4];
        }
    }
    offset += payload_len;

    Ok((
        Frame {
            fin,
            opcode,
            payload,
        },
        offset,
    ))
}

/// Build a close frame body: 2-octet big-endian status code followed by an
/// optional UTF-8 reason.
pub fn close_payload(status: u16, reason: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + reason.len());
    out.extend_from_slice(&status.to_be_bytes());
    out.extend_from_slice(reason.as_bytes());
    out
}

/// Split a decoded close frame's payload back into `(status, reason)`.
pub fn parse_close_payload(payload: &[u8]) -> Option<(u16, String)> {
    if payload.len() < 2 {
        return None;
    }
    let status = u16::from_be_bytes([payload[0], payload[1]]);
    let reason = String::from_utf8_lossy(&payload[2..]).into_owned();
    Some((status, reason))
}

/// Build the client-side HTTP/1.1 upgrade request DAP's CDP-style transport
/// uses to open a WebSocket connection.
pub fn build_upgrade_request(host: &str, path: &str, sec_key: &str) -> String {
    format!(
        "GET {path} HTTP/1.1\r\n\
         Host: {host}\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Key: {sec_key}\r\n\
         Sec-WebSocket-Version: 13\r\n\
         \r\n"
    )
}

/// Validate a server's upgrade response per §6: status line begins
/// `HTTP/1.1 101`, a case-insensitive `upgrade: websocket` header is
/// present, a case-insensitive `connection:` header contains `upgrade`,
/// and a `sec-websocket-accept:` header is present.
pub fn accept_upgrade_response(response: &str) -> bool {
    let mut lines = response.split("\r\n");
    let Some(status_line) = lines.next() else {
        return false;
    };
    if !status_line.starts_with("HTTP/1.1 101") {
        return false;
    }

    let mut has_upgrade = false;
    let mut has_connection_upgrade = false;
    let mut has_accept = false;
    for line in lines {
        let lower = line.to_ascii_lowercase();
        if lower.starts_with("upgrade:") && lower.contains("websocket") {
            has_upgrade = true;
        }
        if lower.starts_with("connection:") && lower.contains("upgrade") {
            has_connection_upgrade = true;
        }
        if lower.starts_with("sec-websocket-accept:") {
            has_accept = true;
        }
    }
    has_upgrade && has_connection_upgrade && has_accept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip_for(payload: &[u8], opcode: Opcode) {
        let framed = encode(payload, opcode);
        let (frame, consumed) = decode(&framed).unwrap();
        assert_eq!(frame.payload, payload);
        assert_eq!(frame.opcode, opcode);
        assert!(frame.fin);
        assert_eq!(consumed, framed.len());
    }

    #[test]
    fn round_trip_across_length_boundaries() {
        for len in [0usize, 1, 125, 126, 127, 65535, 65536] {
            let payload = vec![0xAB; len];
            round_trip_for(&payload, Opcode::Binary);
        }
    }

    #[test]
    fn round_trip_text_and_other_opcodes() {
        round_trip_for(b"hello", Opcode::Text);
        round_trip_for(b"", Opcode::Ping);
        round_trip_for(b"pong-payload", Opcode::Pong);
    }

    #[test]
    fn masked_round_trip() {
        let payload = b"masked payload example";
        for key in [[0u8, 0, 0, 0], [1, 2, 3, 4], [255, 0, 128, 7]] {
            let framed = encode_masked(payload, Opcode::Text, key);
            assert_ne!(&framed[6..6 + payload.len()], payload);
            let (frame, consumed) = decode(&framed).unwrap();
            assert_eq!(frame.payload, payload);
            assert_eq!(consumed, framed.len());
        }
    }

    #[test]
    fn too_small_on_short_header() {
        assert!(matches!(decode(&[0x81]).unwrap_err(), Error::TooSmall));
        assert!(matches!(decode(&[]).unwrap_err(), Error::TooSmall));
    }

    #[test]
    fn invalid_opcode_rejected() {
        let mut frame = encode(b"x", Opcode::Text);
        frame[0] = (frame[0] & 0xF0) | 0x3; // reserved opcode
        assert!(matches!(decode(&frame).unwrap_err(), Error::InvalidOpcode(0x3)));
    }

    #[test]
    fn truncated_payload_detected() {
        let framed = encode(b"0123456789", Opcode::Binary);
        let prefix = &framed[..framed.len() - 3];
        assert!(matches!(
            decode(prefix).unwrap_err(),
            Error::TruncatedPayload
        ));
    }

    #[test]
    fn underrun_never_reports_other_errors() {
        let framed = encode(&vec![7u8; 70000], Opcode::Binary);
        for cut in 0..framed.len() {
            match decode(&framed[..cut]) {
                Ok(_) => {}
                Err(Error::TooSmall) | Err(Error::TruncatedPayload) => {}
                Err(other) => panic!("unexpected error on prefix of len {cut}: {other:?}"),
            }
        }
    }

    #[test]
    fn s6_close_frame() {
        let body = close_payload(1001, "going away");
        let framed = encode(&body, Opcode::Close);
        let (frame, _) = decode(&framed).unwrap();
        assert_eq!(frame.opcode, Opcode::Close);
        assert!(frame.fin);
        let (status, reason) = parse_close_payload(&frame.payload).unwrap();
        assert_eq!(status, 1001);
        assert_eq!(reason, "going away");
    }

    #[test]
    fn upgrade_request_is_well_formed() {
        let req = build_upgrade_request("localhost:9222", "/devtools/page/1", "dGhlIHNhbXBsZQ==");
        assert!(req.starts_with("GET /devtools/page/1 HTTP/1.1\r\n"));
        assert!(req.contains("Host: localhost:9222\r\n"));
        assert!(req.contains("Upgrade: websocket\r\n"));
        assert!(req.contains("Sec-WebSocket-Version: 13\r\n"));
        assert!(req.ends_with("\r\n\r\n"));
    }

    #[test]
    fn accepts_valid_upgrade_response() {
        let resp = "HTTP/1.1 101 Switching Protocols\r\n\
                     Upgrade: websocket\r\n\
                     Connection: Upgrade\r\n\
                     Sec-WebSocket-Accept: s3pPLMBiTxaQ9kYGzzhZRbK+xOo=\r\n\r\n";
        assert!(accept_upgrade_response(resp));
    }

    #[test]
    fn rejects_response_missing_accept_header() {
        let resp = "HTTP/1.1 101 Switching Protocols\r\nUpgrade: websocket\r\nConnection: Upgrade\r\n\r\n";
        assert!(!accept_upgrade_response(resp));
    }

    #[test]
    fn rejects_non_101_status() {
        let resp = "HTTP/1.1 200 OK\r\nUpgrade: websocket\r\nConnection: Upgrade\r\nSec-WebSocket-Accept: x\r\n\r\n";
        assert!(!accept_upgrade_response(resp));
    }

    #[test]
    fn connection_header_is_case_insensitive_and_may_list_multiple_tokens() {
        let resp = "HTTP/1.1 101 Switching Protocols\r\n\
                     Upgrade: WebSocket\r\n\
                     Connection: Keep-Alive, Upgrade\r\n\
                     Sec-WebSocket-Accept: x\r\n\r\n";
        assert!(accept_upgrade_response(resp));
    }

    #[test]
    fn pong_echoes_ping_payload() {
        let ping_payload = b"ping-body";
        let ping = encode(ping_payload, Opcode::Ping);
        let (decoded_ping, _) = decode(&ping).unwrap();
        let pong = encode(&decoded_ping.payload, Opcode::Pong);
        let (decoded_pong, _) = decode(&pong).unwrap();
        assert_eq!(decoded_pong.payload, ping_payload);
        assert_eq!(decoded_pong.opcode, Opcode::Pong);
    }
}
