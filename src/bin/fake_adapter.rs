//! A canned DAP adapter used only by integration tests (`int_test` feature).
//!
//! Speaks Content-Length-framed DAP over stdio and replies to a small fixed
//! command table, scripted to reproduce the handshake ordering, stale
//! response reordering, and reverse-request interleaving that the
//! dispatcher must cope with. This is the adapter-side counterpart of the
//! `DapClient` test harness this lineage ships for testing its own DAP
//! *server* — here the roles are inverted, so this binary plays the
//! *adapter*.
//!
//! Behavior is selected with the first CLI argument:
//! - `plain` (default): answers every request immediately, in order.
//! - `delayed-launch`: swallows `launch`, emits `initialized`, and only
//!   answers the pending `launch` after `configurationDone` arrives (S4).
//! - `reverse-request`: emits a `runInTerminal` reverse request right after
//!   answering `configurationDone`, before any further requests arrive.
//! - `no-restart`: like `plain`, but `initialize`'s capabilities report
//!   `supportsRestartRequest: false` (drives the emulated-restart path, S5).

use std::io::{self, Read, Write};

use dap_proxy::framing::content_length;
use serde_json::{json, Value};

fn main() {
    let mode = std::env::args().nth(1).unwrap_or_else(|| "plain".to_string());
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut buffer: Vec<u8> = Vec::new();
    let mut pending_launch_seq: Option<i64> = None;
    let mut next_seq: i64 = 1;

    let mut input = stdin.lock();
    loop {
        let message = loop {
            match content_length::decode(&buffer) {
                Ok((body, consumed)) => {
                    buffer.drain(..consumed);
                    break body;
                }
                Err(_) => {
                    let mut chunk = [0u8; 4096];
                    match input.read(&mut chunk) {
                        Ok(0) => return,
                        Ok(n) => buffer.extend_from_slice(&chunk[..n]),
                        Err(_) => return,
                    }
                }
            }
        };

        let request: Value = match serde_json::from_str(&message) {
            Ok(v) => v,
            Err(_) => continue,
        };
        let seq = request.get("seq").and_then(Value::as_i64).unwrap_or(0);
        let command = request.get("command").and_then(Value::as_str).unwrap_or("").to_string();

        match command.as_str() {
            "initialize" => {
                let supports_restart = mode != "no-restart";
                send_response(
                    &mut stdout,
                    &mut next_seq,
                    seq,
                    "initialize",
                    json!({
                        "supportsRestartRequest": supports_restart,
                        "supportsConfigurationDoneRequest": true,
                        "exceptionBreakpointFilters": [{"filter": "uncaught", "label": "Uncaught Exceptions"}],
                    }),
                );
            }
            "launch" | "attach" => {
                send_event(&mut stdout, &mut next_seq, "initialized", json!({}));
                if mode == "delayed-launch" {
                    pending_launch_seq = Some(seq);
                } else {
                    send_response(&mut stdout, &mut next_seq, seq, &command, json!({}));
                }
            }
            "configurationDone" => {
                send_response(&mut stdout, &mut next_seq, seq, "configurationDone", json!({}));
                if let Some(launch_seq) = pending_launch_seq.take() {
                    send_response(&mut stdout, &mut next_seq, launch_seq, "launch", json!({}));
                }
                if mode == "reverse-request" {
                    send_request(&mut stdout, &mut next_seq, "runInTerminal", json!({"args": ["echo", "hi"]}));
                }
            }
            "restart" => {
                send_response(&mut stdout, &mut next_seq, seq, "restart", json!({}));
                send_event(&mut stdout, &mut next_seq, "initialized", json!({}));
            }
            "disconnect" => {
                send_response(&mut stdout, &mut next_seq, seq, "disconnect", json!({}));
                return;
            }
            "setBreakpoints" => {
                let breakpoints = request
                    .get("arguments")
                    .and_then(|a| a.get("breakpoints"))
                    .cloned()
                    .unwrap_or(json!([]));
                send_response(
                    &mut stdout,
                    &mut next_seq,
                    seq,
                    "setBreakpoints",
                    json!({ "breakpoints": breakpoints }),
                );
            }
            "continue" | "next" | "stepIn" | "stepOut" | "stepBack" | "reverseContinue" => {
                send_response(&mut stdout, &mut next_seq, seq, &command, json!({ "allThreadsContinued": true }));
                send_event(
                    &mut stdout,
                    &mut next_seq,
                    "stopped",
                    json!({ "reason": "step", "threadId": 1, "hitBreakpointIds": [] }),
                );
            }
            "stackTrace" => {
                send_response(
                    &mut stdout,
                    &mut next_seq,
                    seq,
                    "stackTrace",
                    json!({ "stackFrames": [{"id": 100, "name": "main", "line": 1, "column": 1}], "totalFrames": 1 }),
                );
            }
            "threads" if mode == "stale-response" => {
                // Answer one position out of order: a stale response to the
                // previous request arrives first, then the real one (S7 /
                // property 7 — the dispatcher must discard the former).
                send_response(&mut stdout, &mut next_seq, seq - 1, "threads", json!({ "threads": [] }));
                send_response(
                    &mut stdout,
                    &mut next_seq,
                    seq,
                    "threads",
                    json!({ "threads": [{"id": 1, "name": "main"}] }),
                );
            }
            _ => {
                send_response(&mut stdout, &mut next_seq, seq, &command, json!({}));
            }
        }
    }
}

fn send_response(out: &mut impl Write, next_seq: &mut i64, request_seq: i64, command: &str, body: Value) {
    let seq = *next_seq;
    *next_seq += 1;
    let message = json!({
        "seq": seq,
        "type": "response",
        "request_seq": request_seq,
        "success": true,
        "command": command,
        "body": body,
    })
    .to_string();
    let _ = out.write_all(&content_length::encode(&message));
    let _ = out.flush();
}

fn send_event(out: &mut impl Write, next_seq: &mut i64, event: &str, body: Value) {
    let seq = *next_seq;
    *next_seq += 1;
    let message = json!({ "seq": seq, "type": "event", "event": event, "body": body }).to_string();
    let _ = out.write_all(&content_length::encode(&message));
    let _ = out.flush();
}

fn send_request(out: &mut impl Write, next_seq: &mut i64, command: &str, arguments: Value) {
    let seq = *next_seq;
    *next_seq += 1;
    let message = json!({ "seq": seq, "type": "request", "command": command, "arguments": arguments }).to_string();
    let _ = out.write_all(&content_length::encode(&message));
    let _ = out.flush();
}
