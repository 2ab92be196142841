use std::io;

/// Every way a proxy operation can fail, grouped to match the protocol's
/// own layering: framing, transport, session state, and the adapter's
/// protocol-level refusals.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // --------------------------------- framing errors ------------------------------------------
    #[error("message frame missing header/body separator")]
    MissingHeader,
    #[error("invalid frame header: {0}")]
    InvalidHeader(String),
    #[error("frame body truncated: need {needed} bytes, have {have}")]
    TruncatedBody { needed: usize, have: usize },
    #[error("buffer too small to contain a frame header")]
    TooSmall,
    #[error("invalid websocket opcode: {0:#x}")]
    InvalidOpcode(u8),
    #[error("websocket frame payload truncated")]
    TruncatedPayload,

    // --------------------------------- transport errors -----------------------------------------
    #[error("write to adapter failed: {0}")]
    WriteFailed(io::Error),
    #[error("read from adapter failed: {0}")]
    ReadFailed(io::Error),
    #[error("adapter closed the connection")]
    ConnectionClosed,
    #[error("timed out waiting for the adapter")]
    Timeout,

    // --------------------------------- state errors ----------------------------------------------
    #[error("session has not completed its launch/attach handshake")]
    NotInitialized,
    #[error("operation not supported by this driver: {0}")]
    NotSupported(&'static str),
    #[error("unexpected response shape: {0}")]
    InvalidResponse(String),
    #[error("address could not be parsed: {0}")]
    InvalidAddress(String),

    // --------------------------------- protocol errors -------------------------------------------
    #[error("adapter rejected `{command}`: {message}")]
    Adapter { command: String, message: String },

    // --------------------------------- process errors --------------------------------------------
    #[error("failed to spawn adapter process: {0}")]
    Spawn(io::Error),
    #[error("failed to signal adapter process: {0}")]
    Signal(#[from] nix::Error),

    // --------------------------------- ambient I/O (config, tracing) ------------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // --------------------------------- json ------------------------------------------------------
    #[error("malformed JSON from adapter: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
