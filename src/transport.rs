//! Transport layer (§4.3 of spec.md): reassembles whole Content-Length
//! framed messages out of the adapter's stdout, and writes framed messages
//! to its stdin with an explicit flush.

use std::io::{Read, Write};
use std::time::Duration;

use os_pipe::{PipeReader, PipeWriter};
use timeout_readwrite::TimeoutReader;

use crate::child::AdapterProcess;
use crate::error::{Error, Result};
use crate::framing::content_length;

const READ_CHUNK: usize = 8192;

/// Owns the reassembly buffer for one adapter's stdout, and a write handle
/// to its stdin. Never exposes the reassembly buffer beyond this type.
pub struct Transport {
    reader: TimeoutReader<PipeReader>,
    writer: PipeWriter,
    buffer: Vec<u8>,
    read_timeout: Duration,
}

impl Transport {
    pub fn new(process: &AdapterProcess, read_timeout: Duration) -> Result<Self> {
        let stdout = process.stdout_reader()?;
        Ok(Transport {
            reader: TimeoutReader::new(stdout, read_timeout),
            writer: process.stdin().try_clone().map_err(Error::Spawn)?,
            buffer: Vec::new(),
            read_timeout,
        })
    }

    /// Reset the reassembly buffer. Used after an emulated restart replaces
    /// the underlying adapter process and stream.
    pub fn reset(&mut self, process: &AdapterProcess) -> Result<()> {
        let stdout = process.stdout_reader()?;
        self.reader = TimeoutReader::new(stdout, self.read_timeout);
        self.writer = process.stdin().try_clone().map_err(Error::Spawn)?;
        self.buffer.clear();
        Ok(())
    }

    /// Write one already-serialized JSON body, applying Content-Length framing.
    pub fn write_message(&mut self, body: &str) -> Result<()> {
        let framed = content_length::encode(body);
        self.writer.write_all(&framed).map_err(Error::WriteFailed)?;
        self.writer.flush().map_err(Error::WriteFailed)?;
        Ok(())
    }

    /// Read and decode the next whole message, pulling more bytes from the
    /// adapter's stdout (with the configured poll timeout) as needed.
    pub fn read_message(&mut self) -> Result<String> {
        loop {
            match content_length::decode(&self.buffer) {
                Ok((body, consumed)) => {
                    self.buffer.drain(..consumed);
                    return Ok(body);
                }
                Err(Error::MissingHeader) | Err(Error::TruncatedBody { .. }) => {
                    self.fill_buffer()?;
                }
                Err(other) => return Err(other),
            }
        }
    }

    fn fill_buffer(&mut self) -> Result<()> {
        let mut chunk = [0u8; READ_CHUNK];
        match self.reader.read(&mut chunk) {
            Ok(0) => Err(Error::ConnectionClosed),
            Ok(n) => {
                self.buffer.extend_from_slice(&chunk[..n]);
                Ok(())
            }
            Err(err)
                if err.kind() == std::io::ErrorKind::WouldBlock
                    || err.kind() == std::io::ErrorKind::TimedOut =>
            {
                Err(Error::Timeout)
            }
            Err(err) => Err(Error::ReadFailed(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::content_length::encode;
    use std::io::Write as _;
    use std::thread;

    /// Transport exercised against a plain pipe pair rather than a spawned
    /// adapter, standing in for the adapter's stdout.
    fn transport_over_pipe(read_timeout: Duration) -> (Transport, PipeWriter) {
        let (reader, writer) = os_pipe::pipe().unwrap();
        let (_dummy_reader, dummy_writer) = os_pipe::pipe().unwrap();
        let transport = Transport {
            reader: TimeoutReader::new(reader, read_timeout),
            writer: dummy_writer,
            buffer: Vec::new(),
            read_timeout,
        };
        (transport, writer)
    }

    #[test]
    fn reads_a_message_written_in_one_shot() {
        let (mut transport, mut writer) = transport_over_pipe(Duration::from_secs(2));
        writer.write_all(&encode(r#"{"seq":1}"#)).unwrap();
        drop(writer);
        let body = transport.read_message().unwrap();
        assert_eq!(body, r#"{"seq":1}"#);
    }

    #[test]
    fn reassembles_a_message_split_across_writes() {
        let (mut transport, mut writer) = transport_over_pipe(Duration::from_secs(2));
        let framed = encode(r#"{"seq":1,"type":"event"}"#);
        let (first_half, second_half) = framed.split_at(framed.len() / 2);
        let first_half = first_half.to_vec();
        let second_half = second_half.to_vec();
        let handle = thread::spawn(move || {
            writer.write_all(&first_half).unwrap();
            thread::sleep(Duration::from_millis(20));
            writer.write_all(&second_half).unwrap();
        });
        let body = transport.read_message().unwrap();
        assert_eq!(body, r#"{"seq":1,"type":"event"}"#);
        handle.join().unwrap();
    }

    #[test]
    fn times_out_when_nothing_arrives() {
        let (mut transport, writer) = transport_over_pipe(Duration::from_millis(50));
        // keep the write end open so EOF does not race the timeout
        let _keep_alive = writer;
        assert!(matches!(transport.read_message(), Err(Error::Timeout)));
    }

    #[test]
    fn connection_closed_on_eof() {
        let (mut transport, writer) = transport_over_pipe(Duration::from_secs(2));
        drop(writer);
        assert!(matches!(
            transport.read_message(),
            Err(Error::ConnectionClosed)
        ));
    }

    #[test]
    fn second_message_is_read_after_the_first() {
        let (mut transport, mut writer) = transport_over_pipe(Duration::from_secs(2));
        writer.write_all(&encode("first")).unwrap();
        writer.write_all(&encode("second")).unwrap();
        drop(writer);
        assert_eq!(transport.read_message().unwrap(), "first");
        assert_eq!(transport.read_message().unwrap(), "second");
    }
}
