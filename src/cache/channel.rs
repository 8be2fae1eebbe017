//! Length-prefixed JSON messaging over a byte stream.
//!
//! Every message is a UTF-8 JSON document preceded by its byte length as a
//! 4-byte little-endian unsigned integer.

use std::fmt;
use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::error::{LexpandError, Result};

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Largest message body accepted from the peer.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// A bidirectional byte stream the channel can run over.
pub trait Transport: Read + Write + Send {}

impl<T: Read + Write + Send> Transport for T {}

/// A single persistent connection to the query backend.
pub struct SocketChannel {
    stream: Box<dyn Transport>,
    peer: String,
}

impl SocketChannel {
    /// Open a TCP connection to `host:port`.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let stream = TcpStream::connect((host, port)).map_err(|e| {
            LexpandError::connection(format!("Failed to connect to {host}:{port}: {e}"))
        })?;
        stream.set_nodelay(true)?;
        debug!("Connected to {host}:{port}");
        Ok(Self {
            stream: Box::new(stream),
            peer: format!("{host}:{port}"),
        })
    }

    /// Run the channel over an already established stream.
    pub fn from_stream<T: Transport + 'static>(stream: T) -> Self {
        Self {
            stream: Box::new(stream),
            peer: "<stream>".to_string(),
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Serialize `message` to JSON and write it as one frame.
    pub fn send<T: Serialize + ?Sized>(&mut self, message: &T) -> Result<()> {
        let body = serde_json::to_vec(message)?;
        let length = u32::try_from(body.len()).map_err(|_| {
            LexpandError::format(format!("Message of {} bytes is too large", body.len()))
        })?;

        let mut frame = Vec::with_capacity(LENGTH_PREFIX_SIZE + body.len());
        frame.write_u32::<LittleEndian>(length)?;
        frame.extend_from_slice(&body);

        self.stream.write_all(&frame)?;
        self.stream.flush()?;
        Ok(())
    }

    /// Read one frame and parse its body as JSON.
    ///
    /// Returns `Ok(None)` when the stream ends before a complete length
    /// prefix or body arrives.
    pub fn receive(&mut self) -> Result<Option<Value>> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        if !self.read_full(&mut prefix)? {
            return Ok(None);
        }
        let length = (&prefix[..]).read_u32::<LittleEndian>()? as usize;
        if length > MAX_MESSAGE_SIZE {
            return Err(LexpandError::format(format!(
                "Message of {length} bytes exceeds the {MAX_MESSAGE_SIZE} byte limit"
            )));
        }

        let mut body = Vec::new();
        Read::by_ref(&mut self.stream)
            .take(length as u64)
            .read_to_end(&mut body)?;
        if body.len() < length {
            return Ok(None);
        }

        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| LexpandError::format(format!("Malformed message body: {e}")))
    }

    /// Fill `buf` completely, looping on short reads. Returns `false` on EOF.
    fn read_full(&mut self, buf: &mut [u8]) -> Result<bool> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => return Ok(false),
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(true)
    }
}

impl fmt::Debug for SocketChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketChannel")
            .field("peer", &self.peer)
            .finish()
    }
}
