use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use thiserror::Error;

const READ_CHUNK_SIZE: usize = 256;
const ACK_BUFFER_SIZE: usize = 1024;

pub const ACK_MESSAGE: &str = "OK";

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("peer closed the connection without sending data")]
    Empty,
    #[error("message exceeds {limit} bytes")]
    TooLong { limit: usize },
    #[error("failed to read message: {0}")]
    Io(#[from] io::Error),
}

// A message ends at the peer's half-close or at a read timeout that fires
// after at least one byte has arrived. Line breaks are ordinary whitespace.
pub fn read_message<R: Read>(reader: &mut R, max_bytes: usize) -> Result<Vec<u8>, FrameError> {
    let mut message = Vec::with_capacity(READ_CHUNK_SIZE.min(max_bytes));
    let mut chunk = [0_u8; READ_CHUNK_SIZE];

    loop {
        let size = match reader.read(&mut chunk) {
            Ok(size) => size,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) if is_timeout(&error) && !message.is_empty() => break,
            Err(error) => return Err(FrameError::Io(error)),
        };

        if size == 0 {
            break;
        }

        message.extend_from_slice(&chunk[..size]);
        if message.len() > max_bytes {
            return Err(FrameError::TooLong { limit: max_bytes });
        }
    }

    if message.is_empty() {
        return Err(FrameError::Empty);
    }

    Ok(message)
}

pub fn write_ack<W: Write>(writer: &mut W) -> io::Result<()> {
    writer.write_all(ACK_MESSAGE.as_bytes())?;
    writer.flush()
}

fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("failed to resolve collector endpoint: {0}")]
    Resolve(io::Error),
    #[error("tcp communication failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct CollectorLink {
    target: SocketAddr,
    timeout: Duration,
}

impl CollectorLink {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, LinkError> {
        let mut addrs = endpoint.to_socket_addrs().map_err(LinkError::Resolve)?;
        let target = addrs.next().ok_or_else(|| {
            LinkError::Resolve(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "no socket address resolved for collector endpoint",
            ))
        })?;

        Ok(Self { target, timeout })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub fn send(&self, payload: &[u8]) -> Result<Option<String>, LinkError> {
        let mut stream = TcpStream::connect_timeout(&self.target, self.timeout)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        stream.write_all(payload)?;
        stream.shutdown(Shutdown::Write)?;

        let mut buffer = [0_u8; ACK_BUFFER_SIZE];
        let mut received = Vec::new();
        loop {
            match stream.read(&mut buffer) {
                Ok(0) => break,
                Ok(size) => {
                    received.extend_from_slice(&buffer[..size]);
                    if received.len() >= ACK_BUFFER_SIZE {
                        break;
                    }
                }
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) if is_timeout(&error) || error.kind() == io::ErrorKind::ConnectionReset => {
                    break;
                }
                Err(error) => return Err(LinkError::Io(error)),
            }
        }

        if received.is_empty() {
            return Ok(None);
        }

        Ok(Some(String::from_utf8_lossy(&received).trim().to_string()))
    }
}
