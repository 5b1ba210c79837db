//! Binary codec over an async byte stream.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Error;
use crate::{Command, Response};
use crate::{CMD_CONFIG_DATA, CMD_GET_STATUS, CMD_START_COMP};

// Floats travel in the endpoints' native byte order. A deployment with
// mixed-endian hosts only needs to change these two helpers.
fn encode_f32(value: f32) -> [u8; 4] {
    value.to_ne_bytes()
}

fn decode_f32(bytes: [u8; 4]) -> f32 {
    f32::from_ne_bytes(bytes)
}

/// One protocol endpoint of a byte-stream connection.
///
/// The codec provides the protocol's primitive reads and writes; framing
/// beyond "tag, then tag-specific payload" is the caller's responsibility.
/// Generic over the stream so tests can run against `tokio::io::duplex`.
pub struct Connection<S> {
    stream: S,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Reads exactly `buf.len()` bytes, classifying an orderly close:
    /// end-of-stream before the first byte is a peer disconnect, end-of-stream
    /// after it is a truncated frame.
    async fn read_full(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        let want = buf.len();
        let mut got = 0;
        while got < want {
            let n = self.stream.read(&mut buf[got..]).await?;
            if n == 0 {
                return Err(if got == 0 {
                    Error::PeerClosed
                } else {
                    Error::TruncatedFrame { got, want }
                });
            }
            got += n;
        }
        Ok(())
    }

    /// Reads a 32-bit unsigned big-endian value.
    pub async fn read_u32(&mut self) -> Result<u32, Error> {
        let mut buf = [0u8; 4];
        self.read_full(&mut buf).await?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Writes a 32-bit unsigned big-endian value.
    pub async fn write_u32(&mut self, value: u32) -> Result<(), Error> {
        self.stream.write_all(&value.to_be_bytes()).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Reads `count` native-order floats into a freshly sized buffer.
    pub async fn read_f32s(&mut self, count: usize) -> Result<Vec<f32>, Error> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let mut bytes = vec![0u8; count * 4];
        self.read_full(&mut bytes).await?;

        let mut values = Vec::with_capacity(count);
        let mut word = [0u8; 4];
        for chunk in bytes.chunks_exact(4) {
            word.copy_from_slice(chunk);
            values.push(decode_f32(word));
        }
        Ok(values)
    }

    /// Writes a flat sequence of native-order floats.
    pub async fn write_f32s(&mut self, values: &[f32]) -> Result<(), Error> {
        if values.is_empty() {
            return Ok(());
        }
        let mut bytes = Vec::with_capacity(values.len() * 4);
        for &value in values {
            bytes.extend_from_slice(&encode_f32(value));
        }
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Reads one command: the tag, plus the size/threads header for
    /// `Configure`. An unrecognized tag is reported as
    /// [`Error::UnknownCommand`] and leaves the stream positioned after the
    /// tag, so the session can answer and keep the connection.
    pub async fn read_command(&mut self) -> Result<Command, Error> {
        match self.read_u32().await? {
            CMD_CONFIG_DATA => {
                let size = self.read_u32().await?;
                let threads = self.read_u32().await?;
                Ok(Command::Configure { size, threads })
            }
            CMD_START_COMP => Ok(Command::Start),
            CMD_GET_STATUS => Ok(Command::Status),
            tag => Err(Error::UnknownCommand(tag)),
        }
    }

    /// Writes one command (tag plus the `Configure` header fields).
    pub async fn write_command(&mut self, command: &Command) -> Result<(), Error> {
        match *command {
            Command::Configure { size, threads } => {
                self.write_u32(CMD_CONFIG_DATA).await?;
                self.write_u32(size).await?;
                self.write_u32(threads).await
            }
            Command::Start => self.write_u32(CMD_START_COMP).await,
            Command::Status => self.write_u32(CMD_GET_STATUS).await,
        }
    }

    /// Reads one response tag.
    pub async fn read_response(&mut self) -> Result<Response, Error> {
        let tag = self.read_u32().await?;
        Response::from_tag(tag).ok_or(Error::UnexpectedTag(tag))
    }

    /// Writes one response tag.
    pub async fn write_response(&mut self, response: Response) -> Result<(), Error> {
        self.write_u32(response.tag()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn u32_is_big_endian_on_the_wire() {
        let (client, mut server) = tokio::io::duplex(64);
        let mut conn = Connection::new(client);

        conn.write_u32(0x0102_0304).await.unwrap();

        let mut buf = [0u8; 4];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn close_at_frame_boundary_is_peer_closed() {
        let (client, server) = tokio::io::duplex(64);
        drop(server);

        let mut conn = Connection::new(client);
        assert!(matches!(conn.read_u32().await, Err(Error::PeerClosed)));
    }

    #[tokio::test]
    async fn close_mid_frame_is_truncated() {
        let (client, mut server) = tokio::io::duplex(64);
        server.write_all(&[0, 0]).await.unwrap();
        drop(server);

        let mut conn = Connection::new(client);
        assert!(matches!(
            conn.read_u32().await,
            Err(Error::TruncatedFrame { got: 2, want: 4 })
        ));
    }

    #[tokio::test]
    async fn float_payload_round_trips() {
        let (client, server) = tokio::io::duplex(1024);
        let mut tx = Connection::new(client);
        let mut rx = Connection::new(server);

        let payload = vec![1.5f32, -2.25, 0.0, f32::MAX];
        tx.write_f32s(&payload).await.unwrap();

        let got = rx.read_f32s(payload.len()).await.unwrap();
        assert_eq!(got, payload);
    }

    #[tokio::test]
    async fn configure_command_round_trips() {
        let (client, server) = tokio::io::duplex(64);
        let mut tx = Connection::new(client);
        let mut rx = Connection::new(server);

        let command = Command::Configure { size: 3, threads: 2 };
        tx.write_command(&command).await.unwrap();
        assert_eq!(rx.read_command().await.unwrap(), command);
    }

    #[tokio::test]
    async fn unknown_command_tag_is_reported() {
        let (client, server) = tokio::io::duplex(64);
        let mut tx = Connection::new(client);
        let mut rx = Connection::new(server);

        tx.write_u32(99).await.unwrap();
        assert!(matches!(
            rx.read_command().await,
            Err(Error::UnknownCommand(99))
        ));
    }

    #[tokio::test]
    async fn response_tags_round_trip() {
        let (client, server) = tokio::io::duplex(64);
        let mut tx = Connection::new(server);
        let mut rx = Connection::new(client);

        for response in [Response::Ack, Response::Pending, Response::Result, Response::Error] {
            tx.write_response(response).await.unwrap();
            assert_eq!(rx.read_response().await.unwrap(), response);
        }
    }
}
