//! Trait abstraction for serial port operations to enable testing

use async_trait::async_trait;
use bytes::BytesMut;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Trait for serial port I/O operations
#[async_trait]
pub trait SerialPortIO: Send {
    /// Write all data to the port
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush the output buffer
    async fn flush(&mut self) -> io::Result<()>;

    /// Append whatever bytes are available to `buf`, waiting until at least
    /// one arrives. Returns 0 at end-of-file.
    ///
    /// Must be cancel-safe: if the future is dropped before completing, no
    /// bytes may have been consumed from the port.
    async fn read_into(&mut self, buf: &mut BytesMut) -> io::Result<usize>;
}

/// Wrapper around an async byte stream that implements SerialPortIO
///
/// Defaults to `tokio_serial::SerialStream`; any other `AsyncRead + AsyncWrite`
/// stream (a pty, a socket, a test mock) can be wrapped the same way.
pub struct TokioSerialPort<S = tokio_serial::SerialStream> {
    port: S,
}

impl<S> TokioSerialPort<S> {
    pub fn new(port: S) -> Self {
        Self { port }
    }
}

#[async_trait]
impl<S> SerialPortIO for TokioSerialPort<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.port.flush().await
    }

    async fn read_into(&mut self, buf: &mut BytesMut) -> io::Result<usize> {
        self.port.read_buf(buf).await
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Mock serial port for testing
    ///
    /// Reads hand out the scripted `incoming` chunks in order. Once the script
    /// is exhausted a read never completes, like a quiet radio.
    #[derive(Clone, Default)]
    pub struct MockSerialPort {
        pub written_data: Arc<Mutex<Vec<Vec<u8>>>>,
        pub incoming: Arc<Mutex<VecDeque<Vec<u8>>>>,
        pub write_error: Arc<Mutex<Option<io::ErrorKind>>>,
        pub flush_error: Arc<Mutex<Option<io::ErrorKind>>>,
        pub eof: Arc<Mutex<bool>>,
    }

    impl MockSerialPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue bytes the "radio" will send to us
        pub fn push_incoming(&self, data: &str) {
            self.incoming.lock().unwrap().push_back(data.as_bytes().to_vec());
        }

        /// Report end-of-file once the scripted input runs out
        pub fn close_after_script(&self) {
            *self.eof.lock().unwrap() = true;
        }

        pub fn get_written_data(&self) -> Vec<Vec<u8>> {
            self.written_data.lock().unwrap().clone()
        }

        /// Every write decoded as text, concatenated
        pub fn written_text(&self) -> String {
            self.get_written_data()
                .iter()
                .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
                .collect()
        }

        pub fn set_write_error(&self, error: io::ErrorKind) {
            *self.write_error.lock().unwrap() = Some(error);
        }

        pub fn set_flush_error(&self, error: io::ErrorKind) {
            *self.flush_error.lock().unwrap() = Some(error);
        }
    }

    #[async_trait]
    impl SerialPortIO for MockSerialPort {
        async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
            if let Some(error) = *self.write_error.lock().unwrap() {
                return Err(io::Error::new(error, "Mock write error"));
            }
            self.written_data.lock().unwrap().push(data.to_vec());
            Ok(())
        }

        async fn flush(&mut self) -> io::Result<()> {
            if let Some(error) = *self.flush_error.lock().unwrap() {
                return Err(io::Error::new(error, "Mock flush error"));
            }
            Ok(())
        }

        async fn read_into(&mut self, buf: &mut BytesMut) -> io::Result<usize> {
            let next = self.incoming.lock().unwrap().pop_front();
            match next {
                Some(chunk) => {
                    buf.extend_from_slice(&chunk);
                    Ok(chunk.len())
                }
                None => {
                    let eof = *self.eof.lock().unwrap();
                    if eof {
                        Ok(0)
                    } else {
                        std::future::pending::<()>().await;
                        Ok(0)
                    }
                }
            }
        }
    }
}
