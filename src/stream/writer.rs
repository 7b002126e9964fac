//! Writes Bone values to an async byte stream.

use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::BoneError;
use crate::types::Value;
use crate::wire::encode_value;

/// Encodes Bone values onto an `AsyncWrite` stream.
///
/// Values are validated before anything is written, so a malformed tree never
/// reaches the stream.
pub struct ValueWriter<W> {
    writer: W,
    buf: BytesMut,
}

impl<W: AsyncWrite + Unpin> ValueWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buf: BytesMut::new(),
        }
    }

    /// Writes one top-level value.
    pub async fn write_value(&mut self, value: &Value) -> Result<(), BoneError> {
        self.write_values(std::slice::from_ref(value)).await
    }

    /// Writes a sequence of top-level values in order.
    pub async fn write_values(&mut self, values: &[Value]) -> Result<(), BoneError> {
        for value in values {
            value.validate()?;
        }
        self.buf.clear();
        for value in values {
            encode_value(&mut self.buf, value);
        }
        tracing::trace!(bytes = self.buf.len(), values = values.len(), "write values");
        self.writer.write_all(&self.buf).await?;
        Ok(())
    }

    /// Flushes the underlying writer.
    pub async fn flush(&mut self) -> Result<(), BoneError> {
        self.writer.flush().await?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
