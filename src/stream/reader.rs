//! Reads Bone values from an async byte stream.

use std::collections::VecDeque;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::BoneError;
use crate::types::Value;
use crate::wire::Decoder;

/// Default number of bytes requested per read.
const DEFAULT_READ_CAPACITY: usize = 8 * 1024;

/// Decodes Bone values from an `AsyncRead` stream as they complete.
///
/// Top-level strings are only known to be finished once the following byte
/// (or end of stream) arrives, so a trailing string is yielded at EOF.
pub struct ValueReader<R> {
    reader: R,
    buf: BytesMut,
    read_capacity: usize,
    decoder: Decoder,
    ready: VecDeque<Value>,
    error: Option<BoneError>,
    done: bool,
}

impl<R: AsyncRead + Unpin> ValueReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_decoder(reader, Decoder::new())
    }

    /// Uses a preconfigured decoder, e.g. one with a depth limit.
    pub fn with_decoder(reader: R, decoder: Decoder) -> Self {
        Self {
            reader,
            buf: BytesMut::new(),
            read_capacity: DEFAULT_READ_CAPACITY,
            decoder,
            ready: VecDeque::new(),
            error: None,
            done: false,
        }
    }

    /// Sets how many bytes are requested from the stream per read.
    pub fn read_capacity(mut self, capacity: usize) -> Self {
        self.read_capacity = capacity.max(1);
        self
    }

    /// Returns the next complete top-level value, or `None` at a clean end of
    /// stream.
    ///
    /// Values that completed before a decode error are returned first; the
    /// error follows, after which the reader yields `None`.
    pub async fn read_value(&mut self) -> Result<Option<Value>, BoneError> {
        loop {
            if let Some(value) = self.ready.pop_front() {
                return Ok(Some(value));
            }
            if let Some(e) = self.error.take() {
                return Err(e);
            }
            if self.done {
                return Ok(None);
            }
            self.fill().await;
        }
    }

    /// Reads values until the end of the stream.
    pub async fn read_all(&mut self) -> Result<Vec<Value>, BoneError> {
        let mut values = Vec::new();
        while let Some(value) = self.read_value().await? {
            values.push(value);
        }
        Ok(values)
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Reads one chunk and runs it through the decoder.
    async fn fill(&mut self) {
        self.buf.resize(self.read_capacity, 0);

        let result = match self.reader.read(&mut self.buf[..]).await {
            Ok(0) => {
                self.done = true;
                self.decoder.finish()
            }
            Ok(n) => {
                tracing::trace!(bytes = n, "read chunk");
                self.decoder.feed(&self.buf[..n])
            }
            Err(e) => Err(e.into()),
        };
        self.ready.extend(self.decoder.take_values());

        if let Err(e) = result {
            tracing::debug!(error = %e, offset = self.decoder.offset(), "decode error");
            self.done = true;
            self.error = Some(e);
        }
    }
}
