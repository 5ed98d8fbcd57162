//! Incremental byte sources.
//!
//! A [`ChunkProducer`] hands out chunks of whatever size the underlying
//! transport delivers. [`ByteSource`] sits on top and turns them into the
//! exact-length reads and skips the scanner asks for.

use std::future::Future;

use bytes::{Buf, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tracing::trace;

use crate::config::DEFAULT_CHUNK_SIZE;
use crate::error::SourceError;

pub trait ChunkProducer {
    /// Next chunk of the stream, or `None` once it has ended.
    fn next_chunk(&mut self) -> impl Future<Output = Result<Option<Bytes>, SourceError>> + Send;

    /// No more chunks will be requested; release the transport.
    fn cancel(&mut self) {}
}

pub struct ReaderProducer<R> {
    reader: Option<R>,
    chunk_size: usize,
}

impl<R> ReaderProducer<R> {
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self {
            reader: Some(reader),
            chunk_size: chunk_size.max(1),
        }
    }
}

impl<R: AsyncRead + Unpin + Send> ChunkProducer for ReaderProducer<R> {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, SourceError> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        let mut buf = BytesMut::with_capacity(self.chunk_size);
        let n = reader.take(self.chunk_size as u64).read_buf(&mut buf).await?;
        if n == 0 {
            self.reader = None;
            return Ok(None);
        }
        Ok(Some(buf.freeze()))
    }

    fn cancel(&mut self) {
        self.reader = None;
    }
}

/// Chunks pushed by another task. Dropping every sender ends the stream.
pub struct ChannelProducer {
    receiver: mpsc::Receiver<Bytes>,
}

impl ChannelProducer {
    pub fn new(receiver: mpsc::Receiver<Bytes>) -> Self {
        Self { receiver }
    }
}

pub fn channel(buffer: usize) -> (mpsc::Sender<Bytes>, ChannelProducer) {
    let (sender, receiver) = mpsc::channel(buffer.max(1));
    (sender, ChannelProducer::new(receiver))
}

impl ChunkProducer for ChannelProducer {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, SourceError> {
        Ok(self.receiver.recv().await)
    }

    fn cancel(&mut self) {
        self.receiver.close();
    }
}

/// Buffered view over a producer that serves exact-length requests.
pub struct ByteSource<P> {
    producer: P,
    buffer: BytesMut,
    received: u64,
    drained: bool,
}

impl<P: ChunkProducer> ByteSource<P> {
    pub fn new(producer: P) -> Self {
        Self {
            producer,
            buffer: BytesMut::new(),
            received: 0,
            drained: false,
        }
    }

    /// Waits until `n` contiguous bytes are available and takes them.
    pub async fn request_bytes(&mut self, n: usize) -> Result<Bytes, SourceError> {
        while self.buffer.len() < n {
            let chunk = self.pull().await?;
            self.buffer.extend_from_slice(&chunk);
        }
        Ok(self.buffer.split_to(n).freeze())
    }

    /// Discards `n` bytes. Chunks that fall entirely inside the skipped
    /// range are dropped without being copied into the buffer.
    pub async fn request_skip(&mut self, n: usize) -> Result<(), SourceError> {
        let buffered = n.min(self.buffer.len());
        self.buffer.advance(buffered);

        let mut remaining = n - buffered;
        while remaining > 0 {
            let chunk = self.pull().await?;
            if chunk.len() <= remaining {
                remaining -= chunk.len();
            } else {
                self.buffer.extend_from_slice(&chunk[remaining..]);
                remaining = 0;
            }
        }
        Ok(())
    }

    /// Stops delivery for good: buffers are released and the producer is
    /// cancelled. Later requests fail with `Disconnected`.
    ///
    /// An end of stream seen by the producer also drains the source, but
    /// bytes already buffered are still served.
    pub fn stop(&mut self) {
        if self.drained {
            return;
        }
        trace!(received = self.received, discarded = self.buffer.len(), "source stopped");
        self.buffer = BytesMut::new();
        self.producer.cancel();
        self.drained = true;
    }

    pub fn is_drained(&self) -> bool {
        self.drained
    }

    /// Total bytes pulled from the producer so far.
    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn into_producer(self) -> P {
        self.producer
    }

    async fn pull(&mut self) -> Result<Bytes, SourceError> {
        if self.drained {
            return Err(SourceError::Disconnected);
        }
        match self.producer.next_chunk().await? {
            Some(chunk) => {
                self.received += chunk.len() as u64;
                Ok(chunk)
            }
            None => {
                self.drained = true;
                Err(SourceError::Disconnected)
            }
        }
    }
}
