//! Drivers that feed a [`JpegScanner`] from slices, blocking readers and
//! async byte sources.
//!
//! The `probe_*` functions follow the external contract: a single
//! `Option<ImageSize>`, never an error. The `try_*` forms keep the
//! [`ProbeError`] for callers that want to know why.

use std::io::{self, Read};

use tokio::io::AsyncRead;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::completion::{CompletionReceiver, completion};
use crate::config::ProbeOptions;
use crate::error::{ProbeError, SourceError};
use crate::formats::jpeg::{Command, JpegScanner};
use crate::source::{ByteSource, ChunkProducer, ReaderProducer};
use crate::types::ImageSize;

fn settle(result: Result<ImageSize, ProbeError>) -> Option<ImageSize> {
    match result {
        Ok(size) => Some(size),
        Err(err) => {
            debug!(kind = err.kind(), %err, "no dimensions");
            None
        }
    }
}

pub fn probe_slice(data: &[u8]) -> Option<ImageSize> {
    settle(try_probe_slice(data, &ProbeOptions::default()))
}

pub fn try_probe_slice(data: &[u8], options: &ProbeOptions) -> Result<ImageSize, ProbeError> {
    let mut scanner = JpegScanner::with_limit(options.max_input);
    let mut pos = 0usize;

    loop {
        match scanner.command() {
            Command::Read(n) => match data.get(pos..pos + n) {
                Some(bytes) => {
                    scanner.feed(bytes);
                    pos += n;
                }
                None => scanner.interrupt(),
            },
            Command::Skip(n) => {
                if data.len() - pos < n {
                    scanner.interrupt();
                } else {
                    pos += n;
                    scanner.skipped();
                }
            }
            Command::Stop => return scanner.finish(),
        }
    }
}

pub fn probe_reader<R: Read>(reader: R) -> Option<ImageSize> {
    settle(try_probe_reader(reader, &ProbeOptions::default()))
}

/// Blocking probe. Stops reading as soon as the outcome is known.
pub fn try_probe_reader<R: Read>(
    mut reader: R,
    options: &ProbeOptions,
) -> Result<ImageSize, ProbeError> {
    let mut scanner = JpegScanner::with_limit(options.max_input);
    let mut buf = Vec::new();

    loop {
        match scanner.command() {
            Command::Read(n) => {
                buf.resize(n, 0);
                match reader.read_exact(&mut buf) {
                    Ok(()) => scanner.feed(&buf),
                    Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => scanner.interrupt(),
                    Err(e) => return Err(e.into()),
                }
            }
            Command::Skip(n) => {
                let skipped = io::copy(&mut reader.by_ref().take(n as u64), &mut io::sink())?;
                if skipped < n as u64 {
                    scanner.interrupt();
                } else {
                    scanner.skipped();
                }
            }
            Command::Stop => return scanner.finish(),
        }
    }
}

/// Runs a scan against an existing source. The source is always stopped
/// before this returns.
pub async fn try_probe_source<P: ChunkProducer>(
    source: &mut ByteSource<P>,
    options: &ProbeOptions,
) -> Result<ImageSize, ProbeError> {
    let mut scanner = JpegScanner::with_limit(options.max_input);

    loop {
        let step = match scanner.command() {
            Command::Read(n) => source.request_bytes(n).await.map(|bytes| scanner.feed(&bytes)),
            Command::Skip(n) => source.request_skip(n).await.map(|()| scanner.skipped()),
            Command::Stop => {
                source.stop();
                return scanner.finish();
            }
        };

        match step {
            Ok(()) => {}
            Err(SourceError::Disconnected) => scanner.interrupt(),
            Err(err) => {
                source.stop();
                return Err(err.into());
            }
        }
    }
}

pub async fn try_probe_stream<P: ChunkProducer>(
    producer: P,
    options: &ProbeOptions,
) -> Result<ImageSize, ProbeError> {
    let mut source = ByteSource::new(producer);
    try_probe_source(&mut source, options).await
}

pub async fn probe_stream<P: ChunkProducer>(producer: P, options: &ProbeOptions) -> Option<ImageSize> {
    settle(try_probe_stream(producer, options).await)
}

pub async fn try_probe_async_read<R: AsyncRead + Unpin + Send>(
    reader: R,
    options: &ProbeOptions,
) -> Result<ImageSize, ProbeError> {
    let producer = ReaderProducer::with_chunk_size(reader, options.chunk_size);
    try_probe_stream(producer, options).await
}

pub async fn probe_async_read<R: AsyncRead + Unpin + Send>(
    reader: R,
    options: &ProbeOptions,
) -> Option<ImageSize> {
    settle(try_probe_async_read(reader, options).await)
}

/// Callback form of the output contract: `callback` runs exactly once.
pub async fn probe_with_callback<P, F>(producer: P, options: &ProbeOptions, callback: F)
where
    P: ChunkProducer,
    F: FnOnce(Option<ImageSize>),
{
    callback(probe_stream(producer, options).await);
}

/// A probe running on its own task.
#[derive(Debug)]
pub struct ProbeHandle {
    receiver: CompletionReceiver,
    task: JoinHandle<()>,
}

impl ProbeHandle {
    /// Waits for the single outcome of the probe.
    pub async fn outcome(self) -> Option<ImageSize> {
        self.receiver.wait().await
    }

    /// Cancels the probe. A pending outcome resolves to `None`.
    pub fn abort(&self) {
        self.task.abort();
    }
}

pub fn spawn_probe<P>(producer: P, options: ProbeOptions) -> ProbeHandle
where
    P: ChunkProducer + Send + 'static,
{
    let (mut completion, receiver) = completion();
    let task = tokio::spawn(async move {
        let mut source = ByteSource::new(producer);
        let outcome = settle(try_probe_source(&mut source, &options).await);
        completion.complete(outcome);
    });

    ProbeHandle { receiver, task }
}
