pub mod completion;
pub mod config;
pub mod error;
pub mod formats;
pub mod probe;
pub mod source;
pub mod types;

pub use completion::{Completion, CompletionReceiver};
pub use config::ProbeOptions;
pub use error::{ProbeError, SourceError};
pub use probe::{
    ProbeHandle, probe_async_read, probe_reader, probe_slice, probe_stream, probe_with_callback,
    spawn_probe,
};
pub use source::{ByteSource, ChannelProducer, ChunkProducer, ReaderProducer};
pub use types::{ImageFormat, ImageSize};
