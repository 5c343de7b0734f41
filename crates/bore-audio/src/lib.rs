//! Listener sound extraction and audio batching.
//!
//! Once per sub-step the [`SoundExtractor`] records the listener cell's
//! pressure into the current tick's trace. At the end of a tick the trace
//! is published to its own frame set, decimated from the native sub-step
//! rate down to the audio rate, converted to 16-bit samples and cut into
//! fixed-length [`AudioBatch`]es.
//!
//! Batches cross to the audio thread through a bounded wait-free SPSC
//! queue. A full queue is a backpressure point: the batch is skipped and
//! counted, never blocked on.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod batch;
pub mod config;
pub mod decimator;
pub mod extractor;
pub mod response;

pub use batch::{AudioBatch, AudioReceiver};
pub use config::SoundConfig;
pub use decimator::{Decimator, Extract};
pub use extractor::{SoundExtractor, SoundStats};
pub use response::{FrequencyResponse, ResponseBin, ResponseMeter};
