//! Chat stream parsing.
//!
//! - `decoder` - raw bytes to complete text lines (`LineDecoder`)
//! - `processor` - `data: ` frames to `StreamEvent`s and the fold into `AggregatedResult`

pub mod decoder;
pub mod processor;

pub use decoder::LineDecoder;
pub use processor::{ collect_stream, parse_frame, ChunkCallback, StreamAggregator, DATA_PREFIX };
