pub mod log_sink;
pub mod mmap_sink;

pub use log_sink::LogSink;
pub use mmap_sink::{read_projection, MmapSink};
