pub mod ring_buffer;
pub mod series_window;

pub use ring_buffer::RingBuffer;
pub use series_window::SeriesWindow;
