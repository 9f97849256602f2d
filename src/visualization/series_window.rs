use crate::core::{ChannelSet, ChartOption, Sample, SeriesData};
use super::RingBuffer;

/// Rolling per-channel view of the most recent `capacity` samples.
///
/// The time axis and every channel buffer always hold the same number of
/// points; overflow is trimmed from all of them in one step.
#[derive(Debug, Clone)]
pub struct SeriesWindow {
    channels: ChannelSet,
    capacity: usize,
    time_axis: RingBuffer<f64>,
    per_channel: Vec<RingBuffer<Option<f64>>>,
}

impl SeriesWindow {
    pub fn new(channels: ChannelSet, capacity: usize) -> Self {
        let per_channel = channels.iter().map(|_| RingBuffer::new(capacity)).collect();
        Self {
            channels,
            capacity,
            time_axis: RingBuffer::new(capacity),
            per_channel,
        }
    }

    /// Append one sample and trim to capacity
    pub fn append(&mut self, sample: &Sample) {
        self.push(sample);
        self.evict_overflow();
    }

    /// Append a decoded batch in order, trimming once at the end
    pub fn append_batch(&mut self, samples: &[Sample]) -> usize {
        for sample in samples {
            self.push(sample);
        }
        self.evict_overflow();
        samples.len()
    }

    fn push(&mut self, sample: &Sample) {
        self.time_axis.push(sample.timestamp);
        for (buffer, id) in self.per_channel.iter_mut().zip(self.channels.iter()) {
            buffer.push(sample.get(id));
        }
    }

    /// Drop the oldest points beyond capacity from every series at once
    pub fn evict_overflow(&mut self) -> usize {
        let excess = self.time_axis.overflow();
        if excess == 0 {
            return 0;
        }
        self.time_axis.evict_front(excess);
        for buffer in &mut self.per_channel {
            buffer.evict_front(excess);
        }
        excess
    }

    pub fn len(&self) -> usize {
        self.time_axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_axis.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn channels(&self) -> &ChannelSet {
        &self.channels
    }

    pub fn timestamps(&self) -> Vec<f64> {
        self.time_axis.to_vec()
    }

    pub fn channel(&self, id: &str) -> Option<Vec<Option<f64>>> {
        self.channels
            .index_of(id)
            .map(|i| self.per_channel[i].to_vec())
    }

    /// Length of every series, time axis first
    pub fn series_lengths(&self) -> Vec<usize> {
        std::iter::once(self.time_axis.len())
            .chain(self.per_channel.iter().map(RingBuffer::len))
            .collect()
    }

    pub fn latest_timestamp(&self) -> Option<f64> {
        self.time_axis.back().copied()
    }

    pub fn reset(&mut self) {
        self.time_axis.clear();
        for buffer in &mut self.per_channel {
            buffer.clear();
        }
    }

    /// Full chart description of the current contents
    pub fn projection(&self) -> ChartOption {
        ChartOption {
            x_axis: self.time_axis.iter().map(|t| t * 1000.0).collect(),
            series: self
                .channels
                .iter()
                .zip(&self.per_channel)
                .map(|(id, buffer)| SeriesData {
                    name: id.to_string(),
                    data: buffer.to_vec(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ts: f64) -> Sample {
        Sample::new(ts).with_channel("a", ts * 10.0).with_channel("b", -ts)
    }

    #[test]
    fn test_missing_channel_becomes_gap() {
        let mut window = SeriesWindow::new(ChannelSet::new(["a", "b"]), 8);
        window.append(&sample(1.0));
        window.append(&Sample::new(2.0).with_channel("a", 20.0));

        assert_eq!(window.series_lengths(), vec![2, 2, 2]);
        assert_eq!(window.channel("b").unwrap(), vec![Some(-1.0), None]);
    }

    #[test]
    fn test_projection_uses_milliseconds() {
        let mut window = SeriesWindow::new(ChannelSet::new(["a", "b"]), 8);
        window.append(&sample(1.5));

        let option = window.projection();
        assert_eq!(option.x_axis, vec![1500.0]);
        assert_eq!(option.series("a").unwrap().data, vec![Some(15.0)]);
    }

    #[test]
    fn test_unknown_channel_ignored() {
        let mut window = SeriesWindow::new(ChannelSet::new(["a"]), 8);
        window.append(&Sample::new(1.0).with_channel("a", 1.0).with_channel("z", 9.0));
        assert_eq!(window.projection().series.len(), 1);
    }
}
