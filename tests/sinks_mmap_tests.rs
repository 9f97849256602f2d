use std::sync::Arc;

use eegstream::core::{ChannelSet, ChartSink, Sample};
use eegstream::engine::{FrameOutcome, RenderScheduler};
use eegstream::observability::PipelineMetrics;
use eegstream::sinks::{read_projection, MmapSink};
use eegstream::visualization::SeriesWindow;
use tempfile::tempdir;

#[test]
fn test_file_matches_last_draw() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("eeg.stream");
    let channels = ChannelSet::new(["a", "b"]);

    let sink: Arc<dyn ChartSink> = Arc::new(MmapSink::create(&path, channels.clone(), 4).unwrap());
    let mut scheduler = RenderScheduler::new(&sink, Arc::new(PipelineMetrics::new()));
    let mut window = SeriesWindow::new(channels, 4);

    for t in 1..=5 {
        let mut sample = Sample::new(t as f64).with_channel("a", t as f64 * 2.0);
        if t != 4 {
            sample = sample.with_channel("b", -(t as f64));
        }
        window.append(&sample);
        scheduler.request_render();
    }
    assert_eq!(scheduler.on_frame(&window), FrameOutcome::Drawn);

    let (seq, option) = read_projection(&path).unwrap();
    assert_eq!(seq, 1);
    assert_eq!(option, window.projection());
    assert_eq!(option.x_axis, vec![2000.0, 3000.0, 4000.0, 5000.0]);
    assert_eq!(option.series("b").unwrap().data, vec![Some(-2.0), Some(-3.0), None, Some(-5.0)]);
}

#[test]
fn test_shorter_redraw_clears_old_points() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("eeg.stream");
    let channels = ChannelSet::new(["a"]);
    let sink = MmapSink::create(&path, channels.clone(), 8).unwrap();

    let mut window = SeriesWindow::new(channels, 8);
    for t in 0..6 {
        window.append(&Sample::new(t as f64).with_channel("a", 1.0));
    }
    sink.draw(&window.projection()).unwrap();

    window.reset();
    window.append(&Sample::new(10.0).with_channel("a", 7.0));
    sink.draw(&window.projection()).unwrap();
    sink.flush().unwrap();

    let (seq, option) = read_projection(&path).unwrap();
    assert_eq!(seq, 2);
    assert_eq!(sink.write_sequence(), 2);
    assert_eq!(option.len(), 1);
    assert_eq!(option.series("a").unwrap().data, vec![Some(7.0)]);
}

#[test]
fn test_oversized_projection_rejected() {
    let dir = tempdir().unwrap();
    let channels = ChannelSet::new(["a"]);
    let sink = MmapSink::create(dir.path().join("small.stream"), channels.clone(), 2).unwrap();

    let mut window = SeriesWindow::new(channels, 3);
    for t in 0..3 {
        window.append(&Sample::new(t as f64).with_channel("a", 0.0));
    }
    assert!(sink.draw(&window.projection()).is_err());
    assert_eq!(sink.write_sequence(), 0);
}

#[test]
fn test_read_rejects_foreign_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("other.bin");
    std::fs::write(&path, vec![0u8; 8192]).unwrap();
    assert!(read_projection(&path).is_err());
}
