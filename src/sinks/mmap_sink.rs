use std::fs::{self, File, OpenOptions};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{fence, AtomicU64, Ordering};
use std::sync::Mutex;
use std::thread;
use anyhow::{anyhow, bail, Context, Result};
use memmap2::MmapMut;

use crate::core::{ChannelSet, ChartOption, ChartSink, SeriesData};

pub const MAGIC: &[u8; 8] = b"EEGSTRM!";
pub const VERSION: u64 = 1;
pub const HEADER_SIZE: usize = 4096;

const VERSION_OFFSET: usize = 8;
const CHANNELS_OFFSET: usize = 16;
const CAPACITY_OFFSET: usize = 24;
const WRITE_SEQ_OFFSET: usize = 32;
const POINTS_OFFSET: usize = 40;
const NAMES_LEN_OFFSET: usize = 48;
const NAMES_OFFSET: usize = 56;

const READ_ATTEMPTS: usize = 64;

/// Chart sink that publishes every projection into a memory-mapped file so
/// an out-of-process viewer can render it.
///
/// Layout: a 4096-byte header, then `capacity` time-axis slots followed by
/// `capacity` slots per channel, all little-endian f64. Missing readings and
/// unused slots hold NaN.
///
/// `write_seq` works as a seqlock: it is odd while a frame is being written
/// and even once it is complete, so `write_seq / 2` counts finished draws.
pub struct MmapSink {
    path: PathBuf,
    channels: ChannelSet,
    capacity: usize,
    mmap: Mutex<MmapMut>,
    write_sequence: AtomicU64,
}

impl MmapSink {
    pub fn create(path: impl AsRef<Path>, channels: ChannelSet, capacity: usize) -> Result<Self> {
        let path = path.as_ref();
        if capacity == 0 {
            bail!("Sink capacity must be greater than zero");
        }

        let names = serde_json::to_vec(&channels)?;
        if NAMES_OFFSET + names.len() > HEADER_SIZE {
            bail!("Channel names do not fit in the {}-byte header", HEADER_SIZE);
        }

        let data_size = (1 + channels.len()) * capacity * 8;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .context(format!("Failed to open sink file {:?}", path))?;
        file.set_len((HEADER_SIZE + data_size) as u64)?;

        let mut mmap = unsafe { MmapMut::map_mut(&file)? };

        mmap[0..8].copy_from_slice(MAGIC);
        write_u64(&mut mmap, VERSION_OFFSET, VERSION);
        write_u64(&mut mmap, CHANNELS_OFFSET, channels.len() as u64);
        write_u64(&mut mmap, CAPACITY_OFFSET, capacity as u64);
        write_u64(&mut mmap, WRITE_SEQ_OFFSET, 0);
        write_u64(&mut mmap, POINTS_OFFSET, 0);
        write_u64(&mut mmap, NAMES_LEN_OFFSET, names.len() as u64);
        mmap[NAMES_OFFSET..NAMES_OFFSET + names.len()].copy_from_slice(&names);

        for slot in mmap[HEADER_SIZE..].chunks_exact_mut(8) {
            slot.copy_from_slice(&f64::NAN.to_le_bytes());
        }

        Ok(Self {
            path: path.to_path_buf(),
            channels,
            capacity,
            mmap: Mutex::new(mmap),
            write_sequence: AtomicU64::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_sequence(&self) -> u64 {
        self.write_sequence.load(Ordering::Acquire)
    }

    pub fn flush(&self) -> Result<()> {
        let mmap = self
            .mmap
            .lock()
            .map_err(|_| anyhow!("Sink mapping lock poisoned"))?;
        mmap.flush().context("Failed to flush sink mapping")
    }

    fn write_column(mmap: &mut MmapMut, column: usize, capacity: usize, values: impl Iterator<Item = f64>) {
        let start = HEADER_SIZE + column * capacity * 8;
        let slots = mmap[start..start + capacity * 8].chunks_exact_mut(8);
        let mut values = values.fuse();
        for slot in slots {
            let v = values.next().unwrap_or(f64::NAN);
            slot.copy_from_slice(&v.to_le_bytes());
        }
    }
}

impl ChartSink for MmapSink {
    fn draw(&self, option: &ChartOption) -> Result<()> {
        if option.len() > self.capacity {
            bail!("Projection of {} points exceeds sink capacity {}", option.len(), self.capacity);
        }

        let series = self
            .channels
            .iter()
            .map(|id| {
                option
                    .series(id)
                    .ok_or_else(|| anyhow!("Projection has no series for channel {}", id))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut mmap = self
            .mmap
            .lock()
            .map_err(|_| anyhow!("Sink mapping lock poisoned"))?;

        let done = self.write_sequence.load(Ordering::Acquire);
        write_u64(&mut mmap, WRITE_SEQ_OFFSET, done * 2 + 1);
        fence(Ordering::Release);

        Self::write_column(&mut mmap, 0, self.capacity, option.x_axis.iter().copied());
        for (i, data) in series.iter().enumerate() {
            let values = data.data.iter().map(|v| v.unwrap_or(f64::NAN));
            Self::write_column(&mut mmap, i + 1, self.capacity, values);
        }
        write_u64(&mut mmap, POINTS_OFFSET, option.len() as u64);

        fence(Ordering::Release);
        write_u64(&mut mmap, WRITE_SEQ_OFFSET, (done + 1) * 2);
        self.write_sequence.store(done + 1, Ordering::Release);
        Ok(())
    }
}

/// Read back the latest complete projection written by an [`MmapSink`],
/// with the number of draws it reflects.
///
/// Retries while a frame is mid-write or the sequence moved during the read.
pub fn read_projection(path: impl AsRef<Path>) -> Result<(u64, ChartOption)> {
    let path = path.as_ref();
    for _ in 0..READ_ATTEMPTS {
        let bytes = fs::read(path).context(format!("Failed to read sink file {:?}", path))?;
        let (seq, option) = parse_frame(path, &bytes)?;
        if seq % 2 == 1 || read_sequence(path)? != seq {
            thread::yield_now();
            continue;
        }
        return Ok((seq / 2, option));
    }
    bail!("{:?} kept changing during {} read attempts", path, READ_ATTEMPTS)
}

fn read_sequence(path: &Path) -> Result<u64> {
    let mut header = [0u8; WRITE_SEQ_OFFSET + 8];
    File::open(path)
        .and_then(|mut file| file.read_exact(&mut header))
        .context(format!("Failed to re-read header of {:?}", path))?;
    Ok(read_u64(&header, WRITE_SEQ_OFFSET))
}

fn parse_frame(path: &Path, bytes: &[u8]) -> Result<(u64, ChartOption)> {
    if bytes.len() < HEADER_SIZE || &bytes[0..8] != MAGIC {
        bail!("{:?} is not an eeg stream file", path);
    }
    let version = read_u64(&bytes, VERSION_OFFSET);
    if version != VERSION {
        bail!("Unsupported stream file version {}", version);
    }

    let channel_count = read_u64(&bytes, CHANNELS_OFFSET) as usize;
    let capacity = read_u64(&bytes, CAPACITY_OFFSET) as usize;
    let write_seq = read_u64(&bytes, WRITE_SEQ_OFFSET);
    let points = read_u64(&bytes, POINTS_OFFSET) as usize;
    let names_len = read_u64(&bytes, NAMES_LEN_OFFSET) as usize;

    if NAMES_OFFSET + names_len > HEADER_SIZE
        || points > capacity
        || bytes.len() < HEADER_SIZE + (1 + channel_count) * capacity * 8
    {
        bail!("Corrupt header in {:?}", path);
    }
    let channels: ChannelSet = serde_json::from_slice(&bytes[NAMES_OFFSET..NAMES_OFFSET + names_len])
        .context("Failed to parse channel names")?;

    let column = |index: usize| -> Vec<f64> {
        let start = HEADER_SIZE + index * capacity * 8;
        (0..points).map(|i| read_f64(bytes, start + i * 8)).collect()
    };

    let series = channels
        .iter()
        .enumerate()
        .map(|(i, id)| SeriesData {
            name: id.to_string(),
            data: column(i + 1)
                .into_iter()
                .map(|v| if v.is_nan() { None } else { Some(v) })
                .collect(),
        })
        .collect();

    Ok((write_seq, ChartOption { x_axis: column(0), series }))
}

fn write_u64(buf: &mut [u8], offset: usize, value: u64) {
    buf[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

fn read_u64(buf: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

fn read_f64(buf: &[u8], offset: usize) -> f64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[offset..offset + 8]);
    f64::from_le_bytes(raw)
}
