use std::fmt;

/// Non-fatal problem found while decoding an inbound payload.
///
/// `record` is the zero-based position of the offending record inside the
/// payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeWarning {
    /// Text payload was not valid JSON
    Unparseable { reason: String },

    /// Payload was neither a record nor an array of records
    UnexpectedShape { found: &'static str },

    /// Array element that is not a JSON object
    NotARecord { record: usize },

    MissingTimestamp { record: usize },

    /// Configured channels absent from a record; `dropped` tells whether
    /// any samples of the record were discarded because of it
    MissingChannels {
        record: usize,
        channels: Vec<String>,
        dropped: bool,
    },

    MalformedPrediction { record: usize, reason: String },
}

impl DecodeWarning {
    /// Whether the warning cost the record (or part of a block record)
    pub fn drops_record(&self) -> bool {
        match self {
            DecodeWarning::MissingChannels { dropped, .. } => *dropped,
            _ => true,
        }
    }
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeWarning::Unparseable { reason } => write!(f, "unparseable payload: {}", reason),
            DecodeWarning::UnexpectedShape { found } => {
                write!(f, "expected a record or an array of records, found {}", found)
            }
            DecodeWarning::NotARecord { record } => write!(f, "record #{} is not an object", record),
            DecodeWarning::MissingTimestamp { record } => {
                write!(f, "record #{} has no numeric timestamp", record)
            }
            DecodeWarning::MissingChannels { record, channels, dropped } => write!(
                f,
                "record #{} is missing channel(s) {}{}",
                record,
                channels.join(", "),
                if *dropped { " (dropped)" } else { "" }
            ),
            DecodeWarning::MalformedPrediction { record, reason } => {
                write!(f, "prediction #{} is malformed: {}", record, reason)
            }
        }
    }
}

/// Records and warnings produced by one decode call
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    pub warnings: Vec<DecodeWarning>,
}

impl<T> Decoded<T> {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn rejected(warning: DecodeWarning) -> Self {
        Self {
            records: Vec::new(),
            warnings: vec![warning],
        }
    }

    /// Number of warnings that discarded a whole record
    pub fn dropped(&self) -> usize {
        self.warnings.iter().filter(|w| w.drops_record()).count()
    }
}
