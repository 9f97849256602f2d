use std::collections::VecDeque;
use std::time::SystemTime;
use log::warn;
use serde::Serialize;
use crate::core::{Category, Confidences, Label, PredictionRecord};

/// One prediction in the timeline history; `category` is `None` for an
/// unrecognized label, drawn as an empty slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub category: Option<Category>,
    pub received_at: SystemTime,
}

/// One bar of the instantaneous confidence display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceBar {
    pub category: Category,
    pub value: f64,
    pub is_highest: bool,
}

/// Running classification state for one session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationTally {
    counts: [u64; 3],
    last_record: Option<Confidences>,
    history: VecDeque<HistoryEntry>,
}

impl ClassificationTally {
    pub fn count(&self, category: Category) -> u64 {
        self.counts[category.index()]
    }

    pub fn counts(&self) -> [(Category, u64); 3] {
        Category::ALL.map(|c| (c, self.count(c)))
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn last_record(&self) -> Option<&Confidences> {
        self.last_record.as_ref()
    }

    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter()
    }
}

/// Folds `output_data` predictions into counts, the latest confidence
/// vector and a bounded recent history
#[derive(Debug, Clone)]
pub struct ClassificationAggregator {
    tally: ClassificationTally,
    history_len: usize,
}

impl ClassificationAggregator {
    pub fn new(history_len: usize) -> Self {
        Self {
            tally: ClassificationTally {
                counts: [0; 3],
                last_record: None,
                history: VecDeque::with_capacity(history_len),
            },
            history_len,
        }
    }

    /// Apply one prediction; returns the counted category, if recognized
    pub fn observe(&mut self, record: &PredictionRecord) -> Option<Category> {
        self.tally.last_record = Some(record.confidences);

        let category = match &record.label {
            Label::Known(category) => {
                self.tally.counts[category.index()] += 1;
                Some(*category)
            }
            Label::Unknown(label) => {
                warn!("Unrecognized prediction label {:?}, counts unchanged", label);
                None
            }
        };

        if self.tally.history.len() == self.history_len {
            self.tally.history.pop_front();
        }
        self.tally.history.push_back(HistoryEntry {
            category,
            received_at: SystemTime::now(),
        });
        category
    }

    pub fn tally(&self) -> &ClassificationTally {
        &self.tally
    }

    /// Share of each category among all counted predictions (pie display).
    /// All zero before the first recognized prediction.
    pub fn proportions(&self) -> [(Category, f64); 3] {
        let total = self.tally.total();
        Category::ALL.map(|c| {
            let share = if total == 0 {
                0.0
            } else {
                self.tally.count(c) as f64 / total as f64
            };
            (c, share)
        })
    }

    /// Latest confidences with the strongest one flagged (bar display)
    pub fn bars(&self) -> Vec<ConfidenceBar> {
        let confidences = self.tally.last_record.unwrap_or_default();
        let max = confidences
            .as_array()
            .into_iter()
            .fold(f64::NEG_INFINITY, f64::max);

        Category::ALL
            .iter()
            .map(|&category| {
                let value = confidences.get(category);
                ConfidenceBar {
                    category,
                    value,
                    is_highest: self.tally.last_record.is_some() && value == max,
                }
            })
            .collect()
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.history_len);
    }
}
