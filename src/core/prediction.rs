use serde::{Deserialize, Serialize};

/// Emotion categories produced by the backend classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Good,
    Neutral,
    Bad,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Good, Category::Neutral, Category::Bad];

    /// Wire label used in `prediction` fields and confidence keys
    pub fn label(&self) -> &'static str {
        match self {
            Category::Good => "good",
            Category::Neutral => "neutral",
            Category::Bad => "bad",
        }
    }

    /// Name shown next to the bar and pie displays
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Good => "Liked",
            Category::Neutral => "Neutral",
            Category::Bad => "Not Liked",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    pub fn index(&self) -> usize {
        match self {
            Category::Good => 0,
            Category::Neutral => 1,
            Category::Bad => 2,
        }
    }
}

/// Prediction label as received; unrecognized strings are kept verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    Known(Category),
    Unknown(String),
}

impl Label {
    pub fn parse(raw: &str) -> Self {
        match Category::from_label(raw) {
            Some(category) => Label::Known(category),
            None => Label::Unknown(raw.to_string()),
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            Label::Known(category) => Some(*category),
            Label::Unknown(_) => None,
        }
    }
}

/// Per-category confidence scalars, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Confidences {
    pub good: f64,
    pub neutral: f64,
    pub bad: f64,
}

impl Confidences {
    pub fn new(good: f64, neutral: f64, bad: f64) -> Self {
        Self { good, neutral, bad }
    }

    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Good => self.good,
            Category::Neutral => self.neutral,
            Category::Bad => self.bad,
        }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.good, self.neutral, self.bad]
    }
}

/// One decoded `output_data` record
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    pub label: Label,
    pub confidences: Confidences,

    /// Producer-side window index, when sent
    pub index: Option<u64>,
}
