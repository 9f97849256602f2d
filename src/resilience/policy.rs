use serde::{Deserialize, Serialize};

/// What to do with a record that lacks one or more configured channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingChannelPolicy {
    /// Keep the channels that are present; absent ones become gaps in the window
    #[default]
    PartialAccept,

    /// Drop the whole sample if any channel is absent
    DropSample,
}

impl MissingChannelPolicy {
    pub fn keeps_partial(&self) -> bool {
        matches!(self, MissingChannelPolicy::PartialAccept)
    }
}
