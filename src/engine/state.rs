use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Why a session stopped receiving data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Operator asked to stop
    Stopped,
    /// Producer disconnected or the channel closed
    TransportLost,
    /// Nothing arrived within the configured idle timeout
    IdleTimeout,
}

/// Session lifecycle states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Connecting,
    Streaming {
        #[serde(skip)]
        started_at: Option<Instant>,
    },
    Stopping,
    Ended { reason: EndReason },
}

impl SessionState {
    /// Check if transition from current state to target state is valid
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        use SessionState::*;

        matches!(
            (self, target),
            (Idle, Connecting) |

            (Connecting, Streaming { .. }) |
            (Connecting, Ended { .. }) |

            (Streaming { .. }, Stopping) |
            (Streaming { .. }, Ended { .. }) |

            (Stopping, Ended { .. })
        )
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::Connecting => "Connecting",
            Self::Streaming { .. } => "Streaming",
            Self::Stopping => "Stopping",
            Self::Ended { .. } => "Ended",
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming { .. })
    }

    pub fn is_ended(&self) -> bool {
        matches!(self, Self::Ended { .. })
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle
    }
}
