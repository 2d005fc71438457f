//! Submission state machine
//!
//! `Idle -> Sending -> Idle | Failed`, and `Failed -> Sending`. Only one
//! submission may be in `Sending` at a time.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitState {
    #[default]
    Idle,
    Sending,
    Failed,
}

impl SubmitState {
    pub fn is_sending(&self) -> bool {
        matches!(self, SubmitState::Sending)
    }

    /// Enter `Sending` if nothing is in flight; returns whether admitted
    pub fn try_begin(&mut self) -> bool {
        match self {
            SubmitState::Idle | SubmitState::Failed => {
                *self = SubmitState::Sending;
                true
            }
            SubmitState::Sending => false,
        }
    }

    /// Leave `Sending`
    pub fn finish(&mut self, succeeded: bool) {
        *self = if succeeded { SubmitState::Idle } else { SubmitState::Failed };
    }
}

impl std::fmt::Display for SubmitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SubmitState::Idle => "idle",
            SubmitState::Sending => "sending",
            SubmitState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}
