use std::fmt;

use serde::{Deserialize, Serialize};

use crate::due_date::DueDate;

/// A milestone as GitHub reports it for one repository.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MilestoneRecord {
    pub number: u64,
    pub title: String,
    pub state: MilestoneState,
    #[serde(rename = "due_on")]
    pub due: Option<DueDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneState {
    Open,
    Closed,
}

impl fmt::Display for MilestoneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MilestoneState::Open => f.write_str("open"),
            MilestoneState::Closed => f.write_str("closed"),
        }
    }
}

/// Body of `PATCH /repos/{owner}/{repo}/milestones/{number}`. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MilestonePatch {
    #[serde(rename = "due_on", skip_serializing_if = "Option::is_none")]
    pub due: Option<DueDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<MilestoneState>,
}

impl MilestonePatch {
    pub fn due(due: DueDate) -> Self {
        MilestonePatch {
            due: Some(due),
            ..Default::default()
        }
    }

    pub fn close() -> Self {
        MilestonePatch {
            state: Some(MilestoneState::Closed),
            ..Default::default()
        }
    }
}
