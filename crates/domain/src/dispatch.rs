use crate::shared::entity::ID;
use crate::template::TriggerType;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DispatchOutcome {
    /// The slot is claimed and the send attempt has not completed yet
    Pending,
    Success,
    #[serde(rename = "failed")]
    Failure,
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failure => "failed",
        }
    }
}

#[derive(Error, Debug)]
#[error("Unknown dispatch outcome: {0}")]
pub struct InvalidDispatchOutcome(String);

impl FromStr for DispatchOutcome {
    type Err = InvalidDispatchOutcome;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failure),
            _ => Err(InvalidDispatchOutcome(s.to_string())),
        }
    }
}

/// Identifies one dispatch slot: at most one record exists per key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DispatchKey {
    pub stay_id: ID,
    pub trigger_type: TriggerType,
    pub day: NaiveDate,
}

/// Persisted proof that a (stay, trigger type, day) slot has been attempted
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRecord {
    pub stay_id: ID,
    pub trigger_type: TriggerType,
    pub day: NaiveDate,
    /// Civil time in the operating timezone
    pub attempted_at: NaiveDateTime,
    pub outcome: DispatchOutcome,
}

impl DispatchRecord {
    pub fn key(&self) -> DispatchKey {
        DispatchKey {
            stay_id: self.stay_id.clone(),
            trigger_type: self.trigger_type.clone(),
            day: self.day,
        }
    }

    pub fn matches(&self, key: &DispatchKey) -> bool {
        self.stay_id == key.stay_id && self.trigger_type == key.trigger_type && self.day == key.day
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchPolicy {
    /// When `false` every resolved candidate is sent, even if the slot was
    /// already attempted today. Attempts are still logged.
    pub suppress_duplicates: bool,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            suppress_duplicates: true,
        }
    }
}
