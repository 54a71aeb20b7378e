//! Core domain records and identifiers
//!
//! A JHA owns an ordered list of steps, a step owns its hazards. Records are
//! what the store hands out; the `New*` and `*Patch` types are what callers
//! hand in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{SharedError, SharedResult};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = SharedError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self).map_err(|_| SharedError::InvalidId {
                    entity: $label,
                    input: s.to_string(),
                })
            }
        }
    };
}

entity_id!(
    /// Identifier of a Job Hazard Analysis
    JhaId,
    "JHA"
);
entity_id!(
    /// Identifier of a step within a JHA
    StepId,
    "Step"
);
entity_id!(
    /// Identifier of a hazard attached to a step
    HazardId,
    "Hazard"
);

/// Kind of record, used when reporting lookups that miss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Jha,
    Step,
    Hazard,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Jha => write!(f, "JHA"),
            EntityKind::Step => write!(f, "Step"),
            EntityKind::Hazard => write!(f, "Hazard"),
        }
    }
}

/// Highest number a step may carry, whether requested or appended.
pub const MAX_STEP_NUMBER: u32 = i32::MAX as u32;

/// Validate a client-supplied step number. Step numbers run from 1 to
/// [`MAX_STEP_NUMBER`].
pub fn parse_step_number(value: i64) -> SharedResult<u32> {
    u32::try_from(value)
        .ok()
        .filter(|n| (1..=MAX_STEP_NUMBER).contains(n))
        .ok_or(SharedError::InvalidStepNumber { value })
}

/// A Job Hazard Analysis without its steps (list view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jha {
    pub id: JhaId,
    pub title: String,
    pub author: String,
    pub job_description: String,
    pub job_location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A JHA with its steps ordered by step number, each carrying its hazards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JhaDetail {
    #[serde(flatten)]
    pub jha: Jha,
    pub steps: Vec<StepDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub jha_id: JhaId,
    pub step_number: u32,
    pub step_description: String,
}

/// A step with its hazards in creation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDetail {
    #[serde(flatten)]
    pub step: Step,
    pub hazards: Vec<Hazard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hazard {
    pub id: HazardId,
    pub step_id: StepId,
    pub description: String,
    pub controls: String,
}

/// Fields required to create a JHA. Timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJha {
    pub title: String,
    pub author: String,
    pub job_description: String,
    pub job_location: String,
}

/// Partial JHA update. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JhaPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub job_description: Option<String>,
    pub job_location: Option<String>,
}

impl JhaPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.job_description.is_none()
            && self.job_location.is_none()
    }
}

/// Fields required to append a step. The number is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStep {
    pub step_description: String,
}

/// Partial step update. A `step_number` goes through renumbering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPatch {
    pub step_number: Option<u32>,
    pub step_description: Option<String>,
}

impl StepPatch {
    pub fn is_empty(&self) -> bool {
        self.step_number.is_none() && self.step_description.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHazard {
    pub description: String,
    pub controls: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardPatch {
    pub description: Option<String>,
    pub controls: Option<String>,
}

impl HazardPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.controls.is_none()
    }
}
