// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How many signal reads the tracker may perform before giving up.
///
/// Configured as a signed integer: any negative value (conventionally `-1`)
/// means "poll until the job tree is done".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "i64")]
pub enum PollBudget {
    Bounded(u32),
    Unbounded,
}

impl PollBudget {
    pub const DEFAULT_COUNT: u32 = 40;

    /// Whether `reads` signal reads have used the whole budget.
    pub fn is_exhausted(&self, reads: u32) -> bool {
        match self {
            PollBudget::Bounded(max) => reads >= *max,
            PollBudget::Unbounded => false,
        }
    }
}

impl Default for PollBudget {
    fn default() -> Self {
        PollBudget::Bounded(Self::DEFAULT_COUNT)
    }
}

impl From<i64> for PollBudget {
    fn from(value: i64) -> Self {
        if value < 0 {
            PollBudget::Unbounded
        } else {
            PollBudget::Bounded(u32::try_from(value).unwrap_or(u32::MAX))
        }
    }
}

impl FromStr for PollBudget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(PollBudget::from)
            .map_err(|e| format!("invalid poll count '{s}': {e} (expected an integer, -1 = unbounded)"))
    }
}

impl fmt::Display for PollBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollBudget::Bounded(n) => write!(f, "{n}"),
            PollBudget::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// Kind of host a child execution targeted. Decides which tag API resolves
/// its friendly name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    ManagedInstance,
    Ec2Instance,
}

impl ResourceKind {
    /// Hybrid managed instances are registered with an `mi-` prefix;
    /// everything else is treated as an EC2 instance id.
    pub fn for_target(target: &str) -> Self {
        if target.starts_with("mi-") {
            ResourceKind::ManagedInstance
        } else {
            ResourceKind::Ec2Instance
        }
    }
}
