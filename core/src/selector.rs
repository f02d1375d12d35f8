//! Subscriber selector: picks the rows one analysis run will cover.
//!
//! RULES:
//!   - Source rows are only borrowed; selection never mutates the table.
//!   - The subset is always a subsequence of the table (source order kept).
//!   - A failed specific lookup is NotFound, never an empty success.
//!   - Over-large random counts are clamped to the table size with a warning.

use crate::{
    dataset::{SubscriberRecord, SubscriberTable},
    error::{RecError, RecResult},
    rng::SampleRng,
    types::Msisdn,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Specific,
    Random,
    All,
}

impl SelectionMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Specific => "specific",
            Self::Random => "random",
            Self::All => "all",
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SelectionMode {
    type Err = RecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "specific" => Ok(Self::Specific),
            "random" => Ok(Self::Random),
            "all" => Ok(Self::All),
            other => Err(RecError::InvalidInput(format!(
                "unknown selection mode '{other}' (expected specific, random or all)"
            ))),
        }
    }
}

/// A validated selection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    Specific(Msisdn),
    Random(usize),
    All,
}

impl SelectionPolicy {
    /// Build a policy from the operator's mode and free-text argument.
    /// The argument is the MSISDN for `Specific` and the count for `Random`;
    /// it is ignored for `All`.
    pub fn from_input(mode: SelectionMode, argument: Option<&str>) -> RecResult<Self> {
        match mode {
            SelectionMode::Specific => {
                let raw = argument.unwrap_or("").trim();
                raw.parse::<Msisdn>().map(Self::Specific).map_err(|_| {
                    RecError::InvalidInput(format!("'{raw}' is not a valid MSISDN"))
                })
            }
            SelectionMode::Random => {
                let raw = argument.unwrap_or("").trim();
                // Counts beyond usize saturate; select() clamps them anyway.
                match raw.parse::<usize>() {
                    Ok(n) if n > 0 => Ok(Self::Random(n)),
                    Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
                        Ok(Self::Random(usize::MAX))
                    }
                    _ => Err(RecError::InvalidInput(format!(
                        "'{raw}' is not a valid number of random MSISDNs"
                    ))),
                }
            }
            SelectionMode::All => Ok(Self::All),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        match self {
            Self::Specific(_) => SelectionMode::Specific,
            Self::Random(_) => SelectionMode::Random,
            Self::All => SelectionMode::All,
        }
    }
}

/// Rows chosen for one run, borrowed from the source table.
#[derive(Debug, Clone)]
pub struct SubscriberSubset<'a> {
    pub policy:  SelectionPolicy,
    pub records: Vec<&'a SubscriberRecord>,
    /// Random mode only: the request exceeded the table and was reduced.
    pub clamped: bool,
}

impl<'a> SubscriberSubset<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn msisdns(&self) -> Vec<Msisdn> {
        self.records.iter().map(|r| r.msisdn).collect()
    }
}

/// Apply `policy` to `table`.
pub fn select<'a>(
    table: &'a SubscriberTable,
    policy: SelectionPolicy,
    rng: &mut SampleRng,
) -> RecResult<SubscriberSubset<'a>> {
    let mut clamped = false;
    let records: Vec<&SubscriberRecord> = match policy {
        SelectionPolicy::Specific(msisdn) => {
            let hits: Vec<_> = table.records.iter().filter(|r| r.msisdn == msisdn).collect();
            if hits.is_empty() {
                return Err(RecError::NotFound { msisdn });
            }
            hits
        }
        SelectionPolicy::Random(requested) => {
            if table.is_empty() {
                return Err(RecError::EmptyDataset);
            }
            let available = table.len();
            let count = if requested > available {
                warn!(
                    "requested {requested} random subscribers but only {available} available; clamping"
                );
                clamped = true;
                available
            } else {
                requested
            };
            rng.sample_indices(available, count)
                .into_iter()
                .map(|i| &table.records[i])
                .collect()
        }
        SelectionPolicy::All => {
            if table.is_empty() {
                return Err(RecError::EmptyDataset);
            }
            table.records.iter().collect()
        }
    };

    info!("selected {} subscribers ({})", records.len(), policy.mode());
    Ok(SubscriberSubset {
        policy,
        records,
        clamped,
    })
}
