//! Row masks for the month and team selectors.
//!
//! A selector that matches nothing yields an empty view rather than an error,
//! so a stale selection never breaks a render.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::SelectorError;
use crate::models::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthSelector {
    #[default]
    All,
    Month(u32),
}

impl MonthSelector {
    /// The wire value: 0 for the whole year.
    pub fn value(self) -> u32 {
        match self {
            Self::All => 0,
            Self::Month(month) => month,
        }
    }
}

impl TryFrom<u32> for MonthSelector {
    type Error = SelectorError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::All),
            1..=12 => Ok(Self::Month(value)),
            other => Err(SelectorError::MonthOutOfRange(other)),
        }
    }
}

impl FromStr for MonthSelector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| SelectorError::NotANumber(s.to_string()))?;
        Self::try_from(value)
    }
}

impl Serialize for MonthSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.value())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TeamSelector {
    #[default]
    All,
    Team(String),
}

impl FromStr for TeamSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "0" | "All" => Self::All,
            team => Self::Team(team.to_string()),
        })
    }
}

impl fmt::Display for TeamSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("0"),
            Self::Team(team) => f.write_str(team),
        }
    }
}

impl Serialize for TeamSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_u32(0),
            Self::Team(team) => serializer.serialize_str(team),
        }
    }
}

/// The state of both selector controls for one render.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterSelection {
    pub month: MonthSelector,
    pub team: TeamSelector,
}

impl FilterSelection {
    pub fn new(month: MonthSelector, team: TeamSelector) -> Self {
        Self { month, team }
    }
}

/// Row-selection predicate, one flag per dataset row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask(Vec<bool>);

impl Mask {
    pub fn all(len: usize) -> Self {
        Self(vec![true; len])
    }

    pub fn and(&self, other: &Mask) -> Mask {
        debug_assert_eq!(self.0.len(), other.0.len());
        Mask(self.0.iter().zip(&other.0).map(|(a, b)| *a && *b).collect())
    }

    pub fn apply<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        records
            .iter()
            .zip(&self.0)
            .filter_map(|(record, keep)| keep.then_some(record))
            .collect()
    }
}

pub fn month_filter(records: &[Record], selector: MonthSelector) -> Mask {
    match selector {
        MonthSelector::All => Mask::all(records.len()),
        MonthSelector::Month(month) => Mask(records.iter().map(|r| r.month == month).collect()),
    }
}

pub fn team_filter(records: &[Record], selector: &TeamSelector) -> Mask {
    match selector {
        TeamSelector::All => Mask::all(records.len()),
        TeamSelector::Team(team) => Mask(records.iter().map(|r| &r.team == team).collect()),
    }
}
