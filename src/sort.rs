//! Sort engine for record snapshots.
//!
//! Each entry surface names its own set of sort profiles, and the two sets
//! are **not** equivalent:
//!
//! | Surface | Token | Order |
//! |---------|-------|-------|
//! | shell | `output1-email-desc-lastname-asc` | email desc, then last name asc |
//! | shell | `output2-birthdate-asc` | date of birth asc |
//! | shell | `output3-lastname-desc` | last name desc |
//! | HTTP | `email` | email asc |
//! | HTTP | `birthdate` | date of birth asc |
//! | HTTP | `name` | last name asc, then first name asc |
//!
//! Both sets are kept as they are; neither is derived from the other.
//! After the profile's own keys, email ascending breaks any remaining tie so
//! output never depends on store iteration order. Equal records are never
//! collapsed.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, RosterError};
use crate::models::Record;

/// A named, predetermined ordering over records.
pub trait SortProfile: Copy + Sized + 'static {
    /// Every profile in this set, in display order.
    const ALL: &'static [Self];

    /// The token that selects this profile.
    fn token(&self) -> &'static str;

    /// Short human description used in help output.
    fn description(&self) -> &'static str;

    /// Compares two records by this profile's keys only.
    fn compare(&self, a: &Record, b: &Record) -> Ordering;

    /// Resolves a token, failing with `InvalidSortProfile` listing this set.
    fn parse_token(token: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.token() == token)
            .ok_or_else(|| RosterError::InvalidSortProfile {
                given: token.to_string(),
                allowed: allowed_tokens::<Self>().join(", "),
            })
    }
}

/// Tokens accepted for profile set `P`.
pub fn allowed_tokens<P: SortProfile>() -> Vec<&'static str> {
    P::ALL.iter().map(|p| p.token()).collect()
}

/// Orders a snapshot by `profile`.
pub fn sort_records<P: SortProfile>(mut records: Vec<Record>, profile: P) -> Vec<Record> {
    records.sort_by(|a, b| {
        profile
            .compare(a, b)
            .then_with(|| a.email().cmp(b.email()))
    });
    records
}

/// Profiles accepted by the command shell's `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellProfile {
    EmailDescLastNameAsc,
    BirthDateAsc,
    LastNameDesc,
}

impl SortProfile for ShellProfile {
    const ALL: &'static [Self] = &[
        ShellProfile::EmailDescLastNameAsc,
        ShellProfile::BirthDateAsc,
        ShellProfile::LastNameDesc,
    ];

    fn token(&self) -> &'static str {
        match self {
            ShellProfile::EmailDescLastNameAsc => "output1-email-desc-lastname-asc",
            ShellProfile::BirthDateAsc => "output2-birthdate-asc",
            ShellProfile::LastNameDesc => "output3-lastname-desc",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            ShellProfile::EmailDescLastNameAsc => "email descending, then last name ascending",
            ShellProfile::BirthDateAsc => "date of birth ascending",
            ShellProfile::LastNameDesc => "last name descending",
        }
    }

    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match self {
            ShellProfile::EmailDescLastNameAsc => b
                .email()
                .cmp(a.email())
                .then_with(|| a.last_name().cmp(b.last_name())),
            ShellProfile::BirthDateAsc => a.date_of_birth().cmp(&b.date_of_birth()),
            ShellProfile::LastNameDesc => b.last_name().cmp(a.last_name()),
        }
    }
}

/// Profiles accepted by `GET /records/{sort}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryProfile {
    Email,
    BirthDate,
    Name,
}

impl SortProfile for QueryProfile {
    const ALL: &'static [Self] = &[QueryProfile::Email, QueryProfile::BirthDate, QueryProfile::Name];

    fn token(&self) -> &'static str {
        match self {
            QueryProfile::Email => "email",
            QueryProfile::BirthDate => "birthdate",
            QueryProfile::Name => "name",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            QueryProfile::Email => "email ascending",
            QueryProfile::BirthDate => "date of birth ascending",
            QueryProfile::Name => "last name ascending, then first name ascending",
        }
    }

    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match self {
            QueryProfile::Email => a.email().cmp(b.email()),
            QueryProfile::BirthDate => a.date_of_birth().cmp(&b.date_of_birth()),
            QueryProfile::Name => a
                .last_name()
                .cmp(b.last_name())
                .then_with(|| a.first_name().cmp(b.first_name())),
        }
    }
}

impl FromStr for ShellProfile {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_token(s)
    }
}

impl FromStr for QueryProfile {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_token(s)
    }
}

impl fmt::Display for ShellProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl fmt::Display for QueryProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
