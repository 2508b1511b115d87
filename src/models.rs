//! Core data model: the validated personal [`Record`].
//!
//! A `Record` is only ever constructed through validation, so holding one
//! means all five attributes are present, trimmed, and non-empty, and the
//! date of birth is a real calendar date.

use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::error::{Result, RosterError};

/// Strict on-the-wire date layout for `dateOfBirth`.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Number of delimited fields in one record line.
pub const FIELD_COUNT: usize = 5;

/// Field names in line order, used in validation messages.
const FIELD_NAMES: [&str; FIELD_COUNT] = [
    "lastName",
    "firstName",
    "email",
    "favoriteColor",
    "dateOfBirth",
];

/// A validated personal record, keyed by `email` in the store.
///
/// Immutable once built. Equality and hashing are attribute-based, so two
/// records with identical fields are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    last_name: String,
    first_name: String,
    email: String,
    favorite_color: String,
    #[serde(serialize_with = "serialize_date")]
    date_of_birth: NaiveDate,
}

impl Record {
    /// Validates and builds a record from its five raw attributes.
    ///
    /// Every attribute is trimmed. The first four must be non-empty and the
    /// date of birth must match `MM/DD/YYYY` exactly.
    pub fn new(
        last_name: &str,
        first_name: &str,
        email: &str,
        favorite_color: &str,
        date_of_birth: &str,
    ) -> Result<Self> {
        let text = [last_name, first_name, email, favorite_color].map(str::trim);
        if let Some(pos) = text.iter().position(|v| v.is_empty()) {
            return Err(RosterError::MalformedRecord(format!(
                "field '{}' must not be empty",
                FIELD_NAMES[pos]
            )));
        }
        let [last_name, first_name, email, favorite_color] = text;

        Ok(Self {
            last_name: last_name.to_string(),
            first_name: first_name.to_string(),
            email: email.to_string(),
            favorite_color: favorite_color.to_string(),
            date_of_birth: parse_date(date_of_birth)?,
        })
    }

    /// Builds a record from a raw field array in line order
    /// (`lastName, firstName, email, favoriteColor, dateOfBirth`).
    ///
    /// Fails when the array does not hold exactly five fields; the message
    /// cites the raw array so the offending line can be found.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self> {
        match fields {
            [last, first, email, color, dob] => Self::new(
                last.as_ref(),
                first.as_ref(),
                email.as_ref(),
                color.as_ref(),
                dob.as_ref(),
            ),
            _ => {
                let raw: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
                Err(RosterError::MalformedRecord(format!(
                    "expected {} fields but found {}: {:?}",
                    FIELD_COUNT,
                    fields.len(),
                    raw
                )))
            }
        }
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn favorite_color(&self) -> &str {
        &self.favorite_color
    }

    pub fn date_of_birth(&self) -> NaiveDate {
        self.date_of_birth
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}), born {}, likes {}",
            self.first_name,
            self.last_name,
            self.email,
            self.date_of_birth.format(DATE_FORMAT),
            self.favorite_color
        )
    }
}

fn serialize_date<S>(date: &NaiveDate, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&date.format(DATE_FORMAT))
}

/// Parses a strict `MM/DD/YYYY` date.
///
/// chrono alone accepts single-digit months and days, so the shape is
/// checked first. Overflowing values such as `02/30/2001` are rejected.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let value = raw.trim();
    let unparseable = || {
        RosterError::MalformedRecord(format!(
            "date of birth '{}' could not be parsed, expected MM/DD/YYYY",
            value
        ))
    };

    let shape_ok = value.len() == 10
        && value.bytes().enumerate().all(|(i, b)| match i {
            2 | 5 => b == b'/',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(unparseable());
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| unparseable())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smith() -> Record {
        Record::new("Smith", "Bob", "bob.smith@example.net", "red", "01/23/1972").unwrap()
    }

    #[test]
    fn test_fields_are_trimmed() {
        let rec = Record::new(
            " Smith ",
            "Bob\t",
            " bob.smith@example.net",
            "red ",
            " 01/23/1972 ",
        )
        .unwrap();
        assert_eq!(rec, smith());
        assert_eq!(rec.last_name(), "Smith");
        assert_eq!(rec.first_name(), "Bob");
        assert_eq!(rec.email(), "bob.smith@example.net");
        assert_eq!(rec.favorite_color(), "red");
        assert_eq!(
            rec.date_of_birth(),
            NaiveDate::from_ymd_opt(1972, 1, 23).unwrap()
        );
    }

    #[test]
    fn test_from_fields_wrong_count_cites_raw_fields() {
        let err = Record::from_fields(&["BadLine"]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("expected 5 fields but found 1"), "{}", msg);
        assert!(msg.contains("BadLine"), "{}", msg);

        let six = ["a", "b", "c", "d", "01/01/2000", "f"];
        assert!(Record::from_fields(&six).is_err());
    }

    #[test]
    fn test_empty_field_rejected() {
        let err = Record::new("Smith", "  ", "bob@x.net", "red", "01/23/1972").unwrap_err();
        assert!(matches!(err, RosterError::MalformedRecord(_)));
        assert!(err.to_string().contains("firstName"));
    }

    #[test]
    fn test_strict_date_parsing() {
        assert!(parse_date("01/23/1972").is_ok());
        assert!(parse_date("02/29/2000").is_ok());

        for bad in [
            "1/23/1972",
            "01-23-1972",
            "1972/01/23",
            "02/30/2001",
            "13/01/2001",
            "02/29/2001",
            "01/23/72",
            "",
            "aa/bb/cccc",
        ] {
            let err = parse_date(bad).unwrap_err();
            assert!(
                err.to_string().contains("could not be parsed"),
                "expected failure for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            smith().to_string(),
            "Bob Smith (bob.smith@example.net), born 01/23/1972, likes red"
        );
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(smith()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "lastName": "Smith",
                "firstName": "Bob",
                "email": "bob.smith@example.net",
                "favoriteColor": "red",
                "dateOfBirth": "01/23/1972"
            })
        );
    }
}
