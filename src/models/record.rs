//! Record data structure.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

/// A calendar date in `YYYY-MM-DD` form, the identity of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Four-digit year, the key of year-scoped facets.
    pub fn year_key(&self) -> String {
        format!("{:04}", self.0.year())
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DateKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|e| AppError::validation(format!("Invalid date '{s}': {e}")))
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

/// One stored date together with its five facet payloads.
///
/// Payloads are kept verbatim; `None` is written as `null` and means the
/// facet was unavailable when the date was fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub date: DateKey,

    #[serde(default)]
    pub calendar: Option<Value>,

    #[serde(default)]
    pub astro: Option<Value>,

    #[serde(default)]
    pub shichen: Option<Value>,

    #[serde(default)]
    pub jieqi: Option<Value>,

    #[serde(default)]
    pub holidays: Option<Value>,

    /// Fields written by other tools, kept as-is on rewrite.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// A record with every facet missing.
    pub fn empty(date: DateKey) -> Self {
        Self {
            date,
            calendar: None,
            astro: None,
            shichen: None,
            jieqi: None,
            holidays: None,
            extra: Map::new(),
        }
    }

    /// Whether every facet is missing.
    pub fn is_empty(&self) -> bool {
        self.facet_count() == 0
    }

    /// Number of facets that carry a payload.
    pub fn facet_count(&self) -> usize {
        [
            &self.calendar,
            &self.astro,
            &self.shichen,
            &self.jieqi,
            &self.holidays,
        ]
        .iter()
        .filter(|facet| facet.as_ref().is_some_and(|v| !v.is_null()))
        .count()
    }
}
