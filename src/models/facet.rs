//! Facet kinds and per-facet fetch outcomes.

use std::fmt;

use serde_json::Value;
use url::Url;

use crate::error::Result;
use crate::models::DateKey;

/// One of the five independent data dimensions stored per date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetKind {
    Calendar,
    Astro,
    Shichen,
    Jieqi,
    Holidays,
}

/// Whether a facet is keyed by the full date or only its year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope {
    Date,
    Year,
}

impl FacetKind {
    /// All facets, in record field order.
    pub const ALL: [FacetKind; 5] = [
        FacetKind::Calendar,
        FacetKind::Astro,
        FacetKind::Shichen,
        FacetKind::Jieqi,
        FacetKind::Holidays,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FacetKind::Calendar => "Calendar",
            FacetKind::Astro => "Astro",
            FacetKind::Shichen => "Shichen",
            FacetKind::Jieqi => "Jieqi",
            FacetKind::Holidays => "Holidays",
        }
    }

    pub fn scope(&self) -> KeyScope {
        match self {
            FacetKind::Calendar | FacetKind::Astro | FacetKind::Shichen => KeyScope::Date,
            FacetKind::Jieqi | FacetKind::Holidays => KeyScope::Year,
        }
    }

    /// Request key for `date`: the date itself or its four-digit year.
    pub fn key_for(&self, date: &DateKey) -> String {
        match self.scope() {
            KeyScope::Date => date.to_string(),
            KeyScope::Year => date.year_key(),
        }
    }

    /// Fixed endpoint for `key`.
    ///
    /// The timelessq facets take the key as a query parameter, the holiday
    /// facet takes it as the last path segment.
    pub fn endpoint(&self, key: &str) -> Result<Url> {
        let url = match self {
            FacetKind::Calendar => {
                Url::parse_with_params("https://api.timelessq.com/time", &[("datetime", key)])?
            }
            FacetKind::Astro => {
                Url::parse_with_params("https://api.timelessq.com/time/astro", &[("keyword", key)])?
            }
            FacetKind::Shichen => {
                Url::parse_with_params("https://api.timelessq.com/time/shichen", &[("date", key)])?
            }
            FacetKind::Jieqi => {
                Url::parse_with_params("https://api.timelessq.com/time/jieqi", &[("year", key)])?
            }
            FacetKind::Holidays => {
                Url::parse("https://api.jiejiariapi.com/v1/holidays/")?.join(key)?
            }
        };
        Ok(url)
    }
}

impl fmt::Display for FacetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of fetching one facet.
#[derive(Debug, Clone, PartialEq)]
pub enum FacetOutcome {
    /// The source answered; the body is kept verbatim (it may itself be `null`).
    Fetched(Value),
    /// The request failed; the reason has already been written to the error log.
    Failed(String),
}

impl FacetOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FacetOutcome::Failed(_))
    }

    /// Collapse into the stored form.
    pub fn into_payload(self) -> Option<Value> {
        match self {
            FacetOutcome::Fetched(value) => Some(value),
            FacetOutcome::Failed(_) => None,
        }
    }
}
