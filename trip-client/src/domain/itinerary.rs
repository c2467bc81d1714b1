//! Itinerary model: days of ordered visit spots.
//!
//! The shapes mirror the JSON document the backend stores for a saved
//! course, so an `Itinerary` can be sent back unchanged on save.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::VisitTime;

/// Geographic coordinates as the backend stores them (decimal strings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: String,
    pub lng: String,
}

/// A place to visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spot {
    pub name: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub address: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Display time, "HH:MM" once the reorder engine has touched the day.
    /// Loaded values are kept verbatim even when malformed.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub time: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Spot {
    /// Create a spot with no time assigned yet.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            description: None,
            time: String::new(),
            category: None,
            coordinates: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    /// Parse the stored time, if it is well-formed.
    pub fn visit_time(&self) -> Option<VisitTime> {
        VisitTime::parse_hhmm(&self.time).ok()
    }
}

/// One calendar day of a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    #[serde(with = "day_date")]
    pub date: NaiveDate,

    /// Visit order is the vector order.
    #[serde(default)]
    pub spots: Vec<Spot>,
}

impl Day {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            spots: Vec::new(),
        }
    }

    pub fn with_spots(date: NaiveDate, spots: Vec<Spot>) -> Self {
        Self { date, spots }
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    /// Display times in visit order.
    pub fn times(&self) -> Vec<&str> {
        self.spots.iter().map(|s| s.time.as_str()).collect()
    }
}

/// A multi-day itinerary. Day order is trip order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Itinerary {
    pub days: Vec<Day>,
}

impl Itinerary {
    pub fn new(days: Vec<Day>) -> Self {
        Self { days }
    }

    pub fn day(&self, index: usize) -> Option<&Day> {
        self.days.get(index)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Total number of spots across all days.
    pub fn total_spots(&self) -> usize {
        self.days.iter().map(Day::len).sum()
    }

    /// First and last day dates, if the itinerary has any days.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.days.first()?;
        let last = self.days.last()?;
        Some((first.date, last.date))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Day dates are written as `YYYY-MM-DD`. Reads also accept a full ISO
/// timestamp, keeping the date part before `T`.
pub(crate) mod day_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveDate, String> {
        let date_part = raw.split('T').next().unwrap_or(raw).trim();
        NaiveDate::parse_from_str(date_part, FORMAT)
            .map_err(|e| format!("invalid day date {raw:?}: {e}"))
    }
}
