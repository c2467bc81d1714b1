//! Saved trips.
//!
//! A `Course` is the document the backend stores per user: a named
//! itinerary plus the link it was extracted from and free-form tags.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::link::{ContentSource, classify};
use super::{Day, Itinerary};

/// A saved trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Backend-assigned id; `None` until first saved.
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Link to the content the course was extracted from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub days: Itinerary,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl Course {
    /// Create an unsaved course.
    pub fn new(name: impl Into<String>, days: Itinerary) -> Self {
        Self {
            id: None,
            name: name.into(),
            region: None,
            location: None,
            tags: Vec::new(),
            days,
            created_at: None,
        }
    }

    /// Short region label taken from the first spot's address.
    ///
    /// Korean addresses lead with province and city, so the first two
    /// words are enough to say where the trip is.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use trip_client::domain::{Course, Day, Itinerary, Spot};
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    /// let day = Day::with_spots(date, vec![Spot::new("Seongsan", "Jeju Seogwipo-si Seongsan-eup 1")]);
    /// let course = Course::new("Jeju", Itinerary::new(vec![day]));
    /// assert_eq!(course.region_label().as_deref(), Some("Jeju Seogwipo-si"));
    /// ```
    pub fn region_label(&self) -> Option<String> {
        let first = self.days.days.first()?.spots.first()?;
        let mut parts = first.address.split_whitespace();
        let head = parts.next()?;
        Some(match parts.next() {
            Some(second) => format!("{head} {second}"),
            None => head.to_string(),
        })
    }

    /// First and last trip dates.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.days.date_range()
    }

    /// Platform of the source link, if the course came from one.
    pub fn source(&self) -> Option<ContentSource> {
        self.location.as_deref().and_then(classify)
    }

    /// Courses extracted from a content link carry no reliable place
    /// addresses, so views skip the map for them.
    pub fn hides_map(&self) -> bool {
        self.source().is_some()
    }

    pub fn days(&self) -> &[Day] {
        &self.days.days
    }
}
