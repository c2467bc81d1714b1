//! AI service request and response bodies.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{ContentLink, Course, Day, Itinerary, Spot, day_date};
use crate::reorder::{TimeWindow, retime_all};

/// A place mentioned in travel content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSpot {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Kind of place: sight, restaurant, cafe...
    #[serde(default)]
    pub category: Option<String>,
    /// Suggested visit length in minutes.
    #[serde(default)]
    pub time_required: Option<u32>,
}

/// What the AI service found in a video or blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSchedule {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub spots: Vec<ExtractedSpot>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub recommended_days: u32,
    #[serde(default)]
    pub source_url: Option<String>,
}

impl ExtractedSchedule {
    /// Name for a course built from this schedule.
    pub fn course_name(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => format!("{} trip", self.region.trim()),
        }
    }

    /// Turn the schedule into a one-day course on `date`.
    ///
    /// Spots keep their extracted order and are spread over the default
    /// daily window. Addresses are unknown at this point and left empty.
    pub fn into_course(self, link: &ContentLink, date: NaiveDate) -> Course {
        let name = self.course_name();
        let spots = self
            .spots
            .into_iter()
            .map(|extracted| {
                let mut spot = Spot::new(extracted.name, "")
                    .with_description(extracted.description.unwrap_or_default());
                spot.category = extracted.category;
                spot
            })
            .collect();

        let mut days = Itinerary::new(vec![Day::with_spots(date, spots)]);
        retime_all(&mut days, &TimeWindow::default());

        let mut course = Course::new(name, days);
        course.location = Some(link.as_str().to_string());
        if !self.region.trim().is_empty() {
            course.region = Some(self.region.trim().to_string());
        }
        course
    }
}

/// Spending level for a generated course.
///
/// Sent to the generator as the Korean level labels it was trained on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Budget {
    #[serde(rename = "상")]
    High,
    #[serde(rename = "중상")]
    UpperMiddle,
    #[default]
    #[serde(rename = "중")]
    Medium,
    #[serde(rename = "중하")]
    LowerMiddle,
    #[serde(rename = "하")]
    Low,
}

impl Budget {
    pub const ALL: [Budget; 5] = [
        Budget::High,
        Budget::UpperMiddle,
        Budget::Medium,
        Budget::LowerMiddle,
        Budget::Low,
    ];

    /// The level label the generator expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Budget::High => "상",
            Budget::UpperMiddle => "중상",
            Budget::Medium => "중",
            Budget::LowerMiddle => "중하",
            Budget::Low => "하",
        }
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Budget {
    type Err = PreferenceError;

    /// Accepts the level labels and English names (`high`, `upper-middle`,
    /// `medium`, `lower-middle`, `low`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = s.trim();
        if let Some(budget) = Budget::ALL.into_iter().find(|b| b.as_str() == level) {
            return Ok(budget);
        }
        match level.to_ascii_lowercase().replace('_', "-").as_str() {
            "high" => Ok(Budget::High),
            "upper-middle" => Ok(Budget::UpperMiddle),
            "medium" => Ok(Budget::Medium),
            "lower-middle" => Ok(Budget::LowerMiddle),
            "low" => Ok(Budget::Low),
            _ => Err(PreferenceError::UnknownBudget(s.to_string())),
        }
    }
}

/// Why a set of preferences cannot be sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreferenceError {
    #[error("a region is required")]
    MissingRegion,

    #[error("choose at least one area")]
    NoAreas,

    #[error("trip ends ({end}) before it starts ({start})")]
    DatesOutOfOrder { start: NaiveDate, end: NaiveDate },

    #[error("unknown budget {0:?} (expected high, upper-middle, medium, lower-middle or low)")]
    UnknownBudget(String),
}

/// Input for course generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePreferences {
    region: String,
    areas: Vec<String>,
    #[serde(serialize_with = "day_date::serialize")]
    start_date: NaiveDate,
    #[serde(serialize_with = "day_date::serialize")]
    end_date: NaiveDate,
    age_groups: Vec<String>,
    budget: Budget,
}

impl CoursePreferences {
    /// Validate the required preferences. Budget defaults to medium and
    /// age groups to none.
    pub fn new(
        region: impl Into<String>,
        areas: Vec<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, PreferenceError> {
        let region = region.into().trim().to_string();
        if region.is_empty() {
            return Err(PreferenceError::MissingRegion);
        }
        let areas: Vec<String> = areas
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        if areas.is_empty() {
            return Err(PreferenceError::NoAreas);
        }
        if end_date < start_date {
            return Err(PreferenceError::DatesOutOfOrder {
                start: start_date,
                end: end_date,
            });
        }

        Ok(Self {
            region,
            areas,
            start_date,
            end_date,
            age_groups: Vec::new(),
            budget: Budget::default(),
        })
    }

    pub fn with_age_groups(mut self, age_groups: Vec<String>) -> Self {
        self.age_groups = age_groups;
        self
    }

    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }
}

/// A course proposed by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratedCourse {
    #[serde(default)]
    pub days: Itinerary,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl GeneratedCourse {
    /// Wrap the proposal in an unsaved course for `region`.
    pub fn into_course(self, region: &str) -> Course {
        let mut course = Course::new(format!("{region} trip"), self.days);
        course.region = Some(region.to_string());
        course.tags = self.tags;
        course
    }
}
