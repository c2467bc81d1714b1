//! Client for the AI service: place extraction from travel content and
//! course generation from preferences.

mod client;
mod types;

pub use client::{AiClient, AiConfig, DEFAULT_AI_URL};
pub use types::{
    Budget, CoursePreferences, ExtractedSchedule, ExtractedSpot, GeneratedCourse, PreferenceError,
};
