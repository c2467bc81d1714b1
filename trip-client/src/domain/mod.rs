//! Domain types for trips and itineraries.
//!
//! The itinerary shapes follow the backend's stored JSON document so they
//! round-trip through persistence untouched. Validated values (`VisitTime`,
//! `ContentLink`) enforce their invariants at construction time.

mod course;
mod error;
mod itinerary;
mod link;
mod time;

pub use course::Course;
pub use error::{DomainError, IndexRole};
pub(crate) use itinerary::day_date;
pub use itinerary::{Coordinates, Day, Itinerary, Spot};
pub use link::{ContentLink, ContentSource, InvalidLink, classify};
pub use time::{TimeError, VisitTime};
