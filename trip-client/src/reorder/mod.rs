//! Itinerary reorder engine.
//!
//! Moves and deletes spots in a multi-day itinerary and regenerates the
//! display times of every day the edit touched, spreading visits evenly
//! across a fixed daily window (08:00–20:00 by default).
//!
//! The engine is pure: it takes an itinerary by reference and returns a new
//! one. [`ItineraryEditor`] is the thin stateful wrapper a view holds.

mod editor;
mod engine;
mod window;

pub use editor::{ItineraryEditor, SpotPosition};
pub use engine::{
    delete_spot, delete_spot_in_window, move_spot, move_spot_in_window, redistribute_times,
    retime_all,
};
pub use window::TimeWindow;
