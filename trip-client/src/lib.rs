//! Travel itinerary client.
//!
//! Turns travel videos and blog posts into day-by-day itineraries, lets the
//! user reorder and prune the spots of a saved trip, and talks to the trip
//! backend and its community board.
//!
//! The core is [`reorder`]: moving or deleting a spot re-times every day the
//! edit touched so visits stay evenly spread over the day.

pub mod ai;
pub mod api;
pub mod cache;
pub mod config;
pub mod domain;
pub mod reorder;
pub mod session;
