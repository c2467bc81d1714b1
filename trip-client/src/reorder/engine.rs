//! Spot relocation and deletion with time redistribution.
//!
//! Visit order within a day is the position in the day's spot list. Display
//! times are derived from position: whenever a day changes shape, every
//! time in it is regenerated by spreading the spots evenly across the
//! daily window. Stored times are never read back to decide order.

use tracing::trace;

use crate::domain::{Day, DomainError, IndexRole, Itinerary};

use super::window::TimeWindow;

/// Move a spot to a new position, possibly on another day.
///
/// Uses the default 08:00–20:00 window. See [`move_spot_in_window`].
pub fn move_spot(
    itinerary: &Itinerary,
    source_day: usize,
    source_index: usize,
    dest_day: usize,
    dest_index: usize,
) -> Result<Itinerary, DomainError> {
    move_spot_in_window(
        itinerary,
        &TimeWindow::default(),
        source_day,
        source_index,
        dest_day,
        dest_index,
    )
}

/// Move a spot to a new position and re-time the affected days.
///
/// The spot at `(source_day, source_index)` is removed and inserted at
/// `dest_index` of `dest_day`, shifting later spots. `dest_index` may equal
/// the destination day's length, which appends; within a single day that
/// means the day's last position.
///
/// The source day, and the destination day when different, get fresh
/// times. Other days are returned as they were. On error the input is left
/// untouched.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use trip_client::domain::{Day, Itinerary, Spot};
/// use trip_client::reorder::move_spot;
///
/// let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
/// let day = Day::with_spots(date, vec![Spot::new("a", ""), Spot::new("b", ""), Spot::new("c", "")]);
/// let itinerary = Itinerary::new(vec![day]);
///
/// let moved = move_spot(&itinerary, 0, 0, 0, 2).unwrap();
/// let names: Vec<_> = moved.days[0].spots.iter().map(|s| s.name.as_str()).collect();
/// assert_eq!(names, ["b", "c", "a"]);
/// assert_eq!(moved.days[0].times(), ["08:00", "14:00", "20:00"]);
/// ```
pub fn move_spot_in_window(
    itinerary: &Itinerary,
    window: &TimeWindow,
    source_day: usize,
    source_index: usize,
    dest_day: usize,
    dest_index: usize,
) -> Result<Itinerary, DomainError> {
    let day_count = itinerary.len();

    let source = itinerary
        .day(source_day)
        .ok_or_else(|| DomainError::invalid_index(IndexRole::SourceDay, source_day, day_count))?;
    if source_index >= source.len() {
        return Err(DomainError::invalid_index(
            IndexRole::SourceSpot,
            source_index,
            source.len(),
        ));
    }

    let dest = itinerary
        .day(dest_day)
        .ok_or_else(|| DomainError::invalid_index(IndexRole::DestDay, dest_day, day_count))?;
    if dest_index > dest.len() {
        return Err(DomainError::invalid_index(
            IndexRole::DestSpot,
            dest_index,
            dest.len() + 1,
        ));
    }

    let mut days = itinerary.days.clone();
    let spot = days[source_day].spots.remove(source_index);
    let target = &mut days[dest_day].spots;
    // Same-day removal shortens the list, so `len` lands at the end.
    let insert_at = dest_index.min(target.len());
    target.insert(insert_at, spot);

    redistribute_times(&mut days[source_day], window);
    if dest_day != source_day {
        redistribute_times(&mut days[dest_day], window);
    }

    trace!(
        source_day,
        source_index,
        dest_day,
        dest_index,
        "moved spot"
    );

    Ok(Itinerary::new(days))
}

/// Remove a spot and re-time the rest of its day.
///
/// Uses the default 08:00–20:00 window. See [`delete_spot_in_window`].
pub fn delete_spot(
    itinerary: &Itinerary,
    day: usize,
    spot: usize,
) -> Result<Itinerary, DomainError> {
    delete_spot_in_window(itinerary, &TimeWindow::default(), day, spot)
}

/// Remove the spot at `(day, spot)` and re-time the remaining spots of that
/// day. Other days are untouched.
pub fn delete_spot_in_window(
    itinerary: &Itinerary,
    window: &TimeWindow,
    day: usize,
    spot: usize,
) -> Result<Itinerary, DomainError> {
    let target = itinerary
        .day(day)
        .ok_or_else(|| DomainError::invalid_index(IndexRole::Day, day, itinerary.len()))?;
    if spot >= target.len() {
        return Err(DomainError::invalid_index(IndexRole::Spot, spot, target.len()));
    }

    let mut days = itinerary.days.clone();
    days[day].spots.remove(spot);
    redistribute_times(&mut days[day], window);

    trace!(day, spot, remaining = days[day].len(), "deleted spot");

    Ok(Itinerary::new(days))
}

/// Assign evenly spaced times to every spot of a day, in list order.
///
/// An empty day is left as is.
pub fn redistribute_times(day: &mut Day, window: &TimeWindow) {
    if day.spots.is_empty() {
        return;
    }
    let slots = window.slots(day.spots.len());
    for (spot, time) in day.spots.iter_mut().zip(slots) {
        spot.time = time.to_string();
    }
}

/// Re-time every day of an itinerary.
///
/// Used for itineraries built from sources whose times are missing or not
/// trusted, such as extraction results.
pub fn retime_all(itinerary: &mut Itinerary, window: &TimeWindow) {
    for day in &mut itinerary.days {
        redistribute_times(day, window);
    }
}
