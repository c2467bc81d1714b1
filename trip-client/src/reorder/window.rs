//! Daily visiting window.

use crate::domain::{TimeError, VisitTime};

/// Default first visit of the day: 08:00.
const DEFAULT_START_MINS: u32 = 8 * 60;

/// Default window length: 08:00 to 20:00.
const DEFAULT_LENGTH_MINS: u32 = 12 * 60;

/// The span of the day over which a day's spots are spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: VisitTime,
    length_mins: u32,
}

impl TimeWindow {
    /// Create a window starting at `start` and lasting `length_mins`.
    ///
    /// The window must end on the same day it starts.
    pub fn new(start: VisitTime, length_mins: u32) -> Result<Self, TimeError> {
        start
            .checked_add_minutes(length_mins)
            .ok_or_else(|| TimeError::new("window must end before midnight"))?;
        Ok(Self { start, length_mins })
    }

    pub fn start(&self) -> VisitTime {
        self.start
    }

    pub fn length_mins(&self) -> u32 {
        self.length_mins
    }

    /// Minutes between consecutive visits when `count` spots share the window.
    ///
    /// Uses floor division, so the last visit may land before the window end.
    /// Returns `None` when there is no gap to speak of (fewer than two spots).
    pub fn gap_mins(&self, count: usize) -> Option<u32> {
        if count < 2 {
            return None;
        }
        let steps = u32::try_from(count - 1).unwrap_or(u32::MAX);
        Some(self.length_mins / steps)
    }

    /// Evenly spaced visit times for `count` spots.
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_client::reorder::TimeWindow;
    ///
    /// let times: Vec<String> = TimeWindow::default()
    ///     .slots(3)
    ///     .iter()
    ///     .map(|t| t.to_string())
    ///     .collect();
    /// assert_eq!(times, ["08:00", "14:00", "20:00"]);
    /// ```
    pub fn slots(&self, count: usize) -> Vec<VisitTime> {
        match self.gap_mins(count) {
            None => std::iter::repeat_n(self.start, count).collect(),
            Some(gap) => (0..count)
                .map(|i| {
                    // i * gap <= length_mins, and the window ends before midnight
                    let offset = (i as u32).saturating_mul(gap).min(self.length_mins);
                    self.start + offset
                })
                .collect(),
        }
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            start: VisitTime::from_minutes(DEFAULT_START_MINS).expect("08:00 is a valid time"),
            length_mins: DEFAULT_LENGTH_MINS,
        }
    }
}
