//! In-memory itinerary state for an editing view.

use crate::domain::{DomainError, Itinerary};

use super::engine::{delete_spot_in_window, move_spot_in_window};
use super::window::TimeWindow;

/// A position in an itinerary: day index and spot index within the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpotPosition {
    pub day: usize,
    pub index: usize,
}

impl SpotPosition {
    pub fn new(day: usize, index: usize) -> Self {
        Self { day, index }
    }
}

/// Holds the itinerary a view is editing.
///
/// Edits go through the reorder engine; the held itinerary is replaced only
/// when an edit succeeds. Saving is the caller's job: take the itinerary
/// with [`ItineraryEditor::itinerary`], persist it, then call
/// [`ItineraryEditor::mark_saved`].
#[derive(Debug, Clone)]
pub struct ItineraryEditor {
    itinerary: Itinerary,
    window: TimeWindow,
    dirty: bool,
}

impl ItineraryEditor {
    pub fn new(itinerary: Itinerary) -> Self {
        Self {
            itinerary,
            window: TimeWindow::default(),
            dirty: false,
        }
    }

    /// Use a different daily window for re-timing.
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn itinerary(&self) -> &Itinerary {
        &self.itinerary
    }

    pub fn into_itinerary(self) -> Itinerary {
        self.itinerary
    }

    /// True when there are edits not yet marked saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Discard local state in favour of a freshly loaded itinerary.
    pub fn reload(&mut self, itinerary: Itinerary) {
        self.itinerary = itinerary;
        self.dirty = false;
    }

    /// Move a spot from `from` to `to`.
    pub fn move_spot(&mut self, from: SpotPosition, to: SpotPosition) -> Result<(), DomainError> {
        let next = move_spot_in_window(
            &self.itinerary,
            &self.window,
            from.day,
            from.index,
            to.day,
            to.index,
        )?;
        self.commit(next);
        Ok(())
    }

    /// Apply the outcome of a drag gesture.
    ///
    /// A drop with no target (cancelled, or released outside any day) leaves
    /// the itinerary alone and returns `Ok(false)`.
    pub fn apply_drop(
        &mut self,
        from: SpotPosition,
        to: Option<SpotPosition>,
    ) -> Result<bool, DomainError> {
        match to {
            None => Ok(false),
            Some(to) => self.move_spot(from, to).map(|()| true),
        }
    }

    /// Delete a spot. Callers confirm with the user first.
    pub fn delete_spot(&mut self, at: SpotPosition) -> Result<(), DomainError> {
        let next = delete_spot_in_window(&self.itinerary, &self.window, at.day, at.index)?;
        self.commit(next);
        Ok(())
    }

    fn commit(&mut self, next: Itinerary) {
        self.itinerary = next;
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Day, Spot};
    use chrono::NaiveDate;

    fn editor() -> ItineraryEditor {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let day = Day::with_spots(
            date,
            vec![
                Spot::new("a", "").with_time("09:00"),
                Spot::new("b", "").with_time("15:00"),
            ],
        );
        ItineraryEditor::new(Itinerary::new(vec![day]))
    }

    #[test]
    fn successful_edit_marks_dirty() {
        let mut editor = editor();
        assert!(!editor.is_dirty());

        editor
            .move_spot(SpotPosition::new(0, 1), SpotPosition::new(0, 0))
            .unwrap();
        assert!(editor.is_dirty());
        assert_eq!(editor.itinerary().days[0].spots[0].name, "b");
        assert_eq!(editor.itinerary().days[0].times(), ["08:00", "20:00"]);

        editor.mark_saved();
        assert!(!editor.is_dirty());
    }

    #[test]
    fn failed_edit_keeps_state() {
        let mut editor = editor();
        let before = editor.itinerary().clone();

        let err = editor.delete_spot(SpotPosition::new(0, 2));
        assert!(err.is_err());
        assert_eq!(editor.itinerary(), &before);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn cancelled_drop_is_ignored() {
        let mut editor = editor();
        let applied = editor.apply_drop(SpotPosition::new(0, 0), None).unwrap();
        assert!(!applied);
        assert!(!editor.is_dirty());
        assert_eq!(editor.itinerary().days[0].times(), ["09:00", "15:00"]);
    }

    #[test]
    fn completed_drop_moves() {
        let mut editor = editor();
        let applied = editor
            .apply_drop(SpotPosition::new(0, 0), Some(SpotPosition::new(0, 1)))
            .unwrap();
        assert!(applied);
        assert_eq!(editor.itinerary().days[0].spots[1].name, "a");
    }

    #[test]
    fn reload_replaces_and_cleans() {
        let mut editor = editor();
        editor.delete_spot(SpotPosition::new(0, 0)).unwrap();
        assert!(editor.is_dirty());

        editor.reload(Itinerary::default());
        assert!(editor.itinerary().is_empty());
        assert!(!editor.is_dirty());
    }
}
