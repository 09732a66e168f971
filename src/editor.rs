/*!
 # Editor context

 The [`Editor`] owns the schedule being edited and the state of the color
 modal. It is the only place that mutates slots; every mutating call
 reports which slot changed so the caller can refresh exactly that row.
*/

use tracing::{debug, instrument, trace};

use crate::schedule::Schedule;
use crate::slot::{parse_channel, Field, Rgb, ScheduleSlot};
use crate::{Error, Result};

/// State of the single-slot color modal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorModal {
    #[default]
    Closed,
    /// Editing `index`; `preview` holds the uncommitted slider values
    Open { index: usize, preview: Rgb },
}

/// Owns the schedule and the modal session
#[derive(Debug, Default)]
pub struct Editor {
    schedule: Schedule,
    modal: ColorModal,
}

impl Editor {
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            modal: ColorModal::Closed,
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn modal(&self) -> ColorModal {
        self.modal
    }

    /// Replaces the schedule, discarding any open modal session
    pub fn replace(&mut self, schedule: Schedule) {
        if let ColorModal::Open { index, .. } = self.modal {
            debug!("Discarding color modal for slot {} on schedule replace", index);
        }
        self.schedule = schedule;
        self.modal = ColorModal::Closed;
    }

    /// Applies a numeric grid edit
    ///
    /// # Arguments
    ///
    /// * `index` - Slot index (0-47)
    /// * `field` - Column that was edited
    /// * `raw` - Text typed by the user; non-numeric input is 0, values are clamped to 0-255
    ///
    /// Returns the value actually stored.
    #[instrument(skip(self))]
    pub fn update_value(&mut self, index: usize, field: Field, raw: &str) -> Result<u8> {
        let value = parse_channel(raw);
        let slot = self.schedule.get_mut(index)?;
        slot.set(field, value);

        debug!("Slot {} {} set to {}", index, field, value);
        Ok(value)
    }

    /// Opens the color modal for a slot, seeding the preview with its color
    #[instrument(skip(self))]
    pub fn open_color_modal(&mut self, index: usize) -> Result<Rgb> {
        if let ColorModal::Open { index: open, .. } = self.modal {
            return Err(Error::EditInProgress(open));
        }
        let preview = self
            .schedule
            .get(index)
            .ok_or(Error::SlotOutOfRange(index))?
            .rgb();

        self.modal = ColorModal::Open { index, preview };
        debug!("Color modal opened for slot {} with {}", index, preview);
        Ok(preview)
    }

    /// Moves one slider of the open modal
    ///
    /// Only the preview changes. Returns the new preview, or `None` when the
    /// modal is closed or `field` is not a color channel.
    pub fn set_preview(&mut self, field: Field, value: u8) -> Option<Rgb> {
        let ColorModal::Open { preview, .. } = &mut self.modal else {
            trace!("Slider moved while modal is closed");
            return None;
        };

        match field {
            Field::Red => preview.red = value,
            Field::Green => preview.green = value,
            Field::Blue => preview.blue = value,
            _ => return None,
        }
        Some(*preview)
    }

    /// Closes the modal without touching the schedule
    pub fn cancel_color_modal(&mut self) {
        if let ColorModal::Open { index, .. } = self.modal {
            debug!("Color modal for slot {} cancelled", index);
        }
        self.modal = ColorModal::Closed;
    }

    /// Commits the preview into the edited slot and closes the modal
    ///
    /// Returns the index of the updated slot, or `None` if no modal was open.
    #[instrument(skip(self))]
    pub fn apply_color_modal(&mut self) -> Option<usize> {
        let ColorModal::Open { index, preview } = self.modal else {
            return None;
        };
        self.modal = ColorModal::Closed;

        let slot = self.schedule.get_mut(index).ok()?;
        slot.set_rgb(preview);
        debug!("Slot {} color set to {}", index, preview);
        Some(index)
    }

    pub fn slot(&self, index: usize) -> Option<&ScheduleSlot> {
        self.schedule.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> Editor {
        Editor::new(Schedule::parse("# slot 0\n1,2,3,4,5,6"))
    }

    #[test]
    fn grid_edits_clamp() {
        let mut editor = editor();
        assert_eq!(editor.update_value(0, Field::Red, "-5").unwrap(), 0);
        assert_eq!(editor.update_value(0, Field::Aux2, "999").unwrap(), 255);
        assert_eq!(editor.update_value(0, Field::Blue, "blue").unwrap(), 0);
        assert_eq!(
            editor.slot(0),
            Some(&ScheduleSlot::new(0, 2, 0, 4, 255, 6))
        );
    }

    #[test]
    fn grid_edit_out_of_range_index() {
        let mut editor = editor();
        assert!(matches!(
            editor.update_value(48, Field::Red, "1"),
            Err(Error::SlotOutOfRange(48))
        ));
    }

    #[test]
    fn cancel_leaves_slot_untouched() {
        let mut editor = editor();
        let before = *editor.slot(5).unwrap();

        editor.open_color_modal(5).unwrap();
        editor.set_preview(Field::Red, 200);
        editor.set_preview(Field::Green, 10);
        assert_eq!(editor.slot(5), Some(&before));

        editor.cancel_color_modal();
        assert_eq!(editor.modal(), ColorModal::Closed);
        assert_eq!(editor.slot(5), Some(&before));

        // Second cancel is a no-op
        editor.cancel_color_modal();
        assert_eq!(editor.modal(), ColorModal::Closed);
    }

    #[test]
    fn apply_commits_preview() {
        let mut editor = editor();
        assert_eq!(editor.open_color_modal(5).unwrap(), Rgb::new(0, 0, 0));
        editor.set_preview(Field::Red, 200);
        editor.set_preview(Field::Green, 100);
        assert_eq!(editor.set_preview(Field::Blue, 50), Some(Rgb::new(200, 100, 50)));

        assert_eq!(editor.apply_color_modal(), Some(5));
        let slot = editor.slot(5).unwrap();
        assert_eq!(slot.rgb(), Rgb::new(200, 100, 50));
        // Aux channels are not part of the modal
        assert_eq!((slot.aux1, slot.aux2, slot.aux3), (0, 100, 250));
        assert_eq!(editor.modal(), ColorModal::Closed);
    }

    #[test]
    fn modal_transitions() {
        let mut editor = editor();
        assert_eq!(editor.apply_color_modal(), None);
        assert_eq!(editor.set_preview(Field::Red, 1), None);
        assert!(matches!(
            editor.open_color_modal(48),
            Err(Error::SlotOutOfRange(48))
        ));

        editor.open_color_modal(0).unwrap();
        assert!(matches!(
            editor.open_color_modal(1),
            Err(Error::EditInProgress(0))
        ));
        assert_eq!(editor.set_preview(Field::Aux1, 9), None);
        assert_eq!(
            editor.modal(),
            ColorModal::Open {
                index: 0,
                preview: Rgb::new(1, 2, 3)
            }
        );
    }

    #[test]
    fn replace_discards_modal() {
        let mut editor = editor();
        editor.open_color_modal(0).unwrap();
        editor.set_preview(Field::Red, 99);
        editor.replace(Schedule::demo());

        assert_eq!(editor.modal(), ColorModal::Closed);
        assert_eq!(editor.apply_color_modal(), None);
        assert_eq!(editor.schedule(), &Schedule::demo());
    }
}
