/*!
 # Schedule grid

 Presentation side of the editor. A view observes the schedule through the
 [`ScheduleView`] trait: it is asked for one full render after a load and
 afterwards only for targeted refreshes of single rows.
*/

use std::fmt;

use tracing::trace;

use crate::schedule::Schedule;
use crate::slot::{time_label, Rgb, ScheduleSlot};

/// What one grid row displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    pub index: usize,
    /// `HH:MM` start of the slot
    pub label: String,
    /// Color of the clickable swatch
    pub swatch: Rgb,
    /// The six numeric inputs in column order
    pub values: [u8; 6],
}

impl GridRow {
    pub fn new(index: usize, slot: &ScheduleSlot) -> Self {
        Self {
            index,
            label: time_label(index),
            swatch: slot.rgb(),
            values: slot.values(),
        }
    }
}

impl fmt::Display for GridRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, aux1, aux2, aux3] = self.values;
        write!(
            f,
            "{:>2} {} [{}] {:>3} {:>3} {:>3} | {:>3} {:>3} {:>3}",
            self.index,
            self.label,
            self.swatch.to_hex(),
            r,
            g,
            b,
            aux1,
            aux2,
            aux3
        )
    }
}

/// Builds the rows for every slot of a schedule
pub fn rows(schedule: &Schedule) -> Vec<GridRow> {
    schedule
        .iter()
        .enumerate()
        .map(|(i, slot)| GridRow::new(i, slot))
        .collect()
}

/// Observer of the schedule held by the editor
///
/// Modal callbacks have empty defaults so a plain grid only has to
/// implement the grid methods.
pub trait ScheduleView {
    /// Redraw all rows, called after a schedule has been loaded
    fn render(&mut self, schedule: &Schedule);

    /// Redraw a single row after its slot changed
    fn refresh_row(&mut self, index: usize, slot: &ScheduleSlot);

    /// Show the loading indicator with `message`, or hide it on `None`
    fn set_loading(&mut self, _message: Option<&str>) {}

    /// The color modal opened for `index` with `preview` as its start color
    fn modal_opened(&mut self, _index: usize, _preview: Rgb) {}

    /// The live preview of the open modal changed
    fn modal_preview(&mut self, _preview: Rgb) {}

    /// The color modal closed
    fn modal_closed(&mut self) {}
}

/// Text rendering of the grid used by the command line tools
#[derive(Debug, Default)]
pub struct TextGrid {
    rows: Vec<GridRow>,
    modal: Option<(usize, Rgb)>,
    loading: Option<String>,
    /// Number of full renders
    pub renders: usize,
    /// Number of single row refreshes
    pub refreshes: usize,
}

impl TextGrid {
    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&GridRow> {
        self.rows.get(index)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    /// Slot index and preview color of the open modal
    pub fn modal(&self) -> Option<(usize, Rgb)> {
        self.modal
    }
}

impl ScheduleView for TextGrid {
    fn render(&mut self, schedule: &Schedule) {
        self.rows = rows(schedule);
        self.renders += 1;
    }

    fn refresh_row(&mut self, index: usize, slot: &ScheduleSlot) {
        trace!("Refreshing grid row {}", index);
        if let Some(row) = self.rows.get_mut(index) {
            *row = GridRow::new(index, slot);
            self.refreshes += 1;
        }
    }

    fn set_loading(&mut self, message: Option<&str>) {
        self.loading = message.map(str::to_string);
    }

    fn modal_opened(&mut self, index: usize, preview: Rgb) {
        self.modal = Some((index, preview));
    }

    fn modal_preview(&mut self, preview: Rgb) {
        if let Some((_, current)) = self.modal.as_mut() {
            *current = preview;
        }
    }

    fn modal_closed(&mut self) {
        self.modal = None;
    }
}

impl fmt::Display for TextGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = &self.loading {
            return writeln!(f, "{message}");
        }
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        if let Some((index, preview)) = self.modal {
            writeln!(f, "editing {} -> {}", time_label(index), preview)?;
        }
        Ok(())
    }
}
