/*!
 # Lighting schemas

 This module provides the 48-slot schedule and its CSV persistence format,
 allowing a schema to be read from and written back to the controller.

 Every data line holds `r,g,b,aux1,aux2,aux3`. Lines starting with `#` are
 comments. Parsing never fails: bad tokens fall back to per-column defaults.
*/

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use tracing::{debug, instrument, trace};

use crate::slot::{clamp_channel, leading_int, time_label, Field, ScheduleSlot, SLOTS_PER_DAY};
use crate::{Error, Result};

/// A named, persisted 48-slot lighting program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    slots: Vec<ScheduleSlot>,
}

/// Parses the data rows of a schema file without padding
///
/// The result holds at most 48 rows and may be shorter when the file is.
#[instrument(skip(text), fields(len = text.len()))]
pub fn parse_rows(text: &str) -> Vec<ScheduleSlot> {
    let rows: Vec<ScheduleSlot> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .take(SLOTS_PER_DAY)
        .map(parse_line)
        .collect();

    debug!("Parsed {} schema rows", rows.len());
    rows
}

fn parse_line(line: &str) -> ScheduleSlot {
    let mut tokens = line.split(',');
    let mut slot = ScheduleSlot::new(0, 0, 0, 0, 0, 0);

    for field in Field::ALL {
        let value = tokens
            .next()
            .and_then(leading_int)
            .map(clamp_channel)
            .unwrap_or_else(|| field.parse_default());
        slot.set(field, value);
    }

    trace!("Row {:?} parsed to {:?}", line, slot);
    slot
}

impl Schedule {
    /// Builds a schedule from rows, padding missing trailing slots
    pub fn from_rows(mut slots: Vec<ScheduleSlot>) -> Self {
        slots.truncate(SLOTS_PER_DAY);
        slots.resize(SLOTS_PER_DAY, ScheduleSlot::PADDING);
        Self { slots }
    }

    /// Parses schema text into a full 48-slot schedule
    pub fn parse(text: &str) -> Self {
        Self::from_rows(parse_rows(text))
    }

    /// Serializes the schedule, one `r,g,b,aux1,aux2,aux3` line per slot
    pub fn to_csv(&self) -> String {
        self.slots
            .iter()
            .map(|slot| {
                let [r, g, b, aux1, aux2, aux3] = slot.values();
                format!("{r},{g},{b},{aux1},{aux2},{aux3}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Deterministic schedule used when the controller cannot be reached
    ///
    /// Night blue until 06:00, a two hour sunrise ramp, warm daylight until
    /// 18:00, a four hour sunset ramp and night blue again from 22:00.
    /// `aux2` follows a sine over the day.
    pub fn demo() -> Self {
        let slots = (0..SLOTS_PER_DAY)
            .map(|i| {
                let hour = i as f64 / 2.0;
                let (red, green, blue) = if !(6.0..22.0).contains(&hour) {
                    (25.0, 25.0, 112.0)
                } else if hour < 8.0 {
                    let t = (hour - 6.0) / 2.0;
                    (25.0 + 230.0 * t, 25.0 + 150.0 * t, 112.0 + 50.0 * t)
                } else if hour < 18.0 {
                    (255.0, 240.0, 220.0)
                } else {
                    let t = (hour - 18.0) / 4.0;
                    (255.0 - 230.0 * t, 240.0 - 215.0 * t, 220.0 - 108.0 * t)
                };
                let aux2 = 100.0 + 155.0 * (std::f64::consts::PI * hour / 12.0).sin();

                ScheduleSlot::new(
                    round_channel(red),
                    round_channel(green),
                    round_channel(blue),
                    0,
                    round_channel(aux2),
                    250,
                )
            })
            .collect();

        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ScheduleSlot> {
        self.slots.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Result<&mut ScheduleSlot> {
        self.slots.get_mut(index).ok_or(Error::SlotOutOfRange(index))
    }

    pub fn slots(&self) -> &[ScheduleSlot] {
        &self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduleSlot> {
        self.slots.iter()
    }

    /// Index of the slot whose half hour contains `time`
    pub fn slot_index_for(time: NaiveTime) -> usize {
        time.hour() as usize * 2 + usize::from(time.minute() >= 30)
    }

    /// Slot in effect at `time`
    pub fn slot_at(&self, time: NaiveTime) -> &ScheduleSlot {
        &self.slots[Self::slot_index_for(time)]
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::from_rows(Vec::new())
    }
}

impl Index<usize> for Schedule {
    type Output = ScheduleSlot;

    fn index(&self, index: usize) -> &ScheduleSlot {
        &self.slots[index]
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.slots.iter().enumerate() {
            let [r, g, b, aux1, aux2, aux3] = slot.values();
            writeln!(
                f,
                "{} {:>3} {:>3} {:>3} {:>3} {:>3} {:>3}",
                time_label(i),
                r,
                g,
                b,
                aux1,
                aux2,
                aux3
            )?;
        }
        Ok(())
    }
}

fn round_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// File-like key of a stored schema, e.g. `schema_01.csv`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaKey(String);

impl SchemaKey {
    const MAX_LEN: usize = 64;

    /// Key of one of the numbered schemas shipped with the controller
    pub fn numbered(number: u8) -> Self {
        Self(format!("schema_{number:02}.csv"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SchemaKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let valid = !s.is_empty()
            && s.len() <= Self::MAX_LEN
            && !s.starts_with('.')
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(Error::InvalidSchemaKey(s.to_string()))
        }
    }
}

impl fmt::Display for SchemaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
