/*!
 # Schedule slots

 A slot is the lighting state applied at one half-hour boundary of the day.
 This module holds the slot value type, the color triple shown in swatches
 and the helpers that turn user or file input into channel values.
*/

use std::fmt;

use chrono::NaiveTime;

/// Number of 30-minute slots in a day
pub const SLOTS_PER_DAY: usize = 48;

/// Value used for `aux3` when a row does not provide one
pub const DEFAULT_AUX3: u8 = 250;

/// Value used for `aux2` in slots synthesized for missing rows
pub const PADDING_AUX2: u8 = 100;

/// An RGB color as shown in a swatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Returns the channel value for one of the color fields
    ///
    /// Auxiliary fields are not part of a color and yield `None`.
    pub fn channel(&self, field: Field) -> Option<u8> {
        match field {
            Field::Red => Some(self.red),
            Field::Green => Some(self.green),
            Field::Blue => Some(self.blue),
            _ => None,
        }
    }

    /// Hex notation, e.g. `#ff8000`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// CSS notation, e.g. `rgb(255, 128, 0)`
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.red, self.green, self.blue)
    }
}

/// The six editable columns of a slot, in persisted order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Red,
    Green,
    Blue,
    Aux1,
    Aux2,
    Aux3,
}

impl Field {
    /// All fields in CSV column order
    pub const ALL: [Field; 6] = [
        Field::Red,
        Field::Green,
        Field::Blue,
        Field::Aux1,
        Field::Aux2,
        Field::Aux3,
    ];

    /// Whether the field is one of the three color channels
    pub fn is_color(self) -> bool {
        matches!(self, Field::Red | Field::Green | Field::Blue)
    }

    /// Value used when a persisted row omits this column
    pub fn parse_default(self) -> u8 {
        match self {
            Field::Aux3 => DEFAULT_AUX3,
            _ => 0,
        }
    }

    /// Parses a field name as used by the binaries (`r`, `green`, `v2`, `aux3`, ...)
    pub fn from_name(name: &str) -> Option<Field> {
        match name.trim().to_lowercase().as_str() {
            "r" | "red" => Some(Field::Red),
            "g" | "green" => Some(Field::Green),
            "b" | "blue" => Some(Field::Blue),
            "v1" | "aux1" => Some(Field::Aux1),
            "v2" | "aux2" => Some(Field::Aux2),
            "v3" | "aux3" => Some(Field::Aux3),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Red => write!(f, "r"),
            Field::Green => write!(f, "g"),
            Field::Blue => write!(f, "b"),
            Field::Aux1 => write!(f, "aux1"),
            Field::Aux2 => write!(f, "aux2"),
            Field::Aux3 => write!(f, "aux3"),
        }
    }
}

/// Lighting state for one half-hour slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSlot {
    /// Red channel (0-255)
    pub red: u8,
    /// Green channel (0-255)
    pub green: u8,
    /// Blue channel (0-255)
    pub blue: u8,
    /// First device-specific channel
    pub aux1: u8,
    /// Second device-specific channel
    pub aux2: u8,
    /// Third device-specific channel
    pub aux3: u8,
}

impl ScheduleSlot {
    /// Slot used for indices missing from the persisted data
    pub const PADDING: ScheduleSlot = ScheduleSlot {
        red: 0,
        green: 0,
        blue: 0,
        aux1: 0,
        aux2: PADDING_AUX2,
        aux3: DEFAULT_AUX3,
    };

    pub const fn new(red: u8, green: u8, blue: u8, aux1: u8, aux2: u8, aux3: u8) -> Self {
        Self {
            red,
            green,
            blue,
            aux1,
            aux2,
            aux3,
        }
    }

    pub fn rgb(&self) -> Rgb {
        Rgb::new(self.red, self.green, self.blue)
    }

    pub fn set_rgb(&mut self, rgb: Rgb) {
        self.red = rgb.red;
        self.green = rgb.green;
        self.blue = rgb.blue;
    }

    pub fn get(&self, field: Field) -> u8 {
        match field {
            Field::Red => self.red,
            Field::Green => self.green,
            Field::Blue => self.blue,
            Field::Aux1 => self.aux1,
            Field::Aux2 => self.aux2,
            Field::Aux3 => self.aux3,
        }
    }

    pub fn set(&mut self, field: Field, value: u8) {
        match field {
            Field::Red => self.red = value,
            Field::Green => self.green = value,
            Field::Blue => self.blue = value,
            Field::Aux1 => self.aux1 = value,
            Field::Aux2 => self.aux2 = value,
            Field::Aux3 => self.aux3 = value,
        }
    }

    /// All six values in CSV column order
    pub fn values(&self) -> [u8; 6] {
        [
            self.red, self.green, self.blue, self.aux1, self.aux2, self.aux3,
        ]
    }
}

impl Default for ScheduleSlot {
    fn default() -> Self {
        Self::PADDING
    }
}

/// Reads a leading integer the way the device UI does
///
/// Surrounding whitespace is ignored, an optional sign is accepted and
/// parsing stops at the first non-digit, so `"12abc"` is 12 and `"7.9"` is 7.
/// Returns `None` when no digit starts the token.
pub fn leading_int(token: &str) -> Option<i64> {
    let token = token.trim();
    let (negative, digits) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // Saturate instead of overflowing, anything this large clamps to 255 anyway
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Clamps an integer into the 0-255 channel range
pub fn clamp_channel(value: i64) -> u8 {
    value.clamp(0, 255) as u8
}

/// Turns raw grid input into a channel value
///
/// Non-numeric input resolves to 0, everything else is clamped into 0-255.
pub fn parse_channel(raw: &str) -> u8 {
    clamp_channel(leading_int(raw).unwrap_or(0))
}

/// Wall-clock start of a slot
pub fn slot_start(index: usize) -> NaiveTime {
    let index = index % SLOTS_PER_DAY;
    let hour = (index / 2) as u32;
    let minute = ((index % 2) * 30) as u32;
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// `HH:MM` label of a slot
pub fn time_label(index: usize) -> String {
    slot_start(index).format("%H:%M").to_string()
}
