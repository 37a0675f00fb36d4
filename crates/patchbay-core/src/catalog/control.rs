//! Control descriptors: the user-entered numeric parameters of a node.

/// Unit of a control value, used for display formatting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlUnit {
    /// Time in seconds.
    Seconds,
    /// Linear level, usually 0.0 to 1.0.
    Level,
    /// Pitch offset in semitones.
    Semitones,
    /// Phase in radians.
    Radians,
    /// MIDI note number.
    MidiNote,
    /// Plain number.
    None,
}

impl ControlUnit {
    /// Returns the display suffix for this unit.
    pub const fn suffix(&self) -> &'static str {
        match self {
            ControlUnit::Seconds => " s",
            ControlUnit::Semitones => " st",
            ControlUnit::Radians => " rad",
            ControlUnit::Level | ControlUnit::MidiNote | ControlUnit::None => "",
        }
    }
}

/// Metadata for one control of a node kind.
///
/// Controls are addressed by index within their kind (the order of
/// [`NodeKind::controls()`](super::NodeKind::controls)) or by `name`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlDescriptor {
    /// Stable name, unique within the node kind (e.g. `"value"`, `"tuning"`).
    pub name: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Unit for formatting.
    pub unit: ControlUnit,
    /// Minimum allowed value.
    pub min: f32,
    /// Maximum allowed value.
    pub max: f32,
    /// Value a freshly created node starts with.
    pub default: f32,
}

impl ControlDescriptor {
    /// Creates a descriptor with explicit range.
    pub const fn new(
        name: &'static str,
        label: &'static str,
        unit: ControlUnit,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            label,
            unit,
            min,
            max,
            default,
        }
    }

    /// Envelope stage time, 0 to 10 seconds.
    pub const fn seconds(name: &'static str, label: &'static str, default: f32) -> Self {
        Self::new(name, label, ControlUnit::Seconds, 0.0, 10.0, default)
    }

    /// Linear level, 0 to 1.
    pub const fn level(name: &'static str, label: &'static str, default: f32) -> Self {
        Self::new(name, label, ControlUnit::Level, 0.0, 1.0, default)
    }

    /// Clamps a value into this control's range.
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Returns true if `value` lies within the range (inclusive).
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Formats a value with this control's unit suffix.
    pub fn format_value(&self, value: f32) -> String {
        format!("{value:.3}{}", self.unit.suffix())
    }
}
