//! The closed set of node kinds and their port/control schemas.

use core::f32::consts::PI;
use core::fmt;

use super::control::{ControlDescriptor, ControlUnit};
use super::port::{Direction, PortSpec};
use crate::socket::SocketType;

/// Kind of a synthesizer building block.
///
/// Each kind carries a fixed schema (controls, input ports, output ports) and a
/// pure [`resolve`](NodeKind::resolve) function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    /// Attack time source.
    Attack,
    /// Decay time source.
    Decay,
    /// Sustain level source.
    Sustain,
    /// Release time source.
    Release,
    /// Envelope generator assembled from the four stage inputs.
    Adsr,
    /// Voltage-controlled oscillator.
    Vco,
    /// Voltage-controlled amplifier.
    Vca,
    /// Noise source.
    Noise,
    /// Three-input audio mixer.
    Mixer,
    /// Single-voice keyboard trigger.
    MonophonicKeyboard,
}

const NO_PORTS: &[PortSpec] = &[];
const NO_CONTROLS: &[ControlDescriptor] = &[];

const STAGE_OUTPUTS: &[PortSpec] = &[PortSpec::output("value", "Number", SocketType::Control)];

const ATTACK_CONTROLS: &[ControlDescriptor] = &[ControlDescriptor::seconds("value", "Attack", 0.1)];
const DECAY_CONTROLS: &[ControlDescriptor] = &[ControlDescriptor::seconds("value", "Decay", 0.2)];
const SUSTAIN_CONTROLS: &[ControlDescriptor] = &[ControlDescriptor::level("value", "Sustain", 0.7)];
const RELEASE_CONTROLS: &[ControlDescriptor] =
    &[ControlDescriptor::seconds("value", "Release", 0.3)];

const ADSR_INPUTS: &[PortSpec] = &[
    PortSpec::required("attack", "Attack", SocketType::Control),
    PortSpec::required("decay", "Decay", SocketType::Control),
    PortSpec::required("sustain", "Sustain", SocketType::Control),
    PortSpec::required("release", "Release", SocketType::Control),
    PortSpec::optional("alpha", "Alpha", SocketType::Control),
    PortSpec::optional("gate", "Gate", SocketType::Control),
];
const ADSR_OUTPUTS: &[PortSpec] = &[PortSpec::output(
    "envelope",
    "Envelope",
    SocketType::Modulation,
)];

const VCO_CONTROLS: &[ControlDescriptor] = &[
    ControlDescriptor::new("tuning", "Tuning", ControlUnit::Semitones, -24.0, 24.0, 0.0),
    ControlDescriptor::new("mod_depth", "Mod Depth", ControlUnit::Semitones, -96.0, 96.0, 0.0),
    ControlDescriptor::new("initial_phase", "Phase", ControlUnit::Radians, -PI, PI, 0.0),
];
const VCO_INPUTS: &[PortSpec] = &[
    PortSpec::required("pitch", "Pitch", SocketType::Control),
    PortSpec::optional("mod", "Mod", SocketType::Modulation),
];
const VCO_OUTPUTS: &[PortSpec] = &[PortSpec::output("audio", "Audio", SocketType::Audio)];

const VCA_CONTROLS: &[ControlDescriptor] = &[ControlDescriptor::level("gain", "Gain", 1.0)];
const VCA_INPUTS: &[PortSpec] = &[
    PortSpec::required("audio", "Audio", SocketType::Audio),
    PortSpec::required("cv", "CV", SocketType::Modulation),
];
const VCA_OUTPUTS: &[PortSpec] = &[PortSpec::output("audio", "Audio", SocketType::Audio)];

const NOISE_CONTROLS: &[ControlDescriptor] =
    &[ControlDescriptor::level("amplitude", "Amplitude", 1.0)];
const NOISE_OUTPUTS: &[PortSpec] = &[PortSpec::output("noise", "Noise", SocketType::Noise)];

const MIXER_CONTROLS: &[ControlDescriptor] = &[
    ControlDescriptor::level("level1", "Osc 1", 1.0),
    ControlDescriptor::level("level2", "Osc 2", 1.0),
    ControlDescriptor::level("level3", "Noise", 0.25),
];
const MIXER_INPUTS: &[PortSpec] = &[
    PortSpec::optional("osc1", "Osc 1", SocketType::Audio),
    PortSpec::optional("osc2", "Osc 2", SocketType::Audio),
    PortSpec::optional("noise", "Noise", SocketType::Noise),
];
const MIXER_OUTPUTS: &[PortSpec] = &[PortSpec::output("mix", "Mix", SocketType::Audio)];

const KEYBOARD_CONTROLS: &[ControlDescriptor] = &[
    ControlDescriptor::new("midi_f0", "Note", ControlUnit::MidiNote, 0.0, 127.0, 69.0),
    ControlDescriptor::seconds("note_on_duration", "Duration", 1.0),
];
const KEYBOARD_OUTPUTS: &[PortSpec] = &[
    PortSpec::output("pitch", "Pitch", SocketType::Control),
    PortSpec::output("duration", "Duration", SocketType::Control),
];

impl NodeKind {
    /// Every kind, in catalog order.
    pub const ALL: [NodeKind; 10] = [
        NodeKind::Attack,
        NodeKind::Decay,
        NodeKind::Sustain,
        NodeKind::Release,
        NodeKind::Adsr,
        NodeKind::Vco,
        NodeKind::Vca,
        NodeKind::Noise,
        NodeKind::Mixer,
        NodeKind::MonophonicKeyboard,
    ];

    /// Stable identifier (lowercase, no spaces).
    pub const fn id(self) -> &'static str {
        match self {
            NodeKind::Attack => "attack",
            NodeKind::Decay => "decay",
            NodeKind::Sustain => "sustain",
            NodeKind::Release => "release",
            NodeKind::Adsr => "adsr",
            NodeKind::Vco => "vco",
            NodeKind::Vca => "vca",
            NodeKind::Noise => "noise",
            NodeKind::Mixer => "mixer",
            NodeKind::MonophonicKeyboard => "keyboard",
        }
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            NodeKind::Attack => "Attack",
            NodeKind::Decay => "Decay",
            NodeKind::Sustain => "Sustain",
            NodeKind::Release => "Release",
            NodeKind::Adsr => "ADSR",
            NodeKind::Vco => "VCO",
            NodeKind::Vca => "VCA",
            NodeKind::Noise => "Noise",
            NodeKind::Mixer => "Mixer",
            NodeKind::MonophonicKeyboard => "MonophonicKeyboard",
        }
    }

    /// Looks up a kind by id or display name, ignoring ASCII case.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.id().eq_ignore_ascii_case(id) || k.name().eq_ignore_ascii_case(id))
    }

    /// Controls of this kind, in index order.
    pub const fn controls(self) -> &'static [ControlDescriptor] {
        match self {
            NodeKind::Attack => ATTACK_CONTROLS,
            NodeKind::Decay => DECAY_CONTROLS,
            NodeKind::Sustain => SUSTAIN_CONTROLS,
            NodeKind::Release => RELEASE_CONTROLS,
            NodeKind::Adsr => NO_CONTROLS,
            NodeKind::Vco => VCO_CONTROLS,
            NodeKind::Vca => VCA_CONTROLS,
            NodeKind::Noise => NOISE_CONTROLS,
            NodeKind::Mixer => MIXER_CONTROLS,
            NodeKind::MonophonicKeyboard => KEYBOARD_CONTROLS,
        }
    }

    /// Input ports of this kind, in index order.
    pub const fn inputs(self) -> &'static [PortSpec] {
        match self {
            NodeKind::Adsr => ADSR_INPUTS,
            NodeKind::Vco => VCO_INPUTS,
            NodeKind::Vca => VCA_INPUTS,
            NodeKind::Mixer => MIXER_INPUTS,
            NodeKind::Attack
            | NodeKind::Decay
            | NodeKind::Sustain
            | NodeKind::Release
            | NodeKind::Noise
            | NodeKind::MonophonicKeyboard => NO_PORTS,
        }
    }

    /// Output ports of this kind, in index order.
    pub const fn outputs(self) -> &'static [PortSpec] {
        match self {
            NodeKind::Attack | NodeKind::Decay | NodeKind::Sustain | NodeKind::Release => {
                STAGE_OUTPUTS
            }
            NodeKind::Adsr => ADSR_OUTPUTS,
            NodeKind::Vco => VCO_OUTPUTS,
            NodeKind::Vca => VCA_OUTPUTS,
            NodeKind::Noise => NOISE_OUTPUTS,
            NodeKind::Mixer => MIXER_OUTPUTS,
            NodeKind::MonophonicKeyboard => KEYBOARD_OUTPUTS,
        }
    }

    /// Ports in the given direction.
    pub const fn ports(self, direction: Direction) -> &'static [PortSpec] {
        match direction {
            Direction::Input => self.inputs(),
            Direction::Output => self.outputs(),
        }
    }

    /// Finds a port by name; returns its index and spec.
    pub fn port(self, direction: Direction, name: &str) -> Option<(usize, &'static PortSpec)> {
        self.ports(direction)
            .iter()
            .enumerate()
            .find(|(_, p)| p.name == name)
    }

    /// Finds a control by name; returns its index and descriptor.
    pub fn control(self, name: &str) -> Option<(usize, &'static ControlDescriptor)> {
        self.controls()
            .iter()
            .enumerate()
            .find(|(_, c)| c.name == name)
    }

    /// Default control values, in index order.
    pub fn default_controls(self) -> Vec<f32> {
        self.controls().iter().map(|c| c.default).collect()
    }

    /// Returns true if any input of this kind is required.
    pub fn has_required_inputs(self) -> bool {
        self.inputs().iter().any(|p| p.required)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        for (i, a) in NodeKind::ALL.iter().enumerate() {
            for b in &NodeKind::ALL[i + 1..] {
                assert_ne!(a.id(), b.id());
            }
        }
    }

    #[test]
    fn port_names_unique_per_direction() {
        for kind in NodeKind::ALL {
            for dir in [Direction::Input, Direction::Output] {
                let ports = kind.ports(dir);
                for (i, a) in ports.iter().enumerate() {
                    for b in &ports[i + 1..] {
                        assert_ne!(a.name, b.name, "{kind} has duplicate {dir} '{}'", a.name);
                    }
                }
            }
        }
    }

    #[test]
    fn outputs_are_never_required() {
        for kind in NodeKind::ALL {
            assert!(kind.outputs().iter().all(|p| !p.required));
        }
    }

    #[test]
    fn defaults_lie_in_range() {
        for kind in NodeKind::ALL {
            for c in kind.controls() {
                assert!(c.contains(c.default), "{kind}.{} default out of range", c.name);
            }
        }
    }

    #[test]
    fn pure_sources_have_no_required_inputs() {
        assert!(!NodeKind::Attack.has_required_inputs());
        assert!(!NodeKind::Noise.has_required_inputs());
        assert!(!NodeKind::Mixer.has_required_inputs());
        assert!(NodeKind::Adsr.has_required_inputs());
        assert!(NodeKind::Vca.has_required_inputs());
    }

    #[test]
    fn lookup_by_id_and_name() {
        assert_eq!(NodeKind::from_id("adsr"), Some(NodeKind::Adsr));
        assert_eq!(NodeKind::from_id("ADSR"), Some(NodeKind::Adsr));
        assert_eq!(
            NodeKind::from_id("MonophonicKeyboard"),
            Some(NodeKind::MonophonicKeyboard)
        );
        assert_eq!(NodeKind::from_id("voice"), None);
    }

    #[test]
    fn port_lookup() {
        let (idx, spec) = NodeKind::Adsr.port(Direction::Input, "sustain").unwrap();
        assert_eq!(idx, 2);
        assert!(spec.required);
        assert!(NodeKind::Adsr.port(Direction::Output, "sustain").is_none());
    }
}
