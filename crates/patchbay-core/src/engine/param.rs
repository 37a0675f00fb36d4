//! The fixed parameter set and where each parameter is read from.

use core::fmt;

use crate::catalog::NodeKind;

/// Where a parameter's value comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tap {
    /// The value delivered on an input port. Defined iff that input is satisfied.
    Input {
        /// Node kind owning the input.
        kind: NodeKind,
        /// Input port name.
        port: &'static str,
    },
    /// A control value. Defined iff the node is live.
    Control {
        /// Node kind owning the control.
        kind: NodeKind,
        /// Control name.
        control: &'static str,
    },
}

impl Tap {
    /// Node kind this tap reads from.
    pub fn kind(self) -> NodeKind {
        match self {
            Tap::Input { kind, .. } | Tap::Control { kind, .. } => kind,
        }
    }
}

/// A well-known parameter forwarded to the audio backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Param {
    /// Envelope attack time.
    Attack,
    /// Envelope decay time.
    Decay,
    /// Envelope sustain level.
    Sustain,
    /// Envelope release time.
    Release,
    /// Envelope curve shape.
    Alpha,
    /// MIDI note driving the oscillator.
    Keyboard,
    /// Note-on duration gating the envelope.
    NoteDuration,
    /// Oscillator tuning offset.
    VcoTuning,
    /// Oscillator modulation depth.
    VcoModDepth,
    /// Oscillator initial phase.
    VcoPhase,
    /// Amplifier gain.
    Vca,
    /// Noise level delivered to the mixer.
    Noise,
}

impl Param {
    /// Number of parameters.
    pub const COUNT: usize = 12;

    /// Every parameter, in wire order.
    pub const ALL: [Param; Self::COUNT] = [
        Param::Attack,
        Param::Decay,
        Param::Sustain,
        Param::Release,
        Param::Alpha,
        Param::Keyboard,
        Param::NoteDuration,
        Param::VcoTuning,
        Param::VcoModDepth,
        Param::VcoPhase,
        Param::Vca,
        Param::Noise,
    ];

    /// Wire name.
    pub const fn name(self) -> &'static str {
        match self {
            Param::Attack => "attack",
            Param::Decay => "decay",
            Param::Sustain => "sustain",
            Param::Release => "release",
            Param::Alpha => "alpha",
            Param::Keyboard => "keyboard",
            Param::NoteDuration => "note_duration",
            Param::VcoTuning => "vco_tuning",
            Param::VcoModDepth => "vco_mod_depth",
            Param::VcoPhase => "vco_phase",
            Param::Vca => "vca",
            Param::Noise => "noise",
        }
    }

    /// Looks up a parameter by wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Position in [`ALL`](Self::ALL).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Where this parameter is read from.
    pub const fn tap(self) -> Tap {
        const fn input(kind: NodeKind, port: &'static str) -> Tap {
            Tap::Input { kind, port }
        }
        const fn control(kind: NodeKind, control: &'static str) -> Tap {
            Tap::Control { kind, control }
        }
        match self {
            Param::Attack => input(NodeKind::Adsr, "attack"),
            Param::Decay => input(NodeKind::Adsr, "decay"),
            Param::Sustain => input(NodeKind::Adsr, "sustain"),
            Param::Release => input(NodeKind::Adsr, "release"),
            Param::Alpha => input(NodeKind::Adsr, "alpha"),
            Param::Keyboard => input(NodeKind::Vco, "pitch"),
            Param::NoteDuration => input(NodeKind::Adsr, "gate"),
            Param::VcoTuning => control(NodeKind::Vco, "tuning"),
            Param::VcoModDepth => control(NodeKind::Vco, "mod_depth"),
            Param::VcoPhase => control(NodeKind::Vco, "initial_phase"),
            Param::Vca => control(NodeKind::Vca, "gain"),
            Param::Noise => input(NodeKind::Mixer, "noise"),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
