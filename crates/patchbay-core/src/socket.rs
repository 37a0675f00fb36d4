//! Socket type registry.
//!
//! Every port in a patch carries a [`SocketType`]. Sockets are process-wide
//! constants: each type maps to exactly one static [`Socket`] record that all
//! ports of that type share by reference.
//!
//! Compatibility is directional. An output socket may feed an input socket of
//! the same type, and a small number of cross-type links are declared
//! explicitly (noise is an audio-rate signal, so it may feed audio inputs).

use core::fmt;

/// Immutable description of a socket type.
#[derive(Debug, PartialEq, Eq)]
pub struct Socket {
    /// Stable type tag (lowercase, used in logs and wire payloads).
    pub tag: &'static str,
    /// Human-readable label.
    pub label: &'static str,
}

/// Control-rate scalar values (envelope times, levels, note numbers).
pub static CONTROL: Socket = Socket {
    tag: "control",
    label: "Control",
};

/// Audio-rate signals.
pub static AUDIO: Socket = Socket {
    tag: "audio",
    label: "Audio",
};

/// Modulation signals (envelopes, LFOs).
pub static MODULATION: Socket = Socket {
    tag: "modulation",
    label: "Modulation",
};

/// Noise generator output.
pub static NOISE: Socket = Socket {
    tag: "noise",
    label: "Noise",
};

/// The closed set of socket types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SocketType {
    /// See [`CONTROL`].
    Control,
    /// See [`AUDIO`].
    Audio,
    /// See [`MODULATION`].
    Modulation,
    /// See [`NOISE`].
    Noise,
}

impl SocketType {
    /// All socket types, in declaration order.
    pub const ALL: [SocketType; 4] = [
        SocketType::Control,
        SocketType::Audio,
        SocketType::Modulation,
        SocketType::Noise,
    ];

    /// Returns the shared socket record for this type.
    pub fn socket(self) -> &'static Socket {
        match self {
            SocketType::Control => &CONTROL,
            SocketType::Audio => &AUDIO,
            SocketType::Modulation => &MODULATION,
            SocketType::Noise => &NOISE,
        }
    }

    /// Returns the stable type tag.
    pub fn tag(self) -> &'static str {
        self.socket().tag
    }

    /// Looks up a socket type by tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }

    /// Returns true if an output of type `self` may feed an input of type `input`.
    pub fn can_feed(self, input: SocketType) -> bool {
        self == input || matches!((self, input), (SocketType::Noise, SocketType::Audio))
    }
}

impl fmt::Display for SocketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_type_always_compatible() {
        for t in SocketType::ALL {
            assert!(t.can_feed(t), "{t} should feed itself");
        }
    }

    #[test]
    fn noise_feeds_audio_but_not_reverse() {
        assert!(SocketType::Noise.can_feed(SocketType::Audio));
        assert!(!SocketType::Audio.can_feed(SocketType::Noise));
    }

    #[test]
    fn control_does_not_feed_modulation() {
        assert!(!SocketType::Control.can_feed(SocketType::Modulation));
        assert!(!SocketType::Modulation.can_feed(SocketType::Control));
        assert!(!SocketType::Audio.can_feed(SocketType::Control));
    }

    #[test]
    fn sockets_are_shared_by_reference() {
        let a = SocketType::Audio.socket();
        let b = SocketType::Audio.socket();
        assert!(core::ptr::eq(a, b));
        assert_eq!(a.label, "Audio");
    }

    #[test]
    fn tag_lookup() {
        assert_eq!(SocketType::from_tag("noise"), Some(SocketType::Noise));
        assert_eq!(SocketType::from_tag("cv"), None);
    }
}
