//! Node catalog.
//!
//! Each synthesizer building block is a variant of the closed [`NodeKind`]
//! enum. A kind carries its own schema (controls, input ports, output ports)
//! and a pure [`resolve`](NodeKind::resolve) capability, selected by `match`.
//!
//! | kind | inputs | outputs |
//! |------|--------|---------|
//! | Attack / Decay / Sustain / Release | – | `value` (control) |
//! | ADSR | `attack` `decay` `sustain` `release` (required), `alpha` `gate` | `envelope` (mod) |
//! | VCO | `pitch` (required), `mod` | `audio` |
//! | VCA | `audio`, `cv` (required) | `audio` |
//! | Noise | – | `noise` |
//! | Mixer | `osc1`, `osc2`, `noise` | `mix` |
//! | MonophonicKeyboard | – | `pitch`, `duration` (control) |

mod control;
mod kind;
mod port;
mod resolve;

pub use control::{ControlDescriptor, ControlUnit};
pub use kind::NodeKind;
pub use port::{Direction, PortSpec};
pub use resolve::InputValue;
