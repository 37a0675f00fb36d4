//! Pure value production for each node kind.
//!
//! `resolve` maps a node's control values and the values delivered on its
//! input ports to the values on its output ports. It performs no I/O and holds
//! no state; the recompute engine calls it in dependency order.
//!
//! Port values are scalars whose meaning depends on the socket type:
//!
//! | socket | value |
//! |--------|-------|
//! | control | the control number itself |
//! | modulation | the level the envelope holds (its sustain level) |
//! | audio, noise | linear signal amplitude |

use super::kind::NodeKind;

/// Value delivered on an input port: `None` when the input is unsatisfied.
pub type InputValue = Option<f32>;

impl NodeKind {
    /// Computes output values from controls and inputs.
    ///
    /// `controls` and `inputs` are indexed like [`controls()`](Self::controls)
    /// and [`inputs()`](Self::inputs); the returned vector is indexed like
    /// [`outputs()`](Self::outputs). Unsatisfied optional inputs contribute
    /// nothing; they are never read as zero.
    ///
    /// Callers must only resolve live nodes (every required input `Some`).
    /// A missing required input yields `NaN` on the affected outputs.
    pub fn resolve(self, controls: &[f32], inputs: &[InputValue]) -> Vec<f32> {
        let control = |i: usize| controls.get(i).copied().unwrap_or(f32::NAN);
        let input = |i: usize| inputs.get(i).copied().flatten();
        let required = |i: usize| input(i).unwrap_or(f32::NAN);

        match self {
            NodeKind::Attack | NodeKind::Decay | NodeKind::Sustain | NodeKind::Release => {
                vec![control(0)]
            }
            // attack, decay, sustain, release are required; only sustain shapes the level.
            NodeKind::Adsr => vec![required(2)],
            NodeKind::Vco => vec![1.0],
            NodeKind::Vca => vec![required(0) * required(1) * control(0)],
            NodeKind::Noise => vec![control(0)],
            NodeKind::Mixer => {
                let mix = (0..3)
                    .filter_map(|i| input(i).map(|v| v * control(i)))
                    .sum::<f32>();
                vec![mix]
            }
            NodeKind::MonophonicKeyboard => vec![control(0), control(1)],
        }
    }
}
