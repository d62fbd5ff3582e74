//! Elman-style recurrent net: 12 inputs → 8 hidden (tanh, recurrent) → 1 output (sigmoid).
//! Stack-allocated, no heap. 177 weights total.
//!
//! Inputs per step: hero(6) + monster(6) attributes, each divided by 100.
//! Output: probability that the hero prevails.

use crate::activation::{sigmoid, tanh};
use rand::Rng;

pub const SEQ_LEN: usize = 3;
pub const NUM_INPUTS: usize = 12;
pub const NUM_HIDDEN: usize = 8;
pub const NUM_OUTPUTS: usize = 1;

/// One battle as seen by the net: `SEQ_LEN` steps of `NUM_INPUTS` features.
pub type Sequence = [[f64; NUM_INPUTS]; SEQ_LEN];

#[derive(Clone, Debug, PartialEq)]
pub struct RecurrentNet {
    // input→hidden (12×8) + hidden→hidden (8×8) + hidden→output (8×1) + hidden bias (8) + output bias (1)
    // Total: 96 + 64 + 8 + 8 + 1 = 177 parameters
    pub w_ih: [[f64; NUM_HIDDEN]; NUM_INPUTS],  // 12×8
    pub w_hh: [[f64; NUM_HIDDEN]; NUM_HIDDEN],  // 8×8
    pub w_ho: [[f64; NUM_OUTPUTS]; NUM_HIDDEN], // 8×1
    pub b_h: [f64; NUM_HIDDEN],                 // 8
    pub b_o: f64,
    /// Post-tanh hidden state per step; row 0 is the zero state, row `t + 1`
    /// is the state after consuming step `t`.
    pub(crate) trajectory: [[f64; NUM_HIDDEN]; SEQ_LEN + 1],
}

impl Default for RecurrentNet {
    fn default() -> Self {
        Self {
            w_ih: [[0.0; NUM_HIDDEN]; NUM_INPUTS],
            w_hh: [[0.0; NUM_HIDDEN]; NUM_HIDDEN],
            w_ho: [[0.0; NUM_OUTPUTS]; NUM_HIDDEN],
            b_h: [0.0; NUM_HIDDEN],
            b_o: 0.0,
            trajectory: [[0.0; NUM_HIDDEN]; SEQ_LEN + 1],
        }
    }
}

impl RecurrentNet {
    pub const WEIGHT_COUNT: usize = NUM_INPUTS * NUM_HIDDEN
        + NUM_HIDDEN * NUM_HIDDEN
        + NUM_HIDDEN * NUM_OUTPUTS
        + NUM_HIDDEN
        + NUM_OUTPUTS;

    /// Fresh net with every parameter drawn uniformly from [-1, 1).
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut net = Self::default();
        net.initialize(rng);
        net
    }

    /// Overwrite every weight and bias with an independent uniform sample in [-1, 1).
    pub fn initialize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut next = || rng.random::<f64>() * 2.0 - 1.0;
        for row in &mut self.w_ih {
            for w in row.iter_mut() {
                *w = next();
            }
        }
        for row in &mut self.w_hh {
            for w in row.iter_mut() {
                *w = next();
            }
        }
        for row in &mut self.w_ho {
            for w in row.iter_mut() {
                *w = next();
            }
        }
        for b in &mut self.b_h {
            *b = next();
        }
        self.b_o = next();
        self.trajectory = [[0.0; NUM_HIDDEN]; SEQ_LEN + 1];
    }

    /// Create a net from an iterator of f64 values. Panics if fewer than WEIGHT_COUNT values.
    pub fn from_weights(mut weights: impl Iterator<Item = f64>) -> Self {
        let mut next = || {
            weights
                .next()
                .expect("insufficient weights: need WEIGHT_COUNT (177) elements")
        };

        let mut net = Self::default();
        for row in &mut net.w_ih {
            for w in row.iter_mut() {
                *w = next();
            }
        }
        for row in &mut net.w_hh {
            for w in row.iter_mut() {
                *w = next();
            }
        }
        for row in &mut net.w_ho {
            for w in row.iter_mut() {
                *w = next();
            }
        }
        for b in &mut net.b_h {
            *b = next();
        }
        net.b_o = next();
        net
    }

    /// Flatten parameters in the same order expected by `from_weights`.
    pub fn to_weight_vec(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(Self::WEIGHT_COUNT);
        for row in &self.w_ih {
            out.extend_from_slice(row);
        }
        for row in &self.w_hh {
            out.extend_from_slice(row);
        }
        for row in &self.w_ho {
            out.extend_from_slice(row);
        }
        out.extend_from_slice(&self.b_h);
        out.push(self.b_o);
        out
    }

    /// Hidden states recorded by the most recent `forward` call.
    pub fn hidden_trajectory(&self) -> &[[f64; NUM_HIDDEN]; SEQ_LEN + 1] {
        &self.trajectory
    }

    /// Forward pass over the whole sequence. Returns the win probability in (0, 1).
    ///
    /// Rebuilds the hidden trajectory from a zero state, so no memory leaks
    /// between sequences. The trajectory is what `bptt::train_one_example`
    /// reads, so it must come from the same sequence being trained on.
    pub fn forward(&mut self, sequence: &Sequence) -> f64 {
        self.trajectory[0] = [0.0; NUM_HIDDEN];

        for (t, input) in sequence.iter().enumerate() {
            let prev = self.trajectory[t];
            let mut next = self.b_h;
            for (j, h) in next.iter_mut().enumerate() {
                for (i, &x) in input.iter().enumerate() {
                    *h += x * self.w_ih[i][j];
                }
                for (k, &p) in prev.iter().enumerate() {
                    *h += p * self.w_hh[k][j];
                }
                *h = tanh(*h);
            }
            self.trajectory[t + 1] = next;
        }

        let mut output = self.b_o;
        for (j, &h) in self.trajectory[SEQ_LEN].iter().enumerate() {
            output += h * self.w_ho[j][0];
        }
        sigmoid(output)
    }
}
