//! Online backpropagation through time for `RecurrentNet`.
//!
//! One call trains on one labelled sequence: a forward pass, then a backward
//! walk from the last step to the first that applies every update in place.

use crate::activation::{d_sigmoid_from_output, d_tanh_from_output};
use crate::nn::{RecurrentNet, Sequence, NUM_HIDDEN, NUM_INPUTS, SEQ_LEN};
use serde::{Deserialize, Serialize};

/// Which weights feed the error carried to earlier steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackpropMode {
    /// Error flows through weights that were already nudged by later steps
    /// of the same backward pass (and through the freshly updated output
    /// weights at the last step).
    #[default]
    InPlace,
    /// Error flows through the weights that were active during the forward
    /// pass, giving the exact gradient of `0.5 * (target - p)^2`.
    Snapshot,
}

/// Train on one example with the default `BackpropMode::InPlace`.
///
/// Returns the prediction made before the update.
pub fn train_one_example(
    net: &mut RecurrentNet,
    sequence: &Sequence,
    target: f64,
    learning_rate: f64,
) -> f64 {
    train_one_example_with(net, sequence, target, learning_rate, BackpropMode::InPlace)
}

pub fn train_one_example_with(
    net: &mut RecurrentNet,
    sequence: &Sequence,
    target: f64,
    learning_rate: f64,
    mode: BackpropMode,
) -> f64 {
    let predicted = net.forward(sequence);
    let frozen_w_ho = net.w_ho;
    let frozen_w_hh = net.w_hh;

    // Squared-error gradient pushed through the sigmoid.
    let output_delta = (target - predicted) * d_sigmoid_from_output(predicted);

    let last = net.trajectory[SEQ_LEN];
    for (row, &h) in net.w_ho.iter_mut().zip(last.iter()) {
        row[0] += learning_rate * output_delta * h;
    }
    net.b_o += learning_rate * output_delta;

    let w_ho = match mode {
        BackpropMode::InPlace => &net.w_ho,
        BackpropMode::Snapshot => &frozen_w_ho,
    };
    let last_step_error: [f64; NUM_HIDDEN] = std::array::from_fn(|j| output_delta * w_ho[j][0]);

    let mut carried = [0.0f64; NUM_HIDDEN];
    for t in (0..SEQ_LEN).rev() {
        let incoming = if t == SEQ_LEN - 1 {
            last_step_error
        } else {
            carried
        };
        let current = net.trajectory[t + 1];
        let previous = net.trajectory[t];
        let input = &sequence[t];

        let mut hidden_delta = [0.0f64; NUM_HIDDEN];
        for j in 0..NUM_HIDDEN {
            hidden_delta[j] = incoming[j] * d_tanh_from_output(current[j]);
            net.b_h[j] += learning_rate * hidden_delta[j];
            for i in 0..NUM_INPUTS {
                net.w_ih[i][j] += learning_rate * hidden_delta[j] * input[i];
            }
            for h in 0..NUM_HIDDEN {
                net.w_hh[h][j] += learning_rate * hidden_delta[j] * previous[h];
            }
        }

        let w_hh = match mode {
            BackpropMode::InPlace => &net.w_hh,
            BackpropMode::Snapshot => &frozen_w_hh,
        };
        for (h, c) in carried.iter_mut().enumerate() {
            *c = 0.0;
            for (j, &d) in hidden_delta.iter().enumerate() {
                *c += d * w_hh[h][j];
            }
        }
    }

    predicted
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn sample_sequence(seed: u64) -> Sequence {
        use rand::Rng;
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        let mut seq = [[0.0; NUM_INPUTS]; SEQ_LEN];
        for row in &mut seq {
            for x in row.iter_mut() {
                *x = rng.random::<f64>();
            }
        }
        seq
    }

    fn squared_error(net: &RecurrentNet, seq: &Sequence, target: f64) -> f64 {
        let p = net.clone().forward(seq);
        0.5 * (target - p) * (target - p)
    }

    #[test]
    fn returns_prediction_from_before_the_update() {
        let mut net = RecurrentNet::random(&mut ChaCha12Rng::seed_from_u64(1));
        let seq = sample_sequence(2);
        let before = net.clone().forward(&seq);
        assert_eq!(train_one_example(&mut net, &seq, 1.0, 0.1), before);
        assert_ne!(net.forward(&seq), before);
    }

    #[test]
    fn repeated_training_moves_prediction_toward_one() {
        let mut net = RecurrentNet::random(&mut ChaCha12Rng::seed_from_u64(21));
        let seq = sample_sequence(22);
        let mut previous = net.forward(&seq);
        for _ in 0..100 {
            train_one_example(&mut net, &seq, 1.0, 0.01);
            let current = net.forward(&seq);
            assert!(current >= previous - 1e-12, "{current} < {previous}");
            previous = current;
        }
    }

    #[test]
    fn repeated_training_moves_prediction_toward_zero() {
        let mut net = RecurrentNet::random(&mut ChaCha12Rng::seed_from_u64(31));
        let seq = sample_sequence(32);
        let start = net.forward(&seq);
        let mut previous = start;
        for _ in 0..100 {
            train_one_example(&mut net, &seq, 0.0, 0.01);
            let current = net.forward(&seq);
            assert!(current <= previous + 1e-12, "{current} > {previous}");
            previous = current;
        }
        assert!(previous < start);
    }

    #[test]
    fn snapshot_mode_applies_exact_gradient_step() {
        let net = RecurrentNet::random(&mut ChaCha12Rng::seed_from_u64(41));
        let seq = sample_sequence(42);
        let target = 1.0;
        let lr = 0.05;

        let mut trained = net.clone();
        train_one_example_with(&mut trained, &seq, target, lr, BackpropMode::Snapshot);

        let base = net.to_weight_vec();
        let after = trained.to_weight_vec();
        let eps = 1e-6;
        for k in 0..RecurrentNet::WEIGHT_COUNT {
            let mut plus = base.clone();
            plus[k] += eps;
            let mut minus = base.clone();
            minus[k] -= eps;
            let grad = (squared_error(&RecurrentNet::from_weights(plus.into_iter()), &seq, target)
                - squared_error(&RecurrentNet::from_weights(minus.into_iter()), &seq, target))
                / (2.0 * eps);
            let applied = after[k] - base[k];
            assert!(
                (applied + lr * grad).abs() < 1e-8,
                "parameter {k}: applied {applied}, expected {}",
                -lr * grad
            );
        }
    }

    #[test]
    fn modes_share_output_update_but_diverge_through_time() {
        let net = RecurrentNet::random(&mut ChaCha12Rng::seed_from_u64(51));
        let seq = sample_sequence(52);

        let mut in_place = net.clone();
        let mut snapshot = net.clone();
        train_one_example_with(&mut in_place, &seq, 1.0, 0.1, BackpropMode::InPlace);
        train_one_example_with(&mut snapshot, &seq, 1.0, 0.1, BackpropMode::Snapshot);

        assert_eq!(in_place.w_ho, snapshot.w_ho);
        assert_eq!(in_place.b_o, snapshot.b_o);
        assert_ne!(in_place.w_hh, snapshot.w_hh);
        assert_ne!(in_place.b_h, snapshot.b_h);
    }

    /// Index-by-index rendition of the in-place update: each weight is read
    /// at the moment it is needed, after whatever updates came before it.
    fn in_place_by_hand(net: &mut RecurrentNet, seq: &Sequence, target: f64, lr: f64) {
        let mut states = [[0.0f64; NUM_HIDDEN]; SEQ_LEN + 1];
        for t in 0..SEQ_LEN {
            for j in 0..NUM_HIDDEN {
                let mut a = net.b_h[j];
                for i in 0..NUM_INPUTS {
                    a += seq[t][i] * net.w_ih[i][j];
                }
                for h in 0..NUM_HIDDEN {
                    a += states[t][h] * net.w_hh[h][j];
                }
                states[t + 1][j] = a.tanh();
            }
        }
        let mut out = net.b_o;
        for j in 0..NUM_HIDDEN {
            out += states[SEQ_LEN][j] * net.w_ho[j][0];
        }
        let p = 1.0 / (1.0 + (-out).exp());
        let delta_out = (target - p) * (p * (1.0 - p));

        for j in 0..NUM_HIDDEN {
            net.w_ho[j][0] += lr * delta_out * states[SEQ_LEN][j];
        }
        net.b_o += lr * delta_out;

        let mut next_error = [0.0f64; NUM_HIDDEN];
        for t in (0..SEQ_LEN).rev() {
            let mut delta = [0.0f64; NUM_HIDDEN];
            for j in 0..NUM_HIDDEN {
                let err = if t == SEQ_LEN - 1 {
                    delta_out * net.w_ho[j][0]
                } else {
                    next_error[j]
                };
                delta[j] = err * (1.0 - states[t + 1][j] * states[t + 1][j]);
                net.b_h[j] += lr * delta[j];
                for i in 0..NUM_INPUTS {
                    net.w_ih[i][j] += lr * delta[j] * seq[t][i];
                }
                for h in 0..NUM_HIDDEN {
                    net.w_hh[h][j] += lr * delta[j] * states[t][h];
                }
            }
            for h in 0..NUM_HIDDEN {
                next_error[h] = 0.0;
                for j in 0..NUM_HIDDEN {
                    next_error[h] += delta[j] * net.w_hh[h][j];
                }
            }
        }
    }

    #[test]
    fn in_place_mode_reads_weights_after_their_update() {
        let start = RecurrentNet::from_weights(
            (0..RecurrentNet::WEIGHT_COUNT).map(|k| (k as f64 * 0.37).sin() * 0.9),
        );
        let seq: Sequence = std::array::from_fn(|t| {
            std::array::from_fn(|i| ((t * NUM_INPUTS + i) as f64 * 0.61).cos().abs())
        });

        let mut trained = start.clone();
        let mut by_hand = start;
        for call in 0..6 {
            let target = if call % 2 == 0 { 1.0 } else { 0.0 };
            train_one_example(&mut trained, &seq, target, 0.1);
            in_place_by_hand(&mut by_hand, &seq, target, 0.1);
            assert_eq!(trained.to_weight_vec(), by_hand.to_weight_vec(), "call {call}");
        }
    }

    #[test]
    fn in_place_mode_is_reproducible() {
        let net = RecurrentNet::random(&mut ChaCha12Rng::seed_from_u64(61));
        let seq = sample_sequence(62);
        let mut a = net.clone();
        let mut b = net;
        for _ in 0..10 {
            train_one_example(&mut a, &seq, 0.0, 0.1);
            train_one_example(&mut b, &seq, 0.0, 0.1);
        }
        assert_eq!(a.to_weight_vec(), b.to_weight_vec());
    }

    #[test]
    fn mode_uses_kebab_case_names() {
        assert_eq!(
            serde_json::to_string(&BackpropMode::InPlace).unwrap(),
            "\"in-place\""
        );
        let mode: BackpropMode = serde_json::from_str("\"snapshot\"").unwrap();
        assert_eq!(mode, BackpropMode::Snapshot);
    }
}
