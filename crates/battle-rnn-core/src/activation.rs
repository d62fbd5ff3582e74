//! Scalar activations used by the recurrent core.
//!
//! Derivatives take the activation's *output*, not its pre-activation, so the
//! backward pass can reuse the values already stored in the hidden trajectory.

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Derivative of `sigmoid` given `y = sigmoid(x)`.
pub fn d_sigmoid_from_output(y: f64) -> f64 {
    y * (1.0 - y)
}

pub fn tanh(x: f64) -> f64 {
    x.tanh()
}

/// Derivative of `tanh` given `y = tanh(x)`.
pub fn d_tanh_from_output(y: f64) -> f64 {
    1.0 - y * y
}
