use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-way reading of a win probability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Favored,
    Even,
    Unfavored,
}

impl Verdict {
    pub const FAVORED_ABOVE: f64 = 0.70;
    pub const UNFAVORED_BELOW: f64 = 0.30;

    pub fn from_probability(p: f64) -> Self {
        if p > Self::FAVORED_ABOVE {
            Verdict::Favored
        } else if p < Self::UNFAVORED_BELOW {
            Verdict::Unfavored
        } else {
            Verdict::Even
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Favored => write!(f, "the hero has the upper hand"),
            Verdict::Even => write!(f, "the fight is a toss-up"),
            Verdict::Unfavored => write!(f, "the enemy is too strong, the hero will likely lose"),
        }
    }
}
