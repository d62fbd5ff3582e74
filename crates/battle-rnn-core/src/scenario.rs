//! Turn-based duel simulator that turns two attribute vectors into a `Sequence`.
//!
//! Each turn the hero strikes first, then the monster. The feature row for a
//! turn is captured before either side acts, so the net sees the state the
//! turn starts from.

use crate::nn::{Sequence, NUM_INPUTS, SEQ_LEN};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw attributes are divided by this before reaching the net.
pub const NORMALIZATION: f64 = 100.0;
/// Mana spent by one magic attack; also the minimum mana needed to cast.
pub const MANA_COST: f64 = 10.0;
pub const ATTRIBUTE_COUNT: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    pub hp: f64,
    pub mana: f64,
    pub strength: f64,
    pub intelligence: f64,
    pub defense: f64,
    pub magic_defense: f64,
}

impl Attributes {
    pub const NAMES: [&'static str; ATTRIBUTE_COUNT] =
        ["HP", "Mana", "Strength", "Intelligence", "Defense", "MagicDefense"];

    pub const fn new(
        hp: f64,
        mana: f64,
        strength: f64,
        intelligence: f64,
        defense: f64,
        magic_defense: f64,
    ) -> Self {
        Self {
            hp,
            mana,
            strength,
            intelligence,
            defense,
            magic_defense,
        }
    }

    pub fn to_array(&self) -> [f64; ATTRIBUTE_COUNT] {
        [
            self.hp,
            self.mana,
            self.strength,
            self.intelligence,
            self.defense,
            self.magic_defense,
        ]
    }

    /// Casters prefer magic while they can afford it.
    fn prefers_magic(&self) -> bool {
        self.intelligence > self.strength
    }
}

impl From<[f64; ATTRIBUTE_COUNT]> for Attributes {
    fn from(v: [f64; ATTRIBUTE_COUNT]) -> Self {
        Self::new(v[0], v[1], v[2], v[3], v[4], v[5])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Physical,
    Magic,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Physical => write!(f, "sword"),
            Action::Magic => write!(f, "magic"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// 1-based.
    pub turn: usize,
    pub hero_action: Action,
    pub hero_damage: f64,
    pub monster_action: Action,
    pub monster_damage: f64,
    pub hero_hp: f64,
    pub monster_hp: f64,
}

impl fmt::Display for TurnRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "T{}: hero {} for {:.0}, monster {} for {:.0} (hero HP {:.0} | monster HP {:.0})",
            self.turn,
            self.hero_action,
            self.hero_damage,
            self.monster_action,
            self.monster_damage,
            self.hero_hp,
            self.monster_hp
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Battle {
    pub sequence: Sequence,
    pub turns: Vec<TurnRecord>,
    pub hero_hp: f64,
    pub monster_hp: f64,
}

/// Offence minus matching defence, never negative.
pub fn damage(attack: f64, defense: f64) -> f64 {
    (attack - defense).max(0.0)
}

fn feature_row(
    hero: &Attributes,
    hero_hp: f64,
    hero_mana: f64,
    monster: &Attributes,
    monster_hp: f64,
    monster_mana: f64,
) -> [f64; NUM_INPUTS] {
    let raw = [
        hero_hp,
        hero_mana,
        hero.strength,
        hero.intelligence,
        hero.defense,
        hero.magic_defense,
        monster_hp,
        monster_mana,
        monster.strength,
        monster.intelligence,
        monster.defense,
        monster.magic_defense,
    ];
    raw.map(|v| v / NORMALIZATION)
}

/// Play `SEQ_LEN` turns and record what the net will see.
///
/// The monster casts with probability 1/2 whenever it can afford to; the coin
/// is only flipped when its mana suffices.
pub fn simulate<R: Rng + ?Sized>(hero: &Attributes, monster: &Attributes, rng: &mut R) -> Battle {
    let (mut hero_hp, mut hero_mana) = (hero.hp, hero.mana);
    let (mut monster_hp, mut monster_mana) = (monster.hp, monster.mana);
    let mut sequence = [[0.0; NUM_INPUTS]; SEQ_LEN];
    let mut turns = Vec::with_capacity(SEQ_LEN);

    for (t, row) in sequence.iter_mut().enumerate() {
        *row = feature_row(hero, hero_hp, hero_mana, monster, monster_hp, monster_mana);

        let (hero_action, hero_damage) = if hero.prefers_magic() && hero_mana >= MANA_COST {
            hero_mana -= MANA_COST;
            (Action::Magic, damage(hero.intelligence, monster.magic_defense))
        } else {
            (Action::Physical, damage(hero.strength, monster.defense))
        };
        monster_hp -= hero_damage;

        let (monster_action, monster_damage) =
            if monster_mana >= MANA_COST && rng.random_bool(0.5) {
                monster_mana -= MANA_COST;
                (Action::Magic, damage(monster.intelligence, hero.magic_defense))
            } else {
                (Action::Physical, damage(monster.strength, hero.defense))
            };
        hero_hp -= monster_damage;

        hero_hp = hero_hp.max(0.0);
        monster_hp = monster_hp.max(0.0);

        let record = TurnRecord {
            turn: t + 1,
            hero_action,
            hero_damage,
            monster_action,
            monster_damage,
            hero_hp,
            monster_hp,
        };
        log::debug!("{record}");
        turns.push(record);
    }

    Battle {
        sequence,
        turns,
        hero_hp,
        monster_hp,
    }
}

/// A fixed matchup with a known outcome, used to teach the net.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scenario {
    pub name: &'static str,
    pub hero: Attributes,
    pub monster: Attributes,
    pub label: f64,
}

/// Strong hero against a fragile caster.
pub const EASY_WIN: Scenario = Scenario {
    name: "easy win",
    hero: Attributes::new(100.0, 50.0, 90.0, 20.0, 80.0, 50.0),
    monster: Attributes::new(100.0, 100.0, 20.0, 80.0, 10.0, 80.0),
    label: 1.0,
};

/// Weak hero against a boss.
pub const CERTAIN_LOSS: Scenario = Scenario {
    name: "certain loss",
    hero: Attributes::new(80.0, 20.0, 30.0, 30.0, 20.0, 20.0),
    monster: Attributes::new(200.0, 100.0, 90.0, 90.0, 80.0, 80.0),
    label: 0.0,
};

pub const CANNED_SCENARIOS: [Scenario; 2] = [EASY_WIN, CERTAIN_LOSS];
