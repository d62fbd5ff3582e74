use anyhow::Result;
use battle_rnn_core::scenario::{self, Attributes, Battle, ATTRIBUTE_COUNT};
use battle_rnn_core::{RecurrentNet, Verdict};
use dialoguer::{Confirm, Input};
use rand::Rng;

/// Interactive predictor around a trained net.
pub struct Shell<R> {
    net: RecurrentNet,
    rng: R,
}

#[derive(Debug)]
pub struct Assessment {
    pub battle: Battle,
    pub probability: f64,
    pub verdict: Verdict,
}

impl<R: Rng> Shell<R> {
    pub fn new(net: RecurrentNet, rng: R) -> Self {
        Self { net, rng }
    }

    /// Simulate the matchup and ask the net for the hero's odds.
    pub fn assess(&mut self, hero: &Attributes, monster: &Attributes) -> Assessment {
        let battle = scenario::simulate(hero, monster, &mut self.rng);
        let probability = self.net.forward(&battle.sequence);
        Assessment {
            battle,
            probability,
            verdict: Verdict::from_probability(probability),
        }
    }

    pub fn run(mut self) -> Result<()> {
        loop {
            println!("\n==========================================");
            println!("        DUEL PREDICTOR: RPG + RNN");
            println!("==========================================");

            let hero = prompt_attributes("Hero")?;
            let monster = prompt_attributes("Enemy")?;
            let assessment = self.assess(&hero, &monster);

            println!("\n--- simulated duel ---");
            for turn in &assessment.battle.turns {
                println!("{turn}");
            }
            println!(
                "Hero HP {:.0} | Enemy HP {:.0}",
                assessment.battle.hero_hp, assessment.battle.monster_hp
            );
            println!("\nWin chance: {:.2}%", assessment.probability * 100.0);
            println!("Verdict: {}", assessment.verdict);

            let again = Confirm::new()
                .with_prompt("Try another matchup?")
                .default(true)
                .interact()?;
            if !again {
                return Ok(());
            }
        }
    }
}

fn prompt_attributes(side: &str) -> Result<Attributes> {
    println!("\n{side} attributes:");
    let mut values = [0.0f64; ATTRIBUTE_COUNT];
    for (value, name) in values.iter_mut().zip(Attributes::NAMES) {
        *value = Input::<f64>::new()
            .with_prompt(format!("  {name}"))
            .validate_with(|v: &f64| -> Result<(), &str> {
                if v.is_finite() && *v >= 0.0 {
                    Ok(())
                } else {
                    Err("enter a non-negative number")
                }
            })
            .interact_text()?;
    }
    Ok(Attributes::from(values))
}
