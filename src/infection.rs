use serde::Serialize;

use crate::drugs::{DrugId, Formulary, Tier};
use crate::parameters::ResistanceRates;

/// One pathogen instance carried by one person.
///
/// Resistance only ever increases over the life of an infection. The epidemiological rates are
/// not stored; they are looked up from the [`Formulary`] by tier, so raising the tier changes
/// every rate at once.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize)]
pub struct Infection {
    tier: Tier,
    time_infected: u32,
}

impl Infection {
    #[must_use]
    pub fn new(tier: Tier) -> Self {
        Infection {
            tier,
            time_infected: 0,
        }
    }

    #[must_use]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Timesteps since this infection was acquired.
    #[must_use]
    pub fn time_infected(&self) -> u32 {
        self.time_infected
    }

    #[must_use]
    pub fn is_resistant_to(&self, drug: DrugId) -> bool {
        self.tier >= Tier::Resistant(drug)
    }

    /// Makes the infection resistant to `drug` (and so to every weaker drug). Never lowers the
    /// tier; returns whether it changed.
    pub fn make_resistant(&mut self, drug: DrugId) -> bool {
        let tier = Tier::Resistant(drug);
        if tier > self.tier {
            self.tier = tier;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn rates<'a>(&self, formulary: &'a Formulary) -> &'a ResistanceRates {
        formulary.rates(self.tier)
    }

    /// Probability of killing its host this timestep.
    #[must_use]
    pub fn death_probability(&self, formulary: &Formulary) -> f64 {
        self.rates(formulary).death.probability(self.time_infected)
    }

    /// The copy handed to a newly infected person: same tier, fresh clock.
    #[must_use]
    pub fn transmitted(&self) -> Self {
        Infection::new(self.tier)
    }

    pub(crate) fn tick(&mut self) {
        self.time_infected += 1;
    }
}
