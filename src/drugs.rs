//! The ordered list of drugs a population is treated with, and the resistance tiers it induces.
//!
//! Drugs are ordered from first-line to last-resort. A pathogen resistant to a drug is resistant
//! to every drug before it in the list, so resistance is a single ordinal: [`Tier::Susceptible`]
//! for a pathogen no drug fails against, or [`Tier::Resistant`] naming the strongest drug it has
//! beaten.
use std::fmt::{self, Display};

use serde::Serialize;

use crate::error::ResistanceError;
use crate::parameters::{DrugParameters, ResistanceRates};

/// Names accepted by [`Formulary::tier_of`] for the tier below every drug.
const SUSCEPTIBLE_NAMES: [&str; 1] = ["none"];

/// Index of a drug in the [`Formulary`]. Lower is first-line.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct DrugId(pub(crate) usize);

impl DrugId {
    /// The first-line drug every treatment starts on.
    pub const FIRST_LINE: DrugId = DrugId(0);

    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for DrugId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How resistant a pathogen is. Ordered so that a higher tier is more resistant.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize)]
pub enum Tier {
    #[default]
    Susceptible,
    Resistant(DrugId),
}

impl Tier {
    /// The ordinal of the tier: `-1` for a susceptible pathogen, otherwise the index of the
    /// strongest drug it resists.
    #[must_use]
    pub fn ordinal(self) -> i64 {
        match self {
            Tier::Susceptible => -1,
            Tier::Resistant(drug) => drug.0 as i64,
        }
    }

    /// Position of the tier in per-tier tallies, where slot 0 is the susceptible tier.
    #[must_use]
    pub fn bucket(self) -> usize {
        match self {
            Tier::Susceptible => 0,
            Tier::Resistant(drug) => drug.0 + 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Drug {
    name: String,
    treatment_recovery_probability: f64,
    resistance: ResistanceRates,
}

impl Drug {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Probability per timestep that a person on this drug recovers, given the drug works.
    #[must_use]
    pub fn treatment_recovery_probability(&self) -> f64 {
        self.treatment_recovery_probability
    }
}

/// The ordered drug list together with the epidemiological rates of each resistance tier.
#[derive(Clone, Debug, PartialEq)]
pub struct Formulary {
    drugs: Vec<Drug>,
    susceptible: ResistanceRates,
}

impl Formulary {
    /// Builds a formulary, rejecting an empty list, duplicated names, and drugs that shadow the
    /// name of the susceptible tier.
    pub fn new(
        drugs: &[DrugParameters],
        susceptible: ResistanceRates,
    ) -> Result<Formulary, ResistanceError> {
        if drugs.is_empty() {
            return Err(ResistanceError::ConfigError(
                "the drug list must contain at least one drug".to_string(),
            ));
        }

        let mut ordered: Vec<Drug> = Vec::with_capacity(drugs.len());
        for drug in drugs {
            if SUSCEPTIBLE_NAMES
                .iter()
                .any(|reserved| reserved.eq_ignore_ascii_case(&drug.name))
            {
                return Err(ResistanceError::ConfigError(format!(
                    "{:?} is reserved for the susceptible tier and cannot name a drug",
                    drug.name
                )));
            }
            if ordered.iter().any(|existing| existing.name == drug.name) {
                return Err(ResistanceError::ConfigError(format!(
                    "drug {:?} appears more than once",
                    drug.name
                )));
            }
            ordered.push(Drug {
                name: drug.name.clone(),
                treatment_recovery_probability: drug.treatment_recovery_probability,
                resistance: drug.resistance.clone(),
            });
        }

        Ok(Formulary {
            drugs: ordered,
            susceptible,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.drugs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drugs.is_empty()
    }

    /// Number of distinct tiers, including the susceptible tier.
    #[must_use]
    pub fn num_tiers(&self) -> usize {
        self.drugs.len() + 1
    }

    /// The last-resort drug.
    #[must_use]
    pub fn strongest(&self) -> DrugId {
        DrugId(self.drugs.len() - 1)
    }

    /// The next drug up from `drug`, or `None` if `drug` is the last resort.
    #[must_use]
    pub fn next(&self, drug: DrugId) -> Option<DrugId> {
        (drug.0 + 1 < self.drugs.len()).then(|| DrugId(drug.0 + 1))
    }

    pub fn drug_id(&self, name: &str) -> Result<DrugId, ResistanceError> {
        self.drugs
            .iter()
            .position(|drug| drug.name == name)
            .map(DrugId)
            .ok_or_else(|| ResistanceError::UnknownDrug(name.to_string()))
    }

    /// Maps a resistance label to its tier. `"none"` is the susceptible tier; any other label
    /// must name a configured drug.
    pub fn tier_of(&self, name: &str) -> Result<Tier, ResistanceError> {
        if SUSCEPTIBLE_NAMES
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(name))
        {
            return Ok(Tier::Susceptible);
        }
        self.drug_id(name).map(Tier::Resistant)
    }

    /// # Panics
    ///
    /// Panics if `drug` did not come from this formulary.
    #[must_use]
    pub fn drug(&self, drug: DrugId) -> &Drug {
        &self.drugs[drug.0]
    }

    pub fn drugs(&self) -> impl Iterator<Item = (DrugId, &Drug)> {
        self.drugs
            .iter()
            .enumerate()
            .map(|(index, drug)| (DrugId(index), drug))
    }

    /// The epidemiological rates of a pathogen at `tier`.
    #[must_use]
    pub fn rates(&self, tier: Tier) -> &ResistanceRates {
        match tier {
            Tier::Susceptible => &self.susceptible,
            Tier::Resistant(drug) => &self.drugs[drug.0].resistance,
        }
    }

    /// Human-readable label of a tier: `"none"` or the drug's name.
    #[must_use]
    pub fn tier_name(&self, tier: Tier) -> &str {
        match tier {
            Tier::Susceptible => SUSCEPTIBLE_NAMES[0],
            Tier::Resistant(drug) => &self.drugs[drug.0].name,
        }
    }

    /// Every tier from susceptible up to the last resort.
    pub fn tiers(&self) -> impl Iterator<Item = Tier> {
        std::iter::once(Tier::Susceptible)
            .chain((0..self.drugs.len()).map(|index| Tier::Resistant(DrugId(index))))
    }
}
