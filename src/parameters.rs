//! Model configuration.
//!
//! [`Parameters`] is the raw, serde-deserializable form read from a JSON file. Every field has a
//! default, so a config file only needs the values it changes. [`Parameters::validate`] turns
//! it into a [`Config`]: drug names resolved to tiers and every misconfiguration reported
//! before a run starts. The engine only ever sees a `Config`, and only by shared reference.
use std::fs;
use std::path::Path;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::drugs::{DrugId, Formulary};
use crate::error::ResistanceError;

/// Probability of death after `t` timesteps infected: `min(base + growth * t, 1)`, rounded to
/// four decimal places so that runs are reproducible across platforms.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeathRate {
    pub base_probability: f64,
    pub growth_per_timestep: f64,
}

impl DeathRate {
    #[must_use]
    pub fn probability(&self, time_infected: u32) -> f64 {
        let raw = self.base_probability + self.growth_per_timestep * f64::from(time_infected);
        ((raw.min(1.0) * 10_000.0).round() / 10_000.0).clamp(0.0, 1.0)
    }
}

impl Default for DeathRate {
    fn default() -> Self {
        DeathRate {
            base_probability: 0.01,
            growth_per_timestep: 0.0005,
        }
    }
}

/// Per-timestep rates of a pathogen at one resistance tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResistanceRates {
    pub general_recovery_probability: f64,
    pub mutation_probability: f64,
    pub spread_probability: f64,
    /// How many people an infected person contacts when they spread.
    pub spread_count: usize,
    pub death: DeathRate,
}

impl Default for ResistanceRates {
    fn default() -> Self {
        ResistanceRates {
            general_recovery_probability: 0.01,
            mutation_probability: 0.02,
            spread_probability: 0.8,
            spread_count: 1,
            death: DeathRate::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrugParameters {
    pub name: String,
    #[serde(default = "default_treatment_recovery_probability")]
    pub treatment_recovery_probability: f64,
    /// Rates of a pathogen resistant up to and including this drug.
    #[serde(default)]
    pub resistance: ResistanceRates,
}

fn default_treatment_recovery_probability() -> f64 {
    0.2
}

impl DrugParameters {
    #[must_use]
    pub fn named(name: &str) -> Self {
        DrugParameters {
            name: name.to_string(),
            treatment_recovery_probability: default_treatment_recovery_probability(),
            resistance: ResistanceRates::default(),
        }
    }
}

/// When treatment moves up to the next drug.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Escalation {
    /// Chance per timestep of moving up once the lag has passed.
    pub probability: f64,
    /// Timesteps a drug must have been given before escalation is considered.
    pub lag_timesteps: u32,
}

impl Default for Escalation {
    fn default() -> Self {
        Escalation {
            probability: 0.8,
            lag_timesteps: 5,
        }
    }
}

/// How detection by the product combines with treatment-based isolation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsolationPolicy {
    /// A person the product tested this timestep is isolated only on the test result; treatment
    /// tier is consulted only when the product did not test them.
    Exclusive,
    /// Both checks apply every timestep; either one can isolate.
    #[default]
    Independent,
}

/// The rapid-detection diagnostic whose effect the model evaluates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionProduct {
    pub in_use: bool,
    /// Chance per timestep that an infected person is tested.
    pub detection_probability: f64,
    /// A test isolates anyone whose infection is at or above this tier.
    pub detection_threshold: String,
    pub policy: IsolationPolicy,
    /// Whether a test also moves treatment straight up to the detection threshold drug.
    pub raise_treatment: bool,
}

impl Default for DetectionProduct {
    fn default() -> Self {
        DetectionProduct {
            in_use: true,
            detection_probability: 1.0,
            detection_threshold: "Carbopenamase".to_string(),
            policy: IsolationPolicy::default(),
            raise_treatment: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    pub population_size: usize,
    pub initially_infected: usize,
    pub num_timesteps: usize,
    /// Drugs ordered from first-line to last resort.
    pub drugs: Vec<DrugParameters>,
    /// Rates of a pathogen with no resistance.
    pub susceptible: ResistanceRates,
    pub escalation: Escalation,
    /// Name of the drug at which treatment-based isolation starts.
    pub isolation_threshold: String,
    pub product: DetectionProduct,
    /// `None` draws a fresh seed from the operating system.
    pub seed: Option<u64>,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            population_size: 250,
            initially_infected: 10,
            num_timesteps: 20,
            drugs: ["Penicillin", "Amoxycillin", "Carbopenamase", "Wonder drug"]
                .into_iter()
                .map(DrugParameters::named)
                .collect(),
            susceptible: ResistanceRates::default(),
            escalation: Escalation::default(),
            isolation_threshold: "Carbopenamase".to_string(),
            product: DetectionProduct::default(),
            seed: Some(0),
        }
    }
}

/// A product that is in use, with its threshold resolved.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Detection {
    pub probability: f64,
    pub threshold: DrugId,
    pub policy: IsolationPolicy,
    pub raise_treatment: bool,
}

/// Validated configuration threaded through every per-person operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub population_size: usize,
    pub initially_infected: usize,
    pub formulary: Formulary,
    pub escalation: Escalation,
    pub isolation_threshold: DrugId,
    /// `None` when the product is not in use.
    pub detection: Option<Detection>,
}

fn check_probability(name: &str, value: f64) -> Result<(), ResistanceError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ResistanceError::ConfigError(format!(
            "{name} must be a probability in [0, 1], got {value}"
        )))
    }
}

fn check_rates(
    tier: &str,
    rates: &ResistanceRates,
    population_size: usize,
) -> Result<(), ResistanceError> {
    check_probability(
        &format!("general recovery probability of tier {tier:?}"),
        rates.general_recovery_probability,
    )?;
    check_probability(
        &format!("mutation probability of tier {tier:?}"),
        rates.mutation_probability,
    )?;
    check_probability(
        &format!("spread probability of tier {tier:?}"),
        rates.spread_probability,
    )?;
    check_probability(
        &format!("base death probability of tier {tier:?}"),
        rates.death.base_probability,
    )?;
    if !rates.death.growth_per_timestep.is_finite() {
        return Err(ResistanceError::ConfigError(format!(
            "death growth of tier {tier:?} must be finite"
        )));
    }
    // A person never contacts themselves.
    let candidates = population_size.saturating_sub(1);
    if rates.spread_count > candidates {
        return Err(ResistanceError::ConfigError(format!(
            "tier {tier:?} spreads to {} people but only {candidates} other people exist",
            rates.spread_count
        )));
    }
    Ok(())
}

impl Parameters {
    /// Reads parameters from a JSON file. Fields missing from the file keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Parameters, ResistanceError> {
        trace!("loading parameters from {}", path.display());
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Parameters, ResistanceError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Checks every value and resolves drug names, failing on the first problem found.
    pub fn validate(&self) -> Result<Config, ResistanceError> {
        if self.population_size == 0 {
            return Err(ResistanceError::ConfigError(
                "population size must be positive".to_string(),
            ));
        }
        if self.initially_infected > self.population_size {
            return Err(ResistanceError::ConfigError(format!(
                "cannot infect {} people in a population of {}",
                self.initially_infected, self.population_size
            )));
        }

        let formulary = Formulary::new(&self.drugs, self.susceptible.clone())?;
        for tier in formulary.tiers() {
            check_rates(
                formulary.tier_name(tier),
                formulary.rates(tier),
                self.population_size,
            )?;
        }
        for (_, drug) in formulary.drugs() {
            check_probability(
                &format!("treatment recovery probability of {:?}", drug.name()),
                drug.treatment_recovery_probability(),
            )?;
        }

        check_probability("escalation probability", self.escalation.probability)?;
        let isolation_threshold = formulary.drug_id(&self.isolation_threshold)?;

        let detection = if self.product.in_use {
            check_probability(
                "product detection probability",
                self.product.detection_probability,
            )?;
            Some(Detection {
                probability: self.product.detection_probability,
                threshold: formulary.drug_id(&self.product.detection_threshold)?,
                policy: self.product.policy,
                raise_treatment: self.product.raise_treatment,
            })
        } else {
            None
        };

        debug!(
            "validated parameters: {} people, {} drugs, product in use: {}",
            self.population_size,
            formulary.len(),
            detection.is_some()
        );

        Ok(Config {
            population_size: self.population_size,
            initially_infected: self.initially_infected,
            formulary,
            escalation: self.escalation,
            isolation_threshold,
            detection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn death_rate_grows_and_clamps() {
        let rate = DeathRate::default();
        assert_approx_eq!(rate.probability(0), 0.01);
        assert_approx_eq!(rate.probability(10), 0.015);
        assert_approx_eq!(rate.probability(100_000), 1.0);

        let negative = DeathRate {
            base_probability: 0.0,
            growth_per_timestep: -0.1,
        };
        assert_approx_eq!(negative.probability(5), 0.0);
    }

    #[test]
    fn death_rate_is_rounded() {
        let rate = DeathRate {
            base_probability: 0.1,
            growth_per_timestep: 0.000_01,
        };
        assert_approx_eq!(rate.probability(3), 0.1, 1e-12);
        assert_approx_eq!(rate.probability(6), 0.1001, 1e-12);
    }

    #[test]
    fn defaults_validate() {
        let config = Parameters::default().validate().unwrap();
        assert_eq!(config.population_size, 250);
        assert_eq!(config.formulary.len(), 4);
        assert_eq!(config.isolation_threshold, DrugId(2));
        let detection = config.detection.unwrap();
        assert_eq!(detection.threshold, DrugId(2));
        assert_eq!(detection.policy, IsolationPolicy::Independent);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let parameters = Parameters::from_json_str(
            r#"{
                "population_size": 25,
                "seed": null,
                "product": { "in_use": false },
                "drugs": [
                    { "name": "A" },
                    { "name": "B", "treatment_recovery_probability": 0.5 }
                ],
                "isolation_threshold": "B"
            }"#,
        )
        .unwrap();
        assert_eq!(parameters.population_size, 25);
        assert_eq!(parameters.num_timesteps, 20);
        assert_eq!(parameters.seed, None);
        assert!(!parameters.product.in_use);
        assert_approx_eq!(parameters.drugs[1].treatment_recovery_probability, 0.5);

        let config = parameters.validate().unwrap();
        assert!(config.detection.is_none());
        assert_eq!(config.isolation_threshold, DrugId(1));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = Parameters::from_json_str(r#"{ "populaton_size": 25 }"#);
        assert!(matches!(result, Err(ResistanceError::JsonError(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "num_timesteps": 7, "policy_unused": null }}"#).unwrap();
        assert!(Parameters::from_json_file(file.path()).is_err());

        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "num_timesteps": 7 }}"#).unwrap();
        let parameters = Parameters::from_json_file(file.path()).unwrap();
        assert_eq!(parameters.num_timesteps, 7);
    }

    #[test]
    fn spread_count_must_fit_population() {
        let mut parameters = Parameters {
            population_size: 3,
            initially_infected: 1,
            ..Parameters::default()
        };
        parameters.susceptible.spread_count = 2;
        assert!(parameters.validate().is_ok());

        parameters.susceptible.spread_count = 3;
        assert!(matches!(
            parameters.validate(),
            Err(ResistanceError::ConfigError(_))
        ));
    }

    #[test]
    fn rejects_bad_values() {
        let zero = Parameters {
            population_size: 0,
            initially_infected: 0,
            ..Parameters::default()
        };
        assert!(zero.validate().is_err());

        let overseeded = Parameters {
            population_size: 5,
            initially_infected: 6,
            ..Parameters::default()
        };
        assert!(overseeded.validate().is_err());

        let mut bad_probability = Parameters::default();
        bad_probability.drugs[2].resistance.mutation_probability = 1.5;
        assert!(matches!(
            bad_probability.validate(),
            Err(ResistanceError::ConfigError(_))
        ));

        let unknown_threshold = Parameters {
            isolation_threshold: "Vancomycin".to_string(),
            ..Parameters::default()
        };
        assert!(matches!(
            unknown_threshold.validate(),
            Err(ResistanceError::UnknownDrug(_))
        ));
    }

    #[test]
    fn unknown_detection_threshold_only_matters_in_use() {
        let mut parameters = Parameters::default();
        parameters.product.detection_threshold = "Vancomycin".to_string();
        assert!(parameters.validate().is_err());
        parameters.product.in_use = false;
        assert!(parameters.validate().is_ok());
    }
}
