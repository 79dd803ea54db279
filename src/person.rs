//! The agent of the model and its per-timestep state machine.
//!
//! A person is in exactly one of four states: uninfected, infected (possibly isolated and
//! possibly treated), immune, or dead. Immune and dead are terminal. Every timestep each living
//! infected person is advanced by [`Person::transition`], which applies, in order:
//!
//! 1. treatment assignment or escalation,
//! 2. the isolation decision,
//! 3. recovery, which ends the timestep for this person,
//! 4. mutation towards resistance to the current drug,
//! 5. death, which ends the timestep for this person,
//! 6. advancing the infection and treatment clocks.
//!
//! Spreading is a separate pass ([`Person::spread_to`]) that reads the spreader from the
//! pre-spread population and writes receivers into a snapshot of it.
use std::fmt::{self, Display};

use log::trace;
use serde::Serialize;

use crate::drugs::Tier;
use crate::error::ResistanceError;
use crate::infection::Infection;
use crate::parameters::{Config, IsolationPolicy};
use crate::rand::Rng;
use crate::random::sample_without_replacement;
use crate::treatment::Treatment;

/// Stable index of a person in the population.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct PersonId(pub(crate) usize);

impl PersonId {
    #[must_use]
    pub fn new(index: usize) -> Self {
        PersonId(index)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Person {}", self.0)
    }
}

/// The mutually exclusive top-level state of a person.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PersonStatus {
    Uninfected,
    Infected { tier: Tier, isolated: bool },
    Immune,
    Dead,
}

/// What happened to a person during [`Person::transition`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The person was not living and infected, so nothing was evaluated.
    Inactive,
    Recovered,
    Died,
    /// Still infected at the end of the timestep.
    Continuing,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Person {
    infection: Option<Infection>,
    treatment: Option<Treatment>,
    isolated: bool,
    immune: bool,
    alive: bool,
}

impl Default for Person {
    fn default() -> Self {
        Person {
            infection: None,
            treatment: None,
            isolated: false,
            immune: false,
            alive: true,
        }
    }
}

impl Person {
    /// A living, uninfected, non-immune person.
    #[must_use]
    pub fn new() -> Self {
        Person::default()
    }

    #[must_use]
    pub fn with_infection(infection: Infection) -> Self {
        Person {
            infection: Some(infection),
            ..Person::default()
        }
    }

    #[must_use]
    pub fn infection(&self) -> Option<&Infection> {
        self.infection.as_ref()
    }

    #[must_use]
    pub fn treatment(&self) -> Option<&Treatment> {
        self.treatment.as_ref()
    }

    #[must_use]
    pub fn is_isolated(&self) -> bool {
        self.isolated
    }

    #[must_use]
    pub fn is_immune(&self) -> bool {
        self.immune
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Living and carrying an infection.
    #[must_use]
    pub fn is_infected(&self) -> bool {
        self.alive && self.infection.is_some()
    }

    /// Timesteps the current infection has been carried, or zero when uninfected.
    #[must_use]
    pub fn time_infected(&self) -> u32 {
        self.infection.map_or(0, |infection| infection.time_infected())
    }

    #[must_use]
    pub fn status(&self) -> PersonStatus {
        if self.immune {
            PersonStatus::Immune
        } else if !self.alive {
            PersonStatus::Dead
        } else {
            match self.infection {
                None => PersonStatus::Uninfected,
                Some(infection) => PersonStatus::Infected {
                    tier: infection.tier(),
                    isolated: self.isolated,
                },
            }
        }
    }

    /// Gives the person `infection` if it is strictly more resistant than what they carry.
    /// Has no effect on immune or dead people. Returns whether the infection was taken.
    pub fn infect(&mut self, infection: Infection) -> bool {
        let directional = self
            .infection
            .is_none_or(|own| infection.tier() > own.tier());
        if directional && self.alive && !self.immune {
            self.infection = Some(infection);
            true
        } else {
            false
        }
    }

    /// Isolates a living, non-immune person. Returns whether the person is now isolated.
    pub fn isolate(&mut self) -> bool {
        if self.alive && !self.immune {
            self.isolated = true;
        }
        self.isolated
    }

    /// Clears the infection and treatment and makes the person permanently immune.
    pub fn recover(&mut self) {
        self.infection = None;
        self.treatment = None;
        self.isolated = false;
        self.immune = true;
        self.check_invariants();
    }

    /// Clears the infection and treatment and marks the person dead.
    pub fn die(&mut self) {
        self.infection = None;
        self.treatment = None;
        self.isolated = false;
        self.alive = false;
        self.check_invariants();
    }

    fn check_invariants(&self) {
        debug_assert!(
            !self.immune || (self.infection.is_none() && self.treatment.is_none()),
            "immune person still carries an infection or treatment"
        );
        debug_assert!(
            self.alive || (self.infection.is_none() && self.treatment.is_none()),
            "dead person still carries an infection or treatment"
        );
    }

    /// Advances a living infected person by one timestep. See the module documentation for
    /// the order of the steps.
    pub fn transition<R: Rng + ?Sized>(&mut self, config: &Config, rng: &mut R) -> Transition {
        let Some(mut infection) = self.infection.filter(|_| self.alive) else {
            return Transition::Inactive;
        };
        let formulary = &config.formulary;

        let mut treatment = match self.treatment {
            None => Treatment::default(),
            Some(mut treatment) => {
                if treatment.time_treated() > config.escalation.lag_timesteps
                    && rng.random_bool(config.escalation.probability)
                    && treatment.escalate(formulary)
                {
                    trace!("treatment escalated to drug {}", treatment.drug());
                }
                treatment
            }
        };

        self.decide_isolation(config, &infection, &mut treatment, rng);

        let rates = infection.rates(formulary);
        let general_recovery = rng.random_bool(rates.general_recovery_probability);
        let treatment_recovery = treatment.counters(&infection)
            && rng.random_bool(
                formulary
                    .drug(treatment.drug())
                    .treatment_recovery_probability(),
            );
        if general_recovery || treatment_recovery {
            self.recover();
            return Transition::Recovered;
        }

        if rng.random_bool(rates.mutation_probability)
            && infection.make_resistant(treatment.drug())
        {
            trace!("infection mutated to tier {}", infection.tier().ordinal());
        }

        if rng.random_bool(infection.death_probability(formulary)) {
            self.die();
            return Transition::Died;
        }

        infection.tick();
        treatment.tick();
        self.infection = Some(infection);
        self.treatment = Some(treatment);
        Transition::Continuing
    }

    /// Isolates on a positive product test and, depending on the policy, on reaching the
    /// isolation threshold drug. Isolation is never lifted here.
    fn decide_isolation<R: Rng + ?Sized>(
        &mut self,
        config: &Config,
        infection: &Infection,
        treatment: &mut Treatment,
        rng: &mut R,
    ) {
        let mut tested = false;
        if let Some(detection) = config.detection {
            if rng.random_bool(detection.probability) {
                tested = true;
                if infection.is_resistant_to(detection.threshold) {
                    self.isolated = true;
                    if detection.raise_treatment {
                        treatment.raise_to(detection.threshold);
                    }
                }
            }
        }

        let treatment_check = match config.detection {
            Some(detection) if detection.policy == IsolationPolicy::Exclusive => !tested,
            _ => true,
        };
        if treatment_check && treatment.drug() >= config.isolation_threshold {
            self.isolated = true;
        }
    }

    /// Accepts `infection` if it is strictly more resistant than what this person carries and
    /// the person can be reached. Returns whether the infection was taken.
    pub fn receive(&mut self, infection: &Infection) -> bool {
        !self.isolated && self.infect(infection.transmitted())
    }

    /// Attempts to spread this person's infection to randomly chosen people in `snapshot`.
    ///
    /// `self` is read as it was before the spread pass began; only `snapshot` is written. The
    /// spreader's own slot in `snapshot` (`id`) is never chosen. Returns the people newly
    /// infected.
    pub fn spread_to<R: Rng + ?Sized>(
        &self,
        id: PersonId,
        config: &Config,
        snapshot: &mut [Person],
        rng: &mut R,
    ) -> Result<Vec<PersonId>, ResistanceError> {
        let Some(infection) = self.infection.filter(|_| self.alive && !self.isolated) else {
            return Ok(Vec::new());
        };

        let rates = infection.rates(&config.formulary);
        if !rng.random_bool(rates.spread_probability) {
            return Ok(Vec::new());
        }

        let contacts =
            sample_without_replacement(rng, snapshot.len(), rates.spread_count, Some(id.0))?;
        let mut infected = Vec::new();
        for index in contacts {
            if snapshot[index].receive(&infection) {
                trace!("{id} infected Person {index}");
                infected.push(PersonId(index));
            }
        }
        Ok(infected)
    }
}

impl Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status() {
            PersonStatus::Dead => write!(f, "Dead person"),
            PersonStatus::Immune => write!(f, "Immune person"),
            PersonStatus::Uninfected => write!(f, "Uninfected person"),
            PersonStatus::Infected { tier, isolated } => {
                write!(f, "Person infected at tier {}", tier.ordinal())?;
                match self.treatment {
                    Some(treatment) => write!(
                        f,
                        " and treated with drug {} for {} timesteps",
                        treatment.drug(),
                        treatment.time_treated()
                    )?,
                    None => write!(f, " and untreated")?,
                }
                if isolated {
                    write!(f, " (isolated)")?;
                }
                Ok(())
            }
        }
    }
}
