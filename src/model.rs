//! The simulation engine.
//!
//! Each call to [`Model::step`] advances the population by one timestep:
//!
//! 1. every person is tallied as they stand, then advanced by [`Person::transition`];
//! 2. the live population is copied into the snapshot buffer;
//! 3. every person in the live buffer attempts to spread into the snapshot;
//! 4. the snapshot becomes the live population;
//! 5. the timestep's tallies are stored.
//!
//! Transition draws come from a stream per (timestep, person), so they do not depend on the
//! order people are visited. Spread draws come from one stream per timestep consumed in
//! population order; two spreaders targeting the same receiver are applied in that order, and
//! a receiver only ever moves to a strictly higher tier.
use std::time::Instant;

use log::{debug, info, trace, warn};

use crate::define_rng;
use crate::error::ResistanceError;
use crate::parameters::{Config, Parameters};
use crate::person::{Person, PersonId, Transition};
use crate::population::Population;
use crate::random::RandomStreams;
use crate::tabulator::{count_people, FinalState, Tabulation, TimestepCounts};

define_rng!(TransitionRng);
define_rng!(SpreadRng);

/// Progress is logged every time this percentage of the run completes.
const REPORT_PERCENTAGE: usize = 5;

pub struct Model {
    config: Config,
    population: Population,
    tabulation: Tabulation,
    random: RandomStreams,
    timestep: usize,
}

impl Model {
    /// Validates `parameters` and seeds a population of `population_size` people, the last
    /// `initially_infected` of whom are infected.
    pub fn new(parameters: &Parameters) -> Result<Self, ResistanceError> {
        let config = parameters.validate()?;
        let population = Population::seeded(config.population_size, config.initially_infected);
        Ok(Self::build(config, population, parameters.seed))
    }

    /// Runs `parameters` over a prepared population instead of a seeded one. The population's
    /// size replaces `population_size` when validating.
    pub fn with_population(
        parameters: &Parameters,
        population: Population,
    ) -> Result<Self, ResistanceError> {
        let infected = population
            .iter()
            .filter(|(_, person)| person.is_infected())
            .count();
        let config = Parameters {
            population_size: population.len(),
            initially_infected: infected,
            ..parameters.clone()
        }
        .validate()?;
        Ok(Self::build(config, population, parameters.seed))
    }

    fn build(config: Config, population: Population, seed: Option<u64>) -> Self {
        let random = match seed {
            Some(seed) => RandomStreams::new(seed),
            None => {
                let random = RandomStreams::from_entropy();
                warn!(
                    "no random seed configured; rerun with seed {} to reproduce this run",
                    random.base_seed()
                );
                random
            }
        };
        let tabulation = Tabulation::new(config.formulary.num_tiers());
        Model {
            config,
            population,
            tabulation,
            random,
            timestep: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn tabulation(&self) -> &Tabulation {
        &self.tabulation
    }

    /// The number of timesteps completed so far.
    #[must_use]
    pub fn timestep(&self) -> usize {
        self.timestep
    }

    /// The base seed every random stream of this run derives from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.random.base_seed()
    }

    /// Tallies of the population as it stands now.
    #[must_use]
    pub fn current_counts(&self) -> TimestepCounts {
        count_people(
            self.timestep,
            self.config.formulary.num_tiers(),
            self.population.people(),
        )
    }

    /// Deaths, immunity and per-tier infections of the last recorded timestep, matching the
    /// last row of the timestep report. Before any timestep has run this is the population as
    /// it stands.
    #[must_use]
    pub fn final_state(&self) -> FinalState {
        match self.tabulation.last() {
            Some(last) => FinalState::from(last),
            None => FinalState::from(&self.current_counts()),
        }
    }

    /// Advances the model by one timestep and returns the tallies recorded for it.
    pub fn step(&mut self) -> Result<&TimestepCounts, ResistanceError> {
        let timestep = self.timestep;
        let mut recovered = 0usize;
        let mut died = 0usize;

        for (id, person) in self.population.iter_mut() {
            self.tabulation.record_person(person);
            let mut rng = self.random.person_rng(TransitionRng, timestep, id);
            match person.transition(&self.config, &mut rng) {
                Transition::Recovered => recovered += 1,
                Transition::Died => died += 1,
                Transition::Inactive | Transition::Continuing => {}
            }
        }

        let mut new_infections = 0usize;
        let mut rng = self.random.timestep_rng(SpreadRng, timestep);
        let (live, snapshot) = self.population.spread_buffers();
        for (index, spreader) in live.iter().enumerate() {
            new_infections += spreader
                .spread_to(PersonId::new(index), &self.config, snapshot, &mut rng)?
                .len();
        }
        self.population.commit();

        trace!(
            "timestep {timestep}: {recovered} recovered, {died} died, \
             {new_infections} new infections"
        );
        self.timestep += 1;
        let counts = self.tabulation.flush();
        debug!(
            "timestep {}: uninfected {}, immune {}, dead {}, infected {:?}, isolated {}",
            counts.timestep,
            counts.uninfected,
            counts.immune,
            counts.dead,
            counts.infected_by_tier,
            counts.isolated
        );
        Ok(counts)
    }

    /// Runs `num_timesteps` timesteps.
    pub fn run(&mut self, num_timesteps: usize) -> Result<(), ResistanceError> {
        info!(
            "running {} timesteps over {} people with seed {}",
            num_timesteps,
            self.population.len(),
            self.seed()
        );
        let start = Instant::now();
        let report_every = (num_timesteps * REPORT_PERCENTAGE / 100).max(1);

        for completed in 0..num_timesteps {
            let counts = self.step()?;
            if completed % report_every == 0 {
                info!(
                    "{:>3}% complete - uninfected: {}, immune: {}, dead: {}, \
                     infected: {:?}, isolated: {}",
                    completed * 100 / num_timesteps,
                    counts.uninfected,
                    counts.immune,
                    counts.dead,
                    counts.infected_by_tier,
                    counts.isolated
                );
            }
            #[cfg(feature = "progress_bar")]
            crate::progress::update_timestep_progress(completed + 1);
        }

        info!(
            "finished {} timesteps in {}",
            num_timesteps,
            humantime::format_duration(start.elapsed())
        );
        Ok(())
    }

    /// Every person in the live population, by id.
    pub fn people(&self) -> impl Iterator<Item = (PersonId, &Person)> {
        self.population.iter()
    }
}
