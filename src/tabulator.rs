//! Per-timestep tallies of the population.
//!
//! Every person falls in exactly one of the disjoint categories uninfected, immune, dead or
//! infected-at-tier-k, so the disjoint counts always sum to the population size. Isolation is
//! tallied separately because an isolated person is also counted in their infection tier.
use serde::Serialize;

use crate::drugs::Tier;
use crate::person::{Person, PersonStatus};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TimestepCounts {
    pub timestep: usize,
    pub uninfected: usize,
    pub immune: usize,
    pub dead: usize,
    pub isolated: usize,
    /// Slot 0 is the susceptible tier, slot `k + 1` is resistant up to drug `k`.
    pub infected_by_tier: Vec<usize>,
}

impl TimestepCounts {
    #[must_use]
    pub fn new(timestep: usize, num_tiers: usize) -> Self {
        TimestepCounts {
            timestep,
            uninfected: 0,
            immune: 0,
            dead: 0,
            isolated: 0,
            infected_by_tier: vec![0; num_tiers],
        }
    }

    /// Adds one person to the tallies.
    pub fn record(&mut self, person: &Person) {
        match person.status() {
            PersonStatus::Immune => self.immune += 1,
            PersonStatus::Dead => self.dead += 1,
            PersonStatus::Uninfected => self.uninfected += 1,
            PersonStatus::Infected { tier, .. } => self.infected_by_tier[tier.bucket()] += 1,
        }
        if person.is_isolated() {
            self.isolated += 1;
        }
    }

    #[must_use]
    pub fn infected(&self) -> usize {
        self.infected_by_tier.iter().sum()
    }

    #[must_use]
    pub fn infected_at(&self, tier: Tier) -> usize {
        self.infected_by_tier.get(tier.bucket()).copied().unwrap_or(0)
    }

    /// Sum of the disjoint categories.
    #[must_use]
    pub fn total(&self) -> usize {
        self.uninfected + self.immune + self.dead + self.infected()
    }
}

/// The outcome of a run, as consumed by downstream analysis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FinalState {
    pub deaths: usize,
    pub immune: usize,
    pub infected_by_tier: Vec<usize>,
}

impl From<&TimestepCounts> for FinalState {
    fn from(counts: &TimestepCounts) -> Self {
        FinalState {
            deaths: counts.dead,
            immune: counts.immune,
            infected_by_tier: counts.infected_by_tier.clone(),
        }
    }
}

/// Accumulates one [`TimestepCounts`] per timestep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tabulation {
    num_tiers: usize,
    pending: TimestepCounts,
    rows: Vec<TimestepCounts>,
}

impl Tabulation {
    #[must_use]
    pub fn new(num_tiers: usize) -> Self {
        Tabulation {
            num_tiers,
            pending: TimestepCounts::new(0, num_tiers),
            rows: Vec::new(),
        }
    }

    pub fn record_person(&mut self, person: &Person) {
        self.pending.record(person);
    }

    /// Stores the pending timestep's counts and starts the next timestep from zero.
    pub fn flush(&mut self) -> &TimestepCounts {
        let next = TimestepCounts::new(self.pending.timestep + 1, self.num_tiers);
        let finished = std::mem::replace(&mut self.pending, next);
        self.rows.push(finished);
        &self.rows[self.rows.len() - 1]
    }

    #[must_use]
    pub fn rows(&self) -> &[TimestepCounts] {
        &self.rows
    }

    #[must_use]
    pub fn num_tiers(&self) -> usize {
        self.num_tiers
    }

    #[must_use]
    pub fn last(&self) -> Option<&TimestepCounts> {
        self.rows.last()
    }

    #[must_use]
    pub fn uninfected_series(&self) -> Vec<usize> {
        self.rows.iter().map(|row| row.uninfected).collect()
    }

    #[must_use]
    pub fn immune_series(&self) -> Vec<usize> {
        self.rows.iter().map(|row| row.immune).collect()
    }

    #[must_use]
    pub fn death_series(&self) -> Vec<usize> {
        self.rows.iter().map(|row| row.dead).collect()
    }

    #[must_use]
    pub fn isolated_series(&self) -> Vec<usize> {
        self.rows.iter().map(|row| row.isolated).collect()
    }

    #[must_use]
    pub fn infected_series(&self, tier: Tier) -> Vec<usize> {
        self.rows.iter().map(|row| row.infected_at(tier)).collect()
    }

    /// The first timestep at which the most people were isolated.
    #[must_use]
    pub fn peak_isolation_timestep(&self) -> Option<usize> {
        let peak = self.rows.iter().map(|row| row.isolated).max()?;
        self.rows
            .iter()
            .find(|row| row.isolated == peak)
            .map(|row| row.timestep)
    }
}

/// Tallies a whole population at once.
pub fn count_people<'a>(
    timestep: usize,
    num_tiers: usize,
    people: impl IntoIterator<Item = &'a Person>,
) -> TimestepCounts {
    let mut counts = TimestepCounts::new(timestep, num_tiers);
    for person in people {
        counts.record(person);
    }
    counts
}
