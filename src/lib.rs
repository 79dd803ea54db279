//! An agent-based model of antibiotic-resistant infection.
//!
//! A fixed population of people moves through discrete timesteps. An infection carries a
//! resistance tier: susceptible, or resistant up to and including some drug of an ordered
//! [`Formulary`](drugs::Formulary). Each timestep every infected person:
//!
//! * starts or escalates treatment,
//! * may be isolated, either because their treatment has reached a threshold drug or because a
//!   rapid-detection product found an infection at or above its threshold tier,
//! * may recover (becoming permanently immune), acquire resistance to their current drug, or die,
//! * and, if not isolated, may pass their infection on to randomly chosen people.
//!
//! Spread reads every spreader as they stood before the spread pass began, so an infection
//! never travels more than one contact per timestep.
//!
//! The usual entry point is [`Model`]:
//!
//! ```rust
//! use tiered_resistance::{Model, Parameters};
//!
//! let parameters = Parameters { population_size: 50, ..Parameters::default() };
//! let mut model = Model::new(&parameters).unwrap();
//! model.run(parameters.num_timesteps).unwrap();
//! let final_state = model.final_state();
//! assert_eq!(
//!     final_state.deaths
//!         + final_state.immune
//!         + final_state.infected_by_tier.iter().sum::<usize>()
//!         + model.tabulation().last().unwrap().uninfected,
//!     50
//! );
//! ```
pub mod drugs;
pub mod error;
pub mod hashing;
pub mod infection;
pub mod log;
pub mod model;
pub mod parameters;
pub mod person;
pub mod population;
pub mod random;
pub mod report;
pub mod runner;
pub mod tabulator;
pub mod treatment;

#[cfg(feature = "progress_bar")]
pub mod progress;

pub use drugs::{DrugId, Formulary, Tier};
pub use error::ResistanceError;
pub use infection::Infection;
pub use model::Model;
pub use parameters::{Config, IsolationPolicy, Parameters};
pub use person::{Person, PersonId, PersonStatus};
pub use population::Population;
pub use tabulator::{FinalState, Tabulation, TimestepCounts};
pub use treatment::Treatment;

// Re-exports for the `define_rng!` macro.
pub use paste;
pub use rand;
