//! A console progress bar over the timesteps of a run.
//!
//! The runner initializes the bar with the number of timesteps before calling
//! [`Model::run`](crate::model::Model::run), which advances it after every timestep. Updating a
//! bar that was never initialized does nothing, so library users who do not want one need not
//! do anything.
//!
//! ```ignore
//! init_timestep_progress_bar(parameters.num_timesteps);
//! model.run(parameters.num_timesteps)?;
//! ```

use crate::log::{trace, warn};
use progress_bar::{
    finalize_progress_bar, init_progress_bar, set_progress_bar_action, set_progress_bar_progress,
    Color, Style,
};
use std::sync::OnceLock;

/// The number of timesteps the bar was initialized with.
static MAX_TIMESTEPS: OnceLock<usize> = OnceLock::new();

/// Initializes the progress bar with the number of timesteps the run will take. Only the
/// first call has an effect.
pub fn init_timestep_progress_bar(max_timesteps: usize) {
    if MAX_TIMESTEPS.set(max_timesteps).is_err() {
        warn!("timestep progress bar already initialized");
        return;
    }
    trace!("initializing timestep progress bar with {max_timesteps} timesteps");
    init_progress_bar(max_timesteps);
    set_progress_bar_action("Timestep", Color::Blue, Style::Bold);
}

/// Moves the bar to `completed` timesteps, finalizing it once the run is complete.
pub(crate) fn update_timestep_progress(completed: usize) {
    let Some(&max_timesteps) = MAX_TIMESTEPS.get() else {
        return;
    };
    let completed = completed.min(max_timesteps);
    set_progress_bar_progress(completed);
    if completed == max_timesteps {
        finalize_progress_bar();
    }
}
