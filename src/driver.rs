//! Top-level run modes.

use crate::config::{Config, TimeConfig};
use crate::simulation::{Simulation, Termination};
use crate::Error;

/// Describes a run of a configuration.
#[derive(Copy, Clone, Debug, Default)]
pub struct RunDescriptor {
    /// Resume from the last snapshot instead of starting afresh.
    pub restart: bool,
    /// Whether or not to show a progress bar.
    pub verbose: bool,
}

/// How a successful run ended.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RunOutcome {
    /// The run reached its step budget or a steady state.
    Completed { step: usize, time: f64 },
    /// The step search found a step size that stayed stable.
    StableStep { delta_t: f64 },
}

/// Runs `config` in the mode its `time` section selects.
pub fn run(config: &Config, desc: RunDescriptor) -> Result<RunOutcome, Error> {
    match config.time {
        TimeConfig::Fixed { delt, max_time } => {
            let budget = (max_time / delt).floor() as usize;
            run_to_completion(config, delt, Termination::Steps(budget), desc)
        }
        TimeConfig::SteadyState {
            delt,
            steady_state_threshold,
        } => {
            let termination = Termination::SteadyState {
                threshold: steady_state_threshold,
            };
            run_to_completion(config, delt, termination, desc)
        }
        TimeConfig::Stable {
            delt_max,
            delt_min,
            max_timesteps,
            ..
        } => {
            if desc.restart {
                tracing::warn!("the step size search always starts afresh, ignoring restart");
            }
            search_stable_step(config, delt_max, delt_min, max_timesteps)
        }
    }
}

fn run_to_completion(
    config: &Config,
    delta_t: f64,
    termination: Termination,
    desc: RunDescriptor,
) -> Result<RunOutcome, Error> {
    let mut simulation = Simulation::new(config.simulation_descriptor())?;
    if desc.restart {
        simulation.restart(delta_t, termination)?;
    } else {
        simulation.start(delta_t, termination)?;
        simulation.save()?;
    }

    // setup output if verbose
    let bar = match termination {
        Termination::Steps(budget) if desc.verbose => {
            let bar = indicatif::ProgressBar::new(budget as u64);
            bar.set_position(simulation.step() as u64);
            Some(bar)
        }
        _ => None,
    };

    while simulation.next()? {
        if config.phase_field.stability_check && !simulation.stable() {
            if let Some(ref bar) = bar {
                bar.abandon();
            }
            tracing::error!(step = simulation.step(), "undercooling left its bounds");
            return Err(Error::Unstable {
                step: simulation.step(),
            });
        }

        if let Some(ref bar) = bar {
            bar.set_position(simulation.step() as u64);
        }
        if let (Termination::SteadyState { .. }, Some(tracker)) = (termination, simulation.tracker())
        {
            let (v, v0) = (tracker.velocity(), tracker.previous_velocity());
            tracing::debug!(
                time = simulation.time(),
                position = tracker.position(),
                velocity = v,
                change = ((v - v0) / v).abs(),
                "tip"
            );
        }

        if simulation.save_timestep() {
            simulation.save()?;
        }
    }

    if let Some(ref bar) = bar {
        bar.finish();
    }

    Ok(RunOutcome::Completed {
        step: simulation.step(),
        time: simulation.time(),
    })
}

fn search_stable_step(
    config: &Config,
    delta_t_max: f64,
    delta_t_min: f64,
    max_timesteps: usize,
) -> Result<RunOutcome, Error> {
    let decrease = config.time.step_decrease().ok_or_else(|| Error::Config {
        reason: "the step size search needs a decrease rule".to_string(),
    })?;

    let mut delta_t = delta_t_max;
    while delta_t > delta_t_min {
        tracing::info!(delta_t, "trying step size");
        let mut simulation = Simulation::new(config.simulation_descriptor())?;
        simulation.start(delta_t, Termination::Steps(max_timesteps))?;
        simulation.save()?;

        let mut stable = true;
        while simulation.next()? {
            if !simulation.stable() {
                tracing::warn!(delta_t, step = simulation.step(), "unstable step size");
                stable = false;
                break;
            }
            if simulation.save_timestep() {
                simulation.save()?;
            }
        }

        if stable && simulation.stable() {
            tracing::info!(delta_t, "found stable step size");
            return Ok(RunOutcome::StableStep { delta_t });
        }
        delta_t = decrease.apply(delta_t);
    }

    Err(Error::NoStableStep {
        delta_t_min,
    })
}
