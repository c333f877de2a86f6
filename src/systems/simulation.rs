//! Simulation stepping system
//!
//! Advances the engine by one fixed timestep per loop iteration and paces the
//! loop with a sleep of the same length. The sleep does not subtract the time
//! spent simulating and rendering, so the loop runs slower than real time
//! under load.

use std::time::Duration;

use sofa_core::{EngineError, SimulationEngine};

/// Drives the engine's fixed-timestep simulation
pub struct SimulationSystem {
    steps: u64,
}

impl SimulationSystem {
    /// Create a new simulation system
    pub fn new() -> Self {
        Self { steps: 0 }
    }

    /// Number of completed steps
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Run one simulation step: `animate(dt)` then `update_visual()`
    ///
    /// Returns the timestep that was used.
    pub fn step(&mut self, engine: &mut dyn SimulationEngine) -> Result<f64, EngineError> {
        let dt = engine.dt();
        engine.animate(dt)?;
        engine.update_visual()?;
        self.steps += 1;
        log::trace!("step {} (dt = {})", self.steps, dt);
        Ok(dt)
    }

    /// Sleep length for a timestep; invalid timesteps do not sleep
    pub fn pause_for(dt: f64) -> Duration {
        Duration::try_from_secs_f64(dt).unwrap_or(Duration::ZERO)
    }
}

impl Default for SimulationSystem {
    fn default() -> Self {
        Self::new()
    }
}
