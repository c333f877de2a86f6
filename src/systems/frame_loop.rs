//! Main loop state machine
//!
//! `Initializing → Running → Terminating`. The loop leaves `Running` only on
//! an exit action (Escape pressed) or a fatal error; window close requests
//! and every other event keep it running.
//!
//! Each running iteration steps the simulation, renders, polls input and
//! then sleeps for the timestep, in that order. The window, renderer and
//! engine are reached through [`LoopHost`].

use sofa_core::SimulationEngine;

use super::simulation::SimulationSystem;
use crate::error::AppError;
use crate::input::InputAction;

/// What the main loop drives each iteration
pub trait LoopHost {
    /// The engine being stepped
    fn engine(&mut self) -> &mut dyn SimulationEngine;

    /// Render the engine's current state
    fn render(&mut self) -> Result<(), AppError>;

    /// Poll pending window events without blocking
    fn poll_events(&mut self) -> Result<Vec<InputAction>, AppError>;

    /// Wait out the rest of the iteration
    fn pause(&mut self, dt: f64) {
        std::thread::sleep(SimulationSystem::pause_for(dt));
    }
}

/// Lifecycle state of the main loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Engine and display are being set up
    Initializing,
    /// Stepping, rendering and polling every iteration
    Running,
    /// Resources are being released
    Terminating,
}

/// Tracks the main loop's state and counts its iterations
#[derive(Debug)]
pub struct FrameLoop {
    state: LoopState,
    iterations: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Initializing,
            iterations: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn is_terminating(&self) -> bool {
        self.state == LoopState::Terminating
    }

    /// Completed `Running` iterations
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Setup finished; only valid once, from `Initializing`
    pub fn initialized(&mut self) {
        if self.state == LoopState::Initializing {
            log::info!("Entering main loop");
            self.state = LoopState::Running;
        }
    }

    /// Record one finished iteration
    pub fn iteration_done(&mut self) {
        if self.is_running() {
            self.iterations += 1;
        }
    }

    /// Apply a mapped input action
    pub fn handle_action(&mut self, action: InputAction) {
        match action {
            InputAction::Exit => {
                if self.state != LoopState::Terminating {
                    log::info!("Exit requested after {} iterations", self.iterations);
                }
                self.state = LoopState::Terminating;
            }
        }
    }

    /// A fatal error ends the loop from any state
    pub fn fail(&mut self) {
        self.state = LoopState::Terminating;
    }

    /// Run one iteration: step, render, poll, then sleep for the timestep
    ///
    /// An exit action seen while polling ends the loop before the sleep.
    /// Does nothing unless the loop is running.
    pub fn run_iteration(
        &mut self,
        simulation: &mut SimulationSystem,
        host: &mut dyn LoopHost,
    ) -> Result<(), AppError> {
        if !self.is_running() {
            return Ok(());
        }

        let dt = simulation.step(host.engine())?;
        host.render()?;
        for action in host.poll_events()? {
            self.handle_action(action);
        }
        if self.is_terminating() {
            return Ok(());
        }

        host.pause(dt);
        self.iteration_done();
        Ok(())
    }

    /// Iterate until an exit action or a fatal error
    pub fn run(
        &mut self,
        simulation: &mut SimulationSystem,
        host: &mut dyn LoopHost,
    ) -> Result<(), AppError> {
        while self.is_running() {
            if let Err(e) = self.run_iteration(simulation, host) {
                self.fail();
                return Err(e);
            }
        }
        Ok(())
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}
