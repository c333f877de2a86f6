//! Application systems
//!
//! Window, rendering, simulation stepping and the main loop that drives them.

mod frame_loop;
mod render;
mod simulation;
mod window;

pub use frame_loop::{FrameLoop, LoopHost, LoopState};
pub use render::{scene_modelview, FrameSettings, RenderError, RenderSystem, SurfaceRecovery};
pub use simulation::SimulationSystem;
pub use window::{WindowError, WindowSystem};
