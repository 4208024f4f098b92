// CONTROLLER: input, game logic, and update loop
pub mod combat;
mod contact;
pub mod frame_loop;
pub mod input;
pub mod physics;
pub mod player_controller;
pub mod scheduler;
pub mod state;

pub use combat::{CombatResolver, ShotEvent, ShotOutcome, ShotReport};
pub use frame_loop::{FrameEvent, FrameLoop, FrameOutput, FrameStage, FRAME_STAGE_ORDER};
pub use input::{HudButton, InputEvent, InputSnapshot, InputState, KeyBindings, MouseButton};
pub use physics::PhysicsWorld;
pub use player_controller::{
    ControlOutcome, GroundedCheck, PlayerController, VerticalSpeedHeuristic,
};
pub use scheduler::{Scheduler, TaskHandle};
pub use state::{DeferredAction, SimulationState};
