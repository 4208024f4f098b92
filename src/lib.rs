//! Simulation core for a first-person sniper range.
//!
//! A round is built from an [`ArenaLayout`] and a [`RoundConfig`], then
//! driven one tick at a time by a [`FrameLoop`]. Each tick samples input,
//! moves the player, steps physics, syncs the camera, resolves shots, mirrors
//! enemy transforms, counts down the round clock and emits a
//! [`RenderSnapshot`]. Rendering, audio and device capture live outside the
//! crate.

pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod scene;
pub mod view;

pub use config::RoundConfig;
pub use controller::{
    FrameEvent, FrameLoop, FrameOutput, InputEvent, InputSnapshot, SimulationState,
};
pub use error::{ConfigError, ReloadRejected, ShotRejected};
pub use scene::ArenaLayout;
pub use view::{HudStatus, RenderSnapshot, StatusMessage};
