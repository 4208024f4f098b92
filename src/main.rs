use std::process::ExitCode;

use tracing::{error, info};

use duskshot::controller::ShotOutcome;
use duskshot::model::Camera;
use duskshot::{logging, ArenaLayout, FrameEvent, FrameLoop, InputSnapshot, RoundConfig};

const TICK: f32 = 1.0 / 60.0;

/// Scripted round: settle, aim at each target in turn, fire, reload, then
/// idle until the clock runs out.
fn main() -> ExitCode {
    logging::init();

    let config = RoundConfig {
        round_duration: 8.0,
        ..RoundConfig::default()
    };
    let mut frame = match FrameLoop::from_layout(&ArenaLayout::default(), &config) {
        Ok(frame) => frame,
        Err(err) => {
            error!(error = %err, "config_invalid");
            return ExitCode::FAILURE;
        }
    };

    for _ in 0..60 {
        frame.advance(TICK, InputSnapshot::empty());
    }

    let targets: Vec<_> = frame.state().enemies.iter().map(|e| e.position).collect();
    for target in targets {
        let state = frame.state();
        let (yaw, pitch) = Camera::angles_towards(state.camera.eye, target);
        let look = InputSnapshot::empty()
            .with_look(yaw - state.player.yaw, pitch - state.player.pitch)
            .with_aim_held(true);
        frame.advance(TICK, look);

        let output = frame.advance(
            TICK,
            InputSnapshot::empty().with_aim_held(true).with_shoot_pressed(true),
        );
        for event in &output.events {
            if let FrameEvent::ShotFired(report) = event {
                let verdict = match report.outcome {
                    ShotOutcome::Miss => "miss",
                    ShotOutcome::Blocked { .. } => "blocked",
                    ShotOutcome::Hit { .. } => "hit",
                };
                info!(verdict, ammo = report.ammo_left, "demo_shot");
            }
        }

        for _ in 0..30 {
            frame.advance(TICK, InputSnapshot::empty().with_aim_held(true));
        }
    }

    frame.advance(TICK, InputSnapshot::empty().with_reload_pressed(true));

    let mut ticks = 0u32;
    while frame.state().round.is_running() {
        frame.advance(TICK, InputSnapshot::empty());
        ticks += 1;
    }

    let hud = frame.state().hud_status();
    info!(
        score = hud.score,
        ammo = %hud.ammo_text(),
        idle_ticks = ticks,
        message = %hud.message_text(),
        "demo_finished"
    );
    ExitCode::SUCCESS
}
