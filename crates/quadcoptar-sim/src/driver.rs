use std::sync::Arc;
use std::time::Duration;

use glam::Vec3;
use quadcoptar_core::handle::SessionHandle;
use quadcoptar_core::pose::{LatestPose, Pose};
use quadcoptar_core::resolver::FIXED_DT;
use quadcoptar_core::session::SessionState;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};

use crate::config;

/// A fire button press.
#[derive(Debug)]
pub struct FireCommand {
    pub kind: &'static str,
}

/// Countdown task: one tick per (scaled) second until the round ends.
pub async fn countdown_task(handle: SessionHandle, period: Duration, done: watch::Sender<bool>) {
    let mut ticker = interval(period);
    // The first tick of a tokio interval completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if handle.tick_countdown() == SessionState::GameOver {
            let _ = done.send(true);
            return;
        }
        tracing::debug!(remaining = handle.remaining_seconds(), "countdown");
    }
}

/// Physics task: fixed-step frames until the round ends.
pub async fn physics_task(handle: SessionHandle, period: Duration, mut done: watch::Receiver<bool>) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let outcome = handle.advance(FIXED_DT);
                if !outcome.contacts.is_empty() {
                    tracing::debug!(points = outcome.points(), score = handle.score(), "hits this frame");
                }
            }
            _ = done.changed() => return,
        }
    }
}

/// Command task: the single consumer of fire commands.
pub async fn command_task(handle: SessionHandle, mut commands: mpsc::Receiver<FireCommand>) {
    while let Some(command) = commands.recv().await {
        if let Err(rejection) = handle.fire(command.kind) {
            tracing::debug!(%rejection, "shot not fired");
        }
    }
}

/// Autopilot: aims at the nearest live target and pulls the trigger.
pub async fn autopilot_task(
    handle: SessionHandle,
    pose: Arc<LatestPose>,
    commands: mpsc::Sender<FireCommand>,
    period: Duration,
    mut done: watch::Receiver<bool>,
) {
    let mut ticker = interval(period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match nearest_target(&handle) {
                    Some(target) => pose.set(Pose::new(target, Vec3::ZERO)),
                    None => pose.clear(),
                }
                if commands.send(FireCommand { kind: "bullet" }).await.is_err() {
                    return;
                }
            }
            _ = done.changed() => return,
        }
    }
}

fn nearest_target(handle: &SessionHandle) -> Option<Vec3> {
    handle
        .snapshot()
        .iter()
        .filter(|e| e.is_target())
        .map(quadcoptar_core::entity::Entity::position)
        .min_by(|a, b| a.length_squared().total_cmp(&b.length_squared()))
}

/// Spawns every task and waits for the round to end.
pub async fn run_round(handle: SessionHandle, pose: Arc<LatestPose>, scale: f64) -> anyhow::Result<()> {
    let (done_tx, done_rx) = watch::channel(false);
    let (command_tx, command_rx) = mpsc::channel(config::COMMAND_CHANNEL_CAPACITY);

    handle.start()?;

    let countdown = tokio::spawn(countdown_task(
        handle.clone(),
        config::scaled(config::COUNTDOWN_INTERVAL, scale),
        done_tx,
    ));
    let physics = tokio::spawn(physics_task(
        handle.clone(),
        config::scaled(config::FRAME_INTERVAL, scale),
        done_rx.clone(),
    ));
    let commands = tokio::spawn(command_task(handle.clone(), command_rx));
    let autopilot = tokio::spawn(autopilot_task(
        handle.clone(),
        pose,
        command_tx,
        config::scaled(config::FIRE_INTERVAL, scale),
        done_rx,
    ));

    countdown.await?;
    physics.await?;
    autopilot.await?;
    // The autopilot owned the only sender, so the command task drains and stops.
    commands.await?;
    Ok(())
}
