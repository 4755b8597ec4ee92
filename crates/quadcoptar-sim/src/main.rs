//! Headless real-time driver for one QuadcoptAR round.
//!
//! Runs the countdown, physics frames and an autopilot shooter as concurrent
//! tokio tasks over one shared session, then writes the final score to a
//! JSON file.
//!
//! Environment:
//! - `QUADCOPTAR_CONFIG`: path to a JSON game config (optional)
//! - `QUADCOPTAR_SCORE_FILE`: score file (default `quadcoptar-score.json`)
//! - `QUADCOPTAR_TIME_SCALE`: speed-up factor (default 1.0)
//! - `RUST_LOG` / `LOG_FORMAT=json`: logging

mod config;
mod driver;

use std::sync::Arc;

use quadcoptar_core::handle::SessionHandle;
use quadcoptar_core::output::TracingSink;
use quadcoptar_core::pose::LatestPose;
use quadcoptar_core::session::Session;
use quadcoptar_core::store::{JsonFileScoreStore, ScoreStore, SCORE_KEY};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let game_config = config::game_config()?;
    let scale = config::time_scale();
    let store = Arc::new(JsonFileScoreStore::new(config::score_file()));
    let pose = Arc::new(LatestPose::new());

    let session = Session::new(game_config)?
        .with_sink(Arc::new(TracingSink))
        .with_pose_provider(pose.clone())
        .with_score_store(store.clone());
    tracing::info!(seed = session.seed(), time_scale = scale, "session ready");

    let handle = SessionHandle::new(session);
    driver::run_round(handle.clone(), pose, scale).await?;

    let saved = store.read_score(SCORE_KEY)?;
    tracing::info!(
        score = handle.score(),
        ?saved,
        file = %store.path().display(),
        "round finished"
    );
    Ok(())
}
