use std::process::ExitCode;

use tokio::sync::broadcast;
use wink_scroll::config::Config;
use wink_scroll::logging::{init_tracing, LogConfig};
use wink_scroll::replay::replay_session;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    if let Err(e) = init_tracing(&LogConfig::from(&config)) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }
    tracing::info!(
        replay_path = %config.replay_path,
        landmark_model = %config.landmark_model,
        ear_threshold = config.detection.ear_threshold,
        consecutive_frames = config.detection.consecutive_frames,
        scroll_step_px = config.scroll.step_px,
        max_fps = config.max_fps,
        "Starting wink-scroll"
    );

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(4);
    tokio::spawn(shutdown_signal(shutdown_tx));

    let mut session = replay_session(&config);
    match session.run(shutdown_rx).await {
        Ok(summary) => {
            tracing::info!(
                frames_processed = summary.frames_processed,
                frames_skipped = summary.frames_skipped,
                winks_confirmed = summary.winks_confirmed,
                final_offset = ?summary.last_target,
                "Replay complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            // 致命错误不重试，由用户修正后重新启动
            tracing::error!(error = %e, "Wink session could not run");
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler, Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(());
}
