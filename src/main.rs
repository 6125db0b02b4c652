// Event assistant entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Create mpsc channels
// 4. Spawn app logic task
// 5. Run the console loop (blocking until the user quits)
// 6. Cleanup on exit

use event_assistant::app;
use event_assistant::config;
use event_assistant::console;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Event assistant starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: allow_repeat={}, animation={} ({} ticks @ {}ms), group size {}, export dir {}",
        config.draw.allow_repeat,
        config.animation.enabled,
        config.animation.ticks,
        config.animation.interval_ms,
        config.grouping.default_group_size,
        config.export.output_dir
    );

    // 3. Create mpsc channels (roll_tx goes into AppState for spawned tasks)
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (roll_tx, roll_rx) = mpsc::channel(256);
    let (out_tx, out_rx) = mpsc::channel(256);

    let app_state = app::AppState::new(config, roll_tx);

    // 4. Spawn app logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, roll_rx, out_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 5. Run the console loop (blocking until the user quits or stdin closes)
    info!("Application ready");
    if let Err(e) = console::run(out_rx, cmd_tx).await {
        error!("Console error: {}", e);
    }

    // 6. Cleanup: wait for the app task to finish (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Event assistant shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by
/// the console).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("event-assistant.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("event_assistant=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
