use chrono::Local;
use color_eyre::{eyre::eyre, Result};
use retroinput::config::CoreConfig;
use retroinput::gamepad::GilrsHost;
use retroinput::gesture::KeyQueue;
use retroinput::plugin::Core;
use std::time::{Duration, Instant};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    setup()?;

    let config = CoreConfig::load().map_err(|e| eyre!("Failed to load config: {}", e))?;
    setup_logging(config.probe.level()?);

    match CoreConfig::ensure_default() {
        Ok(path) => debug!("Config file at {}", path.display()),
        Err(e) => debug!("No default config written: {}", e),
    }

    let mut host = GilrsHost::connect().map_err(|e| eyre!("Failed to open gamepads: {}", e))?;
    let mut core =
        Core::new(config.clone()).map_err(|e| eyre!("Failed to initialize core: {}", e))?;
    let keys = KeyQueue::new();

    run(&config, &mut core, &mut host, &keys)?;

    core.deinit();
    info!("Probe finished after {} frames", host.frames_presented());
    Ok(())
}

fn run(config: &CoreConfig, core: &mut Core, host: &mut GilrsHost, keys: &KeyQueue) -> Result<()> {
    let frame_time = Duration::from_secs_f64(1.0 / f64::from(config.probe.frame_rate));
    let stats_interval = chrono::Duration::seconds(i64::from(config.probe.stats_interval_secs));

    info!(
        "Probe running at {} Hz on a {}x{} surface",
        config.probe.frame_rate, config.surface.width, config.surface.height
    );

    let mut frames: u64 = 0;
    let mut changes = 0usize;
    let mut widget_events = 0usize;
    let mut last_stats = Local::now();

    loop {
        let started = Instant::now();
        let report = core
            .run(host, keys)
            .map_err(|e| eyre!("Frame failed: {}", e))?;

        for change in &report.frame.changes {
            info!(
                "{:?} ({}, {}, {}): {} -> {}",
                change.device, change.port, change.index, change.id, change.old, change.new
            );
        }
        for event in &report.widget_events {
            debug!("Widget event: {:?}", event);
        }

        frames += 1;
        changes += report.frame.changes.len();
        widget_events += report.widget_events.len();

        let now = Local::now();
        if now - last_stats > stats_interval {
            info!(
                "Probe stats: {} frames, {} changes, {} widget events in last {} seconds, pointer at ({}, {})",
                frames,
                changes,
                widget_events,
                stats_interval.num_seconds(),
                core.surface().position().x,
                core.surface().position().y
            );
            frames = 0;
            changes = 0;
            widget_events = 0;
            last_stats = now;
        }

        if config
            .probe
            .max_frames
            .is_some_and(|max| report.frame.number >= max)
        {
            return Ok(());
        }

        if let Some(rest) = frame_time.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    Ok(())
}

fn setup_logging(level: Level) {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
