// src/main.rs

//! `kat-monitors`: prints every monitor the native backend reports.
//!
//! With `--window`, also opens a window and pumps events until it is closed.

use kat_window::{Monitor, Window, WindowDescriptor, WindowingEngine, CONFIG};

use anyhow::Context;
use log::{error, info};
use std::time::Duration;

/// Sleep between event pump passes in `--window` mode.
const PUMP_INTERVAL: Duration = Duration::from_millis(16);

fn print_monitors(engine: &WindowingEngine) -> anyhow::Result<()> {
    let monitors = engine.monitors()?;
    println!("{} monitor(s)", monitors.len());

    for (index, monitor) in monitors.iter().enumerate() {
        let dpi = monitor.dpi()?;
        let scale = monitor.scale()?;
        let size = monitor.size();
        let physical = monitor.physical_size();
        let position = monitor.position();
        println!(
            "#{} {}{}",
            index,
            monitor.name(),
            if monitor.is_primary() { " (primary)" } else { "" }
        );
        println!(
            "   {}x{} px, {}x{} mm at ({}, {})",
            size.x, size.y, physical.x, physical.y, position.x, position.y
        );
        println!(
            "   dpi {}x{}, scale {}x{}",
            dpi.x, dpi.y, scale.x, scale.y
        );

        let current = monitor.video_mode();
        for mode in monitor.video_modes() {
            let marker = if *mode == current { '*' } else { ' ' };
            println!("   {} {}", marker, mode);
        }
        if !monitor.video_modes().contains(&current) {
            println!("   * {} (not in supported list)", current);
        }
    }
    Ok(())
}

fn run_window(engine: &std::rc::Rc<WindowingEngine>) -> anyhow::Result<()> {
    let descriptor = WindowDescriptor::default().with_title("kat-monitors");
    let window = engine
        .create_window(&descriptor)
        .context("Failed to create window")?;

    let size = window.size()?;
    let outer = window.outer_size()?;
    info!(
        "Window {:?}: client {}x{}, outer {}x{}, dpi {:?}",
        window.platform_handle(),
        size.x,
        size.y,
        outer.x,
        outer.y,
        window.dpi()?
    );

    info!("Pumping events until the window is closed...");
    while !engine.is_app_exit() {
        if let Err(e) = engine.process_events() {
            error!("Error while processing events: {:#}", e);
            break;
        }
        std::thread::sleep(PUMP_INTERVAL);
    }
    info!("Exit requested, window alive: {}", window.is_alive());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let open_window = std::env::args().skip(1).any(|arg| arg == "--window");

    let engine = WindowingEngine::create_with_config(&CONFIG)
        .context("Failed to create windowing engine")?;

    print_monitors(&engine)?;

    if open_window {
        run_window(&engine)?;
    }

    info!("kat-monitors exited successfully.");
    Ok(())
}
