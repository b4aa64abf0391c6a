//! Starship Commander entry point
//!
//! Runs the world headless: loads settings, optionally links to a peer, then steps the
//! simulation at a fixed frame rate with a counting render sink.
//!
//! Usage: `starship-commander [settings.json]`. A missing settings file is written
//! with the defaults.

use std::thread;
use std::time::{Duration, Instant};

use starship_commander::net::NetLink;
use starship_commander::renderer::FrameStats;
use starship_commander::sim::{GamePhase, World, check_state, new_game};
use starship_commander::{Result, Settings};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load_or_create(path)?,
        None => Settings::default(),
    };

    log::info!("Starship Commander starting ({:?} mode)", settings.network.mode);

    let mut world = World::new(settings.clone());

    let link = if settings.network.mode.is_networked() {
        let mut link = NetLink::open(&settings.network)?;
        if let Some(inbox) = link.take_inbox() {
            world.set_inbox(inbox);
        }
        world.enable_bullet_recording();
        Some(link)
    } else {
        None
    };

    new_game(&mut world);

    let frame_rate = settings.level.frame_rate.max(1);
    let frame = Duration::from_secs_f64(1.0 / f64::from(frame_rate));
    let mut stats = FrameStats::new();
    let mut frames: u64 = 0;
    let mut last_send = world.clock().now();

    loop {
        let started = Instant::now();

        stats.clear();
        world.step(&mut stats);

        if check_state(&mut world) == GamePhase::GameOver {
            log::info!("Game over at {}", world.clock().read());
            break;
        }

        if let Some(link) = &link {
            let now = world.clock().now();
            if now - last_send >= f64::from(settings.network.send_interval) {
                if let Some(update) = world.take_snapshot() {
                    if let Err(e) = link.send(&update) {
                        log::warn!("Failed to send update: {}", e);
                    }
                }
                last_send = now;
            }
        }

        frames += 1;
        if frames % u64::from(frame_rate) == 0 {
            log::debug!(
                "t={} live={} ghosts={} draw calls={}",
                world.clock().read(),
                world.len(),
                world.ghosts().len(),
                stats.draw_calls()
            );
        }

        if settings.level.max_frames != 0 && frames >= settings.level.max_frames {
            break;
        }

        thread::sleep(frame.saturating_sub(started.elapsed()));
    }

    let state = world.state();
    log::info!(
        "Finished after {} frames: level {}, score {}, lives {}",
        frames,
        state.level,
        state.score,
        state.lives
    );
    Ok(())
}
