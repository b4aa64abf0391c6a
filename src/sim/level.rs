//! Level flow: populating the world and moving between levels
//!
//! Level `n` brings `n % 3` drifting rocks and `n / 3` turrets, spaced evenly on a
//! ring around the centre, plus a fresh star field and the player's ship.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::entity::Entity;
use super::state::GamePhase;
use super::vector::Vec2Ext;
use super::world::World;

/// Start over: full lives, zero score, level 1
pub fn new_game(world: &mut World) {
    world.clear();
    let lives = world.settings().ship.lives;
    world.state_mut().reset(lives);
    log::info!("New game with {} lives", lives);
    next_level(world);
}

/// Clear the field and build the next level
pub fn next_level(world: &mut World) {
    world.clear();
    world.state_mut().level += 1;
    let level = world.state().level;

    let star_count = world.settings().level.star_count;
    insert_stars(world, star_count);

    let mut wave = generate_rocks(world, (level % 3) as usize);
    wave.extend(generate_turrets(world, (level / 3) as usize));
    log::info!(
        "Level {}: {} rocks, {} turrets",
        level,
        level % 3,
        level / 3
    );
    insert_evenly_distributed(world, wave);

    let at = world.player_spawn_point();
    world.spawn_player(at);
}

/// Advance the level when the field is clear; end the game when out of lives
pub fn check_state(world: &mut World) -> GamePhase {
    let state = world.state();
    if state.is_game_over() {
        return GamePhase::GameOver;
    }

    if state.lives < 1 {
        log::info!("Game over, final score {}", state.score);
        world.state_mut().phase = GamePhase::GameOver;
    } else if state.targets < 1 {
        next_level(world);
    }
    world.state().phase
}

/// Scatter `count` background stars uniformly over the world
pub fn insert_stars(world: &mut World, count: usize) {
    for _ in 0..count {
        let at = world.random_point();
        world.insert_star(at);
    }
}

/// Full-size rocks drifting in random directions; positions are set on insertion
pub fn generate_rocks(world: &mut World, count: usize) -> Vec<Entity> {
    let now = world.clock().now();
    let settings = world.settings().clone();
    let rng = world.rng_mut();

    let mut velocity = Vec2::new(0.0, settings.rocks.drift_speed);
    (0..count)
        .map(|_| {
            velocity = velocity.rotated(rng.random::<f32>() * TAU);
            Entity::rock(
                Vec2::ZERO,
                velocity,
                settings.rocks.start_size,
                &settings,
                rng,
                now,
            )
        })
        .collect()
}

/// Stationary turrets; positions are set on insertion
pub fn generate_turrets(world: &mut World, count: usize) -> Vec<Entity> {
    let now = world.clock().now();
    let settings = world.settings();
    (0..count)
        .map(|_| Entity::turret(Vec2::ZERO, settings, now))
        .collect()
}

/// Place entities at equal angles on a ring around the centre, from a random start
pub fn insert_evenly_distributed(world: &mut World, entities: Vec<Entity>) {
    if entities.is_empty() {
        return;
    }

    let center = world.boundary().center();
    let separation = TAU / entities.len() as f32;
    let start = world.rng_mut().random::<f32>() * TAU;
    let mut offset = (center * world.settings().level.spawn_ring_fraction).rotated(start);

    for mut entity in entities {
        entity.position = center + offset;
        world.insert(entity);
        offset = offset.rotated(separation);
    }
}
