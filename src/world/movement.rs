//! Player movement: speed from status effects, axis-separated collision
//! against tangible entities, and the camera mapping for clicks.

use bevy::prelude::*;

use super::{Sim, SimParams};
use crate::config::WorldTuning;
use crate::metabolism::{Action, Metabolism};
use crate::shared::*;

pub fn move_player_system(mut params: SimParams) {
    let dt = params.clock().dt;
    step_player(&mut params.sim(), dt);
}

/// Resolved speed for one frame and whether the frame counts as running.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gait {
    pub speed: f32,
    pub running: bool,
}

/// Slow scales the base speed; a sprint request only becomes running
/// when the metabolism allows it, and then adds the sprint bonus times the
/// carb-driven multiplier.
pub fn gait(tuning: &WorldTuning, base_speed: f32, metabolism: &Metabolism, sprint: bool) -> Gait {
    let mut speed = base_speed;
    if metabolism.has_effect(StatusEffect::Slow) {
        speed *= tuning.slow_multiplier;
    }
    let running = sprint && metabolism.can_sprint();
    if running {
        speed *= tuning.sprint_multiplier * metabolism.sprint_multiplier();
    }
    Gait { speed, running }
}

/// One frame of player activity: the passive time cost, then movement
/// and its cost.
pub fn step_player(sim: &mut Sim, dt: f32) {
    if dt <= 0.0 {
        return;
    }
    sim.metabolism.apply_action(Action::TimeTick, dt, sim.outbox);

    let intent = sim.player.intent;
    let dir = Vec2::new(intent.dx, intent.dy).clamp_length_max(1.0);
    if dir == Vec2::ZERO {
        return;
    }

    let gait = gait(sim.tuning, sim.player.speed, sim.metabolism, intent.sprint);
    let step = dir * gait.speed * dt;
    let radius = sim.player.radius;
    let mut pos = sim.player.pos;

    let along_x = sim.bounds.clamp(pos + Vec2::new(step.x, 0.0));
    if !sim.entities.collides(along_x, radius) {
        pos = along_x;
    }
    let along_y = sim.bounds.clamp(pos + Vec2::new(0.0, step.y));
    if !sim.entities.collides(along_y, radius) {
        pos = along_y;
    }
    sim.player.pos = pos;
    sim.player.facing = facing_for(dir, sim.player.facing);

    let action = if gait.running { Action::Run } else { Action::Walk };
    sim.metabolism.apply_action(action, dt, sim.outbox);
}

/// Dominant axis wins; ties keep the horizontal.
fn facing_for(dir: Vec2, current: Facing) -> Facing {
    if dir == Vec2::ZERO {
        return current;
    }
    if dir.x.abs() >= dir.y.abs() {
        if dir.x < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        }
    } else if dir.y < 0.0 {
        Facing::Up
    } else {
        Facing::Down
    }
}

/// Top-left corner of the camera: centred on the player, kept inside the
/// world.
pub fn camera_origin(tuning: &WorldTuning, bounds: &WorldBounds, player: Vec2) -> Vec2 {
    let view = Vec2::new(tuning.viewport_width, tuning.viewport_height);
    let max = (Vec2::new(bounds.width, bounds.height) - view).max(Vec2::ZERO);
    (player - view / 2.0).clamp(Vec2::ZERO, max)
}

pub fn screen_to_world(sim: &Sim, screen: Vec2) -> Vec2 {
    camera_origin(sim.tuning, &sim.bounds, sim.player.pos) + screen
}
