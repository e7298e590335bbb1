//! Slot positioning (активно в Chasing).
//!
//! Несколько агентов окружают цель вместо того чтобы встать друг на
//! друга или идти одним коридором:
//! кольцо (angle + radius + jitter) → peer-репульсия → navmesh проекция →
//! сглаживание → rate-limited move-команды + доворот на цель.

use bevy::prelude::*;

use crate::ai::{AiConfig, AiState, SlotAssignment, Target};
use crate::components::{FacingCommand, MovementCommand};
use crate::movement::{planar_direction, planar_distance, yaw_from_direction};
use crate::nav::NavWorld;

use super::fsm::current_yaw;

/// Радиус peer-перекрытия вокруг желаемой точки (метры)
pub const SLOT_OVERLAP_RADIUS: f32 = 1.6;

/// Floor-clamp дистанции до peer'а — защита от взрыва репульсии при ~0
pub const PEER_DISTANCE_FLOOR: f32 = 0.1;

/// Щедрый search extent проекции на navmesh (метры)
pub const SLOT_PROJECTION_EXTENT: Vec3 = Vec3::new(4.0, 4.0, 4.0);

/// Чистая функция вычисления slot-точки (без world-состояния)
///
/// 1. Желаемая точка: target + (cos, sin)(angle) × radius + jitter
/// 2. Для каждого peer'а в overlap-радиусе — репульсия от него,
///    магнитуда (overlap − dist), ноль на границе и дальше
/// 3. Результат = желаемая точка + суммарная репульсия
///
/// Проекцию на navmesh делает вызывающий (ей нужен NavWorld).
pub fn compute_slot_target(
    target_pos: Vec3,
    assignment: &SlotAssignment,
    slot_radius: f32,
    peers: &[Vec3],
    overlap_radius: f32,
) -> Vec3 {
    let desired = target_pos
        + Vec3::new(
            assignment.angle.cos() * slot_radius + assignment.jitter.x,
            0.0,
            assignment.angle.sin() * slot_radius + assignment.jitter.y,
        );

    let mut repulsion = Vec3::ZERO;
    for &peer in peers {
        let dist = planar_distance(desired, peer).max(PEER_DISTANCE_FLOOR);
        if dist >= overlap_radius {
            continue;
        }
        // Peer ровно в желаемой точке — направление вырожденное, пропускаем
        let Some(away) = planar_direction(peer, desired) else {
            continue;
        };
        let strength = overlap_radius - dist;
        repulsion.x += away.x * strength;
        repulsion.z += away.y * strength;
    }

    desired + repulsion
}

/// Доворот yaw к цели с ограниченным шагом (wrap-aware)
pub fn approach_yaw(current: f32, desired: f32, max_fraction: f32) -> f32 {
    let diff = wrap_angle(desired - current);
    current + diff * max_fraction.min(1.0)
}

/// Нормализация угла в (-π, π]
fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI {
        PI
    } else {
        wrapped
    }
}

/// Система: slot positioning + доворот на цель
///
/// Пересчёт точки — по интервалу (не каждый тик, bound cost при многих
/// агентах). Сглаживание — каждый тик. Move-команды — не чаще
/// repath_cooldown и только если дальше stop_distance.
pub fn slot_positioning(
    mut hostiles: Query<(
        Entity,
        &Transform,
        &mut AiState,
        &AiConfig,
        &SlotAssignment,
        &Target,
        &mut MovementCommand,
        &mut FacingCommand,
    )>,
    targets: Query<&Transform>,
    peers: Query<(Entity, &Transform), With<SlotAssignment>>,
    nav: Res<NavWorld>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, transform, mut state, config, assignment, target, mut movement, mut facing) in
        hostiles.iter_mut()
    {
        let AiState::Chasing { slot } = &mut *state else {
            continue;
        };
        // Цель недоступна → no-op тик (resolve повторит acquire_targets)
        let Some(target_entity) = target.0 else {
            continue;
        };
        let Ok(target_transform) = targets.get(target_entity) else {
            continue;
        };

        slot.recalc_timer -= delta;
        slot.repath_timer -= delta;

        // Пересчёт точки по интервалу
        if slot.recalc_timer <= 0.0 {
            slot.recalc_timer = config.slot_recalc_interval;

            let peer_positions: Vec<Vec3> = peers
                .iter()
                .filter(|(peer_entity, _)| *peer_entity != entity)
                .map(|(_, peer_transform)| peer_transform.translation)
                .collect();

            let raw = compute_slot_target(
                target_transform.translation,
                assignment,
                config.slot_radius,
                &peer_positions,
                SLOT_OVERLAP_RADIUS,
            );

            // Проекция на walkable; неудача не блокирует позиционирование —
            // используем непроецированную точку
            let projected = nav
                .0
                .project_to_navmesh(raw, SLOT_PROJECTION_EXTENT)
                .unwrap_or(raw);

            slot.current_target = Some(projected);
            if slot.smoothed_target.is_none() {
                // Seed: интерполировать от origin нельзя
                slot.smoothed_target = Some(projected);
            }
        }

        // Сглаживание каждый тик (exponential lerp, без overshoot)
        if let (Some(current), Some(smoothed)) = (slot.current_target, slot.smoothed_target) {
            let t = (config.slot_smoothing_speed * delta).min(1.0);
            slot.smoothed_target = Some(smoothed.lerp(current, t));
        }

        // Rate-limited движение к сглаженной точке
        if let Some(smoothed) = slot.smoothed_target {
            if planar_distance(transform.translation, smoothed) > config.stop_distance {
                if slot.repath_timer <= 0.0 {
                    slot.repath_timer = config.repath_cooldown;
                    *movement = MovementCommand::MoveTo {
                        target: smoothed,
                        acceptance_radius: config.stop_distance,
                        use_pathing: true,
                    };
                }
            } else {
                *movement = MovementCommand::Stop;
            }
        }

        // Доворот на цель (вырожденное направление — пропускаем)
        if let Some(dir) = planar_direction(transform.translation, target_transform.translation) {
            let yaw = approach_yaw(
                current_yaw(transform, &facing),
                yaw_from_direction(dir),
                config.chase_turn_speed * delta,
            );
            *facing = FacingCommand::Explicit { yaw };
        }
    }
}
