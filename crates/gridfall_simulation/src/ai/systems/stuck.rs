//! Stuck detection / recovery (cross-cutting guard).
//!
//! Работает каждый тик ПОСЛЕ state/behavior логики: скорость по смещению
//! за тик, при затяжном стопоре — боковой nudge slot-цели. Лечит агентов,
//! упёршихся в геометрию или друг в друга на одном подходном векторе.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::{AiConfig, AiState, StuckTracker};
use crate::components::{FacingCommand, MovementCommand};
use crate::movement::{direction_from_yaw, planar_distance};
use crate::DeterministicRng;

use super::fsm::current_yaw;

/// Floor-clamp dt при вычислении скорости (деление на ~0)
pub const STUCK_MIN_DELTA: f32 = 1e-3;

/// Диапазон бокового nudge (метры)
pub const NUDGE_MIN: f32 = 1.0;
pub const NUDGE_MAX: f32 = 2.2;

/// Система: stuck detection + recovery
///
/// Аккумулятор растёт только там где агент ОБЯЗАН двигаться — Chasing.
/// Idle и Attacking сбрасывают его (стоять там легитимно). Recovery:
/// slot-цель (и сглаженная) сдвигается вбок на случайную дистанцию в
/// случайную сторону от текущего facing, движение останавливается,
/// repath cooldown форсированно истекает — следующий тик сразу выдаёт
/// команду к сдвинутой точке.
pub fn stuck_detection(
    mut hostiles: Query<(
        Entity,
        &Transform,
        &mut AiState,
        &AiConfig,
        &mut StuckTracker,
        &mut MovementCommand,
        &FacingCommand,
    )>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, transform, mut state, config, mut tracker, mut movement, facing) in
        hostiles.iter_mut()
    {
        let position = transform.translation;
        let last = tracker.last_position.replace(position);

        let AiState::Chasing { slot } = &mut *state else {
            tracker.low_speed_time = 0.0;
            continue;
        };

        // Первый замер — базы для смещения ещё нет
        let Some(last) = last else {
            continue;
        };

        // Движение должно быть ЗАПРОШЕНО: агент у slot'а (ближе
        // stop_distance) стоит легитимно — это не стопор
        let movement_expected = slot
            .smoothed_target
            .map(|smoothed| planar_distance(position, smoothed) > config.stop_distance)
            .unwrap_or(false);
        if !movement_expected {
            tracker.low_speed_time = 0.0;
            continue;
        }

        let speed = planar_distance(position, last) / delta.max(STUCK_MIN_DELTA);
        if speed >= config.stuck_speed_threshold {
            tracker.low_speed_time = 0.0;
            continue;
        }

        tracker.low_speed_time += delta;
        if tracker.low_speed_time < config.stuck_time_to_trigger {
            continue;
        }

        // Recovery
        tracker.low_speed_time = 0.0;

        let forward = direction_from_yaw(current_yaw(transform, facing));
        let side = if rng.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let distance = rng.rng.gen_range(NUDGE_MIN..=NUDGE_MAX);
        // Перпендикуляр к forward в XZ
        let nudge = Vec3::new(forward.y, 0.0, -forward.x) * side * distance;

        if let Some(current) = slot.current_target.as_mut() {
            *current += nudge;
        }
        if let Some(smoothed) = slot.smoothed_target.as_mut() {
            *smoothed += nudge;
        }
        *movement = MovementCommand::Stop;
        // Форс-экспирация: следующий тик сразу выдаст команду к новой точке
        slot.repath_timer = 0.0;

        crate::logger::log(&format!(
            "AI: {:?} stuck recovery, lateral nudge {:.1}m (side {})",
            entity, distance, side
        ));
    }
}
