//! FSM AI systems (target acquisition, state transitions).

use bevy::prelude::*;

use crate::ai::{AiConfig, AiState, Target};
use crate::components::{Actor, FacingCommand, Health, MovementCommand};
use crate::movement::{planar_direction, planar_distance, yaw_from_direction};

/// Текущий yaw агента: из явной команды, иначе из Transform
pub(crate) fn current_yaw(transform: &Transform, facing: &FacingCommand) -> f32 {
    match facing {
        FacingCommand::Explicit { yaw } => *yaw,
        FacingCommand::FollowMovement => transform.rotation.to_euler(EulerRot::YXZ).0,
    }
}

/// Система: захват/переподхват цели
///
/// Цель — ближайший живой актор чужой фракции (для hostile-пака это
/// player-controlled тело). Ссылка слабая: если entity исчез или умер,
/// сбрасываем и переподхватываем на следующих тиках.
pub fn acquire_targets(
    mut hostiles: Query<(Entity, &Actor, &Transform, &mut Target), With<AiState>>,
    candidates: Query<(Entity, &Actor, &Transform, &Health)>,
) {
    for (entity, actor, transform, mut target) in hostiles.iter_mut() {
        // Текущая ссылка ещё валидна?
        if let Some(current) = target.0 {
            let alive = candidates
                .get(current)
                .map(|(_, _, _, health)| health.is_alive())
                .unwrap_or(false);
            if alive {
                continue;
            }
            target.0 = None;
        }

        target.0 = find_nearest_enemy(
            entity,
            actor.faction_id,
            transform.translation,
            &candidates,
        );
    }
}

/// Ближайший живой актор чужой фракции (сам агент исключается)
fn find_nearest_enemy(
    self_entity: Entity,
    faction_id: u64,
    position: Vec3,
    candidates: &Query<(Entity, &Actor, &Transform, &Health)>,
) -> Option<Entity> {
    let mut nearest: Option<(Entity, f32)> = None;
    for (entity, actor, transform, health) in candidates.iter() {
        if entity == self_entity || actor.faction_id == faction_id || !health.is_alive() {
            continue;
        }
        let dist = planar_distance(position, transform.translation);
        if nearest.map(|(_, best)| dist < best).unwrap_or(true) {
            nearest = Some((entity, dist));
        }
    }
    nearest.map(|(entity, _)| entity)
}

/// Чистая функция таблицы переходов (prior state × дистанция → новое)
///
/// | From      | Condition                        | To       |
/// |-----------|----------------------------------|----------|
/// | Idle      | d ≤ chase_distance               | Chasing  |
/// | Chasing   | d ≤ attack_range                 | Attacking|
/// | Chasing   | d > chase_distance               | Idle     |
/// | Attacking | d > chase_distance               | Idle     |
/// | Attacking | attack_range < d ≤ chase_distance| Chasing  |
///
/// None — остаёмся в текущем состоянии (entry/exit не перезапускаются).
pub fn evaluate_transition(state: &AiState, d: f32, config: &AiConfig) -> Option<AiState> {
    match state {
        AiState::Idle { .. } if d <= config.chase_distance => Some(AiState::chasing()),
        AiState::Chasing { .. } if d <= config.attack_range => Some(AiState::attacking()),
        AiState::Chasing { .. } if d > config.chase_distance => Some(AiState::idle()),
        AiState::Attacking { .. } if d > config.chase_distance => Some(AiState::idle()),
        AiState::Attacking { .. } if d > config.attack_range => Some(AiState::chasing()),
        _ => None,
    }
}

/// Система: FSM transitions (distance-driven)
///
/// Оценка таблицы раз в тик. Без цели (ссылка не резолвится) — no-op
/// тик, повторный резолв делает acquire_targets.
///
/// Exit-действия старого состояния выполняются до entry нового:
/// attack/slot/wander таймеры уничтожаются вместе с вариантом (отмена
/// тотальна), остальное — явные команды ниже.
pub fn ai_fsm_transitions(
    mut hostiles: Query<(
        Entity,
        &Transform,
        &mut AiState,
        &AiConfig,
        &Target,
        &mut MovementCommand,
        &mut FacingCommand,
    )>,
    targets: Query<&Transform>,
) {
    for (entity, transform, mut state, config, target, mut movement, mut facing) in
        hostiles.iter_mut()
    {
        let Some(target_entity) = target.0 else {
            continue;
        };
        let Ok(target_transform) = targets.get(target_entity) else {
            continue;
        };

        let d = planar_distance(transform.translation, target_transform.translation);

        let Some(next) = evaluate_transition(&*state, d, config) else {
            continue;
        };

        crate::logger::log(&format!(
            "AI: {:?} {} → {} (d={:.1}m)",
            entity,
            state.label(),
            next.label(),
            d
        ));

        // Entry-действия нового состояния
        match &next {
            AiState::Idle { .. } => {
                // Сброс target-lock визуалов: корпус снова по движению,
                // остановка, wander-точка выберется в этом же тике
                *facing = FacingCommand::FollowMovement;
                *movement = MovementCommand::Stop;
            }
            AiState::Chasing { .. } => {
                // Явная ориентация вместо travel-facing; довороты на цель
                // делает slot-система с chase_turn_speed
                let yaw = current_yaw(transform, &facing);
                *facing = FacingCommand::Explicit { yaw };
                // Slot пересчитается и выдаст move-команду в этом же тике
                // (recalc/repath таймеры свежего варианта = 0)
            }
            AiState::Attacking { .. } => {
                // Встали, развернулись на цель, первый удар — в этом тике
                *movement = MovementCommand::Stop;
                if let Some(dir) =
                    planar_direction(transform.translation, target_transform.translation)
                {
                    *facing = FacingCommand::Explicit {
                        yaw: yaw_from_direction(dir),
                    };
                }
            }
        }

        *state = next;
    }
}
