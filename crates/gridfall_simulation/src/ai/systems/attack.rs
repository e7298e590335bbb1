//! Attack loop (активно в Attacking).
//!
//! Вход в состояние даёт немедленный удар (таймер свежего варианта = 0),
//! дальше — удар каждые attack_interval секунд до смены состояния.

use bevy::prelude::*;

use crate::ai::{AiConfig, AiState, Target};
use crate::combat::MeleeHit;
use crate::movement::planar_distance;

/// Система: attack execution
///
/// Каждый удар перепроверяет дистанцию: между оценкой таблицы переходов
/// и этим тиком цель могла выйти из радиуса — урон вне радиуса не
/// применяется никогда. Сам выход из Attacking сделает FSM на следующей
/// оценке (дополнительных ударов до неё не будет: интервал ≥ тика).
pub fn attack_loop(
    mut hostiles: Query<(Entity, &Transform, &mut AiState, &AiConfig, &Target)>,
    targets: Query<&Transform>,
    mut melee_hits: EventWriter<MeleeHit>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, transform, mut state, config, target) in hostiles.iter_mut() {
        let AiState::Attacking { attack_timer } = &mut *state else {
            continue;
        };
        // Цель недоступна → no-op тик (урон в пустоту не применяем)
        let Some(target_entity) = target.0 else {
            continue;
        };
        let Ok(target_transform) = targets.get(target_entity) else {
            continue;
        };

        *attack_timer -= delta;
        if *attack_timer > 0.0 {
            continue;
        }
        *attack_timer = config.attack_interval;

        let d = planar_distance(transform.translation, target_transform.translation);
        if d > config.attack_range {
            // Удар пропущен: цель вне радиуса
            crate::logger::log(&format!(
                "AI: {:?} melee skipped, target out of range (d={:.1}m)",
                entity, d
            ));
            continue;
        }

        melee_hits.write(MeleeHit {
            attacker: entity,
            target: target_entity,
            damage: config.attack_damage,
        });
    }
}
