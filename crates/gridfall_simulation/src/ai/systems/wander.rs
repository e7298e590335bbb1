//! Wander (активно в Idle).
//!
//! Случайные достижимые точки с рандомизированными паузами — без пауз
//! блуждание выглядит роботизированным (точка за точкой без остановки).

use bevy::prelude::*;
use rand::Rng;

use crate::ai::{AiConfig, AiState};
use crate::components::MovementCommand;
use crate::movement::planar_distance;
use crate::nav::NavWorld;
use crate::DeterministicRng;

/// Допуск прибытия к wander-точке (метры)
pub const WANDER_ARRIVE_TOLERANCE: f32 = 0.5;

/// Система: wander behavior
///
/// Точки берутся ТОЛЬКО у world-query провайдера — агент никогда не
/// идёт к точке, которую провайдер не возвращал. None от провайдера —
/// не ошибка: остаёмся без цели и пробуем на следующем тике.
pub fn wander_behavior(
    mut hostiles: Query<(&Transform, &mut AiState, &AiConfig, &mut MovementCommand)>,
    nav: Res<NavWorld>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (transform, mut state, config, mut movement) in hostiles.iter_mut() {
        let AiState::Idle { wander } = &mut *state else {
            continue;
        };

        wander.repath_timer = (wander.repath_timer - delta).max(0.0);

        match wander.target {
            Some(target) => {
                if planar_distance(transform.translation, target) <= WANDER_ARRIVE_TOLERANCE {
                    // Пришли: стоп + рандомизированная пауза до следующей точки
                    wander.target = None;
                    wander.pause_timer = rng
                        .rng
                        .gen_range(config.wander_pause_min..=config.wander_pause_max);
                    *movement = MovementCommand::Stop;
                } else if wander.repath_timer <= 0.0 {
                    // Rate-limited повтор команды (цель не движется, но
                    // исполнитель мог потерять путь)
                    wander.repath_timer = config.wander_repath_cooldown;
                    *movement = MovementCommand::MoveTo {
                        target,
                        acceptance_radius: WANDER_ARRIVE_TOLERANCE,
                        use_pathing: true,
                    };
                }
            }
            None => {
                wander.pause_timer -= delta;
                if wander.pause_timer > 0.0 {
                    continue;
                }

                match nav.0.reachable_point_near(
                    transform.translation,
                    config.wander_radius,
                    &mut rng.rng,
                ) {
                    Some(point) => {
                        wander.target = Some(point);
                        // Немедленная команда: bypass cooldown для отзывчивости
                        wander.repath_timer = config.wander_repath_cooldown;
                        *movement = MovementCommand::MoveTo {
                            target: point,
                            acceptance_radius: WANDER_ARRIVE_TOLERANCE,
                            use_pathing: true,
                        };
                    }
                    None => {
                        // Точки нет — остаёмся без цели, retry на следующем тике
                        wander.pause_timer = 0.0;
                    }
                }
            }
        }
    }
}
