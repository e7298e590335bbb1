//! Headless kinematic исполнитель команд локомоции
//!
//! Архитектура:
//! - AI пишет MovementCommand/FacingCommand (интент)
//! - Эта модель интегрирует Transform в FixedUpdate (60Hz) — заменяет
//!   NavigationAgent движка в headless режиме
//! - Движение прямолинейное по XZ: арена плоская, pathfinding-детали
//!   принадлежат engine-исполнителю
//!
//! Детерминизм: fixed timestep, никакой случайности.

use bevy::prelude::*;

use crate::components::{FacingCommand, MovementCommand, MovementSpeed};
use crate::SimSet;

/// Минимальная планарная длина, ниже которой направление вырожденное
/// (цель прямо над головой, нулевое смещение) — не нормализуем
pub const MIN_PLANAR_LEN: f32 = 1e-4;

/// Планарная (XZ) дистанция между точками
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

/// Нормализованное планарное направление from → to
///
/// None при вырожденной геометрии (см. MIN_PLANAR_LEN).
pub fn planar_direction(from: Vec3, to: Vec3) -> Option<Vec2> {
    let delta = Vec2::new(to.x - from.x, to.z - from.z);
    let len = delta.length();
    if len < MIN_PLANAR_LEN {
        None
    } else {
        Some(delta / len)
    }
}

/// Yaw (радианы вокруг Y) из планарного направления (x, z)
pub fn yaw_from_direction(dir: Vec2) -> f32 {
    dir.x.atan2(dir.y)
}

/// Планарный forward-вектор для yaw
pub fn direction_from_yaw(yaw: f32) -> Vec2 {
    Vec2::new(yaw.sin(), yaw.cos())
}

/// Система: исполнение MovementCommand + FacingCommand
///
/// MoveTo двигает тело к цели пока планарная дистанция > acceptance_radius.
/// Idle/Stop не двигают (kinematic модель без инерции — Stop мгновенный).
/// FollowMovement поворачивает корпус по направлению движения,
/// Explicit применяет yaw контроллера как есть.
pub fn apply_locomotion(
    mut query: Query<(
        &MovementCommand,
        &FacingCommand,
        &MovementSpeed,
        &mut Transform,
    )>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (command, facing, speed, mut transform) in query.iter_mut() {
        let mut travel_dir: Option<Vec2> = None;

        if let MovementCommand::MoveTo {
            target,
            acceptance_radius,
            ..
        } = command
        {
            let dist = planar_distance(transform.translation, *target);
            if dist > *acceptance_radius {
                if let Some(dir) = planar_direction(transform.translation, *target) {
                    // Не перешагиваем цель за один тик
                    let step = (speed.speed * delta).min(dist);
                    transform.translation.x += dir.x * step;
                    transform.translation.z += dir.y * step;
                    travel_dir = Some(dir);
                }
            }
        }

        match facing {
            FacingCommand::FollowMovement => {
                if let Some(dir) = travel_dir {
                    transform.rotation = Quat::from_rotation_y(yaw_from_direction(dir));
                }
            }
            FacingCommand::Explicit { yaw } => {
                transform.rotation = Quat::from_rotation_y(*yaw);
            }
        }
    }
}

/// Plugin headless локомоции
///
/// Выполняется после AI систем в том же FixedUpdate тике.
pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, apply_locomotion.in_set(SimSet::Locomotion));
    }
}
