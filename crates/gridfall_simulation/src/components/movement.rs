//! Movement компоненты: команды перемещения и ориентации
//!
//! Архитектура:
//! - AI контроллер пишет MovementCommand/FacingCommand (high-level intent)
//! - Исполнитель (движок через NavigationAgent, либо headless kinematic
//!   модель из crate::movement) читает команды и двигает тело
//! - Контроллер НИКОГДА не трогает Transform напрямую

use bevy::prelude::*;

/// Команда движения для актора
///
/// Контракт `moveToward(point, acceptanceRadius, usePathing)` / `stop()`
/// из интерфейса локомоции, выраженный как component intent.
#[derive(Component, Debug, Clone, PartialEq)]
pub enum MovementCommand {
    /// Стоять на месте (не трогать текущий nav target)
    Idle,
    /// Двигаться к позиции (world coordinates)
    MoveTo {
        target: Vec3,
        /// Радиус приёмки: движение завершено в пределах этой дистанции
        acceptance_radius: f32,
        /// true → идти через pathfinding; false → прямое движение.
        /// Headless модель игнорирует флаг (двигается по прямой),
        /// engine-исполнитель маршрутизирует через NavigationAgent.
        use_pathing: bool,
    },
    /// Остановиться немедленно (сбросить velocity)
    Stop,
}

impl Default for MovementCommand {
    fn default() -> Self {
        Self::Idle
    }
}

/// Команда ориентации корпуса
///
/// Контракт `setFacingMode(followsMovement)` / `setOrientation(rotation)`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub enum FacingCommand {
    /// Корпус поворачивается в направлении движения (wander-визуалы)
    FollowMovement,
    /// Явный yaw в радианах, задаётся контроллером (взгляд на цель)
    Explicit { yaw: f32 },
}

impl Default for FacingCommand {
    fn default() -> Self {
        Self::FollowMovement
    }
}

/// Скорость движения актора (метры/сек)
#[derive(Component, Clone, Copy, Debug)]
pub struct MovementSpeed {
    pub speed: f32,
}

impl Default for MovementSpeed {
    fn default() -> Self {
        Self { speed: 3.0 } // 3 m/s — бег hostile-актора
    }
}
