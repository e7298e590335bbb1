//! Player control marker component
//!
//! Отмечает entity которым управляет игрок (в отличие от AI).

use bevy::prelude::Component;

/// Marker component для player-controlled entity
///
/// AI этот маркер не читает — захват цели идёт по фракциям
/// (`Actor::faction_id`). Маркер нужен input/camera слоям вне crate
/// и тестам/демке для поиска тела игрока.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;
