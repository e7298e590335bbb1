//! Базовые компоненты акторов: Actor, Health

use bevy::prelude::*;

/// Актор — живое тело в симуляции (player-controlled или hostile)
///
/// Required Components добавляют Health автоматически.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Health)]
pub struct Actor {
    /// Фракция: AI целится только в акторов чужой фракции
    pub faction_id: u64,
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max. Лечения в симуляции нет — current
/// только убывает; смерть (current == 0) обрабатывает combat-пайплайн.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100) // Default 100 HP
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Насыщающее вычитание — current не уходит ниже нуля
    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }
}
