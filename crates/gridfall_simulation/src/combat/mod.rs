//! Combat module
//!
//! ECS ответственность:
//! - Game state: Health
//! - Combat rules: применение melee-урона, смерть
//! - Events: MeleeHit (интент от AI), DamageDealt, EntityDied
//!
//! Анимации/hitbox'ы ударов — у движка; симуляция оперирует интентами.

use bevy::prelude::*;

pub mod damage;

// Re-export основных типов
pub use damage::{apply_melee_hits, disable_ai_on_death, DamageDealt, Dead, EntityDied, MeleeHit};

use crate::SimSet;

/// Combat Plugin
///
/// Порядок выполнения (после AI и локомоции в том же тике):
/// 1. apply_melee_hits — MeleeHit → Health, DamageDealt, EntityDied
/// 2. disable_ai_on_death — зачистка компонентов мертвых
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<MeleeHit>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>();

        // Регистрация систем в FixedUpdate
        app.add_systems(
            FixedUpdate,
            (apply_melee_hits, disable_ai_on_death)
                .chain() // Последовательное выполнение
                .in_set(SimSet::Combat),
        );
    }
}
