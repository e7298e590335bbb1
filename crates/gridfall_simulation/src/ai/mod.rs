//! AI decision-making module
//!
//! Per-agent FSM контроллер hostile-акторов: Idle / Chasing / Attacking
//! по дистанции до цели, slot-позиционирование вокруг неё, wander в
//! простое, melee по интервалу, stuck recovery.

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

pub mod components;
pub mod systems;

// Re-export основных типов
pub use components::{AiConfig, AiState, SlotAssignment, SlotState, StuckTracker, Target, WanderState};

use crate::components::{Actor, FacingCommand, MovementCommand, MovementSpeed};
use crate::SimSet;

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
/// Порядок выполнения:
/// 1. acquire_targets — резолв слабой ссылки на цель
/// 2. ai_fsm_transitions — таблица переходов + entry-действия
/// 3. slot_positioning — поведение Chasing
/// 4. wander_behavior — поведение Idle
/// 5. attack_loop — поведение Attacking
/// 6. stuck_detection — cross-cutting guard, всегда последним
pub struct AiPlugin;

impl Plugin for AiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                systems::acquire_targets,
                systems::ai_fsm_transitions,
                systems::slot_positioning,
                systems::wander_behavior,
                systems::attack_loop,
                systems::stuck_detection,
            )
                .chain() // Последовательное выполнение для детерминизма
                .in_set(SimSet::Ai),
        );
    }
}

/// Spawn helper: hostile-актор с полным набором AI компонентов
///
/// SlotAssignment роллится здесь один раз — стабилен на всю жизнь агента.
pub fn spawn_hostile(
    commands: &mut Commands,
    position: Vec3,
    config: AiConfig,
    rng: &mut ChaCha8Rng,
) -> Entity {
    let assignment = SlotAssignment::roll(rng, config.slot_jitter);

    commands
        .spawn((
            Transform::from_translation(position),
            // Actor (Required: Health)
            Actor { faction_id: 1 },
            // AI
            AiState::default(),
            config,
            assignment,
            Target::default(),
            StuckTracker::default(),
            // Локомоция (исполнитель — headless модель или движок)
            MovementCommand::default(),
            FacingCommand::default(),
            MovementSpeed::default(),
        ))
        .id()
}
