//! Damage application and death systems.

use bevy::prelude::*;

use crate::components::{FacingCommand, Health, MovementCommand};

/// Melee-удар от AI контроллера (интент с атрибуцией атакующего)
#[derive(Event, Debug, Clone, Copy)]
pub struct MeleeHit {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
}

/// Урон применён (для UI/VFX слушателей вне симуляции)
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    pub amount: u32,
}

/// Актор умер (Health достиг 0)
#[derive(Event, Debug, Clone, Copy)]
pub struct EntityDied {
    pub entity: Entity,
}

/// Компонент-маркер: entity мертв (Health == 0)
///
/// Деспавн не автоматический — трупы остаются на месте.
#[derive(Component, Debug)]
pub struct Dead;

/// Система: применение melee-ударов к Health
///
/// Target мог исчезнуть между ударом и применением — тогда удар
/// молча пропадает (слабая ссылка, не ошибка).
pub fn apply_melee_hits(
    mut melee_hits: EventReader<MeleeHit>,
    mut targets: Query<&mut Health, Without<Dead>>,
    mut damage_dealt: EventWriter<DamageDealt>,
    mut entity_died: EventWriter<EntityDied>,
) {
    for hit in melee_hits.read() {
        let Ok(mut health) = targets.get_mut(hit.target) else {
            continue;
        };

        let was_alive = health.is_alive();
        health.take_damage(hit.damage);

        damage_dealt.write(DamageDealt {
            attacker: hit.attacker,
            target: hit.target,
            amount: hit.damage,
        });

        if was_alive && !health.is_alive() {
            crate::logger::log(&format!(
                "Combat: {:?} killed by {:?}",
                hit.target, hit.attacker
            ));
            entity_died.write(EntityDied { entity: hit.target });
        }
    }
}

/// Система: отключение AI при смерти
///
/// Убирает AI и команды движения у мертвых entities, добавляет Dead.
pub fn disable_ai_on_death(mut commands: Commands, mut death_events: EventReader<EntityDied>) {
    for event in death_events.read() {
        if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
            entity_commands.remove::<crate::ai::AiState>();
            entity_commands.remove::<crate::ai::Target>();
            entity_commands.remove::<MovementCommand>();
            entity_commands.remove::<FacingCommand>();
            entity_commands.insert(Dead);

            crate::logger::log(&format!("Combat: disabled AI for dead entity {:?}", event.entity));
        }
    }
}
