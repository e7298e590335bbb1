//! GRIDFALL Simulation Core
//!
//! ECS-симуляция на Bevy 0.16 (strategic layer) для top-down shooter
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strategic layer (game state, AI controller, combat rules)
//! - Engine = tactical layer (rendering, физика, pathfinding) — внешний
//!   collaborator, общается через MovementCommand/FacingCommand компоненты
//!   и NavWorld resource. Headless режим подключает встроенную kinematic
//!   модель локомоции вместо движка.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod logger;
pub mod movement;
pub mod nav;

// Re-export основных типов для удобства
pub use ai::{AiConfig, AiPlugin, AiState, SlotAssignment, StuckTracker, Target};
pub use combat::{CombatPlugin, DamageDealt, Dead, EntityDied, MeleeHit};
pub use components::*;
pub use logger::{init_logger, log, log_info, log_warning};
pub use movement::LocomotionPlugin;
pub use nav::{NavWorld, NavigationProvider, PlanarNavMesh};

/// Порядок подсистем внутри FixedUpdate тика
///
/// AI решает → локомоция исполняет → combat применяет урон.
/// Явная цепочка, иначе multi_threaded executor ломает детерминизм.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    Ai,
    Locomotion,
    Combat,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            // Детерминистичный RNG (не перетираем seed, выбранный при
            // создании headless app)
            .init_resource::<DeterministicRng>()
            .configure_sets(
                FixedUpdate,
                (SimSet::Ai, SimSet::Locomotion, SimSet::Combat).chain(),
            )
            // Подсистемы (ECS strategic layer)
            .add_plugins((AiPlugin, CombatPlugin, LocomotionPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Вся случайность симуляции (slot angle/jitter, wander точки и паузы,
/// stuck nudge) идёт отсюда — одинаковый seed даёт идентичные прогоны.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время двигается вручную ровно на 1/60 сек за app.update() —
/// один update == один simulation tick, независимо от wall clock.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)) // 60Hz FixedUpdate
        .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(
            std::time::Duration::from_secs_f64(1.0 / 60.0),
        ));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    // Собираем все компоненты в детерминированный формат
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
