//! Headless симуляция GRIDFALL
//!
//! Запускает Bevy App без рендера: player в центре арены, pack hostiles
//! по краям. Hostiles сходятся, окружают и забивают цель.

use bevy::prelude::*;
use gridfall_simulation::{
    ai, create_headless_app, Actor, AiConfig, DeterministicRng, Health, NavWorld, PlanarNavMesh,
    Player, SimulationPlugin,
};

fn main() {
    let seed = 42;
    println!("Starting GRIDFALL headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);
    app.insert_resource(NavWorld(Box::new(PlanarNavMesh::new(50.0))));

    // Player в центре арены
    app.world_mut().spawn((
        Transform::from_translation(Vec3::ZERO),
        Actor { faction_id: 0 },
        Health::new(200),
        Player,
    ));

    // Pack hostiles вокруг (в пределах chase-радиуса)
    let spawn_points = [
        Vec3::new(15.0, 0.0, 0.0),
        Vec3::new(-12.0, 0.0, 8.0),
        Vec3::new(4.0, 0.0, -16.0),
        Vec3::new(-9.0, 0.0, -11.0),
    ];
    app.world_mut()
        .resource_scope(|world, mut rng: Mut<DeterministicRng>| {
            let mut commands = world.commands();
            for position in spawn_points {
                ai::spawn_hostile(&mut commands, position, AiConfig::default(), &mut rng.rng);
            }
        });
    app.world_mut().flush();

    // Прогоняем 2000 тиков (~33 сек симуляции)
    for tick in 0..2000 {
        app.update();

        if tick % 200 == 0 {
            let world = app.world_mut();
            let mut players = world.query_filtered::<&Health, With<Player>>();
            if let Some(health) = players.iter(world).next() {
                println!("Tick {}: player HP {}/{}", tick, health.current, health.max);
            }
        }
    }

    println!("Simulation complete!");
}
