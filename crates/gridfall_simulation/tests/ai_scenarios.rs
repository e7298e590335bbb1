//! AI controller integration tests
//!
//! Сценарии поведения hostile-агента headless:
//! - дистанционная таблица переходов (Idle → Chasing → Attacking)
//! - немедленный первый удар и интервальные удары
//! - отсутствие урона после выхода из Attacking
//! - stuck recovery в окне 0.6s (ровно один nudge)
//! - bound частоты пересчёта slot'а
//! - wander ходит только к точкам провайдера
//! - разбегание агентов по slot'ам вокруг цели

use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use gridfall_simulation::nav::NoNavMesh;
use gridfall_simulation::*;
use rand_chacha::ChaCha8Rng;

// --- Helpers ---

/// Полный sim App c планарным navmesh
fn create_sim_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);
    app.insert_resource(NavWorld(Box::new(PlanarNavMesh::new(60.0))));
    app
}

/// Sim App без navmesh (wander/проекция отвечают None — fallback пути)
fn create_sim_app_no_nav(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);
    app.insert_resource(NavWorld(Box::new(NoNavMesh)));
    app
}

fn spawn_player(app: &mut App, position: Vec3, hp: u32) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_translation(position),
            Actor { faction_id: 0 },
            Health::new(hp),
            Player,
        ))
        .id()
}

fn spawn_agent(app: &mut App, position: Vec3, config: AiConfig) -> Entity {
    let entity = app
        .world_mut()
        .resource_scope(|world, mut rng: Mut<DeterministicRng>| {
            let mut commands = world.commands();
            ai::spawn_hostile(&mut commands, position, config, &mut rng.rng)
        });
    app.world_mut().flush();
    entity
}

fn state_label(app: &App, entity: Entity) -> &'static str {
    app.world()
        .get::<AiState>(entity)
        .map(|state| state.label())
        .unwrap_or("<none>")
}

fn player_hp(app: &App, player: Entity) -> u32 {
    app.world().get::<Health>(player).unwrap().current
}

fn set_position(app: &mut App, entity: Entity, position: Vec3) {
    app.world_mut()
        .get_mut::<Transform>(entity)
        .unwrap()
        .translation = position;
}

fn agent_position(app: &App, entity: Entity) -> Vec3 {
    app.world().get::<Transform>(entity).unwrap().translation
}

// --- Tests ---

/// Сценарий дистанционной таблицы: 25м → Idle, 15м → Chasing,
/// 2м → Attacking + ровно один немедленный удар
#[test]
fn test_distance_walk_scenario() {
    // NoNavMesh: агент не блуждает (точек нет) — дистанция под контролем
    let mut app = create_sim_app_no_nav(42);
    let config = AiConfig::default(); // chase 20м, attack 2.2м

    let player = spawn_player(&mut app, Vec3::new(25.0, 0.0, 0.0), 1000);
    let agent = spawn_agent(&mut app, Vec3::ZERO, config);

    // 25м > chase 20м → остаёмся Idle
    for _ in 0..5 {
        app.update();
    }
    assert_eq!(state_label(&app, agent), "Idle");
    assert_eq!(player_hp(&app, player), 1000);

    // 15м ≤ chase → Chasing на следующей оценке
    set_position(&mut app, player, Vec3::new(15.0, 0.0, 0.0));
    for _ in 0..2 {
        app.update();
    }
    assert_eq!(state_label(&app, agent), "Chasing");
    assert_eq!(player_hp(&app, player), 1000); // урона в Chasing нет

    // 2м ≤ attack 2.2м → Attacking + немедленный удар
    let agent_pos = agent_position(&app, agent);
    set_position(&mut app, player, agent_pos + Vec3::new(2.0, 0.0, 0.0));
    app.update();
    assert_eq!(state_label(&app, agent), "Attacking");
    assert_eq!(player_hp(&app, player), 990); // ровно один удар (10 урона)

    // До истечения интервала (0.8с) второго удара нет
    for _ in 0..40 {
        app.update();
        assert_eq!(state_label(&app, agent), "Attacking");
    }
    assert_eq!(player_hp(&app, player), 990);

    // После полного интервала — второй удар
    for _ in 0..12 {
        app.update();
    }
    assert_eq!(player_hp(&app, player), 980);
}

/// Выход из Attacking до истечения интервала отменяет все дальнейшие
/// интервальные удары (урон после выхода не течёт)
#[test]
fn test_no_damage_after_leaving_attacking() {
    let mut app = create_sim_app_no_nav(7);
    let config = AiConfig::default();

    let player = spawn_player(&mut app, Vec3::new(2.0, 0.0, 0.0), 1000);
    let agent = spawn_agent(&mut app, Vec3::ZERO, config);

    // Idle → Chasing → Attacking + немедленный удар (две оценки таблицы)
    app.update();
    app.update();
    assert_eq!(state_label(&app, agent), "Attacking");
    assert_eq!(player_hp(&app, player), 990);

    // Цель уходит за chase-радиус → Idle, таймер атаки умирает с вариантом
    set_position(&mut app, player, Vec3::new(30.0, 0.0, 0.0));
    app.update();
    assert_eq!(state_label(&app, agent), "Idle");

    // Ждём сильно дольше интервала — урон не появляется
    for _ in 0..120 {
        app.update();
    }
    assert_eq!(player_hp(&app, player), 990);
}

/// Сам удар перепроверяет дистанцию: если к моменту удара цель вне
/// attack_range — урон не применяется (даже если FSM ещё не успел
/// снести состояние). Гоняем attack_loop изолированно, без FSM.
#[test]
fn test_attack_skipped_when_target_out_of_range() {
    use gridfall_simulation::ai::systems::attack_loop;

    let mut app = create_headless_app(11);
    app.add_plugins(CombatPlugin);
    app.add_systems(FixedUpdate, attack_loop);
    app.insert_resource(NavWorld(Box::new(NoNavMesh)));

    let player = spawn_player(&mut app, Vec3::new(10.0, 0.0, 0.0), 1000);
    let agent = spawn_agent(&mut app, Vec3::ZERO, AiConfig::default());

    // Форсим Attacking с целью вне радиуса (10м > 2.2м)
    *app.world_mut().get_mut::<AiState>(agent).unwrap() = AiState::attacking();
    app.world_mut().get_mut::<Target>(agent).unwrap().0 = Some(player);

    // Немедленный удар пропущен, интервальные тоже — урона нет вообще
    for _ in 0..120 {
        app.update();
    }
    assert_eq!(player_hp(&app, player), 1000);

    // Цель вернулась в радиус — следующий истёкший интервал бьёт
    set_position(&mut app, player, Vec3::new(1.0, 0.0, 0.0));
    for _ in 0..60 {
        app.update();
    }
    assert!(player_hp(&app, player) < 1000);
}

/// Stuck recovery: агент прижат (без локомоции) — скорость 0 в Chasing.
/// За окно 0.7с при триггере 0.6с recovery срабатывает РОВНО один раз,
/// и не раньше 0.6с
#[test]
fn test_stuck_recovery_fires_once_in_window() {
    // Без LocomotionPlugin: команды пишутся, тело не двигается
    let mut app = create_headless_app(5);
    app.add_plugins((ai::AiPlugin, CombatPlugin));
    app.insert_resource(NavWorld(Box::new(NoNavMesh)));

    let _player = spawn_player(&mut app, Vec3::new(10.0, 0.0, 0.0), 1000);
    let agent = spawn_agent(&mut app, Vec3::ZERO, AiConfig::default());

    // Входим в Chasing
    for _ in 0..2 {
        app.update();
    }
    assert_eq!(state_label(&app, agent), "Chasing");

    let slot_target = |app: &App| match app.world().get::<AiState>(agent).unwrap() {
        AiState::Chasing { slot } => slot.current_target,
        _ => unreachable!(),
    };
    assert!(slot_target(&app).is_some(), "slot target должен быть вычислен");

    // 42 тика низкой скорости = 0.7с; триггер 0.6с = 36 тиков
    let mut recoveries = 0;
    let mut prev_accum = 0.0_f32;
    let mut prev_slot = slot_target(&app);
    let mut first_recovery_tick = None;
    for tick in 0..42 {
        app.update();
        let accum = app.world().get::<StuckTracker>(agent).unwrap().low_speed_time;
        if accum < prev_accum {
            recoveries += 1;
            first_recovery_tick = first_recovery_tick.or(Some(tick));

            // В тик recovery slot-цель сдвинута вбок nudge'ем
            let nudged = slot_target(&app).unwrap();
            assert!(
                prev_slot.unwrap().distance(nudged) > 0.5,
                "nudge должен сдвинуть slot-цель"
            );
        }
        prev_slot = slot_target(&app);
        prev_accum = accum;
    }

    assert_eq!(recoveries, 1, "recovery должен сработать ровно один раз");
    let fired_at = first_recovery_tick.unwrap();
    // 0.6с = 36 тиков от входа в Chasing (±2: установка базы смещения
    // съедает первый замер)
    assert!(
        (33..=37).contains(&fired_at),
        "recovery сработал на тике {}, ожидали ~34",
        fired_at
    );
}

/// Bound пересчёта slot'а: за T секунд не больше ⌈T/interval⌉ + 1
/// пересчётов (цель дрейфует каждый тик — каждый пересчёт меняет точку)
#[test]
fn test_slot_recompute_rate_bounded() {
    let mut app = create_sim_app(13);
    let config = AiConfig::default(); // recalc interval 0.35с

    let player = spawn_player(&mut app, Vec3::new(10.0, 0.0, 0.0), 100_000);
    let agent = spawn_agent(&mut app, Vec3::ZERO, config.clone());

    // Входим в Chasing
    app.update();
    assert_eq!(state_label(&app, agent), "Chasing");

    // 120 тиков = 2.0с → пересчётов ≤ ⌈2.0/0.35⌉ + 1 = 7
    let mut recomputes = 0;
    let mut prev_target: Option<Vec3> = None;
    for tick in 0..120 {
        // Дрейф цели: каждый пересчёт даёт новую точку
        let drift = Vec3::new(10.0 + tick as f32 * 0.01, 0.0, 0.0);
        set_position(&mut app, player, drift);
        app.update();

        let current = match app.world().get::<AiState>(agent).unwrap() {
            AiState::Chasing { slot } => slot.current_target,
            _ => None,
        };
        if current != prev_target {
            recomputes += 1;
            prev_target = current;
        }
    }

    assert!(
        recomputes <= 7,
        "пересчётов {} за 2с, допустимо не больше 7",
        recomputes
    );
    assert!(recomputes >= 2, "пересчёты вообще не происходят");
}

/// Wander никогда не идёт к точке, которую провайдер не возвращал
#[test]
fn test_wander_moves_only_to_provider_points() {
    /// Провайдер-регистратор: запоминает каждую выданную точку
    struct RecordingNav {
        inner: PlanarNavMesh,
        returned: Arc<Mutex<Vec<Vec3>>>,
    }

    impl NavigationProvider for RecordingNav {
        fn reachable_point_near(
            &self,
            origin: Vec3,
            radius: f32,
            rng: &mut ChaCha8Rng,
        ) -> Option<Vec3> {
            let point = self.inner.reachable_point_near(origin, radius, rng);
            if let Some(point) = point {
                self.returned.lock().unwrap().push(point);
            }
            point
        }

        fn project_to_navmesh(&self, point: Vec3, search_extent: Vec3) -> Option<Vec3> {
            self.inner.project_to_navmesh(point, search_extent)
        }
    }

    let returned = Arc::new(Mutex::new(Vec::new()));
    let mut app = create_headless_app(21);
    app.add_plugins(SimulationPlugin);
    app.insert_resource(NavWorld(Box::new(RecordingNav {
        inner: PlanarNavMesh::new(60.0),
        returned: Arc::clone(&returned),
    })));

    // Без player: цели нет, агент блуждает в Idle
    let agent = spawn_agent(&mut app, Vec3::ZERO, AiConfig::default());

    let mut issued_targets = Vec::new();
    for _ in 0..900 {
        app.update();
        if let Some(MovementCommand::MoveTo { target, .. }) =
            app.world().get::<MovementCommand>(agent)
        {
            issued_targets.push(*target);
        }
    }

    assert!(!issued_targets.is_empty(), "агент должен блуждать");
    let returned = returned.lock().unwrap();
    for target in issued_targets {
        assert!(
            returned.iter().any(|point| point.distance(target) < 1e-5),
            "move-команда к точке {:?}, которую провайдер не возвращал",
            target
        );
    }
}

/// Без navmesh агент остаётся без wander-цели и держит позицию
/// (отсутствие точек — не ошибка)
#[test]
fn test_wander_holds_position_without_navmesh() {
    let mut app = create_sim_app_no_nav(3);
    let agent = spawn_agent(&mut app, Vec3::new(4.0, 0.0, 4.0), AiConfig::default());

    for _ in 0..300 {
        app.update();
    }

    assert_eq!(state_label(&app, agent), "Idle");
    let pos = agent_position(&app, agent);
    assert!(pos.distance(Vec3::new(4.0, 0.0, 4.0)) < 1e-4);
}

/// Несколько агентов расходятся по slot'ам вокруг цели, а не
/// стекаются в одну точку
#[test]
fn test_pack_surrounds_target() {
    let mut app = create_sim_app(42);
    let config = AiConfig::default();

    let player = spawn_player(&mut app, Vec3::ZERO, 1_000_000);
    let spawn_points = [
        Vec3::new(12.0, 0.0, 0.0),
        Vec3::new(-10.0, 0.0, 6.0),
        Vec3::new(3.0, 0.0, -14.0),
        Vec3::new(-7.0, 0.0, -9.0),
    ];
    let agents: Vec<Entity> = spawn_points
        .iter()
        .map(|&position| spawn_agent(&mut app, position, config.clone()))
        .collect();

    // Фиксируем углы — кольцо из четырёх slot'ов (jitter остаётся)
    use std::f32::consts::FRAC_PI_2;
    for (i, &agent) in agents.iter().enumerate() {
        app.world_mut()
            .get_mut::<SlotAssignment>(agent)
            .unwrap()
            .angle = FRAC_PI_2 * i as f32;
    }

    // 10 секунд симуляции
    for _ in 0..600 {
        app.update();
    }

    // Все сошлись к цели (Chasing у кольца или Attacking в упор)
    for &agent in &agents {
        let label = state_label(&app, agent);
        assert!(
            label == "Chasing" || label == "Attacking",
            "агент {:?} в {}",
            agent,
            label
        );
        let dist = agent_position(&app, agent).distance(agent_position(&app, player));
        assert!(dist < 8.0, "агент не приблизился: {:.1}м", dist);
    }

    // Slot-точки кольца (восстановленные из назначений) разнесены —
    // агенты не претендуют на одну позицию
    let player_pos = agent_position(&app, player);
    let slots: Vec<Vec3> = agents
        .iter()
        .map(|&agent| {
            let assignment = app.world().get::<SlotAssignment>(agent).unwrap();
            player_pos
                + Vec3::new(
                    assignment.angle.cos() * config.slot_radius + assignment.jitter.x,
                    0.0,
                    assignment.angle.sin() * config.slot_radius + assignment.jitter.y,
                )
        })
        .collect();
    for i in 0..slots.len() {
        for j in (i + 1)..slots.len() {
            assert!(
                slots[i].distance(slots[j]) > 1.2,
                "slot-точки слиплись: {:?} и {:?}",
                slots[i],
                slots[j]
            );
        }
    }
}

/// Смерть цели: ссылка слабая — агенты не паникуют, урон не течёт
#[test]
fn test_target_death_absorbed() {
    let mut app = create_sim_app_no_nav(17);
    let config = AiConfig::default();

    let player = spawn_player(&mut app, Vec3::new(2.0, 0.0, 0.0), 30);
    let agent = spawn_agent(&mut app, Vec3::ZERO, config);

    // 30 HP / 10 урона = 3 удара: немедленный + 2 интервальных (~1.7с)
    for _ in 0..150 {
        app.update();
    }

    assert_eq!(player_hp(&app, player), 0);
    assert!(app.world().get::<Dead>(player).is_some());

    // Агент жив и не крашится без цели ещё 100 тиков
    for _ in 0..100 {
        app.update();
    }
    assert!(app.world().get::<AiState>(agent).is_some());
}
