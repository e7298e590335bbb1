//! FSM AI components (state machine, config, slot assignment, stuck tracker).

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// AI FSM состояния (distance-driven)
///
/// Data-carrying enum: transient-состояние живёт внутри варианта и
/// умирает вместе с ним при переходе — отмена таймеров/сглаживания
/// тотальна по построению, «подвисших» таймеров после перехода не бывает.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub enum AiState {
    /// Idle — блуждание по случайным точкам, ждём цель в chase-радиусе
    Idle {
        wander: WanderState,
    },

    /// Chasing — занимаем slot вокруг цели
    Chasing {
        slot: SlotState,
    },

    /// Attacking — стоим на месте, бьём по интервалу
    Attacking {
        /// Аккумулятор интервала атаки; 0 на входе → немедленный удар
        attack_timer: f32,
    },
}

impl Default for AiState {
    fn default() -> Self {
        Self::idle()
    }
}

impl AiState {
    /// Свежее Idle: пауза 0 → wander-точка выбирается сразу
    pub fn idle() -> Self {
        Self::Idle {
            wander: WanderState::default(),
        }
    }

    /// Свежее Chasing: таймеры 0 → пересчёт slot'а и move-команда сразу
    pub fn chasing() -> Self {
        Self::Chasing {
            slot: SlotState::default(),
        }
    }

    /// Свежее Attacking: таймер 0 → первый удар в этом же тике
    pub fn attacking() -> Self {
        Self::Attacking { attack_timer: 0.0 }
    }

    /// Имя состояния для логов
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle { .. } => "Idle",
            Self::Chasing { .. } => "Chasing",
            Self::Attacking { .. } => "Attacking",
        }
    }
}

/// Transient-состояние wander (живёт только внутри AiState::Idle)
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct WanderState {
    /// Текущая точка блуждания (None → выбрать после паузы)
    pub target: Option<Vec3>,
    /// Пауза до следующего выбора точки (сек)
    pub pause_timer: f32,
    /// Cooldown повторной выдачи move-команды
    pub repath_timer: f32,
}

/// Transient-состояние slot-позиционирования (живёт внутри AiState::Chasing)
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct SlotState {
    /// Последняя вычисленная точка slot'а (None до первого пересчёта)
    pub current_target: Option<Vec3>,
    /// Сглаженная точка — move-команды идут к ней, не к current
    /// (seed'ится current'ом при первом пересчёте, не от origin)
    pub smoothed_target: Option<Vec3>,
    /// Таймер до следующего пересчёта slot'а
    pub recalc_timer: f32,
    /// Cooldown move-команд (pathfinding rate limit)
    pub repath_timer: f32,
}

/// Параметры AI контроллера
///
/// Дистанции в метрах, время в секундах, скорости интерполяции — 1/сек.
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct AiConfig {
    /// Радиус атаки (метры)
    pub attack_range: f32,
    /// Урон за удар
    pub attack_damage: u32,
    /// Интервал между ударами (сек)
    pub attack_interval: f32,
    /// Радиус начала преследования (метры)
    pub chase_distance: f32,
    /// Дистанция остановки у slot-точки (метры)
    pub stop_distance: f32,
    /// Радиус кольца slot'ов вокруг цели (метры).
    /// Инвариант: slot_radius + slot_jitter + stop_distance ≤ attack_range,
    /// иначе агент паркуется у slot'а вне досягаемости удара
    pub slot_radius: f32,
    /// Амплитуда per-agent jitter offset'а (метры)
    pub slot_jitter: f32,
    /// Интервал пересчёта slot'а (сек) — не каждый тик, для bound cost
    pub slot_recalc_interval: f32,
    /// Скорость сглаживания slot-цели (1/сек)
    pub slot_smoothing_speed: f32,
    /// Скорость поворота на цель при преследовании (1/сек)
    pub chase_turn_speed: f32,
    /// Радиус блуждания (метры)
    pub wander_radius: f32,
    /// Пауза между wander-точками: нижняя граница (сек)
    pub wander_pause_min: f32,
    /// Пауза между wander-точками: верхняя граница (сек)
    pub wander_pause_max: f32,
    /// Cooldown move-команд при блуждании (сек)
    pub wander_repath_cooldown: f32,
    /// Порог скорости для stuck-детекции (м/с)
    pub stuck_speed_threshold: f32,
    /// Время ниже порога до срабатывания recovery (сек)
    pub stuck_time_to_trigger: f32,
    /// Cooldown move-команд при преследовании (сек)
    pub repath_cooldown: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            attack_range: 2.2,
            attack_damage: 10,
            attack_interval: 0.8,
            chase_distance: 20.0,
            stop_distance: 0.4,
            slot_radius: 1.5,
            slot_jitter: 0.2,
            slot_recalc_interval: 0.35,
            slot_smoothing_speed: 6.0,
            chase_turn_speed: 8.0,
            wander_radius: 10.0,
            wander_pause_min: 1.5,
            wander_pause_max: 4.0,
            wander_repath_cooldown: 0.5,
            stuck_speed_threshold: 0.15,
            stuck_time_to_trigger: 0.6,
            repath_cooldown: 0.25,
        }
    }
}

/// Per-agent назначение slot'а вокруг цели
///
/// Роллится ОДИН раз при спавне и стабильно на всю жизнь агента:
/// несколько агентов расходятся по разным углам кольца вместо того
/// чтобы сойтись в одну точку. Jitter НЕ перегенерируется при
/// пересчёте slot'а — иначе точка визуально дрожит.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct SlotAssignment {
    /// Угол на кольце вокруг цели (радианы)
    pub angle: f32,
    /// Фиксированный XZ offset (метры)
    pub jitter: Vec2,
}

impl SlotAssignment {
    pub fn roll(rng: &mut ChaCha8Rng, jitter_extent: f32) -> Self {
        Self {
            angle: rng.gen::<f32>() * std::f32::consts::TAU,
            jitter: Vec2::new(
                rng.gen_range(-1.0..=1.0_f32),
                rng.gen_range(-1.0..=1.0_f32),
            ) * jitter_extent,
        }
    }
}

/// Слабая ссылка на преследуемую цель
///
/// Entity может исчезнуть в любой момент — каждый dereference обязан
/// обработать отсутствие (no-op тик, не паника). Re-acquire делает
/// `acquire_targets` на следующих тиках.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Target(pub Option<Entity>);

/// Stuck-детектор: скорость по смещению за тик
///
/// Standing-компонент (живёт вне FSM-вариантов): аккумулятор
/// сбрасывается в состояниях где движение не ожидается.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct StuckTracker {
    /// Позиция на предыдущем тике (None до первого замера)
    pub last_position: Option<Vec3>,
    /// Непрерывное время ниже порога скорости (сек)
    pub low_speed_time: f32,
}
