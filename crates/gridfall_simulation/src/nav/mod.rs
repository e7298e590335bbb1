//! Navigation queries — injected collaborator interface
//!
//! Симуляция не владеет navmesh: запросы достижимости/проекции уходят
//! во внешний провайдер (в движке — NavigationServer). Для headless
//! режима и тестов — PlanarNavMesh (ограниченная плоскость).
//!
//! Запросы синхронные и rate-limited на стороне AI (repath cooldowns),
//! чтобы не опрашивать провайдер каждый тик при большом числе агентов.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Контракт world-query collaborator'а
///
/// - `reachable_point_near` — случайная достижимая точка в радиусе
///   (может легитимно вернуть None — не ошибка)
/// - `project_to_navmesh` — проекция точки на walkable поверхность
///   в пределах search_extent (None → вызывающий использует fallback)
pub trait NavigationProvider: Send + Sync {
    fn reachable_point_near(
        &self,
        origin: Vec3,
        radius: f32,
        rng: &mut ChaCha8Rng,
    ) -> Option<Vec3>;

    fn project_to_navmesh(&self, point: Vec3, search_extent: Vec3) -> Option<Vec3>;
}

/// Resource-обёртка над провайдером (инъекция вместо наследования)
#[derive(Resource)]
pub struct NavWorld(pub Box<dyn NavigationProvider>);

/// Headless navmesh: квадратная walkable плоскость y=0, |x|,|z| ≤ half_extent
///
/// Достаточно для симуляции арены без движка.
pub struct PlanarNavMesh {
    pub half_extent: f32,
}

impl PlanarNavMesh {
    pub fn new(half_extent: f32) -> Self {
        Self { half_extent }
    }

    fn clamp_to_bounds(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(-self.half_extent, self.half_extent),
            0.0,
            point.z.clamp(-self.half_extent, self.half_extent),
        )
    }
}

impl NavigationProvider for PlanarNavMesh {
    fn reachable_point_near(
        &self,
        origin: Vec3,
        radius: f32,
        rng: &mut ChaCha8Rng,
    ) -> Option<Vec3> {
        if radius <= 0.0 {
            return None;
        }

        // Равномерная точка в диске радиуса radius (sqrt для uniform площади)
        let angle = rng.gen::<f32>() * std::f32::consts::TAU;
        let dist = radius * rng.gen::<f32>().sqrt();
        let candidate = origin + Vec3::new(angle.cos() * dist, 0.0, angle.sin() * dist);

        Some(self.clamp_to_bounds(candidate))
    }

    fn project_to_navmesh(&self, point: Vec3, search_extent: Vec3) -> Option<Vec3> {
        // Точка проецируется если в пределах search_extent от walkable области
        let overshoot_x = (point.x.abs() - self.half_extent).max(0.0);
        let overshoot_z = (point.z.abs() - self.half_extent).max(0.0);

        if overshoot_x > search_extent.x || overshoot_z > search_extent.z {
            return None;
        }

        Some(self.clamp_to_bounds(point))
    }
}

/// Провайдер без walkable поверхности — все запросы отвечают None
///
/// Для тестов fallback-путей: отсутствие navmesh не фатально.
pub struct NoNavMesh;

impl NavigationProvider for NoNavMesh {
    fn reachable_point_near(&self, _: Vec3, _: f32, _: &mut ChaCha8Rng) -> Option<Vec3> {
        None
    }

    fn project_to_navmesh(&self, _: Vec3, _: Vec3) -> Option<Vec3> {
        None
    }
}
