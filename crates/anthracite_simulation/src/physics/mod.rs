//! Physics query capability
//!
//! Симуляция не владеет физикой: ей нужны только запросы
//! (sphere sweep, sphere overlap, raycast). Backend подключается через
//! trait `PhysicsQuery` и хранится в resource `PhysicsWorld`.
//!
//! Встроенный backend — `SphereWorld` (аналитические сферы), синхронизируется
//! каждый тик из `Surface` + `SphereCollider` + `Transform`.

use bevy::prelude::*;

pub mod sphere_world;

pub use sphere_world::SphereWorld;

use crate::components::{SphereCollider, Surface};

/// Попадание sweep/raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Surface entity, в который попали
    pub surface: Entity,
    /// Дистанция вдоль направления (0 — пересечение в начале sweep)
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

/// Snapshot collider'а для backend'а
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderSnapshot {
    pub surface: Entity,
    pub center: Vec3,
    pub radius: f32,
    pub layer: u32,
}

/// Запросы к физике. Результаты отсортированы по дистанции.
pub trait PhysicsQuery: Send + Sync {
    fn sweep_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: u32,
    ) -> Vec<SweepHit>;

    fn overlap_sphere(&self, origin: Vec3, radius: f32, mask: u32) -> Vec<Entity>;

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: u32) -> Vec<SweepHit> {
        self.sweep_sphere(origin, 0.0, direction, max_distance, mask)
    }

    /// Backend'ы, которые сами следят за миром, могут игнорировать
    fn refresh(&mut self, _colliders: &[ColliderSnapshot]) {}
}

#[derive(Resource)]
pub struct PhysicsWorld(pub Box<dyn PhysicsQuery>);

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self(Box::new(SphereWorld::default()))
    }
}

impl PhysicsWorld {
    pub fn new(backend: impl PhysicsQuery + 'static) -> Self {
        Self(Box::new(backend))
    }

    pub fn query(&self) -> &dyn PhysicsQuery {
        self.0.as_ref()
    }
}

/// Система: передать актуальные collider'ы в backend
pub fn refresh_physics_world(
    colliders: Query<(Entity, &Surface, &SphereCollider, &Transform)>,
    mut physics: ResMut<PhysicsWorld>,
) {
    let mut snapshot: Vec<ColliderSnapshot> = colliders
        .iter()
        .map(|(entity, surface, collider, transform)| ColliderSnapshot {
            surface: entity,
            center: transform.translation,
            radius: collider.radius,
            layer: surface.layer,
        })
        .collect();

    // Порядок query не гарантирован — сортируем для детерминизма
    snapshot.sort_by_key(|c| c.surface.index());

    physics.0.refresh(&snapshot);
}
