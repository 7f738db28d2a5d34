//! Аналитический backend: все collider'ы — сферы

use bevy::prelude::*;

use super::{ColliderSnapshot, PhysicsQuery, SweepHit};

#[derive(Debug, Clone, Default)]
pub struct SphereWorld {
    colliders: Vec<ColliderSnapshot>,
}

impl SphereWorld {
    pub fn with_colliders(colliders: Vec<ColliderSnapshot>) -> Self {
        Self { colliders }
    }

    pub fn colliders(&self) -> &[ColliderSnapshot] {
        &self.colliders
    }

    fn masked(&self, mask: u32) -> impl Iterator<Item = &ColliderSnapshot> {
        self.colliders.iter().filter(move |c| c.layer & mask != 0)
    }
}

/// Moving sphere vs static sphere
fn sweep_against(
    collider: &ColliderSnapshot,
    origin: Vec3,
    radius: f32,
    direction: Vec3,
    max_distance: f32,
) -> Option<SweepHit> {
    let combined = collider.radius + radius;
    let offset = origin - collider.center;
    let c = offset.length_squared() - combined * combined;

    // Уже пересекаемся в начале sweep
    if c <= 0.0 {
        return Some(SweepHit {
            surface: collider.surface,
            distance: 0.0,
            point: origin,
            normal: -direction,
        });
    }

    let b = offset.dot(direction);
    if b > 0.0 {
        return None;
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let distance = -b - discriminant.sqrt();
    if distance > max_distance {
        return None;
    }

    let normal = (origin + direction * distance - collider.center).normalize_or_zero();

    Some(SweepHit {
        surface: collider.surface,
        distance,
        point: collider.center + normal * collider.radius,
        normal,
    })
}

impl PhysicsQuery for SphereWorld {
    fn sweep_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: u32,
    ) -> Vec<SweepHit> {
        let Some(direction) = direction.try_normalize() else {
            return Vec::new();
        };

        let mut hits: Vec<SweepHit> = self
            .masked(mask)
            .filter_map(|c| sweep_against(c, origin, radius, direction, max_distance))
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn overlap_sphere(&self, origin: Vec3, radius: f32, mask: u32) -> Vec<Entity> {
        let mut overlaps: Vec<(f32, Entity)> = self
            .masked(mask)
            .filter_map(|c| {
                let distance = origin.distance(c.center);
                (distance <= c.radius + radius).then_some((distance, c.surface))
            })
            .collect();

        overlaps.sort_by(|a, b| a.0.total_cmp(&b.0));
        overlaps.into_iter().map(|(_, entity)| entity).collect()
    }

    fn refresh(&mut self, colliders: &[ColliderSnapshot]) {
        self.colliders = colliders.to_vec();
    }
}
