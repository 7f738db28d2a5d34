//! ECS Components для боевых entity
//!
//! Организация по доменам:
//! - actor: Health, Dead, Ragdoll
//! - body: body-part ledger (Hitbox, BodyPart, BleedingKind)
//! - armor: ArmorPiece, WornArmor
//! - world: surfaces, collision layers, Damageable, AimCamera
//! - equipment: WeaponInventory (9 слотов + switch state machine), pickups, sockets

pub mod actor;
pub mod armor;
pub mod body;
pub mod equipment;
pub mod world;

// Re-exports для удобного импорта
pub use actor::*;
pub use armor::*;
pub use body::*;
pub use equipment::*;
pub use world::*;
