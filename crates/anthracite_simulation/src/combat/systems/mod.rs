//! Combat systems

pub mod bleeding;
pub mod damage;
pub mod death;


// Re-export all systems
pub use bleeding::*;
pub use damage::*;
pub use death::*;
