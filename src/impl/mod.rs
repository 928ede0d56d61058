#[cfg(feature = "serde")]
mod serde;

#[cfg(feature = "serde-seeded")]
mod serde_seeded;
#[cfg(feature = "serde-seeded")]
pub use serde_seeded::*;
