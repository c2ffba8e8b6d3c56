//! Document-level visual effects.

/// Drop shadow shared by the photo and note layers.
pub mod shadow;
