//! Frame synthesis for photos and notes.

/// Line measurement for notes.
pub mod measure;
/// Notes: multi-line text blocks in the photo layer.
pub mod note;
/// Photos: images, optionally clipped.
pub mod photo;
/// Frame rectangle construction shared by both framers.
pub mod synth;
