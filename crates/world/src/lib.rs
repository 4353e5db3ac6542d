//! Voxel world store and dynamic entity lighting.

mod blocks;
mod chunk;
mod entity;
mod entity_lighting;
pub mod light_sources;
mod lighting;
mod storage;
mod world;

pub use blocks::*;
pub use chunk::*;
pub use entity::*;
pub use entity_lighting::*;
pub use light_sources::{Classifier, Emitter, LightSource, SourceKind, SourceState};
pub use lighting::*;
pub use storage::*;
pub use world::*;
