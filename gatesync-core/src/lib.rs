pub mod config;
pub mod diff_render;
pub mod document;
pub mod entity;
pub mod error;
pub mod event;
pub mod tag;

pub use entity::{Entity, EntityKind, ForeignRef, IdOrName, NaturalKey, Timestamps};
pub use error::CoreError;
pub use event::{Event, Op};
