//! Observable values and the dependency graph that keeps derived values current.

mod derived;
mod emitter;
mod graph;
mod property;

pub use derived::DerivedProperty;
pub use emitter::{Emitter, ListenerId};
pub use graph::{DependentLink, Source};
pub use property::Property;
