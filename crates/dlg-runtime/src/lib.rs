mod engine;
mod interpolate;
mod walker;

pub use engine::DialogueEngine;
pub use interpolate::interpolate;
pub use walker::{Walker, TRAVERSAL_GUARD};
