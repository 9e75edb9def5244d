//! Math and timing building blocks shared by the renderer and the viewer

pub mod math;
pub mod time;
