//! Scene hand-off for shapeviz
//!
//! Turns loaded inputs into renderer-independent scene descriptions:
//! configuration, an explicit scene builder, the [`RenderBackend`] seam
//! external renderers implement, and per-file / batch jobs.

pub mod config;
pub mod scene;
pub mod backend;
pub mod job;
pub mod batch;

pub use config::*;
pub use scene::*;
pub use backend::*;
pub use job::*;
pub use batch::*;
