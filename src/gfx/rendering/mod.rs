//! Frame rendering: surface, pipelines, shadow map and per-node GPU state

pub mod gpu_mesh;
pub mod pipeline_manager;
pub mod render_engine;

// Re-export main types
pub use pipeline_manager::{PipelineConfig, PipelineManager, PipelineStats};
pub use render_engine::{FrameStatus, RenderEngine};
