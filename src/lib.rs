//! Showroom: an interactive 3D product viewer
//!
//! Renders a procedurally built chair on a lit, shadowed ground plane with an
//! orbit camera that slowly auto-rotates while idle. Hovering a part
//! highlights it, clicking selects it and opens an info panel.
//!
//! Runs natively in a winit window with a Dear ImGui overlay, or in the
//! browser on a `<canvas id="viewer-canvas">` driven through [`web`].
//!
//! The viewer state ([`viewer::Viewer`]) is independent of the GPU; the
//! [`app`] module wires it to a window and the [`gfx::RenderEngine`].

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod interaction;
pub mod prelude;
pub mod product;
pub mod ui;
pub mod viewer;
pub mod wgpu_utils;

#[cfg(target_arch = "wasm32")]
pub mod web;

// Re-export main types for convenience
pub use app::{ShowroomApp, ViewerCommand};
pub use config::ViewerConfig;
pub use error::{ViewerError, ViewerResult};
pub use viewer::Viewer;
