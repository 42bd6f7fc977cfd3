//! Startup errors

use thiserror::Error;

pub type ViewerResult<T> = Result<T, ViewerError>;

/// Everything that can stop the viewer from starting
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("No browser document available")]
    NoDocument,

    #[error("Missing DOM element: #{0}")]
    MissingElement(String),

    #[error("Viewer is already running")]
    AlreadyRunning,

    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("Surface creation failed: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("No suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("Device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ViewerError::MissingElement("viewer-canvas".into()).to_string(),
            "Missing DOM element: #viewer-canvas"
        );
        assert_eq!(
            ViewerError::AlreadyRunning.to_string(),
            "Viewer is already running"
        );
    }
}
