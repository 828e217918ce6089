use std::fmt;

/// Failures that stop the viewer. None of them are retried.
#[derive(Debug)]
pub enum Error {
    Window(String),
    NoAdapter,
    Device(wgpu::RequestDeviceError),
    NoSurfaceFormat,
    /// Shader module or pipeline rejected by validation, with the diagnostic.
    Shader(String),
    Surface(wgpu::SurfaceError),
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Window(message) => write!(f, "failed to create window: {}", message),
            Error::NoAdapter => write!(f, "no graphics adapter compatible with the window"),
            Error::Device(_) => write!(f, "failed to open graphics device"),
            Error::NoSurfaceFormat => write!(f, "surface reports no supported texture formats"),
            Error::Shader(message) => write!(f, "failed to build render program:\n{}", message),
            Error::Surface(_) => write!(f, "failed to acquire frame"),
            Error::Config(message) => write!(f, "invalid configuration: {}", message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Device(error) => Some(error),
            Error::Surface(error) => Some(error),
            _ => None,
        }
    }
}

impl From<wgpu::RequestDeviceError> for Error {
    fn from(error: wgpu::RequestDeviceError) -> Self {
        Error::Device(error)
    }
}

impl From<winit::error::OsError> for Error {
    fn from(error: winit::error::OsError) -> Self {
        Error::Window(error.to_string())
    }
}
