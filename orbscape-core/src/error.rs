/// Error types shared by the render hosts
use thiserror::Error;

/// Fatal failures raised while bringing up or driving a render surface.
///
/// None of these are recoverable: a host that sees one tears down and reports it.
#[derive(Error, Debug)]
pub enum Error {
    /// The drawable surface (canvas, terminal) could not be found
    #[error("Surface error: {0}")]
    Surface(String),

    /// A rendering context could not be acquired
    #[error("Context error: {0}")]
    Context(String),

    /// Shader compilation or program linking failed
    #[error("Shader error: {0}")]
    Shader(String),

    /// A draw call failed mid-frame
    #[error("Render error: {0}")]
    Render(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
