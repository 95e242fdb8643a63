// error_handling.rs - Error types for session ingestion and snapshot export

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Session payload parse failed: {0}")]
    PayloadParse(#[from] serde_json::Error),

    #[error("Session payload has no usable grid geometry")]
    MissingGeometry,

    #[error("Invalid colour literal: {literal}")]
    InvalidColour { literal: String },

    #[error("PNG encoding failed: {0}")]
    PngEncode(#[from] image::ImageError),

    #[error("Surface already disposed")]
    SurfaceDisposed,
}

pub type Result<T> = std::result::Result<T, ViewerError>;
