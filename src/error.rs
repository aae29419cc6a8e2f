use thiserror::Error;

/// Library error type for gallery construction and configuration.
#[derive(Debug, Error)]
pub enum GalleryError {
    /// The configuration block did not name a display surface.
    #[error("gallery configuration is missing display-id")]
    MissingDisplayId,

    /// The configuration block did not name a thumbnail container.
    #[error("gallery {display_id} is missing thumbs-id")]
    MissingThumbsId { display_id: String },

    /// The surface reported no slides at construction time.
    #[error("gallery {0} has no slides")]
    EmptySlideSet(String),

    /// A negative thumbnail set size was requested. Non-fatal: the prior value is kept.
    #[error("could not set set-size to {0}; a non-negative value is required")]
    InvalidSetSize(i64),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}

pub type Result<T, E = GalleryError> = std::result::Result<T, E>;
