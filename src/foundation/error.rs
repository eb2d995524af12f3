use crate::data::primitive::PrimitiveId;

/// Result alias used across the crate.
pub type MapPaintResult<T> = Result<T, MapPaintError>;

/// Frame parameters attached to an aborted frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameContext {
    /// Identity of the dataset being painted.
    pub dataset: u64,
    /// Metres represented by 100 screen pixels at the view centre.
    pub circum: f64,
    /// East/north units per screen pixel.
    pub scale: f64,
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// Paint worker count the frame ran with.
    pub render_threads: usize,
}

impl std::fmt::Display for FrameContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "dataset={} circum={:.3} scale={:.6} size={}x{} render_threads={}",
            self.dataset, self.circum, self.scale, self.width, self.height, self.render_threads
        )
    }
}

/// Errors produced by the renderer and its helpers.
#[derive(thiserror::Error, Debug)]
pub enum MapPaintError {
    /// Invalid configuration, scene file or argument.
    #[error("validation error: {0}")]
    Validation(String),

    /// The style source failed for one primitive.
    #[error("style resolution error: primitive {primitive}: {message}")]
    Resolve {
        /// Primitive whose styles could not be resolved.
        primitive: PrimitiveId,
        /// Failure description.
        message: String,
    },

    /// Geometry that cannot be processed.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Failure of a drawing context or worker pool.
    #[error("paint error: {0}")]
    Paint(String),

    /// Icon or pattern image could not be loaded.
    #[error("image error: {0}")]
    Image(String),

    /// Unexpected failure during a frame, with the frame's parameters.
    #[error("frame aborted ({context}): {source}")]
    Frame {
        /// Parameters of the aborted frame.
        context: FrameContext,
        /// Underlying failure.
        #[source]
        source: Box<MapPaintError>,
    },

    /// Wrapped foreign error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MapPaintError {
    /// Build a [`MapPaintError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MapPaintError::Resolve`].
    pub fn resolve(primitive: PrimitiveId, msg: impl Into<String>) -> Self {
        Self::Resolve {
            primitive,
            message: msg.into(),
        }
    }

    /// Build a [`MapPaintError::Geometry`].
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`MapPaintError::Paint`].
    pub fn paint(msg: impl Into<String>) -> Self {
        Self::Paint(msg.into())
    }

    /// Build a [`MapPaintError::Image`].
    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    /// Wrap `self` with frame parameters. Already wrapped errors are returned unchanged.
    pub fn in_frame(self, context: FrameContext) -> Self {
        match self {
            Self::Frame { .. } => self,
            other => Self::Frame {
                context,
                source: Box::new(other),
            },
        }
    }
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
