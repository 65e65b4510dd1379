//! Errors that may occur while capturing the pointer or driving the frame loop

use derive_more::{Display, Error};

/// The platform refused or failed to grant exclusive relative-pointer input
///
/// Only [`CaptureError::Unsupported`] is recovered locally,
/// by retrying the request without the optional capture features.
/// Every other variant leaves the [`MouseLookTracker`](crate::mouse_look::MouseLookTracker) uncaptured.
#[derive(Debug, Clone, PartialEq, Eq, Error, Display)]
pub enum CaptureError {
    /// The platform does not support one of the requested [`CaptureOptions`](crate::mouse_look::CaptureOptions)
    #[display(fmt = "the requested pointer capture options are not supported")]
    Unsupported,
    /// The platform rejected the request outright
    #[display(fmt = "pointer capture was rejected: {}", reason)]
    Rejected {
        /// A human-readable explanation provided by the platform
        #[error(not(source))]
        reason: String,
    },
    /// The platform reported a capture failure without further detail
    #[display(fmt = "unknown pointer capture error")]
    Unknown,
}

/// The [`FrameLoop`](crate::frame_loop::FrameLoop) was configured with an unusable target rate
#[derive(Debug, Clone, Copy, PartialEq, Error, Display)]
pub enum FrameLoopError {
    /// The target frame rate was zero, negative or not finite
    #[display(fmt = "invalid target frame rate: {}", fps)]
    InvalidFrameRate {
        /// The rejected frames-per-second value
        #[error(not(source))]
        fps: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_errors_describe_themselves() {
        let rejected = CaptureError::Rejected {
            reason: "document is not focused".to_string(),
        };
        assert_eq!(
            rejected.to_string(),
            "pointer capture was rejected: document is not focused"
        );
        assert_eq!(
            FrameLoopError::InvalidFrameRate { fps: 0.0 }.to_string(),
            "invalid target frame rate: 0"
        );
    }
}
