//! Seam between the consumer loop and the decode/render collaborator.
//!
//! The consumer never decodes anything itself. Items that survive the
//! shedding check are handed to a [`FrameRenderer`], which may decode, convert
//! and display the payload however it likes.

use thiserror::Error;

/// Errors reported by a [`FrameRenderer`].
///
/// None of these stop the consumer loop; the item is logged and skipped.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RenderError {
    /// The payload could not be decoded into an image.
    #[error("failed to decode frame: {0}")]
    Decode(String),
    /// Decoding worked but displaying or storing the image failed.
    #[error("failed to present frame: {0}")]
    Present(String),
}

/// Decode and present a frame that passed the shedding check.
///
/// Runs on the consumer thread with the queue lock released.
pub trait FrameRenderer<T> {
    /// Render `item`, whose payload is `payload`.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] when the payload cannot be decoded or shown.
    fn render(&mut self, item: &T, payload: &[u8]) -> Result<(), RenderError>;
}

impl<T, F> FrameRenderer<T> for F
where
    F: FnMut(&T, &[u8]) -> Result<(), RenderError>,
{
    fn render(&mut self, item: &T, payload: &[u8]) -> Result<(), RenderError> { self(item, payload) }
}
