//! Renderers that record their calls instead of drawing anything.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use frameshed::{Frame, FrameRenderer, ProducerHandle, QueueItem, RenderError};

/// Records the sequence id of every rendered item.
///
/// Clones share the same log, so a test can keep one copy while the consumer
/// thread owns another.
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderer {
    rendered: Arc<Mutex<Vec<Option<u64>>>>,
    delay: Duration,
}

impl RecordingRenderer {
    /// Sleep for `delay` on every render to simulate decode cost.
    #[must_use]
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// Sequence ids rendered so far, in call order.
    ///
    /// # Panics
    ///
    /// Panics if a render call panicked while holding the log.
    pub fn rendered(&self) -> Vec<Option<u64>> { self.rendered.lock().expect("render log poisoned").clone() }
}

impl<T: Frame> FrameRenderer<T> for RecordingRenderer {
    fn render(&mut self, item: &T, _payload: &[u8]) -> Result<(), RenderError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.rendered
            .lock()
            .expect("render log poisoned")
            .push(item.sequence_id());
        Ok(())
    }
}

/// Fails every render with a decode error and counts the attempts.
#[derive(Debug, Default)]
pub struct FailingRenderer {
    pub attempts: usize,
}

impl<T: Frame> FrameRenderer<T> for FailingRenderer {
    fn render(&mut self, _item: &T, _payload: &[u8]) -> Result<(), RenderError> {
        self.attempts += 1;
        Err(RenderError::Decode("corrupt image".to_owned()))
    }
}

/// An item with sequence id `seq` and a small image payload.
pub fn image_item(seq: u64) -> QueueItem { QueueItem::new(seq).with_image(vec![0xFF, 0xD8, 0xFF]) }

/// Enqueue `count` image items numbered from `first`.
///
/// # Panics
///
/// Panics if the queue cannot take every item.
pub fn preload(producer: &ProducerHandle<QueueItem>, first: u64, count: u64) {
    for seq in first..first + count {
        producer
            .try_enqueue(image_item(seq))
            .expect("preload exceeded queue capacity");
    }
}
