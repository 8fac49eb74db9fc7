//! The unit of work carried through a [`FrameQueue`](crate::queue::FrameQueue).
//!
//! A [`QueueItem`] is built once by ingestion code and then moved, never
//! shared: producer to queue to consumer.

use bytes::Bytes;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::queue::Frame;

/// Errors raised when turning a broker payload into a [`QueueItem`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ItemError {
    /// The payload was not a JSON object with the expected field types.
    #[error("malformed message payload: {0}")]
    Json(#[from] serde_json::Error),
}

// Field names follow the metadata messages published by the pipeline.
#[derive(Deserialize)]
struct WireMessage {
    // Any JSON value: only non-negative integers become a sequence id.
    #[serde(rename = "seqId", default)]
    seq_id: Option<Value>,
    #[serde(rename = "frameData", default)]
    frame_data: Option<String>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

/// A parsed broker message waiting to be rendered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueueItem {
    sequence_id: Option<u64>,
    encoded_image: Option<Bytes>,
    fields: Map<String, Value>,
}

impl QueueItem {
    /// Create an item with a sequence id and no payload.
    #[must_use]
    pub fn new(sequence_id: u64) -> Self {
        Self {
            sequence_id: Some(sequence_id),
            ..Self::default()
        }
    }

    /// Attach an encoded image payload.
    #[must_use]
    pub fn with_image(mut self, encoded: impl Into<Bytes>) -> Self {
        self.encoded_image = Some(encoded.into());
        self
    }

    /// Attach an extra message field that is carried through untouched.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Parse a JSON broker payload.
    ///
    /// `seqId` becomes the sequence id and `frameData` the encoded image,
    /// kept exactly as transmitted. An empty `frameData` counts as absent.
    /// A `seqId` that is not a non-negative integer leaves the item without
    /// a sequence id. Every other field lands in [`Self::fields`].
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::Json`] if the payload is not a JSON object or
    /// `frameData` is not a string.
    ///
    /// # Examples
    ///
    /// ```
    /// use frameshed::{item::QueueItem, queue::Frame};
    ///
    /// let item = QueueItem::from_json(br#"{"seqId": 3, "frameData": "AAEC", "streamId": 1}"#)
    ///     .expect("payload should parse");
    /// assert_eq!(item.sequence_id(), Some(3));
    /// assert_eq!(item.payload(), Some(&b"AAEC"[..]));
    /// assert_eq!(item.fields()["streamId"], 1);
    /// ```
    pub fn from_json(payload: &[u8]) -> Result<Self, ItemError> {
        let WireMessage {
            seq_id,
            frame_data,
            fields,
        } = serde_json::from_slice(payload)?;
        Ok(Self {
            sequence_id: seq_id.as_ref().and_then(Value::as_u64),
            encoded_image: frame_data
                .filter(|data| !data.is_empty())
                .map(|data| Bytes::from(data.into_bytes())),
            fields,
        })
    }

    /// Additional message fields, passed through unchanged.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> { &self.fields }
}

impl Frame for QueueItem {
    fn sequence_id(&self) -> Option<u64> { self.sequence_id }

    fn payload(&self) -> Option<&[u8]> { self.encoded_image.as_deref() }
}
