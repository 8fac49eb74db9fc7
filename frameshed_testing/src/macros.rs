//! Assertion macros shared by test helpers and integration tests.

/// Enqueue without blocking and panic with the call site on failure.
#[macro_export]
macro_rules! enqueue_expect {
    ($producer:expr, $item:expr) => {{
        $producer
            .try_enqueue($item)
            .expect(concat!("enqueue failed at ", file!(), ":", line!()))
    }};
}

/// Dequeue without blocking and panic with the call site if empty.
#[macro_export]
macro_rules! dequeue_expect {
    ($queue:expr) => {{
        $queue
            .try_dequeue()
            .expect(concat!("dequeue returned nothing at ", file!(), ":", line!()))
    }};
}

pub use crate::{dequeue_expect, enqueue_expect};
