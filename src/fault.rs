//! Panic payload helpers for the fault-containment boundaries.

use std::any::Any;

/// Extract a readable reason from a caught panic payload.
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        return (*message).to_string();
    }
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(_) => "unknown panic payload".to_string(),
    }
}
