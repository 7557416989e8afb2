//! Turning detections into alerts: copy, drafts, and push delivery.

pub mod draft;
pub mod notify;
pub mod templates;

pub use draft::fallback_draft;
pub use notify::{deliver, LogNotifier, Notifier, PushPayload};
pub use templates::{compose, push_title, thousands};
