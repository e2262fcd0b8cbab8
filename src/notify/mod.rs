//! Notification assembly and delivery.

pub mod compose;
pub mod digest;
pub mod dispatch;

pub use compose::Composer;
pub use digest::{DigestItem, Notifications, RecipientDigest};
pub use dispatch::{Dispatcher, LogDispatcher, Notification, SmtpDispatcher};
