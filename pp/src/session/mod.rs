//! Session management
//!
//! A session owns one base directory with its catalog, selection and compose
//! request. It is created when a directory is opened and torn down when the
//! directory changes or the program exits.
//!
//! [`SessionHandle`] shares a session between the user-facing shell and the
//! reconcile loop that consumes watcher signals. Every scan, reconcile and
//! compose runs under the handle's mutex, so no two of them overlap.

mod core;
mod error;
mod handle;

pub use self::core::Session;
pub use error::SessionError;
pub use handle::{SessionEvent, SessionHandle};
