//! Session reconstruction.
//!
//! Each user's requests are walked in time order by the [`Sessionizer`]; a gap
//! longer than the inactivity timeout closes the current session. Closed
//! sessions with more than one request become [`SessionRecord`]s, and every
//! user gets exactly one [`UserProfile`].

pub mod record;
pub mod sessionizer;

pub use self::record::{SessionRecord, SessionizeOutput, SessionizeStats, UserProfile, UserSessions};
pub use self::sessionizer::Sessionizer;
