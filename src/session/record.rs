//! Session and user aggregates.

use serde::Serialize;

use crate::feature::vector::PageVector;

/// An emitted session: two or more requests with no gap above the timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub user_id: String,
    pub start_time: i64,
    pub end_time: i64,
    pub request_count: u64,
    /// Popular pages requested during the session.
    pub visited: PageVector,
}

impl SessionRecord {
    /// Seconds between the first and the last request.
    pub fn duration(&self) -> i64 {
        self.end_time - self.start_time
    }

    /// Mean gap between consecutive requests: `duration / (request_count - 1)`.
    pub fn average_request_duration(&self) -> f64 {
        self.duration() as f64 / (self.request_count - 1) as f64
    }
}

/// Aggregates of one user over all of their requests.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user_id: String,

    /// Every request of the user, whether or not its session was emitted.
    pub request_count: u64,

    /// Popular pages requested in any session.
    pub visited: PageVector,

    /// Sessions emitted to the sessions table.
    pub session_count: usize,

    /// Closed sessions dropped for having a single request.
    pub discarded_sessions: usize,

    /// Requests of the last session when it was left open at end of stream.
    pub unflushed_requests: u64,
}

/// Sessionization result for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSessions {
    pub sessions: Vec<SessionRecord>,
    pub profile: UserProfile,
}

/// Sessionization result for a whole corpus.
#[derive(Debug, Clone, Default)]
pub struct SessionizeOutput {
    /// Emitted sessions, grouped by user in first-appearance order.
    pub sessions: Vec<SessionRecord>,

    /// One profile per distinct user, in first-appearance order.
    pub users: Vec<UserProfile>,
}

/// Counters describing a sessionization run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionizeStats {
    pub users: usize,
    pub requests: u64,
    pub sessions: usize,
    pub discarded_sessions: usize,
    pub unflushed_requests: u64,
}

impl SessionizeOutput {
    pub fn push(&mut self, user: UserSessions) {
        self.sessions.extend(user.sessions);
        self.users.push(user.profile);
    }

    pub fn stats(&self) -> SessionizeStats {
        SessionizeStats {
            users: self.users.len(),
            requests: self.users.iter().map(|u| u.request_count).sum(),
            sessions: self.sessions.len(),
            discarded_sessions: self.users.iter().map(|u| u.discarded_sessions).sum(),
            unflushed_requests: self.users.iter().map(|u| u.unflushed_requests).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_and_average() {
        let session = SessionRecord {
            user_id: "u".to_string(),
            start_time: 100,
            end_time: 400,
            request_count: 4,
            visited: PageVector::new(0),
        };
        assert_eq!(session.duration(), 300);
        assert_eq!(session.average_request_duration(), 100.0);
    }
}
