//! Per-user session state machine.

use std::sync::Arc;

use ahash::AHashMap;
use log::{debug, info};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::access_log::RequestEvent;
use crate::config::{DEFAULT_SESSION_TIMEOUT_SECS, MiningConfig};
use crate::error::{MinerError, Result};
use crate::feature::vector::PageVector;
use crate::popularity::PopularitySchema;
use crate::session::record::{SessionRecord, SessionizeOutput, UserProfile, UserSessions};

/// The session currently being accumulated for one user.
struct SessionWindow {
    start: i64,
    end: i64,
    count: u64,
    visited: PageVector,
}

impl SessionWindow {
    fn open(at: i64, schema: &PopularitySchema) -> Self {
        SessionWindow {
            start: at,
            end: at,
            count: 0,
            visited: schema.empty_vector(),
        }
    }

    /// Close the window and reopen it at `next_start`, reusing the page vector.
    /// Returns the closed session when it had more than one request.
    fn roll(&mut self, user_id: &str, next_start: i64) -> Option<SessionRecord> {
        let closed = self.close(user_id);
        self.start = next_start;
        self.end = next_start;
        self.count = 0;
        self.visited.clear();
        closed
    }

    fn close(&self, user_id: &str) -> Option<SessionRecord> {
        if self.count <= 1 {
            return None;
        }
        Some(SessionRecord {
            user_id: user_id.to_string(),
            start_time: self.start,
            end_time: self.end,
            request_count: self.count,
            visited: self.visited.clone(),
        })
    }
}

/// Splits each user's requests into sessions and builds user profiles.
#[derive(Debug, Clone)]
pub struct Sessionizer {
    schema: Arc<PopularitySchema>,
    timeout: i64,
    flush_trailing: bool,
}

impl Sessionizer {
    /// Create a sessionizer with the given inactivity timeout in seconds.
    pub fn new(schema: Arc<PopularitySchema>, timeout_secs: i64) -> Self {
        Sessionizer {
            schema,
            timeout: timeout_secs,
            flush_trailing: false,
        }
    }

    /// Create a sessionizer from the timeout and flush settings of `config`.
    pub fn from_config(schema: Arc<PopularitySchema>, config: &MiningConfig) -> Self {
        Self::new(schema, config.session_timeout_secs)
            .with_flush_trailing(config.flush_trailing_session)
    }

    /// Emit each user's last open session at end of stream.
    pub fn with_flush_trailing(mut self, flush: bool) -> Self {
        self.flush_trailing = flush;
        self
    }

    pub fn schema(&self) -> &Arc<PopularitySchema> {
        &self.schema
    }

    pub fn timeout(&self) -> i64 {
        self.timeout
    }

    /// Sessionize the requests of a single user.
    ///
    /// Events are sorted by timestamp first; equal timestamps keep input order.
    pub fn sessionize_user(&self, user_id: &str, events: &[RequestEvent]) -> Result<UserSessions> {
        self.run_user(user_id, events.iter().collect())
    }

    /// Sessionize a corpus user by user, sequentially.
    pub fn sessionize(&self, events: &[RequestEvent]) -> Result<SessionizeOutput> {
        let mut output = SessionizeOutput::default();
        for (user_id, user_events) in group_by_user(events) {
            output.push(self.run_user(user_id, user_events)?);
        }
        self.log_summary(&output);
        Ok(output)
    }

    /// Sessionize a corpus with users fanned out over a rayon thread pool.
    ///
    /// The result is identical to [`Sessionizer::sessionize`].
    pub fn sessionize_parallel(
        &self,
        events: &[RequestEvent],
        threads: Option<usize>,
    ) -> Result<SessionizeOutput> {
        let thread_pool_size = threads.unwrap_or_else(num_cpus::get);
        let pool = ThreadPoolBuilder::new()
            .num_threads(thread_pool_size)
            .thread_name(|i| format!("sessionizer-{i}"))
            .build()
            .map_err(|e| MinerError::internal(format!("Failed to create thread pool: {e}")))?;

        let groups = group_by_user(events);
        debug!(
            "Sessionizing {} users on {} threads",
            groups.len(),
            thread_pool_size
        );

        let per_user = pool.install(|| {
            groups
                .into_par_iter()
                .map(|(user_id, user_events)| self.run_user(user_id, user_events))
                .collect::<Result<Vec<_>>>()
        })?;

        let mut output = SessionizeOutput::default();
        for user in per_user {
            output.push(user);
        }
        self.log_summary(&output);
        Ok(output)
    }

    fn run_user(&self, user_id: &str, mut events: Vec<&RequestEvent>) -> Result<UserSessions> {
        events.sort_by_key(|e| e.timestamp);

        let mut sessions = Vec::new();
        let mut visited = self.schema.empty_vector();
        let mut request_count = 0u64;
        let mut discarded_sessions = 0usize;
        let mut unflushed_requests = 0u64;

        if let Some(first) = events.first() {
            let mut window = SessionWindow::open(first.timestamp, &self.schema);

            for event in &events {
                if event.timestamp.saturating_sub(window.end) > self.timeout {
                    match window.roll(user_id, event.timestamp) {
                        Some(session) => sessions.push(session),
                        None => discarded_sessions += 1,
                    }
                }

                if let Some(position) = self.schema.position(&event.url) {
                    window.visited.set(position, true)?;
                    visited.set(position, true)?;
                }
                window.count += 1;
                request_count += 1;
                window.end = event.timestamp;
            }

            if self.flush_trailing {
                match window.close(user_id) {
                    Some(session) => sessions.push(session),
                    None => discarded_sessions += 1,
                }
            } else {
                unflushed_requests = window.count;
            }
        }

        let profile = UserProfile {
            user_id: user_id.to_string(),
            request_count,
            visited,
            session_count: sessions.len(),
            discarded_sessions,
            unflushed_requests,
        };
        Ok(UserSessions { sessions, profile })
    }

    fn log_summary(&self, output: &SessionizeOutput) {
        let stats = output.stats();
        info!(
            "Sessionized {} requests of {} users: {} sessions emitted, {} discarded, {} requests left in open sessions",
            stats.requests,
            stats.users,
            stats.sessions,
            stats.discarded_sessions,
            stats.unflushed_requests
        );
    }
}

impl Default for Sessionizer {
    fn default() -> Self {
        Self::new(
            Arc::new(PopularitySchema::default()),
            DEFAULT_SESSION_TIMEOUT_SECS,
        )
    }
}

/// Group events by user, users in order of first appearance.
fn group_by_user(events: &[RequestEvent]) -> Vec<(&str, Vec<&RequestEvent>)> {
    let mut slots: AHashMap<&str, usize> = AHashMap::new();
    let mut groups: Vec<(&str, Vec<&RequestEvent>)> = Vec::new();

    for event in events {
        let user_id = event.user_id.as_str();
        match slots.get(user_id) {
            Some(&slot) => groups[slot].1.push(event),
            None => {
                slots.insert(user_id, groups.len());
                groups.push((user_id, vec![event]));
            }
        }
    }
    groups
}
