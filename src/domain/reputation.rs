//! Vote Reconciler
//!
//! Maintains per-token community reputation tallies under concurrent,
//! possibly duplicate, possibly revised vote submissions. A user has at most
//! one active vote per token; a new direction replaces the prior one rather
//! than accumulating.

use std::collections::HashMap;
use std::str::FromStr;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum VoteError {
    #[error("invalid vote direction '{0}', expected up or down")]
    InvalidDirection(String),
}

/// Direction of a community vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteDirection {
    Up,
    Down,
}

impl FromStr for VoteDirection {
    type Err = VoteError;

    /// Parse the textual directions vote sources deliver. Anything outside
    /// up/down is rejected as `InvalidDirection` without side effects.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "upvote" => Ok(VoteDirection::Up),
            "down" | "downvote" => Ok(VoteDirection::Down),
            other => Err(VoteError::InvalidDirection(other.to_string())),
        }
    }
}

/// A single vote event from a vote source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub user: String,
    pub token: String,
    pub direction: VoteDirection,
}

/// Per-token tally of community votes plus per-user vote state.
///
/// Total votes cast only grows; the net tally can move in either direction
/// as users switch sides. Counts are unsigned and never double-count a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationRecord {
    pub token: String,
    pub upvotes: u64,
    pub downvotes: u64,
    /// Current direction per user, for idempotence and "did this user vote"
    pub voters: HashMap<String, VoteDirection>,
}

impl ReputationRecord {
    /// A zeroed record for a token nobody has voted on yet.
    pub fn empty(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            upvotes: 0,
            downvotes: 0,
            voters: HashMap::new(),
        }
    }

    /// Upvotes minus downvotes.
    pub fn net_tally(&self) -> i64 {
        self.upvotes as i64 - self.downvotes as i64
    }

    /// Total distinct voters.
    pub fn total_voters(&self) -> usize {
        self.voters.len()
    }

    /// The direction a user currently has recorded, if any.
    pub fn user_vote(&self, user: &str) -> Option<VoteDirection> {
        self.voters.get(user).copied()
    }
}

/// Concurrency-safe reconciler of community votes.
///
/// Records live in a sharded keyed map; each submission mutates exactly one
/// token's record under that key's lock, so the read-modify-write is atomic
/// per token and unrelated tokens never contend.
#[derive(Debug, Default)]
pub struct VoteReconciler {
    records: DashMap<String, ReputationRecord>,
}

impl VoteReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a vote and return a snapshot of the resulting record.
    ///
    /// Resubmitting the current direction is a no-op. A changed direction
    /// decrements the old bucket and increments the new one in the same
    /// critical section, so no intermediate state is observable.
    pub fn submit_vote(&self, token: &str, user: &str, direction: VoteDirection) -> ReputationRecord {
        let mut record = self
            .records
            .entry(token.to_string())
            .or_insert_with(|| ReputationRecord::empty(token));

        match record.voters.get(user).copied() {
            Some(previous) if previous == direction => {
                tracing::debug!(%token, %user, ?direction, "duplicate vote ignored");
            }
            Some(previous) => {
                match previous {
                    VoteDirection::Up => record.upvotes -= 1,
                    VoteDirection::Down => record.downvotes -= 1,
                }
                match direction {
                    VoteDirection::Up => record.upvotes += 1,
                    VoteDirection::Down => record.downvotes += 1,
                }
                record.voters.insert(user.to_string(), direction);
                tracing::info!(%token, %user, ?previous, ?direction, "vote switched");
            }
            None => {
                match direction {
                    VoteDirection::Up => record.upvotes += 1,
                    VoteDirection::Down => record.downvotes += 1,
                }
                record.voters.insert(user.to_string(), direction);
                tracing::info!(%token, %user, ?direction, "vote recorded");
            }
        }

        record.clone()
    }

    /// Apply a vote event from a vote source.
    pub fn apply(&self, vote: &Vote) -> ReputationRecord {
        self.submit_vote(&vote.token, &vote.user, vote.direction)
    }

    /// Snapshot of a token's reputation. A token nobody has voted on reads
    /// back as an empty record; that is a normal state, not an error.
    pub fn get_reputation(&self, token: &str) -> ReputationRecord {
        self.records
            .get(token)
            .map(|r| r.clone())
            .unwrap_or_else(|| ReputationRecord::empty(token))
    }

    /// Whether a user has an active vote on a token.
    pub fn has_voted(&self, token: &str, user: &str) -> bool {
        self.records
            .get(token)
            .map(|r| r.voters.contains_key(user))
            .unwrap_or(false)
    }
}
