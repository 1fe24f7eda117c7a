//! Matchmaking bookkeeping types.

use crate::id::{GameId, LobbyId, PlayerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One matchmaking attempt recorded into the bounded history ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchmakingEntry {
    /// When the lobby was joined.
    pub timestamp: DateTime<Utc>,
    /// Lobby that was joined.
    pub lobby_id: LobbyId,
    /// The lobby's host player.
    pub host: PlayerId,
    /// Game id that resulted from joining, if known yet.
    pub game_id: Option<GameId>,
}

/// Cap for the matchmaking history ring (spec.md §3).
pub const MATCHMAKING_HISTORY_CAP: usize = 50;

/// Bounded ring of matchmaking attempts plus running counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchmakingHistory {
    /// Most recent attempts, oldest first, capped at
    /// [`MATCHMAKING_HISTORY_CAP`].
    pub entries: Vec<MatchmakingEntry>,
    /// Total lobbies joined over the process lifetime.
    pub lobbies_joined: u64,
    /// Total games started over the process lifetime.
    pub games_started: u64,
    /// Last time a matchmaking scan ran.
    pub last_scan_at: Option<DateTime<Utc>>,
}

impl MatchmakingHistory {
    /// Push a new entry, trimming the oldest if over capacity, and bump
    /// the `lobbies_joined` counter.
    pub fn push(&mut self, entry: MatchmakingEntry) {
        self.entries.push(entry);
        if self.entries.len() > MATCHMAKING_HISTORY_CAP {
            let overflow = self.entries.len() - MATCHMAKING_HISTORY_CAP;
            self.entries.drain(0..overflow);
        }
        self.lobbies_joined += 1;
    }
}
