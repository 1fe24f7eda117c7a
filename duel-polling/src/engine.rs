//! Three adaptive polling loops (game, discovery, matchmaking) wired to
//! a single game's worth of shared mutable state (spec.md §4.4).

use crate::config::PollingConfig;
use duel_client::{ClientError, GameApiClient};
use duel_events::{derive_events, Event};
use duel_resilience::{AdaptiveScheduler, CircuitBreakerRegistry};
use duel_turn::TurnDriver;
use duel_types::{DeckId, GameId, GameSnapshot, GameStateFull, GameStatus, MatchmakingEntry, MatchmakingHistory};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// The engine's externally-visible flags (spec.md §4.8's
/// `get_agent_status`).
#[derive(Debug, Clone)]
pub struct PollingStatus {
    /// Whether the game loop currently has an active game.
    pub is_polling_game: bool,
    /// Game currently being polled, if any.
    pub current_game_id: Option<GameId>,
    /// Whether the discovery loop is still running.
    pub discovery_running: bool,
    /// Whether the matchmaking loop is still running.
    pub matchmaking_running: bool,
}

/// Owns the three adaptive schedulers and the per-game state they poll
/// against. Depends on a [`TurnDriver`] trait object rather than
/// `duel-turn`'s concrete orchestrator type so this crate never cycles
/// back through it.
pub struct PollingEngine {
    client: GameApiClient,
    breakers: Arc<CircuitBreakerRegistry>,
    turn_driver: Arc<dyn TurnDriver>,
    config: PollingConfig,
    current_game_id: Mutex<Option<GameId>>,
    current_stage_id: Mutex<Option<String>>,
    current_streaming_session_id: Mutex<Option<String>>,
    last_snapshot: Mutex<Option<GameSnapshot>>,
    last_known_state: Mutex<Option<GameStateFull>>,
    deck_cache: Mutex<Option<DeckId>>,
    matchmaking_history: Mutex<MatchmakingHistory>,
    game_scheduler: Mutex<Option<Arc<AdaptiveScheduler>>>,
    discovery_scheduler: Arc<AdaptiveScheduler>,
    matchmaking_scheduler: Arc<AdaptiveScheduler>,
    is_polling_game: AtomicBool,
}

impl PollingEngine {
    /// Build the engine. The discovery and matchmaking schedulers exist
    /// immediately but don't tick until [`PollingEngine::start_background_loops`].
    pub fn new(
        client: GameApiClient,
        breakers: Arc<CircuitBreakerRegistry>,
        turn_driver: Arc<dyn TurnDriver>,
        config: PollingConfig,
    ) -> Arc<Self> {
        let discovery_scheduler = Arc::new(AdaptiveScheduler::new(
            config.scheduler_config(config.discovery_interval),
        ));
        let matchmaking_scheduler = Arc::new(AdaptiveScheduler::new(
            config.scheduler_config(config.matchmaking_interval),
        ));
        Arc::new(Self {
            client,
            breakers,
            turn_driver,
            config,
            current_game_id: Mutex::new(None),
            current_stage_id: Mutex::new(None),
            current_streaming_session_id: Mutex::new(None),
            last_snapshot: Mutex::new(None),
            last_known_state: Mutex::new(None),
            deck_cache: Mutex::new(None),
            matchmaking_history: Mutex::new(MatchmakingHistory::default()),
            game_scheduler: Mutex::new(None),
            discovery_scheduler,
            matchmaking_scheduler,
            is_polling_game: AtomicBool::new(false),
        })
    }

    /// Start the discovery loop, and the matchmaking loop if
    /// `auto_matchmaking` is configured. Call once at startup.
    pub fn start_background_loops(self: &Arc<Self>) {
        let engine = Arc::clone(self);
        self.discovery_scheduler.spawn(move || {
            let engine = Arc::clone(&engine);
            async move { engine.tick_discovery().await }
        });

        if self.config.auto_matchmaking {
            let engine = Arc::clone(self);
            self.matchmaking_scheduler.spawn(move || {
                let engine = Arc::clone(&engine);
                async move { engine.tick_matchmaking().await }
            });
        }
    }

    /// Start polling a game. Idempotent when already polling `game_id`;
    /// otherwise stops the current game loop first, then does one
    /// immediate poll before handing off to the adaptive schedule.
    pub async fn start_polling_game(
        self: &Arc<Self>,
        game_id: GameId,
        stage_id: Option<String>,
        streaming_session_id: Option<String>,
    ) {
        if self.current_game_id.lock().await.as_ref() == Some(&game_id) {
            return;
        }
        self.stop_polling().await;

        *self.current_game_id.lock().await = Some(game_id.clone());
        *self.current_stage_id.lock().await = stage_id;
        *self.current_streaming_session_id.lock().await = streaming_session_id;
        self.is_polling_game.store(true, Ordering::Relaxed);

        let scheduler = Arc::new(AdaptiveScheduler::new(
            self.config.scheduler_config(self.config.poll_interval),
        ));
        *self.game_scheduler.lock().await = Some(Arc::clone(&scheduler));

        let engine = Arc::clone(self);
        scheduler.spawn(move || {
            let engine = Arc::clone(&engine);
            async move { engine.tick_game_poll().await }
        });
    }

    /// Stop the game loop cooperatively and clear its state, breaker,
    /// and retry delay. Idempotent.
    pub async fn stop_polling(&self) {
        let game_id = self.current_game_id.lock().await.take();
        self.current_stage_id.lock().await.take();
        self.current_streaming_session_id.lock().await.take();
        *self.last_snapshot.lock().await = None;
        *self.last_known_state.lock().await = None;
        self.is_polling_game.store(false, Ordering::Relaxed);

        if let Some(scheduler) = self.game_scheduler.lock().await.take() {
            scheduler.stop();
        }
        if let Some(game_id) = game_id {
            self.breakers.clear(&poll_op_name(&game_id)).await;
        }
    }

    /// Stop every loop, clear the game breaker, and drop the
    /// matchmaking history. Does not touch the discovery/matchmaking
    /// breaker entries — the registry-wide clear is the caller's
    /// (lifecycle shutdown's) responsibility.
    pub async fn shutdown(&self) {
        self.discovery_scheduler.stop();
        self.matchmaking_scheduler.stop();
        self.stop_polling().await;
        *self.matchmaking_history.lock().await = MatchmakingHistory::default();
    }

    /// Current externally-visible flags.
    pub async fn status(&self) -> PollingStatus {
        PollingStatus {
            is_polling_game: self.is_polling_game.load(Ordering::Relaxed),
            current_game_id: self.current_game_id.lock().await.clone(),
            discovery_running: self.discovery_scheduler.is_running(),
            matchmaking_running: self.matchmaking_scheduler.is_running(),
        }
    }

    /// The last state fetched by the game loop, if any.
    pub async fn last_known_state(&self) -> Option<GameStateFull> {
        self.last_known_state.lock().await.clone()
    }

    /// A snapshot of the matchmaking history: recent joins plus running
    /// counters.
    pub async fn matchmaking_history(&self) -> MatchmakingHistory {
        self.matchmaking_history.lock().await.clone()
    }

    /// The underlying API client, for collaborators that need direct
    /// read access (the state aggregator's cache-miss path).
    pub fn client(&self) -> &GameApiClient {
        &self.client
    }

    async fn tick_game_poll(self: Arc<Self>) {
        let Some(game_id) = self.current_game_id.lock().await.clone() else {
            return;
        };
        let op_name = poll_op_name(&game_id);

        let not_found = AtomicBool::new(false);
        let state = self
            .breakers
            .execute_with_recovery(
                &op_name,
                true,
                Some(|err: &ClientError| not_found.store(err.is_not_found(), Ordering::Relaxed)),
                || self.client.get_game_state(&game_id),
            )
            .await;

        if not_found.load(Ordering::Relaxed) {
            tracing::info!(game_id = %game_id, "game no longer found, treating as ended");
            if let Some(last_state) = self.last_known_state.lock().await.clone() {
                self.handle_game_end(&last_state).await;
            }
            self.stop_polling().await;
            return;
        }

        let Some(state) = state else { return };

        // The game may have been stopped (e.g. by a concurrent
        // shutdown) while this poll was in flight.
        if self.current_game_id.lock().await.as_ref() != Some(&game_id) {
            return;
        }

        let curr = state.to_snapshot();
        let prev = self.last_snapshot.lock().await.clone();
        let events = derive_events(prev.as_ref(), &curr, &state);

        *self.last_snapshot.lock().await = Some(curr.clone());
        *self.last_known_state.lock().await = Some(state.clone());

        if !events.is_empty() {
            self.game_scheduler_record_activity().await;
        }
        for event in &events {
            self.dispatch_event(event).await;
        }

        if curr.status == GameStatus::Completed {
            self.handle_game_end(&state).await;
            self.stop_polling().await;
        }
    }

    async fn game_scheduler_record_activity(&self) {
        if let Some(scheduler) = self.game_scheduler.lock().await.as_ref() {
            scheduler.record_activity().await;
        }
    }

    async fn dispatch_event(self: &Arc<Self>, event: &Event) {
        tracing::debug!(?event, "derived event");
        match event {
            Event::TurnStarted { game_id, .. } => {
                let driver = Arc::clone(&self.turn_driver);
                let game_id = game_id.clone();
                tokio::spawn(async move {
                    if let Err(err) = driver.run_turn(&game_id).await {
                        tracing::warn!(error = %err, game_id = %game_id, "turn orchestration failed");
                    }
                });
            }
            Event::ChainWaiting { game_id, .. } => {
                let driver = Arc::clone(&self.turn_driver);
                let game_id = game_id.clone();
                tokio::spawn(async move {
                    if let Err(err) = driver.respond_to_chain(&game_id).await {
                        tracing::warn!(error = %err, game_id = %game_id, "chain response failed");
                    }
                });
            }
            Event::GameStarted { .. } | Event::PhaseChanged { .. } | Event::OpponentAction { .. } | Event::GameEnded { .. } => {}
        }
    }

    async fn handle_game_end(self: &Arc<Self>, state: &GameStateFull) {
        let winner = state.infer_winner();
        tracing::info!(game_id = %state.game_id, winner = ?winner, "game ended");

        if let Some(session_id) = self.current_streaming_session_id.lock().await.take() {
            let client = self.client.clone();
            let payload = serde_json::json!({
                "event_type": "match_result",
                "game_id": state.game_id,
                "streaming_session_id": session_id,
                "winner": winner,
            });
            tokio::spawn(async move {
                if let Err(err) = client.emit_agent_event(&payload).await {
                    tracing::debug!(error = %err, "best-effort streaming session notice failed");
                }
            });
        }

        let Some(stage_id) = self.current_stage_id.lock().await.clone() else {
            return;
        };
        if !self.config.auto_continue_story_mode {
            return;
        }

        let client = self.client.clone();
        if let Err(err) = client.complete_story_stage(&stage_id).await {
            tracing::debug!(error = %err, "best-effort story stage completion failed");
            return;
        }

        let engine = Arc::clone(self);
        let difficulty = self.config.story_difficulty.clone();
        let delay = self.config.story_requeue_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match engine.client.quick_play_story(&difficulty).await {
                Ok(value) => {
                    if let Some(game_id) = value.get("game_id").and_then(|v| v.as_str()) {
                        engine.start_polling_game(GameId::new(game_id), None, None).await;
                    }
                }
                Err(err) => tracing::debug!(error = %err, "best-effort story requeue failed"),
            }
        });
    }

    async fn tick_discovery(self: Arc<Self>) {
        let pending = self
            .breakers
            .execute_with_recovery("discovery_pending_turns", false, None::<fn(&ClientError)>, || {
                self.client.get_pending_turns()
            })
            .await;
        let Some(pending) = pending else { return };
        if pending.is_empty() {
            return;
        }

        let current = self.current_game_id.lock().await.clone();
        let candidate = pending.into_iter().find(|p| Some(&p.game_id) != current.as_ref());
        if let Some(candidate) = candidate {
            self.start_polling_game(candidate.game_id, None, None).await;
            self.discovery_scheduler.record_activity().await;
        }
    }

    async fn tick_matchmaking(self: Arc<Self>) {
        if self.current_game_id.lock().await.is_some() {
            return;
        }
        self.matchmaking_history.lock().await.last_scan_at = Some(chrono::Utc::now());

        let lobbies = self
            .breakers
            .execute_with_recovery("matchmaking_lobbies", false, None::<fn(&ClientError)>, || {
                self.client.get_lobbies("all")
            })
            .await;
        let Some(lobbies) = lobbies else { return };
        let Some(lobby) = lobbies.into_iter().next() else { return };

        let Some(deck_id) = self.resolve_deck_id().await else {
            tracing::warn!("matchmaking: no deck available to join with");
            return;
        };

        let join_op = format!("join_lobby_{}", lobby.lobby_id);
        let joined = self
            .breakers
            .execute_with_recovery(&join_op, false, None::<fn(&ClientError)>, || {
                self.client.join_lobby(&lobby.lobby_id, &deck_id)
            })
            .await;

        if let Some(response) = joined {
            let mut history = self.matchmaking_history.lock().await;
            history.push(MatchmakingEntry {
                timestamp: chrono::Utc::now(),
                lobby_id: lobby.lobby_id,
                host: lobby.host,
                game_id: Some(response.game_id),
            });
            history.games_started += 1;
            drop(history);
            self.matchmaking_scheduler.record_activity().await;
            // Discovery picks up the new game on its next tick; we
            // never start polling it directly from here.
        }
    }

    async fn resolve_deck_id(&self) -> Option<DeckId> {
        if let Some(deck_id) = self.deck_cache.lock().await.clone() {
            return Some(deck_id);
        }
        let decks = self
            .breakers
            .execute_with_recovery("matchmaking_decks", false, None::<fn(&ClientError)>, || self.client.get_decks())
            .await?;

        let chosen = self
            .config
            .preferred_deck_id
            .clone()
            .filter(|preferred| decks.iter().any(|d| &d.deck_id == preferred))
            .or_else(|| decks.into_iter().next().map(|d| d.deck_id));

        if let Some(deck_id) = &chosen {
            *self.deck_cache.lock().await = Some(deck_id.clone());
        }
        chosen
    }
}

fn poll_op_name(game_id: &GameId) -> String {
    format!("poll_game_{game_id}")
}
