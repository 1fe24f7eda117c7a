//! [`GameApiClient`] — one HTTP round-trip per remote operation, no
//! retry policy of its own (see module docs on `duel-resilience` for
//! that layer).

use crate::error::ClientError;
use crate::types::{
    ActionParams, ChainResponseRequest, DeckEntry, JoinLobbyResponse, LobbyEntry, PendingTurn,
    RawAvailableActionsResponse, SaveDecisionRequest,
};
use duel_types::{AvailableActions, CardId, Decision, DeckId, GameId, GameStateFull, LobbyId};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Default base URL, overridden in production via `Config`/`API_URL`.
const DEFAULT_BASE_URL: &str = "https://api.example-duel-server.invalid";

/// Typed HTTP client for the remote trading-card-game API.
///
/// Every method performs exactly one request and classifies failures
/// into [`ClientError`]. It never retries, backs off, or opens a
/// circuit — that's `duel-resilience::CircuitBreakerRegistry`'s job,
/// wrapped around calls to this client by the polling/turn layers.
///
/// `Clone` is cheap: `reqwest::Client` is an `Arc` handle internally, so
/// cloning is how callers hand a copy to a spawned background task
/// (e.g. best-effort decision persistence).
#[derive(Clone)]
pub struct GameApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GameApiClient {
    /// Create a client with the given API key and the default base URL.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Override the base URL (tests point this at a `wiremock` server).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::from_response(status, &text));
        }
        serde_json::from_str(&text)
            .map_err(|e| ClientError::Transport(format!("invalid JSON response: {e}")))
    }

    // -- Read operations --------------------------------------------------

    /// Fetch the authoritative state of one game.
    pub async fn get_game_state(&self, game_id: &GameId) -> Result<GameStateFull, ClientError> {
        self.get(&format!("/games/{game_id}/state")).await
    }

    /// Fetch the server's currently-legal actions for one game.
    pub async fn get_available_actions(
        &self,
        game_id: &GameId,
    ) -> Result<AvailableActions, ClientError> {
        let raw: RawAvailableActionsResponse =
            self.get(&format!("/games/{game_id}/actions")).await?;
        Ok(raw.into())
    }

    /// Fetch recent game history (used only for textual context; on
    /// failure the caller treats this as an empty list, never fatal).
    pub async fn get_game_history(
        &self,
        game_id: &GameId,
    ) -> Result<Vec<serde_json::Value>, ClientError> {
        self.get(&format!("/games/{game_id}/history")).await
    }

    /// Fetch games where it may currently be this agent's turn.
    pub async fn get_pending_turns(&self) -> Result<Vec<PendingTurn>, ClientError> {
        self.get("/agent/pending-turns").await
    }

    /// Fetch open lobbies. `filter` is typically `"all"`.
    pub async fn get_lobbies(&self, filter: &str) -> Result<Vec<LobbyEntry>, ClientError> {
        self.get(&format!("/lobbies?filter={filter}")).await
    }

    /// List decks available to this agent.
    pub async fn get_decks(&self) -> Result<Vec<DeckEntry>, ClientError> {
        self.get("/agent/decks").await
    }

    /// Fetch this agent's profile (metrics fallback data lives here).
    pub async fn get_agent_profile(&self) -> Result<serde_json::Value, ClientError> {
        self.get("/agent/profile").await
    }

    // -- Matchmaking / lifecycle -------------------------------------------

    /// Join a lobby with the given deck.
    pub async fn join_lobby(
        &self,
        lobby_id: &LobbyId,
        deck_id: &DeckId,
    ) -> Result<JoinLobbyResponse, ClientError> {
        self.post(
            &format!("/lobbies/{lobby_id}/join"),
            &serde_json::json!({ "deck_id": deck_id.as_str() }),
        )
        .await
    }

    /// Surrender an active game.
    pub async fn surrender(&self, game_id: &GameId) -> Result<serde_json::Value, ClientError> {
        self.post(&format!("/games/{game_id}/surrender"), &serde_json::json!({}))
            .await
    }

    // -- Turn actions -------------------------------------------------------

    /// Summon a monster.
    pub async fn summon(
        &self,
        game_id: &GameId,
        params: &ActionParams,
    ) -> Result<serde_json::Value, ClientError> {
        self.post(&format!("/games/{game_id}/actions/summon"), params).await
    }

    /// Set a monster face-down.
    pub async fn set_card(
        &self,
        game_id: &GameId,
        params: &ActionParams,
    ) -> Result<serde_json::Value, ClientError> {
        self.post(&format!("/games/{game_id}/actions/set-card"), params)
            .await
    }

    /// Set a spell/trap face-down. Distinct endpoint from monster sets.
    pub async fn set_spell_trap(
        &self,
        game_id: &GameId,
        params: &ActionParams,
    ) -> Result<serde_json::Value, ClientError> {
        self.post(&format!("/games/{game_id}/actions/set-spell-trap"), params)
            .await
    }

    /// Activate a spell.
    pub async fn activate_spell(
        &self,
        game_id: &GameId,
        params: &ActionParams,
    ) -> Result<serde_json::Value, ClientError> {
        self.post(&format!("/games/{game_id}/actions/activate-spell"), params)
            .await
    }

    /// Declare an attack.
    pub async fn attack(
        &self,
        game_id: &GameId,
        params: &ActionParams,
    ) -> Result<serde_json::Value, ClientError> {
        self.post(&format!("/games/{game_id}/actions/attack"), params).await
    }

    /// Change a monster's battle position.
    pub async fn change_position(
        &self,
        game_id: &GameId,
        params: &ActionParams,
    ) -> Result<serde_json::Value, ClientError> {
        self.post(&format!("/games/{game_id}/actions/change-position"), params)
            .await
    }

    /// Flip-summon a face-down monster.
    pub async fn flip_summon(
        &self,
        game_id: &GameId,
        params: &ActionParams,
    ) -> Result<serde_json::Value, ClientError> {
        self.post(&format!("/games/{game_id}/actions/flip-summon"), params)
            .await
    }

    /// Advance to the battle phase.
    pub async fn enter_battle_phase(
        &self,
        game_id: &GameId,
    ) -> Result<serde_json::Value, ClientError> {
        self.post(
            &format!("/games/{game_id}/actions/enter-battle-phase"),
            &serde_json::json!({}),
        )
        .await
    }

    /// Advance to the second main phase.
    pub async fn enter_main_phase_2(
        &self,
        game_id: &GameId,
    ) -> Result<serde_json::Value, ClientError> {
        self.post(
            &format!("/games/{game_id}/actions/enter-main-phase-2"),
            &serde_json::json!({}),
        )
        .await
    }

    /// End the current turn.
    pub async fn end_turn(&self, game_id: &GameId) -> Result<serde_json::Value, ClientError> {
        self.post(
            &format!("/games/{game_id}/actions/end-turn"),
            &serde_json::json!({}),
        )
        .await
    }

    /// Respond to (or pass on) an open chain.
    pub async fn chain_response(
        &self,
        game_id: &GameId,
        pass: bool,
        card_id: Option<CardId>,
    ) -> Result<serde_json::Value, ClientError> {
        let body = ChainResponseRequest { pass, card_id };
        self.post(&format!("/games/{game_id}/chain-response"), &body)
            .await
    }

    // -- Side channels --------------------------------------------------

    /// Emit a best-effort telemetry event about this agent.
    pub async fn emit_agent_event(
        &self,
        event: &serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        self.post("/agent/events", event).await
    }

    /// Persist one decision record (fire-and-forget from the caller's
    /// point of view).
    pub async fn save_decision(
        &self,
        game_id: &GameId,
        decision: &Decision,
    ) -> Result<serde_json::Value, ClientError> {
        let body = SaveDecisionRequest { game_id, decision };
        self.post("/agent/decisions", &body).await
    }

    /// Mark a story-mode stage complete (best-effort fallback path).
    pub async fn complete_story_stage(
        &self,
        stage_id: &str,
    ) -> Result<serde_json::Value, ClientError> {
        self.post(
            "/story/complete-stage",
            &serde_json::json!({ "stage_id": stage_id }),
        )
        .await
    }

    /// Request a quick-play story game at the given difficulty.
    pub async fn quick_play_story(
        &self,
        difficulty: &str,
    ) -> Result<serde_json::Value, ClientError> {
        self.post(
            "/story/quick-play",
            &serde_json::json!({ "difficulty": difficulty }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_types::PlayerId;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GameApiClient {
        GameApiClient::new("test-key").base_url(server.uri())
    }

    #[tokio::test]
    async fn get_game_state_parses_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/games/G1/state"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "game_id": "G1",
                "status": "in_progress",
                "phase": "main1",
                "turn_number": 1,
                "current_turn": "me",
                "my_player_id": "me",
                "my_life_points": 8000,
                "opponent_life_points": 8000,
                "available_actions": { "actions": [] }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let state = client.get_game_state(&GameId::new("G1")).await.unwrap();
        assert_eq!(state.my_player_id, PlayerId::new("me"));
        assert!(state.is_my_turn());
    }

    #[tokio::test]
    async fn get_game_state_not_found_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/games/G1/state"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"error": "game_not_found"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get_game_state(&GameId::new("G1")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn auth_error_on_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/agent/pending-turns"))
            .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get_pending_turns().await.unwrap_err();
        assert!(matches!(err, ClientError::Auth(_)));
    }

    #[tokio::test]
    async fn join_lobby_posts_deck_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lobbies/L1/join"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"game_id": "G9"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let resp = client
            .join_lobby(&LobbyId::new("L1"), &DeckId::new("D1"))
            .await
            .unwrap();
        assert_eq!(resp.game_id, GameId::new("G9"));
    }

    #[tokio::test]
    async fn end_turn_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/games/G1/actions/end-turn"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let resp = client.end_turn(&GameId::new("G1")).await.unwrap();
        assert_eq!(resp, serde_json::json!({"ok": true}));
    }
}
