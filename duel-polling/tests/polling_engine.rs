use async_trait::async_trait;
use duel_client::GameApiClient;
use duel_polling::{PollingConfig, PollingEngine};
use duel_resilience::{BreakerConfig, CircuitBreakerRegistry};
use duel_turn::{TurnDriver, TurnError, TurnOutcome};
use duel_types::{Decision, GameId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records how many times each orchestrator hook fired; never touches
/// the network itself.
struct CountingDriver {
    run_turn_calls: AtomicUsize,
    chain_calls: AtomicUsize,
}

impl CountingDriver {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            run_turn_calls: AtomicUsize::new(0),
            chain_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TurnDriver for CountingDriver {
    async fn run_turn(&self, _game_id: &GameId) -> Result<TurnOutcome, TurnError> {
        self.run_turn_calls.fetch_add(1, Ordering::SeqCst);
        Ok(TurnOutcome::EndedTurn)
    }

    async fn respond_to_chain(&self, _game_id: &GameId) -> Result<(), TurnError> {
        self.chain_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_executing(&self) -> bool {
        false
    }

    async fn decision_history(&self, _game_id: &GameId, _limit: usize) -> Vec<Decision> {
        Vec::new()
    }

    async fn clear_decision_history(&self) {}
}

fn fast_config() -> PollingConfig {
    PollingConfig {
        poll_interval: Duration::from_millis(20),
        discovery_interval: Duration::from_millis(20),
        matchmaking_interval: Duration::from_millis(20),
        adaptive_polling: false,
        ..PollingConfig::default()
    }
}

fn engine_for(server: &MockServer, driver: Arc<CountingDriver>) -> Arc<PollingEngine> {
    let client = GameApiClient::new("test-key").base_url(server.uri());
    let breakers = Arc::new(CircuitBreakerRegistry::new(BreakerConfig::default()));
    PollingEngine::new(client, breakers, driver, fast_config())
}

fn state_json(game_id: &str, my_turn: bool, status: &str) -> serde_json::Value {
    serde_json::json!({
        "game_id": game_id,
        "status": status,
        "phase": "main1",
        "turn_number": 1,
        "current_turn": if my_turn { "me" } else { "opponent" },
        "my_player_id": "me",
        "my_life_points": 8000,
        "opponent_life_points": 8000,
        "available_actions": { "actions": [] },
    })
}

#[tokio::test]
async fn start_polling_game_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/games/G1/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_json("G1", true, "in_progress")))
        .expect(1)
        .mount(&server)
        .await;

    let driver = CountingDriver::new();
    let engine = engine_for(&server, driver);

    let game_id = GameId::new("G1");
    engine.start_polling_game(game_id.clone(), None, None).await;
    engine.start_polling_game(game_id.clone(), None, None).await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    let status = engine.status().await;
    assert!(status.is_polling_game);
    assert_eq!(status.current_game_id, Some(game_id));

    server.verify().await;
}

#[tokio::test]
async fn turn_started_event_invokes_turn_driver() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/games/G1/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_json("G1", true, "in_progress")))
        .mount(&server)
        .await;

    let driver = CountingDriver::new();
    let engine = engine_for(&server, Arc::clone(&driver));

    engine.start_polling_game(GameId::new("G1"), None, None).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(driver.run_turn_calls.load(Ordering::SeqCst) >= 1, "turn_started should trigger run_turn");
}

#[tokio::test]
async fn not_found_ends_polling_and_clears_current_game() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/games/G1/state"))
        .respond_with(ResponseTemplate::new(404).set_body_string("game_not_found"))
        .mount(&server)
        .await;

    let driver = CountingDriver::new();
    let engine = engine_for(&server, driver);

    engine.start_polling_game(GameId::new("G1"), None, None).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let status = engine.status().await;
    assert!(!status.is_polling_game);
    assert_eq!(status.current_game_id, None);
}

#[tokio::test]
async fn stop_polling_clears_state_and_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/games/G1/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_json("G1", false, "in_progress")))
        .mount(&server)
        .await;

    let driver = CountingDriver::new();
    let engine = engine_for(&server, driver);

    engine.start_polling_game(GameId::new("G1"), None, None).await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    engine.stop_polling().await;
    engine.stop_polling().await;

    let status = engine.status().await;
    assert!(!status.is_polling_game);
    assert_eq!(status.current_game_id, None);
    assert!(engine.last_known_state().await.is_none());
}

#[tokio::test]
async fn game_completion_stops_polling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/games/G1/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_json("G1", true, "completed")))
        .mount(&server)
        .await;

    let driver = CountingDriver::new();
    let engine = engine_for(&server, driver);

    engine.start_polling_game(GameId::new("G1"), None, None).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let status = engine.status().await;
    assert!(!status.is_polling_game);
}
