use super::card::{Card, Color};
use super::game::GameError;
use super::recorder::{JsonFileRecorder, MatchRecorder, MAX_RECORDS};
use super::round::{GameEvent, Round, TurnPhase};
use super::rules;
use super::session::{GameSession, SessionManager};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
pub struct AppState {
    session_manager: SessionManager,
    recorder: Arc<Mutex<JsonFileRecorder>>,
}

impl AppState {
    pub fn new(session_manager: SessionManager, recorder: JsonFileRecorder) -> Self {
        Self {
            session_manager,
            recorder: Arc::new(Mutex::new(recorder)),
        }
    }

    fn with_recorder<T>(
        &self,
        f: impl FnOnce(&mut JsonFileRecorder) -> io::Result<T>,
    ) -> io::Result<T> {
        let mut recorder = self
            .recorder
            .lock()
            .map_err(|_| io::Error::other("history lock poisoned"))?;
        f(&mut recorder)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub sessions_dir: PathBuf,
    pub history_file: PathBuf,
    pub addr: String,
}

#[derive(Deserialize)]
pub struct CreateRoundRequest {
    player_names: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct SelectCardRequest {
    card_id: String,
}

#[derive(Serialize, Deserialize)]
pub struct AnswerRequest {
    /// `false` also covers a question that timed out.
    correct: bool,
}

#[derive(Serialize, Deserialize)]
pub struct ChooseColorRequest {
    color: String,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    limit: Option<usize>,
}

#[derive(Serialize, Deserialize)]
pub struct RoundResponse {
    id: String,
    round_number: u32,
    phase: String,
    current_player: usize,
    players: Vec<PlayerResponse>,
    discard_pile_top: Option<CardResponse>,
    current_color: String,
    deck_cards_remaining: usize,
    message: String,
    winner: Option<WinnerResponse>,
}

#[derive(Serialize, Deserialize)]
pub struct PlayerResponse {
    id: String,
    name: String,
    avatar: String,
    hand_size: usize,
    score: u32,
}

#[derive(Serialize, Deserialize)]
pub struct CardResponse {
    id: String,
    color: String,
    card_type: String,
    playable: bool,
}

#[derive(Serialize, Deserialize)]
pub struct QuestionResponse {
    text: String,
    options: Vec<String>,
    correct: usize,
    category: String,
}

#[derive(Serialize, Deserialize)]
pub struct RoundStateResponse {
    id: String,
    round_number: u32,
    phase: String,
    current_player: usize,
    direction: String,
    players: Vec<PlayerStateResponse>,
    discard_pile_top: Option<CardResponse>,
    current_color: String,
    deck_cards_remaining: usize,
    active_card: Option<CardResponse>,
    question: Option<QuestionResponse>,
    message: String,
    winner: Option<WinnerResponse>,
}

#[derive(Serialize, Deserialize)]
pub struct PlayerStateResponse {
    id: String,
    name: String,
    avatar: String,
    score: u32,
    hand: Vec<CardResponse>,
}

#[derive(Serialize, Deserialize)]
pub struct WinnerResponse {
    id: String,
    name: String,
    score: u32,
}

#[derive(Serialize, Deserialize)]
pub struct TurnResponse {
    event: GameEvent,
    round: RoundStateResponse,
}

pub async fn create_round(
    State(state): State<AppState>,
    Json(req): Json<CreateRoundRequest>,
) -> impl IntoResponse {
    info!("Creating new round with players: {:?}", req.player_names);
    let round = match Round::start(req.player_names.clone()) {
        Ok(round) => round,
        Err(e) => {
            error!("Failed to create round: {}", e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    if let Err(e) = state.with_recorder(|r| r.save_player_names(&req.player_names)) {
        error!("Failed to remember player names: {}", e);
    }

    match state.session_manager.create_session(round) {
        Ok(session) => {
            info!("Created new round session: {}", session.id);
            let response = RoundResponse::from_session(&session);
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to create session: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub async fn list_rounds(State(state): State<AppState>) -> impl IntoResponse {
    info!("Listing all rounds");
    match state.session_manager.list_sessions() {
        Ok(sessions) => {
            info!("Found {} rounds", sessions.len());
            Json(sessions).into_response()
        }
        Err(e) => {
            error!("Failed to list sessions: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub async fn get_round(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Getting round with ID: {}", id);
    match state.session_manager.load_session(&id) {
        Ok(session) => Json(RoundResponse::from_session(&session)).into_response(),
        Err(e) => {
            info!("Round not found: {}", id);
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
    }
}

pub async fn get_round_state(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Getting state for round ID: {}", id);
    match state.session_manager.load_session(&id) {
        Ok(session) => Json(RoundStateResponse::from_session(&session)).into_response(),
        Err(e) => {
            info!("Round not found: {}", id);
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
    }
}

pub async fn delete_round(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Deleting round with ID: {}", id);
    match state.session_manager.delete_session(&id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            info!("Failed to delete round: {} - {}", id, e);
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
    }
}

pub async fn select_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SelectCardRequest>,
) -> impl IntoResponse {
    info!("Selecting card {} in round: {}", req.card_id, id);
    apply_step(&state, &id, |round| round.select_card(&req.card_id))
}

pub async fn answer_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AnswerRequest>,
) -> impl IntoResponse {
    info!("Answer in round {}: correct = {}", id, req.correct);
    apply_step(&state, &id, |round| round.answer(req.correct))
}

pub async fn choose_color(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChooseColorRequest>,
) -> impl IntoResponse {
    info!("Choosing color {} in round: {}", req.color, id);
    let Some(color) = Color::parse(&req.color) else {
        info!("Invalid color {} in round: {}", req.color, id);
        return (StatusCode::BAD_REQUEST, GameError::InvalidColor.to_string()).into_response();
    };
    apply_step(&state, &id, |round| round.choose_color(color))
}

pub async fn draw_card(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Drawing card in round: {}", id);
    apply_step(&state, &id, Round::draw_instead)
}

pub async fn next_round(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("Dealing next round in session: {}", id);
    let mut session = match state.session_manager.load_session(&id) {
        Ok(session) => session,
        Err(e) => {
            info!("Round not found: {}", id);
            return (StatusCode::NOT_FOUND, e.to_string()).into_response();
        }
    };

    match session.round.next_round() {
        Ok(round) => {
            session.round = round;
            session.recorded = false;
            if let Err(e) = state.session_manager.save_session(&session) {
                error!("Failed to save round state: {}", e);
                return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
            }
            Json(RoundStateResponse::from_session(&session)).into_response()
        }
        Err(e) => {
            info!("Cannot deal next round in {}: {}", id, e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(MAX_RECORDS);
    match state.with_recorder(|r| r.list_recent(limit)) {
        Ok(rounds) => Json(rounds).into_response(),
        Err(e) => {
            error!("Failed to read history: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub async fn win_tally(State(state): State<AppState>) -> impl IntoResponse {
    match state.with_recorder(|r| r.win_tally()) {
        Ok(wins) => Json(wins).into_response(),
        Err(e) => {
            error!("Failed to read win tally: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub async fn clear_history(State(state): State<AppState>) -> impl IntoResponse {
    info!("Clearing round history");
    match state.with_recorder(|r| r.clear_history()) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to clear history: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Loads a session, runs one round transition, records a finished round once
/// and saves the result.
fn apply_step<F>(state: &AppState, id: &str, step: F) -> Response
where
    F: FnOnce(&Round) -> Result<(Round, GameEvent), GameError>,
{
    let mut session = match state.session_manager.load_session(id) {
        Ok(session) => session,
        Err(e) => {
            info!("Round not found: {}", id);
            return (StatusCode::NOT_FOUND, e.to_string()).into_response();
        }
    };

    let (round, event) = match step(&session.round) {
        Ok(outcome) => outcome,
        Err(e) => {
            info!("Rejected action in round {}: {}", id, e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };
    session.round = round;

    if session.round.is_over() && !session.recorded {
        let duration = session.round.elapsed_secs(Utc::now());
        if let Some(record) = session.round.to_record(duration) {
            if let Err(e) = state.with_recorder(|r| r.append(record)) {
                error!("Failed to record round {}: {}", id, e);
                return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
            }
            session.recorded = true;
        }
    }

    if let Err(e) = state.session_manager.save_session(&session) {
        error!("Failed to save round state: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    Json(TurnResponse {
        event,
        round: RoundStateResponse::from_session(&session),
    })
    .into_response()
}

impl CardResponse {
    fn from_card(card: &Card, playable: bool) -> Self {
        Self {
            id: card.id.clone(),
            color: card.color.to_string(),
            card_type: card.card_type.to_string(),
            playable,
        }
    }
}

impl WinnerResponse {
    fn from_round(round: &Round) -> Option<Self> {
        round.state.winner.as_ref().map(|w| Self {
            id: w.id.clone(),
            name: w.name.clone(),
            score: w.score,
        })
    }
}

impl RoundResponse {
    fn from_session(session: &GameSession) -> Self {
        let game = &session.round.state;
        Self {
            id: session.id.clone(),
            round_number: game.round_number,
            phase: session.round.phase.name().to_string(),
            current_player: game.current_player_index,
            players: game
                .players
                .iter()
                .map(|p| PlayerResponse {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    avatar: p.avatar.clone(),
                    hand_size: p.hand.len(),
                    score: p.score,
                })
                .collect(),
            discard_pile_top: game.top_card().map(|c| CardResponse::from_card(c, false)),
            current_color: game.current_color().to_string(),
            deck_cards_remaining: game.deck.len(),
            message: game.message.clone(),
            winner: WinnerResponse::from_round(&session.round),
        }
    }
}

impl RoundStateResponse {
    fn from_session(session: &GameSession) -> Self {
        let round = &session.round;
        let game = &round.state;
        let color = game.current_color();
        let can_select = round.phase == TurnPhase::Playing;

        let players = game
            .players
            .iter()
            .enumerate()
            .map(|(seat, p)| PlayerStateResponse {
                id: p.id.clone(),
                name: p.name.clone(),
                avatar: p.avatar.clone(),
                score: p.score,
                hand: p
                    .hand
                    .iter()
                    .map(|card| {
                        let playable = can_select
                            && seat == game.current_player_index
                            && game
                                .top_card()
                                .is_some_and(|top| rules::can_play(card, top, color));
                        CardResponse::from_card(card, playable)
                    })
                    .collect(),
            })
            .collect();

        let question = match round.phase {
            TurnPhase::AwaitingAnswer { .. } => {
                game.active_card.as_ref().map(|card| QuestionResponse {
                    text: card.question.text.clone(),
                    options: card.question.options.to_vec(),
                    correct: card.question.correct,
                    category: card.question.category.to_string(),
                })
            }
            _ => None,
        };

        Self {
            id: session.id.clone(),
            round_number: game.round_number,
            phase: round.phase.name().to_string(),
            current_player: game.current_player_index,
            direction: format!("{:?}", game.direction),
            players,
            discard_pile_top: game.top_card().map(|c| CardResponse::from_card(c, false)),
            current_color: color.to_string(),
            deck_cards_remaining: game.deck.len(),
            active_card: game
                .active_card
                .as_ref()
                .map(|c| CardResponse::from_card(c, false)),
            question,
            message: game.message.clone(),
            winner: WinnerResponse::from_round(round),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    // Create a trace layer for logging
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().include_headers(true))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/rounds", post(create_round).get(list_rounds))
        .route("/rounds/{id}", get(get_round).delete(delete_round))
        .route("/rounds/{id}/state", get(get_round_state))
        .route("/rounds/{id}/select", post(select_card))
        .route("/rounds/{id}/answer", post(answer_question))
        .route("/rounds/{id}/color", post(choose_color))
        .route("/rounds/{id}/draw", post(draw_card))
        .route("/rounds/{id}/next", post(next_round))
        .route("/history", get(list_history).delete(clear_history))
        .route("/history/wins", get(win_tally))
        .layer(cors)
        .layer(trace_layer)
        .with_state(state)
}

pub async fn start_api_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
    info!("Starting UNO Quiz API server...");

    let session_manager = SessionManager::new(config.sessions_dir)?;
    let recorder = JsonFileRecorder::new(config.history_file)?;
    let app = router(AppState::new(session_manager, recorder));

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    info!("API server running on http://{}", config.addr);
    axum::serve(listener, app).await?;

    Ok(())
}
