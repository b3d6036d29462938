//! Admin API server: drives leagues through their stages over JSON endpoints.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Set BACKEND_URL (and BACKEND_API_KEY) to use the remote fixture service; without it
//! leagues live in an in-process store.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use league_fixture_admin::{
    logic::{selected, unassigned_teams},
    AppConfig, Backend, FixtureError, GroupId, LeagueFixture, LeagueId, LeagueSession, Match,
    MatchDetails, MatchId, OpenBracket, RemoteError, StageView, TeamId, TeamRef,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Per-league entry: the session, the open bracket screen (if any) and last activity.
struct LeagueEntry {
    session: LeagueSession<Backend>,
    bracket: Option<OpenBracket>,
    last_activity: Instant,
}

type SharedEntry = Arc<Mutex<LeagueEntry>>;

struct AppState {
    backend: Backend,
    leagues: RwLock<HashMap<LeagueId, SharedEntry>>,
}

type State = Data<AppState>;

/// Inactivity threshold: sessions not accessed for this long are dropped.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
struct LeagueResponse<'a> {
    fixture: &'a LeagueFixture,
    view: StageView,
    unassigned_teams: Vec<TeamId>,
    bracket: Option<&'a OpenBracket>,
}

#[derive(Deserialize)]
struct CreateLeagueBody {
    teams: Vec<String>,
}

#[derive(Deserialize)]
struct CreateGroupsBody {
    group_number: usize,
    group_names: Vec<String>,
}

#[derive(Deserialize)]
struct GroupTeamBody {
    group_id: Option<GroupId>,
    team_id: Option<TeamId>,
}

#[derive(Deserialize)]
struct GenerateScheduleBody {
    /// Free text or number; anything unusable means one round.
    #[serde(default)]
    rounds: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct SaveScheduleBody {
    matches: Vec<Match>,
}

#[derive(Deserialize)]
struct AdvanceBody {
    stage: u8,
}

#[derive(Deserialize)]
struct SlotAssignBody {
    team_id: Option<TeamId>,
}

#[derive(Deserialize)]
struct RecordResultBody {
    match_id: MatchId,
    winner: TeamId,
}

/// Path segment: league id (e.g. /api/leagues/{id})
#[derive(Deserialize)]
struct LeaguePath {
    id: LeagueId,
}

#[derive(Deserialize)]
struct LeagueTeamPath {
    id: LeagueId,
    team_id: TeamId,
}

#[derive(Deserialize)]
struct SlotPath {
    id: LeagueId,
    slot: usize,
}

#[derive(Deserialize)]
struct SlotOccupantPath {
    id: LeagueId,
    slot: usize,
    occupant: usize,
}

fn error_json(message: impl std::fmt::Display) -> serde_json::Value {
    serde_json::json!({ "error": message.to_string() })
}

fn error_response(e: &FixtureError) -> HttpResponse {
    match e {
        FixtureError::Validation(_) => HttpResponse::BadRequest().json(error_json(e)),
        FixtureError::Remote(RemoteError::LeagueNotFound(_)) => {
            HttpResponse::NotFound().json(error_json(e))
        }
        FixtureError::Remote(_) => HttpResponse::BadGateway().json(error_json(e)),
    }
}

fn league_json(entry: &LeagueEntry) -> HttpResponse {
    let fixture = entry.session.fixture();
    HttpResponse::Ok().json(LeagueResponse {
        fixture,
        view: entry.session.view(),
        unassigned_teams: unassigned_teams(fixture),
        bracket: entry.bracket.as_ref(),
    })
}

/// Open session for a league, loading it from the backend on first access.
async fn league_entry(state: &State, id: LeagueId) -> Result<SharedEntry, HttpResponse> {
    let existing = match state.leagues.read() {
        Ok(g) => g.get(&id).cloned(),
        Err(_) => return Err(HttpResponse::InternalServerError().body("lock error")),
    };
    if let Some(entry) = existing {
        return Ok(entry);
    }
    let session = LeagueSession::load(state.backend.clone(), id)
        .await
        .map_err(|e| error_response(&e))?;
    let entry = Arc::new(Mutex::new(LeagueEntry {
        session,
        bracket: None,
        last_activity: Instant::now(),
    }));
    match state.leagues.write() {
        Ok(mut g) => Ok(g.entry(id).or_insert(entry).clone()),
        Err(_) => Err(HttpResponse::InternalServerError().body("lock error")),
    }
}

fn memory_only() -> HttpResponse {
    HttpResponse::BadRequest().json(error_json(
        "Only available with the in-process store (BACKEND_URL is set)",
    ))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "league-fixture-admin",
    })
}

/// Register a league with unapproved teams (in-process store only).
#[post("/api/leagues")]
async fn api_create_league(state: State, body: Json<CreateLeagueBody>) -> HttpResponse {
    let Backend::Memory(store) = &state.backend else {
        return memory_only();
    };
    let teams: Vec<TeamRef> = body
        .teams
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(TeamRef::new)
        .collect();
    let team_count = teams.len();
    let id = match store.register_league(teams) {
        Ok(id) => id,
        Err(e) => return error_response(&e.into()),
    };
    log::info!("Registered league {} with {} teams", id, team_count);
    let entry = match league_entry(&state, id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let e = entry.lock().await;
    league_json(&e)
}

/// Current fixture, screen and open bracket.
#[get("/api/leagues/{id}")]
async fn api_get_league(state: State, path: Path<LeaguePath>) -> HttpResponse {
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    league_json(&e)
}

/// Re-fetch from the backend (picks up recorded results).
#[post("/api/leagues/{id}/refresh")]
async fn api_refresh_league(state: State, path: Path<LeaguePath>) -> HttpResponse {
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    match e.session.refresh().await {
        Ok(()) => league_json(&e),
        Err(err) => error_response(&err),
    }
}

#[post("/api/leagues/{id}/stage")]
async fn api_advance(state: State, path: Path<LeaguePath>, body: Json<AdvanceBody>) -> HttpResponse {
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    match e.session.advance(body.stage).await {
        Ok(()) => league_json(&e),
        Err(err) => error_response(&err),
    }
}

#[post("/api/leagues/{id}/teams/{team_id}/approve")]
async fn api_approve_team(state: State, path: Path<LeagueTeamPath>) -> HttpResponse {
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    match e.session.approve(path.team_id).await {
        Ok(()) => league_json(&e),
        Err(err) => error_response(&err),
    }
}

#[post("/api/leagues/{id}/teams/{team_id}/unapprove")]
async fn api_unapprove_team(state: State, path: Path<LeagueTeamPath>) -> HttpResponse {
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    match e.session.unapprove(path.team_id).await {
        Ok(()) => league_json(&e),
        Err(err) => error_response(&err),
    }
}

/// Registration -> group creation.
#[post("/api/leagues/{id}/start")]
async fn api_start_regular_round(state: State, path: Path<LeaguePath>) -> HttpResponse {
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    match e.session.start_regular_round().await {
        Ok(()) => league_json(&e),
        Err(err) => error_response(&err),
    }
}

#[post("/api/leagues/{id}/groups")]
async fn api_create_groups(
    state: State,
    path: Path<LeaguePath>,
    body: Json<CreateGroupsBody>,
) -> HttpResponse {
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    match e.session.create_groups(body.group_number, &body.group_names).await {
        Ok(()) => league_json(&e),
        Err(err) => error_response(&err),
    }
}

#[put("/api/leagues/{id}/groups/teams")]
async fn api_assign_team(
    state: State,
    path: Path<LeaguePath>,
    body: Json<GroupTeamBody>,
) -> HttpResponse {
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    let result = match (selected(body.group_id, "group"), selected(body.team_id, "team")) {
        (Ok(group), Ok(team)) => e.session.assign_team(group, team).await,
        (Err(err), _) | (_, Err(err)) => Err(err.into()),
    };
    match result {
        Ok(()) => league_json(&e),
        Err(err) => error_response(&err),
    }
}

#[delete("/api/leagues/{id}/groups/teams")]
async fn api_unassign_team(
    state: State,
    path: Path<LeaguePath>,
    body: Json<GroupTeamBody>,
) -> HttpResponse {
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    let result = match (selected(body.group_id, "group"), selected(body.team_id, "team")) {
        (Ok(group), Ok(team)) => e.session.unassign_team(group, team).await,
        (Err(err), _) | (_, Err(err)) => Err(err.into()),
    };
    match result {
        Ok(()) => league_json(&e),
        Err(err) => error_response(&err),
    }
}

/// Team assignment -> regular round.
#[post("/api/leagues/{id}/groups/finish")]
async fn api_finish_team_assignment(state: State, path: Path<LeaguePath>) -> HttpResponse {
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    match e.session.finish_team_assignment().await {
        Ok(()) => league_json(&e),
        Err(err) => error_response(&err),
    }
}

fn rounds_input(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Proposed regular-round schedule (not stored).
#[post("/api/leagues/{id}/schedule/generate")]
async fn api_generate_schedule(
    state: State,
    path: Path<LeaguePath>,
    body: Json<GenerateScheduleBody>,
) -> HttpResponse {
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    match e.session.generate_schedule(&rounds_input(body.rounds.as_ref())) {
        Ok(matches) => HttpResponse::Ok().json(serde_json::json!({ "matches": matches })),
        Err(err) => error_response(&err),
    }
}

#[post("/api/leagues/{id}/schedule")]
async fn api_save_schedule(
    state: State,
    path: Path<LeaguePath>,
    body: Json<SaveScheduleBody>,
) -> HttpResponse {
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    match e.session.save_regular_round(body.into_inner().matches).await {
        Ok(()) => league_json(&e),
        Err(err) => error_response(&err),
    }
}

#[post("/api/leagues/{id}/quarter-finals/start")]
async fn api_start_quarter_finals(state: State, path: Path<LeaguePath>) -> HttpResponse {
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    match e.session.start_quarter_finals().await {
        Ok(()) => league_json(&e),
        Err(err) => error_response(&err),
    }
}

/// Open a fresh bracket screen (quarter-finals or semi-finals, by state).
#[post("/api/leagues/{id}/bracket")]
async fn api_open_bracket(state: State, path: Path<LeaguePath>) -> HttpResponse {
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    match e.session.open_bracket() {
        Ok(bracket) => {
            e.bracket = Some(bracket);
            league_json(&e)
        }
        Err(err) => error_response(&err),
    }
}

fn no_bracket() -> HttpResponse {
    HttpResponse::BadRequest().json(error_json("No bracket is open"))
}

#[put("/api/leagues/{id}/bracket/slots/{slot}")]
async fn api_assign_slot(state: State, path: Path<SlotPath>, body: Json<SlotAssignBody>) -> HttpResponse {
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    let Some(bracket) = e.bracket.as_mut() else {
        return no_bracket();
    };
    let result = selected(body.team_id, "team").and_then(|team| bracket.assign_to_slot(path.slot, team));
    match result {
        Ok(()) => league_json(&e),
        Err(err) => error_response(&err.into()),
    }
}

#[delete("/api/leagues/{id}/bracket/slots/{slot}/{occupant}")]
async fn api_unassign_slot(state: State, path: Path<SlotOccupantPath>) -> HttpResponse {
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    let Some(bracket) = e.bracket.as_mut() else {
        return no_bracket();
    };
    match bracket.unassign_from_slot(path.slot, path.occupant) {
        Ok(_) => league_json(&e),
        Err(err) => error_response(&err.into()),
    }
}

#[put("/api/leagues/{id}/bracket/slots/{slot}/details")]
async fn api_slot_details(
    state: State,
    path: Path<SlotPath>,
    body: Json<MatchDetails>,
) -> HttpResponse {
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    let Some(bracket) = e.bracket.as_mut() else {
        return no_bracket();
    };
    match bracket.set_details(path.slot, body.into_inner()) {
        Ok(()) => league_json(&e),
        Err(err) => error_response(&err.into()),
    }
}

/// Submit the open bracket as one batch; the bracket screen is discarded on success.
#[post("/api/leagues/{id}/bracket/submit")]
async fn api_submit_bracket(state: State, path: Path<LeaguePath>) -> HttpResponse {
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    let Some(bracket) = e.bracket.take() else {
        return no_bracket();
    };
    match e.session.submit_bracket(&bracket).await {
        Ok(_) => league_json(&e),
        Err(err) => {
            e.bracket = Some(bracket);
            error_response(&err)
        }
    }
}

/// Semi-finals -> finals between the two semi-final winners.
#[post("/api/leagues/{id}/finals")]
async fn api_start_finals(
    state: State,
    path: Path<LeaguePath>,
    body: Json<MatchDetails>,
) -> HttpResponse {
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    match e.session.start_finals(body.into_inner()).await {
        Ok(_) => league_json(&e),
        Err(err) => error_response(&err),
    }
}

/// Record a match result (in-process store only; a remote scoring service does this otherwise).
#[put("/api/leagues/{id}/results")]
async fn api_record_result(
    state: State,
    path: Path<LeaguePath>,
    body: Json<RecordResultBody>,
) -> HttpResponse {
    let Backend::Memory(store) = &state.backend else {
        return memory_only();
    };
    if let Err(err) = store.record_result(path.id, body.match_id, body.winner) {
        return error_response(&err);
    }
    let entry = match league_entry(&state, path.id).await {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut e = entry.lock().await;
    e.last_activity = Instant::now();
    match e.session.refresh().await {
        Ok(()) => league_json(&e),
        Err(err) => error_response(&err),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env();
    let backend = Backend::from_config(&config.backend)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    match &config.backend.url {
        Some(url) => log::info!("Using fixture backend at {}", url),
        None => log::info!("No BACKEND_URL set, using in-process store"),
    }

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(AppState {
        backend,
        leagues: RwLock::new(HashMap::new()),
    });

    // Background task: every 30 minutes, drop sessions inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let entries: Vec<(LeagueId, SharedEntry)> = match state_cleanup.leagues.read() {
                Ok(g) => g.iter().map(|(id, e)| (*id, e.clone())).collect(),
                Err(_) => continue,
            };
            let mut idle = Vec::new();
            for (id, entry) in entries {
                if let Ok(e) = entry.try_lock() {
                    if e.last_activity.elapsed() >= INACTIVITY_TIMEOUT {
                        idle.push(id);
                    }
                }
            }
            if idle.is_empty() {
                continue;
            }
            if let Ok(mut g) = state_cleanup.leagues.write() {
                for id in &idle {
                    g.remove(id);
                }
                log::info!("Dropped {} idle league session(s) (no activity for 12h)", idle.len());
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_league)
            .service(api_get_league)
            .service(api_refresh_league)
            .service(api_advance)
            .service(api_approve_team)
            .service(api_unapprove_team)
            .service(api_start_regular_round)
            .service(api_create_groups)
            .service(api_assign_team)
            .service(api_unassign_team)
            .service(api_finish_team_assignment)
            .service(api_generate_schedule)
            .service(api_save_schedule)
            .service(api_start_quarter_finals)
            .service(api_open_bracket)
            .service(api_assign_slot)
            .service(api_unassign_slot)
            .service(api_slot_details)
            .service(api_submit_bracket)
            .service(api_start_finals)
            .service(api_record_result)
    })
    .bind(bind)?
    .run()
    .await
}
