//! Single binary web host for the bracket engine: brackets kept in memory, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080), ADVANCE_RETRIES (e.g. 3).

use actix_web::{
    get, post,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use bracket_engine::{
    champion, current_round, generate, record_result, runner_up, tournament_status,
    AdvanceOutcome, Bracket, BracketError, ErrorClass, MatchId, Round, Team, TeamId,
    TournamentStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Tournament id assigned by this host.
type TournamentId = Uuid;

/// Per-tournament entry: the current bracket plus a version bumped on every write.
#[derive(Clone, Debug)]
struct BracketEntry {
    bracket: Bracket,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// Last read or write, for auto-cleanup.
    last_activity: Instant,
}

impl BracketEntry {
    fn new(bracket: Bracket) -> Self {
        let now = Utc::now();
        Self {
            bracket,
            version: 1,
            created_at: now,
            updated_at: now,
            last_activity: Instant::now(),
        }
    }
}

struct HostState {
    brackets: RwLock<HashMap<TournamentId, BracketEntry>>,
    advance_retries: u32,
}

type AppState = Data<HostState>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

/// Remove entries idle for at least `timeout`. Returns how many were removed.
fn evict_inactive(brackets: &mut HashMap<TournamentId, BracketEntry>, timeout: Duration) -> usize {
    let before = brackets.len();
    brackets.retain(|_, entry| entry.last_activity.elapsed() < timeout);
    before - brackets.len()
}

/// Why a single attempt at storing a result did not go through.
#[derive(Debug)]
enum ReportError {
    NoTournament,
    Lock,
    /// The engine refused the result. Re-running it on the same bracket gives the same answer.
    Engine(BracketError),
    /// Another write landed between snapshot and commit.
    VersionChanged,
}

impl ReportError {
    /// Only a lost race is worth another attempt.
    fn should_retry(&self) -> bool {
        matches!(self, ReportError::VersionChanged)
    }

    fn response(&self, id: TournamentId) -> HttpResponse {
        match self {
            ReportError::NoTournament => no_tournament(),
            ReportError::Lock => HttpResponse::InternalServerError().body("lock error"),
            ReportError::Engine(e) => {
                if e.class() == ErrorClass::InternalConsistency {
                    log::error!("Tournament {} bracket is inconsistent: {}", id, e);
                }
                error_response(e)
            }
            ReportError::VersionChanged => HttpResponse::Conflict()
                .json(serde_json::json!({ "error": "Tournament changed concurrently, try again" })),
        }
    }
}

/// One optimistic attempt: run the engine on a snapshot outside the lock, then store the
/// new bracket only if nobody else wrote in between.
fn apply_result(
    state: &HostState,
    id: TournamentId,
    match_id: MatchId,
    winner_id: TeamId,
) -> Result<BracketEntry, ReportError> {
    let snapshot = match state.brackets.read() {
        Ok(g) => g.get(&id).cloned().ok_or(ReportError::NoTournament)?,
        Err(_) => return Err(ReportError::Lock),
    };

    let (bracket, outcome) =
        record_result(&snapshot.bracket, match_id, winner_id).map_err(ReportError::Engine)?;

    let mut g = state.brackets.write().map_err(|_| ReportError::Lock)?;
    let entry = g.get_mut(&id).ok_or(ReportError::NoTournament)?;
    entry.last_activity = Instant::now();
    if outcome == AdvanceOutcome::AlreadyDecided {
        return Ok(entry.clone());
    }
    if entry.version != snapshot.version {
        return Err(ReportError::VersionChanged);
    }
    entry.bracket = bracket;
    entry.version += 1;
    entry.updated_at = Utc::now();
    if let Some(winner) = champion(&entry.bracket) {
        log::info!("Tournament {} completed, champion: {}", id, winner.name);
    }
    Ok(entry.clone())
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    teams: Vec<Team>,
}

#[derive(Deserialize)]
struct ReportResultBody {
    match_id: MatchId,
    winner_id: TeamId,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Serialize)]
struct TournamentResponse<'a> {
    id: TournamentId,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    status: TournamentStatus,
    current_round: Option<Round>,
    champion: Option<&'a Team>,
    runner_up: Option<&'a Team>,
    bracket: &'a Bracket,
}

impl<'a> TournamentResponse<'a> {
    fn new(id: TournamentId, entry: &'a BracketEntry) -> Self {
        Self {
            id,
            version: entry.version,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
            status: tournament_status(&entry.bracket),
            current_round: current_round(&entry.bracket),
            champion: champion(&entry.bracket),
            runner_up: runner_up(&entry.bracket),
            bracket: &entry.bracket,
        }
    }
}

fn error_response(e: &BracketError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match (e, e.class()) {
        (BracketError::MatchNotFound(_), _) => HttpResponse::NotFound().json(body),
        (_, ErrorClass::InputValidation) => HttpResponse::BadRequest().json(body),
        (_, ErrorClass::StateConflict) => HttpResponse::Conflict().json(body),
        (_, ErrorClass::InternalConsistency) => HttpResponse::InternalServerError().json(body),
    }
}

fn no_tournament() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "bracket-engine",
    })
}

/// Create a tournament from a team list (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let bracket = match generate(body.into_inner().teams) {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };
    let id = Uuid::new_v4();
    let entry = BracketEntry::new(bracket);
    let mut g = match state.brackets.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    log::info!("Created tournament {} ({} teams)", id, entry.bracket.team_count());
    let response = HttpResponse::Ok().json(TournamentResponse::new(id, &entry));
    g.insert(id, entry);
    response
}

/// Get a tournament's bracket and status (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.brackets.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(TournamentResponse::new(path.id, entry))
        }
        None => no_tournament(),
    }
}

/// Report a match result.
///
/// Engine refusals (including state conflicts) are answered straight away; only a lost
/// race against another write is retried, up to `ADVANCE_RETRIES` times.
#[post("/api/tournaments/{id}/results")]
async fn api_report_result(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<ReportResultBody>,
) -> HttpResponse {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match apply_result(&state, path.id, body.match_id, body.winner_id) {
            Ok(entry) => return HttpResponse::Ok().json(TournamentResponse::new(path.id, &entry)),
            Err(e) if e.should_retry() && attempt <= state.advance_retries => {
                log::warn!("Tournament {} changed during update, retrying", path.id);
            }
            Err(e) => return e.response(path.id),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_advance_retries() -> u32 {
    3
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let advance_retries: u32 = std::env::var("ADVANCE_RETRIES")
        .ok()
        .and_then(|r| r.parse().ok())
        .unwrap_or_else(default_advance_retries);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(HostState {
        brackets: RwLock::new(HashMap::new()),
        advance_retries,
    });

    // Background task: every 30 minutes, remove tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.brackets.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let removed = evict_inactive(&mut g, INACTIVITY_TIMEOUT);
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_report_result)
    })
    .bind(bind)?
    .run()
    .await
}
