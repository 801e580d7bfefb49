use actix_files::Files;
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::assignment::{
    all_slots, available_candidates, unavailable_count, AbsenceInterval, GameStore, Referee,
    Role, SchedulingSession, SlotKey,
};
use crate::display::format_referee_name;
use crate::form::GameForm;
use crate::parser::{parse_absences_csv, parse_games_csv, parse_referees_csv};

// In-memory storage for the directory snapshots, the scheduled games and
// the single active scheduling session (in production, use a database)
pub struct AppState {
    pub referees: Mutex<Vec<Referee>>,
    pub absences: Mutex<Vec<AbsenceInterval>>,
    pub games: Mutex<GameStore>,
    pub session: Mutex<SchedulingSession>,
    pub admin_password: String,
}

impl AppState {
    pub fn new(admin_password: String) -> AppState {
        AppState {
            referees: Mutex::new(Vec::new()),
            absences: Mutex::new(Vec::new()),
            games: Mutex::new(GameStore::new()),
            session: Mutex::new(SchedulingSession::new()),
            admin_password,
        }
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

#[derive(Deserialize)]
pub struct SelectRequest {
    role: Role,
    slot: u8,
    referee_id: Option<String>,
}

#[derive(Serialize)]
pub struct CandidateInfo {
    id: String,
    name: String,
    display: String,
}

#[derive(Serialize)]
pub struct SlotAvailability {
    role: Role,
    slot: u8,
    selected: Option<String>,
    candidates: Vec<CandidateInfo>,
}

#[derive(Serialize)]
pub struct RoleCount {
    role: Role,
    unavailable: usize,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    revision: u64,
    slots: Vec<SlotAvailability>,
    unavailable: Vec<RoleCount>,
}

fn is_admin(session: &Session) -> bool {
    session.get::<bool>("admin").unwrap_or(None).unwrap_or(false)
}

// Admin login endpoint
async fn admin_login(
    req: web::Json<LoginRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.password == state.admin_password {
        session.insert("admin", true)?;
        Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
    } else {
        Ok(HttpResponse::Unauthorized()
            .json(serde_json::json!({"success": false, "error": "Invalid password"})))
    }
}

// Admin referee directory upload endpoint
async fn upload_referees(
    session: Session,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(HttpResponse::Unauthorized()
            .json(serde_json::json!({"success": false, "error": "Unauthorized"})));
    }

    match parse_referees_csv(&body) {
        Ok(referees) => {
            log::info!("referee directory replaced, {} entries", referees.len());
            *state.referees.lock().unwrap() = referees;
            Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
        }
        Err(e) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": format!("Failed to process CSV: {}", e)
        }))),
    }
}

// Admin absence list upload endpoint
async fn upload_absences(
    session: Session,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(HttpResponse::Unauthorized()
            .json(serde_json::json!({"success": false, "error": "Unauthorized"})));
    }

    match parse_absences_csv(&body) {
        Ok(absences) => {
            log::info!("absence list replaced, {} entries", absences.len());
            *state.absences.lock().unwrap() = absences;
            Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
        }
        Err(e) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": format!("Failed to process CSV: {}", e)
        }))),
    }
}

// Admin schedule upload endpoint, replaces the stored games
async fn upload_games(
    session: Session,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(HttpResponse::Unauthorized()
            .json(serde_json::json!({"success": false, "error": "Unauthorized"})));
    }

    let games = match parse_games_csv(&body) {
        Ok(games) => games,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": format!("Failed to process CSV: {}", e)
            })))
        }
    };

    let mut store = GameStore::new();
    for game in games {
        if let Err(e) = store.insert(game) {
            return Ok(HttpResponse::BadRequest()
                .json(serde_json::json!({"success": false, "error": e.to_string()})));
        }
    }
    log::info!("schedule replaced, {} games", store.games().len());
    *state.games.lock().unwrap() = store;
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

// Referee directory endpoint
async fn get_referees(state: web::Data<AppState>) -> Result<HttpResponse> {
    let referees = state.referees.lock().unwrap();
    let listing: Vec<serde_json::Value> = referees
        .iter()
        .map(|referee| {
            serde_json::json!({
                "id": referee.id,
                "name": referee.name,
                "role": referee.role,
                "personal_code": referee.personal_code,
                "display": format_referee_name(referee),
            })
        })
        .collect();
    Ok(HttpResponse::Ok().json(listing))
}

// Absence list endpoint
async fn get_absences(state: web::Data<AppState>) -> Result<HttpResponse> {
    let absences = state.absences.lock().unwrap();
    Ok(HttpResponse::Ok().json(&*absences))
}

// Current wizard state endpoint
async fn get_session(state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = state.session.lock().unwrap();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "step": session.step(),
        "form": session.form(),
        "selections": session.selections().to_assignments(),
        "revision": session.revision(),
    })))
}

// Details step: stores the entered data, recomputes availability (clearing
// selections that became invalid) and tries to advance the wizard
async fn update_details(
    req: web::Json<GameForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let referees = state.referees.lock().unwrap();
    let absences = state.absences.lock().unwrap();
    let games = state.games.lock().unwrap();
    let mut session = state.session.lock().unwrap();

    session.update_form(req.into_inner());
    let ctx = session.context(&referees, &absences, &*games);
    let outcome = session.refresh(&ctx);

    match session.advance() {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "valid": true,
            "step": session.step(),
            "cleared": outcome.cleared,
            "revision": session.revision(),
        }))),
        Err(e) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "valid": false,
            "error": e.to_string(),
            "step": session.step(),
            "cleared": outcome.cleared,
            "revision": session.revision(),
        }))),
    }
}

// Back navigation, always allowed
async fn go_back(state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut session = state.session.lock().unwrap();
    session.back();
    Ok(HttpResponse::Ok()
        .json(serde_json::json!({"success": true, "step": session.step()})))
}

// Referee selection for one slot
async fn select_referee(
    req: web::Json<SelectRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut session = state.session.lock().unwrap();
    let req = req.into_inner();
    match session.select(SlotKey::new(req.role, req.slot), req.referee_id) {
        Ok(()) => Ok(HttpResponse::Ok()
            .json(serde_json::json!({"success": true, "revision": session.revision()}))),
        Err(e) => Ok(HttpResponse::BadRequest()
            .json(serde_json::json!({"success": false, "error": e.to_string()}))),
    }
}

// Availability endpoint: eligible candidates per slot plus the per-role
// unavailable counts for the current candidate date/time
async fn get_availability(state: web::Data<AppState>) -> Result<HttpResponse> {
    let referees = state.referees.lock().unwrap();
    let absences = state.absences.lock().unwrap();
    let games = state.games.lock().unwrap();
    let session = state.session.lock().unwrap();

    let ctx = session.context(&referees, &absences, &*games);
    let outcome = session.resolve(&ctx);

    let slots = all_slots()
        .into_iter()
        .map(|slot| {
            let candidates = available_candidates(
                slot,
                &referees,
                session.selections(),
                &outcome.availability,
            );
            SlotAvailability {
                role: slot.role,
                slot: slot.slot,
                selected: session.selections().get(slot).map(str::to_string),
                candidates: candidates
                    .iter()
                    .map(|referee| CandidateInfo {
                        id: referee.id.clone(),
                        name: referee.name.clone(),
                        display: format_referee_name(referee),
                    })
                    .collect(),
            }
        })
        .collect();

    let unavailable = Role::ALL
        .iter()
        .map(|&role| RoleCount {
            role,
            unavailable: unavailable_count(role, &referees, &outcome.availability),
        })
        .collect();

    Ok(HttpResponse::Ok().json(AvailabilityResponse {
        revision: session.revision(),
        slots,
        unavailable,
    }))
}

// Final submission: validates the assignments, stores the game and resets
// the wizard. The created game immediately takes part in conflict checks.
async fn create_game(state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut games = state.games.lock().unwrap();
    let mut session = state.session.lock().unwrap();

    let submission = match session.submit() {
        Ok(submission) => submission,
        Err(e) => {
            return Ok(HttpResponse::BadRequest()
                .json(serde_json::json!({"success": false, "error": e.to_string()})))
        }
    };

    let details = match submission.form.details() {
        Some(details) => details,
        None => {
            return Ok(HttpResponse::BadRequest().json(
                serde_json::json!({"success": false, "error": "game details are incomplete"}),
            ))
        }
    };

    let assignments = submission.selections.to_assignments();
    let game = games.create(details, assignments);
    log::info!(
        "scheduled game {}: {} vs {} on {} {}",
        game.id,
        game.home_team,
        game.away_team,
        game.date,
        game.time
    );
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "game": game})))
}

// Scheduled games endpoint
async fn list_games(state: web::Data<AppState>) -> Result<HttpResponse> {
    let games = state.games.lock().unwrap();
    Ok(HttpResponse::Ok().json(games.games()))
}

// HTML page handlers
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

async fn admin_page() -> Result<HttpResponse> {
    let html = include_str!("../templates/admin.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

async fn schedule_page() -> Result<HttpResponse> {
    let html = include_str!("../templates/schedule.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

pub async fn start_server(port: u16, admin_password: String) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(admin_password));

    // Cookie signing key, regenerated on every start
    let mut key_bytes = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut key_bytes);
    let session_key = Key::from(&key_bytes);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                session_key.clone(),
            ))
            .service(Files::new("/static", "static"))
            .route("/", web::get().to(index))
            .route("/admin", web::get().to(admin_page))
            .route("/schedule", web::get().to(schedule_page))
            .route("/api/login", web::post().to(admin_login))
            .route("/api/upload/referees", web::post().to(upload_referees))
            .route("/api/upload/absences", web::post().to(upload_absences))
            .route("/api/upload/games", web::post().to(upload_games))
            .route("/api/referees", web::get().to(get_referees))
            .route("/api/absences", web::get().to(get_absences))
            .route("/api/session", web::get().to(get_session))
            .route("/api/session/details", web::post().to(update_details))
            .route("/api/session/back", web::post().to(go_back))
            .route("/api/session/select", web::post().to(select_referee))
            .route("/api/availability", web::get().to(get_availability))
            .route("/api/games", web::get().to(list_games))
            .route("/api/games", web::post().to(create_game))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
