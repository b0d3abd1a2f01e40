use actix_web::{web, App, HttpServer, HttpResponse, Result, HttpRequest, middleware};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::assignment::{
    allocate_channels, assign, commander_candidates, group_by_highest, renumber_channels, select_commander,
    used_channels, validate_config, AssignmentConfig, AssignmentConfigRequest, AssignmentMap, AssignmentResult,
    Attendance, CommanderCandidate, Flight, Pilot, QualificationRanking, Squadron, SquadronDirectory,
};
use crate::assignment::channels::apply_channels;
use crate::config::ServerConfig;
use crate::parser::read_pilots;

/// Pilots, flights and squadrons as last uploaded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    pub pilots: Vec<Pilot>,
    pub flights: Vec<Flight>,
    pub squadrons: Vec<Squadron>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredAssignment {
    pub generated_at: DateTime<Utc>,
    pub config: AssignmentConfig,
    pub result: AssignmentResult,
    pub mission_commander: Option<CommanderCandidate>,
}

// In-memory storage; persistence belongs to the surrounding application
pub struct AppState {
    pub roster: Mutex<Roster>,
    pub assignment: Mutex<Option<StoredAssignment>>,
    pub admin_password: String,
}

impl AppState {
    pub fn new(admin_password: String) -> Self {
        AppState {
            roster: Mutex::new(Roster::default()),
            assignment: Mutex::new(None),
            admin_password,
        }
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

#[derive(Deserialize)]
pub struct CreateFlightRequest {
    callsign: String,
    flight_number: Option<u32>,
}

#[derive(Deserialize)]
pub struct CommanderRequest {
    pilot_id: String,
}

#[derive(Serialize, Default)]
pub struct SquadronStats {
    accepted: u32,
    tentative: u32,
    declined: u32,
    no_response: u32,
    by_qualification: BTreeMap<String, u32>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    squadrons: BTreeMap<String, SquadronStats>,
}

const UNAFFILIATED: &str = "unaffiliated";

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| actix_web::error::ErrorInternalServerError("state lock poisoned"))
}

fn is_admin(req: &HttpRequest, state: &AppState) -> bool {
    req.headers()
        .get("X-Admin-Password")
        .and_then(|v| v.to_str().ok())
        .map(|password| password == state.admin_password)
        .unwrap_or(false)
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Unauthorized"}))
}

fn bad_request(error: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({"success": false, "error": error.to_string()}))
}

fn no_assignment() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({"error": "No assignment available"}))
}

// Admin login endpoint
async fn admin_login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.password == state.admin_password {
        Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
    } else {
        Ok(HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Invalid password"})))
    }
}

// Replace the whole roster
async fn upload_roster(
    req: HttpRequest,
    body: web::Json<Roster>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized());
    }
    let roster = body.into_inner();
    info!(
        pilots = roster.pilots.len(),
        flights = roster.flights.len(),
        squadrons = roster.squadrons.len(),
        "roster uploaded"
    );
    *lock(&state.roster)? = roster;
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

// Replace pilots from a CSV export
async fn upload_pilots(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized());
    }
    match read_pilots(&body[..]) {
        Ok(pilots) => {
            let count = pilots.len();
            lock(&state.roster)?.pilots = pilots;
            info!(pilots = count, "pilot roster uploaded");
            Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "pilots": count})))
        }
        Err(e) => Ok(bad_request(format!("Failed to process CSV: {}", e))),
    }
}

// Create a flight and allocate its channels while holding the roster lock
async fn create_flight(
    req: HttpRequest,
    body: web::Json<CreateFlightRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized());
    }
    let callsign = body.callsign.trim().to_uppercase();
    if callsign.is_empty() {
        return Ok(bad_request("Callsign is required"));
    }

    let mut roster = lock(&state.roster)?;
    let flight_number = body.flight_number.unwrap_or_else(|| {
        roster
            .flights
            .iter()
            .filter(|f| f.callsign.eq_ignore_ascii_case(&callsign))
            .map(|f| f.flight_number)
            .max()
            .unwrap_or(0)
            .saturating_add(1)
    });
    let id = format!("{}-{}", callsign.to_lowercase(), flight_number);
    if roster.flights.iter().any(|f| f.id == id) {
        return Ok(HttpResponse::Conflict().json(serde_json::json!({
            "success": false,
            "error": format!("Flight {} {} already exists", callsign, flight_number)
        })));
    }

    let channels = match allocate_channels(&used_channels(&roster.flights)) {
        Ok(channels) => channels,
        Err(e) => {
            warn!(callsign = %callsign, "channel space exhausted");
            return Ok(HttpResponse::Conflict().json(serde_json::json!({"success": false, "error": e.to_string()})));
        }
    };

    let mut flight = Flight::new(&id, &callsign, flight_number);
    flight.channel_primary = channels.primary;
    flight.channel_secondary = channels.secondary;
    flight.creation_order = roster
        .flights
        .iter()
        .map(|f| f.creation_order.saturating_add(1))
        .max()
        .unwrap_or(0);
    roster.flights.push(flight.clone());

    info!(flight = %flight.display_name(), primary = channels.primary, secondary = channels.secondary, "flight created");
    Ok(HttpResponse::Ok().json(flight))
}

async fn renumber(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized());
    }
    let mut roster = lock(&state.roster)?;
    match renumber_channels(&roster.flights) {
        Ok(pairs) => {
            apply_channels(&mut roster.flights, &pairs);
            Ok(HttpResponse::Ok().json(&roster.flights))
        }
        Err(e) => Ok(HttpResponse::Conflict().json(serde_json::json!({"success": false, "error": e.to_string()}))),
    }
}

/// Runs the engine against the roster. Existing placements are the slots carried on its flights.
fn run_assignment(roster: &Roster, config: &AssignmentConfig) -> AssignmentResult {
    let directory = SquadronDirectory::new(&roster.squadrons);
    let existing = AssignmentMap::from_flights(&roster.flights);
    assign(&roster.flights, &roster.pilots, &existing, &directory, config)
}

// Compute an assignment without storing it
async fn preview_assignment(
    req: HttpRequest,
    body: web::Json<AssignmentConfigRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized());
    }
    let config = match validate_config(&body) {
        Ok(config) => config,
        Err(e) => return Ok(bad_request(e)),
    };
    let result = run_assignment(&*lock(&state.roster)?, &config);
    Ok(HttpResponse::Ok().json(result))
}

// Compute and store an assignment, writing its placements onto the roster's flights.
// Locks are taken assignment first, then roster.
async fn commit_assignment(
    req: HttpRequest,
    body: web::Json<AssignmentConfigRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized());
    }
    let config = match validate_config(&body) {
        Ok(config) => config,
        Err(e) => return Ok(bad_request(e)),
    };

    let mut assignment = lock(&state.assignment)?;
    let mut roster = lock(&state.roster)?;
    let result = run_assignment(&roster, &config);
    result.assignments.write_to(&mut roster.flights);

    let stored = StoredAssignment {
        generated_at: Utc::now(),
        config,
        mission_commander: result.suggested_commander.clone(),
        result,
    };
    *assignment = Some(stored.clone());
    info!(placed = stored.result.assignments.total_placements(), "assignment committed");
    Ok(HttpResponse::Ok().json(stored))
}

async fn get_assignment(state: web::Data<AppState>) -> Result<HttpResponse> {
    let assignment = lock(&state.assignment)?;
    match &*assignment {
        Some(stored) => Ok(HttpResponse::Ok().json(stored)),
        None => Ok(no_assignment()),
    }
}

/// Candidates of the stored assignment. The caller holds the assignment lock.
fn current_candidates(state: &AppState, stored: &StoredAssignment) -> Result<Vec<CommanderCandidate>> {
    let roster = lock(&state.roster)?;
    Ok(commander_candidates(&roster.flights, &stored.result.assignments))
}

async fn get_commanders(state: web::Data<AppState>) -> Result<HttpResponse> {
    let assignment = lock(&state.assignment)?;
    match &*assignment {
        Some(stored) => Ok(HttpResponse::Ok().json(current_candidates(&state, stored)?)),
        None => Ok(no_assignment()),
    }
}

async fn choose_commander(
    req: HttpRequest,
    body: web::Json<CommanderRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized());
    }
    let mut assignment = lock(&state.assignment)?;
    let Some(stored) = assignment.as_mut() else {
        return Ok(no_assignment());
    };
    let candidates = current_candidates(&state, stored)?;
    let Some(chosen) = select_commander(&candidates, &body.pilot_id) else {
        return Ok(bad_request(format!("Pilot {} is not a flight or section lead", body.pilot_id)));
    };
    stored.mission_commander = Some(chosen.clone());
    Ok(HttpResponse::Ok().json(chosen))
}

// Attendance and qualification counts per squadron
async fn get_stats(state: web::Data<AppState>) -> Result<HttpResponse> {
    let roster = lock(&state.roster)?;
    let mut squadrons: BTreeMap<String, SquadronStats> = BTreeMap::new();

    for pilot in &roster.pilots {
        let key = pilot.squadron_id.clone().unwrap_or_else(|| UNAFFILIATED.to_string());
        let stats = squadrons.entry(key).or_default();
        match pilot.attendance {
            Attendance::Accepted => stats.accepted += 1,
            Attendance::Tentative => stats.tentative += 1,
            Attendance::Declined => stats.declined += 1,
            Attendance::NoResponse => stats.no_response += 1,
        }
    }

    for (qualification, members) in group_by_highest(&roster.pilots, &QualificationRanking::default()) {
        for pilot in members {
            let key = pilot.squadron_id.as_deref().unwrap_or(UNAFFILIATED);
            if let Some(stats) = squadrons.get_mut(key) {
                *stats.by_qualification.entry(qualification.label().to_string()).or_insert(0) += 1;
            }
        }
    }

    Ok(HttpResponse::Ok().json(StatsResponse { squadrons }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/login", web::post().to(admin_login))
        .route("/api/roster", web::post().to(upload_roster))
        .route("/api/roster/pilots", web::post().to(upload_pilots))
        .route("/api/flights", web::post().to(create_flight))
        .route("/api/channels/renumber", web::post().to(renumber))
        .route("/api/assign/preview", web::post().to(preview_assignment))
        .route("/api/assign", web::post().to(commit_assignment))
        .route("/api/assignment", web::get().to(get_assignment))
        .route("/api/commanders", web::get().to(get_commanders))
        .route("/api/commander", web::post().to(choose_commander))
        .route("/api/stats", web::get().to(get_stats));
}

pub async fn start_server(config: ServerConfig) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(config.admin_password));

    info!(port = config.port, "starting web server");
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
