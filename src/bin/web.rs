//! Single binary web server: league snapshot, standings, badges, and session draws via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT, ADMIN_PASSWORD, DATA_FILE.

use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use badminton_club::{
    compute_standings,
    config::AppConfig,
    evaluate_achievements,
    export::standings_csv,
    store::{self, LeagueWriter},
    GameMatch, League, LeagueError, Pair, SessionState, Team,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Everything the server holds in memory: the league document and the live session.
struct ClubState {
    league: League,
    session: SessionState,
    /// Bumped on every league mutation; orders snapshots for the writer.
    generation: u64,
}

impl ClubState {
    fn snapshot(&mut self) -> (u64, League) {
        self.generation += 1;
        (self.generation, self.league.clone())
    }
}

type AppState = Data<RwLock<ClubState>>;
type Config = Data<AppConfig>;
type Writer = Data<LeagueWriter>;

const ADMIN_KEY: &str = "admin";

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
struct MeResponse {
    admin: bool,
}

#[derive(Serialize)]
struct DrawResponse {
    ok: bool,
    message: String,
    matches: Vec<GameMatch>,
}

#[derive(Deserialize)]
struct LoginBody {
    password: String,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
    #[serde(default)]
    marker: Option<String>,
}

#[derive(Deserialize)]
struct MarkerBody {
    marker: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddMatchBody {
    date: NaiveDate,
    team_a: Pair,
    team_b: Pair,
}

#[derive(Deserialize)]
struct SetWinnerBody {
    winner: Option<Team>,
}

#[derive(Deserialize)]
struct TitleBody {
    title: Option<String>,
}

#[derive(Deserialize)]
struct BackupBody {
    #[serde(default)]
    note: Option<String>,
}

#[derive(Deserialize)]
struct SessionDateBody {
    date: NaiveDate,
}

#[derive(Deserialize)]
struct IdPath {
    id: String,
}

fn is_admin(session: &Session) -> bool {
    session.get::<bool>(ADMIN_KEY).ok().flatten().unwrap_or(false)
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({ "error": "Admin login required" }))
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

fn league_error(e: &LeagueError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    if e.is_not_found() {
        HttpResponse::NotFound().json(body)
    } else {
        HttpResponse::BadRequest().json(body)
    }
}

/// Run a mutation under the write lock and hand back a numbered snapshot of the league to persist.
fn apply<T>(
    state: &AppState,
    f: impl FnOnce(&mut ClubState) -> Result<T, LeagueError>,
) -> Result<(u64, League), HttpResponse> {
    let mut g = state.write().map_err(|_| lock_error())?;
    f(&mut *g).map_err(|e| league_error(&e))?;
    Ok(g.snapshot())
}

/// Write the snapshot to disk. Failures are logged; the in-memory state stays authoritative.
async fn persist(writer: &LeagueWriter, generation: u64, league: &League) {
    if let Err(e) = writer.save(generation, league).await {
        log::error!("Saving {} failed: {}", writer.path().display(), e);
    }
}

/// Mutate, persist, and answer with the whole league.
async fn mutate<T>(
    state: &AppState,
    writer: &LeagueWriter,
    session: &Session,
    f: impl FnOnce(&mut ClubState) -> Result<T, LeagueError>,
) -> HttpResponse {
    if !is_admin(session) {
        return unauthorized();
    }
    match apply(state, f) {
        Ok((generation, league)) => {
            persist(writer, generation, &league).await;
            HttpResponse::Ok().json(&league)
        }
        Err(resp) => resp,
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "badminton-club",
    })
}

#[post("/api/login")]
async fn api_login(config: Config, session: Session, body: Json<LoginBody>) -> HttpResponse {
    if body.password != config.admin_password {
        log::warn!("Rejected admin login");
        return unauthorized();
    }
    match session.insert(ADMIN_KEY, true) {
        Ok(()) => HttpResponse::Ok().json(MeResponse { admin: true }),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

#[post("/api/logout")]
async fn api_logout(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::Ok().json(MeResponse { admin: false })
}

#[get("/api/me")]
async fn api_me(session: Session) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse {
        admin: is_admin(&session),
    })
}

#[get("/api/league")]
async fn api_get_league(state: AppState) -> HttpResponse {
    match state.read() {
        Ok(g) => HttpResponse::Ok().json(&g.league),
        Err(_) => lock_error(),
    }
}

#[get("/api/standings")]
async fn api_standings(state: AppState) -> HttpResponse {
    match state.read() {
        Ok(g) => HttpResponse::Ok().json(compute_standings(&g.league.players, &g.league.matches)),
        Err(_) => lock_error(),
    }
}

#[get("/api/standings.csv")]
async fn api_standings_csv(state: AppState) -> HttpResponse {
    let table = match state.read() {
        Ok(g) => compute_standings(&g.league.players, &g.league.matches),
        Err(_) => return lock_error(),
    };
    match standings_csv(&table) {
        Ok(text) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(text),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

#[get("/api/players/{id}/achievements")]
async fn api_player_achievements(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    if g.league.player(&path.id).is_none() {
        return league_error(&LeagueError::PlayerNotFound(path.id.clone()));
    }
    HttpResponse::Ok().json(evaluate_achievements(&path.id, &g.league.matches, &g.league.players))
}

#[post("/api/players")]
async fn api_add_player(state: AppState, writer: Writer, session: Session, body: Json<AddPlayerBody>) -> HttpResponse {
    mutate(&state, &writer, &session, |s| {
        s.league
            .add_player(&body.name, body.marker.as_deref())
            .map(|_| ())
    })
    .await
}

#[put("/api/players/{id}/marker")]
async fn api_set_marker(
    state: AppState,
    writer: Writer,
    session: Session,
    path: Path<IdPath>,
    body: Json<MarkerBody>,
) -> HttpResponse {
    mutate(&state, &writer, &session, |s| s.league.set_marker(&path.id, &body.marker)).await
}

/// Remove a player; their matches go with them.
#[delete("/api/players/{id}")]
async fn api_remove_player(state: AppState, writer: Writer, session: Session, path: Path<IdPath>) -> HttpResponse {
    mutate(&state, &writer, &session, |s| {
        s.league.remove_player(&path.id)?;
        s.session.present.retain(|p| *p != path.id);
        Ok(())
    })
    .await
}

#[post("/api/matches")]
async fn api_add_match(state: AppState, writer: Writer, session: Session, body: Json<AddMatchBody>) -> HttpResponse {
    let body = body.into_inner();
    mutate(&state, &writer, &session, |s| {
        for id in body.team_a.iter().chain(body.team_b.iter()) {
            if s.league.player(id).is_none() {
                return Err(LeagueError::PlayerNotFound(id.clone()));
            }
        }
        s.league
            .add_match(body.date, body.team_a, body.team_b)
            .map(|_| ())
    })
    .await
}

#[put("/api/matches/{id}/winner")]
async fn api_set_winner(
    state: AppState,
    writer: Writer,
    session: Session,
    path: Path<IdPath>,
    body: Json<SetWinnerBody>,
) -> HttpResponse {
    mutate(&state, &writer, &session, |s| s.league.set_winner(&path.id, body.winner)).await
}

#[delete("/api/matches/{id}")]
async fn api_remove_match(state: AppState, writer: Writer, session: Session, path: Path<IdPath>) -> HttpResponse {
    mutate(&state, &writer, &session, |s| s.league.remove_match(&path.id).map(|_| ())).await
}

#[put("/api/title")]
async fn api_set_title(state: AppState, writer: Writer, session: Session, body: Json<TitleBody>) -> HttpResponse {
    let title = body.into_inner().title;
    mutate(&state, &writer, &session, |s| {
        s.league.set_title(title);
        Ok(())
    })
    .await
}

#[post("/api/backups")]
async fn api_create_backup(
    state: AppState,
    writer: Writer,
    session: Session,
    body: Option<Json<BackupBody>>,
) -> HttpResponse {
    let note = body.and_then(|b| b.into_inner().note);
    mutate(&state, &writer, &session, |s| {
        let backup = s.league.create_backup(note);
        log::info!("Created backup {}", backup.id);
        Ok(())
    })
    .await
}

#[post("/api/backups/{id}/restore")]
async fn api_restore_backup(state: AppState, writer: Writer, session: Session, path: Path<IdPath>) -> HttpResponse {
    mutate(&state, &writer, &session, |s| s.league.restore_backup(&path.id)).await
}

#[get("/api/session")]
async fn api_get_session(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(serde_json::json!({
        "date": g.session.date,
        "present": g.session.present_in_roster_order(&g.league.players),
        "playedToday": g.session.played_today(&g.league.matches),
        "sessionDates": g.league.session_dates(),
    }))
}

#[put("/api/session/date")]
async fn api_set_session_date(state: AppState, session: Session, body: Json<SessionDateBody>) -> HttpResponse {
    if !is_admin(&session) {
        return unauthorized();
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    g.session.select_date(body.date);
    HttpResponse::Ok().json(&g.session)
}

#[post("/api/session/present/{id}")]
async fn api_toggle_present(state: AppState, session: Session, path: Path<IdPath>) -> HttpResponse {
    if !is_admin(&session) {
        return unauthorized();
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    if g.league.player(&path.id).is_none() {
        return league_error(&LeagueError::PlayerNotFound(path.id.clone()));
    }
    g.session.toggle_present(&path.id);
    HttpResponse::Ok().json(&g.session)
}

/// Draw three rounds for the present players and append them to the history in one batch.
/// An impossible draw is reported with `ok: false` and changes nothing.
#[post("/api/session/draw")]
async fn api_draw(state: AppState, writer: Writer, session: Session) -> HttpResponse {
    if !is_admin(&session) {
        return unauthorized();
    }
    let outcome = {
        let mut g = match state.write() {
            Ok(guard) => guard,
            Err(_) => return lock_error(),
        };
        match g.session.draw(&g.league) {
            Ok(drawn) => match g.league.add_matches(drawn.clone()) {
                Ok(()) => Ok((drawn, g.snapshot())),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        }
    };
    match outcome {
        Ok((drawn, (generation, league))) => {
            persist(&writer, generation, &league).await;
            HttpResponse::Ok().json(DrawResponse {
                ok: true,
                message: format!("Drew {} match(es)", drawn.len()),
                matches: drawn,
            })
        }
        Err(e) => {
            log::info!("Draw not possible: {}", e);
            HttpResponse::Ok().json(DrawResponse {
                ok: false,
                message: e.to_string(),
                matches: Vec::new(),
            })
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env();
    if config.uses_default_password() {
        log::warn!("ADMIN_PASSWORD not set, using the default password");
    }
    let league = store::load_league(&config.data_file)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    log::info!(
        "Loaded league from {}: {} players, {} matches, {} backups",
        config.data_file.display(),
        league.players.len(),
        league.matches.len(),
        league.backups.len()
    );

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(ClubState {
        league,
        session: SessionState::new(Local::now().date_naive()),
        generation: 0,
    }));
    let writer = Data::new(LeagueWriter::new(config.data_file.clone()));
    let config = Data::new(config);
    let key = Key::generate();

    HttpServer::new(move || {
        App::new()
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .app_data(state.clone())
            .app_data(config.clone())
            .app_data(writer.clone())
            .service(api_health)
            .service(api_login)
            .service(api_logout)
            .service(api_me)
            .service(api_get_league)
            .service(api_standings)
            .service(api_standings_csv)
            .service(api_player_achievements)
            .service(api_add_player)
            .service(api_set_marker)
            .service(api_remove_player)
            .service(api_add_match)
            .service(api_set_winner)
            .service(api_remove_match)
            .service(api_set_title)
            .service(api_create_backup)
            .service(api_restore_backup)
            .service(api_get_session)
            .service(api_set_session_date)
            .service(api_toggle_present)
            .service(api_draw)
    })
    .bind(bind)?
    .run()
    .await
}
