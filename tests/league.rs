//! Integration tests for league administration, names, persistence, config, and CSV export.

use badminton_club::config::AppConfig;
use badminton_club::export::standings_csv;
use badminton_club::models::{split_name, MARKER_PALETTE};
use badminton_club::store::LeagueWriter;
use badminton_club::{compute_standings, store, GameMatch, League, LeagueError, Player, Team};
use chrono::NaiveDate;
use std::collections::HashMap;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
}

fn ids(list: [&str; 2]) -> [String; 2] {
    list.map(String::from)
}

fn league_with(labels: &[&str]) -> League {
    let mut league = League::new();
    for label in labels {
        league.add_player(label, Some("🏸")).unwrap();
    }
    league
}

fn player_id(league: &League, label: &str) -> String {
    league
        .players
        .iter()
        .find(|p| p.label() == label)
        .map(|p| p.id.clone())
        .unwrap()
}

#[test]
fn add_player_packs_marker_and_label() {
    let mut league = League::new();
    let p = league.add_player("  Anna  ", Some("🐯")).unwrap().clone();
    assert_eq!(p.name, "🐯 Anna");
    assert_eq!(p.marker(), Some("🐯"));
    assert_eq!(p.label(), "Anna");
}

#[test]
fn add_player_without_marker_picks_from_palette() {
    let mut league = League::new();
    let p = league.add_player("Anna", None).unwrap().clone();
    let marker = p.marker().unwrap();
    assert!(MARKER_PALETTE.contains(&marker));
    assert_eq!(p.label(), "Anna");
}

#[test]
fn add_player_rejects_empty_name() {
    let mut league = League::new();
    assert_eq!(league.add_player("   ", None).unwrap_err(), LeagueError::EmptyName);
    assert!(league.players.is_empty());
}

#[test]
fn names_without_marker_stay_whole() {
    assert_eq!(split_name("Anna Kowalska"), (None, "Anna Kowalska"));
    assert_eq!(split_name("Anna"), (None, "Anna"));
    assert_eq!(split_name("🦊 Anna Kowalska"), (Some("🦊"), "Anna Kowalska"));
    assert_eq!(split_name("42 Anna"), (None, "42 Anna"));
    let plain = Player {
        id: "x".to_string(),
        name: "Bogdan".to_string(),
    };
    assert_eq!(plain.marker(), None);
    assert_eq!(plain.label(), "Bogdan");
}

#[test]
fn keycap_markers_are_split_off() {
    assert_eq!(split_name("1️⃣ Anna"), (Some("1️⃣"), "Anna"));
    assert_eq!(split_name("#️⃣ Bogdan"), (Some("#️⃣"), "Bogdan"));
    let mut league = League::new();
    let p = league.add_player("Anna", Some("1️⃣")).unwrap().clone();
    assert_eq!(p.label(), "Anna");
    assert_eq!(p.marker(), Some("1️⃣"));
}

#[test]
fn set_marker_keeps_label() {
    let mut league = league_with(&["Anna"]);
    let id = player_id(&league, "Anna");
    league.set_marker(&id, "🐙").unwrap();
    assert_eq!(league.player(&id).unwrap().name, "🐙 Anna");
    assert!(matches!(
        league.set_marker("missing", "🐙"),
        Err(LeagueError::PlayerNotFound(_))
    ));
}

#[test]
fn removing_a_player_cascades_to_their_matches() {
    let mut league = league_with(&["A", "B", "C", "D", "E"]);
    let [a, b, c, d, e] = ["A", "B", "C", "D", "E"].map(|l| player_id(&league, l));
    league
        .add_match(day(1), [a.clone(), b.clone()], [c.clone(), d.clone()])
        .unwrap();
    league
        .add_match(day(1), [b.clone(), c.clone()], [d.clone(), e.clone()])
        .unwrap();

    league.remove_player(&a).unwrap();
    assert_eq!(league.players.len(), 4);
    assert_eq!(league.matches.len(), 1);
    assert!(!league.matches[0].involves(&a));
}

#[test]
fn batch_with_an_invalid_match_is_rejected_whole() {
    let mut league = League::new();
    let good = GameMatch::new(day(1), ids(["a", "b"]), ids(["c", "d"]));
    let same_side = GameMatch::new(day(1), ids(["a", "a"]), ids(["c", "d"]));
    let both_sides = GameMatch::new(day(1), ids(["a", "b"]), ids(["b", "d"]));
    assert_eq!(
        league.add_matches(vec![good.clone(), same_side]),
        Err(LeagueError::InvalidTeams)
    );
    assert_eq!(
        league.add_matches(vec![good.clone(), both_sides]),
        Err(LeagueError::InvalidTeams)
    );
    assert!(league.matches.is_empty());
    league.add_matches(vec![good]).unwrap();
    assert_eq!(league.matches.len(), 1);
}

#[test]
fn winner_can_be_set_and_cleared() {
    let mut league = League::new();
    let id = league
        .add_match(day(1), ids(["a", "b"]), ids(["c", "d"]))
        .unwrap()
        .id
        .clone();
    league.set_winner(&id, Some(Team::B)).unwrap();
    assert_eq!(league.game(&id).unwrap().winner, Some(Team::B));
    assert_eq!(league.game(&id).unwrap().won_by("c"), Some(true));
    league.set_winner(&id, None).unwrap();
    assert!(!league.game(&id).unwrap().is_finished());
    assert_eq!(
        league.set_winner("nope", Some(Team::A)),
        Err(LeagueError::MatchNotFound("nope".to_string()))
    );
    league.remove_match(&id).unwrap();
    assert!(league.matches.is_empty());
}

#[test]
fn restore_overwrites_players_and_matches_but_keeps_backups() {
    let mut league = league_with(&["A", "B"]);
    league
        .add_match(day(1), ids(["a", "b"]), ids(["c", "d"]))
        .unwrap();
    let backup_id = league.create_backup(Some(" before cleanup ".to_string())).id.clone();
    assert_eq!(league.backups[0].note.as_deref(), Some("before cleanup"));

    league.players.clear();
    league.matches.clear();
    league.create_backup(None);

    league.restore_backup(&backup_id).unwrap();
    assert_eq!(league.players.len(), 2);
    assert_eq!(league.matches.len(), 1);
    assert_eq!(league.backups.len(), 2);
}

#[test]
fn restoring_a_missing_backup_changes_nothing() {
    let mut league = league_with(&["A"]);
    let before = league.clone();
    assert!(matches!(
        league.restore_backup("missing"),
        Err(LeagueError::BackupNotFound(_))
    ));
    assert_eq!(league, before);
}

#[test]
fn session_dates_are_distinct_and_sorted() {
    let mut league = League::new();
    for d in [8, 1, 8, 15, 1] {
        league
            .add_match(day(d), ids(["a", "b"]), ids(["c", "d"]))
            .unwrap();
    }
    assert_eq!(league.session_dates(), vec![day(1), day(8), day(15)]);
}

#[test]
fn match_json_matches_the_stored_document_shape() {
    let mut m = GameMatch::new(day(5), ids(["a", "b"]), ids(["c", "d"]));
    m.winner = Some(Team::A);
    let json = serde_json::to_value(&m).unwrap();
    assert_eq!(json["date"], "2024-09-05");
    assert_eq!(json["teamA"], serde_json::json!(["a", "b"]));
    assert_eq!(json["winner"], "A");

    let pending: GameMatch = serde_json::from_str(
        r#"{"id":"m1","date":"2024-09-05","teamA":["a","b"],"teamB":["c","d"]}"#,
    )
    .unwrap();
    assert_eq!(pending.winner, None);
}

#[test]
fn partial_league_document_loads_with_defaults() {
    let league: League = serde_json::from_str(r#"{"players":[{"id":"p","name":"🏸 P"}]}"#).unwrap();
    assert_eq!(league.players.len(), 1);
    assert!(league.matches.is_empty());
    assert!(league.backups.is_empty());
    assert_eq!(league.title, None);
}

#[tokio::test]
async fn store_round_trips_through_a_file() {
    let path = std::env::temp_dir().join(format!("league-{}.json", uuid::Uuid::new_v4()));
    assert_eq!(store::load_league(&path).unwrap(), League::new());

    let mut league = league_with(&["A", "B"]);
    league.set_title(Some("Wednesday Shuttlers".to_string()));
    store::save_league(&path, &league).await.unwrap();
    assert_eq!(store::load_league(&path).unwrap(), league);

    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn writer_keeps_the_newest_generation_on_disk() {
    let path = std::env::temp_dir().join(format!("league-{}.json", uuid::Uuid::new_v4()));
    let writer = LeagueWriter::new(&path);

    let mut older = league_with(&["A"]);
    older.set_title(Some("older".to_string()));
    let mut newer = older.clone();
    newer.set_title(Some("newer".to_string()));

    // The newer snapshot lands first; the older one finishing later must not overwrite it.
    assert!(writer.save(2, &newer).await.unwrap());
    assert!(!writer.save(1, &older).await.unwrap());
    assert!(!writer.save(2, &older).await.unwrap());
    assert_eq!(store::load_league(&path).unwrap(), newer);

    newer.set_title(Some("newest".to_string()));
    assert!(writer.save(3, &newer).await.unwrap());
    assert_eq!(store::load_league(&path).unwrap().title.as_deref(), Some("newest"));

    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn concurrent_saves_leave_a_complete_file() {
    let path = std::env::temp_dir().join(format!("league-{}.json", uuid::Uuid::new_v4()));
    let first = league_with(&["A", "B"]);
    let second = league_with(&["C"]);
    let (a, b) = tokio::join!(
        store::save_league(&path, &first),
        store::save_league(&path, &second)
    );
    a.unwrap();
    b.unwrap();
    let loaded = store::load_league(&path).unwrap();
    assert!(loaded == first || loaded == second);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn config_uses_defaults_for_missing_or_bad_values() {
    let config = AppConfig::from_lookup(|_| None);
    assert_eq!(config, AppConfig::default());
    assert!(config.uses_default_password());

    let vars: HashMap<&str, &str> = [
        ("HOST", "127.0.0.1"),
        ("PORT", "not-a-port"),
        ("ADMIN_PASSWORD", "s3cret"),
        ("DATA_FILE", "/tmp/club.json"),
    ]
    .into_iter()
    .collect();
    let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
    assert_eq!(config.admin_password, "s3cret");
    assert_eq!(config.data_file, std::path::PathBuf::from("/tmp/club.json"));
    assert!(!config.uses_default_password());
}

#[test]
fn csv_export_lists_rank_and_points() {
    let players = vec![
        Player {
            id: "a".to_string(),
            name: "🏸 Ania".to_string(),
        },
        Player {
            id: "b".to_string(),
            name: "🦊 Bartek".to_string(),
        },
    ];
    let mut m = GameMatch::new(day(1), ids(["b", "x"]), ids(["a", "y"]));
    m.winner = Some(Team::A);
    let csv = standings_csv(&compute_standings(&players, &[m])).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "rank,name,points,base,bonus,wins,losses,matches,win_rate,qualified"
    );
    assert_eq!(lines[1], "1,Bartek,3,3,0,1,0,1,100,false");
    assert_eq!(lines[2], "2,Ania,1,1,0,0,1,1,0,false");
}
