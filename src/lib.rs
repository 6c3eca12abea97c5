//! Badminton club league: library with models and league computations.

pub mod config;
pub mod export;
pub mod logic;
pub mod models;
pub mod store;

pub use logic::{
    attendance_streak, compute_standings, draw_session_matches, evaluate_achievements, Achievement,
    AchievementId, RankedPlayer, SessionState,
};
pub use models::{
    Backup, BackupId, GameMatch, League, LeagueError, MatchId, Pair, Player, PlayerId, Team,
};
