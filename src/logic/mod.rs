//! League computations: badges, standings, session draw, and attendance.

mod achievements;
mod attendance;
mod draw;
mod standings;

pub use achievements::{
    attendance_streak, evaluate_achievements, find_rival, Achievement, AchievementId, MIN_MATCHES,
    RIVAL_NAME_FRAGMENT,
};
pub use attendance::SessionState;
pub use draw::{
    draw_session_matches, rank_present, teammate_key, teammate_pairs, TeammatePair, DRAW_ROUNDS,
    MIN_PRESENT_PLAYERS,
};
pub use standings::{compare_labels, compute_standings, win_rate, RankedPlayer, POINTS_PER_LOSS, POINTS_PER_WIN};
