//! Data structures for the league: players, matches, backups, and the league snapshot.

mod backup;
mod game;
mod league;
mod player;

pub use backup::{Backup, BackupData, BackupId};
pub use game::{GameMatch, MatchId, Pair, Team};
pub use league::{session_dates, League, LeagueError};
pub use player::{pack_name, split_name, Player, PlayerId, MARKER_PALETTE};
