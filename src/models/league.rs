//! League snapshot: roster, match history, backup log, and the admin actions on them.

use crate::models::backup::{Backup, BackupData, BackupId};
use crate::models::game::{GameMatch, MatchId, Pair, Team};
use crate::models::player::{pack_name, Player, PlayerId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Errors that can occur during league operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LeagueError {
    /// Player label is empty after trimming.
    EmptyName,
    /// No player with this id in the roster.
    PlayerNotFound(PlayerId),
    /// No match with this id in the history.
    MatchNotFound(MatchId),
    /// No backup with this id in the log.
    BackupNotFound(BackupId),
    /// A side does not hold two different players, or a player is on both sides.
    InvalidTeams,
    /// Fewer than 4 players are marked present for the draw.
    NotEnoughPlayers { present: usize },
    /// Pairing produced no match at all.
    NoBalancedDraw,
}

impl LeagueError {
    /// True for the lookup failures (mapped to 404 by the web layer).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LeagueError::PlayerNotFound(_) | LeagueError::MatchNotFound(_) | LeagueError::BackupNotFound(_)
        )
    }
}

impl std::fmt::Display for LeagueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeagueError::EmptyName => write!(f, "Player name cannot be empty"),
            LeagueError::PlayerNotFound(_) => write!(f, "Player not found"),
            LeagueError::MatchNotFound(_) => write!(f, "Match not found"),
            LeagueError::BackupNotFound(_) => write!(f, "Backup not found"),
            LeagueError::InvalidTeams => {
                write!(f, "Each team needs two different players and no player can be on both teams")
            }
            LeagueError::NotEnoughPlayers { present } => {
                write!(f, "Need at least 4 present players to draw matches (present: {})", present)
            }
            LeagueError::NoBalancedDraw => write!(f, "No balanced draw possible"),
        }
    }
}

impl std::error::Error for LeagueError {}

/// Full league document: the aggregate root the store persists.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct League {
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub matches: Vec<GameMatch>,
    #[serde(default)]
    pub backups: Vec<Backup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl League {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_players(players: Vec<Player>) -> Self {
        Self {
            players,
            ..Self::new()
        }
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn game(&self, id: &str) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    /// Add a player. Without a marker, one is picked at random from the palette.
    pub fn add_player(&mut self, label: &str, marker: Option<&str>) -> Result<&Player, LeagueError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(LeagueError::EmptyName);
        }
        let player = match marker.map(str::trim).filter(|m| !m.is_empty()) {
            Some(marker) => Player::new(marker, label),
            None => Player::with_random_marker(label),
        };
        log::info!("Added player {} ({})", player.name, player.id);
        self.players.push(player);
        Ok(&self.players[self.players.len() - 1])
    }

    /// Change a player's marker; the label stays.
    pub fn set_marker(&mut self, player_id: &str, marker: &str) -> Result<(), LeagueError> {
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or_else(|| LeagueError::PlayerNotFound(player_id.to_string()))?;
        if marker.trim().is_empty() {
            player.name = pack_name("", player.label());
        } else {
            player.set_marker(marker);
        }
        Ok(())
    }

    /// Remove a player and every match they appear in.
    pub fn remove_player(&mut self, player_id: &str) -> Result<Player, LeagueError> {
        let idx = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or_else(|| LeagueError::PlayerNotFound(player_id.to_string()))?;
        let removed = self.players.remove(idx);
        let before = self.matches.len();
        self.matches.retain(|m| !m.involves(player_id));
        log::info!(
            "Removed player {} and {} of their match(es)",
            removed.name,
            before - self.matches.len()
        );
        Ok(removed)
    }

    /// Create a match without a result.
    pub fn add_match(
        &mut self,
        date: NaiveDate,
        team_a: Pair,
        team_b: Pair,
    ) -> Result<&GameMatch, LeagueError> {
        self.add_matches(vec![GameMatch::new(date, team_a, team_b)])?;
        Ok(&self.matches[self.matches.len() - 1])
    }

    /// Append a batch of matches. One invalid match rejects the whole batch.
    pub fn add_matches(&mut self, batch: Vec<GameMatch>) -> Result<(), LeagueError> {
        if batch.iter().any(|m| !m.has_valid_teams()) {
            return Err(LeagueError::InvalidTeams);
        }
        log::info!("Appending {} match(es)", batch.len());
        self.matches.extend(batch);
        Ok(())
    }

    /// Record (or clear, with `None`) the result of a match.
    pub fn set_winner(&mut self, match_id: &str, winner: Option<Team>) -> Result<(), LeagueError> {
        let m = self
            .matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| LeagueError::MatchNotFound(match_id.to_string()))?;
        m.winner = winner;
        Ok(())
    }

    pub fn remove_match(&mut self, match_id: &str) -> Result<GameMatch, LeagueError> {
        let idx = self
            .matches
            .iter()
            .position(|m| m.id == match_id)
            .ok_or_else(|| LeagueError::MatchNotFound(match_id.to_string()))?;
        Ok(self.matches.remove(idx))
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
    }

    /// Snapshot players and matches into the backup log.
    pub fn create_backup(&mut self, note: Option<String>) -> &Backup {
        let data = BackupData {
            players: self.players.clone(),
            matches: self.matches.clone(),
        };
        let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        self.backups.push(Backup::new(data, note));
        &self.backups[self.backups.len() - 1]
    }

    /// Overwrite players and matches from a backup. The backup log itself is kept as is.
    pub fn restore_backup(&mut self, backup_id: &str) -> Result<(), LeagueError> {
        let backup = self
            .backups
            .iter()
            .find(|b| b.id == backup_id)
            .ok_or_else(|| LeagueError::BackupNotFound(backup_id.to_string()))?;
        let data = backup.data.clone();
        log::info!(
            "Restoring backup {} ({} players, {} matches)",
            backup_id,
            data.players.len(),
            data.matches.len()
        );
        self.players = data.players;
        self.matches = data.matches;
        Ok(())
    }

    /// Distinct dates on which the league held at least one match, ascending.
    pub fn session_dates(&self) -> Vec<NaiveDate> {
        session_dates(&self.matches)
    }
}

/// Distinct match dates, ascending.
pub fn session_dates(matches: &[GameMatch]) -> Vec<NaiveDate> {
    matches
        .iter()
        .map(|m| m.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
