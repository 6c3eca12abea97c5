//! Match (game) and Team for 2v2 doubles.

use crate::models::player::PlayerId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = String;

/// Side of the net. Serialized as `"A"` / `"B"` to match the stored document.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    pub fn other(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }
}

/// Two player ids forming one side.
pub type Pair = [PlayerId; 2];

/// A doubles match on a session date.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMatch {
    pub id: MatchId,
    /// Session date, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub team_a: Pair,
    pub team_b: Pair,
    /// None until an admin records a result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Team>,
}

impl GameMatch {
    pub fn new(date: NaiveDate, team_a: Pair, team_b: Pair) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date,
            team_a,
            team_b,
            winner: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    /// Which side the player is on, if they played this match.
    pub fn team_of(&self, player_id: &str) -> Option<Team> {
        if self.team_a.iter().any(|p| p == player_id) {
            Some(Team::A)
        } else if self.team_b.iter().any(|p| p == player_id) {
            Some(Team::B)
        } else {
            None
        }
    }

    pub fn involves(&self, player_id: &str) -> bool {
        self.team_of(player_id).is_some()
    }

    /// Some(true) when the player's side won, Some(false) when it lost, None if unfinished or absent.
    pub fn won_by(&self, player_id: &str) -> Option<bool> {
        let winner = self.winner?;
        self.team_of(player_id).map(|t| t == winner)
    }

    pub fn team(&self, team: Team) -> &Pair {
        match team {
            Team::A => &self.team_a,
            Team::B => &self.team_b,
        }
    }

    /// All four slots, team A first.
    pub fn players(&self) -> impl Iterator<Item = &PlayerId> {
        self.team_a.iter().chain(self.team_b.iter())
    }

    /// Each side has two different players and nobody plays on both sides.
    pub fn has_valid_teams(&self) -> bool {
        let [a1, a2] = &self.team_a;
        let [b1, b2] = &self.team_b;
        a1 != a2 && b1 != b2 && !self.team_a.iter().any(|p| self.team_b.contains(p))
    }
}
