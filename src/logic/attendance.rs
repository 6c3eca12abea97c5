//! Attendance for the selected session date: who is present, who already played, and the draw input.

use crate::logic::draw::{draw_session_matches, teammate_pairs, TeammatePair};
use crate::models::{GameMatch, League, LeagueError, Player, PlayerId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Selected date plus the players marked present for it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub date: NaiveDate,
    /// Present player ids in the order they were marked.
    pub present: Vec<PlayerId>,
}

impl SessionState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            present: Vec::new(),
        }
    }

    /// Switch to another date. Presence is per date, so it is cleared.
    pub fn select_date(&mut self, date: NaiveDate) {
        if self.date != date {
            self.date = date;
            self.present.clear();
        }
    }

    /// Flip a player's presence. Returns the new state (true = present).
    pub fn toggle_present(&mut self, player_id: &str) -> bool {
        if let Some(idx) = self.present.iter().position(|p| p == player_id) {
            self.present.remove(idx);
            false
        } else {
            self.present.push(player_id.to_string());
            true
        }
    }

    pub fn is_present(&self, player_id: &str) -> bool {
        self.present.iter().any(|p| p == player_id)
    }

    /// Present ids in roster order; ids no longer in the roster are dropped.
    pub fn present_in_roster_order(&self, players: &[Player]) -> Vec<PlayerId> {
        players
            .iter()
            .filter(|p| self.is_present(&p.id))
            .map(|p| p.id.clone())
            .collect()
    }

    /// Matches on the selected date, in history order.
    pub fn matches_today<'a>(&self, matches: &'a [GameMatch]) -> Vec<&'a GameMatch> {
        matches.iter().filter(|m| m.date == self.date).collect()
    }

    /// Ids appearing in any match on the selected date.
    pub fn played_today(&self, matches: &[GameMatch]) -> BTreeSet<PlayerId> {
        self.matches_today(matches)
            .into_iter()
            .flat_map(|m| m.players().cloned())
            .collect()
    }

    /// Teammate pairs already formed in finished matches on the selected date.
    pub fn seen_teammates(&self, matches: &[GameMatch]) -> HashSet<TeammatePair> {
        teammate_pairs(
            self.matches_today(matches)
                .into_iter()
                .filter(|m| m.is_finished()),
        )
    }

    /// Run the draw for this session against the league. Does not touch the league.
    pub fn draw(&self, league: &League) -> Result<Vec<GameMatch>, LeagueError> {
        let present = self.present_in_roster_order(&league.players);
        let today: Vec<GameMatch> = self
            .matches_today(&league.matches)
            .into_iter()
            .cloned()
            .collect();
        let seen = self.seen_teammates(&league.matches);
        draw_session_matches(&present, &today, &seen, self.date)
    }
}
