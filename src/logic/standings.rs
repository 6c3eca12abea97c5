//! League standings: points, win rate, qualification, and the tie-break ordering.

use crate::logic::achievements::{evaluate_achievements, Achievement, MIN_MATCHES};
use crate::models::{GameMatch, Player};
use deunicode::deunicode;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Base points for each player of the winning pair.
pub const POINTS_PER_WIN: u32 = 3;
/// Base points for each player of the losing pair.
pub const POINTS_PER_LOSS: u32 = 1;

/// One row of the standings table. Rank is the 1-based position in the returned list.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RankedPlayer {
    pub player: Player,
    pub wins: u32,
    pub losses: u32,
    pub matches: u32,
    pub base_points: u32,
    /// One point per earned badge.
    pub bonus_points: u32,
    pub total_points: u32,
    /// Percentage, rounded; 0 when no matches were played.
    pub win_rate: u32,
    pub qualified: bool,
    pub achievements: Vec<Achievement>,
}

#[derive(Default)]
struct Tally {
    wins: u32,
    losses: u32,
}

/// Compute the ranked table from scratch.
///
/// Only finished matches count. Ids that are not in the roster are ignored.
pub fn compute_standings(players: &[Player], matches: &[GameMatch]) -> Vec<RankedPlayer> {
    let mut tallies: HashMap<&str, Tally> = players
        .iter()
        .map(|p| (p.id.as_str(), Tally::default()))
        .collect();

    for m in matches {
        let Some(winner) = m.winner else { continue };
        for id in m.team(winner) {
            if let Some(t) = tallies.get_mut(id.as_str()) {
                t.wins += 1;
            }
        }
        for id in m.team(winner.other()) {
            if let Some(t) = tallies.get_mut(id.as_str()) {
                t.losses += 1;
            }
        }
    }

    let mut table: Vec<RankedPlayer> = players
        .iter()
        .map(|p| {
            let (wins, losses) = tallies
                .get(p.id.as_str())
                .map(|t| (t.wins, t.losses))
                .unwrap_or_default();
            let played = wins + losses;
            let base_points = POINTS_PER_WIN * wins + POINTS_PER_LOSS * losses;
            let achievements = evaluate_achievements(&p.id, matches, players);
            let bonus_points = achievements.len() as u32;
            RankedPlayer {
                player: p.clone(),
                wins,
                losses,
                matches: played,
                base_points,
                bonus_points,
                total_points: base_points + bonus_points,
                win_rate: win_rate(wins, played),
                qualified: played >= MIN_MATCHES,
                achievements,
            }
        })
        .collect();

    table.sort_by(compare_rows);
    table
}

/// Rounded win percentage.
pub fn win_rate(wins: u32, matches: u32) -> u32 {
    if matches == 0 {
        return 0;
    }
    (f64::from(wins) / f64::from(matches) * 100.0).round() as u32
}

/// Qualified first, then points, win rate, matches played (all descending), then label.
fn compare_rows(a: &RankedPlayer, b: &RankedPlayer) -> Ordering {
    b.qualified
        .cmp(&a.qualified)
        .then_with(|| b.total_points.cmp(&a.total_points))
        .then_with(|| b.win_rate.cmp(&a.win_rate))
        .then_with(|| b.matches.cmp(&a.matches))
        .then_with(|| compare_labels(a.player.label(), b.player.label()))
}

/// Collation-style label order.
///
/// Base letters first (accents and case folded away, so "Ágnes" sorts with the A's), then
/// unaccented before accented, then lowercase before uppercase, then the exact text.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    let (la, lb) = (a.to_lowercase(), b.to_lowercase());
    deunicode(&la)
        .cmp(&deunicode(&lb))
        .then_with(|| la.cmp(&lb))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}
