//! Badges: win tiers, the rival badge, the volume badge, and attendance streaks.

use crate::models::{session_dates, GameMatch, Player};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Matches a player needs both to qualify for the standings and to earn [`AchievementId::Matches5`].
pub const MIN_MATCHES: u32 = 5;

/// Name fragment (case-insensitive) that designates the rival player.
pub const RIVAL_NAME_FRAGMENT: &str = "melinda";

/// The closed set of badges, in display order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    Win5,
    Win10,
    Win25,
    Melinda,
    Matches5,
    Streak3,
    Streak6,
    Streak10,
}

impl AchievementId {
    pub fn title(self) -> &'static str {
        match self {
            AchievementId::Win5 => "First Blood",
            AchievementId::Win10 => "Shuttle Hunter",
            AchievementId::Win25 => "Court Legend",
            AchievementId::Melinda => "Melinda Slayer",
            AchievementId::Matches5 => "Seasoned Player",
            AchievementId::Streak3 => "Regular",
            AchievementId::Streak6 => "Devoted",
            AchievementId::Streak10 => "Iron Attendance",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AchievementId::Win5 => "Win 5 matches",
            AchievementId::Win10 => "Win 10 matches",
            AchievementId::Win25 => "Win 25 matches",
            AchievementId::Melinda => "Beat Melinda while playing against her",
            AchievementId::Matches5 => "Play 5 matches",
            AchievementId::Streak3 => "Play 3 league sessions in a row",
            AchievementId::Streak6 => "Play 6 league sessions in a row",
            AchievementId::Streak10 => "Play 10 league sessions in a row",
        }
    }
}

/// An earned badge. Never stored; recomputed from match history.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub title: String,
    pub description: String,
}

impl From<AchievementId> for Achievement {
    fn from(id: AchievementId) -> Self {
        Self {
            id,
            title: id.title().to_string(),
            description: id.description().to_string(),
        }
    }
}

/// Badges earned by `player_id`, in fixed order: win tiers, rival, volume, streak tiers.
pub fn evaluate_achievements(player_id: &str, matches: &[GameMatch], players: &[Player]) -> Vec<Achievement> {
    let played: Vec<&GameMatch> = matches.iter().filter(|m| m.involves(player_id)).collect();
    let wins = played
        .iter()
        .filter(|m| m.won_by(player_id) == Some(true))
        .count();

    let mut earned = Vec::new();
    for (threshold, id) in [
        (5, AchievementId::Win5),
        (10, AchievementId::Win10),
        (25, AchievementId::Win25),
    ] {
        if wins >= threshold {
            earned.push(id);
        }
    }

    if let Some(rival) = find_rival(players) {
        if beat_rival(player_id, &rival.id, &played) {
            earned.push(AchievementId::Melinda);
        }
    }

    if played.len() >= MIN_MATCHES as usize {
        earned.push(AchievementId::Matches5);
    }

    let streak = attendance_streak(player_id, matches);
    for (threshold, id) in [
        (3, AchievementId::Streak3),
        (6, AchievementId::Streak6),
        (10, AchievementId::Streak10),
    ] {
        if streak >= threshold {
            earned.push(id);
        }
    }

    earned.into_iter().map(Achievement::from).collect()
}

/// First roster entry whose full name (marker included) contains the rival fragment, ignoring case.
pub fn find_rival(players: &[Player]) -> Option<&Player> {
    players
        .iter()
        .find(|p| p.name.to_lowercase().contains(RIVAL_NAME_FRAGMENT))
}

fn beat_rival(player_id: &str, rival_id: &str, played: &[&GameMatch]) -> bool {
    played.iter().any(|m| {
        let (Some(winner), Some(mine), Some(theirs)) = (m.winner, m.team_of(player_id), m.team_of(rival_id))
        else {
            return false;
        };
        mine != theirs && mine == winner
    })
}

/// Longest run of consecutive league session dates on which the player appeared.
///
/// Session dates are the distinct dates of any match in the league, so a week-long gap
/// between two sessions still counts as consecutive.
pub fn attendance_streak(player_id: &str, matches: &[GameMatch]) -> u32 {
    let played_dates: HashSet<_> = matches
        .iter()
        .filter(|m| m.involves(player_id))
        .map(|m| m.date)
        .collect();

    let mut current = 0;
    let mut best = 0;
    for date in session_dates(matches) {
        if played_dates.contains(&date) {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}
