//! Session draw: three rounds of greedy high-vs-low doubles pairings for the present players.
//!
//! 1. Rank present players by today's finished results (wins, then matches played), stable.
//! 2. Each round, pair the strongest remaining player with the weakest remaining player they
//!    have not partnered yet today (falling back to the weakest), until fewer than 2 remain.
//! 3. Match the strongest remaining pair against the weakest remaining pair.
//! 4. The teammate history carries across rounds; the ranking does not change.

use crate::models::{GameMatch, LeagueError, Pair, PlayerId};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet, VecDeque};

/// Rounds generated per draw.
pub const DRAW_ROUNDS: usize = 3;

/// Players needed for a doubles match.
pub const MIN_PRESENT_PLAYERS: usize = 4;

/// Unordered teammate pair, stored with the smaller id first.
pub type TeammatePair = (PlayerId, PlayerId);

pub fn teammate_key(a: &str, b: &str) -> TeammatePair {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Teammate pairs from every match in `matches`.
pub fn teammate_pairs<'a>(matches: impl IntoIterator<Item = &'a GameMatch>) -> HashSet<TeammatePair> {
    matches
        .into_iter()
        .flat_map(|m| [teammate_key(&m.team_a[0], &m.team_a[1]), teammate_key(&m.team_b[0], &m.team_b[1])])
        .collect()
}

/// Generate the session's new matches (no winners set).
///
/// `present` is the input order used to break ranking ties. `matches_today` may contain any
/// matches; only finished ones on `date` are used for ranking. Fewer than 4 present players gives
/// [`LeagueError::NotEnoughPlayers`]; a draw that forms no match gives [`LeagueError::NoBalancedDraw`].
pub fn draw_session_matches(
    present: &[PlayerId],
    matches_today: &[GameMatch],
    seen_teammates: &HashSet<TeammatePair>,
    date: NaiveDate,
) -> Result<Vec<GameMatch>, LeagueError> {
    if present.len() < MIN_PRESENT_PLAYERS {
        return Err(LeagueError::NotEnoughPlayers {
            present: present.len(),
        });
    }

    let ranked = rank_present(present, matches_today, date);
    let mut seen = seen_teammates.clone();
    let mut drawn = Vec::new();

    for round in 1..=DRAW_ROUNDS {
        let pairs = form_pairs(&ranked, &mut seen);
        let games = compose_matches(pairs, date);
        log::debug!("Draw round {}: {} match(es)", round, games.len());
        drawn.extend(games);
    }

    if drawn.is_empty() {
        return Err(LeagueError::NoBalancedDraw);
    }
    Ok(drawn)
}

/// Present players ordered strongest first by today's wins, then today's matches played.
pub fn rank_present(present: &[PlayerId], matches_today: &[GameMatch], date: NaiveDate) -> Vec<PlayerId> {
    let mut form: HashMap<&str, (u32, u32)> = HashMap::new();
    for m in matches_today.iter().filter(|m| m.date == date && m.is_finished()) {
        for id in m.players() {
            let entry = form.entry(id.as_str()).or_default();
            entry.1 += 1;
            if m.won_by(id) == Some(true) {
                entry.0 += 1;
            }
        }
    }

    let mut ranked: Vec<(PlayerId, (u32, u32))> = present
        .iter()
        .map(|id| (id.clone(), form.get(id.as_str()).copied().unwrap_or_default()))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().map(|(id, _)| id).collect()
}

/// One pairing pass over the full ranked list. Pairs come out strongest first.
fn form_pairs(ranked: &[PlayerId], seen: &mut HashSet<TeammatePair>) -> Vec<Pair> {
    let mut pool: Vec<PlayerId> = ranked.to_vec();
    let mut pairs = Vec::new();

    while pool.len() >= 2 {
        let high = pool.remove(0);
        let idx = (0..pool.len())
            .rev()
            .find(|&i| !seen.contains(&teammate_key(&high, &pool[i])))
            .unwrap_or_else(|| {
                log::debug!("No fresh partner left for {}, taking the weakest", high);
                pool.len() - 1
            });
        let partner = pool.remove(idx);
        seen.insert(teammate_key(&high, &partner));
        pairs.push([high, partner]);
    }

    pairs
}

/// Strongest remaining pair against weakest remaining pair; a leftover pair sits out.
fn compose_matches(pairs: Vec<Pair>, date: NaiveDate) -> Vec<GameMatch> {
    let mut pairs = VecDeque::from(pairs);
    let mut games = Vec::new();
    while pairs.len() >= 2 {
        if let (Some(high), Some(low)) = (pairs.pop_front(), pairs.pop_back()) {
            games.push(GameMatch::new(date, high, low));
        }
    }
    games
}
