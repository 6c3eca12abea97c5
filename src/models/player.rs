//! Player data structure and marker/label name handling.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for a player (uuid text for new players, anything for imported ones).
pub type PlayerId = String;

/// Markers handed out when a player is added without one.
pub const MARKER_PALETTE: &[&str] = &[
    "🏸", "🦅", "🐯", "🦊", "🐼", "🐙", "🦄", "🐸", "🐝", "🦉", "🐬", "🦁", "🐧", "🐢", "🌟", "🔥",
];

/// A league member. `name` keeps the packed `"<marker> <label>"` form used by the stored document.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    /// Create a player with a fresh id from a marker and label.
    pub fn new(marker: &str, label: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: pack_name(marker, label),
        }
    }

    /// Create a player with a random marker from [`MARKER_PALETTE`].
    pub fn with_random_marker(label: &str) -> Self {
        Self::new(random_marker(), label)
    }

    /// Leading marker token, if the name has one.
    pub fn marker(&self) -> Option<&str> {
        split_name(&self.name).0
    }

    /// Display label with the marker stripped.
    pub fn label(&self) -> &str {
        split_name(&self.name).1
    }

    /// Replace the marker, keeping the label.
    pub fn set_marker(&mut self, marker: &str) {
        let label = self.label().to_string();
        self.name = pack_name(marker, &label);
    }
}

/// Split a packed name at the first whitespace into (marker, label).
///
/// The first token only counts as a marker when it has no letters and is not a bare number,
/// so plain names like `"Anna Kowalska"` stay whole while keycap emoji like `"1️⃣"` split off.
pub fn split_name(name: &str) -> (Option<&str>, &str) {
    let name = name.trim();
    match name.split_once(char::is_whitespace) {
        Some((head, rest)) if is_marker(head) => (Some(head), rest.trim_start()),
        _ => (None, name),
    }
}

fn is_marker(token: &str) -> bool {
    !token.chars().any(char::is_alphabetic) && !token.chars().all(|c| c.is_ascii_digit())
}

/// Join a marker and label into the stored name form. An empty marker yields just the label.
pub fn pack_name(marker: &str, label: &str) -> String {
    let marker = marker.trim();
    let label = label.trim();
    if marker.is_empty() {
        label.to_string()
    } else {
        format!("{marker} {label}")
    }
}

fn random_marker() -> &'static str {
    MARKER_PALETTE
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("🏸")
}
