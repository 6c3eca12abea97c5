//! CSV export of the standings table.

use crate::logic::RankedPlayer;

/// Rank is the 1-based row position.
pub fn standings_csv(table: &[RankedPlayer]) -> Result<String, csv::Error> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "rank", "name", "points", "base", "bonus", "wins", "losses", "matches", "win_rate", "qualified",
    ])?;
    for (i, row) in table.iter().enumerate() {
        wtr.write_record([
            (i + 1).to_string(),
            row.player.label().to_string(),
            row.total_points.to_string(),
            row.base_points.to_string(),
            row.bonus_points.to_string(),
            row.wins.to_string(),
            row.losses.to_string(),
            row.matches.to_string(),
            row.win_rate.to_string(),
            row.qualified.to_string(),
        ])?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
