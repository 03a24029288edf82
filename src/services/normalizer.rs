//! Per-row cleaning of catalog rows into UI-ready records.
//!
//! Nothing here fails: a field that cannot be parsed takes its default and
//! the rest of the row is still normalized.

use crate::models::{
    CatalogRow, NormalizedRecord, PLACEHOLDER_SYNOPSIS, UNKNOWN_TITLE, UNRATED_LABEL,
};

/// Most cast names kept on a normalized record
pub const MAX_CAST: usize = 3;
/// Cast names of this many characters or more are treated as noise
const MAX_CAST_NAME_CHARS: usize = 100;
/// Characters peeled off either end of a cast entry
const CAST_WRAPPERS: [char; 4] = ['\'', '"', '[', ']'];
/// Cast entries that are data artifacts rather than names
const CAST_PLACEHOLDERS: [&str; 2] = ["Documentary", "N/A"];

/// Shortest actor name offered by the actor listing
pub const MIN_LISTED_ACTOR_CHARS: usize = 2;
/// Actor names of this many characters or more are left out of the listing
pub const MAX_LISTED_ACTOR_CHARS: usize = 50;

/// Builds the normalized record for one catalog row
pub fn normalize(row: &CatalogRow) -> NormalizedRecord {
    NormalizedRecord {
        title: non_empty(row.title.as_deref()).unwrap_or(UNKNOWN_TITLE).to_string(),
        genres: row.genre.as_deref().map(parse_genres).unwrap_or_default(),
        runtime: row.duration.as_deref().map(parse_runtime).unwrap_or(0),
        rating: non_empty(row.certificate.as_deref())
            .unwrap_or(UNRATED_LABEL)
            .to_string(),
        score: row.rating.filter(|score| score.is_finite()).unwrap_or(0.0),
        synopsis: non_empty(row.description.as_deref())
            .unwrap_or(PLACEHOLDER_SYNOPSIS)
            .to_string(),
        cast: row.stars.as_deref().map(parse_cast).unwrap_or_default(),
        year: row.year.filter(|year| *year != 0),
        votes: row.votes.unwrap_or(0),
    }
}

/// Splits comma-separated genre text, keeping order and duplicates
pub fn parse_genres(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|genre| !genre.is_empty())
        .map(str::to_string)
        .collect()
}

/// First run of digits in a duration text, in minutes; 0 when there is none
pub fn parse_runtime(raw: &str) -> u32 {
    let digits: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();

    digits.parse().unwrap_or(0)
}

/// The first three cleaned cast names of a stars text
pub fn parse_cast(raw: &str) -> Vec<String> {
    cast_names(raw).take(MAX_CAST).collect()
}

/// Every cleaned cast name of a stars text, in order
///
/// Stars text shows up as plain `A, B` lists and as serialized lists like
/// `['A', "B"]`. One enclosing bracket pair is removed, then each entry is
/// peeled of quotes and brackets on both ends.
pub fn cast_names(raw: &str) -> impl Iterator<Item = String> + '_ {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('[').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(']').unwrap_or(trimmed);

    trimmed
        .split(',')
        .map(clean_cast_entry)
        .filter(|name| is_cast_name(name))
        .map(str::to_string)
}

/// Whether a cleaned cast name belongs in the actor listing
pub fn is_listable_actor(name: &str) -> bool {
    let chars = name.chars().count();
    let lowered = name.to_lowercase();

    (MIN_LISTED_ACTOR_CHARS..MAX_LISTED_ACTOR_CHARS).contains(&chars)
        && !CAST_PLACEHOLDERS
            .iter()
            .any(|placeholder| lowered.contains(&placeholder.to_lowercase()))
        && !name.chars().all(|c| c.is_ascii_digit())
}

// Two passes so that `'[` and `['` wrappings separated by spaces both come off.
fn clean_cast_entry(entry: &str) -> &str {
    let once = entry.trim().trim_matches(CAST_WRAPPERS.as_slice()).trim();
    once.trim_matches(CAST_WRAPPERS.as_slice()).trim()
}

fn is_cast_name(name: &str) -> bool {
    !name.is_empty()
        && !CAST_PLACEHOLDERS.contains(&name)
        && !name.chars().all(|c| CAST_WRAPPERS.contains(&c))
        && name.chars().count() < MAX_CAST_NAME_CHARS
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
