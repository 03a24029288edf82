use std::cmp::Ordering;

use crate::models::{CatalogRow, ContentRating, FilterCriteria, SortOrder};

/// Upper bound (exclusive) for a year-to filter to take effect
pub const YEAR_TO_CEILING: i32 = 3000;

/// Genre value the UI sends when no genre is selected
pub const ANY_GENRE: &str = "Any";

/// A single catalog filter
///
/// Predicates are AND-combined. Each one carries the semantics of its field
/// independently of any query language: [`Predicate::matches`] evaluates it
/// in process, and the Postgres store renders the same rule as SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-insensitive substring of the title
    TitleContains(String),
    /// Case-insensitive substring of the raw genre text
    GenreContains(String),
    /// Certificate absent, empty, or no more severe than the ceiling
    RatingAtMost(ContentRating),
    /// Duration absent, empty, or its leading minutes within the bounds
    RuntimeBetween { min: Option<u32>, max: Option<u32> },
    /// Year absent, zero, or within the bounds
    YearBetween { from: Option<i32>, to: Option<i32> },
    ScoreAtLeast(f64),
    VotesAtLeast(i64),
    /// Raw stars text contains at least one of the names (case-sensitive)
    ActorAnyOf(Vec<String>),
}

impl Predicate {
    pub fn matches(&self, row: &CatalogRow) -> bool {
        match self {
            Predicate::TitleContains(needle) => contains_ignore_case(row.title.as_deref(), needle),
            Predicate::GenreContains(needle) => contains_ignore_case(row.genre.as_deref(), needle),
            Predicate::RatingAtMost(ceiling) => match row.certificate.as_deref() {
                None | Some("") => true,
                Some(certificate) => ceiling.allowed_symbols().contains(&certificate),
            },
            Predicate::RuntimeBetween { min, max } => match row.duration.as_deref() {
                None | Some("") => true,
                Some(duration) => {
                    let minutes = leading_minutes(duration);
                    min.map_or(true, |min| minutes >= u64::from(min))
                        && max.map_or(true, |max| minutes <= u64::from(max))
                }
            },
            Predicate::YearBetween { from, to } => match row.year {
                None | Some(0) => true,
                Some(year) => {
                    from.map_or(true, |from| year >= from) && to.map_or(true, |to| year <= to)
                }
            },
            Predicate::ScoreAtLeast(threshold) => row.rating.is_some_and(|r| r >= *threshold),
            Predicate::VotesAtLeast(threshold) => row.votes.is_some_and(|v| v >= *threshold),
            Predicate::ActorAnyOf(names) => {
                names.is_empty()
                    || row
                        .stars
                        .as_deref()
                        .is_some_and(|stars| names.iter().any(|name| stars.contains(name.as_str())))
            }
        }
    }
}

/// Predicates, ordering and row limit for one search
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub predicates: Vec<Predicate>,
    pub order: SortOrder,
    pub limit: u32,
}

impl CatalogQuery {
    /// Applies every predicate to a row
    pub fn matches(&self, row: &CatalogRow) -> bool {
        self.predicates.iter().all(|predicate| predicate.matches(row))
    }
}

/// Translates filter criteria into a catalog query
///
/// Never fails: absent fields and values outside their meaningful range add
/// no predicate, so the default query matches every row.
pub fn build_query(criteria: &FilterCriteria) -> CatalogQuery {
    let mut predicates = Vec::new();

    if let Some(title) = criteria.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        predicates.push(Predicate::TitleContains(title.to_string()));
    }

    if let Some(genre) = criteria
        .genre
        .as_deref()
        .filter(|g| !g.is_empty() && *g != ANY_GENRE)
    {
        predicates.push(Predicate::GenreContains(genre.to_string()));
    }

    if let Some(max_rating) = criteria.max_rating.as_deref().filter(|r| !r.is_empty()) {
        predicates.push(Predicate::RatingAtMost(ContentRating::ceiling(max_rating)));
    }

    if criteria.min_runtime.is_some() || criteria.max_runtime.is_some() {
        predicates.push(Predicate::RuntimeBetween {
            min: criteria.min_runtime,
            max: criteria.max_runtime,
        });
    }

    let year_from = criteria.year_from.filter(|from| *from > 0);
    let year_to = criteria
        .year_to
        .filter(|to| *to > 0 && *to < YEAR_TO_CEILING);
    if year_from.is_some() || year_to.is_some() {
        predicates.push(Predicate::YearBetween {
            from: year_from,
            to: year_to,
        });
    }

    if let Some(min_score) = criteria.min_score.filter(|s| *s > 0.0) {
        predicates.push(Predicate::ScoreAtLeast(min_score));
    }

    if let Some(min_votes) = criteria.min_votes.filter(|v| *v > 0) {
        predicates.push(Predicate::VotesAtLeast(min_votes));
    }

    if !criteria.actors.is_empty() {
        predicates.push(Predicate::ActorAnyOf(criteria.actors.clone()));
    }

    CatalogQuery {
        predicates,
        order: criteria.sort,
        limit: criteria.limit,
    }
}

/// Leading integer of a duration text, 0 when it does not start with digits
///
/// Mirrors an unsigned cast: surrounding whitespace is skipped, and a value
/// too large to hold saturates.
pub fn leading_minutes(duration: &str) -> u64 {
    duration
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(10)
                .saturating_add(u64::from(digit.to_digit(10).unwrap_or(0)))
        })
}

impl SortOrder {
    /// Compares two rows under this ordering; unknown values sort last
    ///
    /// This holds for the ascending modes too: a year of 0 or an empty
    /// duration lands after every known value instead of leading the list.
    pub fn compare(self, a: &CatalogRow, b: &CatalogRow) -> Ordering {
        let score = |row: &CatalogRow| row.rating;
        let votes = |row: &CatalogRow| row.votes;
        let year = |row: &CatalogRow| row.year.filter(|y| *y != 0);
        let runtime = |row: &CatalogRow| {
            row.duration
                .as_deref()
                .filter(|d| !d.is_empty())
                .map(leading_minutes)
        };

        match self {
            SortOrder::ScoreDesc => {
                nulls_last(score(a), score(b), true).then(nulls_last(votes(a), votes(b), true))
            }
            SortOrder::VotesDesc => {
                nulls_last(votes(a), votes(b), true).then(nulls_last(score(a), score(b), true))
            }
            SortOrder::YearDesc => {
                nulls_last(year(a), year(b), true).then(nulls_last(score(a), score(b), true))
            }
            SortOrder::YearAsc => {
                nulls_last(year(a), year(b), false).then(nulls_last(score(a), score(b), true))
            }
            SortOrder::RuntimeAsc => nulls_last(runtime(a), runtime(b), false)
                .then(nulls_last(score(a), score(b), true)),
            SortOrder::RuntimeDesc => nulls_last(runtime(a), runtime(b), true)
                .then(nulls_last(score(a), score(b), true)),
        }
    }
}

fn nulls_last<T: PartialOrd>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let ordering = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}
