use std::{fmt::Display, str::FromStr};

/// Default number of rows returned by a search
pub const DEFAULT_LIMIT: u32 = 100;
/// Largest number of rows a search may return
pub const MAX_LIMIT: u32 = 500;

/// Content rating symbols with their ordinal severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentRating {
    G,
    Pg,
    Pg13,
    R,
    Nc17,
}

impl ContentRating {
    /// Every symbol, least severe first
    pub const ALL: [ContentRating; 5] = [
        ContentRating::G,
        ContentRating::Pg,
        ContentRating::Pg13,
        ContentRating::R,
        ContentRating::Nc17,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            ContentRating::G => "G",
            ContentRating::Pg => "PG",
            ContentRating::Pg13 => "PG-13",
            ContentRating::R => "R",
            ContentRating::Nc17 => "NC-17",
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            ContentRating::G => 1,
            ContentRating::Pg => 2,
            ContentRating::Pg13 => 3,
            ContentRating::R => 4,
            ContentRating::Nc17 => 5,
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rating| rating.symbol() == symbol)
    }

    /// Resolves a requested ceiling, falling back to R for unknown symbols
    pub fn ceiling(symbol: &str) -> Self {
        Self::from_symbol(symbol).unwrap_or(ContentRating::R)
    }

    /// Symbols whose ordinal does not exceed this one
    pub fn allowed_symbols(self) -> Vec<&'static str> {
        Self::ALL
            .into_iter()
            .filter(|rating| rating.ordinal() <= self.ordinal())
            .map(ContentRating::symbol)
            .collect()
    }
}

impl Display for ContentRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Result ordering; the secondary key is fixed per mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Score descending, then votes descending
    #[default]
    ScoreDesc,
    VotesDesc,
    YearDesc,
    YearAsc,
    RuntimeAsc,
    RuntimeDesc,
}

impl SortOrder {
    /// Maps the `sortBy` request value; anything unrecognised sorts by score
    pub fn from_param(value: &str) -> Self {
        match value.trim() {
            "votes" => SortOrder::VotesDesc,
            "year" => SortOrder::YearDesc,
            "year_old" => SortOrder::YearAsc,
            "runtime" => SortOrder::RuntimeAsc,
            "runtime_long" => SortOrder::RuntimeDesc,
            _ => SortOrder::ScoreDesc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::ScoreDesc => "rating",
            SortOrder::VotesDesc => "votes",
            SortOrder::YearDesc => "year",
            SortOrder::YearAsc => "year_old",
            SortOrder::RuntimeAsc => "runtime",
            SortOrder::RuntimeDesc => "runtime_long",
        }
    }
}

/// Raw search query parameters as they arrive from the UI
///
/// Everything is kept as text so that a malformed value never rejects the
/// request; [`FilterCriteria::from`] decides what each value means.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub title_search: Option<String>,
    pub genre: Option<String>,
    pub max_rating: Option<String>,
    pub min_runtime: Option<String>,
    pub max_runtime: Option<String>,
    pub year_from: Option<String>,
    pub year_to: Option<String>,
    pub min_rating: Option<String>,
    pub min_votes: Option<String>,
    pub actors: Option<String>,
    pub sort_by: Option<String>,
    pub limit: Option<String>,
    /// Target runtime for the recommendation, in minutes
    pub runtime: Option<String>,
}

impl SearchParams {
    /// Collects parameters from decoded query pairs
    ///
    /// The first occurrence of a key wins and unknown keys are skipped, so a
    /// repeated or stray parameter never rejects the request.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "titleSearch" => &mut params.title_search,
                "genre" => &mut params.genre,
                "maxRating" => &mut params.max_rating,
                "minRuntime" => &mut params.min_runtime,
                "maxRuntime" => &mut params.max_runtime,
                "yearFrom" => &mut params.year_from,
                "yearTo" => &mut params.year_to,
                "minRating" => &mut params.min_rating,
                "minVotes" => &mut params.min_votes,
                "actors" => &mut params.actors,
                "sortBy" => &mut params.sort_by,
                "limit" => &mut params.limit,
                "runtime" => &mut params.runtime,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        params
    }
}

/// Request-scoped search filters
///
/// `None` (or an empty actor list) means "do not filter on this field".
/// Threshold guards such as "only when > 0" are applied by the query builder.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub max_rating: Option<String>,
    pub min_runtime: Option<u32>,
    pub max_runtime: Option<u32>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub min_score: Option<f64>,
    pub min_votes: Option<i64>,
    pub actors: Vec<String>,
    pub sort: SortOrder,
    pub limit: u32,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            title: None,
            genre: None,
            max_rating: None,
            min_runtime: None,
            max_runtime: None,
            year_from: None,
            year_to: None,
            min_score: None,
            min_votes: None,
            actors: Vec::new(),
            sort: SortOrder::default(),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl From<&SearchParams> for FilterCriteria {
    fn from(params: &SearchParams) -> Self {
        Self {
            title: non_empty(params.title_search.as_deref()),
            genre: non_empty(params.genre.as_deref()),
            max_rating: non_empty(params.max_rating.as_deref()),
            min_runtime: parse_minutes(params.min_runtime.as_deref()),
            max_runtime: parse_minutes(params.max_runtime.as_deref()),
            year_from: parse_number(params.year_from.as_deref()),
            year_to: parse_number(params.year_to.as_deref()),
            min_score: parse_number::<f64>(params.min_rating.as_deref())
                .filter(|score| score.is_finite()),
            min_votes: parse_number(params.min_votes.as_deref()),
            actors: params
                .actors
                .as_deref()
                .map(split_names)
                .unwrap_or_default(),
            sort: params
                .sort_by
                .as_deref()
                .map(SortOrder::from_param)
                .unwrap_or_default(),
            limit: clamp_limit(params.limit.as_deref()),
        }
    }
}

/// Clamps a requested row limit into `[1, MAX_LIMIT]`; non-numeric input yields the default
pub fn clamp_limit(value: Option<&str>) -> u32 {
    match parse_leading_integer(value) {
        Some(limit) => limit.clamp(1, i64::from(MAX_LIMIT)) as u32,
        None => DEFAULT_LIMIT,
    }
}

/// Parses a trimmed numeric parameter, treating anything malformed as absent
pub fn parse_number<T: FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

/// Reads the leading integer of a parameter, ignoring anything after it
///
/// Accepts an optional sign followed by at least one digit, so `"10.5"` reads
/// as 10 and `"120min"` as 120. Values beyond `i64` saturate.
pub fn parse_leading_integer(value: Option<&str>) -> Option<i64> {
    let text = value?.trim_start();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let digits: Vec<i64> = digits
        .chars()
        .map_while(|c| c.to_digit(10))
        .map(i64::from)
        .collect();
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits
        .into_iter()
        .fold(0i64, |acc, digit| acc.saturating_mul(10).saturating_add(digit));

    Some(if negative { -magnitude } else { magnitude })
}

/// Runtime bound in minutes; negative bounds are ignored and huge ones saturate
fn parse_minutes(value: Option<&str>) -> Option<u32> {
    parse_leading_integer(value)
        .and_then(|minutes| u32::try_from(minutes.min(i64::from(u32::MAX))).ok())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn split_names(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_symbols_for_pg() {
        assert_eq!(ContentRating::Pg.allowed_symbols(), vec!["G", "PG"]);
    }

    #[test]
    fn test_allowed_symbols_for_nc17_is_everything() {
        assert_eq!(
            ContentRating::Nc17.allowed_symbols(),
            vec!["G", "PG", "PG-13", "R", "NC-17"]
        );
    }

    #[test]
    fn test_unknown_ceiling_defaults_to_r() {
        assert_eq!(ContentRating::ceiling("TV-MA"), ContentRating::R);
        assert_eq!(ContentRating::ceiling("pg"), ContentRating::R);
        assert_eq!(ContentRating::ceiling("PG-13"), ContentRating::Pg13);
    }

    #[test]
    fn test_sort_order_from_param() {
        assert_eq!(SortOrder::from_param("votes"), SortOrder::VotesDesc);
        assert_eq!(SortOrder::from_param("year"), SortOrder::YearDesc);
        assert_eq!(SortOrder::from_param("year_old"), SortOrder::YearAsc);
        assert_eq!(SortOrder::from_param("runtime"), SortOrder::RuntimeAsc);
        assert_eq!(SortOrder::from_param("runtime_long"), SortOrder::RuntimeDesc);
        assert_eq!(SortOrder::from_param("rating"), SortOrder::ScoreDesc);
        assert_eq!(SortOrder::from_param("popularity"), SortOrder::ScoreDesc);
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some("abc")), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some("0")), 1);
        assert_eq!(clamp_limit(Some("-20")), 1);
        assert_eq!(clamp_limit(Some("25")), 25);
        assert_eq!(clamp_limit(Some("10000")), MAX_LIMIT);
    }

    #[test]
    fn test_clamp_limit_saturates_oversized_numbers() {
        assert_eq!(clamp_limit(Some("99999999999999999999")), MAX_LIMIT);
        assert_eq!(clamp_limit(Some("-99999999999999999999")), 1);
    }

    #[test]
    fn test_clamp_limit_reads_leading_integer() {
        assert_eq!(clamp_limit(Some("10.5")), 10);
        assert_eq!(clamp_limit(Some(" 42 rows")), 42);
        assert_eq!(clamp_limit(Some("-")), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some("x5")), DEFAULT_LIMIT);
    }

    #[test]
    fn test_parse_leading_integer() {
        assert_eq!(parse_leading_integer(Some("+7")), Some(7));
        assert_eq!(parse_leading_integer(Some("-3abc")), Some(-3));
        assert_eq!(parse_leading_integer(Some("")), None);
        assert_eq!(parse_leading_integer(None), None);
    }

    #[test]
    fn test_runtime_bounds_read_leading_integer() {
        let params = SearchParams {
            min_runtime: Some("90.5".to_string()),
            max_runtime: Some("120 min".to_string()),
            ..Default::default()
        };

        let criteria = FilterCriteria::from(&params);
        assert_eq!(criteria.min_runtime, Some(90));
        assert_eq!(criteria.max_runtime, Some(120));
    }

    #[test]
    fn test_runtime_bounds_ignore_negative_and_saturate_huge() {
        let params = SearchParams {
            min_runtime: Some("-10".to_string()),
            max_runtime: Some("99999999999".to_string()),
            ..Default::default()
        };

        let criteria = FilterCriteria::from(&params);
        assert_eq!(criteria.min_runtime, None);
        assert_eq!(criteria.max_runtime, Some(u32::MAX));
    }

    #[test]
    fn test_params_from_pairs_keeps_first_value() {
        let params = SearchParams::from_pairs([
            ("genre", "Comedy"),
            ("genre", "Drama"),
            ("sortBy", "votes"),
            ("page", "2"),
        ]);

        assert_eq!(params.genre.as_deref(), Some("Comedy"));
        assert_eq!(params.sort_by.as_deref(), Some("votes"));
        assert_eq!(params.title_search, None);
    }

    #[test]
    fn test_params_from_pairs_maps_every_key() {
        let params = SearchParams::from_pairs([
            ("titleSearch", "a"),
            ("maxRating", "b"),
            ("minRuntime", "c"),
            ("maxRuntime", "d"),
            ("yearFrom", "e"),
            ("yearTo", "f"),
            ("minRating", "g"),
            ("minVotes", "h"),
            ("actors", "i"),
            ("limit", "j"),
            ("runtime", "k"),
        ]);

        assert_eq!(params.title_search.as_deref(), Some("a"));
        assert_eq!(params.max_rating.as_deref(), Some("b"));
        assert_eq!(params.min_runtime.as_deref(), Some("c"));
        assert_eq!(params.max_runtime.as_deref(), Some("d"));
        assert_eq!(params.year_from.as_deref(), Some("e"));
        assert_eq!(params.year_to.as_deref(), Some("f"));
        assert_eq!(params.min_rating.as_deref(), Some("g"));
        assert_eq!(params.min_votes.as_deref(), Some("h"));
        assert_eq!(params.actors.as_deref(), Some("i"));
        assert_eq!(params.limit.as_deref(), Some("j"));
        assert_eq!(params.runtime.as_deref(), Some("k"));
    }

    #[test]
    fn test_criteria_from_empty_params_filters_nothing() {
        let criteria = FilterCriteria::from(&SearchParams::default());
        assert_eq!(criteria, FilterCriteria::default());
    }

    #[test]
    fn test_criteria_from_params_ignores_malformed_numbers() {
        let params = SearchParams {
            max_runtime: Some("long".to_string()),
            year_from: Some("19x0".to_string()),
            min_rating: Some("NaN".to_string()),
            min_votes: Some("".to_string()),
            ..Default::default()
        };

        let criteria = FilterCriteria::from(&params);
        assert_eq!(criteria.max_runtime, None);
        assert_eq!(criteria.year_from, None);
        assert_eq!(criteria.min_score, None);
        assert_eq!(criteria.min_votes, None);
    }

    #[test]
    fn test_criteria_from_params_splits_actors() {
        let params = SearchParams {
            actors: Some("Ana Cruz, ,Tom Hanks,".to_string()),
            title_search: Some("   ".to_string()),
            ..Default::default()
        };

        let criteria = FilterCriteria::from(&params);
        assert_eq!(criteria.actors, vec!["Ana Cruz", "Tom Hanks"]);
        assert_eq!(criteria.title, None);
    }
}
