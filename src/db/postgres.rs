use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};

use crate::{
    db::CatalogStore,
    error::AppResult,
    models::{CatalogRow, SortOrder},
    services::query_builder::{CatalogQuery, Predicate},
};

const CATALOG_COLUMNS: &str =
    "title, genre, certificate, duration, year, rating, votes, stars, description";

/// Leading integer of `duration`, 0 when it does not start with digits
const DURATION_MINUTES: &str = r"COALESCE(substring(duration FROM '^\s*([0-9]+)')::numeric, 0)";

/// Same as [`DURATION_MINUTES`] but NULL for missing durations, for ordering
const DURATION_SORT_KEY: &str = r"CASE WHEN duration IS NULL OR duration = '' THEN NULL ELSE COALESCE(substring(duration FROM '^\s*([0-9]+)')::numeric, 0) END";

/// Creates a PostgreSQL connection pool
///
/// The pool is opened once at startup, shared by every request through the
/// store, and closed on shutdown.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Catalog store backed by the `catalog` table
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalogStore {
    async fn query(&self, query: &CatalogQuery) -> AppResult<Vec<CatalogRow>> {
        let mut builder = build_select(query);
        tracing::debug!(sql = builder.sql(), "Executing catalog query");

        let rows = builder
            .build_query_as::<CatalogRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn distinct_genres(&self) -> AppResult<Vec<String>> {
        let genres = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT genre FROM catalog WHERE genre IS NOT NULL AND genre <> ''",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(genres)
    }

    async fn distinct_stars(&self, limit: i64) -> AppResult<Vec<String>> {
        let stars = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT stars FROM catalog WHERE stars IS NOT NULL AND stars <> '' LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(stars)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

/// Renders a catalog query as a parameterized SELECT
pub fn build_select(query: &CatalogQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {CATALOG_COLUMNS} FROM catalog WHERE TRUE"
    ));

    for predicate in &query.predicates {
        builder.push(" AND ");
        push_predicate(&mut builder, predicate);
    }

    builder.push(" ORDER BY ");
    builder.push(order_clause(query.order));
    builder.push(" LIMIT ");
    builder.push_bind(i64::from(query.limit));

    builder
}

fn push_predicate(builder: &mut QueryBuilder<'static, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::TitleContains(title) => {
            builder.push("title ILIKE ");
            builder.push_bind(like_pattern(title));
        }
        Predicate::GenreContains(genre) => {
            builder.push("genre ILIKE ");
            builder.push_bind(like_pattern(genre));
        }
        Predicate::RatingAtMost(ceiling) => {
            let allowed: Vec<String> = ceiling
                .allowed_symbols()
                .into_iter()
                .map(str::to_string)
                .collect();
            builder.push("(certificate IS NULL OR certificate = '' OR certificate = ANY(");
            builder.push_bind(allowed);
            builder.push("))");
        }
        Predicate::RuntimeBetween { min, max } => {
            builder.push("(duration IS NULL OR duration = '' OR (TRUE");
            if let Some(min) = min {
                builder.push(format!(" AND {DURATION_MINUTES} >= "));
                builder.push_bind(i64::from(*min));
            }
            if let Some(max) = max {
                builder.push(format!(" AND {DURATION_MINUTES} <= "));
                builder.push_bind(i64::from(*max));
            }
            builder.push("))");
        }
        Predicate::YearBetween { from, to } => {
            builder.push("(year IS NULL OR year = 0 OR (TRUE");
            if let Some(from) = from {
                builder.push(" AND year >= ");
                builder.push_bind(*from);
            }
            if let Some(to) = to {
                builder.push(" AND year <= ");
                builder.push_bind(*to);
            }
            builder.push("))");
        }
        Predicate::ScoreAtLeast(score) => {
            builder.push("rating >= ");
            builder.push_bind(*score);
        }
        Predicate::VotesAtLeast(votes) => {
            builder.push("votes >= ");
            builder.push_bind(*votes);
        }
        Predicate::ActorAnyOf(names) if names.is_empty() => {
            builder.push("TRUE");
        }
        Predicate::ActorAnyOf(names) => {
            builder.push("(");
            for (i, name) in names.iter().enumerate() {
                if i > 0 {
                    builder.push(" OR ");
                }
                builder.push("stars LIKE ");
                builder.push_bind(like_pattern(name));
            }
            builder.push(")");
        }
    }
}

// NULLS LAST in both directions, so `year_old` and `runtime` list undated
// and untimed rows after the known ones rather than ahead of them.
fn order_clause(order: SortOrder) -> String {
    const SCORE_DESC: &str = "rating DESC NULLS LAST";
    match order {
        SortOrder::ScoreDesc => format!("{SCORE_DESC}, votes DESC NULLS LAST"),
        SortOrder::VotesDesc => format!("votes DESC NULLS LAST, {SCORE_DESC}"),
        SortOrder::YearDesc => format!("NULLIF(year, 0) DESC NULLS LAST, {SCORE_DESC}"),
        SortOrder::YearAsc => format!("NULLIF(year, 0) ASC NULLS LAST, {SCORE_DESC}"),
        SortOrder::RuntimeAsc => format!("{DURATION_SORT_KEY} ASC NULLS LAST, {SCORE_DESC}"),
        SortOrder::RuntimeDesc => format!("{DURATION_SORT_KEY} DESC NULLS LAST, {SCORE_DESC}"),
    }
}

/// Wraps text in `%` for a substring LIKE, escaping LIKE metacharacters
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
