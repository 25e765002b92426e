use std::time::Duration;

use tracing::debug;

use super::{PuzzleQuery, PuzzleSource};
use crate::error::Result;
use crate::puzzle::RawPuzzleRow;

/// Table queried by [`RestSource`] unless overridden.
pub const DEFAULT_TABLE: &str = "Puzzles";

/// Blocking PostgREST client for a hosted `Puzzles` table.
///
/// Queries are encoded as PostgREST filters, e.g.
/// `?select=*&id=gte.500&id=lt.600&order=popularity.desc,id.asc&limit=10`.
/// No retries are attempted; the fetch policy treats a failure as an empty page.
pub struct RestSource {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    table: String,
}

impl RestSource {
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .build();
        let agent: ureq::Agent = config.into();

        Self {
            agent,
            base_url: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: DEFAULT_TABLE.to_string(),
        }
    }

    /// Query a different table with the same schema
    pub fn with_table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    pub fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }
}

impl PuzzleSource for RestSource {
    fn query(&self, query: &PuzzleQuery) -> Result<Vec<RawPuzzleRow>> {
        let url = self.table_url();
        let params = query_params(query);
        debug!("GET {} {:?}", url, params);

        let mut request = self
            .agent
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", &format!("Bearer {}", self.api_key));
        for (name, value) in &params {
            request = request.query(name, value);
        }

        let mut response = request.call()?;
        let rows: Vec<RawPuzzleRow> = response.body_mut().read_json()?;
        Ok(rows)
    }
}

/// Encode a query as PostgREST query-string pairs
pub fn query_params(query: &PuzzleQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];

    if let Some(range) = &query.id_range {
        params.push(("id".to_string(), format!("gte.{}", range.start)));
        params.push(("id".to_string(), format!("lt.{}", range.end)));
    }

    if let Some(rating) = query.rating {
        params.push(("lowestRating".to_string(), format!("lte.{}", rating)));
        params.push(("highestRating".to_string(), format!("gte.{}", rating)));
    }

    if !query.order.is_empty() {
        let order = query
            .order
            .iter()
            .map(|o| format!("{}.{}", o.column, o.direction))
            .collect::<Vec<_>>()
            .join(",");
        params.push(("order".to_string(), order));
    }

    params.push(("limit".to_string(), query.limit.to_string()));
    params
}
