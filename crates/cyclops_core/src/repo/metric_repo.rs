//! Per-agent time-series tables written by archetypes.
//!
//! `TimeSeriesPower`, `TimeSeriesEnrichmentSWU` and
//! `TimeSeriesEnrichmentFeed` only exist when some agent recorded into them;
//! a missing table reads as an empty series.

use crate::db::table_exists;
use crate::model::agent::AgentId;
use crate::model::material::TimePoint;
use crate::repo::RepoResult;
use log::warn;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

/// Read-only time-series metric queries.
pub trait MetricRepository {
    /// Separative work units recorded by one enrichment facility.
    fn swu(&self, agent: AgentId) -> RepoResult<Vec<TimePoint>>;
    /// Electric power (MWe) recorded by one reactor.
    fn power(&self, agent: AgentId) -> RepoResult<Vec<TimePoint>>;
    /// Enrichment feed summed over all facilities per timestep.
    fn enrichment_feed(&self) -> RepoResult<Vec<TimePoint>>;
}

/// SQLite-backed metric repository.
pub struct SqliteMetricRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMetricRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn series(&self, table: &str, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<TimePoint>> {
        if !table_exists(self.conn, table)? {
            warn!("event=metric_query module=repo status=skip reason=missing_table table={table}");
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(bind_values), |row| {
            Ok(TimePoint::new(row.get(0)?, row.get(1)?))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

impl MetricRepository for SqliteMetricRepository<'_> {
    fn swu(&self, agent: AgentId) -> RepoResult<Vec<TimePoint>> {
        self.series(
            "TimeSeriesEnrichmentSWU",
            "SELECT Time, Value FROM TimeSeriesEnrichmentSWU WHERE AgentId = ? ORDER BY Time;",
            vec![Value::Integer(agent)],
        )
    }

    fn power(&self, agent: AgentId) -> RepoResult<Vec<TimePoint>> {
        self.series(
            "TimeSeriesPower",
            "SELECT Time, Value FROM TimeSeriesPower WHERE AgentId = ? ORDER BY Time;",
            vec![Value::Integer(agent)],
        )
    }

    fn enrichment_feed(&self) -> RepoResult<Vec<TimePoint>> {
        self.series(
            "TimeSeriesEnrichmentFeed",
            "SELECT Time, SUM(Value) FROM TimeSeriesEnrichmentFeed GROUP BY Time ORDER BY Time;",
            Vec::new(),
        )
    }
}
