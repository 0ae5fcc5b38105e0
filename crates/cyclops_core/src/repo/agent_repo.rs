//! Agent lookups over `AgentEntry` / `AgentExit`.
//!
//! # Responsibility
//! - Resolve archetype and prototype names into agent id sets.
//! - Provide reactor lifecycle rows for capacity accounting.
//!
//! # Invariants
//! - Returned id lists are sorted ascending.
//! - Reactor exit times come from `AgentExit` whenever that table exists.

use crate::db::table_exists;
use crate::model::agent::{AgentEntry, AgentId, AgentSelector, Institution, ReactorLifecycle};
use crate::repo::{RepoError, RepoResult};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Read-only agent queries.
pub trait AgentRepository {
    /// Agents whose archetype spec contains `archetype` (case-insensitive).
    fn agent_ids_by_spec(&self, archetype: &str) -> RepoResult<Vec<AgentId>>;
    /// Agents whose prototype equals `prototype` (case-insensitive).
    fn agent_ids_by_prototype(&self, prototype: &str) -> RepoResult<Vec<AgentId>>;
    fn institutions(&self) -> RepoResult<Vec<Institution>>;
    fn prototype_of(&self, agent_id: AgentId) -> RepoResult<String>;
    fn list_agents(&self) -> RepoResult<Vec<AgentEntry>>;
    fn reactor_lifecycles(&self) -> RepoResult<Vec<ReactorLifecycle>>;

    fn resolve(&self, selector: &AgentSelector) -> RepoResult<Vec<AgentId>> {
        match selector {
            AgentSelector::Spec(archetype) => self.agent_ids_by_spec(archetype),
            AgentSelector::Prototype(prototype) => self.agent_ids_by_prototype(prototype),
        }
    }
}

/// SQLite-backed agent repository.
pub struct SqliteAgentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAgentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn collect_ids(&self, sql: &str, value: &str) -> RepoResult<Vec<AgentId>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([value], |row| row.get::<_, AgentId>(0))?;
        let mut ids = rows.collect::<Result<Vec<_>, _>>()?;
        ids.sort_unstable();
        Ok(ids)
    }
}

impl AgentRepository for SqliteAgentRepository<'_> {
    fn agent_ids_by_spec(&self, archetype: &str) -> RepoResult<Vec<AgentId>> {
        self.collect_ids(
            "SELECT AgentId FROM AgentEntry WHERE Spec LIKE ?1 ESCAPE '\\';",
            &format!("%{}%", escape_like(archetype)),
        )
    }

    fn agent_ids_by_prototype(&self, prototype: &str) -> RepoResult<Vec<AgentId>> {
        self.collect_ids(
            "SELECT AgentId FROM AgentEntry WHERE Prototype = ?1 COLLATE NOCASE;",
            prototype,
        )
    }

    fn institutions(&self) -> RepoResult<Vec<Institution>> {
        let mut stmt = self.conn.prepare(
            "SELECT Prototype, AgentId
             FROM AgentEntry
             WHERE Kind = 'Inst'
             ORDER BY AgentId;",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Institution {
                prototype: row.get(0)?,
                agent_id: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn prototype_of(&self, agent_id: AgentId) -> RepoResult<String> {
        self.conn
            .query_row(
                "SELECT Prototype FROM AgentEntry WHERE AgentId = ?1;",
                params![agent_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .ok_or_else(|| RepoError::not_found("agent", agent_id.to_string()))
    }

    fn list_agents(&self) -> RepoResult<Vec<AgentEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT AgentId, Kind, Spec, Prototype, ParentId, Lifetime, EnterTime
             FROM AgentEntry
             ORDER BY AgentId;",
        )?;
        let mut rows = stmt.query([])?;
        let mut agents = Vec::new();
        while let Some(row) = rows.next()? {
            agents.push(parse_agent_row(row)?);
        }
        Ok(agents)
    }

    fn reactor_lifecycles(&self) -> RepoResult<Vec<ReactorLifecycle>> {
        if !table_exists(self.conn, "TimeSeriesPower")? {
            warn!("event=reactor_lifecycles module=repo status=skip reason=no_power_table");
            return Ok(Vec::new());
        }
        let has_exit_table = table_exists(self.conn, "AgentExit")?;
        let sql = if has_exit_table {
            "SELECT MAX(p.Value), p.AgentId, e.ParentId, e.EnterTime, e.Lifetime, x.ExitTime
             FROM TimeSeriesPower p
             INNER JOIN AgentEntry e ON e.AgentId = p.AgentId
             LEFT JOIN AgentExit x ON x.AgentId = p.AgentId
             GROUP BY p.AgentId
             ORDER BY p.AgentId;"
        } else {
            "SELECT MAX(p.Value), p.AgentId, e.ParentId, e.EnterTime, e.Lifetime, NULL
             FROM TimeSeriesPower p
             INNER JOIN AgentEntry e ON e.AgentId = p.AgentId
             GROUP BY p.AgentId
             ORDER BY p.AgentId;"
        };

        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut lifecycles = Vec::new();
        while let Some(row) = rows.next()? {
            let enter_time: i64 = row.get(3)?;
            let lifetime: i64 = row.get(4)?;
            let recorded_exit: Option<i64> = row.get(5)?;
            let exit_time = if has_exit_table {
                recorded_exit
            } else if lifetime >= 0 {
                Some(enter_time + lifetime)
            } else {
                None
            };
            lifecycles.push(ReactorLifecycle {
                max_power: row.get(0)?,
                agent_id: row.get(1)?,
                parent_id: row.get(2)?,
                enter_time,
                exit_time,
            });
        }
        Ok(lifecycles)
    }
}

fn parse_agent_row(row: &Row<'_>) -> RepoResult<AgentEntry> {
    let parent_id: Option<AgentId> = row.get(4)?;
    Ok(AgentEntry {
        agent_id: row.get(0)?,
        kind: row.get(1)?,
        spec: row.get(2)?,
        prototype: row.get(3)?,
        // Root agents carry ParentId = -1.
        parent_id: parent_id.filter(|id| *id >= 0),
        lifetime: row.get(5)?,
        enter_time: row.get(6)?,
    })
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escape_like_protects_wildcards() {
        assert_eq!(escape_like("uox_fab"), "uox\\_fab");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("Reactor"), "Reactor");
    }
}
