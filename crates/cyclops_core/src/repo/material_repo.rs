//! Material movement queries over `Transactions`, `Resources` and `Compositions`.
//!
//! # Responsibility
//! - Return grouped, sparse rows; densifying into time series happens in
//!   `series`.
//! - Resolve recipe and commodity names into composition records.
//!
//! # Invariants
//! - Agent id lists are bound through generated `IN (?, ...)` lists.
//! - Isotopic rows weight each resource by its own mass fraction
//!   (`SUM(Quantity * MassFrac)` per `(time, nucid)`).
//! - Resources without a composition contribute no isotopic rows.

use crate::db::{require_table, DbError};
use crate::model::agent::{AgentId, FluxDirection};
use crate::model::material::{
    CompositionRow, InventoryStream, IsotopePoint, QualId, QualMass, ResourceFlow, TimePoint,
};
use crate::model::timeline::SimInfo;
use crate::repo::{placeholders, RepoError, RepoResult};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const TRANSFER_FROM_SQL: &str = "FROM Resources
    INNER JOIN Transactions ON Transactions.ResourceId = Resources.ResourceId";

const ISOTOPIC_TRANSFER_FROM_SQL: &str = "FROM Resources
    INNER JOIN Transactions ON Transactions.ResourceId = Resources.ResourceId
    INNER JOIN Compositions ON Compositions.QualId = Resources.QualId";

/// Read-only material queries.
pub trait MaterialRepository {
    /// Start date and duration from the `Info` table.
    fn sim_info(&self) -> RepoResult<SimInfo>;
    fn compositions(&self) -> RepoResult<Vec<CompositionRow>>;
    fn composition_of(&self, qual_id: QualId) -> RepoResult<Vec<CompositionRow>>;
    fn recipe_composition(&self, recipe: &str) -> RepoResult<Vec<CompositionRow>>;
    fn qual_id_of_recipe(&self, recipe: &str) -> RepoResult<QualId>;
    /// Composition of the earliest resource traded as `commodity`.
    fn qual_id_of_commodity(&self, commodity: &str) -> RepoResult<QualId>;
    /// Distinct traded commodity names.
    fn commodities(&self) -> RepoResult<Vec<String>>;

    /// `(time, SUM(quantity), qualid)` grouped by time and composition.
    fn resource_flux(
        &self,
        agents: &[AgentId],
        direction: FluxDirection,
    ) -> RepoResult<Vec<ResourceFlow>>;
    fn commodity_flux(
        &self,
        agents: &[AgentId],
        direction: FluxDirection,
        commodity: &str,
    ) -> RepoResult<Vec<TimePoint>>;
    fn isotopic_commodity_flux(
        &self,
        agents: &[AgentId],
        direction: FluxDirection,
        commodity: &str,
    ) -> RepoResult<Vec<IsotopePoint>>;
    fn trade(&self, senders: &[AgentId], receivers: &[AgentId]) -> RepoResult<Vec<TimePoint>>;
    fn isotopic_trade(
        &self,
        senders: &[AgentId],
        receivers: &[AgentId],
    ) -> RepoResult<Vec<IsotopePoint>>;
    /// Mass traded as `commodity` per timestep, whoever the parties are.
    fn commodity_usage(&self, commodity: &str) -> RepoResult<Vec<TimePoint>>;
    /// Mass of `commodity` sent by `senders` per timestep.
    fn commodity_from(&self, commodity: &str, senders: &[AgentId]) -> RepoResult<Vec<TimePoint>>;
    /// Mass received by agents whose archetype contains `Reactor`.
    fn fuel_into_reactors(&self) -> RepoResult<Vec<TimePoint>>;
    /// Total mass received by `agents`, per composition.
    fn sink_inventory(&self, agents: &[AgentId]) -> RepoResult<Vec<QualMass>>;
    /// `(time created, quantity)` of resources held in agent inventories.
    fn inventory(&self, agents: &[AgentId]) -> RepoResult<Vec<TimePoint>>;
    /// Inventory totals of one agent, per inventory name and composition.
    fn inventory_streams(&self, agent: AgentId) -> RepoResult<Vec<InventoryStream>>;
}

/// SQLite-backed material repository.
pub struct SqliteMaterialRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMaterialRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn time_points(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<TimePoint>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(bind_values), |row| {
            Ok(TimePoint::new(row.get(0)?, row.get(1)?))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn isotope_points(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<IsotopePoint>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(bind_values), |row| {
            Ok(IsotopePoint {
                time: row.get(0)?,
                mass: row.get(1)?,
                nuc_id: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn composition_rows(
        &self,
        sql: &str,
        bind_values: Vec<Value>,
    ) -> RepoResult<Vec<CompositionRow>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(bind_values), parse_composition_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

impl MaterialRepository for SqliteMaterialRepository<'_> {
    fn sim_info(&self) -> RepoResult<SimInfo> {
        let row = self
            .conn
            .query_row(
                "SELECT InitialYear, InitialMonth, Duration FROM Info LIMIT 1;",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;
        let (year, month, duration) = row.ok_or(DbError::MissingInfo)?;

        let init_year = i32::try_from(year)
            .map_err(|_| RepoError::InvalidData(format!("initial year out of range: {year}")))?;
        let init_month = u32::try_from(month)
            .ok()
            .filter(|month| (1..=12).contains(month))
            .ok_or_else(|| RepoError::InvalidData(format!("invalid initial month: {month}")))?;
        let duration = usize::try_from(duration)
            .map_err(|_| RepoError::InvalidData(format!("negative duration: {duration}")))?;
        Ok(SimInfo::new(init_year, init_month, duration))
    }

    fn compositions(&self) -> RepoResult<Vec<CompositionRow>> {
        self.composition_rows(
            "SELECT QualId, NucId, MassFrac FROM Compositions ORDER BY QualId, NucId;",
            Vec::new(),
        )
    }

    fn composition_of(&self, qual_id: QualId) -> RepoResult<Vec<CompositionRow>> {
        self.composition_rows(
            "SELECT QualId, NucId, MassFrac FROM Compositions WHERE QualId = ? ORDER BY NucId;",
            vec![Value::Integer(qual_id)],
        )
    }

    fn recipe_composition(&self, recipe: &str) -> RepoResult<Vec<CompositionRow>> {
        let qual_id = self.qual_id_of_recipe(recipe)?;
        self.composition_of(qual_id)
    }

    fn qual_id_of_recipe(&self, recipe: &str) -> RepoResult<QualId> {
        require_table(self.conn, "Recipes")?;
        self.conn
            .query_row(
                "SELECT QualId FROM Recipes WHERE Recipe = ?1 LIMIT 1;",
                params![recipe],
                |row| row.get::<_, QualId>(0),
            )
            .optional()?
            .ok_or_else(|| RepoError::not_found("recipe", recipe))
    }

    fn qual_id_of_commodity(&self, commodity: &str) -> RepoResult<QualId> {
        self.conn
            .query_row(
                &format!(
                    "SELECT Resources.QualId {TRANSFER_FROM_SQL}
                     WHERE Transactions.Commodity = ?1
                     ORDER BY Transactions.Time, Resources.ResourceId
                     LIMIT 1;"
                ),
                params![commodity],
                |row| row.get::<_, QualId>(0),
            )
            .optional()?
            .ok_or_else(|| RepoError::not_found("commodity", commodity))
    }

    fn commodities(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT Commodity FROM Transactions ORDER BY Commodity;")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn resource_flux(
        &self,
        agents: &[AgentId],
        direction: FluxDirection,
    ) -> RepoResult<Vec<ResourceFlow>> {
        if skip_empty("resource_flux", agents) {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT Transactions.Time, SUM(Resources.Quantity), Resources.QualId
             {TRANSFER_FROM_SQL}
             WHERE {column} IN ({list})
             GROUP BY Transactions.Time, Resources.QualId
             ORDER BY Transactions.Time, Resources.QualId;",
            column = direction.agent_column(),
            list = placeholders(agents.len()),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(id_values(agents)), |row| {
            Ok(ResourceFlow {
                time: row.get(0)?,
                quantity: row.get(1)?,
                qual_id: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn commodity_flux(
        &self,
        agents: &[AgentId],
        direction: FluxDirection,
        commodity: &str,
    ) -> RepoResult<Vec<TimePoint>> {
        if skip_empty("commodity_flux", agents) {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT Transactions.Time, SUM(Resources.Quantity)
             {TRANSFER_FROM_SQL}
             WHERE {column} IN ({list}) AND Transactions.Commodity = ?
             GROUP BY Transactions.Time
             ORDER BY Transactions.Time;",
            column = direction.agent_column(),
            list = placeholders(agents.len()),
        );
        let mut bind_values = id_values(agents);
        bind_values.push(Value::Text(commodity.to_string()));
        self.time_points(&sql, bind_values)
    }

    fn isotopic_commodity_flux(
        &self,
        agents: &[AgentId],
        direction: FluxDirection,
        commodity: &str,
    ) -> RepoResult<Vec<IsotopePoint>> {
        if skip_empty("isotopic_commodity_flux", agents) {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT Transactions.Time, SUM(Resources.Quantity * Compositions.MassFrac),
                    Compositions.NucId
             {ISOTOPIC_TRANSFER_FROM_SQL}
             WHERE {column} IN ({list}) AND Transactions.Commodity = ?
             GROUP BY Transactions.Time, Compositions.NucId
             ORDER BY Transactions.Time, Compositions.NucId;",
            column = direction.agent_column(),
            list = placeholders(agents.len()),
        );
        let mut bind_values = id_values(agents);
        bind_values.push(Value::Text(commodity.to_string()));
        self.isotope_points(&sql, bind_values)
    }

    fn trade(&self, senders: &[AgentId], receivers: &[AgentId]) -> RepoResult<Vec<TimePoint>> {
        if skip_empty("trade", senders) || skip_empty("trade", receivers) {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT Transactions.Time, SUM(Resources.Quantity)
             {TRANSFER_FROM_SQL}
             WHERE Transactions.SenderId IN ({senders})
               AND Transactions.ReceiverId IN ({receivers})
             GROUP BY Transactions.Time
             ORDER BY Transactions.Time;",
            senders = placeholders(senders.len()),
            receivers = placeholders(receivers.len()),
        );
        let mut bind_values = id_values(senders);
        bind_values.extend(id_values(receivers));
        self.time_points(&sql, bind_values)
    }

    fn isotopic_trade(
        &self,
        senders: &[AgentId],
        receivers: &[AgentId],
    ) -> RepoResult<Vec<IsotopePoint>> {
        if skip_empty("isotopic_trade", senders) || skip_empty("isotopic_trade", receivers) {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT Transactions.Time, SUM(Resources.Quantity * Compositions.MassFrac),
                    Compositions.NucId
             {ISOTOPIC_TRANSFER_FROM_SQL}
             WHERE Transactions.SenderId IN ({senders})
               AND Transactions.ReceiverId IN ({receivers})
             GROUP BY Transactions.Time, Compositions.NucId
             ORDER BY Transactions.Time, Compositions.NucId;",
            senders = placeholders(senders.len()),
            receivers = placeholders(receivers.len()),
        );
        let mut bind_values = id_values(senders);
        bind_values.extend(id_values(receivers));
        self.isotope_points(&sql, bind_values)
    }

    fn commodity_usage(&self, commodity: &str) -> RepoResult<Vec<TimePoint>> {
        self.time_points(
            &format!(
                "SELECT Transactions.Time, SUM(Resources.Quantity)
                 {TRANSFER_FROM_SQL}
                 WHERE Transactions.Commodity = ?
                 GROUP BY Transactions.Time
                 ORDER BY Transactions.Time;"
            ),
            vec![Value::Text(commodity.to_string())],
        )
    }

    fn commodity_from(&self, commodity: &str, senders: &[AgentId]) -> RepoResult<Vec<TimePoint>> {
        if skip_empty("commodity_from", senders) {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT Transactions.Time, SUM(Resources.Quantity)
             {TRANSFER_FROM_SQL}
             WHERE Transactions.Commodity = ? AND Transactions.SenderId IN ({list})
             GROUP BY Transactions.Time
             ORDER BY Transactions.Time;",
            list = placeholders(senders.len()),
        );
        let mut bind_values = vec![Value::Text(commodity.to_string())];
        bind_values.extend(id_values(senders));
        self.time_points(&sql, bind_values)
    }

    fn fuel_into_reactors(&self) -> RepoResult<Vec<TimePoint>> {
        self.time_points(
            &format!(
                "SELECT Transactions.Time, SUM(Resources.Quantity)
                 {TRANSFER_FROM_SQL}
                 INNER JOIN AgentEntry ON AgentEntry.AgentId = Transactions.ReceiverId
                 WHERE AgentEntry.Spec LIKE '%Reactor%'
                 GROUP BY Transactions.Time
                 ORDER BY Transactions.Time;"
            ),
            Vec::new(),
        )
    }

    fn sink_inventory(&self, agents: &[AgentId]) -> RepoResult<Vec<QualMass>> {
        if skip_empty("sink_inventory", agents) {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT Resources.QualId, SUM(Resources.Quantity)
             {TRANSFER_FROM_SQL}
             WHERE Transactions.ReceiverId IN ({list})
             GROUP BY Resources.QualId
             ORDER BY Resources.QualId;",
            list = placeholders(agents.len()),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(id_values(agents)), |row| {
            Ok(QualMass {
                qual_id: row.get(0)?,
                quantity: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn inventory(&self, agents: &[AgentId]) -> RepoResult<Vec<TimePoint>> {
        require_table(self.conn, "AgentStateInventories")?;
        if skip_empty("inventory", agents) {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT Resources.TimeCreated, Resources.Quantity
             FROM Resources
             INNER JOIN AgentStateInventories
                 ON AgentStateInventories.ResourceId = Resources.ResourceId
             WHERE AgentStateInventories.AgentId IN ({list})
             ORDER BY Resources.TimeCreated;",
            list = placeholders(agents.len()),
        );
        self.time_points(&sql, id_values(agents))
    }

    fn inventory_streams(&self, agent: AgentId) -> RepoResult<Vec<InventoryStream>> {
        require_table(self.conn, "AgentStateInventories")?;
        let mut stmt = self.conn.prepare(
            "SELECT SUM(Resources.Quantity), AgentStateInventories.InventoryName, Resources.QualId
             FROM AgentStateInventories
             INNER JOIN Resources ON Resources.ResourceId = AgentStateInventories.ResourceId
             WHERE AgentStateInventories.AgentId = ?1
             GROUP BY AgentStateInventories.InventoryName, Resources.QualId
             ORDER BY AgentStateInventories.InventoryName, Resources.QualId;",
        )?;
        let rows = stmt.query_map(params![agent], |row| {
            Ok(InventoryStream {
                quantity: row.get(0)?,
                inventory_name: row.get(1)?,
                qual_id: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn parse_composition_row(row: &Row<'_>) -> rusqlite::Result<CompositionRow> {
    Ok(CompositionRow {
        qual_id: row.get(0)?,
        nuc_id: row.get(1)?,
        mass_frac: row.get(2)?,
    })
}

fn id_values(ids: &[AgentId]) -> Vec<Value> {
    ids.iter().map(|id| Value::Integer(*id)).collect()
}

fn skip_empty(query: &str, agents: &[AgentId]) -> bool {
    if agents.is_empty() {
        debug!("event={query} module=repo status=skip reason=no_agents");
        true
    } else {
        false
    }
}
