#![allow(dead_code)]

use rusqlite::{params, Connection};
use std::path::Path;

pub const U235: i32 = 922350000;
pub const U238: i32 = 922380000;
pub const PU239: i32 = 942390000;
pub const CS137: i32 = 551370000;

/// Subset of the Cyclus output schema this crate reads.
pub const SCHEMA_SQL: &str = "
CREATE TABLE Info (
    SimId BLOB, Handle TEXT, InitialYear INTEGER, InitialMonth INTEGER,
    Duration INTEGER
);
CREATE TABLE AgentEntry (
    SimId BLOB, AgentId INTEGER, Kind TEXT, Spec TEXT, Prototype TEXT,
    ParentId INTEGER, Lifetime INTEGER, EnterTime INTEGER
);
CREATE TABLE AgentExit (SimId BLOB, AgentId INTEGER, ExitTime INTEGER);
CREATE TABLE Transactions (
    SimId BLOB, TransactionId INTEGER, SenderId INTEGER, ReceiverId INTEGER,
    ResourceId INTEGER, Commodity TEXT, Time INTEGER
);
CREATE TABLE Resources (
    SimId BLOB, ResourceId INTEGER, ObjId INTEGER, Type TEXT,
    TimeCreated INTEGER, Quantity REAL, Units TEXT, QualId INTEGER,
    Parent1 INTEGER, Parent2 INTEGER
);
CREATE TABLE Compositions (SimId BLOB, QualId INTEGER, NucId INTEGER, MassFrac REAL);
CREATE TABLE Recipes (SimId BLOB, Recipe TEXT, QualId INTEGER);
CREATE TABLE TimeSeriesPower (SimId BLOB, AgentId INTEGER, Time INTEGER, Value REAL);
CREATE TABLE TimeSeriesEnrichmentSWU (SimId BLOB, AgentId INTEGER, Time INTEGER, Value REAL);
CREATE TABLE TimeSeriesEnrichmentFeed (SimId BLOB, AgentId INTEGER, Time INTEGER, Value REAL);
CREATE TABLE AgentStateInventories (
    SimId BLOB, AgentId INTEGER, ResourceId INTEGER, InventoryName TEXT
);
";

pub const MINE: i64 = 10;
pub const ENRICHMENT: i64 = 11;
pub const LWR_1: i64 = 12;
pub const LWR_2: i64 = 13;
pub const REPOSITORY: i64 = 14;
pub const STORAGE: i64 = 15;
pub const USA: i64 = 1;

/// In-memory once-through fuel cycle over twelve monthly steps from
/// January 2000.
///
/// - `mine` ships 1000 kg of `natl_u` to `enrichment` at t=1.
/// - `enrichment` ships 200 kg and 300 kg of `uox` to `lwr_1` and `lwr_2`
///   at t=2.
/// - `lwr_1` ships 150 kg of `spent_uox` to `repository` at t=5.
/// - `mine` ships 50 kg of compositionless `mystery` to `o'brien pool` at
///   t=6.
/// - `lwr_1` runs 1000 MWe from t=2 and exits at t=8; `lwr_2` runs 900 MWe
///   from t=0.
pub fn fixture_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    populate(&conn);
    conn
}

/// Writes the fixture to `path` as a file database.
pub fn write_fixture_file(path: &Path) {
    let conn = Connection::open(path).unwrap();
    populate(&conn);
}

pub fn populate(conn: &Connection) {
    conn.execute_batch(SCHEMA_SQL).unwrap();
    conn.execute(
        "INSERT INTO Info (InitialYear, InitialMonth, Duration) VALUES (2000, 1, 12);",
        [],
    )
    .unwrap();

    let agents: [(i64, &str, &str, &str, i64, i64, i64); 8] = [
        (0, "Region", ":agents:NullRegion", "world", -1, -1, 0),
        (USA, "Inst", ":cycamore:DeployInst", "usa_government", 0, -1, 0),
        (MINE, "Facility", ":cycamore:Source", "mine", USA, -1, 0),
        (ENRICHMENT, "Facility", ":cycamore:Enrichment", "enrichment", USA, -1, 0),
        (LWR_1, "Facility", ":cycamore:Reactor", "lwr_1", USA, 6, 2),
        (LWR_2, "Facility", ":cycamore:Reactor", "lwr_2", USA, -1, 0),
        (REPOSITORY, "Facility", ":cycamore:Sink", "repository", USA, -1, 0),
        (STORAGE, "Facility", ":cycamore:Storage", "o'brien pool", USA, -1, 0),
    ];
    for (id, kind, spec, prototype, parent, lifetime, enter) in agents {
        conn.execute(
            "INSERT INTO AgentEntry
                 (AgentId, Kind, Spec, Prototype, ParentId, Lifetime, EnterTime)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![id, kind, spec, prototype, parent, lifetime, enter],
        )
        .unwrap();
    }
    conn.execute(
        "INSERT INTO AgentExit (AgentId, ExitTime) VALUES (?1, 8);",
        params![LWR_1],
    )
    .unwrap();

    let compositions: [(i64, i32, f64); 12] = [
        (1, U235, 0.01),
        (1, U238, 0.99),
        (2, U235, 0.04),
        (2, U238, 0.96),
        (3, U235, 0.01),
        (3, U238, 0.9),
        (3, PU239, 0.01),
        (3, CS137, 0.08),
        (5, U238, 1.0),
        (6, PU239, 0.05),
        (6, U238, 0.95),
        (7, U238, 1.0),
    ];
    for (qual_id, nuc_id, frac) in compositions {
        conn.execute(
            "INSERT INTO Compositions (QualId, NucId, MassFrac) VALUES (?1, ?2, ?3);",
            params![qual_id, nuc_id, frac],
        )
        .unwrap();
    }
    for (recipe, qual_id) in [
        ("natl_u", 1),
        ("uox_fresh", 2),
        ("uox_spent", 3),
        ("depleted_u", 5),
        ("mox_fresh", 6),
    ] {
        conn.execute(
            "INSERT INTO Recipes (Recipe, QualId) VALUES (?1, ?2);",
            params![recipe, qual_id],
        )
        .unwrap();
    }

    // (transaction, sender, receiver, resource, commodity, time, quantity, qualid)
    let transfers: [(i64, i64, i64, i64, &str, i64, f64, i64); 5] = [
        (1, MINE, ENRICHMENT, 100, "natl_u", 1, 1000.0, 1),
        (2, ENRICHMENT, LWR_1, 101, "uox", 2, 200.0, 2),
        (3, ENRICHMENT, LWR_2, 102, "uox", 2, 300.0, 2),
        (4, LWR_1, REPOSITORY, 103, "spent_uox", 5, 150.0, 3),
        (5, MINE, STORAGE, 104, "mystery", 6, 50.0, 4),
    ];
    for (tx, sender, receiver, resource, commodity, time, quantity, qual_id) in transfers {
        conn.execute(
            "INSERT INTO Resources
                 (ResourceId, ObjId, Type, TimeCreated, Quantity, Units, QualId)
             VALUES (?1, ?1, 'Material', ?2, ?3, 'kg', ?4);",
            params![resource, time, quantity, qual_id],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO Transactions
                 (TransactionId, SenderId, ReceiverId, ResourceId, Commodity, Time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![tx, sender, receiver, resource, commodity, time],
        )
        .unwrap();
    }
    for (agent, resource, name) in [(REPOSITORY, 103, "inventory"), (STORAGE, 104, "stocks")] {
        conn.execute(
            "INSERT INTO AgentStateInventories (AgentId, ResourceId, InventoryName)
             VALUES (?1, ?2, ?3);",
            params![agent, resource, name],
        )
        .unwrap();
    }

    let mut power = Vec::new();
    power.extend((2..8).map(|time| (LWR_1, time, 1000.0)));
    power.extend((0..12).map(|time| (LWR_2, time, 900.0)));
    insert_metric(conn, "TimeSeriesPower", &power);
    insert_metric(
        conn,
        "TimeSeriesEnrichmentSWU",
        &[(ENRICHMENT, 1, 10.0), (ENRICHMENT, 2, 5.0)],
    );
    insert_metric(
        conn,
        "TimeSeriesEnrichmentFeed",
        &[(ENRICHMENT, 1, 1000.0), (ENRICHMENT, 2, 500.0)],
    );
}

fn insert_metric(conn: &Connection, table: &str, rows: &[(i64, i64, f64)]) {
    let sql = format!("INSERT INTO {table} (AgentId, Time, Value) VALUES (?1, ?2, ?3);");
    for (agent, time, value) in rows {
        conn.execute(&sql, params![agent, time, value]).unwrap();
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
