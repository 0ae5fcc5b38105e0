mod common;

use common::{ENRICHMENT, LWR_1, LWR_2, REPOSITORY, STORAGE, USA};
use cyclops_core::{AgentRepository, AgentSelector, RepoError, SqliteAgentRepository};

#[test]
fn spec_lookup_is_case_insensitive_substring() {
    let conn = common::fixture_conn();
    let repo = SqliteAgentRepository::new(&conn);

    assert_eq!(repo.agent_ids_by_spec("reactor").unwrap(), vec![LWR_1, LWR_2]);
    assert_eq!(repo.agent_ids_by_spec("Sink").unwrap(), vec![REPOSITORY]);
    assert!(repo.agent_ids_by_spec("%").unwrap().is_empty());
}

#[test]
fn prototype_lookup_binds_names_with_quotes() {
    let conn = common::fixture_conn();
    let repo = SqliteAgentRepository::new(&conn);

    assert_eq!(
        repo.agent_ids_by_prototype("O'Brien Pool").unwrap(),
        vec![STORAGE]
    );
    assert!(repo.agent_ids_by_prototype("lwr").unwrap().is_empty());
    assert_eq!(
        repo.resolve(&AgentSelector::prototype("enrichment")).unwrap(),
        vec![ENRICHMENT]
    );
}

#[test]
fn institutions_and_prototypes_resolve() {
    let conn = common::fixture_conn();
    let repo = SqliteAgentRepository::new(&conn);

    let institutions = repo.institutions().unwrap();
    assert_eq!(institutions.len(), 1);
    assert_eq!(institutions[0].prototype, "usa_government");
    assert_eq!(institutions[0].agent_id, USA);

    assert_eq!(repo.prototype_of(LWR_2).unwrap(), "lwr_2");
    match repo.prototype_of(999).unwrap_err() {
        RepoError::NotFound { kind, key } => {
            assert_eq!(kind, "agent");
            assert_eq!(key, "999");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn list_agents_drops_negative_parent() {
    let conn = common::fixture_conn();
    let repo = SqliteAgentRepository::new(&conn);

    let agents = repo.list_agents().unwrap();
    assert_eq!(agents.len(), 8);
    assert_eq!(agents[0].prototype, "world");
    assert_eq!(agents[0].parent_id, None);
    assert_eq!(agents[1].parent_id, Some(0));
}

#[test]
fn reactor_lifecycles_use_exit_table() {
    let conn = common::fixture_conn();
    let repo = SqliteAgentRepository::new(&conn);

    let lifecycles = repo.reactor_lifecycles().unwrap();
    assert_eq!(lifecycles.len(), 2);

    assert_eq!(lifecycles[0].agent_id, LWR_1);
    assert_eq!(lifecycles[0].max_power, 1000.0);
    assert_eq!(lifecycles[0].parent_id, USA);
    assert_eq!(lifecycles[0].enter_time, 2);
    assert_eq!(lifecycles[0].exit_time, Some(8));

    assert_eq!(lifecycles[1].agent_id, LWR_2);
    assert_eq!(lifecycles[1].exit_time, None);
}

#[test]
fn reactor_lifecycles_fall_back_to_lifetime() {
    let conn = common::fixture_conn();
    conn.execute_batch("DROP TABLE AgentExit;").unwrap();
    let repo = SqliteAgentRepository::new(&conn);

    let lifecycles = repo.reactor_lifecycles().unwrap();
    assert_eq!(lifecycles[0].exit_time, Some(8));
    assert_eq!(lifecycles[1].exit_time, None);
}

#[test]
fn reactor_lifecycles_are_empty_without_power_table() {
    let conn = common::fixture_conn();
    conn.execute_batch("DROP TABLE TimeSeriesPower;").unwrap();
    let repo = SqliteAgentRepository::new(&conn);

    assert!(repo.reactor_lifecycles().unwrap().is_empty());
}
