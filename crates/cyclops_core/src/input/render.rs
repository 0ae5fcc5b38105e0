use super::fleet::{FleetRecord, ReactorListRow};
use super::template::Template;
use super::{write_output, InputError, InputResult};
use crate::config::{ReactorSpec, FALLBACK_REACTOR_TYPE};
use log::{info, warn};
use minijinja::{context, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;

/// Isotope name to mass fraction.
pub type Recipe = BTreeMap<String, f64>;

/// Value of the simulator's `<decay>` control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecayMode {
    #[default]
    Never,
    Manual,
    Lazy,
}

impl DecayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Manual => "manual",
            Self::Lazy => "lazy",
        }
    }
}

impl Display for DecayMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecayMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "never" => Ok(Self::Never),
            "manual" => Ok(Self::Manual),
            "lazy" => Ok(Self::Lazy),
            other => Err(format!(
                "unknown decay mode `{other}`; expected never, manual or lazy"
            )),
        }
    }
}

/// Top-level simulation control values of the main input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationParams {
    pub duration: u32,
    pub start_month: u32,
    pub start_year: i32,
    pub decay: DecayMode,
}

/// Renders one reactor body and one region body per row of `list`.
pub fn write_reactors(
    list: &[ReactorListRow],
    reactor_tpl: &Template,
    region_tpl: &Template,
    reactor_out: &Path,
    region_out: &Path,
) -> InputResult<()> {
    let mut reactors = String::new();
    let mut regions = String::new();
    for row in list {
        reactors.push_str(&reactor_tpl.render(context! {
            country => &row.country,
            reactor_name => &row.reactor_name,
            n_assem_core => row.n_assem_core,
            n_assem_batch => row.n_assem_batch,
            capacity => row.capacity,
        })?);
        regions.push_str(&region_tpl.render(context! {
            country => &row.country,
            reactor_name => &row.reactor_name,
        })?);
    }
    write_output(reactor_out, &reactors)?;
    write_output(region_out, &regions)?;

    info!(
        "event=write_reactors module=input status=ok rows={} reactor_out={} region_out={}",
        list.len(),
        reactor_out.display(),
        region_out.display()
    );
    Ok(())
}

/// Renders the reactor prototypes of `fleet`, one per distinct
/// (name, type, capacity).
pub fn write_reactor(
    fleet: &[FleetRecord],
    template: &Template,
    out: &Path,
    specs: &BTreeMap<String, ReactorSpec>,
) -> InputResult<()> {
    let mut seen = BTreeSet::new();
    let unique: Vec<&FleetRecord> = fleet
        .iter()
        .filter(|record| {
            seen.insert((
                record.reactor_name.as_str(),
                record.reactor_type.as_str(),
                record.net_capacity.to_bits(),
            ))
        })
        .collect();

    let fallback = specs.get(FALLBACK_REACTOR_TYPE).copied().unwrap_or_default();
    let separator = if unique.len() > 1 { "\n \n" } else { "" };
    let mut body = String::new();
    for record in &unique {
        let spec = match specs.get(&record.reactor_type) {
            Some(spec) => *spec,
            None => {
                warn!(
                    "event=write_reactor module=input status=fallback reactor={} type={} reason=unknown_type",
                    record.reactor_name, record.reactor_type
                );
                fallback
            }
        };
        body.push_str(&template.render(context! {
            reactor_name => &record.reactor_name,
            assem_size => spec.assem_size,
            n_assem_core => spec.n_assem_core,
            n_assem_batch => spec.n_assem_batch,
            capacity => number(record.net_capacity),
        })?);
        body.push_str(separator);
    }
    write_output(out, &body)?;

    info!(
        "event=write_reactor module=input status=ok reactors={} path={}",
        unique.len(),
        out.display()
    );
    Ok(())
}

/// Renders the region with `country_reactor_dict[country][operator][name]
/// = [count, capacity]` and `countries_infra = deployment`.
///
/// Every operator of the fleet appears under every country; operators with
/// no reactors in a country map to an empty table.
pub fn write_region(
    fleet: &[FleetRecord],
    deployment: &BTreeMap<String, u32>,
    template: &Template,
    out: &Path,
) -> InputResult<()> {
    let mut counts: BTreeMap<(&str, &str, &str, u64), usize> = BTreeMap::new();
    for record in fleet {
        *counts
            .entry((
                record.country.as_str(),
                record.operator.as_str(),
                record.reactor_name.as_str(),
                record.net_capacity.to_bits(),
            ))
            .or_default() += 1;
    }

    let operators: BTreeSet<&str> = fleet.iter().map(|record| record.operator.as_str()).collect();
    let mut nested: BTreeMap<&str, BTreeMap<&str, BTreeMap<&str, Value>>> = BTreeMap::new();
    for ((country, operator, name, capacity), count) in counts {
        nested
            .entry(country)
            .or_insert_with(|| {
                operators
                    .iter()
                    .map(|operator| (*operator, BTreeMap::new()))
                    .collect()
            })
            .entry(operator)
            .or_default()
            .insert(
                name,
                Value::from(vec![Value::from(count as u64), number(f64::from_bits(capacity))]),
            );
    }

    let body = template.render(context! {
        country_reactor_dict => nested,
        countries_infra => deployment,
    })?;
    write_output(out, &body)?;

    info!(
        "event=write_region module=input status=ok rows={} path={}",
        fleet.len(),
        out.display()
    );
    Ok(())
}

/// Pairs isotope names with compositions for fresh and spent fuel.
pub fn recipe_dict(
    fresh_ids: &[String],
    fresh_comps: &[f64],
    spent_ids: &[String],
    spent_comps: &[f64],
) -> InputResult<(Recipe, Recipe)> {
    if fresh_ids.len() != fresh_comps.len() {
        return Err(InputError::LengthMismatch(format!(
            "{} fresh ids for {} fresh compositions",
            fresh_ids.len(),
            fresh_comps.len()
        )));
    }
    if spent_ids.len() != spent_comps.len() {
        return Err(InputError::LengthMismatch(format!(
            "{} spent ids for {} spent compositions",
            spent_ids.len(),
            spent_comps.len()
        )));
    }
    let pair = |ids: &[String], comps: &[f64]| -> Recipe {
        ids.iter().cloned().zip(comps.iter().copied()).collect()
    };
    Ok((pair(fresh_ids, fresh_comps), pair(spent_ids, spent_comps)))
}

pub fn write_recipes(
    fresh: &Recipe,
    spent: &Recipe,
    template: &Template,
    out: &Path,
) -> InputResult<()> {
    let body = template.render(context! {
        fresh_fuel => fresh,
        spent_fuel => spent,
    })?;
    write_output(out, &body)?;
    info!("event=write_recipes module=input status=ok path={}", out.display());
    Ok(())
}

/// Embeds the rendered reactor, region and recipe files into the main
/// input template.
pub fn write_main_input(
    params: &SimulationParams,
    reactor_file: &Path,
    region_file: &Path,
    recipe_file: &Path,
    template: &Template,
    out: &Path,
) -> InputResult<()> {
    let read = |path: &Path| std::fs::read_to_string(path).map_err(|err| InputError::io(path, err));
    let reactor_input = read(reactor_file)?;
    let region_input = read(region_file)?;
    let recipe_input = read(recipe_file)?;

    let body = template.render(context! {
        duration => params.duration,
        start_month => params.start_month,
        start_year => params.start_year,
        decay => params.decay.as_str(),
        reactor_input => reactor_input,
        region_input => region_input,
        recipe_input => recipe_input,
    })?;
    write_output(out, &body)?;
    info!(
        "event=write_main_input module=input status=ok path={}",
        out.display()
    );
    Ok(())
}

/// Whole capacities render as integers (`1000`, not `1000.0`).
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        recipe_dict, write_main_input, write_reactor, write_reactors, write_recipes,
        write_region, DecayMode, SimulationParams,
    };
    use crate::config::CyclopsConfig;
    use crate::input::{FleetRecord, InputError, ReactorListRow, Template};
    use tempfile::TempDir;

    fn record(country: &str, name: &str, kind: &str, capacity: f64, operator: &str) -> FleetRecord {
        FleetRecord {
            country: country.to_string(),
            reactor_name: name.to_string(),
            reactor_type: kind.to_string(),
            net_capacity: capacity,
            operator: operator.to_string(),
        }
    }

    #[test]
    fn reactor_list_renders_one_body_per_row() {
        let dir = TempDir::new().unwrap();
        let reactor_out = dir.path().join("reactors.xml");
        let region_out = dir.path().join("regions.xml");
        std::fs::write(&reactor_out, "stale").unwrap();
        let list = vec![
            ReactorListRow {
                country: "France".to_string(),
                reactor_name: "A".to_string(),
                capacity: 900,
                n_assem_core: 157,
                n_assem_batch: 52,
            },
            ReactorListRow {
                country: "Spain".to_string(),
                reactor_name: "B".to_string(),
                capacity: 1000,
                n_assem_core: 3,
                n_assem_batch: 1,
            },
        ];

        write_reactors(
            &list,
            &Template::from_source("r", "[{{ reactor_name }}:{{ capacity }}:{{ n_assem_core }}]"),
            &Template::from_source("g", "<{{ country }}/{{ reactor_name }}>"),
            &reactor_out,
            &region_out,
        )
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&reactor_out).unwrap(),
            "[A:900:157][B:1000:3]"
        );
        assert_eq!(
            std::fs::read_to_string(&region_out).unwrap(),
            "<France/A><Spain/B>"
        );
    }

    #[test]
    fn reactor_bodies_deduplicate_and_fall_back_to_pwr() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("reactor.xml");
        let fleet = vec![
            record("USA", "Vogtle", "PWR", 1109.0, "Southern"),
            record("USA", "Vogtle", "PWR", 1109.0, "Georgia Power"),
            record("USA", "Clinch", "SMR", 77.5, "TVA"),
        ];
        let template =
            Template::from_source("r", "{{ reactor_name }} {{ assem_size }} {{ capacity }}");

        write_reactor(&fleet, &template, &out, &CyclopsConfig::default().reactor_specs).unwrap();

        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "Vogtle 33000 1109\n \nClinch 33000 77.5\n \n"
        );
    }

    #[test]
    fn single_reactor_has_no_separator() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("reactor.xml");
        let fleet = vec![record("USA", "Vogtle", "BWR", 1109.0, "Southern")];

        write_reactor(
            &fleet,
            &Template::from_source("r", "{{ reactor_name }}"),
            &out,
            &CyclopsConfig::default().reactor_specs,
        )
        .unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "Vogtle");
    }

    #[test]
    fn region_context_nests_country_operator_reactor() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("region.xml");
        let fleet = vec![
            record("USA", "Vogtle", "PWR", 1109.0, "Southern"),
            record("USA", "Vogtle", "PWR", 1109.0, "Southern"),
            record("France", "Civaux", "PWR", 1495.0, "EDF"),
        ];
        let template = Template::from_source(
            "g",
            "{% for country, ops in country_reactor_dict.items() %}{{ country }}(\
             {% for op, reactors in ops.items() %}{{ op }}:\
             {% for name, info in reactors.items() %}{{ name }}x{{ info[0] }}@{{ info[1] }}\
             {% endfor %}{% endfor %}){% endfor %} mines={{ countries_infra.n_mine }}",
        );

        write_region(&fleet, &CyclopsConfig::default().deployment, &template, &out).unwrap();

        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "France(EDF:Civauxx1@1495Southern:)USA(EDF:Southern:Vogtlex2@1109) mines=1"
        );
    }

    #[test]
    fn recipe_lengths_must_match() {
        let ids = vec!["U235".to_string(), "U238".to_string()];
        let err = recipe_dict(&ids, &[0.04], &ids, &[0.01, 0.99]).unwrap_err();
        assert!(matches!(err, InputError::LengthMismatch(_)));

        let (fresh, spent) = recipe_dict(&ids, &[0.04, 0.96], &ids, &[0.01, 0.99]).unwrap();
        assert_eq!(fresh.get("U235"), Some(&0.04));
        assert_eq!(spent.get("U238"), Some(&0.99));
    }

    #[test]
    fn main_input_embeds_rendered_parts() {
        let dir = TempDir::new().unwrap();
        let reactor = dir.path().join("reactor.xml");
        let region = dir.path().join("region.xml");
        let recipe = dir.path().join("recipe.xml");
        let out = dir.path().join("nested/main.xml");
        std::fs::write(&reactor, "<reactor/>").unwrap();
        std::fs::write(&region, "<region/>").unwrap();

        let ids = vec!["U235".to_string()];
        let (fresh, spent) = recipe_dict(&ids, &[1.0], &ids, &[0.5]).unwrap();
        write_recipes(
            &fresh,
            &spent,
            &Template::from_source(
                "c",
                "{% for id, c in fresh_fuel.items() %}<{{ id }}>{% endfor %}",
            ),
            &recipe,
        )
        .unwrap();

        let params = SimulationParams {
            duration: 120,
            start_month: 1,
            start_year: 2020,
            decay: DecayMode::default(),
        };
        write_main_input(
            &params,
            &reactor,
            &region,
            &recipe,
            &Template::from_source(
                "m",
                "{{ duration }}/{{ start_month }}/{{ start_year }}/{{ decay }}\
                 {{ reactor_input }}{{ region_input }}{{ recipe_input }}",
            ),
            &out,
        )
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "120/1/2020/never<reactor/><region/><U235>"
        );
    }

    #[test]
    fn decay_modes_parse_case_insensitively() {
        assert_eq!("Lazy".parse::<DecayMode>(), Ok(DecayMode::Lazy));
        assert_eq!(" manual ".parse::<DecayMode>(), Ok(DecayMode::Manual));
        assert_eq!(DecayMode::default().to_string(), "never");
        assert!("false".parse::<DecayMode>().is_err());
    }
}
