//! Fuel-cycle analyses over one simulator output database.
//!
//! # Responsibility
//! - Resolve facility names to agents, run the material/metric queries and
//!   reshape the rows into dense series or summary reports.
//!
//! # Invariants
//! - Every returned series has `Info.Duration` entries.
//! - Mass-flow series are in tonnes unless stated otherwise; SWU and power
//!   keep the units the simulator recorded.
//! - Unknown selectors produce zero-filled series, not errors; unknown
//!   recipes and commodities are `NotFound` errors.

use crate::model::agent::{AgentEntry, AgentId, AgentSelector, FluxDirection};
use crate::model::material::TimePoint;
use crate::model::nuclide::NucId;
use crate::model::timeline::SimInfo;
use crate::repo::{
    AgentRepository, MaterialRepository, MetricRepository, RepoError, SqliteAgentRepository,
    SqliteMaterialRepository, SqliteMetricRepository,
};
use crate::series::{
    average, capacity_calc, isotope_points_to_transactions, isotope_timeseries,
    isotope_transactions, ratio_series, timeseries, timeseries_cum, MassUnit, PowerSeries,
    SeriesMap,
};
use crate::service::reports::{
    CompositionSource, ConversionRatio, FacilityStockpile, IsotopeInventory, MixNuclideError,
    MixRatio, StockpileReport, StockpileStream, UraniumUtilization,
};
use log::{info, warn};
use rusqlite::Connection;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fissile nuclides counted by the conversion ratio: U235, Pu239, Pu241.
pub const FISSILE_NUCLIDES: [NucId; 3] = [922350000, 942390000, 942410000];
/// Exclusive nucid bounds of the fission-product band (Br .. Ac).
const FISSION_PRODUCT_RANGE: (NucId, NucId) = (350000000, 890000000);
/// U235 mass fraction of natural uranium.
pub const NATURAL_U235_FRACTION: f64 = 0.00711;
/// Step count of the mixing-ratio grid search (`0, 0.001, ..., 0.999`).
const MIX_RATIO_STEPS: u32 = 1000;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for analysis use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Query or schema failure.
    Repo(RepoError),
    /// Caller-supplied argument outside the analysis domain.
    InvalidInput(String),
    /// The database holds nothing the analysis can be computed from.
    EmptyData(String),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::EmptyData(message) => write!(f, "no data: {message}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InvalidInput(_) | Self::EmptyData(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Request model for commodity in/out flux of a facility group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommodityFluxRequest {
    pub selector: AgentSelector,
    pub commodities: Vec<String>,
    pub direction: FluxDirection,
    /// Key the result by isotope instead of by commodity.
    pub isotopic: bool,
    pub cumulative: bool,
}

/// Request model for material traded between two facility groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRequest {
    pub sender: AgentSelector,
    pub receiver: AgentSelector,
    pub isotopic: bool,
    pub cumulative: bool,
}

/// Analysis entry points over agent, material and metric repositories.
pub struct AnalysisService<A, M, T> {
    agents: A,
    materials: M,
    metrics: T,
}

impl<'conn>
    AnalysisService<
        SqliteAgentRepository<'conn>,
        SqliteMaterialRepository<'conn>,
        SqliteMetricRepository<'conn>,
    >
{
    /// Builds the service over SQLite repositories sharing one connection.
    pub fn from_connection(conn: &'conn Connection) -> Self {
        Self::new(
            SqliteAgentRepository::new(conn),
            SqliteMaterialRepository::new(conn),
            SqliteMetricRepository::new(conn),
        )
    }
}

impl<A, M, T> AnalysisService<A, M, T>
where
    A: AgentRepository,
    M: MaterialRepository,
    T: MetricRepository,
{
    pub fn new(agents: A, materials: M, metrics: T) -> Self {
        Self {
            agents,
            materials,
            metrics,
        }
    }

    pub fn sim_info(&self) -> ServiceResult<SimInfo> {
        Ok(self.materials.sim_info()?)
    }

    pub fn list_agents(&self) -> ServiceResult<Vec<AgentEntry>> {
        Ok(self.agents.list_agents()?)
    }

    pub fn commodities(&self) -> ServiceResult<Vec<String>> {
        Ok(self.materials.commodities()?)
    }

    /// In/outflux of commodities through the selected facilities.
    ///
    /// # Contract
    /// - Non-isotopic: one tonnes series per requested commodity, in request
    ///   order.
    /// - Isotopic: one tonnes series per nuclide across all requested
    ///   commodities, in nucid order.
    pub fn commodity_flux(&self, request: &CommodityFluxRequest) -> ServiceResult<SeriesMap> {
        if request.commodities.is_empty() {
            return Err(ServiceError::InvalidInput(
                "at least one commodity is required".to_string(),
            ));
        }
        let info = self.sim_info()?;
        let agents = self.resolve(&request.selector)?;

        if request.isotopic {
            let mut points = Vec::new();
            for commodity in &request.commodities {
                points.extend(self.materials.isotopic_commodity_flux(
                    &agents,
                    request.direction,
                    commodity,
                )?);
            }
            let transactions = isotope_points_to_transactions(&points);
            return Ok(isotope_timeseries(
                &transactions,
                info.duration,
                MassUnit::Tonnes,
                request.cumulative,
            ));
        }

        let mut series = SeriesMap::new();
        for commodity in &request.commodities {
            let points = self
                .materials
                .commodity_flux(&agents, request.direction, commodity)?;
            series.insert(
                commodity.clone(),
                dense(&points, &info, MassUnit::Tonnes, request.cumulative),
            );
        }
        Ok(series)
    }

    /// Inventory held by facilities whose archetype contains `facility`,
    /// in tonnes, keyed by `facility`.
    pub fn stockpile(&self, facility: &str, cumulative: bool) -> ServiceResult<SeriesMap> {
        let info = self.sim_info()?;
        let agents = self.agents.agent_ids_by_spec(facility)?;
        let points = self.materials.inventory(&agents)?;

        let mut series = SeriesMap::new();
        series.insert(facility, dense(&points, &info, MassUnit::Tonnes, cumulative));
        Ok(series)
    }

    /// SWU per enrichment facility, keyed `Enrichment_<agent id>`.
    pub fn swu(&self, cumulative: bool) -> ServiceResult<SeriesMap> {
        let info = self.sim_info()?;
        let mut series = SeriesMap::new();
        for agent in self.agents.agent_ids_by_spec("Enrichment")? {
            let points = self.metrics.swu(agent)?;
            series.insert(
                format!("Enrichment_{agent}"),
                dense(&points, &info, MassUnit::Kilograms, cumulative),
            );
        }
        Ok(series)
    }

    /// Power (MWe) per reactor keyed `Reactor_<agent id>`, or a single
    /// `Total` series when `total` is set.
    pub fn reactor_power(&self, cumulative: bool, total: bool) -> ServiceResult<SeriesMap> {
        let info = self.sim_info()?;
        let mut series = SeriesMap::new();
        for agent in self.agents.agent_ids_by_spec("Reactor")? {
            let points = self.metrics.power(agent)?;
            series.insert(
                format!("Reactor_{agent}"),
                dense(&points, &info, MassUnit::Kilograms, cumulative),
            );
        }

        if total && !series.is_empty() {
            let summed = series.total();
            let mut totals = SeriesMap::new();
            totals.insert("Total", summed);
            return Ok(totals);
        }
        Ok(series)
    }

    /// Installed capacity (GWe) and reactor count per institution.
    pub fn power(&self) -> ServiceResult<PowerSeries> {
        let info = self.sim_info()?;
        let institutions = self.agents.institutions()?;
        let lifecycles = self.agents.reactor_lifecycles()?;
        info!(
            "event=power module=service status=ok institutions={} reactors={}",
            institutions.len(),
            lifecycles.len()
        );
        Ok(capacity_calc(&institutions, info.duration, &lifecycles))
    }

    /// Tonnes traded per fuel commodity; fuels never traded are omitted.
    pub fn fuel_usage(&self, fuels: &[String], cumulative: bool) -> ServiceResult<SeriesMap> {
        let info = self.sim_info()?;
        let mut series = SeriesMap::new();
        for fuel in fuels {
            let points = self.materials.commodity_usage(fuel)?;
            if points.is_empty() {
                warn!("event=fuel_usage module=service status=skip fuel={fuel} reason=unused");
                continue;
            }
            series.insert(fuel.clone(), dense(&points, &info, MassUnit::Tonnes, cumulative));
        }
        Ok(series)
    }

    /// Natural uranium fed to enrichment, in tonnes.
    pub fn natural_uranium(&self, cumulative: bool) -> ServiceResult<Vec<f64>> {
        let info = self.sim_info()?;
        let points = self.metrics.enrichment_feed()?;
        Ok(dense(&points, &info, MassUnit::Tonnes, cumulative))
    }

    /// Tonnes moved from the sender group to the receiver group.
    ///
    /// # Contract
    /// - Non-isotopic key: first five characters of sender and receiver
    ///   names joined by ` to `.
    /// - Isotopic keys: nuclide names.
    pub fn trade(&self, request: &TradeRequest) -> ServiceResult<SeriesMap> {
        let info = self.sim_info()?;
        let senders = self.resolve(&request.sender)?;
        let receivers = self.resolve(&request.receiver)?;

        if request.isotopic {
            let points = self.materials.isotopic_trade(&senders, &receivers)?;
            return Ok(isotope_timeseries(
                &isotope_points_to_transactions(&points),
                info.duration,
                MassUnit::Tonnes,
                request.cumulative,
            ));
        }

        let points = self.materials.trade(&senders, &receivers)?;
        let mut series = SeriesMap::new();
        series.insert(
            trade_key(request.sender.name(), request.receiver.name()),
            dense(&points, &info, MassUnit::Tonnes, request.cumulative),
        );
        Ok(series)
    }

    /// End-of-run inventories of every facility whose archetype contains
    /// `facility`, split by isotope.
    pub fn final_stockpile(&self, facility: &str) -> ServiceResult<StockpileReport> {
        let mut report = StockpileReport::default();
        for agent in self.agents.agent_ids_by_spec(facility)? {
            let prototype = self.agents.prototype_of(agent)?;
            let mut streams = Vec::new();
            for stream in self.materials.inventory_streams(agent)? {
                let isotopes = self
                    .materials
                    .composition_of(stream.qual_id)?
                    .into_iter()
                    .map(|row| (row.nuc_id, row.mass_frac * stream.quantity))
                    .collect();
                streams.push(StockpileStream {
                    inventory_name: stream.inventory_name,
                    total_kg: stream.quantity,
                    isotopes,
                });
            }
            report.facilities.push(FacilityStockpile { prototype, streams });
        }
        Ok(report)
    }

    /// Tonnes received by agents whose archetype contains `Reactor`.
    pub fn fuel_into_reactors(&self, cumulative: bool) -> ServiceResult<Vec<f64>> {
        let info = self.sim_info()?;
        let points = self.materials.fuel_into_reactors()?;
        Ok(dense(&points, &info, MassUnit::Tonnes, cumulative))
    }

    /// `(FP + fissile_out - fissile_in) / FP`, where FP is the
    /// fission-product mass fraction of the output material.
    pub fn conversion_ratio(
        &self,
        input: &CompositionSource,
        output: &CompositionSource,
    ) -> ServiceResult<ConversionRatio> {
        let input_comp = self.composition_fractions(input)?;
        let output_comp = self.composition_fractions(output)?;

        let (low, high) = FISSION_PRODUCT_RANGE;
        let fission_products: f64 = output_comp
            .iter()
            .filter(|(nuc_id, _)| low < *nuc_id && *nuc_id < high)
            .map(|(_, frac)| frac)
            .sum();
        if fission_products == 0.0 {
            return Err(ServiceError::EmptyData(format!(
                "`{}` contains no fission products",
                output.name()
            )));
        }
        let fissile_out = fissile_fraction(&output_comp);
        let fissile_in = fissile_fraction(&input_comp);

        Ok(ConversionRatio {
            fission_products,
            fissile_in,
            fissile_out,
            ratio: (fission_products + fissile_out - fissile_in) / fission_products,
        })
    }

    /// Grid search for the fraction of separated material (the `elements`
    /// of the spent recipe, by atomic number) that, blended with depleted
    /// uranium, best reproduces the fuel recipe.
    pub fn mix_ratio(
        &self,
        fuel_recipe: &str,
        spent_recipe: &str,
        depleted_u_recipe: &str,
        elements: &[u32],
    ) -> ServiceResult<MixRatio> {
        if elements.is_empty() {
            return Err(ServiceError::InvalidInput(
                "at least one separated element is required".to_string(),
            ));
        }
        let fuel = self.materials.recipe_composition(fuel_recipe)?;
        if fuel.is_empty() {
            return Err(ServiceError::EmptyData(format!(
                "recipe `{fuel_recipe}` has no composition"
            )));
        }
        let separated = fraction_by_nuclide(
            self.materials
                .recipe_composition(spent_recipe)?
                .into_iter()
                .filter(|row| {
                    u32::try_from(row.nuc_id / 10_000_000)
                        .map(|z| elements.contains(&z))
                        .unwrap_or(false)
                })
                .map(|row| (row.nuc_id, row.mass_frac)),
        );
        let depleted = fraction_by_nuclide(
            self.materials
                .recipe_composition(depleted_u_recipe)?
                .into_iter()
                .map(|row| (row.nuc_id, row.mass_frac)),
        );
        let target: Vec<(NucId, f64)> = fuel
            .iter()
            .map(|row| (row.nuc_id, row.mass_frac))
            .collect();

        let blend_error = |ratio: f64, nuc_id: NucId, target_frac: f64| -> f64 {
            let reprocessed = separated.get(&nuc_id).copied().unwrap_or(0.0) * ratio;
            let uranium = depleted.get(&nuc_id).copied().unwrap_or(0.0) * (1.0 - ratio);
            (reprocessed + uranium - target_frac).abs()
        };
        let total_error = |ratio: f64| -> f64 {
            target
                .iter()
                .map(|(nuc_id, frac)| blend_error(ratio, *nuc_id, *frac))
                .sum()
        };

        let mut best_ratio = 0.0;
        let mut best_error = total_error(best_ratio);
        for step in 1..MIX_RATIO_STEPS {
            let ratio = f64::from(step) / f64::from(MIX_RATIO_STEPS);
            let error = total_error(ratio);
            if error < best_error {
                best_ratio = ratio;
                best_error = error;
            }
        }

        let nuclide_errors = target
            .iter()
            .map(|(nuc_id, frac)| {
                let absolute = blend_error(best_ratio, *nuc_id, *frac);
                MixNuclideError {
                    nuc_id: *nuc_id,
                    absolute,
                    percent: (*frac != 0.0).then(|| absolute * 100.0 / frac),
                }
            })
            .collect();

        Ok(MixRatio {
            ratio: best_ratio,
            total_error: best_error,
            nuclide_errors,
        })
    }

    /// Cumulative fuel into reactors over cumulative natural uranium feed.
    pub fn uranium_utilization(&self) -> ServiceResult<UraniumUtilization> {
        let natural_u = self.natural_uranium(true)?;
        let fuel = self.fuel_into_reactors(true)?;
        let series = ratio_series(&fuel, &natural_u);
        let average = average(&series);
        Ok(UraniumUtilization { series, average })
    }

    /// Cumulative tonnes of `commodity` sent by each prototype, keyed by
    /// prototype in request order.
    pub fn where_commodity(&self, commodity: &str, prototypes: &[String]) -> ServiceResult<SeriesMap> {
        let info = self.sim_info()?;
        let mut series = SeriesMap::new();
        for prototype in prototypes {
            let senders = self.agents.agent_ids_by_prototype(prototype)?;
            let points = self.materials.commodity_from(commodity, &senders)?;
            series.insert(prototype.clone(), dense(&points, &info, MassUnit::Tonnes, true));
        }
        Ok(series)
    }

    /// Isotope masses (kg) received by every `sink` facility over the run.
    pub fn spent_fuel_inventory(&self) -> ServiceResult<IsotopeInventory> {
        let sinks = self.agents.agent_ids_by_spec("sink")?;
        let received = self.materials.sink_inventory(&sinks)?;
        let compositions = self.materials.compositions()?;

        let mut by_qual: HashMap<i64, Vec<(NucId, f64)>> = HashMap::new();
        for row in compositions {
            by_qual
                .entry(row.qual_id)
                .or_default()
                .push((row.nuc_id, row.mass_frac));
        }

        let mut inventory = IsotopeInventory::new();
        for mass in received {
            for (nuc_id, frac) in by_qual.get(&mass.qual_id).into_iter().flatten() {
                *inventory.entry(*nuc_id).or_insert(0.0) += mass.quantity * frac;
            }
        }
        Ok(inventory)
    }

    /// Isotope masses (kg) in or out of the selected facilities, keyed by
    /// nuclide name.
    pub fn isotopic_flux(
        &self,
        selector: &AgentSelector,
        direction: FluxDirection,
        cumulative: bool,
    ) -> ServiceResult<SeriesMap> {
        let info = self.sim_info()?;
        let agents = self.resolve(selector)?;
        let resources = self.materials.resource_flux(&agents, direction)?;
        let compositions = self.materials.compositions()?;
        let transactions = isotope_transactions(&resources, &compositions);
        Ok(isotope_timeseries(
            &transactions,
            info.duration,
            MassUnit::Kilograms,
            cumulative,
        ))
    }

    /// Natural uranium throughput (kg per timestep) a source must supply to
    /// sustain the average reactor fuel demand.
    ///
    /// `frac_prod` and `frac_tail` are the U235 mass fractions of the
    /// enriched product and the tails.
    pub fn source_throughput(&self, frac_prod: f64, frac_tail: f64) -> ServiceResult<f64> {
        if !(0.0..NATURAL_U235_FRACTION).contains(&frac_tail) || frac_prod <= frac_tail {
            return Err(ServiceError::InvalidInput(format!(
                "expected 0 <= tails ({frac_tail}) < {NATURAL_U235_FRACTION} and product ({frac_prod}) > tails"
            )));
        }
        let info = self.sim_info()?;
        if info.duration == 0 {
            return Err(ServiceError::EmptyData(
                "simulation has zero duration".to_string(),
            ));
        }
        let fuel = self.fuel_into_reactors(true)?;
        let delivered = fuel.last().copied().unwrap_or(0.0);
        let avg_fuel_used = delivered * 1000.0 / info.duration as f64;
        let feed_factor = (frac_prod - frac_tail) / (NATURAL_U235_FRACTION - frac_tail);
        Ok(feed_factor * avg_fuel_used)
    }

    fn resolve(&self, selector: &AgentSelector) -> ServiceResult<Vec<AgentId>> {
        let agents = self.agents.resolve(selector)?;
        if agents.is_empty() {
            warn!("event=resolve_agents module=service status=skip selector={selector} reason=no_match");
        }
        Ok(agents)
    }

    fn composition_fractions(&self, source: &CompositionSource) -> ServiceResult<Vec<(NucId, f64)>> {
        let qual_id = match source {
            CompositionSource::Recipe(name) => self.materials.qual_id_of_recipe(name)?,
            CompositionSource::Commodity(name) => self.materials.qual_id_of_commodity(name)?,
        };
        Ok(self
            .materials
            .composition_of(qual_id)?
            .into_iter()
            .map(|row| (row.nuc_id, row.mass_frac))
            .collect())
    }
}

fn dense(points: &[TimePoint], info: &SimInfo, unit: MassUnit, cumulative: bool) -> Vec<f64> {
    if cumulative {
        timeseries_cum(points, info.duration, unit)
    } else {
        timeseries(points, info.duration, unit)
    }
}

/// `"<sender[..5]> to <receiver[..5]>"`, truncating on characters.
pub fn trade_key(sender: &str, receiver: &str) -> String {
    let head = |name: &str| name.chars().take(5).collect::<String>();
    format!("{} to {}", head(sender), head(receiver))
}

fn fissile_fraction(composition: &[(NucId, f64)]) -> f64 {
    composition
        .iter()
        .filter(|(nuc_id, _)| FISSILE_NUCLIDES.contains(nuc_id))
        .map(|(_, frac)| frac)
        .sum()
}

fn fraction_by_nuclide(rows: impl Iterator<Item = (NucId, f64)>) -> BTreeMap<NucId, f64> {
    let mut fractions = BTreeMap::new();
    for (nuc_id, frac) in rows {
        *fractions.entry(nuc_id).or_insert(0.0) += frac;
    }
    fractions
}

#[cfg(test)]
mod tests {
    use super::{fissile_fraction, fraction_by_nuclide, trade_key};

    #[test]
    fn trade_key_truncates_names() {
        assert_eq!(trade_key("separations", "reactor"), "separ to react");
        assert_eq!(trade_key("src", "sink"), "src to sink");
    }

    #[test]
    fn fissile_fraction_counts_only_fissile_nuclides() {
        let composition = vec![(922350000, 0.04), (922380000, 0.9), (942390000, 0.01)];
        assert!((fissile_fraction(&composition) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn duplicate_nuclide_fractions_are_summed() {
        let fractions = fraction_by_nuclide(vec![(1, 0.25), (1, 0.25), (2, 0.5)].into_iter());
        assert_eq!(fractions.get(&1), Some(&0.5));
        assert_eq!(fractions.len(), 2);
    }
}
