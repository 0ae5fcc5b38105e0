//! Installed capacity and reactor counts per institution.

use super::SeriesMap;
use crate::model::agent::{Institution, ReactorLifecycle};

/// MWe to GWe.
const MW_TO_GW: f64 = 0.001;

/// Capacity (GWe) and operating reactor count per institution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PowerSeries {
    pub capacity: SeriesMap,
    pub reactor_count: SeriesMap,
}

/// Adds a reactor's maximum power at its entry step and removes it at its
/// exit step, accumulating over `0..duration` for every institution.
///
/// Institutions are keyed by prototype in the order given. Reactors whose
/// parent is not a listed institution are ignored.
pub fn capacity_calc(
    institutions: &[Institution],
    duration: usize,
    lifecycles: &[ReactorLifecycle],
) -> PowerSeries {
    let mut power = PowerSeries::default();
    for institution in institutions {
        let mut capacity_delta = vec![0.0; duration];
        let mut count_delta = vec![0.0; duration];

        for reactor in lifecycles
            .iter()
            .filter(|reactor| reactor.parent_id == institution.agent_id)
        {
            if let Some(step) = step_index(reactor.enter_time, duration) {
                capacity_delta[step] += reactor.max_power * MW_TO_GW;
                count_delta[step] += 1.0;
            }
            if let Some(step) = reactor.exit_time.and_then(|time| step_index(time, duration)) {
                capacity_delta[step] -= reactor.max_power * MW_TO_GW;
                count_delta[step] -= 1.0;
            }
        }

        power
            .capacity
            .insert(institution.prototype.clone(), running_total(capacity_delta));
        power
            .reactor_count
            .insert(institution.prototype.clone(), running_total(count_delta));
    }
    power
}

fn step_index(time: i64, duration: usize) -> Option<usize> {
    usize::try_from(time).ok().filter(|step| *step < duration)
}

fn running_total(mut values: Vec<f64>) -> Vec<f64> {
    let mut running = 0.0;
    for value in values.iter_mut() {
        running += *value;
        *value = running;
    }
    values
}
