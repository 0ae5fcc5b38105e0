//! Sparse-to-dense reindexing shared by every analysis.

use super::MassUnit;
use crate::model::material::TimePoint;
use log::debug;

/// Dense series where `out[t]` is the sum of every value recorded at `t`.
///
/// Samples outside `[0, duration)` are dropped.
pub fn timeseries(points: &[TimePoint], duration: usize, unit: MassUnit) -> Vec<f64> {
    let mut out = vec![0.0; duration];
    let mut dropped = 0usize;
    for point in points {
        match usize::try_from(point.time) {
            Ok(index) if index < duration => out[index] += point.value,
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!("event=timeseries module=series status=ok dropped_out_of_range={dropped}");
    }

    let factor = unit.factor();
    if factor != 1.0 {
        out.iter_mut().for_each(|value| *value *= factor);
    }
    out
}

/// Running total of [`timeseries`].
pub fn timeseries_cum(points: &[TimePoint], duration: usize, unit: MassUnit) -> Vec<f64> {
    let mut out = timeseries(points, duration, unit);
    let mut running = 0.0;
    for value in out.iter_mut() {
        running += *value;
        *value = running;
    }
    out
}

/// Element-wise sum; the result is as long as the longest input.
pub fn sum_series<'a>(series: impl IntoIterator<Item = &'a [f64]>) -> Vec<f64> {
    let mut total: Vec<f64> = Vec::new();
    for values in series {
        if values.len() > total.len() {
            total.resize(values.len(), 0.0);
        }
        for (slot, value) in total.iter_mut().zip(values) {
            *slot += value;
        }
    }
    total
}

/// Element-wise `numerator / denominator` with NaN and infinities mapped to 0.
pub fn ratio_series(numerator: &[f64], denominator: &[f64]) -> Vec<f64> {
    numerator
        .iter()
        .zip(denominator)
        .map(|(num, den)| {
            let ratio = num / den;
            if ratio.is_finite() {
                ratio
            } else {
                0.0
            }
        })
        .collect()
}

/// Arithmetic mean; 0 for an empty slice.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::{average, ratio_series, sum_series, timeseries, timeseries_cum};
    use crate::model::material::TimePoint;
    use crate::series::MassUnit;

    fn points() -> Vec<TimePoint> {
        vec![
            TimePoint::new(0, 1000.0),
            TimePoint::new(2, 500.0),
            TimePoint::new(2, 250.0),
            TimePoint::new(7, 99.0),
            TimePoint::new(-1, 99.0),
        ]
    }

    #[test]
    fn dense_series_sums_per_step_and_drops_out_of_range() {
        let dense = timeseries(&points(), 4, MassUnit::Kilograms);
        assert_eq!(dense, vec![1000.0, 0.0, 750.0, 0.0]);
    }

    #[test]
    fn tonnes_scale_values() {
        let dense = timeseries(&points(), 3, MassUnit::Tonnes);
        assert_eq!(dense, vec![1.0, 0.0, 0.75]);
    }

    #[test]
    fn cumulative_is_prefix_sum() {
        let plain = timeseries(&points(), 5, MassUnit::Kilograms);
        let cumulative = timeseries_cum(&points(), 5, MassUnit::Kilograms);
        assert_eq!(cumulative.len(), 5);

        let mut running = 0.0;
        for (step, value) in plain.iter().enumerate() {
            running += value;
            assert_eq!(cumulative[step], running);
        }
        assert!(cumulative.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn empty_input_is_zero_filled() {
        assert_eq!(timeseries(&[], 3, MassUnit::Tonnes), vec![0.0; 3]);
        assert_eq!(timeseries_cum(&[], 0, MassUnit::Tonnes), Vec::<f64>::new());
    }

    #[test]
    fn ratio_maps_non_finite_to_zero() {
        let ratio = ratio_series(&[1.0, 0.0, 3.0], &[2.0, 0.0, 0.0]);
        assert_eq!(ratio, vec![0.5, 0.0, 0.0]);
    }

    #[test]
    fn sum_series_pads_shorter_inputs() {
        let a = [1.0, 1.0, 1.0];
        let b = [2.0];
        assert_eq!(sum_series([&a[..], &b[..]]), vec![3.0, 1.0, 1.0]);
        assert_eq!(average(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(average(&[]), 0.0);
    }
}
