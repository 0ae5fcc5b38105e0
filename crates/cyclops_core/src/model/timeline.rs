//! Simulation clock from the `Info` table.

/// Start date and length of a simulation, in monthly timesteps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimInfo {
    pub init_year: i32,
    pub init_month: u32,
    /// Number of timesteps; valid times are `0..duration`.
    pub duration: usize,
}

impl SimInfo {
    pub fn new(init_year: i32, init_month: u32, duration: usize) -> Self {
        Self {
            init_year,
            init_month,
            duration,
        }
    }

    /// Timestep indices `0, 1, ..., duration - 1`.
    pub fn timesteps(&self) -> impl Iterator<Item = i64> {
        0..self.duration as i64
    }

    /// Fractional calendar year of a timestep (`init_year + t / 12`).
    pub fn year_of(&self, timestep: i64) -> f64 {
        f64::from(self.init_year) + timestep as f64 / 12.0
    }

    /// Calendar year of every timestep.
    pub fn years(&self) -> Vec<f64> {
        self.timesteps().map(|t| self.year_of(t)).collect()
    }

    /// Calendar year just past the final timestep.
    pub fn end_year(&self) -> f64 {
        self.year_of(self.duration as i64)
    }
}
