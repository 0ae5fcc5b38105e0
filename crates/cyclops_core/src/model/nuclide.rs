//! Nuclide identity in Cyclus `ZZAAASSSS` form.
//!
//! # Responsibility
//! - Convert between integer nucids and human-readable names (`U235`).
//! - Parse loose user input (`u-235`, `Am242m`, `922350000`).
//!
//! # Invariants
//! - `Nuclide::from_id(n.id()) == n` for every valid nuclide.
//! - Atomic number is always within `1..=118`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Nuclide identifier `ZZZAAASSSS` (Z * 10^7 + A * 10^4 + state).
pub type NucId = i32;

const ELEMENTS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

static NUCLIDE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]{1,2})[-_ ]?(\d{1,3})?(?:([mM])(\d)?)?$").expect("valid nuclide regex")
});

/// Error for nucid/name conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NuclideError {
    InvalidId(NucId),
    InvalidName(String),
}

impl Display for NuclideError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(id) => write!(f, "invalid nuclide id `{id}`"),
            Self::InvalidName(name) => write!(f, "invalid nuclide name `{name}`"),
        }
    }
}

impl Error for NuclideError {}

/// Decoded nuclide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nuclide {
    z: u8,
    a: u16,
    state: u8,
}

impl Nuclide {
    pub fn new(z: u8, a: u16, state: u8) -> Result<Self, NuclideError> {
        if z == 0 || usize::from(z) > ELEMENTS.len() || a > 999 || state > 9 {
            return Err(NuclideError::InvalidId(
                i32::from(z) * 10_000_000 + i32::from(a) * 10_000 + i32::from(state),
            ));
        }
        Ok(Self { z, a, state })
    }

    /// Decodes a `ZZAAASSSS` identifier.
    pub fn from_id(id: NucId) -> Result<Self, NuclideError> {
        if id <= 0 {
            return Err(NuclideError::InvalidId(id));
        }
        let z = id / 10_000_000;
        let a = (id / 10_000) % 1_000;
        let state = id % 10_000;
        let (Ok(z), Ok(a), Ok(state)) = (u8::try_from(z), u16::try_from(a), u8::try_from(state))
        else {
            return Err(NuclideError::InvalidId(id));
        };
        Self::new(z, a, state).map_err(|_| NuclideError::InvalidId(id))
    }

    pub fn id(&self) -> NucId {
        i32::from(self.z) * 10_000_000 + i32::from(self.a) * 10_000 + i32::from(self.state)
    }

    /// Atomic number.
    pub fn z(&self) -> u8 {
        self.z
    }

    /// Mass number; zero denotes the natural element.
    pub fn a(&self) -> u16 {
        self.a
    }

    pub fn state(&self) -> u8 {
        self.state
    }

    pub fn symbol(&self) -> &'static str {
        ELEMENTS[usize::from(self.z) - 1]
    }

    /// Canonical name: `U235`, `Am242M`, `Tc99M2`, or `U` for natural uranium.
    pub fn name(&self) -> String {
        let mut name = self.symbol().to_string();
        if self.a > 0 {
            name.push_str(&self.a.to_string());
        }
        match self.state {
            0 => {}
            1 => name.push('M'),
            other => name.push_str(&format!("M{other}")),
        }
        name
    }
}

impl Display for Nuclide {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Nuclide {
    type Err = NuclideError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|ch| ch.is_ascii_digit()) {
            let id = trimmed
                .parse::<NucId>()
                .map_err(|_| NuclideError::InvalidName(value.to_string()))?;
            return Self::from_id(id);
        }

        let invalid = || NuclideError::InvalidName(value.to_string());
        let captures = NUCLIDE_NAME_RE.captures(trimmed).ok_or_else(invalid)?;
        let symbol = captures.get(1).map_or("", |m| m.as_str());
        let z = ELEMENTS
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(symbol))
            .ok_or_else(invalid)?;
        let a = match captures.get(2) {
            Some(mass) => mass.as_str().parse::<u16>().map_err(|_| invalid())?,
            None => 0,
        };
        let state = match (captures.get(3), captures.get(4)) {
            (Some(_), Some(level)) => level.as_str().parse::<u8>().map_err(|_| invalid())?,
            (Some(_), None) => 1,
            _ => 0,
        };
        let z = u8::try_from(z + 1).map_err(|_| invalid())?;
        Self::new(z, a, state).map_err(|_| invalid())
    }
}

/// Display name for a nucid, falling back to the raw number when it does
/// not decode.
pub fn name_of(id: NucId) -> String {
    Nuclide::from_id(id)
        .map(|nuclide| nuclide.name())
        .unwrap_or_else(|_| id.to_string())
}
