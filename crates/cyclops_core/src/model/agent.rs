//! Agent (facility / institution / region) records.

use std::fmt::{Display, Formatter};

/// Simulator-assigned agent identifier.
pub type AgentId = i64;

/// One row of the `AgentEntry` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentEntry {
    pub agent_id: AgentId,
    /// `Region`, `Inst` or `Facility`.
    pub kind: String,
    /// Archetype spec, e.g. `:cycamore:Reactor`.
    pub spec: String,
    pub prototype: String,
    pub parent_id: Option<AgentId>,
    /// Lifetime in timesteps; negative means unbounded.
    pub lifetime: i64,
    pub enter_time: i64,
}

/// Institution that owns facilities, used to group reactor capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Institution {
    pub prototype: String,
    pub agent_id: AgentId,
}

/// Selects a set of agents either by archetype or by prototype name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentSelector {
    /// Case-insensitive substring match on `AgentEntry.Spec`.
    Spec(String),
    /// Case-insensitive exact match on `AgentEntry.Prototype`.
    Prototype(String),
}

impl AgentSelector {
    pub fn spec(archetype: impl Into<String>) -> Self {
        Self::Spec(archetype.into())
    }

    pub fn prototype(name: impl Into<String>) -> Self {
        Self::Prototype(name.into())
    }

    /// The archetype or prototype text the selector matches on.
    pub fn name(&self) -> &str {
        match self {
            Self::Spec(value) | Self::Prototype(value) => value.as_str(),
        }
    }
}

impl Display for AgentSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spec(value) => write!(f, "spec:{value}"),
            Self::Prototype(value) => write!(f, "prototype:{value}"),
        }
    }
}

/// Which side of a transaction the selected agents are on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FluxDirection {
    /// Material received by the agents.
    Influx,
    /// Material sent by the agents.
    Outflux,
}

impl FluxDirection {
    /// `Transactions` column holding the selected agent id.
    pub(crate) fn agent_column(self) -> &'static str {
        match self {
            Self::Influx => "Transactions.ReceiverId",
            Self::Outflux => "Transactions.SenderId",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Influx => "influx",
            Self::Outflux => "outflux",
        }
    }
}

/// Power-producing agent with its owning institution and lifecycle bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactorLifecycle {
    pub agent_id: AgentId,
    /// Maximum reported power in MWe.
    pub max_power: f64,
    pub parent_id: AgentId,
    pub enter_time: i64,
    /// `None` while the reactor is still operating at the end of the run.
    pub exit_time: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::{AgentSelector, FluxDirection};

    #[test]
    fn selector_name_and_display() {
        let selector = AgentSelector::prototype("uox_fab");
        assert_eq!(selector.name(), "uox_fab");
        assert_eq!(selector.to_string(), "prototype:uox_fab");
        assert_eq!(AgentSelector::spec("Sink").to_string(), "spec:Sink");
    }

    #[test]
    fn direction_maps_to_transaction_column() {
        assert_eq!(FluxDirection::Influx.agent_column(), "Transactions.ReceiverId");
        assert_eq!(FluxDirection::Outflux.agent_column(), "Transactions.SenderId");
    }
}
