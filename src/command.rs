//! Command (C2): an immutable directive addressed to an endpoint.
//!
//! As with [`crate::report::Report`], the source's per-command subclasses
//! collapse into one tagged union (§9). `Command::Base` is an intentional
//! no-op on receipt, kept only so a terminator can be handed a command it
//! deliberately ignores without special-casing `Option<Command>`.
use crate::types::{CellId, E2NodeId, Rnti};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Intentional no-op. A terminator that does not recognize this (or any
    /// other) variant drops it silently.
    Base { target_e2_node_id: E2NodeId },
    Lte2LteHandover {
        target_e2_node_id: E2NodeId,
        target_cell_id: CellId,
        target_rnti: Rnti,
    },
}

impl Command {
    pub fn target_e2_node_id(&self) -> E2NodeId {
        match self {
            Command::Base { target_e2_node_id } => *target_e2_node_id,
            Command::Lte2LteHandover { target_e2_node_id, .. } => *target_e2_node_id,
        }
    }

    /// The dedup key a handover CMM uses; `None` for non-handover variants.
    pub fn handover_key(&self) -> Option<(E2NodeId, CellId, Rnti)> {
        match self {
            Command::Lte2LteHandover { target_e2_node_id, target_cell_id, target_rnti } => {
                Some((*target_e2_node_id, *target_cell_id, *target_rnti))
            }
            _ => None,
        }
    }
}
