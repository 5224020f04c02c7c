//! Report (C1): an immutable telemetry record produced by an endpoint.
//!
//! Inheritance-based polymorphism in the source becomes a single tagged
//! union here (§9): every variant carries `reporter_e2_node_id` and
//! `timestamp`, and dispatch on receipt is an ordinary `match`.
use crate::common::SimTime;
use crate::types::{CellId, E2NodeId, Rnti};

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Location {
        reporter_e2_node_id: E2NodeId,
        timestamp: SimTime,
        x: f64,
        y: f64,
        z: f64,
    },
    LteUeCellInfo {
        reporter_e2_node_id: E2NodeId,
        timestamp: SimTime,
        cell_id: CellId,
        rnti: Rnti,
    },
    LteUeRsrpRsrq {
        reporter_e2_node_id: E2NodeId,
        timestamp: SimTime,
        rnti: Rnti,
        cell_id: CellId,
        rsrp: f64,
        rsrq: f64,
        is_serving: bool,
        carrier_id: u16,
    },
    AppLoss {
        reporter_e2_node_id: E2NodeId,
        timestamp: SimTime,
        loss: f64,
    },
}

impl Report {
    pub fn reporter_e2_node_id(&self) -> E2NodeId {
        match self {
            Report::Location { reporter_e2_node_id, .. }
            | Report::LteUeCellInfo { reporter_e2_node_id, .. }
            | Report::LteUeRsrpRsrq { reporter_e2_node_id, .. }
            | Report::AppLoss { reporter_e2_node_id, .. } => *reporter_e2_node_id,
        }
    }

    pub fn timestamp(&self) -> SimTime {
        match self {
            Report::Location { timestamp, .. }
            | Report::LteUeCellInfo { timestamp, .. }
            | Report::LteUeRsrpRsrq { timestamp, .. }
            | Report::AppLoss { timestamp, .. } => *timestamp,
        }
    }
}
