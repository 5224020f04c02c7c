//! Coordination core for a Near-Real-Time RAN Intelligent Controller: a
//! closed-loop control plane that ingests telemetry from registered E2
//! nodes, runs pluggable logic modules against it on a bounded cycle,
//! reconciles their commands through a conflict-mitigation module, and
//! dispatches the survivors back out.
//!
//! The coordination core (`ric_core`, `ric_e2_terminator`) is the crate's
//! reason to exist; everything else (concrete reporters, logic modules, the
//! radio layer, a SQL-backed repository) is an external collaborator reached
//! through the traits in `repository`, `node_terminator`, `logic_module`,
//! `cmm`, and `query_trigger`.

// --- Foundation modules ---
pub mod common;
pub mod config;
pub mod error;
pub mod log;
pub mod random;
pub mod types;

// --- Event substrate ---
pub mod scheduler;
pub mod sim;

// --- Data model ---
pub mod command;
pub mod report;

// --- Pluggable components ---
pub mod cmm;
pub mod logic_module;
pub mod node_terminator;
pub mod query_trigger;
pub mod reporter;
pub mod repository;

// --- Orchestrator ---
pub mod ric_core;
pub mod ric_e2_terminator;

// --- Top-level exports ---
pub use cmm::{ConflictMitigationModule, HandoverCmm, LmCommandMap, NoOpCmm, SingleCommandPerNodeCmm};
pub use command::Command;
pub use common::{Duration, SimTime};
pub use config::{LogicModuleConfig, NodeTerminatorConfig, RicConfig};
pub use error::RicError;
pub use logic_module::{ClosureLm, LogicModule};
pub use node_terminator::{HandoverSink, NodeTerminator, Reporter};
pub use query_trigger::{CustomQueryTrigger, NoOpQueryTrigger, QueryTrigger};
pub use random::{Constant, RandomVariable, Uniform};
pub use report::Report;
pub use reporter::{MotionLeg, PeriodicLocationReporter};
pub use repository::{AuditEntry, DataRepository, InMemoryDataRepository, PositionSample, RsrpRsrqSample};
pub use ric_core::RicCore;
pub use ric_e2_terminator::RicE2Terminator;
pub use scheduler::{EventId, Scheduler, SimEvent};
pub use sim::Simulation;
pub use types::{
    CellId, E2NodeId, ExternalId, Imsi, LateCommandPolicy, NodeKind, Position, Rnti, TerminatorHandle,
};
