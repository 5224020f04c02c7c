//! DataRepository (C3): the persistent store of nodes, registrations,
//! reports, and the audit log. §4.1 defines this as a fixed set of
//! operations any backing store (relational engine, in-memory map, mock)
//! must implement identically; this module holds the trait and the shared
//! audit-entry type, and [`memory`] ships the reference in-memory backend.
mod memory;

pub use memory::InMemoryDataRepository;

use crate::command::Command;
use crate::common::SimTime;
use crate::types::{CellId, E2NodeId, ExternalId, Imsi, NodeKind, Rnti};

/// An append-only audit-log record (§3). `lm_or_cmm_name` is `None` for
/// entries logged directly by the RicE2Terminator.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub component: &'static str,
    pub lm_or_cmm_name: Option<String>,
    pub timestamp: SimTime,
    pub text: String,
}

/// One sample in the descending-time-ordered result of [`DataRepository::node_positions`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub timestamp: SimTime,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// One sample returned by [`DataRepository::lte_ue_rsrp_rsrq`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsrpRsrqSample {
    pub timestamp: SimTime,
    pub rnti: Rnti,
    pub cell_id: CellId,
    pub rsrp: f64,
    pub rsrq: f64,
    pub is_serving: bool,
    pub carrier_id: u16,
}

/// An optional hook fired for every repository operation regardless of
/// success, mirroring the source's per-query storage trace. Takes the
/// operation name, a textual rendering of its bound arguments, and whether
/// it succeeded.
pub type StorageTrace = Box<dyn FnMut(&str, &str, bool)>;

/// The persistent store backing the whole coordination core (§4.1).
///
/// Any storage-level failure is fatal: implementations must panic with a
/// message naming the operation and its bound arguments (§7) rather than
/// returning an error — the source's `NS_ABORT_MSG_IF` has no recoverable
/// counterpart here.
///
/// When deactivated, every mutator is a no-op and every reader returns an
/// empty result (`false`/`0.0`/`None`/an empty `Vec`), mirroring the
/// source's `if (m_active)`-gated query methods (§4.1).
pub trait DataRepository {
    fn activate(&mut self);
    fn deactivate(&mut self);
    fn is_active(&self) -> bool;

    fn is_registered(&self, e2_node_id: E2NodeId) -> bool;

    fn register_node(&mut self, kind: NodeKind, external_id: ExternalId, now: SimTime) -> E2NodeId;
    fn register_lte_ue(&mut self, imsi: Imsi, now: SimTime) -> E2NodeId;
    fn register_lte_enb(&mut self, cell_id: CellId, now: SimTime) -> E2NodeId;
    fn deregister_node(&mut self, e2_node_id: E2NodeId, now: SimTime) -> E2NodeId;

    fn save_position(&mut self, e2_node_id: E2NodeId, x: f64, y: f64, z: f64, now: SimTime);
    fn save_lte_ue_cell_info(&mut self, e2_node_id: E2NodeId, cell_id: CellId, rnti: Rnti, now: SimTime);
    fn save_app_loss(&mut self, e2_node_id: E2NodeId, loss: f64, now: SimTime);
    #[allow(clippy::too_many_arguments)]
    fn save_lte_ue_rsrp_rsrq(
        &mut self,
        e2_node_id: E2NodeId,
        rnti: Rnti,
        cell_id: CellId,
        rsrp: f64,
        rsrq: f64,
        is_serving: bool,
        carrier_id: u16,
        now: SimTime,
    );

    fn node_positions(
        &self,
        e2_node_id: E2NodeId,
        from: SimTime,
        to: SimTime,
        limit: usize,
    ) -> Vec<PositionSample>;
    fn lte_ue_cell_info(&self, e2_node_id: E2NodeId) -> Option<(CellId, Rnti)>;
    fn app_loss(&self, e2_node_id: E2NodeId) -> f64;
    fn lte_ue_rsrp_rsrq(&self, e2_node_id: E2NodeId) -> Vec<RsrpRsrqSample>;
    fn lte_ue_e2_node_ids(&self) -> Vec<E2NodeId>;
    fn lte_enb_e2_node_ids(&self) -> Vec<E2NodeId>;
    fn last_registration_requests(&self) -> Vec<(E2NodeId, SimTime)>;
    fn lte_ue_e2_node_id_from_cell_info(&self, cell_id: CellId, rnti: Rnti) -> Option<E2NodeId>;

    fn log_command_from_e2_terminator(&mut self, cmd: &Command, now: SimTime);
    fn log_command_from_lm(&mut self, lm_name: &str, cmd: &Command, now: SimTime);
    fn log_action_lm(&mut self, lm_name: &str, text: &str, now: SimTime);
    fn log_action_cmm(&mut self, cmm_name: &str, text: &str, now: SimTime);

    fn audit_log(&self) -> &[AuditEntry];
}
