//! Reference in-memory [`DataRepository`] implementation. Accepts the
//! distinguished sentinel path `":memory:"` (§6) for parity with a
//! hypothetical on-disk backend, even though this backend is always
//! in-memory; a different crate is free to add a SQL-backed repository
//! behind the same trait.
use super::{AuditEntry, DataRepository, PositionSample, RsrpRsrqSample, StorageTrace};
use crate::command::Command;
use crate::common::SimTime;
use crate::types::{CellId, E2NodeId, ExternalId, Imsi, NodeKind, Rnti};
use std::collections::HashMap;

struct NodeRecord {
    kind: NodeKind,
    external_id: ExternalId,
    registration_events: Vec<(bool, SimTime)>,
}

impl NodeRecord {
    fn is_registered(&self) -> bool {
        self.registration_events
            .iter()
            .max_by_key(|(_, t)| *t)
            .map(|(registered, _)| *registered)
            .unwrap_or(false)
    }

    fn latest_true_registration(&self) -> Option<SimTime> {
        self.registration_events
            .iter()
            .filter(|(registered, _)| *registered)
            .map(|(_, t)| *t)
            .max()
    }
}

/// The reference `DataRepository` backend: plain `HashMap`s guarded by
/// append-only sample vectors. Construct with [`InMemoryDataRepository::new`]
/// or [`InMemoryDataRepository::in_memory`].
pub struct InMemoryDataRepository {
    active: bool,
    next_id: u64,
    nodes: HashMap<E2NodeId, NodeRecord>,
    external_index: HashMap<ExternalId, E2NodeId>,
    positions: HashMap<E2NodeId, Vec<PositionSample>>,
    cell_info: HashMap<E2NodeId, Vec<(SimTime, CellId, Rnti)>>,
    app_loss: HashMap<E2NodeId, Vec<(SimTime, f64)>>,
    rsrp_rsrq: HashMap<E2NodeId, Vec<RsrpRsrqSample>>,
    audit: Vec<AuditEntry>,
    trace: Option<StorageTrace>,
}

impl InMemoryDataRepository {
    /// `path` is accepted only for interface parity with a file-backed
    /// repository; `":memory:"` and any other value behave identically.
    pub fn new(_path: &str) -> Self {
        InMemoryDataRepository {
            active: true,
            next_id: 1,
            nodes: HashMap::new(),
            external_index: HashMap::new(),
            positions: HashMap::new(),
            cell_info: HashMap::new(),
            app_loss: HashMap::new(),
            rsrp_rsrq: HashMap::new(),
            audit: Vec::new(),
            trace: None,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(":memory:")
    }

    /// Installs a storage trace callback (§4.1), fired for every operation
    /// regardless of success.
    pub fn set_trace(&mut self, trace: StorageTrace) {
        self.trace = Some(trace);
    }

    fn trace(&mut self, op: &str, args: String, success: bool) {
        if let Some(trace) = self.trace.as_mut() {
            trace(op, &args, success);
        }
    }

    fn insert_or_touch(&mut self, kind: NodeKind, external_id: ExternalId, now: SimTime) -> E2NodeId {
        if let Some(&id) = self.external_index.get(&external_id) {
            self.nodes
                .get_mut(&id)
                .expect("node indexed by external id must exist")
                .registration_events
                .push((true, now));
            return id;
        }
        let id = E2NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            NodeRecord { kind, external_id, registration_events: vec![(true, now)] },
        );
        self.external_index.insert(external_id, id);
        id
    }
}

impl DataRepository for InMemoryDataRepository {
    fn activate(&mut self) {
        self.active = true;
    }

    fn deactivate(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn is_registered(&self, e2_node_id: E2NodeId) -> bool {
        if !self.active {
            return false;
        }
        self.nodes.get(&e2_node_id).map(|n| n.is_registered()).unwrap_or(false)
    }

    fn register_node(&mut self, kind: NodeKind, external_id: ExternalId, now: SimTime) -> E2NodeId {
        if !self.active {
            return E2NodeId::INVALID;
        }
        let id = self.insert_or_touch(kind, external_id, now);
        self.trace("register_node", format!("kind={:?} id={:?}", kind, id), true);
        id
    }

    fn register_lte_ue(&mut self, imsi: Imsi, now: SimTime) -> E2NodeId {
        self.register_node(NodeKind::LteUe, ExternalId::LteUe(imsi), now)
    }

    fn register_lte_enb(&mut self, cell_id: CellId, now: SimTime) -> E2NodeId {
        self.register_node(NodeKind::LteEnb, ExternalId::LteEnb(cell_id), now)
    }

    fn deregister_node(&mut self, e2_node_id: E2NodeId, now: SimTime) -> E2NodeId {
        if !self.active {
            return e2_node_id;
        }
        if let Some(node) = self.nodes.get_mut(&e2_node_id) {
            node.registration_events.push((false, now));
        }
        self.trace("deregister_node", format!("id={:?}", e2_node_id), true);
        e2_node_id
    }

    fn save_position(&mut self, e2_node_id: E2NodeId, x: f64, y: f64, z: f64, now: SimTime) {
        if !self.active || !self.is_registered(e2_node_id) {
            return;
        }
        self.positions
            .entry(e2_node_id)
            .or_default()
            .push(PositionSample { timestamp: now, x, y, z });
    }

    fn save_lte_ue_cell_info(&mut self, e2_node_id: E2NodeId, cell_id: CellId, rnti: Rnti, now: SimTime) {
        if !self.active || !self.is_registered(e2_node_id) {
            return;
        }
        self.cell_info.entry(e2_node_id).or_default().push((now, cell_id, rnti));
    }

    fn save_app_loss(&mut self, e2_node_id: E2NodeId, loss: f64, now: SimTime) {
        if !self.active || !self.is_registered(e2_node_id) {
            return;
        }
        self.app_loss.entry(e2_node_id).or_default().push((now, loss));
    }

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
    ) {
        if !self.active || !self.is_registered(e2_node_id) {
            return;
        }
        self.rsrp_rsrq.entry(e2_node_id).or_default().push(RsrpRsrqSample {
            timestamp: now,
            rnti,
            cell_id,
            rsrp,
            rsrq,
            is_serving,
            carrier_id,
        });
    }

    fn node_positions(
        &self,
        e2_node_id: E2NodeId,
        from: SimTime,
        to: SimTime,
        limit: usize,
    ) -> Vec<PositionSample> {
        if !self.active {
            return Vec::new();
        }
        let mut samples: Vec<PositionSample> = self
            .positions
            .get(&e2_node_id)
            .map(|v| {
                v.iter()
                    .filter(|s| s.timestamp >= from && s.timestamp <= to)
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        samples.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        samples.truncate(limit);
        samples
    }

    fn lte_ue_cell_info(&self, e2_node_id: E2NodeId) -> Option<(CellId, Rnti)> {
        if !self.active {
            return None;
        }
        self.cell_info
            .get(&e2_node_id)
            .and_then(|v| v.iter().max_by_key(|(t, ..)| *t))
            .map(|(_, cell_id, rnti)| (*cell_id, *rnti))
    }

    fn app_loss(&self, e2_node_id: E2NodeId) -> f64 {
        if !self.active {
            return 0.0;
        }
        self.app_loss
            .get(&e2_node_id)
            .and_then(|v| v.iter().max_by_key(|(t, _)| *t))
            .map(|(_, loss)| *loss)
            .unwrap_or(0.0)
    }

    fn lte_ue_rsrp_rsrq(&self, e2_node_id: E2NodeId) -> Vec<RsrpRsrqSample> {
        if !self.active {
            return Vec::new();
        }
        let Some(samples) = self.rsrp_rsrq.get(&e2_node_id) else {
            return Vec::new();
        };
        let Some(latest) = samples.iter().map(|s| s.timestamp).max() else {
            return Vec::new();
        };
        samples.iter().filter(|s| s.timestamp == latest).copied().collect()
    }

    fn lte_ue_e2_node_ids(&self) -> Vec<E2NodeId> {
        if !self.active {
            return Vec::new();
        }
        self.nodes
            .iter()
            .filter(|(_, n)| n.kind == NodeKind::LteUe && n.is_registered())
            .map(|(id, _)| *id)
            .collect()
    }

    fn lte_enb_e2_node_ids(&self) -> Vec<E2NodeId> {
        if !self.active {
            return Vec::new();
        }
        self.nodes
            .iter()
            .filter(|(_, n)| n.kind == NodeKind::LteEnb && n.is_registered())
            .map(|(id, _)| *id)
            .collect()
    }

    fn last_registration_requests(&self) -> Vec<(E2NodeId, SimTime)> {
        if !self.active {
            return Vec::new();
        }
        self.nodes
            .iter()
            .filter(|(_, n)| n.is_registered())
            .filter_map(|(id, n)| n.latest_true_registration().map(|t| (*id, t)))
            .collect()
    }

    fn lte_ue_e2_node_id_from_cell_info(&self, cell_id: CellId, rnti: Rnti) -> Option<E2NodeId> {
        if !self.active {
            return None;
        }
        self.cell_info
            .iter()
            .filter_map(|(id, samples)| {
                samples
                    .iter()
                    .filter(|(_, c, r)| *c == cell_id && *r == rnti)
                    .map(|(t, ..)| (*t, *id))
                    .max_by_key(|(t, _)| *t)
            })
            .max_by_key(|(t, _)| *t)
            .map(|(_, id)| id)
    }

    fn log_command_from_e2_terminator(&mut self, cmd: &Command, now: SimTime) {
        if !self.active {
            return;
        }
        self.audit.push(AuditEntry {
            component: "RicE2Terminator",
            lm_or_cmm_name: None,
            timestamp: now,
            text: format!("dispatched {:?}", cmd),
        });
    }

    fn log_command_from_lm(&mut self, lm_name: &str, cmd: &Command, now: SimTime) {
        if !self.active {
            return;
        }
        self.audit.push(AuditEntry {
            component: "LogicModule",
            lm_or_cmm_name: Some(lm_name.to_string()),
            timestamp: now,
            text: format!("emitted {:?}", cmd),
        });
    }

    fn log_action_lm(&mut self, lm_name: &str, text: &str, now: SimTime) {
        if !self.active {
            return;
        }
        self.audit.push(AuditEntry {
            component: "LogicModule",
            lm_or_cmm_name: Some(lm_name.to_string()),
            timestamp: now,
            text: text.to_string(),
        });
    }

    fn log_action_cmm(&mut self, cmm_name: &str, text: &str, now: SimTime) {
        if !self.active {
            return;
        }
        self.audit.push(AuditEntry {
            component: "ConflictMitigationModule",
            lm_or_cmm_name: Some(cmm_name.to_string()),
            timestamp: now,
            text: text.to_string(),
        });
    }

    fn audit_log(&self) -> &[AuditEntry] {
        if !self.active {
            return &[];
        }
        &self.audit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_registration_returns_stable_id() {
        let mut repo = InMemoryDataRepository::in_memory();
        let t0 = SimTime::from_secs_f64(0.0);
        let id = repo.register_node(NodeKind::Wired, ExternalId::Wired(7), t0);
        assert!(id.is_valid());
        repo.deregister_node(id, SimTime::from_secs_f64(1.0));
        assert!(!repo.is_registered(id));
        let id2 = repo.register_node(NodeKind::Wired, ExternalId::Wired(7), SimTime::from_secs_f64(2.0));
        assert_eq!(id, id2);
        assert!(repo.is_registered(id2));
    }

    #[test]
    fn samples_are_dropped_for_unregistered_nodes() {
        let mut repo = InMemoryDataRepository::in_memory();
        repo.save_position(E2NodeId(999), 1.0, 2.0, 3.0, SimTime::ZERO);
        assert!(repo.node_positions(E2NodeId(999), SimTime::ZERO, SimTime::from_secs_f64(100.0), 10).is_empty());
    }

    #[test]
    fn node_positions_are_descending_and_bounded() {
        let mut repo = InMemoryDataRepository::in_memory();
        let id = repo.register_node(NodeKind::Wired, ExternalId::Wired(1), SimTime::ZERO);
        for i in 0..5 {
            repo.save_position(id, i as f64, 0.0, 0.0, SimTime::from_secs_f64(i as f64));
        }
        let samples = repo.node_positions(id, SimTime::ZERO, SimTime::from_secs_f64(100.0), 3);
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].x, 4.0);
        assert_eq!(samples[1].x, 3.0);
        assert_eq!(samples[2].x, 2.0);
    }

    #[test]
    fn deactivated_repository_reports_unregistered() {
        let mut repo = InMemoryDataRepository::in_memory();
        let id = repo.register_node(NodeKind::Wired, ExternalId::Wired(1), SimTime::ZERO);
        repo.deactivate();
        assert!(!repo.is_registered(id));
    }
}
