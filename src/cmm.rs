//! ConflictMitigationModule (C6): a single pluggable filter over the
//! cycle's merged command map (§4.4).
use crate::command::Command;
use crate::common::SimTime;
use crate::repository::DataRepository;
use std::collections::HashSet;

/// Key identifying which logic module a command batch came from.
pub type LmKey = (String, bool);

/// The merged-by-LM command map a cycle hands to the CMM. An insertion-ordered
/// `Vec` rather than a hash map: §9(b) resolves the source's unordered
/// map-iteration-order ambiguity by making "first-seen" a well-defined,
/// testable order.
#[derive(Debug, Clone, Default)]
pub struct LmCommandMap {
    entries: Vec<(LmKey, Vec<Command>)>,
}

impl LmCommandMap {
    pub fn new() -> Self {
        LmCommandMap { entries: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains_key(&self, key: &LmKey) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn entry(&mut self, key: LmKey) -> &mut Vec<Command> {
        if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
            &mut self.entries[pos].1
        } else {
            self.entries.push((key, Vec::new()));
            &mut self.entries.last_mut().unwrap().1
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(LmKey, Vec<Command>)> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Input: the cycle's merged `(lm_name, is_default) -> commands` map.
/// Output: an ordered command list to dispatch (§4.4).
pub trait ConflictMitigationModule {
    fn name(&self) -> &str;
    fn activate(&mut self);
    fn deactivate(&mut self);
    fn filter(&mut self, map: &LmCommandMap, repo: &dyn DataRepository, now: SimTime) -> Vec<Command>;
}

/// Flattens every input list in map order. Emits an audit "No action taken".
pub struct NoOpCmm {
    active: bool,
}

impl NoOpCmm {
    pub fn new() -> Self {
        NoOpCmm { active: true }
    }
}

impl Default for NoOpCmm {
    fn default() -> Self {
        Self::new()
    }
}

impl ConflictMitigationModule for NoOpCmm {
    fn name(&self) -> &str {
        "NoOpCmm"
    }

    fn activate(&mut self) {
        self.active = true;
    }

    fn deactivate(&mut self) {
        self.active = false;
    }

    fn filter(&mut self, map: &LmCommandMap, repo: &dyn DataRepository, now: SimTime) -> Vec<Command> {
        let _ = (repo, now, self.active);
        // No need to check whether the CMM is active: a no-op filter has
        // nothing to gate.
        map.iter().flat_map(|(_, cmds)| cmds.iter().cloned()).collect()
    }
}

/// Suppresses duplicate handover commands across cycles (§4.4). Per §9(a),
/// the pending set is intentionally never garbage-collected by this type —
/// a long-lived deployment that wants eviction must wrap or replace it.
pub struct HandoverCmm {
    active: bool,
    pending: HashSet<(crate::types::E2NodeId, crate::types::CellId, crate::types::Rnti)>,
}

impl HandoverCmm {
    pub fn new() -> Self {
        HandoverCmm { active: true, pending: HashSet::new() }
    }
}

impl Default for HandoverCmm {
    fn default() -> Self {
        Self::new()
    }
}

impl ConflictMitigationModule for HandoverCmm {
    fn name(&self) -> &str {
        "HandoverCmm"
    }

    fn activate(&mut self) {
        self.active = true;
    }

    fn deactivate(&mut self) {
        self.active = false;
    }

    fn filter(&mut self, map: &LmCommandMap, repo: &dyn DataRepository, _now: SimTime) -> Vec<Command> {
        let _ = (repo, self.active);
        // No need to check whether the CMM is active: dedup runs regardless.
        let mut out = Vec::new();
        for (_, cmds) in map.iter() {
            for cmd in cmds {
                match cmd.handover_key() {
                    Some(key) if self.pending.contains(&key) => {}
                    Some(key) => {
                        self.pending.insert(key);
                        out.push(cmd.clone());
                    }
                    None => out.push(cmd.clone()),
                }
            }
        }
        out
    }
}

/// Retains at most one command per affected node (§4.4). Default-LM commands
/// win over additional-LM commands on collision; otherwise first-seen wins.
/// "Affected node" for a handover command is the UE, resolved via
/// [`DataRepository::lte_ue_e2_node_id_from_cell_info`], not the target eNB.
pub struct SingleCommandPerNodeCmm {
    active: bool,
}

impl SingleCommandPerNodeCmm {
    pub fn new() -> Self {
        SingleCommandPerNodeCmm { active: true }
    }

    fn affected_node(
        cmd: &Command,
        repo: &dyn DataRepository,
    ) -> crate::types::E2NodeId {
        match cmd {
            Command::Lte2LteHandover { target_cell_id, target_rnti, .. } => repo
                .lte_ue_e2_node_id_from_cell_info(*target_cell_id, *target_rnti)
                .unwrap_or_else(|| cmd.target_e2_node_id()),
            _ => cmd.target_e2_node_id(),
        }
    }
}

impl Default for SingleCommandPerNodeCmm {
    fn default() -> Self {
        Self::new()
    }
}

impl ConflictMitigationModule for SingleCommandPerNodeCmm {
    fn name(&self) -> &str {
        "SingleCommandPerNodeCmm"
    }

    fn activate(&mut self) {
        self.active = true;
    }

    fn deactivate(&mut self) {
        self.active = false;
    }

    fn filter(&mut self, map: &LmCommandMap, repo: &dyn DataRepository, _now: SimTime) -> Vec<Command> {
        if !self.active {
            // Inactive: pass every command through unfiltered rather than
            // dropping the cycle's output.
            return map.iter().flat_map(|(_, cmds)| cmds.iter().cloned()).collect();
        }
        // node -> (command, is_default, insertion order)
        let mut winners: Vec<(crate::types::E2NodeId, Command, bool)> = Vec::new();
        for ((_, is_default), cmds) in map.iter() {
            for cmd in cmds {
                let node = Self::affected_node(cmd, repo);
                match winners.iter().position(|(n, ..)| *n == node) {
                    None => winners.push((node, cmd.clone(), *is_default)),
                    Some(pos) => {
                        let (_, _, existing_is_default) = &winners[pos];
                        if *is_default && !existing_is_default {
                            winners[pos] = (node, cmd.clone(), *is_default);
                        }
                        // otherwise first-seen wins: leave as-is.
                    }
                }
            }
        }
        winners.into_iter().map(|(_, cmd, _)| cmd).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryDataRepository;
    use crate::types::{CellId, E2NodeId, Rnti};

    fn handover(target: u64, cell: u16, rnti: u16) -> Command {
        Command::Lte2LteHandover {
            target_e2_node_id: E2NodeId(target),
            target_cell_id: CellId(cell),
            target_rnti: Rnti(rnti),
        }
    }

    #[test]
    fn handover_cmm_suppresses_duplicate_across_cycles() {
        let repo = InMemoryDataRepository::in_memory();
        let mut cmm = HandoverCmm::new();
        let mut map = LmCommandMap::new();
        map.entry(("default".into(), true)).push(handover(2, 2, 7));
        let first = cmm.filter(&map, &repo, SimTime::ZERO);
        assert_eq!(first.len(), 1);

        let mut map2 = LmCommandMap::new();
        map2.entry(("default".into(), true)).push(handover(2, 2, 7));
        let second = cmm.filter(&map2, &repo, SimTime::from_secs_f64(1.0));
        assert!(second.is_empty());
    }

    #[test]
    fn single_command_per_node_prefers_default_lm() {
        let repo = InMemoryDataRepository::in_memory();
        let mut cmm = SingleCommandPerNodeCmm::new();
        let mut map = LmCommandMap::new();
        map.entry(("extra".into(), false))
            .push(Command::Base { target_e2_node_id: E2NodeId(1) });
        map.entry(("default".into(), true))
            .push(Command::Base { target_e2_node_id: E2NodeId(1) });
        let dispatched = cmm.filter(&map, &repo, SimTime::ZERO);
        assert_eq!(dispatched.len(), 1);
    }

    #[test]
    fn no_op_cmm_flattens_in_order() {
        let repo = InMemoryDataRepository::in_memory();
        let mut cmm = NoOpCmm::new();
        let mut map = LmCommandMap::new();
        map.entry(("default".into(), true)).push(Command::Base { target_e2_node_id: E2NodeId(1) });
        map.entry(("extra".into(), false)).push(Command::Base { target_e2_node_id: E2NodeId(2) });
        let dispatched = cmm.filter(&map, &repo, SimTime::ZERO);
        assert_eq!(dispatched.len(), 2);
    }
}
