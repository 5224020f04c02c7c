//! RicE2Terminator (§4.6): the RIC-side endpoint that talks to every
//! NodeTerminator. Owned by [`crate::ric_core::RicCore`]; holds only opaque
//! [`TerminatorHandle`]s, never a reference back into a NodeTerminator (§9).
use crate::command::Command;
use crate::common::{Duration, SimTime};
use crate::random::RandomVariable;
use crate::report::Report;
use crate::repository::DataRepository;
use crate::scheduler::{Scheduler, SimEvent};
use crate::types::{E2NodeId, ExternalId, NodeKind, TerminatorHandle};
use std::collections::HashMap;

pub struct RicE2Terminator {
    terminators: HashMap<E2NodeId, TerminatorHandle>,
    transmission_delay: Box<dyn RandomVariable>,
}

impl RicE2Terminator {
    pub fn new(transmission_delay: Box<dyn RandomVariable>) -> Self {
        RicE2Terminator { terminators: HashMap::new(), transmission_delay }
    }

    pub fn terminator_for(&self, e2_node_id: E2NodeId) -> Option<TerminatorHandle> {
        self.terminators.get(&e2_node_id).copied()
    }

    pub fn receive_registration_request(
        &mut self,
        kind: NodeKind,
        external_id: ExternalId,
        requester: TerminatorHandle,
        repo: &mut dyn DataRepository,
        scheduler: &mut Scheduler,
        now: SimTime,
    ) {
        let e2_node_id = match external_id {
            ExternalId::LteUe(imsi) => repo.register_lte_ue(imsi, now),
            ExternalId::LteEnb(cell_id) => repo.register_lte_enb(cell_id, now),
            ExternalId::Wired(_) => repo.register_node(kind, external_id, now),
        };
        self.terminators.insert(e2_node_id, requester);
        let delay = Duration::from_secs_f64(self.transmission_delay.sample());
        scheduler.schedule(
            delay,
            SimEvent::TerminatorRegistrationResponse { target: requester, e2_node_id },
        );
    }

    pub fn receive_deregistration_request(
        &mut self,
        e2_node_id: E2NodeId,
        repo: &mut dyn DataRepository,
        scheduler: &mut Scheduler,
        now: SimTime,
    ) {
        repo.deregister_node(e2_node_id, now);
        if let Some(&target) = self.terminators.get(&e2_node_id) {
            let delay = Duration::from_secs_f64(self.transmission_delay.sample());
            scheduler.schedule(
                delay,
                SimEvent::TerminatorDeregistrationResponse { target, e2_node_id },
            );
        }
    }

    /// Persists a report (variant-dispatched; all variants share the same
    /// shape here). Notifying QueryTriggers is the caller's (RicCore's)
    /// responsibility, since RicE2Terminator holds no back-reference.
    pub fn receive_report(&mut self, report: &Report, repo: &mut dyn DataRepository, now: SimTime) {
        match report {
            Report::Location { reporter_e2_node_id, x, y, z, .. } => {
                repo.save_position(*reporter_e2_node_id, *x, *y, *z, now);
            }
            Report::LteUeCellInfo { reporter_e2_node_id, cell_id, rnti, .. } => {
                repo.save_lte_ue_cell_info(*reporter_e2_node_id, *cell_id, *rnti, now);
            }
            Report::LteUeRsrpRsrq {
                reporter_e2_node_id,
                rnti,
                cell_id,
                rsrp,
                rsrq,
                is_serving,
                carrier_id,
                ..
            } => {
                repo.save_lte_ue_rsrp_rsrq(
                    *reporter_e2_node_id,
                    *rnti,
                    *cell_id,
                    *rsrp,
                    *rsrq,
                    *is_serving,
                    *carrier_id,
                    now,
                );
            }
            Report::AppLoss { reporter_e2_node_id, loss, .. } => {
                repo.save_app_loss(*reporter_e2_node_id, *loss, now);
            }
        }
    }

    /// Logs and schedules delivery of each surviving command, each after an
    /// independent transmission-delay draw (§4.6). A command whose target is
    /// not currently registered is dropped with an audit entry (I6).
    pub fn process_commands(
        &mut self,
        commands: Vec<Command>,
        repo: &mut dyn DataRepository,
        scheduler: &mut Scheduler,
        now: SimTime,
    ) {
        for cmd in commands {
            let target = cmd.target_e2_node_id();
            if !repo.is_registered(target) {
                repo.log_command_from_e2_terminator(&cmd, now);
                crate::log::my_warn!(
                    "dropping command for unregistered node {:?}: {:?}",
                    target,
                    cmd
                );
                continue;
            }
            repo.log_command_from_e2_terminator(&cmd, now);
            if let Some(&handle) = self.terminators.get(&target) {
                let delay = Duration::from_secs_f64(self.transmission_delay.sample());
                scheduler.schedule(delay, SimEvent::TerminatorCommandArrival { target: handle, command: cmd });
            }
        }
    }
}
