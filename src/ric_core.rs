//! RicCore (§4.7): the orchestrator. Owns the DataRepository, the CMM, the
//! default LM, the additional LMs, the RicE2Terminator, and the QueryTriggers
//! — the hardest state in the system, since it alone drives the cycle state
//! machine described in §4.7.
use crate::cmm::{ConflictMitigationModule, LmCommandMap};
use crate::common::{Duration, SimTime};
use crate::config::RicConfig;
use crate::error::abort;
use crate::log::my_debug;
use crate::logic_module::LogicModule;
use crate::query_trigger::QueryTrigger;
use crate::random::RandomVariable;
use crate::report::Report;
use crate::repository::DataRepository;
use crate::ric_e2_terminator::RicE2Terminator;
use crate::scheduler::{EventId, Scheduler, SimEvent};
use crate::types::{E2NodeId, ExternalId, NodeKind, TerminatorHandle};
use std::collections::{HashMap, HashSet};

/// Where the current cycle stands. A cycle's identity (`cycle_time`) stays
/// valid through `Dispatched` so a late `notify_lm_finished` can still be
/// recognised as belonging to it (§4.7's late-command rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CyclePhase {
    Idle,
    Collecting,
    Dispatched,
}

pub struct RicCore {
    default_lm: Box<dyn LogicModule>,
    additional_lms: Vec<(usize, String, Box<dyn LogicModule>)>,
    next_lm_slot: usize,
    cmm: Box<dyn ConflictMitigationModule>,
    repo: Box<dyn DataRepository>,
    e2_terminator: RicE2Terminator,
    triggers: Vec<(String, Box<dyn QueryTrigger>)>,
    config: RicConfig,
    e2_node_inactivity_interval: Box<dyn RandomVariable>,
    active: bool,

    phase: CyclePhase,
    cycle_time: SimTime,
    lm_map: LmCommandMap,
    expected_this_cycle: HashSet<(String, bool)>,
    responded_this_cycle: HashSet<(String, bool)>,

    tick_event: Option<EventId>,
    inactivity_event: Option<EventId>,
    max_wait_event: Option<EventId>,
    lm_delivery_events: HashMap<usize, EventId>,
}

impl RicCore {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        default_lm: Box<dyn LogicModule>,
        cmm: Box<dyn ConflictMitigationModule>,
        repo: Box<dyn DataRepository>,
        e2_terminator: RicE2Terminator,
        config: RicConfig,
        e2_node_inactivity_interval: Box<dyn RandomVariable>,
    ) -> Self {
        config.validate();
        RicCore {
            default_lm,
            additional_lms: Vec::new(),
            next_lm_slot: 1,
            cmm,
            repo,
            e2_terminator,
            triggers: Vec::new(),
            config,
            e2_node_inactivity_interval,
            active: false,
            phase: CyclePhase::Idle,
            cycle_time: SimTime::ZERO,
            lm_map: LmCommandMap::new(),
            expected_this_cycle: HashSet::new(),
            responded_this_cycle: HashSet::new(),
            tick_event: None,
            inactivity_event: None,
            max_wait_event: None,
            lm_delivery_events: HashMap::new(),
        }
    }

    pub fn repo(&self) -> &dyn DataRepository {
        self.repo.as_ref()
    }

    pub fn inactivity_threshold(&self) -> Duration {
        self.config.e2_node_inactivity_threshold
    }

    pub fn e2_terminator_mut(&mut self) -> &mut RicE2Terminator {
        &mut self.e2_terminator
    }

    /// Replaces the default LM, which always exists and is never removed,
    /// only swapped (§4.3). Returns the outgoing one.
    pub fn replace_default_lm(&mut self, lm: Box<dyn LogicModule>) -> Box<dyn LogicModule> {
        std::mem::replace(&mut self.default_lm, lm)
    }

    /// Additional LMs have unique names and can be added or removed at any
    /// time (§4.3). Panics on a duplicate name — a configuration bug (§7).
    pub fn add_logic_module(&mut self, name: impl Into<String>, lm: Box<dyn LogicModule>) {
        let name = name.into();
        if self.additional_lms.iter().any(|(_, n, _)| *n == name) {
            abort!("duplicate additional LogicModule name: {}", name);
        }
        let slot = self.next_lm_slot;
        self.next_lm_slot += 1;
        self.additional_lms.push((slot, name, lm));
    }

    /// Panics if `name` does not name a live additional LM — a configuration
    /// error, fatal per §7, symmetric with `add_logic_module`'s panic on a
    /// duplicate name.
    pub fn remove_logic_module(&mut self, name: &str, scheduler: &mut Scheduler) -> Box<dyn LogicModule> {
        let Some(pos) = self.additional_lms.iter().position(|(_, n, _)| n == name) else {
            abort!("unknown additional LogicModule name: {}", name);
        };
        let (slot, _, lm) = self.additional_lms.remove(pos);
        if let Some(id) = self.lm_delivery_events.remove(&slot) {
            scheduler.cancel(id);
        }
        lm
    }

    pub fn add_query_trigger(&mut self, name: impl Into<String>, trigger: Box<dyn QueryTrigger>) {
        let name = name.into();
        if self.triggers.iter().any(|(n, _)| *n == name) {
            abort!("duplicate QueryTrigger name: {}", name);
        }
        self.triggers.push((name, trigger));
    }

    /// Panics if `name` does not name a live trigger — a configuration
    /// error, fatal per §7, symmetric with `add_query_trigger`'s panic on a
    /// duplicate name.
    pub fn remove_query_trigger(&mut self, name: &str) -> Box<dyn QueryTrigger> {
        let Some(pos) = self.triggers.iter().position(|(n, _)| n == name) else {
            abort!("unknown QueryTrigger name: {}", name);
        };
        self.triggers.remove(pos).1
    }

    fn lm_key(&self, lm_id: usize) -> (String, bool) {
        if lm_id == 0 {
            (self.default_lm.name().to_string(), true)
        } else {
            let (_, name, _) = self
                .additional_lms
                .iter()
                .find(|(slot, ..)| *slot == lm_id)
                .expect("lm_id must name a live LM slot");
            (name.clone(), false)
        }
    }

    fn lm_mut(&mut self, lm_id: usize) -> &mut dyn LogicModule {
        if lm_id == 0 {
            self.default_lm.as_mut()
        } else {
            self.additional_lms
                .iter_mut()
                .find(|(slot, ..)| *slot == lm_id)
                .map(|(_, _, lm)| lm.as_mut())
                .expect("lm_id must name a live LM slot")
        }
    }

    fn all_lm_ids(&self) -> Vec<usize> {
        std::iter::once(0).chain(self.additional_lms.iter().map(|(slot, ..)| *slot)).collect()
    }

    // -- lifecycle (§4.7) --

    pub fn activate(&mut self) {
        self.active = true;
        self.repo.activate();
        self.cmm.activate();
        self.default_lm.set_active(true);
        for (_, _, lm) in &mut self.additional_lms {
            lm.set_active(true);
        }
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.repo.deactivate();
        self.cmm.deactivate();
        self.default_lm.set_active(false);
        for (_, _, lm) in &mut self.additional_lms {
            lm.set_active(false);
        }
    }

    /// `activate()` plus scheduling the first `query_lms`/`check_for_inactivity`
    /// through the event queue, rather than calling them inline, so every
    /// cycle — including the first — runs through the same dispatch path.
    pub fn start(&mut self, scheduler: &mut Scheduler, now: SimTime) {
        self.activate();
        self.tick_event = Some(scheduler.schedule_at(now, SimEvent::RicCycleTick));
        self.inactivity_event = Some(scheduler.schedule_at(now, SimEvent::RicInactivitySweep));
    }

    pub fn stop(&mut self, scheduler: &mut Scheduler) {
        self.deactivate();
        for id in [self.tick_event.take(), self.inactivity_event.take(), self.max_wait_event.take()]
            .into_iter()
            .flatten()
        {
            scheduler.cancel(id);
        }
        for (_, id) in self.lm_delivery_events.drain() {
            scheduler.cancel(id);
        }
    }

    // -- inactivity sweep (§4.7) --

    /// Single entry point used both periodically (on `RicInactivitySweep`)
    /// and inline at the start of every cycle (§4.7); every call re-arms the
    /// periodic timer with a fresh draw.
    pub fn check_for_inactivity(&mut self, scheduler: &mut Scheduler, now: SimTime) {
        if !self.active {
            return;
        }
        if let Some(id) = self.inactivity_event.take() {
            scheduler.cancel(id);
        }
        for (e2_node_id, last_seen) in self.repo.last_registration_requests() {
            if now.saturating_sub(last_seen) > self.config.e2_node_inactivity_threshold {
                my_debug!("deregistering inactive node {:?}", e2_node_id);
                self.e2_terminator.receive_deregistration_request(e2_node_id, self.repo.as_mut(), scheduler, now);
            }
        }
        let delay = Duration::from_secs_f64(self.e2_node_inactivity_interval.sample());
        self.inactivity_event = Some(scheduler.schedule(delay, SimEvent::RicInactivitySweep));
    }

    // -- cycle state machine (§4.7) --

    /// Opens a new cycle: cancels anything still running from a superseded
    /// cycle, runs the inactivity sweep inline, starts every active LM, and
    /// arms both the late-command deadline (if configured) and the next tick.
    pub fn query_lms(&mut self, scheduler: &mut Scheduler, now: SimTime) {
        if !self.active {
            return;
        }
        self.check_for_inactivity(scheduler, now);

        for lm_id in self.all_lm_ids() {
            if self.lm_mut(lm_id).is_running() {
                let key = self.lm_key(lm_id);
                let dropped = self.lm_mut(lm_id).cancel_run();
                if let Some(id) = self.lm_delivery_events.remove(&lm_id) {
                    scheduler.cancel(id);
                }
                self.repo.log_action_lm(
                    &key.0,
                    &format!("cycle superseded: dropped {} pending commands", dropped.len()),
                    now,
                );
            }
        }

        self.cycle_time = now;
        self.phase = CyclePhase::Collecting;
        self.expected_this_cycle.clear();
        self.responded_this_cycle.clear();

        for lm_id in self.all_lm_ids() {
            if self.lm_mut(lm_id).is_active() {
                let key = self.lm_key(lm_id);
                let delay = self.lm_mut(lm_id).begin_run(now, self.repo.as_ref());
                self.expected_this_cycle.insert(key);
                let id = scheduler.schedule(delay, SimEvent::RicLmDelivery { lm_id, cycle: now });
                self.lm_delivery_events.insert(lm_id, id);
            }
        }

        if let Some(id) = self.max_wait_event.take() {
            scheduler.cancel(id);
        }
        if self.config.lm_query_max_wait_time > Duration::ZERO {
            self.max_wait_event = Some(
                scheduler.schedule(self.config.lm_query_max_wait_time, SimEvent::RicLateCommandDeadline { cycle: now }),
            );
        }

        if let Some(id) = self.tick_event.take() {
            scheduler.cancel(id);
        }
        self.tick_event = Some(scheduler.schedule(self.config.lm_query_interval, SimEvent::RicCycleTick));

        if self.expected_this_cycle.is_empty() {
            self.process_lm_query_commands(scheduler, now);
        }
    }

    /// Called by the driver when a scheduled `RicLmDelivery` fires.
    pub fn notify_lm_finished(&mut self, lm_id: usize, cycle: SimTime, scheduler: &mut Scheduler, now: SimTime) {
        let key = self.lm_key(lm_id);
        if self.phase == CyclePhase::Idle || cycle != self.cycle_time {
            abort!("notify_lm_finished for unknown cycle {:?} (lm {:?})", cycle, key);
        }
        self.lm_delivery_events.remove(&lm_id);
        let commands = self.lm_mut(lm_id).take_delivery(cycle);

        match self.phase {
            CyclePhase::Collecting => {
                for cmd in &commands {
                    self.repo.log_command_from_lm(&key.0, cmd, now);
                }
                self.lm_map.entry(key.clone()).extend(commands);
                self.responded_this_cycle.insert(key);
                if self.responded_this_cycle == self.expected_this_cycle {
                    self.process_lm_query_commands(scheduler, now);
                }
            }
            CyclePhase::Dispatched => match self.config.lm_query_late_command_policy {
                crate::types::LateCommandPolicy::Drop => {
                    self.repo.log_action_lm(
                        &key.0,
                        &format!("dropped {} late commands", commands.len()),
                        now,
                    );
                }
                crate::types::LateCommandPolicy::Save => {
                    for cmd in &commands {
                        self.repo.log_command_from_lm(&key.0, cmd, now);
                    }
                    self.lm_map.entry(key).extend(commands);
                }
            },
            CyclePhase::Idle => unreachable!("checked above"),
        }
    }

    /// Called by the driver when the cycle's `RicLateCommandDeadline` fires.
    pub fn handle_late_deadline(&mut self, cycle: SimTime, scheduler: &mut Scheduler, now: SimTime) {
        if self.phase != CyclePhase::Collecting || cycle != self.cycle_time {
            return;
        }
        self.process_lm_query_commands(scheduler, now);
    }

    fn process_lm_query_commands(&mut self, scheduler: &mut Scheduler, now: SimTime) {
        if let Some(id) = self.max_wait_event.take() {
            scheduler.cancel(id);
        }
        let dispatch = self.cmm.filter(&self.lm_map, self.repo.as_ref(), now);
        self.lm_map.clear();
        self.phase = CyclePhase::Dispatched;
        self.e2_terminator.process_commands(dispatch, self.repo.as_mut(), scheduler, now);
    }

    // -- reports and triggers (§4.5, §4.7) --

    pub fn notify_report_received(&mut self, report: &Report, scheduler: &mut Scheduler, now: SimTime) {
        let mut fire = false;
        for (_, trigger) in &mut self.triggers {
            if trigger.should_query_lms(report) {
                fire = true;
            }
        }
        if fire {
            self.query_lms(scheduler, now);
        }
    }

    // -- glue for the RicE2Terminator's inbound events --

    pub fn handle_registration_request(
        &mut self,
        kind: NodeKind,
        external_id: ExternalId,
        requester: TerminatorHandle,
        scheduler: &mut Scheduler,
        now: SimTime,
    ) {
        self.e2_terminator.receive_registration_request(kind, external_id, requester, self.repo.as_mut(), scheduler, now);
    }

    pub fn handle_deregistration_request(&mut self, e2_node_id: E2NodeId, scheduler: &mut Scheduler, now: SimTime) {
        self.e2_terminator.receive_deregistration_request(e2_node_id, self.repo.as_mut(), scheduler, now);
    }

    pub fn handle_report_arrival(&mut self, report: Report, scheduler: &mut Scheduler, now: SimTime) {
        self.e2_terminator.receive_report(&report, self.repo.as_mut(), now);
        self.notify_report_received(&report, scheduler, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmm::NoOpCmm;
    use crate::command::Command;
    use crate::logic_module::ClosureLm;
    use crate::random::Constant;
    use crate::repository::InMemoryDataRepository;
    use crate::types::E2NodeId;

    fn core(max_wait: f64) -> RicCore {
        let mut config = RicConfig::default();
        config.lm_query_interval = Duration::from_secs_f64(5.0);
        config.lm_query_max_wait_time = Duration::from_secs_f64(max_wait);
        RicCore::new(
            Box::new(ClosureLm::new("default", Box::new(Constant(0.0)), Box::new(|_| Vec::new()))),
            Box::new(NoOpCmm::new()),
            Box::new(InMemoryDataRepository::in_memory()),
            RicE2Terminator::new(Box::new(Constant(0.0))),
            config,
            Box::new(Constant(1.0)),
        )
    }

    /// Drives a `RicCore` on its own, without a `Simulation`, by matching the
    /// subset of `SimEvent`s RicCore cares about directly. Both the cycle
    /// tick and the inactivity sweep perpetually reschedule themselves, so
    /// this steps at most `max_steps` times rather than draining the queue.
    fn drain(core: &mut RicCore, scheduler: &mut Scheduler, max_steps: usize) {
        for _ in 0..max_steps {
            let Some((now, event)) = scheduler.step() else { break };
            match event {
                SimEvent::RicCycleTick => core.query_lms(scheduler, now),
                SimEvent::RicInactivitySweep => core.check_for_inactivity(scheduler, now),
                SimEvent::RicLmDelivery { lm_id, cycle } => core.notify_lm_finished(lm_id, cycle, scheduler, now),
                SimEvent::RicLateCommandDeadline { cycle } => core.handle_late_deadline(cycle, scheduler, now),
                _ => {}
            }
        }
    }

    #[test]
    fn cycle_with_no_wait_dispatches_once_default_lm_reports() {
        let mut scheduler = Scheduler::new();
        let mut core = core(0.0);
        core.start(&mut scheduler, SimTime::ZERO);
        drain(&mut core, &mut scheduler, 3);
        assert_eq!(core.phase, CyclePhase::Dispatched);
    }

    #[test]
    fn notify_lm_finished_after_dispatch_is_late_and_dropped() {
        // max_wait=1s dispatches before the 3s-delayed "slow" LM reports back;
        // lm_query_interval (5s) stays wide enough that the next cycle does
        // not supersede "slow" before its own delivery event fires at t=3.
        let mut scheduler = Scheduler::new();
        let mut core = core(1.0);
        core.config.lm_query_late_command_policy = crate::types::LateCommandPolicy::Drop;
        core.add_logic_module(
            "slow",
            Box::new(ClosureLm::new(
                "slow",
                Box::new(Constant(3.0)),
                Box::new(|_| vec![Command::Base { target_e2_node_id: E2NodeId(1) }]),
            )),
        );
        core.start(&mut scheduler, SimTime::ZERO);
        drain(&mut core, &mut scheduler, 8);
        assert_eq!(core.phase, CyclePhase::Dispatched);
        let late_entries = core
            .repo()
            .audit_log()
            .iter()
            .filter(|e| e.text.contains("late"))
            .count();
        assert_eq!(late_entries, 1);
    }

    #[test]
    #[should_panic(expected = "unknown cycle")]
    fn notify_lm_finished_for_wrong_cycle_panics() {
        let mut scheduler = Scheduler::new();
        let mut core = core(0.0);
        core.start(&mut scheduler, SimTime::ZERO);
        core.notify_lm_finished(0, SimTime::from_secs_f64(999.0), &mut scheduler, SimTime::ZERO);
    }

    #[test]
    fn late_command_under_save_policy_lands_in_next_cycles_map() {
        // Same shape as the DROP scenario, but SAVE carries the late
        // "slow" delivery straight into the next cycle's map (§4.7).
        let mut scheduler = Scheduler::new();
        let mut core = core(1.0);
        core.config.lm_query_late_command_policy = crate::types::LateCommandPolicy::Save;
        core.add_logic_module(
            "slow",
            Box::new(ClosureLm::new(
                "slow",
                Box::new(Constant(3.0)),
                Box::new(|_| vec![Command::Base { target_e2_node_id: E2NodeId(1) }]),
            )),
        );
        core.start(&mut scheduler, SimTime::ZERO);
        // Steps through: t=0 tick, t=0 default delivery, t=1 inactivity,
        // t=1 deadline (dispatch #1, empty), t=2 inactivity, t=3 slow's late
        // delivery (saved into the still-open map).
        drain(&mut core, &mut scheduler, 6);
        assert!(!core.lm_map.is_empty(), "late SAVE commands must remain queued for the next cycle");
    }
}
