//! `Simulation` (§5, §6.4): the single driver that owns the `Scheduler`, a
//! `RicCore`, and every hosted `NodeTerminator`, and routes each popped
//! `SimEvent` to the right handler. This is the in-library generalization of
//! the teacher's `tests/simulator` harness — promoted from a test-only
//! helper to the crate's core concurrency substrate, since the discrete-event
//! model is itself a first-class feature here, not a testing convenience.
use crate::common::SimTime;
use crate::node_terminator::NodeTerminator;
use crate::ric_core::RicCore;
use crate::scheduler::{Scheduler, SimEvent};
use crate::types::TerminatorHandle;
use std::collections::HashMap;

pub struct Simulation {
    scheduler: Scheduler,
    ric: RicCore,
    terminators: HashMap<TerminatorHandle, NodeTerminator>,
    next_handle: u64,
}

impl Simulation {
    pub fn new(ric: RicCore) -> Self {
        Simulation { scheduler: Scheduler::new(), ric, terminators: HashMap::new(), next_handle: 1 }
    }

    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    pub fn ric(&self) -> &RicCore {
        &self.ric
    }

    pub fn ric_mut(&mut self) -> &mut RicCore {
        &mut self.ric
    }

    pub fn terminator(&self, handle: TerminatorHandle) -> Option<&NodeTerminator> {
        self.terminators.get(&handle)
    }

    pub fn terminator_mut(&mut self, handle: TerminatorHandle) -> Option<&mut NodeTerminator> {
        self.terminators.get_mut(&handle)
    }

    /// Allocates the next `TerminatorHandle` and builds the terminator with
    /// it, so a `NodeTerminator`'s own idea of its handle always matches the
    /// key it is hosted under.
    pub fn add_terminator(&mut self, build: impl FnOnce(TerminatorHandle) -> NodeTerminator) -> TerminatorHandle {
        let handle = TerminatorHandle(self.next_handle);
        self.next_handle += 1;
        let terminator = build(handle);
        assert_eq!(terminator.handle(), handle, "terminator built with the wrong handle");
        self.terminators.insert(handle, terminator);
        handle
    }

    /// Activates the RIC and every hosted terminator, and arms their initial
    /// registration/send loops.
    pub fn start(&mut self, now: SimTime) {
        self.ric.start(&mut self.scheduler, now);
        for terminator in self.terminators.values_mut() {
            terminator.activate(&mut self.scheduler);
        }
    }

    pub fn stop(&mut self) {
        self.ric.stop(&mut self.scheduler);
        for terminator in self.terminators.values_mut() {
            terminator.deactivate(&mut self.scheduler);
        }
    }

    /// Pops and dispatches the single next event. Returns `false` once the
    /// queue is exhausted.
    pub fn step(&mut self) -> bool {
        let Some((now, event)) = self.scheduler.step() else {
            return false;
        };
        self.dispatch(now, event);
        true
    }

    /// Steps until the next pending event would fire strictly after `until`,
    /// or the queue empties. Since the RIC's cycle tick and inactivity sweep
    /// perpetually reschedule themselves, a `Simulation` hosting an active
    /// `RicCore` never empties its queue on its own — callers drive it with
    /// `run_until`, not by draining to exhaustion.
    pub fn run_until(&mut self, until: SimTime) {
        while let Some(next) = self.scheduler.peek_time() {
            if next > until {
                break;
            }
            if !self.step() {
                break;
            }
        }
    }

    fn dispatch(&mut self, now: SimTime, event: SimEvent) {
        match event {
            SimEvent::RicCycleTick => self.ric.query_lms(&mut self.scheduler, now),
            SimEvent::RicInactivitySweep => self.ric.check_for_inactivity(&mut self.scheduler, now),
            SimEvent::RicLmDelivery { lm_id, cycle } => {
                self.ric.notify_lm_finished(lm_id, cycle, &mut self.scheduler, now)
            }
            SimEvent::RicLateCommandDeadline { cycle } => {
                self.ric.handle_late_deadline(cycle, &mut self.scheduler, now)
            }
            SimEvent::RicRegistrationArrival { kind, external_id, requester } => {
                self.ric.handle_registration_request(kind, external_id, requester, &mut self.scheduler, now)
            }
            SimEvent::RicDeregistrationArrival { e2_node_id } => {
                self.ric.handle_deregistration_request(e2_node_id, &mut self.scheduler, now)
            }
            SimEvent::RicReportArrival { report } => self.ric.handle_report_arrival(report, &mut self.scheduler, now),
            SimEvent::TerminatorRegistrationResponse { target, e2_node_id } => {
                if let Some(t) = self.terminators.get_mut(&target) {
                    t.receive_registration_response(e2_node_id, now);
                }
            }
            SimEvent::TerminatorDeregistrationResponse { target, e2_node_id } => {
                if let Some(t) = self.terminators.get_mut(&target) {
                    t.receive_deregistration_response(e2_node_id);
                }
            }
            SimEvent::TerminatorCommandArrival { target, command } => {
                if let Some(t) = self.terminators.get_mut(&target) {
                    t.receive_command(command);
                }
            }
            SimEvent::TerminatorRegistrationTick { handle } => {
                let threshold = self.ric.inactivity_threshold();
                if let Some(t) = self.terminators.get_mut(&handle) {
                    let (kind, external_id, delay) = t.on_registration_tick(&mut self.scheduler, threshold);
                    self.scheduler.schedule(
                        delay,
                        SimEvent::RicRegistrationArrival { kind, external_id, requester: handle },
                    );
                }
            }
            SimEvent::TerminatorSendTick { handle } => {
                if let Some(t) = self.terminators.get_mut(&handle) {
                    for (report, delay) in t.on_send_tick(&mut self.scheduler, now) {
                        self.scheduler.schedule(delay, SimEvent::RicReportArrival { report });
                    }
                }
            }
        }
    }
}
