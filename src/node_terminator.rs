//! NodeTerminator (C4): the per-endpoint agent that registers with the RIC,
//! forwards its Reporters' output, and receives dispatched commands.
//!
//! Owned by whatever hosts the endpoint (a [`crate::sim::Simulation`] in
//! this crate), never by the RIC — the RicE2Terminator only ever holds this
//! terminator's [`TerminatorHandle`], not a reference to it (§9).
use crate::command::Command;
use crate::common::{Duration, SimTime};
use crate::log::{my_debug, my_warn};
use crate::random::RandomVariable;
use crate::report::Report;
use crate::scheduler::{EventId, Scheduler, SimEvent};
use crate::types::{CellId, E2NodeId, ExternalId, NodeKind, Rnti, TerminatorHandle};

/// A source of Reports, polled on the hosting terminator's send cadence.
/// Concrete reporters (location, RSRP/RSRQ, app-loss, cell-info) are the
/// embedding application's concern; this crate ships [`crate::reporter::PeriodicLocationReporter`]
/// as a reference implementation used by the mobility golden test (§8.1).
pub trait Reporter {
    fn activate(&mut self);
    fn deactivate(&mut self);
    /// Called once, the first time the owning terminator completes
    /// registration, so an initial report can fire immediately (§4.2).
    fn on_registered(&mut self, now: SimTime) -> Vec<Report>;
    /// Called on every send-loop tick; returns zero or more reports to
    /// enqueue (a reporter with its own slower cadence simply returns an
    /// empty `Vec` on ticks it chooses not to fire).
    fn generate_reports(&mut self, reporter_e2_node_id: E2NodeId, now: SimTime) -> Vec<Report>;
}

/// Sink for the radio-layer effect of a handover command (§4.2). Kept as an
/// injectable trait so the concrete radio model stays an external
/// collaborator per the non-goals.
pub trait HandoverSink {
    fn begin_handover(&mut self, rnti: Rnti, target_cell_id: CellId);
}

/// A per-endpoint agent (§4.2), variant-dispatched on [`NodeKind`].
pub struct NodeTerminator {
    handle: TerminatorHandle,
    kind: NodeKind,
    external_id: ExternalId,
    attached: bool,
    active: bool,
    e2_node_id: Option<E2NodeId>,
    pending_reports: Vec<Report>,
    reporters: Vec<Box<dyn Reporter>>,
    handover_sink: Option<Box<dyn HandoverSink>>,
    registration_interval: Box<dyn RandomVariable>,
    send_interval: Box<dyn RandomVariable>,
    transmission_delay: Box<dyn RandomVariable>,
    registration_event: Option<EventId>,
    send_event: Option<EventId>,
}

impl NodeTerminator {
    pub fn new(
        handle: TerminatorHandle,
        kind: NodeKind,
        external_id: ExternalId,
        registration_interval: Box<dyn RandomVariable>,
        send_interval: Box<dyn RandomVariable>,
        transmission_delay: Box<dyn RandomVariable>,
    ) -> Self {
        assert_eq!(kind, external_id.kind(), "external identity kind must match node kind");
        NodeTerminator {
            handle,
            kind,
            external_id,
            attached: false,
            active: false,
            e2_node_id: None,
            pending_reports: Vec::new(),
            reporters: Vec::new(),
            handover_sink: None,
            registration_interval,
            send_interval,
            transmission_delay,
            registration_event: None,
            send_event: None,
        }
    }

    pub fn handle(&self) -> TerminatorHandle {
        self.handle
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn external_id(&self) -> ExternalId {
        self.external_id
    }

    pub fn e2_node_id(&self) -> Option<E2NodeId> {
        self.e2_node_id
    }

    pub fn set_handover_sink(&mut self, sink: Box<dyn HandoverSink>) {
        self.handover_sink = Some(sink);
    }

    /// Binds the terminator to a hosting endpoint's interface. Must be
    /// called before [`NodeTerminator::activate`]. `interface_index` is
    /// opaque here: it identifies which of the host's network interfaces
    /// this terminator speaks through, a concern of the embedding
    /// application rather than the RIC core.
    pub fn attach(&mut self, _host_node: (), _interface_index: u32) {
        self.attached = true;
    }

    pub fn add_reporter(&mut self, reporter: Box<dyn Reporter>) {
        self.reporters.push(reporter);
    }

    pub fn activate(&mut self, scheduler: &mut Scheduler) {
        assert!(self.attached, "NodeTerminator must be attached before activate()");
        self.active = true;
        for reporter in &mut self.reporters {
            reporter.activate();
        }
        self.schedule_registration(scheduler);
        self.schedule_send(scheduler);
    }

    pub fn deactivate(&mut self, scheduler: &mut Scheduler) {
        self.active = false;
        for reporter in &mut self.reporters {
            reporter.deactivate();
        }
        if let Some(id) = self.registration_event.take() {
            scheduler.cancel(id);
        }
        if let Some(id) = self.send_event.take() {
            scheduler.cancel(id);
        }
        // §9(c): pending reports are discarded, not flushed, on deactivation.
        self.pending_reports.clear();
    }

    fn schedule_registration(&mut self, scheduler: &mut Scheduler) {
        let delay = Duration::from_secs_f64(self.registration_interval.sample());
        self.registration_event = Some(
            scheduler.schedule(delay, SimEvent::TerminatorRegistrationTick { handle: self.handle }),
        );
    }

    fn schedule_send(&mut self, scheduler: &mut Scheduler) {
        let delay = Duration::from_secs_f64(self.send_interval.sample());
        self.send_event =
            Some(scheduler.schedule(delay, SimEvent::TerminatorSendTick { handle: self.handle }));
    }

    /// Called by the `Simulation` driver when this terminator's registration
    /// tick fires. Returns the event to hand to the RicE2Terminator, along
    /// with the transmission delay to apply.
    pub fn on_registration_tick(
        &mut self,
        scheduler: &mut Scheduler,
        ric_inactivity_threshold: Duration,
    ) -> (NodeKind, ExternalId, Duration) {
        let next_interval = self.registration_interval.sample();
        if next_interval > ric_inactivity_threshold.as_secs_f64() {
            my_warn!(
                "NodeTerminator {:?}: registration_interval exceeds e2_node_inactivity_threshold",
                self.handle
            );
        }
        self.registration_event = Some(scheduler.schedule(
            Duration::from_secs_f64(next_interval),
            SimEvent::TerminatorRegistrationTick { handle: self.handle },
        ));
        let delay = Duration::from_secs_f64(self.transmission_delay.sample());
        (self.kind, self.external_id, delay)
    }

    /// Called by the `Simulation` driver when this terminator's send tick
    /// fires. Polls every reporter, buffers the results, and returns the
    /// buffered reports paired with an independent transmission-delay draw
    /// each, then empties the buffer (§4.2).
    pub fn on_send_tick(&mut self, scheduler: &mut Scheduler, now: SimTime) -> Vec<(Report, Duration)> {
        let e2_node_id = self.e2_node_id.unwrap_or(E2NodeId::INVALID);
        for reporter in &mut self.reporters {
            let reports = reporter.generate_reports(e2_node_id, now);
            self.pending_reports.extend(reports);
        }
        self.schedule_send(scheduler);
        self.pending_reports
            .drain(..)
            .map(|r| (r, Duration::from_secs_f64(self.transmission_delay.sample())))
            .collect()
    }

    pub fn store_report(&mut self, report: Report) {
        self.pending_reports.push(report);
    }

    /// Dispatch on command variant (§4.2): unrecognized variants for this
    /// terminator's kind are silently ignored.
    pub fn receive_command(&mut self, cmd: Command) {
        match (&cmd, self.kind) {
            (Command::Lte2LteHandover { target_rnti, target_cell_id, .. }, NodeKind::LteEnb) => {
                if let Some(sink) = self.handover_sink.as_mut() {
                    sink.begin_handover(*target_rnti, *target_cell_id);
                }
            }
            _ => {
                my_debug!("NodeTerminator {:?} ignoring unrecognized command {:?}", self.handle, cmd);
            }
        }
    }

    pub fn receive_registration_response(&mut self, new_e2_node_id: E2NodeId, now: SimTime) {
        let first_registration = self.e2_node_id.is_none();
        self.e2_node_id = Some(new_e2_node_id);
        if first_registration {
            for reporter in &mut self.reporters {
                let reports = reporter.on_registered(now);
                self.pending_reports.extend(reports);
            }
        }
    }

    pub fn receive_deregistration_response(&mut self, e2_node_id: E2NodeId) {
        if self.e2_node_id == Some(e2_node_id) {
            self.e2_node_id = None;
        }
    }
}
