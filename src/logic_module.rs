//! LogicModule (C5): a pluggable decision unit that reads the
//! DataRepository and emits commands on a delay (§4.3).
use crate::command::Command;
use crate::common::SimTime;
use crate::random::RandomVariable;
use crate::repository::DataRepository;

/// Contract every logic module implements. `run` must not block: it
/// computes commands synchronously from repository readers, stashes them
/// privately against `cycle`, and reports the delay the RicCore should wait
/// before calling [`LogicModule::take_delivery`].
pub trait LogicModule {
    fn name(&self) -> &str;

    fn set_active(&mut self, active: bool);
    fn is_active(&self) -> bool;

    /// True iff a delivery event is pending for this module.
    fn is_running(&self) -> bool;

    /// Computes and privately stashes commands for `cycle`, returning the
    /// `processing_delay` the caller should wait before the delivery fires.
    fn begin_run(&mut self, cycle: SimTime, repo: &dyn DataRepository) -> crate::common::Duration;

    /// Called when the scheduled delivery event for `cycle` fires. Returns
    /// the stashed commands and clears the running flag. Panics if `cycle`
    /// does not match the run this module has pending — that indicates a
    /// protocol bug in the orchestrator (§7).
    fn take_delivery(&mut self, cycle: SimTime) -> Vec<Command>;

    /// Cancels a pending run (because a new cycle opened before delivery).
    /// Returns whatever commands had been stashed, so the caller can audit
    /// them as dropped (§4.3). A no-op, returning an empty `Vec`, if no run
    /// is pending.
    fn cancel_run(&mut self) -> Vec<Command>;
}

/// A reference `LogicModule` wrapping a user-supplied closure. Keeps this
/// crate free of any concrete decision logic (distance-based, RSRP-based,
/// ML-based handover all stay external collaborators per the non-goals)
/// while giving embedders and tests something concrete to plug in.
pub struct ClosureLm {
    name: String,
    active: bool,
    running: Option<SimTime>,
    pending: Vec<Command>,
    processing_delay: Box<dyn RandomVariable>,
    decide: Box<dyn FnMut(&dyn DataRepository) -> Vec<Command>>,
}

impl ClosureLm {
    pub fn new(
        name: impl Into<String>,
        processing_delay: Box<dyn RandomVariable>,
        decide: Box<dyn FnMut(&dyn DataRepository) -> Vec<Command>>,
    ) -> Self {
        ClosureLm {
            name: name.into(),
            active: true,
            running: None,
            pending: Vec::new(),
            processing_delay,
            decide,
        }
    }
}

impl LogicModule for ClosureLm {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active && self.running.is_some() {
            self.cancel_run();
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn is_running(&self) -> bool {
        self.running.is_some()
    }

    fn begin_run(&mut self, cycle: SimTime, repo: &dyn DataRepository) -> crate::common::Duration {
        self.pending = (self.decide)(repo);
        self.running = Some(cycle);
        crate::common::Duration::from_secs_f64(self.processing_delay.sample())
    }

    fn take_delivery(&mut self, cycle: SimTime) -> Vec<Command> {
        assert_eq!(self.running, Some(cycle), "LogicModule delivery for unexpected cycle");
        self.running = None;
        std::mem::take(&mut self.pending)
    }

    fn cancel_run(&mut self) -> Vec<Command> {
        self.running = None;
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::Constant;
    use crate::repository::InMemoryDataRepository;
    use crate::types::{E2NodeId};

    #[test]
    fn cancel_run_clears_pending_and_returns_dropped_commands() {
        let mut lm = ClosureLm::new(
            "test-lm",
            Box::new(Constant(0.0)),
            Box::new(|_repo| vec![Command::Base { target_e2_node_id: E2NodeId(1) }]),
        );
        let repo = InMemoryDataRepository::in_memory();
        lm.begin_run(SimTime::ZERO, &repo);
        assert!(lm.is_running());
        let dropped = lm.cancel_run();
        assert_eq!(dropped.len(), 1);
        assert!(!lm.is_running());
    }

    #[test]
    #[should_panic(expected = "unexpected cycle")]
    fn take_delivery_panics_on_mismatched_cycle() {
        let mut lm = ClosureLm::new("test-lm", Box::new(Constant(0.0)), Box::new(|_| Vec::new()));
        let repo = InMemoryDataRepository::in_memory();
        lm.begin_run(SimTime::ZERO, &repo);
        lm.take_delivery(SimTime::from_secs_f64(1.0));
    }
}
