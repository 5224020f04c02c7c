//! Reference [`Reporter`](crate::node_terminator::Reporter) implementations.
//! Concrete reporters are an external collaborator per the non-goals in
//! general, but a minimal periodic location reporter is shipped here
//! because the mobility golden scenario (§8.1) exercises it directly.
use crate::common::SimTime;
use crate::node_terminator::Reporter;
use crate::report::Report;
use crate::types::{E2NodeId, Position};

/// One leg of a piecewise-linear motion profile: constant velocity for
/// `[start, end)`, starting from `start_position`.
#[derive(Debug, Clone, Copy)]
pub struct MotionLeg {
    pub start: SimTime,
    pub end: SimTime,
    pub start_position: Position,
    pub velocity: Position,
}

/// Reports the endpoint's position on a fixed interval, computed from a
/// piecewise-linear motion profile. Legs are evaluated in order; time past
/// the last leg holds the final computed position.
pub struct PeriodicLocationReporter {
    legs: Vec<MotionLeg>,
}

impl PeriodicLocationReporter {
    pub fn new(legs: Vec<MotionLeg>) -> Self {
        PeriodicLocationReporter { legs }
    }

    fn position_at(&self, now: SimTime) -> Position {
        let mut position = self.legs.first().map(|l| l.start_position).unwrap_or(Position::ORIGIN);
        for leg in &self.legs {
            if now < leg.start {
                break;
            }
            let clamped = now.min(leg.end);
            let elapsed = clamped.saturating_sub(leg.start).as_secs_f64();
            position = Position::new(
                leg.start_position.x + leg.velocity.x * elapsed,
                leg.start_position.y + leg.velocity.y * elapsed,
                leg.start_position.z + leg.velocity.z * elapsed,
            );
        }
        position
    }
}

impl Reporter for PeriodicLocationReporter {
    fn activate(&mut self) {}
    fn deactivate(&mut self) {}

    fn on_registered(&mut self, _now: SimTime) -> Vec<Report> {
        Vec::new()
    }

    fn generate_reports(&mut self, reporter_e2_node_id: E2NodeId, now: SimTime) -> Vec<Report> {
        let position = self.position_at(now);
        vec![Report::Location {
            reporter_e2_node_id,
            timestamp: now,
            x: position.x,
            y: position.y,
            z: position.z,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_within_a_leg() {
        let mut reporter = PeriodicLocationReporter::new(vec![MotionLeg {
            start: SimTime::ZERO,
            end: SimTime::from_secs_f64(2.0),
            start_position: Position::ORIGIN,
            velocity: Position::new(1.0, 0.0, 0.0),
        }]);
        let reports = reporter.generate_reports(E2NodeId(1), SimTime::from_secs_f64(1.0));
        match &reports[0] {
            Report::Location { x, .. } => assert!((*x - 1.0).abs() < 1e-9),
            _ => panic!("expected location report"),
        }
    }

    #[test]
    fn holds_final_position_past_last_leg() {
        let mut reporter = PeriodicLocationReporter::new(vec![MotionLeg {
            start: SimTime::ZERO,
            end: SimTime::from_secs_f64(2.0),
            start_position: Position::ORIGIN,
            velocity: Position::new(10.0, 10.0, 0.0),
        }]);
        let reports = reporter.generate_reports(E2NodeId(1), SimTime::from_secs_f64(100.0));
        match &reports[0] {
            Report::Location { x, y, .. } => {
                assert!((*x - 20.0).abs() < 1e-9);
                assert!((*y - 20.0).abs() < 1e-9);
            }
            _ => panic!("expected location report"),
        }
    }
}
