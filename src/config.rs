//! Explicit configuration structs (§6.3), replacing the source's
//! attribute-driven "key=value" construction (§9) with construction-time
//! values and documented defaults.
use crate::common::Duration;
use crate::types::LateCommandPolicy;

/// RicCore configuration (§4.7, §6).
#[derive(Debug, Clone)]
pub struct RicConfig {
    /// Minimum 10 ms.
    pub lm_query_interval: Duration,
    /// 0 means wait indefinitely for every LM to report.
    pub lm_query_max_wait_time: Duration,
    pub lm_query_late_command_policy: LateCommandPolicy,
    pub e2_node_inactivity_threshold: Duration,
    /// Audit-log entries are written only when `verbose` is set.
    pub verbose: bool,
}

impl Default for RicConfig {
    fn default() -> Self {
        RicConfig {
            lm_query_interval: Duration::from_secs_f64(5.0),
            lm_query_max_wait_time: Duration::ZERO,
            lm_query_late_command_policy: LateCommandPolicy::Drop,
            e2_node_inactivity_threshold: Duration::from_secs_f64(2.0),
            verbose: false,
        }
    }
}

impl RicConfig {
    /// Panics if `lm_query_interval` is below the documented 10 ms floor —
    /// a configuration error is fatal by design (§7).
    pub fn validate(&self) {
        assert!(
            self.lm_query_interval.as_secs_f64() >= 0.010,
            "lm_query_interval must be at least 10 ms"
        );
    }
}

/// Per-terminator configuration (§4.2, §6). The `*_rv` fields are
/// constructed by the embedder as [`crate::random::RandomVariable`]
/// trait objects; this struct only carries the non-random knobs.
#[derive(Debug, Clone, Copy)]
pub struct NodeTerminatorConfig {
    pub registration_interval_default: Duration,
    pub send_interval_default: Duration,
    pub transmission_delay_default: Duration,
}

impl Default for NodeTerminatorConfig {
    fn default() -> Self {
        NodeTerminatorConfig {
            registration_interval_default: Duration::from_secs_f64(1.0),
            send_interval_default: Duration::from_secs_f64(1.0),
            transmission_delay_default: Duration::ZERO,
        }
    }
}

/// Per-LM configuration (§4.3, §6).
#[derive(Debug, Clone, Copy, Default)]
pub struct LogicModuleConfig {
    pub processing_delay_default: Duration,
}
