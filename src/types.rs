//! Core identity types shared by every component: node identity, the closed
//! external-identity sum type, and the small numeric aliases used throughout
//! the telemetry and command data model.

/// Opaque identifier assigned by the RIC to a registered E2 node. Stable
/// across re-registration of the same external identity (I1, P1).
///
/// `E2NodeId(0)` is reserved for "invalid / registration failed" (I1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct E2NodeId(pub u64);

impl E2NodeId {
    pub const INVALID: E2NodeId = E2NodeId(0);

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

/// IMSI (International Mobile Subscriber Identity) of an LTE UE. Globally
/// unique among LTE_UE nodes (I3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Imsi(pub u64);

/// Cell identifier of an LTE eNB. Globally unique among LTE_ENB nodes (I3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub u16);

/// Radio Network Temporary Identifier of a UE's attachment to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rnti(pub u16);

/// Kind discriminant for a registered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Wired,
    LteUe,
    LteEnb,
}

/// Opaque handle assigned to a NodeTerminator when it is hosted on a
/// [`crate::sim::Simulation`]. Replaces the back-reference a NodeTerminator
/// would otherwise hold to the RIC: the RicE2Terminator only ever stores
/// this handle, never a pointer into the terminator itself (see the
/// cyclic-ownership redesign note).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerminatorHandle(pub u64);

/// Closed sum type replacing duck-typed registration identity: every kind of
/// endpoint carries exactly the identity shape its kind requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalId {
    Wired(u32),
    LteUe(Imsi),
    LteEnb(CellId),
}

impl ExternalId {
    pub fn kind(&self) -> NodeKind {
        match self {
            ExternalId::Wired(_) => NodeKind::Wired,
            ExternalId::LteUe(_) => NodeKind::LteUe,
            ExternalId::LteEnb(_) => NodeKind::LteEnb,
        }
    }
}

/// A 3D position sample, in arbitrary simulation-distance units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Position { x, y, z }
    }
}

/// Late-command handling policy for [`crate::ric_core::RicCore`] (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LateCommandPolicy {
    Drop,
    Save,
}

impl Default for LateCommandPolicy {
    fn default() -> Self {
        LateCommandPolicy::Drop
    }
}