//! Routing decision types

use lsr_wire::Port;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Routing decision result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Forward out of this port
    Forward(Port),
    /// Deliver locally (we are the destination)
    Local,
    /// Drop packet
    Drop(DropReason),
}

impl RoutingDecision {
    /// Outgoing port, if the packet is forwarded
    pub fn port(&self) -> Option<Port> {
        match self {
            RoutingDecision::Forward(port) => Some(*port),
            _ => None,
        }
    }
}

/// Reason for dropping a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropReason {
    /// No route to destination
    NoRoute,
    /// Frame could not be decoded
    Malformed,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::NoRoute => write!(f, "no route to destination"),
            DropReason::Malformed => write!(f, "malformed frame"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_port() {
        assert_eq!(RoutingDecision::Forward(4).port(), Some(4));
        assert_eq!(RoutingDecision::Local.port(), None);
        assert_eq!(RoutingDecision::Drop(DropReason::NoRoute).port(), None);
    }

    #[test]
    fn test_drop_reason_display() {
        assert_eq!(DropReason::NoRoute.to_string(), "no route to destination");
        assert_eq!(DropReason::Malformed.to_string(), "malformed frame");
    }
}
