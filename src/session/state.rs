//! Session phase machine
//!
//! Tracks the lifecycle of one connection from first contact to teardown.
//! Transitions only move forward; a closed session never resurrects.

use std::sync::Mutex;

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Connection established, join not yet accepted
    Connecting,
    /// Joined the room, inbound and outbound flowing
    Active,
    /// No new inbound accepted; outbound queue is flushing
    Draining,
    /// Terminal
    Closed,
}

impl SessionPhase {
    /// Whether this phase is terminal
    pub fn is_terminal(&self) -> bool {
        *self == SessionPhase::Closed
    }
}

/// Forward-only phase holder shared between a session's read and write paths
#[derive(Debug)]
pub(crate) struct PhaseCell {
    phase: Mutex<SessionPhase>,
}

impl PhaseCell {
    pub(crate) fn new() -> Self {
        Self {
            phase: Mutex::new(SessionPhase::Connecting),
        }
    }

    pub(crate) fn phase(&self) -> SessionPhase {
        *self.phase.lock().unwrap()
    }

    /// `Connecting -> Active` on accepted join
    pub(crate) fn activate(&self) {
        let mut phase = self.phase.lock().unwrap();
        if *phase == SessionPhase::Connecting {
            *phase = SessionPhase::Active;
        }
    }

    /// `Active -> Draining` on close request or overflow trigger
    pub(crate) fn begin_drain(&self) {
        let mut phase = self.phase.lock().unwrap();
        if *phase == SessionPhase::Active {
            *phase = SessionPhase::Draining;
        }
    }

    /// Any non-terminal phase `-> Closed`
    pub(crate) fn finish_close(&self) {
        let mut phase = self.phase.lock().unwrap();
        *phase = SessionPhase::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_lifecycle() {
        let cell = PhaseCell::new();
        assert_eq!(cell.phase(), SessionPhase::Connecting);

        cell.activate();
        assert_eq!(cell.phase(), SessionPhase::Active);

        cell.begin_drain();
        assert_eq!(cell.phase(), SessionPhase::Draining);

        cell.finish_close();
        assert_eq!(cell.phase(), SessionPhase::Closed);
        assert!(cell.phase().is_terminal());
    }

    #[test]
    fn test_join_failure_goes_straight_to_closed() {
        let cell = PhaseCell::new();
        cell.finish_close();
        assert_eq!(cell.phase(), SessionPhase::Closed);
    }

    #[test]
    fn test_no_resurrection() {
        let cell = PhaseCell::new();
        cell.activate();
        cell.finish_close();

        cell.activate();
        cell.begin_drain();
        assert_eq!(cell.phase(), SessionPhase::Closed);
    }

    #[test]
    fn test_drain_requires_active() {
        let cell = PhaseCell::new();
        cell.begin_drain();
        // Connecting sessions have nothing to drain
        assert_eq!(cell.phase(), SessionPhase::Connecting);
    }
}
