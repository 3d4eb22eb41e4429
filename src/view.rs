//! Guards against responses that arrive after their consumer has moved on
//!
//! Requests are never cancelled. Instead, a view hands out a [`Ticket`] when it starts a request,
//! and drops the response if the ticket is no longer current when it arrives.

/// Proof that a request was started by a given generation of a view
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

/// The current generation of a view. It moves on every time older responses should be ignored
#[derive(Clone, Debug, Default)]
pub struct Generation {
    current: u64,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request. Responses to any earlier ticket will be ignored
    pub fn issue(&mut self) -> Ticket {
        self.current += 1;
        Ticket(self.current)
    }

    /// Ignore every response whose request has been started already
    pub fn invalidate(&mut self) {
        self.current += 1;
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.current
    }
}
