//! Failure injection for the local store, so that tests can see how services react to an unavailable store

use std::error::Error;
use std::fmt::{Display, Formatter};

/// The calls a [`RemoteStore`](crate::traits::RemoteStore) answers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Select,
    Insert,
    Update,
    Delete,
}

impl StoreOperation {
    pub const ALL: [StoreOperation; 4] = [
        StoreOperation::Select,
        StoreOperation::Insert,
        StoreOperation::Update,
        StoreOperation::Delete,
    ];

    fn index(self) -> usize {
        match self {
            StoreOperation::Select => 0,
            StoreOperation::Insert => 1,
            StoreOperation::Update => 2,
            StoreOperation::Delete => 3,
        }
    }
}

impl Display for StoreOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreOperation::Select => write!(f, "select"),
            StoreOperation::Insert => write!(f, "insert"),
            StoreOperation::Update => write!(f, "update"),
            StoreOperation::Delete => write!(f, "delete"),
        }
    }
}

/// What is left to happen to one kind of call: first `successes` calls succeed, then `failures` calls fail.
/// Once both are exhausted, every call succeeds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Plan {
    pub successes: u32,
    pub failures: u32,
}

/// How a mocked store behaves during a test, per kind of call
#[derive(Clone, Debug, Default)]
pub struct MockBehaviour {
    /// If this is true, every call is allowed and the plans are left untouched
    pub is_suspended: bool,
    plans: [Plan; 4],
}

impl MockBehaviour {
    /// Every call succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `n_fails` calls of every kind will fail
    pub fn fail_now(n_fails: u32) -> Self {
        let mut behaviour = Self::new();
        for op in StoreOperation::ALL.iter() {
            behaviour.fail_after(*op, 0, n_fails);
        }
        behaviour
    }

    /// Let `successes` calls of a kind go through, then fail the next `failures` ones
    pub fn fail_after(&mut self, op: StoreOperation, successes: u32, failures: u32) -> &mut Self {
        self.plans[op.index()] = Plan { successes, failures };
        self
    }

    /// Fail the next `failures` calls of a kind
    pub fn fail_next(&mut self, op: StoreOperation, failures: u32) -> &mut Self {
        self.fail_after(op, 0, failures)
    }

    /// What is left of the plan of a kind of call
    pub fn plan(&self, op: StoreOperation) -> Plan {
        self.plans[op.index()]
    }

    /// Suspend this mock behaviour until you call `resume`
    pub fn suspend(&mut self) {
        self.is_suspended = true;
    }
    /// Make this behaviour active again
    pub fn resume(&mut self) {
        self.is_suspended = false;
    }

    /// Consume one step of the plan of `op`. Returns an error in case this call must fail
    pub fn check(&mut self, op: StoreOperation) -> Result<(), Box<dyn Error>> {
        if self.is_suspended {
            return Ok(());
        }

        let plan = &mut self.plans[op.index()];
        if plan.successes > 0 {
            plan.successes -= 1;
        } else if plan.failures > 0 {
            plan.failures -= 1;
            log::debug!("Mock behaviour: failing a {} ({:?})", op, plan);
            return Err(format!("Mocked {} failure ({} more to come)", op, plan.failures).into());
        }
        log::debug!("Mock behaviour: allowing a {} ({:?})", op, plan);
        Ok(())
    }
}
