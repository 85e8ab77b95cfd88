//! Thread lifecycle contract.
//!
//! ```text
//! Created --resume--> Resumed --finish--> Finished --join--> Joined
//!    |                   |                    |                 |
//!    +------delete-------+-------delete-------+------delete-----+--> Deleted
//! ```
//!
//! A thread starts suspended. Exactly one `resume` releases it; further
//! resumes are no-ops. Deleting an unfinished thread requests termination,
//! releases it if it was never resumed, and reaps it. The termination flag
//! is checked once, before the user function would run.

use crate::errno;

/// Return code reported when the target thread could not be reaped.
pub const THREAD_WAIT_FAILED: i32 = -1;

/// Lifecycle state. Stored as `u8` in the native thread's shared block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ThreadState {
    /// OS thread exists and is parked at its start gate.
    Created = 0,
    /// Start gate released; the body is running or about to.
    Resumed = 1,
    /// Body returned (or was skipped) and the return code is recorded.
    Finished = 2,
    /// OS thread reaped by a join.
    Joined = 3,
    /// Native resources released.
    Deleted = 4,
}

impl ThreadState {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Created),
            1 => Some(Self::Resumed),
            2 => Some(Self::Finished),
            3 => Some(Self::Joined),
            4 => Some(Self::Deleted),
            _ => None,
        }
    }

    /// True once the body can no longer run.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Finished | Self::Joined | Self::Deleted)
    }
}

/// Operations that move a thread through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadContractOp {
    /// Release the start gate (first call only).
    Resume,
    /// Body wrapper recorded its return code (issued by the thread itself).
    Finish,
    /// Wait for the OS thread and collect the return code.
    Join,
    /// Tear down, terminating and reaping an unfinished thread first.
    Delete,
}

/// Deterministic result of applying an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadContractOutcome {
    /// Next lifecycle state.
    pub next: ThreadState,
    /// errno-style result (0 on success).
    pub errno: i32,
    /// Whether the caller may block until the body returns.
    pub blocks: bool,
    /// Whether this operation releases the start gate.
    pub releases_gate: bool,
    /// Whether this operation sets the termination-requested flag.
    pub requests_termination: bool,
}

const fn outcome(next: ThreadState, errno: i32) -> ThreadContractOutcome {
    ThreadContractOutcome {
        next,
        errno,
        blocks: false,
        releases_gate: false,
        requests_termination: false,
    }
}

/// Transition table for the thread lifecycle.
#[must_use]
pub const fn thread_contract_transition(
    state: ThreadState,
    op: ThreadContractOp,
) -> ThreadContractOutcome {
    use ThreadContractOp as Op;
    use ThreadState as S;

    match (state, op) {
        (S::Deleted, _) => outcome(S::Deleted, errno::EINVAL),

        (S::Created, Op::Resume) => ThreadContractOutcome {
            releases_gate: true,
            ..outcome(S::Resumed, 0)
        },
        // A parked thread cannot finish, and joining it would wait forever.
        (S::Created, Op::Finish) => outcome(S::Created, errno::EINVAL),
        (S::Created, Op::Join) => outcome(S::Created, errno::EDEADLK),
        (S::Created, Op::Delete) => ThreadContractOutcome {
            releases_gate: true,
            requests_termination: true,
            ..outcome(S::Deleted, 0)
        },

        (S::Resumed, Op::Resume) => outcome(S::Resumed, 0),
        (S::Resumed, Op::Finish) => outcome(S::Finished, 0),
        (S::Resumed, Op::Join) => ThreadContractOutcome {
            blocks: true,
            ..outcome(S::Joined, 0)
        },
        (S::Resumed, Op::Delete) => ThreadContractOutcome {
            blocks: true,
            requests_termination: true,
            ..outcome(S::Deleted, 0)
        },

        (S::Finished | S::Joined, Op::Resume) => outcome(state, 0),
        (S::Finished | S::Joined, Op::Finish) => outcome(state, errno::EINVAL),
        (S::Finished | S::Joined, Op::Join) => outcome(S::Joined, 0),
        (S::Finished | S::Joined, Op::Delete) => outcome(S::Deleted, 0),
    }
}
