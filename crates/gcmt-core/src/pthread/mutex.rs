//! Exclusive-lock contract.
//!
//! The mutex is non-recursive: relocking from the owning thread is misuse
//! and simply blocks forever. `try_lock` never blocks; a busy mutex is a
//! normal "not acquired" result rather than an error.

use crate::errno;
use crate::error::{GcmtError, GcmtResult};

// ---------------------------------------------------------------------------
// Transition contract
// ---------------------------------------------------------------------------

/// Abstract mutex state used by the transition contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutexContractState {
    /// Storage has not been initialized as a mutex.
    Uninitialized,
    /// Initialized and not owned.
    Unlocked,
    /// Owned by the calling thread.
    LockedBySelf,
    /// Owned by another thread.
    LockedByOther,
    /// Torn down; must be re-initialized before reuse.
    Destroyed,
}

/// Operation set for mutex transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutexContractOp {
    Init,
    Lock,
    TryLock,
    Unlock,
    Destroy,
}

/// Deterministic result of applying an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutexContractOutcome {
    /// Next abstract state.
    pub next: MutexContractState,
    /// errno-style result (0 on success).
    pub errno: i32,
    /// Whether the caller may block waiting on another thread.
    pub blocks: bool,
}

const fn outcome(next: MutexContractState, errno: i32, blocks: bool) -> MutexContractOutcome {
    MutexContractOutcome {
        next,
        errno,
        blocks,
    }
}

/// Transition table for the non-recursive mutex.
#[must_use]
pub const fn mutex_contract_transition(
    state: MutexContractState,
    op: MutexContractOp,
) -> MutexContractOutcome {
    use MutexContractOp as Op;
    use MutexContractState as S;

    match (state, op) {
        (S::Uninitialized | S::Destroyed, Op::Init) => outcome(S::Unlocked, 0, false),
        (S::Uninitialized | S::Destroyed, _) => outcome(state, errno::EINVAL, false),

        (S::Unlocked, Op::Init) => outcome(S::Unlocked, errno::EBUSY, false),
        (S::Unlocked, Op::Lock | Op::TryLock) => outcome(S::LockedBySelf, 0, false),
        (S::Unlocked, Op::Unlock) => outcome(S::Unlocked, errno::EPERM, false),
        (S::Unlocked, Op::Destroy) => outcome(S::Destroyed, 0, false),

        (S::LockedByOther, Op::Lock) => outcome(S::LockedByOther, 0, true),
        (S::LockedByOther, Op::TryLock) => outcome(S::LockedByOther, errno::EBUSY, false),
        (S::LockedByOther, Op::Unlock) => outcome(S::LockedByOther, errno::EPERM, false),
        (S::LockedByOther, Op::Init | Op::Destroy) => {
            outcome(S::LockedByOther, errno::EBUSY, false)
        }

        // Relocking a held non-recursive mutex deadlocks the caller.
        (S::LockedBySelf, Op::Lock) => outcome(S::LockedBySelf, 0, true),
        (S::LockedBySelf, Op::TryLock) => outcome(S::LockedBySelf, errno::EBUSY, false),
        (S::LockedBySelf, Op::Unlock) => outcome(S::Unlocked, 0, false),
        (S::LockedBySelf, Op::Init | Op::Destroy) => {
            outcome(S::LockedBySelf, errno::EBUSY, false)
        }
    }
}

// ---------------------------------------------------------------------------
// Return-code classification
// ---------------------------------------------------------------------------

/// Classify a `trylock` return code.
///
/// `EBUSY` is the only code folded into "not acquired"; everything else is
/// an OS failure surfaced to the caller.
pub fn classify_trylock(rc: i32) -> GcmtResult<bool> {
    match rc {
        0 => Ok(true),
        errno::EBUSY => Ok(false),
        _ => Err(GcmtError::Os {
            op: "mutex_trylock",
            errno: rc,
        }),
    }
}
