//! Lifecycle contracts for the native primitives.
//!
//! Pure transition tables and return-code classifiers. The native crate
//! consults these so that both back-ends agree on what every OS return code
//! means and on which state a primitive moves to.

pub mod cond;
pub mod mutex;
pub mod thread;

pub use cond::{WaitOutcome, classify_signal, classify_timed_wait, classify_wait};
pub use mutex::{
    MutexContractOp, MutexContractOutcome, MutexContractState, classify_trylock,
    mutex_contract_transition,
};
pub use thread::{
    THREAD_WAIT_FAILED, ThreadContractOp, ThreadContractOutcome, ThreadState,
    thread_contract_transition,
};
