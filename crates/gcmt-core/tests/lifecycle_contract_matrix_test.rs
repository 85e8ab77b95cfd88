use gcmt_core::errno;
use gcmt_core::pthread::{
    MutexContractOp, MutexContractState, ThreadContractOp, ThreadState,
    mutex_contract_transition, thread_contract_transition,
};

const MUTEX_STATES: [MutexContractState; 5] = [
    MutexContractState::Uninitialized,
    MutexContractState::Unlocked,
    MutexContractState::LockedBySelf,
    MutexContractState::LockedByOther,
    MutexContractState::Destroyed,
];

const MUTEX_OPS: [MutexContractOp; 5] = [
    MutexContractOp::Init,
    MutexContractOp::Lock,
    MutexContractOp::TryLock,
    MutexContractOp::Unlock,
    MutexContractOp::Destroy,
];

const THREAD_STATES: [ThreadState; 5] = [
    ThreadState::Created,
    ThreadState::Resumed,
    ThreadState::Finished,
    ThreadState::Joined,
    ThreadState::Deleted,
];

const THREAD_OPS: [ThreadContractOp; 4] = [
    ThreadContractOp::Resume,
    ThreadContractOp::Finish,
    ThreadContractOp::Join,
    ThreadContractOp::Delete,
];

#[derive(Clone, Copy)]
struct ThreadCase {
    old_state: ThreadState,
    op: ThreadContractOp,
    expected_state: ThreadState,
    expected_errno: i32,
    releases_gate: bool,
}

fn thread_cases() -> Vec<ThreadCase> {
    use ThreadContractOp as Op;
    use ThreadState as S;
    let case = |old_state, op, expected_state, expected_errno, releases_gate| ThreadCase {
        old_state,
        op,
        expected_state,
        expected_errno,
        releases_gate,
    };
    vec![
        case(S::Created, Op::Resume, S::Resumed, 0, true),
        case(S::Resumed, Op::Resume, S::Resumed, 0, false),
        case(S::Finished, Op::Resume, S::Finished, 0, false),
        case(S::Joined, Op::Resume, S::Joined, 0, false),
        case(S::Created, Op::Join, S::Created, errno::EDEADLK, false),
        case(S::Resumed, Op::Finish, S::Finished, 0, false),
        case(S::Finished, Op::Join, S::Joined, 0, false),
        case(S::Joined, Op::Join, S::Joined, 0, false),
        case(S::Created, Op::Delete, S::Deleted, 0, true),
        case(S::Joined, Op::Delete, S::Deleted, 0, false),
        case(S::Deleted, Op::Delete, S::Deleted, errno::EINVAL, false),
    ]
}

#[test]
fn thread_matrix_cases_hold() {
    for c in thread_cases() {
        let out = thread_contract_transition(c.old_state, c.op);
        assert_eq!(out.next, c.expected_state, "{:?} --{:?}-->", c.old_state, c.op);
        assert_eq!(out.errno, c.expected_errno, "{:?} --{:?}-->", c.old_state, c.op);
        assert_eq!(out.releases_gate, c.releases_gate, "{:?} --{:?}-->", c.old_state, c.op);
    }
}

#[test]
fn only_first_resume_releases_gate() {
    for state in THREAD_STATES {
        let out = thread_contract_transition(state, ThreadContractOp::Resume);
        assert_eq!(out.releases_gate, state == ThreadState::Created, "{state:?}");
    }
}

#[test]
fn termination_is_requested_only_for_unfinished_threads() {
    for state in THREAD_STATES {
        let out = thread_contract_transition(state, ThreadContractOp::Delete);
        assert_eq!(
            out.requests_termination,
            matches!(state, ThreadState::Created | ThreadState::Resumed),
            "{state:?}"
        );
    }
}

#[test]
fn deleted_is_terminal() {
    for op in THREAD_OPS {
        let out = thread_contract_transition(ThreadState::Deleted, op);
        assert_eq!(out.next, ThreadState::Deleted);
        assert_ne!(out.errno, 0);
    }
}

#[test]
fn successful_thread_ops_never_move_backwards() {
    for state in THREAD_STATES {
        for op in THREAD_OPS {
            let out = thread_contract_transition(state, op);
            if out.errno == 0 {
                assert!(out.next.as_u8() >= state.as_u8(), "{state:?} --{op:?}--> {:?}", out.next);
            } else {
                assert_eq!(out.next, state);
            }
        }
    }
}

#[test]
fn mutex_matrix_is_total_and_stable_on_error() {
    for state in MUTEX_STATES {
        for op in MUTEX_OPS {
            let out = mutex_contract_transition(state, op);
            if out.errno != 0 {
                assert_eq!(out.next, state, "{state:?} --{op:?}-->");
                assert!(!out.blocks);
            }
        }
    }
}

#[test]
fn non_recursive_relock_blocks_and_trylock_is_busy() {
    let relock = mutex_contract_transition(MutexContractState::LockedBySelf, MutexContractOp::Lock);
    assert!(relock.blocks);
    for state in [MutexContractState::LockedBySelf, MutexContractState::LockedByOther] {
        let out = mutex_contract_transition(state, MutexContractOp::TryLock);
        assert_eq!(out.errno, errno::EBUSY);
        assert_eq!(out.next, state);
    }
}

#[test]
fn mutex_lifecycle_walk() {
    use MutexContractOp as Op;
    let mut state = MutexContractState::Uninitialized;
    for op in [Op::Init, Op::Lock, Op::Unlock, Op::TryLock, Op::Unlock, Op::Destroy] {
        let out = mutex_contract_transition(state, op);
        assert_eq!(out.errno, 0, "{state:?} --{op:?}-->");
        state = out.next;
    }
    assert_eq!(state, MutexContractState::Destroyed);
}
