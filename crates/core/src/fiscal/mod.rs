//! Accounting period lock state.

pub mod period;

pub use period::{
    InMemoryPeriodLockState, PeriodLockError, PeriodLockState, PeriodLockStatus, PeriodState,
    ensure_posting_allowed,
};
