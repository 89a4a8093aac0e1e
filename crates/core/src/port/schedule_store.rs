// Schedule Store Port (key-value persistence of Jobs and Parts)

use crate::domain::Schedule;
use crate::error::Result;
use async_trait::async_trait;

/// Persistence interface for the whole schedule.
///
/// The store is a flat dump: `load` returns every Job and Part, `save`
/// rewrites both collections in full. Implementations must make `save`
/// all-or-nothing from the caller's point of view: on `Err` the previously
/// saved schedule must still be loadable.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Load the full schedule (empty if nothing was saved yet)
    async fn load(&self) -> Result<Schedule>;

    /// Replace the persisted schedule with `schedule`
    async fn save(&self, schedule: &Schedule) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory store with a switch to simulate write failures
    #[derive(Default)]
    pub struct InMemoryScheduleStore {
        saved: Mutex<Schedule>,
        fail_saves: AtomicBool,
        save_count: AtomicUsize,
    }

    impl InMemoryScheduleStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_schedule(schedule: Schedule) -> Self {
            Self {
                saved: Mutex::new(schedule),
                ..Self::default()
            }
        }

        pub fn set_fail_saves(&self, fail: bool) {
            self.fail_saves.store(fail, Ordering::SeqCst);
        }

        pub fn save_count(&self) -> usize {
            self.save_count.load(Ordering::SeqCst)
        }

        pub fn saved(&self) -> Schedule {
            self.saved.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ScheduleStore for InMemoryScheduleStore {
        async fn load(&self) -> Result<Schedule> {
            Ok(self.saved.lock().unwrap().clone())
        }

        async fn save(&self, schedule: &Schedule) -> Result<()> {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(AppError::Persistence("simulated disk failure".to_string()));
            }
            *self.saved.lock().unwrap() = schedule.clone();
            self.save_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
