// libs/schedule-cell/src/store.rs
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::WeeklySchedule;

/// Persistence seam for weekly schedules. Schedules are only ever read whole
/// and replaced whole.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn get(&self, doctor_id: Uuid) -> Option<WeeklySchedule>;

    async fn put(&self, schedule: WeeklySchedule);
}

#[derive(Default)]
pub struct InMemoryScheduleStore {
    schedules: RwLock<HashMap<Uuid, WeeklySchedule>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn get(&self, doctor_id: Uuid) -> Option<WeeklySchedule> {
        self.schedules.read().await.get(&doctor_id).cloned()
    }

    async fn put(&self, schedule: WeeklySchedule) {
        self.schedules
            .write()
            .await
            .insert(schedule.doctor_id, schedule);
    }
}
