// Read-only schedule queries

use super::ScheduleRepository;
use crate::application::conflict::{find_overlaps, Overlap};
use crate::application::utilization;
use crate::domain::Part;

impl ScheduleRepository {
    /// Booked percentage of `machine_id` over the week starting at `week_start` (epoch ms)
    pub async fn utilization(&self, machine_id: &str, week_start: i64) -> f64 {
        self.read(|s| utilization::utilization(s, machine_id, week_start))
            .await
    }

    /// Parts on `machine_id` touching the 24h window starting at `day_start` (epoch ms)
    pub async fn get_parts_for_day(&self, machine_id: &str, day_start: i64) -> Vec<Part> {
        self.read(|s| {
            utilization::parts_for_day(s, machine_id, day_start)
                .into_iter()
                .cloned()
                .collect()
        })
        .await
    }

    /// Every overlapping pair of parts currently on the schedule
    pub async fn find_overlaps(&self) -> Vec<Overlap> {
        self.read(find_overlaps).await
    }
}
