//! Collaborator-facing flows: ERP progress write-back through the poller and
//! tool-aware slot search against the JSON machine database.

use std::sync::Arc;
use std::time::Duration;

use shopfloor_core::application::{
    NewJobRequest, ScheduleMode, ScheduleRepository, SlotFinder, SlotFit, SyncPoller,
};
use shopfloor_core::domain::{JobStatus, PartStatus};
use shopfloor_core::port::id_provider::UuidProvider;
use shopfloor_core::port::time_provider::mocks::FixedTimeProvider;
use shopfloor_core::port::TimeProvider;
use shopfloor_infra_json::{
    JsonMachineDirectory, JsonOrderStatusFeed, JsonScheduleStore, MACHINE_DATABASE_FILE,
    ORDER_STATUS_FILE,
};
use tempfile::TempDir;

const NOW: i64 = 1_709_532_000_000;
const HOUR: i64 = 3_600_000;

const MACHINES: &str = r#"{
    "M1": { "id": "M1", "name": "Hermle C42", "type": "5-Axis", "physical_tools": [1, 2, 3], "locked_tools": [] },
    "M2": { "id": "M2", "name": "DMU 50", "physical_tools": [1, 2, 3, 4], "locked_tools": [4] },
    "M3": { "id": "M3", "name": "Mazak VCN", "physical_tools": [1, 4], "locked_tools": [] }
}"#;

struct Shop {
    dir: TempDir,
    repo: Arc<ScheduleRepository>,
    time: Arc<dyn TimeProvider>,
}

async fn shop() -> Shop {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(MACHINE_DATABASE_FILE), MACHINES).unwrap();
    let time: Arc<dyn TimeProvider> = Arc::new(FixedTimeProvider::new(NOW));
    let repo = Arc::new(
        ScheduleRepository::open(
            Arc::new(JsonScheduleStore::new(dir.path())),
            Arc::new(UuidProvider),
            time.clone(),
        )
        .await
        .unwrap(),
    );
    Shop { dir, repo, time }
}

async fn finder(shop: &Shop) -> SlotFinder {
    let machines = Arc::new(
        JsonMachineDirectory::open(shop.dir.path().join(MACHINE_DATABASE_FILE))
            .await
            .unwrap(),
    );
    SlotFinder::new(shop.repo.clone(), machines.clone(), machines, shop.time.clone())
}

#[tokio::test]
async fn test_poller_writes_erp_progress_to_disk() {
    let shop = shop().await;
    let job = shop
        .repo
        .create_job_with_parts("Flange", "M1", 4, 15.0, NOW, JobStatus::Active)
        .await
        .unwrap();
    std::fs::write(
        shop.dir.path().join(ORDER_STATUS_FILE),
        format!(
            r#"{{ "{}": {{ "orderId": "ORD-1", "state": "Running",
                 "finishedGoodWorkpieceCount": 1, "readyJobWorkpieceCount": 2 }} }}"#,
            job.job_id
        ),
    )
    .unwrap();

    let feed = Arc::new(JsonOrderStatusFeed::new(shop.dir.path().join(ORDER_STATUS_FILE)));
    let poller = SyncPoller::new(shop.repo.clone(), feed, Duration::from_secs(60));
    assert_eq!(poller.poll_once().await, 3);

    let reopened = ScheduleRepository::open(
        Arc::new(JsonScheduleStore::new(shop.dir.path())),
        Arc::new(UuidProvider),
        shop.time.clone(),
    )
    .await
    .unwrap();
    let statuses: Vec<PartStatus> = reopened
        .get_job_parts(&job.job_id)
        .await
        .iter()
        .map(|p| p.status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            PartStatus::Completed,
            PartStatus::InProgress,
            PartStatus::InProgress,
            PartStatus::Scheduled
        ]
    );
}

#[tokio::test]
async fn test_spawned_poller_stops_on_request() {
    let shop = shop().await;
    let feed = Arc::new(JsonOrderStatusFeed::new(shop.dir.path().join(ORDER_STATUS_FILE)));

    let handle = SyncPoller::new(shop.repo.clone(), feed, Duration::from_secs(3600)).spawn();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(handle.stop(Duration::from_secs(2)).await);
}

#[tokio::test]
async fn test_slot_search_respects_tools_and_locks() {
    let shop = shop().await;
    let finder = finder(&shop).await;
    // M1 is busy for the next two hours
    shop.repo
        .create_job_with_parts("Busy", "M1", 2, 60.0, NOW, JobStatus::Active)
        .await
        .unwrap();

    let any = finder.find_next_available_slot(1, 30.0, &[]).await.unwrap().unwrap();
    assert_eq!(any.machine_id, "M2");
    assert_eq!(any.start_time, NOW);

    let t3 = vec!["3".to_string()];
    let slot = finder.find_next_available_slot(1, 30.0, &t3).await.unwrap().unwrap();
    assert_eq!(slot.machine_id, "M2");

    // tool 4 is locked on M2, so only M3 qualifies
    let t4 = vec!["4".to_string()];
    let slot = finder.find_next_available_slot(1, 30.0, &t4).await.unwrap().unwrap();
    assert_eq!(slot.machine_id, "M3");

    // tools 3 and 4 together: nowhere
    let both = vec!["3".to_string(), "4".to_string()];
    assert!(finder.find_next_available_slot(1, 30.0, &both).await.unwrap().is_none());
}

#[tokio::test]
async fn test_intake_fills_next_slot() {
    let shop = shop().await;
    let finder = finder(&shop).await;
    for machine in ["M1", "M2", "M3"] {
        shop.repo
            .create_job_with_parts("Busy", machine, 1, 60.0, NOW, JobStatus::Active)
            .await
            .unwrap();
    }

    let job = finder
        .place_new_job(NewJobRequest {
            name: "Rush bracket".into(),
            machine_id: "M3".into(),
            total_parts: 2,
            cycle_time: 20.0,
            start_time: NOW + 48 * HOUR,
            status: JobStatus::Active,
            mode: ScheduleMode::Optimize,
            required_tools: vec!["1".into()],
        })
        .await
        .unwrap();

    let parts = shop.repo.get_job_parts(&job.job_id).await;
    // all machines free after one hour; M1 wins the tie
    assert!(parts[0].is_on("M1"));
    assert_eq!(parts[0].start_time, NOW + HOUR);
    assert_eq!(parts[1].start_time, NOW + HOUR + 20 * 60_000);

    let next = finder.find_next_available_slot(1, 20.0, &[]).await.unwrap().unwrap();
    assert_eq!(next.fit, SlotFit::FullOrder);
    assert_eq!(next.machine_id, "M2");
    assert_eq!(next.start_time, NOW + HOUR);
}
