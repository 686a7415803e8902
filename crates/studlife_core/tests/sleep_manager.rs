use std::sync::Arc;
use studlife_core::service::sleep_service::SleepManager;
use studlife_core::store::{NoRetry, PartitionStore};
use studlife_core::{
    LoadPhase, LoadSource, NewSleepEntry, ServiceError, SleepSettingsPatch, Store,
};

fn manager(store: Arc<Store>) -> SleepManager {
    let shared: Arc<dyn PartitionStore> = store;
    SleepManager::new(shared, Arc::new(NoRetry)).unwrap()
}

fn night(date: &str, hours: f64) -> NewSleepEntry {
    NewSleepEntry {
        date: date.to_string(),
        sleep_start: "23:00".to_string(),
        sleep_end: "07:00".to_string(),
        hours,
    }
}

fn dates(manager: &SleepManager) -> Vec<String> {
    manager
        .state()
        .unwrap()
        .history
        .iter()
        .map(|entry| entry.date.clone())
        .collect()
}

#[test]
fn mutations_before_load_are_rejected() {
    let mut sleep = manager(Arc::new(Store::open_in_memory().unwrap()));
    assert_eq!(sleep.phase(), LoadPhase::Uninitialized);
    assert!(sleep.is_loading());
    assert!(sleep.state().is_none());

    let err = sleep.add_entry(night("2025-11-25", 7.0)).unwrap_err();
    assert!(matches!(err, ServiceError::NotReady(_)));
}

#[test]
fn first_load_uses_seed_history() {
    let mut sleep = manager(Arc::new(Store::open_in_memory().unwrap()));
    assert_eq!(sleep.load(), LoadSource::Seeded);
    assert_eq!(sleep.phase(), LoadPhase::Ready);
    assert_eq!(sleep.state().unwrap().history.len(), 7);
    assert!(sleep.weekly_stats().is_some());
}

#[test]
fn adding_same_day_in_both_encodings_keeps_one_entry() {
    let mut sleep = manager(Arc::new(Store::open_in_memory().unwrap()));
    sleep.load();

    sleep.add_entry(night("2025-11-25", 6.0)).unwrap();
    sleep.add_entry(night("25.11.2025", 9.0)).unwrap();

    let state = sleep.state().unwrap();
    let matching: Vec<_> = state
        .history
        .iter()
        .filter(|entry| entry.date == "25.11.2025")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].hours, 9.0);
    assert_eq!(state.history.len(), 7);
}

#[test]
fn history_stays_sorted_and_bounded_across_month_boundary() {
    let mut sleep = manager(Arc::new(Store::open_in_memory().unwrap()));
    sleep.load();

    for date in ["2025-11-30", "2025-12-01", "2025-12-02", "29.11.2025"] {
        sleep.add_entry(night(date, 7.5)).unwrap();
    }

    assert_eq!(
        dates(&sleep),
        vec![
            "22.11.2025",
            "23.11.2025",
            "24.11.2025",
            "29.11.2025",
            "30.11.2025",
            "01.12.2025",
            "02.12.2025",
        ]
    );
}

#[test]
fn invalid_input_leaves_history_untouched() {
    let mut sleep = manager(Arc::new(Store::open_in_memory().unwrap()));
    sleep.load();
    let before = dates(&sleep);

    let mut bad_time = night("2025-11-26", 7.0);
    bad_time.sleep_end = "25:00".to_string();
    assert!(matches!(
        sleep.add_entry(bad_time).unwrap_err(),
        ServiceError::Validation(_)
    ));
    assert!(sleep.add_entry(night("not a date", 7.0)).is_err());
    assert!(sleep.add_entry(night("2025-11-26", -1.0)).is_err());

    assert_eq!(dates(&sleep), before);
}

#[test]
fn settings_patch_merges_shallowly() {
    let mut sleep = manager(Arc::new(Store::open_in_memory().unwrap()));
    sleep.load();

    sleep
        .update_settings(&SleepSettingsPatch {
            target_hours: Some(7.5),
            ..SleepSettingsPatch::default()
        })
        .unwrap();

    let settings = &sleep.state().unwrap().settings;
    assert_eq!(settings.target_hours, 7.5);
    assert_eq!(settings.bed_time, "23:00");

    let err = sleep
        .update_settings(&SleepSettingsPatch {
            bed_time: Some("late".to_string()),
            ..SleepSettingsPatch::default()
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn entry_hours_can_be_derived_from_clock_times() {
    let entry = NewSleepEntry::from_times("2025-11-26", "23:30", "07:00").unwrap();
    assert_eq!(entry.hours, 7.5);
    assert!(NewSleepEntry::from_times("2025-11-26", "23:30", "7am").is_err());
}

#[test]
fn history_survives_restart_after_flush() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sleep.db");

    {
        let store = Arc::new(Store::open(&path).unwrap());
        let mut sleep = manager(Arc::clone(&store));
        sleep.load();
        sleep.add_entry(night("2025-11-25", 6.5)).unwrap();
        sleep.flush();
        store.close().unwrap();
    }

    let mut sleep = manager(Arc::new(Store::open(&path).unwrap()));
    assert_eq!(sleep.load(), LoadSource::Stored);
    let last = sleep.state().unwrap().history.last().unwrap().clone();
    assert_eq!(last.date, "25.11.2025");
    assert_eq!(last.hours, 6.5);
}
