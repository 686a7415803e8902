//! Bundled first-run datasets, one per partition.
//!
//! Seeds are compiled into the binary and are not user-editable. A seed that
//! fails to decode degrades to the empty default record.

use crate::model::schema::{decode_payload, PartitionRecord, CURRENT_SCHEMA_VERSION};
use crate::store::Partition;
use log::error;

fn seed_json(partition: Partition) -> &'static str {
    match partition {
        Partition::Sleep => include_str!("sleep.json"),
        Partition::Savings => include_str!("savings.json"),
        Partition::Payments => include_str!("payments.json"),
        Partition::Jobs => include_str!("jobs.json"),
    }
}

/// Returns the bundled default record for `T`.
pub fn seed<T: PartitionRecord>() -> T {
    match decode_payload::<T>(T::PARTITION, CURRENT_SCHEMA_VERSION, seed_json(T::PARTITION)) {
        Ok(record) => record,
        Err(err) => {
            error!(
                "event=seed_load module=seed status=error partition={} error={}",
                T::PARTITION,
                err
            );
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::seed;
    use crate::model::jobs::JobsState;
    use crate::model::payments::PaymentsState;
    use crate::model::savings::SavingsState;
    use crate::model::sleep::{SleepState, HISTORY_WINDOW};

    #[test]
    fn bundled_seeds_decode_and_validate() {
        let sleep: SleepState = seed();
        assert!(sleep.history.len() <= HISTORY_WINDOW);
        assert!(!sleep.history.is_empty());

        let savings: SavingsState = seed();
        assert!(!savings.goals.is_empty());
        for goal in &savings.goals {
            goal.validate().unwrap();
        }

        let payments: PaymentsState = seed();
        for reminder in &payments.reminders {
            reminder.validate().unwrap();
        }

        let jobs: JobsState = seed();
        assert!(!jobs.jobs.is_empty());
        for job in &jobs.jobs {
            job.validate().unwrap();
        }
    }
}
