//! Versioned blob schemas for partition records.
//!
//! # Responsibility
//! - Encode/decode partition records to/from stored JSON blobs.
//! - Upgrade blobs written by older schema versions.
//!
//! # Invariants
//! - Version 1 is the legacy shape: sleep dates in either encoding, history
//!   unsorted and unbounded, an optional `"id": "main"` field.
//! - Version 2 is current: sleep history canonical, one entry per day,
//!   sorted, bounded. Other partitions are shape-identical to version 1.
//! - Blobs newer than `CURRENT_SCHEMA_VERSION` are never decoded.

use crate::model::jobs::JobsState;
use crate::model::payments::PaymentsState;
use crate::model::savings::SavingsState;
use crate::model::sleep::SleepState;
use crate::store::{Partition, StoredBlob};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub const LEGACY_SCHEMA_VERSION: u32 = 1;
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

#[derive(Debug)]
pub enum SchemaError {
    Decode {
        partition: Partition,
        source: serde_json::Error,
    },
    Encode {
        partition: Partition,
        source: serde_json::Error,
    },
    UnsupportedVersion {
        partition: Partition,
        version: u32,
    },
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decode { partition, source } => {
                write!(f, "failed to decode `{partition}` blob: {source}")
            }
            Self::Encode { partition, source } => {
                write!(f, "failed to encode `{partition}` blob: {source}")
            }
            Self::UnsupportedVersion { partition, version } => write!(
                f,
                "`{partition}` blob schema version {version} is outside supported 1..={CURRENT_SCHEMA_VERSION}"
            ),
        }
    }
}

impl Error for SchemaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode { source, .. } | Self::Encode { source, .. } => Some(source),
            Self::UnsupportedVersion { .. } => None,
        }
    }
}

/// Singleton record stored in one partition.
pub trait PartitionRecord: Serialize + DeserializeOwned + Clone + Debug + Default + Send + 'static {
    const PARTITION: Partition;

    /// Brings a record decoded from a version 1 blob to the current shape.
    fn upgrade_from_legacy(&mut self) {}
}

impl PartitionRecord for SleepState {
    const PARTITION: Partition = Partition::Sleep;

    fn upgrade_from_legacy(&mut self) {
        self.canonicalize_history();
    }
}

impl PartitionRecord for SavingsState {
    const PARTITION: Partition = Partition::Savings;
}

impl PartitionRecord for PaymentsState {
    const PARTITION: Partition = Partition::Payments;
}

impl PartitionRecord for JobsState {
    const PARTITION: Partition = Partition::Jobs;
}

/// Serializes a record at the current schema version.
pub fn encode<T: PartitionRecord>(record: &T) -> Result<StoredBlob, SchemaError> {
    let payload = serde_json::to_string(record).map_err(|source| SchemaError::Encode {
        partition: T::PARTITION,
        source,
    })?;
    Ok(StoredBlob {
        schema_version: CURRENT_SCHEMA_VERSION,
        payload,
    })
}

/// Decodes a blob of any supported version into the current record shape.
pub fn decode<T: PartitionRecord>(blob: &StoredBlob) -> Result<T, SchemaError> {
    decode_payload(T::PARTITION, blob.schema_version, &blob.payload)
}

/// Decodes a record from raw JSON and applies upgrades from `version`.
pub fn decode_payload<T: PartitionRecord>(
    partition: Partition,
    version: u32,
    payload: &str,
) -> Result<T, SchemaError> {
    if !(LEGACY_SCHEMA_VERSION..=CURRENT_SCHEMA_VERSION).contains(&version) {
        return Err(SchemaError::UnsupportedVersion { partition, version });
    }

    let mut record: T = serde_json::from_str(payload)
        .map_err(|source| SchemaError::Decode { partition, source })?;
    if version < CURRENT_SCHEMA_VERSION {
        record.upgrade_from_legacy();
    }
    Ok(record)
}

/// Rewrites a stored blob of an older version at the current version.
pub fn migrate_blob(partition: Partition, blob: &StoredBlob) -> Result<StoredBlob, SchemaError> {
    match partition {
        Partition::Sleep => encode(&decode::<SleepState>(blob)?),
        Partition::Savings => encode(&decode::<SavingsState>(blob)?),
        Partition::Payments => encode(&decode::<PaymentsState>(blob)?),
        Partition::Jobs => encode(&decode::<JobsState>(blob)?),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, migrate_blob, SchemaError, CURRENT_SCHEMA_VERSION};
    use crate::model::jobs::{EmploymentType, Job, JobsState};
    use crate::model::payments::{PaymentReminder, PaymentsState, RepeatRule};
    use crate::model::savings::{SavingsGoal, SavingsState};
    use crate::model::sleep::{SleepEntry, SleepState};
    use crate::store::{Partition, StoredBlob};

    const LEGACY_SLEEP: &str = r#"{
        "id": "main",
        "settings": {"targetHours": 8, "bedTime": "23:00", "wakeTime": "07:00"},
        "history": [
            {"date": "2025-11-24", "sleepStart": "23:00", "sleepEnd": "07:00", "hours": 8},
            {"date": "23.11.2025", "sleepStart": "00:00", "sleepEnd": "06:00", "hours": 6}
        ]
    }"#;

    #[test]
    fn legacy_sleep_blob_is_canonicalized_on_decode() {
        let blob = StoredBlob {
            schema_version: 1,
            payload: LEGACY_SLEEP.to_string(),
        };
        let state: SleepState = decode(&blob).unwrap();
        let dates: Vec<&str> = state.history.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, vec!["23.11.2025", "24.11.2025"]);
    }

    #[test]
    fn migrate_blob_bumps_version() {
        let blob = StoredBlob {
            schema_version: 1,
            payload: r#"{"id":"main","goals":[]}"#.to_string(),
        };
        let migrated = migrate_blob(Partition::Savings, &blob).unwrap();
        assert_eq!(migrated.schema_version, CURRENT_SCHEMA_VERSION);
        let state: SavingsState = decode(&migrated).unwrap();
        assert!(state.goals.is_empty());
    }

    #[test]
    fn newer_versions_are_rejected() {
        let mut blob = encode(&SavingsState::default()).unwrap();
        blob.schema_version = CURRENT_SCHEMA_VERSION + 1;
        let err = decode::<SavingsState>(&blob).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedVersion { version, .. } if version == 3));
    }

    /// Deterministic spread of floats with full 17-digit mantissas.
    fn awkward_floats(count: usize) -> Vec<f64> {
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        (0..count)
            .map(|_| {
                state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                (state >> 11) as f64 / (1u64 << 53) as f64 * 1_000_000.0
            })
            .collect()
    }

    #[test]
    fn savings_floats_survive_encode_decode() {
        let mut values = awkward_floats(20_000);
        values.push(394_301.338_356_336_75);
        let state = SavingsState {
            goals: values
                .chunks(2)
                .enumerate()
                .map(|(index, pair)| SavingsGoal {
                    id: format!("goal-{index}"),
                    title: "Goal".to_string(),
                    saved: pair[0],
                    target: pair.get(1).copied().unwrap_or(1.0),
                })
                .collect(),
        };
        let decoded: SavingsState = decode(&encode(&state).unwrap()).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn every_partition_shape_survives_encode_decode() {
        let floats = awkward_floats(8);

        let mut sleep = SleepState::default();
        sleep.settings.target_hours = floats[0] / 1e5;
        sleep.history = vec![SleepEntry {
            date: "24.11.2025".to_string(),
            sleep_start: "23:10".to_string(),
            sleep_end: "06:55".to_string(),
            hours: floats[1] / 1e5,
        }];
        let decoded: SleepState = decode(&encode(&sleep).unwrap()).unwrap();
        assert_eq!(decoded, sleep);

        let payments = PaymentsState {
            reminders: vec![PaymentReminder {
                id: "pay-1".to_string(),
                title: "Rent".to_string(),
                amount: floats[2],
                due_date: "2025-12-01".to_string(),
                is_repeating: true,
                repeat_rule: RepeatRule::Weekly,
                is_paid: false,
            }],
        };
        let decoded: PaymentsState = decode(&encode(&payments).unwrap()).unwrap();
        assert_eq!(decoded, payments);

        let jobs = JobsState {
            jobs: vec![
                Job {
                    id: "job-1".to_string(),
                    title: "Barista".to_string(),
                    company: "Cafe".to_string(),
                    city: "Kazan".to_string(),
                    salary_min: Some(floats[3]),
                    salary_max: Some(floats[3] + floats[4]),
                    posted_at: "2025-11-20".to_string(),
                    description: String::new(),
                    employment_type: EmploymentType::PartTime,
                    link: String::new(),
                    is_favorite: true,
                },
                Job {
                    id: "job-2".to_string(),
                    title: "Intern".to_string(),
                    company: "Lab".to_string(),
                    city: "Moscow".to_string(),
                    salary_min: None,
                    salary_max: None,
                    posted_at: "21.11.2025".to_string(),
                    description: "No salary listed".to_string(),
                    employment_type: EmploymentType::Intern,
                    link: "https://example.org".to_string(),
                    is_favorite: false,
                },
            ],
        };
        let decoded: JobsState = decode(&encode(&jobs).unwrap()).unwrap();
        assert_eq!(decoded, jobs);
    }
}
