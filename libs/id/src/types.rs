//! Typed ID definitions for every scheduler entity.
//!
//! Jobs and resources carry UUID strings in their descriptors and get their
//! handles by derivation. Tasks and equivalence classes are numbered by
//! whoever creates them.

use uuid::Uuid;

use crate::{define_id, IdError};

// =============================================================================
// Jobs and Tasks
// =============================================================================

define_id!(JobId, u64, uuid);
define_id!(TaskId, u64);
define_id!(TaskOutputId, u32);

// =============================================================================
// Resources
// =============================================================================

define_id!(ResourceId, u64, uuid);

// =============================================================================
// Flow graph
// =============================================================================

// Tasks in the same equivalence class have identical scheduling costs.
define_id!(EquivClass, u64);

/// Folds a UUID string into a 64-bit handle.
///
/// Accepts any textual form the `uuid` crate understands (hyphenated,
/// simple, braced, URN).
pub fn fold_uuid(s: &str) -> Result<u64, IdError> {
    if s.is_empty() {
        return Err(IdError::Empty);
    }

    let uuid = Uuid::parse_str(s).map_err(|e| IdError::InvalidUuid {
        input: s.to_string(),
        reason: e.to_string(),
    })?;

    let (high, low) = uuid.as_u64_pair();
    Ok(high ^ low)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const JOB_UUID: &str = "2f1e0b7c-5f0d-4d89-9a4b-3c1d2e3f4a5b";

    #[test]
    fn test_job_id_derivation_is_deterministic() {
        let a = JobId::from_uuid_str(JOB_UUID).unwrap();
        let b = JobId::from_uuid_str(JOB_UUID).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_job_id_accepts_simple_form() {
        let hyphenated = JobId::from_uuid_str(JOB_UUID).unwrap();
        let simple = JobId::from_uuid_str(&JOB_UUID.replace('-', "")).unwrap();
        assert_eq!(hyphenated, simple);
    }

    #[test]
    fn test_fold_xors_halves() {
        let uuid = Uuid::parse_str(JOB_UUID).unwrap();
        let (high, low) = uuid.as_u64_pair();
        assert_eq!(ResourceId::from_uuid_str(JOB_UUID).unwrap().value(), high ^ low);
    }

    #[test]
    fn test_uuid_id_empty() {
        let result = ResourceId::from_uuid_str("");
        assert!(matches!(result.unwrap_err(), IdError::Empty));
    }

    #[test]
    fn test_uuid_id_invalid() {
        let result = JobId::from_uuid_str("not-a-uuid");
        assert!(matches!(
            result.unwrap_err(),
            IdError::InvalidUuid { .. }
        ));
    }

    #[test]
    fn test_task_id_decimal_roundtrip() {
        let id = TaskId::new(42);
        let parsed: TaskId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_task_id_invalid_number() {
        let result: Result<TaskId, _> = "forty-two".parse();
        assert!(matches!(result.unwrap_err(), IdError::InvalidNumber(_)));
    }

    #[test]
    fn test_task_output_id_is_32_bit() {
        let id = TaskOutputId::new(u32::MAX);
        assert_eq!(id.value(), u32::MAX);
        assert!(TaskOutputId::parse("4294967296").is_err());
    }

    #[test]
    fn test_id_json_is_a_number() {
        let id = TaskId::new(12345);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "12345");
        let parsed: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    proptest! {
        #[test]
        fn prop_uuid_derivation_matches_fold(bytes in any::<[u8; 16]>()) {
            let uuid = Uuid::from_bytes(bytes);
            let (high, low) = uuid.as_u64_pair();
            let id = JobId::from_uuid_str(&uuid.to_string()).unwrap();
            prop_assert_eq!(id.value(), high ^ low);
            // Job and resource spaces derive the same raw value but stay distinct types.
            let resource = ResourceId::from_uuid_str(&uuid.to_string()).unwrap();
            prop_assert_eq!(resource.value(), id.value());
        }

        #[test]
        fn prop_decimal_roundtrip(raw in any::<u64>()) {
            let id = EquivClass::new(raw);
            prop_assert_eq!(id.to_string().parse::<EquivClass>().unwrap(), id);
        }
    }
}
