use serde::{Deserialize, Serialize};

use crate::operation::OperationRecord;

/// Timeline filter criteria; every field is optional and an empty or
/// whitespace-only value means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Substring the client IP must contain.
    #[serde(default)]
    pub include_ip: Option<String>,
    /// Substring that rejects a record when its client IP contains it.
    #[serde(default)]
    pub exclude_ip: Option<String>,
    /// Case-insensitive substring the user must contain.
    #[serde(default)]
    pub user: Option<String>,
    /// Case-insensitive substring the operation tag must contain.
    #[serde(default)]
    pub operation: Option<String>,
}

impl FilterCriteria {
    /// Returns whether no criterion is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        active(self.include_ip.as_deref()).is_none()
            && active(self.exclude_ip.as_deref()).is_none()
            && active(self.user.as_deref()).is_none()
            && active(self.operation.as_deref()).is_none()
    }

    /// Evaluates all active criteria against one record (logical AND).
    ///
    /// A record missing a field tested by an inclusion criterion does not
    /// match; a record missing its client IP cannot match the exclusion
    /// pattern and therefore passes it.
    #[must_use]
    pub fn matches(&self, record: &OperationRecord) -> bool {
        if let Some(needle) = active(self.include_ip.as_deref())
            && !record
                .client_ip
                .as_deref()
                .is_some_and(|ip| ip.contains(needle))
        {
            return false;
        }

        if let Some(needle) = active(self.exclude_ip.as_deref())
            && record
                .client_ip
                .as_deref()
                .is_some_and(|ip| ip.contains(needle))
        {
            return false;
        }

        if let Some(needle) = active(self.user.as_deref())
            && !record
                .user
                .as_deref()
                .is_some_and(|user| contains_ignore_case(user, needle))
        {
            return false;
        }

        if let Some(needle) = active(self.operation.as_deref())
            && !contains_ignore_case(record.operation.as_str(), needle)
        {
            return false;
        }

        true
    }
}

/// Selects the records satisfying every active criterion, preserving the
/// input's relative order. The input collection is never mutated.
#[must_use]
pub fn apply_filters(original: &[OperationRecord], criteria: &FilterCriteria) -> Vec<OperationRecord> {
    original
        .iter()
        .filter(|record| criteria.matches(record))
        .cloned()
        .collect()
}

fn active(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{FilterCriteria, apply_filters};
    use crate::operation::OperationRecord;

    fn record(user: Option<&str>, operation: &str, client_ip: Option<&str>) -> OperationRecord {
        OperationRecord {
            timestamp: None,
            operation: operation.to_owned(),
            subject: None,
            folder: None,
            user: user.map(ToOwned::to_owned),
            client_ip: client_ip.map(ToOwned::to_owned),
            size: None,
            full_data: None,
        }
    }

    #[test]
    fn empty_criteria_keep_every_record() {
        let records = vec![
            record(Some("alice@contoso.com"), "Update", Some("10.0.0.5")),
            record(None, "Send", None),
        ];

        let filtered = apply_filters(&records, &FilterCriteria::default());
        assert_eq!(filtered, records);
    }

    #[test]
    fn include_and_exclude_ip_are_independent() {
        let records = vec![record(None, "Update", Some("10.0.0.5"))];

        let included = apply_filters(
            &records,
            &FilterCriteria {
                include_ip: Some("10.0".to_owned()),
                exclude_ip: Some("192".to_owned()),
                ..FilterCriteria::default()
            },
        );
        assert_eq!(included.len(), 1);

        let excluded = apply_filters(
            &records,
            &FilterCriteria {
                include_ip: Some("10.0".to_owned()),
                exclude_ip: Some("10.0".to_owned()),
                ..FilterCriteria::default()
            },
        );
        assert!(excluded.is_empty());
    }

    #[test]
    fn missing_ip_fails_inclusion_but_passes_exclusion() {
        let records = vec![record(Some("alice"), "Update", None)];

        let by_include = apply_filters(
            &records,
            &FilterCriteria {
                include_ip: Some("10.".to_owned()),
                ..FilterCriteria::default()
            },
        );
        assert!(by_include.is_empty());

        let by_exclude = apply_filters(
            &records,
            &FilterCriteria {
                exclude_ip: Some("10.".to_owned()),
                ..FilterCriteria::default()
            },
        );
        assert_eq!(by_exclude.len(), 1);
    }

    #[test]
    fn user_and_operation_match_case_insensitively() {
        let records = vec![record(Some("Alice@Contoso.com"), "MailItemsAccessed", None)];

        let criteria = FilterCriteria {
            user: Some("ALICE".to_owned()),
            operation: Some("mailitems".to_owned()),
            ..FilterCriteria::default()
        };

        assert_eq!(apply_filters(&records, &criteria).len(), 1);
    }

    #[test]
    fn missing_user_fails_user_criterion() {
        let records = vec![record(None, "Update", None)];
        let criteria = FilterCriteria {
            user: Some("alice".to_owned()),
            ..FilterCriteria::default()
        };

        assert!(apply_filters(&records, &criteria).is_empty());
    }

    #[test]
    fn whitespace_only_criteria_are_inactive() {
        let criteria = FilterCriteria {
            include_ip: Some("   ".to_owned()),
            user: Some(String::new()),
            ..FilterCriteria::default()
        };

        assert!(criteria.is_empty());
    }

    fn arbitrary_record() -> impl Strategy<Value = OperationRecord> {
        (
            proptest::option::of("[a-z]{1,8}"),
            "[A-Za-z]{1,12}",
            proptest::option::of("[0-9.]{1,12}"),
        )
            .prop_map(|(user, operation, client_ip)| OperationRecord {
                timestamp: None,
                operation,
                subject: None,
                folder: None,
                user,
                client_ip,
                size: None,
                full_data: None,
            })
    }

    fn arbitrary_criteria() -> impl Strategy<Value = FilterCriteria> {
        (
            proptest::option::of("[0-9.]{0,4}"),
            proptest::option::of("[0-9.]{0,4}"),
            proptest::option::of("[a-z]{0,4}"),
            proptest::option::of("[A-Za-z]{0,4}"),
        )
            .prop_map(|(include_ip, exclude_ip, user, operation)| FilterCriteria {
                include_ip,
                exclude_ip,
                user,
                operation,
            })
    }

    proptest! {
        #[test]
        fn output_is_an_order_preserving_subset(
            records in proptest::collection::vec(arbitrary_record(), 0..24),
            criteria in arbitrary_criteria(),
        ) {
            let filtered = apply_filters(&records, &criteria);

            prop_assert!(filtered.len() <= records.len());

            // Every kept record appears in the input, in the same relative order.
            let mut cursor = 0usize;
            for kept in &filtered {
                let position = records[cursor..]
                    .iter()
                    .position(|candidate| candidate == kept);
                prop_assert!(position.is_some());
                cursor += position.unwrap_or(0) + 1;
            }
        }

        #[test]
        fn filtering_is_idempotent(
            records in proptest::collection::vec(arbitrary_record(), 0..24),
            criteria in arbitrary_criteria(),
        ) {
            let once = apply_filters(&records, &criteria);
            let twice = apply_filters(&once, &criteria);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn original_collection_is_untouched(
            records in proptest::collection::vec(arbitrary_record(), 0..24),
            criteria in arbitrary_criteria(),
        ) {
            let snapshot = records.clone();
            let _ = apply_filters(&records, &criteria);
            prop_assert_eq!(records, snapshot);
        }
    }
}
