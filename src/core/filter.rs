use crate::core::models::Integration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Candidate,
    FilteredDisabled,
    FilteredColdPollSet,
    FilteredStreaming,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterPolicy {
    pub include_disabled: bool,
    pub override_existing: bool,
}

/// Classifies one record. Rules apply in priority order; the metric streaming
/// rule cannot be overridden by any flag.
pub fn classify(integration: &Integration, policy: &FilterPolicy) -> Eligibility {
    if !policy.include_disabled && !integration.is_enabled() {
        return Eligibility::FilteredDisabled;
    }

    if !policy.override_existing && integration.cold_poll_rate().is_set() {
        return Eligibility::FilteredColdPollSet;
    }

    if integration.is_metric_streaming() {
        return Eligibility::FilteredStreaming;
    }

    Eligibility::Candidate
}

#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub candidates: Vec<Integration>,
    pub disabled: Vec<String>,
    pub cold_poll_set: Vec<String>,
    pub streaming: Vec<String>,
}

impl FilterOutcome {
    pub fn filtered_count(&self) -> usize {
        self.disabled.len() + self.cold_poll_set.len() + self.streaming.len()
    }
}

/// Splits records into candidates and filtered buckets, preserving input order.
/// Records without a usable id are dropped.
pub fn partition(integrations: Vec<Integration>, policy: &FilterPolicy) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    for integration in integrations {
        let Some(id) = integration.id().map(str::to_string) else {
            tracing::debug!("Skipping integration without an id");
            continue;
        };

        let decision = classify(&integration, policy);
        tracing::debug!(id = %id, ?decision, "Classified integration");

        match decision {
            Eligibility::Candidate => outcome.candidates.push(integration),
            Eligibility::FilteredDisabled => outcome.disabled.push(id),
            Eligibility::FilteredColdPollSet => outcome.cold_poll_set.push(id),
            Eligibility::FilteredStreaming => outcome.streaming.push(id),
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn integration(value: Value) -> Integration {
        Integration::from_value(value).unwrap()
    }

    fn all_policies() -> Vec<FilterPolicy> {
        let mut policies = Vec::new();
        for include_disabled in [false, true] {
            for override_existing in [false, true] {
                policies.push(FilterPolicy {
                    include_disabled,
                    override_existing,
                });
            }
        }
        policies
    }

    fn sample_records() -> Vec<Value> {
        let mut records = Vec::new();
        let mut n = 0;
        for enabled in [json!(true), json!(false), Value::Null] {
            for rate in [None, Some(Value::Null), Some(json!(900000))] {
                for state in [None, Some("ENABLED"), Some("DISABLED")] {
                    let mut record = json!({ "id": format!("id-{n}") });
                    if !enabled.is_null() {
                        record["enabled"] = enabled.clone();
                    }
                    if let Some(rate) = &rate {
                        record["coldPollRate"] = rate.clone();
                    }
                    if let Some(state) = state {
                        record["metricStreamsSyncState"] = json!(state);
                    }
                    records.push(record);
                    n += 1;
                }
            }
        }
        records
    }

    #[test]
    fn test_default_policy_buckets() {
        let policy = FilterPolicy::default();

        assert_eq!(
            classify(&integration(json!({"id": "a", "enabled": true})), &policy),
            Eligibility::Candidate
        );
        assert_eq!(
            classify(&integration(json!({"id": "b", "enabled": false})), &policy),
            Eligibility::FilteredDisabled
        );
        assert_eq!(
            classify(
                &integration(json!({"id": "c", "enabled": true, "coldPollRate": 60000})),
                &policy
            ),
            Eligibility::FilteredColdPollSet
        );
        assert_eq!(
            classify(
                &integration(json!({"id": "d", "enabled": true, "metricStreamsSyncState": "ENABLED"})),
                &policy
            ),
            Eligibility::FilteredStreaming
        );
    }

    #[test]
    fn test_null_cold_poll_rate_is_not_set() {
        let record = integration(json!({"id": "a", "enabled": true, "coldPollRate": null}));
        assert_eq!(
            classify(&record, &FilterPolicy::default()),
            Eligibility::Candidate
        );
    }

    #[test]
    fn test_priority_order() {
        let record = integration(json!({
            "id": "a",
            "enabled": false,
            "coldPollRate": 60000,
            "metricStreamsSyncState": "ENABLED"
        }));

        let mut policy = FilterPolicy::default();
        assert_eq!(classify(&record, &policy), Eligibility::FilteredDisabled);

        policy.include_disabled = true;
        assert_eq!(classify(&record, &policy), Eligibility::FilteredColdPollSet);

        policy.override_existing = true;
        assert_eq!(classify(&record, &policy), Eligibility::FilteredStreaming);
    }

    #[test]
    fn test_streaming_is_never_a_candidate() {
        for policy in all_policies() {
            for value in sample_records() {
                let record = integration(value);
                if record.is_metric_streaming() {
                    assert_ne!(classify(&record, &policy), Eligibility::Candidate);
                }
            }
        }
    }

    #[test]
    fn test_every_record_lands_in_exactly_one_bucket() {
        for policy in all_policies() {
            let records: Vec<Integration> = sample_records().into_iter().map(integration).collect();
            let total = records.len();
            let outcome = partition(records, &policy);

            assert_eq!(outcome.candidates.len() + outcome.filtered_count(), total);

            let mut ids: Vec<String> = outcome
                .candidates
                .iter()
                .filter_map(|c| c.id().map(str::to_string))
                .chain(outcome.disabled.iter().cloned())
                .chain(outcome.cold_poll_set.iter().cloned())
                .chain(outcome.streaming.iter().cloned())
                .collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), total);
        }
    }

    #[test]
    fn test_records_without_id_are_dropped() {
        let records = vec![
            integration(json!({"enabled": true})),
            integration(json!({"id": "", "enabled": false})),
            integration(json!({"id": "kept", "enabled": true})),
        ];

        let outcome = partition(records, &FilterPolicy::default());
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].id(), Some("kept"));
        assert_eq!(outcome.filtered_count(), 0);
    }

    #[test]
    fn test_partition_preserves_input_order() {
        let records = vec![
            integration(json!({"id": "z", "enabled": true})),
            integration(json!({"id": "off-2", "enabled": false})),
            integration(json!({"id": "a", "enabled": true})),
            integration(json!({"id": "off-1", "enabled": false})),
            integration(json!({"id": "m", "enabled": true})),
        ];

        let outcome = partition(records, &FilterPolicy::default());
        let ids: Vec<&str> = outcome.candidates.iter().filter_map(|c| c.id()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
        assert_eq!(outcome.disabled, vec!["off-2", "off-1"]);
    }

    #[test]
    fn test_flags_widen_candidates() {
        let records = || {
            vec![
                integration(json!({"id": "off", "enabled": false})),
                integration(json!({"id": "set", "enabled": true, "coldPollRate": 300000})),
            ]
        };

        let outcome = partition(
            records(),
            &FilterPolicy {
                include_disabled: true,
                override_existing: true,
            },
        );
        assert_eq!(outcome.candidates.len(), 2);
        assert_eq!(outcome.filtered_count(), 0);
    }
}
