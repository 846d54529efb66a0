//! Property-based tests for the schema name codec and bucketing

#[cfg(test)]
mod tests {
    use crate::analytics::{aggregate, TimeSeriesAggregator, TimeUnit};
    use crate::domain::{decode, encode, RawRunRow, RunRecord, SCHEMA_ZONE};
    use crate::error::TimestampError;
    use chrono::{DateTime, TimeZone, Utc};
    use proptest::prelude::*;

    // 1970-01-01 .. 2100-01-01, whole seconds
    fn whole_second_instant() -> impl Strategy<Value = DateTime<Utc>> {
        (0i64..4_102_444_800i64).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
    }

    fn is_unambiguous(instant: DateTime<Utc>) -> bool {
        let local = instant.with_timezone(&SCHEMA_ZONE).naive_local();
        SCHEMA_ZONE.from_local_datetime(&local).single().is_some()
    }

    fn record_at(step: &str, at: DateTime<Utc>) -> RunRecord {
        RunRecord::try_from(RawRunRow {
            image_id: 1,
            pipeline_step: step.to_string(),
            processing_time: 12.5,
            completion: String::new(),
            file_path: "/data/telescope_g_field_target_60001.25_3.fits".to_string(),
            source_table: encode(at).unwrap(),
        })
        .unwrap()
    }

    proptest! {
        #[test]
        fn test_encode_then_decode_is_identity(instant in whole_second_instant()) {
            prop_assume!(is_unambiguous(instant));
            let name = encode(instant).unwrap();
            prop_assert_eq!(decode(&name).unwrap(), instant);
        }

        #[test]
        fn test_out_of_range_month_is_rejected(month in 13u32..100u32) {
            let name = format!("science_turbo_production_pipeline_{month}_1_2024_0_0_0");
            let rejected = matches!(
                decode(&name),
                Err(TimestampError::OutOfRange { field: "month", .. })
            );
            prop_assert!(rejected);
        }

        #[test]
        fn test_out_of_range_seconds_are_rejected(seconds in 60u32..1000u32) {
            let name = format!("science_turbo_production_pipeline_6_1_2024_0_0_{seconds}");
            let rejected = matches!(
                decode(&name),
                Err(TimestampError::OutOfRange { field: "seconds", .. })
            );
            prop_assert!(rejected);
        }

        #[test]
        fn test_every_record_lands_in_exactly_one_bucket(
            offsets in prop::collection::vec(0i64..(30 * 86_400), 1..40),
            success in prop::collection::vec(any::<bool>(), 40),
        ) {
            let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
            let records: Vec<RunRecord> = offsets
                .iter()
                .zip(&success)
                .map(|(offset, ok)| {
                    let step = if *ok { "save the image" } else { "Run Sfft Subtraction" };
                    record_at(step, base + chrono::Duration::seconds(*offset))
                })
                .collect();

            for unit in TimeUnit::ALL {
                let buckets = aggregate(&records, unit, base, base, false).unwrap();
                let total: usize = buckets.values().map(|b| b.total_runs()).sum();
                let ok: usize = buckets.values().map(|b| b.number_successful_runs).sum();
                prop_assert_eq!(total, records.len());
                prop_assert_eq!(ok, records.iter().filter(|r| r.success()).count());
            }
        }

        #[test]
        fn test_sparse_keys_are_a_subset_of_dense_keys(
            start_offset in 0i64..86_400,
            offsets in prop::collection::vec(-86_400i64..(11 * 86_400), 0..30),
            unit in prop::sample::select(vec![
                TimeUnit::Minutes,
                TimeUnit::Hours,
                TimeUnit::Days,
                TimeUnit::Weeks,
                TimeUnit::Months,
            ]),
        ) {
            let midnight = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
            let from = midnight + chrono::Duration::seconds(start_offset);
            let until = midnight + chrono::Duration::seconds(10 * 86_400);
            let records: Vec<RunRecord> = offsets
                .iter()
                .map(|offset| record_at("save the image", midnight + chrono::Duration::seconds(*offset)))
                .collect();
            let aggregator = TimeSeriesAggregator::new();

            let sparse = aggregator
                .aggregate(&records, &request(unit, from, until, false))
                .unwrap();
            let dense = aggregator
                .aggregate(&records, &request(unit, from, until, true))
                .unwrap();

            for (key, bucket) in &sparse {
                prop_assert_eq!(dense.get(key), Some(bucket));
            }
            for boundary in aggregator.boundaries(unit, from, until).unwrap() {
                prop_assert!(dense.contains_key(&unit.bucket_key(boundary)));
            }
            let kept: usize = dense.values().map(|b| b.total_runs()).sum();
            prop_assert_eq!(kept, records.len());
        }

        #[test]
        fn test_dense_mode_has_one_key_per_boundary(hours in 0i64..500) {
            let from = Utc.with_ymd_and_hms(2023, 12, 30, 0, 0, 0).unwrap();
            let until = from + chrono::Duration::hours(hours);
            let dense = aggregate(&[], TimeUnit::Hours, from, until, true).unwrap();
            prop_assert_eq!(dense.len() as i64, hours + 1);
            prop_assert!(dense.values().all(|b| b.is_empty()));
        }
    }

    fn request(
        unit: TimeUnit,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        include_empty_buckets: bool,
    ) -> crate::analytics::AggregationRequest {
        crate::analytics::AggregationRequest {
            unit,
            from,
            until,
            include_empty_buckets,
        }
    }
}
