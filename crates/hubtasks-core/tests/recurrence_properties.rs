//! Property tests for recurrence arithmetic.

use chrono::{DateTime, TimeZone, Utc, Weekday};
use hubtasks_core::recurrence::{Frequency, RecurrenceRule};
use proptest::prelude::*;

const DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn any_timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    // 1970 .. ~2096
    (0i64..4_000_000_000).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

fn any_rule() -> impl Strategy<Value = RecurrenceRule> {
    (
        0usize..3,
        1u32..6,
        proptest::option::of(proptest::collection::vec(0usize..7, 1..5)),
    )
        .prop_map(|(freq, interval, days)| {
            let frequency = [Frequency::Daily, Frequency::Weekly, Frequency::Monthly][freq];
            let rule = RecurrenceRule::new(frequency, interval);
            match (frequency, days) {
                (Frequency::Weekly, Some(days)) => {
                    rule.with_weekdays(days.into_iter().map(|i| DAYS[i]))
                }
                _ => rule,
            }
        })
}

proptest! {
    #[test]
    fn next_occurrence_is_strictly_later(rule in any_rule(), start in any_timestamp(), index in 1u32..50) {
        if let Some(next) = rule.next_occurrence(start, index).unwrap() {
            prop_assert!(next > start);
        }
    }

    #[test]
    fn weekday_filter_is_honored(
        interval in 1u32..10_000,
        days in proptest::collection::vec(0usize..7, 1..5),
        start in any_timestamp(),
    ) {
        let rule = RecurrenceRule::new(Frequency::Weekly, interval)
            .with_weekdays(days.iter().map(|i| DAYS[*i]));
        let next = rule.next_occurrence(start, 1).unwrap().unwrap();
        prop_assert!(rule.weekdays().contains(&chrono::Datelike::weekday(&next)));
        prop_assert!(next - start <= chrono::Duration::weeks(interval as i64 + 1));
    }

    #[test]
    fn count_bounds_successive_occurrences(rule in any_rule(), count in 1u32..12, start in any_timestamp()) {
        let rule = rule.with_count(count);
        let mut due = start;
        let mut index = 1;
        let mut produced = 0;

        while let Some(next) = rule.next_occurrence(due, index).unwrap() {
            produced += 1;
            prop_assert!(produced <= count);
            due = next;
            index += 1;
        }

        // Exhausted for good
        for extra in 0..3 {
            prop_assert!(rule.next_occurrence(due, index + extra).unwrap().is_none());
        }
        prop_assert_eq!(rule.occurrences(start).unwrap().count() as u32, count);
    }
}
