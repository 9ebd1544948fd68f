//! Per-user vouch record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Vouch counters for one user.
///
/// `total` is the authoritative count. `daily` and `streak` only move on
/// received vouches, so admin adjustments make `total` drift away from the
/// sum of `daily`. That drift is kept as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VouchRecord {
    /// Cumulative vouch count
    #[serde(default, deserialize_with = "lenient_count::deserialize")]
    pub total: u64,

    /// Vouches received per UTC calendar day
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub daily: BTreeMap<NaiveDate, u64>,

    /// Consecutive-day streak
    #[serde(default, skip_serializing_if = "is_zero")]
    pub streak: u32,

    /// Last UTC day the streak was updated
    #[serde(
        default,
        with = "day_or_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_day: Option<NaiveDate>,

    /// Keys this version does not know about, kept for the next save
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl VouchRecord {
    /// Vouches received on `day`.
    pub fn count_on(&self, day: NaiveDate) -> u64 {
        self.daily.get(&day).copied().unwrap_or(0)
    }
}

/// `last_day` may be stored as `""` when unset.
mod day_or_empty {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(day: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match day {
            Some(day) => s.collect_str(&day.format(FORMAT)),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s.trim(), FORMAT)
                .map(Some)
                .map_err(de::Error::custom),
        }
    }
}

/// Counts written by older tooling may be negative or fractional; clamp them
/// instead of rejecting the whole snapshot.
mod lenient_count {
    use serde::{de, Deserializer};
    use std::fmt;

    struct CountVisitor;

    impl<'de> de::Visitor<'de> for CountVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a vouch count")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
            Ok(v.max(0) as u64)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u64, E> {
            if v.is_finite() {
                Ok(v.max(0.0) as u64)
            } else {
                Err(E::invalid_value(de::Unexpected::Float(v), &self))
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<u64, E> {
            Ok(0)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        d.deserialize_any(CountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn reads_partial_record() {
        // Admin adds create records that only carry a total
        let record: VouchRecord = serde_json::from_value(json!({ "total": 5 })).unwrap();
        assert_eq!(record.total, 5);
        assert!(record.daily.is_empty());
        assert_eq!(record.streak, 0);
        assert_eq!(record.last_day, None);
    }

    #[test]
    fn empty_last_day_is_unset() {
        let record: VouchRecord =
            serde_json::from_value(json!({ "total": 1, "last_day": "" })).unwrap();
        assert_eq!(record.last_day, None);
    }

    #[test]
    fn full_record_shape() {
        let record: VouchRecord = serde_json::from_value(json!({
            "total": 2,
            "daily": { "2024-01-01": 1, "2024-01-02": 1 },
            "streak": 2,
            "last_day": "2024-01-02"
        }))
        .unwrap();

        assert_eq!(record.count_on(day("2024-01-02")), 1);
        assert_eq!(record.count_on(day("2024-01-03")), 0);
        assert_eq!(record.last_day, Some(day("2024-01-02")));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["last_day"], "2024-01-02");
        assert_eq!(value["daily"]["2024-01-01"], 1);
    }

    #[test]
    fn unknown_keys_survive() {
        let input = json!({ "total": 3, "note": "migrated", "badges": ["early"] });
        let record: VouchRecord = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(record.extra.get("note"), Some(&json!("migrated")));
        assert_eq!(serde_json::to_value(&record).unwrap(), input);
    }

    #[test]
    fn negative_total_clamps_to_zero() {
        let record: VouchRecord =
            serde_json::from_value(json!({ "total": -3, "streak": 1 })).unwrap();
        assert_eq!(record.total, 0);
        assert_eq!(record.streak, 1);

        let record: VouchRecord = serde_json::from_value(json!({ "total": null })).unwrap();
        assert_eq!(record.total, 0);
    }

    #[test]
    fn rejects_garbage_day() {
        let result: Result<VouchRecord, _> =
            serde_json::from_value(json!({ "last_day": "yesterday" }));
        assert!(result.is_err());
    }
}
