//! Dashboard aggregation over employees and their training sessions.

use crate::core::period::{self, DateRange};
use crate::domain::model::{Document, TrainingSession, EMPLOYEES};
use crate::domain::ports::{Clock, DocumentStore, RangeFilter, Subcollection};
use crate::utils::error::Result;
use futures::future::try_join_all;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

const DATE_FIELD: &str = "date";

/// Total hours per location key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationHours(pub BTreeMap<String, f64>);

impl LocationHours {
    pub fn get(&self, location: &str) -> Option<f64> {
        self.0.get(location).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Serialize for LocationHours {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (location, hours) in &self.0 {
            map.serialize_entry(location, &Hours(*hours))?;
        }
        map.end()
    }
}

/// Response body of the per-employee hours endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalHours {
    #[serde(serialize_with = "serialize_hours")]
    pub total_hours: f64,
}

/// Writes whole-number totals as JSON integers (`5`, not `5.0`).
struct Hours(f64);

impl Serialize for Hours {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_hours(&self.0, serializer)
    }
}

const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

fn serialize_hours<S: Serializer>(hours: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    if hours.fract() == 0.0 && hours.abs() < MAX_EXACT_INT {
        serializer.serialize_i64(*hours as i64)
    } else {
        serializer.serialize_f64(*hours)
    }
}

/// Read-only reducer over the document store. Holds no mutable state, so a
/// single instance can serve concurrent callers.
#[derive(Clone)]
pub struct Aggregator {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl Aggregator {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Sums session hours across every employee, grouped by location.
    pub async fn hours_by_location(&self) -> Result<LocationHours> {
        let mut employees = self.store.list_all(EMPLOYEES).await?;
        employees.sort_by(|a, b| a.id.cmp(&b.id));
        tracing::debug!(employees = employees.len(), "Aggregating hours by location");

        let reads = employees.iter().map(|employee| {
            self.store
                .list_subcollection(Subcollection::training_sessions(&employee.id))
        });
        let per_employee = try_join_all(reads).await?;

        let mut totals = BTreeMap::new();
        for mut sessions in per_employee {
            sort_by_id(&mut sessions);
            for doc in &sessions {
                let session = TrainingSession::from_document(doc);
                *totals.entry(session.location).or_insert(0.0) += session.hours;
            }
        }

        Ok(LocationHours(totals))
    }

    /// Hours for one employee in a calendar month. `month` and `year` fall
    /// back to the current month/year when absent or out of range.
    pub async fn monthly_hours(
        &self,
        employee_id: &str,
        month: Option<i64>,
        year: Option<i64>,
    ) -> Result<TotalHours> {
        let range = period::monthly_range(month, year, self.clock.today())?;
        self.hours_in_range(employee_id, range).await
    }

    /// Hours for one employee in a calendar year.
    pub async fn yearly_hours(&self, employee_id: &str, year: Option<i64>) -> Result<TotalHours> {
        let range = period::yearly_range(year, self.clock.today())?;
        self.hours_in_range(employee_id, range).await
    }

    // An unknown employee has an empty session collection, so this yields 0.
    async fn hours_in_range(&self, employee_id: &str, range: DateRange) -> Result<TotalHours> {
        let (lower, upper) = range.iso_bounds();
        let mut sessions = self
            .store
            .query_range(
                Subcollection::training_sessions(employee_id),
                RangeFilter {
                    field: DATE_FIELD,
                    lower: &lower,
                    upper: &upper,
                },
            )
            .await?;
        sort_by_id(&mut sessions);

        let total_hours: f64 = sessions
            .iter()
            .map(|doc| TrainingSession::from_document(doc).hours)
            .sum();

        tracing::debug!(
            employee_id,
            from = %lower,
            to = %upper,
            sessions = sessions.len(),
            total_hours,
            "Computed employee hours"
        );

        Ok(TotalHours { total_hours })
    }
}

// Fixed summation order keeps float totals identical however the store
// orders its results.
fn sort_by_id(docs: &mut [Document]) {
    docs.sort_by(|a, b| a.id.cmp(&b.id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::InMemoryStore;
    use crate::utils::error::TrackerError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::{json, Value};

    fn fixed_clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()))
    }

    async fn seeded(sessions: &[(&str, Value)]) -> (Arc<InMemoryStore>, Aggregator) {
        let store = Arc::new(InMemoryStore::new());
        for (employee_id, session) in sessions {
            store
                .insert_document(EMPLOYEES, employee_id, json!({"name": employee_id}))
                .await;
            store
                .insert_session(employee_id, session.clone())
                .await;
        }
        let aggregator = Aggregator::new(store.clone(), fixed_clock());
        (store, aggregator)
    }

    #[tokio::test]
    async fn test_hours_by_location_empty_store() {
        let store = Arc::new(InMemoryStore::new());
        let aggregator = Aggregator::new(store, fixed_clock());
        let totals = aggregator.hours_by_location().await.unwrap();
        assert!(totals.is_empty());
        assert_eq!(serde_json::to_value(&totals).unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_hours_by_location_groups_and_sums() {
        let (_, aggregator) = seeded(&[
            ("emp-1", json!({"location": "Room 101", "length": "2", "date": "2024-03-27"})),
            ("emp-1", json!({"location": "Room 102", "length": "3", "date": "2024-03-28"})),
            ("emp-2", json!({"location": "Room 101", "length": 1.5, "date": "2023-01-02"})),
        ])
        .await;

        let totals = aggregator.hours_by_location().await.unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals.get("Room 101"), Some(3.5));
        assert_eq!(totals.get("Room 102"), Some(3.0));
        assert_eq!(
            serde_json::to_value(&totals).unwrap(),
            json!({"Room 101": 3.5, "Room 102": 3})
        );
    }

    #[tokio::test]
    async fn test_missing_location_groups_under_unknown() {
        let (_, aggregator) = seeded(&[
            ("emp-1", json!({"length": "2"})),
            ("emp-2", json!({"length": "4", "location": ""})),
            ("emp-2", json!({"length": "1", "location": null})),
        ])
        .await;

        let totals = aggregator.hours_by_location().await.unwrap();
        assert_eq!(totals.0, BTreeMap::from([("Unknown".to_string(), 7.0)]));
    }

    #[tokio::test]
    async fn test_unusable_lengths_contribute_zero() {
        let (_, aggregator) = seeded(&[
            ("emp-1", json!({"location": "Lab", "length": "", "date": "2024-03-01"})),
            ("emp-1", json!({"location": "Lab", "length": null, "date": "2024-03-02"})),
            ("emp-1", json!({"location": "Lab", "length": "n/a", "date": "2024-03-03"})),
            ("emp-1", json!({"location": "Lab", "date": "2024-03-04"})),
            ("emp-1", json!({"location": "Lab", "length": "2", "date": "2024-03-05"})),
        ])
        .await;

        let totals = aggregator.hours_by_location().await.unwrap();
        assert_eq!(totals.get("Lab"), Some(2.0));

        let monthly = aggregator.monthly_hours("emp-1", Some(3), Some(2024)).await.unwrap();
        assert_eq!(monthly.total_hours, 2.0);
        let yearly = aggregator.yearly_hours("emp-1", Some(2024)).await.unwrap();
        assert_eq!(yearly.total_hours, 2.0);
    }

    #[tokio::test]
    async fn test_monthly_excludes_other_months() {
        let (_, aggregator) = seeded(&[
            ("emp-1", json!({"length": "2", "date": "2024-03-27"})),
            ("emp-1", json!({"length": "3", "date": "2024-03-28"})),
            ("emp-1", json!({"length": "7", "date": "2024-04-01"})),
            ("emp-1", json!({"length": "7", "date": "2024-02-29"})),
        ])
        .await;

        let monthly = aggregator.monthly_hours("emp-1", Some(3), Some(2024)).await.unwrap();
        assert_eq!(monthly.total_hours, 5.0);
        assert_eq!(
            serde_json::to_value(monthly).unwrap(),
            json!({"totalHours": 5})
        );
    }

    #[tokio::test]
    async fn test_yearly_and_monthly_for_same_data() {
        let (_, aggregator) = seeded(&[
            ("emp-1", json!({"length": "2", "date": "2024-03-27"})),
            ("emp-1", json!({"length": "3", "date": "2024-12-28"})),
        ])
        .await;

        let yearly = aggregator.yearly_hours("emp-1", Some(2024)).await.unwrap();
        assert_eq!(yearly.total_hours, 5.0);
        let monthly = aggregator.monthly_hours("emp-1", Some(3), Some(2024)).await.unwrap();
        assert_eq!(monthly.total_hours, 2.0);
    }

    #[tokio::test]
    async fn test_leap_year_boundaries() {
        let (_, aggregator) = seeded(&[
            ("emp-1", json!({"length": "1", "date": "2024-02-29"})),
            ("emp-1", json!({"length": "4", "date": "2023-03-01"})),
            ("emp-1", json!({"length": "2", "date": "2023-02-28"})),
        ])
        .await;

        let leap = aggregator.monthly_hours("emp-1", Some(2), Some(2024)).await.unwrap();
        assert_eq!(leap.total_hours, 1.0);
        let common = aggregator.monthly_hours("emp-1", Some(2), Some(2023)).await.unwrap();
        assert_eq!(common.total_hours, 2.0);
    }

    #[tokio::test]
    async fn test_unknown_employee_totals_zero() {
        let (_, aggregator) = seeded(&[("emp-1", json!({"length": "2", "date": "2024-03-27"}))]).await;

        let monthly = aggregator.monthly_hours("non-existent", Some(3), Some(2024)).await.unwrap();
        assert_eq!(monthly.total_hours, 0.0);
        let yearly = aggregator.yearly_hours("non-existent", None).await.unwrap();
        assert_eq!(yearly.total_hours, 0.0);
        assert_eq!(serde_json::to_value(yearly).unwrap(), json!({"totalHours": 0}));
    }

    #[tokio::test]
    async fn test_defaults_come_from_clock() {
        let (_, aggregator) = seeded(&[
            ("emp-1", json!({"length": "2", "date": "2024-03-01"})),
            ("emp-1", json!({"length": "3", "date": "2024-11-01"})),
            ("emp-1", json!({"length": "5", "date": "2023-03-10"})),
        ])
        .await;

        // clock says 2024-03-15
        let monthly = aggregator.monthly_hours("emp-1", None, None).await.unwrap();
        assert_eq!(monthly.total_hours, 2.0);
        let invalid = aggregator.monthly_hours("emp-1", Some(13), Some(0)).await.unwrap();
        assert_eq!(invalid.total_hours, 2.0);
        let yearly = aggregator.yearly_hours("emp-1", None).await.unwrap();
        assert_eq!(yearly.total_hours, 5.0);
        let last_year = aggregator.monthly_hours("emp-1", None, Some(2023)).await.unwrap();
        assert_eq!(last_year.total_hours, 5.0);
    }

    #[test]
    fn test_fractional_hours_serialize_as_float() {
        let total = TotalHours { total_hours: 2.5 };
        assert_eq!(serde_json::to_string(&total).unwrap(), r#"{"totalHours":2.5}"#);
    }

    struct FailingStore;

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn list_all(&self, collection: &str) -> Result<Vec<Document>> {
            Ok(vec![Document::new(format!("{}-1", collection), Default::default())])
        }

        async fn list_subcollection(&self, sub: Subcollection<'_>) -> Result<Vec<Document>> {
            Err(TrackerError::store("list", sub.path()))
        }

        async fn query_range(
            &self,
            sub: Subcollection<'_>,
            _filter: RangeFilter<'_>,
        ) -> Result<Vec<Document>> {
            Err(TrackerError::store("query", sub.path()))
        }

        async fn query_equals(
            &self,
            sub: Subcollection<'_>,
            _field: &str,
            _value: &Value,
        ) -> Result<Vec<Document>> {
            Err(TrackerError::store("query", sub.path()))
        }

        async fn get(&self, _collection: &str, _id: &str) -> Result<Option<Document>> {
            Ok(None)
        }

        async fn create(&self, collection: &str, _data: crate::domain::model::Fields) -> Result<Document> {
            Err(TrackerError::store("create", collection))
        }

        async fn create_in_subcollection(
            &self,
            sub: Subcollection<'_>,
            _data: crate::domain::model::Fields,
        ) -> Result<Document> {
            Err(TrackerError::store("create", sub.path()))
        }

        async fn merge(&self, collection: &str, _id: &str, _data: crate::domain::model::Fields) -> Result<()> {
            Err(TrackerError::store("merge", collection))
        }

        async fn delete(&self, collection: &str, _id: &str) -> Result<()> {
            Err(TrackerError::store("delete", collection))
        }

        async fn delete_in_subcollection(&self, sub: Subcollection<'_>, _id: &str) -> Result<()> {
            Err(TrackerError::store("delete", sub.path()))
        }
    }

    #[tokio::test]
    async fn test_store_fault_fails_whole_aggregation() {
        let aggregator = Aggregator::new(Arc::new(FailingStore), fixed_clock());
        let err = aggregator.hours_by_location().await.unwrap_err();
        assert!(matches!(err, TrackerError::StoreError { .. }));

        let err = aggregator.monthly_hours("emp-1", None, None).await.unwrap_err();
        assert!(matches!(err, TrackerError::StoreError { .. }));
    }
}
