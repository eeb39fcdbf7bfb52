use crate::app::error::{ApiError, ApiResultExt};
use crate::app::AppState;
use crate::core::aggregator::{LocationHours, TotalHours};
use crate::core::period::parse_loose_int;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/training-hours-by-location", get(hours_by_location))
        .route("/employee-hours/{employee_id}/monthly", get(monthly_hours))
        .route("/employee-hours/{employee_id}/yearly", get(yearly_hours))
}

/// Period parameters read from the raw query pairs. A repeated key keeps its
/// first value; unparseable values fall back to the current period.
#[derive(Debug, Default, PartialEq)]
pub struct PeriodQuery {
    pub month: Option<i64>,
    pub year: Option<i64>,
}

impl PeriodQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.as_str())
        };
        Self {
            month: parse_loose_int(first("month")),
            year: parse_loose_int(first("year")),
        }
    }
}

async fn hours_by_location(State(state): State<AppState>) -> Result<Json<LocationHours>, ApiError> {
    let totals = state
        .aggregator
        .hours_by_location()
        .await
        .or_fail("Failed to fetch training hours by location")?;
    Ok(Json(totals))
}

async fn monthly_hours(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<TotalHours>, ApiError> {
    let period = PeriodQuery::from_pairs(&pairs);

    let total = state
        .aggregator
        .monthly_hours(&employee_id, period.month, period.year)
        .await
        .or_fail("Failed to fetch monthly training hours")?;
    Ok(Json(total))
}

async fn yearly_hours(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<TotalHours>, ApiError> {
    let period = PeriodQuery::from_pairs(&pairs);

    let total = state
        .aggregator
        .yearly_hours(&employee_id, period.year)
        .await
        .or_fail("Failed to fetch yearly training hours")?;
    Ok(Json(total))
}
