//! Read-only metrics dashboard
//!
//! A companion API over the same store: bulk-exports user records on a
//! bounded cache interval and serves presentation-layer aggregations.
//! No real-time requirement; chart rendering is the consumer's problem.

pub mod aggregate;

use aggregate::{DailyCount, Distribution, Totals, UserEngagement};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::db::{Database, UserRecord};

/// How long one `all_users` export is served before refreshing
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Default date range width for range-filtered endpoints
const DEFAULT_RANGE_DAYS: u64 = 30;

/// Shared dashboard state: the store handle plus the cached export
pub struct DashboardState {
    db: Database,
    cache: Mutex<Option<CachedUsers>>,
    ttl: Duration,
}

struct CachedUsers {
    fetched_at: Instant,
    users: Arc<Vec<UserRecord>>,
}

impl DashboardState {
    pub fn new(db: Database) -> Self {
        Self::with_ttl(db, CACHE_TTL)
    }

    pub fn with_ttl(db: Database, ttl: Duration) -> Self {
        Self {
            db,
            cache: Mutex::new(None),
            ttl,
        }
    }

    /// The user export, refreshed when the cache interval has elapsed
    fn users(&self) -> Result<Arc<Vec<UserRecord>>, String> {
        let mut cache = self.cache.lock().unwrap();
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                return Ok(cached.users.clone());
            }
        }

        let users = Arc::new(self.db.all_users().map_err(|e| e.to_string())?);
        tracing::debug!(users = users.len(), "Refreshed dashboard export");
        *cache = Some(CachedUsers {
            fetched_at: Instant::now(),
            users: users.clone(),
        });
        Ok(users)
    }
}

/// Create the dashboard router
pub fn create_router(state: Arc<DashboardState>) -> Router {
    Router::new()
        .route("/api/overview", get(overview))
        .route("/api/activity/daily", get(activity_daily))
        .route("/api/activity/distribution", get(activity_distribution))
        .route("/api/engagement", get(engagement))
        .with_state(state)
}

/// Selectable date range, defaulting to the trailing 30 days
#[derive(Debug, Deserialize)]
struct RangeQuery {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl RangeQuery {
    fn resolve(&self) -> (NaiveDate, NaiveDate) {
        let to = self.to.unwrap_or_else(|| Utc::now().date_naive());
        let from = self
            .from
            .unwrap_or_else(|| to - Days::new(DEFAULT_RANGE_DAYS));
        (from, to)
    }
}

#[derive(Debug, Serialize)]
struct OverviewResponse {
    totals: Totals,
}

async fn overview(
    State(state): State<Arc<DashboardState>>,
) -> Result<Json<OverviewResponse>, DashboardError> {
    let users = state.users().map_err(DashboardError)?;
    Ok(Json(OverviewResponse {
        totals: aggregate::totals(&users),
    }))
}

#[derive(Debug, Serialize)]
struct DailyResponse {
    from: NaiveDate,
    to: NaiveDate,
    daily: Vec<DailyCount>,
}

async fn activity_daily(
    State(state): State<Arc<DashboardState>>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<DailyResponse>, DashboardError> {
    let users = state.users().map_err(DashboardError)?;
    let (from, to) = range.resolve();
    Ok(Json(DailyResponse {
        from,
        to,
        daily: aggregate::daily_counts(&users, from, to),
    }))
}

#[derive(Debug, Serialize)]
struct DistributionResponse {
    from: NaiveDate,
    to: NaiveDate,
    distribution: Distribution,
}

async fn activity_distribution(
    State(state): State<Arc<DashboardState>>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<DistributionResponse>, DashboardError> {
    let users = state.users().map_err(DashboardError)?;
    let (from, to) = range.resolve();
    Ok(Json(DistributionResponse {
        from,
        to,
        distribution: aggregate::distribution(&users, from, to),
    }))
}

#[derive(Debug, Serialize)]
struct EngagementResponse {
    engagement: Vec<UserEngagement>,
}

async fn engagement(
    State(state): State<Arc<DashboardState>>,
) -> Result<Json<EngagementResponse>, DashboardError> {
    let users = state.users().map_err(DashboardError)?;
    Ok(Json(EngagementResponse {
        engagement: aggregate::engagement(&users),
    }))
}

/// Store failures surface as a plain 500
#[derive(Debug)]
struct DashboardError(String);

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.0 })),
        )
            .into_response()
    }
}
