//! HTTP handler functions for the ER congestion API.

use std::num::NonZeroU32;
use std::sync::Arc;

use actix_web::{HttpResponse, web};
use er_congestion_query::distinct_regions;
use er_congestion_query::markers::legend;
use er_congestion_query::view::{QueryInput, View};
use er_congestion_server_models::{
    ApiError, ApiHealth, ApiHospitalList, ApiMarkers, HospitalQueryParams, RowsParams,
};
use er_congestion_source::pipeline::Snapshot;

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/labels`
///
/// Returns every congestion label with its marker color and threshold.
pub async fn labels() -> HttpResponse {
    HttpResponse::Ok().json(legend())
}

/// `GET /api/regions`
///
/// Lists the distinct regions present in the current snapshot.
pub async fn regions(state: web::Data<AppState>, params: web::Query<RowsParams>) -> HttpResponse {
    match load_snapshot(&state, params.rows).await {
        Ok(snapshot) => HttpResponse::Ok().json(distinct_regions(&snapshot.rows)),
        Err(response) => response,
    }
}

/// `GET /api/hospitals`
///
/// Filtered hospitals in full-list order, plus recommendations when a
/// valid reference point is given.
pub async fn hospitals(
    state: web::Data<AppState>,
    params: web::Query<HospitalQueryParams>,
) -> HttpResponse {
    let params = params.into_inner();
    let snapshot = match load_snapshot(&state, params.rows).await {
        Ok(snapshot) => snapshot,
        Err(response) => return response,
    };

    let view = View::from_input(&snapshot.rows, query_input(params));
    HttpResponse::Ok().json(ApiHospitalList {
        fetched_at: snapshot.fetched_at,
        hospitals: view.hospitals,
        recommended: view.recommended,
        warning: view.warning,
    })
}

/// `GET /api/markers`
///
/// Map markers for the same filters as `/api/hospitals`.
pub async fn markers(
    state: web::Data<AppState>,
    params: web::Query<HospitalQueryParams>,
) -> HttpResponse {
    let params = params.into_inner();
    let snapshot = match load_snapshot(&state, params.rows).await {
        Ok(snapshot) => snapshot,
        Err(response) => return response,
    };

    let view = View::from_input(&snapshot.rows, query_input(params));
    HttpResponse::Ok().json(ApiMarkers {
        center: view.center,
        markers: view.markers,
        warning: view.warning,
    })
}

fn query_input(params: HospitalQueryParams) -> QueryInput {
    QueryInput {
        region: params.region,
        name: params.name,
        labels: params.labels,
        latitude: params.lat,
        longitude: params.lon,
    }
}

/// Resolves the row limit and reads a snapshot, mapping failures to the
/// response that should be returned instead.
///
/// Requests may ask for fewer rows than configured, never more.
async fn load_snapshot(state: &AppState, rows: Option<u32>) -> Result<Arc<Snapshot>, HttpResponse> {
    let row_limit = match rows.map(NonZeroU32::new) {
        None => state.default_rows,
        Some(Some(rows)) if rows <= state.default_rows => rows,
        Some(_) => {
            return Err(HttpResponse::BadRequest().json(ApiError {
                error: format!("rows must be between 1 and {}", state.default_rows),
            }));
        }
    };

    state.cache.get(row_limit).await.map_err(|e| {
        log::error!("Failed to refresh hospital data: {e}");
        HttpResponse::BadGateway().json(ApiError {
            error: e.to_string(),
        })
    })
}
