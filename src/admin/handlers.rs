use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};

use crate::admin::dto::{
    BackupDocument, BookingDetails, BookingsPage, BookingsQuery, StatusChangeRequest,
    EXPORT_VERSION,
};
use crate::admin::settings::{ClinicSettings, WorkingHours};
use crate::admin::view::{self, BookingFilter, BookingStats};
use crate::auth::extractors::AdminSession;
use crate::auth::handlers::internal;
use crate::booking::repo::{Booking, BookingStatus};
use crate::catalog::repo::{Doctor, Service};
use crate::clock::parse_date;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/bookings", get(list_bookings))
        .route(
            "/admin/bookings/:id",
            get(get_booking).delete(delete_booking),
        )
        .route("/admin/bookings/:id/status", patch(change_status))
        .route("/admin/stats", get(get_stats))
        .route("/admin/settings", get(get_settings).put(put_settings))
        .route("/admin/hours", get(get_hours).put(put_hours))
        .route("/admin/export", get(export_backup))
}

/// Filter first, then paginate the filtered list. Order is the stored order,
/// which keeps the newest booking on top of page one.
#[instrument(skip(state))]
pub async fn list_bookings(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<BookingsPage>, (StatusCode, String)> {
    let filter = parse_filter(&query)?;
    let bookings = Booking::list(state.store.as_ref()).await;
    let filtered = view::filter_bookings(&bookings, &filter);

    let page = query.page.unwrap_or(1);
    let info = view::paginate(filtered.len(), page)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(BookingsPage {
        bookings: view::page_slice(&filtered, info.page).to_vec(),
        page: info,
    }))
}

#[instrument(skip(state))]
pub async fn get_booking(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
) -> Result<Json<BookingDetails>, (StatusCode, String)> {
    let store = state.store.as_ref();
    let booking = Booking::find(store, &id)
        .await
        .ok_or((StatusCode::NOT_FOUND, "Booking not found".to_string()))?;

    let current_service_name = Service::find(store, booking.service_id)
        .await
        .map(|s| s.name)
        .unwrap_or_else(|| "Unknown".to_string());
    let current_doctor_name = Doctor::find(store, booking.doctor_id)
        .await
        .map(|d| d.name)
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(Json(BookingDetails {
        booking,
        current_service_name,
        current_doctor_name,
    }))
}

#[instrument(skip(state, payload))]
pub async fn change_status(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
    Json(payload): Json<StatusChangeRequest>,
) -> Result<Json<Booking>, (StatusCode, String)> {
    let status = BookingStatus::parse(&payload.status).ok_or((
        StatusCode::BAD_REQUEST,
        format!("Unknown status '{}'", payload.status),
    ))?;

    match Booking::set_status(state.store.as_ref(), state.clock.as_ref(), &id, status)
        .await
        .map_err(internal)?
    {
        Some(booking) => {
            info!(id = %booking.id, status = status.as_str(), "booking status changed");
            Ok(Json(booking))
        }
        None => Err((StatusCode::NOT_FOUND, "Booking not found".into())),
    }
}

#[instrument(skip(state))]
pub async fn delete_booking(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    if Booking::delete(state.store.as_ref(), &id)
        .await
        .map_err(internal)?
    {
        info!(%id, "booking deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Booking not found".into()))
    }
}

#[instrument(skip(state))]
pub async fn get_stats(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
) -> Json<BookingStats> {
    let bookings = Booking::list(state.store.as_ref()).await;
    Json(view::stats(&bookings))
}

#[instrument(skip(state))]
pub async fn get_settings(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
) -> Json<ClinicSettings> {
    Json(ClinicSettings::load(state.store.as_ref()).await)
}

#[instrument(skip(state, payload))]
pub async fn put_settings(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Json(payload): Json<ClinicSettings>,
) -> Result<Json<ClinicSettings>, (StatusCode, String)> {
    if payload.clinic_name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Clinic name is required".into()));
    }
    let saved = ClinicSettings::store(state.store.as_ref(), state.clock.as_ref(), payload)
        .await
        .map_err(internal)?;
    info!("clinic settings updated");
    Ok(Json(saved))
}

#[instrument(skip(state))]
pub async fn get_hours(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
) -> Json<WorkingHours> {
    Json(WorkingHours::load(state.store.as_ref()).await)
}

#[instrument(skip(state, payload))]
pub async fn put_hours(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Json(payload): Json<WorkingHours>,
) -> Result<Json<WorkingHours>, (StatusCode, String)> {
    WorkingHours::store(state.store.as_ref(), &payload)
        .await
        .map_err(internal)?;
    info!("working hours updated");
    Ok(Json(payload))
}

/// Bundles every stored collection into a single versioned document the
/// dashboard offers as a JSON download.
#[instrument(skip(state))]
pub async fn export_backup(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
) -> Json<BackupDocument> {
    let store = state.store.as_ref();
    Json(BackupDocument {
        export_version: EXPORT_VERSION,
        export_date: state.clock.now(),
        bookings: Booking::list(store).await,
        services: Service::list(store).await,
        doctors: Doctor::list(store).await,
        settings: ClinicSettings::load(store).await,
        working_hours: WorkingHours::load(store).await,
    })
}

fn parse_filter(query: &BookingsQuery) -> Result<BookingFilter, (StatusCode, String)> {
    let status = match query.status.as_deref() {
        Some(s) if !s.is_empty() => Some(BookingStatus::parse(s).ok_or((
            StatusCode::BAD_REQUEST,
            format!("Unknown status '{s}'"),
        ))?),
        _ => None,
    };
    let date = match query.date.as_deref() {
        Some(d) if !d.is_empty() => Some(parse_date(d).ok_or((
            StatusCode::BAD_REQUEST,
            "Invalid date, expected YYYY-MM-DD".to_string(),
        ))?),
        _ => None,
    };
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    Ok(BookingFilter {
        status,
        date,
        search,
    })
}
