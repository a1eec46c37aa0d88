use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::auth::extractors::AdminSession;
use crate::auth::handlers::internal;
use crate::catalog::dto::{DoctorForm, DoctorQuery, SearchQuery, ServiceForm};
use crate::catalog::repo::{Doctor, Service};
use crate::state::AppState;

/// Read-only routes for the booking widget.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/services", get(list_services))
        .route("/doctors", get(list_doctors))
}

/// Session-guarded catalog management for the dashboard.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/services", get(search_services).post(create_service))
        .route(
            "/admin/services/:id",
            put(update_service).delete(delete_service),
        )
        .route("/admin/doctors", get(search_doctors).post(create_doctor))
        .route(
            "/admin/doctors/:id",
            put(update_doctor).delete(delete_doctor),
        )
}

#[instrument(skip(state))]
pub async fn list_services(State(state): State<AppState>) -> Json<Vec<Service>> {
    Json(Service::list(state.store.as_ref()).await)
}

/// With `?service_id=` the list is pre-filtered to doctors offering that
/// service, which is what the wizard's doctor dropdown shows.
#[instrument(skip(state))]
pub async fn list_doctors(
    State(state): State<AppState>,
    Query(query): Query<DoctorQuery>,
) -> Json<Vec<Doctor>> {
    let doctors = Doctor::list(state.store.as_ref()).await;
    let doctors = match query.service_id {
        Some(service_id) => doctors
            .into_iter()
            .filter(|d| d.offers(service_id))
            .collect(),
        None => doctors,
    };
    Json(doctors)
}

#[instrument(skip(state))]
pub async fn search_services(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Service>> {
    let services = Service::list(state.store.as_ref()).await;
    let services = match query.q.as_deref() {
        Some(term) if !term.is_empty() => Service::search(&services, term),
        _ => services,
    };
    Json(services)
}

#[instrument(skip(state, form))]
pub async fn create_service(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Json(form): Json<ServiceForm>,
) -> Result<(StatusCode, Json<Service>), (StatusCode, String)> {
    form.validate().map_err(bad_request)?;
    let service = Service::create(state.store.as_ref(), state.clock.as_ref(), form)
        .await
        .map_err(internal)?;
    info!(id = service.id, "service added");
    Ok((StatusCode::CREATED, Json(service)))
}

#[instrument(skip(state, form))]
pub async fn update_service(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<u32>,
    Json(form): Json<ServiceForm>,
) -> Result<Json<Service>, (StatusCode, String)> {
    form.validate().map_err(bad_request)?;
    match Service::update(state.store.as_ref(), state.clock.as_ref(), id, form)
        .await
        .map_err(internal)?
    {
        Some(service) => Ok(Json(service)),
        None => Err((StatusCode::NOT_FOUND, "Service not found".into())),
    }
}

#[instrument(skip(state))]
pub async fn delete_service(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<u32>,
) -> Result<StatusCode, (StatusCode, String)> {
    if Service::delete(state.store.as_ref(), id).await.map_err(internal)? {
        info!(id, "service deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Service not found".into()))
    }
}

#[instrument(skip(state))]
pub async fn search_doctors(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Doctor>> {
    let doctors = Doctor::list(state.store.as_ref()).await;
    let doctors = match query.q.as_deref() {
        Some(term) if !term.is_empty() => Doctor::search(&doctors, term),
        _ => doctors,
    };
    Json(doctors)
}

#[instrument(skip(state, form))]
pub async fn create_doctor(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Json(form): Json<DoctorForm>,
) -> Result<(StatusCode, Json<Doctor>), (StatusCode, String)> {
    form.validate().map_err(bad_request)?;
    let doctor = Doctor::create(state.store.as_ref(), state.clock.as_ref(), form)
        .await
        .map_err(internal)?;
    info!(id = doctor.id, "doctor added");
    Ok((StatusCode::CREATED, Json(doctor)))
}

#[instrument(skip(state, form))]
pub async fn update_doctor(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<u32>,
    Json(form): Json<DoctorForm>,
) -> Result<Json<Doctor>, (StatusCode, String)> {
    form.validate().map_err(bad_request)?;
    match Doctor::update(state.store.as_ref(), state.clock.as_ref(), id, form)
        .await
        .map_err(internal)?
    {
        Some(doctor) => Ok(Json(doctor)),
        None => Err((StatusCode::NOT_FOUND, "Doctor not found".into())),
    }
}

#[instrument(skip(state))]
pub async fn delete_doctor(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<u32>,
) -> Result<StatusCode, (StatusCode, String)> {
    if Doctor::delete(state.store.as_ref(), id).await.map_err(internal)? {
        info!(id, "doctor deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Doctor not found".into()))
    }
}

fn bad_request(message: String) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, message)
}
