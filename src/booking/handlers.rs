use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::auth::handlers::internal;
use crate::booking::dto::{CreateBookingRequest, CreatedBookingResponse};
use crate::booking::repo::Booking;
use crate::booking::slots;
use crate::booking::wizard::{BookingWizard, WizardError};
use crate::catalog::repo::{Doctor, Service};
use crate::clock::{format_date, parse_date};
use crate::state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/slots", get(list_slots))
}

#[instrument]
pub async fn list_slots() -> Json<Vec<String>> {
    Json(slots::time_slots())
}

/// Drives a fresh wizard through all four steps. The first failing rule
/// aborts with a 400 naming the field, exactly as the inline form errors did.
#[instrument(skip(state, payload))]
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, HeaderMap, Json<CreatedBookingResponse>), (StatusCode, String)> {
    let store = state.store.as_ref();
    let clock = state.clock.as_ref();

    let services = Service::list(store).await;
    let doctors = Doctor::list(store).await;

    let service = services
        .iter()
        .find(|s| s.id == payload.service_id)
        .ok_or_else(|| step_error(WizardError::MissingService))?;
    let doctor = doctors
        .iter()
        .find(|d| d.id == payload.doctor_id)
        .ok_or_else(|| step_error(WizardError::MissingDoctor))?;

    let mut wizard = BookingWizard::new();
    wizard.select_service(service, &doctors);
    wizard.select_doctor(doctor).map_err(step_error)?;
    wizard.next_step(clock, &doctors).map_err(step_error)?;

    let date = parse_date(&payload.date)
        .ok_or((StatusCode::BAD_REQUEST, "Invalid date, expected YYYY-MM-DD".to_string()))?;
    wizard.set_schedule(date, &payload.time);
    wizard.next_step(clock, &doctors).map_err(step_error)?;

    wizard.set_contact(
        &payload.full_name,
        &payload.phone,
        &payload.email,
        &payload.notes,
    );
    wizard.next_step(clock, &doctors).map_err(step_error)?;

    wizard.set_terms(payload.accept_terms);
    let booking = wizard.submit(clock).map_err(step_error)?;
    let booking = Booking::insert(store, clock, booking)
        .await
        .map_err(internal)?;
    info!(id = %booking.id, "booking created");

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/admin/bookings/{}", booking.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }

    Ok((
        StatusCode::CREATED,
        headers,
        Json(CreatedBookingResponse {
            id: booking.id,
            confirmation_code: booking.confirmation_code,
            status: booking.status,
            date: format_date(booking.date),
            time: booking.time,
            total_price: booking.total_price,
        }),
    ))
}

fn step_error(e: WizardError) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::repo::BookingStatus;
    use time::Duration;

    fn request(state: &AppState) -> CreateBookingRequest {
        let date = state.clock.today() + Duration::days(2);
        CreateBookingRequest {
            service_id: 1,
            doctor_id: 1,
            date: format_date(date),
            time: "10:30".into(),
            full_name: "Test".into(),
            phone: "0512345678".into(),
            email: "a@b.com".into(),
            notes: String::new(),
            accept_terms: true,
        }
    }

    #[tokio::test]
    async fn end_to_end_booking_is_pending_with_code() {
        let state = AppState::fake();
        let (status, _, Json(created)) =
            create_booking(State(state.clone()), Json(request(&state)))
                .await
                .expect("created");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.status, BookingStatus::Pending);
        assert_eq!(created.time, "10:30");
        assert_eq!(created.confirmation_code.len(), 6);

        let stored = Booking::list(state.store.as_ref()).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, created.id);
    }

    #[tokio::test]
    async fn unknown_doctor_for_service_is_rejected() {
        let state = AppState::fake();
        let mut payload = request(&state);
        payload.doctor_id = 3; // seed doctor 3 does not offer service 1
        let (status, message) = create_booking(State(state), Json(payload))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("doctor"));
    }

    #[tokio::test]
    async fn same_day_date_is_rejected() {
        let state = AppState::fake();
        let mut payload = request(&state);
        payload.date = format_date(state.clock.today());
        let (status, _) = create_booking(State(state), Json(payload))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn terms_must_be_accepted() {
        let state = AppState::fake();
        let mut payload = request(&state);
        payload.accept_terms = false;
        let (status, message) = create_booking(State(state.clone()), Json(payload))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("terms"));
        assert!(Booking::list(state.store.as_ref()).await.is_empty());
    }
}
