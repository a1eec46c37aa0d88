use serde::{Deserialize, Serialize};

use crate::booking::repo::BookingStatus;

/// Everything the four-step form collects, submitted in one request. The
/// handler replays it through the wizard so each step's rule fires in order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub service_id: u32,
    pub doctor_id: u32,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Half-hour slot, e.g. `10:30`.
    pub time: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub accept_terms: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBookingResponse {
    pub id: String,
    pub confirmation_code: String,
    pub status: BookingStatus,
    pub date: String,
    pub time: String,
    pub total_price: u32,
}
