use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::admin::settings::{ClinicSettings, WorkingHours};
use crate::admin::view::PageInfo;
use crate::booking::repo::Booking;
use crate::catalog::repo::{Doctor, Service};

pub const EXPORT_VERSION: &str = "1.0.0";

#[derive(Debug, Default, Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    /// `YYYY-MM-DD`.
    pub date: Option<String>,
    pub search: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsPage {
    pub bookings: Vec<Booking>,
    #[serde(flatten)]
    pub page: PageInfo,
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: String,
}

/// A booking joined with the current catalog rows. A deleted row renders as
/// "Unknown"; the names captured at booking time stay on the record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub current_service_name: String,
    pub current_doctor_name: String,
}

/// Everything the store holds, bundled for download.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub export_version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub export_date: OffsetDateTime,
    pub bookings: Vec<Booking>,
    pub services: Vec<Service>,
    pub doctors: Vec<Doctor>,
    pub settings: ClinicSettings,
    pub working_hours: WorkingHours,
}
