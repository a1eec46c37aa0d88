use rand::Rng;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::clock::Clock;
use crate::store::{keys, load, save, KvStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

/// A patient's requested appointment. Service and doctor names are captured
/// at booking time; the referenced catalog rows may be edited or deleted
/// afterwards without touching existing bookings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub confirmation_code: String,
    pub service_id: u32,
    pub service_name: String,
    pub doctor_id: u32,
    pub doctor_name: String,
    #[serde(with = "crate::clock::iso_date")]
    pub date: Date,
    pub time: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub notes: String,
    pub status: BookingStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    pub total_price: u32,
}

const CODE_CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn random_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CODE_CHARS[rng.gen_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// `DC-<last six digits of epoch millis>-<four random characters>`.
pub fn new_booking_id(clock: &dyn Clock) -> String {
    let millis = clock.now_millis().to_string();
    let tail = &millis[millis.len().saturating_sub(6)..];
    format!("DC-{tail}-{}", random_code(4))
}

/// Six-character uppercase alphanumeric token shown to the patient.
pub fn new_confirmation_code() -> String {
    random_code(6)
}

impl Booking {
    pub async fn list(store: &dyn KvStore) -> Vec<Booking> {
        load(store, keys::BOOKINGS).await
    }

    pub async fn find(store: &dyn KvStore, id: &str) -> Option<Booking> {
        Self::list(store).await.into_iter().find(|b| b.id == id)
    }

    /// Prepends the booking, newest first. The id is re-rolled on the rare
    /// collision so ids are unique at insertion time.
    pub async fn insert(
        store: &dyn KvStore,
        clock: &dyn Clock,
        mut booking: Booking,
    ) -> anyhow::Result<Booking> {
        let mut bookings = Self::list(store).await;
        while bookings.iter().any(|b| b.id == booking.id) {
            booking.id = new_booking_id(clock);
        }
        bookings.insert(0, booking.clone());
        save(store, keys::BOOKINGS, &bookings).await?;
        Ok(booking)
    }

    /// Idempotent by id: setting the same status twice leaves the record in
    /// the same state apart from the refreshed timestamp.
    pub async fn set_status(
        store: &dyn KvStore,
        clock: &dyn Clock,
        id: &str,
        status: BookingStatus,
    ) -> anyhow::Result<Option<Booking>> {
        let mut bookings = Self::list(store).await;
        let booking = match bookings.iter_mut().find(|b| b.id == id) {
            Some(booking) => booking,
            None => return Ok(None),
        };
        booking.status = status;
        booking.updated_at = Some(clock.now());
        let updated = booking.clone();
        save(store, keys::BOOKINGS, &bookings).await?;
        Ok(Some(updated))
    }

    pub async fn delete(store: &dyn KvStore, id: &str) -> anyhow::Result<bool> {
        let mut bookings = Self::list(store).await;
        let before = bookings.len();
        bookings.retain(|b| b.id != id);
        if bookings.len() == before {
            return Ok(false);
        }
        save(store, keys::BOOKINGS, &bookings).await?;
        Ok(true)
    }
}
