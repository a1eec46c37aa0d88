use serde::Serialize;
use thiserror::Error;
use time::Date;

use crate::booking::repo::{Booking, BookingStatus};

pub const PAGE_SIZE: usize = 10;
/// Up to five page buttons, kept centered on the current page.
pub const PAGE_WINDOW: usize = 5;

#[derive(Debug, Default, Clone)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub date: Option<Date>,
    pub search: Option<String>,
}

impl BookingFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.date.is_none() && self.search.is_none()
    }
}

/// Applies all active criteria, preserving the original relative order.
/// The free-text term matches name, phone, email and id, case-insensitively.
pub fn filter_bookings(bookings: &[Booking], filter: &BookingFilter) -> Vec<Booking> {
    let search = filter.search.as_ref().map(|s| s.to_lowercase());
    bookings
        .iter()
        .filter(|b| match filter.status {
            Some(status) => b.status == status,
            None => true,
        })
        .filter(|b| match filter.date {
            Some(date) => b.date == date,
            None => true,
        })
        .filter(|b| match &search {
            Some(term) => {
                b.full_name.to_lowercase().contains(term)
                    || b.phone.contains(term)
                    || b.email.to_lowercase().contains(term)
                    || b.id.to_lowercase().contains(term)
            }
            None => true,
        })
        .cloned()
        .collect()
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Page {page} is out of range (1..={page_count})")]
pub struct PageOutOfRange {
    pub page: usize,
    pub page_count: usize,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
    /// Page numbers the pagination bar shows.
    pub window: Vec<usize>,
}

/// `page_count` is `ceil(total / PAGE_SIZE)`; page 0 and anything past the
/// last page are rejected without effect. An empty collection still answers
/// page 1 so the dashboard renders its empty state.
pub fn paginate(total: usize, page: usize) -> Result<PageInfo, PageOutOfRange> {
    let page_count = total.div_ceil(PAGE_SIZE);
    if total == 0 {
        return if page == 1 {
            Ok(PageInfo {
                page: 1,
                page_count: 0,
                total: 0,
                window: Vec::new(),
            })
        } else {
            Err(PageOutOfRange { page, page_count })
        };
    }
    if page < 1 || page > page_count {
        return Err(PageOutOfRange { page, page_count });
    }
    Ok(PageInfo {
        page,
        page_count,
        total,
        window: page_window(page, page_count),
    })
}

/// Start at two pages before the current one, clamp to the valid range, and
/// backfill from the end so the window stays five wide when possible.
fn page_window(page: usize, page_count: usize) -> Vec<usize> {
    let mut start = page.saturating_sub(PAGE_WINDOW / 2).max(1);
    let end = (start + PAGE_WINDOW - 1).min(page_count);
    if end + 1 - start < PAGE_WINDOW {
        start = end.saturating_sub(PAGE_WINDOW - 1).max(1);
    }
    (start..=end).collect()
}

pub fn page_slice(items: &[Booking], page: usize) -> &[Booking] {
    let start = (page - 1) * PAGE_SIZE;
    let end = (start + PAGE_SIZE).min(items.len());
    if start >= items.len() {
        &[]
    } else {
        &items[start..end]
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingStats {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub cancelled: usize,
    pub completed: usize,
}

pub fn stats(bookings: &[Booking]) -> BookingStats {
    let count = |status| bookings.iter().filter(|b| b.status == status).count();
    BookingStats {
        total: bookings.len(),
        pending: count(BookingStatus::Pending),
        confirmed: count(BookingStatus::Confirmed),
        cancelled: count(BookingStatus::Cancelled),
        completed: count(BookingStatus::Completed),
    }
}
