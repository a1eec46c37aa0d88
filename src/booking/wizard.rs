use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use time::{Date, Duration};

use crate::booking::repo::{new_booking_id, new_confirmation_code, Booking, BookingStatus};
use crate::booking::slots;
use crate::catalog::repo::{Doctor, Service};
use crate::clock::Clock;

/// Saudi mobile numbers: 05 followed by eight digits.
pub fn is_valid_phone(phone: &str) -> bool {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^05\d{8}$").unwrap();
    }
    PHONE_RE.is_match(phone)
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// One error per failing field so the form can point at it. Every variant is
/// recoverable; the wizard stays on the failing step.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Please choose a service")]
    MissingService,
    #[error("Please choose a doctor")]
    MissingDoctor,
    #[error("The chosen doctor does not offer this service")]
    DoctorServiceMismatch,
    #[error("Please choose an appointment date")]
    MissingDate,
    #[error("Appointments must be booked at least one day in advance")]
    DateTooSoon,
    #[error("Please choose an appointment time")]
    MissingTime,
    #[error("The chosen time is outside working hours")]
    InvalidTime,
    #[error("Please enter your full name")]
    MissingName,
    #[error("Please enter a valid phone number (05 followed by 8 digits)")]
    InvalidPhone,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please accept the terms and conditions")]
    TermsNotAccepted,
    #[error("Booking can only be submitted from the confirmation step")]
    NotAtConfirmStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    ServiceDoctor,
    DateTime,
    Contact,
    Confirm,
}

impl WizardStep {
    pub fn number(self) -> u8 {
        match self {
            WizardStep::ServiceDoctor => 1,
            WizardStep::DateTime => 2,
            WizardStep::Contact => 3,
            WizardStep::Confirm => 4,
        }
    }

    fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::ServiceDoctor => Some(WizardStep::DateTime),
            WizardStep::DateTime => Some(WizardStep::Contact),
            WizardStep::Contact => Some(WizardStep::Confirm),
            WizardStep::Confirm => None,
        }
    }

    fn prev(self) -> Option<WizardStep> {
        match self {
            WizardStep::ServiceDoctor => None,
            WizardStep::DateTime => Some(WizardStep::ServiceDoctor),
            WizardStep::Contact => Some(WizardStep::DateTime),
            WizardStep::Confirm => Some(WizardStep::Contact),
        }
    }
}

/// Working data collected across the steps. Nothing here is discarded by
/// moving backward; only a submit or an explicit reset clears it.
#[derive(Debug, Default, Clone)]
pub struct WizardData {
    pub service_id: Option<u32>,
    pub service_name: Option<String>,
    pub service_price: Option<u32>,
    pub doctor_id: Option<u32>,
    pub doctor_name: Option<String>,
    pub date: Option<Date>,
    pub time: Option<String>,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub notes: String,
    pub terms_accepted: bool,
}

/// Strictly linear four-step booking flow. Forward moves are gated by the
/// current step's validation; backward moves are always allowed.
#[derive(Debug)]
pub struct BookingWizard {
    step: WizardStep,
    data: WizardData,
}

impl Default for BookingWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingWizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::ServiceDoctor,
            data: WizardData::default(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn data(&self) -> &WizardData {
        &self.data
    }

    /// Doctors eligible for the currently selected service; empty until a
    /// service is chosen. This is the subset the doctor dropdown offers.
    pub fn available_doctors<'a>(&self, doctors: &'a [Doctor]) -> Vec<&'a Doctor> {
        match self.data.service_id {
            Some(service_id) => doctors.iter().filter(|d| d.offers(service_id)).collect(),
            None => Vec::new(),
        }
    }

    /// Selecting a service re-filters the doctor list. A previously chosen
    /// doctor who does not offer the new service is cleared; a stale
    /// doctor-service pairing must never survive.
    pub fn select_service(&mut self, service: &Service, doctors: &[Doctor]) {
        self.data.service_id = Some(service.id);
        self.data.service_name = Some(service.name.clone());
        self.data.service_price = Some(service.price);

        if let Some(doctor_id) = self.data.doctor_id {
            let still_eligible = doctors
                .iter()
                .any(|d| d.id == doctor_id && d.offers(service.id));
            if !still_eligible {
                self.data.doctor_id = None;
                self.data.doctor_name = None;
            }
        }
    }

    pub fn select_doctor(&mut self, doctor: &Doctor) -> Result<(), WizardError> {
        let service_id = self.data.service_id.ok_or(WizardError::MissingService)?;
        if !doctor.offers(service_id) {
            return Err(WizardError::DoctorServiceMismatch);
        }
        self.data.doctor_id = Some(doctor.id);
        self.data.doctor_name = Some(doctor.name.clone());
        Ok(())
    }

    pub fn set_schedule(&mut self, date: Date, time: &str) {
        self.data.date = Some(date);
        self.data.time = Some(time.to_string());
    }

    pub fn set_contact(&mut self, full_name: &str, phone: &str, email: &str, notes: &str) {
        self.data.full_name = full_name.trim().to_string();
        self.data.phone = phone.trim().to_string();
        self.data.email = email.trim().to_string();
        self.data.notes = notes.trim().to_string();
    }

    pub fn set_terms(&mut self, accepted: bool) {
        self.data.terms_accepted = accepted;
    }

    /// Validates the current step and advances on success. On failure the
    /// machine stays in place and the error names the offending field.
    pub fn next_step(
        &mut self,
        clock: &dyn Clock,
        doctors: &[Doctor],
    ) -> Result<WizardStep, WizardError> {
        let current = self.step;
        self.validate_step(current, clock, doctors)?;
        if let Some(next) = current.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Backward moves never discard entered data.
    pub fn prev_step(&mut self) -> WizardStep {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        self.step
    }

    pub fn validate_step(
        &self,
        step: WizardStep,
        clock: &dyn Clock,
        doctors: &[Doctor],
    ) -> Result<(), WizardError> {
        match step {
            WizardStep::ServiceDoctor => {
                let service_id = self.data.service_id.ok_or(WizardError::MissingService)?;
                let doctor_id = self.data.doctor_id.ok_or(WizardError::MissingDoctor)?;
                let eligible = doctors
                    .iter()
                    .any(|d| d.id == doctor_id && d.offers(service_id));
                if !eligible {
                    return Err(WizardError::DoctorServiceMismatch);
                }
                Ok(())
            }
            WizardStep::DateTime => {
                let date = self.data.date.ok_or(WizardError::MissingDate)?;
                let tomorrow = clock.today() + Duration::days(1);
                if date < tomorrow {
                    return Err(WizardError::DateTooSoon);
                }
                let time = self.data.time.as_deref().ok_or(WizardError::MissingTime)?;
                if time.is_empty() {
                    return Err(WizardError::MissingTime);
                }
                if !slots::is_valid_slot(time) {
                    return Err(WizardError::InvalidTime);
                }
                Ok(())
            }
            WizardStep::Contact => {
                if self.data.full_name.is_empty() {
                    return Err(WizardError::MissingName);
                }
                if !is_valid_phone(&self.data.phone) {
                    return Err(WizardError::InvalidPhone);
                }
                if !is_valid_email(&self.data.email) {
                    return Err(WizardError::InvalidEmail);
                }
                Ok(())
            }
            WizardStep::Confirm => {
                if !self.data.terms_accepted {
                    return Err(WizardError::TermsNotAccepted);
                }
                Ok(())
            }
        }
    }

    /// Terminal action. Only valid on the confirmation step, with terms
    /// acceptance re-checked. Builds the pending booking and resets the
    /// machine to step 1 with cleared data.
    pub fn submit(&mut self, clock: &dyn Clock) -> Result<Booking, WizardError> {
        if self.step != WizardStep::Confirm {
            return Err(WizardError::NotAtConfirmStep);
        }
        // doctors were validated on the way here; step 4 only re-checks terms
        self.validate_step(WizardStep::Confirm, clock, &[])?;

        let data = &self.data;
        let booking = Booking {
            id: new_booking_id(clock),
            confirmation_code: new_confirmation_code(),
            service_id: data.service_id.ok_or(WizardError::MissingService)?,
            service_name: data.service_name.clone().unwrap_or_default(),
            doctor_id: data.doctor_id.ok_or(WizardError::MissingDoctor)?,
            doctor_name: data.doctor_name.clone().unwrap_or_default(),
            date: data.date.ok_or(WizardError::MissingDate)?,
            time: data.time.clone().ok_or(WizardError::MissingTime)?,
            full_name: data.full_name.clone(),
            phone: data.phone.clone(),
            email: data.email.clone(),
            notes: data.notes.clone(),
            status: BookingStatus::Pending,
            created_at: clock.now(),
            updated_at: None,
            total_price: data.service_price.unwrap_or(0),
        };

        *self = BookingWizard::new();
        Ok(booking)
    }
}
