use serde::Deserialize;

use crate::catalog::repo::ServiceCategory;

/// Create/update payload for a service; updates overwrite every editable
/// field, as the dashboard form does.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceForm {
    pub name: String,
    pub description: String,
    pub price: u32,
    pub duration: u32,
    pub category: ServiceCategory,
}

impl ServiceForm {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() || self.description.trim().is_empty() {
            return Err("Name and description are required".into());
        }
        if self.price == 0 {
            return Err("Price must be a positive amount".into());
        }
        if self.duration == 0 {
            return Err("Duration must be a positive number of minutes".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorForm {
    pub name: String,
    pub specialty: String,
    pub experience: u32,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub services: Vec<u32>,
}

impl DoctorForm {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() || self.specialty.trim().is_empty() {
            return Err("Name and specialty are required".into());
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DoctorQuery {
    /// Restrict the list to doctors offering this service.
    pub service_id: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}
