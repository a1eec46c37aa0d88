use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::clock::Clock;
use crate::store::{keys, load_or, save, KvStore};

/// Clinic-wide presentation settings shown on the public pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicSettings {
    pub clinic_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl Default for ClinicSettings {
    fn default() -> Self {
        Self {
            clinic_name: "DermaCare Clinic".into(),
            phone: "0112345678".into(),
            email: "info@dermacare.example".into(),
            address: "King Fahd Road, Riyadh".into(),
            updated_at: None,
        }
    }
}

impl ClinicSettings {
    pub async fn load(store: &dyn KvStore) -> ClinicSettings {
        load_or(store, keys::SETTINGS, ClinicSettings::default).await
    }

    pub async fn store(
        store: &dyn KvStore,
        clock: &dyn Clock,
        mut settings: ClinicSettings,
    ) -> anyhow::Result<ClinicSettings> {
        settings.updated_at = Some(clock.now());
        save(store, keys::SETTINGS, &settings).await?;
        Ok(settings)
    }
}

/// One weekday's opening window. `closed` wins over the hours when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHours {
    pub open: String,
    pub close: String,
    #[serde(default)]
    pub closed: bool,
}

impl DayHours {
    fn open_hours() -> Self {
        Self {
            open: "09:00".into(),
            close: "21:00".into(),
            closed: false,
        }
    }

    fn closed() -> Self {
        Self {
            open: "09:00".into(),
            close: "21:00".into(),
            closed: true,
        }
    }
}

/// Saudi working week: open Sunday through Thursday, closed Friday and
/// Saturday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHours {
    pub sunday: DayHours,
    pub monday: DayHours,
    pub tuesday: DayHours,
    pub wednesday: DayHours,
    pub thursday: DayHours,
    pub friday: DayHours,
    pub saturday: DayHours,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            sunday: DayHours::open_hours(),
            monday: DayHours::open_hours(),
            tuesday: DayHours::open_hours(),
            wednesday: DayHours::open_hours(),
            thursday: DayHours::open_hours(),
            friday: DayHours::closed(),
            saturday: DayHours::closed(),
        }
    }
}

impl WorkingHours {
    pub async fn load(store: &dyn KvStore) -> WorkingHours {
        load_or(store, keys::WORKING_HOURS, WorkingHours::default).await
    }

    pub async fn store(store: &dyn KvStore, hours: &WorkingHours) -> anyhow::Result<()> {
        save(store, keys::WORKING_HOURS, hours).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;
    use time::macros::datetime;

    #[tokio::test]
    async fn settings_default_then_round_trip() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(datetime!(2025-06-01 12:00 UTC));

        let defaults = ClinicSettings::load(&store).await;
        assert_eq!(defaults.clinic_name, "DermaCare Clinic");
        assert!(defaults.updated_at.is_none());

        let mut edited = defaults;
        edited.clinic_name = "DermaCare Olaya".into();
        let saved = ClinicSettings::store(&store, &clock, edited).await.unwrap();
        assert_eq!(saved.updated_at, Some(clock.now()));

        let reloaded = ClinicSettings::load(&store).await;
        assert_eq!(reloaded, saved);
    }

    #[tokio::test]
    async fn corrupt_settings_fall_back_to_defaults() {
        let store = MemoryStore::new();
        store
            .put(crate::store::keys::SETTINGS, "{broken".into())
            .await
            .unwrap();
        let settings = ClinicSettings::load(&store).await;
        assert_eq!(settings, ClinicSettings::default());
    }

    #[tokio::test]
    async fn default_week_closes_friday_and_saturday() {
        let store = MemoryStore::new();
        let hours = WorkingHours::load(&store).await;
        assert!(!hours.sunday.closed);
        assert!(!hours.thursday.closed);
        assert!(hours.friday.closed);
        assert!(hours.saturday.closed);

        let mut edited = hours;
        edited.saturday = DayHours {
            open: "10:00".into(),
            close: "16:00".into(),
            closed: false,
        };
        WorkingHours::store(&store, &edited).await.unwrap();
        assert_eq!(WorkingHours::load(&store).await, edited);
    }
}
