use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::catalog::dto::{DoctorForm, ServiceForm};
use crate::clock::Clock;
use crate::store::{keys, load_or, save, KvStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    Laser,
    Injections,
    Skin,
    Hair,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub price: u32,
    /// Minutes.
    pub duration: u32,
    pub category: ServiceCategory,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: u32,
    pub name: String,
    pub specialty: String,
    /// Years of experience.
    pub experience: u32,
    #[serde(default)]
    pub bio: Option<String>,
    /// Ids of the services this doctor performs. Not foreign-key enforced:
    /// a deleted service may linger here and is rendered as unknown.
    #[serde(default)]
    pub services: Vec<u32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl Doctor {
    pub fn offers(&self, service_id: u32) -> bool {
        self.services.contains(&service_id)
    }
}

/// New ids are max-existing+1, or 1 for an empty collection, computed at
/// call time. Two concurrent writers could race this; the deployment is a
/// single operator on a single device.
fn next_id(existing: impl Iterator<Item = u32>) -> u32 {
    existing.max().map_or(1, |id| id + 1)
}

impl Service {
    pub async fn list(store: &dyn KvStore) -> Vec<Service> {
        load_or(store, keys::SERVICES, seed_services).await
    }

    pub async fn find(store: &dyn KvStore, id: u32) -> Option<Service> {
        Self::list(store).await.into_iter().find(|s| s.id == id)
    }

    pub async fn create(
        store: &dyn KvStore,
        clock: &dyn Clock,
        form: ServiceForm,
    ) -> anyhow::Result<Service> {
        let mut services = Self::list(store).await;
        let service = Service {
            id: next_id(services.iter().map(|s| s.id)),
            name: form.name,
            description: form.description,
            price: form.price,
            duration: form.duration,
            category: form.category,
            created_at: clock.now(),
            updated_at: None,
            is_active: true,
        };
        services.push(service.clone());
        save(store, keys::SERVICES, &services).await?;
        Ok(service)
    }

    pub async fn update(
        store: &dyn KvStore,
        clock: &dyn Clock,
        id: u32,
        form: ServiceForm,
    ) -> anyhow::Result<Option<Service>> {
        let mut services = Self::list(store).await;
        let service = match services.iter_mut().find(|s| s.id == id) {
            Some(service) => service,
            None => return Ok(None),
        };
        service.name = form.name;
        service.description = form.description;
        service.price = form.price;
        service.duration = form.duration;
        service.category = form.category;
        service.updated_at = Some(clock.now());
        let updated = service.clone();
        save(store, keys::SERVICES, &services).await?;
        Ok(Some(updated))
    }

    /// Filter-out delete. No cascade: doctors and bookings keep referencing
    /// the id. Returns false when the id was absent.
    pub async fn delete(store: &dyn KvStore, id: u32) -> anyhow::Result<bool> {
        let mut services = Self::list(store).await;
        let before = services.len();
        services.retain(|s| s.id != id);
        if services.len() == before {
            return Ok(false);
        }
        save(store, keys::SERVICES, &services).await?;
        Ok(true)
    }

    pub fn search(services: &[Service], term: &str) -> Vec<Service> {
        let term = term.to_lowercase();
        services
            .iter()
            .filter(|s| {
                s.name.to_lowercase().contains(&term)
                    || s.description.to_lowercase().contains(&term)
            })
            .cloned()
            .collect()
    }
}

impl Doctor {
    pub async fn list(store: &dyn KvStore) -> Vec<Doctor> {
        load_or(store, keys::DOCTORS, seed_doctors).await
    }

    pub async fn find(store: &dyn KvStore, id: u32) -> Option<Doctor> {
        Self::list(store).await.into_iter().find(|d| d.id == id)
    }

    pub async fn create(
        store: &dyn KvStore,
        clock: &dyn Clock,
        form: DoctorForm,
    ) -> anyhow::Result<Doctor> {
        let mut doctors = Self::list(store).await;
        let doctor = Doctor {
            id: next_id(doctors.iter().map(|d| d.id)),
            name: form.name,
            specialty: form.specialty,
            experience: form.experience,
            bio: form.bio,
            services: form.services,
            created_at: clock.now(),
            updated_at: None,
        };
        doctors.push(doctor.clone());
        save(store, keys::DOCTORS, &doctors).await?;
        Ok(doctor)
    }

    pub async fn update(
        store: &dyn KvStore,
        clock: &dyn Clock,
        id: u32,
        form: DoctorForm,
    ) -> anyhow::Result<Option<Doctor>> {
        let mut doctors = Self::list(store).await;
        let doctor = match doctors.iter_mut().find(|d| d.id == id) {
            Some(doctor) => doctor,
            None => return Ok(None),
        };
        doctor.name = form.name;
        doctor.specialty = form.specialty;
        doctor.experience = form.experience;
        doctor.bio = form.bio;
        doctor.services = form.services;
        doctor.updated_at = Some(clock.now());
        let updated = doctor.clone();
        save(store, keys::DOCTORS, &doctors).await?;
        Ok(Some(updated))
    }

    pub async fn delete(store: &dyn KvStore, id: u32) -> anyhow::Result<bool> {
        let mut doctors = Self::list(store).await;
        let before = doctors.len();
        doctors.retain(|d| d.id != id);
        if doctors.len() == before {
            return Ok(false);
        }
        save(store, keys::DOCTORS, &doctors).await?;
        Ok(true)
    }

    pub fn search(doctors: &[Doctor], term: &str) -> Vec<Doctor> {
        let term = term.to_lowercase();
        doctors
            .iter()
            .filter(|d| {
                d.name.to_lowercase().contains(&term)
                    || d.specialty.to_lowercase().contains(&term)
            })
            .cloned()
            .collect()
    }
}

/// Default catalog used until the store has its own, mirroring what a fresh
/// dashboard ships with.
fn seed_services() -> Vec<Service> {
    let seeded_at = OffsetDateTime::UNIX_EPOCH;
    let service = |id, name: &str, description: &str, price, duration, category| Service {
        id,
        name: name.to_string(),
        description: description.to_string(),
        price,
        duration,
        category,
        created_at: seeded_at,
        updated_at: None,
        is_active: true,
    };
    vec![
        service(
            1,
            "Laser hair removal",
            "Full-body laser hair removal session",
            500,
            45,
            ServiceCategory::Laser,
        ),
        service(
            2,
            "Botox injections",
            "Wrinkle-smoothing botox treatment",
            800,
            30,
            ServiceCategory::Injections,
        ),
        service(
            3,
            "Deep skin cleansing",
            "Deep-pore facial cleansing and hydration",
            350,
            60,
            ServiceCategory::Skin,
        ),
        service(
            4,
            "Hair strengthening",
            "Scalp treatment for hair loss",
            450,
            40,
            ServiceCategory::Hair,
        ),
    ]
}

fn seed_doctors() -> Vec<Doctor> {
    let seeded_at = OffsetDateTime::UNIX_EPOCH;
    let doctor = |id, name: &str, specialty: &str, experience, services: Vec<u32>| Doctor {
        id,
        name: name.to_string(),
        specialty: specialty.to_string(),
        experience,
        bio: None,
        services,
        created_at: seeded_at,
        updated_at: None,
    };
    vec![
        doctor(1, "Dr. Sarah Al-Otaibi", "Dermatology", 12, vec![1, 3]),
        doctor(2, "Dr. Khalid Hassan", "Cosmetic dermatology", 9, vec![2, 3]),
        doctor(3, "Dr. Lina Farouk", "Trichology", 7, vec![4]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::dto::{DoctorForm, ServiceForm};
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;
    use time::macros::datetime;

    fn clock() -> ManualClock {
        ManualClock::new(datetime!(2025-06-01 12:00 UTC))
    }

    fn form(name: &str) -> ServiceForm {
        ServiceForm {
            name: name.into(),
            description: "desc".into(),
            price: 100,
            duration: 30,
            category: ServiceCategory::Other,
        }
    }

    #[tokio::test]
    async fn seeds_when_store_is_empty() {
        let store = MemoryStore::new();
        let services = Service::list(&store).await;
        assert!(!services.is_empty());
        let doctors = Doctor::list(&store).await;
        assert!(doctors.iter().all(|d| !d.services.is_empty()));
    }

    #[tokio::test]
    async fn ids_are_max_plus_one() {
        let store = MemoryStore::new();
        let clock = clock();
        let seeded_max = Service::list(&store)
            .await
            .iter()
            .map(|s| s.id)
            .max()
            .unwrap();

        let a = Service::create(&store, &clock, form("a")).await.unwrap();
        assert_eq!(a.id, seeded_max + 1);

        // deleting the highest id frees it for reuse
        assert!(Service::delete(&store, a.id).await.unwrap());
        let b = Service::create(&store, &clock, form("b")).await.unwrap();
        assert_eq!(b.id, seeded_max + 1);
    }

    #[tokio::test]
    async fn update_merges_and_stamps() {
        let store = MemoryStore::new();
        let clock = clock();
        let created = Service::create(&store, &clock, form("old")).await.unwrap();

        let updated = Service::update(&store, &clock, created.id, form("new"))
            .await
            .unwrap()
            .expect("exists");
        assert_eq!(updated.name, "new");
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.created_at, created.created_at);

        assert!(Service::update(&store, &clock, 9999, form("x"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn delete_does_not_cascade_to_doctors() {
        let store = MemoryStore::new();
        // persist seeds first so the delete operates on stored data
        let doctors = Doctor::list(&store).await;
        crate::store::save(&store, crate::store::keys::DOCTORS, &doctors)
            .await
            .unwrap();

        assert!(Service::delete(&store, 1).await.unwrap());
        let doctor = Doctor::find(&store, 1).await.expect("doctor kept");
        assert!(doctor.services.contains(&1), "dangling id tolerated");

        // second delete of the same id reports not found
        assert!(!Service::delete(&store, 1).await.unwrap());
    }

    #[tokio::test]
    async fn doctor_crud_roundtrip() {
        let store = MemoryStore::new();
        let clock = clock();
        let created = Doctor::create(
            &store,
            &clock,
            DoctorForm {
                name: "Dr. Test".into(),
                specialty: "Testing".into(),
                experience: 3,
                bio: None,
                services: vec![1],
            },
        )
        .await
        .unwrap();

        assert!(Doctor::find(&store, created.id).await.is_some());
        assert!(Doctor::delete(&store, created.id).await.unwrap());
        assert!(Doctor::find(&store, created.id).await.is_none());
    }

    #[test]
    fn search_matches_name_and_specialty() {
        let doctors = seed_doctors();
        assert_eq!(Doctor::search(&doctors, "trichology").len(), 1);
        assert_eq!(Doctor::search(&doctors, "dr.").len(), 3);
        assert!(Doctor::search(&doctors, "no match").is_empty());
    }
}
