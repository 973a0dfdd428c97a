//! Bookkeeping for installed triggers.
//!
//! Maps each (tenant, profile) pair to the trigger currently installed in
//! the underlying scheduler so a trigger can be replaced or removed when
//! the profile's interval changes. At most one trigger exists per pair.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use scout_types::Interval;

/// A trigger installed for one (tenant, profile) pair.
#[derive(Debug, Clone)]
pub struct ScheduleEntry {
    /// Id of the job inside the underlying scheduler.
    pub job_id: Uuid,

    /// Interval the trigger fires at.
    pub interval: Interval,

    /// When the trigger was installed.
    pub installed_at: DateTime<Utc>,
}

impl ScheduleEntry {
    pub fn new(job_id: Uuid, interval: Interval) -> Self {
        Self {
            job_id,
            interval,
            installed_at: Utc::now(),
        }
    }
}

/// Thread-safe registry of installed triggers, keyed by (tenant, profile).
pub struct ScheduleRegistry {
    entries: RwLock<HashMap<(String, String), ScheduleEntry>>,
}

impl ScheduleRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Record a trigger, returning the entry it displaced, if any.
    pub fn insert(
        &self,
        tenant_id: &str,
        profile_id: &str,
        entry: ScheduleEntry,
    ) -> Option<ScheduleEntry> {
        self.entries
            .write()
            .unwrap()
            .insert((tenant_id.to_string(), profile_id.to_string()), entry)
    }

    /// Remove the trigger for a pair, returning it if one was installed.
    pub fn remove(&self, tenant_id: &str, profile_id: &str) -> Option<ScheduleEntry> {
        self.entries
            .write()
            .unwrap()
            .remove(&(tenant_id.to_string(), profile_id.to_string()))
    }

    /// Look up the trigger for a pair.
    pub fn get(&self, tenant_id: &str, profile_id: &str) -> Option<ScheduleEntry> {
        self.entries
            .read()
            .unwrap()
            .get(&(tenant_id.to_string(), profile_id.to_string()))
            .cloned()
    }

    /// Snapshot of all installed triggers, sorted by tenant then profile.
    pub fn list(&self) -> Vec<(String, String, ScheduleEntry)> {
        let mut entries: Vec<_> = self
            .entries
            .read()
            .unwrap()
            .iter()
            .map(|((tenant, profile), entry)| (tenant.clone(), profile.clone(), entry.clone()))
            .collect();
        entries.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

impl Default for ScheduleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_and_get() {
        let registry = ScheduleRegistry::new();
        let entry = ScheduleEntry::new(Uuid::new_v4(), Interval::Hourly);

        assert!(registry
            .insert("tenant-1", "profile-1", entry.clone())
            .is_none());

        let found = registry.get("tenant-1", "profile-1").unwrap();
        assert_eq!(found.job_id, entry.job_id);
        assert_eq!(found.interval, Interval::Hourly);
    }

    #[test]
    fn test_insert_replaces_and_returns_displaced() {
        let registry = ScheduleRegistry::new();
        let first = ScheduleEntry::new(Uuid::new_v4(), Interval::EverySixHours);
        let second = ScheduleEntry::new(Uuid::new_v4(), Interval::Hourly);

        registry.insert("tenant-1", "profile-1", first.clone());
        let displaced = registry
            .insert("tenant-1", "profile-1", second.clone())
            .unwrap();

        assert_eq!(displaced.job_id, first.job_id);
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("tenant-1", "profile-1").unwrap().job_id,
            second.job_id
        );
    }

    #[test]
    fn test_remove() {
        let registry = ScheduleRegistry::new();
        registry.insert(
            "tenant-1",
            "profile-1",
            ScheduleEntry::new(Uuid::new_v4(), Interval::Daily),
        );

        assert!(registry.remove("tenant-1", "profile-1").is_some());
        assert!(registry.remove("tenant-1", "profile-1").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_pairs_are_independent() {
        let registry = ScheduleRegistry::new();
        registry.insert(
            "tenant-1",
            "profile-1",
            ScheduleEntry::new(Uuid::new_v4(), Interval::Hourly),
        );
        registry.insert(
            "tenant-1",
            "profile-2",
            ScheduleEntry::new(Uuid::new_v4(), Interval::Daily),
        );
        registry.insert(
            "tenant-2",
            "profile-1",
            ScheduleEntry::new(Uuid::new_v4(), Interval::Hourly),
        );

        assert_eq!(registry.len(), 3);
        registry.remove("tenant-1", "profile-1");
        assert!(registry.get("tenant-1", "profile-2").is_some());
        assert!(registry.get("tenant-2", "profile-1").is_some());
    }

    #[test]
    fn test_list_is_sorted() {
        let registry = ScheduleRegistry::new();
        registry.insert(
            "tenant-b",
            "profile-1",
            ScheduleEntry::new(Uuid::new_v4(), Interval::Hourly),
        );
        registry.insert(
            "tenant-a",
            "profile-2",
            ScheduleEntry::new(Uuid::new_v4(), Interval::Hourly),
        );
        registry.insert(
            "tenant-a",
            "profile-1",
            ScheduleEntry::new(Uuid::new_v4(), Interval::Hourly),
        );

        let listed: Vec<(String, String)> = registry
            .list()
            .into_iter()
            .map(|(tenant, profile, _)| (tenant, profile))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("tenant-a".to_string(), "profile-1".to_string()),
                ("tenant-a".to_string(), "profile-2".to_string()),
                ("tenant-b".to_string(), "profile-1".to_string()),
            ]
        );
    }
}
