use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::engine::{vault, Medium};
use crate::model::{Employee, Entity, Kind, Objective, Training, User, VacationRequest};
use crate::{Error, Result};

/// Every collection at one point in time, as written by [`Store::export_all`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub employees: Vec<Employee>,
    pub objectives: Vec<Objective>,
    pub trainings: Vec<Training>,
    pub vacations: Vec<VacationRequest>,
    pub users: Vec<User>,
    pub export_date: DateTime<Utc>,
}

/// Storage usage of one kind, computed from its persisted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KindInfo {
    pub kind: String,
    pub size_bytes: usize,
    pub item_count: usize,
}

/// Translates typed collections to and from their JSON text on a [`Medium`].
///
/// The store never fails its caller for expected conditions: missing or corrupt text
/// loads as the kind's default dataset, and failed writes are logged while the
/// previously persisted text stays in place.
#[derive(Clone)]
pub struct Store {
    medium: Arc<dyn Medium>,
}

impl Store {
    pub fn new(medium: Arc<dyn Medium>) -> Self {
        Self { medium }
    }

    /// Serializes `records` and writes them under the kind's key.
    ///
    /// Returns whether the write reached the medium. A failed write is logged and
    /// leaves the prior persisted text untouched.
    pub fn save<T: Entity>(&self, records: &[T]) -> bool {
        self.persist(records).is_ok()
    }

    /// Like [`Store::save`] but hands the failure back to the caller.
    pub fn persist<T: Entity>(&self, records: &[T]) -> Result<()> {
        let key = T::KIND.key();
        let res = serde_json::to_string(records)
            .map_err(Error::from)
            .and_then(|text| self.medium.set(key, &text));
        if let Err(e) = &res {
            error!("Failed to persist {} ({} records): {}", key, records.len(), e);
        }
        res
    }

    /// Reads the kind's collection.
    ///
    /// Absent, blank or unparseable text is treated as absence: the default dataset is
    /// written back once and returned. A persisted empty array is a real, empty
    /// collection and is returned as is.
    pub fn load<T: Entity>(&self) -> Vec<T> {
        let key = T::KIND.key();
        match self.medium.get(key) {
            Ok(Some(text)) if !text.trim().is_empty() => match serde_json::from_str::<Vec<T>>(&text) {
                Ok(records) => return dedupe(key, records),
                Err(e) => warn!("Stored {} collection is corrupt, using defaults: {}", key, e),
            },
            Ok(_) => {}
            Err(e) => {
                error!("Could not read {} collection: {}", key, e);
                return T::defaults();
            }
        }

        let defaults = T::defaults();
        info!("Seeding {} with {} default records", key, defaults.len());
        self.save(&defaults);
        defaults
    }

    /// Collects every kind's current collection into a [`Snapshot`].
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            employees: self.load(),
            objectives: self.load(),
            trainings: self.load(),
            vacations: self.load(),
            users: self.load(),
            export_date: Utc::now(),
        }
    }

    /// Produces the backup document: every collection plus an `exportDate`.
    pub fn export_all(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    /// Restores collections from a backup document.
    ///
    /// Any subset of kinds may be present; absent kinds are left untouched. The whole
    /// document is validated before anything is written, so a malformed field rejects
    /// the call without modifying any kind.
    pub fn import_all(&self, document: &str) -> bool {
        match self.try_import(document) {
            Ok(count) => {
                info!("Imported {} collections", count);
                true
            }
            Err(e) => {
                warn!("Rejected import document: {}", e);
                false
            }
        }
    }

    fn try_import(&self, document: &str) -> Result<usize> {
        let value: Value = serde_json::from_str(document)?;
        let fields = value
            .as_object()
            .ok_or_else(|| Error::Internal("snapshot is not an object".to_string()))?;

        let staged: Vec<(Kind, String)> = [
            stage::<Employee>(fields)?,
            stage::<Objective>(fields)?,
            stage::<Training>(fields)?,
            stage::<VacationRequest>(fields)?,
            stage::<User>(fields)?,
        ]
        .into_iter()
        .flatten()
        .collect();

        // Every prior text is read before the first write so a failed read leaves
        // nothing to undo.
        let before = staged
            .iter()
            .map(|(kind, _)| Ok((*kind, self.medium.get(kind.key())?)))
            .collect::<Result<Vec<_>>>()?;

        for (written, (kind, text)) in staged.iter().enumerate() {
            if let Err(e) = self.medium.set(kind.key(), text) {
                self.roll_back(&before[..written]);
                return Err(e);
            }
        }
        Ok(staged.len())
    }

    fn roll_back(&self, written: &[(Kind, Option<String>)]) {
        for (kind, before) in written.iter().rev() {
            let res = match before {
                Some(text) => self.medium.set(kind.key(), text),
                None => self.medium.remove(kind.key()),
            };
            if let Err(e) = res {
                error!("Could not restore {} after failed import: {}", kind, e);
            }
        }
    }

    /// Seals the backup document with AES-256-GCM under a 32-byte key.
    pub fn export_sealed(&self, key: &[u8]) -> Result<String> {
        vault::seal(&self.export_all()?, key)
    }

    /// Opens a sealed backup and imports it. A wrong key or tampered text imports nothing.
    pub fn import_sealed(&self, sealed: &str, key: &[u8]) -> bool {
        match vault::open(sealed, key) {
            Ok(document) => self.import_all(&document),
            Err(e) => {
                warn!("Rejected sealed import: {}", e);
                false
            }
        }
    }

    /// Removes every kind's key from the medium.
    pub fn clear_all(&self) {
        for kind in Kind::ALL {
            if let Err(e) = self.medium.remove(kind.key()) {
                error!("Could not clear {}: {}", kind, e);
            }
        }
    }

    /// Size and item count per kind, read from the persisted text. Absent keys report zero.
    pub fn info(&self) -> Vec<KindInfo> {
        Kind::ALL
            .into_iter()
            .map(|kind| {
                let text = self.medium.get(kind.key()).ok().flatten().unwrap_or_default();
                let item_count = serde_json::from_str::<Vec<Value>>(&text).map(|v| v.len()).unwrap_or(0);
                KindInfo {
                    kind: kind.key().to_string(),
                    size_bytes: text.len(),
                    item_count,
                }
            })
            .collect()
    }
}

/// Validates one kind's field of an import document and renders its replacement text.
fn stage<T: Entity>(fields: &Map<String, Value>) -> Result<Option<(Kind, String)>> {
    let Some(value) = fields.get(T::KIND.key()) else {
        return Ok(None);
    };
    if !value.is_array() {
        return Err(Error::Internal(format!("{} is not an array", T::KIND)));
    }
    let records: Vec<T> = serde_json::from_value(value.clone())?;
    let mut seen = HashSet::new();
    if !records.iter().all(|r| seen.insert(r.id())) {
        return Err(Error::DuplicateId);
    }
    Ok(Some((T::KIND, serde_json::to_string(&records)?)))
}

fn dedupe<T: Entity>(key: &str, records: Vec<T>) -> Vec<T> {
    let total = records.len();
    let mut seen = HashSet::new();
    let unique: Vec<T> = records.into_iter().filter(|r| seen.insert(r.id().to_string())).collect();
    if unique.len() != total {
        warn!("Dropped {} duplicate records from {}", total - unique.len(), key);
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{FileMedium, MemoryMedium};
    use crate::model::{ObjectivePatch, Role};
    use tempfile::tempdir;

    fn memory_store() -> (Store, Arc<MemoryMedium>) {
        let medium = Arc::new(MemoryMedium::new());
        (Store::new(medium.clone()), medium)
    }

    #[test]
    fn test_load_absent_returns_defaults_and_seeds() {
        let (store, medium) = memory_store();
        let objectives: Vec<Objective> = store.load();
        assert_eq!(objectives, Objective::defaults());
        assert_eq!(objectives.len(), 2);
        assert!(medium.get("objectives").unwrap().is_some());
    }

    #[test]
    fn test_save_load_round_trip() {
        let (store, _) = memory_store();
        let mut users = User::defaults();
        users.reverse();
        assert!(store.save(&users));
        let loaded: Vec<User> = store.load();
        assert_eq!(loaded, users);
    }

    #[test]
    fn test_corrupt_text_falls_back_to_defaults() {
        let (store, medium) = memory_store();
        medium.set("trainings", "{not json").unwrap();
        let trainings: Vec<Training> = store.load();
        assert_eq!(trainings, Training::defaults());
    }

    #[test]
    fn test_empty_array_is_not_reseeded() {
        let (store, _) = memory_store();
        store.save::<VacationRequest>(&[]);
        assert!(store.load::<VacationRequest>().is_empty());
    }

    #[test]
    fn test_duplicate_ids_in_stored_text_are_dropped() {
        let (store, medium) = memory_store();
        let mut objectives = Objective::defaults();
        let mut copy = objectives[0].clone();
        copy.apply(ObjectivePatch { title: Some("shadow".into()), ..Default::default() });
        objectives.push(copy);
        medium.set("objectives", &serde_json::to_string(&objectives).unwrap()).unwrap();

        let loaded: Vec<Objective> = store.load();
        assert_eq!(loaded, Objective::defaults());
    }

    #[test]
    fn test_failed_save_keeps_previous_text() {
        let medium = Arc::new(MemoryMedium::with_quota(2048));
        let store = Store::new(medium.clone());
        assert!(store.save(&User::defaults()));
        let before = medium.get("users").unwrap();

        let mut many = User::defaults();
        for i in 0..50 {
            let mut u = many[0].clone();
            u.id = format!("bulk-{}", i);
            many.push(u);
        }
        assert!(!store.save(&many));
        assert_eq!(medium.get("users").unwrap(), before);
    }

    #[test]
    fn test_export_import_is_a_no_op() {
        let (store, _) = memory_store();
        let before = store.snapshot();
        let doc = store.export_all().unwrap();
        assert!(doc.contains("exportDate"));

        assert!(store.import_all(&doc));
        let after = store.snapshot();
        assert_eq!(after.employees, before.employees);
        assert_eq!(after.objectives, before.objectives);
        assert_eq!(after.trainings, before.trainings);
        assert_eq!(after.vacations, before.vacations);
        assert_eq!(after.users, before.users);
    }

    #[test]
    fn test_partial_import_leaves_other_kinds_untouched() {
        let (store, _) = memory_store();
        let employees: Vec<Employee> = store.load();
        assert!(store.import_all(r#"{"objectives": [], "payroll": 12}"#));

        assert!(store.load::<Objective>().is_empty());
        assert_eq!(store.load::<Employee>(), employees);
    }

    #[test]
    fn test_malformed_import_changes_nothing() {
        let (store, _) = memory_store();
        let before = store.snapshot();

        assert!(!store.import_all("not a document"));
        assert!(!store.import_all("[1, 2]"));
        assert!(!store.import_all(r#"{"objectives": [], "users": "nope"}"#));
        assert!(!store.import_all(r#"{"trainings": [{"id": "1"}]}"#));

        let after = store.snapshot();
        assert_eq!(after.objectives, before.objectives);
        assert_eq!(after.users, before.users);
        assert_eq!(after.trainings, before.trainings);
    }

    #[test]
    fn test_import_rejects_duplicate_ids() {
        let (store, _) = memory_store();
        let mut users = User::defaults();
        users.push(users[0].clone());
        let doc = serde_json::json!({ "users": users }).to_string();
        assert!(!store.import_all(&doc));
        assert_eq!(store.load::<User>(), User::defaults());
    }

    /// Reads of one key fail; everything else goes to the inner medium.
    struct UnreadableKey {
        inner: MemoryMedium,
        key: &'static str,
    }

    impl Medium for UnreadableKey {
        fn get(&self, key: &str) -> Result<Option<String>> {
            if key == self.key {
                return Err(Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "read failed")));
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_import_with_unreadable_kind_writes_nothing() {
        let inner = MemoryMedium::new();
        inner.set("employees", "[]").unwrap();
        let medium = Arc::new(UnreadableKey { inner, key: "users" });
        let store = Store::new(medium.clone());

        let doc = serde_json::json!({
            "employees": Employee::defaults(),
            "users": User::defaults(),
        })
        .to_string();
        assert!(!store.import_all(&doc));
        assert_eq!(medium.get("employees").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_persist_reports_the_failure() {
        let store = Store::new(Arc::new(MemoryMedium::with_quota(16)));
        assert!(matches!(store.persist(&User::defaults()), Err(Error::QuotaExceeded)));
        assert!(store.persist::<User>(&[]).is_ok());
    }

    #[test]
    fn test_sealed_export_import() {
        let (store, _) = memory_store();
        let key = b"thisis32byteslongsecretkey123456";
        let mut users: Vec<User> = store.load();
        users.retain(|u| u.role == Role::Admin);
        store.save(&users);

        let sealed = store.export_sealed(key).unwrap();
        store.clear_all();
        assert!(!store.import_sealed(&sealed, b"wrongwrongwrongwrongwrongwrong12"));
        assert!(store.import_sealed(&sealed, key));
        assert_eq!(store.load::<User>(), users);
    }

    #[test]
    fn test_clear_all_and_info() {
        let dir = tempdir().unwrap();
        let store = Store::new(Arc::new(FileMedium::new(dir.path()).unwrap()));

        let info = store.info();
        assert_eq!(info.len(), 5);
        assert!(info.iter().all(|i| i.size_bytes == 0 && i.item_count == 0));

        store.load::<Employee>();
        let employees = store.info().into_iter().find(|i| i.kind == "employees").unwrap();
        assert_eq!(employees.item_count, Employee::defaults().len());
        assert!(employees.size_bytes > 0);

        store.clear_all();
        assert!(store.info().iter().all(|i| i.size_bytes == 0));
        assert!(!dir.path().join("employees.json").exists());
    }
}
