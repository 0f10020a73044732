//! Per-kind CRUD façade over the [`Store`].
//!
//! Every mutation loads the kind's current collection, changes it, saves it, and hands
//! the resulting collection back so callers can refresh without a second load. Unknown
//! identifiers on update/delete are silent no-ops; business rules are the caller's job.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use uuid::Uuid;

use crate::binding::CollectionSource;
use crate::engine::Store;
use crate::model::{ActivityEntry, Employee, Entity, Objective, RequestStatus, Training, User, VacationRequest};
use crate::{Error, Result};

pub struct Repository<T: Entity> {
    store: Store,
    _kind: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self::new(self.store.clone())
    }
}

pub type EmployeeRepository = Repository<Employee>;
pub type ObjectiveRepository = Repository<Objective>;
pub type TrainingRepository = Repository<Training>;
pub type VacationRepository = Repository<VacationRequest>;
pub type UserRepository = Repository<User>;

impl<T: Entity> Repository<T> {
    pub fn new(store: Store) -> Self {
        Self { store, _kind: PhantomData }
    }

    pub fn list(&self) -> Vec<T> {
        self.store.load()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.list().into_iter().find(|r| r.id() == id)
    }

    /// Appends `record`, assigning a fresh id when it has none.
    ///
    /// Fails with [`Error::DuplicateId`] when the id is already taken, or with the
    /// medium's error when the write does not land; the collection is left as it was.
    pub fn add(&self, mut record: T) -> Result<Vec<T>> {
        let mut records = self.store.load::<T>();
        if record.id().is_empty() {
            record.set_id(Uuid::new_v4().to_string());
        }
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(Error::DuplicateId);
        }
        debug!("Adding {} record {}", T::KIND, record.id());
        records.push(record);
        self.store.persist(&records)?;
        Ok(records)
    }

    pub fn update(&self, id: &str, patch: T::Patch) -> Vec<T> {
        self.modify(id, |record| record.apply(patch))
    }

    pub fn delete(&self, id: &str) -> Vec<T> {
        let loaded = self.store.load::<T>();
        if !loaded.iter().any(|r| r.id() == id) {
            return loaded;
        }
        let remaining: Vec<T> = loaded.iter().filter(|r| r.id() != id).cloned().collect();
        self.commit(loaded, remaining)
    }

    /// Applies `change` to the record with `id` and persists. No-op when absent.
    fn modify(&self, id: &str, change: impl FnOnce(&mut T)) -> Vec<T> {
        let loaded = self.store.load::<T>();
        let Some(pos) = loaded.iter().position(|r| r.id() == id) else {
            debug!("Ignoring change to unknown {} record {}", T::KIND, id);
            return loaded;
        };
        let mut changed = loaded.clone();
        change(&mut changed[pos]);
        self.commit(loaded, changed)
    }

    /// Saves `changed`, falling back to the collection as loaded when the write fails.
    fn commit(&self, loaded: Vec<T>, changed: Vec<T>) -> Vec<T> {
        if self.store.save(&changed) {
            changed
        } else {
            loaded
        }
    }
}

impl Repository<Employee> {
    pub fn by_department(&self, department: &str) -> Vec<Employee> {
        self.list().into_iter().filter(|e| e.department.eq_ignore_ascii_case(department)).collect()
    }
}

impl Repository<Objective> {
    pub fn for_employee(&self, employee_id: &str) -> Vec<Objective> {
        self.list().into_iter().filter(|o| o.employee_id == employee_id).collect()
    }
}

impl Repository<VacationRequest> {
    /// Approve/reject flow.
    pub fn set_status(&self, id: &str, status: RequestStatus) -> Vec<VacationRequest> {
        self.modify(id, |request| request.status = status)
    }

    pub fn pending(&self) -> Vec<VacationRequest> {
        self.list().into_iter().filter(|v| v.status == RequestStatus::Pending).collect()
    }
}

impl Repository<User> {
    /// Appends a timestamped entry to the user's nested activity log.
    pub fn log_activity(&self, user_id: &str, action: &str) -> Vec<User> {
        let entry = ActivityEntry {
            at: Utc::now(),
            action: action.to_string(),
        };
        self.modify(user_id, |user| user.activity.push(entry))
    }
}

#[async_trait]
impl<T: Entity> CollectionSource<T> for Repository<T> {
    async fn list(&self) -> Result<Vec<T>> {
        Ok(Repository::list(self))
    }

    async fn add(&self, record: T) -> Result<Vec<T>> {
        Repository::add(self, record)
    }

    async fn update(&self, id: &str, patch: T::Patch) -> Result<Vec<T>> {
        Ok(Repository::update(self, id, patch))
    }

    async fn delete(&self, id: &str) -> Result<Vec<T>> {
        Ok(Repository::delete(self, id))
    }
}

/// One repository per kind, all sharing the same store.
#[derive(Clone)]
pub struct Repositories {
    pub employees: EmployeeRepository,
    pub objectives: ObjectiveRepository,
    pub trainings: TrainingRepository,
    pub vacations: VacationRepository,
    pub users: UserRepository,
}

impl Repositories {
    pub fn new(store: &Store) -> Self {
        Self {
            employees: Repository::new(store.clone()),
            objectives: Repository::new(store.clone()),
            trainings: Repository::new(store.clone()),
            vacations: Repository::new(store.clone()),
            users: Repository::new(store.clone()),
        }
    }
}
