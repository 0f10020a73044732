//! Typed records for every entity kind the store manages.
//!
//! Each record type implements [`Entity`], which ties it to its [`Kind`] (and so to its
//! storage key), exposes its identity, and knows how to merge its partial-update type.

pub mod employee;
pub mod objective;
pub mod training;
pub mod user;
pub mod vacation;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use employee::{Employee, EmployeePatch, EmployeeStatus};
pub use objective::{Objective, ObjectivePatch, ObjectiveStatus};
pub use training::{Training, TrainingPatch};
pub use user::{ActivityEntry, Role, User, UserPatch};
pub use vacation::{LeaveType, RequestStatus, VacationPatch, VacationRequest};

/// The five managed entity categories. Each kind owns one disjoint storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Employees,
    Objectives,
    Trainings,
    Vacations,
    Users,
}

impl Kind {
    pub const ALL: [Kind; 5] = [Kind::Employees, Kind::Objectives, Kind::Trainings, Kind::Vacations, Kind::Users];

    /// Storage key, also the field name in an export snapshot.
    pub fn key(self) -> &'static str {
        match self {
            Kind::Employees => "employees",
            Kind::Objectives => "objectives",
            Kind::Trainings => "trainings",
            Kind::Vacations => "vacations",
            Kind::Users => "users",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Kind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Kind::ALL
            .into_iter()
            .find(|k| k.key() == s)
            .ok_or_else(|| crate::Error::Internal(format!("unknown kind '{}'", s)))
    }
}

/// A record stored in one collection of the store.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The collection this record type belongs to.
    const KIND: Kind;

    /// Field-by-field partial update. Absent fields leave the record untouched,
    /// and there is no identity field, so identity cannot change after creation.
    type Patch: Default + Clone + Send + Sync + 'static;

    fn id(&self) -> &str;

    /// Only used when the record is first added without an identifier.
    fn set_id(&mut self, id: String);

    /// Shallow-merges the present fields of `patch` into `self`.
    fn apply(&mut self, patch: Self::Patch);

    /// The built-in dataset returned when nothing usable is persisted for the kind.
    fn defaults() -> Vec<Self>;
}

/// Replaces `slot` when the patch carries a value for it.
pub(crate) fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}
