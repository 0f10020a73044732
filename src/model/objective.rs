use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{merge, Entity, Kind};
use crate::engine::seed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveStatus {
    NotStarted,
    InProgress,
    Completed,
    Cancelled,
}

/// A goal assigned to an employee, tracked by percentage progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub employee_id: String,
    pub due_date: NaiveDate,
    /// 0..=100
    pub progress: u8,
    pub status: ObjectiveStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectivePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub employee_id: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub progress: Option<u8>,
    pub status: Option<ObjectiveStatus>,
}

impl Entity for Objective {
    const KIND: Kind = Kind::Objectives;
    type Patch = ObjectivePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn apply(&mut self, patch: ObjectivePatch) {
        merge(&mut self.title, patch.title);
        merge(&mut self.description, patch.description);
        merge(&mut self.employee_id, patch.employee_id);
        merge(&mut self.due_date, patch.due_date);
        merge(&mut self.progress, patch.progress.map(|p| p.min(100)));
        merge(&mut self.status, patch.status);
    }

    fn defaults() -> Vec<Self> {
        seed::objectives()
    }
}
