use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{merge, Entity, Kind};
use crate::engine::seed;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Training {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub trainer: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub capacity: u32,
    /// Employee ids enrolled in the session.
    #[serde(default)]
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub trainer: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub capacity: Option<u32>,
    pub participants: Option<Vec<String>>,
}

impl Entity for Training {
    const KIND: Kind = Kind::Trainings;
    type Patch = TrainingPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn apply(&mut self, patch: TrainingPatch) {
        merge(&mut self.title, patch.title);
        merge(&mut self.description, patch.description);
        merge(&mut self.trainer, patch.trainer);
        merge(&mut self.start_date, patch.start_date);
        merge(&mut self.end_date, patch.end_date);
        merge(&mut self.capacity, patch.capacity);
        merge(&mut self.participants, patch.participants);
    }

    fn defaults() -> Vec<Self> {
        seed::trainings()
    }
}
