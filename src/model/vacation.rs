use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{merge, Entity, Kind};
use crate::engine::seed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Annual,
    Sick,
    Unpaid,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationRequest {
    pub id: String,
    pub employee_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    #[serde(default)]
    pub reason: String,
    pub status: RequestStatus,
}

impl VacationRequest {
    /// Calendar days covered by the request, both ends included.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationPatch {
    pub employee_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub leave_type: Option<LeaveType>,
    pub reason: Option<String>,
    pub status: Option<RequestStatus>,
}

impl Entity for VacationRequest {
    const KIND: Kind = Kind::Vacations;
    type Patch = VacationPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn apply(&mut self, patch: VacationPatch) {
        merge(&mut self.employee_id, patch.employee_id);
        merge(&mut self.start_date, patch.start_date);
        merge(&mut self.end_date, patch.end_date);
        merge(&mut self.leave_type, patch.leave_type);
        merge(&mut self.reason, patch.reason);
        merge(&mut self.status, patch.status);
    }

    fn defaults() -> Vec<Self> {
        seed::vacations()
    }
}
