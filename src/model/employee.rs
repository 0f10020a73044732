use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{merge, Entity, Kind};
use crate::engine::seed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    OnLeave,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub hire_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    pub status: EmployeeStatus,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub manager_id: Option<Option<String>>,
    pub status: Option<EmployeeStatus>,
}

impl Entity for Employee {
    const KIND: Kind = Kind::Employees;
    type Patch = EmployeePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn apply(&mut self, patch: EmployeePatch) {
        merge(&mut self.first_name, patch.first_name);
        merge(&mut self.last_name, patch.last_name);
        merge(&mut self.email, patch.email);
        merge(&mut self.department, patch.department);
        merge(&mut self.position, patch.position);
        merge(&mut self.hire_date, patch.hire_date);
        merge(&mut self.manager_id, patch.manager_id);
        merge(&mut self.status, patch.status);
    }

    fn defaults() -> Vec<Self> {
        seed::employees()
    }
}
