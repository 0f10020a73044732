//! Built-in datasets, one per kind, used when nothing usable is persisted.

use chrono::{NaiveDate, TimeZone, Utc};

use crate::model::{
    ActivityEntry, Employee, EmployeeStatus, LeaveType, Objective, ObjectiveStatus, RequestStatus, Role, Training, User,
    VacationRequest,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

pub fn employees() -> Vec<Employee> {
    vec![
        Employee {
            id: "1".into(),
            first_name: "Sarah".into(),
            last_name: "Martin".into(),
            email: "sarah.martin@hrportal.local".into(),
            department: "Human Resources".into(),
            position: "HR Manager".into(),
            hire_date: date(2019, 3, 11),
            manager_id: None,
            status: EmployeeStatus::Active,
        },
        Employee {
            id: "2".into(),
            first_name: "Karim".into(),
            last_name: "Benali".into(),
            email: "karim.benali@hrportal.local".into(),
            department: "Engineering".into(),
            position: "Software Engineer".into(),
            hire_date: date(2021, 9, 1),
            manager_id: Some("3".into()),
            status: EmployeeStatus::Active,
        },
        Employee {
            id: "3".into(),
            first_name: "Lena".into(),
            last_name: "Dubois".into(),
            email: "lena.dubois@hrportal.local".into(),
            department: "Engineering".into(),
            position: "Engineering Manager".into(),
            hire_date: date(2017, 1, 16),
            manager_id: None,
            status: EmployeeStatus::Active,
        },
    ]
}

pub fn objectives() -> Vec<Objective> {
    vec![
        Objective {
            id: "1".into(),
            title: "Complete onboarding program".into(),
            description: "Finish all mandatory onboarding modules".into(),
            employee_id: "2".into(),
            due_date: date(2024, 6, 30),
            progress: 75,
            status: ObjectiveStatus::InProgress,
        },
        Objective {
            id: "2".into(),
            title: "Improve team retention".into(),
            description: "Run quarterly one-on-ones with every report".into(),
            employee_id: "3".into(),
            due_date: date(2024, 12, 31),
            progress: 30,
            status: ObjectiveStatus::InProgress,
        },
    ]
}

pub fn trainings() -> Vec<Training> {
    vec![
        Training {
            id: "1".into(),
            title: "Workplace Safety".into(),
            description: "Annual mandatory safety refresher".into(),
            trainer: "Sarah Martin".into(),
            start_date: date(2024, 5, 6),
            end_date: date(2024, 5, 6),
            capacity: 30,
            participants: vec!["2".into()],
        },
        Training {
            id: "2".into(),
            title: "Leadership Essentials".into(),
            description: "Coaching and feedback for new managers".into(),
            trainer: "Lena Dubois".into(),
            start_date: date(2024, 9, 9),
            end_date: date(2024, 9, 11),
            capacity: 12,
            participants: Vec::new(),
        },
    ]
}

pub fn vacations() -> Vec<VacationRequest> {
    vec![
        VacationRequest {
            id: "1".into(),
            employee_id: "2".into(),
            start_date: date(2024, 7, 15),
            end_date: date(2024, 7, 26),
            leave_type: LeaveType::Annual,
            reason: "Summer holidays".into(),
            status: RequestStatus::Pending,
        },
        VacationRequest {
            id: "2".into(),
            employee_id: "3".into(),
            start_date: date(2024, 3, 4),
            end_date: date(2024, 3, 5),
            leave_type: LeaveType::Sick,
            reason: String::new(),
            status: RequestStatus::Approved,
        },
    ]
}

pub fn users() -> Vec<User> {
    vec![
        User {
            id: "1".into(),
            name: "Admin".into(),
            email: "admin@hrportal.local".into(),
            password: "admin123".into(),
            role: Role::Admin,
            department: "Human Resources".into(),
            active: true,
            activity: vec![ActivityEntry {
                at: Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).single().unwrap_or_default(),
                action: "account created".into(),
            }],
        },
        User {
            id: "2".into(),
            name: "Lena Dubois".into(),
            email: "lena.dubois@hrportal.local".into(),
            password: "manager123".into(),
            role: Role::Manager,
            department: "Engineering".into(),
            active: true,
            activity: Vec::new(),
        },
        User {
            id: "3".into(),
            name: "Karim Benali".into(),
            email: "karim.benali@hrportal.local".into(),
            password: "employee123".into(),
            role: Role::Employee,
            department: "Engineering".into(),
            active: true,
            activity: Vec::new(),
        },
    ]
}
