//! The user-management capability and the machinery that picks who serves it.
//!
//! [`UserService`] is the contract; [`LocalUserService`] is the in-process substitute
//! and [`RemoteUserService`] talks to a `hrportal-served` daemon. A [`Selector`]
//! probes the remote once and hands out whichever implementation won.

pub mod local;
pub mod remote;
pub mod selector;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{Role, User, UserPatch};
use crate::Result;

pub use local::LocalUserService;
pub use remote::RemoteUserService;
pub use selector::{Backend, Probe, Selector, Status};

/// Fields supplied when creating an account. The service assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub department: String,
}

/// An id plus the fields to change on that account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub id: String,
    #[serde(flatten)]
    pub patch: UserPatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Account management, served identically by the remote daemon and the local substitute.
///
/// Unlike the repository façade, operations on an unknown id fail with
/// [`Error::NotFound`](crate::Error::NotFound).
#[async_trait]
pub trait UserService: Send + Sync {
    /// Fails with `duplicate email` when the address is taken.
    async fn create(&self, data: NewUser) -> Result<User>;
    async fn list(&self) -> Result<Vec<User>>;
    async fn get_by_id(&self, id: &str) -> Result<Option<User>>;
    async fn update(&self, update: UserUpdate) -> Result<User>;
    async fn delete(&self, id: &str) -> Result<()>;
    async fn by_role(&self, role: Role) -> Result<Vec<User>>;
    async fn by_department(&self, department: &str) -> Result<Vec<User>>;
    /// Fails with `invalid credentials` unless an active account matches both fields.
    async fn authenticate(&self, email: &str, password: &str) -> Result<User>;
}

/// Reachability is judged by listing users: any error means unreachable.
#[async_trait]
impl Probe for dyn UserService {
    async fn probe(&self) -> Result<()> {
        self.list().await.map(|_| ())
    }
}

pub type UserSelector = Selector<dyn UserService>;
