use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{Entity, Role, User};
use crate::service::{NewUser, UserService, UserUpdate};
use crate::{Error, Result};

/// In-memory stand-in for the remote user service.
///
/// Every call sleeps for `latency` first so callers see network-like timing. State
/// lives only as long as the instance and is independent of the durable store.
pub struct LocalUserService {
    users: RwLock<Vec<User>>,
    latency: Duration,
}

impl LocalUserService {
    pub fn new(users: Vec<User>, latency: Duration) -> Self {
        Self {
            users: RwLock::new(users),
            latency,
        }
    }

    /// Starts from the built-in user dataset.
    pub fn seeded(latency: Duration) -> Self {
        Self::new(User::defaults(), latency)
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<User>>> {
        self.users.read().map_err(|_| Error::Internal("user list lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<User>>> {
        self.users.write().map_err(|_| Error::Internal("user list lock poisoned".to_string()))
    }

    fn filter(&self, keep: impl Fn(&User) -> bool) -> Result<Vec<User>> {
        Ok(self.read()?.iter().filter(|u| keep(u)).cloned().collect())
    }
}

fn email_taken(users: &[User], email: &str, except_id: Option<&str>) -> bool {
    users
        .iter()
        .any(|u| u.email.eq_ignore_ascii_case(email) && Some(u.id.as_str()) != except_id)
}

#[async_trait]
impl UserService for LocalUserService {
    async fn create(&self, data: NewUser) -> Result<User> {
        self.delay().await;
        let mut users = self.write()?;
        if email_taken(&users, &data.email, None) {
            return Err(Error::DuplicateEmail);
        }
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: data.name,
            email: data.email,
            password: data.password,
            role: data.role,
            department: data.department,
            active: true,
            activity: Vec::new(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>> {
        self.delay().await;
        Ok(self.read()?.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        self.delay().await;
        Ok(self.read()?.iter().find(|u| u.id == id).cloned())
    }

    async fn update(&self, update: UserUpdate) -> Result<User> {
        self.delay().await;
        let mut users = self.write()?;
        let pos = users.iter().position(|u| u.id == update.id).ok_or(Error::NotFound)?;
        if let Some(email) = &update.patch.email {
            if email_taken(&users, email, Some(update.id.as_str())) {
                return Err(Error::DuplicateEmail);
            }
        }
        let user = &mut users[pos];
        user.apply(update.patch);
        Ok(user.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.delay().await;
        let mut users = self.write()?;
        let pos = users.iter().position(|u| u.id == id).ok_or(Error::NotFound)?;
        users.remove(pos);
        Ok(())
    }

    async fn by_role(&self, role: Role) -> Result<Vec<User>> {
        self.delay().await;
        self.filter(|u| u.role == role)
    }

    async fn by_department(&self, department: &str) -> Result<Vec<User>> {
        self.delay().await;
        self.filter(|u| u.department.eq_ignore_ascii_case(department))
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        self.delay().await;
        self.read()?
            .iter()
            .find(|u| u.active && u.email.eq_ignore_ascii_case(email) && u.password == password)
            .cloned()
            .ok_or(Error::InvalidCredentials)
    }
}
