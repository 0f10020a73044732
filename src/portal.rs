use std::sync::Arc;

use log::info;

use crate::binding::Binding;
use crate::engine::{FileMedium, Medium, Store};
use crate::model::Entity;
use crate::repo::{Repositories, Repository};
use crate::service::{LocalUserService, RemoteUserService, Selector, UserSelector, UserService};
use crate::{Config, Result};

/// Everything one process needs: the store, its repositories and the user-service
/// selector. Build one per process and hand references to callers.
pub struct Portal {
    pub store: Store,
    pub repos: Repositories,
    pub users: Arc<UserSelector>,
}

impl Portal {
    /// Opens the portal with collections persisted under `config.data_dir`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use hrportal_store::service::UserService;
    /// use hrportal_store::{Config, Portal};
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let portal = Portal::open(&Config::from_env())?;
    ///     let users = portal.users.get_service().await.list().await?;
    ///     println!("{} users", users.len());
    ///     Ok(())
    /// }
    /// ```
    pub fn open(config: &Config) -> Result<Self> {
        let medium = Arc::new(FileMedium::new(&config.data_dir)?);
        info!("Opened store in {}", config.data_dir.display());
        Ok(Self::with_medium(medium, config))
    }

    pub fn with_medium(medium: Arc<dyn Medium>, config: &Config) -> Self {
        let store = Store::new(medium);
        let repos = Repositories::new(&store);

        let remote = config
            .service_addr
            .as_ref()
            .map(|addr| Arc::new(RemoteUserService::new(addr.clone())) as Arc<dyn UserService>);
        let local: Arc<dyn UserService> = Arc::new(LocalUserService::seeded(config.local_latency));
        let mut selector = Selector::new("user", remote, local);
        if config.force_local {
            selector = selector.pinned_local();
        }

        Self {
            store,
            repos,
            users: Arc::new(selector),
        }
    }

    /// A binding over the kind's repository, already loading in the background.
    pub fn bind<T: Entity>(&self) -> Arc<Binding<T>> {
        Binding::activate(Arc::new(Repository::<T>::new(self.store.clone())))
    }
}
