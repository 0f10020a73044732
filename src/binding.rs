//! Reactive collection state for UI code.
//!
//! A [`Binding`] holds the last collection returned by its [`CollectionSource`] and
//! publishes every change through a `tokio::sync::watch` channel. Mutations are
//! serialized, and the held collection is only ever replaced wholesale by a value the
//! source returned, so subscribers never see a half-applied change.

use std::sync::Arc;

use async_trait::async_trait;
use log::error;
use tokio::sync::{watch, Mutex};

use crate::model::Entity;
use crate::Result;

/// Where a binding reads its collection from and sends its mutations to.
///
/// Every mutation resolves to the full collection after the change. The local
/// [`Repository`](crate::repo::Repository) resolves immediately; a networked source
/// may suspend.
#[async_trait]
pub trait CollectionSource<T: Entity>: Send + Sync {
    async fn list(&self) -> Result<Vec<T>>;
    async fn add(&self, record: T) -> Result<Vec<T>>;
    async fn update(&self, id: &str, patch: T::Patch) -> Result<Vec<T>>;
    async fn delete(&self, id: &str) -> Result<Vec<T>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct BindingState<T> {
    pub items: Vec<T>,
    /// `true` until the first load resolves.
    pub loading: bool,
}

pub struct Binding<T: Entity> {
    source: Arc<dyn CollectionSource<T>>,
    state: watch::Sender<BindingState<T>>,
    ops: Mutex<()>,
}

impl<T: Entity> Binding<T> {
    /// Creates an inactive binding: empty and loading.
    pub fn new(source: Arc<dyn CollectionSource<T>>) -> Self {
        let (state, _) = watch::channel(BindingState {
            items: Vec::new(),
            loading: true,
        });
        Self {
            source,
            state,
            ops: Mutex::new(()),
        }
    }

    /// Creates a binding and starts its first load in the background.
    pub fn activate(source: Arc<dyn CollectionSource<T>>) -> Arc<Self> {
        let binding = Arc::new(Self::new(source));
        let loader = binding.clone();
        tokio::spawn(async move {
            if let Err(e) = loader.refresh().await {
                error!("Initial load of {} failed: {}", T::KIND, e);
            }
        });
        binding
    }

    pub fn items(&self) -> Vec<T> {
        self.state.borrow().items.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn subscribe(&self) -> watch::Receiver<BindingState<T>> {
        self.state.subscribe()
    }

    /// Reloads from the source. A failed load keeps the held items but still clears
    /// the loading flag.
    pub async fn refresh(&self) -> Result<()> {
        let _guard = self.ops.lock().await;
        match self.source.list().await {
            Ok(items) => {
                self.publish(items);
                Ok(())
            }
            Err(e) => {
                self.state.send_if_modified(|s| std::mem::replace(&mut s.loading, false));
                Err(e)
            }
        }
    }

    pub async fn add_item(&self, record: T) -> Result<()> {
        let _guard = self.ops.lock().await;
        let items = self.source.add(record).await?;
        self.publish(items);
        Ok(())
    }

    pub async fn update_item(&self, id: &str, patch: T::Patch) -> Result<()> {
        let _guard = self.ops.lock().await;
        let items = self.source.update(id, patch).await?;
        self.publish(items);
        Ok(())
    }

    pub async fn delete_item(&self, id: &str) -> Result<()> {
        let _guard = self.ops.lock().await;
        let items = self.source.delete(id).await?;
        self.publish(items);
        Ok(())
    }

    fn publish(&self, items: Vec<T>) {
        self.state.send_replace(BindingState { items, loading: false });
    }
}
