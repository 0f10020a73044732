use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use tokio::sync::Mutex;

use crate::Result;

/// A lightweight call that succeeds only when the implementation is reachable.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Remote,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No request has been made since construction or the last reset.
    Unchecked,
    Checked(Backend),
}

impl Status {
    fn encode(verdict: Option<Backend>) -> u8 {
        match verdict {
            None => 0,
            Some(Backend::Remote) => 1,
            Some(Backend::Local) => 2,
        }
    }

    fn decode(raw: u8) -> Self {
        match raw {
            1 => Status::Checked(Backend::Remote),
            2 => Status::Checked(Backend::Local),
            _ => Status::Unchecked,
        }
    }
}

/// Routes a capability to its remote implementation or its local substitute.
///
/// The first [`get_service`](Selector::get_service) probes the remote once and caches
/// the verdict; later calls reuse it until [`reset`](Selector::reset). The verdict lock
/// is held across the probe, so concurrent first callers share a single probe. A
/// failed probe is not an error: it just selects the local substitute.
pub struct Selector<S: ?Sized> {
    capability: &'static str,
    remote: Option<Arc<S>>,
    local: Arc<S>,
    verdict: Mutex<Option<Backend>>,
    /// Mirror of `verdict` readable without waiting on an in-flight probe.
    status: AtomicU8,
    probes: AtomicUsize,
}

impl<S: ?Sized + Probe> Selector<S> {
    /// `remote` is `None` when no remote is configured; the verdict is then local
    /// without probing.
    pub fn new(capability: &'static str, remote: Option<Arc<S>>, local: Arc<S>) -> Self {
        Self {
            capability,
            remote,
            local,
            verdict: Mutex::new(None),
            status: AtomicU8::new(Status::encode(None)),
            probes: AtomicUsize::new(0),
        }
    }

    /// Starts out pinned to the local substitute, as after [`force_local`](Selector::force_local).
    pub fn pinned_local(mut self) -> Self {
        *self.verdict.get_mut() = Some(Backend::Local);
        *self.status.get_mut() = Status::encode(Some(Backend::Local));
        self
    }

    pub fn capability(&self) -> &'static str {
        self.capability
    }

    pub async fn get_service(&self) -> Arc<S> {
        let mut verdict = self.verdict.lock().await;
        let backend = match *verdict {
            Some(backend) => backend,
            None => {
                let backend = self.check().await;
                *verdict = Some(backend);
                self.status.store(Status::encode(*verdict), Ordering::SeqCst);
                backend
            }
        };
        self.pick(backend)
    }

    async fn check(&self) -> Backend {
        let Some(remote) = &self.remote else {
            info!("No remote {} service configured, using local substitute", self.capability);
            return Backend::Local;
        };

        self.probes.fetch_add(1, Ordering::SeqCst);
        match remote.probe().await {
            Ok(()) => {
                info!("Remote {} service reachable", self.capability);
                Backend::Remote
            }
            Err(e) => {
                info!("Remote {} service unreachable ({}), falling back to local substitute", self.capability, e);
                Backend::Local
            }
        }
    }

    fn pick(&self, backend: Backend) -> Arc<S> {
        match (backend, &self.remote) {
            (Backend::Remote, Some(remote)) => remote.clone(),
            _ => self.local.clone(),
        }
    }

    /// Reports `Unchecked` while the first probe is still running.
    pub async fn status(&self) -> Status {
        Status::decode(self.status.load(Ordering::SeqCst))
    }

    /// Pins the verdict to local without probing.
    pub async fn force_local(&self) {
        let mut verdict = self.verdict.lock().await;
        *verdict = Some(Backend::Local);
        self.status.store(Status::encode(*verdict), Ordering::SeqCst);
        info!("{} service pinned to local substitute", self.capability);
    }

    /// Forgets the verdict; the next request probes again.
    pub async fn reset(&self) {
        let mut verdict = self.verdict.lock().await;
        *verdict = None;
        self.status.store(Status::encode(None), Ordering::SeqCst);
    }

    /// Number of probes performed so far.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}
