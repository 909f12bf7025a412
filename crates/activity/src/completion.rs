use std::collections::{BTreeSet, HashMap};

use advent_shared::bail;
use tokio::sync::{Mutex, RwLock};

/// Completed positions of one identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionState(BTreeSet<usize>);

impl CompletionState {
    pub fn is_completed(&self, position: usize) -> bool {
        self.0.contains(&position)
    }

    /// Flips the flag and returns the new value.
    pub fn toggle(&mut self, position: usize) -> bool {
        if self.0.remove(&position) {
            return false;
        }

        self.0.insert(position);

        true
    }

    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<usize> for CompletionState {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Completion flags per identity.
///
/// `toggle` flips one position atomically: concurrent toggles of different
/// positions for the same identity must all be kept.
#[async_trait::async_trait]
pub trait CompletionStore: Send + Sync {
    async fn get(&self, identity: &str) -> advent_shared::Result<CompletionState>;

    /// Flips `position` and returns the new value.
    async fn toggle(&self, identity: &str, position: usize) -> advent_shared::Result<bool>;
}

pub struct Tracker<'a> {
    store: &'a dyn CompletionStore,
}

impl<'a> Tracker<'a> {
    pub fn new(store: &'a dyn CompletionStore) -> Self {
        Self { store }
    }

    pub async fn state(&self, identity: &str) -> advent_shared::Result<CompletionState> {
        self.store.get(identity).await
    }

    pub async fn is_completed(
        &self,
        identity: &str,
        position: usize,
    ) -> advent_shared::Result<bool> {
        Ok(self.store.get(identity).await?.is_completed(position))
    }

    pub async fn toggle(&self, identity: &str, position: usize) -> advent_shared::Result<bool> {
        let completed = self.store.toggle(identity, position).await?;

        tracing::debug!(identity, position, completed, "completion toggled");

        Ok(completed)
    }
}

/// Request-scoped store around the state carried by one visitor session.
///
/// Other identities read as empty and cannot be written.
pub struct SessionStore {
    identity: String,
    state: Mutex<CompletionState>,
}

impl SessionStore {
    pub fn new(identity: impl Into<String>, state: CompletionState) -> Self {
        Self {
            identity: identity.into(),
            state: Mutex::new(state),
        }
    }

    pub fn into_state(self) -> CompletionState {
        self.state.into_inner()
    }
}

#[async_trait::async_trait]
impl CompletionStore for SessionStore {
    async fn get(&self, identity: &str) -> advent_shared::Result<CompletionState> {
        if identity != self.identity {
            return Ok(CompletionState::default());
        }

        Ok(self.state.lock().await.clone())
    }

    async fn toggle(&self, identity: &str, position: usize) -> advent_shared::Result<bool> {
        if identity != self.identity {
            bail!("session store cannot write identity {identity}");
        }

        Ok(self.state.lock().await.toggle(position))
    }
}

#[derive(Default)]
pub struct MemoryStore(RwLock<HashMap<String, CompletionState>>);

#[async_trait::async_trait]
impl CompletionStore for MemoryStore {
    async fn get(&self, identity: &str) -> advent_shared::Result<CompletionState> {
        Ok(self.0.read().await.get(identity).cloned().unwrap_or_default())
    }

    async fn toggle(&self, identity: &str, position: usize) -> advent_shared::Result<bool> {
        Ok(self
            .0
            .write()
            .await
            .entry(identity.to_owned())
            .or_default()
            .toggle(position))
    }
}
