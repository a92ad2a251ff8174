use crate::config::InitialProgress;
use crate::state::{Parameter, Progress, RingParameters, UiState};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("segment index {index} is out of range for {len} segments")]
    IndexOutOfRange { index: usize, len: usize },
}

type Callback = Box<dyn Fn(&Arc<UiState>) + Send + Sync>;
type Initializer = Box<dyn Fn() -> Progress + Send + Sync>;

struct Subscriber {
    id: u64,
    /// Newest generation handed to `callback`; older ones are skipped.
    delivered: AtomicU64,
    callback: Callback,
}

impl Subscriber {
    fn deliver(&self, generation: u64, state: &Arc<UiState>) {
        if self.delivered.fetch_max(generation, Ordering::AcqRel) < generation {
            (self.callback)(state);
        }
    }
}

#[derive(Default)]
struct Subscribers {
    next_id: AtomicU64,
    entries: Mutex<Vec<Arc<Subscriber>>>,
}

impl Subscribers {
    fn snapshot(&self) -> Vec<Arc<Subscriber>> {
        self.entries.lock().clone()
    }
}

/// The current state and its generation, bumped on every publish.
struct Published {
    generation: u64,
    state: Arc<UiState>,
}

/// Single-writer state container for the ring.
///
/// Commands are serialized by `writer`, which only covers computing and swapping in the
/// next snapshot. Subscribers are notified after the lock is released, so a callback may
/// issue further commands or subscribe. Each subscriber only ever moves forward: a
/// snapshot older than one it has already seen is not delivered.
pub struct ProgressStore {
    current: RwLock<Published>,
    writer: Mutex<()>,
    subscribers: Arc<Subscribers>,
    initializer: Initializer,
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self::new(RingParameters::default())
    }
}

impl ProgressStore {
    pub fn new(parameters: RingParameters) -> Self {
        Self::with_initializer(parameters, InitialProgress::Zero.into_fn())
    }

    pub fn with_initializer(
        parameters: RingParameters,
        initializer: impl Fn() -> Progress + Send + Sync + 'static,
    ) -> Self {
        Self {
            current: RwLock::new(Published {
                generation: 1,
                state: Arc::new(UiState::new(parameters)),
            }),
            writer: Mutex::new(()),
            subscribers: Arc::default(),
            initializer: Box::new(initializer),
        }
    }

    pub fn snapshot(&self) -> Arc<UiState> {
        self.current.read().state.clone()
    }

    fn published(&self) -> (u64, Arc<UiState>) {
        let current = self.current.read();
        (current.generation, current.state.clone())
    }

    /// Registers `callback`, immediately handing it the current snapshot.
    pub fn subscribe(
        &self,
        callback: impl Fn(&Arc<UiState>) + Send + Sync + 'static,
    ) -> Subscription {
        let subscriber = Arc::new(Subscriber {
            id: self.subscribers.next_id.fetch_add(1, Ordering::Relaxed),
            delivered: AtomicU64::new(0),
            callback: Box::new(callback),
        });
        self.subscribers.entries.lock().push(subscriber.clone());

        let (generation, state) = self.published();
        subscriber.deliver(generation, &state);

        Subscription {
            id: subscriber.id,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    pub fn add_segment(&self) {
        self.add_segments(1);
    }

    /// Appends `count` segments from the initializer as a single snapshot.
    pub fn add_segments(&self, count: usize) {
        if count == 0 {
            return;
        }
        let values: Vec<Progress> = (0..count).map(|_| (self.initializer)()).collect();
        log::debug!("Adding {} segment(s)", count);
        self.apply(|state| state.with_segments_added(&values));
    }

    pub fn set_segment(&self, index: usize, value: f64) -> Result<(), StoreError> {
        self.try_apply(|state| state.with_segment(index, Progress::new(value)))
            .inspect_err(|e| log::warn!("Rejected segment update: {}", e))
    }

    pub fn set_aggregate_progress(&self, total: f64) {
        self.apply(|state| state.with_aggregate_progress(total));
    }

    pub fn set_aggregate_mode(&self, enabled: bool) {
        log::debug!("Aggregate mode {}", if enabled { "on" } else { "off" });
        self.apply(|state| state.with_aggregate_mode(enabled));
    }

    pub fn toggle_aggregate_mode(&self) {
        self.apply(|state| state.with_aggregate_mode(!state.aggregate_mode));
    }

    pub fn set_parameter(&self, which: Parameter, value: f64) {
        self.apply(|state| state.with_parameter(which, value));
    }

    pub fn set_parameters(&self, parameters: RingParameters) {
        self.apply(|state| state.with_parameters(parameters));
    }

    fn apply(&self, transition: impl FnOnce(&UiState) -> UiState) {
        let published = {
            let _guard = self.writer.lock();
            self.swap(transition(&self.snapshot()))
        };
        self.notify(published);
    }

    fn try_apply(
        &self,
        transition: impl FnOnce(&UiState) -> Result<UiState, StoreError>,
    ) -> Result<(), StoreError> {
        let published = {
            let _guard = self.writer.lock();
            self.swap(transition(&self.snapshot())?)
        };
        self.notify(published);
        Ok(())
    }

    /// Installs `next` as the current snapshot unless nothing changed. Caller holds `writer`.
    fn swap(&self, next: UiState) -> Option<(u64, Arc<UiState>)> {
        let mut current = self.current.write();
        if next == *current.state {
            return None;
        }
        current.generation += 1;
        current.state = Arc::new(next);
        Some((current.generation, current.state.clone()))
    }

    fn notify(&self, published: Option<(u64, Arc<UiState>)>) {
        let Some((generation, state)) = published else {
            return;
        };
        for subscriber in self.subscribers.snapshot() {
            subscriber.deliver(generation, &state);
        }
    }
}

/// Keeps a subscriber attached. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    subscribers: Weak<Subscribers>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers.entries.lock().retain(|s| s.id != self.id);
        }
    }
}
