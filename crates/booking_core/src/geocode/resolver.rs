use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use super::GeocodeProvider;
use crate::config::GeocodingConfig;
use crate::geo::GeoPoint;

/// Debounced, last-query-wins address resolver.
///
/// `push_input` is called on every keystroke; only the settled text reaches
/// the collaborator. A newer query (or a selection) supersedes any in-flight
/// lookup: the pending request future is dropped and its response can never
/// be published. After `mark_selected`, lookups stay suppressed until the
/// text is edited again.
pub struct AddressResolver {
    provider: Arc<dyn GeocodeProvider>,
    state: Arc<ResolverState>,
    candidates_tx: Arc<watch::Sender<Vec<GeoPoint>>>,
    candidates_rx: watch::Receiver<Vec<GeoPoint>>,
    debounce: Duration,
    min_query_len: usize,
    limit: usize,
}

struct ResolverState {
    /// Bumped on every new query and on selection; a lookup task aborts the
    /// moment it observes a newer generation.
    generation: watch::Sender<u64>,
    /// Set on selection, cleared on the next edit.
    selected: AtomicBool,
    last_text: Mutex<String>,
}

impl AddressResolver {
    pub fn new(provider: Arc<dyn GeocodeProvider>, config: &GeocodingConfig) -> Self {
        let (candidates_tx, candidates_rx) = watch::channel(Vec::new());
        let (generation, _) = watch::channel(0u64);
        Self {
            provider,
            state: Arc::new(ResolverState {
                generation,
                selected: AtomicBool::new(false),
                last_text: Mutex::new(String::new()),
            }),
            candidates_tx: Arc::new(candidates_tx),
            candidates_rx,
            debounce: Duration::from_millis(config.debounce_ms),
            min_query_len: config.min_query_len,
            limit: config.limit,
        }
    }

    /// Feed the current input text. Debounces, enforces the minimum query
    /// length, and supersedes any older in-flight lookup.
    pub fn push_input(&self, text: &str) {
        let mut last = self.state.last_text.lock().expect("resolver lock");
        if self.state.selected.load(Ordering::SeqCst) && *last == text {
            // Unchanged text right after a selection is not an edit.
            return;
        }
        self.state.selected.store(false, Ordering::SeqCst);
        *last = text.to_string();

        let generation = *self.state.generation.borrow() + 1;
        self.state.generation.send_replace(generation);
        let mut supersede = self.state.generation.subscribe();
        drop(last);

        if text.chars().count() < self.min_query_len {
            self.candidates_tx.send_replace(Vec::new());
            return;
        }

        let provider = Arc::clone(&self.provider);
        let state = Arc::clone(&self.state);
        let candidates_tx = Arc::clone(&self.candidates_tx);
        let text = text.to_string();
        let debounce = self.debounce;
        let limit = self.limit;
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(debounce) => {}
                _ = supersede.changed() => return,
            }
            if state.selected.load(Ordering::SeqCst) {
                return;
            }
            let result = tokio::select! {
                result = provider.search(&text, limit) => result,
                _ = supersede.changed() => return,
            };
            if state.selected.load(Ordering::SeqCst) {
                return;
            }
            match result {
                Ok(candidates) => {
                    candidates_tx.send_replace(candidates);
                }
                Err(err) => {
                    tracing::warn!(query = %text, error = %err, "autocomplete lookup failed");
                }
            }
        });
    }

    /// Record that the user picked a candidate: close the candidate list,
    /// cancel anything in flight, and suppress lookups until the next edit.
    pub fn mark_selected(&self, choice: &GeoPoint) {
        let mut last = self.state.last_text.lock().expect("resolver lock");
        self.state.selected.store(true, Ordering::SeqCst);
        *last = choice.label.clone();
        let generation = *self.state.generation.borrow() + 1;
        self.state.generation.send_replace(generation);
        drop(last);
        self.candidates_tx.send_replace(Vec::new());
    }

    /// Watch the current candidate list.
    pub fn candidates(&self) -> watch::Receiver<Vec<GeoPoint>> {
        self.candidates_rx.clone()
    }
}
