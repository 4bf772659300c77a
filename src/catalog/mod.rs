//! Debounced format discovery and quality selection
//!
//! Every URL change bumps a generation counter. A discovery result is applied
//! only while its generation is still current, so a slow response for an old
//! URL can never overwrite the list for a newer one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::{FormatDescriptor, Quality};
use crate::domain::rules::{QualitySelector, SubmissionValidator};
use crate::ports::ClipServicePort;

/// Default quiet period before a discovery request is issued
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryStatus {
    /// No URL entered
    Idle,
    /// URL does not look like a supported video link
    Invalid,
    /// Waiting for the debounce period to elapse
    Pending,
    /// Discovery request in flight
    Loading,
    Ready,
    Failed(String),
}

impl DiscoveryStatus {
    /// No timer or request is outstanding for the current URL
    pub fn is_settled(&self) -> bool {
        !matches!(self, DiscoveryStatus::Pending | DiscoveryStatus::Loading)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    pub generation: u64,
    pub url: String,
    pub status: DiscoveryStatus,
    pub formats: Vec<FormatDescriptor>,
    pub selected_quality: Option<Quality>,
}

impl CatalogSnapshot {
    fn empty() -> Self {
        Self {
            generation: 0,
            url: String::new(),
            status: DiscoveryStatus::Idle,
            formats: Vec::new(),
            selected_quality: None,
        }
    }

    pub fn available_qualities(&self) -> Vec<Quality> {
        QualitySelector::available_qualities(&self.formats)
    }

    pub fn selected_format(&self) -> Option<&FormatDescriptor> {
        self.selected_quality
            .and_then(|quality| QualitySelector::format_for_quality(quality, &self.formats))
    }
}

struct PendingDiscovery {
    handle: JoinHandle<()>,
    fired: Arc<AtomicBool>,
}

pub struct FormatCatalog {
    service: Arc<dyn ClipServicePort>,
    debounce: Duration,
    preference: Arc<Vec<Quality>>,
    state: Arc<watch::Sender<CatalogSnapshot>>,
    pending: Mutex<Option<PendingDiscovery>>,
}

impl FormatCatalog {
    pub fn new(
        service: Arc<dyn ClipServicePort>,
        debounce: Duration,
        preference: Vec<Quality>,
    ) -> Result<Self, DomainError> {
        if debounce.is_zero() {
            return Err(DomainError::Validation(
                "Debounce period must be greater than zero".to_string(),
            ));
        }
        let preference = if preference.is_empty() {
            Quality::DEFAULT_PREFERENCE.to_vec()
        } else {
            preference
        };
        let (state, _) = watch::channel(CatalogSnapshot::empty());
        Ok(Self {
            service,
            debounce,
            preference: Arc::new(preference),
            state: Arc::new(state),
            pending: Mutex::new(None),
        })
    }

    pub fn preference(&self) -> &[Quality] {
        &self.preference
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.state.subscribe()
    }

    /// Record a URL edit; discovery runs once the input has been quiet long enough
    pub fn set_url(&self, url: &str) {
        self.schedule(url, self.debounce);
    }

    /// Discover formats for `url` right away and wait for the outcome
    pub async fn discover_now(&self, url: &str) -> Result<CatalogSnapshot, DomainError> {
        self.schedule(url, Duration::ZERO);
        self.settled().await
    }

    /// Wait until no timer or request is outstanding for the current URL
    pub async fn settled(&self) -> Result<CatalogSnapshot, DomainError> {
        let mut receiver = self.state.subscribe();
        let snapshot = receiver
            .wait_for(|snapshot| snapshot.status.is_settled())
            .await
            .map_err(|_| DomainError::Internal("format catalog was shut down".to_string()))?;
        Ok(snapshot.clone())
    }

    /// Choose a quality level; only levels present in the current list are accepted
    pub fn select_quality(&self, quality: Quality) -> Result<(), DomainError> {
        let mut outcome = Ok(());
        self.state.send_if_modified(|snapshot| {
            if QualitySelector::is_quality_available(quality, &snapshot.formats) {
                snapshot.selected_quality = Some(quality);
                true
            } else {
                outcome = Err(DomainError::Validation(format!(
                    "Quality {} is not available for this video",
                    quality
                )));
                false
            }
        });
        outcome
    }

    pub fn format_for_quality(&self, quality: Quality) -> Option<FormatDescriptor> {
        QualitySelector::format_for_quality(quality, &self.state.borrow().formats).cloned()
    }

    /// Format matching the selected quality, if any
    pub fn selected_format(&self) -> Option<FormatDescriptor> {
        self.state.borrow().selected_format().cloned()
    }

    fn schedule(&self, url: &str, delay: Duration) {
        let url = url.trim().to_string();
        self.cancel_pending();

        let status = if url.is_empty() {
            DiscoveryStatus::Idle
        } else if !SubmissionValidator::is_valid_url(&url) {
            DiscoveryStatus::Invalid
        } else {
            DiscoveryStatus::Pending
        };

        let mut generation = 0;
        self.state.send_modify(|snapshot| {
            snapshot.generation += 1;
            generation = snapshot.generation;
            snapshot.url = url.clone();
            if status != DiscoveryStatus::Pending {
                snapshot.formats.clear();
                snapshot.selected_quality = None;
            }
            snapshot.status = status.clone();
        });

        if status != DiscoveryStatus::Pending {
            debug!(generation, ?status, "Cleared format list");
            return;
        }

        let fired = Arc::new(AtomicBool::new(false));
        let handle = tokio::spawn(run_discovery(
            Arc::clone(&self.service),
            Arc::clone(&self.state),
            Arc::clone(&self.preference),
            Arc::clone(&fired),
            generation,
            url,
            delay,
        ));
        *self.pending.lock() = Some(PendingDiscovery { handle, fired });
    }

    /// Stop a debounce timer that has not fired yet
    ///
    /// A request already in flight keeps running; its result is discarded by
    /// the generation check.
    fn cancel_pending(&self) {
        if let Some(pending) = self.pending.lock().take() {
            if !pending.fired.load(Ordering::SeqCst) {
                pending.handle.abort();
            }
        }
    }
}

impl Drop for FormatCatalog {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.get_mut().take() {
            pending.handle.abort();
        }
    }
}

async fn run_discovery(
    service: Arc<dyn ClipServicePort>,
    state: Arc<watch::Sender<CatalogSnapshot>>,
    preference: Arc<Vec<Quality>>,
    fired: Arc<AtomicBool>,
    generation: u64,
    url: String,
    delay: Duration,
) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    fired.store(true, Ordering::SeqCst);

    if !apply_if_current(&state, generation, |snapshot| {
        snapshot.status = DiscoveryStatus::Loading;
    }) {
        return;
    }

    debug!(generation, url = %url, "Discovering formats");
    let result = service.discover_formats(&url).await;

    let applied = match result {
        Ok(formats) => {
            let count = formats.len();
            let applied = apply_if_current(&state, generation, |snapshot| {
                snapshot.selected_quality =
                    QualitySelector::reconcile(snapshot.selected_quality, &formats, &preference);
                snapshot.formats = formats;
                snapshot.status = DiscoveryStatus::Ready;
            });
            if applied {
                info!(generation, formats = count, "Formats discovered");
            }
            applied
        }
        Err(error) => {
            let message = error.to_string();
            let applied = apply_if_current(&state, generation, |snapshot| {
                snapshot.formats.clear();
                snapshot.selected_quality = None;
                snapshot.status = DiscoveryStatus::Failed(message.clone());
            });
            if applied {
                warn!(generation, error = %message, "Format discovery failed");
            }
            applied
        }
    };

    if !applied {
        debug!(generation, "Discarded stale discovery result");
    }
}

fn apply_if_current(
    state: &watch::Sender<CatalogSnapshot>,
    generation: u64,
    update: impl FnOnce(&mut CatalogSnapshot),
) -> bool {
    state.send_if_modified(|snapshot| {
        if snapshot.generation != generation {
            return false;
        }
        update(snapshot);
        true
    })
}
