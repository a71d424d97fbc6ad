//! Page-Data Controller
//!
//! Each identity (or dependency list) change opens a new fetch session. Within a session
//! at most one load runs at a time and refetches closer than the debounce window to the
//! previous attempt are dropped. Results of an older session, or arriving after unmount,
//! are discarded rather than cancelled.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::future::LocalBoxFuture;

use super::clock::{Clock, SystemClock};
use crate::config::PageDataConfig;
use crate::domain::{DomainError, DomainResult};

/// Loads a view's data for an identity
pub type Loader<T> = Rc<dyn Fn(String) -> LocalBoxFuture<'static, DomainResult<T>>>;
/// Receives loaded data while the controller is mounted
pub type Sink<T> = Rc<dyn Fn(T)>;
/// Told about the latest settled load: the error, or `None` once data lands
type ErrorListener = Rc<dyn Fn(Option<&DomainError>)>;

/// Which guard (if any) applied to a fetch request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Loader succeeded and the sink received the data
    Loaded,
    /// Loader failed; the error was logged and reported
    Failed,
    /// No identity yet
    NoIdentity,
    /// Identity and dependencies match the current session
    Unchanged,
    /// A load for this session is still running
    InProgress,
    /// Previous attempt started less than the debounce window ago
    Debounced,
    /// Result arrived for a superseded session or after unmount
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeTrigger {
    /// Document became visible again
    Visibility,
    /// Window regained focus
    Focus,
}

impl ResumeTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResumeTrigger::Visibility => "visibility",
            ResumeTrigger::Focus => "focus",
        }
    }
}

#[derive(Debug)]
struct Session {
    identity: Option<String>,
    dependencies: Vec<String>,
    /// Bumped whenever identity or dependencies change
    generation: u64,
    in_progress: bool,
    last_attempt_ms: Option<i64>,
    first_load: bool,
    mounted: bool,
}

pub struct PageDataController<T: 'static> {
    name: &'static str,
    loader: Loader<T>,
    sink: Sink<T>,
    clock: Rc<dyn Clock>,
    config: PageDataConfig,
    session: Rc<RefCell<Session>>,
    first_load_listener: Option<Rc<dyn Fn(bool)>>,
    error_listener: Option<ErrorListener>,
}

impl<T: 'static> Clone for PageDataController<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            loader: self.loader.clone(),
            sink: self.sink.clone(),
            clock: self.clock.clone(),
            config: self.config,
            session: self.session.clone(),
            first_load_listener: self.first_load_listener.clone(),
            error_listener: self.error_listener.clone(),
        }
    }
}

impl<T: 'static> PageDataController<T> {
    /// `name` only labels log lines
    pub fn new(name: &'static str, loader: Loader<T>, sink: Sink<T>) -> Self {
        Self {
            name,
            loader,
            sink,
            clock: Rc::new(SystemClock),
            config: PageDataConfig::default(),
            session: Rc::new(RefCell::new(Session {
                identity: None,
                dependencies: Vec::new(),
                generation: 0,
                in_progress: false,
                last_attempt_ms: None,
                first_load: true,
                mounted: true,
            })),
            first_load_listener: None,
            error_listener: None,
        }
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Called with the new value whenever the first-load flag flips
    pub fn on_first_load_change(mut self, listener: impl Fn(bool) + 'static) -> Self {
        self.first_load_listener = Some(Rc::new(listener));
        self
    }

    /// Called after every load of the live session that reaches the view
    pub fn on_error_change(mut self, listener: impl Fn(Option<&DomainError>) + 'static) -> Self {
        self.error_listener = Some(Rc::new(listener));
        self
    }

    pub fn first_load(&self) -> bool {
        self.session.borrow().first_load
    }

    pub fn is_loading(&self) -> bool {
        self.session.borrow().in_progress
    }

    pub fn identity(&self) -> Option<String> {
        self.session.borrow().identity.clone()
    }

    pub fn resume_delay(&self) -> Duration {
        Duration::from_millis(self.config.resume_delay_ms)
    }

    fn report_error(&self, error: Option<&DomainError>) {
        if let Some(listener) = &self.error_listener {
            listener(error);
        }
    }

    fn set_first_load(&self, value: bool) {
        let changed = {
            let mut session = self.session.borrow_mut();
            let changed = session.first_load != value;
            session.first_load = value;
            changed
        };
        if changed {
            if let Some(listener) = &self.first_load_listener {
                listener(value);
            }
        }
    }

    /// Track `identity`; a changed identity or dependency list starts a new session
    pub async fn initialize(&self, identity: Option<String>, dependencies: Vec<String>) -> FetchOutcome {
        let Some(identity) = identity else {
            let mut session = self.session.borrow_mut();
            if session.identity.take().is_some() {
                // Late results for the previous identity must not land
                session.generation += 1;
                session.in_progress = false;
            }
            return FetchOutcome::NoIdentity;
        };

        {
            let mut session = self.session.borrow_mut();
            if session.identity.as_deref() == Some(identity.as_str()) && session.dependencies == dependencies {
                return FetchOutcome::Unchanged;
            }
            log::debug!("[PAGE] {}: new session for {} ({:?})", self.name, identity, dependencies);
            session.identity = Some(identity);
            session.dependencies = dependencies;
            session.generation += 1;
            session.in_progress = false;
        }
        self.set_first_load(true);
        self.attempt_fetch(false).await
    }

    /// Manual refresh (pull-to-refresh, retry buttons)
    pub async fn refetch(&self) -> FetchOutcome {
        self.attempt_fetch(true).await
    }

    /// Foreground/focus trigger: wait for `delay`, then refetch
    pub async fn resume<D: Future<Output = ()>>(&self, trigger: ResumeTrigger, delay: D) -> FetchOutcome {
        delay.await;
        let outcome = self.attempt_fetch(true).await;
        log::debug!("[PAGE] {}: resume on {} -> {:?}", self.name, trigger.as_str(), outcome);
        outcome
    }

    /// Results still in flight will be dropped
    pub fn unmount(&self) {
        self.session.borrow_mut().mounted = false;
    }

    async fn attempt_fetch(&self, is_refetch: bool) -> FetchOutcome {
        let (identity, generation) = {
            let mut session = self.session.borrow_mut();
            let Some(identity) = session.identity.clone() else {
                return FetchOutcome::NoIdentity;
            };
            if session.in_progress {
                return FetchOutcome::InProgress;
            }
            let now = self.clock.now_ms();
            if is_refetch {
                if let Some(last) = session.last_attempt_ms {
                    if now - last < self.config.debounce_ms as i64 {
                        return FetchOutcome::Debounced;
                    }
                }
            }
            session.in_progress = true;
            session.last_attempt_ms = Some(now);
            (identity, session.generation)
        };

        let result = (self.loader)(identity).await;

        let mounted = {
            let mut session = self.session.borrow_mut();
            if session.generation != generation {
                log::debug!("[PAGE] {}: dropped result of superseded session", self.name);
                return FetchOutcome::Discarded;
            }
            session.in_progress = false;
            session.mounted
        };
        self.set_first_load(false);

        match result {
            Ok(data) if mounted => {
                self.report_error(None);
                (self.sink)(data);
                FetchOutcome::Loaded
            }
            Ok(_) => FetchOutcome::Discarded,
            Err(e) => {
                if e.is_transient() {
                    log::warn!("[PAGE] {}: load failed (offline?): {}", self.name, e);
                } else {
                    log::error!("[PAGE] {}: load failed: {}", self.name, e);
                }
                if mounted {
                    self.report_error(Some(&e));
                }
                FetchOutcome::Failed
            }
        }
    }
}
