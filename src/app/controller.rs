//! Application state controller
//!
//! The controller owns the view, the catalog mirror and the progress mirror.
//! Every collaborator call runs on a spawned task through [`SyncWorker`] and
//! reports back as an [`Event`] on an mpsc channel; the owner of the
//! controller drains that channel with [`Controller::pump`] (the TUI does so
//! once per frame), so state is only ever mutated from one place.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::context::ClientContext;
use super::view::{Navigation, View};
use crate::assistant::{AssistKind, AssistRequest};
use crate::catalog::{Question, Topic, decode_catalog, find_question, seed_documents};
use crate::clock::Clock;
use crate::identity::{IdentityError, Principal};
use crate::progress::{ProgressMirror, ProgressRecord, ProgressStats, Status, decode_mirror};
use crate::store::{BatchWrite, Snapshot, StoreError, Subscription, WriteMode};

/// Where the session is in its bootstrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Signing in
    Connecting,
    /// Signed in, waiting for the first catalog snapshot
    Syncing,
    /// Catalog mirror populated
    Ready,
    /// Bootstrap stopped; the reason is shown instead of a spinner
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Connecting | LoadState::Syncing)
    }
}

/// Outcome of a remote operation, surfaced to the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
    /// Text returned by the assistant (possibly an error message)
    Reply { title: String, text: String },
}

/// Result of the seed-if-empty check
#[derive(Debug)]
pub enum SeedOutcome {
    /// The catalog already held this many topics; nothing was written
    AlreadyPresent(usize),
    /// The seed set was written as one batch of this many topics
    Seeded(usize),
    /// The batch was rejected; the store left the catalog untouched
    Failed(StoreError),
}

/// Completion events sent from spawned tasks to the controller
#[derive(Debug)]
enum Event {
    SessionStarted(Principal),
    SignInFailed(String),
    PrincipalChanged(Option<Principal>),
    CatalogSeeded(usize),
    SeedFailed(String),
    CatalogUnavailable(String),
    CatalogSnapshot(Arc<Snapshot>),
    ProgressSnapshot { uid: String, snapshot: Arc<Snapshot> },
    ProgressUnavailable(String),
    SubscriptionClosed(&'static str),
    StatusWritten { question_id: String, status: Status, result: Result<(), String> },
    AssistantReplied { title: String, text: String },
}

/// Async half of the controller
///
/// Cheap to clone; every clone shares the client context, the event channel
/// and the session cancellation token.
#[derive(Clone)]
pub struct SyncWorker {
    context: Arc<ClientContext>,
    tx: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
}

impl SyncWorker {
    fn send(&self, event: Event) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Controller gone, dropping event");
        }
    }

    /// Reuse the active principal, else exchange the bootstrap token, else
    /// sign in anonymously
    pub async fn initialize_session(&self) -> Result<Principal, IdentityError> {
        let identity = &self.context.identity;

        if let Some(principal) = identity.current() {
            tracing::info!("Reusing session {}", principal.uid);
            return Ok(principal);
        }

        match self.context.auth_token.as_deref().filter(|t| !t.trim().is_empty()) {
            Some(token) => identity.sign_in_with_custom_token(token).await,
            None => identity.sign_in_anonymously().await,
        }
    }

    /// Write the static seed set if, and only if, the catalog is empty
    ///
    /// An error means the catalog could not even be read.
    pub async fn ensure_catalog_seeded(&self) -> Result<SeedOutcome, StoreError> {
        let path = self.context.catalog_path();
        let existing = self.context.store.get_all(&path).await?;

        if !existing.is_empty() {
            tracing::info!("Problems already exist, skipping seed");
            return Ok(SeedOutcome::AlreadyPresent(existing.len()));
        }

        tracing::info!("Seeding {} with the initial problem set", path);
        let writes: Vec<BatchWrite> = match seed_documents() {
            Ok(documents) => documents
                .into_iter()
                .map(|(id, value)| BatchWrite { collection: path.clone(), id, value })
                .collect(),
            Err(e) => return Ok(SeedOutcome::Failed(e.into())),
        };
        let count = writes.len();

        match self.context.store.batch_write(writes).await {
            Ok(()) => {
                tracing::info!("Seeded {} topics", count);
                Ok(SeedOutcome::Seeded(count))
            }
            Err(e) => {
                tracing::error!("Error seeding catalog: {}", e);
                Ok(SeedOutcome::Failed(e))
            }
        }
    }

    /// Open the catalog subscription and forward its snapshots until the
    /// session ends
    pub async fn subscribe_to_catalog(&self) -> Result<(), StoreError> {
        let subscription = self.context.store.subscribe(&self.context.catalog_path()).await?;
        let worker = self.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            worker.forward(subscription, cancel, "catalog", Event::CatalogSnapshot).await;
        });
        Ok(())
    }

    /// Open the progress subscription for `uid`, forwarding snapshots until
    /// `cancel` fires
    pub async fn subscribe_to_progress(
        &self,
        uid: &str,
        cancel: CancellationToken,
    ) -> Result<(), StoreError> {
        let subscription = self.context.store.subscribe(&self.context.progress_path(uid)).await?;
        let worker = self.clone();
        let uid = uid.to_string();
        tokio::spawn(async move {
            worker
                .forward(subscription, cancel, "progress", move |snapshot| {
                    Event::ProgressSnapshot { uid: uid.clone(), snapshot }
                })
                .await;
        });
        Ok(())
    }

    async fn forward(
        &self,
        mut subscription: Subscription,
        cancel: CancellationToken,
        name: &'static str,
        to_event: impl Fn(Arc<Snapshot>) -> Event,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("{} subscription torn down", name);
                    break;
                }
                next = subscription.next() => match next {
                    Some(snapshot) => self.send(to_event(snapshot)),
                    None => {
                        tracing::warn!("{} subscription closed by the store", name);
                        self.send(Event::SubscriptionClosed(name));
                        break;
                    }
                },
            }
        }
    }

    /// Merge a progress record into the principal's progress collection
    pub async fn write_status(
        &self,
        uid: &str,
        question_id: &str,
        record: ProgressRecord,
    ) -> Result<(), StoreError> {
        let value = serde_json::to_value(record)?;
        self.context
            .store
            .set(&self.context.progress_path(uid), question_id, value, WriteMode::Merge)
            .await
    }

    /// Sign in, seed, then subscribe to the catalog
    async fn bootstrap(self) {
        match self.initialize_session().await {
            Ok(principal) => self.send(Event::SessionStarted(principal)),
            Err(e) => {
                tracing::error!("Error during sign-in: {}", e);
                self.send(Event::SignInFailed(e.to_string()));
                return;
            }
        }

        match self.ensure_catalog_seeded().await {
            Ok(SeedOutcome::Seeded(count)) => self.send(Event::CatalogSeeded(count)),
            Ok(SeedOutcome::Failed(e)) => self.send(Event::SeedFailed(e.to_string())),
            Ok(SeedOutcome::AlreadyPresent(_)) => {}
            Err(e) => {
                tracing::error!("Error checking catalog: {}", e);
                self.send(Event::CatalogUnavailable(e.to_string()));
                return;
            }
        }

        if let Err(e) = self.subscribe_to_catalog().await {
            tracing::error!("Error subscribing to catalog: {}", e);
            self.send(Event::CatalogUnavailable(e.to_string()));
        }
    }

    /// Forward identity changes until the session ends
    async fn watch_identity(self) {
        let mut changes = self.context.identity.on_auth_state_change();
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let principal = changes.borrow_and_update().clone();
                    self.send(Event::PrincipalChanged(principal));
                }
            }
        }
    }
}

/// Owner of all UI-visible state
pub struct Controller {
    worker: SyncWorker,
    rx: mpsc::UnboundedReceiver<Event>,
    clock: Clock,
    started: bool,

    view: View,
    catalog: Vec<Topic>,
    progress: ProgressMirror,
    session: Option<Principal>,
    load: LoadState,

    /// Cancels the current principal's progress subscription
    progress_cancel: Option<CancellationToken>,
    progress_loaded: bool,
    pending_writes: usize,
    /// Title of the in-flight assistant request
    assistance_pending: Option<String>,
    notices: Vec<Notice>,
}

impl Controller {
    pub fn new(context: ClientContext) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = SyncWorker { context: Arc::new(context), tx, cancel: CancellationToken::new() };

        Self {
            worker,
            rx,
            clock: Clock::System,
            started: false,
            view: View::default(),
            catalog: Vec::new(),
            progress: ProgressMirror::new(),
            session: None,
            load: LoadState::Connecting,
            progress_cancel: None,
            progress_loaded: false,
            pending_writes: 0,
            assistance_pending: None,
            notices: Vec::new(),
        }
    }

    /// Use `clock` to stamp progress records
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Kick off the bootstrap and the identity watcher
    ///
    /// Must be called from inside a tokio runtime. Calling it twice is a
    /// no-op.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        tokio::spawn(self.worker.clone().watch_identity());
        tokio::spawn(self.worker.clone().bootstrap());
    }

    /// Apply every completion event that has arrived, returning the notices
    /// they produced
    pub fn pump(&mut self) -> Vec<Notice> {
        while let Ok(event) = self.rx.try_recv() {
            self.apply(event);
        }
        self.take_notices()
    }

    /// Notices produced since the last call
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Apply events as they arrive until `done` holds or `timeout` elapses
    ///
    /// Returns whether `done` held. Used by headless callers and tests.
    pub async fn wait_until(&mut self, timeout: Duration, done: impl Fn(&Self) -> bool) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if done(self) {
                return true;
            }
            match tokio::time::timeout_at(deadline, self.rx.recv()).await {
                Ok(Some(event)) => self.apply(event),
                Ok(None) | Err(_) => return done(self),
            }
        }
    }

    fn apply(&mut self, event: Event) {
        match event {
            Event::SessionStarted(principal) => self.adopt_principal(Some(principal)),
            Event::PrincipalChanged(principal) => self.adopt_principal(principal),
            Event::SignInFailed(reason) => {
                self.load = LoadState::Failed(format!("Sign-in failed: {reason}"));
                self.notices.push(Notice::Error(format!("Sign-in failed: {reason}")));
            }
            Event::CatalogSeeded(count) => {
                self.notices.push(Notice::Info(format!("Seeded catalog with {count} topics")));
            }
            Event::SeedFailed(reason) => {
                self.notices.push(Notice::Error(format!("Seeding the catalog failed: {reason}")));
            }
            Event::CatalogUnavailable(reason) => {
                self.load = LoadState::Failed(format!("Catalog unavailable: {reason}"));
                self.notices.push(Notice::Error(format!("Catalog unavailable: {reason}")));
            }
            Event::CatalogSnapshot(snapshot) => {
                self.catalog = decode_catalog(snapshot.iter());
                self.view = self.view.refreshed(&self.catalog);
                self.load = LoadState::Ready;
                tracing::debug!("Catalog snapshot: {} topics", self.catalog.len());
            }
            Event::ProgressSnapshot { uid, snapshot } => {
                if self.session.as_ref().is_some_and(|p| p.uid == uid) {
                    self.progress = decode_mirror(snapshot.iter());
                    self.progress_loaded = true;
                } else {
                    tracing::debug!("Dropping stale progress snapshot for {}", uid);
                }
            }
            Event::ProgressUnavailable(reason) => {
                self.notices.push(Notice::Error(format!("Progress unavailable: {reason}")));
            }
            Event::SubscriptionClosed(name) => {
                self.notices.push(Notice::Error(format!("The {name} subscription closed")));
            }
            Event::StatusWritten { question_id, status, result } => {
                self.pending_writes = self.pending_writes.saturating_sub(1);
                let name = find_question(&self.catalog, &question_id)
                    .map(|(_, q)| q.name.clone())
                    .unwrap_or(question_id);
                self.notices.push(match result {
                    Ok(()) => Notice::Info(format!("{name}: {status}")),
                    Err(e) => Notice::Error(format!("Failed to update {name}: {e}")),
                });
            }
            Event::AssistantReplied { title, text } => {
                self.assistance_pending = None;
                self.notices.push(Notice::Reply { title, text });
            }
        }
    }

    /// Switch the session to `principal`, re-scoping the progress mirror
    fn adopt_principal(&mut self, principal: Option<Principal>) {
        let current = self.session.as_ref().map(|p| p.uid.as_str());
        if current == principal.as_ref().map(|p| p.uid.as_str()) {
            return;
        }

        if let Some(cancel) = self.progress_cancel.take() {
            cancel.cancel();
        }
        self.progress.clear();
        self.progress_loaded = false;
        self.session = principal;

        match self.session.clone() {
            Some(principal) => {
                tracing::info!("Session is now {}", principal.uid);
                if self.load == LoadState::Connecting {
                    self.load = LoadState::Syncing;
                }
                self.subscribe_to_progress(&principal.uid);
            }
            None => {
                tracing::info!("Signed out");
                self.notices.push(Notice::Info("Signed out".to_string()));
            }
        }
    }

    /// Start mirroring `uid`'s progress collection
    pub fn subscribe_to_progress(&mut self, uid: &str) {
        let cancel = self.worker.cancel.child_token();
        self.progress_cancel = Some(cancel.clone());

        let worker = self.worker.clone();
        let uid = uid.to_string();
        tokio::spawn(async move {
            if let Err(e) = worker.subscribe_to_progress(&uid, cancel).await {
                tracing::error!("Error fetching user progress: {}", e);
                worker.send(Event::ProgressUnavailable(e.to_string()));
            }
        });
    }

    /// Write a new status for `question_id`
    ///
    /// Returns `false` (and writes nothing) when no session is active or its
    /// progress has not been mirrored yet, since the record computed without
    /// the stored one could overwrite an earlier `solvedAt`. The mirror
    /// changes only when the progress subscription delivers the write back.
    pub fn set_status(&mut self, question_id: &str, status: Status) -> bool {
        let Some(principal) = &self.session else {
            tracing::debug!("Ignoring status change for {}: no session", question_id);
            return false;
        };
        if !self.progress_loaded {
            tracing::debug!("Ignoring status change for {}: progress not loaded", question_id);
            return false;
        }

        let record =
            ProgressRecord::transition(self.progress.get(question_id), status, self.clock.now());
        self.pending_writes += 1;

        let worker = self.worker.clone();
        let uid = principal.uid.clone();
        let question_id = question_id.to_string();
        tokio::spawn(async move {
            let result = worker.write_status(&uid, &question_id, record).await.map_err(|e| {
                tracing::error!("Error updating status for {}: {}", question_id, e);
                e.to_string()
            });
            worker.send(Event::StatusWritten { question_id, status, result });
        });
        true
    }

    /// Apply a view transition
    pub fn navigate(&mut self, navigation: Navigation) {
        self.view = std::mem::take(&mut self.view).navigate(navigation);
    }

    /// Ask the assistant about `question`
    ///
    /// Returns `false` when the request cannot be composed (unknown approach).
    pub fn request_assistance(&mut self, question: &Question, kind: AssistKind) -> bool {
        let Some(request) = AssistRequest::compose(kind, question) else {
            return false;
        };

        self.assistance_pending = Some(request.title.clone());
        let worker = self.worker.clone();
        tokio::spawn(async move {
            let text = worker.context.assistant.generate(&request.prompt).await;
            worker.send(Event::AssistantReplied { title: request.title, text });
        });
        true
    }

    /// Tear down every subscription of this session
    pub fn shutdown(&mut self) {
        self.worker.cancel.cancel();
        self.progress_cancel = None;
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn catalog(&self) -> &[Topic] {
        &self.catalog
    }

    pub fn progress(&self) -> &ProgressMirror {
        &self.progress
    }

    pub fn session(&self) -> Option<&Principal> {
        self.session.as_ref()
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// Whether the progress mirror reflects at least one snapshot
    pub fn progress_loaded(&self) -> bool {
        self.progress_loaded
    }

    pub fn pending_writes(&self) -> usize {
        self.pending_writes
    }

    pub fn assistance_pending(&self) -> Option<&str> {
        self.assistance_pending.as_deref()
    }

    pub fn stats(&self) -> ProgressStats {
        ProgressStats::compute(&self.catalog, &self.progress)
    }

    pub fn status_of(&self, question_id: &str) -> Status {
        crate::progress::status_of(&self.progress, question_id)
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.worker.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::Assistant;
    use crate::catalog::{cses_problem_set, document_key};
    use crate::identity::{IdentityProvider, LocalIdentity};
    use crate::store::{CollectionPath, DocumentStore, MemoryStore};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    const APP: &str = "test-app";
    const WAIT: Duration = Duration::from_secs(5);

    struct EchoAssistant;

    #[async_trait]
    impl Assistant for EchoAssistant {
        async fn generate(&self, prompt: &str) -> String {
            format!("echo: {prompt}")
        }
    }

    /// Store that rejects every single-document write
    struct ReadOnlyStore(MemoryStore);

    #[async_trait]
    impl DocumentStore for ReadOnlyStore {
        async fn get(&self, c: &CollectionPath, id: &str) -> Result<Option<Value>, StoreError> {
            self.0.get(c, id).await
        }
        async fn get_all(&self, c: &CollectionPath) -> Result<Snapshot, StoreError> {
            self.0.get_all(c).await
        }
        async fn set(
            &self,
            _: &CollectionPath,
            _: &str,
            _: Value,
            _: WriteMode,
        ) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("permission denied".to_string()))
        }
        async fn batch_write(&self, writes: Vec<BatchWrite>) -> Result<(), StoreError> {
            self.0.batch_write(writes).await
        }
        async fn subscribe(&self, c: &CollectionPath) -> Result<Subscription, StoreError> {
            self.0.subscribe(c).await
        }
    }

    struct Harness {
        store: MemoryStore,
        identity: Arc<LocalIdentity>,
        controller: Controller,
    }

    fn harness_with(store: MemoryStore, token: Option<&str>) -> Harness {
        let identity = Arc::new(LocalIdentity::ephemeral());
        let context = ClientContext::new(
            Arc::new(store.clone()),
            identity.clone(),
            Arc::new(EchoAssistant),
            APP,
        )
        .with_auth_token(token.map(str::to_string));
        Harness { store, identity, controller: Controller::new(context) }
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    async fn ready(controller: &mut Controller) {
        controller.start();
        assert!(
            controller
                .wait_until(WAIT, |c| *c.load_state() == LoadState::Ready && c.progress_loaded())
                .await
        );
    }

    #[tokio::test]
    async fn bootstrap_seeds_empty_catalog() {
        let mut h = harness_with(MemoryStore::new(), None);
        ready(&mut h.controller).await;

        let expected: Vec<Topic> = cses_problem_set()
            .into_iter()
            .map(|mut t| {
                t.id = document_key(&t.name);
                t
            })
            .collect();
        assert_eq!(h.controller.catalog(), expected.as_slice());

        let stored = h.store.get_all(&CollectionPath::catalog(APP)).await.unwrap();
        assert_eq!(
            stored.keys().cloned().collect::<Vec<_>>(),
            vec!["Introductory_Problems", "Sorting_and_Searching"]
        );
        assert!(h.controller.take_notices().contains(&Notice::Info(
            "Seeded catalog with 2 topics".to_string()
        )));
        assert!(h.controller.session().unwrap().anonymous);
    }

    #[tokio::test]
    async fn existing_catalog_is_not_reseeded() {
        let store = MemoryStore::new();
        store
            .set(
                &CollectionPath::catalog(APP),
                "Graphs",
                json!({"topic": "Graphs", "questions": []}),
                WriteMode::Replace,
            )
            .await
            .unwrap();

        let mut h = harness_with(store, None);
        ready(&mut h.controller).await;

        assert_eq!(h.controller.catalog().len(), 1);
        assert_eq!(h.controller.catalog()[0].name, "Graphs");
        assert_eq!(h.store.get_all(&CollectionPath::catalog(APP)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn status_cycle_preserves_first_solve() {
        let mut h = harness_with(MemoryStore::new(), Some("user-1"));
        h.controller = h.controller.with_clock(Clock::fixed(at("2025-03-01T10:00:00Z")));
        ready(&mut h.controller).await;
        let path = CollectionPath::progress(APP, "user-1");

        let steps = [
            (Status::Attempting, "2025-03-01T10:00:00Z"),
            (Status::Solved, "2025-03-02T10:00:00Z"),
            (Status::ToDo, "2025-03-03T10:00:00Z"),
            (Status::Solved, "2025-03-04T10:00:00Z"),
        ];

        for (status, time) in steps {
            *h.controller.clock_mut() = Clock::fixed(at(time));
            assert!(h.controller.set_status("cses_1068", status));
            assert!(
                h.controller
                    .wait_until(WAIT, |c| {
                        c.pending_writes() == 0
                            && c.progress().get("cses_1068").map(|r| r.updated_at) == Some(at(time))
                    })
                    .await
            );

            if status == Status::Attempting {
                let stored = h.store.get(&path, "cses_1068").await.unwrap().unwrap();
                assert_eq!(
                    stored,
                    json!({"status": "Attempting", "updatedAt": "2025-03-01T10:00:00Z"})
                );
            }
        }

        let stored = h.store.get(&path, "cses_1068").await.unwrap().unwrap();
        assert_eq!(
            stored,
            json!({
                "status": "Solved",
                "updatedAt": "2025-03-04T10:00:00Z",
                "solvedAt": "2025-03-02T10:00:00Z"
            })
        );
        assert_eq!(h.controller.stats().solved, 1);
    }

    #[tokio::test]
    async fn set_status_without_session_is_a_no_op() {
        let mut h = harness_with(MemoryStore::new(), None);
        assert!(!h.controller.set_status("cses_1068", Status::Solved));
        assert_eq!(h.controller.pending_writes(), 0);
    }

    #[tokio::test]
    async fn set_status_waits_for_first_progress_snapshot() {
        let mut h = harness_with(MemoryStore::new(), None);
        let solved_at = "2025-01-01T00:00:00Z";
        h.store
            .set(
                &CollectionPath::progress(APP, "alice"),
                "cses_1068",
                json!({"status": "Attempting", "updatedAt": solved_at, "solvedAt": solved_at}),
                WriteMode::Replace,
            )
            .await
            .unwrap();

        h.controller.apply(Event::SessionStarted(Principal {
            uid: "alice".to_string(),
            anonymous: true,
        }));
        assert!(h.controller.session().is_some());
        assert!(!h.controller.progress_loaded());
        assert!(!h.controller.set_status("cses_1068", Status::Solved));
        assert_eq!(h.controller.pending_writes(), 0);

        assert!(h.controller.wait_until(WAIT, |c| c.progress_loaded()).await);
        assert!(h.controller.set_status("cses_1068", Status::Solved));
        assert!(h.controller.wait_until(WAIT, |c| c.pending_writes() == 0).await);

        let stored = h
            .store
            .get(&CollectionPath::progress(APP, "alice"), "cses_1068")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["solvedAt"], json!(solved_at));
        assert_eq!(stored["status"], json!("Solved"));
    }

    #[tokio::test]
    async fn existing_principal_is_reused() {
        let h = harness_with(MemoryStore::new(), Some("token-user"));
        h.identity.sign_in_with_custom_token("already-here").await.unwrap();

        let mut controller = h.controller;
        ready(&mut controller).await;
        assert_eq!(controller.session().map(|p| p.uid.as_str()), Some("already-here"));
    }

    #[tokio::test]
    async fn rejected_token_fails_visibly() {
        let mut h = harness_with(MemoryStore::new(), Some("not a token"));
        h.controller.start();
        assert!(
            h.controller
                .wait_until(WAIT, |c| matches!(c.load_state(), LoadState::Failed(_)))
                .await
        );
        assert!(h.controller.session().is_none());
        assert!(h.controller.catalog().is_empty());
    }

    #[tokio::test]
    async fn failed_write_leaves_mirror_untouched() {
        let store = MemoryStore::new();
        let identity = Arc::new(LocalIdentity::ephemeral());
        let context = ClientContext::new(
            Arc::new(ReadOnlyStore(store)),
            identity,
            Arc::new(EchoAssistant),
            APP,
        );
        let mut controller = Controller::new(context);
        ready(&mut controller).await;
        controller.take_notices();

        assert!(controller.set_status("cses_1083", Status::Solved));
        assert!(controller.wait_until(WAIT, |c| c.pending_writes() == 0).await);

        assert_eq!(controller.status_of("cses_1083"), Status::ToDo);
        let notices = controller.take_notices();
        assert!(matches!(
            notices.as_slice(),
            [Notice::Error(message)] if message.starts_with("Failed to update Missing Number")
        ));
    }

    #[tokio::test]
    async fn identity_change_rescopes_progress() {
        let mut h = harness_with(MemoryStore::new(), Some("alice"));
        ready(&mut h.controller).await;

        h.controller.set_status("cses_1621", Status::Solved);
        assert!(h.controller.wait_until(WAIT, |c| c.status_of("cses_1621") == Status::Solved).await);

        h.identity.sign_in_with_custom_token("bob").await.unwrap();
        assert!(
            h.controller
                .wait_until(WAIT, |c| {
                    c.session().map(|p| p.uid.as_str()) == Some("bob") && c.progress_loaded()
                })
                .await
        );
        assert_eq!(h.controller.status_of("cses_1621"), Status::ToDo);

        h.identity.sign_out().await.unwrap();
        assert!(h.controller.wait_until(WAIT, |c| c.session().is_none()).await);
        assert!(h.controller.progress().is_empty());
        assert!(!h.controller.set_status("cses_1621", Status::Solved));
    }

    #[tokio::test]
    async fn assistant_reply_becomes_notice() {
        let mut h = harness_with(MemoryStore::new(), None);
        ready(&mut h.controller).await;
        h.controller.take_notices();

        let question = find_question(h.controller.catalog(), "cses_1091").unwrap().1.clone();
        assert!(h.controller.request_assistance(&question, AssistKind::Hint));
        assert_eq!(h.controller.assistance_pending(), Some("AI Generated Hint"));

        assert!(h.controller.wait_until(WAIT, |c| c.assistance_pending().is_none()).await);
        let notices = h.controller.take_notices();
        assert!(matches!(
            notices.as_slice(),
            [Notice::Reply { title, text }]
                if title == "AI Generated Hint" && text.contains("\"Concert Tickets\"")
        ));

        assert!(!h.controller.request_assistance(&question, AssistKind::Explain { approach: 42 }));
    }

    #[tokio::test]
    async fn catalog_snapshot_refreshes_open_topic() {
        let mut h = harness_with(MemoryStore::new(), None);
        ready(&mut h.controller).await;

        let topic = h.controller.catalog()[0].clone();
        h.controller.navigate(Navigation::SelectTopic(topic.clone()));

        let mut renamed = topic.clone();
        renamed.questions.truncate(1);
        h.store
            .set(
                &CollectionPath::catalog(APP),
                &topic.id,
                serde_json::to_value(&renamed).unwrap(),
                WriteMode::Replace,
            )
            .await
            .unwrap();

        assert!(
            h.controller
                .wait_until(WAIT, |c| c.view().topic().is_some_and(|t| t.questions.len() == 1))
                .await
        );
        assert_eq!(h.controller.view().name(), "Topic");
    }

    #[tokio::test]
    async fn shutdown_stops_snapshots() {
        let mut h = harness_with(MemoryStore::new(), None);
        ready(&mut h.controller).await;
        h.controller.shutdown();
        tokio::task::yield_now().await;

        h.store
            .set(
                &CollectionPath::catalog(APP),
                "Extra",
                json!({"topic": "Extra"}),
                WriteMode::Replace,
            )
            .await
            .unwrap();
        let grew = h.controller.wait_until(Duration::from_millis(100), |c| c.catalog().len() == 3);
        assert!(!grew.await);
    }
}
