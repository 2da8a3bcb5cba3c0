//! Hot-reload bookkeeping.
//!
//! [`ReloadTracker`] sits between the class-loading hook of a hot-reload agent and the Compose
//! runtime. Every class the hook sees is handed to [`ReloadTracker::submit_class`]:
//!
//! - classes loaded for the first time go straight into the committed [`Snapshot`]
//! - classes loaded as part of a redefinition are buffered in a pending batch
//!
//! Once the redefinition finished, [`ReloadTracker::redefinition_outcome`] either discards the
//! batch (failed redefinition) or merges it into the committed snapshot, diffs the two
//! versions and hands every affected group to the [`GroupInvalidator`].
//!
//! # States
//!
//! ```text
//!          first contribution           outcome received
//!   Idle ───────────────────► Accumulating ──────────────► Committing ──► Idle
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use groupscope::{
//!     analysis::GroupKey,
//!     classfile::ClassBuilder,
//!     reload::{BatchId, ClassLoad, RedefinitionOutcome, ReloadTracker},
//!     AnalysisConfig,
//! };
//!
//! let invalidated = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&invalidated);
//! let tracker = ReloadTracker::new(AnalysisConfig::default(), move |key: GroupKey| {
//!     sink.lock().unwrap().push(key);
//! });
//!
//! let helper = |value: i32| {
//!     ClassBuilder::new("HelperKt")
//!         .method("helper", "()I", |method| {
//!             method.function_key("Landroidx/compose/runtime/internal/FunctionKeyMeta;", 77)
//!                 .code(|code| {
//!                     code.iconst(value).ireturn();
//!                 })
//!         })
//!         .build()
//! };
//!
//! tracker.submit_class(&helper(1), ClassLoad::Initial);
//! tracker.submit_class(&helper(2), ClassLoad::Redefinition(BatchId(1)));
//! let changes = tracker.redefinition_outcome(BatchId(1), RedefinitionOutcome::Success);
//!
//! assert_eq!(changes.len(), 1);
//! assert_eq!(*invalidated.lock().unwrap(), vec![GroupKey(77)]);
//! ```

use std::{
    fmt,
    sync::{Arc, RwLock},
};

use dashmap::DashMap;
use tracing::{debug, error, info, warn};

use crate::{
    analysis::{analyze_class, diff, GroupKey, Invalidation, InvalidationReason, Snapshot},
    classfile::ClassUnit,
    config::AnalysisConfig,
    utils::SharedCell,
    Error,
};

/// Receives the groups to invalidate after a successful redefinition.
///
/// Implemented for every `Fn(GroupKey) + Send + Sync` closure.
pub trait GroupInvalidator: Send + Sync {
    /// Invalidate every group with key `key`.
    fn invalidate_group(&self, key: GroupKey);
}

impl<F> GroupInvalidator for F
where
    F: Fn(GroupKey) + Send + Sync,
{
    fn invalidate_group(&self, key: GroupKey) {
        self(key);
    }
}

/// Identifies one redefinition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatchId(pub u64);

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a class is being loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassLoad {
    /// First definition of the class
    Initial,
    /// New bytes for an already defined class, part of the given batch
    Redefinition(BatchId),
}

/// What [`ReloadTracker::submit_class`] did with a class.
#[derive(Debug)]
pub enum ParseOutcome {
    /// The class lies in an excluded namespace and was not analyzed
    Rejected,
    /// The class could not be decoded and contributes nothing
    Failed(Error),
    /// The scope trees of `methods` methods were recorded
    Contributed {
        /// Number of methods analyzed successfully
        methods: usize,
    },
}

/// Result of a redefinition, as reported by the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedefinitionOutcome {
    /// The new class versions are live
    Success,
    /// The redefinition was rejected; the old class versions stay live
    Failure(String),
}

/// Where the tracker stands with respect to redefinitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum BatchState {
    /// No redefinition in progress
    Idle,
    /// Classes of a redefinition are being collected
    Accumulating(BatchId),
    /// A batch is being merged and diffed
    Committing(BatchId),
}

/// Last recorded result of submitting a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassStatus {
    /// The class was analyzed
    Analyzed {
        /// How the class was loaded
        load: ClassLoad,
        /// Methods with a scope tree
        methods: usize,
        /// Methods skipped because their code or markers were malformed
        failed_methods: usize,
    },
    /// The class could not be decoded
    Failed {
        /// How the class was loaded
        load: ClassLoad,
        /// The decode error
        message: String,
    },
}

/// Final result of one redefinition batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRecord {
    /// The batch
    pub batch: BatchId,
    /// `None` if the batch was discarded, otherwise the invalidations it caused
    pub invalidations: Option<Vec<Invalidation>>,
}

#[derive(Debug)]
struct PendingBatch {
    id: BatchId,
    snapshot: Snapshot,
}

/// Tracks scope trees across class loads and redefinitions.
pub struct ReloadTracker {
    config: AnalysisConfig,
    committed: SharedCell<Snapshot>,
    pending: SharedCell<Option<PendingBatch>>,
    committing: RwLock<Option<BatchId>>,
    classes: DashMap<String, ClassStatus>,
    history: boxcar::Vec<BatchRecord>,
    invalidator: Box<dyn GroupInvalidator>,
}

impl ReloadTracker {
    /// Create a tracker with an empty committed snapshot.
    pub fn new<I>(config: AnalysisConfig, invalidator: I) -> Self
    where
        I: GroupInvalidator + 'static,
    {
        ReloadTracker {
            config,
            committed: SharedCell::new(Snapshot::default()),
            pending: SharedCell::new(None),
            committing: RwLock::new(None),
            classes: DashMap::new(),
            history: boxcar::Vec::new(),
            invalidator: Box::new(invalidator),
        }
    }

    /// The configuration classes are analyzed with.
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one class and record its scope trees.
    ///
    /// Initial loads are merged into the committed snapshot immediately. Redefinitions are
    /// buffered until [`ReloadTracker::redefinition_outcome`] is called for their batch. A
    /// redefinition for a different batch than the one pending replaces the pending batch.
    pub fn submit_class(&self, bytes: &[u8], load: ClassLoad) -> ParseOutcome {
        let name = match ClassUnit::peek_name(bytes) {
            Ok(name) => name,
            Err(e) => {
                error!("Failed parsing scopes of unnamed class: {}", e);
                return ParseOutcome::Failed(e);
            }
        };
        if self.config.is_class_excluded(&name) {
            return ParseOutcome::Rejected;
        }

        let class = match ClassUnit::parse(bytes) {
            Ok(class) => class,
            Err(e) => {
                error!("Failed parsing scopes for '{}': {}", name, e);
                self.classes.insert(
                    name,
                    ClassStatus::Failed {
                        load,
                        message: e.to_string(),
                    },
                );
                return ParseOutcome::Failed(e);
            }
        };

        let analysis = analyze_class(&class, &self.config);
        let methods = analysis.trees.len();
        let failed_methods = analysis.failures.len();
        let incoming: Snapshot = analysis.trees.into_iter().collect();

        match load {
            ClassLoad::Initial => {
                debug!("Parsed scopes for '{}'", name);
                self.committed.update(|snapshot| snapshot.merge(&incoming));
            }
            ClassLoad::Redefinition(batch) => {
                debug!("Parsed scopes for '{}' (redefined)", name);
                let update = self.pending.update(|pending| match pending {
                    Some(current) if current.id == batch => Some(PendingBatch {
                        id: batch,
                        snapshot: current.snapshot.merge(&incoming),
                    }),
                    _ => Some(PendingBatch {
                        id: batch,
                        snapshot: incoming.clone(),
                    }),
                });
                if let Some(stale) = &*update.previous {
                    if stale.id != batch {
                        warn!(
                            "Discarding scopes of batch {} without outcome, superseded by {}",
                            stale.id, batch
                        );
                    }
                }
            }
        }

        self.classes.insert(
            name,
            ClassStatus::Analyzed {
                load,
                methods,
                failed_methods,
            },
        );
        ParseOutcome::Contributed { methods }
    }

    /// Finish redefinition batch `batch`.
    ///
    /// On failure the pending batch is discarded. On success it is merged into the committed
    /// snapshot and every group whose invalidation key changed, plus the groups directly
    /// enclosing the changed scopes, is passed to the invalidator in the returned order.
    ///
    /// Returns an empty list if `batch` is not the pending batch.
    pub fn redefinition_outcome(
        &self,
        batch: BatchId,
        outcome: RedefinitionOutcome,
    ) -> Vec<Invalidation> {
        let Some(incoming) = self.take_pending(batch) else {
            debug!("No pending scopes for batch {}", batch);
            return Vec::new();
        };

        if let RedefinitionOutcome::Failure(reason) = outcome {
            info!("Discarding scopes of failed batch {}: {}", batch, reason);
            self.history.push(BatchRecord {
                batch,
                invalidations: None,
            });
            return Vec::new();
        }

        *write_lock!(self.committing) = Some(batch);

        let update = self
            .committed
            .update(|snapshot| snapshot.merge(&incoming));
        let invalidations = diff(&update.previous, &update.updated);
        self.report(&update.updated, &invalidations);

        for invalidation in &invalidations {
            self.invalidator.invalidate_group(invalidation.key);
        }

        self.history.push(BatchRecord {
            batch,
            invalidations: Some(invalidations.clone()),
        });
        *write_lock!(self.committing) = None;

        invalidations
    }

    fn take_pending(&self, batch: BatchId) -> Option<Snapshot> {
        let mut current = self.pending.load();
        loop {
            let snapshot = match &*current {
                Some(pending) if pending.id == batch => pending.snapshot.clone(),
                _ => return None,
            };
            match self.pending.compare_and_swap(&current, Arc::new(None)) {
                Ok(()) => return Some(snapshot),
                Err(actual) => current = actual,
            }
        }
    }

    fn report(&self, snapshot: &Snapshot, invalidations: &[Invalidation]) {
        if invalidations.is_empty() {
            info!("All groups retained");
            return;
        }

        for invalidation in invalidations
            .iter()
            .filter(|entry| entry.reason == InvalidationReason::Direct)
        {
            let mut methods: Vec<String> = Vec::new();
            for scope in snapshot.group(invalidation.key) {
                if let Some(tree) = snapshot.tree(*scope) {
                    let name = tree.method().short_name();
                    if !methods.contains(&name) {
                        methods.push(name);
                    }
                }
            }
            info!(
                "Invalidating group '{}' ({})",
                invalidation.key,
                methods.join(", ")
            );
        }

        let parents: Vec<String> = invalidations
            .iter()
            .filter(|entry| entry.reason == InvalidationReason::ParentWidening)
            .map(|entry| entry.key.to_string())
            .collect();
        if !parents.is_empty() {
            info!("Invalidating parent groups '{}'", parents.join(", "));
        }
    }

    /// The committed snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.committed.load()
    }

    /// Scope trees of the pending batch, if one is being accumulated.
    #[must_use]
    pub fn pending(&self) -> Option<(BatchId, Snapshot)> {
        match &*self.pending.load() {
            Some(pending) => Some((pending.id, pending.snapshot.clone())),
            None => None,
        }
    }

    /// The current redefinition state.
    #[must_use]
    pub fn state(&self) -> BatchState {
        if let Some(batch) = *read_lock!(self.committing) {
            return BatchState::Committing(batch);
        }
        match &*self.pending.load() {
            Some(pending) => BatchState::Accumulating(pending.id),
            None => BatchState::Idle,
        }
    }

    /// The last recorded status of class `name`.
    #[must_use]
    pub fn class_status(&self, name: &str) -> Option<ClassStatus> {
        self.classes.get(name).map(|status| status.value().clone())
    }

    /// Every finished batch, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &BatchRecord> {
        self.history.iter().map(|(_, record)| record)
    }
}

impl fmt::Debug for ReloadTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloadTracker")
            .field("state", &self.state())
            .field("committed", &self.committed.load().len())
            .field("classes", &self.classes.len())
            .field("batches", &self.history.count())
            .finish_non_exhaustive()
    }
}
