// Subquery resolver - Replaces the feature tree by following cross-source references
//
// The state machine is pure: events go in, at most one fetch command comes out.
// `SubqueryResolver` drives it from a single task that drains one event queue fed by
// both user requests and fetch settlements, so transitions never interleave.
use crate::application::extract_options::ExtractOptions;
use crate::application::feature_service::build_feature_metadata;
use crate::application::metadata_repository::MetadataRepository;
use crate::domain::attribute::{AttributeGroup, Expansion};
use crate::domain::feature::FeatureMetadata;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

const EVENT_QUEUE_DEPTH: usize = 64;

pub type RequestId = u64;

/// Document to fetch: an IRI and the stack that should answer it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    pub iri: String,
    pub stack: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverState {
    Idle,
    Resolving { request: RequestId, target: FetchTarget },
}

/// Fetch the driver must issue on behalf of the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCommand {
    pub request: RequestId,
    pub target: FetchTarget,
}

#[derive(Debug)]
pub enum ResolverEvent {
    /// Load a root document directly.
    Open { iri: String, stack: Option<String> },
    /// User expanded a group node.
    Expand(Expansion),
    /// A fetch finished, successfully or not.
    Settled {
        request: RequestId,
        outcome: anyhow::Result<Value>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to resolve {iri} from stack {stack}: {message}")]
pub struct ResolveError {
    pub iri: String,
    pub stack: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("subquery resolver has shut down")]
pub struct ResolverClosed;

/// Everything a renderer needs after a transition.
#[derive(Debug, Clone)]
pub struct ResolverSnapshot {
    pub state: ResolverState,
    pub tree: Arc<FeatureMetadata>,
    pub active_stack: String,
    pub last_error: Option<ResolveError>,
    /// Number of settled fetches applied so far (successes and failures).
    pub revision: u64,
}

pub struct ResolverMachine {
    options: ExtractOptions,
    state: ResolverState,
    tree: Arc<FeatureMetadata>,
    active_stack: String,
    last_request: RequestId,
    last_error: Option<ResolveError>,
    revision: u64,
}

impl ResolverMachine {
    pub fn new(options: ExtractOptions, default_stack: String) -> Self {
        let tree = Arc::new(FeatureMetadata::empty(&options.attribute_key));
        Self {
            options,
            state: ResolverState::Idle,
            tree,
            active_stack: default_stack,
            last_request: 0,
            last_error: None,
            revision: 0,
        }
    }

    pub fn snapshot(&self) -> ResolverSnapshot {
        ResolverSnapshot {
            state: self.state.clone(),
            tree: self.tree.clone(),
            active_stack: self.active_stack.clone(),
            last_error: self.last_error.clone(),
            revision: self.revision,
        }
    }

    /// Apply one event. A returned command supersedes any fetch issued earlier.
    pub fn apply(&mut self, event: ResolverEvent) -> Option<FetchCommand> {
        match event {
            ResolverEvent::Open { iri, stack } => {
                let stack = stack.unwrap_or_else(|| self.active_stack.clone());
                Some(self.issue(FetchTarget { iri, stack }))
            }
            ResolverEvent::Expand(Expansion::Local) => None,
            ResolverEvent::Expand(Expansion::Subquery(reference)) => {
                let stack = reference.source.unwrap_or_else(|| self.active_stack.clone());
                Some(self.issue(FetchTarget {
                    iri: reference.iri,
                    stack,
                }))
            }
            ResolverEvent::Settled { request, outcome } => {
                self.settle(request, outcome);
                None
            }
        }
    }

    fn issue(&mut self, target: FetchTarget) -> FetchCommand {
        self.last_request += 1;
        let request = self.last_request;
        if let ResolverState::Resolving { target: previous, .. } = &self.state {
            tracing::debug!("Request {} for {} supersedes {}", request, target.iri, previous.iri);
        }
        self.state = ResolverState::Resolving {
            request,
            target: target.clone(),
        };
        FetchCommand { request, target }
    }

    fn settle(&mut self, request: RequestId, outcome: anyhow::Result<Value>) {
        let target = match &self.state {
            ResolverState::Resolving { request: current, target } if *current == request => {
                target.clone()
            }
            _ => {
                tracing::debug!("Discarding stale response for request {}", request);
                return;
            }
        };

        match outcome {
            Ok(document) => {
                self.tree = Arc::new(build_feature_metadata(&document, &self.options));
                self.active_stack = target.stack;
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!("Subquery for {} on {} failed: {:#}", target.iri, target.stack, e);
                self.last_error = Some(ResolveError {
                    iri: target.iri,
                    stack: target.stack,
                    message: format!("{e:#}"),
                });
            }
        }
        self.state = ResolverState::Idle;
        self.revision += 1;
    }
}

/// Handle to a running resolver task.
#[derive(Clone)]
pub struct SubqueryResolver {
    events: mpsc::Sender<ResolverEvent>,
    snapshots: watch::Receiver<ResolverSnapshot>,
}

impl SubqueryResolver {
    /// Spawn the driver task. It stops once every handle is dropped.
    pub fn spawn(repository: Arc<dyn MetadataRepository>, machine: ResolverMachine) -> Self {
        let (events, mut queue) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let (snapshot_tx, snapshots) = watch::channel(machine.snapshot());
        let settlements = events.downgrade();

        tokio::spawn(async move {
            let mut machine = machine;
            let mut in_flight: Option<JoinHandle<()>> = None;

            while let Some(event) = queue.recv().await {
                if let Some(command) = machine.apply(event) {
                    if let Some(previous) = in_flight.take() {
                        previous.abort();
                    }
                    in_flight = Some(spawn_fetch(repository.clone(), command, settlements.clone()));
                }
                snapshot_tx.send_replace(machine.snapshot());
            }

            if let Some(previous) = in_flight {
                previous.abort();
            }
        });

        Self { events, snapshots }
    }

    pub async fn open(
        &self,
        iri: impl Into<String>,
        stack: Option<String>,
    ) -> Result<(), ResolverClosed> {
        self.send(ResolverEvent::Open {
            iri: iri.into(),
            stack,
        })
        .await
    }

    /// Expand `group`. Only groups carrying a subquery reference reach the queue.
    pub async fn expand(&self, group: &AttributeGroup) -> Result<Expansion, ResolverClosed> {
        let expansion = group.expansion();
        if let Expansion::Subquery(_) = &expansion {
            self.send(ResolverEvent::Expand(expansion.clone())).await?;
        }
        Ok(expansion)
    }

    pub fn snapshot(&self) -> ResolverSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResolverSnapshot> {
        self.snapshots.clone()
    }

    async fn send(&self, event: ResolverEvent) -> Result<(), ResolverClosed> {
        self.events.send(event).await.map_err(|_| ResolverClosed)
    }
}

fn spawn_fetch(
    repository: Arc<dyn MetadataRepository>,
    command: FetchCommand,
    settlements: mpsc::WeakSender<ResolverEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let FetchCommand { request, target } = command;
        let outcome = repository.fetch_document(&target.iri, &target.stack).await;
        if let Some(events) = settlements.upgrade() {
            let _ = events.send(ResolverEvent::Settled { request, outcome }).await;
        }
    })
}
