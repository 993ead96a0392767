use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument, warn};

/// Upper bound for a single request/response exchange with a resource actor.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Params, and Actions)
// =============================================================================

/// Errors raised by the actor plumbing or by an entity hook.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrameworkError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Rejected: {0}")]
    Rejected(String),
    #[error("Version conflict on {id}: expected {expected}, found {actual}")]
    Conflict { id: String, expected: u64, actual: u64 },
    #[error("Arithmetic overflow on {0}")]
    Overflow(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped the request")]
    ActorDropped,
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

/// Trait that any domain entity must implement to be managed by ResourceActor
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;

    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;

    /// Construct the full Entity from the ID and creation params
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, FrameworkError>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), FrameworkError> {
        Ok(())
    }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), FrameworkError>;
    fn on_delete(&self) -> Result<(), FrameworkError> {
        Ok(())
    }

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, FrameworkError>;
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

impl<T: Entity> ResourceRequest<T> {
    /// The caller stopped waiting (timed out or was cancelled) before the
    /// actor got to this request.
    fn is_abandoned(&self) -> bool {
        match self {
            ResourceRequest::Create { respond_to, .. } => respond_to.is_closed(),
            ResourceRequest::Get { respond_to, .. } => respond_to.is_closed(),
            ResourceRequest::List { respond_to } => respond_to.is_closed(),
            ResourceRequest::Update { respond_to, .. } => respond_to.is_closed(),
            ResourceRequest::Delete { respond_to, .. } => respond_to.is_closed(),
            ResourceRequest::Action { respond_to, .. } => respond_to.is_closed(),
        }
    }
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// Owns every instance of `T` and serves requests one at a time.
///
/// Updates and actions run against a copy of the entity which replaces the
/// stored one only when the hook succeeds, so a rejected message never leaves
/// a half-applied entity behind. Requests whose caller already gave up are
/// dropped unapplied.
pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        (actor, ResourceClient::new(sender))
    }

    #[instrument(name = "resource_actor", skip(self), fields(entity = %short_type_name::<T>()))]
    pub async fn run(mut self) {
        debug!("Resource actor starting");
        while let Some(msg) = self.receiver.recv().await {
            if msg.is_abandoned() {
                warn!("Skipping request abandoned by its caller");
                continue;
            }
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.handle_create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::List { respond_to } => {
                    let _ = respond_to.send(Ok(self.store.values().cloned().collect()));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.handle_action(id, action));
                }
            }
        }
        debug!("Resource actor stopped");
    }

    fn handle_create(&mut self, params: T::CreateParams) -> Result<T::Id, FrameworkError> {
        let id = (self.next_id_fn)();
        let mut item = T::from_create_params(id.clone(), params)?;
        item.on_create()?;
        self.store.insert(id.clone(), item);
        Ok(id)
    }

    fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        let item = self
            .store
            .get_mut(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        let mut updated = item.clone();
        updated.on_update(patch)?;
        *item = updated.clone();
        Ok(updated)
    }

    fn handle_delete(&mut self, id: T::Id) -> Result<(), FrameworkError> {
        let item = self
            .store
            .get(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        item.on_delete()?;
        self.store.remove(&id);
        Ok(())
    }

    fn handle_action(&mut self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        let item = self
            .store
            .get_mut(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        let mut working = item.clone();
        let result = working.handle_action(action)?;
        *item = working;
        Ok(result)
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Id generator producing `prefix_1`, `prefix_2`, ...
pub fn sequential_ids(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
    let counter = Arc::new(AtomicU64::new(1));
    move || {
        let id = counter.fetch_add(1, Ordering::SeqCst);
        format!("{}_{}", prefix, id)
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
    timeout: Duration,
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self {
            sender,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T::Id, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to })
            .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    pub async fn list(&self) -> Result<Vec<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::List { respond_to })
            .await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to })
            .await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to })
            .await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to })
            .await
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        let request = build(respond_to);
        match tokio::time::timeout(self.timeout, self.exchange(request, response)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "Resource request timed out");
                Err(FrameworkError::Timeout(self.timeout))
            }
        }
    }

    async fn exchange<R>(
        &self,
        request: ResourceRequest<T>,
        response: oneshot::Receiver<Result<R, FrameworkError>>,
    ) -> Result<R, FrameworkError> {
        self.sender
            .send(request)
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Bin {
        id: String,
        label: String,
        units: u32,
    }

    #[derive(Debug)]
    struct BinCreate {
        label: String,
        units: u32,
    }

    #[derive(Debug)]
    enum BinAction {
        Take(u32),
        Relabel(String),
    }

    impl Entity for Bin {
        type Id = String;
        type CreateParams = BinCreate;
        type Patch = String;
        type Action = BinAction;
        type ActionResult = u32;

        fn id(&self) -> &String {
            &self.id
        }

        fn from_create_params(id: String, params: BinCreate) -> Result<Self, FrameworkError> {
            if params.label.is_empty() {
                return Err(FrameworkError::Rejected("label required".into()));
            }
            Ok(Self {
                id,
                label: params.label,
                units: params.units,
            })
        }

        fn on_update(&mut self, label: String) -> Result<(), FrameworkError> {
            self.label = label;
            Ok(())
        }

        fn handle_action(&mut self, action: BinAction) -> Result<u32, FrameworkError> {
            match action {
                BinAction::Take(amount) => {
                    // Mutate before checking so a rejected take proves the actor discards the copy.
                    self.label.push('*');
                    if amount > self.units {
                        return Err(FrameworkError::Rejected(format!("only {} units", self.units)));
                    }
                    self.units -= amount;
                    Ok(self.units)
                }
                BinAction::Relabel(label) => {
                    self.label = label;
                    Ok(self.units)
                }
            }
        }
    }

    fn start() -> ResourceClient<Bin> {
        let (actor, client) = ResourceActor::new(10, sequential_ids("bin"));
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_resource_actor_with_actions() {
        let client = start();

        let id = client
            .create(BinCreate { label: "A".into(), units: 5 })
            .await
            .unwrap();
        assert_eq!(id, "bin_1");

        let left = client.perform_action(id.clone(), BinAction::Take(2)).await.unwrap();
        assert_eq!(left, 3);

        let bin = client.get(id.clone()).await.unwrap().unwrap();
        assert_eq!(bin.units, 3);
        assert_eq!(bin.label, "A*");

        client
            .perform_action(id.clone(), BinAction::Relabel("B".into()))
            .await
            .unwrap();
        let updated = client.update(id.clone(), "C".into()).await.unwrap();
        assert_eq!(updated.label, "C");
    }

    #[tokio::test]
    async fn test_failed_action_leaves_entity_untouched() {
        let client = start();
        let id = client
            .create(BinCreate { label: "A".into(), units: 1 })
            .await
            .unwrap();

        let err = client.perform_action(id.clone(), BinAction::Take(4)).await.unwrap_err();
        assert!(matches!(err, FrameworkError::Rejected(_)));

        let bin = client.get(id).await.unwrap().unwrap();
        assert_eq!(bin.units, 1);
        assert_eq!(bin.label, "A");
    }

    #[tokio::test]
    async fn test_create_rejection_and_missing_items() {
        let client = start();
        let err = client
            .create(BinCreate { label: String::new(), units: 1 })
            .await
            .unwrap_err();
        assert_eq!(err, FrameworkError::Rejected("label required".into()));

        assert_eq!(client.get("bin_9".into()).await.unwrap(), None);
        assert_eq!(
            client.delete("bin_9".into()).await.unwrap_err(),
            FrameworkError::NotFound("bin_9".into())
        );
        assert_eq!(
            client.perform_action("bin_9".into(), BinAction::Take(1)).await.unwrap_err(),
            FrameworkError::NotFound("bin_9".into())
        );
        assert!(client.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_request_times_out_when_actor_never_answers() {
        let (sender, _receiver) = mpsc::channel::<ResourceRequest<Bin>>(4);
        let client = ResourceClient::new(sender).with_timeout(Duration::from_millis(20));

        let err = client.get("bin_1".into()).await.unwrap_err();
        assert_eq!(err, FrameworkError::Timeout(Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn test_abandoned_request_is_not_applied() {
        let (actor, client) = ResourceActor::<Bin>::new(4, sequential_ids("bin"));
        let impatient = client.clone().with_timeout(Duration::from_millis(20));

        // The actor is not running yet, so the request sits in the queue until the caller gives up.
        let err = impatient
            .create(BinCreate { label: "A".into(), units: 1 })
            .await
            .unwrap_err();
        assert_eq!(err, FrameworkError::Timeout(Duration::from_millis(20)));

        tokio::spawn(actor.run());
        assert!(client.list().await.unwrap().is_empty());

        let id = client
            .create(BinCreate { label: "B".into(), units: 1 })
            .await
            .unwrap();
        assert_eq!(id, "bin_1");
    }

    #[tokio::test]
    async fn test_closed_actor_is_reported() {
        let (sender, receiver) = mpsc::channel::<ResourceRequest<Bin>>(4);
        drop(receiver);
        let client = ResourceClient::new(sender);

        assert_eq!(client.list().await.unwrap_err(), FrameworkError::ActorClosed);
    }
}
