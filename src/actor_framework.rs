use std::fmt::{Debug, Display};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument, warn};

use crate::store::{JsonStore, StoreResult};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, DTOs, and Actions)
// =============================================================================

/// Trait that any persisted domain entity must implement to be managed by
/// a [`ResourceActor`].
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Id: Eq + Clone + Send + Sync + Display + Debug;
    type CreatePayload: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;
    type Error: std::error::Error + Clone + Send + Sync + 'static;

    /// Short name used in log fields.
    const KIND: &'static str;

    fn id(&self) -> &Self::Id;

    /// Construct the full entity from the assigned ID and the payload
    fn from_create(id: Self::Id, payload: Self::CreatePayload) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), Self::Error> { Ok(()) }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), Self::Error>;
    fn on_delete(&self) -> Result<(), Self::Error> { Ok(()) }

    // --- Action Handler ---

    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;

    /// Whether a successful `action` changes the entity and must be persisted.
    fn action_mutates(_action: &Self::Action) -> bool { true }
}

/// Errors produced by the framework itself, wrapping the entity's own error type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError<E> {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    AlreadyExists(String),
    #[error("{0}")]
    Entity(E),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

pub type FrameworkResult<T, E> = Result<T, FrameworkError<E>>;

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, E> = oneshot::Sender<FrameworkResult<T, E>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        payload: T::CreatePayload,
        respond_to: Response<T, T::Error>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>, T::Error>,
    },
    List {
        respond_to: Response<Vec<T>, T::Error>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T, T::Error>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<(), T::Error>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult, T::Error>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// How many ids `handle_create` draws before reporting a collision.
const ID_ATTEMPTS: usize = 4;

type NextIdFn<T> = Box<dyn Fn(&<T as Entity>::CreatePayload) -> <T as Entity>::Id + Send + Sync>;

/// Sole owner of one persisted collection.
///
/// Requests are handled one at a time, so every read-modify-write against the
/// backing file is serialized. A mutation is applied to a copy of the
/// collection, saved, and only then made visible; a failed save leaves the
/// in-memory state untouched.
pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    items: Vec<T>,
    store: JsonStore<T>,
    next_id_fn: NextIdFn<T>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        items: Vec<T>,
        store: JsonStore<T>,
        next_id_fn: impl Fn(&T::CreatePayload) -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            items,
            store,
            next_id_fn: Box::new(next_id_fn),
        };
        (actor, ResourceClient::new(sender))
    }

    /// Load the collection from `store` and build the actor around it.
    pub async fn open(
        buffer_size: usize,
        store: JsonStore<T>,
        next_id_fn: impl Fn(&T::CreatePayload) -> T::Id + Send + Sync + 'static,
    ) -> StoreResult<(Self, ResourceClient<T>)> {
        let items = store.load().await?;
        Ok(Self::new(buffer_size, items, store, next_id_fn))
    }

    #[instrument(name = "resource_actor", fields(kind = T::KIND), skip(self))]
    pub async fn run(mut self) {
        info!(count = self.items.len(), path = %self.store.path().display(), "Actor starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { payload, respond_to } => {
                    let _ = respond_to.send(self.handle_create(payload).await);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.position(&id).map(|i| self.items[i].clone())));
                }
                ResourceRequest::List { respond_to } => {
                    let _ = respond_to.send(Ok(self.items.clone()));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch).await);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id).await);
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.handle_action(id, action).await);
                }
            }
        }

        info!("Actor stopped");
    }

    fn position(&self, id: &T::Id) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    fn locate(&self, id: &T::Id) -> FrameworkResult<usize, T::Error> {
        self.position(id).ok_or_else(|| {
            debug!(id = %id, "Item not found");
            FrameworkError::NotFound(id.to_string())
        })
    }

    async fn commit(&mut self, next: Vec<T>) -> FrameworkResult<(), T::Error> {
        if let Err(e) = self.store.save(&next).await {
            error!(error = %e, "Failed to persist collection");
            return Err(FrameworkError::Storage(e.to_string()));
        }
        self.items = next;
        Ok(())
    }

    #[instrument(skip(self, payload))]
    async fn handle_create(&mut self, payload: T::CreatePayload) -> FrameworkResult<T, T::Error> {
        // Generated ids may collide; ids derived from the payload collide every time
        let mut id = (self.next_id_fn)(&payload);
        for _ in 1..ID_ATTEMPTS {
            if self.position(&id).is_none() {
                break;
            }
            debug!(id = %id, "Id taken, generating another");
            id = (self.next_id_fn)(&payload);
        }
        if self.position(&id).is_some() {
            warn!(id = %id, "Item already exists");
            return Err(FrameworkError::AlreadyExists(id.to_string()));
        }

        let mut item = T::from_create(id, payload).map_err(FrameworkError::Entity)?;
        item.on_create().map_err(FrameworkError::Entity)?;

        let mut next = self.items.clone();
        next.push(item.clone());
        self.commit(next).await?;

        info!(id = %item.id(), "Item created");
        Ok(item)
    }

    #[instrument(fields(id = %id), skip(self, id, patch))]
    async fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> FrameworkResult<T, T::Error> {
        let index = self.locate(&id)?;

        let mut next = self.items.clone();
        next[index].on_update(patch).map_err(FrameworkError::Entity)?;
        let updated = next[index].clone();
        self.commit(next).await?;

        info!("Item updated");
        Ok(updated)
    }

    #[instrument(fields(id = %id), skip(self, id))]
    async fn handle_delete(&mut self, id: T::Id) -> FrameworkResult<(), T::Error> {
        let index = self.locate(&id)?;
        self.items[index].on_delete().map_err(FrameworkError::Entity)?;

        let mut next = self.items.clone();
        next.remove(index);
        self.commit(next).await?;

        info!("Item deleted");
        Ok(())
    }

    #[instrument(fields(id = %id), skip(self, id))]
    async fn handle_action(&mut self, id: T::Id, action: T::Action) -> FrameworkResult<T::ActionResult, T::Error> {
        let index = self.locate(&id)?;

        if !T::action_mutates(&action) {
            let mut scratch = self.items[index].clone();
            return scratch.handle_action(action).map_err(FrameworkError::Entity);
        }

        let mut next = self.items.clone();
        let result = next[index].handle_action(action).map_err(FrameworkError::Entity)?;
        self.commit(next).await?;

        debug!(result = ?result, "Action applied");
        Ok(result)
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub(crate) fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R, T::Error>) -> ResourceRequest<T>,
    ) -> FrameworkResult<R, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, payload: T::CreatePayload) -> FrameworkResult<T, T::Error> {
        self.request(|respond_to| ResourceRequest::Create { payload, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> FrameworkResult<Option<T>, T::Error> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(&self) -> FrameworkResult<Vec<T>, T::Error> {
        self.request(|respond_to| ResourceRequest::List { respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> FrameworkResult<T, T::Error> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> FrameworkResult<(), T::Error> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> FrameworkResult<T::ActionResult, T::Error> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================
