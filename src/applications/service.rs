use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::notify::Notifier;
use super::profile::ProfilePolicy;
use crate::error::ApplicationError;
use crate::models::users::{self, Role};
use crate::store::{MarketplaceStore, StoreError};

/// Upper bound on a single store call when nothing is configured.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Who is performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&users::Model> for Actor {
    fn from(user: &users::Model) -> Self {
        Self::new(user.id, user.role)
    }
}

/// Application pipeline: eligibility checks, submission, status changes.
///
/// Holds no per-request state; every operation reads what it needs from the
/// store.
pub struct ApplicationService<S, N> {
    pub(crate) store: Arc<S>,
    pub(crate) notifier: Arc<N>,
    pub(crate) policy: ProfilePolicy,
    pub(crate) remote_timeout: Duration,
}

impl<S, N> Clone for ApplicationService<S, N> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier: Arc::clone(&self.notifier),
            policy: self.policy.clone(),
            remote_timeout: self.remote_timeout,
        }
    }
}

impl<S, N> ApplicationService<S, N>
where
    S: MarketplaceStore + 'static,
    N: Notifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self {
            store,
            notifier,
            policy: ProfilePolicy::default(),
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    pub fn with_policy(mut self, policy: ProfilePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn policy(&self) -> &ProfilePolicy {
        &self.policy
    }

    /// Run one store call under the configured timeout.
    ///
    /// Conflicts surface as [`ApplicationError::AlreadyApplied`]; every other
    /// failure, including a timeout, becomes a `RemoteFailure` carrying
    /// `context` as its message.
    pub(crate) async fn remote<T, F>(&self, call: F, context: &str) -> Result<T, ApplicationError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.remote_timeout, call).await {
            Ok(result) => result.map_err(|err| ApplicationError::from_store(err, context)),
            Err(_) => {
                tracing::warn!(timeout = ?self.remote_timeout, "{context} (store call timed out)");
                Err(ApplicationError::RemoteFailure(context.to_string()))
            }
        }
    }
}
