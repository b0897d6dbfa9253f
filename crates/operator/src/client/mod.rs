//! Resource client port.
//!
//! The reconciliation core talks to the cluster through this trait only, so
//! it can be unit-tested against [`fake::FakeResourceClient`] and run in
//! production against [`kube::KubeResourceClient`]. Every mutating call
//! takes the correlation id of the reconciliation attempt for log
//! correlation across asynchronous steps.

pub mod fake;
pub mod kube;

use async_trait::async_trait;
use atelier_shared::{CorrelationId, Result};

/// Mutation closure applied under read-modify-write semantics.
///
/// A losing writer on a conflicting update is re-applied to a freshly read
/// object, so the closure must be safe to run more than once.
pub type Mutation<K> = Box<dyn FnMut(&mut K) + Send>;

#[async_trait]
pub trait ResourceClient<K>: Send + Sync
where
    K: Send + Sync + 'static,
{
    async fn get(&self, name: &str) -> Result<Option<K>>;

    async fn list(&self) -> Result<Vec<K>>;

    async fn create(&self, correlation_id: &CorrelationId, resource: &K) -> Result<K>;

    /// Read-modify-write on the resource. On a conflicting update the
    /// object is re-fetched and the mutation re-applied rather than
    /// failing the whole reconciliation.
    async fn edit(
        &self,
        correlation_id: &CorrelationId,
        name: &str,
        mutate: Mutation<K>,
    ) -> Result<K>;

    /// Read-modify-write on the status subresource, same conflict
    /// semantics as [`edit`](Self::edit).
    async fn update_status(
        &self,
        correlation_id: &CorrelationId,
        name: &str,
        mutate: Mutation<K>,
    ) -> Result<K>;

    /// Returns whether the object existed. Deleting an already absent
    /// object is success, not an error, since deletion may be retried
    /// after partial completion.
    async fn delete(&self, correlation_id: &CorrelationId, name: &str) -> Result<bool>;

    async fn has(&self, name: &str) -> Result<bool>;
}
