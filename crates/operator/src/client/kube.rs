//! kube-rs backed implementation of the resource client port.

use async_trait::async_trait;
use atelier_shared::{CorrelationId, OperatorError, Result};
use k8s_openapi::{ClusterResourceScope, NamespaceResourceScope};
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::future::Future;
use tracing::debug;

use super::{Mutation, ResourceClient};

const HTTP_CONFLICT: u16 = 409;
const HTTP_NOT_FOUND: u16 = 404;

fn to_client_error(err: kube::Error) -> OperatorError {
    OperatorError::Client {
        message: err.to_string(),
    }
}

/// Outcome of one replace attempt inside the conflict retry loop.
enum ReplaceError {
    Conflict,
    Other(OperatorError),
}

fn classify_replace(err: kube::Error) -> ReplaceError {
    match err {
        kube::Error::Api(response) if response.code == HTTP_CONFLICT => ReplaceError::Conflict,
        other => ReplaceError::Other(to_client_error(other)),
    }
}

/// Optimistic-concurrency read-modify-write: fetch the latest object, apply
/// the mutation, attempt the replace. A losing writer re-fetches and
/// re-applies until the replace lands or the retry budget runs out, at
/// which point the caller sees [`OperatorError::ConflictingUpdate`].
async fn with_conflict_retry<K, FetchFn, FetchFut, ReplaceFn, ReplaceFut>(
    correlation_id: &CorrelationId,
    name: &str,
    retry_limit: usize,
    mut mutate: Mutation<K>,
    mut fetch: FetchFn,
    mut replace: ReplaceFn,
) -> Result<K>
where
    FetchFn: FnMut() -> FetchFut,
    FetchFut: Future<Output = Result<K>>,
    ReplaceFn: FnMut(K) -> ReplaceFut,
    ReplaceFut: Future<Output = std::result::Result<K, ReplaceError>>,
{
    for attempt in 1..=retry_limit {
        let mut latest = fetch().await?;
        mutate(&mut latest);
        match replace(latest).await {
            Ok(updated) => return Ok(updated),
            Err(ReplaceError::Conflict) => {
                debug!(
                    correlation_id = %correlation_id,
                    name,
                    attempt,
                    "conflicting update, re-reading and re-applying"
                );
            }
            Err(ReplaceError::Other(err)) => return Err(err),
        }
    }
    Err(OperatorError::ConflictingUpdate {
        name: name.to_string(),
    })
}

/// Resource client for one kind in one namespace (or cluster-wide for
/// cluster-scoped kinds such as PersistentVolume).
pub struct KubeResourceClient<K>
where
    K: kube::Resource,
{
    api: Api<K>,
    conflict_retry_limit: usize,
}

impl<K> KubeResourceClient<K>
where
    K: kube::Resource + Clone + DeserializeOwned + Serialize + Debug,
    K::DynamicType: Default,
{
    pub fn namespaced(client: Client, namespace: &str, conflict_retry_limit: usize) -> Self
    where
        K: kube::Resource<Scope = NamespaceResourceScope>,
    {
        Self {
            api: Api::namespaced(client, namespace),
            conflict_retry_limit,
        }
    }

    pub fn cluster(client: Client, conflict_retry_limit: usize) -> Self
    where
        K: kube::Resource<Scope = ClusterResourceScope>,
    {
        Self {
            api: Api::all(client),
            conflict_retry_limit,
        }
    }
}

#[async_trait]
impl<K> ResourceClient<K> for KubeResourceClient<K>
where
    K: kube::Resource + Clone + DeserializeOwned + Serialize + Debug + Send + Sync + 'static,
    K::DynamicType: Default + Send + Sync,
{
    async fn get(&self, name: &str) -> Result<Option<K>> {
        self.api.get_opt(name).await.map_err(to_client_error)
    }

    async fn list(&self) -> Result<Vec<K>> {
        let objects = self
            .api
            .list(&ListParams::default())
            .await
            .map_err(to_client_error)?;
        Ok(objects.items)
    }

    async fn create(&self, correlation_id: &CorrelationId, resource: &K) -> Result<K> {
        debug!(correlation_id = %correlation_id, "creating resource");
        self.api
            .create(&PostParams::default(), resource)
            .await
            .map_err(to_client_error)
    }

    async fn edit(
        &self,
        correlation_id: &CorrelationId,
        name: &str,
        mutate: Mutation<K>,
    ) -> Result<K> {
        with_conflict_retry(
            correlation_id,
            name,
            self.conflict_retry_limit,
            mutate,
            || async { self.api.get(name).await.map_err(to_client_error) },
            |latest| async move {
                self.api
                    .replace(name, &PostParams::default(), &latest)
                    .await
                    .map_err(classify_replace)
            },
        )
        .await
    }

    async fn update_status(
        &self,
        correlation_id: &CorrelationId,
        name: &str,
        mutate: Mutation<K>,
    ) -> Result<K> {
        with_conflict_retry(
            correlation_id,
            name,
            self.conflict_retry_limit,
            mutate,
            || async { self.api.get(name).await.map_err(to_client_error) },
            |latest| async move {
                let payload = serde_json::to_vec(&latest).map_err(|e| {
                    ReplaceError::Other(OperatorError::MalformedResource {
                        message: e.to_string(),
                    })
                })?;
                self.api
                    .replace_status(name, &PostParams::default(), payload)
                    .await
                    .map_err(classify_replace)
            },
        )
        .await
    }

    async fn delete(&self, correlation_id: &CorrelationId, name: &str) -> Result<bool> {
        match self.api.delete(name, &DeleteParams::default()).await {
            Ok(_) => {
                debug!(correlation_id = %correlation_id, name, "deleted resource");
                Ok(true)
            }
            Err(kube::Error::Api(response)) if response.code == HTTP_NOT_FOUND => {
                debug!(correlation_id = %correlation_id, name, "resource already absent");
                Ok(false)
            }
            Err(err) => Err(to_client_error(err)),
        }
    }

    async fn has(&self, name: &str) -> Result<bool> {
        Ok(self
            .api
            .get_opt(name)
            .await
            .map_err(to_client_error)?
            .is_some())
    }
}
