//! Watchers for the Atelier kinds.
//!
//! One controller loop per kind, all driving the same generic
//! [`ReconcileMachine`]. The loop never exits on a watch error; it logs
//! and lets the watcher re-establish itself.

use futures::StreamExt;
use kube::api::Api;
use kube::client::Client;
use kube::runtime::watcher;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info, warn};

use atelier_shared::OperatorConfig;

use crate::reconcile::{Operated, ReconcileMachine};

/// Shared state for the operator.
#[derive(Clone)]
pub struct OperatorState {
    pub k8s_client: Client,
    pub config: OperatorConfig,
}

impl OperatorState {
    pub fn new(k8s_client: Client, config: OperatorConfig) -> Self {
        Self { k8s_client, config }
    }

    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }
}

/// Run the controller loop for one kind until the watch stream ends.
///
/// Initial-sync and live apply events both go through the machine; its
/// terminal-state short-circuit makes the resync harmless. Deletes trigger
/// the cleanup cascade.
pub async fn run_controller<K>(api: Api<K>, machine: Arc<ReconcileMachine<K>>, kind: &'static str)
where
    K: Operated + kube::Resource + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
    K::DynamicType: Default,
{
    info!(kind, "controller starting");
    let mut stream = watcher(api, watcher::Config::default()).boxed();

    while let Some(event) = stream.next().await {
        match event {
            Ok(watcher::Event::Apply(resource)) | Ok(watcher::Event::InitApply(resource)) => {
                let outcome = machine.reconcile(&resource).await;
                debug!(kind, name = resource.name_any(), ?outcome, "reconciled");
            }
            Ok(watcher::Event::Delete(resource)) => {
                machine.cleanup(&resource).await;
            }
            Ok(watcher::Event::Init) | Ok(watcher::Event::InitDone) => {}
            Err(err) => {
                warn!(kind, error = %err, "watch error, stream will re-establish");
            }
        }
    }
    info!(kind, "controller stopped");
}
