//! In-memory resource client for unit tests.
//!
//! Stores objects keyed by name and records every mutating call, so tests
//! can assert that terminal states perform zero side-effect calls and that
//! checkpoints are written in order.

use async_trait::async_trait;
use atelier_shared::{CorrelationId, OperatorError, Result};
use kube::ResourceExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{Mutation, ResourceClient};

pub struct FakeResourceClient<K> {
    objects: Mutex<HashMap<String, K>>,
    calls: Mutex<Vec<String>>,
    status_history: Mutex<Vec<K>>,
    fail_creates: AtomicBool,
}

impl<K> FakeResourceClient<K>
where
    K: ResourceExt + Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            status_history: Mutex::new(Vec::new()),
            fail_creates: AtomicBool::new(false),
        }
    }

    /// Seed an object without recording a call.
    pub fn insert(&self, resource: K) {
        let name = resource.name_any();
        self.objects.lock().unwrap().insert(name, resource);
    }

    pub fn stored(&self, name: &str) -> Option<K> {
        self.objects.lock().unwrap().get(name).cloned()
    }

    /// Every mutating call in order, as `verb:name`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Snapshot of the object after each `update_status` call, in order.
    pub fn status_history(&self) -> Vec<K> {
        self.status_history.lock().unwrap().clone()
    }

    /// Make subsequent `create` calls fail, simulating an external call
    /// failure mid-orchestration.
    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    fn record(&self, verb: &str, name: &str) {
        self.calls.lock().unwrap().push(format!("{verb}:{name}"));
    }
}

#[async_trait]
impl<K> ResourceClient<K> for FakeResourceClient<K>
where
    K: ResourceExt + Clone + Send + Sync + 'static,
{
    async fn get(&self, name: &str) -> Result<Option<K>> {
        Ok(self.objects.lock().unwrap().get(name).cloned())
    }

    async fn list(&self) -> Result<Vec<K>> {
        Ok(self.objects.lock().unwrap().values().cloned().collect())
    }

    async fn create(&self, _correlation_id: &CorrelationId, resource: &K) -> Result<K> {
        let name = resource.name_any();
        self.record("create", &name);
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(OperatorError::Client {
                message: format!("injected create failure for {name}"),
            });
        }
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&name) {
            return Err(OperatorError::Client {
                message: format!("{name} already exists"),
            });
        }
        objects.insert(name, resource.clone());
        Ok(resource.clone())
    }

    async fn edit(
        &self,
        _correlation_id: &CorrelationId,
        name: &str,
        mut mutate: Mutation<K>,
    ) -> Result<K> {
        self.record("edit", name);
        let mut objects = self.objects.lock().unwrap();
        let resource = objects
            .get_mut(name)
            .ok_or_else(|| OperatorError::ResourceNotFound {
                name: name.to_string(),
            })?;
        mutate(resource);
        Ok(resource.clone())
    }

    async fn update_status(
        &self,
        _correlation_id: &CorrelationId,
        name: &str,
        mut mutate: Mutation<K>,
    ) -> Result<K> {
        self.record("update_status", name);
        let mut objects = self.objects.lock().unwrap();
        let resource = objects
            .get_mut(name)
            .ok_or_else(|| OperatorError::ResourceNotFound {
                name: name.to_string(),
            })?;
        mutate(resource);
        let updated = resource.clone();
        drop(objects);
        self.status_history.lock().unwrap().push(updated.clone());
        Ok(updated)
    }

    async fn delete(&self, _correlation_id: &CorrelationId, name: &str) -> Result<bool> {
        self.record("delete", name);
        Ok(self.objects.lock().unwrap().remove(name).is_some())
    }

    async fn has(&self, name: &str) -> Result<bool> {
        Ok(self.objects.lock().unwrap().contains_key(name))
    }
}
