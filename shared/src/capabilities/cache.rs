use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::RecordId;

pub const ANIMALS_SEGMENT: &str = "animals";
pub const ANIMAL_SEGMENT: &str = "animal";

/// Composite key addressing one entry of the shell's query cache, e.g.
/// `["animal", "42"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    /// The record list.
    pub fn animals() -> Self {
        Self(vec![ANIMALS_SEGMENT.to_string()])
    }

    /// A single record.
    pub fn animal(id: &RecordId) -> Self {
        Self(vec![ANIMAL_SEGMENT.to_string(), id.as_str().to_string()])
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CacheOperation {
    Get { key: QueryKey },
    Set { key: QueryKey, value: serde_json::Value },
    /// Marks the entry stale; any live consumer of the key refetches.
    Invalidate { key: QueryKey },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CacheOutput {
    Hit(serde_json::Value),
    Miss,
    Ack,
}

impl Operation for CacheOperation {
    type Output = CacheOutput;
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum CacheError {
    #[error("failed to serialize cache value: {message}")]
    Serialization { message: String },
}

/// Shell-owned query cache shared with the rest of the application.
pub struct QueryCache<Ev> {
    context: CapabilityContext<CacheOperation, Ev>,
}

impl<Ev> Clone for QueryCache<Ev> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for QueryCache<Ev> {
    type Operation = CacheOperation;
    type MappedSelf<MappedEv> = QueryCache<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        QueryCache::new(self.context.map_event(f))
    }
}

impl<Ev> QueryCache<Ev>
where
    Ev: Send + 'static,
{
    pub fn new(context: CapabilityContext<CacheOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn get<F>(&self, key: QueryKey, callback: F)
    where
        F: FnOnce(CacheOutput) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let output = ctx.request_from_shell(CacheOperation::Get { key }).await;
            ctx.update_app(callback(output));
        });
    }

    pub fn set<T>(&self, key: QueryKey, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let value = serde_json::to_value(value).map_err(|e| CacheError::Serialization {
            message: e.to_string(),
        })?;

        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(CacheOperation::Set { key, value }).await;
        });
        Ok(())
    }

    pub fn invalidate(&self, key: QueryKey) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(CacheOperation::Invalidate { key }).await;
        });
    }
}
