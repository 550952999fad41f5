//! In-memory resource service.
//!
//! Records live in a `BTreeMap` behind a tokio `RwLock`, so List returns them
//! in id order. Ids are assigned sequentially from 1 and never reused.

use super::Record;
use crate::context::Context;
use crate::error::BoxError;
use crate::query::QueryArgs;
use crate::service::Service;
use crate::signature::MethodSet;
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Thread-safe in-memory store of `T` records, mountable as a service.
#[derive(Debug)]
pub struct InMemoryStore<T> {
    state: RwLock<State<T>>,
}

#[derive(Debug)]
struct State<T> {
    next_id: i64,
    records: BTreeMap<i64, T>,
}

impl<T: Record> InMemoryStore<T> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                next_id: 1,
                records: BTreeMap::new(),
            }),
        }
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.records.is_empty()
    }

    pub async fn clear(&self) {
        self.state.write().await.records.clear();
    }

    pub async fn get(self: Arc<Self>, ctx: Context, id: i64) -> Result<Box<T>, BoxError> {
        ensure_live(&ctx)?;
        let state = self.state.read().await;
        state
            .records
            .get(&id)
            .cloned()
            .map(Box::new)
            .ok_or_else(|| missing(id))
    }

    pub async fn put(self: Arc<Self>, ctx: Context, id: i64, mut data: Box<T>) -> Result<(), BoxError> {
        ensure_live(&ctx)?;
        let mut state = self.state.write().await;
        let record = state.records.get_mut(&id).ok_or_else(|| missing(id))?;
        data.set_id(id);
        *record = *data;
        Ok(())
    }

    pub async fn create(self: Arc<Self>, ctx: Context, mut data: Box<T>) -> Result<i64, BoxError> {
        ensure_live(&ctx)?;
        let mut state = self.state.write().await;
        let id = state.next_id;
        state.next_id += 1;
        data.set_id(id);
        state.records.insert(id, *data);
        debug!("[{}] stored record {}", ctx.request_id(), id);
        Ok(id)
    }

    pub async fn delete(self: Arc<Self>, ctx: Context, id: i64) -> Result<(), BoxError> {
        ensure_live(&ctx)?;
        let mut state = self.state.write().await;
        state.records.remove(&id).map(|_| ()).ok_or_else(|| missing(id))
    }

    /// Records matching every query key.
    ///
    /// A key is a dotted path into the record's JSON form (`address.city`,
    /// `tags.0`); the record matches when the value there equals any of the
    /// values given for that key.
    pub async fn list(self: Arc<Self>, ctx: Context, args: QueryArgs) -> Result<Vec<Box<T>>, BoxError> {
        ensure_live(&ctx)?;
        let state = self.state.read().await;
        let mut matches = Vec::new();
        for record in state.records.values() {
            if args.is_empty() || matches_query(&serde_json::to_value(record)?, &args) {
                matches.push(Box::new(record.clone()));
            }
        }
        Ok(matches)
    }
}

impl<T: Record> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Service for InMemoryStore<T> {
    fn methods() -> MethodSet<Self> {
        MethodSet::new()
            .method("Get", Self::get)
            .method("Put", Self::put)
            .method("New", Self::create)
            .method("Delete", Self::delete)
            .method("List", Self::list)
    }
}

fn ensure_live(ctx: &Context) -> Result<(), BoxError> {
    if ctx.is_cancelled() {
        return Err(format!("request {} cancelled", ctx.request_id()).into());
    }
    Ok(())
}

fn missing(id: i64) -> BoxError {
    format!("ID {} does not exist", id).into()
}

fn matches_query(record: &Value, args: &QueryArgs) -> bool {
    args.iter().all(|(key, wanted)| {
        extract_attribute_value(record, key).is_some_and(|found| wanted.contains(&found))
    })
}

/// Extract a nested attribute value from JSON data using dot notation.
fn extract_attribute_value(data: &Value, attribute_path: &str) -> Option<String> {
    let mut current = data;
    for part in attribute_path.split('.') {
        current = match part.parse::<usize>() {
            Ok(index) if current.is_array() => current.get(index)?,
            _ => current.get(part)?,
        };
    }

    match current {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
