//! In-process backend for [`DocumentStore`]
//!
//! Used in dev mode when no MongoDB is reachable, and by the test suites.
//! Implements the subset of MongoDB query and update semantics the services
//! use:
//!
//! - filters: equality on (dotted) paths, where an array field matches when
//!   it equals the value or contains it; `$eq`, `$ne`, `$in`
//! - sort: ascending (`1`) or descending (`-1`) on any number of paths
//! - updates: `$set`, `$setOnInsert`, `$inc`, `$push`, `$pull`, `$addToSet`,
//!   with the positional `$` standing for the first array element the
//!   filter matched

use async_trait::async_trait;
use bson::{Bson, Document};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::db::store::{new_id, DocumentStore};
use crate::types::{HearthError, Result};

/// Collections held in memory, keyed by name
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<()> {
        if !document.contains_key("_id") {
            document.insert("_id", new_id());
        }

        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();

        let id = document.get("_id");
        if documents.iter().any(|existing| existing.get("_id") == id) {
            return Err(HearthError::Database(format!(
                "Duplicate key in {}: _id {:?}",
                collection, id
            )));
        }

        documents.push(document);
        Ok(())
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let mut found: Vec<Document> = collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| matches(document, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(sort) = sort {
            found.sort_by(|a, b| compare_documents(a, b, &sort));
        }

        Ok(found)
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|documents| {
            documents
                .iter()
                .find(|document| matches(document, &filter))
                .cloned()
        }))
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<Option<Document>> {
        if let Some(key) = update.keys().find(|key| !key.starts_with('$')) {
            return Err(HearthError::Database(format!(
                "Update documents may only contain operators, found '{}'",
                key
            )));
        }

        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();

        if let Some(existing) = documents
            .iter_mut()
            .find(|document| matches(document, &filter))
        {
            // Apply to a copy so a failing operator leaves the record untouched
            let mut updated = existing.clone();
            let position = positional_index(existing, &filter);
            apply_update(&mut updated, &update, false, position)?;
            *existing = updated.clone();
            return Ok(Some(updated));
        }

        if !upsert {
            return Ok(None);
        }

        let mut created = seed_from_filter(&filter)?;
        apply_update(&mut created, &update, true, None)?;
        if !created.contains_key("_id") {
            created.insert("_id", new_id());
        }

        documents.push(created.clone());
        Ok(Some(created))
    }
}

// ============================================================================
// Filters
// ============================================================================

fn matches(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(path, condition)| {
        let values = resolve(document, path);
        match condition {
            Bson::Document(ops) if is_operator_document(ops) => {
                ops.iter().all(|(op, operand)| match op.as_str() {
                    "$eq" => any_match(&values, operand),
                    "$ne" => !any_match(&values, operand),
                    "$in" => match operand {
                        Bson::Array(options) => {
                            options.iter().any(|option| any_match(&values, option))
                        }
                        _ => false,
                    },
                    _ => false,
                })
            }
            _ => any_match(&values, condition),
        }
    })
}

fn is_operator_document(document: &Document) -> bool {
    document
        .keys()
        .next()
        .map_or(false, |key| key.starts_with('$'))
}

/// A missing field only matches `null`
fn any_match(values: &[&Bson], expected: &Bson) -> bool {
    if values.is_empty() {
        return matches!(expected, Bson::Null);
    }
    values
        .iter()
        .any(|value| equals_or_contains(value, expected))
}

fn equals_or_contains(value: &Bson, expected: &Bson) -> bool {
    match value {
        Bson::Array(items) => {
            values_equal(value, expected) || items.iter().any(|item| values_equal(item, expected))
        }
        _ => values_equal(value, expected),
    }
}

/// Every value reachable by a dotted path, descending into arrays of
/// subdocuments the way MongoDB queries do
fn resolve<'a>(document: &'a Document, path: &str) -> Vec<&'a Bson> {
    let mut parts = path.split('.');
    let mut current: Vec<&Bson> = parts
        .next()
        .and_then(|first| document.get(first))
        .into_iter()
        .collect();

    for part in parts {
        let mut next = Vec::new();
        for value in current {
            match value {
                Bson::Document(child) => next.extend(child.get(part)),
                Bson::Array(items) => {
                    for item in items {
                        if let Bson::Document(child) = item {
                            next.extend(child.get(part));
                        }
                    }
                }
                _ => {}
            }
        }
        current = next;
    }

    current
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = document.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Bson::Document(child) => child.get(part)?,
            Bson::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Index of the first array element matched by a filter condition on
/// `array.field`
fn positional_index(document: &Document, filter: &Document) -> Option<usize> {
    filter.iter().find_map(|(path, condition)| {
        let (head, tail) = path.split_once('.')?;
        let Some(Bson::Array(items)) = document.get(head) else {
            return None;
        };
        let mut element_filter = Document::new();
        element_filter.insert(tail, condition.clone());
        items.iter().position(|item| match item {
            Bson::Document(child) => matches(child, &element_filter),
            _ => false,
        })
    })
}

// ============================================================================
// Sorting
// ============================================================================

fn compare_documents(a: &Document, b: &Document, sort: &Document) -> Ordering {
    for (path, direction) in sort {
        let descending = as_number(direction).map_or(false, |d| d < 0.0);
        let ordering = compare_values(lookup(a, path), lookup(b, path));
        let ordering = if descending {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn compare_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => match (a, b) {
                (Bson::String(x), Bson::String(y)) => x.cmp(y),
                (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
                (Bson::DateTime(x), Bson::DateTime(y)) => {
                    x.timestamp_millis().cmp(&y.timestamp_millis())
                }
                _ => Ordering::Equal,
            },
        },
    }
}

// ============================================================================
// Updates
// ============================================================================

fn seed_from_filter(filter: &Document) -> Result<Document> {
    let mut seeded = Document::new();
    for (path, value) in filter {
        if path.starts_with('$') {
            continue;
        }
        if let Bson::Document(ops) = value {
            if is_operator_document(ops) {
                continue;
            }
        }
        set_path(&mut seeded, path, value.clone())?;
    }
    Ok(seeded)
}

fn apply_update(
    document: &mut Document,
    update: &Document,
    inserting: bool,
    position: Option<usize>,
) -> Result<()> {
    for (operator, fields) in update {
        let fields = match fields {
            Bson::Document(fields) => fields,
            _ => {
                return Err(HearthError::Database(format!(
                    "{} expects a document of fields",
                    operator
                )))
            }
        };

        for (path, value) in fields {
            let path = &resolve_positional(path, position)?;
            match operator.as_str() {
                "$set" => set_path(document, path, value.clone())?,
                "$setOnInsert" => {
                    if inserting {
                        set_path(document, path, value.clone())?;
                    }
                }
                "$inc" => {
                    let next = add_numbers(lookup(document, path), value, path)?;
                    set_path(document, path, next)?;
                }
                "$push" => {
                    let mut items = array_at(document, path)?;
                    items.push(value.clone());
                    set_path(document, path, Bson::Array(items))?;
                }
                "$addToSet" => {
                    let mut items = array_at(document, path)?;
                    if !items.iter().any(|item| values_equal(item, value)) {
                        items.push(value.clone());
                    }
                    set_path(document, path, Bson::Array(items))?;
                }
                "$pull" => {
                    if lookup(document, path).is_some() {
                        let mut items = array_at(document, path)?;
                        items.retain(|item| !pull_matches(item, value));
                        set_path(document, path, Bson::Array(items))?;
                    }
                }
                other => {
                    return Err(HearthError::Database(format!(
                        "Unsupported update operator: {}",
                        other
                    )))
                }
            }
        }
    }
    Ok(())
}

fn pull_matches(item: &Bson, condition: &Bson) -> bool {
    match (item, condition) {
        (Bson::Document(item), Bson::Document(condition)) if !is_operator_document(condition) => {
            matches(item, condition)
        }
        _ => values_equal(item, condition),
    }
}

fn array_at(document: &Document, path: &str) -> Result<Vec<Bson>> {
    match lookup(document, path) {
        None => Ok(Vec::new()),
        Some(Bson::Array(items)) => Ok(items.clone()),
        Some(_) => Err(HearthError::Database(format!(
            "Cannot apply array operator to non-array field {}",
            path
        ))),
    }
}

fn add_numbers(current: Option<&Bson>, delta: &Bson, path: &str) -> Result<Bson> {
    let current = current.cloned().unwrap_or(Bson::Int32(0));
    match (&current, delta) {
        (Bson::Int32(a), Bson::Int32(b)) => Ok(a
            .checked_add(*b)
            .map(Bson::Int32)
            .unwrap_or(Bson::Int64(i64::from(*a) + i64::from(*b)))),
        (Bson::Int32(_) | Bson::Int64(_), Bson::Int32(_) | Bson::Int64(_)) => as_integer(&current)
            .checked_add(as_integer(delta))
            .map(Bson::Int64)
            .ok_or_else(|| {
                HearthError::Database(format!("Increment overflows integer field {}", path))
            }),
        _ => match (as_number(&current), as_number(delta)) {
            (Some(a), Some(b)) => Ok(Bson::Double(a + b)),
            _ => Err(HearthError::Database(format!(
                "Cannot increment non-numeric field {}",
                path
            ))),
        },
    }
}

fn as_integer(value: &Bson) -> i64 {
    match value {
        Bson::Int32(n) => i64::from(*n),
        Bson::Int64(n) => *n,
        _ => 0,
    }
}

/// Substitute the matched element index for a `$` path segment
fn resolve_positional(path: &str, position: Option<usize>) -> Result<String> {
    if !path.split('.').any(|part| part == "$") {
        return Ok(path.to_string());
    }
    let index = position.ok_or_else(|| {
        HearthError::Database(format!(
            "The positional operator did not find the match needed from the query: {}",
            path
        ))
    })?;
    Ok(path
        .split('.')
        .map(|part| if part == "$" { index.to_string() } else { part.to_string() })
        .collect::<Vec<_>>()
        .join("."))
}

fn set_path(document: &mut Document, path: &str, value: Bson) -> Result<()> {
    match path.split_once('.') {
        None => {
            document.insert(path, value);
            Ok(())
        }
        Some((head, rest)) => {
            if !document.contains_key(head) {
                document.insert(head, Document::new());
            }
            match document.get_mut(head) {
                Some(Bson::Document(child)) => set_path(child, rest, value),
                Some(Bson::Array(items)) => set_in_array(items, rest, value),
                _ => Err(HearthError::Database(format!(
                    "Cannot set {} inside non-document field {}",
                    rest, head
                ))),
            }
        }
    }
}

fn set_in_array(items: &mut [Bson], path: &str, value: Bson) -> Result<()> {
    let (index, rest) = match path.split_once('.') {
        Some((index, rest)) => (index, Some(rest)),
        None => (path, None),
    };
    let slot = index
        .parse::<usize>()
        .ok()
        .and_then(|index| items.get_mut(index))
        .ok_or_else(|| {
            HearthError::Database(format!("No array element at {} to set", path))
        })?;

    match (rest, slot) {
        (None, slot) => {
            *slot = value;
            Ok(())
        }
        (Some(rest), Bson::Document(child)) => set_path(child, rest, value),
        (Some(rest), _) => Err(HearthError::Database(format!(
            "Cannot set {} inside non-document array element",
            rest
        ))),
    }
}
