//! In-memory raw executor.
//!
//! Tables live in a [`MemoryStore`] shared by every executor created from it,
//! so two executors for the same entity type see the same rows.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use cascade_proto::{Count, Entity, FilterExpr, Value};
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

use super::RawExecutor;
use crate::catalog::{DefaultValue, EntitySchema};
use crate::error::Error;
use crate::query::{extract_filter_fields, FilterEvaluator};

#[derive(Debug, Default)]
struct Table {
    rows: RwLock<Vec<Entity>>,
    sequence: AtomicI64,
}

/// A set of in-memory tables keyed by entity type.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: Arc<DashMap<String, Arc<Table>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an executor for an entity type, creating its table if needed.
    pub fn executor(&self, schema: Arc<EntitySchema>) -> MemoryExecutor {
        let table = self
            .tables
            .entry(schema.name().to_string())
            .or_default()
            .clone();

        MemoryExecutor {
            schema,
            table,
            failing: AtomicBool::new(false),
            fail_next: AtomicBool::new(false),
            calls: AtomicU64::new(0),
        }
    }

    /// Number of rows stored for an entity type.
    pub fn row_count(&self, entity: &str) -> usize {
        self.tables
            .get(entity)
            .map(|table| table.rows.read().len())
            .unwrap_or(0)
    }

    /// Total number of rows across all tables.
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|table| table.rows.read().len()).sum()
    }
}

/// Raw executor over one in-memory table.
///
/// Inserts are all-or-nothing per call: every record is validated before any
/// row is stored.
#[derive(Debug)]
pub struct MemoryExecutor {
    schema: Arc<EntitySchema>,
    table: Arc<Table>,
    failing: AtomicBool,
    fail_next: AtomicBool,
    calls: AtomicU64,
}

impl MemoryExecutor {
    /// Reject every call with a storage error while enabled.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Reject the next call with a storage error.
    pub fn fail_next_call(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Number of calls made against this executor.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin_call(&self, operation: &str) -> Result<(), Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) || self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(Error::storage(
                self.schema.name(),
                format!("{operation} rejected by store"),
            ));
        }
        Ok(())
    }

    fn check_filter(&self, filter: Option<&FilterExpr>) -> Result<(), Error> {
        let Some(filter) = filter else {
            return Ok(());
        };
        let mut unknown: Vec<String> = extract_filter_fields(filter)
            .into_iter()
            .filter(|field| self.schema.property(field).is_none())
            .collect();
        if unknown.is_empty() {
            return Ok(());
        }
        unknown.sort();
        Err(Error::storage(
            self.schema.name(),
            format!("filter references unknown properties: {}", unknown.join(", ")),
        ))
    }

    fn prepare(&self, mut record: Entity, sequence: &mut i64) -> Result<Entity, Error> {
        if let Some((name, _)) = record.iter().find(|(_, v)| v.is_relation()) {
            return Err(Error::storage(
                self.schema.name(),
                format!("property `{name}` holds a nested entity"),
            ));
        }

        for property in self.schema.properties() {
            if record.contains(&property.name) {
                continue;
            }
            match &property.default {
                Some(default) => {
                    let value = self.default_value(default, sequence);
                    record.set(property.name.clone(), value);
                }
                None if property.required => {
                    return Err(Error::storage(
                        self.schema.name(),
                        format!("missing required property `{}`", property.name),
                    ));
                }
                None => {}
            }
        }

        Ok(record)
    }

    fn default_value(&self, default: &DefaultValue, sequence: &mut i64) -> Value {
        match default {
            DefaultValue::Null => Value::Null,
            DefaultValue::Bool(b) => Value::Bool(*b),
            DefaultValue::Int(i) => Value::Int64(*i),
            DefaultValue::Float(f) => Value::Float64(*f),
            DefaultValue::String(s) => Value::String(s.clone()),
            DefaultValue::AutoIncrement => {
                *sequence += 1;
                Value::Int64(*sequence)
            }
            DefaultValue::AutoUuid => Value::Uuid(generate_id()),
            DefaultValue::CurrentTimestamp => Value::Timestamp(current_timestamp()),
        }
    }

    fn identity_of<'a>(&self, record: &'a Entity) -> Option<&'a Value> {
        record
            .value(self.schema.identity())
            .filter(|value| !value.is_null())
    }
}

#[async_trait]
impl RawExecutor for MemoryExecutor {
    fn entity_type(&self) -> &str {
        self.schema.name()
    }

    async fn create_all(&self, records: Vec<Entity>) -> Result<Vec<Entity>, Error> {
        self.begin_call("create")?;

        let mut rows = self.table.rows.write();

        // Generated integers continue after explicitly given ones. The
        // sequence is only committed once the whole batch is accepted.
        let mut sequence = records
            .iter()
            .filter_map(|record| record.value(self.schema.identity()).and_then(Value::as_i64))
            .fold(self.table.sequence.load(Ordering::SeqCst), i64::max);

        let prepared = records
            .into_iter()
            .map(|record| self.prepare(record, &mut sequence))
            .collect::<Result<Vec<_>, _>>()?;

        for (i, record) in prepared.iter().enumerate() {
            let Some(id) = self.identity_of(record) else {
                continue;
            };
            let taken = rows
                .iter()
                .chain(&prepared[..i])
                .filter_map(|row| self.identity_of(row))
                .any(|existing| FilterEvaluator::values_equal(existing, id));
            if taken {
                return Err(Error::storage(
                    self.schema.name(),
                    format!("duplicate identity {}", id.to_json()),
                ));
            }
        }

        rows.extend(prepared.iter().cloned());
        self.table.sequence.store(sequence, Ordering::SeqCst);
        debug!(entity = self.schema.name(), rows = prepared.len(), "rows created");
        Ok(prepared)
    }

    async fn find(&self, filter: Option<&FilterExpr>) -> Result<Vec<Entity>, Error> {
        self.begin_call("find")?;
        self.check_filter(filter)?;

        let rows = self.table.rows.read();
        let found: Vec<Entity> = rows
            .iter()
            .filter(|row| FilterEvaluator::matches(filter, row))
            .cloned()
            .collect();
        debug!(entity = self.schema.name(), rows = found.len(), "rows found");
        Ok(found)
    }

    async fn delete_all(&self, filter: Option<&FilterExpr>) -> Result<Count, Error> {
        self.begin_call("delete")?;
        self.check_filter(filter)?;

        let mut rows = self.table.rows.write();
        let before = rows.len();
        rows.retain(|row| !FilterEvaluator::matches(filter, row));
        let count = (before - rows.len()) as u64;
        debug!(entity = self.schema.name(), count, "rows deleted");
        Ok(Count::new(count))
    }
}

/// Generate a new UUID-shaped identity.
fn generate_id() -> [u8; 16] {
    // Counter to ensure uniqueness even with same timestamp
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let counter = COUNTER.fetch_add(1, Ordering::SeqCst);

    let mut id = [0u8; 16];
    id[..8].copy_from_slice(&now.to_le_bytes());
    id[8..16].copy_from_slice(&counter.to_le_bytes());

    // Set UUID version 4 bits
    id[6] = (id[6] & 0x0f) | 0x40;
    id[8] = (id[8] & 0x3f) | 0x80;

    id
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or_default()
}
