//! In-memory statement executor
//!
//! Serves seeded tables through the same boundary a store driver would. It
//! behaves like the real store where the browsing layer depends on it:
//!
//! - predicates outside the partition key need `ALLOW FILTERING`
//! - `LIMIT` caps one execution; paging state resumes the next one
//! - paging state is opaque and bound to the statement that issued it
//! - `system.size_estimates` reports one `partitions_count` per table
//!
//! Paging state layout: `[statement crc32: u32 BE][row offset: u64 BE]`.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use std::sync::RwLock;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cursor::PageToken;

use super::errors::{ExecutorError, ExecutorResult};
use super::executor::StatementExecutor;
use super::filters::ConditionFilter;
use super::result::{ExecutionRequest, PageResult, Row};
use super::statement::{parse_select, Comparison, Projection, SelectStatement};

const PAGING_STATE_LEN: usize = 12;

const FILTERING_REQUIRED: &str = "Cannot execute this query as it might involve data filtering \
and thus may have unpredictable performance. If you want to execute this query despite the \
performance unpredictability, use ALLOW FILTERING";

/// One seeded table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedTable {
    pub keyspace: String,
    pub table: String,
    /// Partition key columns; equality on all of them needs no filtering
    #[serde(default)]
    pub partition_key: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Row>,
    /// Value reported by size estimates; row count when absent
    #[serde(default)]
    pub size_estimate: Option<u64>,
}

impl SeedTable {
    pub fn new(keyspace: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            table: table.into(),
            partition_key: Vec::new(),
            rows: Vec::new(),
            size_estimate: None,
        }
    }

    pub fn with_partition_key(mut self, columns: &[&str]) -> Self {
        self.partition_key = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_size_estimate(mut self, estimate: u64) -> Self {
        self.size_estimate = Some(estimate);
        self
    }

    fn partitions_count(&self) -> u64 {
        self.size_estimate.unwrap_or(self.rows.len() as u64)
    }

    fn has_column(&self, column: &str) -> bool {
        self.partition_key.iter().any(|c| c == column)
            || self.rows.iter().any(|row| row.contains_key(column))
    }
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    tables: Vec<SeedTable>,
}

type TableKey = (String, String);

/// Statement executor over in-memory tables
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<TableKey, SeedTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tables(tables: Vec<SeedTable>) -> Self {
        let store = Self::new();
        for table in tables {
            store.insert_table(table);
        }
        store
    }

    /// Parse a seed document: `{"tables": [SeedTable, ...]}`
    pub fn from_json(json: &str) -> ExecutorResult<Self> {
        let seed: SeedFile = serde_json::from_str(json)
            .map_err(|e| ExecutorError::unavailable(format!("invalid seed data: {}", e)))?;
        Ok(Self::from_tables(seed.tables))
    }

    /// Load a seed document from disk
    pub fn load(path: &Path) -> ExecutorResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            ExecutorError::unavailable(format!("cannot read seed file {}: {}", path.display(), e))
        })?;
        let store = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), tables = store.table_count(), "seed data loaded");
        Ok(store)
    }

    /// Add or replace a table
    pub fn insert_table(&self, table: SeedTable) {
        let key = (table.keyspace.clone(), table.table.clone());
        self.tables
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, table);
    }

    pub fn table_count(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Virtual `system.size_estimates`, one row per seeded table
    fn size_estimates(tables: &HashMap<TableKey, SeedTable>) -> SeedTable {
        let mut keys: Vec<&TableKey> = tables.keys().collect();
        keys.sort();

        let rows = keys
            .into_iter()
            .filter_map(|key| tables.get(key))
            .map(|table| {
                let mut row = Row::new();
                row.insert("keyspace_name".into(), Value::from(table.keyspace.clone()));
                row.insert("table_name".into(), Value::from(table.table.clone()));
                row.insert("partitions_count".into(), Value::from(table.partitions_count()));
                row
            })
            .collect();

        SeedTable::new("system", "size_estimates")
            .with_partition_key(&["keyspace_name", "table_name"])
            .with_rows(rows)
    }

    fn run(
        &self,
        request: &ExecutionRequest,
        statement: &SelectStatement,
        table: &SeedTable,
    ) -> ExecutorResult<PageResult> {
        let reject = |reason: String| ExecutorError::rejected(&request.statement, reason);

        if let Some(unknown) = statement
            .conditions
            .iter()
            .find(|c| !table.rows.is_empty() && !table.has_column(&c.column))
        {
            return Err(reject(format!("Undefined column name {}", unknown.column)));
        }

        if !statement.conditions.is_empty()
            && !statement.allow_filtering
            && !restricts_partition_key(statement, table)
        {
            return Err(reject(FILTERING_REQUIRED.to_string()));
        }

        let matching: Vec<&Row> = table
            .rows
            .iter()
            .filter(|row| ConditionFilter::matches(row, &statement.conditions))
            .collect();

        if statement.projection == Projection::Count {
            let mut row = Row::new();
            row.insert("count".into(), Value::from(matching.len() as u64));
            return Ok(PageResult::last(vec![row]));
        }

        let offset = match &request.page_token {
            Some(token) => decode_paging_state(&request.statement, token)
                .ok_or_else(|| reject("Invalid value for the paging state".to_string()))?,
            None => 0,
        };

        let cap = statement
            .limit
            .unwrap_or(u64::MAX)
            .min(request.page_size.max(1) as u64) as usize;
        let start = offset.min(matching.len());
        let end = start.saturating_add(cap).min(matching.len());

        let rows: Vec<Row> = matching[start..end]
            .iter()
            .map(|row| project(row, &statement.projection))
            .collect();

        if end < matching.len() {
            Ok(PageResult::with_next(
                rows,
                encode_paging_state(&request.statement, end),
            ))
        } else {
            Ok(PageResult::last(rows))
        }
    }
}

impl StatementExecutor for MemoryStore {
    fn execute(&self, request: &ExecutionRequest) -> ExecutorResult<PageResult> {
        let statement = parse_select(&request.statement).map_err(|reason| {
            ExecutorError::rejected(&request.statement, format!("line 1: {}", reason))
        })?;

        let tables = self
            .tables
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let result = if statement.keyspace == "system" && statement.table == "size_estimates" {
            let estimates = Self::size_estimates(&tables);
            self.run(request, &statement, &estimates)
        } else {
            let key = (statement.keyspace.clone(), statement.table.clone());
            match tables.get(&key) {
                Some(table) => self.run(request, &statement, table),
                None => Err(ExecutorError::rejected(
                    &request.statement,
                    format!("unconfigured table {}.{}", statement.keyspace, statement.table),
                )),
            }
        };

        match &result {
            Ok(page) => tracing::debug!(
                statement = %request.statement,
                rows = page.returned_count(),
                has_more = page.has_more,
                "statement executed"
            ),
            Err(err) => tracing::debug!(statement = %request.statement, error = %err, "statement rejected"),
        }
        result
    }
}

/// Whether every condition is an equality on the partition key and the whole key is bound
fn restricts_partition_key(statement: &SelectStatement, table: &SeedTable) -> bool {
    if table.partition_key.is_empty() {
        return false;
    }

    let all_key_equalities = statement.conditions.iter().all(|c| {
        c.comparison == Comparison::Eq && table.partition_key.iter().any(|k| k == &c.column)
    });
    let bound: BTreeSet<&str> = statement
        .conditions
        .iter()
        .map(|c| c.column.as_str())
        .collect();

    all_key_equalities && table.partition_key.iter().all(|k| bound.contains(k.as_str()))
}

fn project(row: &Row, projection: &Projection) -> Row {
    match projection {
        Projection::Columns(columns) => columns
            .iter()
            .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
            .collect(),
        _ => row.clone(),
    }
}

fn statement_checksum(statement: &str) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(statement.as_bytes());
    hasher.finalize()
}

fn encode_paging_state(statement: &str, offset: usize) -> PageToken {
    let mut bytes = Vec::with_capacity(PAGING_STATE_LEN);
    bytes.extend_from_slice(&statement_checksum(statement).to_be_bytes());
    bytes.extend_from_slice(&(offset as u64).to_be_bytes());
    PageToken::from_bytes(bytes)
}

/// Offset carried by `token`, if it was issued for `statement`
fn decode_paging_state(statement: &str, token: &PageToken) -> Option<usize> {
    let bytes = token.as_bytes();
    if bytes.len() != PAGING_STATE_LEN {
        return None;
    }

    let checksum = u32::from_be_bytes(bytes[0..4].try_into().ok()?);
    if checksum != statement_checksum(statement) {
        return None;
    }

    let offset = u64::from_be_bytes(bytes[4..12].try_into().ok()?);
    usize::try_from(offset).ok()
}
