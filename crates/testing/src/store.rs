// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

//! In-memory record store backing the test server.
//!
//! Ids are monotonically assigned hex strings, so the natural id order is
//! also insertion order. Every mutation reports the change events to
//! broadcast, and transactional execution validates the whole operation
//! sequence before applying any of it.

use std::{
	cmp::Ordering,
	collections::{BTreeMap, HashMap},
};

use recordbase_client::{Operation, RecordEvent};
use serde_json::{Map, Value};

use crate::config::ApiConfig;

pub(crate) type Record = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub(crate) enum StoreError {
	#[error("unknown record api '{0}'")]
	UnknownApi(String),
	#[error("no record '{id}' in api '{api}'")]
	UnknownRecord {
		api: String,
		id: String,
	},
	#[error("record for api '{api}' is missing required column '{column}'")]
	MissingColumn {
		api: String,
		column: String,
	},
	#[error("record must be a JSON object")]
	NotAnObject,
	#[error("column '{0}' is not expandable")]
	NotExpandable(String),
}

/// A change applied by the store, to be published after the lock drops.
pub(crate) struct Change {
	pub api: String,
	pub id: String,
	pub event: RecordEvent,
}

#[derive(Default)]
pub(crate) struct RecordStore {
	apis: HashMap<String, ApiConfig>,
	records: HashMap<String, BTreeMap<String, Record>>,
	next_id: u64,
}

impl RecordStore {
	pub fn new(apis: Vec<ApiConfig>) -> Self {
		let mut store = Self::default();
		for api in apis {
			store.records.insert(api.name.clone(), BTreeMap::new());
			store.apis.insert(api.name.clone(), api);
		}
		store
	}

	pub fn api(&self, name: &str) -> Result<&ApiConfig, StoreError> {
		self.apis.get(name).ok_or_else(|| StoreError::UnknownApi(name.to_string()))
	}

	pub fn create(&mut self, api: &str, record: &Value) -> Result<(String, Change), StoreError> {
		self.validate_create(api, record)?;
		Ok(self.apply_create(api, record))
	}

	pub fn create_bulk(
		&mut self,
		api: &str,
		records: &[Value],
	) -> Result<(Vec<String>, Vec<Change>), StoreError> {
		for record in records {
			self.validate_create(api, record)?;
		}

		let mut ids = Vec::with_capacity(records.len());
		let mut changes = Vec::with_capacity(records.len());
		for record in records {
			let (id, change) = self.apply_create(api, record);
			ids.push(id);
			changes.push(change);
		}

		Ok((ids, changes))
	}

	pub fn read(&self, api: &str, id: &str, expand: &[String]) -> Result<Value, StoreError> {
		let record = self
			.records
			.get(api)
			.ok_or_else(|| StoreError::UnknownApi(api.to_string()))?
			.get(id)
			.ok_or_else(|| StoreError::UnknownRecord {
				api: api.to_string(),
				id: id.to_string(),
			})?;

		self.expand_record(api, record, expand)
	}

	pub fn update(&mut self, api: &str, id: &str, patch: &Value) -> Result<Change, StoreError> {
		self.validate_update(api, id, patch)?;
		Ok(self.apply_update(api, id, patch))
	}

	pub fn delete(&mut self, api: &str, id: &str) -> Result<Change, StoreError> {
		self.validate_target(api, id)?;
		Ok(self.apply_delete(api, id))
	}

	pub fn list(&self, api: &str, query: &ListQuery) -> Result<ListResult, StoreError> {
		let table = self.records.get(api).ok_or_else(|| StoreError::UnknownApi(api.to_string()))?;

		let mut matching: Vec<&Record> = table
			.values()
			.filter(|record| query.filters.iter().all(|filter| filter.matches(record)))
			.collect();

		if !query.order.is_empty() {
			matching.sort_by(|a, b| {
				for (column, ascending) in &query.order {
					let ordering = compare_values(a.get(column), b.get(column));
					let ordering = if *ascending {
						ordering
					} else {
						ordering.reverse()
					};
					if ordering != Ordering::Equal {
						return ordering;
					}
				}
				Ordering::Equal
			});
		}

		let total_count = query.count.then_some(matching.len() as i64);

		if let Some(cursor) = &query.cursor {
			let position = matching
				.iter()
				.position(|record| {
					record.get("id").and_then(Value::as_str) == Some(cursor.as_str())
				});
			matching = match position {
				Some(position) => matching.split_off(position + 1),
				None => matching,
			};
		}
		if let Some(offset) = query.offset {
			matching = if offset < matching.len() {
				matching.split_off(offset)
			} else {
				Vec::new()
			};
		}

		let mut cursor = None;
		if let Some(limit) = query.limit {
			if matching.len() > limit {
				matching.truncate(limit);
				cursor = matching
					.last()
					.and_then(|record| record.get("id"))
					.and_then(Value::as_str)
					.map(String::from);
			}
		}

		let records = matching
			.into_iter()
			.map(|record| self.expand_record(api, record, &query.expand))
			.collect::<Result<Vec<_>, _>>()?;

		Ok(ListResult {
			cursor,
			total_count,
			records,
		})
	}

	/// Execute a transaction: validate every operation against the state
	/// the batch would observe, then apply all of them in order. On any
	/// validation error nothing is applied.
	pub fn execute(
		&mut self,
		operations: &[Operation],
	) -> Result<(Vec<String>, Vec<Change>), StoreError> {
		for operation in operations {
			match operation {
				Operation::Create {
					api_name,
					record,
				} => self.validate_create(api_name, record)?,
				Operation::Update {
					api_name,
					id,
					record,
				} => self.validate_update(api_name, id, record)?,
				Operation::Delete {
					api_name,
					record_id,
				} => self.validate_target(api_name, record_id)?,
			}
		}

		let mut ids = Vec::new();
		let mut changes = Vec::new();
		for operation in operations {
			match operation {
				Operation::Create {
					api_name,
					record,
				} => {
					let (id, change) = self.apply_create(api_name, record);
					ids.push(id);
					changes.push(change);
				}
				Operation::Update {
					api_name,
					id,
					record,
				} => changes.push(self.apply_update(api_name, id, record)),
				Operation::Delete {
					api_name,
					record_id,
				} => changes.push(self.apply_delete(api_name, record_id)),
			}
		}

		Ok((ids, changes))
	}

	fn validate_create(&self, api: &str, record: &Value) -> Result<(), StoreError> {
		let config = self.api(api)?;
		let object = record.as_object().ok_or(StoreError::NotAnObject)?;

		for column in &config.required {
			if !object.contains_key(column) {
				return Err(StoreError::MissingColumn {
					api: api.to_string(),
					column: column.clone(),
				});
			}
		}

		Ok(())
	}

	fn validate_update(&self, api: &str, id: &str, patch: &Value) -> Result<(), StoreError> {
		self.validate_target(api, id)?;
		patch.as_object().ok_or(StoreError::NotAnObject)?;
		Ok(())
	}

	fn validate_target(&self, api: &str, id: &str) -> Result<(), StoreError> {
		self.api(api)?;
		let present = self.records.get(api).is_some_and(|table| table.contains_key(id));
		if !present {
			return Err(StoreError::UnknownRecord {
				api: api.to_string(),
				id: id.to_string(),
			});
		}
		Ok(())
	}

	// Apply steps assume their operation already validated.

	fn apply_create(&mut self, api: &str, record: &Value) -> (String, Change) {
		self.next_id += 1;
		let id = format!("{:016x}", self.next_id);

		let mut stored = record.as_object().cloned().unwrap_or_default();
		stored.insert("id".to_string(), Value::String(id.clone()));

		if let Some(table) = self.records.get_mut(api) {
			table.insert(id.clone(), stored.clone());
		}

		let change = Change {
			api: api.to_string(),
			id: id.clone(),
			event: RecordEvent::Insert(Value::Object(stored)),
		};
		(id, change)
	}

	fn apply_update(&mut self, api: &str, id: &str, patch: &Value) -> Change {
		let mut updated = Record::new();
		if let Some(record) =
			self.records.get_mut(api).and_then(|table| table.get_mut(id))
		{
			if let Some(patch) = patch.as_object() {
				for (column, value) in patch {
					if column != "id" {
						record.insert(column.clone(), value.clone());
					}
				}
			}
			updated = record.clone();
		}

		Change {
			api: api.to_string(),
			id: id.to_string(),
			event: RecordEvent::Update(Value::Object(updated)),
		}
	}

	fn apply_delete(&mut self, api: &str, id: &str) -> Change {
		let removed = self
			.records
			.get_mut(api)
			.and_then(|table| table.remove(id))
			.unwrap_or_default();

		Change {
			api: api.to_string(),
			id: id.to_string(),
			event: RecordEvent::Delete(Value::Object(removed)),
		}
	}

	fn expand_record(
		&self,
		api: &str,
		record: &Record,
		expand: &[String],
	) -> Result<Value, StoreError> {
		if expand.is_empty() {
			return Ok(Value::Object(record.clone()));
		}

		let config = self.api(api)?;
		let mut expanded = record.clone();
		for column in expand {
			let target_api = config
				.foreign_keys
				.get(column)
				.ok_or_else(|| StoreError::NotExpandable(column.clone()))?;

			let foreign_id = record.get(column).and_then(Value::as_str);
			let data = foreign_id
				.and_then(|id| self.records.get(target_api).and_then(|table| table.get(id)))
				.map(|record| Value::Object(record.clone()))
				.unwrap_or(Value::Null);

			expanded.insert(
				column.clone(),
				serde_json::json!({
					"id": foreign_id,
					"data": data,
				}),
			);
		}

		Ok(Value::Object(expanded))
	}
}

pub(crate) struct ListResult {
	pub cursor: Option<String>,
	pub total_count: Option<i64>,
	pub records: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FilterOp {
	Equal,
	NotEqual,
	LessThan,
	LessThanEqual,
	GreaterThan,
	GreaterThanEqual,
	Like,
}

#[derive(Debug)]
pub(crate) struct ColumnFilter {
	column: String,
	op: FilterOp,
	value: String,
}

impl ColumnFilter {
	fn matches(&self, record: &Record) -> bool {
		let value = record.get(&self.column);

		match self.op {
			FilterOp::Equal => value_equals(value, &self.value),
			FilterOp::NotEqual => !value_equals(value, &self.value),
			FilterOp::LessThan => {
				compare_to_literal(value, &self.value) == Some(Ordering::Less)
			}
			FilterOp::LessThanEqual => matches!(
				compare_to_literal(value, &self.value),
				Some(Ordering::Less | Ordering::Equal)
			),
			FilterOp::GreaterThan => {
				compare_to_literal(value, &self.value) == Some(Ordering::Greater)
			}
			FilterOp::GreaterThanEqual => matches!(
				compare_to_literal(value, &self.value),
				Some(Ordering::Greater | Ordering::Equal)
			),
			FilterOp::Like => match value {
				Some(Value::String(text)) => like_match(&self.value, text),
				_ => false,
			},
		}
	}
}

/// Parsed query string of a list request.
#[derive(Debug, Default)]
pub(crate) struct ListQuery {
	pub limit: Option<usize>,
	pub offset: Option<usize>,
	pub cursor: Option<String>,
	pub count: bool,
	pub order: Vec<(String, bool)>,
	pub expand: Vec<String>,
	pub filters: Vec<ColumnFilter>,
}

impl ListQuery {
	pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, String> {
		let mut query = Self::default();

		for (key, value) in pairs {
			match key.as_str() {
				"limit" => {
					query.limit = Some(
						value.parse().map_err(|_| format!("bad limit '{value}'"))?,
					)
				}
				"offset" => {
					query.offset = Some(
						value.parse()
							.map_err(|_| format!("bad offset '{value}'"))?,
					)
				}
				"cursor" => query.cursor = Some(value.clone()),
				"count" => query.count = value == "true",
				"order" => {
					for column in value.split(',').filter(|c| !c.is_empty()) {
						query.order.push(match column.split_at(1) {
							("-", name) => (name.to_string(), false),
							("+", name) => (name.to_string(), true),
							_ => (column.to_string(), true),
						});
					}
				}
				"expand" => {
					query.expand.extend(
						value.split(',')
							.filter(|c| !c.is_empty())
							.map(String::from),
					);
				}
				_ => query.filters.push(parse_filter(key, value)?),
			}
		}

		Ok(query)
	}
}

fn parse_filter(key: &str, value: &str) -> Result<ColumnFilter, String> {
	let (column, op) = match key.find('[') {
		Some(open) => {
			let suffix = key[open..]
				.strip_prefix('[')
				.and_then(|rest| rest.strip_suffix(']'))
				.ok_or_else(|| format!("bad filter key '{key}'"))?;

			let op = match suffix {
				"ne" => FilterOp::NotEqual,
				"lt" => FilterOp::LessThan,
				"lte" => FilterOp::LessThanEqual,
				"gt" => FilterOp::GreaterThan,
				"gte" => FilterOp::GreaterThanEqual,
				"like" => FilterOp::Like,
				other => return Err(format!("unsupported filter operator '{other}'")),
			};

			(key[..open].to_string(), op)
		}
		None => (key.to_string(), FilterOp::Equal),
	};

	Ok(ColumnFilter {
		column,
		op,
		value: value.to_string(),
	})
}

fn value_equals(value: Option<&Value>, literal: &str) -> bool {
	match value {
		Some(Value::String(text)) => text == literal,
		Some(Value::Number(number)) => {
			literal.parse::<f64>().is_ok_and(|parsed| {
				number.as_f64().is_some_and(|value| value == parsed)
			})
		}
		Some(Value::Bool(flag)) => literal.parse::<bool>().is_ok_and(|parsed| parsed == *flag),
		Some(Value::Null) | None => literal == "null",
		Some(other) => other.to_string() == literal,
	}
}

fn compare_to_literal(value: Option<&Value>, literal: &str) -> Option<Ordering> {
	match value {
		Some(Value::Number(number)) => {
			let value = number.as_f64()?;
			let literal = literal.parse::<f64>().ok()?;
			value.partial_cmp(&literal)
		}
		Some(Value::String(text)) => Some(text.as_str().cmp(literal)),
		_ => None,
	}
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
	match (a, b) {
		(Some(Value::Number(a)), Some(Value::Number(b))) => a
			.as_f64()
			.partial_cmp(&b.as_f64())
			.unwrap_or(Ordering::Equal),
		(Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
		(Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
		(None, None) => Ordering::Equal,
		(None, Some(_)) => Ordering::Less,
		(Some(_), None) => Ordering::Greater,
		(Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
	}
}

/// SQL LIKE with `%` wildcards only.
fn like_match(pattern: &str, value: &str) -> bool {
	let parts: Vec<&str> = pattern.split('%').collect();
	if parts.len() == 1 {
		return pattern == value;
	}

	let mut rest = value;

	let prefix = parts[0];
	if !rest.starts_with(prefix) {
		return false;
	}
	rest = &rest[prefix.len()..];

	for part in &parts[1..parts.len() - 1] {
		if part.is_empty() {
			continue;
		}
		match rest.find(part) {
			Some(position) => rest = &rest[position + part.len()..],
			None => return false,
		}
	}

	let suffix = parts[parts.len() - 1];
	suffix.is_empty() || rest.ends_with(suffix)
}
