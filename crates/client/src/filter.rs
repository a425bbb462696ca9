// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

/// Comparison operator for a list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
	Equal,
	NotEqual,
	LessThan,
	LessThanEqual,
	GreaterThan,
	GreaterThanEqual,
	Like,
	Regexp,
}

impl CompareOp {
	/// The query-parameter suffix for this operator. `Equal` is the
	/// default and carries no suffix.
	fn suffix(&self) -> Option<&'static str> {
		match self {
			CompareOp::Equal => None,
			CompareOp::NotEqual => Some("ne"),
			CompareOp::LessThan => Some("lt"),
			CompareOp::LessThanEqual => Some("lte"),
			CompareOp::GreaterThan => Some("gt"),
			CompareOp::GreaterThanEqual => Some("gte"),
			CompareOp::Like => Some("like"),
			CompareOp::Regexp => Some("re"),
		}
	}
}

/// A single column filter for [`crate::RecordApi::list`].
///
/// Serializes as `column=value` for equality and `column[op]=value` for
/// every other operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
	pub column: String,
	pub op: CompareOp,
	pub value: String,
}

impl Filter {
	/// Equality filter.
	pub fn new(column: &str, value: impl ToString) -> Self {
		Self::with_op(column, CompareOp::Equal, value)
	}

	pub fn with_op(column: &str, op: CompareOp, value: impl ToString) -> Self {
		Self {
			column: column.to_string(),
			op,
			value: value.to_string(),
		}
	}

	pub(crate) fn to_query_pair(&self) -> (String, String) {
		let key = match self.op.suffix() {
			Some(suffix) => format!("{}[{}]", self.column, suffix),
			None => self.column.clone(),
		};

		(key, self.value.clone())
	}
}
