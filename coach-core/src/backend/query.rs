//! Row Query Builder
//!
//! Filters, ordering and limits over a table. Encodes to PostgREST query strings
//! for the REST backend and evaluates directly against JSON rows for the memory backend.

use std::cmp::Ordering;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;
use serde_json::Value;

/// Characters escaped inside filter values
const VALUE_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b',')
    .add(b'(')
    .add(b')')
    .add(b'=')
    .add(b'?');

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Neq(String, Value),
    Gt(String, Value),
    Gte(String, Value),
    Lt(String, Value),
    Lte(String, Value),
    In(String, Vec<Value>),
    IsNull(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

/// Filter/order/limit description of a select, update or delete
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Vec<OrderBy>,
    pub limit: Option<usize>,
}

fn to_value<V: Serialize>(value: V) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Serialize) -> Self {
        self.filters.push(Filter::Eq(column.to_string(), to_value(value)));
        self
    }

    pub fn neq(mut self, column: &str, value: impl Serialize) -> Self {
        self.filters.push(Filter::Neq(column.to_string(), to_value(value)));
        self
    }

    pub fn gt(mut self, column: &str, value: impl Serialize) -> Self {
        self.filters.push(Filter::Gt(column.to_string(), to_value(value)));
        self
    }

    pub fn gte(mut self, column: &str, value: impl Serialize) -> Self {
        self.filters.push(Filter::Gte(column.to_string(), to_value(value)));
        self
    }

    pub fn lt(mut self, column: &str, value: impl Serialize) -> Self {
        self.filters.push(Filter::Lt(column.to_string(), to_value(value)));
        self
    }

    pub fn lte(mut self, column: &str, value: impl Serialize) -> Self {
        self.filters.push(Filter::Lte(column.to_string(), to_value(value)));
        self
    }

    pub fn is_in<V: Serialize>(mut self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(to_value).collect();
        self.filters.push(Filter::In(column.to_string(), values));
        self
    }

    pub fn is_null(mut self, column: &str) -> Self {
        self.filters.push(Filter::IsNull(column.to_string()));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order.push(OrderBy { column: column.to_string(), ascending });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when an `in` filter has no values; such a query can never match
    pub fn is_empty_match(&self) -> bool {
        self.filters.iter().any(|f| matches!(f, Filter::In(_, values) if values.is_empty()))
    }

    // ========================
    // PostgREST encoding
    // ========================

    /// Encode as `key=value` pairs (`col=eq.x`, `order=col.asc`, `limit=n`)
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|filter| match filter {
                Filter::Eq(col, v) => (col.clone(), format!("eq.{}", encode_value(v))),
                Filter::Neq(col, v) => (col.clone(), format!("neq.{}", encode_value(v))),
                Filter::Gt(col, v) => (col.clone(), format!("gt.{}", encode_value(v))),
                Filter::Gte(col, v) => (col.clone(), format!("gte.{}", encode_value(v))),
                Filter::Lt(col, v) => (col.clone(), format!("lt.{}", encode_value(v))),
                Filter::Lte(col, v) => (col.clone(), format!("lte.{}", encode_value(v))),
                Filter::In(col, values) => {
                    let list: Vec<String> = values.iter().map(encode_value).collect();
                    (col.clone(), format!("in.({})", list.join(",")))
                }
                Filter::IsNull(col) => (col.clone(), "is.null".to_string()),
            })
            .collect();

        if !self.order.is_empty() {
            let order: Vec<String> = self
                .order
                .iter()
                .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
                .collect();
            pairs.push(("order".to_string(), order.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }

    /// Full query string without the leading `?`
    pub fn to_query_string(&self) -> String {
        self.to_pairs()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    // ========================
    // In-memory evaluation
    // ========================

    /// Whether a JSON row passes every filter
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|filter| {
            let field = |col: &str| row.get(col).cloned().unwrap_or(Value::Null);
            match filter {
                Filter::Eq(col, v) => values_equal(&field(col), v),
                Filter::Neq(col, v) => !values_equal(&field(col), v),
                Filter::Gt(col, v) => compare(&field(col), v) == Some(Ordering::Greater),
                Filter::Gte(col, v) => matches!(compare(&field(col), v), Some(Ordering::Greater | Ordering::Equal)),
                Filter::Lt(col, v) => compare(&field(col), v) == Some(Ordering::Less),
                Filter::Lte(col, v) => matches!(compare(&field(col), v), Some(Ordering::Less | Ordering::Equal)),
                Filter::In(col, values) => {
                    let actual = field(col);
                    values.iter().any(|v| values_equal(&actual, v))
                }
                Filter::IsNull(col) => field(col).is_null(),
            }
        })
    }

    /// Filter, sort and limit a set of rows
    pub fn apply(&self, rows: &[Value]) -> Vec<Value> {
        let mut selected: Vec<Value> = rows.iter().filter(|r| self.matches(r)).cloned().collect();
        if !self.order.is_empty() {
            selected.sort_by(|a, b| {
                for o in &self.order {
                    let left = a.get(&o.column).unwrap_or(&Value::Null);
                    let right = b.get(&o.column).unwrap_or(&Value::Null);
                    let ord = compare(left, right).unwrap_or(Ordering::Equal);
                    let ord = if o.ascending { ord } else { ord.reverse() };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

fn encode_value(value: &Value) -> String {
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    };
    utf8_percent_encode(&raw, VALUE_ENCODE_SET).to_string()
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Numbers compare numerically, strings lexically (ISO dates sort correctly), null first
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) => Some(Ordering::Less),
        (_, Value::Null) => Some(Ordering::Greater),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_string_encoding() {
        let q = Query::new()
            .eq("client_id", "abc")
            .gte("date", "2024-01-01")
            .is_in("meal_id", ["a", "b"])
            .order("order_index", true)
            .limit(5);
        assert_eq!(
            q.to_query_string(),
            "client_id=eq.abc&date=gte.2024-01-01&meal_id=in.(a,b)&order=order_index.asc&limit=5"
        );
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let q = Query::new().eq("name", "Plan (Copia), v2");
        assert_eq!(q.to_query_string(), "name=eq.Plan%20%28Copia%29%2C%20v2");
    }

    #[test]
    fn test_is_null_and_desc_order() {
        let q = Query::new().is_null("client_id").order("created_at", false);
        assert_eq!(q.to_query_string(), "client_id=is.null&order=created_at.desc");
    }

    #[test]
    fn test_apply_filters_orders_and_limits() {
        let rows = vec![
            json!({"id": 1, "parent": "x", "order_index": 2}),
            json!({"id": 2, "parent": "x", "order_index": 0}),
            json!({"id": 3, "parent": "y", "order_index": 1}),
            json!({"id": 4, "parent": "x", "order_index": 1}),
        ];
        let q = Query::new().eq("parent", "x").order("order_index", true).limit(2);
        let ids: Vec<i64> = q.apply(&rows).iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn test_date_range_and_null() {
        let rows = vec![
            json!({"date": "2024-01-05", "client_id": null}),
            json!({"date": "2024-02-05", "client_id": "c"}),
        ];
        let q = Query::new().gte("date", "2024-01-01").lt("date", "2024-02-01");
        assert_eq!(q.apply(&rows).len(), 1);
        assert_eq!(Query::new().is_null("client_id").apply(&rows).len(), 1);
    }

    #[test]
    fn test_numeric_equality_across_representations() {
        let row = json!({"water_ml": 250});
        assert!(Query::new().eq("water_ml", 250.0).matches(&row));
    }

    #[test]
    fn test_empty_in_never_matches() {
        let q = Query::new().is_in::<&str>("id", []);
        assert!(q.is_empty_match());
        assert!(!q.matches(&json!({"id": "a"})));
    }
}
