use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

pub type Fields = Map<String, Value>;

/// A stored record: its collection-scoped id plus the JSON fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Fields) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Equality filters, optional ordering and an optional limit. Every
/// provider must honour the same semantics; [`Query::apply`] is the
/// reference evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }

    pub fn apply(&self, documents: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut matched: Vec<Document> = documents
            .into_iter()
            .filter(|doc| self.matches(doc))
            .collect();

        if let Some(order) = &self.order_by {
            let chronological = is_timestamp_column(&matched, &order.field);
            matched.sort_by(|a, b| {
                let ordering =
                    compare_values(a.get(&order.field), b.get(&order.field), chronological);
                match order.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }

        matched
    }
}

/// True when every string stored under `field` is an RFC 3339 timestamp.
fn is_timestamp_column(documents: &[Document], field: &str) -> bool {
    documents
        .iter()
        .filter_map(|doc| doc.get(field).and_then(Value::as_str))
        .all(|value| DateTime::parse_from_rfc3339(value).is_ok())
}

/// Total order over optional JSON values. Missing values sort first, then
/// values are grouped by type (booleans, numbers, strings, the rest). When
/// `chronological` is set every string is an RFC 3339 timestamp and strings
/// compare as instants; otherwise they compare case-insensitively.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>, chronological: bool) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            if chronological
                && let (Ok(dx), Ok(dy)) =
                    (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y))
            {
                return dx.cmp(&dy).then_with(|| x.cmp(y));
            }
            x.to_lowercase().cmp(&y.to_lowercase()).then_with(|| x.cmp(y))
        }
        (Some(x), Some(y)) => type_rank(x)
            .cmp(&type_rank(y))
            .then_with(|| x.to_string().cmp(&y.to_string())),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, value: Value) -> Document {
        match value {
            Value::Object(map) => Document::new(id, map),
            _ => panic!("test documents must be objects"),
        }
    }

    #[test]
    fn test_filter_order_limit() {
        let docs = vec![
            doc("a", json!({"status": "published", "created_at": "2024-01-01T00:00:00Z"})),
            doc("b", json!({"status": "draft", "created_at": "2024-03-01T00:00:00Z"})),
            doc("c", json!({"status": "published", "created_at": "2024-02-01T00:00:00.5Z"})),
            doc("d", json!({"status": "published"})),
        ];

        let query = Query::new()
            .where_eq("status", "published")
            .order_by("created_at", Direction::Descending)
            .limit(2);

        let ids: Vec<String> = query.apply(docs).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn test_timestamps_compare_chronologically() {
        let earlier = json!("2024-01-01T00:00:00.900Z");
        let later = json!("2024-01-01T00:00:01Z");
        assert_eq!(
            compare_values(Some(&earlier), Some(&later), true),
            Ordering::Less
        );
    }

    #[test]
    fn test_mixed_string_column_sorts_lexically() {
        // the offsets make lexical and chronological order disagree
        let docs = vec![
            doc("late", json!({"created_at": "2024-01-01T09:00:00+10:00"})),
            doc("early", json!({"created_at": "2024-01-01T01:00:00Z"})),
            doc("text", json!({"created_at": "ontem"})),
        ];

        let ids: Vec<String> = Query::new()
            .order_by("created_at", Direction::Ascending)
            .apply(docs.clone())
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["early", "late", "text"]);

        let ids: Vec<String> = Query::new()
            .order_by("created_at", Direction::Ascending)
            .apply(docs.into_iter().take(2))
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["late", "early"]);
    }

    #[test]
    fn test_mixed_types_group_by_type() {
        let docs = vec![
            doc("s", json!({"rank": "10"})),
            doc("n", json!({"rank": 2})),
            doc("b", json!({"rank": true})),
            doc("none", json!({})),
        ];
        let ids: Vec<String> = Query::new()
            .order_by("rank", Direction::Ascending)
            .apply(docs)
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["none", "b", "n", "s"]);
    }

    #[test]
    fn test_names_sort_case_insensitively() {
        let docs = vec![
            doc("1", json!({"name": "casa"})),
            doc("2", json!({"name": "Beleza"})),
            doc("3", json!({"name": "Tech"})),
        ];
        let ids: Vec<String> = Query::new()
            .order_by("name", Direction::Ascending)
            .apply(docs)
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
    }
}
