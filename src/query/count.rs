//! Request body for the `_count` endpoint
//!
//! Produces:
//!
//! ```json
//! {"query": {"bool": {"must": [
//!     {"regexp": {"message": {"value": ".*<phrase>.*"}}},
//!     {"range": {"timestamp": {"gte": "now-<window>", "lt": "now"}}}
//! ]}}}
//! ```
//!
//! The phrase is not regex-escaped; metacharacters reach the backend as-is.

use serde::Serialize;

/// Field holding the log line text
pub const MESSAGE_FIELD: &str = "message";
/// Field holding the event time
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Top-level count request
#[derive(Debug, Clone, Serialize)]
pub struct CountQuery {
    query: BoolQuery,
}

#[derive(Debug, Clone, Serialize)]
struct BoolQuery {
    #[serde(rename = "bool")]
    bool_clause: MustClause,
}

#[derive(Debug, Clone, Serialize)]
struct MustClause {
    must: Vec<Clause>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
enum Clause {
    Regexp(FieldMap<RegexpValue>),
    Range(FieldMap<RangeBounds>),
}

/// Single-entry `{"<field>": <inner>}` object
#[derive(Debug, Clone)]
struct FieldMap<T> {
    field: &'static str,
    inner: T,
}

impl<T: Serialize> Serialize for FieldMap<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.field, &self.inner)?;
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
struct RegexpValue {
    value: String,
}

#[derive(Debug, Clone, Serialize)]
struct RangeBounds {
    gte: String,
    lt: String,
}

impl CountQuery {
    /// Match `phrase` anywhere in the message within `[now-window, now)`
    pub fn new(phrase: &str, time_window: &str) -> Self {
        let regexp = Clause::Regexp(FieldMap {
            field: MESSAGE_FIELD,
            inner: RegexpValue {
                value: format!(".*{}.*", phrase),
            },
        });
        let range = Clause::Range(FieldMap {
            field: TIMESTAMP_FIELD,
            inner: RangeBounds {
                gte: format!("now-{}", time_window),
                lt: "now".to_string(),
            },
        });

        Self {
            query: BoolQuery {
                bool_clause: MustClause {
                    must: vec![regexp, range],
                },
            },
        }
    }
}
