//! Response envelopes shared by all resources

use serde::{Deserialize, Serialize};

/// Paginated collection returned by `list` operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiList<T> {
    /// Always `list`
    pub object: String,
    pub data: Vec<T>,
    pub has_more: bool,
    #[serde(default)]
    pub url: Option<String>,
}

impl<T> ApiList<T> {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}

/// Response of `delete` operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedObject {
    pub id: String,
    #[serde(default)]
    pub object: Option<String>,
    pub deleted: bool,
}

/// Range filter for timestamps and amounts in list params
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_decode_list() {
        let list: ApiList<Value> = serde_json::from_value(json!({
            "object": "list",
            "url": "/v1/customers",
            "has_more": true,
            "data": [{"id": "cus_1"}, {"id": "cus_2"}]
        }))
        .unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.has_more);
    }

    #[test]
    fn test_decode_deleted() {
        let deleted: DeletedObject =
            serde_json::from_value(json!({"id": "rp_1", "object": "recipient", "deleted": true}))
                .unwrap();
        assert!(deleted.deleted);
    }

    #[test]
    fn test_range_query_skips_unset_bounds() {
        let range = RangeQuery {
            gte: Some(10),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(range).unwrap(), json!({"gte": 10}));
    }
}
