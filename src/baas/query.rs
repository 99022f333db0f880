use serde_json::{json, Value};

/// Filter/ordering terms accepted by the document store's list endpoint.
/// Rendered to the provider's JSON wire form at request time.
#[derive(Debug, Clone)]
pub enum Query {
    Equal(&'static str, Value),
    OrderAsc(&'static str),
    OrderDesc(&'static str),
    Limit(u64),
    Offset(u64),
}

impl Query {
    pub fn equal(attribute: &'static str, value: impl Into<Value>) -> Query {
        Query::Equal(attribute, value.into())
    }

    pub fn to_wire(&self) -> String {
        match self {
            Query::Equal(attr, value) => {
                json!({"method": "equal", "attribute": attr, "values": [value]}).to_string()
            }
            Query::OrderAsc(attr) => {
                json!({"method": "orderAsc", "attribute": attr}).to_string()
            }
            Query::OrderDesc(attr) => {
                json!({"method": "orderDesc", "attribute": attr}).to_string()
            }
            Query::Limit(n) => json!({"method": "limit", "values": [n]}).to_string(),
            Query::Offset(n) => json!({"method": "offset", "values": [n]}).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_renders_attribute_and_values() {
        let q = Query::equal("userid", "u-1").to_wire();
        let v: serde_json::Value = serde_json::from_str(&q).unwrap();
        assert_eq!(v["method"], "equal");
        assert_eq!(v["attribute"], "userid");
        assert_eq!(v["values"][0], "u-1");
    }

    #[test]
    fn limit_and_offset_render_numbers() {
        let v: serde_json::Value = serde_json::from_str(&Query::Limit(100).to_wire()).unwrap();
        assert_eq!(v["values"][0], 100);
        let v: serde_json::Value = serde_json::from_str(&Query::Offset(40).to_wire()).unwrap();
        assert_eq!(v["values"][0], 40);
    }

    #[test]
    fn order_desc_names_the_attribute() {
        let v: serde_json::Value =
            serde_json::from_str(&Query::OrderDesc("$createdAt").to_wire()).unwrap();
        assert_eq!(v["method"], "orderDesc");
        assert_eq!(v["attribute"], "$createdAt");
    }
}
