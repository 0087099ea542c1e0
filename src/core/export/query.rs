//! Load query construction
//!
//! Every page of a cube is fetched with the same query shape; only the
//! offset moves between pages.

use crate::core::state::Checkpoint;
use crate::domain::{CubeMetadata, ExportMode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// Filter operator selecting rows strictly after a timestamp
pub const AFTER_DATE: &str = "afterDate";

/// One entry of the query filter list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub member: String,
    pub operator: String,
    pub values: Vec<String>,
}

impl Filter {
    /// `member` strictly after the checkpoint timestamp
    pub fn after_date(member: impl Into<String>, checkpoint: &Checkpoint) -> Self {
        Self {
            member: member.into(),
            operator: AFTER_DATE.to_string(),
            values: vec![checkpoint.formatted()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// Single-field ordering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub member: String,
    pub direction: SortDirection,
}

impl Order {
    pub fn ascending(member: impl Into<String>) -> Self {
        Self {
            member: member.into(),
            direction: SortDirection::Asc,
        }
    }
}

/// Shape of one load request
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub measures: Vec<String>,
    pub dimensions: Vec<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: usize,
    pub offset: usize,
}

impl QuerySpec {
    /// JSON body for the load endpoint: `{"query": {...}}`
    pub fn to_request_body(&self) -> Value {
        let mut order = Map::new();
        if let Some(o) = &self.order {
            order.insert(o.member.clone(), Value::String(o.direction.to_string()));
        }

        json!({
            "query": {
                "measures": self.measures,
                "dimensions": self.dimensions,
                "filters": self.filters,
                "limit": self.limit,
                "offset": self.offset,
                "order": order,
            }
        })
    }
}

/// Builds the per-page query for a cube
pub struct QueryBuilder;

impl QueryBuilder {
    /// Build the query for page `page_index` of a cube
    ///
    /// Incremental cubes filter on `<Cube>.updatedAt` after the checkpoint and
    /// order by it ascending. Full snapshots order by the first declared
    /// dimension.
    pub fn build(
        cube: &CubeMetadata,
        mode: ExportMode,
        checkpoint: &Checkpoint,
        page_index: usize,
        page_size: usize,
    ) -> QuerySpec {
        let (filters, order) = match mode {
            ExportMode::Incremental => {
                let member = cube.updated_at_member();
                (
                    vec![Filter::after_date(member.clone(), checkpoint)],
                    Some(Order::ascending(member)),
                )
            }
            ExportMode::FullSnapshot => {
                (Vec::new(), cube.first_dimension().map(Order::ascending))
            }
        };

        QuerySpec {
            measures: cube.measures.clone(),
            dimensions: cube.dimensions.clone(),
            filters,
            order,
            limit: page_size,
            offset: page_index * page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::parse_timestamp;
    use crate::domain::CubeName;

    fn orders() -> CubeMetadata {
        CubeMetadata::new(
            CubeName::new("Orders").unwrap(),
            vec![
                "Orders.id".to_string(),
                "Orders.status".to_string(),
                "Orders.updatedAt".to_string(),
            ],
            vec!["Orders.count".to_string()],
        )
    }

    fn checkpoint(cube: &CubeMetadata) -> Checkpoint {
        Checkpoint::new(
            cube.name.clone(),
            parse_timestamp("2025-02-26T16:25:00").unwrap(),
        )
    }

    #[test]
    fn test_incremental_query() {
        let cube = orders();
        let query = QueryBuilder::build(&cube, ExportMode::Incremental, &checkpoint(&cube), 0, 100);

        assert_eq!(query.measures, cube.measures);
        assert_eq!(query.dimensions, cube.dimensions);
        assert_eq!(
            query.filters,
            vec![Filter {
                member: "Orders.updatedAt".to_string(),
                operator: "afterDate".to_string(),
                values: vec!["2025-02-26T16:25:00".to_string()],
            }]
        );
        assert_eq!(query.order, Some(Order::ascending("Orders.updatedAt")));
        assert_eq!(query.limit, 100);
        assert_eq!(query.offset, 0);
    }

    #[test]
    fn test_full_snapshot_query() {
        let cube = orders();
        let query =
            QueryBuilder::build(&cube, ExportMode::FullSnapshot, &checkpoint(&cube), 3, 50);

        assert!(query.filters.is_empty());
        assert_eq!(query.order, Some(Order::ascending("Orders.id")));
        assert_eq!(query.offset, 150);
    }

    #[test]
    fn test_full_snapshot_without_dimensions() {
        let cube = CubeMetadata::new(
            CubeName::new("Totals").unwrap(),
            vec![],
            vec!["Totals.count".to_string()],
        );
        let query = QueryBuilder::build(&cube, ExportMode::FullSnapshot, &checkpoint(&cube), 0, 10);
        assert!(query.order.is_none());
        assert_eq!(query.to_request_body()["query"]["order"], json!({}));
    }

    #[test]
    fn test_request_body_shape() {
        let cube = orders();
        let query = QueryBuilder::build(&cube, ExportMode::Incremental, &checkpoint(&cube), 2, 2);

        assert_eq!(
            query.to_request_body(),
            json!({
                "query": {
                    "measures": ["Orders.count"],
                    "dimensions": ["Orders.id", "Orders.status", "Orders.updatedAt"],
                    "filters": [{
                        "member": "Orders.updatedAt",
                        "operator": "afterDate",
                        "values": ["2025-02-26T16:25:00"]
                    }],
                    "limit": 2,
                    "offset": 4,
                    "order": {"Orders.updatedAt": "asc"}
                }
            })
        );
    }
}
