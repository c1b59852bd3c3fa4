use serde::{Deserialize, Serialize};

use crate::domain::{GeoPoint, RouteSet};

/// Body of `POST /api/paths`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsResponse {
    pub paths: RouteSet,
}
