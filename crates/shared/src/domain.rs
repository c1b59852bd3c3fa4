use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::CoordinateParseError;

/// A geographic position in degrees.
///
/// No range check is applied: whatever the map surface or the user typed is
/// forwarded to the routing service unchanged. On the wire a point is the
/// two-element array `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(point: GeoPoint) -> Self {
        [point.lat, point.lng]
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Parses the `"<lat>,<lng>"` form typed into the coordinate inputs.
impl FromStr for GeoPoint {
    type Err = CoordinateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split(',').collect();
        let [lat, lng] = tokens.as_slice() else {
            return Err(CoordinateParseError::WrongTokenCount {
                found: tokens.len(),
            });
        };
        Ok(Self {
            lat: parse_coordinate(lat)?,
            lng: parse_coordinate(lng)?,
        })
    }
}

fn parse_coordinate(token: &str) -> Result<f64, CoordinateParseError> {
    let token = token.trim();
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CoordinateParseError::InvalidNumber {
            token: token.to_string(),
        }),
    }
}

/// One candidate route: an ordered list of points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline(pub Vec<GeoPoint>);

impl Polyline {
    pub fn points(&self) -> &[GeoPoint] {
        &self.0
    }
}

/// Every route returned by one successful path query, in service order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteSet(Vec<Polyline>);

impl RouteSet {
    pub fn new(paths: Vec<Polyline>) -> Self {
        Self(paths)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn paths(&self) -> &[Polyline] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Polyline> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Origin,
    Destination,
}

impl MarkerKind {
    pub fn label(self) -> &'static str {
        match self {
            MarkerKind::Origin => "Origin",
            MarkerKind::Destination => "Destination",
        }
    }
}

/// Token attached to each path query so late responses can be told apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl RequestId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_pair() {
        let point: GeoPoint = "12.9,77.5".parse().expect("parse");
        assert_eq!(point, GeoPoint::new(12.9, 77.5));
    }

    #[test]
    fn tolerates_whitespace_around_tokens() {
        let point: GeoPoint = " 13.0 , 77.6 ".parse().expect("parse");
        assert_eq!(point, GeoPoint::new(13.0, 77.6));
    }

    #[test]
    fn rejects_single_token() {
        let err = "abc".parse::<GeoPoint>().expect_err("must fail");
        assert_eq!(err, CoordinateParseError::WrongTokenCount { found: 1 });
    }

    #[test]
    fn rejects_three_tokens() {
        let err = "1,2,3".parse::<GeoPoint>().expect_err("must fail");
        assert_eq!(err, CoordinateParseError::WrongTokenCount { found: 3 });
    }

    #[test]
    fn rejects_non_numeric_and_non_finite_tokens() {
        assert!(matches!(
            "abc,77.5".parse::<GeoPoint>(),
            Err(CoordinateParseError::InvalidNumber { token }) if token == "abc"
        ));
        assert!(matches!(
            "12.9,".parse::<GeoPoint>(),
            Err(CoordinateParseError::InvalidNumber { token }) if token.is_empty()
        ));
        assert!("NaN,1".parse::<GeoPoint>().is_err());
        assert!("1,inf".parse::<GeoPoint>().is_err());
    }

    #[test]
    fn accepts_out_of_range_values_unchanged() {
        let point: GeoPoint = "123.0,-500".parse().expect("parse");
        assert_eq!(point, GeoPoint::new(123.0, -500.0));
    }

    #[test]
    fn serializes_as_lat_lng_array() {
        let json = serde_json::to_string(&GeoPoint::new(12.9716, 77.5946)).expect("json");
        assert_eq!(json, "[12.9716,77.5946]");
    }

    #[test]
    fn routes_can_be_walked_from_the_last_alternative_back() {
        let routes = RouteSet::new(vec![
            Polyline(vec![GeoPoint::new(1.0, 1.0)]),
            Polyline(vec![GeoPoint::new(2.0, 2.0)]),
            Polyline(vec![GeoPoint::new(3.0, 3.0)]),
        ]);

        let order: Vec<usize> = routes.iter().enumerate().rev().map(|(index, _)| index).collect();
        assert_eq!(order, vec![2, 1, 0]);
        assert_eq!(routes.iter().len(), 3);
    }

    #[test]
    fn request_ids_increase() {
        let first = RequestId::default().next();
        assert_eq!(first, RequestId(1));
        assert!(first.next() > first);
    }
}
