//! Map interaction state and the single reducer that drives it.
//!
//! The reducer never touches the network or the UI: it mutates
//! [`ControllerState`] and hands back an [`Effect`] when something has to
//! leave the process.

use shared::{
    domain::{GeoPoint, MarkerKind, RequestId, RouteSet},
    protocol::PathsRequest,
};

use crate::controller::events::{ControllerEvent, UiError};

/// Which endpoints have been chosen. A destination without an origin cannot
/// be represented.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Endpoints {
    #[default]
    Empty,
    OriginSet {
        origin: GeoPoint,
    },
    BothSet {
        origin: GeoPoint,
        destination: GeoPoint,
    },
}

impl Endpoints {
    pub fn origin(&self) -> Option<GeoPoint> {
        match *self {
            Endpoints::Empty => None,
            Endpoints::OriginSet { origin } | Endpoints::BothSet { origin, .. } => Some(origin),
        }
    }

    pub fn destination(&self) -> Option<GeoPoint> {
        match *self {
            Endpoints::BothSet { destination, .. } => Some(destination),
            _ => None,
        }
    }

    pub fn point(&self, marker: MarkerKind) -> Option<GeoPoint> {
        match marker {
            MarkerKind::Origin => self.origin(),
            MarkerKind::Destination => self.destination(),
        }
    }

    fn phase(&self) -> &'static str {
        match self {
            Endpoints::Empty => "empty",
            Endpoints::OriginSet { .. } => "origin_set",
            Endpoints::BothSet { .. } => "both_set",
        }
    }
}

/// Uncommitted text of the two coordinate inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputDraft {
    pub origin_text: String,
    pub destination_text: String,
}

impl InputDraft {
    pub fn text(&self, field: MarkerKind) -> &str {
        match field {
            MarkerKind::Origin => &self.origin_text,
            MarkerKind::Destination => &self.destination_text,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchPaths {
        request_id: RequestId,
        request: PathsRequest,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ControllerState {
    endpoints: Endpoints,
    routes: RouteSet,
    draft: InputDraft,
    last_issued: RequestId,
    in_flight: Option<RequestId>,
    last_failure: Option<UiError>,
}

impl ControllerState {
    pub fn endpoints(&self) -> Endpoints {
        self.endpoints
    }

    pub fn routes(&self) -> &RouteSet {
        &self.routes
    }

    pub fn draft(&self) -> &InputDraft {
        &self.draft
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    pub fn last_failure(&self) -> Option<&UiError> {
        self.last_failure.as_ref()
    }

    pub fn can_find_paths(&self) -> bool {
        matches!(self.endpoints, Endpoints::BothSet { .. })
    }
}

pub fn reduce(state: &mut ControllerState, event: ControllerEvent) -> Option<Effect> {
    match event {
        ControllerEvent::MapClicked(point) => {
            state.endpoints = match state.endpoints {
                Endpoints::Empty => Endpoints::OriginSet { origin: point },
                Endpoints::OriginSet { origin } => Endpoints::BothSet {
                    origin,
                    destination: point,
                },
                both @ Endpoints::BothSet { .. } => {
                    tracing::trace!("map click ignored: both endpoints already set");
                    both
                }
            };
            None
        }
        ControllerEvent::MarkerDragEnded { marker, point } => {
            state.endpoints = match (marker, state.endpoints) {
                (MarkerKind::Origin, Endpoints::OriginSet { .. }) => {
                    Endpoints::OriginSet { origin: point }
                }
                (MarkerKind::Origin, Endpoints::BothSet { destination, .. }) => {
                    Endpoints::BothSet {
                        origin: point,
                        destination,
                    }
                }
                (MarkerKind::Destination, Endpoints::BothSet { origin, .. }) => {
                    Endpoints::BothSet {
                        origin,
                        destination: point,
                    }
                }
                (marker, unchanged) => {
                    tracing::debug!(?marker, "drag end for a marker that is not placed");
                    unchanged
                }
            };
            None
        }
        ControllerEvent::DraftEdited { field, text } => {
            match field {
                MarkerKind::Origin => state.draft.origin_text = text,
                MarkerKind::Destination => state.draft.destination_text = text,
            }
            None
        }
        ControllerEvent::SetCoordinates => {
            let origin = state.draft.origin_text.parse::<GeoPoint>();
            let destination = state.draft.destination_text.parse::<GeoPoint>();
            match (origin, destination) {
                (Ok(origin), Ok(destination)) => {
                    state.endpoints = Endpoints::BothSet {
                        origin,
                        destination,
                    };
                }
                (origin, destination) => {
                    tracing::debug!(
                        origin_error = ?origin.err(),
                        destination_error = ?destination.err(),
                        "coordinate input ignored"
                    );
                }
            }
            None
        }
        ControllerEvent::ClearMarkers => {
            state.endpoints = Endpoints::Empty;
            state.routes = RouteSet::default();
            state.in_flight = None;
            state.last_failure = None;
            None
        }
        ControllerEvent::FindPaths => {
            let Endpoints::BothSet {
                origin,
                destination,
            } = state.endpoints
            else {
                tracing::debug!(phase = state.endpoints.phase(), "find paths unavailable");
                return None;
            };

            let request_id = state.last_issued.next();
            state.last_issued = request_id;
            state.in_flight = Some(request_id);
            Some(Effect::FetchPaths {
                request_id,
                request: PathsRequest {
                    origin,
                    destination,
                },
            })
        }
        ControllerEvent::PathsLoaded { request_id, routes } => {
            if state.in_flight != Some(request_id) {
                tracing::debug!(%request_id, "discarding stale path response");
                return None;
            }
            state.in_flight = None;
            state.last_failure = None;
            state.routes = routes;
            None
        }
        ControllerEvent::PathsFailed { request_id, error } => {
            if state.in_flight != Some(request_id) {
                tracing::debug!(%request_id, "discarding stale path failure");
                return None;
            }
            state.in_flight = None;
            state.last_failure = Some(error);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::Polyline;

    use super::*;
    use crate::controller::events::UiErrorContext;

    fn click(state: &mut ControllerState, lat: f64, lng: f64) -> Option<Effect> {
        reduce(state, ControllerEvent::MapClicked(GeoPoint::new(lat, lng)))
    }

    fn edit(state: &mut ControllerState, field: MarkerKind, text: &str) {
        reduce(
            state,
            ControllerEvent::DraftEdited {
                field,
                text: text.to_string(),
            },
        );
    }

    fn both_set() -> ControllerState {
        let mut state = ControllerState::default();
        click(&mut state, 12.9, 77.5);
        click(&mut state, 13.0, 77.6);
        state
    }

    fn one_route() -> RouteSet {
        RouteSet::new(vec![Polyline(vec![
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(2.0, 2.0),
        ])])
    }

    fn issue_request(state: &mut ControllerState) -> RequestId {
        match reduce(state, ControllerEvent::FindPaths) {
            Some(Effect::FetchPaths { request_id, .. }) => request_id,
            None => panic!("find paths should be enabled"),
        }
    }

    #[test]
    fn clicks_set_origin_then_destination_then_are_ignored() {
        let mut state = ControllerState::default();
        assert_eq!(state.endpoints(), Endpoints::Empty);

        click(&mut state, 1.0, 2.0);
        assert_eq!(
            state.endpoints(),
            Endpoints::OriginSet {
                origin: GeoPoint::new(1.0, 2.0)
            }
        );

        click(&mut state, 3.0, 4.0);
        let expected = Endpoints::BothSet {
            origin: GeoPoint::new(1.0, 2.0),
            destination: GeoPoint::new(3.0, 4.0),
        };
        assert_eq!(state.endpoints(), expected);

        for n in 0..5 {
            assert!(click(&mut state, 10.0 + n as f64, 20.0).is_none());
        }
        assert_eq!(state.endpoints(), expected);
    }

    #[test]
    fn clear_restarts_the_click_sequence() {
        let mut state = both_set();
        reduce(&mut state, ControllerEvent::ClearMarkers);
        click(&mut state, 5.0, 6.0);
        assert_eq!(
            state.endpoints(),
            Endpoints::OriginSet {
                origin: GeoPoint::new(5.0, 6.0)
            }
        );
    }

    #[test]
    fn set_coordinates_jumps_to_both_set_from_any_phase() {
        let mut state = ControllerState::default();
        click(&mut state, 0.0, 0.0);
        edit(&mut state, MarkerKind::Origin, "12.9,77.5");
        edit(&mut state, MarkerKind::Destination, "13.0,77.6");

        reduce(&mut state, ControllerEvent::SetCoordinates);

        assert_eq!(
            state.endpoints(),
            Endpoints::BothSet {
                origin: GeoPoint::new(12.9, 77.5),
                destination: GeoPoint::new(13.0, 77.6),
            }
        );
        assert!(state.can_find_paths());
    }

    #[test]
    fn malformed_coordinates_leave_state_unchanged() {
        let mut state = ControllerState::default();
        click(&mut state, 1.0, 2.0);
        edit(&mut state, MarkerKind::Origin, "abc");
        edit(&mut state, MarkerKind::Destination, "13.0,77.6");
        let before = state.endpoints();

        reduce(&mut state, ControllerEvent::SetCoordinates);

        assert_eq!(state.endpoints(), before);
        assert_eq!(state.draft().text(MarkerKind::Origin), "abc");
    }

    #[test]
    fn one_malformed_field_does_not_set_the_other() {
        let mut state = ControllerState::default();
        edit(&mut state, MarkerKind::Origin, "12.9,77.5");
        edit(&mut state, MarkerKind::Destination, "13.0;77.6");

        reduce(&mut state, ControllerEvent::SetCoordinates);

        assert_eq!(state.endpoints(), Endpoints::Empty);
    }

    #[test]
    fn clear_resets_endpoints_and_routes_from_any_phase() {
        let mut state = both_set();
        let id = issue_request(&mut state);
        reduce(
            &mut state,
            ControllerEvent::PathsLoaded {
                request_id: id,
                routes: one_route(),
            },
        );
        edit(&mut state, MarkerKind::Origin, "1,1");

        reduce(&mut state, ControllerEvent::ClearMarkers);

        assert_eq!(state.endpoints(), Endpoints::Empty);
        assert!(state.routes().is_empty());
        assert_eq!(state.draft().text(MarkerKind::Origin), "1,1");

        let mut empty = ControllerState::default();
        reduce(&mut empty, ControllerEvent::ClearMarkers);
        assert_eq!(empty.endpoints(), Endpoints::Empty);
    }

    #[test]
    fn find_paths_is_a_no_op_until_both_points_exist() {
        let mut state = ControllerState::default();
        assert!(reduce(&mut state, ControllerEvent::FindPaths).is_none());

        click(&mut state, 1.0, 2.0);
        assert!(!state.can_find_paths());
        assert!(reduce(&mut state, ControllerEvent::FindPaths).is_none());
        assert_eq!(state.in_flight(), None);
    }

    #[test]
    fn find_paths_emits_request_with_both_points() {
        let mut state = both_set();
        let effect = reduce(&mut state, ControllerEvent::FindPaths);
        assert_eq!(
            effect,
            Some(Effect::FetchPaths {
                request_id: RequestId(1),
                request: PathsRequest {
                    origin: GeoPoint::new(12.9, 77.5),
                    destination: GeoPoint::new(13.0, 77.6),
                },
            })
        );
        assert_eq!(state.in_flight(), Some(RequestId(1)));
    }

    #[test]
    fn loaded_response_replaces_routes() {
        let mut state = both_set();
        let id = issue_request(&mut state);

        reduce(
            &mut state,
            ControllerEvent::PathsLoaded {
                request_id: id,
                routes: one_route(),
            },
        );

        assert_eq!(state.routes(), &one_route());
        assert_eq!(state.in_flight(), None);

        let id = issue_request(&mut state);
        reduce(
            &mut state,
            ControllerEvent::PathsLoaded {
                request_id: id,
                routes: RouteSet::default(),
            },
        );
        assert!(state.routes().is_empty());
    }

    #[test]
    fn only_latest_request_may_update_routes() {
        let mut state = both_set();
        let first = issue_request(&mut state);
        let second = issue_request(&mut state);
        assert!(second > first);

        reduce(
            &mut state,
            ControllerEvent::PathsLoaded {
                request_id: second,
                routes: one_route(),
            },
        );
        reduce(
            &mut state,
            ControllerEvent::PathsLoaded {
                request_id: first,
                routes: RouteSet::default(),
            },
        );

        assert_eq!(state.routes(), &one_route());
    }

    #[test]
    fn response_after_clear_is_discarded() {
        let mut state = both_set();
        let id = issue_request(&mut state);
        reduce(&mut state, ControllerEvent::ClearMarkers);

        reduce(
            &mut state,
            ControllerEvent::PathsLoaded {
                request_id: id,
                routes: one_route(),
            },
        );

        assert!(state.routes().is_empty());
        assert_eq!(state.endpoints(), Endpoints::Empty);
    }

    #[test]
    fn failure_keeps_previous_routes_and_is_recorded() {
        let mut state = both_set();
        let id = issue_request(&mut state);
        reduce(
            &mut state,
            ControllerEvent::PathsLoaded {
                request_id: id,
                routes: one_route(),
            },
        );

        let id = issue_request(&mut state);
        reduce(
            &mut state,
            ControllerEvent::PathsFailed {
                request_id: id,
                error: UiError::from_message(UiErrorContext::FindPaths, "connection refused"),
            },
        );

        assert_eq!(state.routes(), &one_route());
        assert_eq!(state.in_flight(), None);
        assert!(state.last_failure().is_some());

        reduce(
            &mut state,
            ControllerEvent::PathsFailed {
                request_id: RequestId(99),
                error: UiError::from_message(UiErrorContext::FindPaths, "late"),
            },
        );
        assert_eq!(
            state.last_failure().map(|e| e.message()),
            Some("connection refused")
        );
    }

    #[test]
    fn drag_moves_existing_marker_without_changing_phase() {
        let mut state = both_set();
        reduce(
            &mut state,
            ControllerEvent::MarkerDragEnded {
                marker: MarkerKind::Origin,
                point: GeoPoint::new(12.95, 77.55),
            },
        );
        assert_eq!(
            state.endpoints(),
            Endpoints::BothSet {
                origin: GeoPoint::new(12.95, 77.55),
                destination: GeoPoint::new(13.0, 77.6),
            }
        );

        reduce(
            &mut state,
            ControllerEvent::MarkerDragEnded {
                marker: MarkerKind::Destination,
                point: GeoPoint::new(13.1, 77.7),
            },
        );
        assert_eq!(
            state.endpoints().destination(),
            Some(GeoPoint::new(13.1, 77.7))
        );
    }

    #[test]
    fn drag_of_missing_marker_is_ignored() {
        let mut state = ControllerState::default();
        click(&mut state, 1.0, 2.0);
        reduce(
            &mut state,
            ControllerEvent::MarkerDragEnded {
                marker: MarkerKind::Destination,
                point: GeoPoint::new(9.0, 9.0),
            },
        );
        assert_eq!(
            state.endpoints(),
            Endpoints::OriginSet {
                origin: GeoPoint::new(1.0, 2.0)
            }
        );
    }

    #[test]
    fn moving_one_endpoint_keeps_existing_routes() {
        let mut state = both_set();
        let id = issue_request(&mut state);
        reduce(
            &mut state,
            ControllerEvent::PathsLoaded {
                request_id: id,
                routes: one_route(),
            },
        );

        reduce(
            &mut state,
            ControllerEvent::MarkerDragEnded {
                marker: MarkerKind::Origin,
                point: GeoPoint::new(0.0, 0.0),
            },
        );

        assert_eq!(state.routes(), &one_route());
    }
}
