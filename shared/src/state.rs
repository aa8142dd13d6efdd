use serde::{Deserialize, Serialize};

use crate::{Coordinate, Route, RouteBounds};

pub const DEFAULT_CENTER: Coordinate = Coordinate::new(51.505, -0.09);

pub const NO_ROUTES_MESSAGE: &str = "No routes found";

/// Search screen state. Overlapping searches are not told apart: whichever
/// response arrives last wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub loading: bool,
    pub routes: Vec<Route>,
    pub selected_route_id: Option<String>,
    pub center: Coordinate,
    pub start_coords: Option<Coordinate>,
    pub end_coords: Option<Coordinate>,
    pub error: Option<String>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            loading: false,
            routes: Vec::new(),
            selected_route_id: None,
            center: DEFAULT_CENTER,
            start_coords: None,
            end_coords: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchEvent {
    Submitted,
    RoutesLoaded(Vec<Route>),
    Failed(String),
    RouteSelected(String),
    Cleared,
}

impl SearchState {
    pub fn selected_route(&self) -> Option<&Route> {
        let id = self.selected_route_id.as_deref()?;
        self.routes.iter().find(|r| r.id == id)
    }

    pub fn bounds(&self) -> Option<RouteBounds> {
        RouteBounds::from_coordinates(self.routes.iter().flat_map(|r| &r.coordinates))
    }
}

pub fn update(state: SearchState, event: SearchEvent) -> SearchState {
    match event {
        SearchEvent::Submitted => SearchState {
            loading: true,
            error: None,
            ..state
        },
        SearchEvent::RoutesLoaded(routes) => {
            let Some(first) = routes.first() else {
                return SearchState {
                    loading: false,
                    routes: Vec::new(),
                    selected_route_id: None,
                    error: Some(NO_ROUTES_MESSAGE.to_string()),
                    ..state
                };
            };
            SearchState {
                loading: false,
                selected_route_id: Some(first.id.clone()),
                center: first.midpoint().unwrap_or(state.center),
                start_coords: Some(first.start_coords),
                end_coords: Some(first.end_coords),
                error: None,
                routes,
            }
        }
        SearchEvent::Failed(message) => SearchState {
            loading: false,
            error: Some(message),
            ..state
        },
        SearchEvent::RouteSelected(id) => {
            if state.routes.iter().any(|r| r.id == id) {
                SearchState {
                    selected_route_id: Some(id),
                    ..state
                }
            } else {
                state
            }
        }
        SearchEvent::Cleared => SearchState::default(),
    }
}
