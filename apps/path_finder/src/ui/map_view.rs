//! Map surface: the tile widget plus an overlay for routes and draggable markers.

use std::path::PathBuf;

use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Vec2};
use shared::domain::{GeoPoint, MarkerKind, RouteSet};
use walkers::sources::{Attribution, TileSource};
use walkers::{
    HeaderValue, HttpOptions, HttpTiles, Map, MapMemory, MaxParallelDownloads, Plugin, Position,
    Projector,
};

use crate::controller::{events::ControllerEvent, reducer::Endpoints};

pub const PRIMARY_ROUTE_COLOR: Color32 = Color32::from_rgb(37, 99, 235);
pub const ALTERNATIVE_ROUTE_COLOR: Color32 = Color32::from_rgb(22, 163, 74);
const ORIGIN_COLOR: Color32 = Color32::from_rgb(29, 78, 216);
const DESTINATION_COLOR: Color32 = Color32::from_rgb(220, 38, 38);

const ROUTE_WIDTH: f32 = 4.0;
const MARKER_RADIUS: f32 = 9.0;
const MARKER_HIT_RADIUS: f32 = 14.0;
const ATTRIBUTION_TEXT: &str = "© OpenStreetMap contributors";
const ATTRIBUTION_URL: &str = "https://www.openstreetmap.org/copyright";
const TILE_USER_AGENT: &str = concat!("path-finder/", env!("CARGO_PKG_VERSION"));

/// The first route returned is drawn as the primary one.
pub fn route_color(index: usize) -> Color32 {
    if index == 0 {
        PRIMARY_ROUTE_COLOR
    } else {
        ALTERNATIVE_ROUTE_COLOR
    }
}

pub fn marker_color(kind: MarkerKind) -> Color32 {
    match kind {
        MarkerKind::Origin => ORIGIN_COLOR,
        MarkerKind::Destination => DESTINATION_COLOR,
    }
}

pub fn to_position(point: GeoPoint) -> Position {
    walkers::lat_lon(point.lat, point.lng)
}

pub fn to_geo(position: Position) -> GeoPoint {
    GeoPoint::new(position.y(), position.x())
}

/// Tile server addressed by a `{z}/{x}/{y}` URL template.
#[derive(Debug, Clone)]
pub struct TemplateTiles {
    url_template: String,
}

impl TemplateTiles {
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
        }
    }
}

impl TileSource for TemplateTiles {
    fn tile_url(&self, tile_id: walkers::TileId) -> String {
        self.url_template
            .replace("{z}", &tile_id.zoom.to_string())
            .replace("{x}", &tile_id.x.to_string())
            .replace("{y}", &tile_id.y.to_string())
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: ATTRIBUTION_TEXT,
            url: ATTRIBUTION_URL,
            logo_light: None,
            logo_dark: None,
        }
    }
}

pub struct MapView {
    memory: MapMemory,
    home: Position,
    source: TemplateTiles,
    max_parallel_downloads: usize,
    tiles: Option<HttpTiles>,
}

impl MapView {
    pub fn new(
        center: GeoPoint,
        zoom: u8,
        tile_url: impl Into<String>,
        max_parallel_downloads: usize,
    ) -> Self {
        let mut memory = MapMemory::default();
        if let Err(err) = memory.set_zoom(f64::from(zoom)) {
            tracing::warn!(zoom, "keeping default map zoom: {err}");
        }
        Self {
            memory,
            home: to_position(center),
            source: TemplateTiles::new(tile_url),
            max_parallel_downloads: max_parallel_downloads.max(1),
            tiles: None,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.memory.zoom()
    }

    /// Geographic point under the middle of the map.
    pub fn center(&self) -> GeoPoint {
        to_geo(self.memory.detached().unwrap_or(self.home))
    }

    pub fn zoom_in(&mut self) {
        if let Err(err) = self.memory.zoom_in() {
            tracing::trace!("zoom in ignored: {err}");
        }
    }

    pub fn zoom_out(&mut self) {
        if let Err(err) = self.memory.zoom_out() {
            tracing::trace!("zoom out ignored: {err}");
        }
    }

    fn ensure_tiles(&mut self, ctx: &egui::Context) {
        if self.tiles.is_some() {
            return;
        }
        let options = HttpOptions {
            cache: tile_cache_dir(),
            user_agent: Some(HeaderValue::from_static(TILE_USER_AGENT)),
            max_parallel_downloads: MaxParallelDownloads(self.max_parallel_downloads),
        };
        tracing::debug!(cache = ?options.cache, "starting map tile downloads");
        self.tiles = Some(HttpTiles::with_options(self.source.clone(), options, ctx.clone()));
    }

    /// Draws the map into all remaining space and returns what the user did
    /// to it this frame.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        endpoints: Endpoints,
        routes: &RouteSet,
    ) -> Vec<ControllerEvent> {
        self.ensure_tiles(ui.ctx());
        let map_rect = ui.available_rect_before_wrap();
        let mut events = Vec::new();

        let overlay = RouteOverlay {
            endpoints,
            routes,
            events: &mut events,
        };
        let tiles = self
            .tiles
            .as_mut()
            .map(|tiles| tiles as &mut dyn walkers::Tiles);
        let map = Map::new(tiles, &mut self.memory, self.home)
            .zoom_with_ctrl(false)
            .with_plugin(overlay);
        ui.add(map);

        ui.painter().text(
            map_rect.max - Vec2::new(5.0, 5.0),
            Align2::RIGHT_BOTTOM,
            ATTRIBUTION_TEXT,
            FontId::proportional(11.0),
            Color32::from_black_alpha(170),
        );
        self.show_zoom_buttons(ui, map_rect);
        events
    }

    fn show_zoom_buttons(&mut self, ui: &mut egui::Ui, rect: Rect) {
        let button_size = Vec2::splat(28.0);
        let zoom_in = Rect::from_min_size(rect.left_top() + Vec2::new(10.0, 10.0), button_size);
        let zoom_out = zoom_in.translate(Vec2::new(0.0, button_size.y + 4.0));

        if ui.put(zoom_in, egui::Button::new("+")).clicked() {
            self.zoom_in();
        }
        if ui.put(zoom_out, egui::Button::new("-")).clicked() {
            self.zoom_out();
        }
    }
}

fn tile_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("path_finder").join("tiles"))
}

fn screen_pos(projector: &Projector, point: GeoPoint) -> Pos2 {
    projector.project(to_position(point)).to_pos2()
}

fn geo_at(projector: &Projector, pos: Pos2) -> GeoPoint {
    to_geo(projector.unproject(pos.to_vec2()))
}

/// Topmost marker within grabbing distance of `pos`.
fn marker_at(projector: &Projector, endpoints: Endpoints, pos: Pos2) -> Option<MarkerKind> {
    [MarkerKind::Destination, MarkerKind::Origin]
        .into_iter()
        .find(|kind| {
            endpoints
                .point(*kind)
                .is_some_and(|point| screen_pos(projector, point).distance(pos) <= MARKER_HIT_RADIUS)
        })
}

/// Paints routes and markers on top of the tiles and turns pointer input into
/// controller events.
struct RouteOverlay<'a> {
    endpoints: Endpoints,
    routes: &'a RouteSet,
    events: &'a mut Vec<ControllerEvent>,
}

impl Plugin for RouteOverlay<'_> {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _memory: &MapMemory,
    ) {
        let RouteOverlay {
            endpoints,
            routes,
            events,
        } = *self;
        let painter = ui.painter().with_clip_rect(response.rect);

        // Primary route last so it sits on top of the alternatives.
        for (index, path) in routes.iter().enumerate().rev() {
            let points: Vec<Pos2> = path
                .points()
                .iter()
                .map(|point| screen_pos(projector, *point))
                .collect();
            if points.len() < 2 {
                continue;
            }
            painter.add(Shape::line(points, Stroke::new(ROUTE_WIDTH, route_color(index))));
        }

        for kind in [MarkerKind::Origin, MarkerKind::Destination] {
            let Some(point) = endpoints.point(kind) else {
                continue;
            };
            let anchor = screen_pos(projector, point);
            let id = response.id.with(("path-finder-marker", kind.label()));
            let handle = ui
                .interact(
                    Rect::from_center_size(anchor, Vec2::splat(MARKER_HIT_RADIUS * 2.0)),
                    id,
                    Sense::click_and_drag(),
                )
                .on_hover_cursor(egui::CursorIcon::Grab);

            if handle.drag_started() {
                ui.data_mut(|data| data.insert_temp(id, anchor));
            }
            let mut pos = ui.data(|data| data.get_temp::<Pos2>(id)).unwrap_or(anchor);
            if handle.dragged() {
                pos += handle.drag_delta();
                ui.data_mut(|data| data.insert_temp(id, pos));
            }
            if handle.drag_stopped() {
                ui.data_mut(|data| data.remove::<Pos2>(id));
                events.push(ControllerEvent::MarkerDragEnded {
                    marker: kind,
                    point: geo_at(projector, pos),
                });
            }

            paint_marker(&painter, pos, kind);
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if marker_at(projector, endpoints, pos).is_none() {
                    events.push(ControllerEvent::MapClicked(geo_at(projector, pos)));
                }
            }
        }
    }
}

fn paint_marker(painter: &egui::Painter, pos: Pos2, kind: MarkerKind) {
    painter.circle_filled(pos, MARKER_RADIUS, marker_color(kind));
    painter.circle_stroke(pos, MARKER_RADIUS, Stroke::new(2.0, Color32::WHITE));
    painter.text(
        pos - Vec2::new(0.0, MARKER_RADIUS + 4.0),
        Align2::CENTER_BOTTOM,
        kind.label(),
        FontId::proportional(13.0),
        Color32::BLACK,
    );
}
