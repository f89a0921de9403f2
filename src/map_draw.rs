use geo::{BoundingRect, Coord, Geometry, Rect, coord};
use ratatui::layout::Rect as TuiRect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::Span;
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line, Map, MapResolution, Points};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;
use tracing::debug;

use crate::{data::{Feature, FeatureStore}, filter::FilterState, palette};

/// Margines wokół dopasowanego obszaru (ułamek rozpiętości)
const FIT_PADDING: f64 = 0.05;
/// Minimalna rozpiętość w stopniach, np. gdy widoczny jest jeden punkt
const MIN_SPAN: f64 = 0.2;

/// Widoczny zakres mapy w stopniach (lon, lat)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl Default for Viewport {
    /// Japonia, środek w okolicy 135°E 35°N
    fn default() -> Self {
        Self { x_bounds: [127.0, 143.0], y_bounds: [28.0, 42.0] }
    }
}

impl Viewport {
    fn fit(rect: Rect<f64>) -> Self {
        let center = rect.center();
        let half_w = rect.width().max(MIN_SPAN) * (0.5 + FIT_PADDING);
        let half_h = rect.height().max(MIN_SPAN) * (0.5 + FIT_PADDING);
        Self {
            x_bounds: [center.x - half_w, center.x + half_w],
            y_bounds: [center.y - half_h, center.y + half_h],
        }
    }

    pub fn contains(&self, c: Coord<f64>) -> bool {
        (self.x_bounds[0]..=self.x_bounds[1]).contains(&c.x) && (self.y_bounds[0]..=self.y_bounds[1]).contains(&c.y)
    }
}

/// Treść dymka ze szczegółami
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Popup {
    pub title: String,
    pub subtitle: String,
    pub body: String,
}

/// Narysowany obiekt warstwy
#[derive(Clone, Debug)]
pub struct Marker {
    pub feature: usize,
    pub geometry: Geometry<f64>,
    pub color: Color,
    pub popup: Popup,
}

impl Marker {
    fn new(feature: usize, f: &Feature) -> Self {
        Self {
            feature,
            geometry: f.geometry.clone(),
            color: palette::color_for(&f.category),
            popup: Popup {
                title: f.name.clone(),
                subtitle: format!("{} / {}", f.region, f.category),
                body: f.description.clone(),
            },
        }
    }

    /// Punkt zaczepienia etykiety
    pub fn anchor(&self) -> Option<Coord<f64>> {
        match &self.geometry {
            Geometry::Point(p) => Some(p.0),
            g => g.bounding_rect().map(|r| r.center()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderResult {
    pub count: usize,
}

/// Tekst licznika wyników
pub fn hits_label(count: usize) -> String {
    format!("表示: {} 件", count)
}

/// Warstwa z aktualnie widocznymi obiektami i zakres mapy
#[derive(Debug, Default)]
pub struct MapView {
    layer: Vec<Marker>,
    viewport: Viewport,
}

impl MapView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Przelicza zbiór widocznych obiektów od zera i podmienia całą warstwę.
    /// Przy pustym zbiorze zakres mapy zostaje bez zmian.
    pub fn render(&mut self, store: &FeatureStore, filter: &FilterState) -> RenderResult {
        let layer: Vec<Marker> = store
            .features()
            .iter()
            .enumerate()
            .filter(|(_, f)| filter.matches(f))
            .map(|(idx, f)| Marker::new(idx, f))
            .collect();

        match layer_bounds(&layer) {
            Some(rect) => self.viewport = Viewport::fit(rect),
            None => debug!("nothing to fit, viewport unchanged"),
        }

        self.layer = layer;
        let count = self.layer.len();
        debug!(count, total = store.len(), "layer redrawn");
        RenderResult { count }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.layer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Rysuje warstwę; wybrany obiekt jest podświetlony i podpisany
    pub fn draw(&self, f: &mut Frame, area: TuiRect, title: &str, selected: Option<usize>) {
        let span = self.viewport.x_bounds[1] - self.viewport.x_bounds[0];
        let radius = span / 150.0;
        let canvas = Canvas::default()
            .block(Block::default().title(title).borders(Borders::ALL))
            .marker(symbols::Marker::Braille)
            .x_bounds(self.viewport.x_bounds)
            .y_bounds(self.viewport.y_bounds)
            .paint(|ctx| {
                // 1) Podkład: linia brzegowa
                ctx.draw(&Map { resolution: MapResolution::High, color: Color::DarkGray });
                ctx.layer();

                // 2) Obiekty w kolorach typów
                for m in &self.layer {
                    draw_geometry(ctx, &m.geometry, m.color, radius);
                }

                if let Some(sel) = selected.and_then(|i| self.layer.get(i)) {
                    ctx.layer();
                    draw_geometry(ctx, &sel.geometry, Color::White, radius * 2.0);
                    if let Some(at) = sel.anchor().filter(|c| self.viewport.contains(*c)) {
                        ctx.print(
                            at.x + radius * 3.0,
                            at.y,
                            Span::styled(
                                sel.popup.title.clone(),
                                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                            ),
                        );
                    }
                }
            });
        f.render_widget(canvas, area);
    }
}

fn layer_bounds(layer: &[Marker]) -> Option<Rect<f64>> {
    layer
        .iter()
        .filter_map(|m| m.geometry.bounding_rect())
        .reduce(|a, b| {
            Rect::new(
                coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            )
        })
}

fn draw_geometry(ctx: &mut Context<'_>, geom: &Geometry<f64>, color: Color, radius: f64) {
    match geom {
        Geometry::Point(p) => {
            ctx.draw(&Circle { x: p.x(), y: p.y(), radius, color });
            ctx.draw(&Points { coords: &[(p.x(), p.y())], color });
        }
        Geometry::MultiPoint(mp) => {
            for p in &mp.0 {
                draw_geometry(ctx, &Geometry::Point(*p), color, radius);
            }
        }
        Geometry::Line(l) => draw_path(ctx, &[l.start, l.end], color, false),
        Geometry::LineString(ls) => draw_path(ctx, &ls.0, color, false),
        Geometry::MultiLineString(mls) => {
            for ls in &mls.0 {
                draw_path(ctx, &ls.0, color, false);
            }
        }
        Geometry::Polygon(poly) => {
            draw_path(ctx, &poly.exterior().0, color, true);
            for ring in poly.interiors() {
                draw_path(ctx, &ring.0, color, true);
            }
        }
        Geometry::MultiPolygon(mp) => {
            for poly in &mp.0 {
                draw_geometry(ctx, &Geometry::Polygon(poly.clone()), color, radius);
            }
        }
        Geometry::Rect(r) => draw_geometry(ctx, &Geometry::Polygon(r.to_polygon()), color, radius),
        Geometry::Triangle(t) => draw_geometry(ctx, &Geometry::Polygon(t.to_polygon()), color, radius),
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                draw_geometry(ctx, g, color, radius);
            }
        }
    }
}

fn draw_path(ctx: &mut Context<'_>, coords: &[Coord<f64>], color: Color, closed: bool) {
    for window in coords.windows(2) {
        let (a, b) = (window[0], window[1]);
        ctx.draw(&Line { x1: a.x, y1: a.y, x2: b.x, y2: b.y, color });
    }
    if closed {
        if let (Some(first), Some(last)) = (coords.first(), coords.last()) {
            ctx.draw(&Line { x1: last.x, y1: last.y, x2: first.x, y2: first.y, color });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::sample_store;
    use geo::Point;
    use pretty_assertions::assert_eq;
    use ratatui::{backend::TestBackend, Terminal};

    fn point_feature(category: &str, x: f64, y: f64) -> Feature {
        Feature {
            geometry: Geometry::Point(Point::new(x, y)),
            name: format!("{category}@{x}"),
            region: "静岡県".into(),
            category: category.into(),
            vegetation: None,
            description: String::new(),
        }
    }

    #[test]
    fn category_filter_counts_matching_features() {
        let store = FeatureStore::load(vec![
            point_feature("火山地形", 138.7, 35.3),
            point_feature("扇状地", 138.4, 34.8),
            point_feature("火山地形", 138.5, 36.4),
        ]);
        let mut view = MapView::new();
        let filter = FilterState { category: "火山地形".into(), ..Default::default() };
        let result = view.render(&store, &filter);
        assert_eq!(result.count, 2);
        assert_eq!(hits_label(result.count), "表示: 2 件");
        let order: Vec<usize> = view.markers().iter().map(|m| m.feature).collect();
        assert_eq!(order, [0, 2]);
    }

    #[test]
    fn unset_filter_shows_whole_store() {
        let store = sample_store();
        let mut view = MapView::new();
        assert_eq!(view.render(&store, &FilterState::default()).count, store.len());
    }

    #[test]
    fn count_equals_number_of_matching_features() {
        let store = sample_store();
        let mut view = MapView::new();
        let filters = [
            FilterState { region: "静岡県".into(), ..Default::default() },
            FilterState { vegetation: "草地".into(), ..Default::default() },
            FilterState { query: "カルスト".into(), ..Default::default() },
            FilterState { category: "砂丘".into(), ..Default::default() },
        ];
        for filter in &filters {
            let expected = store.features().iter().filter(|f| filter.matches(f)).count();
            assert_eq!(view.render(&store, filter).count, expected);
            assert_eq!(view.markers().len(), expected);
        }
    }

    #[test]
    fn viewport_fits_visible_features() {
        let store = sample_store();
        let mut view = MapView::new();
        view.render(&store, &FilterState::default());
        let vp = view.viewport();
        for f in store.features() {
            let r = f.geometry.bounding_rect().unwrap();
            assert!(vp.contains(r.min()) && vp.contains(r.max()));
        }
    }

    #[test]
    fn single_point_gets_minimum_span() {
        let store = FeatureStore::load(vec![point_feature("砂丘", 134.2, 35.5)]);
        let mut view = MapView::new();
        view.render(&store, &FilterState::default());
        let vp = view.viewport();
        assert!(vp.x_bounds[1] - vp.x_bounds[0] >= MIN_SPAN);
        assert!(vp.y_bounds[1] - vp.y_bounds[0] >= MIN_SPAN);
        assert!(vp.contains(coord! { x: 134.2, y: 35.5 }));
    }

    #[test]
    fn empty_result_keeps_previous_viewport() {
        let store = sample_store();
        let mut view = MapView::new();
        view.render(&store, &FilterState { region: "長野県".into(), ..Default::default() });
        let before = view.viewport();
        let result = view.render(&store, &FilterState { query: "存在しない".into(), ..Default::default() });
        assert_eq!(result.count, 0);
        assert!(view.markers().is_empty());
        assert_eq!(view.viewport(), before);
    }

    #[test]
    fn popup_carries_name_region_category_and_description() {
        let store = sample_store();
        let mut view = MapView::new();
        view.render(&store, &FilterState { category: "カルスト".into(), ..Default::default() });
        let marker = &view.markers()[0];
        assert_eq!(
            marker.popup,
            Popup {
                title: "秋吉台".into(),
                subtitle: "山口県 / カルスト".into(),
                body: "日本最大級のカルスト台地".into(),
            }
        );
        assert_eq!(marker.color, palette::color_for("カルスト"));
        assert!(marker.anchor().is_some());
    }

    #[test]
    fn draw_does_not_panic_on_mixed_geometries() {
        let store = sample_store();
        let mut view = MapView::new();
        view.render(&store, &FilterState::default());
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        for selected in [Some(3), Some(99), None] {
            terminal
                .draw(|f| {
                    let area = f.area();
                    view.draw(f, area, "map", selected);
                })
                .unwrap();
        }
    }

    #[test]
    fn coastline_is_drawn_under_an_empty_layer() {
        let view = MapView::new();
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                view.draw(f, area, "map", None);
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        let coast = (1..19u16)
            .flat_map(|y| (1..59u16).map(move |x| (x, y)))
            .filter(|&pos| buffer[pos].fg == Color::DarkGray && buffer[pos].symbol() != " ")
            .count();
        assert!(coast > 0);
    }
}
