use std::collections::HashMap;
use std::sync::Arc;

use kurbo::{Affine, BezPath, Point, Rect, RoundedRect, Shape, Vec2};
use parking_lot::Mutex;

use crate::data::coor::EastNorth;
use crate::data::dataset::WaySegment;
use crate::data::multipolygon::{Multipolygon, PolyData};
use crate::data::primitive::{Node, Primitive, PrimitiveId, PrimitiveState, Relation, Way};
use crate::foundation::core::{Rgba8, ScreenRect};
use crate::foundation::error::MapPaintResult;
use crate::foundation::math::scale_alpha;
use crate::geometry::arrow::{ONEWAY_INTERVAL, oneway_arrows, orientation_arrows};
use crate::geometry::partial_fill::{
    area_and_perimeter, clip_for_polygon, clip_for_way, use_partial_fill,
};
use crate::geometry::restriction::restriction_transform;
use crate::render::canvas::{Canvas, Ink, StrokeStyle};
use crate::render::config::{FrameSettings, RenderColors, RenderConfig};
use crate::render::record::StyleRecord;
use crate::render::text::{FontAsset, ShapedGlyph, ShapedText, TextShaper};
use crate::style::StyleElement;
use crate::style::area::{AreaIconStyle, AreaStyle};
use crate::style::image::MapImage;
use crate::style::line::{LineCap, LineJoin, LineStyle};
use crate::style::node::{NodeGlyph, NodeStyle, Symbol, highlight_size};
use crate::style::placement::display_text_transform;
use crate::style::repeat::RepeatImageStyle;
use crate::style::text::{BoxTextStyle, TextLabel, TextStyle};
use crate::view::path::MapViewPath;
use crate::view::viewport::Viewport;

/// Opacity of area fills in inactive mode.
const INACTIVE_AREA_OPACITY: f32 = 0.33;
/// Alpha of the highlight colour.
const HIGHLIGHT_ALPHA: u8 = 100;
/// Share of the hint colour alpha used around area icons.
const AREA_HINT_ALPHA: f32 = 0.2;
/// Repeated images are skipped on segments longer than this many repetitions.
const MAX_REPEATS_PER_SEGMENT: f64 = 500.0;

/// Read-only state shared by every resolver and paint task of one frame.
pub(crate) struct FrameScope {
    pub(crate) settings: FrameSettings,
    pub(crate) viewport: Viewport,
    highlighted: HashMap<PrimitiveId, Vec<usize>>,
    virtual_ways: Vec<Arc<Way>>,
    font: Option<Arc<FontAsset>>,
    multipolygons: Mutex<HashMap<PrimitiveId, Arc<Multipolygon>>>,
}

impl FrameScope {
    pub(crate) fn new(
        config: &RenderConfig,
        viewport: Viewport,
        highlighted: &[WaySegment],
        virtual_ways: Vec<Arc<Way>>,
        font: Option<Arc<FontAsset>>,
    ) -> Self {
        let mut by_way: HashMap<PrimitiveId, Vec<usize>> = HashMap::new();
        for seg in highlighted {
            by_way.entry(seg.way).or_default().push(seg.lower_index);
        }
        Self {
            settings: FrameSettings::new(config, viewport.circum()),
            viewport,
            highlighted: by_way,
            virtual_ways,
            font,
            multipolygons: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn font(&self) -> Option<&FontAsset> {
        self.font.as_deref()
    }

    /// Multipolygon of `relation`, assembled once per frame.
    pub(crate) fn multipolygon(&self, relation: &Relation) -> Arc<Multipolygon> {
        if let Some(mp) = self.multipolygons.lock().get(&relation.id()) {
            return Arc::clone(mp);
        }
        let built = Arc::new(Multipolygon::build(relation));
        Arc::clone(
            self.multipolygons
                .lock()
                .entry(relation.id())
                .or_insert(built),
        )
    }

    /// Screen path of a way; closed ways give a closed path.
    pub(crate) fn way_path(&self, way: &Way) -> MapViewPath {
        MapViewPath::from_nodes(&self.viewport, way.nodes())
    }

    /// Outline paths labels and icons are placed in: the way itself, or every polygon of a
    /// multipolygon.
    pub(crate) fn polygons(&self, primitive: &Primitive) -> Vec<MapViewPath> {
        match primitive {
            Primitive::Node(_) => Vec::new(),
            Primitive::Way(way) => vec![self.way_path(way)],
            Primitive::Relation(relation) => {
                let affine = self.viewport.affine();
                self.multipolygon(relation)
                    .polygons()
                    .iter()
                    .map(|pd| {
                        let mut path = pd.east_north_path();
                        path.apply_affine(affine);
                        MapViewPath::from_bez(path)
                    })
                    .collect()
            }
        }
    }

    fn highlighted_segments(&self, way: PrimitiveId) -> Option<&[usize]> {
        self.highlighted.get(&way).map(Vec::as_slice)
    }
}

enum Hint {
    Node,
    Area,
}

/// Draws style records onto one private canvas.
///
/// The canvas covers one screen rectangle. Painting the records that touch a tile on the tile's
/// canvas gives the same pixels as painting every record on the full one.
pub(crate) struct MapPainter<'a> {
    scope: &'a FrameScope,
    canvas: Canvas,
    shaper: TextShaper,
    painted: usize,
    painted_bounds: Vec<ScreenRect>,
}

impl<'a> MapPainter<'a> {
    /// Painter for the screen rectangle `area`, filled with the background colour.
    pub(crate) fn new(scope: &'a FrameScope, area: ScreenRect) -> MapPaintResult<Self> {
        let config = &scope.settings.config;
        Ok(Self {
            scope,
            canvas: Canvas::new(area, config.colors.background, config.antialiasing)?,
            shaper: TextShaper::new(scope.font()),
            painted: 0,
            painted_bounds: Vec::new(),
        })
    }

    fn config(&self) -> &RenderConfig {
        &self.scope.settings.config
    }

    fn colors(&self) -> &RenderColors {
        self.scope.settings.colors()
    }

    fn inactive_mode(&self) -> bool {
        self.scope.settings.config.inactive_mode
    }

    /// Paint one record.
    pub(crate) fn paint_record(&mut self, record: &StyleRecord) {
        record.paint(self);
        self.painted += 1;
        if self.config().debug_bounds
            && let Some(b) = record.bounds()
        {
            self.painted_bounds.push(b);
        }
    }

    /// Draw the overlays that go above all records, rasterize and return
    /// `(premultiplied pixels, row width, records painted)`.
    pub(crate) fn finish(mut self) -> (Vec<u8>, usize, usize) {
        if self.config().render_virtual_nodes {
            self.draw_virtual_nodes();
        }
        if self.config().debug_bounds {
            self.draw_debug_bounds();
        }
        let painted = self.painted;
        let (pixels, stride) = self.canvas.finish();
        (pixels, stride, painted)
    }

    fn selection_hint_color(&self, disabled: bool, selected: bool) -> Rgba8 {
        let colors = self.colors();
        if disabled {
            colors.inactive
        } else if selected {
            colors.selected
        } else {
            colors.relation_selected
        }
    }

    // Areas

    pub(crate) fn paint_area(
        &mut self,
        primitive: &Primitive,
        style: &AreaStyle,
        selected: bool,
        outer_member: bool,
    ) {
        let extent = style.extent.or(self.config().partial_fill_extent);
        let threshold = style
            .extent_threshold
            .or(self.config().partial_fill_threshold);
        let scale = self.scope.viewport.scale();
        let disabled = self.inactive_mode() || primitive.is_disabled();
        match primitive {
            Primitive::Node(_) => {}
            Primitive::Way(way) => {
                let color = if selected {
                    self.colors().selected_with_alpha(style.color.a)
                } else if outer_member {
                    self.colors().relation_selected_with_alpha(style.color.a)
                } else {
                    style.color
                };
                let points = way.nodes().iter().map(|n| n.east_north()).collect::<Vec<_>>();
                let (extent, pf_clip) = match extent {
                    Some(e) => {
                        let (area, perimeter) = area_and_perimeter(&points);
                        if !use_partial_fill(area, perimeter, e, threshold, scale) {
                            (None, None)
                        } else if way.is_closed() {
                            (Some(e), None)
                        } else {
                            let mut clip = clip_for_way(way.nodes(), f64::from(e) * scale);
                            clip.apply_affine(self.scope.viewport.affine());
                            (Some(e), Some((clip, false)))
                        }
                    }
                    None => (None, None),
                };
                let path = self.scope.way_path(way);
                self.draw_area(
                    path.as_bez(),
                    false,
                    color,
                    style.fill_image.as_ref(),
                    extent,
                    pf_clip,
                    disabled,
                );
            }
            Primitive::Relation(relation) => {
                if relation.state().contains(PrimitiveState::DISABLED) {
                    return;
                }
                let color = if selected || outer_member {
                    self.colors().relation_selected_with_alpha(style.color.a)
                } else {
                    style.color
                };
                let mp = self.scope.multipolygon(relation);
                let clip_rect = self
                    .scope
                    .viewport
                    .clip_rect(f64::from(extent.unwrap_or(0.0)));
                for pd in mp.polygons() {
                    if !self.is_area_visible(pd) {
                        continue;
                    }
                    let path = MapViewPath::from_east_north(
                        &self.scope.viewport,
                        &pd.east_north_path(),
                        clip_rect,
                    );
                    let (extent, pf_clip) = match extent {
                        Some(e) => {
                            let (area, perimeter) = pd.area_and_perimeter();
                            if !use_partial_fill(area, perimeter, e, threshold, scale) {
                                (None, None)
                            } else if pd.closed {
                                (Some(e), None)
                            } else {
                                let mut clip = clip_for_polygon(pd, f64::from(e) * scale);
                                clip.apply_affine(self.scope.viewport.affine());
                                (Some(e), Some((clip, true)))
                            }
                        }
                        None => (None, None),
                    };
                    let color = if pd.selected {
                        self.colors().relation_selected_with_alpha(color.a)
                    } else {
                        color
                    };
                    self.draw_area(
                        path.as_bez(),
                        true,
                        color,
                        style.fill_image.as_ref(),
                        extent,
                        pf_clip,
                        disabled,
                    );
                }
            }
        }
    }

    /// `false` when the polygon's box lies completely outside the view.
    fn is_area_visible(&self, pd: &PolyData) -> bool {
        let bbox = pd.bbox();
        if !bbox.is_valid() {
            return false;
        }
        let tl = bbox.top_left().to_east_north();
        let br = bbox.bottom_right().to_east_north();
        let min = self
            .scope
            .viewport
            .point_for(EastNorth::new(tl.east, br.north));
        let width = f64::from(self.scope.viewport.width());
        let height = f64::from(self.scope.viewport.height());
        if min.y < 0.0 || min.x > width {
            return false;
        }
        let max = self
            .scope
            .viewport
            .point_for(EastNorth::new(br.east, tl.north));
        max.x >= 0.0 && max.y <= height
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_area(
        &mut self,
        path: &BezPath,
        even_odd: bool,
        color: Rgba8,
        fill_image: Option<&MapImage>,
        extent: Option<f32>,
        pf_clip: Option<(BezPath, bool)>,
        disabled: bool,
    ) {
        if self.config().outline_only {
            return;
        }
        match fill_image {
            None => {
                if color.a == 0 {
                    return;
                }
                let inactive = self.inactive_mode();
                if inactive {
                    self.canvas.push_opacity(INACTIVE_AREA_OPACITY);
                }
                self.compute_fill(path, even_odd, Ink::Color(color), extent, pf_clip, 4.0);
                if inactive {
                    self.canvas.pop_layer();
                }
            }
            Some(image) => {
                let alpha = image.alpha();
                let layered = alpha < 1.0;
                if layered {
                    self.canvas.push_opacity(alpha);
                }
                let paint = image.paint(disabled);
                self.compute_fill(path, even_odd, Ink::Pattern(paint), extent, pf_clip, 10.0);
                if layered {
                    self.canvas.pop_layer();
                }
            }
        }
    }

    fn compute_fill(
        &mut self,
        path: &BezPath,
        even_odd: bool,
        ink: Ink<'_>,
        extent: Option<f32>,
        pf_clip: Option<(BezPath, bool)>,
        miter_limit: f64,
    ) {
        match extent {
            None => self.canvas.fill(path, ink, even_odd, true),
            Some(e) => {
                match &pf_clip {
                    Some((clip, clip_even_odd)) => {
                        self.canvas.push_clip(clip, *clip_even_odd, true)
                    }
                    None => self.canvas.push_clip(path, even_odd, true),
                }
                let stroke = StrokeStyle::new(
                    2.0 * f64::from(e),
                    LineCap::Butt,
                    LineJoin::Miter,
                    miter_limit,
                );
                self.canvas.stroke(path, ink, &stroke, true);
                self.canvas.pop_layer();
            }
        }
    }

    pub(crate) fn paint_area_icon(
        &mut self,
        primitive: &Primitive,
        style: &AreaIconStyle,
        selected: bool,
        member: bool,
    ) {
        if !self.scope.settings.show_icons {
            return;
        }
        let disabled = self.inactive_mode() || primitive.is_disabled();
        for at in style.placements(primitive, self.scope) {
            self.draw_icon(
                &style.image,
                at,
                disabled,
                selected,
                member,
                Some(Hint::Area),
            );
        }
    }

    // Icons, symbols and nodes

    fn draw_icon(
        &mut self,
        image: &MapImage,
        at: Affine,
        disabled: bool,
        selected: bool,
        member: bool,
        hint: Option<Hint>,
    ) {
        let alpha = image.alpha();
        let layered = alpha < 1.0;
        if layered {
            self.canvas.push_opacity(alpha);
        }
        let (x, y) = image.draw_origin();
        let (x, y) = (f64::from(x), f64::from(y));
        let w = f64::from(image.width());
        let h = f64::from(image.height());
        self.canvas.draw_image(
            image.paint(disabled),
            at * Affine::translate(Vec2::new(x, y)),
            Rect::new(0.0, 0.0, w, h),
        );
        if (selected || member)
            && let Some(hint) = hint
        {
            let rect = Rect::new(x - 2.0, y - 2.0, x + w + 2.0, y + h + 2.0);
            let color = self.selection_hint_color(disabled, selected);
            match hint {
                Hint::Node => self.canvas.stroke_rect(rect, at, color, 1.0),
                Hint::Area => {
                    let width = if self.scope.settings.use_strokes {
                        2.0
                    } else {
                        1.0
                    };
                    let color = color.with_alpha(scale_alpha(color.a, AREA_HINT_ALPHA));
                    self.canvas.stroke_rect(rect, at, color, width);
                }
            }
        }
        if layered {
            self.canvas.pop_layer();
        }
    }

    pub(crate) fn paint_node(
        &mut self,
        primitive: &Primitive,
        style: &NodeStyle,
        default_selected_handling: bool,
        selected: bool,
        member: bool,
    ) {
        match primitive {
            Primitive::Node(node) => match &style.glyph {
                NodeGlyph::Image(image) if self.scope.settings.show_icons => {
                    self.draw_node_icon(node, image, style.icon_transform, selected, member);
                }
                NodeGlyph::Symbol(symbol) => {
                    self.draw_node_symbol(
                        node,
                        symbol,
                        default_selected_handling,
                        selected,
                        member,
                    );
                }
                NodeGlyph::Image(_) | NodeGlyph::Simple => {
                    self.draw_simple_node(node, selected, member);
                }
            },
            Primitive::Relation(relation) => {
                if let NodeGlyph::Image(image) = &style.glyph
                    && self.scope.settings.show_icons
                {
                    self.draw_restriction(relation, image);
                }
            }
            Primitive::Way(_) => {}
        }
    }

    fn draw_node_icon(
        &mut self,
        node: &Node,
        image: &MapImage,
        icon_transform: Option<Affine>,
        selected: bool,
        member: bool,
    ) {
        let p = self.scope.viewport.point_for_node(node);
        if node.state().contains(PrimitiveState::HIGHLIGHTED) {
            let size = image.width().max(image.height());
            self.draw_point_highlight(p, f64::from(size));
        }
        let disabled = self.inactive_mode() || node.state().contains(PrimitiveState::DISABLED);
        let at = Affine::translate(p.to_vec2()) * icon_transform.unwrap_or(Affine::IDENTITY);
        self.draw_icon(image, at, disabled, selected, member, Some(Hint::Node));
    }

    fn draw_node_symbol(
        &mut self,
        node: &Node,
        symbol: &Symbol,
        default_selected_handling: bool,
        selected: bool,
        member: bool,
    ) {
        let disabled = self.inactive_mode() || node.state().contains(PrimitiveState::DISABLED);
        let recolor = |c: Rgba8| -> Rgba8 {
            let colors = self.colors();
            if disabled {
                colors.inactive
            } else if default_selected_handling && selected {
                colors.selected_with_alpha(c.a)
            } else if member {
                colors.relation_selected_with_alpha(c.a)
            } else {
                c
            }
        };
        let fill = symbol.fill_color.map(recolor);
        let stroke = symbol.stroke.map(|s| (s.width, recolor(s.color)));

        let p = self.scope.viewport.point_for_node(node);
        if node.state().contains(PrimitiveState::HIGHLIGHTED) {
            self.draw_point_highlight(p, f64::from(symbol.size));
        }
        if fill.is_none() && stroke.is_none() {
            return;
        }
        let shape = symbol.shape.shape_around(p.x, p.y, f64::from(symbol.size));
        if let Some(color) = fill {
            self.canvas.fill(&shape, Ink::Color(color), false, false);
        }
        if let Some((width, color)) = stroke {
            let stroke = StrokeStyle::new(f64::from(width), LineCap::Square, LineJoin::Miter, 10.0);
            self.canvas
                .stroke(&shape, Ink::Color(color), &stroke, false);
        }
    }

    fn draw_simple_node(&mut self, node: &Node, selected: bool, member: bool) {
        let config = self.config();
        let colors = &config.colors;
        let tagged = node.is_tagged();
        let connection = node.is_connection_node();
        let color = if self.inactive_mode() || node.state().contains(PrimitiveState::DISABLED) {
            colors.inactive
        } else if selected {
            colors.selected
        } else if member {
            colors.relation_selected
        } else if connection {
            if tagged {
                colors.tagged_connection
            } else {
                colors.connection
            }
        } else if tagged {
            colors.tagged
        } else {
            colors.node
        };
        let size = [
            if selected {
                config.selected_node_size
            } else {
                0
            },
            if tagged { config.tagged_node_size } else { 0 },
            if connection {
                config.connection_node_size
            } else {
                0
            },
            config.unselected_node_size,
        ]
        .into_iter()
        .max()
        .unwrap_or(0);
        let fill = (selected && config.fill_selected_node)
            || (tagged && config.fill_tagged_node)
            || (connection && config.fill_connection_node)
            || config.fill_unselected_node;
        self.draw_node(node, color, size, fill);
    }

    fn draw_node(&mut self, node: &Node, color: Rgba8, size: u32, fill: bool) {
        let highlighted = node.state().contains(PrimitiveState::HIGHLIGHTED);
        if size == 0 && !highlighted {
            return;
        }
        let p = self.scope.viewport.point_for_node(node);
        if highlighted {
            self.draw_point_highlight(p, f64::from(size));
        }
        if size > 1 && self.scope.viewport.is_in_view(p) {
            let radius = f64::from(size / 2);
            let s = f64::from(size);
            let rect = Rect::new(
                p.x - radius - 1.0,
                p.y - radius - 1.0,
                p.x - radius + s,
                p.y - radius + s,
            );
            if fill {
                self.canvas.fill_rect(rect, color);
            } else {
                self.canvas.stroke_rect(rect, Affine::IDENTITY, color, 1.0);
            }
        }
    }

    fn draw_restriction(&mut self, relation: &Relation, image: &MapImage) {
        let Some(at) = restriction_transform(
            relation,
            &self.scope.viewport,
            self.config().left_hand_traffic,
        ) else {
            return;
        };
        let disabled = self.inactive_mode() || relation.state().contains(PrimitiveState::DISABLED);
        self.draw_icon(image, at, disabled, false, false, None);
    }

    fn highlight_color(&self) -> Rgba8 {
        self.colors().highlight.with_alpha(HIGHLIGHT_ALPHA)
    }

    /// Concentric rounded squares around a point marker of `size` pixels.
    fn draw_point_highlight(&mut self, p: Point, size: f64) {
        let color = self.highlight_color();
        let step = f64::from(self.config().highlight_step).max(1.0);
        let mut s = highlight_size(size, self.scope);
        while s >= size {
            let r = (s / 2.0).floor();
            let shape = RoundedRect::new(p.x - r, p.y - r, p.x - r + s, p.y - r + s, r / 2.0);
            self.canvas
                .fill(&shape.to_path(0.1), Ink::Color(color), false, false);
            s -= step;
        }
    }

    /// Widening strokes under a line.
    fn draw_path_highlight(&mut self, path: &BezPath, line: &StrokeStyle) {
        if path.elements().is_empty() {
            return;
        }
        let config = self.config();
        let mut w = line.width + f64::from(config.highlight_width);
        if config.use_wider_highlight {
            w += f64::from(config.wider_highlight);
        }
        let step = f64::from(config.highlight_step).max(1.0);
        let color = self.highlight_color();
        while w >= line.width {
            let stroke = StrokeStyle::new(w, line.cap, line.join, line.miter_limit);
            self.canvas.stroke(path, Ink::Color(color), &stroke, false);
            w -= step;
        }
    }

    // Lines

    pub(crate) fn paint_line(
        &mut self,
        way: &Arc<Way>,
        style: &LineStyle,
        element: &StyleElement,
        selected: bool,
        member: bool,
    ) {
        if way.node_count() < 2 {
            return;
        }
        let colors = self.colors();
        let mut color = style.color;
        let mut dashed_color = style.dashes_background;
        if element.default_selected_handling && selected {
            color = colors.selected_with_alpha(style.color.a);
        } else if member {
            color = colors.relation_selected_with_alpha(style.color.a);
        } else if way.state().contains(PrimitiveState::DISABLED) {
            color = colors.inactive;
            dashed_color = dashed_color.map(|_| colors.inactive);
        }
        let show_orientation = style.show_orientation && !element.is_modifier;
        let show_oneway = style.show_oneway && !element.is_modifier && !selected;
        let head_only = show_orientation && !selected && style.show_head_arrow_only;
        self.draw_way(
            way,
            style,
            color,
            dashed_color,
            show_orientation,
            head_only,
            show_oneway,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_way(
        &mut self,
        way: &Way,
        style: &LineStyle,
        color: Rgba8,
        dashed_color: Option<Rgba8>,
        show_orientation: bool,
        head_only: bool,
        show_oneway: bool,
    ) {
        let use_strokes = self.scope.settings.use_strokes;
        let line = if use_strokes {
            let stroke = StrokeStyle::new(
                style.stroke_width(true),
                style.cap,
                style.join,
                f64::from(style.miter_limit),
            );
            match style.dash_pattern() {
                Some(pattern) => stroke.with_dashes(pattern, 0.0),
                None => stroke,
            }
        } else {
            StrokeStyle::hairline()
        };
        let dash_line = if use_strokes {
            style.background_dash_pattern().map(|(pattern, offset)| {
                StrokeStyle::new(line.width, line.cap, line.join, line.miter_limit)
                    .with_dashes(pattern, offset)
            })
        } else {
            None
        };

        let way_highlighted = way.state().contains(PrimitiveState::HIGHLIGHTED);
        if !way_highlighted
            && let Some(indices) = self.scope.highlighted_segments(way.id())
        {
            let nodes = way.nodes();
            let mut segs = BezPath::new();
            for &i in indices {
                if let (Some(a), Some(b)) = (nodes.get(i), nodes.get(i + 1)) {
                    segs.move_to(self.scope.viewport.point_for_node(a));
                    segs.line_to(self.scope.viewport.point_for_node(b));
                }
            }
            self.draw_path_highlight(&segs, &line);
        }

        let points = style.screen_points(way, &self.scope.viewport);
        let path = MapViewPath::from_points(&points);
        let arrows = show_orientation.then(|| {
            orientation_arrows(
                &points,
                line.width,
                way.state().contains(PrimitiveState::SELECTED),
                head_only,
            )
        });
        let oneway = show_oneway.then(|| {
            oneway_arrows(
                &path,
                self.scope.viewport.clip_rect(ONEWAY_INTERVAL),
                style.oneway_reversed,
            )
        });

        if way_highlighted {
            self.draw_path_highlight(path.as_bez(), &line);
        }
        self.display_segments(&path, arrows, oneway, color, &line, dash_line, dashed_color);
    }

    /// Clipped line for solid strokes; dashed strokes keep the whole path so the dash phase
    /// does not depend on the view.
    fn clipped_line(&self, path: &MapViewPath, stroke: &StrokeStyle) -> BezPath {
        if stroke.dashes.is_some() {
            return path.as_bez().clone();
        }
        let clip = self.scope.viewport.clip_rect(stroke.width);
        path.clipped(clip).as_bez().clone()
    }

    #[allow(clippy::too_many_arguments)]
    fn display_segments(
        &mut self,
        path: &MapViewPath,
        arrows: Option<BezPath>,
        oneway: Option<(BezPath, BezPath)>,
        color: Rgba8,
        line: &StrokeStyle,
        dash_line: Option<StrokeStyle>,
        dashed_color: Option<Rgba8>,
    ) {
        let inactive = self.inactive_mode();
        let line_color = if inactive {
            self.colors().inactive
        } else {
            color
        };
        let clipped = self.clipped_line(path, line);
        self.canvas
            .stroke(&clipped, Ink::Color(line_color), line, false);

        if !inactive
            && self.scope.settings.use_strokes
            && let (Some(dash_line), Some(dashed_color)) = (dash_line, dashed_color)
        {
            let clipped = self.clipped_line(path, &dash_line);
            self.canvas
                .stroke(&clipped, Ink::Color(dashed_color), &dash_line, false);
        }

        if let Some(arrows) = arrows {
            let stroke = StrokeStyle::new(line.width, line.cap, LineJoin::Miter, line.miter_limit);
            self.canvas
                .stroke(&arrows, Ink::Color(line_color), &stroke, false);
        }

        if let Some((casing, inner)) = oneway {
            self.canvas
                .fill(&casing, Ink::Color(line_color), false, false);
            let inner_color = if inactive {
                self.colors().inactive
            } else {
                self.colors().background
            };
            self.canvas
                .fill(&inner, Ink::Color(inner_color), false, false);
        }
    }

    pub(crate) fn paint_repeat_image(&mut self, way: &Arc<Way>, style: &RepeatImageStyle) {
        let image = &style.pattern;
        let w = image.width();
        let h = f64::from(image.height());
        if w == 0 || h <= 0.0 {
            return;
        }
        let repeat = style.repeat();
        let dy = f64::from(style.dy());
        let start_offset = style.start_offset();
        let disabled = self.inactive_mode() || way.state().contains(PrimitiveState::DISABLED);
        let layered = style.opacity < 1.0;
        if layered {
            self.canvas.push_opacity(style.opacity);
        }
        let paint = image.paint(disabled);
        let path = style.path(way, self.scope);
        let mut draws = Vec::new();
        path.visit_clipped_line(self.scope.viewport.clip_rect(repeat), |offset, start, end| {
            let segment_length = start.distance(end);
            if segment_length < 0.1 || segment_length > repeat * MAX_REPEATS_PER_SEGMENT {
                return;
            }
            let at = Affine::translate(start.to_vec2())
                * Affine::rotate((end.y - start.y).atan2(end.x - start.x));
            let w = w as i32;
            let mut image_start = -((offset - start_offset + repeat) % repeat);
            while image_start < segment_length {
                let x = image_start as i32;
                let sx1 = (-x).max(0);
                let sx2 = w - (x + w - segment_length.ceil() as i32).max(0);
                if sx2 > sx1 {
                    draws.push((
                        at * Affine::translate(Vec2::new(f64::from(x), dy)),
                        Rect::new(f64::from(sx1), 0.0, f64::from(sx2), h),
                    ));
                }
                image_start += repeat;
            }
        });
        for (at, src) in draws {
            self.canvas.draw_image(paint, at, src);
        }
        if layered {
            self.canvas.pop_layer();
        }
    }

    // Text

    fn display_text(&mut self, shaped: &ShapedText, at: Affine, label: &TextLabel, disabled: bool) {
        let Some(font) = self.scope.font() else {
            return;
        };
        let font = font.paint_font().clone();
        if disabled {
            let inactive = self.colors().inactive;
            self.canvas
                .fill_glyphs(&font, shaped.font_size, at, shaped.cpu_glyphs(), inactive);
            return;
        }
        if let Some(halo) = label.halo() {
            self.canvas.stroke_glyphs(
                &font,
                shaped.font_size,
                at,
                shaped.cpu_glyphs(),
                halo,
                2.0 * f64::from(label.halo_radius),
            );
        }
        self.canvas.fill_glyphs(
            &font,
            shaped.font_size,
            at,
            shaped.cpu_glyphs(),
            label.color,
        );
    }

    /// One glyph drawn with its pen position at the origin of `at`.
    fn display_glyph(
        &mut self,
        shaped: &ShapedText,
        index: usize,
        at: Affine,
        label: &TextLabel,
        disabled: bool,
    ) {
        let Some(glyph) = shaped.glyphs.get(index) else {
            return;
        };
        let single = ShapedText {
            glyphs: vec![ShapedGlyph {
                x: 0.0,
                ..*glyph
            }],
            font_size: shaped.font_size,
            width: f64::from(glyph.advance),
            ascent: shaped.ascent,
            descent: shaped.descent,
        };
        self.display_text(&single, at, label, disabled);
    }

    pub(crate) fn paint_box_text(
        &mut self,
        node: &Arc<Node>,
        primitive: &Primitive,
        style: &BoxTextStyle,
    ) {
        if !self.scope.settings.show_names {
            return;
        }
        let Some(s) = style.text.string_for(primitive) else {
            return;
        };
        let Some(shaped) = self.shaper.shape(&s, style.text.font_size) else {
            return;
        };
        let p = self.scope.viewport.point_for_node(node);
        let at = style.transform(p, shaped.width, shaped.ascent, shaped.descent);
        let disabled = self.inactive_mode() || primitive.is_disabled();
        self.display_text(&shaped, at, &style.text, disabled);
    }

    pub(crate) fn paint_text(&mut self, primitive: &Primitive, style: &TextStyle) {
        if !self.scope.settings.show_names {
            return;
        }
        let Some(s) = style.text.string_for(primitive) else {
            return;
        };
        let Some(shaped) = self.shaper.shape(&s, style.text.font_size) else {
            return;
        };
        let disabled = self.inactive_mode() || primitive.is_disabled();
        let string = BoxTextStyle::string_bounds(shaped.width, shaped.ascent, shaped.descent);
        let advances = shaped.advances();
        for path in self.scope.polygons(primitive) {
            if let Some(placement) =
                style
                    .position
                    .find_label_placement(&path, string, &self.scope.viewport)
            {
                let at = display_text_transform(string, &placement);
                self.display_text(&shaped, at, &style.text, disabled);
            } else if let Some(transforms) = style.position.glyph_transforms(
                &path,
                shaped.width,
                &advances,
                f64::from(shaped.font_size),
                &self.scope.viewport,
            ) {
                for (i, at) in transforms.into_iter().enumerate() {
                    self.display_glyph(&shaped, i, at, &style.text, disabled);
                }
            }
        }
    }

    // Overlays

    /// Plus markers at the middle of every segment long enough to insert a node into.
    fn draw_virtual_nodes(&mut self) {
        let config = self.config();
        let size = f64::from(config.virtual_node_size / 2);
        if size <= 0.0 {
            return;
        }
        let space = f64::from(config.virtual_node_space);
        let color = config.colors.node;
        let viewport = &self.scope.viewport;
        let view = viewport.view_rect();
        let mut path = BezPath::new();
        for way in &self.scope.virtual_ways {
            let mut last: Option<Point> = None;
            for node in way.nodes() {
                let p = viewport.point_for_node(node);
                if let Some(l) = last
                    && segment_visible(l, p, view)
                    && (p - l).hypot2() > space * space
                {
                    let m = l.midpoint(p);
                    path.move_to(Point::new(m.x - size, m.y));
                    path.line_to(Point::new(m.x + size, m.y));
                    path.move_to(Point::new(m.x, m.y - size));
                    path.line_to(Point::new(m.x, m.y + size));
                }
                last = Some(p);
            }
        }
        self.canvas
            .stroke(&path, Ink::Color(color), &StrokeStyle::hairline(), false);
    }

    /// One pixel frame just inside the bounds of every painted record.
    fn draw_debug_bounds(&mut self) {
        let color = self.colors().highlight;
        for b in std::mem::take(&mut self.painted_bounds) {
            let r = b.to_rect();
            let rect = Rect::new(r.x0 + 0.5, r.y0 + 0.5, r.x1 - 0.5, r.y1 - 0.5);
            if rect.width() <= 0.0 || rect.height() <= 0.0 {
                continue;
            }
            self.canvas.stroke_rect(rect, Affine::IDENTITY, color, 1.0);
        }
    }
}

/// `false` when both points lie beyond the same edge of `view`.
fn segment_visible(a: Point, b: Point, view: Rect) -> bool {
    !((a.x < view.x0 && b.x < view.x0)
        || (a.x > view.x1 && b.x > view.x1)
        || (a.y < view.y0 && b.y < view.y0)
        || (a.y > view.y1 && b.y > view.y1))
}

#[cfg(test)]
#[path = "../../tests/unit/render/painter.rs"]
mod tests;
