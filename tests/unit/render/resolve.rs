use std::sync::Arc;

use super::*;
use crate::data::coor::EastNorth;
use crate::data::dataset::DataSet;
use crate::data::primitive::{PrimitiveId, PrimitiveKind, PrimitiveState, Tags};
use crate::foundation::core::Rgba8;
use crate::foundation::error::MapPaintResult;
use crate::render::config::RenderConfig;
use crate::scene::RuleStyleSource;
use crate::style::StyleElementList;
use crate::style::area::AreaStyle;
use crate::style::defaults::DefaultStyles;
use crate::style::line::LineStyle;
use crate::view::viewport::Viewport;

const SIZE: u32 = 64;

fn viewport() -> Viewport {
    Viewport::new(SIZE, SIZE, EastNorth::new(0.0, 0.0), 1.0).unwrap()
}

fn pool() -> rayon::ThreadPool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(3)
        .build()
        .unwrap()
}

/// Nodes 1..=count in a row, plus way 100 over the first three.
fn dataset(count: u64) -> DataSet {
    let vp = viewport();
    let data = DataSet::new();
    {
        let mut w = data.write();
        for i in 1..=count {
            let ll = vp.lat_lon_for(kurbo::Point::new(4.0 + i as f64 * 6.0, 32.0));
            w.add_node(PrimitiveId(i), ll, Tags::new()).unwrap();
        }
        let ids = [PrimitiveId(1), PrimitiveId(2), PrimitiveId(3)];
        w.add_way(PrimitiveId(100), &ids, Tags::new()).unwrap();
    }
    data
}

fn line() -> Arc<StyleElement> {
    Arc::new(StyleElement::new(StyleKind::Line(LineStyle::new(Rgba8::WHITE, 2.0))))
}

fn area() -> StyleElement {
    StyleElement::new(StyleKind::Area(AreaStyle::new(Rgba8::WHITE)))
}

/// Fails for node 2 and panics for node 3.
struct Flaky;

impl StyleSource for Flaky {
    fn resolve(
        &self,
        primitive: &Primitive,
        _circum: f64,
        _viewport: &Viewport,
    ) -> MapPaintResult<StyleElementList> {
        match primitive.id().0 {
            2 => Err(MapPaintError::resolve(primitive.id(), "no style for you")),
            3 => panic!("style source exploded"),
            _ => match primitive.kind() {
                PrimitiveKind::Way => Ok(vec![line()]),
                _ => Ok(vec![DefaultStyles::simple_node()]),
            },
        }
    }
}

#[test]
fn passes_filter_elements_like_the_map_view() {
    let config = RenderConfig::default();
    let scope = FrameScope::new(&config, viewport(), &[], Vec::new(), None);
    let normal = RecordFlags::NORMAL;
    let disabled = RecordFlags::DISABLED;

    assert!(Pass::Relations.accepts(&area(), normal, &scope));
    assert!(!Pass::Relations.accepts(&area(), disabled, &scope));
    assert!(!Pass::Relations.accepts(&line(), normal, &scope));
    assert!(Pass::Relations.accepts(&DefaultStyles::simple_node(), normal, &scope));

    assert!(Pass::Ways.accepts(&area(), normal, &scope));
    assert!(!Pass::Ways.accepts(&area(), disabled, &scope));
    assert!(Pass::Ways.accepts(&line(), disabled, &scope));

    assert!(Pass::Nodes.accepts(&area(), disabled, &scope));
}

#[test]
fn far_zoom_disables_relation_areas() {
    let config = RenderConfig {
        fill_areas_distance: 0.0,
        ..RenderConfig::default()
    };
    let scope = FrameScope::new(&config, viewport(), &[], Vec::new(), None);
    assert!(!Pass::Relations.accepts(&area(), RecordFlags::NORMAL, &scope));
    assert!(!Pass::Ways.accepts(&area(), RecordFlags::NORMAL, &scope));
}

#[test]
fn sequence_numbers_follow_pass_order() {
    let r = Pass::Relations.seq(7, 1);
    let w = Pass::Ways.seq(0, 0);
    let n = Pass::Nodes.seq(0, 0);
    assert!(r < w && w < n);
    assert!(Pass::Ways.seq(1, 0) > Pass::Ways.seq(0, 65_535));
    assert_ne!(Pass::Nodes.seq(3, 1), Pass::Nodes.seq(3, 2));
}

#[test]
fn serial_mode_returns_sorted_records() {
    let data = dataset(5);
    let vp = viewport();
    let config = RenderConfig::default();
    let scope = FrameScope::new(&config, vp, &[], Vec::new(), None);
    let source = RuleStyleSource::new();
    let guard = data.read();
    let outcome = resolve_frame(&pool(), &guard, &vp.bbox(), &scope, &source, false);

    assert_eq!(outcome.primitives, 6);
    assert_eq!(outcome.failed, 0);
    let ResolvedRecords::Sorted(records) = outcome.records else {
        panic!("expected sorted records");
    };
    assert_eq!(records.len(), 5);
    assert_eq!(outcome.published, 5);
    assert!(records.windows(2).all(|w| w[0] < w[1]));
    assert!(records.iter().all(|r| r.bounds().is_some()));
}

#[test]
fn indexed_mode_publishes_the_same_records() {
    let data = dataset(5);
    let vp = viewport();
    let config = RenderConfig::default();
    let scope = FrameScope::new(&config, vp, &[], Vec::new(), None);
    let source = RuleStyleSource::new();
    let guard = data.read();

    let serial = resolve_frame(&pool(), &guard, &vp.bbox(), &scope, &source, false);
    let indexed = resolve_frame(&pool(), &guard, &vp.bbox(), &scope, &source, true);
    assert_eq!(serial.published, indexed.published);

    let ResolvedRecords::Indexed(tree) = indexed.records else {
        panic!("expected indexed records");
    };
    let mut all = tree.query(vp.screen_rect());
    all.sort_unstable();
    let ResolvedRecords::Sorted(sorted) = serial.records else {
        panic!("expected sorted records");
    };
    let a: Vec<u64> = all.iter().map(|r| r.seq()).collect();
    let b: Vec<u64> = sorted.iter().map(|r| r.seq()).collect();
    assert_eq!(a, b);
}

#[test]
fn failing_primitives_are_isolated() {
    let data = dataset(5);
    let vp = viewport();
    let config = RenderConfig::default();
    let scope = FrameScope::new(&config, vp, &[], Vec::new(), None);
    let guard = data.read();
    let outcome = resolve_frame(&pool(), &guard, &vp.bbox(), &scope, &Flaky, false);

    assert_eq!(outcome.failed, 2);
    let ResolvedRecords::Sorted(records) = outcome.records else {
        panic!("expected sorted records");
    };
    let mut ids: Vec<u64> = records.iter().map(|r| r.primitive().id().0).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 4, 5, 100]);
}

#[test]
fn hidden_and_deleted_primitives_are_not_resolved() {
    let data = dataset(3);
    {
        let mut w = data.write();
        w.set_state(PrimitiveKind::Node, PrimitiveId(1), PrimitiveState::DELETED)
            .unwrap();
        w.set_state(PrimitiveKind::Node, PrimitiveId(2), PrimitiveState::HIDDEN)
            .unwrap();
    }
    let vp = viewport();
    let config = RenderConfig::default();
    let scope = FrameScope::new(&config, vp, &[], Vec::new(), None);
    let source = RuleStyleSource::new();
    let guard = data.read();
    let outcome = resolve_frame(&pool(), &guard, &vp.bbox(), &scope, &source, false);
    assert_eq!(outcome.primitives, 2);
    assert_eq!(outcome.published, 1);
}

#[test]
fn records_outside_the_screen_are_dropped() {
    let vp = viewport();
    let data = DataSet::new();
    {
        let mut w = data.write();
        let inside = vp.lat_lon_for(kurbo::Point::new(10.0, 10.0));
        let outside = vp.lat_lon_for(kurbo::Point::new(-400.0, 10.0));
        w.add_node(PrimitiveId(1), inside, Tags::new()).unwrap();
        w.add_node(PrimitiveId(2), outside, Tags::new()).unwrap();
    }
    let config = RenderConfig::default();
    let scope = FrameScope::new(&config, vp, &[], Vec::new(), None);
    let source = RuleStyleSource::new();
    let guard = data.read();
    let outcome = resolve_frame(&pool(), &guard, &vp.bbox(), &scope, &source, false);
    assert_eq!(outcome.published, 1);
}
