use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use line_chart::api::{
    ContainerMeasure, FixedDisplay, HeadlessContainer, Line, LineCanvas, LineCanvasConfig,
    LineCanvasProps, LineCanvasRenderer, LineSvgConfig, LineSvgProps, LineSvgRenderer,
    PartialLineCanvasConfig, PartialLineCommonProps, PartialLineSvgConfig, ResponsiveLine,
    ResponsiveLineCanvas,
};
use line_chart::core::{Datum, Dimensions, Margin, Serie};
use line_chart::error::{ChartError, ChartResult};
use line_chart::render::{CanvasRef, NullRenderer, RecordingCanvas};

fn data() -> Vec<Serie> {
    vec![Serie::new(
        "s1",
        vec![Datum::new(0, 0), Datum::new(1, 5), Datum::new(2, 3)],
    )]
}

fn margin_config() -> LineSvgConfig {
    PartialLineSvgConfig {
        common: PartialLineCommonProps {
            margin: Some(Margin::new(10.0, 20.0, 30.0, 40.0)),
            ..PartialLineCommonProps::default()
        },
        ..PartialLineSvgConfig::default()
    }
    .resolve()
}

/// Records every pass it is asked to render.
#[derive(Default)]
struct PassLog {
    passes: Vec<(Dimensions, usize)>,
}

impl LineSvgRenderer for PassLog {
    fn render_line(&mut self, props: LineSvgProps<'_>) -> ChartResult<()> {
        self.passes.push((props.dimensions, props.data.len()));
        Ok(())
    }
}

struct Failing;

impl LineSvgRenderer for Failing {
    fn render_line(&mut self, _props: LineSvgProps<'_>) -> ChartResult<()> {
        Err(ChartError::Backend("surface lost".to_owned()))
    }
}

#[test]
fn zero_size_defers_then_one_render_with_inner_dimensions() {
    let container = HeadlessContainer::new(0, 0);
    let chart = ResponsiveLine::mount(
        &container,
        Line::new(NullRenderer::default(), margin_config()),
        data(),
        margin_config(),
    );
    assert_eq!(chart.render_count(), 0);
    assert_eq!(chart.dimensions(), None);

    container.resize(400, 300);
    assert_eq!(chart.render_count(), 1);
    assert_eq!(chart.renderer().renderer().render_count, 1);
    assert_eq!(chart.dimensions(), Some(Dimensions::new(400, 300)));

    let inner = Dimensions::new(400, 300).inner(Margin::new(10.0, 20.0, 30.0, 40.0));
    assert_relative_eq!(inner.width, 340.0);
    assert_relative_eq!(inner.height, 260.0);
    let frame = chart
        .renderer()
        .renderer()
        .last_frame
        .clone()
        .expect("frame");
    assert_eq!(frame.dimensions, Dimensions::new(400, 300));
}

#[test]
fn every_reported_size_triggers_a_pass() {
    let container = HeadlessContainer::new(0, 0);
    let chart = ResponsiveLine::mount(&container, PassLog::default(), data(), LineSvgConfig::default());
    container.resize(0, 120);
    container.resize(200, 100);
    container.resize(320, 180);
    let passes = chart.renderer().passes.clone();
    assert_eq!(
        passes,
        [(Dimensions::new(200, 100), 1), (Dimensions::new(320, 180), 1)]
    );
}

#[test]
fn new_props_render_at_the_last_known_size() {
    let container = HeadlessContainer::new(300, 200);
    let chart = ResponsiveLine::mount(&container, PassLog::default(), data(), LineSvgConfig::default());
    assert_eq!(chart.render_count(), 1);

    let mut more = data();
    more.push(Serie::new("s2", vec![Datum::new(0, 1)]));
    chart.set_props(more, LineSvgConfig::default());
    assert_eq!(
        chart.renderer().passes.last(),
        Some(&(Dimensions::new(300, 200), 2))
    );
}

#[test]
fn props_before_the_first_size_wait_for_it() {
    let container = HeadlessContainer::new(0, 0);
    let chart = ResponsiveLine::mount(&container, PassLog::default(), data(), LineSvgConfig::default());
    chart.set_props(Vec::new(), LineSvgConfig::default());
    assert_eq!(chart.render_count(), 0);
    container.resize(100, 100);
    assert_eq!(chart.renderer().passes, [(Dimensions::new(100, 100), 0)]);
}

#[test]
fn render_errors_do_not_escape_the_container() {
    let container = HeadlessContainer::new(100, 100);
    let chart = ResponsiveLine::mount(&container, Failing, data(), LineSvgConfig::default());
    container.resize(120, 100);
    assert_eq!(chart.render_count(), 2);
}

#[test]
fn unmount_and_drop_detach_from_the_container() {
    let container = HeadlessContainer::new(100, 100);
    let mut first = ResponsiveLine::mount(&container, PassLog::default(), data(), LineSvgConfig::default());
    let second = ResponsiveLine::mount(&container, PassLog::default(), data(), LineSvgConfig::default());
    assert_eq!(container.listener_count(), 2);

    first.unmount();
    assert_eq!(container.listener_count(), 1);
    drop(second);
    assert_eq!(container.listener_count(), 0);
    container.resize(200, 200);
    assert_eq!(first.render_count(), 1);
}

#[test]
fn canvas_adapter_forwards_the_canvas_ref() {
    let container = HeadlessContainer::new(0, 0);
    let canvas_ref = CanvasRef::new();
    let config = PartialLineCanvasConfig::default().resolve(&FixedDisplay(Some(2.0)));
    let chart = ResponsiveLineCanvas::mount(
        &container,
        LineCanvas::new(RecordingCanvas::new(), config.clone()),
        data(),
        config,
        Some(canvas_ref.clone()),
    );
    assert!(!canvas_ref.is_set());

    container.resize(150, 100);
    assert!(canvas_ref.is_set());
    let handle = canvas_ref.get().expect("handle");
    assert_eq!((handle.borrow().width, handle.borrow().height), (300, 200));
    assert_eq!(chart.renderer().host().draw_count(), 1);
}

/// Canvas renderer that only remembers whether it saw a reference.
#[derive(Default)]
struct RefProbe {
    saw_ref: Rc<RefCell<Vec<bool>>>,
}

impl LineCanvasRenderer for RefProbe {
    type Handle = u8;

    fn render_line(&mut self, props: LineCanvasProps<'_, u8>) -> ChartResult<()> {
        self.saw_ref.borrow_mut().push(props.canvas_ref.is_some());
        Ok(())
    }
}

#[test]
fn canvas_adapter_works_without_a_ref() {
    let container = HeadlessContainer::new(80, 60);
    let probe = RefProbe::default();
    let seen = Rc::clone(&probe.saw_ref);
    let _chart = ResponsiveLineCanvas::mount(
        &container,
        probe,
        data(),
        LineCanvasConfig::default(),
        None,
    );
    container.resize(90, 60);
    assert_eq!(*seen.borrow(), [false, false]);
}

#[test]
fn subscription_reports_the_current_size_immediately() {
    let container = HeadlessContainer::new(640, 480);
    let sizes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&sizes);
    let subscription = container.subscribe(Box::new(move |width, height| {
        sink.borrow_mut().push((width, height));
    }));
    container.resize(800, 600);
    subscription.unsubscribe();
    container.resize(1024, 768);
    assert_eq!(*sizes.borrow(), [(640, 480), (800, 600)]);
}
