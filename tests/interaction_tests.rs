use std::cell::RefCell;
use std::rc::Rc;

use line_chart::api::{
    EventTarget, FixedDisplay, Line, LineCanvas, PartialLineCanvasConfig, PartialLineCommonProps,
    PartialLineSvgConfig, PartialSvgProps, TooltipContent, event_handler, point_tooltip,
};
use line_chart::core::{Datum, Dimensions, Serie};
use line_chart::interaction::{InteractionMode, PointerEvent, SliceMode};
use line_chart::render::{LayerSlot, LineLayerType, NullRenderer, RecordingCanvas};

type EventLog = Rc<RefCell<Vec<String>>>;

fn data() -> Vec<Serie> {
    vec![Serie::new(
        "a",
        vec![Datum::new(0, 0), Datum::new(1, 5), Datum::new(2, 0)],
    )]
}

fn logging(log: &EventLog, name: &'static str) -> line_chart::core::Callback<line_chart::api::ChartEventFn> {
    let log = Rc::clone(log);
    event_handler(move |target, _event| {
        let label = match target {
            EventTarget::Point(point) => point.id.clone(),
            EventTarget::Slice(slice) => format!("slice@{}", slice.x),
        };
        log.borrow_mut().push(format!("{name}:{label}"));
    })
}

fn chart(common: PartialLineCommonProps, svg: PartialSvgProps) -> Line<NullRenderer> {
    let config = PartialLineSvgConfig { common, svg }.resolve();
    Line::new(NullRenderer::default(), config)
        .with_dimensions(Dimensions::new(200, 100))
        .expect("dimensions")
        .with_data(data())
}

fn mesh() -> PartialSvgProps {
    PartialSvgProps {
        use_mesh: Some(true),
        ..PartialSvgProps::default()
    }
}

#[test]
fn hovering_the_mesh_activates_the_nearest_point() {
    let log = EventLog::default();
    let mut line = chart(
        PartialLineCommonProps {
            on_mouse_enter: Some(Some(logging(&log, "enter"))),
            on_mouse_move: Some(Some(logging(&log, "move"))),
            on_mouse_leave: Some(Some(logging(&log, "leave"))),
            ..PartialLineCommonProps::default()
        },
        mesh(),
    );

    assert!(line.pointer_move(PointerEvent::new(98.0, 4.0)).expect("move"));
    assert_eq!(line.interaction().current_point(), Some("a.1"));
    assert_eq!(line.interaction().mode(), InteractionMode::Hovering);
    assert!(!line.pointer_move(PointerEvent::new(101.0, 2.0)).expect("move"));
    assert!(line.pointer_move(PointerEvent::new(195.0, 95.0)).expect("move"));
    assert_eq!(line.interaction().current_point(), Some("a.2"));
    assert!(line.pointer_leave(PointerEvent::new(250.0, 50.0)).expect("leave"));
    assert_eq!(line.interaction().current_point(), None);

    assert_eq!(
        *log.borrow(),
        [
            "enter:a.1",
            "move:a.1",
            "move:a.1",
            "leave:a.1",
            "enter:a.2",
            "move:a.2",
            "leave:a.2",
        ]
    );
}

#[test]
fn an_active_point_draws_the_crosshair() {
    let mut line = chart(PartialLineCommonProps::default(), mesh());
    let crosshair = LayerSlot::Builtin(LineLayerType::Crosshair);
    assert!(
        line.build_frame()
            .expect("frame")
            .layer(crosshair)
            .is_some_and(|layer| layer.is_empty())
    );

    line.pointer_move(PointerEvent::new(100.0, 0.0)).expect("move");
    assert_eq!(line.renderer().render_count, 1);
    let frame = line.build_frame().expect("frame");
    assert!(frame.layer(crosshair).is_some_and(|layer| !layer.is_empty()));
}

#[test]
fn without_the_mesh_hovering_finds_nothing() {
    let mut line = chart(PartialLineCommonProps::default(), PartialSvgProps::default());
    assert!(!line.pointer_move(PointerEvent::new(100.0, 0.0)).expect("move"));
    assert_eq!(line.interaction().current_point(), None);
}

#[test]
fn non_interactive_charts_ignore_pointer_input() {
    let log = EventLog::default();
    let mut line = chart(
        PartialLineCommonProps {
            is_interactive: Some(false),
            on_click: Some(Some(logging(&log, "click"))),
            on_mouse_enter: Some(Some(logging(&log, "enter"))),
            ..PartialLineCommonProps::default()
        },
        mesh(),
    );
    assert!(!line.pointer_move(PointerEvent::new(100.0, 0.0)).expect("move"));
    assert!(!line.click(PointerEvent::new(100.0, 0.0)).expect("click"));
    assert!(log.borrow().is_empty());
    assert!(line.tooltip().is_none());
    let frame = line.build_frame().expect("frame");
    assert!(
        frame
            .layer(LayerSlot::Builtin(LineLayerType::Mesh))
            .is_some_and(|layer| layer.is_empty())
    );
}

#[test]
fn click_reports_the_point_under_the_pointer() {
    let log = EventLog::default();
    let mut line = chart(
        PartialLineCommonProps {
            on_click: Some(Some(logging(&log, "click"))),
            ..PartialLineCommonProps::default()
        },
        mesh(),
    );
    line.click(PointerEvent::new(3.0, 97.0)).expect("click");
    line.click(PointerEvent::new(-10.0, 50.0)).expect("click outside");
    assert_eq!(*log.borrow(), ["click:a.0"]);
}

#[test]
fn default_point_tooltip_shows_x_and_y() {
    let mut line = chart(PartialLineCommonProps::default(), mesh());
    assert!(line.tooltip().is_none());
    line.pointer_move(PointerEvent::new(100.0, 0.0)).expect("move");
    let tooltip = line.tooltip().expect("tooltip");
    assert_eq!((tooltip.x, tooltip.y), (100.0, 0.0));
    let TooltipContent::Basic { chip, text } = tooltip.content else {
        panic!("point tooltips are basic");
    };
    assert!(chip.is_some());
    assert!(text.starts_with("x: 1"), "{text}");
    assert!(text.ends_with("y: 5"), "{text}");
}

#[test]
fn custom_point_tooltip_replaces_the_default() {
    let mut line = chart(
        PartialLineCommonProps {
            tooltip: Some(Some(point_tooltip(|point| TooltipContent::Basic {
                chip: None,
                text: format!("point {}", point.id),
            }))),
            ..PartialLineCommonProps::default()
        },
        mesh(),
    );
    line.pointer_move(PointerEvent::new(100.0, 0.0)).expect("move");
    let tooltip = line.tooltip().expect("tooltip");
    assert_eq!(tooltip.content.lines(), ["point a.1"]);
}

#[test]
fn slices_take_precedence_over_points() {
    let log = EventLog::default();
    let mut line = chart(
        PartialLineCommonProps {
            enable_slices: Some(SliceMode::X),
            on_mouse_enter: Some(Some(logging(&log, "enter"))),
            ..PartialLineCommonProps::default()
        },
        mesh(),
    );
    assert!(line.pointer_move(PointerEvent::new(120.0, 60.0)).expect("move"));
    assert_eq!(line.interaction().current_slice(), Some(1));
    assert_eq!(line.interaction().current_point(), None);
    assert_eq!(*log.borrow(), ["enter:slice@100"]);

    let tooltip = line.tooltip().expect("slice tooltip");
    assert!(matches!(tooltip.content, TooltipContent::Table { ref rows } if rows.len() == 1));
    assert_eq!(tooltip.x, 100.0);
}

#[test]
fn vector_touches_move_the_crosshair_only_when_enabled() {
    let log = EventLog::default();
    let touch_handlers = || PartialLineCommonProps {
        on_touch_start: Some(Some(logging(&log, "start"))),
        on_touch_end: Some(Some(logging(&log, "end"))),
        ..PartialLineCommonProps::default()
    };

    let mut plain = chart(touch_handlers(), mesh());
    assert!(!plain.touch_start(PointerEvent::new(100.0, 0.0)).expect("touch"));
    assert_eq!(plain.interaction().current_point(), None);

    let mut touchable = chart(
        touch_handlers(),
        PartialSvgProps {
            enable_touch_crosshair: Some(true),
            ..mesh()
        },
    );
    assert!(touchable.touch_start(PointerEvent::new(100.0, 0.0)).expect("touch"));
    assert_eq!(touchable.interaction().current_point(), Some("a.1"));
    assert_eq!(touchable.interaction().mode(), InteractionMode::Touching);
    assert!(touchable.touch_end(PointerEvent::new(100.0, 0.0)).expect("touch end"));
    assert_eq!(touchable.interaction().mode(), InteractionMode::Idle);

    assert_eq!(*log.borrow(), ["start:a.1", "start:a.1", "end:a.1"]);
}

#[test]
fn canvas_touches_always_move_the_crosshair() {
    let config = PartialLineCanvasConfig::default().resolve(&FixedDisplay(None));
    let mut chart = LineCanvas::new(RecordingCanvas::new(), config)
        .with_dimensions(Dimensions::new(200, 100))
        .expect("dimensions")
        .with_data(data());
    assert!(chart.touch_move(PointerEvent::new(190.0, 90.0)).expect("touch"));
    assert_eq!(chart.interaction().current_point(), Some("a.2"));
    assert_eq!(chart.host().draw_count(), 1);
}
