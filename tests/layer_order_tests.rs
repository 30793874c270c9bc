use std::cell::RefCell;
use std::rc::Rc;

use line_chart::api::{
    CanvasLayer, FixedDisplay, Line, LineCanvas, PartialCanvasProps, PartialLineCanvasConfig,
    PartialLineSvgConfig, PartialSvgProps, SvgLayer,
};
use line_chart::core::{Datum, Dimensions, Serie};
use line_chart::render::{
    Color, LayerPrimitives, LayerSlot, LineLayerType, NullRenderer, Primitive, RecordingCanvas,
    TextHAlign, TextPrimitive, TextVAlign,
};
use proptest::prelude::*;

fn data() -> Vec<Serie> {
    vec![
        Serie::new("a", vec![Datum::new(0, 1), Datum::new(1, 4), Datum::new(2, 2)]),
        Serie::new("b", vec![Datum::new(0, 3), Datum::new(1, 1), Datum::new(2, 5)]),
    ]
}

fn labelled_svg_layer(label: &'static str, calls: &Rc<RefCell<Vec<&'static str>>>) -> SvgLayer {
    let calls = Rc::clone(calls);
    SvgLayer::custom(move |_| {
        calls.borrow_mut().push(label);
        LayerPrimitives::new().with(TextPrimitive::new(
            label,
            0.0,
            0.0,
            10.0,
            Color::rgba(0.0, 0.0, 0.0, 1.0),
            TextHAlign::Left,
        ))
    })
}

fn labelled_canvas_layer(label: &'static str) -> CanvasLayer {
    CanvasLayer::custom(move |_, surface| {
        surface.fill_text(label, 0.0, 0.0, 10.0, TextHAlign::Left, TextVAlign::Middle)
    })
}

fn svg_chart(layers: Vec<SvgLayer>) -> Line<NullRenderer> {
    let config = PartialLineSvgConfig {
        svg: PartialSvgProps {
            layers: Some(layers),
            ..PartialSvgProps::default()
        },
        ..PartialLineSvgConfig::default()
    }
    .resolve();
    Line::new(NullRenderer::default(), config)
        .with_dimensions(Dimensions::new(320, 200))
        .expect("dimensions")
        .with_data(data())
}

fn frame_texts(chart: &mut Line<NullRenderer>, labels: &[&str]) -> Vec<String> {
    chart
        .build_frame()
        .expect("frame")
        .flatten()
        .primitives
        .into_iter()
        .filter_map(|primitive| match primitive {
            Primitive::Text(text) if labels.contains(&text.text.as_str()) => Some(text.text),
            _ => None,
        })
        .collect()
}

#[test]
fn custom_svg_layers_run_and_draw_in_declared_order() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut chart = svg_chart(vec![
        labelled_svg_layer("C", &calls),
        SvgLayer::Builtin(LineLayerType::Lines),
        labelled_svg_layer("A", &calls),
        labelled_svg_layer("B", &calls),
    ]);

    assert_eq!(frame_texts(&mut chart, &["A", "B", "C"]), ["C", "A", "B"]);
    assert_eq!(*calls.borrow(), ["C", "A", "B"]);

    chart.render().expect("render");
    assert_eq!(*calls.borrow(), ["C", "A", "B", "C", "A", "B"]);
}

#[test]
fn omitted_builtin_layers_are_not_drawn() {
    let mut chart = svg_chart(vec![SvgLayer::Builtin(LineLayerType::Lines)]);
    let frame = chart.build_frame().expect("frame");
    assert_eq!(frame.slots(), [LayerSlot::Builtin(LineLayerType::Lines)]);
    let lines = frame
        .layer(LayerSlot::Builtin(LineLayerType::Lines))
        .expect("lines layer");
    assert_eq!(lines.len(), 2);
    assert!(frame.layer(LayerSlot::Builtin(LineLayerType::Axes)).is_none());
}

#[test]
fn a_repeated_builtin_layer_is_drawn_at_every_position() {
    let mut chart = svg_chart(vec![
        SvgLayer::Builtin(LineLayerType::Lines),
        SvgLayer::Builtin(LineLayerType::Points),
        SvgLayer::Builtin(LineLayerType::Lines),
    ]);
    let frame = chart.build_frame().expect("frame");
    let sizes: Vec<(LayerSlot, usize)> = frame
        .layers
        .iter()
        .map(|layer| (layer.slot, layer.content.len()))
        .collect();
    assert_eq!(
        sizes,
        vec![
            (LayerSlot::Builtin(LineLayerType::Lines), 2),
            (LayerSlot::Builtin(LineLayerType::Points), 6),
            (LayerSlot::Builtin(LineLayerType::Lines), 2),
        ]
    );
    let flattened = frame.flatten();
    assert!(matches!(flattened.primitives.last(), Some(Primitive::Path(_))));
}

#[test]
fn custom_canvas_layers_paint_in_declared_order() {
    let config = PartialLineCanvasConfig {
        canvas: PartialCanvasProps {
            layers: Some(vec![
                labelled_canvas_layer("A"),
                CanvasLayer::Builtin(LineLayerType::Lines),
                labelled_canvas_layer("B"),
                labelled_canvas_layer("C"),
            ]),
        },
        ..PartialLineCanvasConfig::default()
    }
    .resolve(&FixedDisplay(None));
    let mut chart = LineCanvas::new(RecordingCanvas::new(), config)
        .with_dimensions(Dimensions::new(320, 200))
        .expect("dimensions")
        .with_data(data());
    chart.render().expect("render");

    let recording = chart.host().recording();
    let labels: Vec<&str> = recording
        .texts()
        .into_iter()
        .filter(|text| ["A", "B", "C"].contains(text))
        .collect();
    assert_eq!(labels, ["A", "B", "C"]);
}

proptest! {
    #[test]
    fn any_permutation_of_custom_layers_keeps_its_order(
        order in Just(vec!["A", "B", "C", "D"]).prop_shuffle(),
    ) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let layers = order
            .iter()
            .map(|label| labelled_svg_layer(*label, &calls))
            .collect();
        let mut chart = svg_chart(layers);
        let texts = frame_texts(&mut chart, &["A", "B", "C", "D"]);
        prop_assert_eq!(&texts, &order);
        prop_assert_eq!(&*calls.borrow(), &order);
    }
}
