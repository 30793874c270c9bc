use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use line_chart::api::{
    DiagnosticKind, Line, LineCommonProps, LineScene, LineSvgConfig, PartialLineCommonProps,
    PartialLineSvgConfig, PartialSvgProps, SvgLayer,
};
use line_chart::core::{
    Datum, DatumValue, Dimensions, LinearScaleSpec, Margin, ScaleBound, ScaleSpec, Serie,
};
use line_chart::interaction::SliceMode;
use line_chart::render::{LayerPrimitives, LayerSlot, LineLayerType, NullRenderer};
use proptest::prelude::*;

fn single_serie(values: &[f64]) -> Vec<Serie> {
    vec![Serie::new(
        "s1",
        values
            .iter()
            .enumerate()
            .map(|(x, y)| Datum::new(x as f64, *y))
            .collect(),
    )]
}

#[test]
fn default_y_scale_reaches_the_data_maximum() {
    let data = vec![Serie::new("s1", vec![Datum::new(0, 0), Datum::new(1, 5)])];
    let scene = LineScene::compute(&data, &LineCommonProps::default(), Dimensions::new(400, 300))
        .expect("scene");
    let (min, max) = scene.y_scale.domain_bounds().expect("linear domain");
    assert_relative_eq!(min, 0.0);
    assert_relative_eq!(max, 5.0);
    assert_relative_eq!(scene.y_scale.map_number(5.0).expect("mapped"), 0.0);
    assert_relative_eq!(scene.y_scale.map_number(0.0).expect("mapped"), 300.0);
}

#[test]
fn explicit_y_bounds_override_the_data() {
    let props = PartialLineCommonProps {
        y_scale: Some(ScaleSpec::Linear(LinearScaleSpec {
            min: ScaleBound::Value(-10.0),
            max: ScaleBound::Value(10.0),
            ..LinearScaleSpec::default()
        })),
        ..PartialLineCommonProps::default()
    }
    .resolve();
    let scene = LineScene::compute(&single_serie(&[1.0, 2.0]), &props, Dimensions::new(200, 100))
        .expect("scene");
    assert_eq!(scene.y_scale.domain_bounds(), Some((-10.0, 10.0)));
    assert_relative_eq!(scene.y_scale.map_number(0.0).expect("mapped"), 50.0);
}

#[test]
fn inner_area_is_outer_size_minus_margins() {
    let props = PartialLineCommonProps {
        margin: Some(Margin::new(10.0, 20.0, 30.0, 40.0)),
        ..PartialLineCommonProps::default()
    }
    .resolve();
    let scene = LineScene::compute(&single_serie(&[1.0]), &props, Dimensions::new(400, 300))
        .expect("scene");
    assert_relative_eq!(scene.inner.width, 340.0);
    assert_relative_eq!(scene.inner.height, 260.0);
}

#[test]
fn unplaceable_values_are_skipped_and_split_the_line() {
    let data = vec![Serie::new(
        "s1",
        vec![
            Datum::new(0, 1),
            Datum::new(1, DatumValue::Text("n/a".to_owned())),
            Datum::new(2, 3),
        ],
    )];
    let scene = LineScene::compute(&data, &LineCommonProps::default(), Dimensions::new(300, 100))
        .expect("scene");
    let ids: Vec<&str> = scene.points.iter().map(|point| point.id.as_str()).collect();
    assert_eq!(ids, ["s1.0", "s1.2"]);
    let positions = scene.series[0].positions();
    assert!(positions[0].is_some() && positions[1].is_none() && positions[2].is_some());
}

#[test]
fn series_without_an_id_are_dropped_and_reported() {
    let data = vec![
        Serie::new("", vec![Datum::new(0, 1)]),
        Serie::new("kept", vec![Datum::new(0, 2)]),
        Serie::new("empty", Vec::new()),
    ];
    let mut line = Line::new(NullRenderer::default(), LineSvgConfig::default())
        .with_dimensions(Dimensions::new(300, 200))
        .expect("dimensions")
        .with_data(data);
    let kinds: Vec<DiagnosticKind> = line
        .diagnostics()
        .into_iter()
        .map(|diagnostic| diagnostic.kind)
        .collect();
    assert_eq!(kinds, [DiagnosticKind::EmptySeriesId, DiagnosticKind::EmptySeries]);

    let scene = line.scene().expect("scene");
    let ids: Vec<String> = scene.series.iter().map(|serie| serie.id.to_string()).collect();
    assert_eq!(ids, ["kept", "empty"]);
    line.render().expect("render never fails on bad data");
}

#[test]
fn points_list_later_series_first() {
    let data = vec![
        Serie::new("a", vec![Datum::new(0, 1), Datum::new(1, 2)]),
        Serie::new("b", vec![Datum::new(0, 3), Datum::new(1, 4)]),
    ];
    let scene = LineScene::compute(&data, &LineCommonProps::default(), Dimensions::new(300, 100))
        .expect("scene");
    let ids: Vec<&str> = scene.points.iter().map(|point| point.id.as_str()).collect();
    assert_eq!(ids, ["b.0", "b.1", "a.0", "a.1"]);
    let indices: Vec<usize> = scene.points.iter().map(|point| point.index).collect();
    assert_eq!(indices, [0, 1, 2, 3]);
}

#[test]
fn stacked_scale_sums_series() {
    let props = PartialLineCommonProps {
        y_scale: Some(ScaleSpec::Linear(LinearScaleSpec {
            stacked: true,
            ..LinearScaleSpec::default()
        })),
        ..PartialLineCommonProps::default()
    }
    .resolve();
    let data = vec![
        Serie::new("a", vec![Datum::new(0, 1), Datum::new(1, 2)]),
        Serie::new("b", vec![Datum::new(0, 3), Datum::new(1, 4)]),
    ];
    let scene = LineScene::compute(&data, &props, Dimensions::new(300, 100)).expect("scene");
    let top = scene.point("b.1").expect("b.1");
    assert_eq!(top.data.y_stacked, Some(6.0));
    assert_eq!(scene.y_scale.domain_bounds(), Some((0.0, 6.0)));
}

#[test]
fn slices_group_points_by_x() {
    let props = PartialLineCommonProps {
        enable_slices: Some(SliceMode::X),
        ..PartialLineCommonProps::default()
    }
    .resolve();
    let data = vec![
        Serie::new("a", vec![Datum::new(0, 1), Datum::new(1, 2), Datum::new(2, 2)]),
        Serie::new("b", vec![Datum::new(0, 3), Datum::new(1, 4), Datum::new(2, 1)]),
    ];
    let scene = LineScene::compute(&data, &props, Dimensions::new(200, 100)).expect("scene");
    assert_eq!(scene.slices.len(), 3);
    assert!(scene.slices.iter().all(|slice| slice.points.len() == 2));
    assert_relative_eq!(scene.slices[1].x, 100.0);
    assert_relative_eq!(scene.slices[1].x0, 50.0);
    assert_relative_eq!(scene.slices[1].width, 100.0);
}

#[test]
fn slices_stay_inside_an_explicit_x_domain() {
    let config = PartialLineSvgConfig {
        common: PartialLineCommonProps {
            x_scale: Some(ScaleSpec::linear_range(
                ScaleBound::Value(0.0),
                ScaleBound::Value(1.0),
            )),
            enable_slices: Some(SliceMode::X),
            ..PartialLineCommonProps::default()
        },
        ..PartialLineSvgConfig::default()
    }
    .resolve();
    let data = vec![Serie::new(
        "s1",
        vec![Datum::new(0, 1), Datum::new(5, 2), Datum::new(10, 3)],
    )];
    let mut line = Line::new(NullRenderer::default(), config)
        .with_dimensions(Dimensions::new(200, 100))
        .expect("dimensions")
        .with_data(data);

    let slices = &line.scene().expect("scene").slices;
    assert_eq!(slices.len(), 1);
    assert_relative_eq!(slices[0].x0, 0.0);
    assert_relative_eq!(slices[0].width, 200.0);

    line.render().expect("points past the domain still render");
    assert_eq!(line.renderer().render_count, 1);
}

#[test]
fn empty_inner_area_draws_nothing() {
    let config = PartialLineSvgConfig {
        common: PartialLineCommonProps {
            margin: Some(Margin::new(0.0, 0.0, 0.0, 500.0)),
            ..PartialLineCommonProps::default()
        },
        ..PartialLineSvgConfig::default()
    }
    .resolve();
    let mut line = Line::new(NullRenderer::default(), config)
        .with_dimensions(Dimensions::new(300, 200))
        .expect("dimensions")
        .with_data(single_serie(&[1.0, 2.0]));
    let frame = line.build_frame().expect("frame");
    assert!(frame.flatten().is_empty());
    assert!(
        frame
            .layer(LayerSlot::Builtin(LineLayerType::Lines))
            .is_some_and(LayerPrimitives::is_empty)
    );
}

proptest! {
    #[test]
    fn custom_layer_observes_one_point_per_input_datum(
        values in proptest::collection::vec(-1_000.0f64..1_000.0, 1..40),
    ) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let recorder = Rc::clone(&seen);
        let config = PartialLineSvgConfig {
            svg: PartialSvgProps {
                layers: Some(vec![SvgLayer::custom(move |props| {
                    *recorder.borrow_mut() = props
                        .points
                        .iter()
                        .map(|point| (point.index, point.id.clone()))
                        .collect();
                    LayerPrimitives::new()
                })]),
                ..PartialSvgProps::default()
            },
            ..PartialLineSvgConfig::default()
        }
        .resolve();
        let mut line = Line::new(NullRenderer::default(), config)
            .with_dimensions(Dimensions::new(640, 480))
            .expect("dimensions")
            .with_data(single_serie(&values));
        line.build_frame().expect("frame");

        let seen = seen.borrow();
        prop_assert_eq!(seen.len(), values.len());
        for (position, (index, id)) in seen.iter().enumerate() {
            prop_assert_eq!(*index, position);
            prop_assert_eq!(id, &format!("s1.{position}"));
        }
    }
}
