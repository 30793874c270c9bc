use line_chart::api::{
    DiagnosticKind, FixedDisplay, LineCommonProps, LineSvgConfig, PartialLineCanvasConfig,
    PartialLineCommonProps, PartialLineSvgConfig, PartialSvgProps, SvgProps, host_pixel_ratio,
};
use line_chart::core::{LineCurve, Margin};
use line_chart::interaction::{CrosshairType, SliceMode};
use proptest::prelude::*;

#[test]
fn empty_partial_resolves_to_documented_defaults() {
    let props = PartialLineCommonProps::default().resolve();
    assert_eq!(props, LineCommonProps::default());
    assert_eq!(props.curve, LineCurve::Linear);
    assert_eq!(props.margin, Margin::default());
    assert!(props.enable_grid_x && props.enable_grid_y);
    assert!(props.enable_points);
    assert!(!props.enable_area);
    assert!(props.is_interactive);
    assert!(props.enable_crosshair);
    assert_eq!(props.crosshair_type, CrosshairType::BottomLeft);
    assert_eq!(props.enable_slices, SliceMode::Disabled);
    assert!(props.tooltip.is_none() && props.on_click.is_none());

    let svg = SvgProps::default();
    assert!(svg.animate && svg.render_wrapper);
    assert!(!svg.enable_touch_crosshair);
    assert!(svg.defs.is_empty() && svg.fill.is_empty());
}

#[test]
fn empty_json_object_resolves_like_an_empty_partial() {
    let loaded = PartialLineSvgConfig::from_json_str("{}").expect("object");
    assert!(loaded.diagnostics.is_empty());
    assert_eq!(loaded.partial.resolve(), LineSvgConfig::default());
}

#[test]
fn passing_the_default_explicitly_changes_nothing() {
    let explicit = PartialLineSvgConfig::from_json_str(
        r#"{"lineWidth": 2, "pointSize": 6, "areaOpacity": 0.2, "enableArea": false,
            "crosshairType": "bottom-left", "enableSlices": false, "useMesh": false,
            "role": "img", "animate": true, "motionConfig": "gentle"}"#,
    )
    .expect("object");
    assert!(explicit.diagnostics.is_empty(), "{:?}", explicit.diagnostics);
    assert_eq!(explicit.partial.resolve(), LineSvgConfig::default());
}

#[test]
fn merge_keeps_base_fields_and_applies_overrides() {
    let base = PartialLineSvgConfig {
        common: PartialLineCommonProps {
            line_width: Some(4.0),
            enable_area: Some(true),
            ..PartialLineCommonProps::default()
        },
        ..PartialLineSvgConfig::default()
    };
    let overrides = PartialLineSvgConfig {
        common: PartialLineCommonProps {
            line_width: Some(1.0),
            ..PartialLineCommonProps::default()
        },
        svg: PartialSvgProps {
            use_mesh: Some(true),
            ..PartialSvgProps::default()
        },
    };
    let config = base.merge(overrides).resolve();
    assert_eq!(config.common.line_width, 1.0);
    assert!(config.common.enable_area);
    assert!(config.svg.use_mesh);
}

#[test]
fn json_diagnostics_name_the_offending_fields() {
    let loaded = PartialLineSvgConfig::from_json_str(
        r#"{"curve": "wiggly", "onClick": null, "height": 300, "xScale": {"type": "point"}}"#,
    )
    .expect("object");
    let diagnostics: Vec<(&str, &DiagnosticKind)> = loaded
        .diagnostics
        .iter()
        .map(|diagnostic| (diagnostic.field.as_str(), &diagnostic.kind))
        .collect();
    assert_eq!(diagnostics.len(), 3);
    assert!(matches!(diagnostics[0], ("curve", DiagnosticKind::InvalidShape(_))));
    assert_eq!(diagnostics[1], ("height", &DiagnosticKind::UnknownField));
    assert_eq!(diagnostics[2], ("onClick", &DiagnosticKind::CodeOnlyField));
    assert_eq!(loaded.partial.resolve().common.curve, LineCurve::Linear);
}

#[test]
fn canvas_json_accepts_pixel_ratio_and_rejects_svg_only_fields() {
    let loaded = PartialLineCanvasConfig::from_json_str(r#"{"pixelRatio": 3, "useMesh": true}"#)
        .expect("object");
    assert_eq!(loaded.partial.pixel_ratio, Some(3.0));
    assert_eq!(loaded.diagnostics.len(), 1);
    assert_eq!(loaded.diagnostics[0].field, "useMesh");
    assert_eq!(loaded.diagnostics[0].kind, DiagnosticKind::UnknownField);
}

#[test]
fn pixel_ratio_defaults_to_the_host_ratio() {
    let from_host = PartialLineCanvasConfig::default().resolve(&FixedDisplay(Some(2.0)));
    assert_eq!(from_host.pixel_ratio, 2.0);
    let unavailable = PartialLineCanvasConfig::default().resolve(&FixedDisplay(None));
    assert_eq!(unavailable.pixel_ratio, 1.0);
    assert_eq!(host_pixel_ratio(&FixedDisplay(Some(f64::NAN))), 1.0);
    assert_eq!(host_pixel_ratio(&FixedDisplay(Some(0.0))), 1.0);

    let explicit = PartialLineCanvasConfig {
        pixel_ratio: Some(1.5),
        ..PartialLineCanvasConfig::default()
    }
    .resolve(&FixedDisplay(Some(2.0)));
    assert_eq!(explicit.pixel_ratio, 1.5);
}

#[test]
fn rejected_pixel_ratio_is_reported_and_reset() {
    let mut config = PartialLineCanvasConfig {
        pixel_ratio: Some(-2.0),
        ..PartialLineCanvasConfig::default()
    }
    .resolve(&FixedDisplay(None));
    let diagnostics = config.check_ranges();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].field, "pixelRatio");
    assert_eq!(config.pixel_ratio, 1.0);
}

fn curve_strategy() -> impl Strategy<Value = LineCurve> {
    prop_oneof![
        Just(LineCurve::Basis),
        Just(LineCurve::Cardinal),
        Just(LineCurve::CatmullRom),
        Just(LineCurve::Linear),
        Just(LineCurve::MonotoneX),
        Just(LineCurve::MonotoneY),
        Just(LineCurve::Natural),
        Just(LineCurve::Step),
        Just(LineCurve::StepAfter),
        Just(LineCurve::StepBefore),
    ]
}

proptest! {
    #[test]
    fn supplied_overrides_win_over_defaults(
        line_width in proptest::option::of(0.0f64..20.0),
        point_size in proptest::option::of(0.0f64..40.0),
        area_opacity in proptest::option::of(0.0f64..=1.0),
        enable_area in proptest::option::of(any::<bool>()),
        enable_points in proptest::option::of(any::<bool>()),
        curve in proptest::option::of(curve_strategy()),
    ) {
        let defaults = LineCommonProps::default();
        let props = PartialLineCommonProps {
            line_width,
            point_size,
            area_opacity,
            enable_area,
            enable_points,
            curve,
            ..PartialLineCommonProps::default()
        }
        .resolve();

        prop_assert_eq!(props.line_width, line_width.unwrap_or(defaults.line_width));
        prop_assert_eq!(props.point_size, point_size.unwrap_or(defaults.point_size));
        prop_assert_eq!(props.area_opacity, area_opacity.unwrap_or(defaults.area_opacity));
        prop_assert_eq!(props.enable_area, enable_area.unwrap_or(defaults.enable_area));
        prop_assert_eq!(props.enable_points, enable_points.unwrap_or(defaults.enable_points));
        prop_assert_eq!(props.curve, curve.unwrap_or(defaults.curve));
        // Untouched fields keep their defaults.
        prop_assert_eq!(props.point_label_y_offset, defaults.point_label_y_offset);
    }

    #[test]
    fn resolved_tables_round_trip_through_their_partial(
        line_width in 0.0f64..20.0,
        enable_grid_x in any::<bool>(),
    ) {
        let props = PartialLineCommonProps {
            line_width: Some(line_width),
            enable_grid_x: Some(enable_grid_x),
            ..PartialLineCommonProps::default()
        }
        .resolve();
        let again = PartialLineCommonProps::from(props.clone()).resolve();
        prop_assert_eq!(again, props);
    }

    #[test]
    fn host_ratio_is_used_when_positive(ratio in 0.1f64..4.0) {
        let config = PartialLineCanvasConfig::default().resolve(&FixedDisplay(Some(ratio)));
        prop_assert_eq!(config.pixel_ratio, ratio);
    }
}
