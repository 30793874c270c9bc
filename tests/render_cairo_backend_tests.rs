#![cfg(feature = "cairo-backend")]

use cairo::{Context, Format, ImageSurface};
use line_chart::ChartError;
use line_chart::api::{FixedDisplay, Line, LineCanvas, LineSvgConfig, PartialLineCanvasConfig};
use line_chart::core::{Datum, Dimensions, Serie};
use line_chart::render::{CairoCanvas, CairoRenderer, CanvasRef};

fn data() -> Vec<Serie> {
    vec![
        Serie::new("a", vec![Datum::new(0, 10), Datum::new(1, 20), Datum::new(2, 15)]),
        Serie::new("b", vec![Datum::new(0, 5), Datum::new(1, 8), Datum::new(2, 12)]),
    ]
}

#[test]
fn cairo_renderer_rejects_invalid_surface_size() {
    let err = CairoRenderer::new(0, 480).expect_err("invalid width must fail");
    assert!(matches!(err, ChartError::InvalidDimensions { .. }));
}

#[test]
fn cairo_renderer_draws_lines_points_and_axes() {
    let renderer = CairoRenderer::new(1, 1).expect("renderer");
    let mut line = Line::new(renderer, LineSvgConfig::default())
        .with_dimensions(Dimensions::new(600, 320))
        .expect("dimensions")
        .with_data(data());
    line.render().expect("render");

    let renderer = line.into_renderer();
    assert_eq!(
        (renderer.surface().width(), renderer.surface().height()),
        (600, 320)
    );
    let stats = renderer.last_stats();
    assert_eq!(stats.paths_drawn, 2);
    assert_eq!(stats.circles_drawn, 6);
    assert!(stats.texts_drawn >= 3);
}

#[test]
fn cairo_renderer_can_draw_on_external_context() {
    let renderer = CairoRenderer::new(1, 1).expect("renderer");
    let mut line = Line::new(renderer, LineSvgConfig::default())
        .with_dimensions(Dimensions::new(600, 320))
        .expect("dimensions")
        .with_data(data());

    let surface = ImageSurface::create(Format::ARgb32, 600, 320).expect("surface");
    let context = Context::new(&surface).expect("context");
    line.render_on_cairo_context(&context)
        .expect("render on context");
    assert!(line.renderer().last_stats().lines_drawn > 0);
}

#[test]
fn cairo_canvas_backing_store_follows_the_pixel_ratio() {
    let config = PartialLineCanvasConfig::default().resolve(&FixedDisplay(Some(2.0)));
    let canvas_ref = CanvasRef::new();
    let mut chart = LineCanvas::new(CairoCanvas::new().expect("canvas"), config)
        .with_dimensions(Dimensions::new(300, 150))
        .expect("dimensions")
        .with_data(data())
        .with_canvas_ref(canvas_ref.clone());
    chart.render().expect("render");

    let surface = canvas_ref.get().expect("surface handle");
    assert_eq!((surface.width(), surface.height()), (600, 300));
}
