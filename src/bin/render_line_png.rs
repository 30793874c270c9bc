#[cfg(feature = "cairo-backend")]
use line_chart::api::{FixedDisplay, LineCanvas, PartialLineCanvasConfig};
#[cfg(feature = "cairo-backend")]
use line_chart::core::{Dimensions, Serie};
#[cfg(feature = "cairo-backend")]
use serde::Deserialize;
#[cfg(feature = "cairo-backend")]
use std::fs;
#[cfg(feature = "cairo-backend")]
use std::path::PathBuf;

#[cfg(feature = "cairo-backend")]
#[derive(Debug, Deserialize)]
struct ChartDocument {
    width: u32,
    height: u32,
    data: Vec<Serie>,
    #[serde(default)]
    config: Option<serde_json::Value>,
}

#[cfg(feature = "cairo-backend")]
#[derive(Debug)]
struct CliArgs {
    input_path: PathBuf,
    output_path: PathBuf,
    pixel_ratio: Option<f64>,
}

#[cfg(feature = "cairo-backend")]
fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cairo-backend"))]
fn main() {
    eprintln!("this tool requires feature `cairo-backend`");
    std::process::exit(1);
}

#[cfg(feature = "cairo-backend")]
fn run() -> Result<(), String> {
    use line_chart::render::CairoCanvas;

    let args = parse_args()?;
    let raw = fs::read_to_string(&args.input_path)
        .map_err(|err| format!("failed to read `{}`: {err}", args.input_path.display()))?;
    let document: ChartDocument =
        serde_json::from_str(&raw).map_err(|err| format!("failed to parse chart json: {err}"))?;

    let config_json = document
        .config
        .as_ref()
        .map_or_else(|| "{}".to_owned(), ToString::to_string);
    let loaded = PartialLineCanvasConfig::from_json_str(&config_json)
        .map_err(|err| format!("invalid config: {err}"))?;
    for diagnostic in &loaded.diagnostics {
        eprintln!("warning: {diagnostic}");
    }

    let config = loaded.partial.resolve(&FixedDisplay(args.pixel_ratio));
    let canvas = CairoCanvas::new().map_err(|err| format!("cairo init failed: {err}"))?;
    let mut chart = LineCanvas::new(canvas, config)
        .with_dimensions(Dimensions::new(document.width, document.height))
        .map_err(|err| format!("invalid dimensions: {err}"))?
        .with_data(document.data);
    for diagnostic in chart.diagnostics() {
        eprintln!("warning: {diagnostic}");
    }

    chart
        .render()
        .map_err(|err| format!("render failed: {err}"))?;
    chart
        .host()
        .write_png(&args.output_path)
        .map_err(|err| format!("failed to write `{}`: {err}", args.output_path.display()))?;

    let (width_px, height_px) = chart.pixel_size();
    println!(
        "wrote {} ({width_px}x{height_px} px)",
        args.output_path.display()
    );
    Ok(())
}

#[cfg(feature = "cairo-backend")]
fn parse_args() -> Result<CliArgs, String> {
    let mut positional = Vec::new();
    let mut pixel_ratio = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--pixel-ratio" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --pixel-ratio".to_owned())?;
                let ratio = value
                    .parse::<f64>()
                    .map_err(|err| format!("invalid --pixel-ratio `{value}`: {err}"))?;
                pixel_ratio = Some(ratio);
            }
            "--help" | "-h" => {
                println!("{}", usage_message());
                std::process::exit(0);
            }
            _ if arg.starts_with("--") => {
                return Err(format!("unknown argument `{arg}`\n\n{}", usage_message()));
            }
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let mut positional = positional.into_iter();
    match (positional.next(), positional.next(), positional.next()) {
        (Some(input_path), Some(output_path), None) => Ok(CliArgs {
            input_path,
            output_path,
            pixel_ratio,
        }),
        _ => Err(usage_message()),
    }
}

#[cfg(feature = "cairo-backend")]
fn usage_message() -> String {
    [
        "usage: render_line_png <chart.json> <out.png> [--pixel-ratio <ratio>]",
        "",
        "chart.json holds { \"width\", \"height\", \"data\", \"config\" };",
        "config uses the canvas chart JSON names (xScale, enableGridX, ...).",
    ]
    .join("\n")
}
