use anyhow::{bail, Context};
use path_overlay::entity::{MapEntity, Path};
use path_overlay::render::{Frame, OutputFormat, PathRenderer};
use path_overlay::RenderConfig;

// Usage: draw_paths <entities.json> [width] [height] [pixel_size] [color]
//
// Renders every path entity of a map layer into `paths.svg` and `paths.png`
// in the current directory.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next() else {
        bail!("usage: draw_paths <entities.json> [width] [height] [pixel_size] [color]");
    };
    let width: u32 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(512);
    let height: u32 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(512);
    let pixel_size: f64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(5.0);
    let color = args.next().unwrap_or_else(|| "#ffffff".to_string());

    let json = std::fs::read_to_string(&input).with_context(|| format!("cannot read {input}"))?;
    let entities: Vec<MapEntity> = serde_json::from_str(&json).context("entities are not valid JSON")?;
    let paths = Path::from_entities(&entities);
    println!("{} of {} entities are paths", paths.len(), entities.len());

    let mut renderer = PathRenderer::new(RenderConfig::default())?;
    let frame = Frame::new(width, height, pixel_size);

    let svg = renderer.render_paths(OutputFormat::Vector, &paths, frame, &color).await?;
    std::fs::write("paths.svg", &svg.bytes)?;
    println!("paths.svg: data uri of {} bytes", svg.data_uri().len());

    let png = renderer.render_paths(OutputFormat::Raster, &paths, frame, &color).await?;
    std::fs::write("paths.png", &png.bytes)?;
    println!("paths.png: data uri of {} bytes", png.data_uri().len());

    Ok(())
}
