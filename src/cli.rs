use crate::config::load_config;
use crate::filter::{parse_year, search_houses};
use crate::geometry::compute_connections;
use crate::ir::House;
use crate::layout::LayoutStrategy;
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::layout_house;
use crate::render::{render_svg, write_output_svg};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "lineage", version, about = "Lay out and draw house family trees")]
pub struct Args {
    /// House document (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout except for PNG.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Layout strategy: layered, heuristic or manual
    #[arg(short = 's', long = "strategy", default_value = "layered")]
    pub strategy: LayoutStrategy,

    /// Config file (.json or .json5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Highlight the relations of this entity and dim the rest
    #[arg(long = "focus")]
    pub focus: Option<String>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Fade everybody not alive in this year, e.g. "129 AC" or "27 BC"
    #[arg(long = "year")]
    pub year: Option<String>,

    /// Fade everybody who never reigned
    #[arg(long = "kingsOnly", alias = "kings-only")]
    pub kings_only: bool,

    /// Fade everybody who never rode a dragon
    #[arg(long = "dragonRidersOnly", alias = "dragon-riders-only")]
    pub dragon_riders_only: bool,

    /// Print entities whose name or title matches instead of laying out
    #[arg(long = "search")]
    pub search: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The updated house document
    Json,
    /// Pixel geometry of cards and connection paths
    Dump,
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    run_with(Args::parse())
}

pub fn run_with(args: Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    if let Some(raw) = args.year.as_deref() {
        let year = parse_year(raw).with_context(|| format!("no year in `{raw}`"))?;
        config.render.filter.year = Some(year);
    }
    config.render.filter.kings_only |= args.kings_only;
    config.render.filter.dragon_riders_only |= args.dragon_riders_only;

    let input = read_input(args.input.as_deref())?;
    let house = House::from_json(&input).context("invalid house document")?;
    if let Some(query) = args.search.as_deref() {
        let hits = search_houses(std::slice::from_ref(&house), query);
        tracing::debug!(house = %house.id, query, hits = hits.len(), "search finished");
        let json = serde_json::to_string_pretty(&hits)?;
        return write_text(&json, args.output.as_deref());
    }
    let laid_out = layout_house(&house, args.strategy, &config.layout)?;
    tracing::debug!(
        house = %laid_out.id,
        strategy = %args.strategy,
        format = ?args.output_format,
        "layout finished"
    );

    match args.output_format {
        OutputFormat::Json => {
            let json = laid_out.to_json_pretty()?;
            write_text(&json, args.output.as_deref())?;
        }
        OutputFormat::Dump => {
            let connections = compute_connections(
                &laid_out.entities,
                &laid_out.relations,
                &config.layout,
                args.focus.as_deref(),
            );
            let dump = LayoutDump::from_layout(args.strategy, &laid_out.entities, &connections, &config.layout);
            write_layout_dump(&dump, args.output.as_deref())?;
        }
        OutputFormat::Svg | OutputFormat::Png => {
            let connections = compute_connections(
                &laid_out.entities,
                &laid_out.relations,
                &config.layout,
                args.focus.as_deref(),
            );
            let svg = render_svg(&laid_out.entities, &connections, &config.theme, &config.layout, &config.render);
            if args.output_format == OutputFormat::Svg {
                write_output_svg(&svg, args.output.as_deref())?;
            } else {
                let output = ensure_output(args.output.as_deref(), "png")?;
                write_png(&svg, output, &config.render)?;
            }
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, render: &crate::config::RenderConfig) -> Result<()> {
    crate::render::write_output_png(svg, output, render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _render: &crate::config::RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_text(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)?,
        None => println!("{text}"),
    }
    Ok(())
}

fn ensure_output<'a>(output: Option<&'a Path>, ext: &str) -> Result<&'a Path> {
    output.ok_or_else(|| anyhow::anyhow!("output path required for {ext} output"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_flags() {
        let args = Args::try_parse_from([
            "lineage", "-i", "house.json", "-e", "svg", "-s", "heuristic", "--focus", "ned", "-w", "800",
        ])
        .unwrap();
        assert_eq!(args.output_format, OutputFormat::Svg);
        assert_eq!(args.strategy, LayoutStrategy::Heuristic);
        assert_eq!(args.focus.as_deref(), Some("ned"));
        assert_eq!(args.width, Some(800.0));
        assert!(args.height.is_none());
    }

    #[test]
    fn defaults_to_layered_json() {
        let args = Args::try_parse_from(["lineage"]).unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
        assert_eq!(args.strategy, LayoutStrategy::Layered);
    }

    #[test]
    fn parses_filter_flags() {
        let args = Args::try_parse_from([
            "lineage", "--year", "27 BC", "--kingsOnly", "--dragon-riders-only", "--search", "aegon",
        ])
        .unwrap();
        assert_eq!(args.year.as_deref(), Some("27 BC"));
        assert!(args.kings_only);
        assert!(args.dragon_riders_only);
        assert_eq!(args.search.as_deref(), Some("aegon"));
    }

    #[test]
    fn rejects_unknown_strategy() {
        assert!(Args::try_parse_from(["lineage", "-s", "spiral"]).is_err());
    }

    #[test]
    fn png_requires_output_path() {
        assert!(ensure_output(None, "png").is_err());
        assert_eq!(ensure_output(Some(Path::new("a.png")), "png").unwrap(), Path::new("a.png"));
    }

    #[test]
    fn writes_house_and_dump_files() {
        let dir = std::env::temp_dir().join(format!("lineage-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("house.json");
        std::fs::write(
            &input,
            r#"{"id":"stark","characters":[{"id":"ned","generation":1,"x":0},{"id":"robb","generation":4,"x":3}],
               "connections":[{"id":"c1","parents":["ned"],"children":["robb"]}]}"#,
        )
        .unwrap();

        let house_out = dir.join("out.json");
        run_with(Args::try_parse_from(["lineage", "-i", input.to_str().unwrap(), "-o", house_out.to_str().unwrap()]).unwrap())
            .unwrap();
        let house = House::from_json(&std::fs::read_to_string(&house_out).unwrap()).unwrap();
        let ned = house.entity("ned").unwrap();
        let robb = house.entity("robb").unwrap();
        assert!(robb.generation > ned.generation);

        let dump_out = dir.join("dump.json");
        run_with(
            Args::try_parse_from([
                "lineage",
                "-i",
                input.to_str().unwrap(),
                "-e",
                "dump",
                "-s",
                "manual",
                "-o",
                dump_out.to_str().unwrap(),
            ])
            .unwrap(),
        )
        .unwrap();
        let dump: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&dump_out).unwrap()).unwrap();
        assert_eq!(dump["strategy"], "manual");
        assert_eq!(dump["entities"][1]["top"], 1360.0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn filters_and_search_reach_the_output() {
        let dir = std::env::temp_dir().join(format!("lineage-cli-filters-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("house.json");
        std::fs::write(
            &input,
            r#"{"id":"targaryen","characters":[
                 {"id":"aegon1","name":"Aegon I","title":"The Conqueror","isKing":true,"birthYear":"27 BC","deathYear":"37 AC","generation":1,"x":0},
                 {"id":"aenys1","name":"Aenys I","birthYear":"07 AC","deathYear":"42 AC","generation":2,"x":0}],
               "connections":[{"id":"conn_1","parents":["aegon1"],"children":["aenys1"]}]}"#,
        )
        .unwrap();
        let input = input.to_str().unwrap();

        let svg_out = dir.join("out.svg");
        run_with(
            Args::try_parse_from(["lineage", "-i", input, "-e", "svg", "--year", "1 BC", "-o", svg_out.to_str().unwrap()])
                .unwrap(),
        )
        .unwrap();
        let svg = std::fs::read_to_string(&svg_out).unwrap();
        assert_eq!(svg.matches("class=\"dimmed\"").count(), 1);

        let hits_out = dir.join("hits.json");
        run_with(
            Args::try_parse_from(["lineage", "-i", input, "--search", "conqueror", "-o", hits_out.to_str().unwrap()])
                .unwrap(),
        )
        .unwrap();
        let hits: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&hits_out).unwrap()).unwrap();
        assert_eq!(hits.as_array().unwrap().len(), 1);
        assert_eq!(hits[0]["id"], "aegon1");
        assert_eq!(hits[0]["houseId"], "targaryen");

        let bad_year = Args::try_parse_from(["lineage", "-i", input, "--year", "someday"]).unwrap();
        assert!(run_with(bad_year).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }
}
