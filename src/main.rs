use dbcanvas::diagram::{Diagram, PositionMap};
use dbcanvas::error::Error;
use dbcanvas::geom::CanvasBounds;
use dbcanvas::measure::TableMetrics;
use dbcanvas::svg::SvgRenderer;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <input.dbml> [options]", args[0]);
        eprintln!();
        eprintln!("Options:");
        eprintln!("  -o, --output <file>   Output file (default: stdout)");
        eprintln!("  -l, --layout <file>   TOML layout file to load and update");
        process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let mut output_path: Option<PathBuf> = None;
    let mut layout_path: Option<PathBuf> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(PathBuf::from(&args[i]));
                }
            }
            "-l" | "--layout" => {
                i += 1;
                if i < args.len() {
                    layout_path = Some(PathBuf::from(&args[i]));
                }
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    if let Err(e) = run(&input_path, output_path.as_deref(), layout_path.as_deref()) {
        eprintln!("{e}");
        process::exit(1);
    }
}

fn run(input: &Path, output: Option<&Path>, layout: Option<&Path>) -> Result<(), Error> {
    let source = fs::read_to_string(input).map_err(|source| Error::ReadFile {
        path: input.to_path_buf(),
        source,
    })?;

    // A missing layout file is fine on first run; it gets written below.
    let prior = match layout {
        Some(path) if path.exists() => {
            let text = fs::read_to_string(path).map_err(|source| Error::ReadFile {
                path: path.to_path_buf(),
                source,
            })?;
            PositionMap::from_toml(&text).map_err(|source| Error::LayoutParse {
                path: path.to_path_buf(),
                source,
            })?
        }
        _ => PositionMap::default(),
    };

    let diagram = Diagram::build(
        &source,
        &prior,
        TableMetrics::default(),
        CanvasBounds::default(),
    );

    if let Some(path) = layout {
        let text = diagram.positions().to_toml()?;
        fs::write(path, text).map_err(|source| Error::WriteFile {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let svg = SvgRenderer::default().render(&diagram);
    match output {
        Some(path) => fs::write(path, &svg).map_err(|source| Error::WriteFile {
            path: path.to_path_buf(),
            source,
        })?,
        None => print!("{svg}"),
    }

    Ok(())
}
