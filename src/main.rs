use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use miette::IntoDiagnostic;
use svg2dxf::{ConvertOptions, CutRules, FlattenOptions, Rescale, convert_file, default_output_path};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: svg2dxf <INPUT.svg> [OUTPUT.dxf] [options]

Options:
  --scale F            scale both axes by F
  --scale-xy FX FY     scale x by FX and y by FY
  --size W H           fit the drawing to W x H millimetres
  --thickness T        check laser-cut rules for material T mm thick
  --tolerance D        maximal curve flattening error in mm (default 0.1)
  --log-file PATH      write the log to PATH instead of stderr";

struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
    options: ConvertOptions,
    log_file: Option<PathBuf>,
}

fn number(flag: &str, value: Option<String>) -> Result<f64, String> {
    let value = value.ok_or_else(|| format!("{flag} needs a value"))?;
    value
        .parse()
        .map_err(|_| format!("{flag}: {value:?} is not a number"))
}

fn parse_args(mut args: impl Iterator<Item = String>) -> miette::Result<Args> {
    let mut positional = Vec::new();
    let mut options = ConvertOptions::default();
    let mut log_file = None;

    let bad = |msg: String| miette::miette!(help = USAGE, "{}", msg);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--scale" => {
                let f = number(&arg, args.next()).map_err(bad)?;
                options.rescale = Some(Rescale::Factors { x: f, y: f });
            }
            "--scale-xy" => {
                let x = number(&arg, args.next()).map_err(bad)?;
                let y = number(&arg, args.next()).map_err(bad)?;
                options.rescale = Some(Rescale::Factors { x, y });
            }
            "--size" => {
                let width = number(&arg, args.next()).map_err(bad)?;
                let height = number(&arg, args.next()).map_err(bad)?;
                options.rescale = Some(Rescale::Size { width, height });
            }
            "--thickness" => {
                let t = number(&arg, args.next()).map_err(bad)?;
                options.cut_rules = Some(CutRules::try_new(t)?);
            }
            "--tolerance" => {
                let d = number(&arg, args.next()).map_err(bad)?;
                options.flatten = FlattenOptions::try_new(d, options.flatten.min_segments)?;
            }
            "--log-file" => {
                let path = args.next().ok_or_else(|| bad("--log-file needs a path".to_string()))?;
                log_file = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            flag if flag.starts_with("--") => return Err(bad(format!("unknown option {flag}"))),
            _ => positional.push(PathBuf::from(&arg)),
        }
    }

    let mut positional = positional.into_iter();
    let input = positional
        .next()
        .ok_or_else(|| bad("missing input file".to_string()))?;
    let output = positional.next();
    if let Some(extra) = positional.next() {
        return Err(bad(format!("unexpected argument {}", extra.display())));
    }

    Ok(Args {
        input,
        output,
        options,
        log_file,
    })
}

fn init_logging(log_file: Option<&Path>) -> miette::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_file {
        Some(path) => {
            let file = File::create(path).into_diagnostic()?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn main() -> miette::Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    init_logging(args.log_file.as_deref())?;

    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input));
    let report = convert_file(&args.input, &output, &args.options)?;

    let mut summary = format!(
        "{} shapes, {} entities written to {}",
        report.shapes,
        report.entities,
        output.display()
    );
    if let Some(scale) = report.scale {
        summary.push_str(&format!(" (scaled {} x {})", scale.x, scale.y));
    }
    if !report.violations.is_empty() {
        summary.push_str(&format!(", {} cut rule violations", report.violations.len()));
    }
    println!("{summary}");
    Ok(())
}
