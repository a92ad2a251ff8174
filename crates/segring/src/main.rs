use clap::{Parser, Subcommand};
use segring::config;
use segring::state::decompose_total;
use segring::{Parameter, Progress, RingGeometry, compute_segment_arcs};

#[derive(Parser, Debug)]
#[command(name = "segring", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Print the arcs for a list of segment progress values
    Arcs {
        /// Gap between segments in degrees (defaults to the configured gap)
        #[arg(short, long)]
        gap: Option<f64>,

        /// Number of segments; missing progress values count as empty
        #[arg(short = 'n', long)]
        segments: Option<usize>,

        /// Progress of each segment, clockwise from 12 o'clock
        #[arg(allow_negative_numbers = true)]
        progress: Vec<f64>,
    },
    /// Spread a total over the segments the way the single slider does
    Fill {
        segments: usize,

        #[arg(allow_negative_numbers = true)]
        total: f64,
    },
    /// Print the avatar and ring box model
    Geometry {
        /// Override a parameter, e.g. `--set gap=8`
        #[arg(long = "set", value_parser = parse_override)]
        overrides: Vec<(Parameter, f64)>,
    },
    /// Print the config file path
    Config {
        /// Write the default config if none exists
        #[arg(long)]
        init: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Arcs {
            gap,
            segments,
            progress,
        } => print_arcs(gap, segments, progress, cli.json),
        Commands::Fill { segments, total } => print_fill(segments, total, cli.json),
        Commands::Geometry { overrides } => print_geometry(&overrides, cli.json),
        Commands::Config { init } => {
            let path = if init {
                config::write_default_config()?
            } else {
                config::get_config_path()?
            };
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn parse_override(s: &str) -> Result<(Parameter, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let parameter = name
        .trim()
        .parse::<Parameter>()
        .map_err(|_| format!("unknown parameter '{}'", name))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value '{}': {}", value, e))?;
    Ok((parameter, value))
}

fn print_arcs(
    gap: Option<f64>,
    segments: Option<usize>,
    progress: Vec<f64>,
    json: bool,
) -> anyhow::Result<()> {
    let gap = gap.unwrap_or_else(|| config::load_or_default().ring.gap_angle);
    let count = segments.unwrap_or(progress.len());
    let progress: Vec<Progress> = progress.into_iter().map(Progress::new).collect();
    let arcs = compute_segment_arcs(count, gap, &progress);

    if json {
        println!("{}", serde_json::to_string_pretty(&arcs)?);
        return Ok(());
    }

    if arcs.is_empty() {
        println!("no segments");
        return Ok(());
    }

    println!("{:>3} {:>10} {:>10} {:>10}", "#", "start", "track", "filled");
    for (i, arc) in arcs.iter().enumerate() {
        println!(
            "{:>3} {:>10.3} {:>10.3} {:>10.3}",
            i, arc.start_angle, arc.track_sweep_angle, arc.progress_sweep_angle
        );
    }
    Ok(())
}

fn print_fill(segments: usize, total: f64, json: bool) -> anyhow::Result<()> {
    let progress = decompose_total(segments, total);

    if json {
        println!("{}", serde_json::to_string_pretty(&progress)?);
    } else {
        let values: Vec<String> = progress.iter().map(|p| format!("{:.3}", **p)).collect();
        println!("[{}]", values.join(", "));
    }
    Ok(())
}

fn print_geometry(overrides: &[(Parameter, f64)], json: bool) -> anyhow::Result<()> {
    let parameters = overrides
        .iter()
        .fold(config::load_or_default().ring, |params, &(which, value)| {
            params.with(which, value)
        });
    let geometry = RingGeometry::new(&parameters);

    if json {
        println!("{}", serde_json::to_string_pretty(&geometry)?);
    } else {
        println!("canvas   {:.1}", geometry.canvas_size);
        println!("radius   {:.1}", geometry.arc_radius);
        println!("stroke   {:.1}", geometry.stroke_width);
        println!("avatar   {:.1}", geometry.avatar_diameter);
        println!("gap      {:.1}", parameters.gap_angle);
    }
    Ok(())
}
