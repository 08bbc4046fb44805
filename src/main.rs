use clap::{Parser, Subcommand};
use log::info;

use gpm::span::SpanEstimator;
use gpm::{GeneticMap, GpmError};

const INFO: &str = "\
gpm: move between physical and genetic genomic coordinates

Subcommands:

  estimate:    estimate genetic spans with a flat bases-per-centimorgan ratio.
  interpolate: interpolate genetic spans from a genetic map.

";

#[derive(Parser)]
#[clap(name = "gpm")]
#[clap(about = INFO)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Append `(end - start) / bases` to each interval data record.
    ///
    /// The interval data file is tab-separated with at least seven fields;
    /// field 5 is the chromosome and fields 6 and 7 are the physical start
    /// and end positions.
    Estimate {
        /// path to the input interval data, gzip or plaintext
        #[arg(short, long, required = true)]
        input: String,
        /// the output file path
        #[arg(short, long, required = true)]
        output: String,
        /// bases per centimorgan
        #[arg(short, long, required = true)]
        bases: u64,
    },
    /// Append the interpolated genetic span to each interval data record.
    ///
    /// Both span endpoints are interpolated against the genetic map; records
    /// outside the map's covered range are skipped with a warning.
    Interpolate {
        /// path to the input interval data, gzip or plaintext
        #[arg(short, long, required = true)]
        input: String,
        /// the output file path
        #[arg(short, long, required = true)]
        output: String,
        /// the genetic map, tab-separated: chromosome, label, cM, bp
        #[arg(short, long, required = true)]
        map: String,
    },
}

fn run() -> Result<(), GpmError> {
    let cli = Cli::parse();
    match &cli.command {
        Some(Commands::Estimate {
            input,
            output,
            bases,
        }) => SpanEstimator::new(input, output).estimate(*bases),
        Some(Commands::Interpolate { input, output, map }) => {
            let gmap = GeneticMap::from_path(map)?;
            let forest = gmap.forest();
            info!(
                "loaded genetic map: {} intervals from {} loci across {} chromosomes",
                forest.num_intervals(),
                forest.num_loci(),
                forest.len()
            );
            SpanEstimator::new(input, output).interpolate(&gmap)
        }
        None => {
            println!("{}", INFO);
            std::process::exit(1);
        }
    }
}

fn main() {
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .init();
    match run() {
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
