use std::process::ExitCode;

use clap::{CommandFactory as _, Parser};

#[macro_use]
extern crate log;

mod format;
mod grid;
mod image_util;
mod logger;
mod split;

use split::{SplitArgs, SplitError};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[clap(flatten)]
    args: SplitArgs,

    /// Print debug output.
    #[clap(short, long, action)]
    verbose: bool,
}

impl std::ops::Deref for Cli {
    type Target = SplitArgs;

    fn deref(&self) -> &Self::Target {
        &self.args
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(if cli.verbose { "debug" } else { "info" });
    debug!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match split::split(&cli) {
        Ok(summary) => {
            info!(
                "{}x{} image split into {} grid cells successfully, took {:.2?}",
                summary.width, summary.height, summary.cells, summary.elapsed
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");

            if matches!(err, SplitError::MissingInput) {
                if let Err(err) = Cli::command().print_help() {
                    debug!("unable to print usage: {err}");
                }
            }

            ExitCode::from(err.exit_code())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::format::PngCompression;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["gridsplit", "--input", "photo.png"]).unwrap();

        assert_eq!(cli.input.as_deref(), Some(Path::new("photo.png")));
        assert_eq!(cli.output, Path::new("output"));
        assert_eq!((cli.rows.get(), cli.cols.get()), (1, 1));
        assert_eq!(cli.jpeg_quality, 75);
        assert_eq!(cli.png_compression, PngCompression::Default);
        assert!(!cli.optimize && !cli.parallel && !cli.verbose);
    }

    #[test]
    fn short_flags() {
        let cli = Cli::try_parse_from([
            "gridsplit", "-i", "a.jpg", "-o", "tiles", "-r", "3", "-c", "4", "-v",
        ])
        .unwrap();

        assert_eq!(cli.output, Path::new("tiles"));
        assert_eq!((cli.rows.get(), cli.cols.get()), (3, 4));
        assert!(cli.verbose);
    }

    #[test]
    fn input_may_be_omitted_at_parse_time() {
        let cli = Cli::try_parse_from(["gridsplit"]).unwrap();
        assert!(cli.input.is_none());
    }

    #[test]
    fn rejects_zero_and_out_of_range_values() {
        assert!(Cli::try_parse_from(["gridsplit", "-i", "a.png", "--rows", "0"]).is_err());
        assert!(Cli::try_parse_from(["gridsplit", "-i", "a.png", "--cols", "-1"]).is_err());
        assert!(Cli::try_parse_from(["gridsplit", "-i", "a.png", "--jpeg-quality", "0"]).is_err());
        assert!(
            Cli::try_parse_from(["gridsplit", "-i", "a.png", "--png-compression", "max"]).is_err()
        );
    }

    #[test]
    fn png_compression_values() {
        let cli =
            Cli::try_parse_from(["gridsplit", "-i", "a.png", "--png-compression", "best"]).unwrap();
        assert_eq!(cli.png_compression, PngCompression::Best);
    }
}
