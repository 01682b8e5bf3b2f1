//! lumi - display gamma, color temperature and brightness
//!
//! Generates a profile whose video-card gamma table applies the requested
//! adjustment, installs it as the display's default and removes the profile
//! the previous run left behind.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use lumi_core::{exit, Config, LumiError, RawArgs, SwapOutcome};
use lumi_service::{LocalColorService, StoreConfig};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lumi")]
#[command(author, version, about = "Adjust display gamma, color temperature and brightness")]
#[command(long_about = "
Installs a generated color profile carrying a video-card gamma table (VCGT)
and makes it the display's default. Each run replaces the profile generated
by the previous one.

Examples:
  lumi 0.8                      # 80% brightness on the first display
  lumi 1 -t 4500                # warmer white point
  lumi 0.9 -g 1.2 -d 1          # second display, gamma 1.2
")]
struct Cli {
    /// Display brightness, clamped to [0, 1]
    #[arg(default_value = "1", allow_negative_numbers = true)]
    brightness: String,

    /// Display device index
    #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
    display: String,

    /// Target gamma correction
    #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
    gamma: String,

    /// Target color temperature in Kelvin
    #[arg(short, long, default_value = "6500", allow_negative_numbers = true)]
    temperature: String,

    /// Verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Profile store location (default: $LUMI_DATA_DIR or the user data directory)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

impl Cli {
    fn raw_args(&self) -> RawArgs {
        RawArgs {
            brightness: self.brightness.clone(),
            display: self.display.clone(),
            gamma: self.gamma.clone(),
            temperature: self.temperature.clone(),
        }
    }
}

fn main() -> ExitCode {
    let cli = match parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(code) => return ExitCode::from(code),
    };

    init_logging(cli.verbose);

    match run(&cli) {
        Ok(outcome) => {
            report(&outcome);
            ExitCode::from(exit::SUCCESS)
        }
        Err(e) => {
            eprintln!("lumi: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Parses the command line. Without arguments prints help; on `--help`,
/// `--version` or a parse error prints clap's message. Either way the exit
/// code to stop with is returned as the error.
fn parse_args<I, T>(args: I) -> Result<Cli, u8>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if args.len() < 2 {
        let _ = Cli::command().print_help();
        return Err(exit::USAGE);
    }
    Cli::try_parse_from(args).map_err(|e| {
        let _ = e.print();
        e.exit_code() as u8
    })
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn,lumi_core=info",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<SwapOutcome> {
    let config = Config::from_raw(&cli.raw_args())?;
    debug!("{}", config);

    let mut store = StoreConfig::from_env()
        .or_else(|e| cli.data_dir.clone().map(StoreConfig::new).ok_or(e))
        .context("cannot locate profile store")?;
    if let Some(dir) = &cli.data_dir {
        store.data_dir = dir.clone();
    }
    let service = LocalColorService::open(store).context("cannot open profile store")?;

    Ok(lumi_core::apply(&service, &config)?)
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<LumiError>()
        .map(LumiError::exit_code)
        .unwrap_or(exit::FAILURE)
}

fn report(outcome: &SwapOutcome) {
    println!("{}: {} is now the default profile", outcome.device.id, outcome.installed.info());
    if let Some(retired) = &outcome.retired {
        println!("{}: retired {}", outcome.device.id, retired);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["lumi", "-v"]).unwrap();
        assert_eq!(cli.raw_args(), RawArgs::default());
        assert_eq!(cli.verbose, 1);
        assert!(cli.data_dir.is_none());
    }

    #[test]
    fn test_all_options() {
        let cli = Cli::try_parse_from([
            "lumi", "0.4", "-d", "1", "--gamma", "2.2", "-t", "4000", "--data-dir", "/tmp/lumi",
        ])
        .unwrap();
        let config = Config::from_raw(&cli.raw_args()).unwrap();
        assert_eq!(config, Config::new(1, 2.2, 4000.0, 0.4).unwrap());
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/lumi")));
    }

    #[test]
    fn test_negative_brightness_is_clamped() {
        let cli = Cli::try_parse_from(["lumi", "-0.5"]).unwrap();
        assert_eq!(Config::from_raw(&cli.raw_args()).unwrap().brightness, 0.0);
    }

    #[test]
    fn test_configuration_errors_map_to_exit_code() {
        let cli = Cli::try_parse_from(["lumi", "-g", "fast"]).unwrap();
        let err = run(&cli).unwrap_err();
        assert_eq!(exit_code(&err), exit::CONFIG);
    }

    #[test]
    fn test_no_arguments_prints_help() {
        assert_eq!(parse_args(["lumi"]).err(), Some(exit::USAGE));
        let empty: [&str; 0] = [];
        assert_eq!(parse_args(empty).err(), Some(exit::USAGE));
    }

    #[test]
    fn test_parse_args_exit_codes() {
        assert_eq!(parse_args(["lumi", "--bogus"]).err(), Some(exit::USAGE));
        assert_eq!(parse_args(["lumi", "--help"]).err(), Some(exit::SUCCESS));
        assert_eq!(parse_args(["lumi", "0.5"]).unwrap().brightness, "0.5");
    }

    #[test]
    fn test_unknown_flag_is_usage_error() {
        let err = Cli::try_parse_from(["lumi", "--bogus"]).err().unwrap();
        assert_eq!(err.exit_code(), i32::from(exit::USAGE));
    }
}
