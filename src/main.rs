use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::exit;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use certstatus::config::OUTPUT_FORMATS;
use certstatus::format::{write_crl, write_json, write_ocsp};
use certstatus::{
    check_crl, check_ocsp, resolve_issuer, BlockingClient, CertStatus, Certificate, Config,
    CrlStatus,
};

const DEFAULT_CONFIG_FILE: &str = "certstatus.toml";

#[derive(Parser)]
#[command(name = "certstatus", version, author, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to a TOML configuration file (defaults to ./certstatus.toml if present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Output format
    #[arg(short, long, global = true, value_parser = OUTPUT_FORMATS)]
    output: Option<String>,

    /// Exit code to use when the certificate is revoked
    #[arg(long, global = true)]
    exit_code: Option<i32>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Print an example configuration file and exit
    #[arg(long)]
    generate_config: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Check revocation status with the certificate's OCSP responder
    Ocsp {
        /// PEM or DER encoded certificate
        path: PathBuf,
    },
    /// Check revocation status against the certificate's CRL
    Crl {
        /// PEM or DER encoded certificate
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.generate_config {
        print!("{}", Config::example_toml());
        exit(0);
    }

    let Some(command) = cli.command.as_ref() else {
        let _ = Cli::command().print_help();
        exit(1);
    };

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("[error] {}", err);
            exit(1);
        }
    };

    match run(command, &config) {
        Ok(true) => exit(config.exit_code.unwrap_or(0)),
        Ok(false) => exit(0),
        Err(err) => {
            eprintln!("[error] {}", err);
            exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("certstatus={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config, Box<dyn Error>> {
    load_config_from(cli, Path::new(DEFAULT_CONFIG_FILE))
}

/// Defaults, then the config file, then command-line flags.
///
/// `default_file` is read only when `--config` is absent and the file exists.
fn load_config_from(cli: &Cli, default_file: &Path) -> Result<Config, Box<dyn Error>> {
    let mut config = Config::default();

    let file = match &cli.config {
        Some(path) => Some(path.clone()),
        None if default_file.exists() => Some(default_file.to_path_buf()),
        None => None,
    };
    if let Some(path) = file {
        debug!(path = %path.display(), "loading configuration file");
        config = config.merge_with(Config::from_file(&path)?);
    }

    config = config.merge_with(Config::from_cli_args(
        cli.timeout,
        cli.output.clone(),
        cli.exit_code,
    ));
    config.validate()?;
    Ok(config)
}

/// Runs one check and prints the result. Returns whether the certificate is revoked.
fn run(command: &Command, config: &Config) -> Result<bool, Box<dyn Error>> {
    let path = match command {
        Command::Ocsp { path } | Command::Crl { path } => path,
    };

    let client = BlockingClient::from_config(config)?;
    let cert = Certificate::from_file(path)?;
    let issuer = resolve_issuer(&client, &cert)?;
    let json = config.output.as_deref() == Some("json");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let revoked = match command {
        Command::Ocsp { .. } => {
            let result = check_ocsp(&client, &cert, &issuer)?;
            if json {
                write_json(&mut out, &result)?;
            } else {
                write_ocsp(&mut out, &result)?;
            }
            result.status == CertStatus::Revoked
        }
        Command::Crl { .. } => {
            let result = check_crl(&client, &cert)?;
            if json {
                write_json(&mut out, &result)?;
            } else {
                write_crl(&mut out, &result)?;
            }
            result.status == CrlStatus::Revoked
        }
    };
    out.flush()?;

    Ok(revoked)
}
