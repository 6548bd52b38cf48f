use std::process::ExitCode;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ode_catalog::app::App;
use ode_catalog::catalog::OdeHttpClient;
use ode_catalog::config::ConfigLoader;
use ode_catalog::domain::{ObservationTime, QueryParameters};
use ode_catalog::error::OdeError;
use ode_catalog::output::{OutputMode, Report};

#[derive(Parser)]
#[command(name = "ode-catalog")]
#[command(about = "Query the ODE REST archive and list product files grouped by observation")]
#[command(version, author)]
struct Cli {
    #[arg(long, help = "PDS target name")]
    target: String,

    #[arg(long, help = "instrument host ID")]
    ihid: String,

    #[arg(long, help = "instrument ID")]
    iid: String,

    #[arg(long = "c1min", value_name = "WESTERNLON", allow_negative_numbers = true)]
    #[arg(help = "Min of first coordinate (in degrees by default)")]
    westernlon: Option<f64>,

    #[arg(long = "c1max", value_name = "EASTERNLON", allow_negative_numbers = true)]
    #[arg(help = "Max of first coordinate (in degrees by default)")]
    easternlon: Option<f64>,

    #[arg(long = "c2min", value_name = "MINLAT", allow_negative_numbers = true)]
    #[arg(help = "Min of second coordinate (in degrees by default)")]
    minlat: Option<f64>,

    #[arg(long = "c2max", value_name = "MAXLAT", allow_negative_numbers = true)]
    #[arg(help = "Max of second coordinate (in degrees by default)")]
    maxlat: Option<f64>,

    #[arg(long = "Time_min", value_name = "MINOBTIME")]
    #[arg(help = "Acquisition start time - format YYYY-MM-DDTHH:MM:SS.m")]
    minobtime: Option<ObservationTime>,

    #[arg(long = "Time_max", value_name = "MAXOBTIME")]
    #[arg(help = "Acquisition stop time - format YYYY-MM-DDTHH:MM:SS.m")]
    maxobtime: Option<ObservationTime>,

    #[arg(long = "Incidence_min", value_name = "MININANGLE", allow_negative_numbers = true)]
    #[arg(help = "Min incidence angle (solar zenithal angle)")]
    mininangle: Option<f64>,

    #[arg(long = "Incidence_max", value_name = "MAXINANGLE", allow_negative_numbers = true)]
    #[arg(help = "Max incidence angle (solar zenithal angle)")]
    maxinangle: Option<f64>,

    #[arg(long = "Emerge_min", value_name = "MINEMANGLE", allow_negative_numbers = true)]
    #[arg(help = "Min emerge angle")]
    minemangle: Option<f64>,

    #[arg(long = "Emerge_max", value_name = "MAXEMANGLE", allow_negative_numbers = true)]
    #[arg(help = "Max emerge angle")]
    maxemangle: Option<f64>,

    #[arg(long = "Phase_min", value_name = "MINPHANGLE", allow_negative_numbers = true)]
    #[arg(help = "Min phase angle")]
    minphangle: Option<f64>,

    #[arg(long = "Phase_max", value_name = "MAXPJANGLE", allow_negative_numbers = true)]
    #[arg(help = "Max phase angle")]
    maxpjangle: Option<f64>,

    #[arg(long, help = "log file, default stdout")]
    log: Option<Utf8PathBuf>,

    #[arg(long, help = "print the result as JSON")]
    json: bool,

    #[arg(long, help = "config file (default: ode-catalog.json if present)")]
    config: Option<String>,

    #[arg(long, value_name = "SECS", help = "request timeout in seconds")]
    timeout: Option<u64>,

    #[arg(long, help = "print the query URL without contacting the archive")]
    dry_run: bool,
}

impl Cli {
    fn query_parameters(&self) -> QueryParameters {
        QueryParameters {
            target: self.target.clone(),
            ihid: self.ihid.clone(),
            iid: self.iid.clone(),
            westernlon: self.westernlon,
            easternlon: self.easternlon,
            minlat: self.minlat,
            maxlat: self.maxlat,
            minobtime: self.minobtime.clone(),
            maxobtime: self.maxobtime.clone(),
            mininangle: self.mininangle,
            maxinangle: self.maxinangle,
            minemangle: self.minemangle,
            maxemangle: self.maxemangle,
            minphangle: self.minphangle,
            maxpjangle: self.maxpjangle,
        }
    }
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<OdeError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &OdeError) -> u8 {
    match error {
        OdeError::UnsupportedCombination { .. } | OdeError::InvalidObservationTime(_) => 2,
        OdeError::Http(_) | OdeError::Status { .. } => 3,
        OdeError::XmlParse(_) => 4,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ConfigLoader::resolve(cli.config.as_deref())?;
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
    }

    let client = OdeHttpClient::new(config.timeout)?;
    let app = App::new(client, config);
    let params = cli.query_parameters();

    if cli.dry_run {
        let plan = app.plan(&params)?;
        println!("{}", plan.url);
        return Ok(());
    }

    let outcome = app.query(&params)?;
    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    Report::emit(&outcome, mode, cli.log.as_deref())?;
    Ok(())
}
