// Fbxmon - Freebox telemetry exporter for Graphite and InfluxDB
//
// Copyright 2022 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use clap::Parser;
use fbxmon::client::{self, ApiClient, ApiConfig, AppIdentity};
use fbxmon::credentials::{self, CredentialStore};
use fbxmon::format::{Graphite, InfluxDb, LineFormat, OutputFormat, DEFAULT_PREFIX};
use fbxmon::register::{self, Registration};
use fbxmon::telemetry::{Categories, Collector};
use std::error::Error;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;
use tracing::{Instrument, Level};

const DEFAULT_LOG_LEVEL: Level = Level::WARN;
const DEFAULT_DISK_ID: u32 = 0;

/// Export Freebox telemetry in Graphite or InfluxDB line formats
///
/// Log in to the local API of a Freebox server, read connection statistics (and
/// optionally system, switch, and disk statistics), and print them to standard
/// output in the Graphite plaintext protocol or the InfluxDB line protocol.
///
/// The application must first be registered with `--register` and approved on
/// the front panel of the Freebox server.
#[derive(Debug, Parser)]
#[command(name = "fbxmon", version = clap::crate_version!())]
struct FbxmonApplication {
    /// Register the application with the Freebox and save the issued credentials
    #[arg(short, long, conflicts_with = "register_status")]
    register: bool,

    /// Show the status of the registration of the application with the Freebox
    #[arg(short = 's', long)]
    register_status: bool,

    /// Host (and optionally port) of the Freebox API
    #[arg(short, long, default_value = client::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Include the link state of each switch port
    #[arg(short = 'S', long)]
    status_switch: bool,

    /// Include traffic statistics of each switch port
    #[arg(short = 'P', long)]
    status_ports: bool,

    /// Include system temperatures, fan speed, and uptime
    #[arg(short = 'H', long)]
    status_sys: bool,

    /// Include usage of the internal disk
    #[arg(short = 'D', long)]
    internal_disk_usage: bool,

    /// ID of the disk to report usage for with --internal-disk-usage
    #[arg(long, default_value_t = DEFAULT_DISK_ID)]
    disk_id: u32,

    /// Output format for metrics
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Graphite)]
    format: OutputFormat,

    /// Graphite prefix or InfluxDB measurement name for metrics
    #[arg(long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Application name announced when registering
    #[arg(short = 'n', long, default_value = client::DEFAULT_APP_NAME)]
    appname: String,

    /// Application ID announced when registering
    #[arg(short = 'i', long, default_value = client::DEFAULT_APP_ID)]
    appid: String,

    /// Device name announced when registering
    #[arg(short = 'd', long, default_value = client::DEFAULT_DEVICE_NAME)]
    devicename: String,

    /// Path to the credentials file. Defaults to `fbxmon/credentials.toml` in the
    /// user configuration directory
    #[arg(short = 'c', long)]
    credentials: Option<PathBuf>,

    /// Logging verbosity. Allowed values are 'trace', 'debug', 'info', 'warn', and 'error'
    /// (case insensitive)
    #[arg(long, default_value_t = DEFAULT_LOG_LEVEL)]
    log_level: Level,
}

impl FbxmonApplication {
    fn categories(&self) -> Categories {
        Categories {
            switch_status: self.status_switch,
            switch_ports: self.status_ports,
            system: self.status_sys,
            disk: if self.internal_disk_usage {
                Some(self.disk_id)
            } else {
                None
            },
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let opts = FbxmonApplication::parse();
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(opts.log_level)
            .with_writer(io::stderr)
            .finish(),
    )
    .expect("failed to set tracing subscriber");

    if let Err(e) = run(opts).instrument(tracing::info_span!("fbxmon")).await {
        tracing::error!(message = "run failed", error = %e);
        process::exit(1);
    }
}

async fn run(opts: FbxmonApplication) -> Result<(), Box<dyn Error + Send + Sync>> {
    let identity = AppIdentity {
        app_id: opts.appid.clone(),
        app_name: opts.appname.clone(),
        device_name: opts.devicename.clone(),
        ..AppIdentity::default()
    };

    let client = ApiClient::new(ApiConfig::new(opts.endpoint.clone(), identity));
    let path = opts.credentials.clone().unwrap_or_else(credentials::default_path);
    let mut store = CredentialStore::open(&path)?;

    if opts.register {
        match register::register(&client, &mut store).await? {
            Registration::Requested(creds) => {
                println!("Registration requested with {}", opts.endpoint);
                println!("[Track ID] {}", creds.track_id);
                println!("[Saved to] {}", store.path().display());
                println!("Press the right arrow on the Freebox Server and validate the app registration");
            }
            Registration::AlreadyRegistered(creds) => {
                println!(
                    "Already registered with {} (track ID {}), nothing to do",
                    opts.endpoint, creds.track_id
                );
            }
        }

        return Ok(());
    }

    if opts.register_status {
        let status = register::status(&client, &store).await?;
        println!("Registration status for {}: {}", opts.endpoint, status);
        return Ok(());
    }

    let creds = store.require(&opts.endpoint)?;
    let session = fbxmon::auth::open_session(&client, creds).await?;
    let sample = Collector::new(&client, &session, opts.categories()).collect().await?;
    let format: Box<dyn LineFormat> = match opts.format {
        OutputFormat::Graphite => Box::new(Graphite::new(opts.prefix.clone())),
        OutputFormat::InfluxDb => Box::new(InfluxDb::new(opts.prefix.clone(), opts.endpoint.clone())),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    format.write_sample(&sample, &mut out)?;
    out.flush()?;

    tracing::info!(message = "wrote metrics", count = sample.len(), format = ?opts.format);
    Ok(())
}
