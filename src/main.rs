use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lifctl::config::Config;
use lifctl::error::{Diagnostic, ErrorHandler};
use lifctl::interfaces::{
    create_ip_interface, delete_ip_interface, get_ip_interface, get_ip_interfaces,
    IpInterfaceBody, IpInterfaceFilter, IpInterfaceRecord, Scope,
};
use lifctl::ontap::auth::Credentials;
use lifctl::ontap::client::OntapClient;
use lifctl::ontap::http::status_hint;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Manage ONTAP network IP interfaces
#[derive(Parser, Debug)]
#[command(name = "lifctl", version = lifctl::VERSION, about, long_about = None)]
struct Args {
    /// Cluster management address (host, host:port or URL)
    #[arg(long, global = true)]
    host: Option<String>,

    /// API user
    #[arg(short, long, global = true)]
    username: Option<String>,

    /// API password
    #[arg(long, global = true, env = "ONTAP_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    insecure: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Log level for debugging
    #[arg(long, global = true, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show one interface (cluster scope unless --svm is given)
    Get {
        name: String,
        #[arg(long)]
        svm: Option<String>,
    },
    /// List interfaces, optionally filtered
    List {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        svm: Option<String>,
        #[arg(long)]
        scope: Option<Scope>,
        #[arg(long)]
        uuid: Option<String>,
    },
    /// Create an interface
    Create {
        name: String,
        /// Owning SVM (defaults to the configured default SVM)
        #[arg(long)]
        svm: Option<String>,
        #[arg(long)]
        address: String,
        /// Netmask length in bits
        #[arg(long)]
        netmask: i64,
        #[arg(long)]
        home_node: Option<String>,
        #[arg(long, requires = "home_port_node")]
        home_port: Option<String>,
        #[arg(long, requires = "home_port")]
        home_port_node: Option<String>,
    },
    /// Delete interfaces by uuid
    Delete {
        #[arg(required = true)]
        uuids: Vec<String>,
    },
    /// Show or change saved settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    SetHost { host: String },
    SetUsername { username: String },
    SetDefaultSvm { svm: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().ok();
    let filter = match (env_filter, level.to_tracing_level()) {
        (Some(filter), _) => filter,
        (None, Some(level)) => EnvFilter::new(level.as_str()),
        (None, None) => return None,
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("lifctl started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("lifctl").join("lifctl.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".lifctl").join("lifctl.log");
    }
    PathBuf::from("lifctl.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let mut config = Config::load();

    if let Command::Config { action } = &args.command {
        match action {
            Some(ConfigAction::SetHost { host }) => config.set_host(host)?,
            Some(ConfigAction::SetUsername { username }) => config.set_username(username)?,
            Some(ConfigAction::SetDefaultSvm { svm }) => config.set_default_svm(svm)?,
            None => {}
        }
        print_output(&config, args.output, |c| {
            println!("host:           {}", c.host.as_deref().unwrap_or("-"));
            println!("username:       {}", c.effective_username());
            println!("validate_certs: {}", c.effective_validate_certs());
            println!("timeout_secs:   {}", c.effective_timeout_secs());
            println!("default_svm:    {}", c.default_svm.as_deref().unwrap_or("-"));
        })?;
        return Ok(ExitCode::SUCCESS);
    }

    let client = connect(&args, &config)?;
    let handler = ErrorHandler::new("ip_interface");

    let outcome = match args.command {
        Command::Get { name, svm } => {
            let svm = svm.unwrap_or_default();
            get_ip_interface(&handler, &client, &name, &svm)
                .await
                .and_then(|record| {
                    print_records(std::slice::from_ref(&record), args.output)
                        .map_err(|e| local_error(&handler, e))
                })
        }
        Command::List {
            name,
            svm,
            scope,
            uuid,
        } => {
            let filter = IpInterfaceFilter {
                name: name.unwrap_or_default(),
                scope,
                svm_name: svm.unwrap_or_default(),
                uuid: uuid.unwrap_or_default(),
            };
            let filter = (filter != IpInterfaceFilter::default()).then_some(filter);
            get_ip_interfaces(&handler, &client, filter.as_ref())
                .await
                .and_then(|records| {
                    print_records(&records, args.output).map_err(|e| local_error(&handler, e))
                })
        }
        Command::Create {
            name,
            svm,
            address,
            netmask,
            home_node,
            home_port,
            home_port_node,
        } => {
            let svm = svm
                .or_else(|| config.default_svm.clone())
                .context("No SVM given. Pass --svm or run 'lifctl config set-default-svm'")?;

            let mut body = IpInterfaceBody::new(&name, &svm, &address, netmask);
            if let Some(node) = home_node {
                body = body.with_home_node(&node);
            }
            if let (Some(port), Some(node)) = (home_port, home_port_node) {
                body = body.with_home_port(&port, &node);
            }

            create_ip_interface(&handler, &client, &body)
                .await
                .and_then(|record| {
                    print_records(std::slice::from_ref(&record), args.output)
                        .map_err(|e| local_error(&handler, e))
                })
        }
        Command::Delete { uuids } => {
            // Each delete is independent; run them side by side
            let results = futures::future::join_all(
                uuids
                    .iter()
                    .map(|uuid| delete_ip_interface(&handler, &client, uuid)),
            )
            .await;

            for (uuid, result) in uuids.iter().zip(&results) {
                if result.is_ok() {
                    println!("deleted {}", uuid);
                }
            }
            results.into_iter().find_map(Result::err).map_or(Ok(()), Err)
        }
        Command::Config { .. } => Ok(()),
    };

    if outcome.is_err() {
        for diag in handler.diagnostics() {
            report(&diag);
        }
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn connect(args: &Args, config: &Config) -> Result<OntapClient> {
    let host = args
        .host
        .clone()
        .or_else(|| config.effective_host())
        .context("No cluster configured. Set ONTAP_HOST, use --host or 'lifctl config set-host'")?;
    let username = args
        .username
        .clone()
        .unwrap_or_else(|| config.effective_username());
    let credentials = Credentials::resolve(&username, args.password.as_deref())?;

    let validate_certs = !args.insecure && config.effective_validate_certs();
    let timeout = Duration::from_secs(args.timeout.unwrap_or_else(|| config.effective_timeout_secs()));

    tracing::info!("Using cluster: {}, user: {}", host, username);
    OntapClient::new(&host, credentials, validate_certs, timeout)
}

/// Output failures are reported like adapter failures
fn local_error(handler: &ErrorHandler, err: anyhow::Error) -> Diagnostic {
    handler.make_and_report_error(
        "error writing output",
        format!("{:#}", err),
        lifctl::error::ErrorKind::Encode(err.to_string()),
    )
}

fn report(diag: &Diagnostic) {
    eprintln!("Error: {}: {}", diag.summary, diag.detail);
    if let Some(hint) = diag.status_code().and_then(status_hint) {
        eprintln!("  hint: {}", hint);
    }
}

fn print_records(records: &[IpInterfaceRecord], format: OutputFormat) -> Result<()> {
    print_output(records, format, |records| {
        println!(
            "{:<24} {:<8} {:<16} {:<20} {}",
            "NAME", "SCOPE", "SVM", "ADDRESS", "UUID"
        );
        for r in records {
            let address = r
                .ip
                .as_ref()
                .map(|ip| format!("{}/{}", ip.address, ip.netmask))
                .unwrap_or_else(|| "-".to_string());
            let svm = if r.svm_name.is_empty() { "-" } else { &r.svm_name };
            println!(
                "{:<24} {:<8} {:<16} {:<20} {}",
                r.name, r.scope, svm, address, r.uuid
            );
        }
    })
}

fn print_output<T: Serialize + ?Sized>(
    value: &T,
    format: OutputFormat,
    table: impl FnOnce(&T),
) -> Result<()> {
    match format {
        OutputFormat::Table => table(value),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(value).context("Failed to render JSON")?
        ),
        OutputFormat::Yaml => print!(
            "{}",
            serde_yaml::to_string(value).context("Failed to render YAML")?
        ),
    }
    Ok(())
}
