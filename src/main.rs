use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use stripe_methods::api::oauth::{self, AuthorizeOptions};
use stripe_methods::error::format_api_error;
use stripe_methods::resource::{classify, get_registry, Registry};
use stripe_methods::{ApiClient, Call, CallArg, ClientConfig, Host, Params, RequestOptions};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Call Stripe API resource operations from the command line
#[derive(Parser, Debug)]
#[command(name = "stripe-methods", version, about, long_about = None)]
struct Args {
    /// Secret API key (overrides STRIPE_API_KEY and the config file)
    #[arg(long)]
    api_key: Option<String>,

    /// API version to pin for this invocation
    #[arg(long)]
    api_version: Option<String>,

    /// Alternate base URL for the API host
    #[arg(long)]
    api_base: Option<String>,

    /// Extra resource descriptor files to load
    #[arg(long = "definitions")]
    definitions: Vec<PathBuf>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List resources, or the operations of one resource
    Resources {
        resource: Option<String>,
    },

    /// Call a resource operation
    Call {
        resource: String,
        operation: String,

        /// Url parameter values; with --positional, JSON objects may follow
        args: Vec<String>,

        /// Request payload as a JSON object
        #[arg(long)]
        data: Option<String>,

        /// Idempotency key, or "auto" to generate one
        #[arg(long)]
        idempotency_key: Option<String>,

        /// Extra header as NAME:VALUE (repeatable)
        #[arg(long = "header")]
        headers: Vec<String>,

        /// Request timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Classify trailing arguments by shape instead of using --data
        #[arg(long)]
        positional: bool,

        /// Print the resolved request instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// OAuth helpers for Connect platforms
    #[command(subcommand)]
    Oauth(OauthCommand),

    /// Show or change the saved configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum OauthCommand {
    /// Print an authorize URL
    AuthorizeUrl {
        /// Query parameter as KEY=VALUE (repeatable, order kept)
        #[arg(long = "param")]
        params: Vec<String>,

        /// Use the Express onboarding flow
        #[arg(long)]
        express: bool,
    },

    /// Exchange an authorization code for an access token
    Token {
        #[arg(long)]
        code: String,
    },

    /// Disconnect a connected account
    Deauthorize {
        #[arg(long)]
        stripe_user_id: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    Show,
    SetClientId { client_id: String },
    SetApiVersion { version: String },
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
    let tracing_level = level.to_tracing_level()?;

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
            eprintln!("Cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("stripe-methods {} started with log level: {:?}", stripe_methods::VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("stripe-methods").join("stripe-methods.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".stripe-methods").join("stripe-methods.log");
    }
    PathBuf::from("stripe-methods.log")
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    if let Err(err) = run(args).await {
        match err.downcast_ref::<stripe_methods::Error>() {
            Some(api_err) => {
                tracing::error!("{:?}", api_err);
                eprintln!("Error: {}", format_api_error(api_err));
            }
            None => eprintln!("Error: {err:?}"),
        }
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    // CLI > env > config file
    let mut config = ClientConfig::load().with_env_overrides();
    if let Some(key) = &args.api_key {
        config = config.with_api_key(key.as_str());
    }
    if let Some(version) = &args.api_version {
        config = config.with_api_version(version.as_str());
    }
    if let Some(base) = &args.api_base {
        config = config.with_base_url(Host::Api, base.as_str());
    }

    let registry = load_registry(&args.definitions)?;

    match args.command {
        Command::Resources { resource } => list_resources(&registry, resource.as_deref()),
        Command::Call {
            resource,
            operation,
            args: call_args,
            data,
            idempotency_key,
            headers,
            timeout_ms,
            positional,
            dry_run,
        } => {
            let options = build_options(idempotency_key, &headers, timeout_ms)?;
            let client = ApiClient::new(config)?.with_registry(registry);
            let method = client.method(&resource, &operation)?;

            let (call, _) = if positional {
                if data.is_some() {
                    anyhow::bail!("--data cannot be combined with --positional");
                }
                let mut values: Vec<CallArg> =
                    call_args.iter().map(String::as_str).map(parse_positional).collect();
                if options != RequestOptions::default() {
                    values.push(options.into());
                }
                classify(method.operation(), values)?
            } else {
                let mut call = Call::with_ids(call_args).options(options);
                if let Some(data) = data {
                    call = call.payload(parse_object(&data).context("--data must be a JSON object")?);
                }
                (call, None)
            };

            if dry_run {
                let request = method.prepare(call)?;
                println!("{}", serde_json::to_string_pretty(&request)?);
                return Ok(());
            }

            client.require_api_key(&call.options)?;
            let response = method.call(call).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Command::Oauth(command) => run_oauth(command, config, registry).await,
        Command::Config(command) => run_config(command, config),
    }
}

fn load_registry(definitions: &[PathBuf]) -> Result<Arc<Registry>> {
    if definitions.is_empty() {
        return Ok(get_registry());
    }

    let mut registry = (*get_registry()).clone();
    for path in definitions {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read descriptor file {:?}", path))?;
        registry
            .extend_from_json(&content)
            .with_context(|| format!("Invalid descriptor file {:?}", path))?;
        tracing::info!("Loaded descriptors from {:?}", path);
    }
    Ok(Arc::new(registry))
}

fn list_resources(registry: &Registry, resource: Option<&str>) -> Result<()> {
    let Some(key) = resource else {
        for key in registry.keys() {
            println!("{}", key);
        }
        return Ok(());
    };

    let resource_def = registry
        .get(key)
        .ok_or_else(|| stripe_methods::Error::UnknownResource(key.to_string()))?;
    for op in &resource_def.operations {
        let url_params = if op.url_params.is_empty() {
            String::new()
        } else {
            format!(" <{}>", op.url_params.join("> <"))
        };
        println!(
            "{:<24} {:<6} {}{}{}",
            op.name, op.method, resource_def.path, op.path, url_params
        );
    }
    Ok(())
}

fn build_options(
    idempotency_key: Option<String>,
    headers: &[String],
    timeout_ms: Option<u64>,
) -> Result<RequestOptions> {
    let mut options = RequestOptions::new();

    if let Some(key) = idempotency_key {
        let key = if key == "auto" {
            uuid::Uuid::new_v4().to_string()
        } else {
            key
        };
        options = options.with_idempotency_key(key);
    }

    for header in headers {
        let (name, value) = header
            .split_once(':')
            .with_context(|| format!("Header must be NAME:VALUE, got {}", header))?;
        options = options.with_header(name.trim(), value.trim_start());
    }

    if let Some(timeout) = timeout_ms {
        options = options.with_timeout_ms(timeout);
    }

    Ok(options)
}

/// JSON objects and arrays are decoded; everything else is passed as a string
fn parse_positional(arg: &str) -> CallArg {
    if arg.starts_with('{') || arg.starts_with('[') {
        if let Ok(value) = serde_json::from_str::<Value>(arg) {
            return value.into();
        }
    }
    arg.into()
}

fn parse_object(raw: &str) -> Result<Params> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("expected a JSON object"),
    }
}

fn parse_key_values(pairs: &[String]) -> Result<Params> {
    let mut params = Params::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("Parameter must be KEY=VALUE, got {}", pair))?;
        params.insert(key.to_string(), Value::from(value));
    }
    Ok(params)
}

async fn run_oauth(command: OauthCommand, config: ClientConfig, registry: Arc<Registry>) -> Result<()> {
    match command {
        OauthCommand::AuthorizeUrl { params, express } => {
            let params = parse_key_values(&params)?;
            let options = AuthorizeOptions { express };
            println!("{}", oauth::authorize_url(&config, Some(params), options));
        }
        OauthCommand::Token { code } => {
            let client = ApiClient::new(config)?.with_registry(registry);
            let mut params = Params::new();
            params.insert("grant_type".to_string(), Value::from("authorization_code"));
            params.insert("code".to_string(), Value::from(code));
            let token = oauth::token(&client, params, RequestOptions::new()).await?;
            println!("{}", serde_json::to_string_pretty(&token)?);
        }
        OauthCommand::Deauthorize { stripe_user_id } => {
            let client = ApiClient::new(config)?.with_registry(registry);
            let mut params = Params::new();
            params.insert("stripe_user_id".to_string(), Value::from(stripe_user_id));
            let result = oauth::deauthorize(&client, params, RequestOptions::new()).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}

fn run_config(command: ConfigCommand, config: ClientConfig) -> Result<()> {
    // Setters write the stored file only, never env or CLI overrides
    let mut stored = ClientConfig::load();
    match command {
        ConfigCommand::Show => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if let Some(key) = &config.api_key {
                println!("api_key: {}", key.masked());
            }
        }
        ConfigCommand::SetClientId { client_id } => {
            stored.set_client_id(&client_id)?;
            tracing::info!("Saved client id");
        }
        ConfigCommand::SetApiVersion { version } => {
            stored.set_api_version(&version)?;
            tracing::info!("Saved API version {}", version);
        }
    }
    Ok(())
}
