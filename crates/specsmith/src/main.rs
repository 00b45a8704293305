//! specsmith: OpenAPI 3.0 document tooling.
//!
//! Validates, imports, exports and normalizes OpenAPI documents using the
//! editor core.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use specsmith_lib::commands::{
    run_export, run_import, run_normalize, run_templates, run_validate, OutputFormat,
};
use specsmith_telemetry::{log_startup, LogFormat, Telemetry, TelemetryConfig};

#[derive(Parser, Debug)]
#[command(name = "specsmith", about = "OpenAPI 3.0 document tooling", version)]
struct Cli {
    /// Log level filter (RUST_LOG overrides it).
    #[arg(long, global = true, env = "SPECSMITH_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Log format (pretty or json).
    #[arg(long, global = true, env = "SPECSMITH_LOG_FORMAT", default_value = "pretty")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate OpenAPI spec(s) against the OpenAPI 3.0 rules.
    Validate {
        /// Input spec file(s) (YAML or JSON).
        #[arg(short, long, required = true, num_args = 1..)]
        spec: Vec<String>,

        /// Output format.
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Import an OpenAPI spec into an editor document snapshot (JSON).
    Import {
        /// Input spec file (YAML or JSON).
        #[arg(short, long)]
        spec: String,

        /// Output snapshot path (stdout when omitted).
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Render an editor document snapshot as OpenAPI YAML.
    Export {
        /// Input snapshot file (JSON).
        #[arg(short, long)]
        document: String,

        /// Output YAML path (stdout when omitted).
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import a spec and write it back in canonical form.
    Normalize {
        /// Input spec file (YAML or JSON).
        #[arg(short, long)]
        spec: String,

        /// Output YAML path (stdout when omitted).
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List schema templates, or print one.
    Templates {
        /// Template key to print.
        #[arg(short, long)]
        key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(log_format) = LogFormat::parse(&cli.log_format) else {
        eprintln!("error: invalid log format '{}' (expected pretty or json)", cli.log_format);
        return ExitCode::from(2);
    };
    let config = TelemetryConfig::new()
        .with_log_level(&cli.log_level)
        .with_log_format(log_format);
    let telemetry = match Telemetry::init(config) {
        Ok(telemetry) => telemetry,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(1);
        }
    };
    log_startup!(
        service = %telemetry.config().service_name,
        version = env!("CARGO_PKG_VERSION"),
        "starting"
    );

    match cli.command {
        Commands::Validate { spec, format } => run_validate(&spec, format).await,
        Commands::Import { spec, output } => run_import(&spec, output.as_deref()),
        Commands::Export { document, output } => run_export(&document, output.as_deref()),
        Commands::Normalize { spec, output } => run_normalize(&spec, output.as_deref()),
        Commands::Templates { key } => run_templates(key.as_deref()),
    }
}
