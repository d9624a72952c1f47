use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use sms_outbox::{Environment, JsonFileStore, Messenger, SmsConfig, SmsRuProvider, logging};

#[derive(Debug, Parser)]
#[command(name = "sms-outbox", version, about = "Send and record SMS messages")]
struct Cli {
    /// TOML config file; environment variables are used when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// JSON file holding outbound records.
    #[arg(short, long, global = true, default_value = "outbox.json")]
    store: PathBuf,

    /// Emit JSON log lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Record a message for each recipient and deliver it in production.
    Send {
        /// Recipient numbers; punctuation is stripped.
        #[arg(short, long = "to", required = true, num_args = 1..)]
        to: Vec<String>,

        #[arg(short, long)]
        message: String,

        /// Override the configured environment.
        #[arg(short, long)]
        environment: Option<Environment>,

        /// Upper-case the message before sending.
        #[arg(long)]
        upper: bool,
    },
    /// Print stored records.
    List {
        /// Only records that were never delivered.
        #[arg(long)]
        unsent: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.json_logs {
        logging::init_json_logging(cli.verbose);
    } else {
        logging::init_logging(cli.verbose);
    }

    match cli.command {
        Command::Send {
            to,
            message,
            environment,
            upper,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let environment = environment.unwrap_or(config.environment);
            let provider =
                SmsRuProvider::from_config(&config).context("failed to set up SMS.RU provider")?;
            let store = JsonFileStore::open(&cli.store)
                .with_context(|| format!("failed to open {}", cli.store.display()))?;

            let mut builder = Messenger::builder(store)
                .provider(provider)
                .environment(environment);
            if upper {
                builder = builder.decorator(|text| text.to_uppercase());
            }
            let mut messenger = builder.build()?;
            let report = messenger.push(&to, message)?;

            println!(
                "{} record(s) written to {} ({})",
                report.record_ids.len(),
                cli.store.display(),
                if report.delivered {
                    "delivered"
                } else {
                    "recorded only"
                }
            );
        }
        Command::List { unsent } => {
            let store = JsonFileStore::open(&cli.store)
                .with_context(|| format!("failed to open {}", cli.store.display()))?;
            for record in store.records().iter().filter(|r| !unsent || !r.sent) {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    record.id,
                    record.created_at.to_rfc3339(),
                    record.phone,
                    if record.sent { "sent" } else { "unsent" },
                    record.message
                );
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<SmsConfig> {
    match path {
        Some(path) => SmsConfig::from_toml_file(path)
            .with_context(|| format!("failed to load {}", path.display())),
        None => SmsConfig::from_env().context("failed to read SMS.RU settings from environment"),
    }
}
