//! `deployer` command-line entry point

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use deployer_cli::commands::{self, DeployOutcome};
use deployer_cli::{logging, DeployerConfig, DeploymentInput};
use deployer_client::DeployerClient;
use deployer_form::{Form, ValidationMode};
use std::path::PathBuf;
use std::time::Duration;

fn file_arg() -> Arg {
    Arg::new("file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Deployment input (.json or .toml)")
}

fn mode_arg() -> Arg {
    Arg::new("mode")
        .long("mode")
        .value_parser(["simple", "expert"])
        .help("Override the mode named in the input file")
}

fn cli() -> Command {
    Command::new("deployer")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Validate and submit node deployments")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Config file (default: ./deployer.toml if present)"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .help("Backend base url"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Log level when RUST_LOG is unset"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("check")
                .about("Check a deployment input without contacting the backend")
                .arg(file_arg())
                .arg(mode_arg()),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate every field against the backend")
                .arg(file_arg())
                .arg(mode_arg())
                .arg(
                    Arg::new("wait")
                        .long("wait")
                        .default_value("10")
                        .value_parser(value_parser!(u64))
                        .help("Seconds to wait for responses"),
                ),
        )
        .subcommand(
            Command::new("deploy")
                .about("Submit a deployment and follow its stages")
                .arg(file_arg())
                .arg(mode_arg()),
        )
        .subcommand(Command::new("watch").about("Print status updates pushed by the backend"))
        .subcommand(
            Command::new("predict")
                .about("Score raw configuration text")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Configuration text file"),
                ),
        )
        .subcommand(
            Command::new("chat")
                .about("Ask the assistant")
                .arg(Arg::new("message").required(true).num_args(1..).help("Message text")),
        )
        .subcommand(
            Command::new("actions")
                .about("List backend actions")
                .arg(Arg::new("query").help("Filter by substring")),
        )
        .subcommand(
            Command::new("run")
                .about("Run a backend action")
                .arg(Arg::new("action").required(true).help("Action name"))
                .arg(
                    Arg::new("config-file")
                        .long("config-file")
                        .value_parser(value_parser!(PathBuf))
                        .help("Configuration text sent with the action"),
                ),
        )
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<DeployerConfig> {
    let mut config = DeployerConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?
        .with_env(|key| std::env::var(key).ok());
    if let Some(url) = matches.get_one::<String>("base-url") {
        config = config.with_base_url(url.clone());
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        config = config.with_log_level(level.clone());
    }
    if matches.get_flag("log-json") {
        config = config.with_log_json(true);
    }
    Ok(config)
}

fn read_form(args: &ArgMatches) -> anyhow::Result<Form> {
    let path = args
        .get_one::<PathBuf>("file")
        .context("missing input file")?;
    let mode = args
        .get_one::<String>("mode")
        .map(|m| m.parse::<ValidationMode>())
        .transpose()?;
    Ok(DeploymentInput::read(path)?.into_form(mode)?)
}

fn client(config: &DeployerConfig) -> anyhow::Result<DeployerClient> {
    Ok(DeployerClient::new(config.client_config()?)?)
}

async fn run(matches: ArgMatches) -> anyhow::Result<bool> {
    let config = load_config(&matches)?;
    logging::init_logging(&config.log_level, config.log_json);
    tracing::debug!(base_url = %config.base_url, "Configuration loaded");

    match matches.subcommand() {
        Some(("check", args)) => {
            let report = commands::check(&read_form(args)?);
            print!("{}", report.render());
            Ok(report.is_ok())
        }
        Some(("validate", args)) => {
            let wait = Duration::from_secs(*args.get_one::<u64>("wait").unwrap_or(&10));
            let report =
                commands::validate_remote(&client(&config)?, read_form(args)?, &config, wait)
                    .await?;
            print!("{}", report.feedback);
            for alert in &report.alerts {
                eprintln!("{alert}");
            }
            if report.timed_out {
                eprintln!("Some fields were not validated within {}s", wait.as_secs());
            }
            println!(
                "{}",
                if report.valid { "All fields valid." } else { "Configuration has errors." }
            );
            Ok(report.valid)
        }
        Some(("deploy", args)) => {
            let outcome = commands::deploy(&client(&config)?, read_form(args)?, &config, |stage| {
                println!("{stage}");
            })
            .await?;
            match outcome {
                DeployOutcome::Blocked { feedback } => {
                    print!("{feedback}");
                    Ok(false)
                }
                DeployOutcome::Submitted { alerts } => {
                    for alert in alerts {
                        println!("{alert}");
                    }
                    Ok(true)
                }
            }
        }
        Some(("watch", _)) => {
            commands::watch(&config.status_base()?, config.notification_ttl(), |update| {
                println!("[{}] {}", update.status, update.message);
            })
            .await?;
            Ok(true)
        }
        Some(("predict", args)) => {
            let path = args.get_one::<PathBuf>("file").context("missing file")?;
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let prediction = commands::predict(&client(&config)?, &text).await?;
            println!("{prediction}");
            Ok(true)
        }
        Some(("chat", args)) => {
            let message = args
                .get_many::<String>("message")
                .map(|words| words.cloned().collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            let transcript = commands::chat(&client(&config)?, &message).await?;
            print!("{}", transcript.render());
            Ok(!transcript.is_empty())
        }
        Some(("actions", args)) => {
            let query = args.get_one::<String>("query").map_or("", String::as_str);
            for action in commands::suggest_actions(query) {
                println!("{action}");
            }
            Ok(true)
        }
        Some(("run", args)) => {
            let action = args.get_one::<String>("action").context("missing action")?;
            let config_text = match args.get_one::<PathBuf>("config-file") {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => String::new(),
            };
            let (selected, result) =
                commands::run_action(&client(&config)?, action, &config_text).await?;
            println!("{selected}");
            println!("{result}");
            Ok(true)
        }
        _ => Ok(false),
    }
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();
    match run(matches).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("Error: {error:#}");
            std::process::exit(1);
        }
    }
}
