//! chartshot operator CLI
//!
//! Runs chart commands through the same pipeline the chat front end uses.

use anyhow::Context;
use chartshot_core::{ChartPipeline, ChartshotConfig, CommandParser};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

const DEFAULT_OUT: &str = "chart.png";

fn command_arg() -> Arg {
    Arg::new("command")
        .required(true)
        .num_args(1..)
        .help("Chart command, e.g. price vs tvl solana 1w 1d")
}

fn group_arg() -> Arg {
    Arg::new("group")
        .long("group")
        .action(ArgAction::SetTrue)
        .help("Treat the command as a group-chat message (prefix required)")
}

fn cli() -> Command {
    Command::new("chartshot")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render crypto metric charts from free-text commands")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML config file; CHARTSHOT_* variables override it"),
        )
        .subcommand(
            Command::new("render")
                .about("Capture a chart and write it as PNG")
                .arg(command_arg())
                .arg(group_arg())
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .default_value(DEFAULT_OUT)
                        .value_parser(value_parser!(PathBuf))
                        .help("Output file"),
                ),
        )
        .subcommand(
            Command::new("url")
                .about("Print the chart URL and fingerprint without capturing")
                .arg(command_arg())
                .arg(group_arg()),
        )
        .subcommand(
            Command::new("resolve")
                .about("Look up an asset by symbol or id")
                .arg(Arg::new("token").required(true).help("Symbol or asset id")),
        )
        .subcommand(
            Command::new("help-text")
                .about("Print the chart command reference")
                .arg(group_arg()),
        )
}

fn command_text(args: &ArgMatches) -> String {
    args.get_many::<String>("command")
        .map(|words| words.map(String::as_str).collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

fn load_config(args: &ArgMatches) -> anyhow::Result<ChartshotConfig> {
    let config = match args.get_one::<PathBuf>("config") {
        Some(path) => ChartshotConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ChartshotConfig::default(),
    };
    config.apply_env().context("invalid environment override")
}

fn pipeline(args: &ArgMatches) -> anyhow::Result<ChartPipeline> {
    let config = load_config(args)?;
    ChartPipeline::from_config(&config).context("failed to set up chart pipeline")
}

async fn render(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let pipeline = pipeline(args)?;
    let out = args
        .get_one::<PathBuf>("out")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT));

    let span = tracing::info_span!("render", out = %out.display());
    let result = pipeline
        .run(&command_text(args), args.get_flag("group"))
        .instrument(span)
        .await;
    match result {
        Ok(reply) => {
            std::fs::write(&out, &reply.image)
                .with_context(|| format!("failed to write {}", out.display()))?;
            tracing::info!(path = %out.display(), bytes = reply.image.len(), "chart saved");
            println!("{}", reply.title);
            println!("{}", reply.url);
            if let Some(summary) = &reply.summary {
                println!("\n{summary}");
            }
            println!("\nsaved {} ({} bytes)", out.display(), reply.image.len());
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            eprintln!("[{}] {failure}", failure.kind);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn url(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let pipeline = pipeline(args)?;
    match pipeline.plan(&command_text(args), args.get_flag("group")) {
        Ok(plan) => {
            println!("{}", plan.descriptor.title);
            println!("{}", plan.url);
            println!("fingerprint {}", plan.fingerprint);
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            eprintln!("[{}] {failure}", failure.kind);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn resolve(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let pipeline = pipeline(args)?;
    let token = args.get_one::<String>("token").map_or("", String::as_str);
    match pipeline.registry().resolve(token) {
        Some(record) => {
            println!("id      {}", record.id());
            println!("name    {}", record.display_name());
            println!("kind    {}", record.kind());
            println!("symbols {}", record.symbols().join(", "));
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("Asset '{token}' not found");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn help_output(group_prefix: &str, is_group: bool) -> String {
    format!(
        "{}\n\n{}",
        CommandParser::help_text_for(group_prefix),
        CommandParser::usage_for(group_prefix, is_group)
    )
}

fn help_text(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let config = load_config(args)?;
    println!("{}", help_output(&config.group_prefix, args.get_flag("group")));
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("render", args)) => render(args).await,
        Some(("url", args)) => url(args),
        Some(("resolve", args)) => resolve(args),
        Some(("help-text", args)) => help_text(args),
        _ => Ok(ExitCode::FAILURE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn command_words_are_joined() {
        let matches = cli()
            .try_get_matches_from(["chartshot", "render", "--group", "=art", "price", "vs", "tvl", "sol", "1w", "1d", "%"])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "render");
        assert!(args.get_flag("group"));
        assert_eq!(command_text(args), "=art price vs tvl sol 1w 1d %");
        assert_eq!(args.get_one::<PathBuf>("out").unwrap(), &PathBuf::from(DEFAULT_OUT));
    }

    #[test]
    fn global_config_reaches_subcommand() {
        let matches = cli()
            .try_get_matches_from(["chartshot", "url", "price", "sol", "1w", "1d", "--config", "chartshot.toml"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(
            args.get_one::<PathBuf>("config").unwrap(),
            &PathBuf::from("chartshot.toml")
        );
    }

    #[test]
    fn help_uses_configured_prefix() {
        let help = help_output("!chart", true);
        assert!(help.contains("start with '!chart '"));
        assert!(help.ends_with("Example: !chart price vs tvl solana 1w 1d"));
        assert!(help_output("!chart", false).contains("\nFormat: <metric>"));
    }

    #[test]
    fn missing_command_is_rejected() {
        assert!(cli().try_get_matches_from(["chartshot", "render"]).is_err());
    }
}
