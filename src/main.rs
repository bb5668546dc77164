mod render;

use lexiscore::config::CatalogConfig;
use lexiscore::{Context, Orchestrator, catalog};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

fn main() {
    env_logger::init();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let orchestrator = match load_orchestrator(config.catalog.as_ref()) {
        Ok(orchestrator) => orchestrator,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let ctx = Context { domain: config.domain, ..Context::default() };
    let report = match &config.engines {
        Some(names) => orchestrator.run_selected(&config.input, &ctx, names),
        None => orchestrator.run_all(&config.input, &ctx),
    };

    if config.json {
        match report.to_json_pretty() {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("error: failed to serialize report: {err}");
                std::process::exit(1);
            }
        }
    } else {
        render::print_report(&config.input, &report, config.color);
    }
}

struct CliConfig {
    input: String,
    catalog: Option<PathBuf>,
    engines: Option<Vec<String>>,
    domain: Option<String>,
    json: bool,
    color: bool,
}

fn load_orchestrator(path: Option<&PathBuf>) -> lexiscore::Result<Orchestrator> {
    match path {
        Some(path) => CatalogConfig::from_path(path)?.into_orchestrator(),
        None => catalog::default_orchestrator(),
    }
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut catalog: Option<PathBuf> = None;
    let mut engines: Option<Vec<String>> = None;
    let mut domain: Option<String> = None;
    let mut json = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("lexiscore {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--json" => json = true,
            "--config" | "-c" => {
                let value = args.next().ok_or_else(|| "error: --config expects a value".to_string())?;
                catalog = Some(PathBuf::from(value));
            }
            "--engines" | "-e" => {
                let value = args.next().ok_or_else(|| "error: --engines expects a value".to_string())?;
                engines = Some(parse_engine_list(&value)?);
            }
            "--domain" => {
                let value = args.next().ok_or_else(|| "error: --domain expects a value".to_string())?;
                domain = Some(value);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--config=") => {
                catalog = Some(PathBuf::from(arg.trim_start_matches("--config=")));
            }
            _ if arg.starts_with("--engines=") => {
                engines = Some(parse_engine_list(arg.trim_start_matches("--engines="))?);
            }
            _ if arg.starts_with("--domain=") => {
                domain = Some(arg.trim_start_matches("--domain=").to_string());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                input = Some(std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" "));
                break;
            }
        }
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    Ok(CliConfig { input, catalog, engines, domain, json, color })
}

fn parse_engine_list(value: &str) -> Result<Vec<String>, String> {
    let names: Vec<String> =
        value.split(',').map(str::trim).filter(|name| !name.is_empty()).map(str::to_string).collect();
    if names.is_empty() {
        return Err(format!("error: invalid --engines '{value}' (expected a comma-separated list)"));
    }
    Ok(names)
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "lexiscore {version}

Concurrent multi-engine text scoring.

Usage:
  lexiscore [OPTIONS] [--] <text...>
  echo <text> | lexiscore [OPTIONS]

Options:
  -c, --config <file>        Load an engine catalog from a JSON file instead of
                             the built-in one ({builtin}).
  -e, --engines <a,b,...>    Run only the named engines.
  --domain <tag>             Domain tag recorded with the request.
  --json                     Print the report as JSON.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Blank input is not an error: the default gate rejects it and the report says so.
Set RUST_LOG=debug for per-engine traces.

Exit codes:
  0  Success (including rejected input).
  1  Invalid catalog or configuration.
  2  Invalid arguments.
",
        version = env!("CARGO_PKG_VERSION"),
        builtin = catalog::ENGINE_NAMES.join(", ")
    )
}
