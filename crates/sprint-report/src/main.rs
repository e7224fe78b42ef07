//! Sprint report command line
//!
//! Loads the catalog from a data root, applies a link fragment and prints
//! the result: a new fragment, the decoded state, the request plan or the
//! shaped per-project report.

mod config;
mod logging;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use config::ReportConfig;
use sprint_data::{load_catalog, plan_requests, shape_project, Navigator, ResourceFetcher};
use sprint_state::{Catalog, OrderedSet, State, StateError};
use sprint_url::{decode, encode, feature_selection, parse_window, split_values, SelectionPatch};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

fn fragment_arg(required: bool) -> Arg {
    Arg::new("fragment")
        .long("fragment")
        .short('f')
        .required(required)
        .allow_hyphen_values(true)
        .help("Link fragment, e.g. '#project_alpha|format_line'")
}

fn token_arg(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .action(ArgAction::Append)
        .allow_hyphen_values(true)
        .help(help)
}

fn cli() -> Command {
    Command::new("sprint-report")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Sprint report links, request plans and shaped data")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file (default: sprint-report.toml if present)"),
        )
        .arg(
            Arg::new("data")
                .long("data")
                .global(true)
                .help("Directory or http(s) URL containing data/"),
        )
        .arg(
            Arg::new("language")
                .long("language")
                .global(true)
                .help("Label language"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Log filter when RUST_LOG is not set"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log as JSON lines"),
        )
        .subcommand(
            Command::new("encode")
                .about("Apply changes to a fragment and print the new fragment")
                .arg(fragment_arg(false))
                .arg(token_arg("project", "Projects or groups (~all, ~team, ~accessible, ~recent, ~support)"))
                .arg(token_arg("feature", "Features, optionally prefixed with team~ or project~"))
                .arg(token_arg("meta", "Sprint metadata columns"))
                .arg(Arg::new("format").long("format").help("Format name"))
                .arg(
                    Arg::new("count")
                        .long("count")
                        .allow_hyphen_values(true)
                        .help("Sprint window: last | first,last | first,current,last"),
                )
                .arg(
                    Arg::new("closed")
                        .long("closed")
                        .value_parser(value_parser!(bool))
                        .help("Only show closed sprints"),
                )
                .arg(
                    Arg::new("old")
                        .long("old")
                        .value_parser(value_parser!(bool))
                        .help("Include sprints older than the recent limit"),
                )
                .arg(token_arg("toggle", "Visible UI toggles")),
        )
        .subcommand(
            Command::new("decode")
                .about("Print the state a fragment selects")
                .arg(fragment_arg(true)),
        )
        .subcommand(
            Command::new("plan")
                .about("Print the resources a fragment needs")
                .arg(fragment_arg(true)),
        )
        .subcommand(
            Command::new("render")
                .about("Fetch and shape the data a fragment selects")
                .arg(fragment_arg(true)),
        )
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();

    let config = match resolve_config(&matches) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error:#}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.log_level, config.log_json);

    match run(&matches, &config).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!("{:#}", error);
            ExitCode::FAILURE
        }
    }
}

/// Configuration file values with command line overrides
fn resolve_config(matches: &ArgMatches) -> Result<ReportConfig> {
    let explicit = matches.get_one::<PathBuf>("config");
    let mut config = ReportConfig::discover(explicit.map(PathBuf::as_path))?;

    if let Some(data) = matches.get_one::<String>("data") {
        config = config.with_data_root(data.clone());
    }
    if let Some(language) = matches.get_one::<String>("language") {
        config = config.with_language(language.clone());
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        config = config.with_log_level(level.clone());
    }
    if matches.get_flag("log-json") {
        config = config.with_log_json(true);
    }
    Ok(config)
}

async fn run(matches: &ArgMatches, config: &ReportConfig) -> Result<String> {
    let fetcher = config.fetcher()?;
    let catalog = load_catalog(fetcher.as_ref())
        .await
        .with_context(|| format!("failed to load catalog from '{}'", config.data_root))?;
    let mut state = State::from_catalog(&catalog);

    let Some((command, args)) = matches.subcommand() else {
        bail!("no command given");
    };
    let report = args
        .get_one::<String>("fragment")
        .map(|fragment| decode(&mut state, fragment));

    match command {
        "encode" => {
            let patch = selection_patch(&state, args)?;
            Ok(encode(&state, &patch))
        }
        "decode" => to_json(&serde_json::json!({
            "state": state.summary(),
            "report": report,
            "fragment": encode(&state, &SelectionPatch::new()),
        })),
        "plan" => {
            let config = state.formatter.current().request_config();
            to_json(&plan_requests(&state, config))
        }
        "render" => render(&catalog, &state, fetcher, config).await,
        other => bail!("unknown command '{other}'"),
    }
}

async fn render(
    catalog: &Catalog,
    state: &State,
    fetcher: Arc<dyn ResourceFetcher>,
    config: &ReportConfig,
) -> Result<String> {
    let mut formats = state.formatter.clone();
    let formatter = formats.current();
    let plan = plan_requests(state, formatter.request_config());

    let navigator = Navigator::new(fetcher);
    let projects = navigator.navigate(&plan).await.context("failed to load sprint data")?;

    let locales = catalog.locales(&config.language, &config.fallback_language);
    let reports = projects
        .iter()
        .map(|data| shape_project(state, formatter, data, &locales, &config.placeholder))
        .collect::<Result<Vec<_>, _>>()
        .context("failed to shape sprint data")?;
    to_json(&reports)
}

/// Pending changes from the `encode` flags
fn selection_patch(state: &State, args: &ArgMatches) -> Result<SelectionPatch> {
    let mut patch = SelectionPatch::new();

    if let Some(tokens) = tokens(args, "project") {
        let projects: OrderedSet<String> = tokens
            .iter()
            .flat_map(|token| state.projects.resolve_token(token))
            .collect();
        if let Some(unknown) = projects.subtract(&state.projects.known_set()).first() {
            return Err(StateError::UnknownProject(unknown.clone()).into());
        }
        patch = patch.with_projects(projects);
    }
    if let Some(tokens) = tokens(args, "feature") {
        let mut selection = feature_selection(&tokens);
        selection.selected = selection.selected.intersect(&state.features.selectable());
        selection.team = selection.team.intersect(&selection.selected);
        selection.project = selection.project.intersect(&selection.selected);
        patch = patch.with_features(selection);
    }
    if let Some(tokens) = tokens(args, "meta") {
        let columns: OrderedSet<String> = tokens.into();
        patch = patch.with_meta(columns.intersect(&state.sprint_meta.known_set()));
    }
    if let Some(name) = args.get_one::<String>("format") {
        let mut formats = state.formatter.clone();
        formats.select(name)?;
        patch = patch.with_format(name.clone());
    }
    if let Some(count) = args.get_one::<String>("count") {
        let window = parse_window(&split_values(count)).context("invalid --count")?;
        patch = patch.with_count(window);
    }
    if let Some(closed) = args.get_one::<bool>("closed") {
        patch = patch.with_closed(*closed);
    }
    if let Some(old) = args.get_one::<bool>("old") {
        patch = patch.with_old(*old);
    }
    if let Some(tokens) = tokens(args, "toggle") {
        patch = patch.with_config(tokens.into());
    }
    Ok(patch)
}

/// Values of a repeatable flag, each split on the value separators
fn tokens(args: &ArgMatches, id: &str) -> Option<Vec<String>> {
    args.get_many::<String>(id)
        .map(|values| values.flat_map(|value| split_values(value)).collect())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize output")
}
