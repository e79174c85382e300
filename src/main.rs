use api_utils::{ApiClient, Remote};
use config::{load_or_create_config, Config, DEFAULT_CONFIG_PATH};
use confirm::{Prompt, StdinPrompt};
use error::{Error, Result};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

mod api_utils;
mod config;
mod confirm;
mod diff;
mod error;
mod file_utils;
mod filter_utils;
mod logging;
mod reconcile;
mod record;
mod tag_utils;
mod upload;

#[cfg(test)]
mod test_support;

const USAGE: &str = "Usage: mastodon_toolkit [--config <path>] <filters|tags>... <import|export>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    ExportFilters,
    ExportTags,
    ImportFilters,
    ImportTags,
    FollowTag,
}

impl Action {
    fn describe(self) -> &'static str {
        match self {
            Action::ExportFilters => "exporting filters",
            Action::ExportTags => "exporting tags",
            Action::ImportFilters => "importing filters",
            Action::ImportTags => "importing tags",
            Action::FollowTag => "following tag",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let (config_path, args) = split_config_flag(env::args().skip(1).collect());
    let mut prompt = StdinPrompt;

    let config = match load_or_create_config(&config_path, &mut prompt) {
        Ok(Some(cfg)) => cfg,
        Ok(None) => return ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init_tracing(&config.settings.log_level);

    let client = match ApiClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("error creating HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let actions = if args.is_empty() {
        match choose_from_menu(&mut prompt) {
            Ok(action) => vec![action],
            Err(e) => {
                eprintln!("error getting menu choice: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        parse_actions(&args)
    };

    run_actions(&actions, &config, &client, &mut prompt).await
}

/// Runs actions in order. A declined import moves on to the next action;
/// any other error stops the run.
async fn run_actions(
    actions: &[Action],
    config: &Config,
    remote: &dyn Remote,
    prompt: &mut dyn Prompt,
) -> ExitCode {
    if actions.is_empty() {
        eprintln!("{}", USAGE);
        return ExitCode::FAILURE;
    }

    for &action in actions {
        match run_action(action, config, remote, prompt).await {
            Ok(()) => {}
            Err(Error::ImportCancelled) => println!("Import cancelled."),
            Err(e) => {
                eprintln!("error {}: {}", action.describe(), e);
                return ExitCode::FAILURE;
            }
        }
    }

    println!("Action completed successfully.");
    ExitCode::SUCCESS
}

async fn run_action(
    action: Action,
    config: &Config,
    remote: &dyn Remote,
    prompt: &mut dyn Prompt,
) -> Result<()> {
    match action {
        Action::ExportFilters => {
            let count = filter_utils::export_filters(config, remote).await?;
            println!("Exported {} filter(s).", count);
        }
        Action::ExportTags => {
            let count = tag_utils::export_tags(config, remote).await?;
            println!("Exported {} tag(s).", count);
        }
        Action::ImportFilters => {
            let count = filter_utils::import_filters(config, remote, prompt).await?;
            println!("Imported {} filter(s).", count);
        }
        Action::ImportTags => {
            let count = tag_utils::import_tags(config, remote, prompt).await?;
            println!("Followed {} tag(s).", count);
        }
        Action::FollowTag => {
            let count = tag_utils::follow_tag(remote, prompt).await?;
            println!("Followed {} tag(s).", count);
        }
    }
    Ok(())
}

/// Pulls `--config <path>` out of the arguments so the path cannot be
/// mistaken for an action keyword.
fn split_config_flag(args: Vec<String>) -> (PathBuf, Vec<String>) {
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut rest = Vec::new();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" || arg == "-config" {
            if let Some(path) = iter.next() {
                config_path = PathBuf::from(path);
            }
        } else if let Some(path) = arg.strip_prefix("--config=") {
            config_path = PathBuf::from(path);
        } else {
            rest.push(arg);
        }
    }
    (config_path, rest)
}

/// One action per `filters`/`tags` argument. Direction is import when any
/// argument mentions "import", otherwise export when any mentions "export".
fn parse_actions(args: &[String]) -> Vec<Action> {
    let joined = args.join(" ");
    let import = joined.contains("import");
    let export = joined.contains("export");

    args.iter()
        .filter_map(|arg| match (arg.as_str(), import, export) {
            ("filters", true, _) => Some(Action::ImportFilters),
            ("tags", true, _) => Some(Action::ImportTags),
            ("filters", false, true) => Some(Action::ExportFilters),
            ("tags", false, true) => Some(Action::ExportTags),
            _ => None,
        })
        .collect()
}

fn choose_from_menu(prompt: &mut dyn Prompt) -> Result<Action> {
    println!("Export");
    println!(" 1. Filters");
    println!(" 2. Tags");
    println!("-");
    println!("Import");
    println!(" 3. Filters");
    println!(" 4. Tags");
    println!("-");
    println!(" 5. Follow a tag");
    println!("-");

    let input = prompt
        .ask("Enter your choice: ")
        .ok_or_else(|| Error::Config("no menu choice entered".to_string()))?;
    menu_action(&input)
}

fn menu_action(input: &str) -> Result<Action> {
    let choice: u32 = input
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid menu choice: {:?}", input.trim())))?;
    match choice {
        1 => Ok(Action::ExportFilters),
        2 => Ok(Action::ExportTags),
        3 => Ok(Action::ImportFilters),
        4 => Ok(Action::ImportTags),
        5 => Ok(Action::FollowTag),
        other => Err(Error::Config(format!("no menu entry {}", other))),
    }
}
