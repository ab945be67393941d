//! Command handlers

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::FilterProcessor;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings, LOCAL_CONFIG_FILE};
use crate::domain::DocTree;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::TreeFormat;
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Filter {
            tree,
            expression,
            documented_only,
            include_private,
            include_special,
        }) => {
            check_tree_path(tree)?;
            let overrides = FilterOverrides {
                expression: expression.clone(),
                documented_only: *documented_only,
                include_private: *include_private,
                include_special: *include_special,
            };
            cmd_filter(&container(cli)?, tree, overrides)
        }
        Some(Commands::Run { tree }) => {
            check_tree_path(tree)?;
            cmd_run(&container(cli)?, tree)
        }
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `docfilter --help`".to_string(),
        )),
    }
}

/// Rejects tree paths whose extension names no supported format.
fn check_tree_path(tree: &Path) -> CliResult<()> {
    match TreeFormat::from_path(tree) {
        Some(_) => Ok(()),
        None => Err(CliError::InvalidArgs(format!(
            "{}: tree file must end in .json or .toml",
            tree.display()
        ))),
    }
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    let settings = Settings::load(cli.config.as_deref())?;
    Ok(ServiceContainer::new(settings))
}

/// Command-line adjustments applied on top of the configured filter.
#[derive(Debug, Default)]
struct FilterOverrides {
    expression: Option<String>,
    documented_only: bool,
    include_private: bool,
    include_special: bool,
}

#[instrument(skip(container))]
fn cmd_filter(container: &ServiceContainer, tree: &Path, overrides: FilterOverrides) -> CliResult<()> {
    let mut settings = (*container.settings).clone();
    let config = settings.first_filter_mut();
    if overrides.expression.is_some() {
        config.expression = overrides.expression;
    }
    config.documented_only |= overrides.documented_only;
    if overrides.include_private {
        config.exclude_private = false;
    }
    if overrides.include_special {
        config.exclude_special = false;
    }
    debug!(?config, "effective filter");

    let processor = FilterProcessor::new(config.clone())?;
    let mut trees = container.tree_loader().load(tree)?;

    let mut removed = 0;
    for doc_tree in trees.iter_mut() {
        removed += processor.run(doc_tree)?.removed();
    }
    print_forest(&trees);
    output::action("Removed", &format!("{removed} member(s)"));
    Ok(())
}

fn print_forest(trees: &[DocTree]) {
    for doc_tree in trees {
        if doc_tree.is_empty() {
            output::warning("module removed by expression");
            continue;
        }
        output::info(&doc_tree.to_tree_string());
    }
}

#[instrument(skip(container))]
fn cmd_run(container: &ServiceContainer, tree: &Path) -> CliResult<()> {
    let pipeline = container.pipeline()?;
    let mut trees = container.tree_loader().load(tree)?;
    output::header(&format!(
        "Processors: {}",
        pipeline.processor_names().iter().join(", ")
    ));

    let placements = pipeline.run(&mut trees)?;
    for path in &placements {
        output::detail(&path.display());
    }
    output::action("Placed", &format!("{} module(s)", placements.len()));
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("Global", &path.display()),
                None => output::warning("no global config directory on this platform"),
            }
            let project = cli
                .config
                .clone()
                .unwrap_or_else(|| LOCAL_CONFIG_FILE.into());
            let state = if project.exists() { "" } else { " (not found)" };
            output::action("Project", &format!("{}{state}", project.display()));
        }
    }
    Ok(())
}
