//! Command handlers: thin wrappers printing service results

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::IoResultExt;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{format_indices, Dataset, EpisodeIndex, EpisodeSelection, MergePlan};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Dispatch a parsed command line.
///
/// Hub commands get a container with the real hub client; `config` and
/// `completion` never touch the network.
pub fn execute_command(cli: &Cli, settings: Settings) -> CliResult<()> {
    match &cli.command {
        Commands::Config { command } => execute_config(command, &settings, cli.config.as_deref()),
        Commands::Completion { shell } => {
            print_completions(*shell);
            Ok(())
        }
        command => {
            let container = ServiceContainer::new(settings, cli.yes)?;
            run(command, &container)
        }
    }
}

/// Run a hub command against the services in `container`.
pub fn run(command: &Commands, container: &ServiceContainer) -> CliResult<()> {
    match command {
        Commands::ListVersions => list_versions(container),
        Commands::ListEpisodes => list_episodes(container).map(|_| ()),
        Commands::CreateTag { name, message } => create_tag(container, name, message),
        Commands::DeleteTag { name } => delete_tag(container, name),
        Commands::DeleteEpisodes { episodes } => delete_episodes(container, episodes),
        Commands::MergeDatasets {
            source,
            target,
            output,
        } => merge_datasets(container, source, target.as_deref(), output.as_deref()),
        Commands::Config { .. } | Commands::Completion { .. } => Err(CliError::Usage(
            "command does not operate on a repository".to_string(),
        )),
    }
}

fn confirm(container: &ServiceContainer, question: &str) -> CliResult<bool> {
    Ok(container
        .confirmer
        .confirm(question)
        .with_context("read confirmation")?)
}

#[instrument(skip(c))]
fn list_versions(c: &ServiceContainer) -> CliResult<()> {
    let refs = c.versions.list_versions()?;

    output::header("Branches:");
    for name in refs.branch_names() {
        output::item(name);
    }
    output::blank();
    output::header("Tags:");
    for name in refs.tag_names() {
        output::item(name);
    }
    Ok(())
}

/// Print every episode with its file count; returns the indices, ascending.
#[instrument(skip(c))]
pub fn list_episodes(c: &ServiceContainer) -> CliResult<Vec<EpisodeIndex>> {
    let episodes = c.episodes.list_episodes()?;

    output::blank();
    output::header(&format!("Found {} episodes:", episodes.len()));
    for ep in &episodes {
        output::detail(&format!(
            "Episode {}: {} files (1 parquet + {} videos)",
            ep.index,
            ep.file_count,
            ep.media_count()
        ));
    }
    Ok(episodes.into_iter().map(|ep| ep.index).collect())
}

#[instrument(skip(c))]
fn create_tag(c: &ServiceContainer, name: &str, message: &str) -> CliResult<()> {
    c.versions.create_tag(name, message)?;
    output::success(&format!("Tag '{name}' created successfully!"));
    Ok(())
}

#[instrument(skip(c))]
fn delete_tag(c: &ServiceContainer, name: &str) -> CliResult<()> {
    if !confirm(c, &format!("Delete tag '{name}'?"))? {
        debug!("tag deletion declined");
        return Ok(());
    }
    c.versions.delete_tag(name)?;
    output::success(&format!("Deleted tag: {name}"));
    Ok(())
}

#[instrument(skip(c))]
fn delete_episodes(c: &ServiceContainer, selection: &EpisodeSelection) -> CliResult<()> {
    let plan = c.episodes.plan_deletion(selection.indices())?;
    if plan.is_empty() {
        output::warning(&format!(
            "No files found for episodes: {}",
            format_indices(selection.indices())
        ));
        return Ok(());
    }

    output::blank();
    output::header(&format!(
        "Files to be deleted for {} episode(s):",
        plan.indices.len()
    ));
    for group in &plan.groups {
        output::blank();
        output::detail(&format!(
            "Episode {} ({} files):",
            group.index,
            group.files.len()
        ));
        for file in &group.files {
            output::detail(&format!("  - {file}"));
        }
    }
    output::blank();

    if !confirm(c, &format!("Delete {} total files?", plan.file_count()))? {
        output::info("Cancelled.");
        return Ok(());
    }

    output::blank();
    output::info("Deleting files...");
    let report = c.episodes.delete_planned(&plan, |outcome| match &outcome.error {
        None => output::success_detail(&format!("Deleted: {}", outcome.path)),
        Some(e) => output::failure_detail(&format!("Failed to delete {}: {}", outcome.path, e)),
    });

    output::blank();
    let episodes = format_indices(&plan.indices);
    if report.failed() == 0 {
        output::success(&format!("Successfully deleted episodes {episodes}"));
    } else {
        output::warning(&format!(
            "Deleted {} of {} files for episodes {}; {} failed",
            report.deleted(),
            report.outcomes.len(),
            episodes,
            report.failed()
        ));
    }
    Ok(())
}

#[instrument(skip(c))]
fn merge_datasets(
    c: &ServiceContainer,
    source: &str,
    target: Option<&str>,
    output: Option<&str>,
) -> CliResult<()> {
    let targets = c.merge.resolve(source, target, output);

    output::blank();
    output::header("=== Merging Datasets ===");
    output::info(&format!("Source: {}", targets.source));
    output::info(&format!("Target: {}", targets.target));
    output::info(&format!("Output: {}", targets.output));
    output::blank();

    output::info(&format!("Loading target dataset: {}...", targets.target));
    let target_ds = c.merge.load(&targets.target)?;
    output::success(&format!("Loaded target: {} examples", target_ds.len()));

    output::blank();
    output::info(&format!("Loading source dataset: {}...", targets.source));
    let source_ds = c.merge.load(&targets.source)?;
    output::success(&format!("Loaded source: {} examples", source_ds.len()));

    output::blank();
    output::info("Validating dataset schemas...");
    if let Err(e) = c.merge.check_schemas(&target_ds, &source_ds) {
        print_schema_mismatch(&target_ds, &source_ds);
        return Err(e.into());
    }
    output::success("Schemas match");

    let plan = c.merge.plan(&targets, &target_ds, &source_ds);
    print_merge_plan(&plan);

    output::blank();
    if !confirm(c, "Proceed with merge?")? {
        output::info("Cancelled.");
        return Ok(());
    }

    output::blank();
    output::info("Merging datasets...");
    let merged = c.merge.concatenate(target_ds, source_ds)?;
    output::success(&format!(
        "Successfully merged: {} total examples",
        merged.len()
    ));

    output::blank();
    output::info(&format!("Pushing merged dataset to {}...", plan.output));
    c.merge.push(&merged, &plan)?;
    output::success(&format!("Successfully pushed to {}", plan.output));

    output::blank();
    output::header("=== Merge Complete ===");
    output::success(&format!(
        "Merged {} examples from {}",
        plan.source_rows, plan.source
    ));
    output::success(&format!(
        "Combined with {} examples from {}",
        plan.target_rows, plan.target
    ));
    output::success(&format!(
        "Total: {} examples in {}",
        merged.len(),
        plan.output
    ));
    output::blank();
    output::info(&format!(
        "View your merged dataset at: {}",
        c.settings.dataset_url(&plan.output)
    ));
    Ok(())
}

fn print_schema_mismatch(target: &Dataset, source: &Dataset) {
    output::failure("Error: Dataset schemas don't match!");
    output::blank();
    output::info(&format!("Target features: {}", target.features));
    output::blank();
    output::info(&format!("Source features: {}", source.features));
    output::blank();

    let diff = target.features.diff(&source.features);
    for name in &diff.missing {
        output::diff_remove(&format!("{name} (target only)"));
    }
    for name in &diff.extra {
        output::diff_add(&format!("{name} (source only)"));
    }
    for name in &diff.changed {
        output::diff_change(&format!("{name} (type differs)"));
    }
    output::blank();
    output::info("Datasets must have identical columns and types to merge.");
}

fn print_merge_plan(plan: &MergePlan) {
    output::blank();
    output::header("Merge plan:");
    output::detail(&format!("Target episodes: {} examples", plan.target_rows));
    output::detail(&format!("Source episodes: {} examples", plan.source_rows));
    output::detail(&format!("Total after merge: {} examples", plan.total_rows()));
    output::blank();
    output::info(&format!("Merged dataset will be pushed to: {}", plan.output));

    if plan.updates_target() {
        output::warning("Warning: This will UPDATE the target dataset");
    } else {
        output::success("Original datasets will remain unchanged");
    }
}

// ============================================================
// config / completion
// ============================================================

fn config_file_path(explicit: Option<&Path>) -> CliResult<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(global_config_path)
        .ok_or_else(|| CliError::Usage("cannot determine config directory".to_string()))
}

fn execute_config(
    command: &ConfigCommands,
    settings: &Settings,
    explicit: Option<&Path>,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            let path = config_file_path(explicit)?;
            let state = if path.exists() { "exists" } else { "not found" };
            output::info(&format!("{} ({state})", path.display()));
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = config_file_path(explicit)?;
            if path.exists() && !force {
                return Err(CliError::InvalidArgs(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
            Ok(())
        }
    }
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
