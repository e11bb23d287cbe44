mod commands;
mod logging;

use std::fs;
use std::path::Path;
use std::process;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, SensitivityArg};
use dotenv::dotenv;
use reclaimer_core::config::{self, AppConfig};
use reclaimer_core::{format_file_size, scanner, DedupeEngine, FileRecord, Sensitivity};
use tracing::{error, info};

fn main() {
    dotenv().ok();

    let args = Cli::parse();
    let _guard = logging::init_logger(args.quiet || args.emits_data());

    let config = match config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let result = match args.command {
        Some(Commands::Index { output }) => run_index(&config, output.as_deref()),
        Some(Commands::Analyze {
            input,
            sensitivity,
            json,
        }) => run_analyze(&config, input.as_deref(), sensitivity, json),
        Some(Commands::ApplyRules {
            input,
            sensitivity,
            trash,
        }) => run_apply_rules(&config, input.as_deref(), sensitivity, trash),
        Some(Commands::Compare {
            first,
            second,
            json,
        }) => run_compare(&first, &second, json),
        Some(Commands::FileType { extension }) => {
            println!("{}: {}", extension, DedupeEngine::file_type(&extension));
            Ok(())
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run_index(config: &AppConfig, output: Option<&Path>) -> anyhow::Result<()> {
    let records = index_configured_roots(config)?;
    let json = serde_json::to_string_pretty(&records)?;

    match output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("writing records to {}", path.display()))?;
            info!("{} records written to {}", records.len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_analyze(
    config: &AppConfig,
    input: Option<&Path>,
    sensitivity: Option<SensitivityArg>,
    json: bool,
) -> anyhow::Result<()> {
    let engine = DedupeEngine::from_config(config)?;
    let records = load_records(config, input)?;
    let analysis = engine.analyze(&records, pick_sensitivity(config, sensitivity))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    for (group, suggestion) in analysis.groups.iter().zip(&analysis.suggestions) {
        println!(
            "{} {} ({} files, {}, similarity {:.2})",
            group.id.cyan(),
            group.category,
            group.files.len(),
            format_file_size(group.total_size),
            group.similarity,
        );
        println!(
            "  {} {} [{:.1}] {}",
            "keep".green(),
            suggestion.best_file.file.path,
            suggestion.best_file.score,
            suggestion.best_file.reasons.join(", "),
        );
        for other in &suggestion.files_to_delete {
            println!(
                "  {} {} [{:.1}]",
                "drop".red(),
                other.file.path,
                other.score
            );
        }
    }

    info!(
        "{} duplicate groups, {} duplicate files, {} recoverable",
        format!("{}", analysis.groups.len()).red(),
        format!("{}", analysis.total_duplicates).red(),
        format_file_size(analysis.total_recoverable_size).red(),
    );
    Ok(())
}

fn run_apply_rules(
    config: &AppConfig,
    input: Option<&Path>,
    sensitivity: Option<SensitivityArg>,
    trash: bool,
) -> anyhow::Result<()> {
    let engine = DedupeEngine::from_config(config)?;
    if engine.list_rules()?.is_empty() {
        info!("No rules configured; add [[rules]] to Config.toml");
        return Ok(());
    }

    let records = load_records(config, input)?;
    let groups = engine
        .group(&records, pick_sensitivity(config, sensitivity))
        .groups;

    let resolutions = if trash {
        let resolution = engine.resolve_with_rules(&groups)?;
        let status = engine.trash_status()?;
        info!(
            "Trash holds {} files, {}",
            format!("{}", status.total_items).yellow(),
            format_file_size(status.total_size).yellow(),
        );
        resolution.resolutions
    } else {
        let applications = engine.apply_rules(&groups)?;
        reclaimer_core::merge_applications(&groups, &applications)
    };

    for resolution in &resolutions {
        println!(
            "{} (rules: {})",
            resolution.group_id.cyan(),
            resolution.rule_ids.join(", ")
        );
        for file in &resolution.files_to_keep {
            println!("  {} {}", "keep".green(), file.path);
        }
        for file in &resolution.files_to_delete {
            println!("  {} {}", "drop".red(), file.path);
        }
    }

    let reclaimed: u64 = resolutions
        .iter()
        .flat_map(|r| r.files_to_delete.iter().map(|f| f.size))
        .sum();
    info!(
        "{} groups resolved, {} reclaimable",
        format!("{}", resolutions.len()).red(),
        format_file_size(reclaimed).red(),
    );
    Ok(())
}

fn run_compare(first: &Path, second: &Path, json: bool) -> anyhow::Result<()> {
    let first = scanner::record_for(first)?;
    let second = scanner::record_for(second)?;
    let comparison = DedupeEngine::compare_files(&first, &second);

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
        return Ok(());
    }

    for preview in [&comparison.file1, &comparison.file2] {
        println!(
            "{} {} ({}, {})",
            "file".cyan(),
            preview.path,
            preview.category,
            preview.size_formatted
        );
    }
    for similarity in &comparison.similarities {
        println!("  {} {}", "same".green(), similarity);
    }
    for difference in &comparison.differences {
        println!("  {} {}", "diff".yellow(), difference);
    }
    println!("{}", comparison.recommendation.bold());
    Ok(())
}

fn pick_sensitivity(config: &AppConfig, arg: Option<SensitivityArg>) -> Sensitivity {
    arg.map(Sensitivity::from).unwrap_or(config.sensitivity)
}

fn load_records(config: &AppConfig, input: Option<&Path>) -> anyhow::Result<Vec<FileRecord>> {
    match input {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading records from {}", path.display()))?;
            let records: Vec<FileRecord> = serde_json::from_str(&raw)
                .with_context(|| format!("parsing records in {}", path.display()))?;
            info!("Loaded {} records from {}", records.len(), path.display());
            Ok(records)
        }
        None => index_configured_roots(config),
    }
}

fn index_configured_roots(config: &AppConfig) -> anyhow::Result<Vec<FileRecord>> {
    if config.root_paths.is_empty() {
        anyhow::bail!("no root_paths configured; set them in Config.toml or pass --input");
    }

    let roots = config::non_overlapping_directories(config.root_paths.clone());
    info!("Indexing directories: {:?}", roots);

    let root_slices: Vec<&str> = roots.iter().map(|s| s.as_str()).collect();
    let ignore_slices: Vec<&str> = config.ignore_patterns.iter().map(|s| s.as_str()).collect();
    Ok(scanner::index_paths(&root_slices, &ignore_slices)?)
}
