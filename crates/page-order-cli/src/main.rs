mod commands;
mod logging;
mod oracle;
mod progress;
mod scanner;

use std::path::Path;
use std::process;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, OracleArgs, RenameArgs, ScanArgs};
use dotenv::dotenv;
use oracle::CommandOracle;
use page_order_core::rename::list_backups;
use page_order_core::{
    ComparisonCache, ContentOrderSorter, EngineConfig, FilenameOracle, Oracle, OrderingEngine,
    RenameOptions, RenameTransaction,
};
use progress::CliReporter;
use tracing::{error, info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let args = Cli::parse();
    let command_name = args.command.as_ref().map_or("help", Commands::name);
    let _guard = logging::init_logger(args.verbose, command_name);

    let config = match page_order_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let outcome = match args.command {
        Some(Commands::Validate(scan)) => run_validate(&config, &scan),
        Some(Commands::Sort { scan, oracle }) => run_sort(&config, &scan, &oracle),
        Some(Commands::Rename {
            scan,
            oracle,
            rename,
        }) => run_rename(config, &scan, &oracle, &rename),
        Some(Commands::Restore {
            backup_dir,
            dry_run,
        }) => run_restore(&backup_dir, dry_run),
        Some(Commands::ListBackups { dir }) => run_list_backups(&dir),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = outcome {
        error!("Error: {}", err);
        process::exit(1);
    }

    Ok(())
}

fn build_oracle(config: &EngineConfig, args: &OracleArgs) -> Box<dyn Oracle> {
    match args
        .oracle_cmd
        .as_deref()
        .and_then(|cmd| CommandOracle::from_command_line(cmd, config.oracle.clone()))
    {
        Some(oracle) => Box::new(oracle),
        None => {
            info!("No oracle command given, ordering by file name numbers");
            Box::new(FilenameOracle)
        }
    }
}

fn load_cache(
    config: &EngineConfig,
    args: &OracleArgs,
) -> Result<ComparisonCache, page_order_core::Error> {
    match &args.cache_file {
        Some(path) if config.enable_comparison_cache => ComparisonCache::load(path),
        _ => Ok(ComparisonCache::with_enabled(config.enable_comparison_cache)),
    }
}

fn save_cache(cache: &ComparisonCache, args: &OracleArgs) {
    if let Some(path) = &args.cache_file {
        if cache.is_enabled() {
            if let Err(e) = cache.save(path) {
                warn!("Could not save comparison cache to {}: {}", path.display(), e);
            }
        }
    }
}

fn run_validate(
    config: &EngineConfig,
    scan: &ScanArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let files =
        scanner::scan_folder(&scan.dir, &config.normalized_extensions(), scan.recursive)?;
    let validator = config.validator()?;
    let report = validator.validate(&files);

    let status = if report.is_valid {
        "valid".green()
    } else {
        "invalid".red()
    };
    println!("Sequence is {} ({} files)", status, report.total_files);
    match (report.min_number, report.max_number) {
        (Some(min), Some(max)) => println!("Numbers range from {} to {}", min, max),
        _ => println!("No numbers found in file names"),
    }
    for (start, end) in validator.get_sequence_gaps(&files) {
        println!("  gap: {} .. {}", start, end);
    }
    if !report.missing.is_empty() {
        println!("Missing: {:?}", report.missing);
    }
    if report.missing_count > report.missing.len() as u64 {
        println!(
            "  ({} missing in total, see the gaps above)",
            report.missing_count
        );
    }
    for (number, names) in &report.duplicates {
        println!("  {} {}: {}", "duplicate".yellow(), number, names.join(", "));
    }
    Ok(())
}

fn run_sort(
    config: &EngineConfig,
    scan: &ScanArgs,
    oracle_args: &OracleArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let files =
        scanner::scan_folder(&scan.dir, &config.normalized_extensions(), scan.recursive)?;
    let oracle = build_oracle(config, oracle_args);
    let cache = load_cache(config, oracle_args)?;

    let mut sorter = ContentOrderSorter::new(oracle).with_cache(cache);
    let outcome = sorter.sort_detailed(&files, &CliReporter::new());
    if outcome.cancelled {
        warn!("Sort was cancelled; the order below is partial");
    }

    for (position, file) in outcome.order.iter().enumerate() {
        println!("{:>4}  {}", position + 1, file.path.display());
    }
    save_cache(sorter.cache(), oracle_args);
    Ok(())
}

fn run_rename(
    mut config: EngineConfig,
    scan: &ScanArgs,
    oracle_args: &OracleArgs,
    rename: &RenameArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(prefix) = &rename.prefix {
        config.prefix = prefix.clone();
    }
    if let Some(digits) = rename.digits {
        config.digits = digits;
    }
    if let Some(start) = rename.start {
        config.start_number = start;
    }
    config.backup = config.backup && !rename.no_backup;
    config.dry_run = config.dry_run || rename.dry_run;

    let files =
        scanner::scan_folder(&scan.dir, &config.normalized_extensions(), scan.recursive)?;
    let oracle = build_oracle(&config, oracle_args);
    let cache = load_cache(&config, oracle_args)?;

    let mut engine = OrderingEngine::new(config).with_cache(cache);
    if let Some(target_dir) = &rename.target_dir {
        engine = engine.with_target_dir(target_dir);
    }
    let result = engine.run(&files, oracle, &CliReporter::new())?;
    save_cache(&result.cache, oracle_args);

    info!(
        "Validate: {}, Sort: {}, Rename: {}",
        format!("{:.2}s", result.validate_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.sort_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.rename_duration.as_secs_f64()).green(),
    );
    if result.failed_comparisons > 0 {
        warn!(
            "{} comparisons failed and were treated as unknown",
            format!("{}", result.failed_comparisons).yellow()
        );
    }

    let log = &result.rename_log;
    for entry in &log.results {
        let mark = if entry.success { "ok".green() } else { "FAILED".red() };
        println!(
            "{:>6}  {} -> {}",
            mark,
            file_name(&entry.original),
            file_name(&entry.new)
        );
        if let Some(err) = &entry.error {
            println!("        {}", err.red());
        }
    }
    if let Some(backup) = &log.backup {
        println!("Backup: {}", backup.dir.display());
        for failure in &backup.failures {
            println!(
                "  {} {}: {}",
                "not backed up".red(),
                failure.path.display(),
                failure.error
            );
        }
    }
    if let Some(path) = &rename.log_json {
        log.write_json(path)?;
        info!("Rename log written to {}", path.display());
    }

    if !log.is_complete_success() {
        return Err(format!("{} of {} renames failed", log.failed(), log.results.len()).into());
    }
    Ok(())
}

fn run_restore(backup_dir: &Path, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let transaction = RenameTransaction::new(RenameOptions {
        dry_run,
        backup: false,
        ..Default::default()
    });
    if transaction.restore(backup_dir) {
        println!("Restored from {}", backup_dir.display());
        Ok(())
    } else {
        Err(format!("restore from {} did not complete", backup_dir.display()).into())
    }
}

fn run_list_backups(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let backups = list_backups(dir)?;
    if backups.is_empty() {
        println!("No backups in {}", dir.display());
    }
    for backup in backups {
        println!("{}", backup.display());
    }
    Ok(())
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
