use clap::{Parser, Subcommand};
use responsive_images::imaging::EngineKind;
use responsive_images::logging::{self, LogFormat};
use responsive_images::{config, output, process};
use std::path::{Path, PathBuf};

/// Overrides for the `run` command.
#[derive(clap::Args, Clone)]
struct RunArgs {
    /// Regenerate outputs even when they already exist
    #[arg(long)]
    force: bool,

    /// Maximum number of transforms in flight (overrides options.concurrency)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Image engine (overrides options.engine)
    #[arg(long, value_enum)]
    engine: Option<EngineKind>,

    /// Write the run summary as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "responsive-images")]
#[command(about = "Batch generator for responsive image sizes")]
#[command(long_about = "\
Batch generator for responsive image sizes

A task file lists the sizes to produce and the source images to produce
them from. Every (source, size) pair yields one output file next to the
mirrored source path, named after the size:

  images_src/                     images/
  ├── dawn.jpg          →         ├── dawn-small.jpg
  └── trips/                      ├── dawn-medium.jpg
      └── dusk.png                └── trips/dusk-small.png ...

Existing outputs are skipped unless --force is given. Sizes that fail
validation are reported and skipped; the others still run.

Run 'responsive-images gen-config' to generate a documented task file.")]
#[command(version = version_string())]
struct Cli {
    /// Task file
    #[arg(long, short, default_value = "responsive-images.toml", global = true)]
    config: PathBuf,

    /// Increase diagnostic output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Diagnostic log format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate every size for every source
    Run(RunArgs),
    /// Validate the task file and list sizes and sources without processing
    Check,
    /// Print a stock task file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.log_format)?;

    match cli.command {
        Command::Run(args) => {
            let mut task = config::load_config(&cli.config)?;
            apply_overrides(&mut task, &args);
            task.validate()?;
            let base_dir = task_dir(&cli.config);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_process_event(&event);
                }
            });
            let result = process::run(&task, &base_dir, Some(tx));
            printer
                .join()
                .map_err(|_| "progress output thread panicked")?;
            let summary = result?;

            output::print_summary(&summary);
            if let Some(report) = &args.report {
                let json = serde_json::to_string_pretty(&summary)?;
                std::fs::write(report, json)?;
            }
        }
        Command::Check => {
            let task = config::load_config(&cli.config)?;
            let base_dir = task_dir(&cli.config);
            println!("==> Checking {}", cli.config.display());
            let plan = process::plan_run(&task, &base_dir)?;
            output::print_check(&plan, &base_dir);
            println!("==> Task file is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Apply command line overrides on top of the task file.
fn apply_overrides(task: &mut config::TaskConfig, args: &RunArgs) {
    if args.force {
        task.options.new_files_only = false;
        for size in &mut task.sizes {
            size.new_files_only = None;
        }
    }
    if let Some(concurrency) = args.concurrency {
        task.options.concurrency = concurrency;
    }
    if let Some(engine) = args.engine {
        task.options.engine = engine;
    }
}

/// Directory that relative task paths resolve against.
fn task_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
