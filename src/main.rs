use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use passview::tool::{parse_timeout_secs, TOOL_ENV};
use passview::{
    diff_stats, diff_words, read_source_file, render_inline, run_pipeline, summary_line,
    HumanReport, LogProgress, PipelineReport, PipelineRun, StageList, ToolConfig,
};

#[derive(Parser)]
#[command(name = "passview")]
#[command(author, version, about = "Run transformation passes and diff every stage", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the passes in order over an input file and show what each one changed
    Run {
        /// Source document to transform
        #[arg(short, long)]
        input: PathBuf,

        /// Pass to run, in order (repeat the flag or separate names with commas)
        #[arg(short, long = "pass", alias = "passes", value_delimiter = ',', required = true)]
        passes: Vec<String>,

        /// Transform tool executable (defaults to $PASSVIEW_TOOL)
        #[arg(short, long)]
        tool: Option<PathBuf>,

        /// Kill a pass that runs longer than this many seconds
        #[arg(long)]
        timeout_secs: Option<String>,

        /// Directory for scratch files (defaults to the system temp dir)
        #[arg(long)]
        scratch_dir: Option<PathBuf>,

        /// Output file for the machine-readable report (JSON)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Output file for the human-readable diff of every stage
        #[arg(long = "human")]
        human_readable: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Word-diff two files
    Diff {
        /// Earlier snapshot
        #[arg(short, long)]
        before: PathBuf,

        /// Later snapshot
        #[arg(short, long)]
        after: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            passes,
            tool,
            timeout_secs,
            scratch_dir,
            report,
            human_readable,
            verbose,
        } => {
            setup_logging(verbose);
            let config = resolve_tool_config(tool, timeout_secs.as_deref(), scratch_dir)?;
            run_passes(input, passes, config, report, human_readable).await
        }
        Commands::Diff {
            before,
            after,
            verbose,
        } => {
            setup_logging(verbose);
            diff_files(before, after)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

/// Environment settings, overridden by whatever was given on the command line
fn resolve_tool_config(
    tool: Option<PathBuf>,
    timeout_secs: Option<&str>,
    scratch_dir: Option<PathBuf>,
) -> Result<ToolConfig> {
    let mut config = match tool {
        Some(tool_path) => {
            let mut config = ToolConfig::from_lookup(|key| {
                if key == TOOL_ENV {
                    Some(tool_path.to_string_lossy().into_owned())
                } else {
                    std::env::var(key).ok()
                }
            })?;
            config.tool_path = tool_path;
            config
        }
        None => ToolConfig::from_env()?,
    };

    if let Some(raw) = timeout_secs {
        config.timeout = Some(parse_timeout_secs(raw)?);
    }
    if let Some(dir) = scratch_dir {
        config.scratch_dir = Some(dir);
    }

    Ok(config)
}

async fn run_passes(
    input: PathBuf,
    passes: Vec<String>,
    config: ToolConfig,
    report: Option<PathBuf>,
    human_readable: Option<PathBuf>,
) -> Result<()> {
    info!("Loading input from {:?}", input);
    let text = read_source_file(&input)?;
    let stages = StageList::from_names(passes).context("Invalid pass list")?;
    let run = PipelineRun::new(text, stages);

    info!(
        "Running {} passes with {:?}",
        run.stages.len(),
        config.tool_path
    );

    let history = match run_pipeline(
        &run,
        &config.pipeline_config(),
        &config.invoker(),
        &LogProgress,
    )
    .await
    {
        Ok(history) => history,
        Err(err) => {
            error!("Pass '{}' failed", err.failed_stage);
            if let Some(stderr) = err.stderr() {
                error!("Tool output:\n{}", stderr);
            }
            return Err(err).context("Pipeline failed");
        }
    };

    let diffs = history.diffs();
    let total = diffs.len();
    for diff in &diffs {
        println!("{}", summary_line(diff, total));
    }

    if let Some(path) = report {
        let report =
            PipelineReport::from_history(run.run_id, &config.tool_path, Some(&input), &history);
        report.write_json(&path)?;
        info!("Report written to {:?}", path);
    }

    if let Some(path) = human_readable {
        HumanReport::new(&diffs).write_file(&path)?;
        info!("Human-readable diff written to {:?}", path);
    }

    Ok(())
}

fn diff_files(before: PathBuf, after: PathBuf) -> Result<()> {
    let before_text = read_source_file(&before)?;
    let after_text = read_source_file(&after)?;

    let spans = diff_words(&before_text, &after_text);
    let stats = diff_stats(&spans);

    println!("{}", render_inline(&spans));
    println!();
    println!(
        "{} words added, {} removed, {} unchanged",
        stats.added, stats.removed, stats.unchanged
    );

    Ok(())
}
