//! HLS Bench CLI
//!
//! The `hlsbench` command drives the external HLS tool over source snippets.
//!
//! ## Commands
//!
//! - `eval`: Synthesize one source file and print timing, latency and utilization
//! - `verify`: Check (original, fixed) pairs from a dataset file
//! - `script`: Print the control script a job would run

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use hls_core::{
    parse_dataset, select_range, ControlScript, HlsConfig, SynthesisJob, SynthesisOutcome,
};
use hls_synth::{locate_tool, verify_entries, JobTemplate, SynthesisPipeline, VerificationSummary};

#[derive(Parser)]
#[command(name = "hlsbench")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "HLS synthesis job runner and report parser", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true, env = "HLS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize one source file and print the outcome
    Eval {
        /// C/C++ source file
        #[arg(short, long)]
        source: PathBuf,

        /// Top-level function
        #[arg(short, long)]
        top: String,

        /// Target device part (default from config)
        #[arg(long)]
        device: Option<String>,

        /// Clock period in ns (default from config)
        #[arg(long)]
        clock: Option<f64>,

        /// Header file to stage beside the source (repeatable)
        #[arg(long = "header")]
        headers: Vec<PathBuf>,

        /// Synthesis tool executable (auto-detected if omitted)
        #[arg(long)]
        tool: Option<PathBuf>,

        /// Workspace directory (default from config)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Verify dataset pairs: originals must fail, fixes must synthesize
    Verify {
        /// Dataset file
        #[arg(short, long)]
        file: PathBuf,

        /// First entry number to verify
        #[arg(short = 'i', long, default_value = "1")]
        start: u32,

        /// Last entry number to verify (default: through the end)
        #[arg(short, long)]
        end: Option<u32>,

        /// Synthesis tool executable (auto-detected if omitted)
        #[arg(short = 'p', long)]
        tool: Option<PathBuf>,

        /// Workspace directory (default from config)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Print the control script for a job
    Script {
        /// Top-level function
        #[arg(short, long)]
        top: String,

        /// Target device part (default from config)
        #[arg(long)]
        device: Option<String>,

        /// Clock period in ns (default from config)
        #[arg(long)]
        clock: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    hls_core::init_tracing(cli.json, level);

    let config = HlsConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Eval {
            source,
            top,
            device,
            clock,
            headers,
            tool,
            workspace,
            output,
        } => {
            let options = JobOptions {
                top,
                device,
                clock,
                workspace,
            };
            cmd_eval(&config, &source, &options, &headers, tool.as_deref(), output).await
        }
        Commands::Verify {
            file,
            start,
            end,
            tool,
            workspace,
            output,
        } => {
            cmd_verify(
                &config,
                &file,
                start,
                end,
                tool.as_deref(),
                workspace,
                output,
            )
            .await
        }
        Commands::Script { top, device, clock } => {
            let options = JobOptions {
                top,
                device,
                clock,
                workspace: None,
            };
            cmd_script(&config, &options)
        }
    }
}

/// Job parameters given on the command line; unset ones come from config.
struct JobOptions {
    top: String,
    device: Option<String>,
    clock: Option<f64>,
    workspace: Option<PathBuf>,
}

fn build_job(
    config: &HlsConfig,
    options: &JobOptions,
    source_text: String,
    headers: Vec<(String, String)>,
) -> Result<SynthesisJob> {
    let mut builder = SynthesisJob::builder(&options.top, source_text)
        .target_device(
            options
                .device
                .clone()
                .unwrap_or_else(|| config.job.target_device.clone()),
        )
        .clock_period_ns(options.clock.unwrap_or(config.job.clock_period_ns))
        .solution(&config.job.solution)
        .workspace(
            options
                .workspace
                .clone()
                .unwrap_or_else(|| config.workspace.root.clone()),
        );
    for (name, contents) in headers {
        builder = builder.header_file(name, contents);
    }
    Ok(builder.build()?)
}

fn read_headers(paths: &[PathBuf]) -> Result<Vec<(String, String)>> {
    paths
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .with_context(|| format!("Header path has no file name: {}", path.display()))?
                .to_string();
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read header: {}", path.display()))?;
            Ok((name, contents))
        })
        .collect()
}

/// Synthesize one source file
async fn cmd_eval(
    config: &HlsConfig,
    source: &Path,
    options: &JobOptions,
    headers: &[PathBuf],
    tool: Option<&Path>,
    output: OutputFormat,
) -> Result<()> {
    let source_text = std::fs::read_to_string(source)
        .with_context(|| format!("Failed to read source: {}", source.display()))?;
    let job = build_job(config, options, source_text, read_headers(headers)?)?;

    let executable = locate_tool(tool, &config.tool).context("Cannot run synthesis")?;
    info!(tool = %executable.display(), top = %job.top_function, "Running synthesis");

    let pipeline = SynthesisPipeline::from_config(executable, config);
    let outcome = pipeline.run(&job).await;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => print!("{}", render_outcome_text(&outcome)?),
    }
    Ok(())
}

/// Verify dataset pairs
async fn cmd_verify(
    config: &HlsConfig,
    file: &Path,
    start: u32,
    end: Option<u32>,
    tool: Option<&Path>,
    workspace: Option<PathBuf>,
    output: OutputFormat,
) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read dataset: {}", file.display()))?;
    let all = parse_dataset(&text).context("Failed to parse dataset")?;
    let total = all.len();
    let entries = select_range(all, start, end);
    if entries.is_empty() {
        println!(
            "No entries in range [{}, {}] ({} entries in {})",
            start,
            end.map_or("end".to_string(), |e| e.to_string()),
            total,
            file.display()
        );
        return Ok(());
    }

    let executable = locate_tool(tool, &config.tool).context("Cannot run synthesis")?;
    info!(
        tool = %executable.display(),
        selected = entries.len(),
        total = total,
        "Verifying dataset entries"
    );

    let pipeline = SynthesisPipeline::from_config(executable, config);
    let template = JobTemplate::new(
        config.job.clone(),
        workspace.unwrap_or_else(|| config.workspace.root.clone()),
    );
    let summary = verify_entries(&pipeline, &template, &entries).await;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print!("{}", render_summary_text(&summary)?),
    }
    Ok(())
}

/// Print the control script for a job
fn cmd_script(config: &HlsConfig, options: &JobOptions) -> Result<()> {
    let job = build_job(config, options, String::new(), Vec::new())?;
    let script = ControlScript::render(&job);
    print!("{}", script.as_str());
    Ok(())
}

fn render_outcome_text(outcome: &SynthesisOutcome) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "HLS Evaluation Result:")?;

    let report = match outcome {
        SynthesisOutcome::Failure { message, .. } => {
            writeln!(out, "Error: {}", message)?;
            if let Some(path) = outcome.log_path() {
                writeln!(out, "\nFull log: {}", path.display())?;
            }
            return Ok(out);
        }
        SynthesisOutcome::Success(report) => report,
    };

    writeln!(out, "Timing:")?;
    match &report.timing {
        Some(t) => {
            writeln!(out, "  clock: {}", t.clock_name)?;
            writeln!(out, "  target: {} ns", t.target_period_ns)?;
            writeln!(out, "  estimated: {} ns", t.estimated_period_ns)?;
            writeln!(out, "  uncertainty: {} ns", t.uncertainty_ns)?;
        }
        None => {
            writeln!(out, "  No timing information available")?;
        }
    }

    writeln!(out, "\nLatency:")?;
    match &report.latency {
        Some(l) => {
            writeln!(out, "  min: {}", l.min_cycles)?;
            writeln!(out, "  max: {}", l.max_cycles)?;
            writeln!(out, "  interval min: {}", l.interval_min_cycles)?;
            writeln!(out, "  interval max: {}", l.interval_max_cycles)?;
            writeln!(out, "  pipeline: {}", l.pipeline_type)?;
        }
        None => {
            writeln!(out, "  No latency information available")?;
        }
    }

    writeln!(out, "\nResource Utilization:")?;
    match &report.utilization {
        Some(u) if !u.is_empty() => {
            if let Some(used) = &u.used {
                writeln!(out, "  Used:")?;
                for (kind, value) in used {
                    writeln!(out, "    {}: {}", kind.name(), value)?;
                }
            }
            if let Some(available) = &u.available {
                writeln!(out, "  Available:")?;
                for (kind, value) in available {
                    writeln!(out, "    {}: {}", kind.name(), value)?;
                }
            }
            if let Some(percentage) = &u.percentage {
                writeln!(out, "  Utilization (%):")?;
                for (kind, value) in percentage {
                    writeln!(out, "    {}: {}", kind.name(), value)?;
                }
            }
        }
        _ => {
            writeln!(out, "  No resource utilization information available")?;
        }
    }

    if let Some(note) = &report.note {
        writeln!(out, "\nNote: {}", note)?;
    }
    writeln!(out, "\nFull log: {}", report.log_path.display())?;
    Ok(out)
}

fn render_summary_text(summary: &VerificationSummary) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for verdict in &summary.verdicts {
        writeln!(
            out,
            "Example #{} ({}): {}  [original: {}, fixed: {}]",
            verdict.example_id,
            verdict.top_function,
            pass_fail(verdict.overall_pass),
            pass_fail(verdict.original.pass),
            pass_fail(verdict.rewritten.pass),
        )?;
    }
    writeln!(
        out,
        "\nOverall: {} ({}/{} passed, {}ms)",
        pass_fail(summary.all_pass),
        summary.passed,
        summary.verdicts.len(),
        summary.duration_ms
    )?;
    Ok(out)
}

fn pass_fail(pass: bool) -> &'static str {
    if pass {
        "Pass"
    } else {
        "Fail"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hls_core::{
        FailureKind, PairVerdict, ReportNote, SynthesisReport, TimingMetrics, Verdict,
    };

    #[test]
    fn test_parse_eval_defaults() {
        let cli = Cli::try_parse_from([
            "hlsbench", "eval", "--source", "vadd.cpp", "--top", "vadd",
        ])
        .unwrap();
        match cli.command {
            Commands::Eval {
                source,
                top,
                device,
                clock,
                output,
                ..
            } => {
                assert_eq!(source, PathBuf::from("vadd.cpp"));
                assert_eq!(top, "vadd");
                assert!(device.is_none());
                assert!(clock.is_none());
                assert_eq!(output, OutputFormat::Text);
            }
            _ => panic!("expected eval"),
        }
    }

    #[test]
    fn test_parse_verify_range() {
        let cli = Cli::try_parse_from([
            "hlsbench", "--json", "verify", "-f", "c2c.md", "-i", "3", "-e", "7", "-p",
            "/opt/vivado_hls",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Verify {
                file,
                start,
                end,
                tool,
                ..
            } => {
                assert_eq!(file, PathBuf::from("c2c.md"));
                assert_eq!(start, 3);
                assert_eq!(end, Some(7));
                assert_eq!(tool, Some(PathBuf::from("/opt/vivado_hls")));
            }
            _ => panic!("expected verify"),
        }
    }

    #[test]
    fn test_eval_requires_top() {
        assert!(Cli::try_parse_from(["hlsbench", "eval", "--source", "a.cpp"]).is_err());
    }

    #[test]
    fn test_build_job_prefers_cli_over_config() {
        let mut config = HlsConfig::default();
        config.job.target_device = "xc7z020clg484-1".to_string();
        let options = JobOptions {
            top: "vadd".to_string(),
            device: None,
            clock: Some(10.0),
            workspace: Some(PathBuf::from("ws")),
        };
        let job = build_job(
            &config,
            &options,
            "void vadd() {}".to_string(),
            vec![("vadd.h".to_string(), "".to_string())],
        )
        .unwrap();
        assert_eq!(job.target_device, "xc7z020clg484-1");
        assert_eq!(job.clock_period_ns, 10.0);
        assert_eq!(job.workspace_path, PathBuf::from("ws"));
        assert!(job.header_files.contains_key("vadd.h"));
    }

    #[test]
    fn test_build_job_rejects_bad_top() {
        let options = JobOptions {
            top: "1bad".to_string(),
            device: None,
            clock: None,
            workspace: None,
        };
        assert!(build_job(&HlsConfig::default(), &options, String::new(), Vec::new()).is_err());
    }

    #[test]
    fn test_render_failure_text() {
        let outcome = SynthesisOutcome::failure(
            FailureKind::SynthesisFailed { exit_code: 1 },
            "HLS synthesis failed: ERROR: unsupported",
            "ERROR: unsupported",
            Some(PathBuf::from("build/vivado_hls.log")),
        );
        let text = render_outcome_text(&outcome).unwrap();
        assert!(text.contains("Error: HLS synthesis failed: ERROR: unsupported"));
        assert!(text.contains("Full log: build/vivado_hls.log"));
    }

    #[test]
    fn test_render_success_text() {
        let mut report =
            SynthesisReport::empty(String::new(), PathBuf::from("build/vivado_hls.log"));
        report.timing = Some(TimingMetrics {
            clock_name: "default".to_string(),
            target_period_ns: 5.0,
            estimated_period_ns: 3.45,
            uncertainty_ns: 0.62,
        });
        let report = report.with_note(ReportNote::ParseError {
            message: "section 'latency' has no summary block".to_string(),
        });
        let text = render_outcome_text(&SynthesisOutcome::Success(report)).unwrap();
        assert!(text.contains("clock: default"));
        assert!(text.contains("estimated: 3.45 ns"));
        assert!(text.contains("No latency information available"));
        assert!(text.contains("No resource utilization information available"));
        assert!(text.contains("Note: "));
    }

    #[test]
    fn test_render_summary_text() {
        let verdict = PairVerdict::new(
            "4",
            "top",
            Verdict::new("4", false, false),
            Verdict::new("4", true, false),
        );
        let summary = VerificationSummary::from_verdicts(vec![verdict], 12);
        let text = render_summary_text(&summary).unwrap();
        assert!(text.contains("Example #4 (top): Fail  [original: Pass, fixed: Fail]"));
        assert!(text.contains("Overall: Fail (0/1 passed, 12ms)"));
    }
}
