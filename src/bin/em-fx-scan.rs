//! em-fx-scan CLI - correlation and causality scans over FX rate tables
//!
//! ## Example Usage
//!
//! ```bash
//! # Shape, head/tail, column summary and quality checks
//! em-fx-scan inspect EM_basket_pairs.csv
//!
//! # Columns correlated with USDINR above 0.8, heatmap into ./charts
//! em-fx-scan correlate EM_basket_pairs.csv --threshold 0.8 --plot-dir charts
//!
//! # Granger tests for the curated pairs
//! em-fx-scan causality EM_basket_pairs.csv --lag 1 --alpha 0.05
//!
//! # Whole pipeline as JSON
//! em-fx-scan run EM_basket_pairs.csv --json
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use em_fx_scan::causality::{CausalityReport, SeriesPair};
use em_fx_scan::config::AnalysisConfig;
use em_fx_scan::correlation::{CorrelatedPair, CorrelationMatrix};
use em_fx_scan::data::{ExchangeRateTable, MonthlyMeans, RateTableReader, Resampler};
use em_fx_scan::plot;
use em_fx_scan::quality::QualityReport;
use em_fx_scan::report::{Analysis, AnalysisReport};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// em-fx-scan: correlation and Granger causality for emerging-market FX
#[derive(Parser)]
#[command(name = "em-fx-scan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Correlation and Granger causality scans over FX rate tables", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show table shape, head/tail, column summary and quality checks
    Inspect {
        #[arg(value_name = "CSV")]
        csv: PathBuf,

        /// Rows shown at each end
        #[arg(short = 'n', long, default_value = "5")]
        rows: usize,
    },

    /// Correlation scan against the reference column
    Correlate {
        #[arg(value_name = "CSV")]
        csv: PathBuf,

        /// Reference column
        #[arg(short = 'r', long)]
        reference: Option<String>,

        /// Absolute correlation threshold
        #[arg(short = 't', long)]
        threshold: Option<f64>,

        /// Print the full correlation matrix
        #[arg(short = 'm', long)]
        matrix: bool,

        /// Directory for SVG charts
        #[arg(long)]
        plot_dir: Option<PathBuf>,
    },

    /// Granger causality tests over column pairs
    Causality {
        #[arg(value_name = "CSV")]
        csv: PathBuf,

        /// Lag count
        #[arg(short = 'l', long)]
        lag: Option<usize>,

        /// Significance level
        #[arg(short = 'a', long)]
        alpha: Option<f64>,

        /// Pair as CANDIDATE:REFERENCE (repeatable)
        #[arg(short = 'p', long = "pair")]
        pairs: Vec<String>,
    },

    /// Run the whole pipeline
    Run {
        #[arg(value_name = "CSV")]
        csv: PathBuf,

        /// Directory for SVG charts
        #[arg(long)]
        plot_dir: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AnalysisConfig> {
    let path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => dirs::home_dir()
            .map(|home| home.join(".em-fx-scan").join("config.toml"))
            .filter(|p| p.exists()),
    };

    match path {
        Some(p) => {
            let contents = fs::read_to_string(&p)
                .with_context(|| format!("Failed to read config {}", p.display()))?;
            let config = AnalysisConfig::from_toml_str(&contents)
                .with_context(|| format!("Failed to parse config {}", p.display()))?;
            log::debug!("Loaded config from {}", p.display());
            Ok(config)
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn load_table(csv: &Path, config: &AnalysisConfig) -> anyhow::Result<ExchangeRateTable> {
    RateTableReader::with_format(config.csv_format())
        .load_csv(csv)
        .with_context(|| format!("Failed to load {}", csv.display()))
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref()).and_then(|config| {
        if cli.verbose {
            println!(
                "{} v{}",
                "em-fx-scan".cyan().bold(),
                env!("CARGO_PKG_VERSION")
            );
            println!(
                "Reference: {}",
                config.reference.as_str().dimmed()
            );
        }

        match cli.command {
            Commands::Inspect { csv, rows } => inspect(&csv, rows, &config),
            Commands::Correlate {
                csv,
                reference,
                threshold,
                matrix,
                plot_dir,
            } => {
                let config = AnalysisConfig {
                    reference: reference.unwrap_or(config.reference),
                    threshold: threshold.unwrap_or(config.threshold),
                    plot_dir: plot_dir.or(config.plot_dir),
                    ..config
                };
                correlate(&csv, matrix, &config)
            }
            Commands::Causality {
                csv,
                lag,
                alpha,
                pairs,
            } => {
                let pairs = if pairs.is_empty() {
                    config.pairs.clone()
                } else {
                    pairs
                        .iter()
                        .map(|p| SeriesPair::parse(p))
                        .collect::<em_fx_scan::error::Result<Vec<_>>>()?
                };
                let config = AnalysisConfig {
                    max_lag: lag.unwrap_or(config.max_lag),
                    alpha: alpha.unwrap_or(config.alpha),
                    pairs,
                    ..config
                };
                causality(&csv, &config)
            }
            Commands::Run {
                csv,
                plot_dir,
                json,
                output,
            } => {
                let config = AnalysisConfig {
                    plot_dir: plot_dir.or(config.plot_dir),
                    ..config
                };
                run(&csv, json, output.as_deref(), config)
            }
        }
    });

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn inspect(csv: &Path, rows: usize, config: &AnalysisConfig) -> anyhow::Result<()> {
    let table = load_table(csv, config)?;
    let (n_rows, n_cols) = table.shape();

    println!("{}", "Shape".bold());
    println!("{}", "=====".dimmed());
    println!("  ({}, {})", n_rows, n_cols);
    println!();

    println!("{}", "Head".bold());
    println!("{}", "====".dimmed());
    print!("{}", table.head(rows));
    println!();

    println!("{}", "Tail".bold());
    println!("{}", "====".dimmed());
    print!("{}", table.tail(rows));
    println!();

    let summary = table.summary();
    println!("{}", "Columns".bold());
    println!("{}", "=======".dimmed());
    if let (Some(start), Some(end)) = (summary.start, summary.end) {
        println!("  {} {} to {}", "Index:".bold(), start, end);
    }
    for (i, column) in summary.columns.iter().enumerate() {
        println!(
            "  {:>3}  {:<20} {:>6} non-null  {}",
            i, column.name, column.non_null, column.kind
        );
    }
    println!(
        "  {} float64({}), int64({})",
        "dtypes:".bold(),
        summary.float_columns,
        summary.integer_columns
    );
    println!();

    print_quality(&QualityReport::check(&table));
    Ok(())
}

fn correlate(csv: &Path, show_matrix: bool, config: &AnalysisConfig) -> anyhow::Result<()> {
    config.validate()?;
    let table = load_table(csv, config)?;
    let matrix = CorrelationMatrix::compute_all(&table)?;
    let correlated = config.correlation_scanner().scan_matrix(&matrix)?;

    if show_matrix {
        print_matrix(&matrix);
    }
    print_correlated(&config.reference, config.threshold, &correlated);

    if let Some(dir) = &config.plot_dir {
        fs::create_dir_all(dir)?;
        let heatmap = dir.join("correlation_matrix.svg");
        plot::render_heatmap(&matrix, Some(&config.reference), &heatmap)?;

        let monthly = MonthlyMeans::new().resample(&table)?;
        let columns: Vec<&str> = correlated.iter().map(|p| p.name.as_str()).collect();
        let charts = plot::render_monthly_charts(&monthly, &columns, dir)?;
        println!(
            "{} {} charts written to {}",
            "Plots:".bold(),
            charts.len() + 1,
            dir.display()
        );
    }
    Ok(())
}

fn causality(csv: &Path, config: &AnalysisConfig) -> anyhow::Result<()> {
    config.validate()?;
    let table = load_table(csv, config)?;
    let report = config.causality_scanner().scan(&table)?;
    print_causality(&report);
    Ok(())
}

fn run(
    csv: &Path,
    json: bool,
    output: Option<&Path>,
    config: AnalysisConfig,
) -> anyhow::Result<()> {
    let table = load_table(csv, &config)?;
    let report = Analysis::new(config)?.run(&table)?;

    if let Some(path) = output {
        fs::write(path, report.to_json()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    if json {
        println!("{}", report.to_json()?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_quality(quality: &QualityReport) {
    println!("{}", "Quality".bold());
    println!("{}", "=======".dimmed());
    let status = |count: usize| {
        if count == 0 {
            "0".green()
        } else {
            count.to_string().red().bold()
        }
    };
    println!("  {} {}", "Missing values:".bold(), status(quality.total_missing));
    for missing in quality.missing_by_column.iter().filter(|m| m.missing > 0) {
        println!("    {:<20} {}", missing.column, missing.missing);
    }
    println!("  {} {}", "Duplicate rows:".bold(), status(quality.duplicate_rows));
    println!("  {} {}", "Duplicate dates:".bold(), status(quality.duplicate_dates));
    println!();
}

fn print_matrix(matrix: &CorrelationMatrix) {
    println!("{}", "Correlation Matrix".bold());
    println!("{}", "==================".dimmed());
    print!("{:<16}", "");
    for label in matrix.labels() {
        print!(" {:>8}", short_label(label));
    }
    println!();
    for (label, row) in matrix.labels().iter().zip(matrix.rows()) {
        print!("{:<16}", label);
        for r in row {
            print!(" {:>8.3}", r);
        }
        println!();
    }
    println!();
}

fn short_label(label: &str) -> &str {
    label.split_whitespace().next().unwrap_or(label)
}

fn print_correlated(reference: &str, threshold: f64, correlated: &[CorrelatedPair]) {
    println!(
        "{}",
        format!("Pairs with |corr| > {} against {}", threshold, reference)
            .cyan()
            .bold()
    );
    for pair in correlated {
        let coefficient = format!("{:+.4}", pair.coefficient);
        let coefficient = if pair.coefficient >= 0.0 {
            coefficient.green()
        } else {
            coefficient.red()
        };
        println!("  {:<20} {}", pair.name, coefficient);
    }
    println!();
}

fn print_causality(report: &CausalityReport) {
    println!(
        "{}",
        format!(
            "Granger causality (lag {}, alpha {})",
            report.lag, report.alpha
        )
        .cyan()
        .bold()
    );
    for result in &report.results {
        println!("  {}", result.pair.to_string().bold());
        for by_lag in &result.by_lag {
            println!("    number of lags (no zero) {}", by_lag.lag);
            let f = &by_lag.f_test;
            println!(
                "    ssr based F test:         F={:<10.4} p={:<8.4} df_denom={:.0} df_num={:.0}",
                f.statistic,
                f.p_value,
                f.df_denom.unwrap_or(f64::NAN),
                f.df_num
            );
            println!(
                "    ssr based chi2 test:   chi2={:<10.4} p={:<8.4} df={:.0}",
                by_lag.chi2_test.statistic, by_lag.chi2_test.p_value, by_lag.chi2_test.df_num
            );
            println!(
                "    likelihood ratio test: chi2={:<10.4} p={:<8.4} df={:.0}",
                by_lag.lr_test.statistic, by_lag.lr_test.p_value, by_lag.lr_test.df_num
            );
        }
        let verdict = if result.rejects_null {
            format!("p={:.4} < {}: reject H0", result.p_value(), report.alpha)
                .green()
                .bold()
        } else {
            format!("p={:.4} >= {}: fail to reject H0", result.p_value(), report.alpha).yellow()
        };
        println!("    {}", verdict);
    }
    println!();

    let significant = report.significant();
    println!("{} {}", "Significant:".bold(), significant.len());
    for pair in significant {
        println!("  {}", pair);
    }
    println!();
}

fn print_report(report: &AnalysisReport) {
    println!("{}", "Summary".bold());
    println!("{}", "=======".dimmed());
    println!(
        "  {} ({}, {})",
        "Shape:".bold(),
        report.summary.rows,
        report.summary.columns.len()
    );
    if let (Some(start), Some(end)) = (report.summary.start, report.summary.end) {
        println!("  {} {} to {}", "Range:".bold(), start, end);
    }
    println!("  {} {}", "Monthly rows:".bold(), report.monthly_rows);
    println!();

    print_quality(&report.quality);
    print_correlated(&report.reference, report.threshold, &report.correlated);
    print_causality(&report.causality);

    if !report.charts.is_empty() {
        println!("{}", "Charts".bold());
        println!("{}", "======".dimmed());
        for chart in &report.charts {
            println!("  {}", chart.display());
        }
        println!();
    }
}
