use clap::Parser;
use log::LevelFilter;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::process;

use tabsight::analytics::{quality_report, AnalysisReport, Analyzer, QualityReport};
use tabsight::config::AnalysisConfig;
use tabsight::error::{Error, Result};
use tabsight::filter::FilterSet;
use tabsight::io;
use tabsight::ml::ClusterAssignment;

/// Analyze a tabular dataset and print the report as JSON
#[derive(Parser, Debug)]
#[command(name = "tabsight", version, about)]
struct Cli {
    /// Input file (.csv, .json, or .xlsx with the `excel` feature)
    file: PathBuf,

    /// Analysis configuration (.toml, .yaml or .json)
    #[arg(long, env = "TABSIGHT_CONFIG")]
    config: Option<PathBuf>,

    /// Category filter, e.g. `Type=Pump,Valve`; repeatable
    #[arg(long = "filter", value_name = "COL=V1,V2")]
    filters: Vec<String>,

    /// Range filter, e.g. `Flowrate=10..50` (either bound may be empty); repeatable
    #[arg(long = "range", value_name = "COL=MIN..MAX")]
    ranges: Vec<String>,

    /// Cluster the filtered rows on two columns
    #[arg(long, value_name = "X,Y")]
    cluster: Option<String>,

    /// Include the data quality report
    #[arg(long)]
    quality: bool,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,

    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct Output {
    report: AnalysisReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    clusters: Option<ClusterAssignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<QualityReport>,
}

fn configure_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level).target(env_logger::Target::Stderr);
    builder.init();
}

fn parse_category(arg: &str) -> Result<(String, Vec<String>)> {
    let (column, values) = arg
        .split_once('=')
        .ok_or_else(|| Error::InvalidParameter(format!("expected COL=V1,V2, got '{}'", arg)))?;
    let values = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    Ok((column.trim().to_string(), values))
}

fn parse_bound(text: &str, arg: &str) -> Result<Option<f64>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<f64>()
        .map(Some)
        .map_err(|_| Error::InvalidParameter(format!("invalid range bound '{}' in '{}'", text, arg)))
}

fn parse_range(arg: &str) -> Result<(String, Option<f64>, Option<f64>)> {
    let invalid = || Error::InvalidParameter(format!("expected COL=MIN..MAX, got '{}'", arg));
    let (column, bounds) = arg.split_once('=').ok_or_else(invalid)?;
    let (min, max) = bounds.split_once("..").ok_or_else(invalid)?;
    Ok((column.trim().to_string(), parse_bound(min, arg)?, parse_bound(max, arg)?))
}

fn parse_axes(arg: &str) -> Result<(String, String)> {
    match arg.split_once(',') {
        Some((x, y)) if !x.trim().is_empty() && !y.trim().is_empty() => {
            Ok((x.trim().to_string(), y.trim().to_string()))
        }
        _ => Err(Error::InvalidParameter(format!("expected X,Y, got '{}'", arg))),
    }
}

fn build_filters(cli: &Cli) -> Result<FilterSet> {
    let mut filters = FilterSet::new();
    for arg in &cli.filters {
        let (column, values) = parse_category(arg)?;
        filters = filters.category(&column, values);
    }
    for arg in &cli.ranges {
        let (column, min, max) = parse_range(arg)?;
        filters = filters.range(&column, min, max);
    }
    Ok(filters)
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    let analyzer = Analyzer::new(config)?;
    let filters = build_filters(cli)?;

    let table = io::read_table(&cli.file)?;
    if table.columns().is_empty() {
        return Err(Error::EmptyData(cli.file.display().to_string()));
    }
    log::info!(
        "loaded {} rows x {} columns from {}",
        table.len(),
        table.columns().len(),
        cli.file.display()
    );

    let report = analyzer.analyze(&table, &filters);
    let clusters = match &cli.cluster {
        Some(arg) => {
            let (x, y) = parse_axes(arg)?;
            Some(analyzer.cluster(&table, &filters, &x, &y)?)
        }
        None => None,
    };
    let quality = cli.quality.then(|| quality_report(&table, None));

    let output = Output {
        report,
        clusters,
        quality,
    };
    write_output(&output, cli.pretty, std::io::stdout().lock())
}

/// JSON document followed by a newline
fn write_output<W: Write>(output: &Output, pretty: bool, mut writer: W) -> Result<()> {
    if pretty {
        io::write_report_json_pretty(output, &mut writer)?;
    } else {
        io::write_report_json(output, &mut writer)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    configure_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        log::error!("{}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        let (column, values) = parse_category("Type=Pump, Valve,").unwrap();
        assert_eq!(column, "Type");
        assert_eq!(values, vec!["Pump", "Valve"]);
        assert!(parse_category("Type").is_err());
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(
            parse_range("Flowrate=10..50").unwrap(),
            ("Flowrate".to_string(), Some(10.0), Some(50.0))
        );
        assert_eq!(parse_range("P=..2.5").unwrap(), ("P".to_string(), None, Some(2.5)));
        assert!(parse_range("P=1-2").is_err());
        assert!(parse_range("P=a..2").is_err());
    }

    #[test]
    fn test_write_output_ends_with_newline() {
        let output = Output {
            report: AnalysisReport::default(),
            clusters: None,
            quality: None,
        };
        for pretty in [false, true] {
            let mut buf = Vec::new();
            write_output(&output, pretty, &mut buf).unwrap();
            let text = String::from_utf8(buf).unwrap();
            assert!(text.ends_with("}\n"));
            assert!(text.starts_with("{"));
            assert!(!text.contains("clusters"));
        }
    }

    #[test]
    fn test_write_output_reports_write_failure() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let output = Output {
            report: AnalysisReport::default(),
            clusters: None,
            quality: None,
        };
        assert!(write_output(&output, false, Closed).is_err());
    }

    #[test]
    fn test_parse_axes() {
        assert_eq!(parse_axes("x, y").unwrap(), ("x".to_string(), "y".to_string()));
        assert!(parse_axes("x").is_err());
    }
}
