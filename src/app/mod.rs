use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

use station_filter::config::FiltersConfig;
use station_filter::filter::{
    Instrumentation, NoInstrumentation, PhaseTimer, station_area_filter,
    station_filter_instrumented,
};
use station_filter::metadata::{MetadataSource, load_area};
use station_filter::model::Station;
use station_filter::predicates::station_matches_dates;
use station_filter::sinks::{DataSink, GeoJsonSink, GeoJsonlSink, station_feature_row};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding stations.json, networks.json, variables.json
    /// and optionally frequencies.json
    #[arg(short, long, env = "STATION_FILTER_METADATA")]
    pub metadata: PathBuf,

    /// Filter configuration file (YAML)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Output file (.geojson, .geojsonl), or - for stdout
    #[arg(short, long)]
    pub output: PathBuf,

    /// Output format (auto-detected if omitted)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// GeoJSON area, overriding the configured one
    #[arg(long)]
    pub area: Option<PathBuf>,

    /// Require the query range to lie within a station's observed range
    #[arg(long)]
    pub strict_dates: bool,

    /// Log per-predicate timings
    #[arg(long)]
    pub timings: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum OutputFormat {
    #[value(name = "geojson")]
    GeoJson,
    #[value(name = "geojsonl")]
    GeoJsonl,
}

pub fn output_format_label(format: &OutputFormat) -> &'static str {
    match format {
        OutputFormat::GeoJson => "geojson",
        OutputFormat::GeoJsonl => "geojsonl",
    }
}

pub fn detect_format(cli: &Cli) -> Result<OutputFormat> {
    if let Some(format) = cli.format {
        return Ok(format);
    }
    if cli.output == Path::new("-") {
        return Ok(OutputFormat::GeoJsonl);
    }
    cli.output
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| match ext.to_lowercase().as_str() {
            "geojson" => Some(OutputFormat::GeoJson),
            "geojsonl" | "jsonl" | "json" => Some(OutputFormat::GeoJsonl),
            _ => None,
        })
        .context("CLI: Could not detect output format from extension; use --format")
}

pub fn init_sink(format: &OutputFormat, output: &Path) -> Result<Box<dyn DataSink>> {
    match format {
        OutputFormat::GeoJson => {
            if output == Path::new("-") {
                anyhow::bail!(
                    "CLI: GeoJSON output to stdout is not supported; use geojsonl instead"
                );
            }
            tracing::info!("Sink: {} -> {:?}", output_format_label(format), output);
            Ok(Box::new(GeoJsonSink::new(output)?))
        }
        OutputFormat::GeoJsonl => {
            if output == Path::new("-") {
                tracing::info!("Sink: {} -> stdout", output_format_label(format));
                Ok(Box::new(GeoJsonlSink::stdout()?))
            } else {
                tracing::info!("Sink: {} -> {:?}", output_format_label(format), output);
                Ok(Box::new(GeoJsonlSink::new(output)?))
            }
        }
    }
}

/// Load, filter and write. Returns the number of features written.
pub fn run(cli: &Cli) -> Result<usize> {
    let config = FiltersConfig::load(&cli.config)?;
    let compiled = config.compile();
    tracing::info!(
        "Filters: {} network clauses, {} station clauses",
        compiled.networks.expressions().len(),
        compiled.stations.expressions().len()
    );

    let metadata = MetadataSource::new(&cli.metadata).load(&compiled)?;
    let criteria = config.criteria.resolve(&metadata);

    let area = match cli.area.as_deref().or(config.area.as_deref()) {
        Some(path) => Some(load_area(path)?),
        None => None,
    };

    let format = detect_format(cli)?;
    let mut sink = init_sink(&format, &cli.output)?;

    let mut timer = PhaseTimer::new();
    let mut untimed = NoInstrumentation;
    let instrumentation: &mut dyn Instrumentation = if cli.timings {
        &mut timer
    } else {
        &mut untimed
    };

    let mut matches = station_filter_instrumented(&criteria, &metadata, instrumentation);
    tracing::info!(
        "Filter: {} of {} stations match criteria",
        matches.len(),
        metadata.stations.len()
    );

    if cli.strict_dates {
        matches.retain(|station| {
            station_matches_dates(station, criteria.start_date, criteria.end_date, true)
        });
        tracing::info!("Filter: {} stations after strict date check", matches.len());
    }

    let matches: Vec<&Station> =
        station_area_filter(area.as_ref(), matches).context("Area: Unusable area geometry")?;
    if area.is_some() {
        tracing::info!("Filter: {} stations inside area", matches.len());
    }

    if cli.timings {
        for (phase, total) in timer.phases() {
            tracing::info!(
                "Timing: {} {:.3}ms ({} calls)",
                phase,
                total.elapsed.as_secs_f64() * 1000.0,
                total.calls
            );
        }
    }

    let mut written = 0;
    for station in matches {
        let network_name = metadata
            .network(&station.network_uri)
            .map(|network| network.name.as_str());
        if let Some(row) = station_feature_row(station, network_name)? {
            sink.add_feature(row)?;
            written += 1;
        }
    }
    sink.finish().context("Sink: Failed to finalize output")?;

    Ok(written)
}
