use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::{collections::BTreeMap, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use worldpop::{
    config::Settings,
    export,
    query::{
        ratio_extremes, ContinentTotal, ContinentYearTotal, CountryOverview, CountrySummary,
        GlobalSummary, RatioExtremes, RatioPoint,
    },
    CanonicalDataset, DatasetCache, SeriesPoint,
};

#[derive(Parser)]
#[command(author, version, about = "Query the world population dataset")]
struct Args {
    /// Wide population table (.csv, or .zip holding one)
    #[arg(long, env = "WORLDPOP_DATA")]
    data: Option<PathBuf>,

    /// JSON settings file with dashboard defaults
    #[arg(long, env = "WORLDPOP_CONFIG")]
    config: Option<PathBuf>,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Single-country detail
    Overview {
        country: Option<String>,
        #[arg(long)]
        from: Option<i32>,
        #[arg(long)]
        to: Option<i32>,
    },
    /// Multi-country comparison
    Compare {
        countries: Vec<String>,
        #[arg(long)]
        from: Option<i32>,
        #[arg(long)]
        to: Option<i32>,
        /// Ratio of two series as NUMERATOR:DENOMINATOR, e.g. Kenya:World
        #[arg(long)]
        ratio: Option<String>,
    },
    /// Rankings and continental rollups for one year
    Global {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        top: Option<usize>,
    },
    /// World and continental series over all years
    Trends,
    /// List countries, optionally within a continent
    Countries {
        #[arg(long)]
        continent: Option<String>,
    },
    /// Write the canonical dataset to a file
    Export {
        out: PathBuf,
        #[arg(long, value_enum, default_value_t = ExportFormat::Parquet)]
        format: ExportFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Parquet,
    Json,
}

#[derive(Serialize)]
struct OverviewView<'a> {
    country: String,
    overview: Option<CountryOverview>,
    series: Vec<&'a SeriesPoint>,
}

#[derive(Serialize)]
struct RatioView {
    numerator: String,
    denominator: String,
    points: Vec<RatioPoint>,
    extremes: Option<RatioExtremes>,
}

#[derive(Serialize)]
struct CompareView<'a> {
    countries: Vec<String>,
    series: Vec<&'a SeriesPoint>,
    table: BTreeMap<i32, BTreeMap<String, f64>>,
    summary: Vec<CountrySummary>,
    ratio: Option<RatioView>,
}

#[derive(Serialize)]
struct GlobalView<'a> {
    year: i32,
    top_population: Vec<&'a SeriesPoint>,
    top_growth: Vec<&'a SeriesPoint>,
    continents: Vec<ContinentTotal>,
    summary: GlobalSummary,
}

#[derive(Serialize)]
struct TrendsView<'a> {
    world: Vec<&'a SeriesPoint>,
    continents: Vec<ContinentYearTotal>,
}

fn main() -> Result<()> {
    // logs go to stderr so stdout carries only results
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(data) = args.data {
        settings.data_path = data;
    }
    info!(data = %settings.data_path.display(), "startup");

    let cache = DatasetCache::new(&settings.data_path);
    let dataset = cache
        .get_or_load()
        .with_context(|| format!("loading dataset {:?}", settings.data_path))?;
    let (year_min, year_max) = dataset.year_bounds().unwrap_or((0, 0));

    match args.command {
        Command::Overview { country, from, to } => {
            let country = country.unwrap_or_else(|| settings.default_country.clone());
            let (lo, hi) = (from.unwrap_or(year_min), to.unwrap_or(year_max));
            let view = OverviewView {
                overview: dataset.country_overview(&country, lo, hi),
                series: dataset.by_country_and_year_range(&country, lo, hi),
                country,
            };
            emit(args.json, &view, print_overview)?;
        }
        Command::Compare {
            countries,
            from,
            to,
            ratio,
        } => {
            let countries = if countries.is_empty() {
                settings.default_comparison.clone()
            } else {
                countries
            };
            let (lo, hi) = (from.unwrap_or(year_min), to.unwrap_or(year_max));
            let ratio = match ratio {
                Some(spec) => Some(ratio_view(&dataset, &spec, lo, hi)?),
                None => None,
            };
            let view = CompareView {
                series: dataset.by_countries_and_year_range(&countries, lo, hi),
                table: dataset.population_table(&countries, lo, hi),
                summary: dataset.comparison_summary(&countries, lo, hi),
                countries,
                ratio,
            };
            emit(args.json, &view, print_compare)?;
        }
        Command::Global { year, top } => {
            let year = year.unwrap_or(year_max);
            let n = top.unwrap_or(settings.top_n);
            let totals = dataset.continental_totals(year, true);
            let view = GlobalView {
                year,
                top_population: dataset.top_n_by_population(year, n, true),
                top_growth: dataset.top_n_by_growth_rate(year, n),
                continents: totals.by_population().into_iter().cloned().collect(),
                summary: dataset.global_summary(year),
            };
            emit(args.json, &view, print_global)?;
        }
        Command::Trends => {
            let view = TrendsView {
                world: dataset.world_series(),
                continents: dataset.continental_trends(),
            };
            emit(args.json, &view, print_trends)?;
        }
        Command::Countries { continent } => {
            let countries = dataset.countries(continent.as_deref());
            emit(args.json, &countries, |c| {
                for name in c {
                    println!("{}", name);
                }
            })?;
        }
        Command::Export { out, format } => match format {
            ExportFormat::Parquet => export::write_parquet(dataset.points(), &out)?,
            ExportFormat::Json => export::write_json(dataset.points(), &out)?,
        },
    }

    Ok(())
}

fn ratio_view(dataset: &CanonicalDataset, spec: &str, lo: i32, hi: i32) -> Result<RatioView> {
    let Some((num, den)) = spec.split_once(':') else {
        bail!("--ratio expects NUMERATOR:DENOMINATOR, got {:?}", spec);
    };
    let points = dataset.ratio(num.trim(), den.trim(), lo, hi);
    if points.is_empty() {
        warn!(numerator = num, denominator = den, "ratio has no overlapping years");
    }
    Ok(RatioView {
        numerator: num.trim().to_string(),
        denominator: den.trim().to_string(),
        extremes: ratio_extremes(&points),
        points,
    })
}

fn emit<T: Serialize>(json: bool, view: &T, text: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        text(view);
    }
    Ok(())
}

/// `1234567.0` → `1,234,567`
fn thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}%", v))
}

fn print_series(series: &[&SeriesPoint]) {
    println!("{: <25} {:>6} {:>16} {:>10}", "Country", "Year", "Population", "Growth");
    println!("{:-<60}", "");
    for p in series {
        println!(
            "{: <25} {:>6} {:>16} {:>10}",
            p.country,
            p.year,
            thousands(p.population),
            pct(p.growth_rate)
        );
    }
}

fn print_overview(view: &OverviewView) {
    let Some(o) = &view.overview else {
        println!("No data available for {}.", view.country);
        return;
    };
    println!("\n--- {} ---", o.country);
    println!("Current population ({}): {}", o.latest_year, thousands(o.latest_population));
    println!("Total growth since {}: {}", o.earliest_year, pct(o.total_growth));
    println!("Recent growth rate: {}", pct(o.recent_growth_rate));
    println!("Total change: {}", thousands(o.total_change));
    println!();
    print_series(&view.series);
}

fn print_compare(view: &CompareView) {
    if view.series.is_empty() {
        println!("No data available for {}.", view.countries.join(", "));
        return;
    }

    println!("\n--- Population: {} ---", view.countries.join(", "));
    print!("{:>6}", "Year");
    for c in &view.countries {
        print!(" {:>16}", c);
    }
    println!();
    for (year, row) in &view.table {
        print!("{:>6}", year);
        for c in &view.countries {
            let cell = row.get(c).map_or_else(|| "-".to_string(), |v| thousands(*v));
            print!(" {:>16}", cell);
        }
        println!();
    }

    println!("\n--- Summary ---");
    println!(
        "{: <25} {:>6} {:>16} {:>16} {:>10}",
        "Country", "Latest", "Population", "Earliest", "Growth"
    );
    for s in &view.summary {
        println!(
            "{: <25} {:>6} {:>16} {:>16} {:>10}",
            s.country,
            s.latest_year,
            thousands(s.latest_population),
            thousands(s.earliest_population),
            pct(s.growth)
        );
    }

    if let Some(r) = &view.ratio {
        println!("\n--- {} as % of {} ---", r.numerator, r.denominator);
        for p in &r.points {
            println!("{:>6} {:>10.3}%", p.year, p.percentage);
        }
        if let Some(e) = &r.extremes {
            println!(
                "Highest: {:.2}% ({})  Current ({}): {:.2}%",
                e.highest.percentage, e.highest.year, e.latest.year, e.latest.percentage
            );
        }
    }
}

fn print_global(view: &GlobalView) {
    println!("\n--- Top {} most populous ({}) ---", view.top_population.len(), view.year);
    print_series(&view.top_population);

    println!("\n--- Fastest growing ({}) ---", view.year);
    print_series(&view.top_growth);

    println!("\n--- Continents ({}) ---", view.year);
    println!("{: <20} {:>16} {:>10} {:>10}", "Continent", "Population", "% of World", "Countries");
    for c in &view.continents {
        println!(
            "{: <20} {:>16} {:>9.2}% {:>10}",
            c.continent,
            thousands(c.population),
            c.percentage,
            c.countries
        );
    }

    let s = &view.summary;
    println!("\n--- Global summary ({}) ---", s.year);
    println!(
        "World population: {}",
        s.world_population.map_or_else(|| "-".to_string(), thousands)
    );
    println!("Countries/territories: {}", s.countries);
    println!("Continents: {}", s.continents);
    println!("Avg. growth rate: {}", pct(s.average_growth_rate));
}

fn print_trends(view: &TrendsView) {
    println!("\n--- World ---");
    print_series(&view.world);

    println!("\n--- Continents ---");
    println!("{:>6} {: <20} {:>16}", "Year", "Continent", "Population");
    for t in &view.continents {
        println!("{:>6} {: <20} {:>16}", t.year, t.continent, thousands(t.population));
    }
}
