pub mod cache;
pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_json;
pub mod io_xlsx;

use log::{debug, info, warn};

use padron_roster::report::{coordinator_report, network_report, ReportTable};
use padron_roster::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::canvass::cache::RollCache;
use crate::canvass::config_reader::*;
use crate::canvass::io_common::*;

#[derive(Debug, Snafu)]
pub enum CanvassError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet {name} in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("The workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error reading file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON in {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Expected an array of objects in {path}"))]
    JsonNotTable { path: String },
    #[snafu(display("Error writing the cache in {path}"))]
    WritingCache {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("No parent directory for {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("Provider not implemented: {provider}"))]
    UnknownProvider { provider: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type CanvassResult<T> = Result<T, CanvassError>;

fn read_table(root: &Path, source: &FileSource) -> CanvassResult<Vec<Row>> {
    let p: PathBuf = root.join(&source.file_path);
    let path = p.display().to_string();
    info!("Attempting to read table {:?}", path);
    match source.provider.as_str() {
        "csv" => io_csv::read_csv_table(&path),
        "json" => io_json::read_json_table(&path),
        "xlsx" => io_xlsx::read_excel_table(&path, source.worksheet_name.as_deref()),
        x => UnknownProviderSnafu { provider: x }.fail(),
    }
}

// A table that cannot be read is an empty table. The rest of the data is still usable.
fn read_table_or_empty(root: &Path, name: &str, source: Option<&FileSource>) -> Vec<Row> {
    let source = match source {
        Some(s) => s,
        None => {
            warn!("No source for table {}, using an empty table", name);
            return Vec::new();
        }
    };
    match read_table(root, source) {
        Ok(rows) => {
            debug!("read_table_or_empty: {}: {} rows", name, rows.len());
            rows
        }
        Err(e) => {
            warn!("Could not read table {}: {}. Using an empty table", name, e);
            Vec::new()
        }
    }
}

fn load_roll(root: &Path, source: &FileSource, cache: Option<&RollCache>) -> Vec<Row> {
    let res = read_table(root, source);
    match res {
        Ok(rows) if !rows.is_empty() => {
            if let Some(c) = cache {
                if let Err(e) = c.store_all(&rows) {
                    warn!("Could not update the padron cache: {}", e);
                }
            }
            rows
        }
        other => {
            match other {
                Err(e) => warn!("Could not read the padron: {}", e),
                Ok(_) => warn!("The padron source is empty"),
            }
            match cache.and_then(|c| c.get_all()) {
                Some(rows) => {
                    info!("Using the cached padron ({} rows)", rows.len());
                    rows
                }
                None => {
                    warn!("The padron is not available, people will not be matched");
                    Vec::new()
                }
            }
        }
    }
}

/// Reads the four tables of the campaign.
pub fn load_tables(config: &CanvassConfig, root: &Path, cache: Option<&RollCache>) -> Tables {
    let sources = &config.sources;
    let roll_rows = load_roll(root, &sources.padron, cache);
    let coordinator_rows =
        read_table_or_empty(root, "coordinadores", sources.coordinadores.as_ref());
    let sub_coordinator_rows =
        read_table_or_empty(root, "subcoordinadores", sources.subcoordinadores.as_ref());
    let voter_rows = read_table_or_empty(root, "votantes", sources.votantes.as_ref());
    Tables {
        roll: validate_roll(&roll_rows),
        coordinators: validate_assignments(&coordinator_rows, Role::Coordinator),
        sub_coordinators: validate_assignments(&sub_coordinator_rows, Role::SubCoordinator),
        voters: validate_assignments(&voter_rows, Role::Voter),
    }
}

fn acting_user(args: &Args) -> Option<ActingUser> {
    args.role.as_ref().map(|role| {
        ActingUser::new(
            normalize_opt_ci(args.user.as_deref()).as_str(),
            UserRole::from_tag(role.as_str()),
        )
    })
}

fn pool_entry_to_json(entry: &PoolEntry) -> JSValue {
    let mut js: JSMap<String, JSValue> = JSMap::new();
    js.insert("ci".to_string(), json!(entry.person.ci));
    js.insert("nombre".to_string(), json!(entry.person.first_name));
    js.insert("apellido".to_string(), json!(entry.person.last_name));
    js.insert("asignado".to_string(), json!(entry.is_assigned()));
    if let Some(holder) = &entry.holder {
        js.insert("asignadoComo".to_string(), json!(holder.role.tag()));
        if let Some(name) = &holder.assigned_by {
            js.insert("asignadoPor".to_string(), json!(name));
        }
    }
    JSValue::Object(js)
}

fn report_to_json(report: &ReportTable) -> JSValue {
    json!({
        "title": report.title,
        "header": report.header,
        "rows": report.rows,
    })
}

fn build_summary_js(
    config: &CanvassConfig,
    user: Option<&ActingUser>,
    roster: &Roster,
    view: &SearchView,
) -> JSValue {
    let campaign = config.output_settings.campaign_name.as_str();

    let mut stats: JSMap<String, JSValue> = JSMap::new();
    for (name, count) in compute_stats(roster, user).counters() {
        stats.insert(name.to_string(), json!(count));
    }
    let confirmation = confirmation_stats(roster, user);

    let availability = roster.availability();
    let page = search_page(&availability, view, &config.search_rules());
    let results: Vec<JSValue> = page.entries.iter().map(|e| pool_entry_to_json(e)).collect();

    let report = match user.map(|u| &u.role) {
        Some(UserRole::Superadmin) => Some(coordinator_report(
            roster,
            format!("{} - Coordinadores", campaign).as_str(),
        )),
        Some(UserRole::Coordinator) | Some(UserRole::SubCoordinator) => Some(network_report(
            roster,
            user,
            format!("{} - Votantes", campaign).as_str(),
        )),
        _ => None,
    };

    json!({
        "config": {
            "campaign": campaign,
            "user": user.map(|u| u.ci.clone()),
            "role": user.map(|u| u.role.tag().to_string()),
        },
        "roster": {
            "padron": roster.roll().len(),
            "coordinadores": roster.coordinators().len(),
            "subcoordinadores": roster.sub_coordinators().len(),
            "votantes": roster.voters().len(),
            "sinPadron": roster.unmatched_count(),
            "disponibles": availability.iter().filter(|e| !e.is_assigned()).count(),
        },
        "stats": stats,
        "confirmation": {
            "confirmados": confirmation.confirmed,
            "total": confirmation.total,
            "porcentaje": confirmation.percentage,
        },
        "search": {
            "query": view.query,
            "page": page.page,
            "pageCount": page.page_count,
            "totalMatches": page.total_matches,
            "results": results,
        },
        "report": report.as_ref().map(report_to_json),
    })
}

fn write_summary(pretty: &str, out: Option<String>) -> CanvassResult<()> {
    match out.as_deref() {
        None | Some("stdout") | Some("") => {
            println!("{}", pretty);
        }
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, pretty).context(WritingOutputSnafu { path })?;
        }
    }
    Ok(())
}

fn check_reference(pretty_js_stats: &str, summary_path: &str) -> CanvassResult<()> {
    let summary_ref = read_summary(summary_path)?;
    debug!("reference summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {
            path: summary_path,
        })?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

fn config_path(args: &Args) -> CanvassResult<String> {
    match &args.config {
        Some(p) => Ok(p.clone()),
        None => whatever!("No configuration file given (use --config)"),
    }
}

/// Computes the summary of a campaign for the acting user given on the command line.
pub fn run_summary(config: &CanvassConfig, config_path: &str, args: &Args) -> CanvassResult<JSValue> {
    let root = Path::new(config_path)
        .parent()
        .context(MissingParentDirSnafu { path: config_path })?;

    let cache = config
        .cache_directory()
        .map(|dir| RollCache::new(root.join(dir)));
    if args.clear_cache {
        match &cache {
            Some(c) => {
                if let Err(e) = c.clear() {
                    warn!("Could not clear the padron cache: {}", e);
                }
            }
            None => warn!("--clear-cache given but the cache is not enabled"),
        }
    }

    let tables = load_tables(config, root, cache.as_ref());
    let roster = Roster::link(tables);

    let user = acting_user(args);
    if user.is_none() {
        info!("No role given, statistics will be empty");
    }
    let view = SearchView {
        page: args.page.unwrap_or(1),
        ..SearchView::new(args.search.as_deref().unwrap_or(""))
    };

    Ok(build_summary_js(config, user.as_ref(), &roster, &view))
}

pub fn run(args: &Args) -> CanvassResult<()> {
    let config_path = config_path(args)?;
    let config = read_config(config_path.as_str())?;
    info!("config: {:?}", config);

    let summary = run_summary(&config, config_path.as_str(), args)?;
    let pretty_js_stats = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {
        path: "<summary>",
    })?;

    let out = args
        .out
        .clone()
        .or_else(|| config.output_settings.output_path.clone());
    write_summary(&pretty_js_stats, out)?;

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        check_reference(&pretty_js_stats, summary_p)?;
    }
    Ok(())
}

#[cfg(test)]
fn test_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

#[cfg(test)]
fn summary_of(dir: &Path, args: &Args) -> JSValue {
    let config_path = dir.join("config.json").display().to_string();
    let config = read_config(config_path.as_str()).unwrap();
    run_summary(&config, config_path.as_str(), args).unwrap()
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str, user: Option<&str>, role: Option<&str>, search: Option<&str>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = test_dir().join(test_name);
    let args = Args {
        user: user.map(|s| s.to_string()),
        role: role.map(|s| s.to_string()),
        search: search.map(|s| s.to_string()),
        ..Args::default()
    };
    let pretty = serde_json::to_string_pretty(&summary_of(&dir, &args)).unwrap();
    let reference = dir.join("expected_summary.json").display().to_string();
    if let Err(e) = check_reference(&pretty, &reference) {
        panic!("{}: {}\n{}", test_name, e, pretty);
    }
}
