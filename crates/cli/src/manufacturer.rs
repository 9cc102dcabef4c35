//! `brandmap map | assign | investigate | validate`.

use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

use brandmap_io::{
    assign_manufacturer_by_title, list_manual_investigation_items, persist_run,
    validate_manufacturer_mapping, ManufacturerRecord, ManufacturerStore, MapRequest, StoreError,
    DEFAULT_DATABASE,
};
use brandmap_recon::{MapConfig, ReconError};

use crate::exit_codes::{EXIT_ASSIGN_CONFLICT, EXIT_FILE_ACCESS, EXIT_INVALID_INPUT};
use crate::CliError;

/// Where a `map` run takes its inputs from, before resolution.
pub struct MapArgs {
    pub config: Option<PathBuf>,
    pub sources: Vec<PathBuf>,
    pub match_source: Option<PathBuf>,
    pub db: Option<PathBuf>,
}

/// A fully resolved `map` invocation.
#[derive(Debug)]
struct MapPlan {
    request: MapRequest,
    database: PathBuf,
}

fn load_config(path: &Path) -> Result<MapConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_FILE_ACCESS, format!("cannot read config {}: {e}", path.display()))
    })?;
    MapConfig::from_toml(&text).map_err(|e| CliError::new(EXIT_INVALID_INPUT, e.to_string()))
}

/// Merge the run config with command-line flags; flags win.
fn resolve_plan(args: MapArgs) -> Result<MapPlan, CliError> {
    let config = match &args.config {
        Some(path) => {
            let config = load_config(path)?;
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            Some((config, base.to_path_buf()))
        }
        None => None,
    };

    let other_sources = if !args.sources.is_empty() {
        args.sources
    } else if let Some((config, base)) = &config {
        config.source_paths(base)
    } else {
        return Err(CliError::usage("no source files given")
            .with_hint("pass a run config or at least one --source FILE"));
    };

    let match_source = match (args.match_source, &config) {
        (Some(path), _) => path,
        (None, Some((config, base))) => config.match_path(base),
        (None, None) => {
            return Err(CliError::usage("no match file given").with_hint("pass --match FILE"));
        }
    };

    let database = args
        .db
        .or_else(|| config.as_ref().and_then(|(config, base)| config.database_path(base)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE));

    Ok(MapPlan {
        request: MapRequest { other_sources, match_source },
        database,
    })
}

fn open_store(db: Option<PathBuf>) -> Result<ManufacturerStore, CliError> {
    let path = db.unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE));
    debug!("opening record store {}", path.display());
    Ok(ManufacturerStore::open(&path)?)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))
}

fn print_record(rec: &ManufacturerRecord) {
    let flag = if rec.investigation_required { "investigate" } else { "ok" };
    println!(
        "{}\t{}\t{}\t{}\t{}",
        rec.name, rec.related_manufacturers, rec.relation_type, flag, rec.title
    );
}

// ============================================================================
// map
// ============================================================================

pub fn cmd_map(args: MapArgs, json_output: bool, output_file: Option<PathBuf>) -> Result<(), CliError> {
    let plan = resolve_plan(args)?;
    // Fail on blank paths before creating a database file.
    plan.request
        .validate()
        .map_err(|e| CliError::store(StoreError::Pipeline(e)))?;

    // Run the pipeline first so a failed read leaves no database file behind.
    let run = brandmap_recon::run(plan.request.other_sources.as_slice(), &plan.request.match_source)
        .map_err(|e| CliError::store(StoreError::Pipeline(e)))?;

    let mut store = open_store(Some(plan.database.clone()))?;
    let outcome = persist_run(&mut store, run)?;

    let json_str = to_json(&outcome)?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::general(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &outcome.summary;
    eprintln!(
        "mapped {} products from {} file(s): {} new record(s) in {}, {} need investigation",
        s.products,
        outcome.meta.source_files,
        outcome.inserted.len(),
        plan.database.display(),
        s.investigation_required,
    );
    if !s.relation_counts.is_empty() {
        let counts: Vec<String> = s
            .relation_counts
            .iter()
            .map(|(label, n)| {
                let label = if label.is_empty() { "(none)" } else { label.as_str() };
                format!("{label}={n}")
            })
            .collect();
        eprintln!("relations: {}", counts.join(", "));
    }

    Ok(())
}

// ============================================================================
// assign
// ============================================================================

pub fn cmd_assign(db: Option<PathBuf>, title: &str, json_output: bool) -> Result<(), CliError> {
    if title.trim().is_empty() {
        return Err(CliError::store(ReconError::InvalidInput("title is blank".into()).into()));
    }

    let store = open_store(db)?;
    let Some(record) = assign_manufacturer_by_title(&store, title)? else {
        let name = title.split_whitespace().take(2).collect::<Vec<_>>().join(" ");
        return Err(CliError::new(
            EXIT_ASSIGN_CONFLICT,
            format!("record \"{name}\" already exists with a different manufacturer list"),
        )
        .with_hint("nothing was stored; inspect the existing record or use a more specific title"));
    };

    if json_output {
        println!("{}", to_json(&record)?);
    } else {
        print_record(&record);
    }
    Ok(())
}

// ============================================================================
// investigate
// ============================================================================

pub fn cmd_investigate(db: Option<PathBuf>, json_output: bool) -> Result<(), CliError> {
    let store = open_store(db)?;
    let items = list_manual_investigation_items(&store)?;

    if json_output {
        println!("{}", to_json(&items)?);
    } else {
        for rec in &items {
            print_record(rec);
        }
    }
    eprintln!("{} record(s) need investigation", items.len());
    Ok(())
}

// ============================================================================
// validate
// ============================================================================

#[derive(Serialize)]
struct ValidationReport {
    generic_names: Vec<String>,
}

pub fn cmd_validate(db: Option<PathBuf>, json_output: bool) -> Result<(), CliError> {
    let store = open_store(db)?;
    let report = ValidationReport { generic_names: validate_manufacturer_mapping(&store)? };

    if json_output {
        println!("{}", to_json(&report)?);
    } else {
        for name in &report.generic_names {
            println!("{name}");
        }
    }
    eprintln!("{} record(s) carry a generic manufacturer name", report.generic_names.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args(config: Option<PathBuf>) -> MapArgs {
        MapArgs { config, sources: vec![], match_source: None, db: None }
    }

    #[test]
    fn plan_from_config_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("run.toml");
        fs::write(
            &config,
            "other_sources = [\"a.csv\", \"b.csv\"]\nmatch_source = \"m.csv\"\ndatabase = \"out.db\"\n",
        )
        .unwrap();

        let plan = resolve_plan(args(Some(config))).unwrap();
        assert_eq!(
            plan.request.other_sources,
            vec![dir.path().join("a.csv"), dir.path().join("b.csv")]
        );
        assert_eq!(plan.request.match_source, dir.path().join("m.csv"));
        assert_eq!(plan.database, dir.path().join("out.db"));
    }

    #[test]
    fn flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("run.toml");
        fs::write(&config, "other_sources = [\"a.csv\"]\nmatch_source = \"m.csv\"\n").unwrap();

        let plan = resolve_plan(MapArgs {
            config: Some(config),
            sources: vec!["x.csv".into()],
            match_source: Some("y.csv".into()),
            db: Some("z.db".into()),
        })
        .unwrap();
        assert_eq!(plan.request.other_sources, vec![PathBuf::from("x.csv")]);
        assert_eq!(plan.request.match_source, PathBuf::from("y.csv"));
        assert_eq!(plan.database, PathBuf::from("z.db"));
    }

    #[test]
    fn flags_only_uses_default_database() {
        let plan = resolve_plan(MapArgs {
            config: None,
            sources: vec!["a.csv".into()],
            match_source: Some("m.csv".into()),
            db: None,
        })
        .unwrap();
        assert_eq!(plan.database, PathBuf::from(DEFAULT_DATABASE));
    }

    #[test]
    fn missing_inputs_are_usage_errors() {
        let err = resolve_plan(args(None)).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_USAGE);

        let err = resolve_plan(MapArgs {
            config: None,
            sources: vec!["a.csv".into()],
            match_source: None,
            db: None,
        })
        .unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_USAGE);
    }

    #[test]
    fn bad_config_codes() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_plan(args(Some(dir.path().join("absent.toml")))).unwrap_err();
        assert_eq!(err.code, EXIT_FILE_ACCESS);

        let config = dir.path().join("run.toml");
        fs::write(&config, "other_sources = []\nmatch_source = \"m.csv\"\n").unwrap();
        let err = resolve_plan(args(Some(config))).unwrap_err();
        assert_eq!(err.code, EXIT_INVALID_INPUT);
    }
}
