//! CLI command implementations
//!
//! Every command returns the process exit code: 0 on success, 1 when files
//! need attention (`fmt --check`, `check`).

use anyhow::{Context, Result};
use marginalia_core::{
    AugmentedUnparser, ClassifierConfiguration, CollectingSink, ConfigLoader, DirectiveFamily,
    DumpOptions, MarginaliaConfig, Pipeline, PrinterConfiguration, PrinterOptions,
    RoundTripValidator, SpanRetention, SpliceEvent, ValidationResult, dump, parse_module,
    trivia_tokens,
};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::output::{RunSummary, print_check_summary, print_format_summary, render_diff};

/// Extension of the sources the parser reads.
const SOURCE_EXTENSION: &str = "py";

/// Load the explicit config, or discover one next to the first path.
fn load_config(config_path: Option<&Path>, paths: &[PathBuf]) -> Result<MarginaliaConfig> {
    let start_path = match paths.first() {
        Some(path) if path.is_file() => path.parent().map(Path::to_path_buf),
        Some(path) if path.is_dir() => Some(path.clone()),
        _ => None,
    };
    let config = ConfigLoader::load(config_path, start_path.as_deref())?;
    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Expand directories into the sources below them.
///
/// Files named explicitly are kept whatever their extension.
pub fn discover_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.exists() {
            anyhow::bail!("Path not found: {}", path.display());
        }
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_hidden(entry))
        {
            let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|ext| ext.to_str()) == Some(SOURCE_EXTENSION)
            {
                files.push(entry.into_path());
            }
        }
    }
    debug!("Discovered {} file(s)", files.len());
    Ok(files)
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

struct Formatted {
    path: PathBuf,
    original: String,
    formatted: String,
}

impl Formatted {
    fn changed(&self) -> bool {
        self.original != self.formatted
    }
}

fn format_file(path: &Path, pipeline: &Pipeline, options: PrinterOptions) -> Result<Formatted> {
    let original = read_source(path)?;
    let tree = pipeline
        .parse(&original)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let formatted = AugmentedUnparser::new(options).unparse(&tree);
    Ok(Formatted {
        path: path.to_path_buf(),
        original,
        formatted,
    })
}

/// Format command implementation
pub fn format_command(
    paths: Vec<PathBuf>,
    check: bool,
    diff: bool,
    config_path: Option<&Path>,
) -> Result<i32> {
    debug!("Running fmt on paths: {:?}", paths);
    let start = Instant::now();

    let config = load_config(config_path, &paths)?;
    let pipeline = Pipeline::from_config(&config);
    let options = PrinterOptions::from(&config.printer_config());
    let files = discover_files(&paths)?;
    info!("Formatting {} file(s)", files.len());

    let outcomes: Vec<_> = files
        .par_iter()
        .map(|path| format_file(path, &pipeline, options))
        .collect();

    let mut summary = RunSummary::new();
    for outcome in outcomes {
        summary.files_checked += 1;
        let formatted = match outcome {
            Ok(formatted) => formatted,
            Err(e) => {
                warn!("{:#}", e);
                eprintln!("error: {e:#}");
                summary.files_failed += 1;
                continue;
            }
        };
        if !formatted.changed() {
            continue;
        }
        summary.files_changed += 1;

        if diff {
            print!(
                "{}",
                render_diff(&formatted.path, &formatted.original, &formatted.formatted)
            );
        }
        if check {
            println!("Would reformat: {}", formatted.path.display());
        } else {
            fs::write(&formatted.path, &formatted.formatted)
                .with_context(|| format!("Failed to write {}", formatted.path.display()))?;
            println!("Formatted: {}", formatted.path.display());
        }
    }

    print_format_summary(&summary, check, start.elapsed());

    let needs_attention = check && summary.files_changed > 0;
    Ok(if summary.has_failures() || needs_attention {
        1
    } else {
        0
    })
}

/// Dump command implementation
pub fn dump_command(
    file: PathBuf,
    json: bool,
    plain: bool,
    config_path: Option<&Path>,
) -> Result<i32> {
    let config = load_config(config_path, std::slice::from_ref(&file))?;
    let source = read_source(&file)?;
    let tree = if plain {
        parse_module(&source, SpanRetention::Native)?
    } else {
        Pipeline::from_config(&config).parse(&source)?
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&tree).context("Failed to serialize tree")?
        );
    } else {
        let options = if plain {
            DumpOptions::without_trivia()
        } else {
            DumpOptions::default()
        };
        println!("{}", dump(&tree, options));
    }
    Ok(0)
}

/// Tokens command implementation
pub fn tokens_command(file: PathBuf, json: bool, config_path: Option<&Path>) -> Result<i32> {
    let config = load_config(config_path, std::slice::from_ref(&file))?;
    let source = read_source(&file)?;
    let tree = parse_module(&source, SpanRetention::Native)?;
    let tokens = trivia_tokens(&source)?;

    let mut sink = CollectingSink::new();
    Pipeline::from_config(&config).insert_trivia(&source, tree, &tokens, &mut sink)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(sink.events()).context("Failed to serialize events")?
        );
        return Ok(0);
    }

    for token in &tokens {
        let events: Vec<_> = sink
            .events()
            .iter()
            .filter(|event| event.scope() == token.scope)
            .collect();
        let mut line = format!("{:<12} #{}", token.scope.start.to_string(), token.text);
        for event in events {
            match event {
                SpliceEvent::Classified { kind, .. } => line.push_str(&format!("  [{kind}]")),
                SpliceEvent::Anchored {
                    owner,
                    field,
                    index,
                    ..
                } => line.push_str(&format!("  -> {owner}.{field}[{index}]")),
                SpliceEvent::Inserted { end_of_line, .. } if *end_of_line => {
                    line.push_str("  (end of line)");
                }
                SpliceEvent::Inserted { .. } => {}
            }
        }
        println!("{line}");
    }
    println!("{} trivia token(s)", sink.inserted().count());
    Ok(0)
}

fn print_failure(path: &Path, result: &ValidationResult, details: bool) {
    println!("Does not round-trip: {}", path.display());
    for issue in result.issues() {
        println!("  {issue}");
    }
    if !details {
        return;
    }
    for difference in &result.differences {
        if let (Some(expected), Some(actual)) = (&difference.expected, &difference.actual) {
            println!("  expected: {expected}");
            println!("  actual:   {actual}");
        }
    }
    println!("  rendered:");
    for line in result.rendered.lines() {
        println!("    {line}");
    }
}

/// Check command implementation
pub fn check_command(paths: Vec<PathBuf>, details: bool, config_path: Option<&Path>) -> Result<i32> {
    debug!("Running round-trip check on paths: {:?}", paths);
    let start = Instant::now();

    let config = load_config(config_path, &paths)?;
    let validator = RoundTripValidator::from_config(&config);
    let files = discover_files(&paths)?;

    let outcomes: Vec<_> = files
        .par_iter()
        .map(|path| {
            let source = read_source(path)?;
            validator
                .validate(&source)
                .with_context(|| format!("Failed to parse {}", path.display()))
        })
        .collect();

    let mut summary = RunSummary::new();
    for (path, outcome) in files.iter().zip(outcomes) {
        summary.files_checked += 1;
        match outcome {
            Ok(result) if result.is_valid() => debug!("{} round-trips", path.display()),
            Ok(result) => {
                summary.files_changed += 1;
                print_failure(path, &result, details);
            }
            Err(e) => {
                warn!("{:#}", e);
                eprintln!("error: {e:#}");
                summary.files_failed += 1;
            }
        }
    }

    print_check_summary(&summary, start.elapsed());
    Ok(if summary.is_clean() { 0 } else { 1 })
}

/// Config show command implementation
pub fn config_show_command(resolved: bool, config_path: Option<&Path>) -> Result<i32> {
    debug!("Showing configuration (resolved: {})", resolved);
    let config = ConfigLoader::load(config_path, None)?;

    if resolved {
        let source = match config_path {
            Some(path) => Some(path.to_path_buf()),
            None => ConfigLoader::auto_discover(Path::new("."))?,
        };
        match source {
            Some(path) => println!("# Loaded from {}", path.display()),
            None => println!("# No configuration file found, using defaults"),
        }
        let mut effective = config.clone();
        effective.merge_with(MarginaliaConfig {
            schema: None,
            classifier: Some(ClassifierConfiguration::default()),
            printer: Some(PrinterConfiguration::default()),
        });
        print!(
            "{}",
            toml::to_string_pretty(&effective).context("Failed to serialize config")?
        );
    } else {
        print!(
            "{}",
            toml::to_string_pretty(&config).context("Failed to serialize config")?
        );
    }
    Ok(0)
}

/// Config schema command implementation
pub fn config_schema_command() -> Result<i32> {
    println!(
        "{}",
        serde_json::to_string_pretty(&MarginaliaConfig::json_schema())
            .context("Failed to serialize schema")?
    );
    Ok(0)
}

/// Version command implementation
pub fn version_command(detailed: bool) -> Result<i32> {
    println!("marginalia {}", env!("CARGO_PKG_VERSION"));
    if detailed {
        println!("{} {}", marginalia_core::NAME, marginalia_core::VERSION);
        let families: Vec<_> = DirectiveFamily::ALL
            .iter()
            .map(|family| family.name())
            .collect();
        println!("Directive families: {}", families.join(", "));
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_files_skips_hidden_and_foreign() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join(".venv")).unwrap();
        fs::write(dir.path().join(".venv").join("b.py"), "").unwrap();
        fs::create_dir(dir.path().join("pkg")).unwrap();
        fs::write(dir.path().join("pkg").join("c.py"), "").unwrap();

        let files = discover_files(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|path| path.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.py", "c.py"]);
    }

    #[test]
    fn test_discover_missing_path() {
        let err = discover_files(&[PathBuf::from("/no/such/dir")]).unwrap_err();
        assert!(err.to_string().contains("Path not found"));
    }

    #[test]
    fn test_format_file_keeps_comments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.py");
        fs::write(&path, "x = [1,  # one\n     2]\n").unwrap();
        let formatted = format_file(&path, &Pipeline::new(), PrinterOptions::default()).unwrap();
        assert_eq!(formatted.formatted, "x = [1,  # one\n    2]\n");
        assert!(formatted.changed());
    }

    #[test]
    fn test_load_config_from_file_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".marginaliarc.toml"),
            "[printer]\nindentSize = 2\n",
        )
        .unwrap();
        let file = dir.path().join("a.py");
        fs::write(&file, "").unwrap();
        let config = load_config(None, &[file]).unwrap();
        assert_eq!(config.printer_config().indent_size, Some(2));
    }
}
