//! Runs `.test.j` files: vJass sources whose leading `//#` comment lines hold
//! TOML expectations about the parsed program.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use codespan_reporting::files::{Files, SimpleFile};
use codespan_reporting::term::termcolor::{
    Color, ColorChoice, ColorSpec, StandardStream, WriteColor,
};
use serde::Deserialize;
use tracing::{debug, warn};

use vjass::{Declaration, ParseError};

use crate::analysis::analyze;
use crate::config::Config;

const TEST_SUFFIX: &str = ".test.j";
const HEADER_PREFIX: &str = "//#";

#[derive(Debug, Deserialize)]
pub struct ExpectedWarning {
    /// Substring that must appear in the warning message.
    pub contains: String,

    /// 1-based line of the file the warning must start on.
    #[serde(default)]
    pub line: Option<usize>,
}

/// Expectations of one `.test.j` file. Every field is optional; names are
/// compared in declaration order, including declarations inside libraries.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestConfig {
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub expect_functions: Option<Vec<String>>,

    #[serde(default)]
    pub expect_natives: Option<Vec<String>>,

    #[serde(default)]
    pub expect_globals: Option<Vec<String>>,

    #[serde(default)]
    pub expect_structs: Option<Vec<String>>,

    #[serde(default)]
    pub expect_libraries: Option<Vec<String>>,

    /// Number of `//! zinc` blocks.
    #[serde(default)]
    pub expect_zinc_blocks: Option<usize>,

    /// When present, even empty, the warnings must match one to one.
    #[serde(default)]
    pub expect_warnings: Option<Vec<ExpectedWarning>>,
}

/// Read the TOML held in the leading `//#` lines. The header lines are plain
/// comments to the parser, so the whole file is the source under test.
fn read_header(source: &str) -> Result<TestConfig, String> {
    let header: Vec<&str> = source
        .lines()
        .map_while(|line| line.trim_start().strip_prefix(HEADER_PREFIX))
        .collect();
    if header.is_empty() {
        return Err(format!("missing `{HEADER_PREFIX}` expectation header"));
    }
    toml::from_str(&header.join("\n")).map_err(|e| format!("TOML parse error: {}", e))
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    /// `Err` carries the reason for the failure.
    pub outcome: Result<(), String>,
}

impl TestResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_suffix(TEST_SUFFIX))
                .unwrap_or("?")
        })
    }
}

fn run_single_test(path: &Path, config: &Config) -> TestResult {
    let mut description = None;
    let outcome = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read file: {}", e))
        .and_then(|content| {
            let source = content.trim_start_matches('\u{feff}');
            let test = read_header(source)?;
            description = test.description.clone();
            check_source(&test, source, config)
        });
    TestResult {
        path: path.to_path_buf(),
        description,
        outcome,
    }
}

/// Parse `source` and check every expectation.
fn check_source(test: &TestConfig, source: &str, config: &Config) -> Result<(), String> {
    let analysis = analyze(source, 0, config);
    if let Some(error) = &analysis.zinc_error {
        return Err(format!("zinc parse error: {}", error));
    }
    let program = &analysis.program;

    let checks = [
        ("functions", &test.expect_functions, names(program.all_functions())),
        ("natives", &test.expect_natives, names(program.natives.iter())),
        ("globals", &test.expect_globals, names(program.all_globals())),
        ("structs", &test.expect_structs, names(program.all_structs())),
        ("libraries", &test.expect_libraries, names(program.libraries.iter())),
    ];
    for (what, expected, actual) in checks {
        match expected {
            Some(expected) if *expected != actual => {
                return Err(format!(
                    "{} mismatch\n  expected: [{}]\n  actual:   [{}]",
                    what,
                    expected.join(", "),
                    actual.join(", ")
                ));
            }
            _ => {}
        }
    }

    if let Some(expected) = test.expect_zinc_blocks {
        let actual = analysis.parser.zinc_blocks().len();
        if actual != expected {
            return Err(format!("expected {} zinc block(s), got {}", expected, actual));
        }
    }

    match &test.expect_warnings {
        Some(expected) => check_warnings(source, analysis.parser.diagnostics(), expected),
        None => Ok(()),
    }
}

fn names<'a, T: Declaration + 'a>(items: impl Iterator<Item = &'a T>) -> Vec<String> {
    items
        .map(|item| item.name().unwrap_or("?").to_string())
        .collect()
}

fn check_warnings(
    source: &str,
    diagnostics: &[ParseError],
    expected: &[ExpectedWarning],
) -> Result<(), String> {
    let warnings: Vec<&ParseError> = diagnostics.iter().filter(|d| d.is_warning()).collect();
    if warnings.len() != expected.len() {
        let listed: Vec<String> = warnings.iter().map(|w| format!("    {}", w)).collect();
        return Err(format!(
            "expected {} warning(s), got {}\n{}",
            expected.len(),
            warnings.len(),
            listed.join("\n")
        ));
    }

    let file = SimpleFile::new("test", source);
    for (index, (warning, expected)) in warnings.iter().zip(expected).enumerate() {
        let message = warning.to_string();
        if !message.contains(&expected.contains) {
            return Err(format!(
                "warning {}: expected a message containing \"{}\", got: {}",
                index, expected.contains, message
            ));
        }
        let Some(expected_line) = expected.line else {
            continue;
        };
        let actual_line = file
            .line_index((), warning.span.start)
            .map_err(|e| format!("warning {}: {}", index, e))?
            + 1;
        if actual_line != expected_line {
            return Err(format!(
                "warning {}: expected on line {}, found on line {}",
                index, expected_line, actual_line
            ));
        }
    }
    Ok(())
}

/// `.test.j` files under `root`, keyed by their directory relative to it.
/// Files directly in `root` fall under the empty category.
fn discover(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for path in entries.flatten().map(|entry| entry.path()) {
            if path.is_dir() {
                pending.push(path);
            } else if is_test_file(&path) {
                categories.entry(category_of(root, &path)).or_default().push(path);
            }
        }
    }
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn is_test_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(TEST_SUFFIX))
}

fn category_of(root: &Path, file: &Path) -> String {
    file.parent()
        .and_then(|dir| dir.strip_prefix(root).ok())
        .map(|dir| {
            dir.components()
                .map(|part| part.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default()
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

/// `wanted` names a category or any of its parents.
fn in_category(category: &str, wanted: &str) -> bool {
    category == wanted
        || category
            .strip_prefix(wanted)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Keep only the requested categories and their subcategories.
fn select(
    mut categories: BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<String, Vec<PathBuf>> {
    if requested.is_empty() {
        return categories;
    }
    let wanted: Vec<&str> = requested.iter().map(|r| r.trim_matches('/')).collect();
    for name in &wanted {
        if !categories.keys().any(|category| in_category(category, name)) {
            warn!(category = %name, "no tests in category");
        }
    }
    categories.retain(|category, _| wanted.iter().any(|name| in_category(category, name)));
    categories
}

pub fn list_categories(path: &Path) {
    let categories = discover(path);
    if categories.is_empty() {
        eprintln!("no {} files under {}", TEST_SUFFIX, path.display());
        return;
    }
    for (category, files) in &categories {
        println!("{} ({} test(s))", category_label(category), files.len());
    }
}

/// Progress and summary output on stderr.
struct Report {
    out: StandardStream,
    passed: usize,
    failures: Vec<TestResult>,
}

impl Report {
    fn new(no_color: bool) -> Self {
        let choice = if no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };
        Report {
            out: StandardStream::stderr(choice),
            passed: 0,
            failures: Vec::new(),
        }
    }

    fn styled(&mut self, color: Option<Color>, text: &str) -> io::Result<()> {
        self.out
            .set_color(ColorSpec::new().set_fg(color).set_bold(true))?;
        write!(self.out, "{}", text)?;
        self.out.reset()
    }

    fn heading(&mut self, category: &str) -> io::Result<()> {
        writeln!(self.out)?;
        self.styled(None, category_label(category))?;
        writeln!(self.out)
    }

    fn record(&mut self, result: TestResult) -> io::Result<()> {
        write!(self.out, "  ")?;
        if result.outcome.is_ok() {
            self.styled(Some(Color::Green), "PASS")?;
        } else {
            self.styled(Some(Color::Red), "FAIL")?;
        }
        writeln!(self.out, "  {}", result.label())?;
        match result.outcome {
            Ok(()) => self.passed += 1,
            Err(_) => self.failures.push(result),
        }
        Ok(())
    }

    /// Print failure details and the totals; returns the exit code.
    fn finish(mut self) -> io::Result<i32> {
        let failures = std::mem::take(&mut self.failures);
        for failure in &failures {
            writeln!(self.out, "\n  --- {} ---", failure.path.display())?;
            if let Err(reason) = &failure.outcome {
                for line in reason.lines() {
                    writeln!(self.out, "  {}", line)?;
                }
            }
        }

        write!(self.out, "\ntest result: ")?;
        if failures.is_empty() {
            self.styled(Some(Color::Green), "ok")?;
        } else {
            self.styled(Some(Color::Red), "FAILED")?;
        }
        writeln!(
            self.out,
            ". {} passed, {} failed",
            self.passed,
            failures.len()
        )?;
        Ok(if failures.is_empty() { 0 } else { 1 })
    }
}

/// Run a single `.test.j` file or every one under a directory, optionally
/// limited to `categories`. Returns the process exit code.
pub fn run_tests(path: &Path, config: &Config, no_color: bool, categories: &[String]) -> i32 {
    let selected = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        select(discover(path), categories)
    };
    if selected.is_empty() {
        eprintln!("no matching {} files under {}", TEST_SUFFIX, path.display());
        return 1;
    }
    debug!(categories = selected.len(), "running test files");

    run_selected(&selected, config, no_color).unwrap_or_else(|e| {
        eprintln!("error: cannot write test report: {}", e);
        1
    })
}

fn run_selected(
    selected: &BTreeMap<String, Vec<PathBuf>>,
    config: &Config,
    no_color: bool,
) -> io::Result<i32> {
    let mut report = Report::new(no_color);
    for (category, files) in selected {
        if !category.is_empty() {
            report.heading(category)?;
        }
        for file in files {
            report.record(run_single_test(file, config))?;
        }
    }
    report.finish()
}
