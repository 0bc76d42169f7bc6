//! Check command implementation.

use anyhow::{Context, Result};
use cstyle_checks::registry;
use cstyle_clang::ClangFrontend;
use cstyle_core::{Engine, FileReport, Frontend, Policy, Severity, Style};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use crate::config_resolver;
use crate::OutputFormat;

/// Arguments to `cstyle check`.
#[derive(Debug, clap::Args)]
pub struct CheckArgs {
    /// C source files to check
    #[arg(value_name = "FILES")]
    pub source_files: Vec<PathBuf>,

    /// Fail the file if any of this comma-separated list of checks fires
    #[arg(long)]
    pub error: Option<String>,

    /// Like --error, with a "not permitted" message
    #[arg(long)]
    pub not_permitted: Option<String>,

    /// Warn if any of this comma-separated list of checks fires
    #[arg(long)]
    pub warning: Option<String>,

    /// Like --warning, with a "not recommended" message
    #[arg(long)]
    pub not_recommended: Option<String>,

    /// Do not run any of this comma-separated list of checks
    #[arg(long)]
    pub do_not_check: Option<String>,

    /// Text added to messages indicating where features are not
    /// permitted/recommended
    #[arg(long)]
    pub where_text: Option<String>,

    /// Text printed once if not permitted/recommended code is found
    #[arg(long)]
    pub extra_text: Option<String>,

    /// Text added to messages if a mixture of tabs and spaces is found
    #[arg(long)]
    pub mixed_indenting_text: Option<String>,

    /// Do not show incorrect indenting as a highlighted source listing
    #[arg(long)]
    pub no_highlight_incorrect_indenting: bool,

    /// Colorize output (default: when stdout is a terminal)
    #[arg(long, env = "CSTYLE_COLORIZE_OUTPUT", overrides_with = "no_colorize")]
    pub colorize: bool,

    /// Do not colorize output
    #[arg(long, overrides_with = "colorize")]
    pub no_colorize: bool,

    /// Add a directory to the include search path
    #[arg(short = 'I', value_name = "DIR")]
    pub include_directories: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Runs the check command.
pub fn run(args: &CheckArgs, verbose: bool, config: Option<&Path>) -> Result<()> {
    let policy = build_policy(args, config)?;

    let frontend = ClangFrontend::discover(args.include_directories.clone())
        .context("failed to locate clang")?;
    let style = if use_color(args) {
        Style::ansi()
    } else {
        Style::plain()
    };

    let mut engine = Engine::new(frontend, policy)
        .with_style(style)
        .with_verbose(verbose);
    for check in registry::node_checks() {
        engine = engine.with_node_check(check);
    }
    for check in registry::flow_checks() {
        engine = engine.with_flow_check(check);
    }
    for pass in registry::source_passes() {
        engine = engine.with_source_pass(pass);
    }

    tracing::debug!(
        "checking {} files with {} checks",
        args.source_files.len(),
        engine.check_count()
    );

    // the machine-readable formats swallow the streamed text rendering
    let reports = match args.format {
        OutputFormat::Text => drive(&mut engine, &args.source_files),
        OutputFormat::Json | OutputFormat::Compact => {
            let mut engine = engine.with_output(Vec::new());
            drive(&mut engine, &args.source_files)
        }
    };
    super::output::print(&reports, args.format)?;

    if reports.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}

/// Checks each `.c` file in turn, collecting the per-file reports. A file
/// that cannot be read or parsed fails on its own; the remaining files are
/// still checked.
fn drive<F: Frontend, W: Write>(engine: &mut Engine<F, W>, files: &[PathBuf]) -> Vec<FileReport> {
    let mut reports = Vec::new();
    for file in files {
        if file.extension().and_then(|e| e.to_str()) != Some("c") {
            tracing::warn!("skipping {}: not a C source file", file.display());
            continue;
        }
        match engine.check_file(file) {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::error!("{e}");
                let mut report = FileReport::new(file);
                report.passed = false;
                reports.push(report);
            }
        }
    }
    reports
}

/// Assembles the policy: the config file first, then the severity flags,
/// later flags overriding earlier ones for checks named in both.
fn build_policy(args: &CheckArgs, explicit: Option<&Path>) -> Result<Policy> {
    let source = config_resolver::resolve(Path::new("."), explicit);
    let mut policy = match source.path() {
        Some(p) => {
            if source.is_global() {
                tracing::info!("using global config: {}", p.display());
            }
            Policy::from_file(p)
                .with_context(|| format!("failed to load config: {}", p.display()))?
        }
        None => Policy::new(),
    };

    let lists = [
        (&args.not_recommended, Severity::NotRecommended),
        (&args.warning, Severity::Warning),
        (&args.error, Severity::Error),
        (&args.not_permitted, Severity::NotPermitted),
        (&args.do_not_check, Severity::Disabled),
    ];
    for (list, severity) in lists {
        if let Some(list) = list {
            policy.apply_list(list, severity)?;
        }
    }

    if let Some(text) = &args.where_text {
        policy.where_text = Some(text.clone());
    }
    if let Some(text) = &args.extra_text {
        policy.extra_text = Some(text.clone());
    }
    if let Some(text) = &args.mixed_indenting_text {
        policy.mixed_indenting_text = Some(text.clone());
    }
    if args.no_highlight_incorrect_indenting {
        policy.highlight_indenting = false;
    }
    Ok(policy)
}

fn use_color(args: &CheckArgs) -> bool {
    if args.no_colorize {
        return false;
    }
    if args.colorize {
        return true;
    }
    std::io::stdout().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cstyle_core::{
        CheckName, FrontendError, NodeKind, ParseOutcome, SyntaxNode, TreeBuilder,
    };

    struct EmptyFrontend;

    impl Frontend for EmptyFrontend {
        fn parse(&self, path: &Path, _source: &str) -> Result<ParseOutcome, FrontendError> {
            let mut b = TreeBuilder::new();
            let root = b.add(
                SyntaxNode::new(NodeKind::TranslationUnit).with_file(path),
                Vec::new(),
            );
            Ok(ParseOutcome {
                tree: b.build(root),
                diagnostics: Vec::new(),
            })
        }
    }

    fn args() -> CheckArgs {
        CheckArgs {
            source_files: Vec::new(),
            error: None,
            not_permitted: None,
            warning: None,
            not_recommended: None,
            do_not_check: None,
            where_text: None,
            extra_text: None,
            mixed_indenting_text: None,
            no_highlight_incorrect_indenting: false,
            colorize: false,
            no_colorize: false,
            include_directories: Vec::new(),
            format: OutputFormat::Text,
        }
    }

    #[test]
    fn unreadable_file_fails_without_stopping_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.c");
        std::fs::write(&good, "int main(void) {\n}\n").unwrap();
        let missing = dir.path().join("missing.c");

        let mut engine = Engine::new(EmptyFrontend, Policy::new()).with_output(Vec::new());
        let reports = drive(&mut engine, &[missing, good]);
        assert_eq!(reports.len(), 2);
        assert!(!reports[0].passed);
        assert!(reports[1].passed);
    }

    #[test]
    fn severity_flags_apply_in_escalating_order() {
        let mut a = args();
        a.warning = Some("goto,switch".to_string());
        a.not_permitted = Some("goto".to_string());

        let policy = build_policy(&a, None).unwrap();
        assert_eq!(policy.severity(CheckName::Goto), Severity::NotPermitted);
        assert_eq!(policy.severity(CheckName::Switch), Severity::Warning);
    }

    #[test]
    fn do_not_check_disables_even_configured_checks() {
        let mut a = args();
        a.error = Some("indenting".to_string());
        a.do_not_check = Some("indenting".to_string());

        let policy = build_policy(&a, None).unwrap();
        assert!(!policy.enabled(CheckName::Indenting));
    }

    #[test]
    fn unknown_check_name_is_rejected_with_the_vocabulary() {
        let mut a = args();
        a.warning = Some("frobnicate".to_string());

        let err = build_policy(&a, None).unwrap_err();
        assert!(err.to_string().contains("valid checks are"));
    }

    #[test]
    fn report_texts_and_highlighting_flow_into_the_policy() {
        let mut a = args();
        a.where_text = Some("in COMP1511".to_string());
        a.no_highlight_incorrect_indenting = true;

        let policy = build_policy(&a, None).unwrap();
        assert_eq!(policy.where_text.as_deref(), Some("in COMP1511"));
        assert!(!policy.highlight_indenting);
    }

    #[test]
    fn explicit_config_file_seeds_the_policy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cstyle.toml");
        std::fs::write(&path, "[checks]\nunion = \"not_recommended\"\n").unwrap();

        let mut a = args();
        a.not_permitted = Some("goto".to_string());
        let policy = build_policy(&a, Some(&path)).unwrap();
        assert_eq!(policy.severity(CheckName::Union), Severity::NotRecommended);
        assert_eq!(policy.severity(CheckName::Goto), Severity::NotPermitted);
    }
}
