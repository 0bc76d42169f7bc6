//! Per-file check orchestration.
//!
//! The engine obtains the syntax tree from the injected [`Frontend`], runs
//! the structural checks over one file-scoped walk, the data-flow checks per
//! function, then the source passes (indentation), and decides file-level
//! pass/fail. A pass that fires a fatal severity stops the later passes, as
//! there is no point style-checking code that already failed.
//!
//! Files are processed strictly one at a time; no state survives between
//! files except the immutable policy.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::check::{Finding, FlowCheckBox, NodeCheckBox, SourcePassBox};
use crate::context::FileContext;
use crate::frontend::{Frontend, FrontendError};
use crate::policy::{CheckName, Policy, Severity};
use crate::report::{excerpt_detail, Reporter, Style};
use crate::types::{Diagnostic, FileReport, Location};
use crate::walker::{walk, walk_from, Ancestry};

/// Errors that abort one file's analysis. The driving loop reports these,
/// records the file as failed, and moves on to the next file.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Could not read the source text or write a diagnostic.
    #[error("IO error on {path}: {source}")]
    Io {
        /// File being processed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The front end produced no tree at all.
    #[error(transparent)]
    Frontend(#[from] FrontendError),
}

/// The check engine for one configured exercise.
pub struct Engine<F, W: Write> {
    frontend: F,
    policy: Policy,
    out: W,
    style: Style,
    node_checks: Vec<NodeCheckBox>,
    flow_checks: Vec<FlowCheckBox>,
    source_passes: Vec<SourcePassBox>,
    verbose: bool,
}

impl<F: Frontend> Engine<F, io::Stdout> {
    /// Creates an engine writing plain text to stdout, with no checks
    /// installed yet.
    #[must_use]
    pub fn new(frontend: F, policy: Policy) -> Self {
        Self {
            frontend,
            policy,
            out: io::stdout(),
            style: Style::plain(),
            node_checks: Vec::new(),
            flow_checks: Vec::new(),
            source_passes: Vec::new(),
            verbose: false,
        }
    }
}

impl<F: Frontend, W: Write> Engine<F, W> {
    /// Redirects rendered output to another sink.
    #[must_use]
    pub fn with_output<W2: Write>(self, out: W2) -> Engine<F, W2> {
        Engine {
            frontend: self.frontend,
            policy: self.policy,
            out,
            style: self.style,
            node_checks: self.node_checks,
            flow_checks: self.flow_checks,
            source_passes: self.source_passes,
            verbose: self.verbose,
        }
    }

    /// Sets the formatting capability.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Enables rendering of non-fatal parse diagnostics.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Installs a structural check.
    #[must_use]
    pub fn with_node_check(mut self, check: NodeCheckBox) -> Self {
        self.node_checks.push(check);
        self
    }

    /// Installs a data-flow check.
    #[must_use]
    pub fn with_flow_check(mut self, check: FlowCheckBox) -> Self {
        self.flow_checks.push(check);
        self
    }

    /// Installs a whole-file source pass.
    #[must_use]
    pub fn with_source_pass(mut self, pass: SourcePassBox) -> Self {
        self.source_passes.push(pass);
        self
    }

    /// Number of installed checks.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.node_checks.len() + self.flow_checks.len() + self.source_passes.len()
    }

    /// The active policy.
    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// The rendered-output sink.
    #[must_use]
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Reads and checks one file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] when the source cannot be read, and
    /// [`EngineError::Frontend`] when parsing produced no tree. Both mean
    /// the file failed; the caller continues with the remaining files.
    pub fn check_file(&mut self, path: &Path) -> Result<FileReport, EngineError> {
        let source = std::fs::read_to_string(path).map_err(|e| EngineError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.check_source(path, &source)
    }

    /// Checks one file from already-read source text.
    ///
    /// # Errors
    ///
    /// See [`Engine::check_file`].
    pub fn check_source(&mut self, path: &Path, source: &str) -> Result<FileReport, EngineError> {
        debug!("checking {}", path.display());
        let outcome = self.frontend.parse(path, source)?;
        let mut report = FileReport::new(path);
        let mut reporter = Reporter::new(&mut self.out, self.style);

        let mut parse_failed = false;
        for d in &outcome.diagnostics {
            if d.severity.is_fatal() {
                reporter.note(&d.message).map_err(|e| io_err(path, e))?;
                parse_failed = true;
            } else if self.verbose {
                reporter.note(&d.message).map_err(|e| io_err(path, e))?;
            }
        }
        if parse_failed {
            report.passed = false;
            return Ok(report);
        }

        let tree = outcome.tree;
        let ancestry = Ancestry::compute(&tree);
        let ctx = FileContext::new(path, source, &tree, &ancestry);

        let fatal = node_pass(
            &mut self.node_checks,
            &self.policy,
            &ctx,
            &mut reporter,
            &mut report,
        )
        .map_err(|e| io_err(path, e))?;
        if fatal {
            report.passed = false;
            return Ok(report);
        }

        let fatal = flow_pass(
            &mut self.flow_checks,
            &self.policy,
            &ctx,
            &mut reporter,
            &mut report,
        )
        .map_err(|e| io_err(path, e))?;
        if fatal {
            report.passed = false;
            return Ok(report);
        }

        for pass in &mut self.source_passes {
            if !self.policy.enabled(pass.name()) {
                continue;
            }
            let mut fatal = false;
            for diag in pass.run(&ctx, &self.policy) {
                reporter
                    .diagnostic(&diag, self.policy.where_text.as_deref())
                    .map_err(|e| io_err(path, e))?;
                fatal |= diag.severity.is_fatal();
                report.diagnostics.push(diag);
            }
            if fatal {
                report.passed = false;
                return Ok(report);
            }
        }

        report.passed = !report.has_fatal();
        Ok(report)
    }
}

fn io_err(path: &Path, source: io::Error) -> EngineError {
    EngineError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn make_diagnostic(
    ctx: &FileContext<'_>,
    check: CheckName,
    severity: Severity,
    finding: &Finding,
) -> Diagnostic {
    let node = ctx.tree.node(finding.node);
    let location = Location::new(ctx.path, node.extent.start.line, node.extent.start.column);
    Diagnostic::new(check, severity, location, finding.message.clone())
        .with_detail(excerpt_detail(&ctx.lines, &node.extent))
}

/// Runs every enabled structural check over one file-scoped walk.
/// Returns true iff a fatal severity fired.
fn node_pass<W: Write>(
    checks: &mut [NodeCheckBox],
    policy: &Policy,
    ctx: &FileContext<'_>,
    reporter: &mut Reporter<W>,
    report: &mut FileReport,
) -> io::Result<bool> {
    for check in checks.iter_mut() {
        check.begin_file();
    }

    let mut fired = Vec::new();
    for visit in walk(ctx.tree) {
        for check in checks.iter_mut() {
            let severity = policy.severity(check.name());
            if severity == Severity::Disabled {
                continue;
            }
            if let Some(finding) = check.inspect(ctx, &visit) {
                let diag = make_diagnostic(ctx, check.name(), severity, &finding);
                reporter.diagnostic(&diag, policy.where_text.as_deref())?;
                fired.push(severity);
                report.diagnostics.push(diag);
            }
        }
    }

    if let Some(extra) = &policy.extra_text {
        if fired
            .iter()
            .any(|s| matches!(s, Severity::NotPermitted | Severity::NotRecommended))
        {
            reporter.note(extra)?;
        }
    }

    Ok(fired.iter().any(|s| s.is_fatal()))
}

/// Runs every enabled data-flow check over each function in turn.
/// Returns true iff a fatal severity fired.
fn flow_pass<W: Write>(
    checks: &mut [FlowCheckBox],
    policy: &Policy,
    ctx: &FileContext<'_>,
    reporter: &mut Reporter<W>,
    report: &mut FileReport,
) -> io::Result<bool> {
    let mut fatal = false;
    for function in ctx.tree.functions() {
        for check in checks.iter_mut() {
            if policy.enabled(check.name()) {
                check.enter_function(ctx, function);
            }
        }
        for visit in walk_from(ctx.tree, function) {
            for check in checks.iter_mut() {
                let severity = policy.severity(check.name());
                if severity == Severity::Disabled {
                    continue;
                }
                if let Some(finding) = check.inspect(ctx, &visit) {
                    let diag = make_diagnostic(ctx, check.name(), severity, &finding);
                    reporter.diagnostic(&diag, policy.where_text.as_deref())?;
                    fatal |= severity.is_fatal();
                    report.diagnostics.push(diag);
                }
            }
        }
    }
    Ok(fatal)
}
