//! Diagnostic rendering.
//!
//! Formatting is an injected capability: a [`Style`] maps text and a
//! [`Role`] to decorated text, with a no-op default so the reporter is
//! testable and usable on dumb terminals.

use std::io::{self, Write};

use crate::tree::Extent;
use crate::types::{Detail, Diagnostic, ShownLine};

/// What a piece of text represents, for color selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Severity words ("error", "not permitted", ...).
    Severity,
    /// Identifier names quoted in messages.
    Name,
    /// The caret/tilde underline of an excerpt.
    Caret,
    /// Background for a correctly indented prefix.
    IndentOk,
    /// Background for an incorrectly indented prefix.
    IndentBad,
}

/// Injected formatting capability.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    paint: fn(&str, Role) -> String,
    /// Whether decoration is actually applied (controls explanatory text
    /// that only makes sense in color).
    pub enabled: bool,
}

impl Style {
    /// No-op style: text passes through untouched.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            paint: |text, _| text.to_string(),
            enabled: false,
        }
    }

    /// ANSI escape-code style.
    #[must_use]
    pub fn ansi() -> Self {
        Self {
            paint: ansi_paint,
            enabled: true,
        }
    }

    /// Decorates `text` for `role`.
    #[must_use]
    pub fn paint(&self, text: &str, role: Role) -> String {
        (self.paint)(text, role)
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::plain()
    }
}

fn ansi_paint(text: &str, role: Role) -> String {
    let code = match role {
        Role::Severity => "\x1b[31m",
        Role::Name => "\x1b[36m",
        Role::Caret => "\x1b[32m",
        Role::IndentOk => "\x1b[42m",
        Role::IndentBad => "\x1b[41m",
    };
    format!("{code}{text}\x1b[0m")
}

/// Builds an excerpt payload for a node extent, degrading to
/// [`Detail::None`] when the extent is multi-line or its columns fall
/// outside the line. Missing location data never becomes an error.
#[must_use]
pub fn excerpt_detail(lines: &[&str], extent: &Extent) -> Detail {
    if extent.start.line == 0 || extent.start.line != extent.end.line {
        return Detail::None;
    }
    let Some(line) = lines.get(extent.start.line as usize - 1) else {
        return Detail::None;
    };
    let (start, end) = (extent.start.column, extent.end.column);
    let width = u32::try_from(line.chars().count()).unwrap_or(u32::MAX);
    if start == 0 || end == 0 || start > width || end > width || start >= end {
        return Detail::None;
    }
    Detail::Excerpt {
        line: (*line).to_string(),
        start_column: start,
        end_column: end,
    }
}

/// Renders diagnostics to a sink.
#[derive(Debug)]
pub struct Reporter<W: Write> {
    out: W,
    style: Style,
}

impl<W: Write> Reporter<W> {
    /// Creates a reporter over a sink.
    #[must_use]
    pub fn new(out: W, style: Style) -> Self {
        Self { out, style }
    }

    /// Consumes the reporter, returning the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Writes a bare line (extra texts, parse diagnostics).
    ///
    /// # Errors
    ///
    /// Propagates sink write failures.
    pub fn note(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    /// Renders one diagnostic: the location/severity/message line, then any
    /// payload.
    ///
    /// # Errors
    ///
    /// Propagates sink write failures.
    pub fn diagnostic(&mut self, d: &Diagnostic, where_text: Option<&str>) -> io::Result<()> {
        let prefix = self.style.paint(d.severity.prefix(), Role::Severity);
        let mut message = d.message.clone();
        if let Some(tag) = d.severity.tag() {
            message.push_str(" - this is ");
            message.push_str(&self.style.paint(tag, Role::Severity));
            if let Some(text) = where_text {
                message.push(' ');
                message.push_str(text);
            }
        }

        if d.location.line == 0 {
            writeln!(self.out, "{}: {prefix}: {message}", d.location.file.display())?;
        } else {
            writeln!(
                self.out,
                "{}:{}:{} {prefix}: {message}",
                d.location.file.display(),
                d.location.line,
                d.location.column,
            )?;
        }

        match &d.detail {
            Detail::None => Ok(()),
            Detail::Excerpt {
                line,
                start_column,
                end_column,
            } => self.excerpt(line, *start_column, *end_column),
            Detail::IndentListing(lines) => self.indent_listing(lines),
            Detail::PlainLines(lines) => {
                for line in lines {
                    writeln!(self.out, "{line}")?;
                }
                Ok(())
            }
        }
    }

    fn excerpt(&mut self, line: &str, start: u32, end: u32) -> io::Result<()> {
        writeln!(self.out, "{line}")?;
        let pad = " ".repeat(start as usize - 1);
        let underline = format!("^{}", "~".repeat((end - start - 1) as usize));
        writeln!(self.out, "{pad}{}", self.style.paint(&underline, Role::Caret))
    }

    fn indent_listing(&mut self, lines: &[ShownLine]) -> io::Result<()> {
        write!(self.out, "Incorrectly indented lines are marked with an *.")?;
        if self.style.enabled {
            writeln!(
                self.out,
                " The correct indent is {}.",
                self.style.paint("shown in red", Role::IndentBad)
            )?;
            write!(
                self.out,
                "Correctly indented lines are {}.",
                self.style.paint("shown in green", Role::IndentOk)
            )?;
        }
        writeln!(self.out)?;

        let mut last = 0;
        for shown in lines {
            if last != 0 && shown.number > last + 5 {
                writeln!(self.out, "......")?;
            }
            write!(self.out, "{:6}", shown.number)?;
            match shown.mark {
                Some(mark) => {
                    let marker = if mark.correct { ' ' } else { '*' };
                    let role = if mark.correct {
                        Role::IndentOk
                    } else {
                        Role::IndentBad
                    };
                    let want = mark.correct_indent as usize;
                    let mut text = shown.text.clone();
                    let have = text.chars().count();
                    if have < want {
                        text.push_str(&" ".repeat(want - have));
                    }
                    let split = text
                        .char_indices()
                        .nth(want)
                        .map_or(text.len(), |(i, _)| i);
                    let (head, tail) = text.split_at(split);
                    writeln!(self.out, "{marker} {}{tail}", self.style.paint(head, role))?;
                }
                None => writeln!(self.out, "  {}", shown.text)?,
            }
            last = shown.number;
        }
        Ok(())
    }
}
