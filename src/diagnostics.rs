//! Fancy diagnostics support using `ariadne`.
//!
//! Storyboard warnings and errors carry field names and values rather than byte offsets. The
//! reports built here point at the first place in the source where the quoted field name or
//! value appears, or at the start of the source when it cannot be found.
//!
//! # Usage Example
//!
//! ```rust
//! # #[cfg(feature = "diagnostics")]
//! # {
//! use storyboard_rs::{
//!     chart::Chart,
//!     diagnostics::emit_storyboard_warnings,
//!     storyboard::parse_storyboard,
//!     unit::Viewport,
//! };
//!
//! let source = r#"{"texts": [{"time": 1, "easing": "bounce"}]}"#;
//! let output = parse_storyboard(source, &Chart::default(), &Viewport::default()).unwrap();
//!
//! // Output all warnings
//! emit_storyboard_warnings("storyboard.json", source, &output.warnings);
//! # }
//! ```

use std::ops::Range;

#[cfg(feature = "diagnostics")]
use ariadne::{Color, Label, Report, ReportKind, Source};

#[cfg(feature = "diagnostics")]
use crate::storyboard::{StoryboardError, StoryboardWarning};

/// Simple source container that holds the filename and source text.
///
/// ```rust
/// use storyboard_rs::diagnostics::SimpleSource;
///
/// let source_text = r#"{"texts": []}"#;
/// let source = SimpleSource::new("storyboard.json", source_text);
/// assert_eq!(source.text(), source_text);
/// assert_eq!(source.find_quoted("texts"), 1..8);
/// ```
pub struct SimpleSource<'a> {
    name: &'a str,
    text: &'a str,
}

impl<'a> SimpleSource<'a> {
    /// Create a new source container instance.
    #[must_use]
    pub const fn new(name: &'a str, text: &'a str) -> Self {
        Self { name, text }
    }

    /// Get source text content.
    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }

    /// Get source file name.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    /// Byte range of the first occurrence of `token` written as a JSON string, quotes included.
    ///
    /// Returns `0..0` if it does not occur.
    #[must_use]
    pub fn find_quoted(&self, token: &str) -> Range<usize> {
        let quoted = format!("\"{token}\"");
        self.find(&quoted)
    }

    /// Byte range of the first occurrence of `needle`, or `0..0`.
    #[must_use]
    pub fn find(&self, needle: &str) -> Range<usize> {
        self.text
            .find(needle)
            .map_or(0..0, |start| start..start + needle.len())
    }

    /// Byte offset of a 1-based line and column, clamped to the source length.
    #[must_use]
    pub fn offset_of(&self, line: usize, column: usize) -> usize {
        let line_start: usize = self
            .text
            .split_inclusive('\n')
            .take(line.saturating_sub(1))
            .map(str::len)
            .sum();
        (line_start + column.saturating_sub(1)).min(self.text.len())
    }
}

/// Trait for converting storyboard problems to `ariadne::Report`.
#[cfg(feature = "diagnostics")]
pub trait ToAriadne {
    /// Convert error to ariadne Report.
    fn to_report<'a>(&self, src: &SimpleSource<'a>) -> Report<'a, (String, Range<usize>)>;
}

/// Helper to build a styled ariadne `Report` consistently.
#[cfg(feature = "diagnostics")]
#[must_use]
pub fn build_report<'a>(
    src: &SimpleSource<'a>,
    kind: ReportKind<'a>,
    range: Range<usize>,
    title: &str,
    label_message: impl ToString,
    color: Color,
) -> Report<'a, (String, Range<usize>)> {
    let filename = src.name().to_string();
    Report::build(kind, (filename.clone(), range.clone()))
        .with_message(title)
        .with_label(
            Label::new((filename, range))
                .with_message(label_message.to_string())
                .with_color(color),
        )
        .finish()
}

#[cfg(feature = "diagnostics")]
impl StoryboardWarning {
    fn span(&self, src: &SimpleSource<'_>) -> Range<usize> {
        match self {
            Self::InvalidColor { field, .. }
            | Self::InvalidFieldValue { field, .. }
            | Self::UnknownReferenceUnit { field, .. } => src.find_quoted(field),
            Self::UnknownEasing(name) | Self::UnknownSection(name) => src.find_quoted(name),
            Self::EmptyNoteSelector { id: Some(id) } => src.find_quoted(id),
            Self::EmptyNoteSelector { id: None } | Self::InvalidNoteSelectorType(_) => {
                src.find_quoted("note")
            }
        }
    }
}

#[cfg(feature = "diagnostics")]
impl ToAriadne for StoryboardWarning {
    fn to_report<'a>(&self, src: &SimpleSource<'a>) -> Report<'a, (String, Range<usize>)> {
        build_report(
            src,
            ReportKind::Warning,
            self.span(src),
            "storyboard warning",
            self,
            Color::Yellow,
        )
    }
}

#[cfg(feature = "diagnostics")]
impl StoryboardError {
    fn span(&self, src: &SimpleSource<'_>) -> Range<usize> {
        match self {
            Self::Json { line, column, .. } => {
                let start = src.offset_of(*line, *column);
                start..start
            }
            Self::MalformedDocument { path, .. } => {
                let section = path.split(['.', '[']).next().unwrap_or_default();
                src.find_quoted(section)
            }
            Self::UnknownTemplate(name)
            | Self::UnboundPlaceholder(name)
            | Self::UnknownPlaceholder(name)
            | Self::UnknownObjectKind(name) => src.find(name),
            Self::UnknownTimePhase(token) | Self::MalformedTimeExpression(token) => {
                src.find(token)
            }
            Self::UnknownNote(note) => src.find(&note.to_string()),
            Self::InvalidTrigger { .. } => src.find_quoted("triggers"),
            Self::Render(_) => 0..0,
        }
    }
}

#[cfg(feature = "diagnostics")]
impl ToAriadne for StoryboardError {
    fn to_report<'a>(&self, src: &SimpleSource<'a>) -> Report<'a, (String, Range<usize>)> {
        build_report(
            src,
            ReportKind::Error,
            self.span(src),
            "storyboard error",
            self,
            Color::Red,
        )
    }
}

/// Prints a report for each warning to stderr.
#[cfg(feature = "diagnostics")]
pub fn emit_storyboard_warnings<'a>(
    name: &'a str,
    source: &'a str,
    warnings: impl IntoIterator<Item = &'a StoryboardWarning>,
) {
    let simple = SimpleSource::new(name, source);
    let ariadne_source = Source::from(source);
    for w in warnings {
        let report = w.to_report(&simple);
        let _ = report.eprint((name.to_string(), ariadne_source.clone()));
    }
}

/// Collect `ariadne::Report` instances for a list of `StoryboardWarning` without printing.
#[cfg(feature = "diagnostics")]
#[must_use]
pub fn collect_storyboard_reports<'a>(
    name: &'a str,
    source: &'a str,
    warnings: impl IntoIterator<Item = &'a StoryboardWarning>,
) -> Vec<Report<'a, (String, Range<usize>)>> {
    let simple = SimpleSource::new(name, source);
    warnings.into_iter().map(|w| w.to_report(&simple)).collect()
}

/// Builds the report of a load error without printing it.
#[cfg(feature = "diagnostics")]
#[must_use]
pub fn storyboard_error_report<'a>(
    name: &'a str,
    source: &'a str,
    error: &StoryboardError,
) -> Report<'a, (String, Range<usize>)> {
    error.to_report(&SimpleSource::new(name, source))
}
