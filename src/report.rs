//! Assembling the HTML report: a head template, one table row per project, then a tail template.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

use crate::{fs, manager::Manager, tickets::Project, trackers::Tracker};

const DEFAULT_HEAD: &str = include_str!("../templates/head.html");
const DEFAULT_TAIL: &str = include_str!("../templates/tail.html");
const HEAD_FILE: &str = "head.html";
const TAIL_FILE: &str = "tail.html";
const TIMESTAMP: &[FormatItem<'static>] =
    format_description!("[year][month][day]-[hour][minute][second]");

/// One table row for `project`.
pub fn row(tracker: Tracker, project: &Project) -> String {
    let name = escape(&project.name);
    let project_cell = if project.url.is_empty() {
        name
    } else {
        format!("<a href=\"{}\">{name}</a>", escape(&project.url))
    };
    format!(
        "<tr><td>{tracker}</td><td>{project_cell}</td><td>{} tickets</td></tr>\n",
        project.tickets.len()
    )
}

/// Rows for every project of every instance of every manager, in that order.
pub fn rows(managers: &[Manager]) -> String {
    managers
        .iter()
        .flat_map(|manager| {
            manager.instances().iter().flat_map(move |instance| {
                instance
                    .projects()
                    .iter()
                    .map(move |project| row(manager.tracker(), project))
            })
        })
        .collect()
}

/// What goes before and after the rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Templates {
    pub head: String,
    pub tail: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            head: DEFAULT_HEAD.to_string(),
            tail: DEFAULT_TAIL.to_string(),
        }
    }
}

impl Templates {
    /// Use `head.html` and `tail.html` from `dir` where they exist, the built-in templates
    /// otherwise.
    ///
    /// ## Errors
    /// If `dir` is given but isn't a directory, or a template in it can't be read.
    pub fn load(dir: Option<&Path>) -> Result<Self, Error> {
        let mut templates = Self::default();
        let Some(dir) = dir else {
            return Ok(templates);
        };
        if !dir.is_dir() {
            return Err(Error::MissingTemplateDir(dir.to_path_buf()));
        }
        let head = dir.join(HEAD_FILE);
        if head.is_file() {
            templates.head = fs::read_to_string(&head)?;
        }
        let tail = dir.join(TAIL_FILE);
        if tail.is_file() {
            templates.tail = fs::read_to_string(&tail)?;
        }
        Ok(templates)
    }

    /// The full report, with nothing added between the pieces.
    pub fn compose(&self, rows: &str) -> String {
        let mut report = String::with_capacity(self.head.len() + rows.len() + self.tail.len());
        report.push_str(&self.head);
        report.push_str(rows);
        report.push_str(&self.tail);
        report
    }
}

fn file_stem(timestamp: OffsetDateTime) -> Result<String, Error> {
    Ok(format!("report-{}", timestamp.format(TIMESTAMP)?))
}

pub(crate) fn file_name(timestamp: OffsetDateTime) -> Result<String, Error> {
    Ok(format!("{}.html", file_stem(timestamp)?))
}

/// Write `contents` to a new timestamped file in `output_dir`, returning its path.
///
/// An existing report is never replaced: if the name is taken, `-1`, `-2`, ... is appended.
pub(crate) fn save(
    output_dir: &Path,
    contents: &str,
    timestamp: OffsetDateTime,
) -> Result<PathBuf, Error> {
    fs::create_dir(output_dir)?;
    let stem = file_stem(timestamp)?;
    let mut path = output_dir.join(format!("{stem}.html"));
    let mut suffix = 0;
    while !fs::write_new(&path, contents)? {
        suffix += 1;
        path = output_dir.join(format!("{stem}-{suffix}.html"));
    }
    Ok(path)
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Fs(#[from] fs::Error),
    #[error("Template directory {0} does not exist")]
    #[diagnostic(
        code(report::template_dir),
        help("Pass a directory containing head.html and/or tail.html, or leave out --template-dir.")
    )]
    MissingTemplateDir(PathBuf),
    #[error("Could not format the report timestamp: {0}")]
    #[diagnostic(code(report::timestamp))]
    Timestamp(#[from] time::error::Format),
}
