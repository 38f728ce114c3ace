//! HTML run report - named nodes with timestamped info/pass/fail events
//!
//! A [`RunReporter`] collects events in memory and renders a single
//! self-contained HTML document on [`RunReporter::flush`]. Rendering is a
//! pure function of the recorded state, so flushing twice without new
//! events rewrites the same bytes.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::{HarnessError, HarnessResult};

/// Severity of a single report entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Info,
    Pass,
    Fail,
}

impl EventLevel {
    fn label(self) -> &'static str {
        match self {
            EventLevel::Info => "INFO",
            EventLevel::Pass => "PASS",
            EventLevel::Fail => "FAIL",
        }
    }

    fn css_class(self) -> &'static str {
        match self {
            EventLevel::Info => "info",
            EventLevel::Pass => "pass",
            EventLevel::Fail => "fail",
        }
    }
}

/// One recorded entry under a report node
#[derive(Debug, Clone)]
pub struct ReportEvent {
    pub level: EventLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug)]
struct NodeRecord {
    name: String,
    events: Vec<ReportEvent>,
}

impl NodeRecord {
    fn has_failure(&self) -> bool {
        self.events.iter().any(|e| e.level == EventLevel::Fail)
    }

    fn has_pass(&self) -> bool {
        self.events.iter().any(|e| e.level == EventLevel::Pass)
    }
}

#[derive(Debug)]
struct ReportDoc {
    title: String,
    path: PathBuf,
    nodes: Vec<NodeRecord>,
}

/// Aggregate counters over the recorded nodes.
///
/// `passed` and `failed` count nodes, not events: a node with at least one
/// fail event counts as failed, otherwise it counts as passed if it has at
/// least one pass event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub nodes: usize,
    pub events: usize,
    pub passed: usize,
    pub failed: usize,
}

/// Shared recorder for one suite run.
///
/// Cheap to clone; all clones append to the same document. Nodes are
/// rendered in creation order and duplicate names are kept distinct.
#[derive(Clone)]
pub struct RunReporter {
    doc: Arc<Mutex<ReportDoc>>,
}

impl RunReporter {
    /// Create a reporter writing to `path`, creating the parent directory.
    ///
    /// Failure to create the directory is returned as an error so the run
    /// aborts before any case executes against a sink that cannot be
    /// written.
    pub fn create(title: impl Into<String>, path: impl Into<PathBuf>) -> HarnessResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    HarnessError::Report(format!(
                        "cannot create report directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }
        Ok(Self {
            doc: Arc::new(Mutex::new(ReportDoc {
                title: title.into(),
                path,
                nodes: Vec::new(),
            })),
        })
    }

    /// Append a new named node and return a handle for its events.
    pub fn add_node(&self, name: impl Into<String>) -> ReportNode {
        let mut doc = self.doc.lock();
        doc.nodes.push(NodeRecord {
            name: name.into(),
            events: Vec::new(),
        });
        ReportNode {
            doc: Arc::clone(&self.doc),
            index: doc.nodes.len() - 1,
        }
    }

    /// Render the report and overwrite the target file.
    pub fn flush(&self) -> HarnessResult<()> {
        let doc = self.doc.lock();
        let html = render(&doc);
        std::fs::write(&doc.path, html).map_err(|e| {
            HarnessError::Report(format!("cannot write report {}: {e}", doc.path.display()))
        })
    }

    pub fn summary(&self) -> ReportSummary {
        let doc = self.doc.lock();
        let failed = doc.nodes.iter().filter(|n| n.has_failure()).count();
        let passed = doc
            .nodes
            .iter()
            .filter(|n| !n.has_failure() && n.has_pass())
            .count();
        ReportSummary {
            nodes: doc.nodes.len(),
            events: doc.nodes.iter().map(|n| n.events.len()).sum(),
            passed,
            failed,
        }
    }
}

/// Handle for appending events to one node. Clones share the node.
#[derive(Clone)]
pub struct ReportNode {
    doc: Arc<Mutex<ReportDoc>>,
    index: usize,
}

impl ReportNode {
    fn push(&self, level: EventLevel, message: String) {
        let mut doc = self.doc.lock();
        doc.nodes[self.index].events.push(ReportEvent {
            level,
            message,
            timestamp: Utc::now(),
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(EventLevel::Info, message.into());
    }

    pub fn pass(&self, message: impl Into<String>) {
        self.push(EventLevel::Pass, message.into());
    }

    pub fn fail(&self, message: impl Into<String>) {
        self.push(EventLevel::Fail, message.into());
    }
}

fn render(doc: &ReportDoc) -> String {
    let failed = doc.nodes.iter().filter(|n| n.has_failure()).count();
    let passed = doc
        .nodes
        .iter()
        .filter(|n| !n.has_failure() && n.has_pass())
        .count();

    let mut out = String::with_capacity(2048);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape(&doc.title)));
    out.push_str("<style>\n");
    out.push_str("body { font-family: sans-serif; margin: 2em; color: #222; }\n");
    out.push_str("h1 { border-bottom: 2px solid #ccc; padding-bottom: 0.3em; }\n");
    out.push_str(".summary { color: #555; }\n");
    out.push_str("section { margin: 1em 0; padding: 0.5em 1em; border-left: 4px solid #999; background: #fafafa; }\n");
    out.push_str("section.failed { border-left-color: #c0392b; }\n");
    out.push_str("section.ok { border-left-color: #27ae60; }\n");
    out.push_str("table { border-collapse: collapse; width: 100%; }\n");
    out.push_str("td { padding: 2px 8px; vertical-align: top; font-size: 0.9em; }\n");
    out.push_str("td.time { color: #888; white-space: nowrap; }\n");
    out.push_str("td.level { font-weight: bold; white-space: nowrap; }\n");
    out.push_str("tr.pass td.level { color: #27ae60; }\n");
    out.push_str("tr.fail td.level { color: #c0392b; }\n");
    out.push_str("tr.info td.level { color: #2980b9; }\n");
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(&format!("<h1>{}</h1>\n", escape(&doc.title)));
    out.push_str(&format!(
        "<p class=\"summary\">{} nodes, {} passed, {} failed</p>\n",
        doc.nodes.len(),
        passed,
        failed
    ));

    for node in &doc.nodes {
        let status = if node.has_failure() {
            "failed"
        } else if node.has_pass() {
            "ok"
        } else {
            "quiet"
        };
        out.push_str(&format!("<section class=\"{status}\">\n"));
        out.push_str(&format!("<h2>{}</h2>\n<table>\n", escape(&node.name)));
        for event in &node.events {
            out.push_str(&format!(
                "<tr class=\"{}\"><td class=\"time\">{}</td><td class=\"level\">{}</td><td>{}</td></tr>\n",
                event.level.css_class(),
                event.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
                event.level.label(),
                escape(&event.message)
            ));
        }
        out.push_str("</table>\n</section>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
