//! Recording renderer for tests.
//!
//! Captures every call the facade makes so tests can assert on what would
//! have been drawn, and serves scripted answers to prompts.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::render::{
    ErrorReport, Line, Panel, ProgressHandle, ProgressOptions, Renderer, SpinnerHandle,
    TableData, TaskId, TaskUpdate, TreeNode,
};

/// One captured renderer call.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Line(Line),
    Blank(usize),
    Rule {
        label: Option<Line>,
        style: Option<String>,
    },
    Panel(Panel),
    Table(TableData),
    Tree(TreeNode),
    Markdown(String),
    ErrorReport(ErrorReport),
    Prompt {
        prompt: Line,
        hidden: bool,
    },
    SpinnerStarted {
        message: String,
        hidden: bool,
    },
    SpinnerMessage(String),
    SpinnerStopped,
    ProgressStarted(ProgressOptions),
    TaskAdded {
        task: TaskId,
        description: String,
        total: u64,
    },
    TaskAdvanced {
        task: TaskId,
        delta: u64,
    },
    TaskUpdated {
        task: TaskId,
        update: TaskUpdate,
    },
    ProgressStopped,
}

type Log = Arc<Mutex<Vec<Record>>>;

#[derive(Default)]
pub struct RecordingRenderer {
    records: Log,
    answers: Mutex<VecDeque<String>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for the next prompt.
    pub fn push_answer(&self, answer: impl Into<String>) {
        self.answers.lock().push_back(answer.into());
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn count(&self, matches: impl Fn(&Record) -> bool) -> usize {
        self.records.lock().iter().filter(|r| matches(r)).count()
    }

    /// Plain text of every captured [`Record::Line`].
    pub fn lines(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter_map(|r| match r {
                Record::Line(line) => Some(line.plain_text()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, record: Record) {
        self.records.lock().push(record);
    }
}

impl Renderer for RecordingRenderer {
    fn line(&self, line: &Line) {
        self.push(Record::Line(line.clone()));
    }

    fn blank(&self, count: usize) {
        self.push(Record::Blank(count));
    }

    fn rule(&self, label: Option<&Line>, style: Option<&str>) {
        self.push(Record::Rule {
            label: label.cloned(),
            style: style.map(str::to_string),
        });
    }

    fn panel(&self, panel: &Panel) {
        self.push(Record::Panel(panel.clone()));
    }

    fn table(&self, table: &TableData) {
        self.push(Record::Table(table.clone()));
    }

    fn tree(&self, tree: &TreeNode) {
        self.push(Record::Tree(tree.clone()));
    }

    fn markdown(&self, text: &str) {
        self.push(Record::Markdown(text.to_string()));
    }

    fn error_report(&self, report: &ErrorReport) {
        self.push(Record::ErrorReport(report.clone()));
    }

    fn spinner(&self, message: &str, hidden: bool) -> Box<dyn SpinnerHandle> {
        self.push(Record::SpinnerStarted {
            message: message.to_string(),
            hidden,
        });
        Box::new(RecordingSpinner {
            records: Arc::clone(&self.records),
        })
    }

    fn progress(&self, options: &ProgressOptions) -> Box<dyn ProgressHandle> {
        self.push(Record::ProgressStarted(options.clone()));
        Box::new(RecordingProgress {
            records: Arc::clone(&self.records),
            tasks: 0,
        })
    }

    fn read_line(&self, prompt: &Line, hidden: bool) -> io::Result<String> {
        self.push(Record::Prompt {
            prompt: prompt.clone(),
            hidden,
        });
        self.answers
            .lock()
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer"))
    }
}

struct RecordingSpinner {
    records: Log,
}

impl SpinnerHandle for RecordingSpinner {
    fn set_message(&mut self, message: &str) {
        self.records
            .lock()
            .push(Record::SpinnerMessage(message.to_string()));
    }

    fn finish(&mut self) {
        self.records.lock().push(Record::SpinnerStopped);
    }
}

struct RecordingProgress {
    records: Log,
    tasks: usize,
}

impl ProgressHandle for RecordingProgress {
    fn add_task(&mut self, description: &str, total: u64) -> TaskId {
        let task = TaskId(self.tasks);
        self.tasks += 1;
        self.records.lock().push(Record::TaskAdded {
            task,
            description: description.to_string(),
            total,
        });
        task
    }

    fn advance(&mut self, task: TaskId, delta: u64) {
        self.records.lock().push(Record::TaskAdvanced { task, delta });
    }

    fn update(&mut self, task: TaskId, update: &TaskUpdate) {
        self.records.lock().push(Record::TaskUpdated {
            task,
            update: update.clone(),
        });
    }

    fn finish(&mut self) {
        self.records.lock().push(Record::ProgressStopped);
    }
}
