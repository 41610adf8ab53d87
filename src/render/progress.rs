use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::{ProgressHandle, ProgressOptions, SpinnerHandle, TaskId, TaskUpdate};

const TICK: Duration = Duration::from_millis(100);

/// Where live displays draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DrawTarget {
    Stdout,
    Stderr,
    Hidden,
}

impl DrawTarget {
    fn build(self, hidden: bool) -> ProgressDrawTarget {
        match self {
            _ if hidden => ProgressDrawTarget::hidden(),
            DrawTarget::Stdout => ProgressDrawTarget::stdout(),
            DrawTarget::Stderr => ProgressDrawTarget::stderr(),
            DrawTarget::Hidden => ProgressDrawTarget::hidden(),
        }
    }
}

fn style(template: &str, fallback: fn() -> ProgressStyle) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| fallback())
}

/// Spinner for status scopes
pub(crate) struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub(crate) fn start(message: &str, target: DrawTarget, hidden: bool) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_draw_target(target.build(hidden));
        pb.set_style(style("{spinner:.green} {msg}", ProgressStyle::default_spinner));
        pb.set_message(message.to_string());
        pb.enable_steady_tick(TICK);
        Self { pb }
    }
}

impl SpinnerHandle for Spinner {
    fn set_message(&mut self, message: &str) {
        self.pb.set_message(message.to_string());
    }

    fn finish(&mut self) {
        self.pb.finish_and_clear();
    }
}

/// Multi-task progress display
pub(crate) struct TaskProgress {
    multi: MultiProgress,
    tasks: Vec<ProgressBar>,
    template: String,
    description: String,
    transient: bool,
}

impl TaskProgress {
    pub(crate) fn start(options: &ProgressOptions, target: DrawTarget) -> Self {
        let mut template = String::from("{spinner:.green} {msg} {wide_bar:.cyan/blue} {percent:>3}%");
        if options.show_speed {
            template.push_str(" {elapsed_precise} {eta_precise}");
        }
        Self {
            multi: MultiProgress::with_draw_target(target.build(options.hidden)),
            tasks: Vec::new(),
            template,
            description: options.description.clone(),
            transient: options.transient,
        }
    }

    fn task(&self, task: TaskId) -> Option<&ProgressBar> {
        let bar = self.tasks.get(task.0);
        if bar.is_none() {
            log::warn!("progress update for unknown task {}", task.0);
        }
        bar
    }
}

impl ProgressHandle for TaskProgress {
    fn add_task(&mut self, description: &str, total: u64) -> TaskId {
        let pb = self.multi.add(ProgressBar::new(total));
        pb.set_style(style(&self.template, ProgressStyle::default_bar).progress_chars("━╸ "));
        let message = if self.description.is_empty() {
            description
        } else {
            self.description.as_str()
        };
        pb.set_message(message.to_string());
        pb.enable_steady_tick(TICK);
        self.tasks.push(pb);
        TaskId(self.tasks.len() - 1)
    }

    fn advance(&mut self, task: TaskId, delta: u64) {
        if let Some(pb) = self.task(task) {
            pb.inc(delta);
        }
    }

    fn update(&mut self, task: TaskId, update: &TaskUpdate) {
        let Some(pb) = self.task(task) else {
            return;
        };
        if let Some(total) = update.total {
            pb.set_length(total);
        }
        if let Some(completed) = update.completed {
            pb.set_position(completed);
        }
        if let Some(description) = &update.description {
            if self.description.is_empty() {
                pb.set_message(description.clone());
            }
        }
    }

    fn finish(&mut self) {
        for pb in &self.tasks {
            if self.transient {
                pb.finish_and_clear();
            } else {
                pb.finish();
            }
        }
        if self.transient {
            if let Err(e) = self.multi.clear() {
                log::debug!("failed to clear progress display: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_tracks_positions() {
        let options = ProgressOptions {
            hidden: true,
            ..ProgressOptions::default()
        };
        let mut progress = TaskProgress::start(&options, DrawTarget::Stderr);
        let a = progress.add_task("download", 10);
        let b = progress.add_task("extract", 4);
        progress.advance(a, 3);
        progress.advance(a, 2);
        progress.update(b, &TaskUpdate::default().completed(4).total(8));

        assert_eq!(progress.tasks[0].position(), 5);
        assert_eq!(progress.tasks[1].position(), 4);
        assert_eq!(progress.tasks[1].length(), Some(8));

        // Unknown ids are ignored
        progress.advance(TaskId(9), 1);
        progress.finish();
        assert!(progress.tasks.iter().all(ProgressBar::is_finished));
    }

    #[test]
    fn test_fixed_description_overrides_task_names() {
        let options = ProgressOptions {
            hidden: true,
            description: "Working".into(),
            ..ProgressOptions::default()
        };
        let mut progress = TaskProgress::start(&options, DrawTarget::Hidden);
        let id = progress.add_task("ignored", 1);
        progress.update(id, &TaskUpdate::default().description("also ignored"));
        assert_eq!(progress.tasks[0].message(), "Working");
    }

    #[test]
    fn test_transient_progress_clears_on_finish() {
        let options = ProgressOptions::default().transient(true);
        let mut progress = TaskProgress::start(&options, DrawTarget::Hidden);
        progress.add_task("upload", 2);
        progress.finish();
        assert!(progress.tasks[0].is_finished());
    }

    #[test]
    fn test_spinner_finishes() {
        let mut spinner = Spinner::start("loading", DrawTarget::Hidden, true);
        spinner.set_message("still loading");
        spinner.finish();
        assert!(spinner.pb.is_finished());
    }
}
