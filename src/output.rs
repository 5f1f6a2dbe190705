use std::error::Error;
use std::io::{self, Write};

use crate::aggregate::{AggregatedMilestone, Aggregation};
use crate::due_date;
use crate::warning::Warning;

/// Primary and diagnostic streams. Results go to `out`; warnings and
/// repository-local errors go to `err`, so `out` stays scriptable.
pub struct Output<'a> {
    out: &'a mut (dyn Write + Send),
    err: &'a mut (dyn Write + Send),
}

impl<'a> Output<'a> {
    pub fn new(out: &'a mut (dyn Write + Send), err: &'a mut (dyn Write + Send)) -> Self {
        Output { out, err }
    }

    pub fn println(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{message}")
    }

    pub fn warn(&mut self, warning: &Warning) -> io::Result<()> {
        writeln!(self.err, "warning: {warning}")
    }

    /// Reports an error with its cause chain on one line.
    pub fn error(&mut self, error: &dyn Error) -> io::Result<()> {
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        writeln!(self.err, "error: {message}")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()?;
        self.err.flush()
    }
}

/// `title<TAB>due day<TAB>repo,repo` with repositories in sorted order.
pub fn list_line(title: &str, milestone: &AggregatedMilestone) -> String {
    let repos = milestone
        .repos
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{title}\t{}\t{repos}",
        due_date::describe_day(milestone.due.as_ref())
    )
}

/// Writes warnings first, then one line per title in title order.
pub fn render_aggregation(output: &mut Output<'_>, aggregation: &Aggregation) -> io::Result<()> {
    for warning in &aggregation.warnings {
        output.warn(warning)?;
    }
    for (title, milestone) in &aggregation.milestones {
        output.println(&list_line(title, milestone))?;
    }
    Ok(())
}
