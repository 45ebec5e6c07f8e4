//! Progress events of a database generation run.
//!
//! The library never renders progress itself. A front end installs a callback on a
//! [`ProgressReporter`] and receives the events below from the workflow's writer thread, in
//! the order the run produces them.

/// An observable step of the generation workflow.
#[derive(Debug, Clone)]
pub enum Progress {
    /// A named phase begins (`"Deduplication"`, `"Generation"`).
    PhaseStart { name: &'static str },
    PhaseFinish,

    /// `count` deduplicated molecules were handed to the worker pool.
    MoleculesQueued { count: u64 },
    /// One molecule left the worker pool; `written` is `false` when it produced no data.
    MoleculeFinished { written: bool },
    /// Every queued molecule was accounted for.
    MoleculesDrained,

    /// A periodic notice, such as the running count of processed molecules.
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards [`Progress`] events to an optional callback; without one, events are dropped.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_forwards_events_to_callback() {
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            seen.lock().unwrap().push(format!("{:?}", event));
        }));
        reporter.report(Progress::MoleculesQueued { count: 2 });
        reporter.report(Progress::MoleculeFinished { written: false });
        drop(reporter);

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[1].contains("written: false"));
    }

    #[test]
    fn reporter_without_callback_is_silent() {
        ProgressReporter::new().report(Progress::Message("ignored".to_string()));
    }
}
