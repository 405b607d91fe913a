/// Events emitted while a workflow runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    StageStart { name: &'static str },
    StageFinish,

    /// The distance solver is about to work through `total_targets` separations.
    SolveStart { total_targets: u64 },
    TargetConverged { target: f64, achieved: f64 },
    SolveFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

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

    pub(crate) fn stage<T, E>(
        &self,
        name: &'static str,
        body: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        self.report(Progress::StageStart { name });
        let result = body();
        if result.is_ok() {
            self.report(Progress::StageFinish);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording_reporter() -> (ProgressReporter<'static>, Arc<Mutex<Vec<Progress>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            sink.lock().unwrap().push(event);
        }));
        (reporter, events)
    }

    #[test]
    fn reporter_without_callback_is_silent() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::Message("ignored".to_string()));
    }

    #[test]
    fn stage_reports_start_and_finish_on_success() {
        let (reporter, events) = recording_reporter();
        let value: Result<i32, ()> = reporter.stage("Filtering", || Ok(7));
        assert_eq!(value, Ok(7));
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                Progress::StageStart { name: "Filtering" },
                Progress::StageFinish
            ]
        );
    }

    #[test]
    fn stage_omits_finish_on_failure() {
        let (reporter, events) = recording_reporter();
        let value: Result<(), &str> = reporter.stage("Cleaning", || Err("boom"));
        assert!(value.is_err());
        assert_eq!(events.lock().unwrap().len(), 1);
    }
}
