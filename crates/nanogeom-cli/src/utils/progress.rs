use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use nanogeom::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Renders workflow progress events on stderr with `indicatif`.
///
/// Stages show as spinners; the distance solver shows a bar with one step per target.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Initializing...");
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    /// A handler that never draws, for `--quiet` runs.
    pub fn hidden() -> Self {
        let pb = ProgressBar::hidden();
        pb.finish_and_clear();
        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::StageStart { name } => {
                    pb_guard.reset();
                    pb_guard.set_length(0);
                    pb_guard.set_style(Self::spinner_style());
                    pb_guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb_guard.set_message(name.to_string());
                }
                Progress::StageFinish => {
                    pb_guard.disable_steady_tick();
                    pb_guard.finish_with_message("✓ Done");
                }
                Progress::SolveStart { total_targets } => {
                    pb_guard.disable_steady_tick();
                    pb_guard.reset();
                    pb_guard.set_length(total_targets);
                    pb_guard.set_position(0);
                    pb_guard.set_style(Self::bar_style());
                    pb_guard.set_message("Separations");
                }
                Progress::TargetConverged { target, achieved } => {
                    pb_guard.inc(1);
                    pb_guard.set_message(format!("d = {:.2} Å ({:.4})", target, achieved));
                }
                Progress::SolveFinish => {
                    let length = pb_guard.length().unwrap_or(0);
                    if pb_guard.position() < length {
                        pb_guard.set_position(length);
                    }
                    pb_guard.finish();
                }
                Progress::Message(msg) => {
                    if !pb_guard.is_finished() {
                        pb_guard.println(format!("  {}", msg));
                    } else {
                        pb_guard.set_message(msg);
                    }
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .expect("Failed to create spinner style template")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<24} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .expect("Failed to create bar style template")
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn handler_initializes_in_a_clean_state() {
        let handler = CliProgressHandler::new();
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(0));
        assert!(pb.is_finished());
    }

    #[test]
    fn stage_events_drive_the_spinner() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::StageStart {
            name: "Carving shape",
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "Carving shape");
            assert!(!pb.is_finished());
        }

        callback(Progress::StageFinish);
        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "✓ Done");
    }

    #[test]
    fn solver_events_drive_the_bar() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::SolveStart { total_targets: 3 });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.length(), Some(3));
            assert_eq!(pb.position(), 0);
        }

        callback(Progress::TargetConverged {
            target: 10.0,
            achieved: 10.004,
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.position(), 1);
            assert!(pb.message().contains("10.00"));
        }

        callback(Progress::SolveFinish);
        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.position(), 3);
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::StageStart {
                name: "Solving separations",
            });
            callback(Progress::Message("halfway".to_string()));
            callback(Progress::StageFinish);
        })
        .join()
        .unwrap();

        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "✓ Done");
    }

    #[test]
    fn hidden_handler_accepts_events() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();
        callback(Progress::SolveStart { total_targets: 1 });
        callback(Progress::SolveFinish);
        assert!(handler.pb.lock().unwrap().is_finished());
    }
}
