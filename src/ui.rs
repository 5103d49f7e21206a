//! Stage progress reporting for the CLI binaries.
//!
//! Pretty mode shows an `indicatif` spinner per stage on stderr; plain mode
//! prints one line per stage. Either way the stage name and elapsed time are
//! reported when the stage ends.

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiMode {
    Auto,
    Plain,
    Pretty,
}

impl UiMode {
    pub fn from_flag(flag: &str) -> Self {
        match flag {
            "plain" => UiMode::Plain,
            "pretty" => UiMode::Pretty,
            _ => UiMode::Auto,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Ui {
    mode: UiMode,
    stderr_is_tty: bool,
}

impl Ui {
    pub fn new(mode: UiMode, stderr_is_tty: bool) -> Self {
        Self {
            mode,
            stderr_is_tty,
        }
    }

    fn pretty(&self) -> bool {
        match self.mode {
            UiMode::Pretty => true,
            UiMode::Plain => false,
            UiMode::Auto => self.stderr_is_tty,
        }
    }

    pub fn stage(&self, name: &str) -> StageGuard {
        if self.pretty() {
            let spinner = ProgressBar::new_spinner();
            spinner.set_draw_target(ProgressDrawTarget::stderr());
            spinner.enable_steady_tick(Duration::from_millis(120));
            if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
                spinner.set_style(style);
            }
            spinner.set_message(name.to_string());
            StageGuard {
                name: name.to_string(),
                start: Instant::now(),
                spinner: Some(spinner),
            }
        } else {
            eprintln!("==> {}", name);
            StageGuard {
                name: name.to_string(),
                start: Instant::now(),
                spinner: None,
            }
        }
    }
}

pub struct StageGuard {
    name: String,
    start: Instant,
    spinner: Option<ProgressBar>,
}

impl Drop for StageGuard {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        let line = if elapsed.as_secs() >= 1 {
            format!("{} ({:.2}s)", self.name, elapsed.as_secs_f64())
        } else {
            format!("{} ({}ms)", self.name, elapsed.as_millis())
        };
        if let Some(spinner) = &self.spinner {
            spinner.finish_with_message(line);
        } else {
            eprintln!("    {line}");
        }
    }
}
