use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Runs `f` behind a spinner on stderr.
///
/// The spinner is hidden when stderr is not a terminal.
pub fn spin<T>(message: &'static str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner().with_message(message);
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = f();
    spinner.finish_and_clear();
    result
}
