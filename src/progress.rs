use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{prefix:.bold} {msg:.bold} [{elapsed_precise}] {bar:48.cyan/blue} {pos:>7}/{len:7} {percent:>3}% ETA {eta_precise}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█▇▆▅▄▃▂▁ ")
}

pub fn bar(len: u64, prefix: &str, msg: &str) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::stderr_with_hz(15));
    pb.set_style(bar_style());
    pb.set_prefix(prefix.to_string());
    pb.set_message(msg.to_string());
    pb
}

pub fn maybe_bar(enabled: bool, len: u64, prefix: &str, msg: &str) -> Option<ProgressBar> {
    if enabled && len > 0 {
        Some(bar(len, prefix, msg))
    } else {
        None
    }
}
