use crate::wipe_engine::{WipeResult, WipeStatus};
use std::io::{self, Write};
use std::time::{Duration, Instant};

pub(crate) const CAT_FRAMES: [&str; 6] = [
    "ฅ(^･ω･^=)  ",
    "ฅ(=^･ω･^ ) ",
    "ฅ(^･ᴥ･^=)  ",
    "ฅ(=^ᴥ^= )  ",
    "ฅ(^･ω･^=)  ",
    "ฅ(=^･ω･^ ) ",
];

const GREEN: &str = "\x1b[38;5;82m";
const GRAY: &str = "\x1b[38;5;240m";
const CYAN: &str = "\x1b[38;5;51m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Two-line animated terminal progress display for a running wipe
pub struct ProgressBar {
    width: usize,
    cat_pos: usize,
    cat_frame: usize,
    start: Instant,
    first_render: bool,
}

impl ProgressBar {
    /// width = number of bar character slots (not including the brackets)
    pub fn new(width: usize) -> Self {
        Self {
            width,
            cat_pos: 0,
            cat_frame: 0,
            start: Instant::now(),
            first_render: true,
        }
    }

    /// Redraw in place on stderr
    pub fn render(&mut self, result: &WipeResult) {
        let (cat_line, bar_line) = self.render_lines(result);
        let mut err = io::stderr().lock();

        if self.first_render {
            let _ = write!(err, "{}\n{}\n", cat_line, bar_line);
            self.first_render = false;
        } else {
            // up two lines, clear, reprint
            let _ = write!(err, "\x1b[2A\x1b[2K\r{}\n\x1b[2K\r{}\n", cat_line, bar_line);
        }
        let _ = err.flush();
    }

    /// Final status line after the wipe ends
    pub fn finish(&mut self, result: &WipeResult) {
        let (label, color) = match result.status {
            WipeStatus::Completed => ("completed", GREEN),
            WipeStatus::Cancelled => ("cancelled", CYAN),
            _ => ("failed", "\x1b[38;5;196m"),
        };
        let mut err = io::stderr().lock();
        let _ = writeln!(
            err,
            "{}{}{}{} after {} ({} written)",
            BOLD,
            color,
            label,
            RESET,
            humantime::format_duration(Duration::from_secs(self.start.elapsed().as_secs())),
            human_bytes(result.bytes_wiped as f64),
        );
        let _ = err.flush();
    }

    /// Build the cat line and the bar line for the current state, advancing the animation
    pub fn render_lines(&mut self, result: &WipeResult) -> (String, String) {
        let pct = clamp_percent(result.overall_progress_percent());

        let filled = ((pct / 100.0) * self.width as f64).round() as usize;
        let empty = self.width.saturating_sub(filled);

        self.cat_pos = (self.cat_pos + 1) % self.width.max(1);
        self.cat_frame = (self.cat_frame + 1) % CAT_FRAMES.len();

        let cat_line = self.cat_line();

        let bar = format!(
            "{}{}{}{}{}{}{}",
            BOLD,
            GREEN,
            "█".repeat(filled),
            RESET,
            GRAY,
            "░".repeat(empty),
            RESET
        );

        let elapsed = self.start.elapsed().as_secs_f64().max(0.0001);
        let speed = result.bytes_wiped as f64 / elapsed;
        let grand_total = result.total_bytes.saturating_mul(result.total_passes as u64);
        let remaining = grand_total.saturating_sub(result.bytes_wiped);
        let eta = if speed > 0.0 {
            Duration::from_secs((remaining as f64 / speed).round() as u64)
        } else {
            Duration::ZERO
        };

        let bar_line = format!(
            "[{}] {}{:.1}%{}  pass {}/{}  {}{}/s  ETA {}{}",
            bar,
            BOLD,
            pct,
            RESET,
            result.passes_completed.max(1).min(result.total_passes.max(1)),
            result.total_passes,
            CYAN,
            human_bytes(speed),
            humantime::format_duration(eta),
            RESET
        );

        (cat_line, bar_line)
    }

    fn cat_line(&self) -> String {
        // cat walks across the bar and wraps around
        let mut line = vec![' '; self.width + 2];
        let cat: Vec<char> = CAT_FRAMES[self.cat_frame].chars().collect();
        let pos = self.cat_pos.min((self.width + 2).saturating_sub(cat.len()));
        for (i, c) in cat.iter().enumerate() {
            if let Some(slot) = line.get_mut(pos + i) {
                *slot = *c;
            }
        }
        line.into_iter().collect()
    }
}

fn clamp_percent(pct: f64) -> f64 {
    if pct.is_nan() {
        0.0
    } else {
        pct.clamp(0.0, 100.0)
    }
}

/// Convert bytes (or bytes/sec) to readable string
pub fn human_bytes(bps: f64) -> String {
    let units = ["B", "KB", "MB", "GB", "TB"];
    if bps <= 0.0 {
        return "0B".to_string();
    }
    let mut val = bps;
    let mut i = 0usize;
    while val >= 1024.0 && i + 1 < units.len() {
        val /= 1024.0;
        i += 1;
    }
    format!("{:.2}{}", val, units[i])
}
