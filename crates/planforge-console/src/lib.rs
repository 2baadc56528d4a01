//! Colorful console output for solver events.
//!
//! Provides a `tracing` layer that renders the structured events emitted by
//! `planforge-solver` with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (solving/phase start/end)
//! - **DEBUG**: Steps and applied problem changes
//! - **WARN**: Tolerated anomalies such as an exhausted node limit
//!
//! The level filter is read from `RUST_LOG` and defaults to
//! `planforge_solver=info`.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use chrono::Local;
use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();
static SOLVE_START_NANOS: AtomicU64 = AtomicU64::new(0);

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Target prefix of the events this layer renders.
const SOLVER_TARGET: &str = "planforge_solver";

/// Initializes the solver console output.
///
/// Safe to call multiple times - only the first call has effect.
/// Prints the banner and installs a global subscriber unless one is
/// already set.
pub fn init() {
    INIT.get_or_init(|| {
        print_banner();

        let filter = EnvFilter::builder()
            .with_default_directive(default_directive())
            .from_env_lossy();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(SolverConsoleLayer)
            .try_init();
    });
}

fn default_directive() -> Directive {
    format!("{}=info", SOLVER_TARGET)
        .parse()
        .unwrap_or_else(|_| LevelFilter::INFO.into())
}

fn mark_solve_start() {
    let epoch = EPOCH.get_or_init(Instant::now);
    let nanos = epoch.elapsed().as_nanos() as u64;
    SOLVE_START_NANOS.store(nanos, Ordering::Relaxed);
}

fn elapsed_secs() -> f64 {
    let Some(epoch) = EPOCH.get() else {
        return 0.0;
    };
    let start_nanos = SOLVE_START_NANOS.load(Ordering::Relaxed);
    let now_nanos = epoch.elapsed().as_nanos() as u64;
    now_nanos.saturating_sub(start_nanos) as f64 / 1_000_000_000.0
}

fn print_banner() {
    let banner = r#"
 ____  _             _____
|  _ \| | __ _ _ __ |  ___|__  _ __ __ _  ___
| |_) | |/ _` | '_ \| |_ / _ \| '__/ _` |/ _ \
|  __/| | (_| | | | |  _| (_) | | | (_| |  __/
|_|   |_|\__,_|_| |_|_|  \___/|_|  \__, |\___|
                                   |___/
"#;

    let version_line = format!("            v{} - Metaheuristic Planning Engine", VERSION);
    let started_line = format!(
        "            started {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = writeln!(stdout, "{}", started_line.bright_black());
    let _ = stdout.flush();
}

/// A tracing layer that formats solver events with colors.
#[derive(Debug, Default, Clone, Copy)]
pub struct SolverConsoleLayer;

impl<S: Subscriber> Layer<S> for SolverConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with(SOLVER_TARGET) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Debug, Default)]
struct EventVisitor {
    event: Option<String>,
    message: Option<String>,
    phase: Option<String>,
    change: Option<String>,
    score: Option<String>,
    best_score: Option<String>,
    environment_mode: Option<String>,
    random_seed: Option<String>,
    phase_index: Option<u64>,
    phases: Option<u64>,
    move_thread_count: Option<u64>,
    steps: Option<u64>,
    step: Option<u64>,
    selected: Option<u64>,
    accepted: Option<u64>,
    moves_evaluated: Option<u64>,
    moves_accepted: Option<u64>,
    score_calculation_count: Option<u64>,
    duration_ms: Option<u64>,
    terminated_early: Option<bool>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value).trim_matches('"').to_string();
        match field.name() {
            "event" => self.event = Some(s),
            "message" => self.message = Some(s),
            "phase" => self.phase = Some(s),
            "change" => self.change = Some(s),
            "score" => self.score = Some(s),
            "best_score" => self.best_score = Some(s),
            "environment_mode" => self.environment_mode = Some(s),
            "random_seed" => self.random_seed = Some(s),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "event" => self.event = Some(value.to_string()),
            "message" => self.message = Some(value.to_string()),
            "phase" => self.phase = Some(value.to_string()),
            _ => self.record_debug(field, &value),
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "phase_index" => self.phase_index = Some(value),
            "phases" => self.phases = Some(value),
            "move_thread_count" => self.move_thread_count = Some(value),
            "steps" => self.steps = Some(value),
            "step" => self.step = Some(value),
            "selected" => self.selected = Some(value),
            "accepted" => self.accepted = Some(value),
            "moves_evaluated" => self.moves_evaluated = Some(value),
            "moves_accepted" => self.moves_accepted = Some(value),
            "score_calculation_count" => self.score_calculation_count = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "terminated_early" {
            self.terminated_early = Some(value);
        }
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    match v.event.as_deref().unwrap_or("") {
        "solve_start" => format_solve_start(v),
        "solve_end" => format_solve_end(v),
        "phase_start" => format_phase_start(v),
        "phase_end" => format_phase_end(v),
        "step" => format_step(v),
        "problem_change" => format_problem_change(v),
        _ if level == Level::WARN => format_warning(v),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn format_solve_start(v: &EventVisitor) -> String {
    mark_solve_start();
    let phases = v.phases.unwrap_or(0);
    let mode = v.environment_mode.as_deref().unwrap_or("Reproducible");
    let threads = v.move_thread_count.unwrap_or(1);

    let mut output = format!(
        "{} {} Solving │ {} phases │ {} mode",
        format_elapsed(),
        "▶".bright_green().bold(),
        phases.to_formatted_string(&Locale::en).bright_yellow(),
        mode.bright_yellow(),
    );
    if let Some(seed) = v.random_seed.as_deref().filter(|s| *s != "None") {
        let seed = seed.trim_start_matches("Some(").trim_end_matches(')');
        output.push_str(&format!(" │ seed {}", seed.bright_yellow()));
    }
    if threads > 1 {
        output.push_str(&format!(
            " │ {} move threads",
            threads.to_formatted_string(&Locale::en).bright_yellow()
        ));
    }
    if let Some(score) = v.score.as_deref().filter(|s| !s.is_empty()) {
        output.push_str(&format!(" │ {}", format_score(score)));
    }
    output
}

fn format_solve_end(v: &EventVisitor) -> String {
    let score = v.score.as_deref().filter(|s| !s.is_empty()).unwrap_or("N/A");
    let feasible = is_feasible(score);
    let steps = v.steps.unwrap_or(0);
    let duration = v.duration_ms.unwrap_or(0);
    let calc_speed = per_second(v.score_calculation_count.unwrap_or(0), duration);

    let status = if feasible {
        "FEASIBLE".bright_green().bold().to_string()
    } else {
        "INFEASIBLE".bright_red().bold().to_string()
    };

    let mut output = format!(
        "{} {} Solving {} │ {} │ {} steps │ {} calcs/s │ {} │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        if v.terminated_early == Some(true) {
            "terminated early"
        } else {
            "complete"
        },
        format_duration_ms(duration).yellow(),
        steps.to_formatted_string(&Locale::en).white(),
        calc_speed
            .to_formatted_string(&Locale::en)
            .bright_magenta()
            .bold(),
        format_score(score),
        status
    );

    output.push_str("\n\n");
    output.push_str(&summary_box(score, feasible));
    output
}

const BOX_WIDTH: usize = 58;

fn summary_box(score: &str, feasible: bool) -> String {
    let rule = "═".repeat(BOX_WIDTH);
    let status_text = if feasible {
        "FEASIBLE SOLUTION FOUND"
    } else {
        "INFEASIBLE (hard constraints violated)"
    };
    let total_pad = BOX_WIDTH.saturating_sub(status_text.len());
    let left_pad = total_pad / 2;
    let right_pad = total_pad - left_pad;
    let status_colored = if feasible {
        status_text.bright_green().bold().to_string()
    } else {
        status_text.bright_red().bold().to_string()
    };

    let mut output = String::new();
    output.push_str(&format!("╔{}╗", rule).bright_cyan().to_string());
    output.push('\n');
    output.push_str(&format!(
        "{}{}{}{}{}",
        "║".bright_cyan(),
        " ".repeat(left_pad),
        status_colored,
        " ".repeat(right_pad),
        "║".bright_cyan()
    ));
    output.push('\n');
    output.push_str(&format!("╠{}╣", rule).bright_cyan().to_string());
    output.push('\n');
    output.push_str(&format!(
        "{}  {:<18}{:>36}  {}",
        "║".bright_cyan(),
        "Final Score:",
        score,
        "║".bright_cyan()
    ));
    output.push('\n');
    output.push_str(&format!("╚{}╝", rule).bright_cyan().to_string());
    output.push('\n');
    output
}

fn format_phase_start(v: &EventVisitor) -> String {
    let phase = v.phase.as_deref().unwrap_or("Unknown");
    let index = v.phase_index.unwrap_or(0);

    format!(
        "{} {} {} ({}) started │ {}",
        format_elapsed(),
        "▶".bright_blue(),
        phase.white().bold(),
        index.to_string().yellow(),
        format_score(v.score.as_deref().unwrap_or("N/A"))
    )
}

fn format_phase_end(v: &EventVisitor) -> String {
    let phase = v.phase.as_deref().unwrap_or("Unknown");
    let index = v.phase_index.unwrap_or(0);
    let steps = v.steps.unwrap_or(0);
    let duration = v.duration_ms.unwrap_or(0);
    let moves_speed = per_second(v.moves_evaluated.unwrap_or(0), duration);
    let score = v.score.as_deref().filter(|s| !s.is_empty()).unwrap_or("N/A");

    let mut output = format!(
        "{} {} {} ({}) ended │ {} │ {} steps │ {} moves/s",
        format_elapsed(),
        "◀".bright_blue(),
        phase.white().bold(),
        index.to_string().yellow(),
        format_duration_ms(duration).yellow(),
        steps.to_formatted_string(&Locale::en).white(),
        moves_speed
            .to_formatted_string(&Locale::en)
            .bright_magenta()
            .bold(),
    );

    if let Some(calcs) = v.score_calculation_count {
        output.push_str(&format!(
            " │ {} calcs/s",
            per_second(calcs, duration)
                .to_formatted_string(&Locale::en)
                .bright_magenta()
                .bold()
        ));
    }
    if let (Some(evaluated), Some(accepted)) = (v.moves_evaluated, v.moves_accepted) {
        if let Some(rate) = acceptance_rate(accepted, evaluated) {
            output.push_str(&format!(" │ {} accepted", rate.bright_yellow()));
        }
    }

    output.push_str(&format!(" │ {}", format_score(score)));
    output
}

fn format_step(v: &EventVisitor) -> String {
    let step = v.step.unwrap_or(0);
    let score = v.score.as_deref().filter(|s| !s.is_empty()).unwrap_or("N/A");
    let best = v.best_score.as_deref().filter(|s| !s.is_empty()).unwrap_or("N/A");
    let accepted = v.accepted.unwrap_or(0);

    let icon = if accepted > 0 {
        "✓".bright_green().to_string()
    } else {
        "✗".bright_red().to_string()
    };

    format!(
        "{} {} Step {:>10} │ {:>6}/{:<6} accepted │ {} │ best {}",
        format_elapsed(),
        icon,
        step.to_formatted_string(&Locale::en).bright_black(),
        accepted.to_formatted_string(&Locale::en),
        v.selected.unwrap_or(0).to_formatted_string(&Locale::en),
        format_score(score),
        format_score(best)
    )
}

fn format_problem_change(v: &EventVisitor) -> String {
    format!(
        "{} {} Problem change {} applied │ {}",
        format_elapsed(),
        "↻".bright_yellow().bold(),
        v.change.as_deref().unwrap_or("").white(),
        format_score(v.score.as_deref().unwrap_or("N/A"))
    )
}

fn format_warning(v: &EventVisitor) -> String {
    let what = v
        .message
        .as_deref()
        .or(v.event.as_deref())
        .unwrap_or("warning");
    format!("{} {} {}", format_elapsed(), "⚠".yellow().bold(), what.yellow())
}

fn per_second(count: u64, duration_ms: u64) -> u64 {
    if duration_ms == 0 {
        return count;
    }
    count.saturating_mul(1000) / duration_ms
}

fn acceptance_rate(accepted: u64, evaluated: u64) -> Option<String> {
    if evaluated == 0 {
        return None;
    }
    Some(format!("{:.1}%", accepted as f64 * 100.0 / evaluated as f64))
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

/// Hard level values of a rendered score, or `None` for scores without a
/// hard level.
fn hard_levels(score: &str) -> Option<Vec<f64>> {
    if let Some(end) = score.find("]hard") {
        let start = score[..end].rfind('[')? + 1;
        return Some(
            score[start..end]
                .split('/')
                .filter_map(|n| n.trim().parse::<f64>().ok())
                .collect(),
        );
    }
    score
        .split('/')
        .find_map(|part| part.strip_suffix("hard"))
        .map(|hard| hard.parse::<f64>().ok().into_iter().collect())
}

/// A rendered score is feasible when it is initialized and no hard level is
/// negative. Scores without hard levels are always feasible once initialized.
fn is_feasible(score: &str) -> bool {
    if score.contains("init") {
        return false;
    }
    hard_levels(score).map_or(true, |levels| levels.iter().all(|h| *h >= 0.0))
}

fn format_score(score: &str) -> String {
    if score.contains('[') {
        return score.white().to_string();
    }
    let parts: Vec<String> = score.split('/').map(format_score_level).collect();
    parts.join("/")
}

fn format_score_level(part: &str) -> String {
    let (number, label) = match part.find(|c: char| c.is_ascii_alphabetic()) {
        Some(i) => part.split_at(i),
        None => (part, ""),
    };
    let Ok(value) = number.parse::<f64>() else {
        return part.white().to_string();
    };
    match label {
        "init" => part.bright_black().to_string(),
        "hard" if value < 0.0 => part.bright_red().to_string(),
        "medium" | "soft" if value < 0.0 => part.yellow().to_string(),
        "" if value < 0.0 => part.bright_red().to_string(),
        _ if value > 0.0 => part.bright_green().to_string(),
        _ => part.white().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feasibility_of_rendered_scores() {
        assert!(is_feasible("0hard/-12soft"));
        assert!(is_feasible("3hard/0soft"));
        assert!(!is_feasible("-1hard/0soft"));
        assert!(!is_feasible("-2init/0hard/0soft"));
        assert!(is_feasible("-5"));
        assert!(is_feasible("[0/0]hard/[-3/-1]soft"));
        assert!(!is_feasible("[0/-1]hard/[0/0]soft"));
    }

    #[test]
    fn test_duration_formatting() {
        assert_eq!(format_duration_ms(250), "250ms");
        assert_eq!(format_duration_ms(1_500), "1.50s");
        assert_eq!(format_duration_ms(125_000), "2m 5s");
    }

    #[test]
    fn test_speeds_and_rates() {
        assert_eq!(per_second(5_000, 2_000), 2_500);
        assert_eq!(per_second(7, 0), 7);
        assert_eq!(acceptance_rate(1, 4).as_deref(), Some("25.0%"));
        assert_eq!(acceptance_rate(0, 0), None);
    }

    #[test]
    fn test_unknown_info_events_are_silent() {
        let visitor = EventVisitor {
            event: Some("parallel_evaluation".to_string()),
            ..EventVisitor::default()
        };
        assert!(format_event(&visitor, Level::INFO).is_empty());
        assert!(!format_event(&visitor, Level::WARN).is_empty());
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        assert!(INIT.get().is_some());
    }
}
