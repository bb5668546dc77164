use lexiscore::{EngineResult, OrchestratorReport, ReportStatus};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            self.wrap(s, color)
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            self.wrap(s, BOLD)
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            self.wrap(s, DIM)
        }

        fn wrap(&self, s: impl AsRef<str>, code: &str) -> String {
            if self.enabled { format!("{code}{}{RESET}", s.as_ref()) } else { s.as_ref().to_string() }
        }
    }
}

const PREVIEW_CHARS: usize = 60;
const BAR_WIDTH: usize = 20;

pub fn print_report(input: &str, report: &OrchestratorReport, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Scoring: \"{}\"", preview(input)), ansi::CYAN)));

    if report.status == ReportStatus::Rejected {
        println!("\n{}", palette.paint("━━━ Rejected ━━━", ansi::GRAY));
        for line in &report.crystallized_knowledge {
            println!("  {}", palette.paint(line, ansi::RED));
        }
        print_footer(report, &palette);
        return;
    }

    println!("\n{}", palette.paint("━━━ Engines ━━━", ansi::GRAY));
    if report.engine_results.is_empty() {
        println!("{}", palette.dim("  No engine produced a result"));
    }
    for result in report.engine_results.values() {
        print_engine(result, &palette);
    }

    if !report.applied_bonuses.is_empty() || !report.cross_engine_correlations.is_empty() {
        println!("\n{}", palette.paint("━━━ Cross-engine ━━━", ansi::GRAY));
        for bonus in &report.applied_bonuses {
            println!("  {} {}", palette.dim("bonus:"), palette.paint(bonus, ansi::MAGENTA));
        }
        for correlation in &report.cross_engine_correlations {
            println!("  {} {}", palette.dim("•"), correlation);
        }
    }

    println!("\n{}", palette.paint("━━━ Insights ━━━", ansi::GRAY));
    if report.crystallized_knowledge.is_empty() {
        println!("{}", palette.dim("  No category crossed the insight threshold"));
    }
    for insight in &report.crystallized_knowledge {
        println!("  {} {}", palette.dim("•"), insight);
    }

    if !report.warnings.is_empty() {
        println!("\n{}", palette.paint("━━━ Warnings ━━━", ansi::GRAY));
        for warning in &report.warnings {
            println!("  {}", palette.paint(warning, ansi::YELLOW));
        }
    }

    print_footer(report, &palette);
}

fn print_engine(result: &EngineResult, palette: &ansi::Palette) {
    let patterns = if result.patterns.is_empty() {
        palette.dim("no patterns")
    } else {
        palette.paint(result.patterns.iter().map(String::as_str).collect::<Vec<_>>().join(", "), ansi::BLUE)
    };
    println!(
        "  {} {} {} {}  {}",
        palette.bold(palette.paint(format!("{:<6}", result.engine_name), ansi::CYAN)),
        palette.paint(format!("×{:.3}", result.enhancement_factor), ansi::GREEN),
        palette.dim("│ confidence"),
        palette.paint(format!("{:.3}", result.confidence), ansi::YELLOW),
        patterns
    );
    for (category, score) in &result.per_category_scores {
        let failed = result.failed_categories.iter().any(|c| c == category);
        let line = format!("      {:<16} {} {:.3}", category, bar(*score), score);
        println!("{}", if failed { palette.paint(format!("{line}  (failed)"), ansi::RED) } else { palette.dim(line) });
    }
}

fn print_footer(report: &OrchestratorReport, palette: &ansi::Palette) {
    println!("\n{}", palette.paint("━━━ Total ━━━", ansi::GRAY));
    println!(
        "  Enhancement: {}  │  Insights: {}  │  Patterns: {}  │  Time: {}",
        palette.bold(palette.paint(format!("×{:.4}", report.total_enhancement_factor), ansi::GREEN)),
        palette.paint(report.total_insights.to_string(), ansi::BLUE),
        palette.paint(report.total_patterns.to_string(), ansi::BLUE),
        palette.dim(format!("{:?}", report.processing_time)),
    );
    println!();
}

fn bar(score: f64) -> String {
    let filled = ((score.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn preview(input: &str) -> String {
    let flat = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > PREVIEW_CHARS {
        format!("{}…", flat.chars().take(PREVIEW_CHARS).collect::<String>())
    } else {
        flat
    }
}
