//! Styled terminal output helpers.

use std::sync::OnceLock;

use owo_colors::{OwoColorize, Style};

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
struct Theme {
    banner: Style,
    header: Style,
    notice: Style,
    success: Style,
    error: Style,
    total: Style,
}

impl Theme {
    fn detect() -> Self {
        if !console::Term::stdout().is_term() {
            return Self::plain();
        }
        Self::colored()
    }

    fn colored() -> Self {
        Self {
            banner: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            notice: Style::new().yellow(),
            success: Style::new().green(),
            error: Style::new().red().bold(),
            total: Style::new().red().bold(),
        }
    }

    fn plain() -> Self {
        Self {
            banner: Style::new(),
            header: Style::new(),
            notice: Style::new(),
            success: Style::new(),
            error: Style::new(),
            total: Style::new(),
        }
    }
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

const SPLASH_TEXT: &str = r#"
██████╗ ██╗   ██╗██████╗  ██████╗ ██████╗  ██████╗
██╔════╝ ██║   ██║██╔══██╗██╔═══██╗██╔══██╗██╔════╝
██║      ██║   ██║██████╔╝██║   ██║██████╔╝██║  ███╗
██║      ██║   ██║██╔══██╗██║   ██║██╔══██╗██║   ██║
╚██████╗ ╚██████╔╝██████╔╝╚██████╔╝██║  ██║╚██████╔╝
 ╚═════╝  ╚═════╝ ╚═════╝  ╚═════╝ ╚═╝  ╚═╝ ╚═════╝
Cybernetic Yield & Budgetary Oversight Record Gadget
"#;

/// Print the ASCII art splash screen.
pub fn splash() {
    println!("{}", SPLASH_TEXT.style(theme().banner));
}

/// Print a table or section title.
pub fn header(text: &str) {
    println!("{}", text.style(theme().header));
}

/// Print an informational notice, e.g. an empty result set.
pub fn notice(text: &str) {
    println!("\n>> {}", text.style(theme().notice));
}

/// Print a confirmation for a completed operation.
pub fn success(text: &str) {
    println!("\n>> {}", text.style(theme().success));
}

/// Print an error message to stderr.
pub fn error(text: &str) {
    eprintln!("error: {}", text.style(theme().error));
}

/// Print the grand total line of a monthly report.
pub fn total_line(grand_total: f64) {
    println!(
        "{}",
        format!(
            "Total Monthly Expenditure: {}",
            super::format_amount(grand_total)
        )
        .style(theme().total)
    );
}
