use std::fmt::Display;

use console::{style, StyledObject};

// Terminal tones shared by the banner, the summary and CLI status lines.

pub fn brand(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}

pub fn heading(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().underlined()
}

pub fn label(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn value(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).cyan()
}

pub fn count(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

pub fn success(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().green()
}

pub fn failure(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().red()
}

/// A success fraction as a percentage, green above 80%, red below 50%.
pub fn success_rate(rate: f64) -> StyledObject<String> {
    let text = format!("{:.1}%", rate * 100.0);
    if rate > 0.8 {
        success(text)
    } else if rate >= 0.5 {
        count(text)
    } else {
        failure(text)
    }
}
