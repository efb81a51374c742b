use crate::parcel::ParcelStatus;
use crate::ui::{theme, Icons};
use owo_colors::{OwoColorize, Style};

fn paint(text: &str, style: &Style) -> String {
    text.style(style.clone()).to_string()
}

pub fn header(text: &str) {
    println!("{} {}", Icons::PACKAGE, paint(text, &theme().header));
}

pub fn success(text: &str) {
    println!("{} {}", Icons::CHECK, paint(text, &theme().success));
}

/// Errors and warnings go to stderr so `--json` output stays parseable
pub fn error(text: &str) {
    eprintln!("{} {}", Icons::CROSS, paint(text, &theme().error));
}

pub fn warn(text: &str) {
    eprintln!("{} {}", Icons::WARN, paint(text, &theme().warn));
}

pub fn info(label: &str, value: &str) {
    println!("{} {}: {}", paint(Icons::INFO, &theme().info), paint(label, &theme().dim), value);
}

pub fn section(title: &str) {
    println!("\n━{}━", paint(title, &theme().header));
}

pub fn dim(text: &str) -> String {
    paint(text, &theme().dim)
}

/// Status text colored by lifecycle stage
pub fn status_label(status: ParcelStatus) -> String {
    paint(status.as_str(), &theme().status(status))
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", dim(label), value);
}
