//! Text Projection — renders profile entries into prompt-ready text blocks.
//!
//! Output is whitespace-sensitive: prompts are built from it verbatim, so any
//! change here changes what the model sees.

use crate::models::date::Date;
use crate::models::profile::{Education, Employment};

pub trait TextConverter: Send + Sync {
    fn textify_employment(&self, employment: &Employment) -> String;
    fn textify_education(&self, education: &Education) -> String;
}

/// Line-per-field rendering with a bulleted achievements block.
pub struct SimpleTextConverter;

impl TextConverter for SimpleTextConverter {
    fn textify_employment(&self, employment: &Employment) -> String {
        let mut text = String::new();
        text.push_str(&format!("Role: {}\n", employment.role()));
        text.push_str(&format!("Company: {}\n", employment.company()));
        text.push_str(&textify_period(employment.start_date(), employment.end_date()));
        text.push('\n');
        if let Some(achievements) = employment.achievements() {
            text.push_str(&textify_achievements(achievements));
        }
        text
    }

    fn textify_education(&self, education: &Education) -> String {
        let mut text = String::new();
        text.push_str(&format!("Degree: {}\n", education.degree()));
        text.push_str(&format!("Institution: {}\n", education.institution()));
        if let Some(grade) = education.grade() {
            text.push_str(&format!("Grade: {grade}\n"));
        }
        text.push_str(&textify_period(education.start_date(), education.end_date()));
        text.push('\n');
        if let Some(achievements) = education.achievements() {
            text.push_str(&textify_achievements(achievements));
        }
        text
    }
}

fn textify_period(start: &Date, end: Option<&Date>) -> String {
    match end {
        Some(end) => format!("Period: {start} to {end}"),
        None => format!("Period: {start} to present"),
    }
}

// No trailing newline after the last bullet.
fn textify_achievements(achievements: &[String]) -> String {
    let bullets: Vec<String> = achievements.iter().map(|a| format!("- {a}")).collect();
    format!("List of achievements:\n{}", bullets.join("\n"))
}
