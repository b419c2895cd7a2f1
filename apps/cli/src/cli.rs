//! Clap CLI definitions for the `apply-gpt` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_SYSTEM_MESSAGE_PATH: &str = "prompts/curriculum_system.txt";
pub const DEFAULT_USER_MESSAGE_TEMPLATE_PATH: &str = "prompts/curriculum_user.txt";

/// apply-gpt -- tailor your curriculum to a job description.
#[derive(Parser, Debug)]
#[command(name = "apply-gpt", version, propagate_version = true)]
pub struct Cli {
    /// Enable debug output (overridden by RUST_LOG).
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a tailored curriculum and write it as JSON.
    Generate(GenerateArgs),

    /// Print the user message that `generate` would send, without calling the model.
    Render(RenderArgs),

    /// Select and reword the achievements most relevant to a job description.
    Tune(TuneArgs),

    /// Load, validate and print a profile.
    Show(ShowArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// YAML file with information about the user.
    #[arg(short = 'a', long)]
    pub about_me: PathBuf,

    /// Plain-text job description.
    #[arg(short = 'j', long)]
    pub job_description: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Model identifier passed to the chat-completions API.
    #[arg(short = 'm', long, env = "APPLY_GPT_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    /// System message text file.
    #[arg(long, default_value = DEFAULT_SYSTEM_MESSAGE_PATH)]
    pub system_message: PathBuf,

    /// User message template containing {{EMPLOYMENTS}}, {{EDUCATIONS}} and {{JOB_DESCRIPTION}}.
    #[arg(long, default_value = DEFAULT_USER_MESSAGE_TEMPLATE_PATH)]
    pub user_message_template: PathBuf,

    /// Directory receiving `{model}_{about-me}_{job-description}.json`.
    #[arg(short = 'o', long, default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long, default_value = DEFAULT_USER_MESSAGE_TEMPLATE_PATH)]
    pub user_message_template: PathBuf,
}

#[derive(Args, Debug)]
pub struct TuneArgs {
    /// YAML list of achievement strings.
    #[arg(long)]
    pub achievements: PathBuf,

    /// Plain-text job description.
    #[arg(short = 'j', long)]
    pub job_description: PathBuf,

    /// Keep at most this many achievements.
    #[arg(long)]
    pub max: Option<usize>,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[arg(short = 'a', long)]
    pub about_me: PathBuf,
}
