mod cli;
mod config;
mod errors;
mod files;
mod generation;
mod llm_client;
mod models;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Commands, GenerateArgs, RenderArgs, ShowArgs, TuneArgs};
use crate::config::Config;
use crate::errors::AppError;
use crate::generation::achievements::{AchievementsTuner, LlmAchievementsTuner, TunerPrompts};
use crate::generation::curriculum::{
    textify_profile, CurriculumGenerator, LlmCurriculumGenerator, PromptTemplate,
};
use crate::generation::text_converter::SimpleTextConverter;
use crate::llm_client::OpenAiClient;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    // Initialize structured logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), default_level))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Generate(args) => generate(args).await?,
        Commands::Render(args) => render(args)?,
        Commands::Tune(args) => tune(args).await?,
        Commands::Show(args) => show(args)?,
    }

    Ok(())
}

fn build_client(model: &str) -> Result<OpenAiClient> {
    let config = Config::from_env()?;
    let client = OpenAiClient::new(
        config.openai_api_key,
        config.openai_base_url,
        model.to_string(),
        config.request_timeout,
    )?;
    info!("LLM client initialized (model: {})", client.model());
    Ok(client)
}

async fn generate(args: GenerateArgs) -> Result<()> {
    // Template problems surface before the profile is read or the model is called.
    let system_message = files::read_text(&args.system_message)?;
    let user_message_template = files::read_text(&args.user_message_template)?;
    let client = build_client(&args.model.model)?;

    let generator = LlmCurriculumGenerator::new(
        Arc::new(SimpleTextConverter),
        Arc::new(client),
        system_message,
        user_message_template,
    )?;

    let about_me = files::load_about_me(&args.input.about_me)?;
    let job_description = files::read_text(&args.input.job_description)?;

    let curriculum = generator
        .generate_curriculum(&about_me, &job_description)
        .await?;

    let output_path = files::curriculum_output_path(
        &args.output_dir,
        &args.model.model,
        &args.input.about_me,
        &args.input.job_description,
    );
    files::write_curriculum(&output_path, &curriculum)?;
    println!("{}", output_path.display());

    Ok(())
}

fn render(args: RenderArgs) -> Result<(), AppError> {
    let template = PromptTemplate::new(files::read_text(&args.user_message_template)?)?;
    let about_me = files::load_about_me(&args.input.about_me)?;
    let job_description = files::read_text(&args.input.job_description)?;

    let (employments, educations) = textify_profile(&SimpleTextConverter, &about_me);
    println!("{}", template.render(&employments, &educations, &job_description));
    Ok(())
}

async fn tune(args: TuneArgs) -> Result<()> {
    let achievements = files::load_achievements(&args.achievements)?;
    let job_description = files::read_text(&args.job_description)?;
    let client = build_client(&args.model.model)?;

    let tuner = LlmAchievementsTuner::new(Arc::new(client), TunerPrompts::default());
    let tuned = tuner
        .tune_achievements(&achievements, &job_description, args.max)
        .await?;

    println!("{}", serde_json::to_string_pretty(&tuned)?);
    Ok(())
}

fn show(args: ShowArgs) -> Result<(), AppError> {
    let about_me = files::load_about_me(&args.about_me)?;
    print!("{}", serde_yaml::to_string(&about_me)?);
    Ok(())
}
