//! Achievement Tuning — selects and rewords achievement bullets for a job.
//!
//! Four sequential LLM calls, each feeding the next:
//! 1. job skills     — skills asked for by the job description
//! 2. skills per id  — achievements get ids "1".."n" (input order), mapped to skills
//! 3. ranking        — ids sorted by relevance
//! 4. rewording      — top `max_achievements` ids resolved to text and polished

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::generation::prompts::{
    ACHIEVEMENTS_REWORD_MSG_PREFIX, ACHIEVEMENTS_SKILLS_MSG_PREFIX, ACHIEVEMENTS_SORT_MSG_PREFIX,
    ACHIEVEMENTS_SYSTEM, JOB_SKILLS_MSG_PREFIX,
};
use crate::llm_client::schema::Schema;
use crate::llm_client::{JsonGenerator, JsonRequest};

#[async_trait]
pub trait AchievementsTuner: Send + Sync {
    async fn tune_achievements(
        &self,
        achievements: &[String],
        job_description: &str,
        max_achievements: Option<usize>,
    ) -> Result<Vec<String>, AppError>;
}

/// Message prefixes for the four stages. Each user message is `"<prefix>\n<payload>"`.
#[derive(Debug, Clone)]
pub struct TunerPrompts {
    pub job_skills: String,
    pub achievements_skills: String,
    pub achievements_sort: String,
    pub achievements_reword: String,
}

impl Default for TunerPrompts {
    fn default() -> Self {
        Self {
            job_skills: JOB_SKILLS_MSG_PREFIX.to_string(),
            achievements_skills: ACHIEVEMENTS_SKILLS_MSG_PREFIX.to_string(),
            achievements_sort: ACHIEVEMENTS_SORT_MSG_PREFIX.to_string(),
            achievements_reword: ACHIEVEMENTS_REWORD_MSG_PREFIX.to_string(),
        }
    }
}

/// JSON object whose keys keep the slice order (serde_json maps sort them).
struct OrderedMap<'a, V>(&'a [(String, V)]);

impl<V: Serialize> Serialize for OrderedMap<'_, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize prompt payload: {e}")))
}

fn string_list_schema() -> Schema {
    Schema::array(Schema::string())
}

pub struct LlmAchievementsTuner {
    json_generator: Arc<dyn JsonGenerator>,
    prompts: TunerPrompts,
}

impl LlmAchievementsTuner {
    pub fn new(json_generator: Arc<dyn JsonGenerator>, prompts: TunerPrompts) -> Self {
        Self {
            json_generator,
            prompts,
        }
    }

    async fn ask<T: DeserializeOwned>(
        &self,
        prefix: &str,
        payload: &str,
        name: &str,
        schema: &Schema,
    ) -> Result<T, AppError> {
        let user_message = format!("{prefix}\n{payload}");
        let generated = self
            .json_generator
            .generate(JsonRequest {
                system_message: ACHIEVEMENTS_SYSTEM,
                user_message: &user_message,
                name,
                schema,
            })
            .await?;

        schema.validate(&generated)?;
        serde_json::from_value(generated)
            .map_err(|e| AppError::Validation(format!("generated `{name}` is invalid: {e}")))
    }
}

#[async_trait]
impl AchievementsTuner for LlmAchievementsTuner {
    async fn tune_achievements(
        &self,
        achievements: &[String],
        job_description: &str,
        max_achievements: Option<usize>,
    ) -> Result<Vec<String>, AppError> {
        // Stage 1
        let job_skills: Vec<String> = self
            .ask(
                &self.prompts.job_skills,
                job_description,
                "job_skills",
                &string_list_schema(),
            )
            .await?;
        // TODO: pass job_skills to the ranking stage once its prompt takes them as input.
        debug!("Job description asks for {} skills: {:?}", job_skills.len(), job_skills);

        // Stage 2
        let id_to_achievement: Vec<(String, String)> = achievements
            .iter()
            .enumerate()
            .map(|(i, a)| ((i + 1).to_string(), a.clone()))
            .collect();

        let skills_schema = Schema::object(
            id_to_achievement
                .iter()
                .map(|(id, _)| (id.clone(), string_list_schema())),
            &id_to_achievement
                .iter()
                .map(|(id, _)| id.as_str())
                .collect::<Vec<_>>(),
        );
        let mut generated_skills: BTreeMap<String, Vec<String>> = self
            .ask(
                &self.prompts.achievements_skills,
                &to_pretty_json(&OrderedMap(&id_to_achievement))?,
                "achievements_skills",
                &skills_schema,
            )
            .await?;

        let id_to_skills: Vec<(String, Vec<String>)> = id_to_achievement
            .iter()
            .filter_map(|(id, _)| generated_skills.remove_entry(id))
            .collect();
        if !generated_skills.is_empty() {
            warn!(
                "Ignoring skills for unknown achievement ids: {:?}",
                generated_skills.keys().collect::<Vec<_>>()
            );
        }

        // Stage 3
        let sorted_ids: Vec<String> = self
            .ask(
                &self.prompts.achievements_sort,
                &to_pretty_json(&OrderedMap(&id_to_skills))?,
                "achievements_ranking",
                &string_list_schema(),
            )
            .await?;
        debug!("Achievements ranked: {:?}", sorted_ids);

        // Stage 4
        let selected_ids = match max_achievements {
            Some(max) => &sorted_ids[..max.min(sorted_ids.len())],
            None => &sorted_ids[..],
        };
        let selected_achievements = selected_ids
            .iter()
            .map(|id| {
                id_to_achievement
                    .iter()
                    .find(|(known, _)| known == id)
                    .map(|(_, achievement)| achievement.as_str())
                    .ok_or_else(|| {
                        AppError::Lookup(format!(
                            "ranking references unknown achievement id `{id}`"
                        ))
                    })
            })
            .collect::<Result<Vec<&str>, AppError>>()?;

        let tuned: Vec<String> = self
            .ask(
                &self.prompts.achievements_reword,
                &to_pretty_json(&selected_achievements)?,
                "reworded_achievements",
                &string_list_schema(),
            )
            .await?;

        info!(
            "Tuned {} of {} achievements",
            tuned.len(),
            achievements.len()
        );
        Ok(tuned)
    }
}
