//! Curriculum Generation — turns a profile and a job description into a
//! tailored `Curriculum` with one schema-constrained LLM call.
//!
//! Flow: textify entries → fill user-message template → generate JSON →
//!       validate against `CURRICULUM_SCHEMA` → deserialize (date ranges re-checked).

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::generation::prompts::{EDUCATIONS_TOKEN, EMPLOYMENTS_TOKEN, JOB_DESCRIPTION_TOKEN};
use crate::generation::text_converter::TextConverter;
use crate::llm_client::schema::Schema;
use crate::llm_client::{JsonGenerator, JsonRequest};
use crate::models::date::Month;
use crate::models::profile::{AboutMe, Curriculum};

const CURRICULUM_NAME: &str = "curriculum";

fn date_schema() -> Schema {
    Schema::object(
        [
            ("year", Schema::integer()),
            ("month", Schema::enumeration(Month::ALL.map(Month::name))),
        ],
        &["year"],
    )
}

fn achievements_schema() -> Schema {
    Schema::array(Schema::string())
}

/// Structural contract for generated curricula. Mirrors `models::profile`,
/// including which fields are required.
pub static CURRICULUM_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    let employment = Schema::object(
        [
            ("role", Schema::string()),
            ("company", Schema::string()),
            ("start_date", date_schema()),
            ("end_date", date_schema()),
            ("achievements", achievements_schema()),
        ],
        &["role", "company", "start_date", "achievements"],
    );

    let education = Schema::object(
        [
            ("degree", Schema::string()),
            ("institution", Schema::string()),
            ("grade", Schema::string()),
            ("start_date", date_schema()),
            ("end_date", date_schema()),
            ("achievements", achievements_schema()),
        ],
        &["degree", "institution", "start_date", "achievements"],
    );

    let skillset = Schema::object(
        [
            ("name", Schema::string()),
            ("skills", Schema::array(Schema::string())),
        ],
        &["name", "skills"],
    );

    Schema::object(
        [
            ("employments", Schema::array(employment)),
            ("educations", Schema::array(education)),
            ("skillsets", Schema::array(skillset)),
        ],
        &["employments", "educations", "skillsets"],
    )
    .described("The curriculum to generate")
});

#[async_trait]
pub trait CurriculumGenerator: Send + Sync {
    async fn generate_curriculum(
        &self,
        about_me: &AboutMe,
        job_description: &str,
    ) -> Result<Curriculum, AppError>;
}

/// A user-message template holding each placeholder token exactly once.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, AppError> {
        let template = template.into();

        let counts = [EMPLOYMENTS_TOKEN, EDUCATIONS_TOKEN, JOB_DESCRIPTION_TOKEN]
            .map(|token| (token, template.matches(token).count()));

        if counts.iter().any(|(_, count)| *count != 1) {
            let found = counts
                .iter()
                .map(|(token, count)| format!("{token} found {count} times"))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(AppError::Configuration(format!(
                "All tokens should appear exactly once in user message template, {found}"
            )));
        }

        Ok(Self { template })
    }

    /// Substitutes the three tokens in a single pass over the template, so
    /// token-like text inside the inserted content is left untouched.
    pub fn render(&self, employments: &str, educations: &str, job_description: &str) -> String {
        let mut slots: Vec<(usize, &str, &str)> = [
            (EMPLOYMENTS_TOKEN, employments),
            (EDUCATIONS_TOKEN, educations),
            (JOB_DESCRIPTION_TOKEN, job_description),
        ]
        .into_iter()
        .filter_map(|(token, value)| self.template.find(token).map(|at| (at, token, value)))
        .collect();
        slots.sort_by_key(|(at, _, _)| *at);

        let mut rendered = String::with_capacity(
            self.template.len() + employments.len() + educations.len() + job_description.len(),
        );
        let mut cursor = 0;
        for (at, token, value) in slots {
            rendered.push_str(&self.template[cursor..at]);
            rendered.push_str(value);
            cursor = at + token.len();
        }
        rendered.push_str(&self.template[cursor..]);
        rendered
    }
}

/// Renders the profile's employments and educations as two text blocks.
pub fn textify_profile(converter: &dyn TextConverter, about_me: &AboutMe) -> (String, String) {
    let employments = about_me
        .employments
        .iter()
        .map(|e| converter.textify_employment(e))
        .collect::<Vec<_>>()
        .join("\n");
    let educations = about_me
        .educations
        .iter()
        .map(|e| converter.textify_education(e))
        .collect::<Vec<_>>()
        .join("\n");
    (employments, educations)
}

pub struct LlmCurriculumGenerator {
    text_converter: Arc<dyn TextConverter>,
    json_generator: Arc<dyn JsonGenerator>,
    system_message: String,
    user_message_template: PromptTemplate,
}

impl LlmCurriculumGenerator {
    /// Fails fast on a malformed template, before any generation call.
    pub fn new(
        text_converter: Arc<dyn TextConverter>,
        json_generator: Arc<dyn JsonGenerator>,
        system_message: impl Into<String>,
        user_message_template: impl Into<String>,
    ) -> Result<Self, AppError> {
        let user_message_template = PromptTemplate::new(user_message_template)?;

        CURRICULUM_SCHEMA
            .check_consistency()
            .map_err(|e| AppError::Configuration(format!("curriculum schema {e}")))?;

        Ok(Self {
            text_converter,
            json_generator,
            system_message: system_message.into(),
            user_message_template,
        })
    }

    pub fn render_user_message(&self, about_me: &AboutMe, job_description: &str) -> String {
        let (employments, educations) = textify_profile(self.text_converter.as_ref(), about_me);
        self.user_message_template
            .render(&employments, &educations, job_description)
    }
}

#[async_trait]
impl CurriculumGenerator for LlmCurriculumGenerator {
    async fn generate_curriculum(
        &self,
        about_me: &AboutMe,
        job_description: &str,
    ) -> Result<Curriculum, AppError> {
        let user_message = self.render_user_message(about_me, job_description);
        debug!(
            "Curriculum prompt rendered: {} employments, {} educations, {} chars",
            about_me.employments.len(),
            about_me.educations.len(),
            user_message.len()
        );

        let curriculum_json = self
            .json_generator
            .generate(JsonRequest {
                system_message: &self.system_message,
                user_message: &user_message,
                name: CURRICULUM_NAME,
                schema: &CURRICULUM_SCHEMA,
            })
            .await?;

        CURRICULUM_SCHEMA.validate(&curriculum_json)?;
        let curriculum: Curriculum = serde_json::from_value(curriculum_json)
            .map_err(|e| AppError::Validation(format!("generated curriculum is invalid: {e}")))?;

        info!(
            "Generated curriculum: {} employments, {} educations, {} skillsets",
            curriculum.employments.len(),
            curriculum.educations.len(),
            curriculum.skillsets.len()
        );

        Ok(curriculum)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::generation::text_converter::SimpleTextConverter;
    use crate::llm_client::testing::ScriptedGenerator;
    use crate::models::profile::fixtures::{curriculum, date};
    use crate::models::profile::{Education, Employment, Private};

    const TEMPLATE: &str =
        "Experience:\n{{EMPLOYMENTS}}\n\nEducation:\n{{EDUCATIONS}}\n\nJob:\n{{JOB_DESCRIPTION}}";

    fn about_me() -> AboutMe {
        AboutMe {
            private: Private {
                name: "Ada".to_string(),
                address: None,
                phone: None,
                mail: "ada@example.com".to_string(),
                linkedin: None,
                github: None,
            },
            employments: vec![
                Employment::new("Engineer", "Acme", date("march 2020"), None, None).unwrap(),
                Employment::new("Intern", "Initech", date("2019"), Some(date("2019")), None)
                    .unwrap(),
            ],
            educations: vec![
                Education::new("BSc", "Uni", None, date("2015"), Some(date("2018")), None)
                    .unwrap(),
            ],
        }
    }

    fn generator(
        json_generator: Arc<ScriptedGenerator>,
        template: &str,
    ) -> Result<LlmCurriculumGenerator, AppError> {
        LlmCurriculumGenerator::new(
            Arc::new(SimpleTextConverter),
            json_generator,
            "You write resumes.",
            template,
        )
    }

    #[test]
    fn test_template_missing_job_description_token_fails_at_construction() {
        let scripted = Arc::new(ScriptedGenerator::default());
        let err = generator(scripted.clone(), "{{EMPLOYMENTS}} {{EDUCATIONS}}")
            .err()
            .unwrap();

        match err {
            AppError::Configuration(msg) => {
                assert!(msg.contains("{{JOB_DESCRIPTION}} found 0 times"));
                assert!(msg.contains("{{EMPLOYMENTS}} found 1 times"));
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
        assert!(scripted.requests().is_empty());
    }

    #[test]
    fn test_template_with_duplicate_token_fails() {
        let result =
            PromptTemplate::new("{{EMPLOYMENTS}}{{EMPLOYMENTS}}{{EDUCATIONS}}{{JOB_DESCRIPTION}}");
        assert!(
            matches!(result, Err(AppError::Configuration(ref m)) if m.contains("found 2 times"))
        );
    }

    #[test]
    fn test_render_substitutes_in_template_order() {
        let template =
            PromptTemplate::new("J={{JOB_DESCRIPTION}};E={{EMPLOYMENTS}};D={{EDUCATIONS}}")
                .unwrap();
        assert_eq!(template.render("emp", "edu", "job"), "J=job;E=emp;D=edu");
    }

    #[test]
    fn test_render_does_not_rescan_inserted_text() {
        let template = PromptTemplate::new(TEMPLATE).unwrap();
        let rendered = template.render("mentions {{EDUCATIONS}}", "edu", "job");
        assert!(rendered.contains("mentions {{EDUCATIONS}}"));
        assert!(rendered.contains("Education:\nedu"));
    }

    #[test]
    fn test_user_message_joins_entries_with_newline() {
        let generator = generator(Arc::new(ScriptedGenerator::default()), TEMPLATE).unwrap();
        let message = generator.render_user_message(&about_me(), "Rust engineer wanted");

        assert_eq!(
            message,
            "Experience:\n\
             Role: Engineer\nCompany: Acme\nPeriod: March 2020 to present\n\
             \n\
             Role: Intern\nCompany: Initech\nPeriod: 2019 to 2019\n\
             \n\nEducation:\n\
             Degree: BSc\nInstitution: Uni\nPeriod: 2015 to 2018\n\
             \n\nJob:\nRust engineer wanted"
        );
    }

    #[tokio::test]
    async fn test_generate_curriculum_submits_request_and_parses_result() {
        let expected = curriculum();
        let scripted = Arc::new(ScriptedGenerator::new([
            serde_json::to_value(&expected).unwrap()
        ]));
        let generator = generator(scripted.clone(), TEMPLATE).unwrap();

        let generated = generator
            .generate_curriculum(&about_me(), "Rust engineer wanted")
            .await
            .unwrap();

        assert_eq!(generated, expected);
        let requests = scripted.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].name, "curriculum");
        assert_eq!(requests[0].system_message, "You write resumes.");
        assert!(requests[0].user_message.ends_with("Job:\nRust engineer wanted"));
        assert_eq!(requests[0].schema, *CURRICULUM_SCHEMA);
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_a_validation_error() {
        let scripted = Arc::new(ScriptedGenerator::new([json!({
            "employments": [],
            "educations": []
        })]));
        let generator = generator(scripted, TEMPLATE).unwrap();

        let err = generator
            .generate_curriculum(&about_me(), "job")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("skillsets")));
    }

    #[tokio::test]
    async fn test_generated_invalid_date_range_is_a_validation_error() {
        let scripted = Arc::new(ScriptedGenerator::new([json!({
            "employments": [{
                "role": "Engineer",
                "company": "Acme",
                "start_date": {"year": 2020, "month": "march"},
                "end_date": {"year": 2019},
                "achievements": []
            }],
            "educations": [],
            "skillsets": []
        })]));
        let generator = generator(scripted, TEMPLATE).unwrap();

        let err = generator
            .generate_curriculum(&about_me(), "job")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("before start date")));
    }

    #[tokio::test]
    async fn test_null_optional_fields_are_accepted() {
        let scripted = Arc::new(ScriptedGenerator::new([json!({
            "employments": [{
                "role": "Engineer",
                "company": "Acme",
                "start_date": {"year": 2020, "month": "march"},
                "end_date": null,
                "achievements": ["Shipped the billing API"]
            }],
            "educations": [{
                "degree": "BSc",
                "institution": "Uni",
                "grade": null,
                "start_date": {"year": 2015},
                "end_date": {"year": 2018, "month": null},
                "achievements": []
            }],
            "skillsets": []
        })]));
        let generator = generator(scripted, TEMPLATE).unwrap();

        let generated = generator
            .generate_curriculum(&about_me(), "job")
            .await
            .unwrap();

        assert_eq!(generated.employments[0].end_date(), None);
        assert_eq!(generated.educations[0].grade(), None);
        assert_eq!(generated.educations[0].end_date(), Some(&date("2018")));
    }

    #[tokio::test]
    async fn test_provider_error_passes_through() {
        let generator = generator(Arc::new(ScriptedGenerator::default()), TEMPLATE).unwrap();
        let err = generator
            .generate_curriculum(&about_me(), "job")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[test]
    fn test_schema_requires_mirror_the_model() {
        let rendered = CURRICULUM_SCHEMA.to_json();
        let employment = &rendered["properties"]["employments"]["items"];
        let education = &rendered["properties"]["educations"]["items"];

        assert_eq!(
            rendered["required"],
            json!(["employments", "educations", "skillsets"])
        );
        assert_eq!(
            employment["required"],
            json!(["role", "company", "start_date", "achievements"])
        );
        assert_eq!(
            education["required"],
            json!(["degree", "institution", "start_date", "achievements"])
        );
        assert_eq!(employment["properties"]["end_date"]["required"], json!(["year"]));
        assert_eq!(
            employment["properties"]["start_date"]["properties"]["month"]["enum"][11],
            "december"
        );
    }

    #[test]
    fn test_shipped_user_template_is_valid() {
        let shipped = include_str!("../../../../prompts/curriculum_user.txt");
        assert!(PromptTemplate::new(shipped).is_ok());
    }

    #[test]
    fn test_serialized_curriculum_conforms_to_schema() {
        let value = serde_json::to_value(curriculum()).unwrap();
        assert!(CURRICULUM_SCHEMA.validate(&value).is_ok());
        assert!(CURRICULUM_SCHEMA.check_consistency().is_ok());
    }
}
