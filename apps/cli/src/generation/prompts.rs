// Prompt constants for the Generation module.
// Curriculum prompts live in template files (see `prompts/` at the repo root);
// only the placeholder tokens they must contain are defined here.

pub const EMPLOYMENTS_TOKEN: &str = "{{EMPLOYMENTS}}";
pub const EDUCATIONS_TOKEN: &str = "{{EDUCATIONS}}";
pub const JOB_DESCRIPTION_TOKEN: &str = "{{JOB_DESCRIPTION}}";

/// System prompt shared by every achievement-tuning stage.
pub const ACHIEVEMENTS_SYSTEM: &str = "You are an expert career coach and resume writer. \
    You answer by calling the provided function with arguments that match its schema exactly. \
    Do NOT invent facts that are not present in the input.";

/// Stage 1. Followed by a newline and the raw job description.
pub const JOB_SKILLS_MSG_PREFIX: &str = "List the skills, technologies and competences \
    that the following job description asks for, most important first. \
    Use short noun phrases (e.g. \"Rust\", \"distributed systems\", \"stakeholder management\").";

/// Stage 2. Followed by a newline and a JSON object mapping ids to achievements.
pub const ACHIEVEMENTS_SKILLS_MSG_PREFIX: &str = "For each achievement below, \
    identified by its id, list the skills it demonstrates. Return an object with exactly \
    the same ids as keys and, as values, arrays of short skill names.";

/// Stage 3. Followed by a newline and a JSON object mapping ids to skills.
pub const ACHIEVEMENTS_SORT_MSG_PREFIX: &str = "Each id below identifies an achievement \
    together with the skills it demonstrates. Sort ALL the ids from the most to the least \
    relevant for a technical job application and return them as an array of id strings. \
    Use only ids that appear below.";

/// Stage 4. Followed by a newline and a JSON array of achievements.
pub const ACHIEVEMENTS_REWORD_MSG_PREFIX: &str = "Reword each achievement below so it is concise, \
    starts with a strong action verb and keeps every number and fact unchanged. \
    Return an array with one reworded achievement per input, in the same order.";
