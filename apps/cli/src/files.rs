//! Filesystem collaborators: profile/job description/template loading and
//! curriculum output.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::AppError;
use crate::models::profile::{AboutMe, AboutMeFields, Curriculum};

pub fn read_text(path: &Path) -> Result<String, AppError> {
    std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))
}

/// Loads and validates a YAML profile. Malformed YAML is a `Yaml` error, an
/// unparseable date a `Parse` error and an inverted range a `Validation` error.
pub fn load_about_me(path: &Path) -> Result<AboutMe, AppError> {
    let fields: AboutMeFields = serde_yaml::from_str(&read_text(path)?)?;
    let about_me = AboutMe::try_from(fields)?;
    info!(
        "Loaded profile `{}`: {} employments, {} educations",
        path.display(),
        about_me.employments.len(),
        about_me.educations.len()
    );
    Ok(about_me)
}

/// Loads a YAML list of achievement strings.
pub fn load_achievements(path: &Path) -> Result<Vec<String>, AppError> {
    Ok(serde_yaml::from_str(&read_text(path)?)?)
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `<output_dir>/{model}_{about-me stem}_{job-description stem}.json`
pub fn curriculum_output_path(
    output_dir: &Path,
    model: &str,
    about_me_path: &Path,
    job_description_path: &Path,
) -> PathBuf {
    output_dir.join(format!(
        "{model}_{}_{}.json",
        stem(about_me_path),
        stem(job_description_path)
    ))
}

/// Writes the curriculum as indented JSON. The target appears only once fully written.
pub fn write_curriculum(path: &Path, curriculum: &Curriculum) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(curriculum)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize curriculum: {e}")))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| AppError::io(dir, e))?;
    file.write_all(json.as_bytes())
        .and_then(|_| file.write_all(b"\n"))
        .map_err(|e| AppError::io(path, e))?;
    file.persist(path).map_err(|e| AppError::io(path, e.error))?;

    info!("Curriculum written to `{}`", path.display());
    Ok(())
}
