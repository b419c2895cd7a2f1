use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::date::{is_before, Date, DateOrder, DateParseError, DateRepr};

/// An entry whose end date strictly precedes its start date.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{entry}: end date {end} is before start date {start}")]
pub struct DateRangeError {
    pub entry: String,
    pub start: Date,
    pub end: Date,
}

/// Why a profile entry could not be built from its raw fields.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error(transparent)]
    Date(#[from] DateParseError),

    #[error(transparent)]
    Range(#[from] DateRangeError),
}

fn convert_dates(
    start: DateRepr,
    end: Option<DateRepr>,
) -> Result<(Date, Option<Date>), DateParseError> {
    Ok((Date::try_from(start)?, end.map(Date::try_from).transpose()?))
}

/// Only a decisive `Before` rejects; indeterminate ranges are accepted.
fn check_range(
    entry: impl FnOnce() -> String,
    start: &Date,
    end: Option<&Date>,
) -> Result<(), DateRangeError> {
    match end {
        Some(end) if is_before(end, start) == DateOrder::Before => Err(DateRangeError {
            entry: entry(),
            start: *start,
            end: *end,
        }),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Private {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub mail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EmploymentFields")]
pub struct Employment {
    role: String,
    company: String,
    start_date: Date,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    achievements: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct EmploymentFields {
    role: String,
    company: String,
    start_date: DateRepr,
    #[serde(default)]
    end_date: Option<DateRepr>,
    #[serde(default)]
    achievements: Option<Vec<String>>,
}

impl Employment {
    pub fn new(
        role: impl Into<String>,
        company: impl Into<String>,
        start_date: Date,
        end_date: Option<Date>,
        achievements: Option<Vec<String>>,
    ) -> Result<Self, DateRangeError> {
        let role = role.into();
        let company = company.into();
        check_range(
            || format!("Employment `{role}` at `{company}`"),
            &start_date,
            end_date.as_ref(),
        )?;

        Ok(Self {
            role,
            company,
            start_date,
            end_date,
            achievements,
        })
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn start_date(&self) -> &Date {
        &self.start_date
    }

    pub fn end_date(&self) -> Option<&Date> {
        self.end_date.as_ref()
    }

    pub fn achievements(&self) -> Option<&[String]> {
        self.achievements.as_deref()
    }
}

impl TryFrom<EmploymentFields> for Employment {
    type Error = EntryError;

    fn try_from(f: EmploymentFields) -> Result<Self, Self::Error> {
        let (start_date, end_date) = convert_dates(f.start_date, f.end_date)?;
        Ok(Employment::new(
            f.role,
            f.company,
            start_date,
            end_date,
            f.achievements,
        )?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EducationFields")]
pub struct Education {
    degree: String,
    institution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    grade: Option<String>,
    start_date: Date,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    achievements: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct EducationFields {
    degree: String,
    institution: String,
    #[serde(default)]
    grade: Option<String>,
    start_date: DateRepr,
    #[serde(default)]
    end_date: Option<DateRepr>,
    #[serde(default)]
    achievements: Option<Vec<String>>,
}

impl Education {
    pub fn new(
        degree: impl Into<String>,
        institution: impl Into<String>,
        grade: Option<String>,
        start_date: Date,
        end_date: Option<Date>,
        achievements: Option<Vec<String>>,
    ) -> Result<Self, DateRangeError> {
        let degree = degree.into();
        let institution = institution.into();
        check_range(
            || format!("Education `{degree}` at `{institution}`"),
            &start_date,
            end_date.as_ref(),
        )?;

        Ok(Self {
            degree,
            institution,
            grade,
            start_date,
            end_date,
            achievements,
        })
    }

    pub fn degree(&self) -> &str {
        &self.degree
    }

    pub fn institution(&self) -> &str {
        &self.institution
    }

    pub fn grade(&self) -> Option<&str> {
        self.grade.as_deref()
    }

    pub fn start_date(&self) -> &Date {
        &self.start_date
    }

    pub fn end_date(&self) -> Option<&Date> {
        self.end_date.as_ref()
    }

    pub fn achievements(&self) -> Option<&[String]> {
        self.achievements.as_deref()
    }
}

impl TryFrom<EducationFields> for Education {
    type Error = EntryError;

    fn try_from(f: EducationFields) -> Result<Self, Self::Error> {
        let (start_date, end_date) = convert_dates(f.start_date, f.end_date)?;
        Ok(Education::new(
            f.degree,
            f.institution,
            f.grade,
            start_date,
            end_date,
            f.achievements,
        )?)
    }
}

/// The user's profile, loaded once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AboutMe {
    pub private: Private,
    pub employments: Vec<Employment>,
    pub educations: Vec<Education>,
}

/// A profile as written, with dates not yet parsed or range-checked.
#[derive(Debug, Deserialize)]
pub struct AboutMeFields {
    private: Private,
    employments: Vec<EmploymentFields>,
    educations: Vec<EducationFields>,
}

impl TryFrom<AboutMeFields> for AboutMe {
    type Error = EntryError;

    fn try_from(f: AboutMeFields) -> Result<Self, Self::Error> {
        Ok(AboutMe {
            private: f.private,
            employments: f
                .employments
                .into_iter()
                .map(Employment::try_from)
                .collect::<Result<_, _>>()?,
            educations: f
                .educations
                .into_iter()
                .map(Education::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skillset {
    pub name: String,
    pub skills: Vec<String>,
}

/// The generated, job-tailored curriculum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curriculum {
    pub employments: Vec<Employment>,
    pub educations: Vec<Education>,
    pub skillsets: Vec<Skillset>,
}
