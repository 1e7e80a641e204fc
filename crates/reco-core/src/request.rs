//! Generation requests and their loading from YAML/JSON.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::style::StyleProfile;
use crate::tone::Tone;
use crate::CoreError;

/// Recommendation strength, 1 (weakest) to 5 (strongest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Intensity(u8);

impl Intensity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Validate an intensity value.
    pub fn new(value: u8) -> Result<Self, CoreError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CoreError::InvalidRequest(format!(
                "intensity must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Intensity {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl TryFrom<u8> for Intensity {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Intensity> for u8 {
    fn from(value: Intensity) -> Self {
        value.0
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A past or current position held by the requester.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Experience {
    pub company: String,
    pub position: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
}

/// An award received by the requester.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Award {
    pub title: String,
    pub organization: Option<String>,
    pub award_date: Option<String>,
    pub description: Option<String>,
}

/// A certification held by the requester.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Certification {
    pub name: String,
    pub issuer: Option<String>,
    pub issue_date: Option<String>,
}

/// A self-described strength.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Strength {
    pub category: Option<String>,
    pub strength: String,
    pub description: Option<String>,
}

/// A project the requester took part in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Project {
    pub title: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub role: Option<String>,
    pub technologies: Option<String>,
    pub achievement: Option<String>,
}

// Single-line renders used inside generation prompts. Empty fields are skipped.

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn write_period(
    f: &mut fmt::Formatter<'_>,
    start: &Option<String>,
    end: &Option<String>,
) -> fmt::Result {
    match (non_empty(start), non_empty(end)) {
        (None, None) => Ok(()),
        (start, end) => write!(f, " ({} ~ {})", start.unwrap_or(""), end.unwrap_or("")),
    }
}

fn write_labeled(f: &mut fmt::Formatter<'_>, label: &str, value: &Option<String>) -> fmt::Result {
    match non_empty(value) {
        Some(v) => write!(f, ", {label}: {v}"),
        None => Ok(()),
    }
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head: Vec<&str> = [self.company.trim(), self.position.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        f.write_str(&head.join(", "))?;
        write_period(f, &self.start_date, &self.end_date)?;
        write_labeled(f, "업무", &self.description)
    }
}

impl fmt::Display for Award {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title.trim())?;
        let meta: Vec<&str> = [non_empty(&self.organization), non_empty(&self.award_date)]
            .into_iter()
            .flatten()
            .collect();
        if !meta.is_empty() {
            write!(f, " ({})", meta.join(", "))?;
        }
        match non_empty(&self.description) {
            Some(d) => write!(f, ": {d}"),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Certification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.trim())?;
        let meta: Vec<&str> = [non_empty(&self.issuer), non_empty(&self.issue_date)]
            .into_iter()
            .flatten()
            .collect();
        if !meta.is_empty() {
            write!(f, " ({})", meta.join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(category) = non_empty(&self.category) {
            write!(f, "[{category}] ")?;
        }
        f.write_str(self.strength.trim())?;
        match non_empty(&self.description) {
            Some(d) => write!(f, ": {d}"),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title.trim())?;
        write_period(f, &self.start_date, &self.end_date)?;
        write_labeled(f, "역할", &self.role)?;
        write_labeled(f, "기술", &self.technologies)?;
        write_labeled(f, "성과", &self.achievement)
    }
}

/// Optional profile records about the requester, in display order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetailSections {
    pub experiences: Vec<Experience>,
    pub awards: Vec<Award>,
    pub certifications: Vec<Certification>,
    pub strengths: Vec<Strength>,
    pub projects: Vec<Project>,
}

impl DetailSections {
    pub fn is_empty(&self) -> bool {
        self.experiences.is_empty()
            && self.awards.is_empty()
            && self.certifications.is_empty()
            && self.strengths.is_empty()
            && self.projects.is_empty()
    }
}

/// Everything needed to compose one recommendation letter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    /// Letter author
    pub recommender_name: String,

    #[serde(default)]
    pub recommender_email: Option<String>,

    /// Person being recommended
    pub requester_name: String,

    pub requester_email: String,

    /// Requester's major or professional field
    #[serde(default)]
    pub major_field: Option<String>,

    /// How the recommender knows the requester
    #[serde(default)]
    pub relationship: Option<String>,

    #[serde(default)]
    pub strengths: Option<String>,

    /// Memorable episode worth mentioning
    #[serde(default)]
    pub memorable: Option<String>,

    #[serde(default)]
    pub additional_info: Option<String>,

    #[serde(default)]
    pub tone: Tone,

    #[serde(default)]
    pub intensity: Intensity,

    /// Target body length in characters
    #[serde(default)]
    pub target_length: Option<u32>,

    /// Example letter used as a style reference only
    #[serde(default)]
    pub reference_template: Option<String>,

    #[serde(default)]
    pub style_profile: Option<StyleProfile>,

    #[serde(default)]
    pub details: Option<DetailSections>,
}

impl GenerationRequest {
    /// Minimal request with the required identities; everything else defaulted.
    pub fn new(
        recommender_name: impl Into<String>,
        requester_name: impl Into<String>,
        requester_email: impl Into<String>,
    ) -> Self {
        Self {
            recommender_name: recommender_name.into(),
            recommender_email: None,
            requester_name: requester_name.into(),
            requester_email: requester_email.into(),
            major_field: None,
            relationship: None,
            strengths: None,
            memorable: None,
            additional_info: None,
            tone: Tone::default(),
            intensity: Intensity::default(),
            target_length: None,
            reference_template: None,
            style_profile: None,
            details: None,
        }
    }

    /// Parse a request from YAML (JSON is accepted as a YAML subset).
    pub fn from_yaml(yaml: &str) -> Result<Self, CoreError> {
        let request: Self = serde_yaml::from_str(yaml)
            .map_err(|e| CoreError::InvalidRequest(format!("failed to parse request: {e}")))?;
        request.validate()?;
        Ok(request)
    }

    /// Parse a request from JSON.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let request: Self = serde_json::from_str(json)
            .map_err(|e| CoreError::InvalidRequest(format!("failed to parse request: {e}")))?;
        request.validate()?;
        Ok(request)
    }

    /// Load a request from a `.json`, `.yaml` or `.yml` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::InvalidRequest(format!("failed to read {}: {e}", path.display()))
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Check the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), CoreError> {
        let required = [
            ("recommender_name", &self.recommender_name),
            ("requester_name", &self.requester_name),
            ("requester_email", &self.requester_email),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CoreError::InvalidRequest(format!("{field} must not be empty")));
            }
        }

        if self.target_length == Some(0) {
            return Err(CoreError::InvalidRequest(
                "target_length must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_bounds() {
        assert!(Intensity::new(0).is_err());
        assert!(Intensity::new(6).is_err());
        for v in 1..=5 {
            assert_eq!(Intensity::new(v).unwrap().value(), v);
        }
    }

    #[test]
    fn test_parse_minimal_yaml() {
        let yaml = r#"
recommender_name: "박지훈"
requester_name: "김나비"
requester_email: "nabi@example.com"
"#;
        let request = GenerationRequest::from_yaml(yaml).unwrap();
        assert_eq!(request.tone, Tone::Formal);
        assert_eq!(request.intensity.value(), 5);
        assert!(request.details.is_none());
    }

    #[test]
    fn test_parse_full_json() {
        let json = r#"{
            "recommender_name": "박지훈",
            "recommender_email": "jihoon@example.com",
            "requester_name": "김나비",
            "requester_email": "nabi@example.com",
            "major_field": "컴퓨터공학",
            "relationship": "팀장",
            "tone": "Persuasive",
            "intensity": 4,
            "target_length": 1500,
            "details": {
                "experiences": [{"company": "Acme", "position": "Backend Engineer"}],
                "projects": [{"title": "결제 시스템 개편", "achievement": "장애율 40% 감소"}]
            }
        }"#;
        let request = GenerationRequest::from_json(json).unwrap();
        assert_eq!(request.tone, Tone::Persuasive);
        assert_eq!(request.intensity.value(), 4);
        let details = request.details.unwrap();
        assert_eq!(details.experiences[0].company, "Acme");
        assert!(details.awards.is_empty());
    }

    #[test]
    fn test_out_of_range_intensity_rejected_at_boundary() {
        let yaml = r#"
recommender_name: "A"
requester_name: "B"
requester_email: "b@example.com"
intensity: 9
"#;
        let err = GenerationRequest::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRequest(_)));
    }

    #[test]
    fn test_unknown_tone_rejected_at_boundary() {
        let yaml = r#"
recommender_name: "A"
requester_name: "B"
requester_email: "b@example.com"
tone: "Sarcastic"
"#;
        let err = GenerationRequest::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("Unknown tone"));
    }

    #[test]
    fn test_zero_target_length_rejected() {
        let mut request = GenerationRequest::new("A", "B", "b@example.com");
        request.target_length = Some(0);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_blank_name_rejected() {
        let request = GenerationRequest::new("  ", "B", "b@example.com");
        assert!(matches!(
            request.validate(),
            Err(CoreError::InvalidRequest(_))
        ));
    }
}
