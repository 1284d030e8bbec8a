//! Cited profile: every claim carries the URL and quoted text it came from.
//!
//! The generative client extracts fields with 1-based source indices; this
//! module resolves them, scores each claim by source reliability and
//! corroboration, and computes the data quality score.

use crate::clients::{ExtractedFields, GenerativeTextClient, RawClaim};
use crate::errors::SourceError;
use crate::profile_models::{
    CertificationEvidence, CitedClaim, CitedProfile, EducationEvidence, EvidenceSource,
    ExperienceEvidence, SkillEvidence, SourceType, SourceUsed, VerificationStatus,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub fn source_type_from_url(url: &str) -> SourceType {
    let url = url.trim();
    if url.starts_with("local://") {
        SourceType::Resume
    } else if url.contains("linkedin.com") {
        SourceType::Linkedin
    } else if url.contains("github.com") {
        SourceType::Github
    } else if ["medium.com", "dev.to", "substack.com"].iter().any(|d| url.contains(d)) {
        SourceType::Publication
    } else if ["techcrunch.com", "forbes.com", "bloomberg.com"].iter().any(|d| url.contains(d)) {
        SourceType::News
    } else {
        SourceType::CompanyPage
    }
}

pub fn reliability(source_type: SourceType) -> f64 {
    match source_type {
        SourceType::Linkedin => 0.85,
        SourceType::Github => 0.9,
        SourceType::CompanyPage => 0.8,
        SourceType::Publication => 0.75,
        SourceType::News => 0.7,
        SourceType::Resume => 0.95,
    }
}

/// Reliability plus bonuses for an exact quote and corroborating sources, capped at 1.0.
pub fn claim_confidence(source_type: SourceType, exact_match: bool, corroborating: usize) -> f64 {
    let mut confidence = reliability(source_type);
    if exact_match {
        confidence += 0.05;
    }
    confidence += match corroborating {
        0 => 0.0,
        1 => 0.05,
        _ => 0.1,
    };
    confidence.min(1.0)
}

/// Resolves 1-based indices against the sources that were sent.
struct Citations<'a> {
    sources: &'a [EvidenceSource],
}

impl<'a> Citations<'a> {
    fn source(&self, index: usize) -> Option<&'a EvidenceSource> {
        index.checked_sub(1).and_then(|i| self.sources.get(i))
    }

    fn cite(&self, claim: String, index: usize, extracted_text: &str, corroborating: usize) -> Option<CitedClaim> {
        let source = self.source(index)?;
        let source_type = source_type_from_url(&source.url);
        Some(CitedClaim {
            claim,
            source_url: source.url.clone(),
            source_type,
            extracted_text: extracted_text.to_string(),
            confidence: claim_confidence(source_type, true, corroborating),
            verification_status: VerificationStatus::Verified,
            corroborating_sources: Vec::new(),
        })
    }

    fn raw(&self, raw: &RawClaim) -> Option<CitedClaim> {
        if raw.claim.trim().is_empty() {
            return None;
        }
        self.cite(raw.claim.clone(), raw.source_index, &raw.extracted_text, 0)
    }
}

fn uncited_name(name: &str) -> CitedClaim {
    CitedClaim {
        claim: name.to_string(),
        source_url: String::new(),
        source_type: SourceType::Resume,
        extracted_text: name.to_string(),
        confidence: 0.5,
        verification_status: VerificationStatus::Unverified,
        corroborating_sources: Vec::new(),
    }
}

/// Experiences at the same company from different URLs corroborate each other.
fn cross_verify(experiences: &mut [ExperienceEvidence]) {
    let keys: Vec<String> = experiences.iter().map(|e| e.company.trim().to_lowercase()).collect();
    let urls: Vec<String> = experiences
        .iter()
        .map(|e| e.evidence.first().map(|c| c.source_url.clone()).unwrap_or_default())
        .collect();

    for (i, experience) in experiences.iter_mut().enumerate() {
        let mut others: Vec<String> = Vec::new();
        for (j, url) in urls.iter().enumerate() {
            if j != i && keys[j] == keys[i] && url != &urls[i] && !others.contains(url) {
                others.push(url.clone());
            }
        }
        if others.is_empty() {
            continue;
        }
        if let Some(claim) = experience.evidence.first_mut() {
            claim.confidence = claim_confidence(claim.source_type, true, others.len());
            claim.corroborating_sources = others;
        }
    }
}

/// Share of fields backed by a citation, 0..=100.
pub fn data_quality_score(profile: &CitedProfile) -> u32 {
    let well_cited = |evidence: &[CitedClaim]| evidence.first().is_some_and(|c| c.confidence > 0.5);

    let mut total = 3;
    let mut cited = 0;
    if !profile.name.source_url.is_empty() {
        cited += 1;
    }
    cited += profile.headline.is_some() as usize + profile.location.is_some() as usize;

    total += profile.experiences.len() * 2;
    cited += profile.experiences.iter().filter(|e| well_cited(&e.evidence[..])).count() * 2;

    total += profile.skills.len();
    cited += profile.skills.iter().filter(|s| well_cited(&s.evidence[..])).count();

    total += profile.education.len();
    cited += profile.education.len();

    ((cited as f64 / total as f64) * 100.0).round() as u32
}

/// Profile for a candidate with no documents to cite from.
pub fn placeholder_profile(candidate_id: &str, name: &str, now: DateTime<Utc>) -> CitedProfile {
    CitedProfile {
        candidate_id: candidate_id.to_string(),
        name: uncited_name(name),
        headline: None,
        location: None,
        experiences: Vec::new(),
        skills: Vec::new(),
        education: Vec::new(),
        certifications: Vec::new(),
        data_quality_score: 0,
        sources_used: Vec::new(),
        generated_at: now,
    }
}

/// Resolve raw generator output against the sources. Unresolvable citations are dropped.
pub fn assemble_cited_profile(
    candidate_id: &str,
    candidate_name: &str,
    sources: &[EvidenceSource],
    extracted: ExtractedFields,
    now: DateTime<Utc>,
) -> CitedProfile {
    let citations = Citations { sources };
    let mut dropped = 0usize;
    let mut keep = |claim: Option<CitedClaim>| {
        if claim.is_none() {
            dropped += 1;
        }
        claim
    };

    let name = extracted
        .name_claim
        .as_ref()
        .and_then(|c| keep(citations.raw(c)))
        .unwrap_or_else(|| uncited_name(candidate_name));
    let headline = extracted.headline_claim.as_ref().and_then(|c| keep(citations.raw(c)));
    let location = extracted.location_claim.as_ref().and_then(|c| keep(citations.raw(c)));

    let mut experiences: Vec<ExperienceEvidence> = Vec::new();
    for exp in extracted.experiences {
        let claim = format!("{} at {}", exp.role, exp.company);
        let Some(evidence) = keep(citations.cite(claim, exp.source_index, &exp.extracted_text, 0)) else {
            continue;
        };
        let is_current = exp
            .end_date
            .as_deref()
            .map_or(true, |d| d.trim().is_empty() || d.to_lowercase().contains("present"));
        experiences.push(ExperienceEvidence {
            company: exp.company,
            role: exp.role,
            start_date: exp.start_date,
            end_date: exp.end_date,
            is_current,
            evidence: vec![evidence],
            key_achievements: exp.achievements.iter().filter_map(|a| keep(citations.raw(a))).collect(),
        });
    }
    cross_verify(&mut experiences);

    let skills: Vec<SkillEvidence> = extracted
        .skills
        .into_iter()
        .filter_map(|skill| {
            let corroborating = skill.source_indices.len().saturating_sub(1);
            let evidence: Vec<CitedClaim> = skill
                .source_indices
                .iter()
                .enumerate()
                .filter_map(|(i, idx)| {
                    let text = skill.extracted_texts.get(i).map(String::as_str).unwrap_or_default();
                    keep(citations.cite(format!("Proficient in {}", skill.skill), *idx, text, corroborating))
                })
                .collect();
            if evidence.is_empty() {
                return None;
            }
            Some(SkillEvidence {
                years_of_evidence: skill.proficiency.years(),
                skill: skill.skill,
                proficiency_level: skill.proficiency,
                evidence,
            })
        })
        .collect();

    let education: Vec<EducationEvidence> = extracted
        .education
        .into_iter()
        .filter_map(|edu| {
            let claim = format!("{} from {}", edu.degree, edu.institution);
            let evidence = keep(citations.cite(claim, edu.source_index, &edu.extracted_text, 0))?;
            Some(EducationEvidence {
                institution: edu.institution,
                degree: edu.degree,
                year: edu.year,
                evidence,
            })
        })
        .collect();

    let certifications: Vec<CertificationEvidence> = extracted
        .certifications
        .into_iter()
        .filter_map(|cert| {
            let claim = format!("{} from {}", cert.name, cert.issuer);
            let evidence = keep(citations.cite(claim, cert.source_index, &cert.extracted_text, 0))?;
            Some(CertificationEvidence {
                name: cert.name,
                issuer: cert.issuer,
                date: cert.date,
                evidence,
            })
        })
        .collect();

    if dropped > 0 {
        tracing::warn!("Dropped {} claims with unresolvable citations for {}", dropped, candidate_name);
    }

    let sources_used = sources
        .iter()
        .map(|s| {
            let source_type = source_type_from_url(&s.url);
            SourceUsed {
                url: s.url.clone(),
                source_type,
                reliability: reliability(source_type),
            }
        })
        .collect();

    let mut profile = CitedProfile {
        candidate_id: candidate_id.to_string(),
        name,
        headline,
        location,
        experiences,
        skills,
        education,
        certifications,
        data_quality_score: 0,
        sources_used,
        generated_at: now,
    };
    profile.data_quality_score = data_quality_score(&profile);
    profile
}

#[derive(Clone)]
pub struct CitedEvidenceBuilder {
    generator: Arc<dyn GenerativeTextClient>,
}

impl CitedEvidenceBuilder {
    pub fn new(generator: Arc<dyn GenerativeTextClient>) -> Self {
        Self { generator }
    }

    pub async fn build(
        &self,
        candidate_id: &str,
        candidate_name: &str,
        sources: &[EvidenceSource],
        now: DateTime<Utc>,
    ) -> Result<CitedProfile, SourceError> {
        if sources.is_empty() {
            tracing::debug!("No evidence sources for {}, returning uncited profile", candidate_name);
            return Ok(placeholder_profile(candidate_id, candidate_name, now));
        }

        tracing::info!("Extracting cited evidence for {} from {} sources", candidate_name, sources.len());
        let extracted = self.generator.generate_cited_fields(candidate_name, sources).await?;
        let profile = assemble_cited_profile(candidate_id, candidate_name, sources, extracted, now);

        tracing::info!(
            "✓ Cited profile for {}: {} experiences, {} skills, {} education, quality {}",
            candidate_name,
            profile.experiences.len(),
            profile.skills.len(),
            profile.education.len(),
            profile.data_quality_score
        );
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{RawEducation, RawExperience, RawSkill};
    use crate::profile_models::Proficiency;

    fn source(url: &str) -> EvidenceSource {
        EvidenceSource {
            url: url.to_string(),
            title: None,
            raw_text: "text".to_string(),
        }
    }

    fn raw(claim: &str, index: usize) -> RawClaim {
        RawClaim {
            claim: claim.to_string(),
            source_index: index,
            extracted_text: claim.to_string(),
        }
    }

    fn experience(company: &str, index: usize) -> RawExperience {
        RawExperience {
            company: company.to_string(),
            role: "Engineer".to_string(),
            source_index: index,
            extracted_text: format!("Engineer at {}", company),
            ..Default::default()
        }
    }

    #[test]
    fn test_source_types() {
        assert_eq!(source_type_from_url("https://www.linkedin.com/in/ana"), SourceType::Linkedin);
        assert_eq!(source_type_from_url("https://github.com/ana"), SourceType::Github);
        assert_eq!(source_type_from_url("https://dev.to/ana/post"), SourceType::Publication);
        assert_eq!(source_type_from_url("https://techcrunch.com/x"), SourceType::News);
        assert_eq!(source_type_from_url("local://resume.pdf"), SourceType::Resume);
        assert_eq!(source_type_from_url("https://acme.io/team"), SourceType::CompanyPage);
    }

    #[test]
    fn test_claim_confidence() {
        assert!((claim_confidence(SourceType::News, false, 0) - 0.7).abs() < 1e-9);
        assert!((claim_confidence(SourceType::Linkedin, true, 1) - 0.95).abs() < 1e-9);
        assert!((claim_confidence(SourceType::Resume, true, 3) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unresolvable_citations_dropped() {
        let sources = vec![source("https://github.com/ana")];
        let extracted = ExtractedFields {
            name_claim: Some(raw("Ana", 1)),
            headline_claim: Some(raw("Staff Engineer", 0)),
            location_claim: Some(raw("Lisbon", 2)),
            experiences: vec![experience("Acme", 1), experience("Ghost", 7)],
            ..Default::default()
        };
        let profile = assemble_cited_profile("c1", "Ana", &sources, extracted, Utc::now());
        assert_eq!(profile.name.source_url, "https://github.com/ana");
        assert!(profile.headline.is_none());
        assert!(profile.location.is_none());
        assert_eq!(profile.experiences.len(), 1);
        assert!(profile.experiences[0].is_current);
    }

    #[test]
    fn test_cross_verification_by_company() {
        let sources = vec![source("https://linkedin.com/in/ana"), source("https://acme.io/team")];
        let extracted = ExtractedFields {
            experiences: vec![experience("Acme", 1), experience("ACME ", 2), experience("Other", 1)],
            ..Default::default()
        };
        let profile = assemble_cited_profile("c1", "Ana", &sources, extracted, Utc::now());
        let first = &profile.experiences[0].evidence[0];
        assert_eq!(first.corroborating_sources, vec!["https://acme.io/team".to_string()]);
        assert!((first.confidence - 0.95).abs() < 1e-9);
        assert!(profile.experiences[2].evidence[0].corroborating_sources.is_empty());
    }

    #[test]
    fn test_data_quality_score() {
        let sources = vec![source("https://github.com/ana")];
        let extracted = ExtractedFields {
            name_claim: Some(raw("Ana", 1)),
            experiences: vec![experience("Acme", 1)],
            skills: vec![RawSkill {
                skill: "Rust".to_string(),
                proficiency: Proficiency::Advanced,
                source_indices: vec![1, 9],
                extracted_texts: vec!["Rust".to_string()],
            }],
            education: vec![RawEducation {
                institution: "IST".to_string(),
                degree: "MSc".to_string(),
                source_index: 1,
                ..Default::default()
            }],
            ..Default::default()
        };
        let profile = assemble_cited_profile("c1", "Ana", &sources, extracted, Utc::now());
        // total 3 + 2 + 1 + 1 = 7, cited 1 + 2 + 1 + 1 = 5
        assert_eq!(profile.data_quality_score, 71);
        assert_eq!(profile.skills[0].evidence.len(), 1);
        assert_eq!(profile.skills[0].years_of_evidence, 3);
    }

    #[test]
    fn test_placeholder_profile() {
        let profile = placeholder_profile("c1", "Ana", Utc::now());
        assert_eq!(profile.data_quality_score, 0);
        assert_eq!(profile.name.verification_status, VerificationStatus::Unverified);
        assert_eq!(data_quality_score(&profile), 0);
    }
}
