/// Scoring scenarios against realistic requirement sets
use talent_enrichment::errors::ValidationError;
use talent_enrichment::models::{
    Candidate, HardRequirement, HardRequirementKind, LocationMatch, RequirementsConfig, SkillRequirement,
    SkillTier,
};
use talent_enrichment::scoring::{cap_provisional, AlignmentScorer, ScoringWeights};

fn frontend_requirements(location: Option<&str>) -> RequirementsConfig {
    RequirementsConfig {
        skills: vec![
            SkillRequirement::new("React", SkillTier::MustHave),
            SkillRequirement::new("TypeScript", SkillTier::MustHave),
            SkillRequirement::new("GraphQL", SkillTier::NiceToHave),
            SkillRequirement::new("Storybook", SkillTier::Bonus),
        ],
        location: location.map(str::to_string),
        ..Default::default()
    }
}

fn candidate(id: &str, skills: &[&str], bio: &str, location: &str) -> Candidate {
    Candidate {
        id: id.to_string(),
        name: format!("Candidate {}", id),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        bio: bio.to_string(),
        location: location.to_string(),
        ..Default::default()
    }
}

#[cfg(test)]
mod skill_scenarios {
    use super::*;

    #[test]
    fn test_inferred_typescript_from_bio() {
        let scorer = AlignmentScorer::new(frontend_requirements(None), ScoringWeights::default()).unwrap();
        let c = candidate("1", &["React"], "Frontend dev and typescript enthusiast", "");

        let (score, breakdown) = scorer.score(&c);

        assert_eq!(breakdown.required_matched, vec!["React", "TypeScript"]);
        assert_eq!(breakdown.required_matched_inferred, vec!["TypeScript"]);
        assert!(breakdown.required_missing.is_empty());
        assert_eq!(breakdown.skills_score, 30);
        assert_eq!(score, 70);
    }

    #[test]
    fn test_preferred_tiers_share_bonus() {
        let scorer = AlignmentScorer::new(frontend_requirements(None), ScoringWeights::default()).unwrap();
        let c = candidate("1", &["React", "TypeScript", "GraphQL", "Storybook"], "", "");

        let (score, breakdown) = scorer.score(&c);
        assert_eq!(breakdown.preferred_matched, vec!["GraphQL", "Storybook"]);
        assert_eq!(breakdown.preferred_score, 10);
        assert_eq!(score, 80);
    }

    #[test]
    fn test_missing_must_have_penalized() {
        let scorer = AlignmentScorer::new(frontend_requirements(None), ScoringWeights::default()).unwrap();
        let c = candidate("1", &["Vue"], "", "");

        let (score, breakdown) = scorer.score(&c);
        assert_eq!(breakdown.required_missing, vec!["React", "TypeScript"]);
        assert_eq!(breakdown.skills_score, -20);
        assert_eq!(score, 20);
    }
}

#[cfg(test)]
mod location_scenarios {
    use super::*;

    #[test]
    fn test_remote_candidate_gets_smaller_bonus() {
        let scorer = AlignmentScorer::new(frontend_requirements(Some("Copenhagen")), ScoringWeights::default()).unwrap();
        let (_, breakdown) = scorer.score(&candidate("1", &[], "", "Remote"));

        assert_eq!(breakdown.location_match, LocationMatch::Remote);
        assert_eq!(breakdown.location_score, 5);
    }

    #[test]
    fn test_exact_location_match() {
        let scorer = AlignmentScorer::new(frontend_requirements(Some("Copenhagen")), ScoringWeights::default()).unwrap();
        let (_, breakdown) = scorer.score(&candidate("1", &[], "", "Copenhagen, Denmark"));

        assert_eq!(breakdown.location_match, LocationMatch::Exact);
        assert_eq!(breakdown.location_score, 10);
    }

    #[test]
    fn test_no_job_location_scores_nothing() {
        let scorer = AlignmentScorer::new(frontend_requirements(None), ScoringWeights::default()).unwrap();
        let (_, breakdown) = scorer.score(&candidate("1", &[], "", "Copenhagen"));
        assert_eq!(breakdown.location_match, LocationMatch::None);
        assert_eq!(breakdown.location_score, 0);
    }
}

#[cfg(test)]
mod ranking_scenarios {
    use super::*;

    #[test]
    fn test_rank_sorts_descending_and_keeps_ties_stable() {
        let scorer = AlignmentScorer::new(frontend_requirements(None), ScoringWeights::default()).unwrap();
        let ranked = scorer.rank(vec![
            candidate("low", &[], "", ""),
            candidate("tie-a", &["React"], "", ""),
            candidate("high", &["React", "TypeScript"], "", ""),
            candidate("tie-b", &["TypeScript"], "", ""),
        ]);

        let ids: Vec<&str> = ranked.iter().map(|s| s.candidate.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "tie-a", "tie-b", "low"]);
    }

    #[test]
    fn test_hard_filter_drops_candidates_without_must_haves() {
        let mut req = frontend_requirements(None);
        req.hard_filter = true;
        let scorer = AlignmentScorer::new(req, ScoringWeights::default()).unwrap();

        let ranked = scorer.rank(vec![
            candidate("none", &["Vue"], "", ""),
            candidate("one", &["React"], "", ""),
        ]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].candidate.id, "one");
    }

    #[test]
    fn test_hard_requirements_apply_only_in_filter_mode() {
        let mut req = frontend_requirements(None);
        req.hard_requirements = vec![HardRequirement {
            kind: HardRequirementKind::Experience,
            value: "5+".into(),
            enabled: true,
            must_have: true,
        }];

        let mut junior = candidate("junior", &["React"], "", "");
        junior.years_experience = 2.0;
        let mut senior = candidate("senior", &["React"], "", "");
        senior.years_experience = 7.0;

        let lenient = AlignmentScorer::new(req.clone(), ScoringWeights::default()).unwrap();
        assert_eq!(lenient.rank(vec![junior.clone(), senior.clone()]).len(), 2);

        req.hard_filter = true;
        let strict = AlignmentScorer::new(req, ScoringWeights::default()).unwrap();
        let ranked = strict.rank(vec![junior, senior]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].candidate.id, "senior");
    }
}

#[cfg(test)]
mod validation_scenarios {
    use super::*;

    #[test]
    fn test_duplicate_skill_rejected() {
        let mut req = frontend_requirements(None);
        req.skills.push(SkillRequirement::new("react", SkillTier::Bonus));
        let err = AlignmentScorer::new(req, ScoringWeights::default()).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateSkill("react".into()));
    }

    #[test]
    fn test_malformed_experience_rejected() {
        let mut req = frontend_requirements(None);
        req.hard_requirements = vec![HardRequirement {
            kind: HardRequirementKind::Experience,
            value: "senior".into(),
            enabled: true,
            must_have: true,
        }];
        assert!(matches!(
            AlignmentScorer::new(req, ScoringWeights::default()),
            Err(ValidationError::InvalidHardRequirement { .. })
        ));
    }

    #[test]
    fn test_negative_constant_rejected() {
        let weights = ScoringWeights {
            location_remote: -1,
            ..Default::default()
        };
        assert_eq!(
            AlignmentScorer::new(frontend_requirements(None), weights).unwrap_err(),
            ValidationError::InvalidScoringConstant("locationRemote")
        );
    }

    #[test]
    fn test_provisional_cap() {
        assert_eq!(cap_provisional(85, 60), 60);
        assert_eq!(cap_provisional(45, 60), 45);
    }
}
