use skinsafe_core::analyzer::{CLOSING_TIPS, NO_CONFLICTS_MESSAGE};
use skinsafe_core::{
    DeterministicSafetyEngine, FindingKind, IngredientId, KnowledgeBase, PairContext,
    ProductInput, Routine, RoutineSafetyEngine, Severity, TimeOfDay,
};

fn engine() -> DeterministicSafetyEngine {
    DeterministicSafetyEngine::builtin().expect("builtin engine")
}

#[test]
fn morning_retinol_is_flagged_and_moved_to_evening() {
    let engine = engine();

    let result = engine.analyze(&Routine::new(["retinol"], []));

    assert!(result.has_conflicts);
    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.findings[0].kind, FindingKind::WrongTimeOfDay);
    assert_eq!(result.findings[0].severity, Severity::Medium);
    assert_eq!(result.safety_score, 85);

    let optimized = result.optimized_routine.expect("optimized routine");
    assert!(optimized.morning.is_empty());
    assert_eq!(optimized.evening, vec!["retinol"]);
    assert!(!optimized.warnings.is_empty());
}

#[test]
fn benzoyl_peroxide_with_retinol_leads_the_report() {
    let engine = engine();
    let knowledge = engine.knowledge();
    let (_, rule) = knowledge
        .rule_for(&IngredientId::new("benzoyl-peroxide"), &IngredientId::new("retinol"))
        .expect("builtin rule");

    for routine in [
        Routine::new(["benzoyl peroxide"], ["retinol"]),
        Routine::new([], ["Retinol", "Benzoyl Peroxide"]),
    ] {
        let result = engine.analyze(&routine);

        assert!(result.safety_score <= 60, "score {} for {routine:?}", result.safety_score);
        assert_eq!(result.findings[0].severity, Severity::Dangerous);
        assert_eq!(result.recommendations[0], Severity::Dangerous.banner());
        assert_eq!(result.recommendations[1], rule.remedy);
    }
}

#[test]
fn empty_routine_is_perfectly_safe() {
    let result = engine().analyze(&Routine::default());

    assert!(!result.has_conflicts);
    assert_eq!(result.safety_score, 100);
    assert_eq!(result.recommendations, vec![NO_CONFLICTS_MESSAGE]);
    assert!(result.optimized_routine.is_none());
}

#[test]
fn adding_a_hydrator_ignores_pre_existing_findings() {
    let engine = engine();
    let existing = Routine::new(["vitamin c"], ["retinol"]);
    assert!(engine.analyze(&existing).has_conflicts, "existing routine has its own finding");

    let report = engine.check_addition(
        &ProductInput::new("Hydra Serum", ["Aqua", "Sodium Hyaluronate"]),
        &existing,
    );

    assert!(report.safe);
    assert!(report.conflicts.is_empty());
}

#[test]
fn vitamin_c_with_niacinamide_is_only_a_low_note() {
    let result = engine().analyze(&Routine::new(["vitamin-c", "niacinamide"], []));

    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.findings[0].kind, FindingKind::KnownConflict);
    assert_eq!(result.findings[0].severity, Severity::Low);
    assert_eq!(result.safety_score, 95);
    assert_eq!(&result.recommendations[result.recommendations.len() - 2..], &CLOSING_TIPS);
}

#[test]
fn every_builtin_rule_fires_in_both_orders() {
    let engine = engine();
    let knowledge = engine.knowledge();
    let context = PairContext::unscheduled();

    for rule in knowledge.rules() {
        let (a, b) = (rule.pair.first(), rule.pair.second());
        for findings in [engine.check_pair(a, b, &context), engine.check_pair(b, a, &context)] {
            let explicit = findings
                .iter()
                .filter(|finding| finding.kind == FindingKind::KnownConflict)
                .collect::<Vec<_>>();
            assert_eq!(explicit.len(), 1, "rule {}", rule.pair);
            assert_eq!(explicit[0].severity, rule.severity, "rule {}", rule.pair);
        }
    }
}

#[test]
fn score_never_rises_as_the_routine_grows() {
    let engine = engine();
    let mut evening = Vec::new();
    let mut previous = 100;

    for entry in
        ["retinol", "glycolic acid", "salicylic acid", "benzoyl peroxide", "vitamin c", "tretinoin"]
    {
        evening.push(entry);
        let score = engine.analyze(&Routine::new([], evening.clone())).safety_score;
        assert!(score <= previous, "{entry} raised the score from {previous} to {score}");
        assert!(score <= 100);
        previous = score;
    }
    assert_eq!(previous, 0);
}

#[test]
fn optimizer_reaches_a_fixed_point() {
    let engine = engine();
    let routine = Routine::new(["retinol", "glycolic acid", "vitamin c"], ["niacinamide"]);

    let first = engine.analyze(&routine).optimized_routine.expect("optimized routine");
    let rewritten = Routine::new(first.morning.clone(), first.evening.clone());
    let findings = engine.analyze(&rewritten).findings;
    let second = engine.optimize(&rewritten, &findings);

    assert_eq!(first.morning, vec!["vitamin c"]);
    assert_eq!(second.morning, first.morning);
    assert_eq!(second.evening, first.evening);
}

#[test]
fn builtin_normalization_keeps_whole_words() {
    let knowledge = KnowledgeBase::builtin().expect("builtin knowledge base");

    assert_eq!(knowledge.resolve("Aqua"), Some(IngredientId::new("water")));
    assert_eq!(knowledge.resolve("aquaporin booster"), None);
    assert_eq!(knowledge.resolve("L-Ascorbic Acid 15%"), Some(IngredientId::new("vitamin-c")));
    assert_eq!(knowledge.resolve("acid"), None);
}

#[test]
fn short_and_punctuated_product_names_resolve() {
    let knowledge = KnowledgeBase::builtin().expect("builtin knowledge base");

    for (raw, expected) in [
        ("BHA 2% Liquid", "salicylic-acid"),
        ("BPO 5% gel", "benzoyl-peroxide"),
        ("AHA 10% Serum", "glycolic-acid"),
        ("Niacinamide(5%)", "niacinamide"),
        ("Cica Cream", "centella-asiatica"),
    ] {
        assert_eq!(knowledge.resolve(raw), Some(IngredientId::new(expected)), "for {raw:?}");
    }
}

#[test]
fn abbreviated_benzoyl_peroxide_still_conflicts_with_retinol() {
    let result = engine().analyze(&Routine::new(["BPO 5% gel"], ["retinol"]));

    assert!(result.safety_score <= 60, "score {}", result.safety_score);
    assert_eq!(result.findings[0].severity, Severity::Dangerous);
    assert!(result.findings[0].involves(&IngredientId::new("benzoyl-peroxide")));
}

#[test]
fn morning_slotted_product_is_moved_to_evening() {
    let engine = engine();
    let routine = Routine::default().with_product(
        ProductInput::new("Night Serum", ["Retinol", "Glycerin"]).in_slot(TimeOfDay::Morning),
    );

    let result = engine.analyze(&routine);
    assert_eq!(result.findings[0].kind, FindingKind::WrongTimeOfDay);

    let optimized = result.optimized_routine.expect("optimized routine");
    assert!(optimized.morning.is_empty());
    assert_eq!(optimized.evening, vec!["Night Serum"]);
    assert!(optimized.warnings[0].starts_with("Moved Night Serum from morning to evening"));
}

#[test]
fn addition_sharing_an_ingredient_name_keeps_the_existing_entry() {
    let engine = engine();
    let existing = Routine::new(["benzoyl peroxide"], ["retinol"]);

    let report = engine.check_addition(
        &ProductInput::new("Retinol", ["Sodium Hyaluronate"]).in_slot(TimeOfDay::Evening),
        &existing,
    );
    assert!(report.safe);
    assert!(report.conflicts.is_empty());

    let combined = engine.analyze(&existing.with_addition(&ProductInput::new("Retinol", ["Aqua"])));
    assert_eq!(combined.findings[0].severity, Severity::Dangerous);
}

#[test]
fn unresolved_names_are_listed_but_not_analyzed() {
    let result = engine().analyze(&Routine::new(["Mystery Extract"], ["retinol"]));

    assert!(!result.has_conflicts);
    assert_eq!(result.unresolved_ingredients().collect::<Vec<_>>(), vec!["Mystery Extract"]);
    assert_eq!(result.ingredients.len(), 2);
}
