//! GO inference rules applied to the mini Gene Ontology fixture

mod common;

use common::*;
use termgraph_ontology::{Conclusion, QueryError, Rule, Rules};

#[test]
fn test_part_of_inherited_through_is_a() {
    let snapshot = mini_go();
    let inferred = snapshot.inference().infer(LYSOSOME, "part_of").unwrap();

    assert_eq!(
        inferred.into_iter().collect::<Vec<_>>(),
        sorted([CYTOPLASM, INTRACELLULAR_PART, INTRACELLULAR, CELLULAR_COMPONENT])
    );
}

#[test]
fn test_is_a_does_not_become_part_of() {
    let snapshot = mini_go();
    let engine = snapshot.inference();

    // lysosome is_a vacuole, but is not part of one
    assert!(!engine.holds(LYSOSOME, "part_of", VACUOLE).unwrap());
    assert!(engine.holds(LYSOSOME, "is_a", VACUOLE).unwrap());
}

#[test]
fn test_part_of_through_alt_id_target() {
    let snapshot = mini_go();
    let engine = snapshot.inference();

    assert!(engine.holds(TRANSCRIPTION, "part_of", BIOLOGICAL_PROCESS).unwrap());
    assert!(engine.holds(TRANSCRIPTION, "part_of", BIOLOGICAL_PROCESS_ALT).unwrap());
}

#[test]
fn test_regulation_follows_targets() {
    let snapshot = mini_go();
    let engine = snapshot.inference();

    // Asserted directly
    assert!(engine.holds(REGULATION_OF_BP, "regulates", BIOLOGICAL_PROCESS).unwrap());

    // negatively_regulates transcription, which is_a cellular process and is
    // part_of biological_process
    assert_eq!(
        engine
            .infer(NEG_REGULATION_OF_TRANSCRIPTION, "negatively_regulates")
            .unwrap()
            .into_iter()
            .collect::<Vec<_>>(),
        sorted([TRANSCRIPTION, CELLULAR_PROCESS, BIOLOGICAL_PROCESS])
    );
    assert!(engine
        .holds(NEG_REGULATION_OF_TRANSCRIPTION, "regulates", BIOLOGICAL_PROCESS)
        .unwrap());
    assert!(!engine
        .holds(POS_REGULATION_OF_TRANSCRIPTION, "negatively_regulates", TRANSCRIPTION)
        .unwrap());
}

#[test]
fn test_unbound_subject() {
    let snapshot = mini_go();
    let subjects = snapshot.inference().infer_subjects("regulates", TRANSCRIPTION).unwrap();

    assert_eq!(
        subjects.into_iter().collect::<Vec<_>>(),
        sorted([NEG_REGULATION_OF_TRANSCRIPTION, POS_REGULATION_OF_TRANSCRIPTION])
    );
}

#[test]
fn test_custom_rules() {
    let snapshot = mini_go();
    // Without the inheritance rule part_of stops at the asserted edge
    let rules = Rules::new(vec![Rule::new("part_of", "part_of", Conclusion::First)]);
    let engine = termgraph_ontology::InferenceEngine::with_rules(&snapshot, rules);

    assert_eq!(
        engine.infer(LYSOSOME, "part_of").unwrap().into_iter().collect::<Vec<_>>(),
        vec![CYTOPLASM]
    );
}

#[test]
fn test_inference_errors() {
    let snapshot = mini_go();
    let engine = snapshot.inference();

    assert_eq!(
        engine.infer(OBSOLETE_TERM, "is_a"),
        Err(QueryError::TermNotFound(OBSOLETE_TERM.to_string()))
    );
    assert_eq!(
        engine.infer(LYSOSOME, "located_in"),
        Err(QueryError::UnknownRelation("located_in".to_string()))
    );
}
