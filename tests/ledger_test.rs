// Ledger Tests
// Core record-and-verify behavior of the event ledger

use lifeledger::identity::{Did, Keypair};
use lifeledger::ledger::{Ledger, LedgerError};

fn new_did() -> Did {
    Did::from_public_key(&Keypair::generate().public_key())
}

// ============================================================================
// EVENT RECORDING
// ============================================================================

#[test]
fn test_ids_start_at_one_and_increase_without_gaps() {
    let ledger = Ledger::new(new_did());
    let owner = new_did();

    for expected in 1..=20 {
        let id = ledger
            .record_event(&owner, "milestone", "something happened", "")
            .unwrap();
        assert_eq!(id, expected);
    }

    assert_eq!(ledger.total_events(), 20);
}

#[test]
fn test_recorded_event_fields() {
    let ledger = Ledger::new(new_did());
    let owner = new_did();

    let id = ledger
        .record_event(&owner, "birth", "Born in City X", "doc://certificate-1")
        .unwrap();

    let event = ledger.event(id).unwrap();
    assert_eq!(event.id(), id);
    assert_eq!(event.owner(), &owner);
    assert_eq!(event.event_type(), "birth");
    assert_eq!(event.description(), "Born in City X");
    assert_eq!(event.document_ref(), "doc://certificate-1");
    assert!(!event.verified());
    assert!(event.verifier().is_none());
}

#[test]
fn test_empty_document_ref_is_allowed() {
    let ledger = Ledger::new(new_did());
    let owner = new_did();

    let id = ledger.record_event(&owner, "birth", "Born", "").unwrap();
    assert_eq!(ledger.event(id).unwrap().document_ref(), "");
}

#[test]
fn test_anyone_may_record_without_a_role() {
    let ledger = Ledger::new(new_did());

    // A brand-new identity with no role records successfully
    let nobody = new_did();
    assert!(!ledger.is_verifier(&nobody));
    assert!(ledger.record_event(&nobody, "birth", "Born", "").is_ok());
}

// ============================================================================
// TIMELINES
// ============================================================================

#[test]
fn test_timeline_returns_exactly_the_owners_ids_in_order() {
    let ledger = Ledger::new(new_did());
    let alice = new_did();
    let bob = new_did();

    let mut alice_ids = Vec::new();
    for i in 0..5 {
        alice_ids.push(
            ledger
                .record_event(&alice, "milestone", &format!("alice {}", i), "")
                .unwrap(),
        );
        ledger
            .record_event(&bob, "milestone", &format!("bob {}", i), "")
            .unwrap();
    }

    assert_eq!(ledger.timeline(&alice), alice_ids);
    assert_eq!(ledger.timeline(&alice).len(), 5);
}

#[test]
fn test_timeline_of_unknown_identity_is_empty() {
    let ledger = Ledger::new(new_did());
    assert!(ledger.timeline(&new_did()).is_empty());
}

// ============================================================================
// VERIFICATION
// ============================================================================

#[test]
fn test_verify_flips_exactly_once() {
    let admin = new_did();
    let ledger = Ledger::new(admin.clone());

    let verifier = new_did();
    ledger.add_verifier(&admin, &verifier).unwrap();

    let owner = new_did();
    let id = ledger.record_event(&owner, "birth", "Born", "").unwrap();

    ledger.verify_event(&verifier, id).unwrap();

    let event = ledger.event(id).unwrap();
    assert!(event.verified());
    assert_eq!(event.verifier(), Some(&verifier));

    // Second attempt fails and leaves the fields untouched
    assert!(matches!(
        ledger.verify_event(&admin, id),
        Err(LedgerError::AlreadyVerified(_))
    ));
    let event = ledger.event(id).unwrap();
    assert!(event.verified());
    assert_eq!(event.verifier(), Some(&verifier));
}

#[test]
fn test_non_verifier_cannot_verify() {
    let ledger = Ledger::new(new_did());
    let owner = new_did();
    let id = ledger.record_event(&owner, "birth", "Born", "").unwrap();

    let stranger = new_did();
    assert!(matches!(
        ledger.verify_event(&stranger, id),
        Err(LedgerError::Unauthorized)
    ));
    assert!(!ledger.event(id).unwrap().verified());
}

#[test]
fn test_owner_cannot_verify_own_event_regardless_of_role() {
    let admin = new_did();
    let ledger = Ledger::new(admin.clone());

    let owner = new_did();
    ledger.add_verifier(&admin, &owner).unwrap();

    let id = ledger.record_event(&owner, "birth", "Born", "").unwrap();

    assert!(matches!(
        ledger.verify_event(&owner, id),
        Err(LedgerError::SelfVerificationForbidden)
    ));
    assert!(!ledger.event(id).unwrap().verified());
}

// ============================================================================
// FULL SCENARIO (record -> unauthorized -> enroll -> verify -> double verify)
// ============================================================================

#[test]
fn test_record_and_verify_scenario() {
    // Admin A creates the ledger
    let admin = new_did();
    let ledger = Ledger::new(admin.clone());

    // User U records a birth event -> id 1
    let user = new_did();
    let id = ledger
        .record_event(&user, "birth", "Born in City X", "")
        .unwrap();
    assert_eq!(id, 1);

    // Non-verifier V cannot verify yet
    let verifier = new_did();
    assert!(matches!(
        ledger.verify_event(&verifier, 1),
        Err(LedgerError::Unauthorized)
    ));

    // Admin enrolls V
    ledger.add_verifier(&admin, &verifier).unwrap();

    // V verifies
    ledger.verify_event(&verifier, 1).unwrap();
    let event = ledger.event(1).unwrap();
    assert!(event.verified());
    assert_eq!(event.verifier(), Some(&verifier));

    // Further verification attempts fail
    assert!(matches!(
        ledger.verify_event(&admin, 1),
        Err(LedgerError::AlreadyVerified(1))
    ));
}
