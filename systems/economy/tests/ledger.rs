use realm_defence_core::Event;
use realm_defence_system_economy::{Config, EconomyLedger, LedgerError, LedgerSnapshot};

#[test]
fn failed_spend_leaves_balance_and_successful_spend_deducts() {
    let mut ledger = EconomyLedger::default();
    let mut events = Vec::new();

    assert!(!ledger.spend_coins(150, "build", &mut events));
    assert_eq!(ledger.coins(), 100, "rejected spend must not deduct");
    assert!(events.is_empty(), "rejected spend must not notify");

    assert!(ledger.spend_coins(50, "build", &mut events));
    assert_eq!(ledger.coins(), 50);
    assert_eq!(
        events,
        vec![Event::CoinsChanged {
            total: 50,
            delta: -50,
            reason: "build".to_owned(),
        }]
    );
}

#[test]
fn spend_is_atomic_for_every_amount() {
    for balance in [0_u32, 1, 37, 100, 250] {
        for amount in 0..=300_u32 {
            let mut ledger = EconomyLedger::new(Config::default().with_starting_coins(balance));
            let mut events = Vec::new();
            let spent = ledger.spend_coins(amount, "build", &mut events);
            if amount > balance {
                assert!(!spent, "spending {amount} of {balance} must fail");
                assert_eq!(ledger.coins(), balance);
            } else {
                assert!(spent, "spending {amount} of {balance} must succeed");
                assert_eq!(ledger.coins(), balance - amount);
            }
        }
    }
}

#[test]
fn threshold_never_decreases() {
    let mut ledger = EconomyLedger::default();
    let mut events = Vec::new();
    let mut previous = ledger.experience_to_next_level();
    for _ in 0..200 {
        let _ = ledger.add_experience(7, "kill", &mut events);
        let current = ledger.experience_to_next_level();
        assert!(current >= previous, "threshold shrank from {previous} to {current}");
        assert!(ledger.experience() < current);
        previous = current;
    }
}

#[test]
fn saved_ledger_restores_counters() {
    let mut ledger = EconomyLedger::default();
    let mut events = Vec::new();
    ledger.add_coins(40, "wave_bonus", &mut events);
    let _ = ledger.add_experience(160, "kill", &mut events);
    let saved = ledger.save().expect("ledger encodes");

    let mut restored = EconomyLedger::default();
    restored.load(&saved).expect("ledger decodes");
    assert_eq!(restored.snapshot(), ledger.snapshot());
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let mut ledger = EconomyLedger::default();
    ledger.load(r#"{"coins": 420}"#).expect("partial document decodes");
    assert_eq!(
        ledger.snapshot(),
        LedgerSnapshot {
            coins: 420,
            ..LedgerSnapshot::default()
        }
    );
}

#[test]
fn rejected_documents_leave_ledger_untouched() {
    let mut ledger = EconomyLedger::default();
    assert!(matches!(ledger.load("not json"), Err(LedgerError::Decode(_))));
    assert!(matches!(
        ledger.load(r#"{"level": 0}"#),
        Err(LedgerError::InvalidLevel { level: 0, .. })
    ));
    assert_eq!(ledger.snapshot(), LedgerSnapshot::default());
}

#[test]
fn restored_ledger_keeps_level_progress() {
    let mut ledger = EconomyLedger::default();
    let mut events = Vec::new();
    let _ = ledger.add_experience(125, "kill", &mut events);
    let saved = ledger.save().expect("ledger encodes");

    let mut restored = EconomyLedger::default();
    restored.load(&saved).expect("ledger decodes");
    assert_eq!(restored.level(), 2);
    assert!(
        (restored.level_progress() - 0.5).abs() < 1e-6,
        "progress must be measured from the crossed threshold, got {}",
        restored.level_progress()
    );
}

#[test]
fn level_start_at_or_past_threshold_is_rejected() {
    let mut ledger = EconomyLedger::default();
    assert!(matches!(
        ledger.load(
            r#"{"level": 2, "experience": 120, "experience_to_next_level": 150, "experience_at_current_level": 150}"#
        ),
        Err(LedgerError::InvalidProgress {
            floor: 150,
            threshold: 150
        })
    ));
    assert_eq!(ledger.snapshot(), LedgerSnapshot::default());
}
