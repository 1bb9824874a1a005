use competition_logic::{
    AccountId, Arena, ArenaConfig, ArenaError, CompetitionStatus, CreateParams, Event,
    JsonFileStore, ManualClock, MemoryStore, PrizeModel, TransferReason,
};
use tracing_subscriber::EnvFilter;

const FEE: u64 = 100_000_000;
const NOW: u64 = 1_700_000_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn vega_params() -> CreateParams {
    CreateParams {
        title: "Vega Trading Competition".to_string(),
        subject: "GBP/USD Feb 21".to_string(),
        entry_fee: FEE,
        approval_weight: 66,
        prize_model: PrizeModel::Percentages(vec![45, 30, 15, 7, 3]),
        start: NOW + 5,
        end: NOW + 10,
    }
}

fn config() -> ArenaConfig {
    ArenaConfig::new("owner".into(), "operator".into())
}

#[test]
fn test_full_competition_payout() {
    init_tracing();
    let clock = ManualClock::new(NOW);
    let mut arena = Arena::open(config(), clock.clone(), MemoryStore::new()).unwrap();

    let creator = AccountId::from("account0");
    let first = AccountId::from("account1");
    let second = AccountId::from("account2");

    let id = arena.create(&creator, vega_params()).unwrap();
    assert_eq!(arena.status(id).unwrap(), CompetitionStatus::Open);

    arena.enter(id, &first, FEE).unwrap();
    arena.enter(id, &second, FEE).unwrap();
    assert_eq!(arena.escrow(id).unwrap().collected, 2 * FEE);

    // too early for either
    assert!(matches!(
        arena.withdraw_commission(id, &"anyone".into()),
        Err(ArenaError::NotStarted(_))
    ));
    assert!(matches!(
        arena.submit_ranking(id, vec![second.clone(), first.clone()], &"operator".into()),
        Err(ArenaError::NotFinished(_))
    ));

    clock.set(NOW + 5);
    assert_eq!(arena.status(id).unwrap(), CompetitionStatus::Started);
    assert!(matches!(
        arena.enter(id, &"late".into(), FEE),
        Err(ArenaError::AlreadyStarted(_))
    ));
    let commission = arena.withdraw_commission(id, &"anyone".into()).unwrap();
    assert_eq!(commission.amount, 10_000_000);
    assert_eq!(commission.to, AccountId::from("owner"));

    clock.set(NOW + 10);
    assert_eq!(arena.status(id).unwrap(), CompetitionStatus::Ended);
    arena
        .submit_ranking(id, vec![second.clone(), first.clone()], &"operator".into())
        .unwrap();
    assert_eq!(arena.status(id).unwrap(), CompetitionStatus::Finished);

    let transfers = arena.distribute(id, &"anyone".into()).unwrap();
    assert_eq!(transfers.len(), 2);
    assert_eq!(transfers[0].to, second);
    assert_eq!(transfers[0].amount, 85_500_000);
    assert_eq!(transfers[0].reason, TransferReason::Prize { rank: 0 });
    assert_eq!(transfers[1].to, first);
    assert_eq!(transfers[1].amount, 57_000_000);

    assert_eq!(arena.entry(id, &second).unwrap().prize, 85_500_000);
    assert_eq!(arena.status(id).unwrap(), CompetitionStatus::Distributed);

    // unallocated 3rd to 5th place stays until swept
    assert_eq!(arena.total_held(), 47_500_000);
    let sweep = arena.sweep_residual(id, &"owner".into()).unwrap();
    assert_eq!(sweep.amount, 47_500_000);
    assert_eq!(arena.total_held(), 0);

    let balance = arena.escrow(id).unwrap();
    assert_eq!(balance.collected, balance.disbursed);
    assert_eq!(balance.commission, 10_000_000);
    assert_eq!(balance.prizes, 142_500_000);
}

#[test]
fn test_cancel_and_refund_flow() {
    init_tracing();
    let clock = ManualClock::new(NOW);
    let mut arena = Arena::open(config(), clock.clone(), MemoryStore::new()).unwrap();
    let creator = AccountId::from("account0");
    let player = AccountId::from("account1");

    let id = arena.create(&creator, vega_params()).unwrap();
    arena.enter(id, &player, FEE).unwrap();

    assert!(matches!(arena.refund(id, &player), Err(ArenaError::NotCanceled(_))));

    // last moment before the start boundary
    clock.set(NOW + 4);
    arena.cancel(id, &creator).unwrap();
    assert_eq!(arena.status(id).unwrap(), CompetitionStatus::Canceled);

    let refund = arena.refund(id, &player).unwrap();
    assert_eq!(refund.amount, FEE);
    assert_eq!(refund.reason, TransferReason::Refund);
    assert!(arena.entry(id, &player).unwrap().fee_returned);
    assert!(matches!(
        arena.refund(id, &player),
        Err(ArenaError::NothingToReturn { .. })
    ));
    assert!(matches!(
        arena.refund(id, &"stranger".into()),
        Err(ArenaError::NothingToReturn { .. })
    ));
    assert_eq!(arena.total_held(), 0);
}

#[test]
fn test_cancel_at_start_boundary_rejected() {
    let clock = ManualClock::new(NOW);
    let mut arena = Arena::open(config(), clock.clone(), MemoryStore::new()).unwrap();
    let creator = AccountId::from("account0");
    let id = arena.create(&creator, vega_params()).unwrap();

    clock.set(NOW + 5);
    assert!(matches!(arena.cancel(id, &creator), Err(ArenaError::AlreadyStarted(_))));
    assert!(!arena.get(id).unwrap().canceled);
}

#[test]
fn test_unsolicited_deposit_is_bounced() {
    let arena = Arena::open(config(), ManualClock::new(NOW), MemoryStore::new()).unwrap();
    let err = arena.receive_unsolicited(&"anyone".into(), 5).unwrap_err();
    assert_eq!(err, ArenaError::UnsolicitedDeposit { amount: 5 });
    assert_eq!(arena.total_held(), 0);
}

#[test]
fn test_commission_rate_change_applies_to_later_withdrawals() {
    let clock = ManualClock::new(NOW);
    let mut arena = Arena::open(config(), clock.clone(), MemoryStore::new()).unwrap();
    let id = arena.create(&"account0".into(), vega_params()).unwrap();
    arena.enter(id, &"account1".into(), FEE).unwrap();

    arena.update_commission_rate(&"owner".into(), 1_000).unwrap();
    assert!(matches!(
        arena.update_commission_rate(&"owner".into(), 1_001),
        Err(ArenaError::RateTooHigh { .. })
    ));

    clock.set(NOW + 5);
    assert_eq!(arena.withdraw_commission(id, &"anyone".into()).unwrap().amount, FEE / 10);
}

#[test]
fn test_state_survives_restart() {
    init_tracing();
    let dir = std::env::temp_dir().join(format!("competition-logic-restart-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let clock = ManualClock::new(NOW);
    let id = {
        let store = JsonFileStore::new(&dir).unwrap();
        let mut arena = Arena::open(config(), clock.clone(), store).unwrap();
        let id = arena.create(&"account0".into(), vega_params()).unwrap();
        arena.enter(id, &"account1".into(), FEE).unwrap();
        id
    };

    // config passed on reopen is ignored in favour of the stored one
    let mut other = config();
    other.commission_bps = 0;
    let store = JsonFileStore::new(&dir).unwrap();
    let mut arena = Arena::open(other, clock.clone(), store.clone()).unwrap();
    assert_eq!(arena.config().commission_bps, 500);
    assert_eq!(arena.count(), 1);
    assert_eq!(arena.get(id).unwrap().entrant_count, 1);
    assert_eq!(arena.total_held(), FEE);
    assert!(matches!(
        arena.enter(id, &"account1".into(), FEE),
        Err(ArenaError::AlreadyEntered { .. })
    ));

    let journal = store.read_events().unwrap();
    assert_eq!(journal.len(), 2);
    assert!(matches!(journal[0], Event::CompetitionCreated { id: 0, .. }));
    assert!(matches!(journal[1], Event::Entered { amount: FEE, .. }));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_rejected_write_is_not_persisted() {
    init_tracing();
    let dir = std::env::temp_dir().join(format!("competition-logic-rejected-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let clock = ManualClock::new(NOW);
    let store = JsonFileStore::new(&dir).unwrap();
    let mut arena = Arena::open(config(), clock.clone(), store.clone()).unwrap();
    let id = arena.create(&"account0".into(), vega_params()).unwrap();

    std::fs::remove_file(store.events_path()).unwrap();
    std::fs::create_dir(store.events_path()).unwrap();

    assert!(matches!(
        arena.enter(id, &"alice".into(), FEE),
        Err(ArenaError::Storage(_))
    ));
    assert_eq!(arena.get(id).unwrap().entrant_count, 0);

    let reopened = Arena::open(config(), clock, JsonFileStore::new(&dir).unwrap()).unwrap();
    assert_eq!(reopened.get(id).unwrap().entrant_count, 0);
    assert_eq!(reopened.escrow(id).unwrap().collected, 0);
    assert!(reopened.entry(id, &"alice".into()).is_err());

    std::fs::remove_dir_all(&dir).unwrap();
}
