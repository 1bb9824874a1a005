//! Transactional facade over `ArenaState`
//!
//! Every mutating call runs against a copy of the state. The copy replaces the
//! live state only after the store accepted it, so a rejected or unpersisted
//! operation leaves nothing behind.

use std::sync::Arc;
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info, warn};
use crate::clock::Clock;
use crate::error::ArenaResult;
use crate::escrow::EscrowBalance;
use crate::state::{
    AccountId, ArenaConfig, ArenaState, Competition, CompetitionStatus, CreateParams, Entry, Event,
    Transfer, TransferReason, UpdateConfigParams,
};
use crate::store::Store;

pub struct Arena<C: Clock, S: Store> {
    state: ArenaState,
    clock: C,
    store: S,
    events: Vec<Event>,
}

impl<C: Clock, S: Store> Arena<C, S> {
    /// Resume from `store`, or start fresh with `config` when it is empty
    pub fn open(config: ArenaConfig, clock: C, mut store: S) -> ArenaResult<Self> {
        let state = match store.load()? {
            Some(state) => {
                info!(
                    competitions = state.competitions.len(),
                    held = state.escrow.total_held(),
                    "resumed arena state"
                );
                state
            }
            None => {
                config.validate()?;
                let state = ArenaState::new(config);
                store.commit(&state, &[])?;
                info!(owner = %state.config.owner, "initialized arena state");
                state
            }
        };
        Ok(Self { state, clock, store, events: Vec::new() })
    }

    fn transact<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&mut ArenaState, u64, &mut Vec<Event>) -> ArenaResult<T>,
    ) -> ArenaResult<T> {
        let now = self.clock.now();
        let mut next = self.state.clone();
        let mut events = Vec::new();

        let value = match f(&mut next, now, &mut events) {
            Ok(value) => value,
            Err(e) => {
                debug!(op, code = e.code(), error = %e, "operation rejected");
                return Err(e);
            }
        };

        if let Err(e) = self.store.commit(&next, &events) {
            warn!(op, error = %e, "commit failed, state unchanged");
            return Err(e);
        }

        info!(op, now, events = events.len(), "committed");
        self.state = next;
        self.events.extend(events);
        Ok(value)
    }

    pub fn create(&mut self, creator: &AccountId, params: CreateParams) -> ArenaResult<u64> {
        self.transact("create", |state, now, events| {
            let (entry_fee, start, end) = (params.entry_fee, params.start, params.end);
            let id = state.create(creator, params, now)?;
            events.push(Event::CompetitionCreated {
                id,
                creator: creator.clone(),
                entry_fee,
                start,
                end,
            });
            Ok(id)
        })
    }

    pub fn cancel(&mut self, id: u64, caller: &AccountId) -> ArenaResult<()> {
        self.transact("cancel", |state, now, events| {
            state.cancel(id, caller, now)?;
            events.push(Event::CompetitionCanceled { id });
            Ok(())
        })
    }

    /// `paid` is the amount attached to the call, it must equal the entry fee
    pub fn enter(&mut self, id: u64, player: &AccountId, paid: u64) -> ArenaResult<()> {
        self.transact("enter", |state, now, events| {
            state.enter(id, player, paid, now)?;
            events.push(Event::Entered { id, player: player.clone(), amount: paid });
            Ok(())
        })
    }

    pub fn refund(&mut self, id: u64, player: &AccountId) -> ArenaResult<Transfer> {
        self.transact("refund", |state, _, events| {
            let transfer = state.refund(id, player)?;
            events.push(Event::FundsReleased(transfer.clone()));
            Ok(transfer)
        })
    }

    /// Permissionless, the commission always goes to the owner
    pub fn withdraw_commission(&mut self, id: u64, caller: &AccountId) -> ArenaResult<Transfer> {
        debug!(id, %caller, "commission withdrawal requested");
        self.transact("withdraw_commission", |state, now, events| {
            let transfer = state.withdraw_commission(id, now)?;
            events.push(Event::FundsReleased(transfer.clone()));
            Ok(transfer)
        })
    }

    pub fn submit_ranking(
        &mut self,
        id: u64,
        players: Vec<AccountId>,
        caller: &AccountId,
    ) -> ArenaResult<()> {
        self.transact("submit_ranking", |state, now, events| {
            state.submit_ranking(id, players.clone(), caller, now)?;
            events.push(Event::RankingSubmitted { id, players });
            Ok(())
        })
    }

    /// Permissionless once ranked, prizes always go to the ranked players
    pub fn distribute(&mut self, id: u64, caller: &AccountId) -> ArenaResult<Vec<Transfer>> {
        debug!(id, %caller, "distribution requested");
        self.transact("distribute", |state, _, events| {
            let transfers = state.distribute(id)?;
            let pool = transfers
                .iter()
                .filter(|t| matches!(t.reason, TransferReason::Prize { .. }))
                .map(|t| t.amount)
                .sum();
            events.extend(transfers.iter().cloned().map(Event::FundsReleased));
            events.push(Event::Distributed { id, pool });
            Ok(transfers)
        })
    }

    pub fn sweep_residual(&mut self, id: u64, caller: &AccountId) -> ArenaResult<Transfer> {
        self.transact("sweep_residual", |state, _, events| {
            let transfer = state.sweep_residual(id, caller)?;
            events.push(Event::FundsReleased(transfer.clone()));
            Ok(transfer)
        })
    }

    pub fn update_commission_rate(&mut self, caller: &AccountId, bps: u16) -> ArenaResult<()> {
        self.transact("update_commission_rate", |state, _, events| {
            state.update_commission_rate(caller, bps)?;
            events.push(Event::ConfigUpdated { config: state.config.clone() });
            Ok(())
        })
    }

    pub fn update_config(&mut self, caller: &AccountId, params: UpdateConfigParams) -> ArenaResult<()> {
        self.transact("update_config", |state, _, events| {
            state.update_config(caller, params)?;
            events.push(Event::ConfigUpdated { config: state.config.clone() });
            Ok(())
        })
    }

    /// Funds sent outside `enter` are bounced, escrow is never credited
    pub fn receive_unsolicited(&self, from: &AccountId, amount: u64) -> ArenaResult<()> {
        let result = self.state.receive_unsolicited(from, amount);
        if let Err(e) = &result {
            warn!(%from, amount, error = %e, "bounced unsolicited deposit");
        }
        result
    }

    pub fn get(&self, id: u64) -> ArenaResult<Competition> {
        self.state.get(id)
    }

    pub fn count(&self) -> u64 {
        self.state.count()
    }

    pub fn entry(&self, id: u64, player: &AccountId) -> ArenaResult<Entry> {
        self.state.get_entry(id, player)
    }

    pub fn status(&self, id: u64) -> ArenaResult<CompetitionStatus> {
        self.state.status(id, self.clock.now())
    }

    pub fn escrow(&self, id: u64) -> ArenaResult<EscrowBalance> {
        self.state.escrow.balance(id).cloned()
    }

    pub fn total_held(&self) -> u64 {
        self.state.escrow.total_held()
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.state.config
    }

    pub fn state(&self) -> &ArenaState {
        &self.state
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Events committed since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

/// Thread-safe handle, one operation at a time
pub struct SharedArena<C: Clock, S: Store> {
    inner: Arc<Mutex<Arena<C, S>>>,
}

impl<C: Clock, S: Store> Clone for SharedArena<C, S> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<C: Clock, S: Store> SharedArena<C, S> {
    pub fn new(arena: Arena<C, S>) -> Self {
        Self { inner: Arc::new(Mutex::new(arena)) }
    }

    pub fn lock(&self) -> MutexGuard<'_, Arena<C, S>> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access
    pub fn with<T>(&self, f: impl FnOnce(&mut Arena<C, S>) -> ArenaResult<T>) -> ArenaResult<T> {
        let mut arena = self.inner.lock();
        f(&mut arena)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::ArenaError;
    use crate::payout::PrizeModel;
    use crate::store::MemoryStore;

    struct FailingStore {
        fail: bool,
        inner: MemoryStore,
    }

    impl Store for FailingStore {
        fn load(&mut self) -> ArenaResult<Option<ArenaState>> {
            self.inner.load()
        }

        fn commit(&mut self, state: &ArenaState, events: &[Event]) -> ArenaResult<()> {
            if self.fail {
                return Err(ArenaError::Storage("disk full".to_string()));
            }
            self.inner.commit(state, events)
        }
    }

    fn config() -> ArenaConfig {
        ArenaConfig::new("owner".into(), "operator".into())
    }

    fn params() -> CreateParams {
        CreateParams {
            title: "weekly".to_string(),
            subject: "BTC/USD".to_string(),
            entry_fee: 1_000,
            approval_weight: 0,
            prize_model: PrizeModel::Weighted,
            start: 10,
            end: 20,
        }
    }

    #[test]
    fn test_rejected_operation_emits_nothing() {
        let clock = ManualClock::new(0);
        let mut arena = Arena::open(config(), clock.clone(), MemoryStore::new()).unwrap();
        let id = arena.create(&"creator".into(), params()).unwrap();
        arena.drain_events();

        let before = arena.state().clone();
        assert!(arena.enter(id, &"alice".into(), 999).is_err());
        assert_eq!(arena.state(), &before);
        assert!(arena.drain_events().is_empty());
    }

    #[test]
    fn test_failed_commit_rolls_back() {
        let store = FailingStore { fail: false, inner: MemoryStore::new() };
        let mut arena = Arena::open(config(), ManualClock::new(0), store).unwrap();
        let id = arena.create(&"creator".into(), params()).unwrap();

        arena.store.fail = true;
        let err = arena.enter(id, &"alice".into(), 1_000).unwrap_err();
        assert!(err.is_storage());
        assert_eq!(arena.get(id).unwrap().entrant_count, 0);
        assert_eq!(arena.total_held(), 0);
    }

    #[test]
    fn test_events_follow_commits() {
        let clock = ManualClock::new(0);
        let mut arena = Arena::open(config(), clock.clone(), MemoryStore::new()).unwrap();
        let id = arena.create(&"creator".into(), params()).unwrap();
        arena.enter(id, &"alice".into(), 1_000).unwrap();

        clock.set(20);
        arena.submit_ranking(id, vec!["alice".into()], &"operator".into()).unwrap();
        arena.distribute(id, &"anyone".into()).unwrap();

        let events = arena.drain_events();
        assert!(matches!(events[0], Event::CompetitionCreated { id: 0, .. }));
        assert!(matches!(events[1], Event::Entered { amount: 1_000, .. }));
        assert!(matches!(events[2], Event::RankingSubmitted { .. }));
        assert!(matches!(events.last(), Some(Event::Distributed { pool: 950, .. })));
        assert_eq!(arena.store().events(), events.as_slice());
        assert!(arena.drain_events().is_empty());
    }

    #[test]
    fn test_open_resumes_from_store() {
        let mut store = MemoryStore::new();
        let mut state = ArenaState::new(config());
        state.config.commission_bps = 250;
        store.commit(&state, &[]).unwrap();

        // stored config wins over the one passed in
        let arena = Arena::open(config(), ManualClock::new(0), store).unwrap();
        assert_eq!(arena.config().commission_bps, 250);
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let mut bad = config();
        bad.commission_bps = 5_000;
        assert!(Arena::open(bad, ManualClock::new(0), MemoryStore::new()).is_err());
    }

    #[test]
    fn test_shared_arena_across_threads() {
        let arena = Arena::open(config(), ManualClock::new(0), MemoryStore::new()).unwrap();
        let shared = SharedArena::new(arena);
        let id = shared.with(|a| a.create(&"creator".into(), params())).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    let player = AccountId::new(format!("player-{i}"));
                    shared.with(|a| a.enter(id, &player, 1_000))
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let arena = shared.lock();
        assert_eq!(arena.get(id).unwrap().entrant_count, 8);
        assert_eq!(arena.total_held(), 8_000);
    }
}
