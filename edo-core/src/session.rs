//! # Tuning Session
//!
//! The single mutable owner of the current tuning. A session mirrors its
//! tuning to a [`ProfileStore`] and tells subscribers about every change.
//!
//! ## Touched
//! A session starts untouched. It becomes touched the first time the user sets
//! a value and stays touched until [`TuningSession::reset`]. While touched, a
//! profile without degree names means the user emptied the degree set, not
//! that the defaults apply.

use crossbeam_channel::{Receiver, Sender};
use log::{debug, info};

use crate::error::ProfileError;
use crate::profile::{ProfileStore, StoredProfile, resolve_base_frequency, resolve_degrees};
use crate::tuning::EdoTuning;

/// A change to the session, carrying the tuning in effect afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum TuningEvent {
    DegreesChanged(EdoTuning),
    BaseFrequencyChanged(EdoTuning),
    Reset(EdoTuning),
    Reloaded(EdoTuning),
}

impl TuningEvent {
    pub fn tuning(&self) -> &EdoTuning {
        match self {
            TuningEvent::DegreesChanged(tuning)
            | TuningEvent::BaseFrequencyChanged(tuning)
            | TuningEvent::Reset(tuning)
            | TuningEvent::Reloaded(tuning) => tuning,
        }
    }
}

/// The current tuning, its touched flag and the medium it is persisted to.
#[derive(Debug)]
pub struct TuningSession<S: ProfileStore> {
    store: S,
    tuning: EdoTuning,
    touched: bool,
    subscribers: Vec<Sender<TuningEvent>>,
}

impl<S: ProfileStore> TuningSession<S> {
    /// Opens an untouched session from whatever the store currently holds.
    pub fn open(store: S) -> Result<Self, ProfileError> {
        let stored = store.load()?;
        Ok(Self::from_profile(store, &stored))
    }

    /// Builds an untouched session from a profile already read from `store`.
    pub fn from_profile(store: S, stored: &StoredProfile) -> Self {
        let tuning = EdoTuning::new(
            resolve_degrees(stored, false),
            resolve_base_frequency(stored),
        );
        info!(
            "[SESSION] Opened with {} degrees, base {} Hz",
            tuning.degree_count(),
            tuning.base_frequency()
        );
        Self {
            store,
            tuning,
            touched: false,
            subscribers: Vec::new(),
        }
    }

    pub fn tuning(&self) -> &EdoTuning {
        &self.tuning
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Returns a channel that receives every subsequent [`TuningEvent`].
    pub fn subscribe(&mut self) -> Receiver<TuningEvent> {
        let (sender, receiver) = crossbeam_channel::unbounded();
        self.subscribers.push(sender);
        receiver
    }

    /// Replaces the degree set.
    ///
    /// Setting a list equal to the current one (same names, same order) does
    /// nothing: no write, no event, touched unchanged.
    ///
    /// # Returns
    /// * `Ok(true)` - The degree set changed
    /// * `Ok(false)` - The list was equal to the current degree set
    /// * `Err(e)` - The store rejected the write; the session is unchanged
    pub fn set_degrees(&mut self, degrees: Vec<String>) -> Result<bool, ProfileError> {
        if degrees.as_slice() == self.tuning.degrees() {
            debug!("[SESSION] Degree set unchanged, skipping write");
            return Ok(false);
        }

        self.store.store_notes(Some(degrees.as_slice()))?;
        self.touched = true;
        self.tuning = EdoTuning::new(degrees, self.tuning.base_frequency());
        info!("[SESSION] Degree set now has {} degrees", self.tuning.degree_count());
        self.notify(TuningEvent::DegreesChanged(self.tuning.clone()));
        Ok(true)
    }

    /// Replaces the base frequency.
    ///
    /// Always counts as a touch and always writes, even when `frequency` equals
    /// the current base frequency.
    pub fn set_base_frequency(&mut self, frequency: f64) -> Result<(), ProfileError> {
        self.store.store_base_frequency(Some(frequency))?;
        self.touched = true;
        self.tuning = EdoTuning::new(self.tuning.degrees().to_vec(), frequency);
        info!("[SESSION] Base frequency now {} Hz", frequency);
        self.notify(TuningEvent::BaseFrequencyChanged(self.tuning.clone()));
        Ok(())
    }

    /// Clears both stored overrides and returns to the factory tuning, untouched.
    ///
    /// The store is cleared in one write, so a failure leaves both the store
    /// and the session as they were.
    pub fn reset(&mut self) -> Result<(), ProfileError> {
        self.store.clear()?;
        self.touched = false;
        self.tuning = EdoTuning::default();
        info!("[SESSION] Reset to defaults");
        self.notify(TuningEvent::Reset(self.tuning.clone()));
        Ok(())
    }

    /// Re-reads the store, e.g. after another writer changed it.
    pub fn reload(&mut self) -> Result<(), ProfileError> {
        let stored = self.store.load()?;
        self.tuning = EdoTuning::new(
            resolve_degrees(&stored, self.touched),
            resolve_base_frequency(&stored),
        );
        debug!(
            "[SESSION] Reloaded: {} degrees (touched: {})",
            self.tuning.degree_count(),
            self.touched
        );
        self.notify(TuningEvent::Reloaded(self.tuning.clone()));
        Ok(())
    }

    fn notify(&mut self, event: TuningEvent) {
        // Receivers that were dropped are forgotten.
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::MemoryProfileStore;
    use crate::tuning::{DEFAULT_BASE_FREQUENCY, DEFAULT_DEGREES};

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn fresh() -> TuningSession<MemoryProfileStore> {
        TuningSession::open(MemoryProfileStore::default()).unwrap()
    }

    /// Memory store whose writes can be switched to fail.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: MemoryProfileStore,
        failing: bool,
    }

    impl FlakyStore {
        fn check(&self) -> Result<(), ProfileError> {
            if self.failing {
                return Err(std::io::Error::other("disk full").into());
            }
            Ok(())
        }
    }

    impl ProfileStore for FlakyStore {
        fn load(&self) -> Result<StoredProfile, ProfileError> {
            self.inner.load()
        }

        fn store_notes(&mut self, notes: Option<&[String]>) -> Result<(), ProfileError> {
            self.check()?;
            self.inner.store_notes(notes)
        }

        fn store_base_frequency(&mut self, base_frequency: Option<f64>) -> Result<(), ProfileError> {
            self.check()?;
            self.inner.store_base_frequency(base_frequency)
        }

        fn clear(&mut self) -> Result<(), ProfileError> {
            self.check()?;
            self.inner.clear()
        }
    }

    /// A touched session with custom degrees whose store now rejects writes.
    fn failing_session() -> TuningSession<FlakyStore> {
        let mut session = TuningSession::open(FlakyStore::default()).unwrap();
        session.set_degrees(names(&["X", "Y", "Z"])).unwrap();
        session.set_base_frequency(30.0).unwrap();
        session.store_mut().failing = true;
        session
    }

    fn assert_unchanged(session: &TuningSession<FlakyStore>) {
        assert!(session.is_touched());
        assert_eq!(session.tuning().degrees(), names(&["X", "Y", "Z"]).as_slice());
        assert_eq!(session.tuning().base_frequency(), 30.0);
        assert_eq!(
            session.store().load().unwrap(),
            StoredProfile {
                notes: Some(names(&["X", "Y", "Z"])),
                base_frequency: Some(30.0),
            }
        );
    }

    #[test]
    fn opens_with_defaults() {
        let session = fresh();
        assert!(!session.is_touched());
        assert_eq!(session.tuning().degrees(), DEFAULT_DEGREES.as_slice());
        assert_eq!(session.tuning().base_frequency(), DEFAULT_BASE_FREQUENCY);
    }

    #[test]
    fn opens_with_stored_values() {
        let store = MemoryProfileStore::new(StoredProfile {
            notes: Some(names(&["a", "b", "c"])),
            base_frequency: Some(30.0),
        });
        let session = TuningSession::open(store).unwrap();
        assert_eq!(session.tuning().degree_count(), 3);
        assert_eq!(session.tuning().base_frequency(), 30.0);
        assert!(!session.is_touched());
    }

    #[test]
    fn sessions_can_start_from_a_profile_in_hand() {
        let stored = StoredProfile {
            notes: Some(names(&["a", "b"])),
            base_frequency: None,
        };
        let session = TuningSession::from_profile(MemoryProfileStore::default(), &stored);
        assert_eq!(session.tuning().degree_count(), 2);
        assert_eq!(session.tuning().base_frequency(), DEFAULT_BASE_FREQUENCY);
        assert!(!session.is_touched());
    }

    #[test]
    fn equal_degrees_are_a_no_op() {
        let mut session = fresh();
        let events = session.subscribe();

        assert!(!session.set_degrees(DEFAULT_DEGREES.clone()).unwrap());
        assert!(!session.is_touched());
        assert_eq!(session.store().writes(), 0);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn reordered_degrees_are_a_change() {
        let mut session = fresh();
        let mut reordered = DEFAULT_DEGREES.clone();
        reordered.swap(0, 1);
        assert!(session.set_degrees(reordered.clone()).unwrap());
        assert!(session.is_touched());
        assert_eq!(session.tuning().degrees(), reordered.as_slice());
        assert_eq!(session.store().load().unwrap().notes, Some(reordered));
    }

    #[test]
    fn base_frequency_always_touches() {
        let mut session = fresh();
        session.set_base_frequency(DEFAULT_BASE_FREQUENCY).unwrap();
        assert!(session.is_touched());
        assert_eq!(session.store().writes(), 1);
    }

    #[test]
    fn emptied_degrees_survive_a_reload() {
        let mut session = fresh();
        session.set_degrees(Vec::new()).unwrap();
        assert_eq!(session.store().load().unwrap().notes, None);

        session.reload().unwrap();
        assert_eq!(session.tuning().degree_count(), 0);
    }

    #[test]
    fn untouched_reload_falls_back_to_defaults() {
        let mut session = fresh();
        session.reload().unwrap();
        assert_eq!(session.tuning().degree_count(), 12);
    }

    #[test]
    fn reload_picks_up_external_changes() {
        let mut session = fresh();
        session.store_mut().replace(StoredProfile {
            notes: Some(names(&["x", "y"])),
            base_frequency: Some(50.0),
        });
        session.reload().unwrap();
        assert_eq!(session.tuning().degrees(), names(&["x", "y"]).as_slice());
        assert_eq!(session.tuning().base_frequency(), 50.0);
    }

    #[test]
    fn reset_restores_defaults_and_clears_the_store() {
        let mut session = fresh();
        session.set_degrees(names(&["C", "D", "E"])).unwrap();
        session.set_base_frequency(100.0).unwrap();

        session.reset().unwrap();
        assert!(!session.is_touched());
        assert_eq!(session.tuning(), &EdoTuning::default());
        assert_eq!(session.store().load().unwrap(), StoredProfile::default());
        assert_eq!(session.store().writes(), 3);

        // Untouched again, so an absent list means defaults.
        session.reload().unwrap();
        assert_eq!(session.tuning().degree_count(), 12);
    }

    #[test]
    fn failed_writes_leave_the_session_as_it_was() {
        let mut session = failing_session();
        let events = session.subscribe();

        assert!(session.set_degrees(names(&["A", "B"])).is_err());
        assert_unchanged(&session);
        assert!(session.set_base_frequency(40.0).is_err());
        assert_unchanged(&session);
        assert!(session.reset().is_err());
        assert_unchanged(&session);

        assert!(events.try_recv().is_err());
    }

    #[test]
    fn failed_reset_keeps_degrees_across_a_reload() {
        let mut session = failing_session();
        assert!(session.reset().is_err());

        session.reload().unwrap();
        assert_eq!(session.tuning().degrees(), names(&["X", "Y", "Z"]).as_slice());
    }

    #[test]
    fn subscribers_see_each_change() {
        let mut session = fresh();
        let events = session.subscribe();

        session.set_degrees(names(&["C", "D", "E"])).unwrap();
        session.set_base_frequency(20.0).unwrap();
        session.reset().unwrap();

        let received: Vec<TuningEvent> = events.try_iter().collect();
        assert_eq!(received.len(), 3);
        assert!(matches!(received[0], TuningEvent::DegreesChanged(_)));
        assert_eq!(received[0].tuning().degree_count(), 3);
        assert!(matches!(received[1], TuningEvent::BaseFrequencyChanged(_)));
        assert_eq!(received[1].tuning().base_frequency(), 20.0);
        assert!(matches!(received[2], TuningEvent::Reset(_)));
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut session = fresh();
        drop(session.subscribe());
        let kept = session.subscribe();
        session.set_base_frequency(20.0).unwrap();
        assert_eq!(session.subscribers.len(), 1);
        assert_eq!(kept.try_iter().count(), 1);
    }
}
