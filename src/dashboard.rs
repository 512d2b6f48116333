//! Keeps the local menu in sync with the remote food service.
//!
//! [`Dashboard`] owns the collection of dishes and the two session trackers. Its operations are
//! the only way to change them: each one calls the service first and only touches local state
//! once the call succeeded. Failures are returned to the caller and leave local state as it was.

use crate::api::{Food, FoodInput, NewFood};
use crate::service::{FoodService, ServiceError};
use crate::session::{CreateSession, EditSession};
use crate::store::FoodCollection;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote call was rejected or the service is unreachable
    #[error("Network failure: {0}")]
    NetworkFailure(#[from] ServiceError),
    /// The operation was attempted in a state where it makes no sense
    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
    /// Another operation on the same dish has not completed yet
    #[error("Food {0} already has an operation in progress")]
    Busy(u32),
    #[error("Food {0} is not on the menu")]
    NotFound(u32),
}

pub type SyncResult<T> = std::result::Result<T, SyncError>;

#[derive(Default)]
struct DashboardState {
    foods: FoodCollection,
    create: CreateSession,
    edit: EditSession,
    /// Ids with a remote call in progress
    in_flight: HashSet<u32>,
}

/// Marks a dish as having a remote call in progress until dropped.
///
/// Must not be dropped while the state lock is held.
struct InFlight<'a> {
    state: &'a Mutex<DashboardState>,
    id: u32,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.state).in_flight.remove(&self.id);
    }
}

fn lock(state: &Mutex<DashboardState>) -> MutexGuard<'_, DashboardState> {
    // State is only ever replaced wholesale, a panic elsewhere cannot leave it half-updated
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The menu dashboard
pub struct Dashboard<S: FoodService> {
    service: S,
    state: Mutex<DashboardState>,
}

impl<S: FoodService> Dashboard<S> {
    /// Create an empty dashboard. Call [`Dashboard::load`] to fetch the menu.
    pub fn new(service: S) -> Self {
        Dashboard {
            service,
            state: Mutex::new(DashboardState::default()),
        }
    }

    /// Claim `id` for a remote call. Fails with Busy if another call on it is in progress.
    fn claim(&self, state: &mut DashboardState, id: u32) -> SyncResult<InFlight<'_>> {
        if !state.in_flight.insert(id) {
            log::warn!("Rejecting concurrent operation on food {}", id);
            return Err(SyncError::Busy(id));
        }
        Ok(InFlight {
            state: &self.state,
            id,
        })
    }

    /// Replace the local menu with the one listed by the service
    pub fn load(&self) -> SyncResult<FoodCollection> {
        let foods = self.service.list().map_err(|err| {
            log::error!("Failed to load foods: {}", err);
            SyncError::from(err)
        })?;

        let foods = FoodCollection::replace_all(foods);
        log::info!("Loaded {} foods", foods.len());
        lock(&self.state).foods = foods.clone();
        Ok(foods)
    }

    /// Submit the creation form.
    ///
    /// The dish is created available whatever the form contains. On success it is appended to
    /// the menu and the creation surface closes; on failure nothing changes and the surface
    /// stays open so the user can retry.
    pub fn create(&self, input: FoodInput) -> SyncResult<Food> {
        let created = self.service.create(&NewFood::from(input)).map_err(|err| {
            log::error!("Failed to create food: {}", err);
            SyncError::from(err)
        })?;

        let mut state = lock(&self.state);
        state.foods = if state.foods.contains(created.id) {
            log::warn!("Service returned existing id {} for a new food", created.id);
            state.foods.replace_by_id(created.clone())
        } else {
            state.foods.append(created.clone())
        };
        state.create.close();
        log::info!("Created {}", created);
        Ok(created)
    }

    /// Submit the edit form for the dish currently selected for editing.
    ///
    /// The service receives the selection with the form fields laid over it. The menu entry is
    /// then replaced by the record the service returned, and the edit surface closes. A record
    /// returned under another id is not stored. Fails with InvariantViolation, without calling
    /// the service, when nothing is selected.
    pub fn update(&self, input: FoodInput) -> SyncResult<Food> {
        let (selected, _in_flight) = {
            let mut state = lock(&self.state);
            let selected = state.edit.selected().cloned().ok_or_else(|| {
                log::error!("Update submitted without a food selected for editing");
                SyncError::InvariantViolation("no food is selected for editing")
            })?;
            let in_flight = self.claim(&mut state, selected.id)?;
            (selected, in_flight)
        };

        let payload = selected.merged(&input);
        let updated = self.service.update(selected.id, &payload).map_err(|err| {
            log::error!("Failed to update food {}: {}", selected.id, err);
            SyncError::from(err)
        })?;

        {
            let mut state = lock(&self.state);
            // Only the claimed id may be written, another call could be in progress on any other
            if updated.id == selected.id {
                state.foods = state.foods.replace_by_id(updated.clone());
            } else {
                log::warn!(
                    "Service answered the update of food {} with food {}, local menu left as is",
                    selected.id,
                    updated.id
                );
            }
            // The user may have moved on to another dish meanwhile
            if state.edit.selected().map(|f| f.id) == Some(selected.id) {
                state.edit.close();
            }
        }
        log::info!("Updated {}", updated);
        Ok(updated)
    }

    /// Delete a dish.
    ///
    /// The entry is removed from the menu only once the service confirmed the deletion. Returns
    /// the removed entry, or None if the menu did not contain it.
    pub fn delete(&self, id: u32) -> SyncResult<Option<Food>> {
        let _in_flight = {
            let mut state = lock(&self.state);
            self.claim(&mut state, id)?
        };

        self.service.delete(id).map_err(|err| {
            log::error!("Failed to delete food {}: {}", id, err);
            SyncError::from(err)
        })?;

        let removed = {
            let mut state = lock(&self.state);
            let removed = state.foods.get(id).cloned();
            state.foods = state.foods.remove_by_id(id);
            if state.edit.selected().map(|f| f.id) == Some(id) {
                state.edit.close();
            }
            removed
        };
        log::info!("Deleted food {}", id);
        Ok(removed)
    }

    /// Flip whether a dish can be ordered
    pub fn toggle_availability(&self, id: u32) -> SyncResult<Food> {
        let (food, _in_flight) = {
            let mut state = lock(&self.state);
            let food = state.foods.get(id).cloned().ok_or(SyncError::NotFound(id))?;
            let in_flight = self.claim(&mut state, id)?;
            (food, in_flight)
        };

        let payload = Food {
            available: !food.available,
            ..food
        };
        let updated = self.service.update(id, &payload).map_err(|err| {
            log::error!("Failed to change availability of food {}: {}", id, err);
            SyncError::from(err)
        })?;

        if updated.id == id {
            let mut state = lock(&self.state);
            state.foods = state.foods.replace_by_id(updated.clone());
        } else {
            log::warn!(
                "Service answered the update of food {} with food {}, local menu left as is",
                id,
                updated.id
            );
        }
        log::info!("Updated {}", updated);
        Ok(updated)
    }

    /// Snapshot of the current menu
    pub fn foods(&self) -> FoodCollection {
        lock(&self.state).foods.clone()
    }

    pub fn open_create(&self) {
        lock(&self.state).create.open();
    }

    pub fn close_create(&self) {
        lock(&self.state).create.close();
    }

    pub fn toggle_create(&self) {
        lock(&self.state).create.toggle();
    }

    pub fn is_create_open(&self) -> bool {
        lock(&self.state).create.is_open()
    }

    /// Open the edit surface on `food`, replacing any previous selection
    pub fn begin_edit(&self, food: Food) {
        lock(&self.state).edit.begin_edit(food);
    }

    /// Open the edit surface on the menu entry with the given id
    pub fn begin_edit_by_id(&self, id: u32) -> SyncResult<Food> {
        let mut state = lock(&self.state);
        let food = state.foods.get(id).cloned().ok_or(SyncError::NotFound(id))?;
        state.edit.begin_edit(food.clone());
        Ok(food)
    }

    pub fn close_edit(&self) {
        lock(&self.state).edit.close();
    }

    pub fn toggle_edit(&self) {
        lock(&self.state).edit.toggle();
    }

    pub fn is_edit_open(&self) -> bool {
        lock(&self.state).edit.is_open()
    }

    /// The dish being edited, as it was when editing began
    pub fn editing(&self) -> Option<Food> {
        lock(&self.state).edit.selected().cloned()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::Price;
    use crate::service::ServiceResult;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::sync::Arc;

    fn food(id: u32, name: &str) -> Food {
        Food {
            id,
            name: name.to_string(),
            image: "x".to_string(),
            price: Price::from("10.00"),
            description: String::new(),
            available: true,
        }
    }

    /// In-memory service counting calls, with a switch making every call fail
    #[derive(Default)]
    struct FakeService {
        foods: Mutex<Vec<Food>>,
        calls: AtomicUsize,
        fail: AtomicBool,
        /// When set, updates answer with this id instead of the one in the path
        reply_id: Mutex<Option<u32>>,
    }

    impl FakeService {
        fn with(foods: Vec<Food>) -> Self {
            FakeService {
                foods: Mutex::new(foods),
                ..Default::default()
            }
        }

        fn enter(&self) -> ServiceResult<std::sync::MutexGuard<'_, Vec<Food>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(ServiceError::Status(503, String::new()));
            }
            Ok(self.foods.lock().unwrap())
        }
    }

    impl FoodService for FakeService {
        fn list(&self) -> ServiceResult<Vec<Food>> {
            Ok(self.enter()?.clone())
        }

        fn create(&self, new_food: &NewFood) -> ServiceResult<Food> {
            let mut foods = self.enter()?;
            let id = foods.iter().map(|f| f.id).max().unwrap_or(0) + 1;
            let created = Food {
                id,
                name: new_food.input.name.clone(),
                image: new_food.input.image.clone(),
                price: new_food.input.price.clone(),
                description: new_food.input.description.clone(),
                available: new_food.available,
            };
            foods.push(created.clone());
            Ok(created)
        }

        fn update(&self, id: u32, food: &Food) -> ServiceResult<Food> {
            let mut foods = self.enter()?;
            let stored = foods
                .iter_mut()
                .find(|f| f.id == id)
                .ok_or_else(|| ServiceError::Status(404, String::new()))?;
            *stored = Food { id, ..food.clone() };
            let reply_id = self.reply_id.lock().unwrap().unwrap_or(id);
            Ok(Food {
                id: reply_id,
                ..stored.clone()
            })
        }

        fn delete(&self, id: u32) -> ServiceResult<()> {
            let mut foods = self.enter()?;
            let before = foods.len();
            foods.retain(|f| f.id != id);
            if foods.len() == before {
                return Err(ServiceError::Status(404, String::new()));
            }
            Ok(())
        }
    }

    fn loaded() -> Dashboard<FakeService> {
        let dashboard = Dashboard::new(FakeService::with(vec![
            food(1, "Pizza"),
            food(2, "Burger"),
        ]));
        dashboard.load().unwrap();
        dashboard
    }

    fn calls(dashboard: &Dashboard<FakeService>) -> usize {
        dashboard.service.calls.load(Ordering::SeqCst)
    }

    fn fail(dashboard: &Dashboard<FakeService>) {
        dashboard.service.fail.store(true, Ordering::SeqCst);
    }

    #[test]
    fn test_load_replaces_everything() {
        let dashboard = loaded();
        dashboard.service.foods.lock().unwrap().pop();

        let foods = dashboard.load().unwrap();
        assert_eq!(foods.len(), 1);
        assert_eq!(dashboard.foods(), foods);
    }

    #[test]
    fn test_create_appends_and_closes() {
        let dashboard = loaded();
        dashboard.open_create();

        let created = dashboard
            .create(FoodInput {
                name: "Salad".to_string(),
                image: "x".to_string(),
                price: Price::from("9.90"),
                description: "fresh".to_string(),
            })
            .unwrap();

        assert_eq!(
            created,
            Food {
                id: 3,
                name: "Salad".to_string(),
                image: "x".to_string(),
                price: Price::from("9.90"),
                description: "fresh".to_string(),
                available: true,
            }
        );
        let foods = dashboard.foods();
        assert_eq!(foods.as_slice(), &[food(1, "Pizza"), food(2, "Burger"), created]);
        assert!(!dashboard.is_create_open());
    }

    #[test]
    fn test_failed_create_keeps_state_and_session() {
        let dashboard = loaded();
        let before = dashboard.foods();
        dashboard.open_create();
        fail(&dashboard);

        let result = dashboard.create(FoodInput::default());

        assert!(matches!(result, Err(SyncError::NetworkFailure(_))));
        assert!(dashboard.foods().ptr_eq(&before));
        assert!(dashboard.is_create_open());
    }

    #[test]
    fn test_update_without_selection_never_calls_service() {
        let dashboard = loaded();
        let calls_before = calls(&dashboard);

        let result = dashboard.update(FoodInput::default());

        assert!(matches!(result, Err(SyncError::InvariantViolation(_))));
        assert_eq!(calls(&dashboard), calls_before);
    }

    #[test]
    fn test_update_replaces_with_server_record() {
        let dashboard = loaded();
        dashboard.begin_edit_by_id(1).unwrap();

        let updated = dashboard
            .update(FoodInput {
                name: "Pizza Deluxe".to_string(),
                image: "x".to_string(),
                price: Price::from("25.00"),
                description: "y".to_string(),
            })
            .unwrap();

        assert_eq!(updated.id, 1);
        assert!(updated.available);
        let foods = dashboard.foods();
        assert_eq!(foods.as_slice(), &[updated, food(2, "Burger")]);
        assert!(!dashboard.is_edit_open());
        assert!(dashboard.editing().is_none());
    }

    #[test]
    fn test_update_answered_with_other_id_leaves_menu_alone() {
        let dashboard = loaded();
        *dashboard.service.reply_id.lock().unwrap() = Some(2);
        let before = dashboard.foods();
        dashboard.begin_edit_by_id(1).unwrap();

        let updated = dashboard
            .update(FoodInput {
                name: "Pizza Deluxe".to_string(),
                ..FoodInput::default()
            })
            .unwrap();

        assert_eq!(updated.id, 2);
        assert_eq!(dashboard.foods(), before);
        assert!(!dashboard.is_edit_open());
        assert!(lock(&dashboard.state).in_flight.is_empty());
    }

    #[test]
    fn test_failed_update_keeps_session() {
        let dashboard = loaded();
        dashboard.begin_edit(food(2, "Burger"));
        let before = dashboard.foods();
        fail(&dashboard);

        let result = dashboard.update(FoodInput::default());

        assert!(matches!(result, Err(SyncError::NetworkFailure(_))));
        assert_eq!(dashboard.foods(), before);
        assert!(dashboard.is_edit_open());
        assert_eq!(dashboard.editing().map(|f| f.id), Some(2));
    }

    #[test]
    fn test_edit_selection_is_a_snapshot() {
        let dashboard = loaded();
        dashboard.begin_edit_by_id(2).unwrap();
        dashboard.toggle_availability(2).unwrap();

        assert!(!dashboard.foods().get(2).unwrap().available);
        assert!(dashboard.editing().unwrap().available);
    }

    #[test]
    fn test_delete_removes_entry() {
        let dashboard = loaded();

        let removed = dashboard.delete(2).unwrap();

        assert_eq!(removed, Some(food(2, "Burger")));
        assert_eq!(dashboard.foods().as_slice(), &[food(1, "Pizza")]);
    }

    #[test]
    fn test_failed_delete_keeps_entry() {
        let dashboard = loaded();
        fail(&dashboard);

        assert!(matches!(
            dashboard.delete(2),
            Err(SyncError::NetworkFailure(_))
        ));
        assert_eq!(dashboard.foods().len(), 2);
        // The guard is released on failure
        assert!(lock(&dashboard.state).in_flight.is_empty());
    }

    #[test]
    fn test_delete_closes_edit_of_deleted_food() {
        let dashboard = loaded();
        dashboard.begin_edit_by_id(1).unwrap();
        dashboard.delete(1).unwrap();

        assert!(!dashboard.is_edit_open());
    }

    #[test]
    fn test_toggle_availability() {
        let dashboard = loaded();

        assert!(!dashboard.toggle_availability(1).unwrap().available);
        assert!(dashboard.toggle_availability(1).unwrap().available);
        assert!(matches!(
            dashboard.toggle_availability(7),
            Err(SyncError::NotFound(7))
        ));
    }

    #[test]
    fn test_toggle_answered_with_other_id_leaves_menu_alone() {
        let dashboard = loaded();
        *dashboard.service.reply_id.lock().unwrap() = Some(2);
        let before = dashboard.foods();

        assert_eq!(dashboard.toggle_availability(1).unwrap().id, 2);
        assert_eq!(dashboard.foods(), before);
    }

    /// Service whose deletions wait until the test lets them through
    struct GatedService {
        inner: FakeService,
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl FoodService for GatedService {
        fn list(&self) -> ServiceResult<Vec<Food>> {
            self.inner.list()
        }

        fn create(&self, food: &NewFood) -> ServiceResult<Food> {
            self.inner.create(food)
        }

        fn update(&self, id: u32, food: &Food) -> ServiceResult<Food> {
            self.inner.update(id, food)
        }

        fn delete(&self, id: u32) -> ServiceResult<()> {
            self.entered.lock().unwrap().send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
            self.inner.delete(id)
        }
    }

    #[test]
    fn test_concurrent_operations_on_same_food_are_rejected() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let dashboard = Arc::new(Dashboard::new(GatedService {
            inner: FakeService::with(vec![food(1, "Pizza"), food(2, "Burger")]),
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        }));
        dashboard.load().unwrap();

        let first = {
            let dashboard = Arc::clone(&dashboard);
            std::thread::spawn(move || dashboard.delete(2))
        };
        entered_rx.recv().unwrap();

        assert!(matches!(dashboard.delete(2), Err(SyncError::Busy(2))));
        assert!(matches!(
            dashboard.toggle_availability(2),
            Err(SyncError::Busy(2))
        ));
        dashboard.begin_edit_by_id(2).unwrap();
        assert!(matches!(
            dashboard.update(FoodInput::default()),
            Err(SyncError::Busy(2))
        ));

        // Other dishes are not blocked, and the menu is readable meanwhile
        assert!(!dashboard.toggle_availability(1).unwrap().available);
        assert_eq!(dashboard.foods().len(), 2);

        release_tx.send(()).unwrap();
        assert!(first.join().unwrap().unwrap().is_some());
        assert_eq!(dashboard.foods().len(), 1);
        assert!(!dashboard.is_edit_open());
    }

    #[test]
    fn test_update_never_writes_a_food_with_a_call_in_progress() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let inner = FakeService::with(vec![food(1, "Pizza"), food(2, "Burger")]);
        *inner.reply_id.lock().unwrap() = Some(2);
        let dashboard = Arc::new(Dashboard::new(GatedService {
            inner,
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        }));
        dashboard.load().unwrap();

        let deletion = {
            let dashboard = Arc::clone(&dashboard);
            std::thread::spawn(move || dashboard.delete(2))
        };
        entered_rx.recv().unwrap();

        dashboard.begin_edit_by_id(1).unwrap();
        let updated = dashboard
            .update(FoodInput {
                name: "Pizza Deluxe".to_string(),
                ..FoodInput::default()
            })
            .unwrap();
        assert_eq!(updated.id, 2);
        // Food 2 is being deleted, the answer must not overwrite it
        assert_eq!(dashboard.foods().get(2), Some(&food(2, "Burger")));
        assert_eq!(dashboard.foods().get(1), Some(&food(1, "Pizza")));

        release_tx.send(()).unwrap();
        assert!(deletion.join().unwrap().unwrap().is_some());
        assert_eq!(dashboard.foods().as_slice(), &[food(1, "Pizza")]);
    }
}
