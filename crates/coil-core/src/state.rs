use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::runtime::RuntimeHandle;

struct WatcherEntry {
    id: u64,
    callback: Rc<dyn Fn() + 'static>,
}

struct StateCell<T: Clone + 'static> {
    value: RefCell<T>,
    runtime: RuntimeHandle,
    watchers: RefCell<Vec<WatcherEntry>>,
    next_watcher_id: Cell<u64>,
}

impl<T: Clone + 'static> StateCell<T> {
    fn notify_watchers(&self) {
        // Snapshot the callbacks first: a watcher may add or remove
        // watchers on this very cell while it runs.
        let callbacks: SmallVec<[Rc<dyn Fn() + 'static>; 4]> = self
            .watchers
            .borrow()
            .iter()
            .map(|entry| Rc::clone(&entry.callback))
            .collect();
        for callback in callbacks {
            callback();
        }
    }
}

/// Observable cell owned by the runtime thread.
///
/// Reads go through [`MutableState::get`] / [`MutableState::with`];
/// writes notify watchers synchronously and request a new frame from the
/// runtime so the host gets a chance to re-render.
pub struct MutableState<T: Clone + 'static> {
    inner: Rc<StateCell<T>>,
}

/// Read-only view of a [`MutableState`]. Cloning is cheap; all clones
/// observe the same live cell.
pub struct State<T: Clone + 'static> {
    inner: Rc<StateCell<T>>,
}

impl<T: Clone + 'static> Clone for MutableState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> MutableState<T> {
    pub fn with_runtime(value: T, runtime: RuntimeHandle) -> Self {
        Self {
            inner: Rc::new(StateCell {
                value: RefCell::new(value),
                runtime,
                watchers: RefCell::new(Vec::new()),
                next_watcher_id: Cell::new(1),
            }),
        }
    }

    pub fn as_state(&self) -> State<T> {
        State {
            inner: Rc::clone(&self.inner),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    pub fn value(&self) -> T {
        self.with(|value| value.clone())
    }

    pub fn get(&self) -> T {
        self.value()
    }

    pub fn set_value(&self, value: T) {
        self.inner.runtime.assert_ui_thread();
        *self.inner.value.borrow_mut() = value;
        self.inner.notify_watchers();
        self.inner.runtime.schedule();
    }

    pub fn set(&self, value: T) {
        self.set_value(value);
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.inner.runtime.assert_ui_thread();
        let result = f(&mut self.inner.value.borrow_mut());
        self.inner.notify_watchers();
        self.inner.runtime.schedule();
        result
    }

    pub fn watch(&self, callback: impl Fn() + 'static) -> WatchRegistration {
        self.as_state().watch(callback)
    }
}

impl<T: Clone + 'static> State<T> {
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    pub fn value(&self) -> T {
        self.with(|value| value.clone())
    }

    pub fn get(&self) -> T {
        self.value()
    }

    /// Subscribes to writes. The callback runs synchronously after every
    /// write until the returned registration is cancelled or dropped.
    pub fn watch(&self, callback: impl Fn() + 'static) -> WatchRegistration {
        let id = self.inner.next_watcher_id.get();
        self.inner.next_watcher_id.set(id + 1);
        self.inner.watchers.borrow_mut().push(WatcherEntry {
            id,
            callback: Rc::new(callback),
        });

        let cell = Rc::downgrade(&self.inner);
        WatchRegistration {
            cancel: Some(Box::new(move || {
                if let Some(cell) = cell.upgrade() {
                    cell.watchers.borrow_mut().retain(|entry| entry.id != id);
                }
            })),
        }
    }

    #[cfg(test)]
    pub(crate) fn watcher_count(&self) -> usize {
        self.inner.watchers.borrow().len()
    }
}

/// Keeps a watcher alive; dropping it unsubscribes.
pub struct WatchRegistration {
    cancel: Option<Box<dyn FnOnce() + 'static>>,
}

impl WatchRegistration {
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for WatchRegistration {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl<T: fmt::Debug + Clone + 'static> fmt::Debug for MutableState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|value| f.debug_struct("MutableState").field("value", value).finish())
    }
}

impl<T: fmt::Debug + Clone + 'static> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|value| f.debug_struct("State").field("value", value).finish())
    }
}
