//! Explicit state holder with synchronous change notification.
//!
//! All mutation happens on the UI thread inside a single interaction or
//! data-arrival callback, so listeners run inline and see the new value.

use std::fmt;

type Listener<T> = Box<dyn FnMut(&T)>;

/// Handle returned by [`Observable::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct Observable<T> {
    value: T,
    listeners: Vec<(SubscriptionId, Listener<T>)>,
    next_id: u64,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value and notify every listener.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.notify();
    }

    /// Mutate in place and notify every listener.
    pub fn update(&mut self, apply: impl FnOnce(&mut T)) {
        apply(&mut self.value);
        self.notify();
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(candidate, _)| *candidate != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener(&self.value);
        }
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn listeners_see_new_value_until_unsubscribed() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut state = Observable::new(1);
        let sink = Rc::clone(&seen);
        let id = state.subscribe(move |value| sink.borrow_mut().push(*value));

        state.set(2);
        state.update(|value| *value += 10);
        assert_eq!(*state.get(), 12);
        assert!(state.unsubscribe(id));
        state.set(3);

        assert_eq!(*seen.borrow(), vec![2, 12]);
        assert!(!state.unsubscribe(id));
    }
}
