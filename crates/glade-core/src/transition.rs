//! Three-slot transition state shared by every manager.
//!
//! ```text
//!   request(x)          begin()                 complete()
//!  target = x  ──▶  into = target (if idle  ──▶  current = into
//!                   and current != target)       into = None
//! ```
//!
//! Only one transition runs at a time. A `request` made while a transition
//! is in flight just overwrites `target`; it is picked up by the next
//! `begin` after the current transition completes.

/// `current` / `transitioning_into` / `target` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<S> {
    current: S,
    into: Option<S>,
    target: S,
}

impl<S: Copy + PartialEq> Transition<S> {
    /// Start settled in `initial`.
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            into: None,
            target: initial,
        }
    }

    /// State stably output before any in-flight transition.
    #[inline]
    pub fn current(&self) -> S {
        self.current
    }

    /// Most recently requested state.
    #[inline]
    pub fn target(&self) -> S {
        self.target
    }

    /// State being transitioned into, if a transition is in flight.
    #[inline]
    pub fn transitioning_into(&self) -> Option<S> {
        self.into
    }

    /// Whether a transition is in flight.
    #[inline]
    pub fn is_transitioning(&self) -> bool {
        self.into.is_some()
    }

    /// Whether the settled state already matches the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.into.is_none() && self.current == self.target
    }

    /// Set the desired state.
    #[inline]
    pub fn request(&mut self, target: S) {
        self.target = target;
    }

    /// Latch the target if idle and different from `current`.
    ///
    /// Returns the state now being transitioned into, or `None` if nothing
    /// started.
    pub fn begin(&mut self) -> Option<S> {
        if self.into.is_some() || self.current == self.target {
            return None;
        }
        self.into = Some(self.target);
        self.into
    }

    /// Finish the in-flight transition, making it `current`.
    ///
    /// Returns the `(from, to)` pair, or `None` when idle.
    pub fn complete(&mut self) -> Option<(S, S)> {
        let to = self.into.take()?;
        let from = self.current;
        self.current = to;
        Some((from, to))
    }

    /// Abandon the in-flight transition, keeping `current`.
    pub fn abort(&mut self) {
        self.into = None;
    }

    /// Jump straight to `state` with no transition in flight.
    pub fn settle(&mut self, state: S) {
        self.current = state;
        self.target = state;
        self.into = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Day,
        Night,
    }

    #[test]
    fn begin_requires_different_target() {
        let mut t = Transition::new(Light::Day);
        assert_eq!(t.begin(), None);
        t.request(Light::Night);
        assert_eq!(t.begin(), Some(Light::Night));
        assert!(t.is_transitioning());
    }

    #[test]
    fn single_transition_at_a_time() {
        let mut t = Transition::new(0u8);
        t.request(1);
        t.begin();
        t.request(2);
        assert_eq!(t.begin(), None, "second begin must wait");
        assert_eq!(t.transitioning_into(), Some(1));

        assert_eq!(t.complete(), Some((0, 1)));
        assert_eq!(t.current(), 1);
        assert_eq!(t.begin(), Some(2), "queued target picked up afterwards");
    }

    #[test]
    fn complete_when_idle_is_none() {
        let mut t = Transition::new(Light::Day);
        assert_eq!(t.complete(), None);
        assert!(t.is_settled());
    }

    #[test]
    fn settle_clears_in_flight() {
        let mut t = Transition::new(Light::Day);
        t.request(Light::Night);
        t.begin();
        t.settle(Light::Day);
        assert!(t.is_settled());
        assert_eq!(t.transitioning_into(), None);
    }
}
