//! The caller's side of a traversal.
//!
//! A [`Visitor`] wraps a callback which is invoked once per interval. The
//! callback returns `Ok(true)` to ask for the interval it was just given to be
//! subdivided one unit finer and traversed before its next sibling. Whether
//! that request is honored depends on the visitor's `sub_intervals` flag and
//! on whether a finer unit exists.
//!
//! The callback is handed a [`VisitScope`], which plays the role of `self`:
//! it derefs to the caller's state payload `S` and exposes the current depth.

use std::ops::{Deref, DerefMut};

use futures::future::{BoxFuture, FutureExt};

use crate::{error::VisitResult, interval::Interval};

/// The boxed callback stored in a [`Visitor`]
pub type VisitFn<S> =
    Box<dyn for<'a> FnMut(&'a mut VisitScope<S>, Interval) -> BoxFuture<'a, VisitResult> + Send>;

/// The mutable context a visit callback runs against.
#[derive(Debug)]
pub struct VisitScope<S> {
    depth: usize,
    sub_intervals: bool,
    state: S,
}

impl<S> VisitScope<S> {
    /// How many subdivisions enclose the interval being visited. Zero at the
    /// top level.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether a `true` return from the callback will be honored
    pub fn sub_intervals(&self) -> bool {
        self.sub_intervals
    }

    /// Turn subdivision on or off, taking effect from the current interval
    pub fn set_sub_intervals(&mut self, sub_intervals: bool) {
        self.sub_intervals = sub_intervals;
    }
}

impl<S> Deref for VisitScope<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.state
    }
}

impl<S> DerefMut for VisitScope<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.state
    }
}

/// A unit of work run against every interval of a traversal.
///
/// Reusable across any number of [`IntervalSet::accept`](crate::IntervalSet::accept)
/// calls; the depth always returns to zero once a traversal finishes.
pub struct Visitor<S = ()> {
    visit: VisitFn<S>,
    scope: VisitScope<S>,
}

impl<S: Send + Default + 'static> Visitor<S> {
    /// Construct from an async callback, starting from the default state.
    ///
    /// ```
    /// use calendar_intervals::Visitor;
    /// use futures::FutureExt;
    ///
    /// let visitor = Visitor::<u32>::new(|count, _interval| {
    ///     async move {
    ///         **count += 1;
    ///         Ok(false)
    ///     }
    ///     .boxed()
    /// });
    /// assert_eq!(visitor.depth(), 0);
    /// ```
    pub fn new<F>(visit: F) -> Self
    where
        F: for<'a> FnMut(&'a mut VisitScope<S>, Interval) -> BoxFuture<'a, VisitResult>
            + Send
            + 'static,
    {
        Self::with_state(S::default(), visit)
    }

    /// Construct from a synchronous callback, starting from the default state.
    pub fn from_fn<F>(visit: F) -> Self
    where
        F: FnMut(&mut VisitScope<S>, Interval) -> VisitResult + Send + 'static,
    {
        Self::from_fn_with_state(S::default(), visit)
    }
}

impl<S: Send + 'static> Visitor<S> {
    /// Construct from an async callback and an initial state payload.
    pub fn with_state<F>(state: S, visit: F) -> Self
    where
        F: for<'a> FnMut(&'a mut VisitScope<S>, Interval) -> BoxFuture<'a, VisitResult>
            + Send
            + 'static,
    {
        Self {
            visit: Box::new(visit),
            scope: VisitScope {
                depth: 0,
                sub_intervals: false,
                state,
            },
        }
    }

    /// Construct from a synchronous callback and an initial state payload.
    pub fn from_fn_with_state<F>(state: S, mut visit: F) -> Self
    where
        F: FnMut(&mut VisitScope<S>, Interval) -> VisitResult + Send + 'static,
    {
        Self::with_state(state, move |scope, interval| {
            futures::future::ready(visit(scope, interval)).boxed()
        })
    }
}

impl<S> Visitor<S> {
    /// Builder-style setter for the subdivision flag
    pub fn sub_intervals(mut self, sub_intervals: bool) -> Self {
        self.scope.sub_intervals = sub_intervals;
        self
    }

    /// Whether descent requests will be honored
    pub fn is_sub_intervals(&self) -> bool {
        self.scope.sub_intervals
    }

    /// Turn subdivision on or off between traversals
    pub fn set_sub_intervals(&mut self, sub_intervals: bool) {
        self.scope.sub_intervals = sub_intervals;
    }

    /// Current recursion depth of the traversal driving this visitor
    pub fn depth(&self) -> usize {
        self.scope.depth
    }

    /// The caller's state payload
    pub fn state(&self) -> &S {
        &self.scope.state
    }

    /// The caller's state payload, mutably
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.scope.state
    }

    /// Discard the callback and keep the accumulated state
    pub fn into_state(self) -> S {
        self.scope.state
    }

    /// Invoke the stored callback for one interval
    pub fn visit(&mut self, interval: Interval) -> BoxFuture<'_, VisitResult> {
        (self.visit)(&mut self.scope, interval)
    }

    /// Enter one level of subdivision. The level is left when the returned
    /// guard drops, however the descent ends.
    pub(crate) fn descend(&mut self) -> DepthGuard<'_, S> {
        self.scope.depth += 1;
        DepthGuard(self)
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for Visitor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visitor")
            .field("depth", &self.scope.depth)
            .field("sub_intervals", &self.scope.sub_intervals)
            .field("state", &self.scope.state)
            .finish()
    }
}

/// Holds a visitor one level deeper for as long as it lives.
pub(crate) struct DepthGuard<'v, S>(&'v mut Visitor<S>);

impl<'v, S> Deref for DepthGuard<'v, S> {
    type Target = Visitor<S>;

    fn deref(&self) -> &Visitor<S> {
        self.0
    }
}

impl<'v, S> DerefMut for DepthGuard<'v, S> {
    fn deref_mut(&mut self) -> &mut Visitor<S> {
        self.0
    }
}

impl<'v, S> Drop for DepthGuard<'v, S> {
    fn drop(&mut self) {
        self.0.scope.depth -= 1;
    }
}
