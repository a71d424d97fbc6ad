//! Page-Data Controller Tests
//!
//! Loaders are held pending with oneshot channels; time comes from a manual clock.

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;

    use futures::channel::oneshot;
    use futures::FutureExt;

    use crate::domain::{DomainError, DomainResult};
    use crate::page_data::{FetchOutcome, Loader, ManualClock, PageDataController, ResumeTrigger, Sink};

    type Reply = DomainResult<String>;

    /// Controller whose loader answers `"data:<identity>"` unless a pending reply is queued
    struct Harness {
        controller: PageDataController<String>,
        clock: Rc<ManualClock>,
        calls: Rc<Cell<usize>>,
        received: Rc<RefCell<Vec<String>>>,
        flags: Rc<RefCell<Vec<bool>>>,
        errors: Rc<RefCell<Vec<Option<String>>>>,
        queued: Rc<RefCell<VecDeque<oneshot::Receiver<Reply>>>>,
        failing: Rc<Cell<bool>>,
    }

    impl Harness {
        fn new() -> Self {
            let clock = Rc::new(ManualClock::new(0));
            let calls = Rc::new(Cell::new(0));
            let received = Rc::new(RefCell::new(Vec::new()));
            let flags = Rc::new(RefCell::new(Vec::new()));
            let errors = Rc::new(RefCell::new(Vec::new()));
            let queued: Rc<RefCell<VecDeque<oneshot::Receiver<Reply>>>> = Rc::new(RefCell::new(VecDeque::new()));
            let failing = Rc::new(Cell::new(false));

            let loader: Loader<String> = {
                let calls = calls.clone();
                let queued = queued.clone();
                let failing = failing.clone();
                Rc::new(move |identity: String| {
                    calls.set(calls.get() + 1);
                    let pending = queued.borrow_mut().pop_front();
                    let fail = failing.get();
                    async move {
                        if let Some(rx) = pending {
                            return rx.await.unwrap_or_else(|_| Err(DomainError::Internal("dropped".into())));
                        }
                        if fail {
                            return Err(DomainError::Network("offline".into()));
                        }
                        Ok(format!("data:{}", identity))
                    }
                    .boxed_local()
                })
            };
            let sink: Sink<String> = {
                let received = received.clone();
                Rc::new(move |data| received.borrow_mut().push(data))
            };
            let controller = {
                let flags = flags.clone();
                let errors = errors.clone();
                PageDataController::new("test", loader, sink)
                    .with_clock(clock.clone())
                    .on_first_load_change(move |value| flags.borrow_mut().push(value))
                    .on_error_change(move |error: Option<&DomainError>| {
                        errors.borrow_mut().push(error.map(|e| e.user_message()))
                    })
            };

            Self { controller, clock, calls, received, flags, errors, queued, failing }
        }

        /// Make the next loader call wait for the returned sender
        fn hold_next(&self) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.queued.borrow_mut().push_back(rx);
            tx
        }
    }

    fn user(id: &str) -> Option<String> {
        Some(id.to_string())
    }

    #[tokio::test]
    async fn test_mount_fetches_once_and_clears_first_load() {
        let h = Harness::new();
        assert!(h.controller.first_load());

        let outcome = h.controller.initialize(user("user-1"), vec![]).await;
        assert_eq!(outcome, FetchOutcome::Loaded);
        assert_eq!(h.calls.get(), 1);
        assert!(!h.controller.first_load());
        assert_eq!(*h.received.borrow(), vec!["data:user-1".to_string()]);
        assert_eq!(*h.flags.borrow(), vec![false]);
    }

    #[tokio::test]
    async fn test_no_identity_never_fetches() {
        let h = Harness::new();
        assert_eq!(h.controller.refetch().await, FetchOutcome::NoIdentity);
        assert_eq!(h.controller.initialize(None, vec![]).await, FetchOutcome::NoIdentity);
        assert_eq!(h.calls.get(), 0);
        assert!(h.controller.first_load());
    }

    #[tokio::test]
    async fn test_unchanged_inputs_do_not_refetch() {
        let h = Harness::new();
        h.controller.initialize(user("user-1"), vec!["2024-05".into()]).await;
        let again = h.controller.initialize(user("user-1"), vec!["2024-05".into()]).await;
        assert_eq!(again, FetchOutcome::Unchanged);
        assert_eq!(h.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_rapid_refetches_while_pending_call_loader_once() {
        let h = Harness::new();
        let reply = h.hold_next();

        let mut first = Box::pin(h.controller.initialize(user("user-1"), vec![]));
        assert!(futures::poll!(&mut first).is_pending());
        assert!(h.controller.is_loading());

        for _ in 0..5 {
            h.clock.advance(1_000);
            assert_eq!(h.controller.refetch().await, FetchOutcome::InProgress);
        }
        assert_eq!(h.calls.get(), 1);

        reply.send(Ok("late".into())).unwrap();
        assert_eq!(first.await, FetchOutcome::Loaded);
        assert!(!h.controller.is_loading());
        assert_eq!(*h.received.borrow(), vec!["late".to_string()]);
    }

    #[tokio::test]
    async fn test_refetch_inside_debounce_window_is_dropped() {
        let h = Harness::new();
        h.controller.initialize(user("user-1"), vec![]).await;

        h.clock.set(1_000);
        assert_eq!(h.controller.refetch().await, FetchOutcome::Loaded);
        h.clock.set(1_499);
        assert_eq!(h.controller.refetch().await, FetchOutcome::Debounced);
        h.clock.set(1_500);
        assert_eq!(h.controller.refetch().await, FetchOutcome::Loaded);
        assert_eq!(h.calls.get(), 3);
    }

    #[tokio::test]
    async fn test_double_resume_within_200ms_runs_once() {
        let h = Harness::new();
        h.controller.initialize(user("user-1"), vec![]).await;

        h.clock.set(10_000);
        let visible = h.controller.resume(ResumeTrigger::Visibility, futures::future::ready(())).await;
        h.clock.set(10_150);
        let focused = h.controller.resume(ResumeTrigger::Focus, futures::future::ready(())).await;

        assert_eq!(visible, FetchOutcome::Loaded);
        assert_eq!(focused, FetchOutcome::Debounced);
        assert_eq!(h.calls.get(), 2);
    }

    #[tokio::test]
    async fn test_identity_change_resets_first_load_and_fetches_once() {
        let h = Harness::new();
        h.controller.initialize(user("user-1"), vec![]).await;
        assert!(!h.controller.first_load());

        let reply = h.hold_next();
        let mut switch = Box::pin(h.controller.initialize(user("user-2"), vec![]));
        assert!(futures::poll!(&mut switch).is_pending());
        assert!(h.controller.first_load());

        reply.send(Ok("data:user-2".into())).unwrap();
        assert_eq!(switch.await, FetchOutcome::Loaded);
        assert_eq!(h.calls.get(), 2);
        assert!(!h.controller.first_load());
        assert_eq!(*h.flags.borrow(), vec![false, true, false]);
    }

    #[tokio::test]
    async fn test_dependency_change_starts_new_session() {
        let h = Harness::new();
        h.controller.initialize(user("user-1"), vec!["2024-05".into()]).await;
        let outcome = h.controller.initialize(user("user-1"), vec!["2024-06".into()]).await;
        assert_eq!(outcome, FetchOutcome::Loaded);
        assert_eq!(h.calls.get(), 2);
    }

    #[tokio::test]
    async fn test_superseded_session_result_is_discarded() {
        let h = Harness::new();
        let stale = h.hold_next();

        let mut old = Box::pin(h.controller.initialize(user("user-1"), vec![]));
        assert!(futures::poll!(&mut old).is_pending());

        assert_eq!(h.controller.initialize(user("user-2"), vec![]).await, FetchOutcome::Loaded);
        stale.send(Ok("data:user-1".into())).unwrap();
        assert_eq!(old.await, FetchOutcome::Discarded);

        assert_eq!(*h.received.borrow(), vec!["data:user-2".to_string()]);
        assert!(!h.controller.first_load());
        assert!(!h.controller.is_loading());
    }

    #[tokio::test]
    async fn test_failure_clears_first_load() {
        let h = Harness::new();
        h.failing.set(true);

        let outcome = h.controller.initialize(user("user-1"), vec![]).await;
        assert_eq!(outcome, FetchOutcome::Failed);
        assert!(!h.controller.first_load());
        assert!(!h.controller.is_loading());
        assert!(h.received.borrow().is_empty());

        // Refetch after failure stays false and can succeed
        h.failing.set(false);
        h.clock.set(1_000);
        assert_eq!(h.controller.refetch().await, FetchOutcome::Loaded);
        assert_eq!(*h.flags.borrow(), vec![false]);
    }

    #[tokio::test]
    async fn test_unmount_discards_in_flight_result() {
        let h = Harness::new();
        let reply = h.hold_next();

        let mut pending = Box::pin(h.controller.initialize(user("user-1"), vec![]));
        assert!(futures::poll!(&mut pending).is_pending());
        h.controller.unmount();

        reply.send(Ok("data:user-1".into())).unwrap();
        assert_eq!(pending.await, FetchOutcome::Discarded);
        assert!(h.received.borrow().is_empty());
        assert!(!h.controller.first_load());
    }

    #[tokio::test]
    async fn test_losing_identity_drops_late_result() {
        let h = Harness::new();
        let reply = h.hold_next();

        let mut pending = Box::pin(h.controller.initialize(user("user-1"), vec![]));
        assert!(futures::poll!(&mut pending).is_pending());
        assert_eq!(h.controller.initialize(None, vec![]).await, FetchOutcome::NoIdentity);

        reply.send(Ok("data:user-1".into())).unwrap();
        assert_eq!(pending.await, FetchOutcome::Discarded);
        assert!(h.received.borrow().is_empty());
        assert_eq!(h.controller.refetch().await, FetchOutcome::NoIdentity);
    }

    #[tokio::test]
    async fn test_failure_is_reported_and_cleared_by_next_load() {
        let h = Harness::new();
        h.failing.set(true);

        assert_eq!(h.controller.initialize(user("user-1"), vec![]).await, FetchOutcome::Failed);
        assert_eq!(*h.errors.borrow(), vec![Some("Error de conexión. Inténtalo de nuevo.".to_string())]);

        h.failing.set(false);
        h.clock.set(1_000);
        assert_eq!(h.controller.refetch().await, FetchOutcome::Loaded);
        assert_eq!(h.errors.borrow().last(), Some(&None));
    }

    #[tokio::test]
    async fn test_failure_after_unmount_is_not_reported() {
        let h = Harness::new();
        let reply = h.hold_next();

        let mut pending = Box::pin(h.controller.initialize(user("user-1"), vec![]));
        assert!(futures::poll!(&mut pending).is_pending());
        h.controller.unmount();

        reply.send(Err(DomainError::Timeout(30))).unwrap();
        assert_eq!(pending.await, FetchOutcome::Failed);
        assert!(h.errors.borrow().is_empty());
    }
}
