use std::{cell::RefCell, rc::Rc};

use ferry::{Dispatcher, DrainReport, EnqueueError, Enqueuer};

use _validator::Validator;

#[test]
fn empty_drain_is_a_no_op() {
	let dispatcher = Dispatcher::new();

	assert_eq!(dispatcher.drain(), DrainReport::default());
	assert!(dispatcher.drain().is_empty());
	assert!(dispatcher.is_empty());
}

#[test]
fn nothing_runs_before_drain() {
	static V: Validator<&str> = Validator::new();
	let dispatcher = Dispatcher::new();

	dispatcher.enqueue(|x| V.push(x), "x");
	dispatcher.enqueuer().enqueue(|y| V.push(y), "y").unwrap();
	V.expect([]);
	assert_eq!(dispatcher.len(), 2);

	let report = dispatcher.drain();
	assert_eq!((report.ran, report.panicked), (2, 0));
	V.expect(["x", "y"]);
	assert!(dispatcher.is_empty());
}

#[test]
fn absent_arguments_are_passed_through() {
	static V: Validator<Option<&str>> = Validator::new();
	let dispatcher = Dispatcher::new();
	let enqueuer = dispatcher.enqueuer();

	enqueuer.enqueue(|argument| V.push(argument), None).unwrap();
	enqueuer.enqueue(|argument| V.push(argument), Some("present")).unwrap();
	enqueuer.enqueue(|()| V.push(Some("unit")), ()).unwrap();

	let _ = dispatcher.drain();
	V.expect([None, Some("present"), Some("unit")]);
}

#[test]
fn chained_work_waits_for_the_next_drain() {
	static V: Validator<(&str, &str)> = Validator::new();
	let dispatcher = Dispatcher::new();
	let enqueuer = dispatcher.enqueuer();

	dispatcher.enqueue(|x| V.push(("A", x)), "x");
	dispatcher.enqueue(
		{
			let enqueuer = enqueuer.clone();
			move |y| {
				V.push(("B", y));
				enqueuer.enqueue(|w| V.push(("D", w)), "w").unwrap();
			}
		},
		"y",
	);

	let report = dispatcher.drain();
	assert_eq!(report.ran, 2);
	V.expect([("A", "x"), ("B", "y")]);
	assert_eq!(dispatcher.len(), 1);

	let report = dispatcher.drain();
	assert_eq!(report.ran, 1);
	V.expect([("D", "w")]);
	assert!(dispatcher.is_empty());
	assert!(dispatcher.drain().is_empty());
}

#[test]
fn self_requeueing_work_runs_once_per_drain() {
	static V: Validator<u32> = Validator::new();

	fn step(enqueuer: Enqueuer) -> impl 'static + Send + FnOnce(u32) {
		move |n| {
			V.push(n);
			if n < 3 {
				enqueuer.clone().enqueue(step(enqueuer), n + 1).unwrap();
			}
		}
	}

	let dispatcher = Dispatcher::new();
	dispatcher.enqueue(step(dispatcher.enqueuer()), 1);

	for expected in 1..=3 {
		assert_eq!(dispatcher.drain().ran, 1);
		assert_eq!(V.take(), [expected]);
	}
	assert!(dispatcher.drain().is_empty());
	V.expect([]);
}

#[test]
fn re_entrant_drain_is_ignored() {
	static V: Validator<&str> = Validator::new();
	thread_local! {
		static OWNER: RefCell<Option<Rc<Dispatcher>>> = const { RefCell::new(None) };
	}

	// Callbacks must be `Send`, so reach the dispatcher through a thread-local.
	let dispatcher = Rc::new(Dispatcher::new());
	OWNER.with(|owner| *owner.borrow_mut() = Some(Rc::clone(&dispatcher)));

	dispatcher.enqueue(
		|()| {
			V.push("outer");
			let nested = OWNER.with(|owner| owner.borrow().as_ref().map(|d| d.drain()));
			assert_eq!(nested, Some(DrainReport::default()));
		},
		(),
	);
	dispatcher.enqueue(|()| V.push("second"), ());

	assert_eq!(dispatcher.drain().ran, 2);
	V.expect(["outer", "second"]);

	OWNER.with(|owner| owner.borrow_mut().take());
}

#[test]
fn absent_callback_is_rejected_immediately() {
	static V: Validator<&str> = Validator::new();
	let dispatcher = Dispatcher::new();
	let enqueuer = dispatcher.enqueuer();

	let callback: Option<fn(&'static str)> = None;
	assert_eq!(enqueuer.try_enqueue(callback, "x"), Err(EnqueueError::InvalidAction));
	assert!(dispatcher.is_empty());

	assert_eq!(enqueuer.try_enqueue(Some(|y: &'static str| V.push(y)), "y"), Ok(()));
	let _ = dispatcher.drain();
	V.expect(["y"]);
}

#[test]
fn dropping_the_dispatcher_closes_its_enqueuers() {
	static V: Validator<&str> = Validator::new();
	let dispatcher = Dispatcher::new();
	let enqueuer = dispatcher.enqueuer();

	enqueuer.enqueue(|x| V.push(x), "abandoned").unwrap();
	assert!(!enqueuer.is_closed());
	drop(dispatcher);

	assert!(enqueuer.is_closed());
	assert_eq!(enqueuer.enqueue(|x| V.push(x), "late"), Err(EnqueueError::Closed));
	V.expect([]);
}

#[test]
fn dropping_the_dispatcher_drops_pending_arguments() {
	use std::sync::{Arc, Weak};

	let dispatcher = Dispatcher::new();
	let payload = Arc::new(());
	let weak: Weak<()> = Arc::downgrade(&payload);

	dispatcher.enqueue(|_payload: Arc<()>| unreachable!(), payload);
	assert!(weak.upgrade().is_some());

	drop(dispatcher);
	assert!(weak.upgrade().is_none());
}
