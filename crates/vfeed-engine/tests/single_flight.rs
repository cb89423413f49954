//! A second trigger while a fetch is outstanding must not start a second
//! transition.

use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::executor::block_on;
use futures::future::LocalBoxFuture;
use vfeed_core::{Direction, Edge, FeedConfig, FeedError, ItemRenderer, ObserverOptions, SourceError};
use vfeed_engine::{BoundaryObserver, ControllerCell, DataSource, SentinelId, Transition, WindowController};

struct Plain;

impl ItemRenderer<usize> for Plain {
    type Element = usize;

    fn create(&mut self, item: &usize) -> usize {
        *item
    }

    fn update(&mut self, element: &mut usize, item: &usize) {
        *element = *item;
    }

    fn measure(&self, _: &usize) -> f64 {
        24.0
    }
}

/// Source whose next load waits on a gate when one is armed.
#[derive(Default)]
struct Gated {
    gate: RefCell<Option<oneshot::Receiver<Result<(), String>>>>,
    loads: RefCell<Vec<(usize, usize)>>,
}

impl Gated {
    fn arm(&self) -> oneshot::Sender<Result<(), String>> {
        let (tx, rx) = oneshot::channel();
        *self.gate.borrow_mut() = Some(rx);
        tx
    }
}

impl DataSource<usize> for Gated {
    fn load(&self, start: usize, limit: usize) -> LocalBoxFuture<'_, Result<Vec<usize>, SourceError>> {
        self.loads.borrow_mut().push((start, limit));
        let gate = self.gate.borrow_mut().take();
        Box::pin(async move {
            if let Some(gate) = gate {
                match gate.await {
                    Ok(Ok(())) => {}
                    Ok(Err(reason)) => return Err(SourceError::from(reason)),
                    Err(_) => return Err(SourceError::from("gate dropped")),
                }
            }
            Ok((start..start + limit).collect())
        })
    }
}

#[derive(Default)]
struct Counter(u64);

impl BoundaryObserver for Counter {
    fn observe(&mut self, _: Edge, _: &ObserverOptions) -> SentinelId {
        self.0 += 1;
        SentinelId::new(self.0)
    }

    fn disconnect(&mut self, _: SentinelId) {}
}

type Shared = ControllerCell<usize, Rc<Gated>, Plain>;

fn full_cell() -> (Rc<Gated>, Shared) {
    let source = Rc::new(Gated::default());
    let controller =
        WindowController::new(FeedConfig::with_page_size(10), Rc::clone(&source), Plain)
            .expect("controller");
    let cell = ControllerCell::new(controller);
    block_on(cell.init(&mut Counter::default())).expect("first page");
    block_on(cell.trigger(Direction::Down)).expect("second page");
    assert_eq!(cell.with_controller(|c| c.window().range()), Some(0..20));
    (source, cell)
}

fn window(cell: &Shared) -> Option<std::ops::Range<usize>> {
    cell.with_controller(|c| c.window().range())
}

#[test]
fn second_trigger_is_deferred_and_replayed() {
    let (source, cell) = full_cell();
    let release = source.arm();

    let mut first = Box::pin(cell.on_visibility(Edge::Bottom, 1.0));
    assert!(first.as_mut().now_or_never().is_none(), "fetch is gated");
    assert!(cell.is_busy());
    assert!(cell.with_frame(|frame| frame.slots.len()).is_none());

    let second = block_on(cell.on_visibility(Edge::Bottom, 1.0)).expect("second");
    assert_eq!(second, Transition::Busy);
    assert_eq!(cell.deferred(), Some(Direction::Down));
    assert_eq!(source.loads.borrow().len(), 3, "no second fetch while busy");

    release.send(Ok(())).expect("release");
    let outcome = block_on(first).expect("first");
    assert_eq!(
        outcome,
        Transition::Recycled {
            direction: Direction::Down,
            moved: 10
        }
    );

    // The deferred DOWN ran after the first finished, in order.
    assert!(!cell.is_busy());
    assert_eq!(cell.deferred(), None);
    assert_eq!(window(&cell), Some(20..40));
    assert_eq!(
        *source.loads.borrow(),
        vec![(0, 10), (10, 10), (20, 10), (30, 10)]
    );
    assert_eq!(cell.with_controller(|c| c.transitions()), Some(4));
}

#[test]
fn deferred_direction_is_dropped_when_edge_left_view() {
    let (source, cell) = full_cell();
    let release = source.arm();

    let mut first = Box::pin(cell.on_visibility(Edge::Bottom, 1.0));
    assert!(first.as_mut().now_or_never().is_none());

    assert_eq!(
        block_on(cell.on_visibility(Edge::Bottom, 1.0)).expect("busy"),
        Transition::Busy
    );
    // The bottom sentinel scrolls away before the fetch resolves.
    assert_eq!(
        block_on(cell.on_visibility(Edge::Bottom, 0.0)).expect("hidden"),
        Transition::Ignored
    );

    release.send(Ok(())).expect("release");
    block_on(first).expect("first");
    assert_eq!(window(&cell), Some(10..30));
    assert_eq!(source.loads.borrow().len(), 3);
}

#[test]
fn latest_deferred_direction_wins() {
    let (source, cell) = full_cell();
    let release = source.arm();

    let mut first = Box::pin(cell.on_visibility(Edge::Bottom, 1.0));
    assert!(first.as_mut().now_or_never().is_none());

    block_on(cell.on_visibility(Edge::Bottom, 1.0)).expect("busy");
    block_on(cell.on_visibility(Edge::Top, 1.0)).expect("busy");
    assert_eq!(cell.deferred(), Some(Direction::Up));

    release.send(Ok(())).expect("release");
    block_on(first).expect("first");
    // DOWN to 10..30, then the deferred UP back to 0..20.
    assert_eq!(window(&cell), Some(0..20));
    assert_eq!(source.loads.borrow().last(), Some(&(0, 10)));
}

#[test]
fn failed_flight_clears_deferred() {
    let (source, cell) = full_cell();
    let release = source.arm();

    let mut first = Box::pin(cell.trigger(Direction::Down));
    assert!(first.as_mut().now_or_never().is_none());
    assert_eq!(
        block_on(cell.trigger(Direction::Down)).expect("busy"),
        Transition::Busy
    );

    release.send(Err("timeout".into())).expect("release");
    let err = block_on(first).unwrap_err();
    assert!(matches!(err, FeedError::Fetch { start: 20, .. }));
    assert_eq!(cell.deferred(), None);
    assert_eq!(window(&cell), Some(0..20));
    assert!(!cell.is_busy());
}

#[test]
fn dropped_flight_releases_the_controller() {
    let (source, cell) = full_cell();
    let _release = source.arm();

    let mut first = Box::pin(cell.trigger(Direction::Down));
    assert!(first.as_mut().now_or_never().is_none());
    assert!(cell.is_busy());
    drop(first);

    assert!(!cell.is_busy());
    assert_eq!(window(&cell), Some(0..20));
    let outcome = block_on(cell.trigger(Direction::Down)).expect("retry");
    assert!(outcome.mutated());
    assert_eq!(window(&cell), Some(10..30));
}

#[test]
fn replayed_fetch_failure_reaches_the_caller() {
    let (source, cell) = full_cell();
    let release = source.arm();

    let mut first = Box::pin(cell.on_visibility(Edge::Bottom, 1.0));
    assert!(first.as_mut().now_or_never().is_none());
    assert_eq!(
        block_on(cell.on_visibility(Edge::Bottom, 1.0)).expect("busy"),
        Transition::Busy
    );

    // The replayed load waits on a second gate that rejects.
    let reject = source.arm();
    reject.send(Err("offline".into())).expect("reject");
    release.send(Ok(())).expect("release");

    let err = block_on(first).unwrap_err();
    assert!(matches!(err, FeedError::Fetch { start: 30, limit: 10, .. }));
    assert!(err.is_retryable());

    // The first transition stays applied; the replay changed nothing.
    assert_eq!(window(&cell), Some(10..30));
    assert_eq!(cell.deferred(), None);
    assert!(!cell.is_busy());
    assert_eq!(
        *source.loads.borrow(),
        vec![(0, 10), (10, 10), (20, 10), (30, 10)]
    );
}

#[test]
fn direct_trigger_deferral_is_replayed() {
    let (source, cell) = full_cell();
    let release = source.arm();

    let mut first = Box::pin(cell.trigger(Direction::Down));
    assert!(first.as_mut().now_or_never().is_none());
    assert_eq!(
        block_on(cell.trigger(Direction::Down)).expect("busy"),
        Transition::Busy
    );
    assert_eq!(cell.deferred(), Some(Direction::Down));
    assert!(cell.is_visible(Edge::Bottom));

    release.send(Ok(())).expect("release");
    block_on(first).expect("first");
    assert_eq!(window(&cell), Some(20..40));
    assert_eq!(cell.deferred(), None);
    assert_eq!(
        *source.loads.borrow(),
        vec![(0, 10), (10, 10), (20, 10), (30, 10)]
    );
}

#[test]
fn direct_trigger_deferral_yields_to_a_hidden_report() {
    let (source, cell) = full_cell();
    let release = source.arm();

    let mut first = Box::pin(cell.trigger(Direction::Down));
    assert!(first.as_mut().now_or_never().is_none());
    block_on(cell.trigger(Direction::Down)).expect("busy");
    block_on(cell.on_visibility(Edge::Bottom, 0.0)).expect("hidden");

    release.send(Ok(())).expect("release");
    block_on(first).expect("first");
    assert_eq!(window(&cell), Some(10..30));
    assert_eq!(source.loads.borrow().len(), 3);
}
