//! Property-based tests for random scroll walks through the simulated host.
//!
//! Every step scrolls by a random delta and settles. After each step:
//!
//! 1. The pool never holds more than `2 * page_size` slots, and no element
//!    is created past that bound.
//! 2. Slots are laid out top to bottom in ascending logical order.
//! 3. The rows inside the viewport are consecutive and belong to the window.
//! 4. The window stays inside the dataset and the viewport never scrolls
//!    above the top.

use futures::executor::block_on;
use proptest::prelude::*;
use vfeed_core::FeedConfig;
use vfeed_engine::WindowController;
use vfeed_sim::{FeedItem, HtmlRenderer, MemoryDb, ScrollDriver, Viewport, feed_item};

type Driver<'a> = ScrollDriver<FeedItem, &'a MemoryDb<FeedItem>, HtmlRenderer>;

fn mounted(db: &MemoryDb<FeedItem>, page: usize, margin: f64, height: f64) -> Driver<'_> {
    let controller = WindowController::new(
        FeedConfig::with_page_size(page).item_margin(margin),
        db,
        HtmlRenderer::default(),
    )
    .expect("controller");
    let mut driver = ScrollDriver::new(controller, Viewport::new(height));
    block_on(driver.mount()).expect("mount");
    driver
}

// ═══════════════════════════════════════════════════════════════════════
// Random scroll walks
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn scroll_walk_keeps_a_bounded_ordered_pool(
        items in 0usize..300,
        page in 2usize..12,
        margin in 0.0f64..16.0,
        height in 200.0f64..1200.0,
        deltas in proptest::collection::vec(-1500.0f64..1500.0, 1..40),
    ) {
        let db = MemoryDb::new(items, page, feed_item);
        let mut driver = mounted(&db, page, margin, height);
        let capacity = page * 2;

        for delta in deltas {
            block_on(driver.scroll_by(delta)).expect("scroll");

            let (len, created, start, end) = driver
                .cell()
                .with_controller(|c| {
                    (
                        c.pool().len(),
                        c.renderer().created(),
                        c.window().start(),
                        c.window().end(),
                    )
                })
                .expect("idle");
            prop_assert!(len <= capacity);
            prop_assert!(created <= capacity);
            prop_assert_eq!(end - start, len);
            prop_assert!(end <= items);

            let layout: Vec<(usize, f64)> = driver
                .cell()
                .with_frame(|f| f.slots.iter().map(|s| (s.logical_order, s.offset_y)).collect())
                .expect("idle");
            prop_assert!(layout.windows(2).all(|w| w[1].0 == w[0].0 + 1 && w[1].1 > w[0].1));

            let visible = driver.visible_orders();
            prop_assert!(visible.windows(2).all(|w| w[1] == w[0] + 1), "gap in {:?}", visible);
            prop_assert!(visible.iter().all(|order| (start..end).contains(order)));
            prop_assert!(driver.viewport().scroll_top() >= 0.0);
        }

        let elements = driver.unmount();
        prop_assert!(elements.len() <= capacity);
    }
}
