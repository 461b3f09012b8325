//! Headless linked-scroll screen.
//!
//! An outer vertical list holds two items: a horizontal pager of fixed height
//! and a vertically scrolling grid capped at the screen height. Scrolling the
//! grid forwards a damped share of every sample to the outer list, so the
//! whole screen scrolls as one surface. Nothing is drawn; the screen only
//! tracks scroll positions.

use linkscroll_core::{Offset, Runtime, RuntimeScheduler};
use linkscroll_foundation::{
    ForwardingConfig, ForwardingError, ForwardingScrollConnection, ForwardingStats,
    LazyListState, NestedScrollDispatcher, NestedScrollResult, NestedScrollSource, ScrollState,
    ScrollableRegion,
};
use std::rc::Rc;
use std::sync::Arc;

/// Screen geometry in logical pixels, plus the forwarding setup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenConfig {
    pub width: f32,
    pub height: f32,
    pub pager_height: f32,
    pub grid_item_count: usize,
    /// Adaptive columns: as many as fit at this minimum width.
    pub grid_min_cell_width: f32,
    pub grid_item_height: f32,
    pub forwarding: ForwardingConfig,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 412.0,
            height: 915.0,
            pager_height: 200.0,
            grid_item_count: 20,
            grid_min_cell_width: 190.0,
            grid_item_height: 300.0,
            forwarding: ForwardingConfig::default(),
        }
    }
}

impl ScreenConfig {
    pub fn grid_columns(&self) -> usize {
        if self.grid_min_cell_width <= 0.0 {
            return 1;
        }
        ((self.width / self.grid_min_cell_width).floor() as usize).max(1)
    }

    pub fn grid_content_height(&self) -> f32 {
        let rows = self.grid_item_count.div_ceil(self.grid_columns());
        rows as f32 * self.grid_item_height
    }

    /// The grid is as tall as its content, but never taller than the screen.
    pub fn grid_viewport_height(&self) -> f32 {
        self.grid_content_height().min(self.height)
    }

    fn grid_scroll_range(&self) -> f32 {
        self.grid_content_height() - self.grid_viewport_height()
    }

    fn list_item_extents(&self) -> Vec<f32> {
        vec![self.pager_height, self.grid_viewport_height()]
    }
}

/// Scroll positions after a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenSnapshot {
    pub outer_offset: f32,
    pub outer_first_visible_item: usize,
    pub grid_offset: f32,
}

pub struct LinkedScrollScreen {
    config: ScreenConfig,
    runtime: Runtime,
    outer: Rc<LazyListState>,
    grid: Rc<ScrollState>,
    dispatcher: NestedScrollDispatcher,
    forwarding: Rc<ForwardingScrollConnection>,
}

impl LinkedScrollScreen {
    pub fn new(
        config: ScreenConfig,
        scheduler: Arc<dyn RuntimeScheduler>,
    ) -> Result<Self, ForwardingError> {
        let runtime = Runtime::new(scheduler);
        let outer = Rc::new(LazyListState::new(config.list_item_extents(), config.height));
        let grid = Rc::new(ScrollState::new(0.0, config.grid_scroll_range()));
        let forwarding = Rc::new(config.forwarding.build(&outer, runtime.handle())?);
        let dispatcher = NestedScrollDispatcher::new(grid.clone());
        dispatcher.attach(forwarding.clone());
        log::info!(
            "screen {}x{}: grid {} columns, grid range {}, list range {}",
            config.width,
            config.height,
            config.grid_columns(),
            grid.max_value(),
            outer.max_scroll_offset()
        );
        Ok(Self {
            config,
            runtime,
            outer,
            grid,
            dispatcher,
            forwarding,
        })
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    /// Lays the screen out again for a new size. Both offsets are pulled back in
    /// range if their content no longer reaches that far.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.config.width = width;
        self.config.height = height;
        self.grid.set_max_value(self.config.grid_scroll_range());
        self.outer.set_item_extents(self.config.list_item_extents());
        self.outer.set_viewport_extent(height);
        log::info!(
            "resized to {width}x{height}: grid {} columns, list range {}",
            self.config.grid_columns(),
            self.outer.max_scroll_offset()
        );
    }

    /// Offers one vertical drag sample (gesture space) to the grid.
    pub fn drag_grid(&self, dy: f32) -> NestedScrollResult {
        self.dispatcher
            .dispatch_scroll(Offset::vertical(dy), NestedScrollSource::UserInput)
    }

    /// Runs forwarding tasks and list measure passes until both settle.
    pub fn frame(&self) -> ScreenSnapshot {
        loop {
            self.runtime.drain_ui();
            if self.outer.measure().resumed == 0 {
                break;
            }
        }
        self.runtime.drain_ui();
        self.snapshot()
    }

    pub fn snapshot(&self) -> ScreenSnapshot {
        ScreenSnapshot {
            outer_offset: self.outer.scroll_offset(),
            outer_first_visible_item: self.outer.first_visible_item_index(),
            grid_offset: self.grid.value(),
        }
    }

    pub fn forwarding_stats(&self) -> ForwardingStats {
        self.forwarding.stats()
    }

    /// Tears the outer list down; later forwarding becomes a silent no-op.
    pub fn dispose_outer(&self) {
        self.outer.dispose();
    }
}

impl std::fmt::Debug for LinkedScrollScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkedScrollScreen")
            .field("snapshot", &self.snapshot())
            .field("forwarding", &self.forwarding)
            .finish()
    }
}
