pub mod lazy_list_state;

pub use lazy_list_state::{LazyListMeasureResult, LazyListScrollPosition, LazyListState};
