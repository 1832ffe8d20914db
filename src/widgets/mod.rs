pub mod segmented_progress_widget;

pub use segmented_progress_widget::SegmentedProgressWidget;
