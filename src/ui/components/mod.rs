pub mod dashboard;
pub mod drill_list;
pub mod progress_bar;
pub mod stats_sidebar;
pub mod tier_list;
pub mod typing_area;
