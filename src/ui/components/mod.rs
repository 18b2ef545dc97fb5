pub mod chart;
pub mod menu;
pub mod progress_bar;
pub mod question_card;
pub mod question_stats_popup;
pub mod recommendation_list;
pub mod stats_dashboard;
