pub mod charts;
pub mod kpi;
pub mod map;
pub mod popup;
pub mod status;
pub mod tables;
