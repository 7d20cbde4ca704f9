//! Snapshot resolution core: latest-record lookup, equipment join and
//! display projection

pub mod display;
pub mod record;
pub mod timeline;
pub mod view;
