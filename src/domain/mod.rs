pub mod cache_record;
pub mod notification;
pub mod race_page;
