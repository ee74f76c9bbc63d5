pub mod auth;
pub mod groups;
pub mod items;
pub mod lists;
pub mod messages;
pub mod schedules;
pub mod users;
