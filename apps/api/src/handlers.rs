pub mod content;
pub mod health;
pub mod roles;
pub mod users;
