pub mod chat;
pub mod doctor;
pub mod graph;
pub mod notifications;
pub mod posts;
pub mod profile;
pub mod tour;
