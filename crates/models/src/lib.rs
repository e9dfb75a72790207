pub mod booking;
pub mod db;
pub mod errors;
pub mod notification;
pub mod password_reset_token;
pub mod payment;
pub mod service;
pub mod user;
pub mod user_credentials;
pub mod vendor;
