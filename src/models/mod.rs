pub mod action;
pub mod health;
pub mod message;
pub mod notification;
pub mod registration;
pub mod response;
pub mod status;
pub mod validation;
