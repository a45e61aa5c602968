pub mod health;
pub mod rbmq;
pub mod smtp;
