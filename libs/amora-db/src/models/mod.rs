pub mod matching;
pub mod message;
pub mod notification;
pub mod order;
pub mod payment;
pub mod subscription;
pub mod user;
