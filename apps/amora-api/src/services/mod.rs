pub mod billing_service;
pub mod chat_service;
pub mod match_service;
pub mod notification_service;
pub mod payment;
pub mod subscription_service;
pub mod user_service;
