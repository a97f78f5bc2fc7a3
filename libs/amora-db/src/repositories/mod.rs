pub mod match_repo;
pub mod message_repo;
pub mod notification_repo;
pub mod order_repo;
pub mod payment_repo;
pub mod subscription_repo;
pub mod user_repo;
