use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::services::billing_service::BillingService;
use crate::services::chat_service::ChatService;
use crate::services::match_service::MatchService;
use crate::services::notification_service::NotificationService;
use crate::services::payment::PaymentGateway;
use crate::services::subscription_service::SubscriptionService;
use crate::services::user_service::UserService;
use crate::ws::ChatHub;

/// Shared application state. Built once in main from an explicitly
/// constructed pool and handed to the router; services receive the resources
/// they need through constructors rather than globals.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: AppConfig,
    pub gateway: Arc<dyn PaymentGateway>,
    pub hub: ChatHub,
    pub users: UserService,
    pub matches: MatchService,
    pub chat: ChatService,
    pub notifications: NotificationService,
    pub billing: BillingService,
    pub subscriptions: SubscriptionService,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig, gateway: Arc<dyn PaymentGateway>) -> Self {
        let hub = ChatHub::new();
        Self {
            users: UserService::new(pool.clone()),
            matches: MatchService::new(pool.clone()),
            chat: ChatService::new(pool.clone(), hub.clone()),
            notifications: NotificationService::new(pool.clone()),
            billing: BillingService::new(pool.clone(), gateway.clone()),
            subscriptions: SubscriptionService::new(pool.clone(), gateway.clone()),
            hub,
            pool,
            config,
            gateway,
        }
    }
}
