//! Shared fixture for the engine integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use url::Url;

use mesa_core::{
    DiningTable, Money, NewOrderItem, Order, OrderType, Product, Shift, Staff, StaffRole,
    TableStatus,
};
use mesa_db::{Database, DbConfig, DbError};
use mesa_engine::{EngineResult, OrderService, TableRelease};
use mesa_gateway::{
    AccessToken, GatewayError, GatewayResult, PaymentGateway, PaymentRequest, SubmittedOrder,
};

pub const CASHIER: &str = "staff-cashier";
pub const WAITER: &str = "staff-waiter";
pub const KITCHEN: &str = "staff-kitchen";
pub const MANAGER: &str = "staff-manager";
pub const RETIRED: &str = "staff-retired";

pub const SHIFT: &str = "shift-1";
pub const TABLE: &str = "table-1";

pub const CHICKEN: &str = "prod-chicken";
pub const JUICE: &str = "prod-juice";
pub const SEASONAL: &str = "prod-seasonal";

pub const CHICKEN_PRICE: Money = Money::from_units(30_000);
pub const JUICE_PRICE: Money = Money::from_units(20_000);

pub struct Fixture {
    pub db: Database,
    pub engine: OrderService,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_config(DbConfig::in_memory()).await
    }

    pub async fn with_config(config: DbConfig) -> Self {
        let db = Database::new(config).await.unwrap();
        seed(&db).await;
        let engine = OrderService::new(db.clone());
        Fixture { db, engine }
    }

    pub async fn takeaway(&self) -> Order {
        self.engine
            .create_order(CASHIER, OrderType::Takeaway, None)
            .await
            .unwrap()
    }

    /// Takeaway order holding one chicken and one juice (50,000).
    pub async fn takeaway_with_items(&self) -> Order {
        let order = self.takeaway().await;
        self.add(&order.id, CHICKEN, 1).await;
        self.add(&order.id, JUICE, 1).await
    }

    pub async fn add(&self, order_id: &str, product_id: &str, quantity: i64) -> Order {
        self.engine
            .add_item(order_id, NewOrderItem::new(product_id, quantity), CASHIER)
            .await
            .unwrap()
            .order
    }

    pub async fn close_shift(&self) {
        self.db.shifts().close(SHIFT, Utc::now()).await.unwrap();
    }

    pub async fn table(&self) -> DiningTable {
        self.db.tables().get_by_id(TABLE).await.unwrap().unwrap()
    }
}

async fn seed(db: &Database) {
    for (id, role, is_active) in [
        (CASHIER, StaffRole::Cashier, true),
        (WAITER, StaffRole::Waiter, true),
        (KITCHEN, StaffRole::Kitchen, true),
        (MANAGER, StaffRole::Manager, true),
        (RETIRED, StaffRole::Cashier, false),
    ] {
        db.staff()
            .insert(&Staff {
                id: id.to_string(),
                name: id.to_string(),
                role,
                is_active,
            })
            .await
            .unwrap();
    }

    db.shifts()
        .open(&Shift {
            id: SHIFT.to_string(),
            staff_id: CASHIER.to_string(),
            terminal_id: "till-1".to_string(),
            start_time: Utc::now(),
            end_time: None,
        })
        .await
        .unwrap();

    // The waiter works the same floor on a shift of their own
    db.shifts()
        .open(&Shift {
            id: "shift-waiter".to_string(),
            staff_id: WAITER.to_string(),
            terminal_id: "till-1".to_string(),
            start_time: Utc::now(),
            end_time: None,
        })
        .await
        .unwrap();

    let now = Utc::now();
    for (id, name, price, is_active) in [
        (CHICKEN, "Chicken Platter", CHICKEN_PRICE, true),
        (JUICE, "Passion Juice", JUICE_PRICE, true),
        (SEASONAL, "Mango Sorbet", Money::from_units(8_000), false),
    ] {
        db.products()
            .insert(&Product {
                id: id.to_string(),
                name: name.to_string(),
                price,
                is_active,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    db.tables()
        .insert(&DiningTable {
            id: TABLE.to_string(),
            label: "T1".to_string(),
            status: TableStatus::Available,
            current_order_id: None,
        })
        .await
        .unwrap();
}

// =============================================================================
// Doubles
// =============================================================================

/// Gateway that answers from memory and remembers what it was sent.
#[derive(Default)]
pub struct RecordingGateway {
    pub requests: Mutex<Vec<PaymentRequest>>,
    pub token_calls: AtomicUsize,
    pub reject_submit: bool,
}

impl RecordingGateway {
    pub fn rejecting() -> Self {
        RecordingGateway {
            reject_submit: true,
            ..Default::default()
        }
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn request_token(&self) -> GatewayResult<AccessToken> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        Ok(AccessToken::new("test-token"))
    }

    async fn submit_order(
        &self,
        token: &AccessToken,
        request: &PaymentRequest,
    ) -> GatewayResult<SubmittedOrder> {
        assert_eq!(token.expose(), "test-token");
        self.requests.lock().unwrap().push(request.clone());

        if self.reject_submit {
            return Err(GatewayError::Rejected {
                endpoint: "SubmitOrderRequest",
                code: "invalid_amount".to_string(),
                message: "amount not accepted".to_string(),
            });
        }

        Ok(SubmittedOrder {
            tracking_id: format!("trk-{}", request.order_id),
            merchant_reference: request.order_id.clone(),
            redirect_url: Url::parse("https://pay.example.com/checkout?ref=abc").unwrap(),
        })
    }
}

/// Table release that always fails.
pub struct FailingTableRelease;

#[async_trait]
impl TableRelease for FailingTableRelease {
    async fn release_table_for_order(&self, _order_id: &str) -> EngineResult<()> {
        Err(DbError::ConnectionFailed("floor plan offline".to_string()).into())
    }
}

pub fn gateway_engine(fixture: &Fixture, gateway: Arc<RecordingGateway>) -> OrderService {
    fixture.engine.clone().with_gateway(gateway)
}
