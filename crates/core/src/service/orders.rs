//! Order lifecycle service.
//!
//! The one genuine trust boundary in the system lives here: unit prices are
//! always recomputed from the current catalog, and anything the client said
//! about prices is discarded. Resolution runs from scratch on every order
//! creation and is never cached.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::error::OrderError;
use crate::model::{
    Actor, CreateOrder, FlavorSelection, NewAuditEntry, Order, OrderFilter, OrderItem,
    OrderItemRequest, OrderStats, ResolvedItems,
};
use crate::notify::Notifier;
use crate::order_number::{MAX_GENERATION_ATTEMPTS, OrderNumberGenerator};
use crate::store::{CatalogStore, OrderStore};
use crate::types::{AdminUserId, AuditAction, Money, OrderId, OrderStatus, PaymentStatus};

/// Order pricing, creation, transitions, and read-side queries.
pub struct OrderService {
    catalog: Arc<dyn CatalogStore>,
    orders: Arc<dyn OrderStore>,
    notifier: Arc<dyn Notifier>,
    numbers: OrderNumberGenerator,
    strict_transitions: bool,
}

impl OrderService {
    /// Assemble the service from its collaborators.
    ///
    /// `strict_transitions` turns on transition-graph validation for status
    /// and payment updates. It defaults to off everywhere, matching the
    /// permissive behavior staff rely on for manual corrections.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        orders: Arc<dyn OrderStore>,
        notifier: Arc<dyn Notifier>,
        strict_transitions: bool,
    ) -> Self {
        Self {
            catalog,
            orders,
            notifier,
            numbers: OrderNumberGenerator::new(),
            strict_transitions,
        }
    }

    // =========================================================================
    // Price & item resolution
    // =========================================================================

    /// Resolve requested line items against the current catalog.
    ///
    /// Produces tamper-proof snapshots: names, unit prices, and flavor
    /// selections are read from the catalog, never from the request.
    ///
    /// # Errors
    ///
    /// - [`OrderError::ProductNotFound`] when a product id does not resolve
    /// - [`OrderError::ProductUnavailable`] when a product is not orderable
    /// - [`OrderError::InvalidFlavor`] when a requested flavor matches none
    ///   of the product's flavors
    /// - [`OrderError::InvalidQuantity`] when a quantity is zero
    pub async fn resolve_items(
        &self,
        requests: &[OrderItemRequest],
    ) -> Result<ResolvedItems, OrderError> {
        let mut items = Vec::with_capacity(requests.len());
        let mut total = Money::ZERO;

        for request in requests {
            if request.qty == 0 {
                return Err(OrderError::InvalidQuantity);
            }

            let product = self
                .catalog
                .find_product(request.product_id)
                .await?
                .ok_or(OrderError::ProductNotFound(request.product_id))?;
            if !product.available {
                return Err(OrderError::ProductUnavailable(product.id));
            }

            let flavor = resolve_flavor(&product, request)?;
            let unit_price = product.price
                + flavor
                    .as_ref()
                    .map_or(Money::ZERO, |f| f.price_modifier);

            total += unit_price.times(request.qty);
            items.push(OrderItem {
                product_id: product.id,
                name: product.name,
                qty: request.qty,
                unit_price,
                flavor,
                parts: request.options.as_ref().and_then(|o| o.parts),
            });
        }

        Ok(ResolvedItems { items, total })
    }

    // =========================================================================
    // Order creation
    // =========================================================================

    /// Create and persist an order.
    ///
    /// Resolution runs first; nothing is written when it fails. The order
    /// number is regenerated and the insert retried a bounded number of times
    /// if the unique index reports a collision. Client confirmation and admin
    /// alert notifications are dispatched after the insert and never affect
    /// the result.
    ///
    /// # Errors
    ///
    /// Everything [`Self::resolve_items`] returns, plus [`OrderError::EmptyOrder`]
    /// for an empty item list and storage failures.
    pub async fn create_order(&self, input: CreateOrder) -> Result<Order, OrderError> {
        if input.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let resolved = self.resolve_items(&input.items).await?;

        let mut attempts = 0;
        let order = loop {
            let candidate = Order::new(self.numbers.generate(), &input, resolved.clone());
            match self.orders.insert(candidate).await {
                Ok(order) => break order,
                Err(crate::error::StoreError::Conflict(_)) => {
                    attempts += 1;
                    if attempts >= MAX_GENERATION_ATTEMPTS {
                        return Err(OrderError::OrderNumberExhausted);
                    }
                    tracing::warn!(attempts, "order number collision, regenerating");
                }
                Err(err) => return Err(err.into()),
            }
        };

        tracing::info!(
            order_number = %order.order_number,
            total = %order.total_price,
            payment_method = %order.payment_method,
            "order created"
        );

        self.dispatch_order_created(&order);
        self.dispatch_admin_alert(&order);

        Ok(order)
    }

    /// Attach the provider payment reference to a freshly created order.
    ///
    /// Called by the storefront once the approval flow exists, so that later
    /// provider callbacks can find the order. Not an administrative action;
    /// no audit entry is written.
    ///
    /// # Errors
    ///
    /// [`OrderError::OrderNotFound`] or a storage failure.
    pub async fn attach_provider_payment_id(
        &self,
        id: OrderId,
        provider_payment_id: &str,
    ) -> Result<Order, OrderError> {
        let mut order = self.get_order(id).await?;
        order.provider_payment_id = Some(provider_payment_id.to_owned());
        order.updated_at = Utc::now();
        self.orders.update_with_audit(&order, None).await?;
        Ok(order)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Move an order to a new status, on administrator action.
    ///
    /// Writes exactly one audit entry capturing old → new. The entity update
    /// and the audit insert share one transactional scope. A client
    /// status-update notification fires only when the status actually changed
    /// and the order has an email on file.
    ///
    /// # Errors
    ///
    /// [`OrderError::OrderNotFound`], [`OrderError::InvalidStatusTransition`]
    /// (strict mode only), or a storage failure.
    pub async fn update_status(
        &self,
        id: OrderId,
        new_status: OrderStatus,
        admin: AdminUserId,
        notes: Option<String>,
    ) -> Result<Order, OrderError> {
        let mut order = self.get_order(id).await?;

        let old_status = order.status;
        if self.strict_transitions && !old_status.allows(new_status) {
            return Err(OrderError::InvalidStatusTransition {
                from: old_status,
                to: new_status,
            });
        }

        order.status = new_status;
        if let Some(notes) = notes {
            // Overwrite, not append: the admin note field holds the latest note.
            order.notes_admin = Some(notes);
        }
        order.last_modified_by = Some(admin);
        order.updated_at = Utc::now();

        let audit = NewAuditEntry {
            action: AuditAction::OrderStatusChanged,
            order_id: Some(order.id),
            admin_user_id: Some(admin),
            old_values: Some(serde_json::json!({ "status": old_status })),
            new_values: Some(serde_json::json!({ "status": new_status })),
            description: Some(format!("Status changed from {old_status} to {new_status}")),
        };
        self.orders.update_with_audit(&order, Some(audit)).await?;

        if new_status != old_status && order.client_email.is_some() {
            self.dispatch_status_changed(&order, new_status);
        }

        Ok(order)
    }

    /// Update an order's payment status, on administrator action or on an
    /// authenticated provider callback (`Actor::System`).
    ///
    /// Provider-originated updates neither record `last_modified_by` nor
    /// write an audit entry.
    ///
    /// # Errors
    ///
    /// [`OrderError::OrderNotFound`], [`OrderError::InvalidPaymentTransition`]
    /// (strict mode only), or a storage failure.
    pub async fn update_payment_status(
        &self,
        id: OrderId,
        new_payment_status: PaymentStatus,
        actor: Actor,
        provider_payment_id: Option<String>,
    ) -> Result<Order, OrderError> {
        let mut order = self.get_order(id).await?;

        let old_payment_status = order.payment_status;
        if self.strict_transitions && !old_payment_status.allows(new_payment_status) {
            return Err(OrderError::InvalidPaymentTransition {
                from: old_payment_status,
                to: new_payment_status,
            });
        }

        order.payment_status = new_payment_status;
        if let Some(reference) = provider_payment_id {
            order.provider_payment_id = Some(reference);
        }
        if let Some(admin) = actor.admin_id() {
            order.last_modified_by = Some(admin);
        }
        order.updated_at = Utc::now();

        let audit = actor.admin_id().map(|admin| NewAuditEntry {
            action: AuditAction::OrderPaymentUpdated,
            order_id: Some(order.id),
            admin_user_id: Some(admin),
            old_values: Some(serde_json::json!({ "payment_status": old_payment_status })),
            new_values: Some(serde_json::json!({ "payment_status": new_payment_status })),
            description: Some(format!(
                "Payment status changed from {old_payment_status} to {new_payment_status}"
            )),
        });
        self.orders.update_with_audit(&order, audit).await?;

        Ok(order)
    }

    // =========================================================================
    // Read side
    // =========================================================================

    /// Load one order.
    ///
    /// # Errors
    ///
    /// [`OrderError::OrderNotFound`] or a storage failure.
    pub async fn get_order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.orders
            .get(id)
            .await?
            .ok_or(OrderError::OrderNotFound(id))
    }

    /// Find the order a provider payment reference belongs to.
    ///
    /// # Errors
    ///
    /// A storage failure.
    pub async fn find_by_provider_payment_id(
        &self,
        provider_payment_id: &str,
    ) -> Result<Option<Order>, OrderError> {
        Ok(self
            .orders
            .find_by_provider_payment_id(provider_payment_id)
            .await?)
    }

    /// List orders matching a filter, newest created first.
    ///
    /// # Errors
    ///
    /// A storage failure.
    pub async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list(filter).await?)
    }

    /// Group orders by pickup/delivery date for the calendar view.
    ///
    /// Defaults to the next 30 days when no bounds are given.
    ///
    /// # Errors
    ///
    /// A storage failure.
    pub async fn calendar(
        &self,
        from: Option<chrono::DateTime<Utc>>,
        to: Option<chrono::DateTime<Utc>>,
    ) -> Result<BTreeMap<NaiveDate, Vec<Order>>, OrderError> {
        let from = from.unwrap_or_else(Utc::now);
        let to = to.unwrap_or_else(|| from + chrono::Duration::days(30));

        let orders = self.orders.list_by_pickup_range(from, to).await?;
        let mut grouped: BTreeMap<NaiveDate, Vec<Order>> = BTreeMap::new();
        for order in orders {
            grouped
                .entry(order.pickup_or_delivery_date.date_naive())
                .or_default()
                .push(order);
        }
        Ok(grouped)
    }

    /// Aggregate counts and revenue for the admin dashboard.
    ///
    /// Revenue sums PAID orders only; "today" means created during the
    /// current UTC day.
    ///
    /// # Errors
    ///
    /// A storage failure.
    pub async fn stats(&self) -> Result<OrderStats, OrderError> {
        let orders = self.orders.list(&OrderFilter::default()).await?;
        let today = Utc::now().date_naive();

        let mut stats = OrderStats {
            total_orders: 0,
            today_orders: 0,
            total_revenue: Money::ZERO,
            today_revenue: Money::ZERO,
            orders_by_status: OrderStatus::ALL.iter().map(|s| (*s, 0)).collect(),
        };

        for order in &orders {
            stats.total_orders += 1;
            let created_today = order.created_at.date_naive() == today;
            if created_today {
                stats.today_orders += 1;
            }
            if order.payment_status == PaymentStatus::Paid {
                stats.total_revenue += order.total_price;
                if created_today {
                    stats.today_revenue += order.total_price;
                }
            }
            if let Some(count) = stats.orders_by_status.get_mut(&order.status) {
                *count += 1;
            }
        }

        Ok(stats)
    }

    // =========================================================================
    // Notification dispatch
    // =========================================================================

    fn dispatch_order_created(&self, order: &Order) {
        let notifier = Arc::clone(&self.notifier);
        let order = order.clone();
        let _detached = tokio::spawn(async move {
            if let Err(err) = notifier.order_created(&order).await {
                tracing::warn!(order_number = %order.order_number, error = %err, "order confirmation failed");
            }
        });
    }

    fn dispatch_admin_alert(&self, order: &Order) {
        let notifier = Arc::clone(&self.notifier);
        let order = order.clone();
        let _detached = tokio::spawn(async move {
            if let Err(err) = notifier.admin_new_order(&order).await {
                tracing::warn!(order_number = %order.order_number, error = %err, "admin alert failed");
            }
        });
    }

    fn dispatch_status_changed(&self, order: &Order, new_status: OrderStatus) {
        let notifier = Arc::clone(&self.notifier);
        let order = order.clone();
        let _detached = tokio::spawn(async move {
            if let Err(err) = notifier.status_changed(&order, new_status).await {
                tracing::warn!(order_number = %order.order_number, error = %err, "status update notification failed");
            }
        });
    }
}

/// Match a requested flavor against the product's current flavors.
///
/// ID match wins; otherwise the name is compared case-insensitively. A
/// request that references a flavor which matches nothing is an error, a
/// request without flavor options simply selects none.
fn resolve_flavor(
    product: &crate::model::Product,
    request: &OrderItemRequest,
) -> Result<Option<FlavorSelection>, OrderError> {
    let Some(options) = &request.options else {
        return Ok(None);
    };
    if !options.requests_flavor() {
        return Ok(None);
    }

    let matched = options
        .flavor_id
        .and_then(|id| product.flavor_by_id(id))
        .or_else(|| {
            options
                .flavor
                .as_deref()
                .and_then(|name| product.flavor_by_name(name))
        });

    match matched {
        Some(flavor) => Ok(Some(FlavorSelection {
            flavor_id: Some(flavor.id),
            name: flavor.name.clone(),
            price_modifier: flavor.price_modifier,
        })),
        None => Err(OrderError::InvalidFlavor {
            product_id: product.id,
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::model::{CreateFlavor, CreateProduct, ItemOptions, Product};
    use crate::notify::{Notifier, NotifyError};
    use crate::store::memory::MemoryStore;
    use crate::types::{Email, PaymentMethod};

    /// Notifier that records every delivery, optionally failing them all.
    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn failing() -> Self {
            Self {
                events: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn record(&self, event: String) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Transport("smtp down".to_owned()));
            }
            self.events.lock().unwrap().push(event);
            Ok(())
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn order_created(&self, order: &Order) -> Result<(), NotifyError> {
            self.record(format!("created:{}", order.order_number))
        }

        async fn admin_new_order(&self, order: &Order) -> Result<(), NotifyError> {
            self.record(format!("admin:{}", order.order_number))
        }

        async fn status_changed(
            &self,
            order: &Order,
            new_status: OrderStatus,
        ) -> Result<(), NotifyError> {
            self.record(format!("status:{}:{new_status}", order.order_number))
        }
    }

    struct Fixture {
        service: OrderService,
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
        flanc: Product,
    }

    async fn fixture_with(notifier: RecordingNotifier, strict: bool) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(notifier);
        let service = OrderService::new(
            Arc::clone(&store) as Arc<dyn CatalogStore>,
            Arc::clone(&store) as Arc<dyn OrderStore>,
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            strict,
        );

        let mut flanc = Product::new(CreateProduct {
            name: "Flanc".to_owned(),
            description: Some("Flanc pâtissier traditionnel".to_owned()),
            category: Some("gateaux".to_owned()),
            price: Money::from_centimes(2800),
            image_url: None,
            available: None,
        });
        let pistache = crate::model::Flavor::new(
            flanc.id,
            CreateFlavor {
                name: "Pistache".to_owned(),
                price_modifier: Some(Money::from_centimes(200)),
            },
        );
        flanc.flavors.push(pistache);
        let flanc = store.insert_product(flanc).await.unwrap();

        Fixture {
            service,
            store,
            notifier,
            flanc,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(RecordingNotifier::default(), false).await
    }

    fn submission(_fx: &Fixture, items: Vec<OrderItemRequest>) -> CreateOrder {
        CreateOrder {
            client_name: "Marie Dupont".to_owned(),
            client_phone: "+33612345678".to_owned(),
            client_email: Some(Email::parse("marie@example.com").unwrap()),
            items,
            pickup_or_delivery_date: Utc::now() + chrono::Duration::days(3),
            payment_method: PaymentMethod::Cash,
            notes: None,
        }
    }

    fn flavor_line(fx: &Fixture, qty: u32) -> OrderItemRequest {
        OrderItemRequest {
            product_id: fx.flanc.id,
            qty,
            options: Some(ItemOptions {
                flavor_id: None,
                flavor: Some("pistache".to_owned()),
                parts: None,
            }),
        }
    }

    fn plain_line(fx: &Fixture, qty: u32) -> OrderItemRequest {
        OrderItemRequest {
            product_id: fx.flanc.id,
            qty,
            options: None,
        }
    }

    async fn drain_notifications() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_flavor_price_is_added_to_base_price() {
        let fx = fixture().await;
        let order = fx
            .service
            .create_order(submission(&fx, vec![flavor_line(&fx, 2)]))
            .await
            .unwrap();

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].unit_price.centimes(), 3000);
        assert_eq!(order.total_price.centimes(), 6000);
        let flavor = order.items[0].flavor.as_ref().unwrap();
        assert_eq!(flavor.name, "Pistache");
        assert_eq!(flavor.price_modifier.centimes(), 200);
    }

    #[tokio::test]
    async fn test_no_flavor_uses_base_price() {
        let fx = fixture().await;
        let order = fx
            .service
            .create_order(submission(&fx, vec![plain_line(&fx, 1)]))
            .await
            .unwrap();

        assert_eq!(order.items[0].unit_price.centimes(), 2800);
        assert!(order.items[0].flavor.is_none());
        assert_eq!(order.total_price.centimes(), 2800);
    }

    #[tokio::test]
    async fn test_new_order_starts_pending() {
        let fx = fixture().await;
        let order = fx
            .service
            .create_order(submission(&fx, vec![plain_line(&fx, 1)]))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert!(order.last_modified_by.is_none());
    }

    #[tokio::test]
    async fn test_unknown_product_persists_nothing() {
        let fx = fixture().await;
        let request = OrderItemRequest {
            product_id: crate::types::ProductId::generate(),
            qty: 1,
            options: None,
        };

        let err = fx
            .service
            .create_order(submission(&fx, vec![request]))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::ProductNotFound(_)));
        assert_eq!(fx.store.order_count(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_product_persists_nothing() {
        let fx = fixture().await;
        let mut off = fx.flanc.clone();
        off.available = false;
        fx.store.update_product(&off).await.unwrap();

        let err = fx
            .service
            .create_order(submission(&fx, vec![plain_line(&fx, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::ProductUnavailable(_)));
        assert_eq!(fx.store.order_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_flavor_is_rejected() {
        let fx = fixture().await;
        let request = OrderItemRequest {
            product_id: fx.flanc.id,
            qty: 1,
            options: Some(ItemOptions {
                flavor_id: None,
                flavor: Some("Myrtille".to_owned()),
                parts: None,
            }),
        };

        let err = fx
            .service
            .create_order(submission(&fx, vec![request]))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidFlavor { .. }));
        assert_eq!(fx.store.order_count(), 0);
    }

    #[tokio::test]
    async fn test_flavor_matched_by_id_beats_name() {
        let fx = fixture().await;
        let pistache_id = fx.flanc.flavors[0].id;
        let request = OrderItemRequest {
            product_id: fx.flanc.id,
            qty: 1,
            options: Some(ItemOptions {
                flavor_id: Some(pistache_id),
                flavor: Some("does not exist".to_owned()),
                parts: None,
            }),
        };

        let order = fx
            .service
            .create_order(submission(&fx, vec![request]))
            .await
            .unwrap();
        assert_eq!(
            order.items[0].flavor.as_ref().unwrap().flavor_id,
            Some(pistache_id)
        );
    }

    #[tokio::test]
    async fn test_zero_quantity_and_empty_order_are_rejected() {
        let fx = fixture().await;

        let err = fx
            .service
            .create_order(submission(&fx, vec![plain_line(&fx, 0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidQuantity));

        let err = fx
            .service
            .create_order(submission(&fx, vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::EmptyOrder));
        assert_eq!(fx.store.order_count(), 0);
    }

    #[tokio::test]
    async fn test_order_number_format() {
        let fx = fixture().await;
        let order = fx
            .service
            .create_order(submission(&fx, vec![plain_line(&fx, 1)]))
            .await
            .unwrap();

        let parts: Vec<&str> = order.order_number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "PAT");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 4);
    }

    #[tokio::test]
    async fn test_creation_notifications_are_dispatched() {
        let fx = fixture().await;
        let order = fx
            .service
            .create_order(submission(&fx, vec![plain_line(&fx, 1)]))
            .await
            .unwrap();
        drain_notifications().await;

        let events = fx.notifier.events();
        assert!(events.contains(&format!("created:{}", order.order_number)));
        assert!(events.contains(&format!("admin:{}", order.order_number)));
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_creation() {
        let fx = fixture_with(RecordingNotifier::failing(), false).await;
        let order = fx
            .service
            .create_order(submission(&fx, vec![plain_line(&fx, 1)]))
            .await;
        drain_notifications().await;

        assert!(order.is_ok());
        assert_eq!(fx.store.order_count(), 1);
    }

    #[tokio::test]
    async fn test_snapshots_survive_catalog_mutation() {
        let fx = fixture().await;
        let order = fx
            .service
            .create_order(submission(&fx, vec![flavor_line(&fx, 2)]))
            .await
            .unwrap();

        // Reprice the product and rename the flavor afterwards.
        let mut repriced = fx.flanc.clone();
        repriced.name = "Flanc nouvelle recette".to_owned();
        repriced.price = Money::from_centimes(9900);
        fx.store.update_product(&repriced).await.unwrap();

        let reloaded = fx.service.get_order(order.id).await.unwrap();
        assert_eq!(reloaded.items[0].name, "Flanc");
        assert_eq!(reloaded.items[0].unit_price.centimes(), 3000);
        assert_eq!(reloaded.total_price.centimes(), 6000);
    }

    #[tokio::test]
    async fn test_status_update_writes_exactly_one_audit_entry() {
        let fx = fixture().await;
        let admin = AdminUserId::generate();
        let order = fx
            .service
            .create_order(submission(&fx, vec![plain_line(&fx, 1)]))
            .await
            .unwrap();

        let updated = fx
            .service
            .update_status(order.id, OrderStatus::Confirmed, admin, Some("ok".to_owned()))
            .await
            .unwrap();
        drain_notifications().await;

        assert_eq!(updated.status, OrderStatus::Confirmed);
        assert_eq!(updated.notes_admin.as_deref(), Some("ok"));
        assert_eq!(updated.last_modified_by, Some(admin));
        assert_eq!(fx.store.audit_count(), 1);

        let entries = crate::store::AuditStore::list(
            fx.store.as_ref(),
            &crate::model::AuditFilter::default(),
        )
        .await
        .unwrap();
        let entry = &entries[0];
        assert_eq!(entry.action, AuditAction::OrderStatusChanged);
        assert_eq!(entry.order_id, Some(order.id));
        assert_eq!(
            entry.old_values.as_ref().unwrap()["status"],
            serde_json::json!("PENDING")
        );
        assert_eq!(
            entry.new_values.as_ref().unwrap()["status"],
            serde_json::json!("CONFIRMED")
        );

        assert!(
            fx.notifier
                .events()
                .contains(&format!("status:{}:CONFIRMED", order.order_number))
        );
    }

    #[tokio::test]
    async fn test_unchanged_status_skips_notification_but_audits() {
        let fx = fixture().await;
        let admin = AdminUserId::generate();
        let order = fx
            .service
            .create_order(submission(&fx, vec![plain_line(&fx, 1)]))
            .await
            .unwrap();
        drain_notifications().await;
        let before = fx.notifier.events().len();

        fx.service
            .update_status(order.id, OrderStatus::Pending, admin, None)
            .await
            .unwrap();
        drain_notifications().await;

        assert_eq!(fx.store.audit_count(), 1);
        assert_eq!(fx.notifier.events().len(), before);
    }

    #[tokio::test]
    async fn test_system_payment_update_is_not_audited() {
        let fx = fixture().await;
        let order = fx
            .service
            .create_order(submission(&fx, vec![plain_line(&fx, 1)]))
            .await
            .unwrap();

        let updated = fx
            .service
            .update_payment_status(
                order.id,
                PaymentStatus::Paid,
                Actor::System,
                Some("PAYID-123".to_owned()),
            )
            .await
            .unwrap();

        assert_eq!(updated.payment_status, PaymentStatus::Paid);
        assert_eq!(updated.provider_payment_id.as_deref(), Some("PAYID-123"));
        assert!(updated.last_modified_by.is_none());
        assert_eq!(fx.store.audit_count(), 0);
    }

    #[tokio::test]
    async fn test_admin_payment_update_is_audited_once() {
        let fx = fixture().await;
        let admin = AdminUserId::generate();
        let order = fx
            .service
            .create_order(submission(&fx, vec![plain_line(&fx, 1)]))
            .await
            .unwrap();

        let updated = fx
            .service
            .update_payment_status(order.id, PaymentStatus::Paid, Actor::Admin(admin), None)
            .await
            .unwrap();

        assert_eq!(updated.last_modified_by, Some(admin));
        assert_eq!(fx.store.audit_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_order_is_not_found() {
        let fx = fixture().await;
        let missing = OrderId::generate();

        let err = fx
            .service
            .update_status(missing, OrderStatus::Confirmed, AdminUserId::generate(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::OrderNotFound(_)));

        let err = fx
            .service
            .update_payment_status(missing, PaymentStatus::Paid, Actor::System, None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn test_permissive_mode_allows_any_transition() {
        let fx = fixture().await;
        let admin = AdminUserId::generate();
        let order = fx
            .service
            .create_order(submission(&fx, vec![plain_line(&fx, 1)]))
            .await
            .unwrap();

        // PENDING straight to LIVREE, then back out of a terminal state.
        fx.service
            .update_status(order.id, OrderStatus::Livree, admin, None)
            .await
            .unwrap();
        let back = fx
            .service
            .update_status(order.id, OrderStatus::EnCuisson, admin, None)
            .await
            .unwrap();
        assert_eq!(back.status, OrderStatus::EnCuisson);
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_skips_and_writes_no_audit() {
        let fx = fixture_with(RecordingNotifier::default(), true).await;
        let admin = AdminUserId::generate();
        let order = fx
            .service
            .create_order(submission(&fx, vec![plain_line(&fx, 1)]))
            .await
            .unwrap();

        let err = fx
            .service
            .update_status(order.id, OrderStatus::Prete, admin, None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidStatusTransition { .. }));
        assert_eq!(fx.store.audit_count(), 0);

        let err = fx
            .service
            .update_payment_status(
                order.id,
                PaymentStatus::Refunded,
                Actor::Admin(admin),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidPaymentTransition { .. }));

        // The chain itself still works.
        fx.service
            .update_status(order.id, OrderStatus::Confirmed, admin, None)
            .await
            .unwrap();
        fx.service
            .update_status(order.id, OrderStatus::Cancelled, admin, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_provider_payment_id_roundtrip() {
        let fx = fixture().await;
        let order = fx
            .service
            .create_order(submission(&fx, vec![plain_line(&fx, 1)]))
            .await
            .unwrap();

        fx.service
            .attach_provider_payment_id(order.id, "PAYID-XYZ")
            .await
            .unwrap();
        let found = fx
            .service
            .find_by_provider_payment_id("PAYID-XYZ")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, order.id);
        // Attaching the reference is not an administrative action.
        assert_eq!(fx.store.audit_count(), 0);
    }

    #[tokio::test]
    async fn test_list_filters_by_status_and_payment() {
        let fx = fixture().await;
        let admin = AdminUserId::generate();
        let a = fx
            .service
            .create_order(submission(&fx, vec![plain_line(&fx, 1)]))
            .await
            .unwrap();
        let b = fx
            .service
            .create_order(submission(&fx, vec![plain_line(&fx, 2)]))
            .await
            .unwrap();

        fx.service
            .update_status(a.id, OrderStatus::Confirmed, admin, None)
            .await
            .unwrap();
        fx.service
            .update_payment_status(b.id, PaymentStatus::Paid, Actor::Admin(admin), None)
            .await
            .unwrap();

        let confirmed = fx
            .service
            .list_orders(&OrderFilter {
                status: Some(OrderStatus::Confirmed),
                ..OrderFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].id, a.id);

        let paid = fx
            .service
            .list_orders(&OrderFilter {
                payment_status: Some(PaymentStatus::Paid),
                ..OrderFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].id, b.id);
    }

    #[tokio::test]
    async fn test_stats_count_paid_revenue_only() {
        let fx = fixture().await;
        let admin = AdminUserId::generate();
        let a = fx
            .service
            .create_order(submission(&fx, vec![flavor_line(&fx, 2)]))
            .await
            .unwrap();
        fx.service
            .create_order(submission(&fx, vec![plain_line(&fx, 1)]))
            .await
            .unwrap();

        fx.service
            .update_payment_status(a.id, PaymentStatus::Paid, Actor::Admin(admin), None)
            .await
            .unwrap();

        let stats = fx.service.stats().await.unwrap();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.today_orders, 2);
        assert_eq!(stats.total_revenue.centimes(), 6000);
        assert_eq!(stats.today_revenue.centimes(), 6000);
        assert_eq!(stats.orders_by_status[&OrderStatus::Pending], 2);
        assert_eq!(stats.orders_by_status[&OrderStatus::Livree], 0);
    }

    #[tokio::test]
    async fn test_calendar_groups_by_pickup_date() {
        let fx = fixture().await;
        let mut near = submission(&fx, vec![plain_line(&fx, 1)]);
        near.pickup_or_delivery_date = Utc::now() + chrono::Duration::days(2);
        let mut far = submission(&fx, vec![plain_line(&fx, 1)]);
        far.pickup_or_delivery_date = Utc::now() + chrono::Duration::days(9);

        let near = fx.service.create_order(near).await.unwrap();
        let far = fx.service.create_order(far).await.unwrap();

        let calendar = fx.service.calendar(None, None).await.unwrap();
        assert_eq!(calendar.len(), 2);
        assert_eq!(
            calendar[&near.pickup_or_delivery_date.date_naive()][0].id,
            near.id
        );
        assert_eq!(
            calendar[&far.pickup_or_delivery_date.date_naive()][0].id,
            far.id
        );
    }
}
