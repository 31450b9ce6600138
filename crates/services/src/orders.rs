//! Order queries and status updates.

use common::{OrderId, Page, UserId};
use domain::{Order, OrderStatus, Role};
use store::{OrderQuery, StorefrontStore};

use crate::access;
use crate::error::{Result, ServiceError};

/// Read side of orders plus the admin status update.
#[derive(Clone)]
pub struct OrderService<S> {
    store: S,
}

impl<S: StorefrontStore> OrderService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Order history of a user, newest first.
    ///
    /// Guests have no history and are refused.
    #[tracing::instrument(skip(self))]
    pub async fn user_orders(&self, user_id: UserId) -> Result<Vec<Order>> {
        let user = access::load_user(&self.store, user_id).await?;
        if user.role == Role::Guest {
            return Err(ServiceError::Forbidden(
                "You need to complete an order to view order history".to_string(),
            ));
        }
        Ok(self.store.orders_for_user(user_id).await?)
    }

    /// Loads one order. Only the owner or an admin may see it.
    #[tracing::instrument(skip(self))]
    pub async fn order_details(&self, order_id: OrderId, acting_user: Option<UserId>) -> Result<Order> {
        let order = self
            .store
            .find_order(order_id)
            .await?
            .ok_or_else(ServiceError::order_not_found)?;

        if let Some(acting_user) = acting_user
            && !order.is_owned_by(acting_user)
        {
            access::require_admin(
                &self.store,
                acting_user,
                "You do not have permission to view this order",
            )
            .await?;
        }
        Ok(order)
    }

    /// Sets the status of an order.
    ///
    /// The status must be one of the five known values. Any status may follow
    /// any other.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: &str,
        acting_user: Option<UserId>,
    ) -> Result<Order> {
        let status: OrderStatus = status.parse()?;

        if let Some(acting_user) = acting_user {
            access::require_admin(
                &self.store,
                acting_user,
                "You do not have permission to update order status",
            )
            .await?;
        }

        let order = self
            .store
            .set_order_status(order_id, status)
            .await?
            .ok_or_else(ServiceError::order_not_found)?;
        tracing::info!(%order_id, %status, "order status updated");
        Ok(order)
    }

    /// Lists all orders, newest first. Admin only.
    #[tracing::instrument(skip(self))]
    pub async fn all_orders(&self, query: OrderQuery, acting_user: Option<UserId>) -> Result<Page<Order>> {
        if let Some(acting_user) = acting_user {
            access::require_admin(
                &self.store,
                acting_user,
                "You do not have permission to view all orders",
            )
            .await?;
        }
        Ok(self.store.list_orders(&query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::{Brand, Cart, CartItem, Money, Product, SizeStock, User};
    use store::{InMemoryStore, OrderStore, UserStore};

    struct Fixture {
        service: OrderService<InMemoryStore>,
        owner: User,
        other: User,
        admin: User,
        order: Order,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let now = Utc::now();

        let mut owner = User::new("owner@example.com", "Owner", "hash", now);
        owner.role = Role::Customer;
        let other = User::new("other@example.com", "Other", "hash", now);
        let mut admin = User::new("admin@example.com", "Admin", "hash", now);
        admin.role = Role::Admin;
        for user in [&owner, &other, &admin] {
            store.insert_user(user).await.unwrap();
        }

        let product = Product::new(
            "Old Skool",
            Brand::Vans,
            Money::from_dollars(70),
            vec![SizeStock::new("42", 3)],
            now,
        );
        let mut cart = Cart::new(owner.id, now);
        cart.add_item(CartItem::snapshot(&product, "42", 1, now), now);
        let order = Order::from_cart(&cart, "9 Elm St", now).unwrap();
        store.insert_order(&order).await.unwrap();

        Fixture {
            service: OrderService::new(store),
            owner,
            other,
            admin,
            order,
        }
    }

    #[tokio::test]
    async fn guests_have_no_history() {
        let f = fixture().await;
        let result = f.service.user_orders(f.other.id).await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));

        let orders = f.service.user_orders(f.owner.id).await.unwrap();
        assert_eq!(orders.len(), 1);
    }

    #[tokio::test]
    async fn details_are_owner_or_admin_only() {
        let f = fixture().await;

        assert!(f.service.order_details(f.order.id, Some(f.owner.id)).await.is_ok());
        assert!(f.service.order_details(f.order.id, Some(f.admin.id)).await.is_ok());
        assert!(f.service.order_details(f.order.id, None).await.is_ok());
        assert!(matches!(
            f.service.order_details(f.order.id, Some(f.other.id)).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            f.service.order_details(OrderId::new(), Some(f.owner.id)).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn status_update_checks_value_then_role() {
        let f = fixture().await;

        assert!(matches!(
            f.service.update_status(f.order.id, "lost", Some(f.admin.id)).await,
            Err(ServiceError::Invalid(_))
        ));
        assert!(matches!(
            f.service.update_status(f.order.id, "shipped", Some(f.owner.id)).await,
            Err(ServiceError::Forbidden(_))
        ));

        let shipped = f
            .service
            .update_status(f.order.id, "shipped", Some(f.admin.id))
            .await
            .unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipped);

        // Permissive: a shipped order may go back to pending.
        let back = f
            .service
            .update_status(f.order.id, "pending", Some(f.admin.id))
            .await
            .unwrap();
        assert_eq!(back.status, OrderStatus::Pending);

        assert!(matches!(
            f.service
                .update_status(OrderId::new(), "delivered", Some(f.admin.id))
                .await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn all_orders_is_admin_only() {
        let f = fixture().await;
        assert!(matches!(
            f.service.all_orders(OrderQuery::new(), Some(f.owner.id)).await,
            Err(ServiceError::Forbidden(_))
        ));
        let page = f
            .service
            .all_orders(OrderQuery::new().status(OrderStatus::Pending), Some(f.admin.id))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
    }
}
