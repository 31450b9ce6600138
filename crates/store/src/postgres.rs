use std::collections::HashMap;

use async_trait::async_trait;
use common::{OrderId, Page, PageRequest, ProductId, UserId};
use domain::{
    Brand, Cart, CartItem, Money, Order, OrderItem, OrderStatus, Product, Role, SizeStock,
    StockAdjustment, User,
};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::{
    CartStore, CatalogStore, OrderQuery, OrderStore, ProductQuery, Result, StoreError, UserStore,
};

const PRODUCT_COLUMNS: &str =
    "id, name, brand, description, price_cents, image, is_active, created_at, updated_at";

const USER_COLUMNS: &str =
    "id, email, display_name, password_hash, role, is_active, created_at, updated_at";

const ORDER_COLUMNS: &str =
    "id, user_id, total_amount_cents, shipping_address, status, created_at, updated_at";

/// PostgreSQL-backed storefront store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_product(row: &PgRow, sizes: Vec<SizeStock>) -> Result<Product> {
        let brand: String = row.try_get("brand")?;
        Ok(Product {
            id: ProductId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            brand: brand
                .parse::<Brand>()
                .map_err(|e| StoreError::InvalidData(e.to_string()))?,
            description: row.try_get("description")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            image: row.try_get("image")?,
            is_active: row.try_get("is_active")?,
            sizes,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_user(row: &PgRow) -> Result<User> {
        let role: String = row.try_get("role")?;
        Ok(User {
            id: UserId::from_uuid(row.try_get("id")?),
            email: row.try_get("email")?,
            display_name: row.try_get("display_name")?,
            password_hash: row.try_get("password_hash")?,
            role: role
                .parse::<Role>()
                .map_err(|e| StoreError::InvalidData(e.to_string()))?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_cart_item(row: &PgRow) -> Result<CartItem> {
        Ok(CartItem {
            product_id: ProductId::from_uuid(row.try_get("product_id")?),
            size: row.try_get("size")?,
            quantity: to_u32(row.try_get("quantity")?)?,
            price: Money::from_cents(row.try_get("price_cents")?),
            product_name: row.try_get("product_name")?,
            product_image: row.try_get("product_image")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_order_item(row: &PgRow) -> Result<OrderItem> {
        Ok(OrderItem {
            product_id: ProductId::from_uuid(row.try_get("product_id")?),
            size: row.try_get("size")?,
            quantity: to_u32(row.try_get("quantity")?)?,
            price: Money::from_cents(row.try_get("price_cents")?),
            product_name: row.try_get("product_name")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_order(row: &PgRow, items: Vec<OrderItem>) -> Result<Order> {
        let status: String = row.try_get("status")?;
        Ok(Order {
            id: OrderId::from_uuid(row.try_get("id")?),
            user_id: UserId::from_uuid(row.try_get("user_id")?),
            total_amount: Money::from_cents(row.try_get("total_amount_cents")?),
            shipping_address: row.try_get("shipping_address")?,
            items,
            status: status
                .parse::<OrderStatus>()
                .map_err(|e| StoreError::InvalidData(e.to_string()))?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Loads size lists for a batch of products, keyed by product ID.
    async fn load_sizes(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<SizeStock>>> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, size, stock
            FROM product_sizes
            WHERE product_id = ANY($1)
            ORDER BY product_id, position ASC
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut sizes: HashMap<Uuid, Vec<SizeStock>> = HashMap::new();
        for row in rows {
            let product_id: Uuid = row.try_get("product_id")?;
            let entry = SizeStock::new(
                row.try_get::<String, _>("size")?,
                to_u32(row.try_get("stock")?)?,
            );
            sizes.entry(product_id).or_default().push(entry);
        }
        Ok(sizes)
    }

    async fn products_from_rows(&self, rows: Vec<PgRow>) -> Result<Vec<Product>> {
        let ids = rows
            .iter()
            .map(|row| row.try_get::<Uuid, _>("id"))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut sizes = self.load_sizes(&ids).await?;

        rows.iter()
            .zip(ids)
            .map(|(row, id)| Self::row_to_product(row, sizes.remove(&id).unwrap_or_default()))
            .collect()
    }

    async fn insert_sizes(
        tx: &mut Transaction<'_, Postgres>,
        product_id: ProductId,
        sizes: &[SizeStock],
    ) -> Result<()> {
        for (position, entry) in sizes.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO product_sizes (product_id, size, stock, position)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(product_id.as_uuid())
            .bind(&entry.size)
            .bind(to_i32(entry.stock)?)
            .bind(to_i32(position as u32)?)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Distinguishes a missing product from a missing size after a
    /// conditional update matched nothing.
    async fn classify_miss(&self, id: ProductId, size: &str) -> Result<StockAdjustment> {
        let stock: Option<i32> = sqlx::query_scalar(
            "SELECT stock FROM product_sizes WHERE product_id = $1 AND size = $2",
        )
        .bind(id.as_uuid())
        .bind(size)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(stock) = stock {
            return Ok(StockAdjustment::Insufficient {
                available: to_u32(stock)?,
            });
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await?;

        Ok(if exists {
            StockAdjustment::SizeMissing
        } else {
            StockAdjustment::ProductMissing
        })
    }

    /// Runs a stock update together with the product's `updated_at` touch.
    /// Nothing is committed unless both statements succeed.
    async fn adjust_stock(
        &self,
        update_sql: &str,
        id: ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<StockAdjustment> {
        let quantity = to_i32(quantity)?;
        let mut tx = self.pool.begin().await?;

        let remaining: Option<i32> = sqlx::query_scalar(update_sql)
            .bind(id.as_uuid())
            .bind(size)
            .bind(quantity)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(remaining) = remaining else {
            tx.rollback().await?;
            return self.classify_miss(id, size).await;
        };
        let remaining = to_u32(remaining)?;

        sqlx::query("UPDATE products SET updated_at = NOW() WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(StockAdjustment::Applied { remaining })
    }

    async fn load_cart(&self, user_id: UserId) -> Result<Option<Cart>> {
        let Some(row) =
            sqlx::query("SELECT user_id, created_at, updated_at FROM carts WHERE user_id = $1")
                .bind(user_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?
        else {
            return Ok(None);
        };

        let item_rows = sqlx::query(
            r#"
            SELECT product_id, size, quantity, price_cents, product_name, product_image,
                   created_at, updated_at
            FROM cart_items
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let items = item_rows
            .iter()
            .map(Self::row_to_cart_item)
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(Cart {
            user_id,
            items,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }

    async fn cart_exists(&self, user_id: UserId) -> Result<bool> {
        Ok(
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM carts WHERE user_id = $1)")
                .bind(user_id.as_uuid())
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn touch_cart(&self, user_id: UserId) -> Result<()> {
        sqlx::query("UPDATE carts SET updated_at = NOW() WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn orders_from_rows(&self, rows: Vec<PgRow>) -> Result<Vec<Order>> {
        let ids = rows
            .iter()
            .map(|row| row.try_get::<Uuid, _>("id"))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let item_rows = sqlx::query(
            r#"
            SELECT order_id, product_id, size, quantity, price_cents, product_name, created_at
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, position ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut items: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in &item_rows {
            let order_id: Uuid = row.try_get("order_id")?;
            items
                .entry(order_id)
                .or_default()
                .push(Self::row_to_order_item(row)?);
        }

        rows.iter()
            .zip(ids)
            .map(|(row, id)| Self::row_to_order(row, items.remove(&id).unwrap_or_default()))
            .collect()
    }
}

fn to_i32(value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|_| StoreError::InvalidData(format!("{value} exceeds i32")))
}

fn to_u32(value: i32) -> Result<u32> {
    u32::try_from(value).map_err(|_| StoreError::InvalidData(format!("negative count {value}")))
}

fn page_bounds(page: PageRequest) -> (i64, i64) {
    (page.limit() as i64, page.offset() as i64)
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn insert_product(&self, product: &Product) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (id, name, brand, description, price_cents, image, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.brand.as_str())
        .bind(&product.description)
        .bind(product.price.cents())
        .bind(&product.image)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        Self::insert_sizes(&mut tx, product.id, &product.sizes).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.products_from_rows(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>> {
        let brand = query.brand.map(|b| b.as_str());
        let (limit, offset) = page_bounds(query.page);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM products
            WHERE ($1::text IS NULL OR brand = $1) AND ($2 OR is_active)
            "#,
        )
        .bind(brand)
        .bind(query.include_inactive)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE ($1::text IS NULL OR brand = $1) AND ($2 OR is_active)
            ORDER BY name ASC, id ASC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(brand)
        .bind(query.include_inactive)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let products = self.products_from_rows(rows).await?;
        Ok(Page::new(products, query.page, total as u64))
    }

    async fn update_product(&self, product: &Product) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, brand = $3, description = $4, price_cents = $5, image = $6,
                is_active = $7, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.brand.as_str())
        .bind(&product.description)
        .bind(product.price.cents())
        .bind(&product.image)
        .bind(product.is_active)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("DELETE FROM product_sizes WHERE product_id = $1")
            .bind(product.id.as_uuid())
            .execute(&mut *tx)
            .await?;
        Self::insert_sizes(&mut tx, product.id, &product.sizes).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn set_product_active(&self, id: ProductId, active: bool) -> Result<bool> {
        let result =
            sqlx::query("UPDATE products SET is_active = $2, updated_at = NOW() WHERE id = $1")
                .bind(id.as_uuid())
                .bind(active)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn reserve_stock(
        &self,
        id: ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<StockAdjustment> {
        self.adjust_stock(
            r#"
            UPDATE product_sizes
            SET stock = stock - $3
            WHERE product_id = $1 AND size = $2 AND stock >= $3
            RETURNING stock
            "#,
            id,
            size,
            quantity,
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn restore_stock(
        &self,
        id: ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<StockAdjustment> {
        self.adjust_stock(
            r#"
            UPDATE product_sizes
            SET stock = stock + $3
            WHERE product_id = $1 AND size = $2
            RETURNING stock
            "#,
            id,
            size,
            quantity,
        )
        .await
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, display_name, password_hash, role, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("unique_user_email")
            {
                return StoreError::DuplicateEmail(user.email.clone());
            }
            StoreError::Database(e)
        })?;
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(Self::row_to_user)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(Self::row_to_user)
            .transpose()
    }

    async fn list_users(&self, page: PageRequest) -> Result<Page<User>> {
        let (limit, offset) = page_bounds(page);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, email ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let users = rows
            .iter()
            .map(Self::row_to_user)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(users, page, total as u64))
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(id.as_uuid())
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_display_name(&self, id: UserId, display_name: &str) -> Result<Option<User>> {
        sqlx::query(&format!(
            "UPDATE users SET display_name = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(display_name)
        .fetch_optional(&self.pool)
        .await?
        .map(|row| Self::row_to_user(&row))
        .transpose()
    }
}

#[async_trait]
impl CartStore for PostgresStore {
    async fn find_cart(&self, user_id: UserId) -> Result<Option<Cart>> {
        self.load_cart(user_id).await
    }

    async fn add_cart_item(&self, user_id: UserId, item: CartItem) -> Result<Cart> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO carts (user_id, created_at)
            VALUES ($1, NOW())
            ON CONFLICT (user_id) DO UPDATE SET updated_at = NOW()
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&mut *tx)
        .await?;

        // Merging keeps the first price snapshot.
        sqlx::query(
            r#"
            INSERT INTO cart_items (user_id, product_id, size, quantity, price_cents, product_name, product_image, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT ON CONSTRAINT unique_cart_line
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity, updated_at = NOW()
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(item.product_id.as_uuid())
        .bind(&item.size)
        .bind(to_i32(item.quantity)?)
        .bind(item.price.cents())
        .bind(&item.product_name)
        .bind(&item.product_image)
        .bind(item.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.load_cart(user_id)
            .await?
            .ok_or_else(|| StoreError::InvalidData(format!("cart {user_id} vanished after add")))
    }

    async fn set_cart_item_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<Option<Cart>> {
        if !self.cart_exists(user_id).await? {
            return Ok(None);
        }

        if quantity == 0 {
            sqlx::query(
                "DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2 AND size = $3",
            )
            .bind(user_id.as_uuid())
            .bind(product_id.as_uuid())
            .bind(size)
            .execute(&self.pool)
            .await?;
        } else {
            sqlx::query(
                r#"
                UPDATE cart_items SET quantity = $4, updated_at = NOW()
                WHERE user_id = $1 AND product_id = $2 AND size = $3
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(product_id.as_uuid())
            .bind(size)
            .bind(to_i32(quantity)?)
            .execute(&self.pool)
            .await?;
        }

        self.touch_cart(user_id).await?;
        self.load_cart(user_id).await
    }

    async fn remove_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        size: &str,
    ) -> Result<Option<Cart>> {
        if !self.cart_exists(user_id).await? {
            return Ok(None);
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2 AND size = $3")
            .bind(user_id.as_uuid())
            .bind(product_id.as_uuid())
            .bind(size)
            .execute(&self.pool)
            .await?;

        self.touch_cart(user_id).await?;
        self.load_cart(user_id).await
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<Option<Cart>> {
        if !self.cart_exists(user_id).await? {
            return Ok(None);
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;

        self.touch_cart(user_id).await?;
        self.load_cart(user_id).await
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, total_amount_cents, shipping_address, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(order.total_amount.cents())
        .bind(&order.shipping_address)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, position, product_id, size, quantity, price_cents, product_name, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(order.id.as_uuid())
            .bind(to_i32(position as u32)?)
            .bind(item.product_id.as_uuid())
            .bind(&item.size)
            .bind(to_i32(item.quantity)?)
            .bind(item.price.cents())
            .bind(&item.product_name)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.orders_from_rows(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        self.orders_from_rows(rows).await
    }

    async fn list_orders(&self, query: &OrderQuery) -> Result<Page<Order>> {
        let status = query.status.map(|s| s.as_str());
        let user_id = query.user_id.map(|u| u.as_uuid());
        let (limit, offset) = page_bounds(query.page);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM orders
            WHERE ($1::text IS NULL OR status = $1) AND ($2::uuid IS NULL OR user_id = $2)
            "#,
        )
        .bind(status)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE ($1::text IS NULL OR status = $1) AND ($2::uuid IS NULL OR user_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(status)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let orders = self.orders_from_rows(rows).await?;
        Ok(Page::new(orders, query.page, total as u64))
    }

    async fn set_order_status(&self, id: OrderId, status: OrderStatus) -> Result<Option<Order>> {
        let result =
            sqlx::query("UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id.as_uuid())
                .bind(status.as_str())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_order(id).await
    }
}
