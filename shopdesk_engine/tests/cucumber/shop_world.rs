use std::{collections::HashMap, fmt::Debug};

use cucumber::World;
use log::*;
use shopdesk_engine::{
    db_types::{CategoryId, OrderId, ProductId},
    test_utils::prepare_env::{create_database, random_db_path, run_migrations},
    CatalogApi,
    OrderFlowApi,
    OrderFlowError,
    SalesAnalyticsApi,
    SqliteDatabase,
    TransitionPolicy,
};

#[derive(Default, Debug, World)]
pub struct ShopWorld {
    pub system: Option<ShopSystem>,
    /// Orders, products and categories are referred to by label in the feature files.
    pub orders: HashMap<String, OrderId>,
    pub products: HashMap<String, ProductId>,
    pub categories: HashMap<String, CategoryId>,
    pub last_error: Option<OrderFlowError>,
}

pub struct ShopSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub orders: OrderFlowApi<SqliteDatabase>,
    pub catalog: CatalogApi<SqliteDatabase>,
    pub analytics: SalesAnalyticsApi<SqliteDatabase>,
}

impl Debug for ShopSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ShopSystem({})", self.db_path)
    }
}

impl ShopWorld {
    pub fn system(&self) -> &ShopSystem {
        self.system.as_ref().expect("Shop not initialised")
    }

    pub fn order_id(&self, label: &str) -> OrderId {
        *self.orders.get(label).unwrap_or_else(|| panic!("No order labelled {label}"))
    }

    pub fn product_id(&self, name: &str) -> ProductId {
        *self.products.get(name).unwrap_or_else(|| panic!("No product named {name}"))
    }

    pub fn category_id(&self, name: &str) -> CategoryId {
        *self.categories.get(name).unwrap_or_else(|| panic!("No category named {name}"))
    }
}

impl ShopSystem {
    pub async fn new(policy: TransitionPolicy) -> Self {
        let url = random_db_path();
        create_database(&url).await;
        run_migrations(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating connection to database");
        debug!("🚀️ Created database: {url}");
        Self {
            db_path: url,
            orders: OrderFlowApi::new(db.clone(), policy),
            catalog: CatalogApi::new(db.clone()),
            analytics: SalesAnalyticsApi::new(db.clone()),
            db,
        }
    }
}
