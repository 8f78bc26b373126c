use mockall::mock;
use order_pipeline_engine::{
    db_types::{CustomerOrderRecord, NewOrder},
    traits::{OrderManagement, OrderStoreError},
};

mock! {
    pub OrderStore {}
    impl OrderManagement for OrderStore {
        async fn insert_order(&self, order: &NewOrder) -> Result<(CustomerOrderRecord, bool), OrderStoreError>;
        async fn fetch_orders_for_customer(&self, customer_id: i64) -> Result<Vec<CustomerOrderRecord>, OrderStoreError>;
    }
}
