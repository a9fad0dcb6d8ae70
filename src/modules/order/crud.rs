use crate::modules::order::model::Order;
use bson::doc;
use mongodb::{Collection, Database};

pub const COLLECTION_NAME: &str = "orders";

pub struct OrderCrud {
    collection: Collection<Order>,
}

impl OrderCrud {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(COLLECTION_NAME),
        }
    }

    pub async fn create_collection(db: &Database) -> Result<(), mongodb::error::Error> {
        db.create_collection(COLLECTION_NAME).await
    }

    pub async fn insert_many(&self, orders: &[Order], ordered: bool) -> Result<usize, mongodb::error::Error> {
        let result = self.collection.insert_many(orders).ordered(ordered).await?;
        Ok(result.inserted_ids.len())
    }

    pub async fn find_all(&self) -> Result<Vec<Order>, mongodb::error::Error> {
        use futures::TryStreamExt;

        let cursor = self.collection.find(doc! {}).sort(doc! { "_id": 1 }).await?;

        cursor.try_collect().await
    }

    pub async fn find_by_customer(&self, customer_id: i32) -> Result<Vec<Order>, mongodb::error::Error> {
        use futures::TryStreamExt;

        let cursor = self
            .collection
            .find(doc! { "customer_id": customer_id })
            .sort(doc! { "order_date": -1 })
            .await?;

        cursor.try_collect().await
    }

    pub async fn count(&self) -> Result<u64, mongodb::error::Error> {
        self.collection.count_documents(doc! {}).await
    }

    pub async fn drop(&self) -> Result<(), mongodb::error::Error> {
        self.collection.drop().await
    }
}
