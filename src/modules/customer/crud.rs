use crate::modules::customer::model::Customer;
use bson::doc;
use mongodb::{Collection, Database};

pub const COLLECTION_NAME: &str = "customers";

pub struct CustomerCrud {
    collection: Collection<Customer>,
}

impl CustomerCrud {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(COLLECTION_NAME),
        }
    }

    pub async fn create_collection(db: &Database) -> Result<(), mongodb::error::Error> {
        db.create_collection(COLLECTION_NAME).await
    }

    /// Returns how many documents were written. With `ordered = false` the
    /// server keeps going past duplicate keys and reports them afterwards.
    pub async fn insert_many(
        &self,
        customers: &[Customer],
        ordered: bool,
    ) -> Result<usize, mongodb::error::Error> {
        let result = self.collection.insert_many(customers).ordered(ordered).await?;
        Ok(result.inserted_ids.len())
    }

    pub async fn find_all(&self) -> Result<Vec<Customer>, mongodb::error::Error> {
        use futures::TryStreamExt;

        let cursor = self.collection.find(doc! {}).sort(doc! { "_id": 1 }).await?;

        cursor.try_collect().await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Customer>, mongodb::error::Error> {
        self.collection.find_one(doc! { "_id": id }).await
    }

    pub async fn count(&self) -> Result<u64, mongodb::error::Error> {
        self.collection.count_documents(doc! {}).await
    }

    pub async fn drop(&self) -> Result<(), mongodb::error::Error> {
        self.collection.drop().await
    }
}
