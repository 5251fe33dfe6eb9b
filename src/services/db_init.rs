use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // orders: listing by status, newest first
    {
        let col = db.collection::<mongodb::bson::Document>("orders");
        let model = IndexModel::builder()
            .keys(doc! { "status": 1, "last_modified": -1 })
            .build();

        col.create_index(model, None).await?;
    }

    // portfolios: one holding row per (user_id, security_id)
    {
        let col = db.collection::<mongodb::bson::Document>("portfolios");
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1, "security_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None).await?;
    }

    // actuaries: one credit profile per user
    {
        let col = db.collection::<mongodb::bson::Document>("actuaries");
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None).await?;
    }

    Ok(())
}
