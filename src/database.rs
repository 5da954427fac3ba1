use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::resources::{dock, port};

/// Opens the connection pool described by `config`.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    tracing::info!(backend = ?db.get_database_backend(), "database connection pool established");
    Ok(db)
}

/// Creates the `puerto` and `muelle` tables and their indexes when missing.
///
/// Ports first, docks reference them.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, port::Entity).await?;
    create_table(db, dock::Entity).await?;
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(backend.build(&table)).await?;

    for mut index in schema.create_index_from_entity(entity) {
        index.if_not_exists();
        db.execute(backend.build(&index)).await?;
    }

    tracing::debug!(table = entity.table_name(), "table ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{EntityTrait, PaginatorTrait};

    #[tokio::test]
    async fn test_create_schema_is_repeatable() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        create_schema(&db).await.unwrap();
        create_schema(&db).await.unwrap();

        assert_eq!(port::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(dock::Entity::find().count(&db).await.unwrap(), 0);
    }
}
