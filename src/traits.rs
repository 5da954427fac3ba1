use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Value,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::filtering::schema::parse_date;
use crate::filtering::{
    EntityKind, FieldDescriptor, FieldKind, QueryCriteria, Scalar, SortDirection, fields::find_field,
};
use crate::response::Page;
use crate::validation::BodySchema;

/// A table exposed through the list / get / create / update / delete
/// endpoints.
///
/// Implemented on the entity's `Model`. Only `create` has to be written per
/// entity; the rest works from the associated types and
/// [`field_descriptors`](Resource::field_descriptors).
#[async_trait]
pub trait Resource: FromQueryResult + Serialize + Send + Sync + Sized + 'static {
    type EntityType: EntityTrait<Model = Self> + Sync;
    type ColumnType: ColumnTrait + Copy + Send + Sync;
    type ActiveModelType: ActiveModelTrait<Entity = Self::EntityType> + Send + Sync;
    /// Body of `POST` and `PUT`.
    type CreateModel: DeserializeOwned + Into<Self::ActiveModelType> + Send;
    /// Body of `PATCH`.
    type UpdateModel: DeserializeOwned + Into<Self::ActiveModelType> + Send;
    /// Row shape of list responses.
    type ListModel: From<Self> + Serialize + Send;

    const KIND: EntityKind;
    const ID_COLUMN: Self::ColumnType;
    /// Used in not-found messages, e.g. "Puerto".
    const RESOURCE_NAME_SINGULAR: &'static str;
    /// Used in the `Content-Range` header, e.g. "puertos".
    const RESOURCE_NAME_PLURAL: &'static str;
    /// Used in success messages, e.g. "Port".
    const LABEL_SINGULAR: &'static str;
    const LABEL_PLURAL: &'static str;

    /// Attributes clients may filter and sort on.
    fn field_descriptors() -> &'static [FieldDescriptor];

    fn body_schema() -> &'static BodySchema;

    /// Resolves a declared field name to its column.
    #[must_use]
    fn column(name: &str) -> Option<(Self::ColumnType, FieldKind)> {
        let field = find_field(Self::field_descriptors(), name)?;
        match name.parse::<Self::ColumnType>() {
            Ok(column) => Some((column, field.kind)),
            Err(_) => {
                tracing::warn!(entity = %Self::KIND, field = name, "declared field has no column");
                None
            }
        }
    }

    /// Builds the WHERE clause for `criteria`. Unresolvable fields are skipped.
    #[must_use]
    fn condition(criteria: &QueryCriteria) -> Condition {
        let mut condition = Condition::all();

        for (name, value) in &criteria.equals {
            if let Some((column, kind)) = Self::column(name) {
                condition = condition.add(column.eq(bind_value(kind, value)));
            }
        }

        for (name, range) in &criteria.ranges {
            let Some((column, kind)) = Self::column(name) else {
                continue;
            };
            let gte = range.gte.as_ref().map(|value| bind_value(kind, value));
            let lte = range.lte.as_ref().map(|value| bind_value(kind, value));

            condition = match (gte, lte) {
                (Some(min), Some(max)) => condition.add(column.between(min, max)),
                (Some(min), None) => condition.add(column.gte(min)),
                (None, Some(max)) => condition.add(column.lte(max)),
                (None, None) => condition,
            };
        }

        condition
    }

    /// Filtered, ordered and paged query for `criteria`. Sort defaults to the
    /// primary key, ascending.
    #[must_use]
    fn select(criteria: &QueryCriteria) -> Select<Self::EntityType> {
        let (order_column, order_direction) = criteria
            .order
            .as_ref()
            .and_then(|sort| {
                let (column, _) = Self::column(&sort.field)?;
                let direction = match sort.direction {
                    SortDirection::Asc => Order::Asc,
                    SortDirection::Desc => Order::Desc,
                };
                Some((column, direction))
            })
            .unwrap_or((Self::ID_COLUMN, Order::Asc));

        Self::EntityType::find()
            .filter(Self::condition(criteria))
            .order_by(order_column, order_direction)
            .offset(criteria.offset)
            .limit(criteria.limit)
    }

    /// Rows matching `criteria` ignoring the page window.
    async fn count(db: &DatabaseConnection, criteria: &QueryCriteria) -> Result<u64, DbErr> {
        Self::EntityType::find()
            .filter(Self::condition(criteria))
            .count(db)
            .await
    }

    async fn find_many(db: &DatabaseConnection, criteria: &QueryCriteria) -> Result<Page<Self::ListModel>, DbErr> {
        let rows = Self::select(criteria).all(db).await?;
        let count = Self::count(db, criteria).await?;

        Ok(Page {
            rows: rows.into_iter().map(Into::into).collect(),
            count,
        })
    }

    async fn get_one(db: &DatabaseConnection, id: i32) -> Result<Self, DbErr> {
        Self::EntityType::find()
            .filter(Self::ID_COLUMN.eq(id))
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("{} not found", Self::RESOURCE_NAME_SINGULAR)))
    }

    async fn create(db: &DatabaseConnection, data: Self::CreateModel) -> Result<Self, DbErr>;

    /// Applies the set fields of `changes` to row `id` and returns the number
    /// of rows affected.
    async fn update(db: &DatabaseConnection, id: i32, changes: Self::ActiveModelType) -> Result<u64, DbErr> {
        let result = Self::EntityType::update_many()
            .set(changes)
            .filter(Self::ID_COLUMN.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete(db: &DatabaseConnection, id: i32) -> Result<u64, DbErr> {
        let result = Self::EntityType::delete_many()
            .filter(Self::ID_COLUMN.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

/// Converts a coerced query value into a parameter of the column's type.
///
/// Values that do not fit the column are bound as text and left to the
/// database to compare.
#[must_use]
pub fn bind_value(kind: FieldKind, value: &Scalar) -> Value {
    match (kind, value) {
        (FieldKind::Integer, Scalar::Integer(number)) => (*number).into(),
        (FieldKind::Decimal, Scalar::Integer(number)) => rust_decimal::Decimal::from(*number).into(),
        (FieldKind::Integer | FieldKind::Decimal, Scalar::Decimal(number)) => (*number).into(),
        (FieldKind::Boolean, Scalar::Bool(flag)) => (*flag).into(),
        (FieldKind::Date, Scalar::Text(text)) => match parse_date(text) {
            Some(date) => date.into(),
            None => text.clone().into(),
        },
        (_, other) => other.to_string().into(),
    }
}
