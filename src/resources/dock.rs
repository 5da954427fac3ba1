//! Docks (`muelle` table). Every dock belongs to one port.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::port;
use crate::filtering::{EntityKind, FieldDescriptor, FieldKind, QueryCriteria};
use crate::response::Page;
use crate::traits::Resource;
use crate::validation::{BodyField, BodyRule, BodySchema};

/// Allowed values of `tipo`.
pub const DOCK_TYPES: &[&str] = &["carga", "pasajeros", "granel"];

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "muelle")]
#[schema(as = Dock)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_muelle: i32,
    #[sea_orm(indexed)]
    pub id_puerto: i32,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub nombre: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    #[schema(value_type = String, example = "350.00")]
    pub longitud_m: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    #[schema(value_type = String, example = "16.00")]
    pub calado_m: Decimal,
    pub operativo: bool,
    pub fecha_construccion: NaiveDate,
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub tipo: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::port::Entity",
        from = "Column::IdPuerto",
        to = "super::port::Column::IdPuerto",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Port,
}

impl Related<super::port::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Port.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub type Dock = Model;

pub const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("id_muelle", FieldKind::Integer),
    FieldDescriptor::new("id_puerto", FieldKind::Integer),
    FieldDescriptor::new("nombre", FieldKind::Text),
    FieldDescriptor::new("longitud_m", FieldKind::Decimal),
    FieldDescriptor::new("calado_m", FieldKind::Decimal),
    FieldDescriptor::new("operativo", FieldKind::Boolean),
    FieldDescriptor::new("fecha_construccion", FieldKind::Date),
    FieldDescriptor::new("tipo", FieldKind::Text),
];

pub static BODY: BodySchema = BodySchema::new(&[
    BodyField::new("id_puerto", BodyRule::Integer { min: 1, max: 2_147_483_647 }),
    BodyField::new("nombre", BodyRule::Text { min: 2, max: 100 }),
    BodyField::new(
        "longitud_m",
        BodyRule::Number {
            min: Some(Decimal::ZERO),
            max: None,
        },
    ),
    BodyField::new(
        "calado_m",
        BodyRule::Number {
            min: Some(Decimal::ZERO),
            max: None,
        },
    ),
    BodyField::new("operativo", BodyRule::Boolean),
    BodyField::new("fecha_construccion", BodyRule::Date),
    BodyField::new("tipo", BodyRule::OneOf(DOCK_TYPES)),
]);

/// Name of the owning port, embedded in list rows.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PortName {
    pub nombre: String,
}

/// Dock as returned by `GET /api/muelles`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DockListItem {
    #[serde(flatten)]
    pub dock: Model,
    pub id_puerto_puerto: Option<PortName>,
}

impl From<Model> for DockListItem {
    fn from(dock: Model) -> Self {
        Self {
            dock,
            id_puerto_puerto: None,
        }
    }
}

/// Body of `POST /api/muelles` and `PUT /api/muelles/{id}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DockCreate {
    pub id_puerto: i32,
    pub nombre: String,
    #[schema(value_type = String, example = "350.00")]
    pub longitud_m: Decimal,
    #[schema(value_type = String, example = "16.00")]
    pub calado_m: Decimal,
    pub operativo: bool,
    pub fecha_construccion: NaiveDate,
    pub tipo: String,
}

impl From<DockCreate> for ActiveModel {
    fn from(data: DockCreate) -> Self {
        Self {
            id_muelle: NotSet,
            id_puerto: Set(data.id_puerto),
            nombre: Set(data.nombre),
            longitud_m: Set(data.longitud_m),
            calado_m: Set(data.calado_m),
            operativo: Set(data.operativo),
            fecha_construccion: Set(data.fecha_construccion),
            tipo: Set(data.tipo),
        }
    }
}

/// Body of `PATCH /api/muelles/{id}`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DockUpdate {
    pub id_puerto: Option<i32>,
    pub nombre: Option<String>,
    #[schema(value_type = Option<String>)]
    pub longitud_m: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub calado_m: Option<Decimal>,
    pub operativo: Option<bool>,
    pub fecha_construccion: Option<NaiveDate>,
    pub tipo: Option<String>,
}

impl From<DockUpdate> for ActiveModel {
    fn from(data: DockUpdate) -> Self {
        Self {
            id_muelle: NotSet,
            id_puerto: data.id_puerto.map_or(NotSet, Set),
            nombre: data.nombre.map_or(NotSet, Set),
            longitud_m: data.longitud_m.map_or(NotSet, Set),
            calado_m: data.calado_m.map_or(NotSet, Set),
            operativo: data.operativo.map_or(NotSet, Set),
            fecha_construccion: data.fecha_construccion.map_or(NotSet, Set),
            tipo: data.tipo.map_or(NotSet, Set),
        }
    }
}

#[async_trait]
impl Resource for Model {
    type EntityType = Entity;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = DockCreate;
    type UpdateModel = DockUpdate;
    type ListModel = DockListItem;

    const KIND: EntityKind = EntityKind::Dock;
    const ID_COLUMN: Column = Column::IdMuelle;
    const RESOURCE_NAME_SINGULAR: &'static str = "Muelle";
    const RESOURCE_NAME_PLURAL: &'static str = "muelles";
    const LABEL_SINGULAR: &'static str = "Dock";
    const LABEL_PLURAL: &'static str = "Docks";

    fn field_descriptors() -> &'static [FieldDescriptor] {
        FIELDS
    }

    fn body_schema() -> &'static BodySchema {
        &BODY
    }

    async fn find_many(db: &DatabaseConnection, criteria: &QueryCriteria) -> Result<Page<DockListItem>, DbErr> {
        let rows = Self::select(criteria)
            .find_also_related(port::Entity)
            .all(db)
            .await?;
        let count = Self::count(db, criteria).await?;

        let rows = rows
            .into_iter()
            .map(|(dock, port)| DockListItem {
                dock,
                id_puerto_puerto: port.map(|port| PortName { nombre: port.nombre }),
            })
            .collect();

        Ok(Page { rows, count })
    }

    /// Fails with `RecordNotFound` when the referenced port does not exist.
    async fn create(db: &DatabaseConnection, data: DockCreate) -> Result<Self, DbErr> {
        if port::Entity::find_by_id(data.id_puerto).one(db).await?.is_none() {
            return Err(DbErr::RecordNotFound(format!(
                "{} not found",
                <port::Model as Resource>::RESOURCE_NAME_SINGULAR
            )));
        }

        ActiveModel::from(data).insert(db).await
    }
}
