//! Ports (`puerto` table).

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::filtering::{EntityKind, FieldDescriptor, FieldKind};
use crate::traits::Resource;
use crate::validation::{BodyField, BodyRule, BodySchema};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "puerto")]
#[schema(as = Port)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_puerto: i32,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub nombre: String,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub ciudad: String,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub pais: String,
    pub capacidad_teu: i32,
    pub activo: bool,
    pub fecha_inauguracion: NaiveDate,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    #[schema(value_type = String, example = "14.50")]
    pub profundidad_media: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::dock::Entity")]
    Dock,
}

impl Related<super::dock::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dock.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub type Port = Model;

const MAX_I32: i64 = 2_147_483_647;

pub const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("id_puerto", FieldKind::Integer),
    FieldDescriptor::new("nombre", FieldKind::Text),
    FieldDescriptor::new("ciudad", FieldKind::Text),
    FieldDescriptor::new("pais", FieldKind::Text),
    FieldDescriptor::new("capacidad_teu", FieldKind::Integer),
    FieldDescriptor::new("activo", FieldKind::Boolean),
    FieldDescriptor::new("fecha_inauguracion", FieldKind::Date),
    FieldDescriptor::new("profundidad_media", FieldKind::Decimal),
];

pub static BODY: BodySchema = BodySchema::new(&[
    BodyField::new("nombre", BodyRule::Text { min: 2, max: 100 }),
    BodyField::new("ciudad", BodyRule::Text { min: 2, max: 100 }),
    BodyField::new("pais", BodyRule::Text { min: 2, max: 100 }),
    BodyField::new("capacidad_teu", BodyRule::Integer { min: 0, max: MAX_I32 }),
    BodyField::new("activo", BodyRule::Boolean),
    BodyField::new("fecha_inauguracion", BodyRule::Date),
    BodyField::new(
        "profundidad_media",
        BodyRule::Number {
            min: Some(Decimal::ZERO),
            max: Some(Decimal::from_parts(99_999, 0, 0, false, 2)),
        },
    ),
]);

/// Body of `POST /api/puertos` and `PUT /api/puertos/{id}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PortCreate {
    pub nombre: String,
    pub ciudad: String,
    pub pais: String,
    pub capacidad_teu: i32,
    pub activo: bool,
    pub fecha_inauguracion: NaiveDate,
    #[schema(value_type = String, example = "14.50")]
    pub profundidad_media: Decimal,
}

impl From<PortCreate> for ActiveModel {
    fn from(data: PortCreate) -> Self {
        Self {
            id_puerto: NotSet,
            nombre: Set(data.nombre),
            ciudad: Set(data.ciudad),
            pais: Set(data.pais),
            capacidad_teu: Set(data.capacidad_teu),
            activo: Set(data.activo),
            fecha_inauguracion: Set(data.fecha_inauguracion),
            profundidad_media: Set(data.profundidad_media),
        }
    }
}

/// Body of `PATCH /api/puertos/{id}`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PortUpdate {
    pub nombre: Option<String>,
    pub ciudad: Option<String>,
    pub pais: Option<String>,
    pub capacidad_teu: Option<i32>,
    pub activo: Option<bool>,
    pub fecha_inauguracion: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub profundidad_media: Option<Decimal>,
}

impl From<PortUpdate> for ActiveModel {
    fn from(data: PortUpdate) -> Self {
        Self {
            id_puerto: NotSet,
            nombre: data.nombre.map_or(NotSet, Set),
            ciudad: data.ciudad.map_or(NotSet, Set),
            pais: data.pais.map_or(NotSet, Set),
            capacidad_teu: data.capacidad_teu.map_or(NotSet, Set),
            activo: data.activo.map_or(NotSet, Set),
            fecha_inauguracion: data.fecha_inauguracion.map_or(NotSet, Set),
            profundidad_media: data.profundidad_media.map_or(NotSet, Set),
        }
    }
}

#[async_trait]
impl Resource for Model {
    type EntityType = Entity;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = PortCreate;
    type UpdateModel = PortUpdate;
    type ListModel = Model;

    const KIND: EntityKind = EntityKind::Port;
    const ID_COLUMN: Column = Column::IdPuerto;
    const RESOURCE_NAME_SINGULAR: &'static str = "Puerto";
    const RESOURCE_NAME_PLURAL: &'static str = "puertos";
    const LABEL_SINGULAR: &'static str = "Port";
    const LABEL_PLURAL: &'static str = "Ports";

    fn field_descriptors() -> &'static [FieldDescriptor] {
        FIELDS
    }

    fn body_schema() -> &'static BodySchema {
        &BODY
    }

    async fn create(db: &DatabaseConnection, data: PortCreate) -> Result<Self, DbErr> {
        ActiveModel::from(data).insert(db).await
    }
}
