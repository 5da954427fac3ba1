//! OpenAPI document served at `/api/openapi.json`.
//!
//! Component schemas come from the `ToSchema` derives; paths are generated
//! per [`Resource`] so the documented filter parameters always match the
//! registered query schema.

use utoipa::OpenApi;
use utoipa::openapi::content::ContentBuilder;
use utoipa::openapi::path::{HttpMethod, OperationBuilder, ParameterBuilder, ParameterIn, PathItemBuilder};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::response::ResponseBuilder;
use utoipa::openapi::schema::{ObjectBuilder, Ref, Schema, Type};
use utoipa::openapi::{RefOr, Required};

use crate::filtering::QuerySchema;
use crate::filtering::schema::ValueRule;
use crate::resources::{Dock, Port, dock, port};
use crate::traits::Resource;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "harborcrate",
        description = "Ports and docks with validated filtering, sorting and pagination"
    ),
    components(schemas(
        port::Model,
        port::PortCreate,
        port::PortUpdate,
        dock::Model,
        dock::DockCreate,
        dock::DockUpdate,
        dock::DockListItem,
        dock::PortName
    ))
)]
pub struct ApiDoc;

/// Full document: derived components plus the generated resource paths.
#[must_use]
pub fn document() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    add_resource_paths::<Port>(&mut doc);
    add_resource_paths::<Dock>(&mut doc);
    doc
}

fn add_resource_paths<T: Resource>(doc: &mut utoipa::openapi::OpenApi) {
    let tag = T::RESOURCE_NAME_PLURAL;
    let collection = format!("/api/{tag}");
    let member = format!("/api/{tag}/{{id}}");
    let item_ref = T::LABEL_SINGULAR;

    let mut list = OperationBuilder::new()
        .tags(Some(vec![tag.to_string()]))
        .operation_id(Some(format!("list_{tag}")))
        .summary(Some(format!("List {tag}")))
        .response("200", json_response(&format!("{} successfully recovered", T::LABEL_PLURAL), item_ref))
        .response("400", plain_response("Invalid query parameters"));
    for parameter in query_parameters(&QuerySchema::build(T::field_descriptors())) {
        list = list.parameter(parameter);
    }

    let create = OperationBuilder::new()
        .tags(Some(vec![tag.to_string()]))
        .operation_id(Some(format!("create_{tag}")))
        .request_body(Some(json_body(&format!("{item_ref}Create"))))
        .response("201", json_response(&format!("{item_ref} created correctly"), item_ref))
        .response("400", plain_response("Invalid request data"))
        .response("409", plain_response("Constraint violation"));

    doc.paths.paths.insert(
        collection,
        PathItemBuilder::new()
            .operation(HttpMethod::Get, list.build())
            .operation(HttpMethod::Post, create.build())
            .build(),
    );

    let member_op = |action: &str| {
        OperationBuilder::new()
            .tags(Some(vec![tag.to_string()]))
            .operation_id(Some(format!("{action}_{tag}")))
            .parameter(
                ParameterBuilder::new()
                    .name("id")
                    .parameter_in(ParameterIn::Path)
                    .required(Required::True)
                    .schema(Some(primitive(Type::Integer))),
            )
            .response("400", plain_response("Invalid identifier"))
            .response("404", plain_response("Not found"))
    };

    doc.paths.paths.insert(
        member,
        PathItemBuilder::new()
            .operation(
                HttpMethod::Get,
                member_op("get")
                    .response("200", json_response(&format!("{item_ref} recovered correctly"), item_ref))
                    .build(),
            )
            .operation(
                HttpMethod::Put,
                member_op("replace")
                    .request_body(Some(json_body(&format!("{item_ref}Create"))))
                    .response("200", plain_response("Number of updated rows"))
                    .build(),
            )
            .operation(
                HttpMethod::Patch,
                member_op("update")
                    .request_body(Some(json_body(&format!("{item_ref}Update"))))
                    .response("200", plain_response("Number of updated rows"))
                    .build(),
            )
            .operation(
                HttpMethod::Delete,
                member_op("delete").response("204", plain_response("Deleted")).build(),
            )
            .build(),
    );
}

/// One optional query parameter per accepted key, plus `limit`, `offset`
/// and `order`.
fn query_parameters(schema: &QuerySchema) -> Vec<ParameterBuilder> {
    let mut parameters = vec![
        query_parameter("limit", Type::Integer, "Page size, 1 to 1000 (default 100)"),
        query_parameter("offset", Type::Integer, "Rows to skip (default 0)"),
        query_parameter("order", Type::String, "Sort directive `<field>:asc|desc`"),
    ];

    for (key, rule) in schema.filter().keys() {
        let schema_type = match rule {
            ValueRule::Integer => Type::Integer,
            ValueRule::Number => Type::Number,
            ValueRule::Boolean => Type::Boolean,
            ValueRule::Date | ValueRule::Text => Type::String,
        };
        parameters.push(query_parameter(key, schema_type, rule.type_name()));
    }

    parameters
}

fn query_parameter(name: &str, schema_type: Type, description: &str) -> ParameterBuilder {
    ParameterBuilder::new()
        .name(name)
        .parameter_in(ParameterIn::Query)
        .required(Required::False)
        .description(Some(description))
        .schema(Some(primitive(schema_type)))
}

fn primitive(schema_type: Type) -> RefOr<Schema> {
    RefOr::T(Schema::Object(ObjectBuilder::new().schema_type(schema_type).build()))
}

fn json_response(description: &str, schema_name: &str) -> utoipa::openapi::Response {
    ResponseBuilder::new()
        .description(description)
        .content(
            "application/json",
            ContentBuilder::new()
                .schema(Some(Ref::from_schema_name(schema_name)))
                .build(),
        )
        .build()
}

fn plain_response(description: &str) -> utoipa::openapi::Response {
    ResponseBuilder::new().description(description).build()
}

fn json_body(schema_name: &str) -> utoipa::openapi::request_body::RequestBody {
    RequestBodyBuilder::new()
        .content(
            "application/json",
            ContentBuilder::new()
                .schema(Some(Ref::from_schema_name(schema_name)))
                .build(),
        )
        .required(Some(Required::True))
        .build()
}
