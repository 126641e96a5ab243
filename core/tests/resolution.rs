use clientgen_core::oas::{
    build_document, parse_openapi_document, RefResolver, ResolutionContext, SchemaItems,
    SchemaResolver,
};
use clientgen_core::AppError;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::rc::Rc;

const PETSTORE: &str = r#"
openapi: 3.0.3
info:
  title: Petstore
  version: 1.0.0
paths:
  /pets:
    get:
      operationId: listPets
      parameters:
        - name: class
          in: query
          schema:
            type: string
            description: __safety_key__(klass)
        - name: limit
          in: query
          schema: {type: integer, format: int32}
      responses:
        '200':
          description: A list of pets
          content:
            application/json:
              schema:
                type: array
                items: {$ref: '#/components/schemas/Pet'}
        default:
          description: unexpected error
    post:
      operationId: createPet
      requestBody:
        required: true
        content:
          application/json:
            schema: {$ref: '#/components/schemas/NewPet'}
      responses:
        '201':
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Pet'}
  /pets/{petId}:
    parameters:
      - {name: petId, in: path, required: true, schema: {type: string}}
    get:
      operationId: showPetById
      responses:
        '200':
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Pet'}
    options:
      responses:
        '200': {description: allowed}
components:
  schemas:
    Pet:
      allOf:
        - $ref: '#/components/schemas/NewPet'
        - type: object
          required: [id]
          properties:
            id: {type: integer, format: int64}
    NewPet:
      type: object
      required: [name]
      properties:
        name: {type: string}
        tag: {type: string}
        owner: {$ref: '#/components/schemas/Owner'}
    Owner:
      type: object
      properties:
        pets:
          type: array
          items: {$ref: '#/components/schemas/Pet'}
        status:
          type: string
          enum: [active, banned]
    User:
      type: object
      properties:
        id: {type: string}
        data: {type: integer}
      required: [id]
    Category:
      type: object
      properties:
        name: {type: string}
        parent: {$ref: '#/components/schemas/Category'}
        children:
          type: array
          items: {$ref: '#/components/schemas/Category'}
"#;

fn load(yaml: &str) -> Value {
    serde_yaml::from_str(yaml).unwrap()
}

#[test]
fn reference_resolves_like_inline_fragment() {
    let doc = load(PETSTORE);
    let schemas = SchemaResolver::new(RefResolver::new(&doc));

    let mut by_ref_ctx = ResolutionContext::new();
    let by_ref = schemas
        .resolve_reference(&mut by_ref_ctx, "#/components/schemas/User", false)
        .unwrap();

    let mut inline_ctx = ResolutionContext::new();
    let inline = schemas
        .resolve_schema(&mut inline_ctx, "User", &doc["components"]["schemas"]["User"], false)
        .unwrap();

    assert_eq!(by_ref, inline);
}

#[test]
fn self_reference_is_cut_with_placeholder() {
    let model = parse_openapi_document(PETSTORE).unwrap();
    let category = model.schema("Category").unwrap();

    assert!(!category.is_placeholder);
    assert_eq!(category.properties.len(), 3);

    let parent = &category.properties[1].schema;
    assert!(parent.is_placeholder);
    assert!(parent.properties.is_empty());

    let children = &category.properties[2].schema;
    let Some(SchemaItems::Single(child)) = &children.items else {
        panic!("expected single items");
    };
    assert!(child.is_placeholder);
}

#[test]
fn sorted_schemas_place_dependencies_first() {
    let model = parse_openapi_document(PETSTORE).unwrap();
    let sorted = model.sorted_schemas();
    let position = |id: &str| sorted.iter().position(|n| n.id == id);

    for node in &sorted {
        let own = position(&node.id).unwrap();
        let deps = node
            .all_of
            .iter()
            .chain(node.properties.iter().map(|p| &p.schema))
            .filter(|dep| dep.id != node.id);
        for dep in deps {
            if let Some(dep_position) = position(&dep.id) {
                let cyclic = dep.is_placeholder;
                assert!(
                    cyclic || dep_position < own,
                    "{} must precede {}",
                    dep.id,
                    node.id
                );
            }
        }
    }

    let ids: Vec<_> = sorted.iter().map(|n| n.id.as_str()).collect();
    assert!(ids.contains(&"Pet_item_1"));
    assert!(!ids.contains(&"pets_list"));
}

#[test]
fn resolution_is_deterministic() {
    let doc = load(PETSTORE);
    let first = build_document(&doc).unwrap();
    let second = build_document(&doc).unwrap();

    assert_eq!(first, second);
    let order = |m: &clientgen_core::DocumentModel| -> Vec<String> {
        m.sorted_schemas().iter().map(|n| n.id.clone()).collect()
    };
    assert_eq!(order(&first), order(&second));
    let keys = |m: &clientgen_core::DocumentModel| -> Vec<String> {
        m.all_schemas.keys().cloned().collect()
    };
    assert_eq!(keys(&first), keys(&second));
}

#[test]
fn named_schemas_are_shared() {
    let model = parse_openapi_document(PETSTORE).unwrap();
    let pet = model.schema("Pet").unwrap();
    let show = model
        .operations()
        .find(|(_, _, op)| op.fn_name == "show_pet_by_id")
        .map(|(_, _, op)| op.responses["200"].schema.clone().unwrap())
        .unwrap();
    assert!(Rc::ptr_eq(pet, &show));
}

#[test]
fn safety_key_on_parameter_wins() {
    let model = parse_openapi_document(PETSTORE).unwrap();
    let (_, _, list) = model
        .operations()
        .find(|(_, _, op)| op.fn_name == "list_pets")
        .unwrap();
    assert_eq!(list.parameters[0].resolved_key, "klass");
    assert_eq!(list.parameters[1].resolved_key, "limit");
}

#[test]
fn operations_skip_unsupported_methods_and_default_responses() {
    let model = parse_openapi_document(PETSTORE).unwrap();
    let ops: Vec<_> = model
        .operations()
        .map(|(path, method, op)| format!("{} {} {}", method, path, op.fn_name))
        .collect();
    assert_eq!(
        ops,
        vec![
            "get /pets list_pets",
            "post /pets create_pet",
            "get /pets/{petId} show_pet_by_id",
        ]
    );

    let (_, _, list) = model.operations().next().unwrap();
    let statuses: Vec<_> = list.responses.keys().cloned().collect();
    assert_eq!(statuses, vec!["200".to_string()]);

    let (_, _, show) = model.operations().nth(2).unwrap();
    assert_eq!(show.path_params()[0].original_key, "petId");
}

#[test]
fn missing_discriminator_mapping_aborts() {
    let err = parse_openapi_document(
        r#"
openapi: 3.0.3
info: {title: Shapes, version: '1'}
components:
  schemas:
    Circle: {type: object, properties: {r: {type: number}}}
    Shape:
      type: object
      discriminator:
        propertyName: kind
      properties:
        kind: {type: string}
"#,
    )
    .unwrap_err();

    match &err {
        AppError::InvalidDiscriminator { fragment, .. } => {
            assert_eq!(fragment["discriminator"]["propertyName"], "kind");
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(err.fragment().is_some());
}

#[test]
fn unresolvable_reference_names_segment() {
    let err = parse_openapi_document(
        r#"
openapi: 3.0.3
info: {title: Broken, version: '1'}
components:
  schemas:
    Pet:
      type: object
      properties:
        owner: {$ref: '#/components/schemas/Person'}
"#,
    )
    .unwrap_err();
    match err {
        AppError::UnresolvableReference { segment, .. } => assert_eq!(segment, "Person"),
        other => panic!("unexpected error {other}"),
    }
}
