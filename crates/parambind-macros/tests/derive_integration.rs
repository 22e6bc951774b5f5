//! Integration tests for `#[derive(Bindable)]`.

use parambind::{
    path_params_lookup, BindRequest, Bindable, FieldKind, FieldRole, FieldSlot, ParamValue,
    Parser, Record, StructTag,
};

#[derive(Bindable, Debug, Default, PartialEq)]
struct Filters {
    #[param = "query=tag"]
    pub tags: Vec<String>,
}

#[derive(Bindable, Debug, Default, PartialEq)]
struct ListUsers {
    #[param = "path=org"]
    pub org: String,
    #[tag(param = "query=limit", doc = "page size")]
    pub limit: Option<u32>,
    #[embed]
    pub filters: Option<Box<Filters>>,
    #[tag(json = "cursor")]
    pub cursor: String,
    #[param = "query=secret"]
    secret: String,
    pub r#type: Option<String>,
}

/// Carried for a serializer; not a request parameter type.
#[derive(Debug, Default, PartialEq)]
struct Meta;

#[derive(Bindable, Debug, Default, PartialEq)]
struct Annotated {
    #[tag(json = "meta")]
    pub meta: Meta,
    #[tag(json = "name", param = "query=name")]
    pub name: String,
}

#[derive(Bindable, Debug, Default, PartialEq)]
struct Wrapper<T: ParamValue + Default + 'static> {
    #[param = "query=value"]
    pub value: T,
}

#[test]
fn test_shape_lists_every_field() {
    let shape = ListUsers::shape();
    assert_eq!(shape.name(), "ListUsers");

    let fields: Vec<_> = shape
        .fields()
        .iter()
        .map(|f| (f.name(), f.is_exported()))
        .collect();
    assert_eq!(
        fields,
        [
            ("org", true),
            ("limit", true),
            ("filters", true),
            ("cursor", true),
            ("secret", false),
            ("type", true),
        ]
    );
}

#[test]
fn test_roles() {
    let shape = ListUsers::shape();
    let fields = shape.fields();

    match fields[1].role() {
        FieldRole::Value { kind } => {
            assert_eq!(kind(), FieldKind::Pointer(Box::new(FieldKind::Uint { bits: 32 })));
        }
        other => panic!("unexpected role {other:?}"),
    }
    match fields[2].role() {
        FieldRole::Embedded { pointer, shape } => {
            assert!(pointer);
            assert_eq!(shape().name(), "Filters");
        }
        other => panic!("unexpected role {other:?}"),
    }

    // Tagged for another consumer only.
    assert!(matches!(fields[3].role(), FieldRole::Opaque));
    // Unexported or untagged fields never bind.
    assert!(matches!(fields[4].role(), FieldRole::Opaque));
    assert!(matches!(fields[5].role(), FieldRole::Opaque));
}

#[test]
fn test_tags_keep_declaration_order() {
    let shape = ListUsers::shape();
    let tag = shape.fields()[1].tag();

    assert_eq!(
        tag.iter().collect::<Vec<_>>(),
        [("param", "query=limit"), ("doc", "page size")]
    );
    assert_eq!(*shape.fields()[5].tag(), StructTag::EMPTY);
}

#[test]
fn test_field_mut_matches_shape() {
    let mut users = ListUsers::default();

    assert!(matches!(users.field_mut(0), Some(FieldSlot::Value(_))));
    assert!(matches!(users.field_mut(2), Some(FieldSlot::Pointer(_))));
    assert!(users.field_mut(3).is_none());
    assert!(users.field_mut(4).is_none());
    assert!(users.field_mut(5).is_none());
}

#[test]
fn test_derived_struct_binds() {
    let request = BindRequest::builder()
        .uri("/orgs/acme/users?limit=5&tag=admin&secret=nope")
        .path_param("org", "acme")
        .build();

    let users: ListUsers = Parser::new()
        .with_path_param_fn(path_params_lookup())
        .bind(&request)
        .unwrap();

    assert_eq!(users.org, "acme");
    assert_eq!(users.limit, Some(5));
    assert_eq!(
        users.filters,
        Some(Box::new(Filters {
            tags: vec!["admin".into()],
        }))
    );
    assert_eq!(users.secret, "");
}

#[test]
fn test_generic_struct() {
    let request = BindRequest::builder().uri("/?value=12").build();

    let wrapped: Wrapper<u8> = Parser::new().bind(&request).unwrap();
    assert_eq!(wrapped.value, 12);
    assert_eq!(Wrapper::<u8>::shape().name(), "Wrapper");
}

#[test]
fn test_foreign_tags_do_not_require_param_value() {
    let request = BindRequest::builder().uri("/?name=ada&meta=ignored").build();

    let annotated: Annotated = Parser::new().bind(&request).unwrap();

    assert_eq!(
        annotated,
        Annotated {
            meta: Meta,
            name: "ada".into(),
        }
    );
    assert!(matches!(
        Annotated::shape().fields()[0].role(),
        FieldRole::Opaque
    ));
}
