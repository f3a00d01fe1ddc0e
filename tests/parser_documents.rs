//! End-to-end parses of complete documents
//!
//! These tests parse the sample under `docs/samples/` and check the model a generator would
//! see: packages, inheritance, overloads, decorators and the canonical text form.

use std::fs;
use webidl::webidl::model::{Decorated, IdlType};
use webidl::{parse, ErrorKind, Model, Warning};

fn read_sample_document(path: &str) -> String {
    fs::read_to_string(path).expect("Failed to read sample document")
}

fn sample_model() -> Model {
    let content = read_sample_document("docs/samples/physx-subset.idl");
    parse(&content).expect("sample parses")
}

#[test]
fn test_sample_declarations_in_order() {
    let model = sample_model();
    let interfaces: Vec<_> = model.interfaces().iter().map(|i| i.name.as_str()).collect();
    assert_eq!(
        interfaces,
        vec![
            "PxFoundation",
            "PxVec3",
            "PxBase",
            "PxActor",
            "PxRigidActor",
            "PxScene"
        ]
    );
    assert_eq!(model.dictionaries().len(), 1);
    assert_eq!(model.enums().len(), 2);
    assert_eq!(model.typedefs().len(), 1);
    assert_eq!(model.namespaces().len(), 1);
}

#[test]
fn test_sample_packages() {
    let model = sample_model();
    let packages: Vec<_> = model.collect_packages().into_iter().collect();
    assert_eq!(packages, vec!["physx.foundation", "physx.scene"]);

    let foundation: Vec<_> = model
        .interfaces_by_package("physx.foundation")
        .iter()
        .map(|i| i.name.as_str())
        .collect();
    assert_eq!(foundation, vec!["PxFoundation", "PxVec3"]);
    assert_eq!(model.enums_by_package("physx.scene").len(), 2);
    assert_eq!(model.dictionaries_by_package("physx.scene").len(), 1);
}

#[test]
fn test_sample_decorators() {
    let model = sample_model();
    let foundation = model.interface("PxFoundation").unwrap();
    assert_eq!(foundation.decorators.len(), 2);
    assert!(foundation.has_decorator("NoDelete"));
    assert_eq!(foundation.decorator("NoDelete").unwrap().value, None);
    assert_eq!(foundation.decorator_value("Prefix", ""), "Px");

    let vec3 = model.interface("PxVec3").unwrap();
    assert!(vec3.function("getNormalized").unwrap().has_decorator("Value"));
    let dot = vec3.function("dot").unwrap();
    assert!(dot.parameters[0].has_decorator("Const"));
    assert!(dot.parameters[0].has_decorator("Ref"));

    let desc = model.dictionary("PxSceneDesc").unwrap();
    assert!(desc.member("sanityBounds").unwrap().has_decorator("Ref"));
    assert!(model.typedef("PxU32").unwrap().has_decorator("Const"));
}

#[test]
fn test_sample_constructors() {
    let model = sample_model();
    let vec3 = model.interface("PxVec3").unwrap();
    let arities: Vec<_> = vec3.constructors().map(|c| c.parameters.len()).collect();
    assert_eq!(arities, vec![0, 3]);
    for constructor in vec3.constructors() {
        assert_eq!(constructor.return_type, IdlType::simple("PxVec3"));
    }
    assert_eq!(vec3.attributes.len(), 3);
}

#[test]
fn test_sample_inheritance() {
    let model = sample_model();
    assert_eq!(
        model.interface("PxActor").unwrap().super_interfaces,
        vec!["PxBase"]
    );
    let rigid = model.interface("PxRigidActor").unwrap();
    let chain: Vec<_> = model
        .all_super_interfaces_of(rigid)
        .iter()
        .map(|i| i.name.as_str())
        .collect();
    assert_eq!(chain, vec!["PxActor", "PxBase"]);
}

#[test]
fn test_sample_partial_interface_and_overloads() {
    let model = sample_model();
    let scene = model.interface("PxScene").unwrap();
    let functions: Vec<_> = scene.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        functions,
        vec!["setGravity", "simulate", "addActor", "addActor", "create"]
    );
    assert!(scene.function("create").unwrap().is_static);
    assert_eq!(scene.setlike, Some(IdlType::simple("PxActor")));

    let simulate = scene.function("simulate").unwrap();
    assert!(simulate.return_type.type_name() == "boolean");
    assert!(simulate.parameters[1].is_optional);
    assert_eq!(simulate.parameters[1].default_value.as_deref(), Some("true"));

    assert_eq!(model.warnings().len(), 2);
    for warning in model.warnings() {
        assert_eq!(
            warning,
            &Warning::DuplicateArity {
                interface: "PxScene".to_string(),
                function: "addActor".to_string(),
                arity: 1,
            }
        );
    }
}

#[test]
fn test_sample_dictionary_and_enums() {
    let model = sample_model();
    let desc = model.dictionary("PxSceneDesc").unwrap();
    let gravity = desc.member("gravity").unwrap();
    assert!(gravity.required);
    assert_eq!(gravity.idl_type.type_name(), "PxVec3");
    let blocks = desc.member("maxNbContactDataBlocks").unwrap();
    assert!(!blocks.required);
    assert_eq!(blocks.default_value.as_deref(), Some("65536"));

    assert!(model.is_enum_type(&IdlType::simple("PxForceMode")));
    assert_eq!(model.enumeration("PxForceMode").unwrap().values.len(), 4);
    assert!(model.enumeration("PxEmpty").unwrap().values.is_empty());
}

#[test]
fn test_sample_namespace_and_typedef() {
    let model = sample_model();
    let version = model.namespace("PxVersion").unwrap();
    assert_eq!(version.constants.len(), 2);
    assert_eq!(version.constant("PX_PATCH").unwrap().value, "3");
    assert_eq!(
        model.resolve_type(&IdlType::simple("PxU32")),
        IdlType::simple("unsigned long")
    );
}

#[test]
fn test_sample_canonical_form_reparses() {
    let model = sample_model();
    let canonical = model.to_string();
    let reparsed = parse(&canonical).expect("canonical form parses");
    assert_eq!(reparsed, model);
    assert_eq!(reparsed.to_string(), canonical);
}

#[test]
fn test_sample_serializes_to_json() {
    let model = sample_model();
    let json: serde_json::Value = serde_json::from_str(&model.to_json().unwrap()).unwrap();
    assert_eq!(json["interfaces"][0]["name"], "PxFoundation");
    assert_eq!(json["interfaces"][0]["source_package"], "physx.foundation");
    assert_eq!(json["enums"][0]["values"][0], "eFORCE");
}

#[test]
fn test_empty_document() {
    let model = parse("// nothing here\n").unwrap();
    assert!(model.interfaces().is_empty());
    assert!(model.collect_packages().is_empty());
}

#[test]
fn test_truncated_document() {
    let content = read_sample_document("docs/samples/physx-subset.idl");
    let cut = content.find("void setGravity").unwrap() + "void setGravity(".len();
    let err = parse(&content[..cut]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::StreamExhausted);
    assert_eq!(err.stack, vec!["interface PxScene", "function setGravity"]);
}

#[test]
fn test_single_letter_type_names() {
    let model = parse(
        "interface A {};\n\
         interface B {\n  A get();\n  void set(A a);\n  attribute A current;\n};\n\
         dictionary D {\n  A a;\n};",
    )
    .unwrap();
    let b = model.interface("B").unwrap();
    assert_eq!(b.function("get").unwrap().return_type, IdlType::simple("A"));
    assert_eq!(b.function("set").unwrap().parameters[0].idl_type, IdlType::simple("A"));
    assert_eq!(b.attribute("current").unwrap().idl_type, IdlType::simple("A"));
    assert_eq!(model.dictionary("D").unwrap().members[0].idl_type, IdlType::simple("A"));
}

#[test]
fn test_string_literals_are_kept_verbatim() {
    let model = parse(
        "enum Scheme { \"a  b\", \"http://x\", \"y\" };\n\
         dictionary Options {\n  DOMString label = \"a  b\";\n};",
    )
    .unwrap();
    assert_eq!(
        model.enumeration("Scheme").unwrap().values,
        vec!["a  b", "http://x", "y"]
    );
    let label = &model.dictionary("Options").unwrap().members[0];
    assert_eq!(label.default_value.as_deref(), Some("\"a  b\""));
    assert_eq!(parse(&model.to_string()).unwrap(), model);
}

#[test]
fn test_decorated_parameter_after_comma() {
    let model = parse("interface A {\n  void f(long x, [Const, Ref] A other);\n};").unwrap();
    let f = model.interface("A").unwrap().function("f").unwrap();
    assert_eq!(f.parameters.len(), 2);
    assert!(f.parameters[0].decorators.is_empty());
    assert!(f.parameters[1].has_decorator("Ref"));
}
