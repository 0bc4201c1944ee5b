// Whole-class emission session over a small but realistic model: an actor
// with a construction-script component, a changed array default and a shared
// asset dependency, emitted twice to pin determinism.

use bpnative_emit::config::NativizeOptions;
use bpnative_emit::deps::DependencyIndexAllocator;
use bpnative_emit::emit_class;
use bpnative_model::{ClassesFile, ModelRegistry, ObjectsFile};
use serde_json::json;

fn registry() -> ModelRegistry {
    let classes: ClassesFile = serde_json::from_value(json!({
        "classes": [
            {"path": "/Script/CoreUObject.Object", "name": "Object", "native": true},
            {"path": "/Script/Engine.Actor", "name": "Actor", "native": true,
             "super_path": "/Script/CoreUObject.Object",
             "properties": [
                {"name": "bHidden", "type": {"kind": "bool", "bitfield": true}}
             ],
             "cdo": 3},
            {"path": "/Script/Engine.ActorComponent", "name": "ActorComponent",
             "native": true, "super_path": "/Script/CoreUObject.Object"},
            {"path": "/Script/Engine.SceneComponent", "name": "SceneComponent",
             "native": true, "super_path": "/Script/Engine.ActorComponent"},
            {"path": "/Game/BP/BP_Turret.BP_Turret_C", "name": "BP_Turret_C",
             "converted": true,
             "super_path": "/Script/Engine.Actor",
             "properties": [
                {"name": "Base", "type": {"kind": "object",
                 "class_path": "/Script/Engine.SceneComponent"}},
                {"name": "Damage", "type": {"kind": "float"}},
                {"name": "TargetTags", "type": {"kind": "array",
                 "inner": {"kind": "name"}}},
                {"name": "Mesh", "type": {"kind": "object",
                 "class_path": "/Script/Engine.StaticMesh"}}
             ],
             "cdo": 0,
             "scs_nodes": [
                {"name": "Base",
                 "component_class": "/Script/Engine.SceneComponent",
                 "template": 1,
                 "children": []}
             ],
             "dependencies": ["/Game/Meshes/SM_Turret.SM_Turret"]}
        ]
    }))
    .unwrap();
    let objects: ObjectsFile = serde_json::from_value(json!({
        "objects": [
            {"path": "/Game/BP/BP_Turret.Default__BP_Turret_C",
             "name": "Default__BP_Turret_C",
             "package": "/Game/BP/BP_Turret",
             "class_path": "/Game/BP/BP_Turret.BP_Turret_C",
             "values": {
                "Damage": 25.0,
                "TargetTags": ["Hostile", "Neutral"],
                "Mesh": "/Game/Meshes/SM_Turret.SM_Turret"
             }},
            {"path": "/Game/BP/BP_Turret.BP_Turret_C:Base_GEN_VARIABLE",
             "name": "Base_GEN_VARIABLE",
             "package": "/Game/BP/BP_Turret",
             "class_path": "/Script/Engine.SceneComponent"},
            {"path": "/Game/Meshes/SM_Turret.SM_Turret",
             "name": "SM_Turret",
             "package": "/Game/Meshes/SM_Turret",
             "class_path": "/Script/Engine.StaticMesh"},
            {"path": "/Script/Engine.Default__Actor",
             "name": "Default__Actor",
             "package": "/Script/Engine",
             "class_path": "/Script/Engine.Actor",
             "values": {"bHidden": false}}
        ]
    }))
    .unwrap();
    ModelRegistry::new(classes.classes, Vec::new(), Vec::new(), objects.objects)
}

#[test]
fn full_session_emits_constructor_components_and_deltas() {
    let reg = registry();
    let class = reg.find_class("/Game/BP/BP_Turret.BP_Turret_C").unwrap();
    let mut allocator = DependencyIndexAllocator::new();
    let options = NativizeOptions::default();
    let out = emit_class(&reg, class, &mut allocator, &options);

    // Declaration side.
    assert!(out.header.contains("class ABP_Turret_C__pf"));
    assert!(out.header.contains(" : public AActor"));
    assert!(out.header.contains("float bpv__Damage;"));
    assert!(out.header.contains("TArray<FName> bpv__TargetTags;"));

    // Construction-script replay: the component is created, marked native
    // and becomes the root.
    assert!(out
        .body
        .contains("bpv__Base = CreateDefaultSubobject<USceneComponent>(TEXT(\"Base\"));"));
    assert!(out
        .body
        .contains("bpv__Base->CreationMethod = EComponentCreationMethod::Native;"));
    assert!(out.body.contains("RootComponent = bpv__Base;"));

    // Scalar and container deltas.
    assert!(out.body.contains("bpv__Damage = 25.000000f;"));
    assert!(out.body.contains("bpv__TargetTags = TArray<FName>();"));
    assert!(out.body.contains("bpv__TargetTags.Reserve(2);"));
    assert!(out.body.contains("bpv__TargetTags.Add(FName(TEXT(\"Hostile\")));"));
    assert!(out.body.contains("bpv__TargetTags.Add(FName(TEXT(\"Neutral\")));"));

    // The asset reference resolves through the used-assets array and lands
    // in the dependency table exactly once.
    assert!(allocator
        .records()
        .iter()
        .any(|r| r.path == "/Game/Meshes/SM_Turret.SM_Turret"));
    assert_eq!(
        allocator
            .records()
            .iter()
            .filter(|r| r.path == "/Game/Meshes/SM_Turret.SM_Turret")
            .count(),
        1
    );
}

#[test]
fn emission_is_deterministic_across_sessions() {
    let reg = registry();
    let class = reg.find_class("/Game/BP/BP_Turret.BP_Turret_C").unwrap();
    let options = NativizeOptions::default();

    let mut alloc_a = DependencyIndexAllocator::new();
    let a = emit_class(&reg, class, &mut alloc_a, &options);
    let mut alloc_b = DependencyIndexAllocator::new();
    let b = emit_class(&reg, class, &mut alloc_b, &options);

    assert_eq!(a.header, b.header);
    assert_eq!(a.body, b.body);
    let paths_a: Vec<&str> = alloc_a.records().iter().map(|r| r.path.as_str()).collect();
    let paths_b: Vec<&str> = alloc_b.records().iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths_a, paths_b);
}

#[test]
fn shared_dependency_keeps_one_index_across_classes() {
    let reg = registry();
    let class = reg.find_class("/Game/BP/BP_Turret.BP_Turret_C").unwrap();
    let options = NativizeOptions::default();

    let mut allocator = DependencyIndexAllocator::new();
    let first = emit_class(&reg, class, &mut allocator, &options);
    let records_after_first = allocator.len();
    let second = emit_class(&reg, class, &mut allocator, &options);

    // Re-emitting reuses every record instead of allocating new indices.
    assert_eq!(allocator.len(), records_after_first);
    assert_eq!(first.body, second.body);
}

#[test]
fn manifest_lookup_covers_all_allocated_records() {
    let reg = registry();
    let class = reg.find_class("/Game/BP/BP_Turret.BP_Turret_C").unwrap();
    let mut allocator = DependencyIndexAllocator::new();
    let options = NativizeOptions::default();
    emit_class(&reg, class, &mut allocator, &options);

    let body = allocator.emit_body_code("NativizedAssets_Dependencies");
    assert!(body.contains(&format!(
        "check((Index >= 0) && (Index < {}));",
        allocator.len()
    )));
    for record in allocator.records() {
        assert!(!record.native_line.is_empty());
        assert!(body.contains(&record.native_line));
    }
}
