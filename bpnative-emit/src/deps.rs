// Dependency graph builder: one deduplicated, globally indexed record table
// for every external object referenced by the generated code, plus the two
// per-class functions the runtime loader calls to populate its asset list.
//
// Indices are handed out by a `DependencyIndexAllocator` owned by the
// pipeline driver and passed into every emission session, so the table stays
// consistent across classes without any global state.

use std::collections::HashSet;
use std::fmt;

use bpnative_ue_flags::CLASS_INTERFACE;
use bpnative_model::{ClassModel, ModelRegistry, StructModel, TypeDesc};
use serde_json::Value;

use crate::code_text::CodeText;
use crate::config::{NativizeOptions, PlatformFilter};
use crate::context::EmitterContext;
use crate::literals::escape_cpp_string;
use crate::naming;

const CORE_UOBJECT_PACKAGE: &str = "/Script/CoreUObject";
const USER_DEFINED_ENUM_PATH: &str = "/Script/Engine.UserDefinedEnum";
const USER_DEFINED_STRUCT_PATH: &str = "/Script/Engine.UserDefinedStruct";
const BPGC_PATH: &str = "/Script/Engine.BlueprintGeneratedClass";

/// One entry of the shared dependency table. The native line is built once,
/// the first time any class references the object.
pub struct DependencyRecord {
    pub path: String,
    pub native_line: String,
}

/// Monotonic index assignment for dependency records. Lookup-or-insert and
/// index assignment happen as one step; an index is never reused or
/// renumbered within a program run.
#[derive(Default)]
pub struct DependencyIndexAllocator {
    records: Vec<DependencyRecord>,
    by_path: std::collections::HashMap<String, i16>,
}

impl DependencyIndexAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_or_add(&mut self, path: &str) -> i16 {
        if let Some(&idx) = self.by_path.get(path) {
            return idx;
        }
        // -1 is the "no object" sentinel and the generated table indexes
        // with int16, so the record count must stay within i16 range.
        let idx = i16::try_from(self.records.len()).unwrap_or_else(|_| {
            panic!("dependency table overflow: no index left for {path}")
        });
        self.records.push(DependencyRecord {
            path: path.to_string(),
            native_line: String::new(),
        });
        self.by_path.insert(path.to_string(), idx);
        idx
    }

    pub fn record(&self, index: i16) -> &DependencyRecord {
        &self.records[index as usize]
    }

    fn set_native_line(&mut self, index: i16, line: String) {
        let record = &mut self.records[index as usize];
        if record.native_line.is_empty() {
            record.native_line = line;
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[DependencyRecord] {
        &self.records
    }

    /// Header of the shared lookup pair (NativizedAssets_Dependencies.h).
    pub fn emit_header_code() -> String {
        let mut text = CodeText::new();
        text.add_line("#pragma once");
        text.add_line("#include \"Blueprint/BlueprintSupport.h\"");
        text.add_line("struct F__NativeDependencies");
        text.open_brace();
        text.add_line("static const FBlueprintDependencyObjectRef& Get(int16 Index);");
        text.decrease_indent();
        text.add_line("};");
        text.result()
    }

    /// Source of the shared lookup pair. `-1` is the reserved "no object"
    /// sentinel and must never index the backing array.
    pub fn emit_body_code(&self, pch_name: &str) -> String {
        let mut text = CodeText::new();
        text.add_line(&format!("#include \"{pch_name}.h\""));
        text.begin_disable_size_warning();
        text.begin_disable_optimization();

        text.add_line("namespace");
        text.add_line("{");
        text.increase_indent();
        text.add_line("static const FBlueprintDependencyObjectRef NativizedCodeDependenties[] =");
        text.add_line("{");
        if self.records.is_empty() {
            text.add_line("FBlueprintDependencyObjectRef()");
        } else {
            for record in &self.records {
                if record.native_line.is_empty() {
                    panic!("dependency record for {} has no native line", record.path);
                }
                text.add_line(&record.native_line);
            }
        }
        text.add_line("};");
        text.decrease_indent();
        text.add_line("}");

        text.add_line("const FBlueprintDependencyObjectRef& F__NativeDependencies::Get(int16 Index)");
        text.add_line("{");
        text.increase_indent();
        text.add_line("static const FBlueprintDependencyObjectRef& NullObjectRef = FBlueprintDependencyObjectRef();");
        text.add_line("if (Index == -1) { return NullObjectRef; }");
        text.add_line(&format!("check((Index >= 0) && (Index < {}));", self.records.len()));
        text.add_line("return ::NativizedCodeDependenties[Index];");
        text.decrease_indent();
        text.add_line("};");

        text.end_disable_optimization();
        text.end_disable_size_warning();
        text.result()
    }
}

/// 2x2-bit ordering flags of one dependency record axis.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct DependencyType {
    pub serialization_before_serialization: bool,
    pub create_before_serialization: bool,
    pub serialization_before_create: bool,
    pub create_before_create: bool,
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = |v: bool| if v { "true" } else { "false" };
        write!(
            f,
            "FBlueprintDependencyType({}, {}, {}, {})",
            b(self.serialization_before_serialization),
            b(self.create_before_serialization),
            b(self.serialization_before_create),
            b(self.create_before_create)
        )
    }
}

/// A dependency row before text emission: the global index plus the ordering
/// flags for the struct axis and for the CDO axis.
#[derive(Clone, Copy)]
pub struct CompactDependencyData {
    pub object_ref_index: i16,
    pub struct_dependency: DependencyType,
    pub cdo_dependency: DependencyType,
}

impl CompactDependencyData {
    /// Record for a filtered-out asset. Index -1 never resolves to a real
    /// object.
    fn null() -> Self {
        CompactDependencyData {
            object_ref_index: -1,
            struct_dependency: DependencyType::default(),
            cdo_dependency: DependencyType::default(),
        }
    }
}

fn collect_type_preload_deps(td: &TypeDesc, out: &mut HashSet<String>) {
    match td {
        TypeDesc::Byte { enum_path: Some(path) } => {
            out.insert(path.clone());
        }
        TypeDesc::Enum { enum_path } => {
            out.insert(enum_path.clone());
        }
        TypeDesc::Struct { struct_path } => {
            out.insert(struct_path.clone());
        }
        TypeDesc::Array { inner } | TypeDesc::Set { inner } => {
            collect_type_preload_deps(inner, out);
        }
        TypeDesc::Map { key, value } => {
            collect_type_preload_deps(key, out);
            collect_type_preload_deps(value, out);
        }
        _ => {}
    }
}

/// Derived ordering sets standing in for the loader's import table: what has
/// to be serialized before the class itself links, and what has to be
/// serialized before the CDO can be created. Membership in one set always
/// clears the opposite flag, so the two orderings are exclusive per axis by
/// construction.
pub struct ImportTableHelper {
    serialize_before_serialize_struct: HashSet<String>,
    serialize_before_create_cdo: HashSet<String>,
}

impl ImportTableHelper {
    pub fn new(reg: &ModelRegistry, class: &ClassModel, subobjects: &[usize]) -> Self {
        let mut serialize_before_serialize_struct = HashSet::new();
        let mut serialize_before_create_cdo = HashSet::new();

        if let Some(super_path) = &class.super_path {
            serialize_before_serialize_struct.insert(super_path.clone());
            if let Some(cdo) = reg.find_class(super_path).and_then(|c| c.cdo) {
                serialize_before_create_cdo.insert(reg.object(cdo).path.clone());
            }
        }
        // Member-variable types shape the class layout, so their struct and
        // enum preloads gate linking.
        for prop in &class.properties {
            collect_type_preload_deps(&prop.type_desc, &mut serialize_before_serialize_struct);
        }
        for interface in &class.interfaces {
            serialize_before_serialize_struct.insert(interface.clone());
        }
        for &subobject in subobjects {
            let class_path = &reg.object(subobject).class_path;
            serialize_before_serialize_struct.insert(class_path.clone());
            if let Some(cdo) = reg.find_class(class_path).and_then(|c| c.cdo) {
                serialize_before_create_cdo.insert(reg.object(cdo).path.clone());
            }
        }

        ImportTableHelper {
            serialize_before_serialize_struct,
            serialize_before_create_cdo,
        }
    }

    pub fn fill_dependency_data(&self, path: &str) -> (DependencyType, DependencyType) {
        let needed_for_linking = self.serialize_before_serialize_struct.contains(path);
        let struct_dependency = DependencyType {
            serialization_before_serialization: needed_for_linking,
            create_before_serialization: !needed_for_linking,
            serialization_before_create: false,
            create_before_create: false,
        };
        // The CDO itself is created, never serialized.
        let cdo_dependency = DependencyType {
            serialization_before_create: self.serialize_before_create_cdo.contains(path),
            ..DependencyType::default()
        };
        (struct_dependency, cdo_dependency)
    }
}

/// The record's type fields, with user-defined enums folded to `UEnum`,
/// user-defined structs to `UScriptStruct` and converted classes to
/// `UDynamicClass` (the runtime types the loader will actually find).
fn fold_asset_type(reg: &ModelRegistry, class_path: &str, asset_path: &str) -> (String, String) {
    if reg.class_is_a(class_path, USER_DEFINED_ENUM_PATH) {
        return (CORE_UOBJECT_PACKAGE.to_string(), "Enum".to_string());
    }
    if reg.class_is_a(class_path, USER_DEFINED_STRUCT_PATH) {
        return (CORE_UOBJECT_PACKAGE.to_string(), "ScriptStruct".to_string());
    }
    if reg.class_is_a(class_path, BPGC_PATH) && reg.is_converted_class(asset_path) {
        return (CORE_UOBJECT_PACKAGE.to_string(), "DynamicClass".to_string());
    }
    match class_path.rsplit_once('.') {
        Some((package, name)) => (package.to_string(), name.to_string()),
        None => (CORE_UOBJECT_PACKAGE.to_string(), "Object".to_string()),
    }
}

/// Type fields for a dependency known only as a type-table path (not present
/// in the object arena).
fn type_table_asset_type(reg: &ModelRegistry, path: &str) -> (String, String) {
    if let Some(class) = reg.find_class(path) {
        if class.converted {
            return (CORE_UOBJECT_PACKAGE.to_string(), "DynamicClass".to_string());
        }
        return (CORE_UOBJECT_PACKAGE.to_string(), "Class".to_string());
    }
    if reg.find_struct(path).is_some() {
        return (CORE_UOBJECT_PACKAGE.to_string(), "ScriptStruct".to_string());
    }
    if reg.find_enum(path).is_some() {
        return (CORE_UOBJECT_PACKAGE.to_string(), "Enum".to_string());
    }
    (CORE_UOBJECT_PACKAGE.to_string(), "Object".to_string())
}

/// The six-field record row. Folder and short package name first, then the
/// object name, then the (folded) type's package and name, then the outer's
/// name when the outer is not the package itself.
fn create_asset_to_load_string(reg: &ModelRegistry, path: &str) -> String {
    let (package, name, outer_name, type_package, type_name);
    if let Some(idx) = reg.find_object(path) {
        let obj = reg.object(idx);
        package = obj.package.clone();
        name = obj.name.clone();
        outer_name = match obj.owner {
            Some(owner) => reg.object(owner).name.clone(),
            None => String::new(),
        };
        let (tp, tn) = fold_asset_type(reg, &obj.class_path, &obj.path);
        type_package = tp;
        type_name = tn;
    } else {
        let (pkg, obj_name) = match path.split_once('.') {
            Some((p, n)) => (p.to_string(), n.to_string()),
            None => (path.to_string(), String::new()),
        };
        package = pkg;
        name = obj_name;
        outer_name = String::new();
        let (tp, tn) = type_table_asset_type(reg, path);
        type_package = tp;
        type_name = tn;
    }
    let (folder, short_package) = naming::split_package(&package);
    format!(
        "FBlueprintDependencyObjectRef(TEXT(\"{}\"), TEXT(\"{}\"), TEXT(\"{}\"), TEXT(\"{}\"), TEXT(\"{}\"), TEXT(\"{}\")),",
        escape_cpp_string(folder),
        escape_cpp_string(short_package),
        escape_cpp_string(&name),
        escape_cpp_string(&type_package),
        escape_cpp_string(&type_name),
        escape_cpp_string(&outer_name)
    )
}

/// `{TypeName} {Path}`, the comment trailer of a record row.
fn dependency_full_name(reg: &ModelRegistry, path: &str) -> String {
    let type_name = if let Some(idx) = reg.find_object(path) {
        let class_path = &reg.object(idx).class_path;
        class_path.rsplit('.').next().unwrap_or(class_path).to_string()
    } else if reg.find_class(path).is_some() {
        "Class".to_string()
    } else if reg.find_struct(path).is_some() {
        "ScriptStruct".to_string()
    } else if reg.find_enum(path).is_some() {
        "Enum".to_string()
    } else {
        "Object".to_string()
    };
    format!("{type_name} {path}")
}

fn create_dependency_record(
    ctx: &mut EmitterContext<'_>,
    allocator: &mut DependencyIndexAllocator,
    import_table: &ImportTableHelper,
    options: &NativizeOptions,
    path: &str,
) -> (CompactDependencyData, &'static str) {
    let reg = ctx.reg;
    if let Some(idx) = reg.find_object(path) {
        if reg.object(idx).editor_only {
            ctx.warn(format!(
                "nativized {} depends on editor only asset: {path}",
                ctx.class.path
            ));
            return (CompactDependencyData::null(), "Editor Only asset");
        }
        // The filter looks at the whole outer chain; a kept inner object in a
        // dropped outer is still unloadable.
        let not_for_client = !reg.chain_needs_load_for_client(idx);
        let not_for_server = !reg.chain_needs_load_for_server(idx);
        if not_for_server && options.platform == PlatformFilter::ServerOnly {
            return (CompactDependencyData::null(), "Not for server");
        }
        if not_for_client && options.platform == PlatformFilter::ClientOnly {
            return (CompactDependencyData::null(), "Not for client");
        }
    }

    let index = allocator.find_or_add(path);
    if allocator.record(index).native_line.is_empty() {
        let line = create_asset_to_load_string(reg, path);
        allocator.set_native_line(index, line);
    }
    let (struct_dependency, cdo_dependency) = import_table.fill_dependency_data(path);
    (
        CompactDependencyData {
            object_ref_index: index,
            struct_dependency,
            cdo_dependency,
        },
        "",
    )
}

fn add_asset_array(
    ctx: &mut EmitterContext<'_>,
    allocator: &mut DependencyIndexAllocator,
    import_table: &ImportTableHelper,
    options: &NativizeOptions,
    assets: &[String],
    edl_optimization: bool,
) {
    if assets.is_empty() {
        return;
    }
    ctx.body.add_line("const FCompactBlueprintDependencyData LocCompactBlueprintDependencyData[] =");
    ctx.body.add_line("{");
    ctx.body.increase_indent();
    for path in assets {
        let (record, comment) =
            create_dependency_record(ctx, allocator, import_table, options, path);
        let full_name = dependency_full_name(ctx.reg, path);
        ctx.body.add_line(&format!(
            "{{{}, {}, {}}},  // {} {} ",
            record.object_ref_index, record.struct_dependency, record.cdo_dependency, comment, full_name
        ));
    }
    ctx.body.decrease_indent();
    ctx.body.add_line("};");
    ctx.body.add_line("for(const FCompactBlueprintDependencyData& CompactData : LocCompactBlueprintDependencyData)");
    ctx.body.open_brace();
    // With the event-driven-loader optimization every function body is
    // reached at most once, so plain Add suffices; without it the chained
    // calls can revisit the same record.
    ctx.body.add_line(&format!(
        "AssetsToLoad.{}(FBlueprintDependencyData(F__NativeDependencies::Get(CompactData.ObjectRefIndex), CompactData));",
        if edl_optimization { "Add" } else { "AddUnique" }
    ));
    ctx.body.close_brace();
}

/// Object references embedded in a converted struct's default values. These
/// become load dependencies of every class using the struct's defaults.
fn collect_value_object_refs(
    reg: &ModelRegistry,
    td: &TypeDesc,
    value: &Value,
    out: &mut Vec<usize>,
) {
    match td {
        _ if td.is_object_reference() => {
            if let Some(path) = value.as_str() {
                if let Some(idx) = reg.find_object(path) {
                    if !out.contains(&idx) {
                        out.push(idx);
                    }
                }
            }
        }
        TypeDesc::Struct { struct_path } => {
            let Some(strct) = reg.find_struct(struct_path) else { return };
            let Some(map) = value.as_object() else { return };
            for prop in &strct.properties {
                if let Some(v) = map.get(&prop.name) {
                    collect_value_object_refs(reg, &prop.type_desc, v, out);
                }
            }
        }
        TypeDesc::Array { inner } | TypeDesc::Set { inner } => {
            for v in value.as_array().map(Vec::as_slice).unwrap_or_default() {
                collect_value_object_refs(reg, inner, v, out);
            }
        }
        TypeDesc::Map { key, value: val_td } => {
            for pair in value.as_array().map(Vec::as_slice).unwrap_or_default() {
                if let Some(k) = pair.get("key") {
                    collect_value_object_refs(reg, key, k, out);
                }
                if let Some(v) = pair.get("value") {
                    collect_value_object_refs(reg, val_td, v, out);
                }
            }
        }
        _ => {}
    }
}

fn gather_uds_default_value_refs(reg: &ModelRegistry, strct: &StructModel, out: &mut Vec<usize>) {
    let Some(defaults_idx) = strct.default_instance else { return };
    let values = &reg.object(defaults_idx).values;
    for prop in &strct.properties {
        if let Some(v) = values.get(&prop.name) {
            collect_value_object_refs(reg, &prop.type_desc, v, out);
        }
    }
}

fn in_core_uobject_package(path: &str) -> bool {
    path.starts_with("/Script/CoreUObject.")
}

/// Emit `__StaticDependencies_DirectlyUsedAssets` and
/// `__StaticDependenciesAssets` for the context's class. The first function
/// lists only assets the class's own generated code touched, the second the
/// full closure, optionally delegating to other converted classes' functions
/// when the event-driven-loader optimization is off.
pub fn add_static_functions_for_dependencies(
    ctx: &mut EmitterContext<'_>,
    allocator: &mut DependencyIndexAllocator,
    options: &NativizeOptions,
) {
    let reg = ctx.reg;
    let class = ctx.class;
    let cpp_class_name = naming::class_cpp_name(reg, class);

    // Converted structs contribute the objects their default values embed.
    let mut uds_refs: Vec<usize> = Vec::new();
    for dep in &class.dependencies {
        if let Some(strct) = reg.find_struct(dep) {
            if strct.converted {
                gather_uds_default_value_refs(reg, strct, &mut uds_refs);
            }
        }
    }
    for idx in uds_refs {
        ctx.mark_object_used(idx);
    }

    // The full closure plus everything emission touched, CoreUObject
    // excluded. Insertion order is preserved so output is deterministic.
    let mut remaining: Vec<String> = Vec::new();
    for dep in &class.dependencies {
        if !in_core_uobject_package(dep) && !remaining.contains(dep) {
            remaining.push(dep.clone());
        }
    }
    let used_paths: Vec<String> = ctx
        .used_objects_in_current_class
        .iter()
        .map(|&i| reg.object(i).path.clone())
        .collect();
    for path in &used_paths {
        if !in_core_uobject_package(path) && !remaining.contains(path) {
            remaining.push(path.clone());
        }
    }

    let import_table = ImportTableHelper::new(reg, class, &ctx.all_subobject_indices());
    let edl_optimization = options.event_driven_loader;

    // Candidates for the delegation short-circuit: other converted,
    // non-interface classes in the closure.
    let mut other_converted: Vec<&str> = Vec::new();
    if !edl_optimization {
        for dep in &class.dependencies {
            if let Some(dep_class) = reg.find_class(dep) {
                if dep_class.converted
                    && dep_class.path != class.path
                    && dep_class.flags & CLASS_INTERFACE == 0
                {
                    other_converted.push(dep);
                }
            }
        }
    }

    ctx.body.begin_disable_optimization();
    ctx.body.add_line(&format!(
        "void {cpp_class_name}::__StaticDependencies_DirectlyUsedAssets(TArray<FBlueprintDependencyData>& AssetsToLoad)"
    ));
    ctx.body.open_brace();
    let mut direct: Vec<String> = Vec::new();
    for path in &used_paths {
        if in_core_uobject_package(path) {
            continue;
        }
        remaining.retain(|p| p != path);
        if !direct.contains(path) {
            direct.push(path.clone());
        }
    }
    add_asset_array(ctx, allocator, &import_table, options, &direct, edl_optimization);
    ctx.body.close_brace();
    ctx.body.end_disable_optimization();

    ctx.body.begin_disable_optimization();
    ctx.body.add_line(&format!(
        "void {cpp_class_name}::__StaticDependenciesAssets(TArray<FBlueprintDependencyData>& AssetsToLoad)"
    ));
    ctx.body.open_brace();

    if other_converted.is_empty() || edl_optimization {
        ctx.body.add_line("__StaticDependencies_DirectlyUsedAssets(AssetsToLoad);");
    } else {
        // Delegate to the other classes' registered functions instead of
        // re-listing their closures; own-index guard stops the recursion.
        let own_index = allocator.find_or_add(&class.path);
        if allocator.record(own_index).native_line.is_empty() {
            let line = create_asset_to_load_string(reg, &class.path);
            allocator.set_native_line(own_index, line);
        }
        ctx.body.add_line(&format!("const int16 __OwnIndex = {own_index};"));
        ctx.body.add_line("if(FBlueprintDependencyData::ContainsDependencyData(AssetsToLoad, __OwnIndex)) { return; }");
        ctx.body.add_line("if(GEventDrivenLoaderEnabled && EVENT_DRIVEN_ASYNC_LOAD_ACTIVE_AT_RUNTIME){ __StaticDependencies_DirectlyUsedAssets(AssetsToLoad); }");
        ctx.body.add_line("else");
        ctx.body.open_brace();
        ctx.body.add_line("const bool __FirstFunctionCall = !AssetsToLoad.Num();");
        ctx.body.add_line("TArray<FBlueprintDependencyData> Temp;");
        // Only the outermost call may let the directly-used assets land in
        // the caller's array; their leading positions are significant.
        ctx.body.add_line("__StaticDependencies_DirectlyUsedAssets(__FirstFunctionCall ? AssetsToLoad : Temp);");
        ctx.body.add_line("TArray<FBlueprintDependencyData>& ArrayUnaffectedByDirectlyUsedAssets = __FirstFunctionCall ? Temp : AssetsToLoad;");
        ctx.body.add_line("ArrayUnaffectedByDirectlyUsedAssets.AddUnique(FBlueprintDependencyData(F__NativeDependencies::Get(__OwnIndex), FCompactBlueprintDependencyData(__OwnIndex, {}, {})));");
        for other in &other_converted {
            let other_class = reg.find_class(other).unwrap_or_else(|| unreachable!());
            ctx.body.add_line(&format!(
                "{}::__StaticDependenciesAssets(ArrayUnaffectedByDirectlyUsedAssets);",
                naming::class_cpp_name(reg, other_class)
            ));
        }
        ctx.body.add_line("FBlueprintDependencyData::AppendUniquely(AssetsToLoad, Temp);");
        ctx.body.close_brace();
    }

    if !edl_optimization {
        // Without the event-driven loader the native types are already
        // reachable; only assets and converted types need records.
        remaining.retain(|path| {
            if let Some(dep_class) = reg.find_class(path) {
                return !dep_class.native;
            }
            if let Some(strct) = reg.find_struct(path) {
                return !strct.native;
            }
            if let Some(enm) = reg.find_enum(path) {
                return !enm.native;
            }
            true
        });
    }

    add_asset_array(ctx, allocator, &import_table, options, &remaining, edl_optimization);
    ctx.body.close_brace();
    ctx.body.end_disable_optimization();
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpnative_model::{ClassModel, EnumModel, ObjectModel};
    use serde_json::json;

    fn class(json: serde_json::Value) -> ClassModel {
        serde_json::from_value(json).unwrap()
    }

    fn object(json: serde_json::Value) -> ObjectModel {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn allocator_indices_are_stable_and_distinct() {
        let mut alloc = DependencyIndexAllocator::new();
        let a = alloc.find_or_add("/Game/A.A");
        let b = alloc.find_or_add("/Game/B.B");
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(alloc.find_or_add("/Game/A.A"), a);
        assert_eq!(alloc.len(), 2);
    }

    #[test]
    #[should_panic(expected = "dependency table overflow")]
    fn allocator_refuses_indices_past_i16_range() {
        let mut alloc = DependencyIndexAllocator::new();
        for n in 0..=i16::MAX as u32 {
            alloc.find_or_add(&format!("/Game/Gen/Asset_{n}.Asset_{n}"));
        }
        assert_eq!(alloc.len(), i16::MAX as usize + 1);
        alloc.find_or_add("/Game/Gen/OneTooMany.OneTooMany");
    }

    #[test]
    fn ordering_flags_are_exclusive_per_axis() {
        let reg = ModelRegistry::new(
            vec![class(json!({
                "path": "/Game/BP/BP_A.BP_A_C", "name": "BP_A_C", "converted": true,
                "super_path": "/Game/BP/BP_Base.BP_Base_C",
                "properties": [
                    {"name": "Shape", "type": {"kind": "struct",
                     "struct_path": "/Game/Structs/ShapeData.ShapeData"}}
                ]
            }))],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        let cls = reg.find_class("/Game/BP/BP_A.BP_A_C").unwrap();
        let table = ImportTableHelper::new(&reg, cls, &[]);

        for path in [
            "/Game/BP/BP_Base.BP_Base_C",
            "/Game/Structs/ShapeData.ShapeData",
            "/Game/Textures/T_Icon.T_Icon",
        ] {
            let (struct_dep, cdo_dep) = table.fill_dependency_data(path);
            assert_ne!(
                struct_dep.serialization_before_serialization,
                struct_dep.create_before_serialization
            );
            assert!(!struct_dep.serialization_before_create);
            assert!(!cdo_dep.create_before_serialization);
            assert!(!cdo_dep.serialization_before_serialization);
        }
        let (linked, _) = table.fill_dependency_data("/Game/BP/BP_Base.BP_Base_C");
        assert!(linked.serialization_before_serialization);
        let (plain, _) = table.fill_dependency_data("/Game/Textures/T_Icon.T_Icon");
        assert!(plain.create_before_serialization);
    }

    #[test]
    fn body_code_handles_sentinel_and_empty_table() {
        let alloc = DependencyIndexAllocator::new();
        let body = alloc.emit_body_code("NativizedAssets_Dependencies");
        assert!(body.contains("FBlueprintDependencyObjectRef()"));
        assert!(body.contains("if (Index == -1) { return NullObjectRef; }"));
        assert!(body.contains("check((Index >= 0) && (Index < 0));"));

        let header = DependencyIndexAllocator::emit_header_code();
        assert!(header.contains("struct F__NativeDependencies"));
        assert!(header.contains("static const FBlueprintDependencyObjectRef& Get(int16 Index);"));
    }

    fn dep_registry() -> ModelRegistry {
        ModelRegistry::new(
            vec![
                class(json!({
                    "path": "/Script/Engine.UserDefinedEnum", "name": "UserDefinedEnum",
                    "native": true
                })),
                class(json!({
                    "path": "/Game/BP/BP_Item.BP_Item_C", "name": "BP_Item_C",
                    "converted": true,
                    "dependencies": [
                        "/Script/CoreUObject.Vector",
                        "/Game/Enums/EQuality.EQuality",
                        "/Game/Meshes/SM_Crate.SM_Crate"
                    ]
                })),
            ],
            Vec::new(),
            vec![serde_json::from_value::<EnumModel>(json!({
                "path": "/Game/Enums/EQuality.EQuality", "name": "EQuality",
                "cpp_form": "enum_class", "converted": true, "entries": []
            }))
            .unwrap()],
            vec![
                object(json!({
                    "path": "/Game/Meshes/SM_Crate.SM_Crate", "name": "SM_Crate",
                    "package": "/Game/Meshes/SM_Crate",
                    "class_path": "/Script/Engine.StaticMesh"
                })),
                object(json!({
                    "path": "/Game/Editor/EditorOnlyData.EditorOnlyData",
                    "name": "EditorOnlyData",
                    "package": "/Game/Editor/EditorOnlyData",
                    "class_path": "/Script/Engine.DataAsset",
                    "editor_only": true
                })),
            ],
        )
    }

    #[test]
    fn static_dependencies_skip_core_uobject_and_comment_editor_only() {
        let reg = dep_registry();
        let item = reg.find_class("/Game/BP/BP_Item.BP_Item_C").unwrap();
        let mut ctx = EmitterContext::new(&reg, item);
        ctx.mark_object_used(1);
        let mut alloc = DependencyIndexAllocator::new();
        let options = NativizeOptions::default();
        add_static_functions_for_dependencies(&mut ctx, &mut alloc, &options);
        let out = ctx.body.result();

        assert!(out.contains("__StaticDependencies_DirectlyUsedAssets(TArray<FBlueprintDependencyData>& AssetsToLoad)"));
        assert!(out.contains("__StaticDependenciesAssets(TArray<FBlueprintDependencyData>& AssetsToLoad)"));
        assert!(!out.contains("/Script/CoreUObject.Vector"));
        assert!(out.contains("{-1, FBlueprintDependencyType(false, false, false, false), FBlueprintDependencyType(false, false, false, false)},  // Editor Only asset"));
        assert!(out.contains("FBlueprintDependencyObjectRef") || !alloc.is_empty());
        // The mesh and the enum both got real records.
        assert!(alloc
            .records()
            .iter()
            .any(|r| r.path == "/Game/Meshes/SM_Crate.SM_Crate"));
        assert!(alloc
            .records()
            .iter()
            .any(|r| r.path == "/Game/Enums/EQuality.EQuality"));
    }

    #[test]
    fn record_row_folds_user_defined_enum_type() {
        let reg = ModelRegistry::new(
            vec![class(json!({
                "path": "/Script/Engine.UserDefinedEnum", "name": "UserDefinedEnum",
                "native": true
            }))],
            Vec::new(),
            Vec::new(),
            vec![object(json!({
                "path": "/Game/Enums/EQuality.EQuality", "name": "EQuality",
                "package": "/Game/Enums/EQuality",
                "class_path": "/Script/Engine.UserDefinedEnum"
            }))],
        );
        let line = create_asset_to_load_string(&reg, "/Game/Enums/EQuality.EQuality");
        assert_eq!(
            line,
            "FBlueprintDependencyObjectRef(TEXT(\"/Game/Enums\"), TEXT(\"EQuality\"), TEXT(\"EQuality\"), TEXT(\"/Script/CoreUObject\"), TEXT(\"Enum\"), TEXT(\"\")),"
        );
    }

    #[test]
    fn delegation_path_emits_own_index_guard() {
        let reg = ModelRegistry::new(
            vec![
                class(json!({
                    "path": "/Game/BP/BP_Other.BP_Other_C", "name": "BP_Other_C",
                    "converted": true
                })),
                class(json!({
                    "path": "/Game/BP/BP_Main.BP_Main_C", "name": "BP_Main_C",
                    "converted": true,
                    "dependencies": ["/Game/BP/BP_Other.BP_Other_C"]
                })),
            ],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        let main = reg.find_class("/Game/BP/BP_Main.BP_Main_C").unwrap();
        let mut ctx = EmitterContext::new(&reg, main);
        let mut alloc = DependencyIndexAllocator::new();
        let options = NativizeOptions {
            event_driven_loader: false,
            ..NativizeOptions::default()
        };
        add_static_functions_for_dependencies(&mut ctx, &mut alloc, &options);
        let out = ctx.body.result();

        assert!(out.contains("const int16 __OwnIndex = 0;"));
        assert!(out.contains("if(FBlueprintDependencyData::ContainsDependencyData(AssetsToLoad, __OwnIndex)) { return; }"));
        assert!(out.contains("__StaticDependenciesAssets(ArrayUnaffectedByDirectlyUsedAssets);"));
        assert!(out.contains("FBlueprintDependencyData::AppendUniquely(AssetsToLoad, Temp);"));
        assert_eq!(alloc.record(0).path, "/Game/BP/BP_Main.BP_Main_C");
    }
}
