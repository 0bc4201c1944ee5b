// Constructor-flavored emission: the dynamic-class subobject function, the
// class constructor with its component hierarchy replay, and the post-load
// fixups. Subobject creation and initialization are split into two phases so
// that cross-references between subobjects always see a created instance.

use bpnative_ue_flags::{
    RF_DEFAULT_SUB_OBJECT, RF_INHERITABLE_COMPONENT_TEMPLATE,
};
use bpnative_model::{ModelRegistry, ScsNodeModel};

use crate::context::{ClassSubobjectList, EmitterContext, GeneratedCodeType};
use crate::defaults::{outer_generate, AccessOperator, PropertyOwner};
use crate::literals::escape_cpp_string;
use crate::naming;
use crate::resolver::{class_pointer_name, find_globally_mapped_object};

const CLASS_PATH: &str = "/Script/CoreUObject.Class";
const ACTOR_PATH: &str = "/Script/Engine.Actor";
const SCENE_COMPONENT_PATH: &str = "/Script/Engine.SceneComponent";
const ACTOR_COMPONENT_PATH: &str = "/Script/Engine.ActorComponent";
const PRIMITIVE_COMPONENT_PATH: &str = "/Script/Engine.PrimitiveComponent";

fn list_member_name(list: ClassSubobjectList) -> &'static str {
    match list {
        ClassSubobjectList::MiscConvertedSubobjects => "MiscConvertedSubobjects",
        ClassSubobjectList::DynamicBindingObjects => "DynamicBindingObjects",
        ClassSubobjectList::ComponentTemplates => "ComponentTemplates",
        ClassSubobjectList::Timelines => "Timelines",
    }
}

/// A subobject whose creation line is already emitted but whose property
/// initialization is deferred, so every local lands in the same scope.
struct SubobjectToInit {
    obj_idx: usize,
    var: String,
    was_created: bool,
}

/// An SCS component scheduled for initialization after the whole hierarchy
/// has been created.
struct ComponentToInit {
    obj_idx: usize,
    var: String,
    was_created: bool,
    parent_var: String,
    attach_socket: Option<String>,
}

/// Property deltas of an arena object against its archetype, emitted through
/// `var` with pointer access.
fn emit_subobject_deltas(ctx: &mut EmitterContext<'_>, obj_idx: usize, var: &str) {
    let reg = ctx.reg;
    let obj = reg.object(obj_idx);
    let archetype_values = obj.archetype.map(|a| &reg.object(a).values);
    let Some(obj_class) = reg.find_class(&obj.class_path) else {
        ctx.warn(format!("class {} of subobject {} is missing from the dump", obj.class_path, obj.path));
        return;
    };
    for owner_class in reg.class_chain(obj_class) {
        for p in &owner_class.properties {
            outer_generate(
                ctx,
                PropertyOwner::Class(owner_class),
                p,
                var,
                obj.values.get(&p.name),
                Some(archetype_values.and_then(|m| m.get(&p.name))),
                AccessOperator::Pointer,
                false,
            );
        }
    }
}

fn nested_default_subobjects(reg: &ModelRegistry, obj_idx: usize) -> Vec<usize> {
    (0..reg.objects.len())
        .filter(|&i| {
            let o = reg.object(i);
            o.owner == Some(obj_idx) && o.flags & RF_DEFAULT_SUB_OBJECT != 0 && !o.editor_only
        })
        .collect()
}

/// Initialization block for one instanced subobject: nested default
/// subobjects first, then the property deltas, then component fixups.
fn emit_default_subobject_init(
    ctx: &mut EmitterContext<'_>,
    obj_idx: usize,
    var: &str,
    was_created: bool,
    add_local_scope: bool,
) {
    let reg = ctx.reg;
    let obj = reg.object(obj_idx);
    let obj_name = obj.name.clone();
    let obj_class_path = obj.class_path.clone();

    if add_local_scope {
        if !was_created {
            // The native super may have skipped creating this instance.
            ctx.body.add_line(&format!("if({var})"));
        }
        ctx.begin_scope();
        ctx.body.add_line(&format!("// --- Default subobject '{obj_name}' //"));
    }

    // Nested default subobjects may be referenced by the owner's properties,
    // so their locals come first.
    let mut nested_to_init: Vec<SubobjectToInit> = Vec::new();
    for dso in nested_default_subobjects(reg, obj_idx) {
        instanced_subobject_inner(ctx, dso, false, true, Some(&mut nested_to_init));
    }
    for entry in nested_to_init {
        emit_default_subobject_init(ctx, entry.obj_idx, &entry.var, entry.was_created, true);
    }

    emit_subobject_deltas(ctx, obj_idx, var);

    if reg.class_is_a(&obj_class_path, PRIMITIVE_COMPONENT_PATH) {
        ctx.body.add_line(&format!("if(!{var}->IsTemplate())"));
        ctx.body.open_brace();
        ctx.body.add_line(&format!("{var}->BodyInstance.FixupData({var});"));
        ctx.body.close_brace();
    }

    if add_local_scope {
        ctx.body.add_line(&format!("// --- END default subobject '{obj_name}' //"));
        ctx.end_scope();
    }
}

/// Create (and optionally initialize) a class-owned subobject inside the
/// dynamic-class subobject function, returning the expression naming it.
pub fn handle_class_subobject(
    ctx: &mut EmitterContext<'_>,
    obj_idx: usize,
    list: ClassSubobjectList,
    create: bool,
    initialize: bool,
) -> String {
    let reg = ctx.reg;
    let obj = reg.object(obj_idx);
    let obj_name = obj.name.clone();
    let obj_class_path = obj.class_path.clone();
    let owner = obj.owner;

    let mut local = String::new();
    if create {
        if let Some(existing) = ctx.find_subobject_expr(obj_idx) {
            return existing.to_string();
        }
        // Objects without an arena owner hang directly off the class.
        let add_as_subobject_of_class = owner.is_none();
        let outer_str = if add_as_subobject_of_class {
            "InDynamicClass".to_string()
        } else {
            let owner_idx = owner.unwrap_or_else(|| unreachable!());
            let owner_path = reg.object(owner_idx).path.clone();
            match find_globally_mapped_object(ctx, &owner_path, None, false, false) {
                Some(s) => s,
                None => {
                    let s = handle_class_subobject(ctx, owner_idx, list, create, initialize);
                    if s.is_empty() {
                        return String::new();
                    }
                    // The recursive call may already have created this object
                    // while initializing its outer.
                    if let Some(existing) = ctx.find_subobject_expr(obj_idx) {
                        return existing.to_string();
                    }
                    s
                }
            }
        };

        local = ctx.generate_unique_local_name();
        if add_as_subobject_of_class {
            ctx.register_class_subobject(obj_idx, local.clone(), list);
        } else {
            ctx.map_class_subobject(obj_idx, local.clone());
        }

        let actual_class =
            find_globally_mapped_object(ctx, &obj_class_path, Some(CLASS_PATH), true, true)
                .unwrap_or_else(|| panic!("class {obj_class_path} never resolved"));
        let native_type = class_pointer_name(reg, &obj_class_path);
        if reg.find_class(&obj_class_path).is_some_and(|c| !c.native) {
            // Make sure the CDO exists before instances of the type.
            ctx.body.add_line(&format!("{native_type}::StaticClass()->GetDefaultObject();"));
        }
        ctx.body.add_line(&format!(
            "auto {local} = NewObject<{native_type}>({outer_str}, {actual_class}, TEXT(\"{}\"));",
            escape_cpp_string(&obj_name)
        ));
        if add_as_subobject_of_class {
            ctx.body.add_line(&format!(
                "InDynamicClass->{}.Add({local});",
                list_member_name(list)
            ));
        }
    }

    if initialize {
        if local.is_empty() {
            let obj_path = reg.object(obj_idx).path.clone();
            local = find_globally_mapped_object(ctx, &obj_path, None, false, false)
                .unwrap_or_default();
        }
        if local.is_empty() {
            ctx.warn(format!("class subobject {obj_name} was never created"));
            return local;
        }
        emit_subobject_deltas(ctx, obj_idx, &local);
    }
    local
}

/// Create or look up an instanced subobject (a default subobject or an
/// instanced-reference value) and emit its initialization.
pub fn handle_instanced_subobject(
    ctx: &mut EmitterContext<'_>,
    obj_idx: usize,
    create_instance: bool,
    skip_editor_only_check: bool,
) -> String {
    instanced_subobject_inner(ctx, obj_idx, create_instance, skip_editor_only_check, None)
}

fn instanced_subobject_inner(
    ctx: &mut EmitterContext<'_>,
    obj_idx: usize,
    create_instance: bool,
    skip_editor_only_check: bool,
    deferred: Option<&mut Vec<SubobjectToInit>>,
) -> String {
    let reg = ctx.reg;
    let obj = reg.object(obj_idx);
    let obj_path = obj.path.clone();
    let obj_name = obj.name.clone();
    let obj_flags = obj.flags;
    let obj_owner = obj.owner;

    // Never emit initialization for the same object twice.
    if let Some(existing) = find_globally_mapped_object(ctx, &obj_path, None, false, false) {
        return existing;
    }
    let local = ctx.generate_unique_local_name();
    match ctx.current_code_type {
        GeneratedCodeType::SubobjectsOfClass => ctx.map_class_subobject(obj_idx, local.clone()),
        GeneratedCodeType::CommonConstructor => {
            ctx.register_common_subobject(obj_idx, local.clone())
        }
        GeneratedCodeType::Regular => {}
    }

    // An editor-only component gets a runtime-available stand-in; dependents
    // still need an object to point at.
    let mut object_class_path = reg.object(obj_idx).class_path.clone();
    let mut editor_only = false;
    if !skip_editor_only_check
        && reg.object(obj_idx).editor_only
        && reg.class_is_a(&object_class_path, ACTOR_COMPONENT_PATH)
    {
        editor_only = true;
        object_class_path = if reg.class_is_a(&object_class_path, SCENE_COMPONENT_PATH) {
            SCENE_COMPONENT_PATH.to_string()
        } else {
            ACTOR_COMPONENT_PATH.to_string()
        };
    }

    let outer_str = if obj_owner.is_some() && obj_owner == ctx.class.cdo {
        "this".to_string()
    } else if let Some(owner_idx) = obj_owner {
        let owner_path = reg.object(owner_idx).path.clone();
        find_globally_mapped_object(ctx, &owner_path, None, false, false).unwrap_or_default()
    } else {
        String::new()
    };
    if outer_str.is_empty() {
        ctx.warn(format!("unknown or missing outer for subobject {obj_name}"));
        return String::new();
    }

    let native_type = class_pointer_name(reg, &object_class_path);
    if !editor_only {
        if create_instance {
            if obj_flags & RF_DEFAULT_SUB_OBJECT != 0 {
                ctx.body.add_line(&format!(
                    "auto {local} = {outer_str}->CreateDefaultSubobject<{native_type}>(TEXT(\"{}\"));",
                    escape_cpp_string(&obj_name)
                ));
            } else {
                ctx.body.add_line(&format!(
                    "auto {local} = NewObject<{native_type}>({outer_str}, TEXT(\"{}\"), (EObjectFlags)0x{:08x});",
                    escape_cpp_string(&obj_name),
                    obj_flags as u32
                ));
            }
        } else {
            ctx.body.add_line(&format!(
                "auto {local} = CastChecked<{native_type}>({outer_str}->GetDefaultSubobjectByName(TEXT(\"{}\")), ECastCheckedType::NullAllowed);",
                escape_cpp_string(&obj_name)
            ));
        }

        match deferred {
            Some(list) => list.push(SubobjectToInit {
                obj_idx,
                var: local.clone(),
                was_created: create_instance,
            }),
            None => emit_default_subobject_init(ctx, obj_idx, &local, create_instance, true),
        }
    } else {
        let actual_class = find_globally_mapped_object(
            ctx,
            &reg.object(obj_idx).class_path.clone(),
            Some(CLASS_PATH),
            true,
            true,
        )
        .unwrap_or_else(|| panic!("class of {obj_name} never resolved"));
        ctx.body.add_line(&format!(
            "auto {local} = NewObject<{native_type}>({outer_str}, {actual_class}, TEXT(\"{}\"));",
            escape_cpp_string(&obj_name)
        ));
    }

    local
}

fn collect_scs_templates(nodes: &[ScsNodeModel], out: &mut Vec<usize>) {
    for node in nodes {
        if let Some(t) = node.template {
            out.push(t);
        }
        collect_scs_templates(&node.children, out);
    }
}

fn z_constructor_name(kind: &str, cpp_name: &str) -> String {
    format!("Z_Construct_{kind}_{cpp_name}()")
}

/// `__CustomDynamicClassInitialization`: fills the dynamic class's member
/// arrays with referenced converted fields and class-owned subobjects. Runs
/// once, on the CDO's construction.
pub fn generate_custom_dynamic_class_initialization(ctx: &mut EmitterContext<'_>) {
    let reg = ctx.reg;
    let class = ctx.class;
    let cpp_class_name = naming::class_cpp_name(reg, class);

    ctx.body.begin_disable_optimization();
    ctx.body.add_line(&format!(
        "void {cpp_class_name}::__CustomDynamicClassInitialization(UDynamicClass* InDynamicClass)"
    ));
    ctx.body.open_brace();
    for member in [
        "ReferencedConvertedFields",
        "MiscConvertedSubobjects",
        "DynamicBindingObjects",
        "ComponentTemplates",
        "Timelines",
    ] {
        ctx.body.add_line(&format!("ensure(0 == InDynamicClass->{member}.Num());"));
    }
    ctx.body.add_line("ensure(nullptr == InDynamicClass->AnimClassImplementation);");
    ctx.body.add_line("InDynamicClass->AssembleReferenceTokenStream();");

    ctx.set_code_type(GeneratedCodeType::SubobjectsOfClass);

    // The super class already loads the fields it depends on; only list what
    // this class adds.
    let parent_dependencies: &[String] = class
        .super_path
        .as_deref()
        .and_then(|p| reg.find_class(p))
        .map(|c| c.dependencies.as_slice())
        .unwrap_or(&[]);

    let converted_enums: Vec<String> = class
        .dependencies
        .iter()
        .filter(|p| reg.is_converted_enum(p))
        .cloned()
        .collect();
    if !converted_enums.is_empty() {
        ctx.body.add_line("// List of all referenced converted enums");
    }
    for path in converted_enums {
        ctx.body.add_line(&format!(
            "InDynamicClass->ReferencedConvertedFields.Add(LoadObject<UEnum>(nullptr, TEXT(\"{}\")));",
            escape_cpp_string(&path)
        ));
        ctx.enums_in_current_class.push(path);
    }

    let converted_classes: Vec<&str> = class
        .dependencies
        .iter()
        .filter(|p| reg.is_converted_class(p) && !parent_dependencies.contains(p))
        .map(String::as_str)
        .collect();
    if !converted_classes.is_empty() {
        ctx.body.add_line("// List of all referenced converted classes");
    }
    for path in converted_classes {
        let dep_class = reg.find_class(path).unwrap_or_else(|| unreachable!());
        let dep_cpp = naming::class_cpp_name(reg, dep_class);
        let constructor = if dep_class.flags & bpnative_ue_flags::CLASS_INTERFACE != 0 {
            let z_name = z_constructor_name("UClass", &dep_cpp);
            ctx.body.add_line(&format!("extern UClass* {z_name};"));
            z_name
        } else {
            format!("{dep_cpp}::StaticClass()")
        };
        ctx.body.add_line(&format!(
            "InDynamicClass->ReferencedConvertedFields.Add({constructor});"
        ));
    }

    let converted_structs: Vec<&str> = class
        .dependencies
        .iter()
        .filter(|p| reg.is_converted_struct(p) && !parent_dependencies.contains(p))
        .map(String::as_str)
        .collect();
    if !converted_structs.is_empty() {
        ctx.body.add_line("// List of all referenced converted structures");
    }
    for path in converted_structs {
        let dep_struct = reg.find_struct(path).unwrap_or_else(|| unreachable!());
        let z_name = z_constructor_name("UScriptStruct", &naming::struct_cpp_name(dep_struct));
        ctx.body.add_line(&format!("extern UScriptStruct* {z_name};"));
        ctx.body.add_line(&format!(
            "InDynamicClass->ReferencedConvertedFields.Add({z_name});"
        ));
    }

    ctx.body.add_line(
        "FConvertedBlueprintsDependencies::FillUsedAssetsInDynamicClass(InDynamicClass, &__StaticDependencies_DirectlyUsedAssets);",
    );

    // Component templates consumed by SCS nodes are created in the
    // constructor instead; the remainder belongs to the class.
    let mut scs_templates = Vec::new();
    collect_scs_templates(&class.scs_nodes, &mut scs_templates);
    let owned_templates: Vec<usize> = class
        .component_templates
        .iter()
        .copied()
        .filter(|t| !scs_templates.contains(t))
        .collect();

    for (create, initialize) in [(true, false), (false, true)] {
        for &t in &owned_templates {
            handle_class_subobject(ctx, t, ClassSubobjectList::ComponentTemplates, create, initialize);
        }
        for &t in &class.timelines {
            handle_class_subobject(ctx, t, ClassSubobjectList::Timelines, create, initialize);
        }
        for &d in &class.dynamic_binding_objects {
            handle_class_subobject(ctx, d, ClassSubobjectList::DynamicBindingObjects, create, initialize);
        }
    }

    ctx.body.close_brace();
    ctx.body.end_disable_optimization();
    ctx.set_code_type(GeneratedCodeType::Regular);
}

/// One SCS node: record the component variable, emit its creation if this
/// class owns the template, and queue the initialization.
fn handle_non_native_component(
    ctx: &mut EmitterContext<'_>,
    node: &ScsNodeModel,
    parent_var: Option<&str>,
    handled: &mut Vec<String>,
    native_created: &mut Vec<String>,
    components_to_init: &mut Vec<ComponentToInit>,
) -> String {
    let reg = ctx.reg;
    let is_property = reg
        .class_chain(ctx.class)
        .iter()
        .any(|c| c.properties.iter().any(|p| p.name == node.name));
    let var_name = if is_property {
        naming::member_cpp_name(true, &node.name)
    } else {
        naming::sanitize_identifier(&node.name)
    };
    handled.push(node.name.clone());

    if let Some(template_idx) = node.template {
        ctx.register_common_subobject(template_idx, var_name.clone());

        let template = reg.object(template_idx);
        let template_flags = template.flags;
        let owned_by_class = template.owner.is_none();
        if owned_by_class {
            let mut was_created = false;
            let mut parent_expr = String::new();
            if template_flags & RF_INHERITABLE_COMPONENT_TEMPLATE == 0 {
                let component_cpp = class_pointer_name(reg, &node.component_class);
                let decl = if is_property { "" } else { "auto " };
                ctx.body.add_line(&format!(
                    "{decl}{var_name} = CreateDefaultSubobject<{component_cpp}>(TEXT(\"{}\"));",
                    escape_cpp_string(&node.name)
                ));
                was_created = true;
                native_created.push(var_name.clone());

                parent_expr = match (parent_var, &node.parent_component_name) {
                    (Some(p), _) => p.to_string(),
                    // A root node can parent into an inherited native
                    // component by variable name.
                    (None, Some(native_parent)) => native_parent.clone(),
                    (None, None) => String::new(),
                };
            }
            components_to_init.push(ComponentToInit {
                obj_idx: template_idx,
                var: var_name.clone(),
                was_created,
                parent_var: parent_expr,
                attach_socket: node.attach_socket.clone(),
            });
        }
    }

    for child in &node.children {
        handle_non_native_component(
            ctx,
            child,
            Some(&var_name),
            handled,
            native_created,
            components_to_init,
        );
    }
    var_name
}

fn emit_component_init(ctx: &mut EmitterContext<'_>, component: &ComponentToInit) {
    if component.was_created {
        ctx.body.add_line(&format!(
            "{}->CreationMethod = EComponentCreationMethod::Native;",
            component.var
        ));
    }
    if !component.parent_var.is_empty() {
        let socket = match &component.attach_socket {
            Some(s) => format!(", TEXT(\"{}\")", escape_cpp_string(s)),
            None => String::new(),
        };
        // Attach first so relative-transform overrides land afterwards.
        ctx.body.add_line(&format!(
            "{}->AttachToComponent({}, FAttachmentTransformRules::KeepRelativeTransform{socket});",
            component.var, component.parent_var
        ));
    }
    emit_default_subobject_init(ctx, component.obj_idx, &component.var, component.was_created, false);
}

/// The generated class constructor plus the `PostLoadSubobjects` override.
pub fn generate_constructor(ctx: &mut EmitterContext<'_>) {
    let reg = ctx.reg;
    let class = ctx.class;
    let cpp_class_name = naming::class_cpp_name(reg, class);

    let mut native_created: Vec<String> = Vec::new();

    ctx.body.begin_disable_optimization();
    ctx.set_code_type(GeneratedCodeType::CommonConstructor);
    ctx.body.add_line(&format!(
        "{cpp_class_name}::{cpp_class_name}(const FObjectInitializer& ObjectInitializer) : Super(ObjectInitializer)"
    ));
    ctx.body.open_brace();

    ctx.body.add_line(&format!(
        "if(HasAnyFlags(RF_ClassDefaultObject) && ({cpp_class_name}::StaticClass() == GetClass()))"
    ));
    ctx.body.open_brace();
    ctx.body.add_line(&format!(
        "{cpp_class_name}::__CustomDynamicClassInitialization(CastChecked<UDynamicClass>(GetClass()));"
    ));
    ctx.body.close_brace();
    ctx.body.add_line("");

    let mut handled: Vec<String> = Vec::new();
    let mut native_root_fallback = String::new();

    // Native always-instanced default subobjects get locals up front; their
    // initialization is deferred so the locals share one scope.
    let mut subobjects_to_init: Vec<SubobjectToInit> = Vec::new();
    if let Some(cdo_idx) = class.cdo {
        for dso_idx in nested_default_subobjects(reg, cdo_idx) {
            let var = instanced_subobject_inner(ctx, dso_idx, false, true, Some(&mut subobjects_to_init));
            if native_root_fallback.is_empty()
                && reg.class_is_a(&reg.object(dso_idx).class_path, SCENE_COMPONENT_PATH)
            {
                native_root_fallback = var;
            }
        }
    }
    for entry in &subobjects_to_init {
        emit_default_subobject_init(ctx, entry.obj_idx, &entry.var, entry.was_created, true);
    }

    // RootComponent is assigned explicitly only when the defaults leave it
    // unset and a usable scene component exists.
    let cdo_values = class.cdo.map(|i| &reg.object(i).values);
    let mut needs_root_assignment = false;
    if reg.class_is_a(&class.path, ACTOR_PATH) {
        let root_set = cdo_values
            .and_then(|v| v.get("RootComponent"))
            .is_some_and(|v| !v.is_null());
        if root_set {
            handled.push("RootComponent".to_string());
        } else if !native_root_fallback.is_empty() {
            ctx.body.add_line(&format!("RootComponent = {native_root_fallback};"));
            handled.push("RootComponent".to_string());
        } else {
            needs_root_assignment = true;
        }
    }

    // Replay the construction-script hierarchy, most-base class first, so a
    // child's attachment target already exists.
    let mut components_to_init: Vec<ComponentToInit> = Vec::new();
    for scs_class in reg.scs_chain(class) {
        for node in &scs_class.scs_nodes {
            let var = handle_non_native_component(
                ctx,
                node,
                None,
                &mut handled,
                &mut native_created,
                &mut components_to_init,
            );
            if needs_root_assignment
                && reg.class_is_a(&node.component_class, SCENE_COMPONENT_PATH)
                && !var.is_empty()
            {
                // Parent-class constructors already chained their own root
                // assignment; only the emitted class assigns here.
                if scs_class.path == class.path {
                    ctx.body.add_line(&format!("RootComponent = {var};"));
                    handled.push("RootComponent".to_string());
                }
                needs_root_assignment = false;
            }
        }
    }
    for component in &components_to_init {
        emit_component_init(ctx, component);
    }

    // Remaining property deltas of the CDO against the parent CDO, in
    // property-link order.
    let parent_cdo_values = class
        .super_path
        .as_deref()
        .and_then(|p| reg.find_class(p))
        .and_then(|c| c.cdo)
        .map(|i| &reg.object(i).values);
    for owner_class in reg.class_chain(class) {
        for p in &owner_class.properties {
            if handled.contains(&p.name) {
                continue;
            }
            let new_property = owner_class.path == class.path;
            outer_generate(
                ctx,
                PropertyOwner::Class(owner_class),
                p,
                "",
                cdo_values.and_then(|v| v.get(&p.name)),
                if new_property {
                    None
                } else {
                    Some(parent_cdo_values.and_then(|v| v.get(&p.name)))
                },
                AccessOperator::None,
                true,
            );
        }
    }

    ctx.body.close_brace();
    ctx.body.end_disable_optimization();
    ctx.set_code_type(GeneratedCodeType::Regular);

    // Loaded instances bypass the constructor's CreateDefaultSubobject
    // calls; the creation method still has to say Native.
    ctx.body.add_line(&format!(
        "void {cpp_class_name}::PostLoadSubobjects(FObjectInstancingGraph* OuterInstanceGraph)"
    ));
    ctx.body.open_brace();
    ctx.body.add_line("Super::PostLoadSubobjects(OuterInstanceGraph);");
    for component in &native_created {
        ctx.body.add_line(&format!("if({component})"));
        ctx.body.open_brace();
        ctx.body.add_line(&format!(
            "{component}->CreationMethod = EComponentCreationMethod::Native;"
        ));
        ctx.body.close_brace();
    }
    ctx.body.close_brace();
}

/// Static registration hooking the class's dependency function into the
/// converted-blueprints registry at module load.
pub fn add_register_helper(ctx: &mut EmitterContext<'_>) {
    let cpp_class_name = naming::class_cpp_name(ctx.reg, ctx.class);
    let helper = naming::register_helper_name(&cpp_class_name);
    let package = ctx.class.path.split('.').next().unwrap_or(&ctx.class.path).to_string();

    ctx.body.add_line(&format!("struct {helper}"));
    ctx.body.open_brace();
    ctx.body.add_line(&format!("{helper}()"));
    ctx.body.open_brace();
    ctx.body.add_line(&format!(
        "FConvertedBlueprintsDependencies::Get().RegisterConvertedClass(TEXT(\"{}\"), &{cpp_class_name}::__StaticDependenciesAssets);",
        escape_cpp_string(&package)
    ));
    ctx.body.close_brace();
    ctx.body.add_line(&format!("static {helper} Instance;"));
    ctx.body.decrease_indent();
    ctx.body.add_line("};");
    ctx.body.add_line(&format!("{helper} {helper}::Instance;"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpnative_ue_flags::RF_CLASS_DEFAULT_OBJECT;
    use bpnative_model::{ClassModel, ObjectModel};
    use serde_json::json;

    fn class(json: serde_json::Value) -> ClassModel {
        serde_json::from_value(json).unwrap()
    }

    fn object(json: serde_json::Value) -> ObjectModel {
        serde_json::from_value(json).unwrap()
    }

    fn actor_registry() -> ModelRegistry {
        ModelRegistry::new(
            vec![
                class(json!({
                    "path": "/Script/CoreUObject.Object", "name": "Object", "native": true
                })),
                class(json!({
                    "path": "/Script/Engine.Actor", "name": "Actor", "native": true,
                    "super_path": "/Script/CoreUObject.Object"
                })),
                class(json!({
                    "path": "/Script/Engine.ActorComponent", "name": "ActorComponent",
                    "native": true, "super_path": "/Script/CoreUObject.Object"
                })),
                class(json!({
                    "path": "/Script/Engine.SceneComponent", "name": "SceneComponent",
                    "native": true, "super_path": "/Script/Engine.ActorComponent"
                })),
                class(json!({
                    "path": "/Game/BP/BP_Door.BP_Door_C", "name": "BP_Door_C",
                    "converted": true,
                    "super_path": "/Script/Engine.Actor",
                    "properties": [
                        {"name": "Frame", "type": {"kind": "object",
                         "class_path": "/Script/Engine.SceneComponent"}},
                        {"name": "OpenAngle", "type": {"kind": "float"}}
                    ],
                    "cdo": 0,
                    "scs_nodes": [
                        {"name": "Frame",
                         "component_class": "/Script/Engine.SceneComponent",
                         "template": 1,
                         "children": []}
                    ]
                })),
            ],
            Vec::new(),
            Vec::new(),
            vec![
                object(json!({
                    "path": "/Game/BP/BP_Door.Default__BP_Door_C",
                    "name": "Default__BP_Door_C",
                    "package": "/Game/BP/BP_Door",
                    "class_path": "/Game/BP/BP_Door.BP_Door_C",
                    "flags": RF_CLASS_DEFAULT_OBJECT,
                    "values": {"OpenAngle": 90.0}
                })),
                object(json!({
                    "path": "/Game/BP/BP_Door.BP_Door_C:Frame_GEN_VARIABLE",
                    "name": "Frame_GEN_VARIABLE",
                    "package": "/Game/BP/BP_Door",
                    "class_path": "/Script/Engine.SceneComponent"
                })),
            ],
        )
    }

    #[test]
    fn constructor_creates_scs_component_and_emits_delta() {
        let reg = actor_registry();
        let door = reg.find_class("/Game/BP/BP_Door.BP_Door_C").unwrap();
        let mut ctx = EmitterContext::new(&reg, door);
        generate_constructor(&mut ctx);
        let out = ctx.body.result();

        let cpp = naming::class_cpp_name(&reg, door);
        assert!(out.contains(&format!(
            "{cpp}::{cpp}(const FObjectInitializer& ObjectInitializer) : Super(ObjectInitializer)"
        )));
        assert!(out.contains(&format!(
            "{cpp}::__CustomDynamicClassInitialization(CastChecked<UDynamicClass>(GetClass()));"
        )));
        assert!(out.contains(
            "bpv__Frame = CreateDefaultSubobject<USceneComponent>(TEXT(\"Frame\"));"
        ));
        assert!(out.contains("bpv__Frame->CreationMethod = EComponentCreationMethod::Native;"));
        assert!(out.contains("RootComponent = bpv__Frame;"));
        assert!(out.contains("bpv__OpenAngle = 90.000000f;"));
    }

    #[test]
    fn post_load_subobjects_fixes_created_components() {
        let reg = actor_registry();
        let door = reg.find_class("/Game/BP/BP_Door.BP_Door_C").unwrap();
        let mut ctx = EmitterContext::new(&reg, door);
        generate_constructor(&mut ctx);
        let out = ctx.body.result();
        let cpp = naming::class_cpp_name(&reg, door);
        assert!(out.contains(&format!(
            "void {cpp}::PostLoadSubobjects(FObjectInstancingGraph* OuterInstanceGraph)"
        )));
        assert!(out.contains("Super::PostLoadSubobjects(OuterInstanceGraph);"));
    }

    #[test]
    fn class_subobject_create_then_init_emits_once() {
        let reg = ModelRegistry::new(
            vec![
                class(json!({
                    "path": "/Script/Engine.TimelineTemplate", "name": "TimelineTemplate",
                    "native": true
                })),
                class(json!({
                    "path": "/Game/BP/BP_Fade.BP_Fade_C", "name": "BP_Fade_C",
                    "converted": true,
                    "timelines": [0]
                })),
            ],
            Vec::new(),
            Vec::new(),
            vec![object(json!({
                "path": "/Game/BP/BP_Fade.BP_Fade_C:FadeTimeline",
                "name": "FadeTimeline",
                "package": "/Game/BP/BP_Fade",
                "class_path": "/Script/Engine.TimelineTemplate"
            }))],
        );
        let fade = reg.find_class("/Game/BP/BP_Fade.BP_Fade_C").unwrap();
        let mut ctx = EmitterContext::new(&reg, fade);
        ctx.set_code_type(GeneratedCodeType::SubobjectsOfClass);

        let created = handle_class_subobject(&mut ctx, 0, ClassSubobjectList::Timelines, true, false);
        assert_eq!(created, "__Local__0");
        let out = ctx.body.result();
        assert!(out.contains(
            "auto __Local__0 = NewObject<UTimelineTemplate>(InDynamicClass, UTimelineTemplate::StaticClass(), TEXT(\"FadeTimeline\"));"
        ));
        assert!(out.contains("InDynamicClass->Timelines.Add(__Local__0);"));

        // Initialization phase reuses the mapping instead of re-creating.
        let lines_before = ctx.body.result().lines().count();
        let initialized =
            handle_class_subobject(&mut ctx, 0, ClassSubobjectList::Timelines, false, true);
        assert_eq!(initialized, "__Local__0");
        assert_eq!(ctx.body.result().lines().count(), lines_before);
    }

    #[test]
    fn class_subobject_resolves_through_member_array_after_pass_switch() {
        let reg = ModelRegistry::new(
            vec![
                class(json!({
                    "path": "/Script/Engine.TimelineTemplate", "name": "TimelineTemplate",
                    "native": true
                })),
                class(json!({
                    "path": "/Game/BP/BP_Fade.BP_Fade_C", "name": "BP_Fade_C",
                    "converted": true,
                    "timelines": [0]
                })),
            ],
            Vec::new(),
            Vec::new(),
            vec![object(json!({
                "path": "/Game/BP/BP_Fade.BP_Fade_C:FadeTimeline",
                "name": "FadeTimeline",
                "package": "/Game/BP/BP_Fade",
                "class_path": "/Script/Engine.TimelineTemplate"
            }))],
        );
        let fade = reg.find_class("/Game/BP/BP_Fade.BP_Fade_C").unwrap();
        let mut ctx = EmitterContext::new(&reg, fade);
        ctx.set_code_type(GeneratedCodeType::SubobjectsOfClass);
        handle_class_subobject(&mut ctx, 0, ClassSubobjectList::Timelines, true, false);

        // The `__Local__0` name is scoped to the subobject function; the
        // constructor reaches the timeline through the dynamic class.
        ctx.set_code_type(GeneratedCodeType::CommonConstructor);
        let expr = find_globally_mapped_object(
            &mut ctx,
            "/Game/BP/BP_Fade.BP_Fade_C:FadeTimeline",
            None,
            false,
            false,
        )
        .unwrap();
        let fade_cpp = naming::class_cpp_name(&reg, fade);
        assert_eq!(
            expr,
            format!(
                "CastChecked<UTimelineTemplate>(CastChecked<UDynamicClass>({fade_cpp}::StaticClass())->Timelines[0])"
            )
        );
    }

    #[test]
    fn custom_dynamic_class_initialization_guards_member_arrays() {
        let reg = actor_registry();
        let door = reg.find_class("/Game/BP/BP_Door.BP_Door_C").unwrap();
        let mut ctx = EmitterContext::new(&reg, door);
        generate_custom_dynamic_class_initialization(&mut ctx);
        let out = ctx.body.result();
        let cpp = naming::class_cpp_name(&reg, door);
        assert!(out.contains(&format!(
            "void {cpp}::__CustomDynamicClassInitialization(UDynamicClass* InDynamicClass)"
        )));
        assert!(out.contains("ensure(0 == InDynamicClass->MiscConvertedSubobjects.Num());"));
        assert!(out.contains("InDynamicClass->AssembleReferenceTokenStream();"));
        assert!(out.contains(
            "FConvertedBlueprintsDependencies::FillUsedAssetsInDynamicClass(InDynamicClass, &__StaticDependencies_DirectlyUsedAssets);"
        ));
    }
}
