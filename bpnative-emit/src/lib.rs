// bpnative-emit: reads the reflected class model, generates C++ source for
// converted Blueprint classes plus the shared dependency manifest.

pub mod code_text;
pub mod config;
pub mod constructor;
pub mod context;
pub mod defaults;
pub mod deps;
pub mod literals;
pub mod naming;
pub mod resolver;
pub mod ustruct;

use std::path::Path;

use bpnative_model::{
    ClassModel, ClassesFile, EnumsFile, ModelRegistry, ObjectsFile, StructsFile,
};

use crate::config::{BpnativeConfig, NativizeOptions};
use crate::context::EmitterContext;
use crate::deps::DependencyIndexAllocator;

const DEPENDENCIES_FILE_STEM: &str = "NativizedAssets_Dependencies";

/// Finished text of one converted class, ready for the file writer.
pub struct ClassOutput {
    pub file_stem: String,
    pub header: String,
    pub body: String,
    pub warnings: Vec<String>,
}

fn emit_class_declaration(ctx: &mut EmitterContext<'_>) {
    let reg = ctx.reg;
    let class = ctx.class;
    let cpp_class_name = naming::class_cpp_name(reg, class);
    let super_cpp_name = class
        .super_path
        .as_deref()
        .and_then(|p| reg.find_class(p))
        .map(|c| naming::class_cpp_name(reg, c))
        .unwrap_or_else(|| "UObject".to_string());

    ctx.header.add_line("#pragma once");
    ctx.header.add_line("#include \"CoreMinimal.h\"");
    ctx.header.add_line("#include \"GeneratedCodeHelpers.h\"");
    ctx.header.add_line("#include \"Blueprint/BlueprintSupport.h\"");
    ctx.header.add_line("");
    ctx.header.add_line("UCLASS(config=Engine, Blueprintable, BlueprintType)");
    ctx.header.add_line(&format!("class {cpp_class_name} : public {super_cpp_name}"));
    ctx.header.add_line("{");
    ctx.header.add_line("public:");
    ctx.header.increase_indent();
    ctx.header.add_line("GENERATED_BODY()");
    ctx.header.add_line(&format!(
        "{cpp_class_name}(const FObjectInitializer& ObjectInitializer);"
    ));
    ctx.header.add_line(
        "virtual void PostLoadSubobjects(FObjectInstancingGraph* OuterInstanceGraph) override;",
    );
    ctx.header.add_line(
        "static void __CustomDynamicClassInitialization(UDynamicClass* InDynamicClass);",
    );
    ctx.header.add_line(
        "static void __StaticDependencies_DirectlyUsedAssets(TArray<FBlueprintDependencyData>& AssetsToLoad);",
    );
    ctx.header.add_line(
        "static void __StaticDependenciesAssets(TArray<FBlueprintDependencyData>& AssetsToLoad);",
    );

    for prop in &class.properties {
        let type_name = resolver::resolve_type_name(reg, &prop.type_desc, prop.flags);
        let member = naming::member_cpp_name(!class.native, &prop.name);
        ctx.header.add_line("UPROPERTY(EditAnywhere, BlueprintReadWrite)");
        if prop.array_dim > 1 {
            ctx.header.add_line(&format!("{type_name} {member}[{}];", prop.array_dim));
        } else {
            ctx.header.add_line(&format!("{type_name} {member};"));
        }
    }
    ctx.header.decrease_indent();
    ctx.header.add_line("};");
}

/// Run all three emission passes for one converted class and assemble its
/// header and source text.
pub fn emit_class(
    reg: &ModelRegistry,
    class: &ClassModel,
    allocator: &mut DependencyIndexAllocator,
    options: &NativizeOptions,
) -> ClassOutput {
    let mut ctx = EmitterContext::new(reg, class);
    let file_stem = naming::converted_name(&class.name, &class.path);

    emit_class_declaration(&mut ctx);

    ctx.body.add_line(&format!("#include \"{file_stem}.h\""));
    ctx.body.add_line(&format!("#include \"{DEPENDENCIES_FILE_STEM}.h\""));
    ctx.body.add_line("");

    constructor::generate_custom_dynamic_class_initialization(&mut ctx);
    constructor::generate_constructor(&mut ctx);
    deps::add_static_functions_for_dependencies(&mut ctx, allocator, options);
    constructor::add_register_helper(&mut ctx);

    ClassOutput {
        file_stem,
        header: ctx.header.result(),
        body: ctx.body.result(),
        warnings: ctx.warnings,
    }
}

fn load_model(model_dir: &Path) -> ModelRegistry {
    let read = |name: &str| -> String {
        let path = model_dir.join(name);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()))
    };

    let classes: ClassesFile = serde_json::from_str(&read("classes.json"))
        .unwrap_or_else(|e| panic!("Failed to parse classes.json: {e}"));
    let structs: StructsFile = serde_json::from_str(&read("structs.json"))
        .unwrap_or_else(|e| panic!("Failed to parse structs.json: {e}"));
    let enums: EnumsFile = serde_json::from_str(&read("enums.json"))
        .unwrap_or_else(|e| panic!("Failed to parse enums.json: {e}"));
    let objects: ObjectsFile = serde_json::from_str(&read("objects.json"))
        .unwrap_or_else(|e| panic!("Failed to parse objects.json: {e}"));

    eprintln!(
        "  Loaded {} classes, {} structs, {} enums, {} objects",
        classes.classes.len(),
        structs.structs.len(),
        enums.enums.len(),
        objects.objects.len()
    );

    ModelRegistry::new(classes.classes, structs.structs, enums.enums, objects.objects)
}

fn load_config(config_path: &Path) -> (BpnativeConfig, std::path::PathBuf) {
    let config_str = std::fs::read_to_string(config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", config_path.display()));
    let config: BpnativeConfig = toml::from_str(&config_str)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {e}", config_path.display()));
    let config_dir = config_path
        .parent()
        .unwrap_or(Path::new("."))
        .canonicalize()
        .unwrap_or_else(|e| panic!("Failed to canonicalize config dir: {e}"));
    (config, config_dir)
}

/// Run the generate command. Main entry point for nativization.
pub fn run_generate(config_path: &Path) {
    let (config, config_dir) = load_config(config_path);
    let nativize = &config.nativize;

    let model_dir = config_dir.join(&nativize.paths.model_input);
    let cpp_out = config_dir.join(&nativize.paths.cpp_out);

    eprintln!("bpnative: loading model...");
    let reg = load_model(&model_dir);

    std::fs::create_dir_all(&cpp_out)
        .unwrap_or_else(|e| panic!("Failed to create {}: {e}", cpp_out.display()));

    let blocked = |path: &str| nativize.blocklist.classes.iter().any(|b| b == path);

    let mut allocator = DependencyIndexAllocator::new();
    let mut emitted_classes = 0usize;
    let mut emitted_structs = 0usize;
    let mut warning_count = 0usize;

    eprintln!("bpnative: generating C++ code...");
    for class in reg.classes.iter().filter(|c| c.converted && !c.native) {
        if blocked(&class.path) {
            eprintln!("  skipping blocklisted class {}", class.path);
            continue;
        }
        let output = emit_class(&reg, class, &mut allocator, &nativize.options);
        for warning in &output.warnings {
            eprintln!("  warning [{}]: {warning}", class.name);
        }
        warning_count += output.warnings.len();
        write_pair(&cpp_out, &output.file_stem, &output.header, &output.body);
        emitted_classes += 1;
    }

    for strct in reg.structs.iter().filter(|s| s.converted && !s.native) {
        let output = ustruct::emit_struct(&reg, strct);
        for warning in &output.warnings {
            eprintln!("  warning [{}]: {warning}", strct.name);
        }
        warning_count += output.warnings.len();
        let file_stem = naming::converted_name(&strct.name, &strct.path);
        write_pair(&cpp_out, &file_stem, &output.header, &output.body);
        emitted_structs += 1;
    }

    eprintln!("bpnative: writing dependency manifest...");
    write_pair(
        &cpp_out,
        DEPENDENCIES_FILE_STEM,
        &DependencyIndexAllocator::emit_header_code(),
        &allocator.emit_body_code(DEPENDENCIES_FILE_STEM),
    );

    eprintln!("bpnative: verifying output...");
    verify_output(
        &cpp_out,
        &allocator,
        emitted_classes,
        emitted_structs,
        warning_count,
    );

    eprintln!("bpnative: done!");
}

fn write_pair(cpp_out: &Path, file_stem: &str, header: &str, body: &str) {
    let header_path = cpp_out.join(format!("{file_stem}.h"));
    std::fs::write(&header_path, header)
        .unwrap_or_else(|e| panic!("Failed to write {}: {e}", header_path.display()));
    let body_path = cpp_out.join(format!("{file_stem}.cpp"));
    std::fs::write(&body_path, body)
        .unwrap_or_else(|e| panic!("Failed to write {}: {e}", body_path.display()));
}

/// Verify generation output integrity.
fn verify_output(
    cpp_out: &Path,
    allocator: &DependencyIndexAllocator,
    emitted_classes: usize,
    emitted_structs: usize,
    warning_count: usize,
) {
    let mut errors: Vec<String> = Vec::new();

    // 1. Dependency records must be contiguous and each must carry its
    //    native line.
    for (i, record) in allocator.records().iter().enumerate() {
        if record.native_line.is_empty() {
            errors.push(format!(
                "Dependency record {i} ({}) has no native line",
                record.path
            ));
            break;
        }
    }

    // 2. Required output files exist and are non-empty.
    let required = [
        format!("{DEPENDENCIES_FILE_STEM}.h"),
        format!("{DEPENDENCIES_FILE_STEM}.cpp"),
    ];
    for name in &required {
        let path = cpp_out.join(name);
        match std::fs::metadata(&path) {
            Ok(m) if m.len() == 0 => errors.push(format!("Output empty: {}", path.display())),
            Err(_) => errors.push(format!("Output missing: {}", path.display())),
            _ => {}
        }
    }

    if errors.is_empty() {
        eprintln!(
            "  OK: {} classes, {} structs, {} dependency records, {} warnings",
            emitted_classes,
            emitted_structs,
            allocator.len(),
            warning_count
        );
    } else {
        eprintln!("  Verification FAILED:");
        for e in &errors {
            eprintln!("    - {e}");
        }
        std::process::exit(1);
    }
}

/// Run the check command: parse and validate the input model without
/// writing any output.
pub fn run_check(config_path: &Path) {
    let (config, config_dir) = load_config(config_path);
    let model_dir = config_dir.join(&config.nativize.paths.model_input);

    eprintln!("bpnative: loading model...");
    let reg = load_model(&model_dir);

    let mut errors: Vec<String> = Vec::new();
    let arena_len = reg.objects.len();
    let check_idx = |errors: &mut Vec<String>, what: String, idx: usize| {
        if idx >= arena_len {
            errors.push(format!("{what} points at object {idx}, arena holds {arena_len}"));
        }
    };

    for class in &reg.classes {
        if let Some(cdo) = class.cdo {
            check_idx(&mut errors, format!("CDO of {}", class.path), cdo);
        }
        for &t in class
            .component_templates
            .iter()
            .chain(&class.timelines)
            .chain(&class.dynamic_binding_objects)
            .chain(&class.used_assets)
        {
            check_idx(&mut errors, format!("subobject of {}", class.path), t);
        }
        if let Some(super_path) = &class.super_path {
            if !class.native && reg.find_class(super_path).is_none() {
                errors.push(format!(
                    "super class {super_path} of {} is missing from the dump",
                    class.path
                ));
            }
        }
    }
    for (i, obj) in reg.objects.iter().enumerate() {
        if let Some(owner) = obj.owner {
            check_idx(&mut errors, format!("owner of object {i} ({})", obj.path), owner);
        }
        if let Some(archetype) = obj.archetype {
            check_idx(
                &mut errors,
                format!("archetype of object {i} ({})", obj.path),
                archetype,
            );
        }
    }

    if errors.is_empty() {
        let converted_classes = reg.classes.iter().filter(|c| c.converted).count();
        let converted_structs = reg.structs.iter().filter(|s| s.converted).count();
        eprintln!(
            "  OK: {converted_classes} convertible classes, {converted_structs} convertible structs"
        );
    } else {
        eprintln!("  Check FAILED:");
        for e in &errors {
            eprintln!("    - {e}");
        }
        std::process::exit(1);
    }
}
