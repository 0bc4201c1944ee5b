// C++ name synthesis for native and converted types.
//
// Converted type names must be stable across incremental recompiles of the
// same input, so the collision-avoidance suffix is a deterministic hash of
// the object path, never a counter.

use bpnative_model::{ClassModel, EnumModel, ModelRegistry, StructModel};

const ACTOR_PATH: &str = "/Script/Engine.Actor";

/// Stable 32-bit FNV-1a hash of an object path.
pub fn path_hash(path: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in path.bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// Replace everything outside `[A-Za-z0-9_]` so the result is a valid C++
/// identifier fragment.
pub fn sanitize_identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

/// Name body for a converted (to-be-nativized) type: the sanitized source
/// name with a path-hash suffix folded in.
pub fn converted_name(name: &str, path: &str) -> String {
    format!("{}__pf{}", sanitize_identifier(name), path_hash(path))
}

/// C++ name of a class, native or converted. Actors keep the `A` prefix,
/// everything else gets `U`.
pub fn class_cpp_name(reg: &ModelRegistry, class: &ClassModel) -> String {
    let prefix = if reg.class_is_a(&class.path, ACTOR_PATH) { 'A' } else { 'U' };
    if class.native {
        format!("{prefix}{}", class.name)
    } else {
        format!("{prefix}{}", converted_name(&class.name, &class.path))
    }
}

/// C++ name of a script struct.
pub fn struct_cpp_name(strct: &StructModel) -> String {
    if strct.native {
        format!("F{}", strct.name)
    } else {
        format!("F{}", converted_name(&strct.name, &strct.path))
    }
}

/// C++ name of an enum. Native enum names already carry their prefix.
pub fn enum_cpp_name(enm: &EnumModel) -> String {
    if enm.native {
        enm.name.clone()
    } else {
        format!("E{}", converted_name(&enm.name, &enm.path))
    }
}

/// C++ member name for a property. Native members keep their source name;
/// Blueprint-added variables get the `bpv__` prefix (and a hash suffix when
/// sanitization had to rewrite characters).
pub fn member_cpp_name(owner_is_converted: bool, prop_name: &str) -> String {
    if !owner_is_converted {
        return prop_name.to_string();
    }
    let sanitized = sanitize_identifier(prop_name);
    if sanitized == prop_name {
        format!("bpv__{sanitized}")
    } else {
        format!("bpv__{sanitized}__pf{}", path_hash(prop_name))
    }
}

/// Wrapper type used to reach fields of a class that stays unconverted.
pub fn unconverted_wrapper_name(class: &ClassModel) -> String {
    format!("FUnconvertedWrapper__{}", sanitize_identifier(&class.name))
}

/// Static registration helper emitted next to each converted class.
pub fn register_helper_name(class_cpp_name: &str) -> String {
    format!("FRegisterHelper__{class_cpp_name}")
}

/// Split a long package name into (folder, short name), the two leading
/// fields of a dependency record row.
pub fn split_package(package: &str) -> (&str, &str) {
    match package.rsplit_once('/') {
        Some((folder, short)) if !folder.is_empty() => (folder, short),
        _ => ("", package.trim_start_matches('/')),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_hash_is_stable_and_discriminating() {
        let a = path_hash("/Game/BP/BP_Foo.BP_Foo_C");
        let b = path_hash("/Game/BP/BP_Foo.BP_Foo_C");
        let c = path_hash("/Game/BP/BP_Bar.BP_Bar_C");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn sanitize_rewrites_invalid_chars() {
        assert_eq!(sanitize_identifier("My Component"), "My_Component");
        assert_eq!(sanitize_identifier("2Fast"), "_2Fast");
        assert_eq!(sanitize_identifier("Plain_Name3"), "Plain_Name3");
    }

    #[test]
    fn member_names_prefix_converted_owners_only() {
        assert_eq!(member_cpp_name(false, "Health"), "Health");
        assert_eq!(member_cpp_name(true, "Health"), "bpv__Health");
        let odd = member_cpp_name(true, "Max Health");
        assert!(odd.starts_with("bpv__Max_Health__pf"));
    }

    #[test]
    fn split_package_folder_and_short_name() {
        assert_eq!(split_package("/Game/Blueprints/BP_Foo"), ("/Game/Blueprints", "BP_Foo"));
        assert_eq!(split_package("/Engine"), ("", "Engine"));
    }
}
