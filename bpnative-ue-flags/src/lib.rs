// UE reflection flag constants consulted by the nativization backend.
//
// Mirrors EPropertyFlags, EObjectFlags, EClassFlags, and EStructFlags from
// UE source:
//   - Engine/Source/Runtime/CoreUObject/Public/UObject/ObjectMacros.h
//   - Engine/Source/Runtime/CoreUObject/Public/UObject/Class.h

// ---------------------------------------------------------------------------
// EPropertyFlags (CPF_*) (uint64)
// ---------------------------------------------------------------------------

/// No flags.
pub const CPF_NONE: u64 = 0x0000_0000_0000_0000;
/// Property is user-settable in the editor.
pub const CPF_EDIT: u64 = 0x0000_0000_0000_0001;
/// This is a constant function parameter.
pub const CPF_CONST_PARM: u64 = 0x0000_0000_0000_0002;
/// Property is relevant to network replication.
pub const CPF_NET: u64 = 0x0000_0000_0000_0020;
/// Function/When call parameter.
pub const CPF_PARM: u64 = 0x0000_0000_0000_0080;
/// Value is copied out after function call.
pub const CPF_OUT_PARM: u64 = 0x0000_0000_0000_0100;
/// memset is fine for construction.
pub const CPF_ZERO_CONSTRUCTOR: u64 = 0x0000_0000_0000_0200;
/// Return value.
pub const CPF_RETURN_PARM: u64 = 0x0000_0000_0000_0400;
/// Property is transient: shouldn't be saved or loaded, except for Blueprint CDOs.
pub const CPF_TRANSIENT: u64 = 0x0000_0000_0000_2000;
/// Property should be loaded/saved as permanent profile.
pub const CPF_CONFIG: u64 = 0x0000_0000_0000_4000;
/// Load config from base class, not subclass.
pub const CPF_GLOBAL_CONFIG: u64 = 0x0000_0000_0004_0000;
/// Property is a component reference.
pub const CPF_INSTANCED_REFERENCE: u64 = 0x0000_0000_0008_0000;
/// Property should always be reset to the default value during any type of duplication.
pub const CPF_DUPLICATE_TRANSIENT: u64 = 0x0000_0000_0020_0000;
/// Value is passed by reference; CPF_OUT_PARM and CPF_PARM should also be set.
pub const CPF_REFERENCE_PARM: u64 = 0x0000_0000_0800_0000;
/// Property is deprecated. Read it from an archive, but don't save it.
pub const CPF_DEPRECATED: u64 = 0x0000_0000_2000_0000;
/// Property should only be loaded in the editor.
pub const CPF_EDITOR_ONLY: u64 = 0x0000_0008_0000_0000;
/// Property contains component references.
pub const CPF_CONTAINS_INSTANCED_REFERENCE: u64 = 0x0000_0080_0000_0000;
/// A object referenced by the property is duplicated like a component.
pub const CPF_PERSISTENT_INSTANCE: u64 = 0x0002_0000_0000_0000;
/// Property was parsed as a wrapper class like TSubclassOf<T>, FScriptInterface etc.
pub const CPF_UOBJECT_WRAPPER: u64 = 0x0004_0000_0000_0000;
/// Public native access specifier.
pub const CPF_NATIVE_ACCESS_SPECIFIER_PUBLIC: u64 = 0x0010_0000_0000_0000;
/// Protected native access specifier.
pub const CPF_NATIVE_ACCESS_SPECIFIER_PROTECTED: u64 = 0x0020_0000_0000_0000;
/// Private native access specifier.
pub const CPF_NATIVE_ACCESS_SPECIFIER_PRIVATE: u64 = 0x0040_0000_0000_0000;

/// All native access specifier bits.
pub const CPF_NATIVE_ACCESS_SPECIFIERS: u64 = CPF_NATIVE_ACCESS_SPECIFIER_PUBLIC
    | CPF_NATIVE_ACCESS_SPECIFIER_PROTECTED
    | CPF_NATIVE_ACCESS_SPECIFIER_PRIVATE;

// ---------------------------------------------------------------------------
// EObjectFlags (RF_*) (uint32, widened to u64 for uniform handling)
// ---------------------------------------------------------------------------

/// No flags.
pub const RF_NO_FLAGS: u64 = 0x0000_0000;
/// Object is visible outside its package.
pub const RF_PUBLIC: u64 = 0x0000_0001;
/// Keep object around for editing even if unreferenced.
pub const RF_STANDALONE: u64 = 0x0000_0002;
/// Object is transactional.
pub const RF_TRANSACTIONAL: u64 = 0x0000_0008;
/// This object is its class's default object.
pub const RF_CLASS_DEFAULT_OBJECT: u64 = 0x0000_0010;
/// This object is a template for another object; treat like a class default object.
pub const RF_ARCHETYPE_OBJECT: u64 = 0x0000_0020;
/// Don't save object.
pub const RF_TRANSIENT: u64 = 0x0000_0040;
/// Object is a default subobject of a class, created automatically with its outer.
pub const RF_DEFAULT_SUB_OBJECT: u64 = 0x0004_0000;
/// Object is a component template owned by an inheritable component handler.
pub const RF_INHERITABLE_COMPONENT_TEMPLATE: u64 = 0x0040_0000;

// ---------------------------------------------------------------------------
// EClassFlags (CLASS_*) (uint32, widened to u64)
// ---------------------------------------------------------------------------

/// Class is abstract and can't be instantiated directly.
pub const CLASS_ABSTRACT: u64 = 0x0000_0001;
/// Load object configuration at construction time.
pub const CLASS_CONFIG: u64 = 0x0000_0004;
/// This object type can't be saved; null it out at save time.
pub const CLASS_TRANSIENT: u64 = 0x0000_0008;
/// Class is natively declared (C++), not introduced by content.
pub const CLASS_NATIVE: u64 = 0x0000_0080;
/// Don't export to C++ header.
pub const CLASS_NO_EXPORT: u64 = 0x0000_0100;
/// Don't allow users to create this class in the editor.
pub const CLASS_NOT_PLACEABLE: u64 = 0x0000_0200;
/// Handle object configuration on a per-object basis, rather than per class.
pub const CLASS_PER_OBJECT_CONFIG: u64 = 0x0000_0400;
/// This class is an interface definition.
pub const CLASS_INTERFACE: u64 = 0x0000_4000;
/// All properties and functions in this class are const.
pub const CLASS_CONST: u64 = 0x0001_0000;

// ---------------------------------------------------------------------------
// EStructFlags (STRUCT_*) (int32, widened to u64)
// ---------------------------------------------------------------------------

/// Struct is natively declared (C++).
pub const STRUCT_NATIVE: u64 = 0x0000_0001;
/// Native representation is identical to the script layout; memcpy is safe.
pub const STRUCT_IDENTICAL_NATIVE: u64 = 0x0000_0002;
/// Struct contains object references that are instanced per owner.
pub const STRUCT_HAS_INSTANCED_REFERENCE: u64 = 0x0000_0004;
/// Struct has no matching exported C++ declaration.
pub const STRUCT_NO_EXPORT: u64 = 0x0000_0008;
/// Struct is always serialized as a single unit.
pub const STRUCT_ATOMIC: u64 = 0x0000_0010;
/// Struct is immutable: memcpy is safe and layout never changes.
pub const STRUCT_IMMUTABLE: u64 = 0x0000_0020;

/// True if `flags` carry any of the bits in `mask`.
#[inline]
pub fn has_any(flags: u64, mask: u64) -> bool {
    flags & mask != 0
}

/// True if `flags` carry every bit in `mask`.
#[inline]
pub fn has_all(flags: u64, mask: u64) -> bool {
    flags & mask == mask
}
