// Indexed view over the loaded dump. All cross-references in the model are
// paths or arena indices; this is the one place they get resolved.

use std::collections::HashMap;

use crate::schema::{ClassModel, EnumModel, ObjectModel, StructModel};

/// All loaded model tables plus path lookup maps.
pub struct ModelRegistry {
    pub classes: Vec<ClassModel>,
    pub structs: Vec<StructModel>,
    pub enums: Vec<EnumModel>,
    pub objects: Vec<ObjectModel>,
    class_by_path: HashMap<String, usize>,
    struct_by_path: HashMap<String, usize>,
    enum_by_path: HashMap<String, usize>,
    object_by_path: HashMap<String, usize>,
}

impl ModelRegistry {
    pub fn new(
        classes: Vec<ClassModel>,
        structs: Vec<StructModel>,
        enums: Vec<EnumModel>,
        objects: Vec<ObjectModel>,
    ) -> Self {
        let class_by_path = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.path.clone(), i))
            .collect();
        let struct_by_path = structs
            .iter()
            .enumerate()
            .map(|(i, s)| (s.path.clone(), i))
            .collect();
        let enum_by_path = enums
            .iter()
            .enumerate()
            .map(|(i, e)| (e.path.clone(), i))
            .collect();
        let object_by_path = objects
            .iter()
            .enumerate()
            .map(|(i, o)| (o.path.clone(), i))
            .collect();

        ModelRegistry {
            classes,
            structs,
            enums,
            objects,
            class_by_path,
            struct_by_path,
            enum_by_path,
            object_by_path,
        }
    }

    pub fn find_class(&self, path: &str) -> Option<&ClassModel> {
        self.class_by_path.get(path).map(|&i| &self.classes[i])
    }

    pub fn find_struct(&self, path: &str) -> Option<&StructModel> {
        self.struct_by_path.get(path).map(|&i| &self.structs[i])
    }

    pub fn find_enum(&self, path: &str) -> Option<&EnumModel> {
        self.enum_by_path.get(path).map(|&i| &self.enums[i])
    }

    pub fn find_object(&self, path: &str) -> Option<usize> {
        self.object_by_path.get(path).copied()
    }

    /// Arena access. Indices come from the dump itself; an out-of-range index
    /// means the input model is malformed.
    pub fn object(&self, idx: usize) -> &ObjectModel {
        self.objects
            .get(idx)
            .unwrap_or_else(|| panic!("object arena index {idx} out of range"))
    }

    pub fn object_class(&self, idx: usize) -> Option<&ClassModel> {
        self.find_class(&self.object(idx).class_path)
    }

    /// The object's ownership chain, from the object itself up to its root.
    pub fn outer_chain(&self, idx: usize) -> Vec<usize> {
        let mut chain = vec![idx];
        let mut cur = idx;
        while let Some(owner) = self.object(cur).owner {
            chain.push(owner);
            cur = owner;
        }
        chain
    }

    /// Super-class chain starting at `class` itself.
    pub fn class_chain<'a>(&'a self, class: &'a ClassModel) -> Vec<&'a ClassModel> {
        let mut chain = vec![class];
        let mut cur = class;
        while let Some(super_path) = &cur.super_path {
            match self.find_class(super_path) {
                Some(sup) => {
                    chain.push(sup);
                    cur = sup;
                }
                None => break,
            }
        }
        chain
    }

    /// Nearest native ancestor of a class (the class itself if native).
    pub fn nearest_native_ancestor<'a>(&'a self, class: &'a ClassModel) -> Option<&'a ClassModel> {
        self.class_chain(class).into_iter().find(|c| c.native)
    }

    /// Whether `class_path` names a class equal to or derived from
    /// `ancestor_path`.
    pub fn class_is_a(&self, class_path: &str, ancestor_path: &str) -> bool {
        let Some(class) = self.find_class(class_path) else {
            return class_path == ancestor_path;
        };
        self.class_chain(class).iter().any(|c| c.path == ancestor_path)
    }

    pub fn is_converted_class(&self, path: &str) -> bool {
        self.find_class(path).is_some_and(|c| c.converted)
    }

    pub fn is_converted_struct(&self, path: &str) -> bool {
        self.find_struct(path).is_some_and(|s| s.converted)
    }

    pub fn is_converted_enum(&self, path: &str) -> bool {
        self.find_enum(path).is_some_and(|e| e.converted)
    }

    /// Platform filters apply to the whole outer chain: an object is kept for
    /// the client only if itself and every outer is.
    pub fn chain_needs_load_for_client(&self, idx: usize) -> bool {
        self.outer_chain(idx)
            .iter()
            .all(|&i| self.object(i).needs_load_for_client)
    }

    pub fn chain_needs_load_for_server(&self, idx: usize) -> bool {
        self.outer_chain(idx)
            .iter()
            .all(|&i| self.object(i).needs_load_for_server)
    }

    /// Classes contributing construction-script nodes, most-base class first.
    /// A child node may attach to a component created by a parent class, so
    /// emission must replay the hierarchy in this order.
    pub fn scs_chain<'a>(&'a self, class: &'a ClassModel) -> Vec<&'a ClassModel> {
        let mut chain = self.class_chain(class);
        chain.reverse();
        chain.retain(|c| !c.scs_nodes.is_empty());
        chain
    }
}
