// Per-class emission state. One context is created per converted class and
// dropped when its two text blobs are finished; nothing here outlives the
// session except what the caller copies out.

use std::collections::HashMap;

use bpnative_model::{ClassModel, ModelRegistry};

use crate::code_text::CodeText;

/// The three sequential code-generation passes over one class. Each pass has
/// different rules for where a subobject lives and how locals are named.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GeneratedCodeType {
    /// Emitting the dynamic-class subobject-creation function.
    SubobjectsOfClass,
    /// Emitting the per-instance constructor.
    CommonConstructor,
    /// Everything else (helper functions, dependency functions).
    Regular,
}

/// Which generated member array of the dynamic class a class-owned subobject
/// is appended to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClassSubobjectList {
    MiscConvertedSubobjects,
    DynamicBindingObjects,
    ComponentTemplates,
    Timelines,
}

pub struct EmitterContext<'a> {
    pub reg: &'a ModelRegistry,
    pub class: &'a ClassModel,
    pub header: CodeText,
    pub body: CodeText,
    pub current_code_type: GeneratedCodeType,
    pub warnings: Vec<String>,

    /// Working copy of the class's used-assets array. Emission appends with
    /// AddUnique semantics; order is position-significant (indices are
    /// emitted into the generated code).
    pub used_assets: Vec<usize>,
    /// Objects the class's own generated code touched, fed to the
    /// dependency builder at the end of the session.
    pub used_objects_in_current_class: Vec<usize>,
    /// Converted enums referenced by the generated code, loaded into the
    /// dynamic class's referenced-fields array.
    pub enums_in_current_class: Vec<String>,

    pub misc_converted_subobjects: Vec<usize>,
    pub dynamic_binding_objects: Vec<usize>,
    pub component_templates: Vec<usize>,
    pub timelines: Vec<usize>,

    // Object arena index -> C++ expression naming the created instance.
    class_subobject_map: HashMap<usize, String>,
    common_subobject_map: HashMap<usize, String>,

    // Accessor locals for inaccessible properties, scoped to brace blocks.
    accessor_cache: Vec<(String, String)>,
    scope_marks: Vec<usize>,

    local_name_index: u32,
}

impl<'a> EmitterContext<'a> {
    pub fn new(reg: &'a ModelRegistry, class: &'a ClassModel) -> Self {
        EmitterContext {
            reg,
            class,
            header: CodeText::new(),
            body: CodeText::new(),
            current_code_type: GeneratedCodeType::Regular,
            warnings: Vec::new(),
            used_assets: class.used_assets.clone(),
            used_objects_in_current_class: Vec::new(),
            enums_in_current_class: Vec::new(),
            misc_converted_subobjects: Vec::new(),
            dynamic_binding_objects: Vec::new(),
            component_templates: Vec::new(),
            timelines: Vec::new(),
            class_subobject_map: HashMap::new(),
            common_subobject_map: HashMap::new(),
            accessor_cache: Vec::new(),
            scope_marks: Vec::new(),
            local_name_index: 0,
        }
    }

    /// Next synthesized local identifier. Strictly increasing within one
    /// class emission, so generated locals never collide.
    pub fn generate_unique_local_name(&mut self) -> String {
        let name = format!("__Local__{}", self.local_name_index);
        self.local_name_index += 1;
        name
    }

    /// Switch passes. Accessor bindings use pass-specific local names, so
    /// the cache is flushed on every transition.
    pub fn set_code_type(&mut self, code_type: GeneratedCodeType) {
        self.current_code_type = code_type;
        self.accessor_cache.clear();
        self.scope_marks.clear();
    }

    pub fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// AddUnique into the used-assets array; returns the (stable) position.
    pub fn find_or_add_used_asset(&mut self, obj_idx: usize) -> usize {
        if let Some(pos) = self.used_assets.iter().position(|&i| i == obj_idx) {
            return pos;
        }
        self.used_assets.push(obj_idx);
        self.used_assets.len() - 1
    }

    pub fn mark_object_used(&mut self, obj_idx: usize) {
        if !self.used_objects_in_current_class.contains(&obj_idx) {
            self.used_objects_in_current_class.push(obj_idx);
        }
    }

    /// Record a created class-owned subobject and the expression that names
    /// it for the rest of the session.
    pub fn register_class_subobject(
        &mut self,
        obj_idx: usize,
        expr: String,
        list: ClassSubobjectList,
    ) {
        let list = match list {
            ClassSubobjectList::MiscConvertedSubobjects => &mut self.misc_converted_subobjects,
            ClassSubobjectList::DynamicBindingObjects => &mut self.dynamic_binding_objects,
            ClassSubobjectList::ComponentTemplates => &mut self.component_templates,
            ClassSubobjectList::Timelines => &mut self.timelines,
        };
        if !list.contains(&obj_idx) {
            list.push(obj_idx);
        }
        self.class_subobject_map.insert(obj_idx, expr);
    }

    /// Map an object to its naming expression for the class-subobject pass
    /// without appending it to any dynamic-class member array.
    pub fn map_class_subobject(&mut self, obj_idx: usize, expr: String) {
        self.class_subobject_map.insert(obj_idx, expr);
    }

    /// Record an instance-owned subobject created by the constructor.
    pub fn register_common_subobject(&mut self, obj_idx: usize, expr: String) {
        self.common_subobject_map.insert(obj_idx, expr);
    }

    /// Every subobject created during this session, from both passes. Order
    /// is sorted by arena index so downstream consumers stay deterministic.
    pub fn all_subobject_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .class_subobject_map
            .keys()
            .chain(self.common_subobject_map.keys())
            .copied()
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// Expression naming an already-created subobject, if the current pass
    /// can see one. Locals created while emitting the class-subobject
    /// function are invisible elsewhere; later passes reach class-owned
    /// subobjects through the dynamic class's member arrays instead.
    pub fn find_subobject_expr(&self, obj_idx: usize) -> Option<&str> {
        match self.current_code_type {
            GeneratedCodeType::SubobjectsOfClass => {
                self.class_subobject_map.get(&obj_idx).map(String::as_str)
            }
            GeneratedCodeType::CommonConstructor | GeneratedCodeType::Regular => {
                self.common_subobject_map.get(&obj_idx).map(String::as_str)
            }
        }
    }

    /// Enter a brace-delimited block: accessor bindings registered from now
    /// on are released when the matching `end_scope` runs.
    pub fn begin_scope(&mut self) {
        self.scope_marks.push(self.accessor_cache.len());
        self.body.open_brace();
    }

    pub fn end_scope(&mut self) {
        let mark = self
            .scope_marks
            .pop()
            .unwrap_or_else(|| panic!("end_scope without begin_scope in {}", self.class.name));
        self.accessor_cache.truncate(mark);
        self.body.close_brace();
    }

    pub fn find_accessor(&self, key: &str) -> Option<&str> {
        self.accessor_cache
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, local)| local.as_str())
    }

    pub fn register_accessor(&mut self, key: String, local: String) {
        self.accessor_cache.push((key, local));
    }
}
