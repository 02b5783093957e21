//! Type representations and symbol tables shared by `minic-sem` and
//! `minic-codegen` (spec.md §4.2 "Type & Scope Model").

use std::collections::HashMap;

use minic_util::Symbol;
use thiserror::Error;

/// A Mini type (spec.md §3.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Bool,
    Struct(Symbol),
    /// The type of the `null` literal; assignable to any `Struct(_)`.
    Null,
    /// Only valid as a function return annotation.
    Void,
    /// Assigned to a node whose type checking failed, so later checks on
    /// the same subtree don't cascade further diagnostics (spec.md §7).
    Error,
}

impl Type {
    pub fn describe(&self) -> String {
        match self {
            Type::Int => "int".to_string(),
            Type::Bool => "bool".to_string(),
            Type::Struct(name) => format!("struct {}", name.as_str()),
            Type::Null => "null".to_string(),
            Type::Void => "void".to_string(),
            Type::Error => "<error>".to_string(),
        }
    }

    /// Whether a value of type `other` may be stored into a location of
    /// type `self` (spec.md §4.3.1 "Assignment compatibility"): identical
    /// types, or `Struct(_) <- Null`. `Error` is compatible with anything
    /// so a single failure doesn't cascade.
    pub fn assignable_from(&self, other: &Type) -> bool {
        if *self == Type::Error || *other == Type::Error {
            return true;
        }
        self == other || matches!((self, other), (Type::Struct(_), Type::Null))
    }

    /// Whether `self`/`other` may appear on either side of `==`/`!=`
    /// (spec.md §4.3.1): same type, or one `Null` and the other `Struct(_)`.
    pub fn comparable_with(&self, other: &Type) -> bool {
        if *self == Type::Error || *other == Type::Error {
            return true;
        }
        self == other
            || matches!(
                (self, other),
                (Type::Null, Type::Struct(_)) | (Type::Struct(_), Type::Null)
            )
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeTableError {
    #[error("struct `{0}` is already declared")]
    DuplicateStruct(Symbol),
    #[error("function `{0}` is already declared")]
    DuplicateFunction(Symbol),
    #[error("unknown struct `{0}`")]
    UnknownStruct(Symbol),
    #[error("struct `{0}` has no field `{1}`")]
    UnknownField(Symbol, Symbol),
}

/// A struct's fields in declaration order, plus the derived layout
/// (spec.md §3.2: `offset(i) = 4*i`, `size = 4 * field_count`).
#[derive(Debug, Clone)]
pub struct StructInfo {
    pub name: Symbol,
    pub fields: Vec<(Symbol, Type)>,
}

impl StructInfo {
    pub fn field_index(&self, field: Symbol) -> Option<usize> {
        self.fields.iter().position(|(name, _)| *name == field)
    }

    pub fn field_type(&self, field: Symbol) -> Option<&Type> {
        self.fields.iter().find(|(name, _)| *name == field).map(|(_, ty)| ty)
    }

    pub fn field_offset(index: usize) -> u32 {
        4 * index as u32
    }

    pub fn size(&self) -> u32 {
        4 * self.fields.len() as u32
    }
}

/// Insert-unique, lookup-by-name table of struct declarations
/// (spec.md §4.2). Populated once during semantic analysis passes 1/3,
/// read-only thereafter.
#[derive(Debug, Default)]
pub struct StructTable {
    structs: HashMap<Symbol, StructInfo>,
    declaration_order: Vec<Symbol>,
}

impl StructTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: Symbol, fields: Vec<(Symbol, Type)>) -> Result<(), TypeTableError> {
        if self.structs.contains_key(&name) {
            return Err(TypeTableError::DuplicateStruct(name));
        }
        self.declaration_order.push(name);
        self.structs.insert(name, StructInfo { name, fields });
        Ok(())
    }

    pub fn get(&self, name: Symbol) -> Option<&StructInfo> {
        self.structs.get(&name)
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.structs.contains_key(&name)
    }

    pub fn field_type(&self, struct_name: Symbol, field: Symbol) -> Result<Type, TypeTableError> {
        let info = self.get(struct_name).ok_or(TypeTableError::UnknownStruct(struct_name))?;
        info.field_type(field).cloned().ok_or(TypeTableError::UnknownField(struct_name, field))
    }

    pub fn field_index(&self, struct_name: Symbol, field: Symbol) -> Result<usize, TypeTableError> {
        let info = self.get(struct_name).ok_or(TypeTableError::UnknownStruct(struct_name))?;
        info.field_index(field).ok_or(TypeTableError::UnknownField(struct_name, field))
    }

    /// Structs in declaration order, for deterministic `.data` emission.
    pub fn iter_in_declaration_order(&self) -> impl Iterator<Item = &StructInfo> {
        self.declaration_order.iter().map(move |name| &self.structs[name])
    }
}

/// A function's signature — parameter and return types only, no body
/// (spec.md §4.2).
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub name: Symbol,
    pub params: Vec<Type>,
    pub return_type: Type,
}

#[derive(Debug, Default)]
pub struct FunctionTable {
    functions: HashMap<Symbol, FunctionSignature>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, signature: FunctionSignature) -> Result<(), TypeTableError> {
        if self.functions.contains_key(&signature.name) {
            return Err(TypeTableError::DuplicateFunction(signature.name));
        }
        self.functions.insert(signature.name, signature);
        Ok(())
    }

    pub fn get(&self, name: Symbol) -> Option<&FunctionSignature> {
        self.functions.get(&name)
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.functions.contains_key(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignable_from_allows_struct_from_null() {
        let s = Type::Struct(Symbol::intern("Node"));
        assert!(s.assignable_from(&Type::Null));
        assert!(!Type::Int.assignable_from(&Type::Bool));
    }

    #[test]
    fn comparable_with_allows_null_struct_either_side() {
        let s = Type::Struct(Symbol::intern("Node"));
        assert!(s.comparable_with(&Type::Null));
        assert!(Type::Null.comparable_with(&s));
        assert!(!Type::Int.comparable_with(&Type::Bool));
    }

    #[test]
    fn struct_table_rejects_duplicate_names() {
        let mut table = StructTable::new();
        let name = Symbol::intern("Node");
        table.insert(name, vec![]).unwrap();
        assert_eq!(table.insert(name, vec![]), Err(TypeTableError::DuplicateStruct(name)));
    }

    #[test]
    fn struct_field_offsets_are_four_times_index() {
        let mut table = StructTable::new();
        let name = Symbol::intern("Node");
        let v = Symbol::intern("v");
        let next = Symbol::intern("next");
        table
            .insert(name, vec![(v, Type::Int), (next, Type::Struct(name))])
            .unwrap();
        assert_eq!(table.field_index(name, v), Ok(0));
        assert_eq!(table.field_index(name, next), Ok(1));
        assert_eq!(StructInfo::field_offset(1), 4);
        assert_eq!(table.get(name).unwrap().size(), 8);
    }

    #[test]
    fn function_table_rejects_duplicates() {
        let mut table = FunctionTable::new();
        let name = Symbol::intern("f");
        let sig = FunctionSignature { name, params: vec![], return_type: Type::Void };
        table.insert(sig.clone()).unwrap();
        assert_eq!(table.insert(sig), Err(TypeTableError::DuplicateFunction(name)));
    }
}
