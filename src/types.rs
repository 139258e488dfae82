//! Data model for classlike snapshots.
//!
//! Field names serialize in camelCase to match the JSON shape the editor
//! side consumes (`shortDescription`, `declaringClass`, ...). Member
//! collections are insertion-ordered maps keyed by member name, so that
//! repeated inheritance merges keep last-applied-wins semantics while
//! serialization order stays deterministic.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClasslikeKind {
    Class,
    Interface,
    Trait,
}

/// Identity of a classlike: which structure something belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureRef {
    pub name: String,
    pub filename: String,
    pub start_line: usize,
    pub end_line: usize,
    #[serde(rename = "type")]
    pub kind: ClasslikeKind,
}

/// Identity of a classlike plus the line span of one of its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStructureRef {
    pub name: String,
    pub filename: String,
    pub start_line: usize,
    pub end_line: usize,
    #[serde(rename = "type")]
    pub kind: ClasslikeKind,
    pub start_line_member: usize,
    pub end_line_member: usize,
}

/// Recorded when a child member shadows a parent member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideInfo {
    pub declaring_class: StructureRef,
    pub declaring_structure: MemberStructureRef,
    pub start_line: usize,
    pub end_line: usize,
    /// Only meaningful for methods; whether the shadowed parent method
    /// was abstract.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub was_abstract: Option<bool>,
}

/// Recorded when a method fulfils an interface requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplementationInfo {
    pub declaring_class: StructureRef,
    pub declaring_structure: MemberStructureRef,
    pub start_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstantInfo {
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub has_documentation: bool,
    pub declaring_class: StructureRef,
    pub declaring_structure: MemberStructureRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInfo {
    /// Property name without the `$` sigil.
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
    pub is_public: bool,
    pub is_protected: bool,
    pub is_private: bool,
    pub is_static: bool,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub has_documentation: bool,
    #[serde(rename = "override")]
    pub override_info: Option<OverrideInfo>,
    pub declaring_class: StructureRef,
    pub declaring_structure: MemberStructureRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodInfo {
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
    pub is_public: bool,
    pub is_protected: bool,
    pub is_private: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub has_documentation: bool,
    #[serde(rename = "override")]
    pub override_info: Option<OverrideInfo>,
    pub implementations: Vec<ImplementationInfo>,
    pub declaring_class: StructureRef,
    pub declaring_structure: MemberStructureRef,
}

/// Everything known about one classlike after indexing a file, and the
/// structure that inheritance resolution flattens ancestor data into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClasslikeSnapshot {
    /// Fully qualified name, without a leading backslash.
    pub name: String,
    pub filename: String,
    pub start_line: usize,
    pub end_line: usize,
    #[serde(rename = "type")]
    pub kind: ClasslikeKind,
    pub is_abstract: bool,
    pub is_final: bool,
    pub has_documentation: bool,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    /// Fully qualified names of direct and (after resolution) indirect
    /// ancestors. Appended to without deduplication.
    pub parents: Vec<String>,
    pub interfaces: Vec<String>,
    pub traits: Vec<String>,
    pub constants: IndexMap<String, ConstantInfo>,
    pub properties: IndexMap<String, PropertyInfo>,
    pub methods: IndexMap<String, MethodInfo>,
}

impl ClasslikeSnapshot {
    pub fn structure_ref(&self) -> StructureRef {
        StructureRef {
            name: self.name.clone(),
            filename: self.filename.clone(),
            start_line: self.start_line,
            end_line: self.end_line,
            kind: self.kind,
        }
    }

    pub fn member_structure_ref(
        &self,
        start_line_member: usize,
        end_line_member: usize,
    ) -> MemberStructureRef {
        MemberStructureRef {
            name: self.name.clone(),
            filename: self.filename.clone(),
            start_line: self.start_line,
            end_line: self.end_line,
            kind: self.kind,
            start_line_member,
            end_line_member,
        }
    }
}
