//! Generated SDK source: tree-sitter parse plus a top-level declaration index.
//!
//! Only top-level statements are indexed. Code generators emit every type,
//! enum and constant the SDK needs at module scope, so nested scopes never
//! contribute declarations.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree};

use crate::error::{CoverageError, Result};

/// A parsed generated SDK file.
pub struct SdkSource {
    path: PathBuf,
    source: String,
    tree: Tree,
}

impl SdkSource {
    /// Read and parse an SDK file from disk.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CoverageError::FileNotFound(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        Self::parse(path, source)
    }

    /// Parse SDK source text. `path` is only used in error messages.
    pub fn parse(path: &Path, source: String) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .map_err(|e| CoverageError::ParserInit(path.to_path_buf(), e.to_string()))?;

        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| CoverageError::TreeSitterParseFailed(path.to_path_buf()))?;

        Ok(Self {
            path: path.to_path_buf(),
            source,
            tree,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.source
    }

    /// Index every top-level declaration by name.
    ///
    /// When a name is declared twice in the same namespace the first
    /// declaration wins.
    pub fn declarations(&self) -> Declarations<'_> {
        let mut decls = Declarations::default();
        let source = self.source.as_bytes();
        let root = self.tree.root_node();

        let mut cursor = root.walk();
        for statement in root.named_children(&mut cursor) {
            let declaration = if statement.kind() == "export_statement" {
                match statement.child_by_field_name("declaration") {
                    Some(d) => d,
                    None => continue,
                }
            } else {
                statement
            };
            decls.index(declaration, source);
        }

        decls
    }
}

/// Top-level declarations of an SDK file, keyed by name.
///
/// Types and values live in separate namespaces, so `const Role = {..}`
/// and `type Role = ..` can coexist.
#[derive(Default)]
pub struct Declarations<'a> {
    pub functions: HashMap<&'a str, Node<'a>>,
    pub type_aliases: HashMap<&'a str, Node<'a>>,
    pub interfaces: HashMap<&'a str, Node<'a>>,
    pub enums: HashMap<&'a str, Node<'a>>,
    /// `variable_declarator` nodes of `const`/`let`/`var` statements.
    pub constants: HashMap<&'a str, Node<'a>>,
}

impl<'a> Declarations<'a> {
    fn index(&mut self, node: Node<'a>, source: &'a [u8]) {
        match node.kind() {
            "function_declaration" => insert_named(&mut self.functions, node, source),
            "type_alias_declaration" => insert_named(&mut self.type_aliases, node, source),
            "interface_declaration" => insert_named(&mut self.interfaces, node, source),
            "enum_declaration" => insert_named(&mut self.enums, node, source),
            "lexical_declaration" | "variable_declaration" => {
                let mut cursor = node.walk();
                for declarator in node.named_children(&mut cursor) {
                    if declarator.kind() == "variable_declarator" {
                        insert_named(&mut self.constants, declarator, source);
                    }
                }
            }
            _ => {}
        }
    }
}

fn insert_named<'a>(map: &mut HashMap<&'a str, Node<'a>>, node: Node<'a>, source: &'a [u8]) {
    if let Some(name) = node
        .child_by_field_name("name")
        .and_then(|n| n.utf8_text(source).ok())
    {
        map.entry(name).or_insert(node);
    }
}
