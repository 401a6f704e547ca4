//! Operation schema extraction from a generated SDK.
//!
//! Walks the tree-sitter AST of a `graphql-codegen` style SDK file and
//! derives, for every operation returned by the SDK factory, the ordered
//! list of its input parameters:
//! - primitive fields (`string`, `number`, scalars resolved through `Scalars[..]`)
//! - enum fields (enum declarations, const-object enums, literal unions)
//! - structured fields, resolved recursively through type aliases and interfaces

use std::path::Path;
use tracing::{debug, info};
use tree_sitter::Node;

use super::source::{Declarations, SdkSource};
use crate::error::{CoverageError, Result};
use crate::schema::{EnumLiteral, EnumValue, OperationSchema, ParsedParameter};

/// Conventional name of the SDK factory emitted by `typescript-generic-sdk`.
pub const DEFAULT_SDK_FUNCTION: &str = "getSdk";

/// Parameter name reserved for transport options. Never a GraphQL argument.
const OPTIONS_PARAMETER: &str = "options";

/// Type names that are never resolved any further (compared case-insensitively).
const PRIMITIVE_TYPES: &[&str] = &[
    "id",
    "null",
    "undefined",
    "string",
    "number",
    "bigint",
    "int",
    "float",
    "boolean",
    "date",
    "function",
    "symbol",
    "never",
    "jsonobject",
    "json",
    "file",
];

/// Alias chains longer than this are treated as unresolvable.
const MAX_ALIAS_DEPTH: usize = 32;

/// Whether a type name refers to a custom (non-primitive) type.
pub fn is_type_custom(type_name: &str) -> bool {
    !PRIMITIVE_TYPES
        .iter()
        .any(|p| p.eq_ignore_ascii_case(type_name))
}

/// Extract the operation schema of the SDK file at `path`.
pub fn extract_operations_schema(path: &Path, sdk_function: &str) -> Result<Vec<OperationSchema>> {
    let sdk = SdkSource::read(path)?;
    extract_from_sdk(&sdk, sdk_function)
}

/// Extract the operation schema from SDK source text already in memory.
pub fn extract_operations_schema_from_source(
    path: &Path,
    source: &str,
    sdk_function: &str,
) -> Result<Vec<OperationSchema>> {
    let sdk = SdkSource::parse(path, source.to_string())?;
    extract_from_sdk(&sdk, sdk_function)
}

fn extract_from_sdk(sdk: &SdkSource, sdk_function: &str) -> Result<Vec<OperationSchema>> {
    let decls = sdk.declarations();
    let function = *decls
        .functions
        .get(sdk_function)
        .ok_or_else(|| CoverageError::FunctionNotFound {
            function: sdk_function.to_string(),
            path: sdk.path().to_path_buf(),
        })?;

    let extractor = SchemaExtractor {
        source: sdk.text().as_bytes(),
        decls,
    };

    let signatures = extractor
        .operation_signatures(function)
        .ok_or_else(|| CoverageError::ReturnTypeUnresolved(sdk_function.to_string()))?;

    let mut operations = Vec::with_capacity(signatures.len());
    for signature in signatures {
        let mut operation = OperationSchema::new(signature.name.as_str());
        for parameters in signature.parameter_lists {
            extractor.collect_input_params(parameters, &mut operation.input_params)?;
        }
        debug!(
            operation = %operation.name,
            params = operation.input_params.len(),
            "extracted operation"
        );
        operations.push(operation);
    }

    info!(
        file = %sdk.path().display(),
        operations = operations.len(),
        "operation schema extracted"
    );
    Ok(operations)
}

// ─── Operation Discovery ───────────────────────────────────────────

/// An operation of the SDK map with the parameter lists of its signatures.
struct OperationSignature<'a> {
    name: String,
    /// `formal_parameters` nodes, one per call signature.
    parameter_lists: Vec<Node<'a>>,
}

/// A property of an object-shaped type: `key?: Type`.
struct Field<'a> {
    key: String,
    type_node: Option<Node<'a>>,
}

/// A field type after stripping nullability, generics and arrays.
enum Narrowed<'a> {
    Named(String),
    /// An inline object literal type: `{ a: string }`.
    Inline(Node<'a>),
    /// An inline literal union: `'A' | 'B'`.
    Literals {
        type_name: String,
        values: Vec<EnumValue>,
    },
}

struct SchemaExtractor<'a> {
    source: &'a [u8],
    decls: Declarations<'a>,
}

impl<'a> SchemaExtractor<'a> {
    fn text(&self, node: Node<'a>) -> &'a str {
        node.utf8_text(self.source).unwrap_or("")
    }

    /// Operations of the SDK map, in declaration order.
    ///
    /// An explicit return type annotation wins; otherwise the object
    /// literal of the factory's `return` statement is used.
    fn operation_signatures(&self, function: Node<'a>) -> Option<Vec<OperationSignature<'a>>> {
        if let Some(annotated) = function
            .child_by_field_name("return_type")
            .and_then(first_named_child)
        {
            if let Some(shape) = self.shape_of(annotated, 0) {
                return Some(self.signatures_from_shape(shape));
            }
        }

        let body = function.child_by_field_name("body")?;
        let mut cursor = body.walk();
        let returned = body
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "return_statement")
            .find_map(|ret| first_named_child(ret).map(unwrap_expression))
            .filter(|expr| expr.kind() == "object")?;

        Some(self.signatures_from_object(returned))
    }

    fn signatures_from_shape(&self, shape: Node<'a>) -> Vec<OperationSignature<'a>> {
        let mut by_name: Vec<OperationSignature<'a>> = Vec::new();
        let mut cursor = shape.walk();
        for member in shape.named_children(&mut cursor) {
            let parameters = match member.kind() {
                "method_signature" => member.child_by_field_name("parameters"),
                "property_signature" => member
                    .child_by_field_name("type")
                    .and_then(first_named_child)
                    .filter(|t| t.kind() == "function_type")
                    .and_then(|t| t.child_by_field_name("parameters")),
                _ => None,
            };
            let name = member.child_by_field_name("name").map(|n| property_key(self.text(n)));
            if let (Some(name), Some(parameters)) = (name, parameters) {
                push_signature(&mut by_name, name, parameters);
            }
        }
        by_name
    }

    fn signatures_from_object(&self, object: Node<'a>) -> Vec<OperationSignature<'a>> {
        let mut by_name: Vec<OperationSignature<'a>> = Vec::new();
        let mut cursor = object.walk();
        for member in object.named_children(&mut cursor) {
            let (name, parameters) = match member.kind() {
                "method_definition" => (
                    member.child_by_field_name("name"),
                    member.child_by_field_name("parameters"),
                ),
                "pair" => (
                    member.child_by_field_name("key"),
                    member
                        .child_by_field_name("value")
                        .map(unwrap_expression)
                        .filter(|v| {
                            matches!(v.kind(), "arrow_function" | "function_expression" | "function")
                        })
                        .and_then(|v| v.child_by_field_name("parameters")),
                ),
                _ => (None, None),
            };
            if let (Some(name), Some(parameters)) = (name, parameters) {
                push_signature(&mut by_name, property_key(self.text(name)), parameters);
            }
        }
        by_name
    }

    // ─── Parameters ────────────────────────────────────────────────

    /// Append the fields of every non-`options` parameter to `out`.
    fn collect_input_params(
        &self,
        parameters: Node<'a>,
        out: &mut Vec<ParsedParameter>,
    ) -> Result<()> {
        let mut cursor = parameters.walk();
        for param in parameters.named_children(&mut cursor) {
            if !matches!(param.kind(), "required_parameter" | "optional_parameter") {
                continue;
            }
            let name = param
                .child_by_field_name("pattern")
                .map(|p| self.text(p))
                .unwrap_or("");
            if name == OPTIONS_PARAMETER || name == "this" {
                continue;
            }
            let Some(type_node) = param
                .child_by_field_name("type")
                .and_then(first_named_child)
            else {
                continue;
            };

            let mut visiting = Vec::new();
            for parsed in self.parse_fields(type_node, &mut visiting)? {
                if !out.iter().any(|p| p.key == parsed.key) {
                    out.push(parsed);
                }
            }
        }
        Ok(())
    }

    /// Parse every field of an object-shaped type into parameters.
    fn parse_fields(
        &self,
        type_node: Node<'a>,
        visiting: &mut Vec<String>,
    ) -> Result<Vec<ParsedParameter>> {
        let mut params: Vec<ParsedParameter> = Vec::new();
        for field in self.object_fields(type_node, 0) {
            if params.iter().any(|p| p.key == field.key) {
                continue;
            }
            if let Some(param) = self.parse_field(field, visiting)? {
                params.push(param);
            }
        }
        Ok(params)
    }

    fn parse_field(
        &self,
        field: Field<'a>,
        visiting: &mut Vec<String>,
    ) -> Result<Option<ParsedParameter>> {
        let narrowed = match field.type_node {
            Some(t) => self.narrow(t),
            None => Narrowed::Named("any".to_string()),
        };

        match narrowed {
            Narrowed::Inline(object) => {
                let subs = self.parse_fields(object, visiting)?;
                Ok(Some(ParsedParameter::structured(field.key, "object", subs)))
            }
            Narrowed::Literals { type_name, values } => {
                Ok(Some(ParsedParameter::enumeration(field.key, type_name, values)))
            }
            Narrowed::Named(name) if name.eq_ignore_ascii_case("never") => Ok(None),
            Narrowed::Named(name) if !is_type_custom(&name) => {
                Ok(Some(ParsedParameter::primitive(field.key, name)))
            }
            Narrowed::Named(name) => self.parse_custom(field.key, name, visiting).map(Some),
        }
    }

    fn parse_custom(
        &self,
        key: String,
        type_name: String,
        visiting: &mut Vec<String>,
    ) -> Result<ParsedParameter> {
        if let Some(values) = self.enum_declaration_values(&type_name) {
            return Ok(ParsedParameter::enumeration(key, type_name, values));
        }
        if let Some(values) = self.const_enum_values(&type_name) {
            return Ok(ParsedParameter::enumeration(key, type_name, values));
        }
        if let Some(values) = self.literal_union_values(&type_name) {
            return Ok(ParsedParameter::enumeration(key, type_name, values));
        }

        if visiting.iter().any(|v| v == &type_name) {
            return Err(CoverageError::CyclicType(type_name));
        }

        visiting.push(type_name.clone());
        let subs = match self.named_shape(&type_name, 0) {
            Some(shape) => self.parse_fields(shape, visiting),
            None => Ok(Vec::new()),
        };
        visiting.pop();

        Ok(ParsedParameter::structured(key, type_name, subs?))
    }

    // ─── Structural Resolution ─────────────────────────────────────

    /// Fields of an object-shaped type, following aliases, interfaces,
    /// generic wrappers such as `Exact<{..}>` and intersections.
    fn object_fields(&self, type_node: Node<'a>, depth: usize) -> Vec<Field<'a>> {
        if depth > MAX_ALIAS_DEPTH {
            return Vec::new();
        }

        match type_node.kind() {
            "object_type" | "interface_body" => self.shape_fields(type_node),
            "intersection_type" => {
                let mut cursor = type_node.walk();
                let members: Vec<Node<'a>> = type_node.named_children(&mut cursor).collect();
                members
                    .into_iter()
                    .flat_map(|m| self.object_fields(m, depth + 1))
                    .collect()
            }
            _ => match self.shape_of(type_node, depth) {
                Some(shape) if shape != type_node => self.object_fields(shape, depth + 1),
                _ => Vec::new(),
            },
        }
    }

    fn shape_fields(&self, shape: Node<'a>) -> Vec<Field<'a>> {
        let mut fields = Vec::new();
        let mut cursor = shape.walk();
        for member in shape.named_children(&mut cursor) {
            if member.kind() != "property_signature" {
                continue;
            }
            let Some(name) = member.child_by_field_name("name") else {
                continue;
            };
            fields.push(Field {
                key: property_key(self.text(name)),
                type_node: member
                    .child_by_field_name("type")
                    .and_then(first_named_child),
            });
        }
        fields
    }

    /// Resolve a type node to the object-like node describing its shape.
    fn shape_of(&self, type_node: Node<'a>, depth: usize) -> Option<Node<'a>> {
        if depth > MAX_ALIAS_DEPTH {
            return None;
        }
        match type_node.kind() {
            "object_type" | "interface_body" | "intersection_type" => Some(type_node),
            "parenthesized_type" => {
                first_named_child(type_node).and_then(|inner| self.shape_of(inner, depth + 1))
            }
            "generic_type" => {
                let name = type_node
                    .child_by_field_name("name")
                    .map(|n| self.text(n))
                    .unwrap_or("");
                match self.named_shape(name, depth + 1) {
                    // A generic alias whose body is a concrete object keeps its own shape.
                    Some(shape) if !self.is_type_parameterised(name) => Some(shape),
                    _ => type_node
                        .child_by_field_name("type_arguments")
                        .and_then(first_named_child)
                        .and_then(|arg| self.shape_of(arg, depth + 1)),
                }
            }
            "type_identifier" | "nested_type_identifier" => {
                self.named_shape(self.text(type_node), depth + 1)
            }
            _ => None,
        }
    }

    /// Shape of a named alias or interface.
    fn named_shape(&self, name: &str, depth: usize) -> Option<Node<'a>> {
        if let Some(alias) = self.decls.type_aliases.get(name) {
            let value = alias.child_by_field_name("value")?;
            return self.shape_of(value, depth + 1);
        }
        self.decls
            .interfaces
            .get(name)
            .and_then(|i| i.child_by_field_name("body"))
    }

    fn is_type_parameterised(&self, name: &str) -> bool {
        self.decls
            .type_aliases
            .get(name)
            .or_else(|| self.decls.interfaces.get(name))
            .map(|d| d.child_by_field_name("type_parameters").is_some())
            .unwrap_or(false)
    }

    // ─── Type Narrowing ────────────────────────────────────────────

    /// Strip wrappers from a field type down to the name that decides
    /// whether it is primitive, an enum or a structure.
    fn narrow(&self, type_node: Node<'a>) -> Narrowed<'a> {
        match type_node.kind() {
            "generic_type" => match type_node
                .child_by_field_name("type_arguments")
                .and_then(first_named_child)
            {
                Some(arg) => self.narrow(arg),
                None => Narrowed::Named(self.text(type_node).to_string()),
            },
            "array_type" | "parenthesized_type" | "readonly_type" => match first_named_child(type_node) {
                Some(inner) => self.narrow(inner),
                None => Narrowed::Named(self.text(type_node).to_string()),
            },
            "union_type" => {
                if let Some(values) = self.literal_members(type_node) {
                    return Narrowed::Literals {
                        type_name: self.text(type_node).trim().to_string(),
                        values,
                    };
                }
                let mut members = Vec::new();
                flatten_union(type_node, &mut members);
                let mut fallback = None;
                for candidate in members.into_iter().map(|m| self.narrow(m)) {
                    let nullish = matches!(
                        &candidate,
                        Narrowed::Named(n) if n == "null" || n == "undefined"
                    );
                    if !nullish {
                        return candidate;
                    }
                    if fallback.is_none() {
                        fallback = Some(candidate);
                    }
                }
                fallback.unwrap_or_else(|| Narrowed::Named("null".to_string()))
            }
            "lookup_type" => match self.resolve_lookup(type_node, 0) {
                Some(resolved) => self.narrow(resolved),
                None => Narrowed::Named(
                    self.lookup_fallback(type_node)
                        .unwrap_or_else(|| self.text(type_node).to_string()),
                ),
            },
            "object_type" => Narrowed::Inline(type_node),
            _ => Narrowed::Named(self.text(type_node).trim().to_string()),
        }
    }

    /// Resolve `Scalars['String']['input']` to the member type it denotes.
    fn resolve_lookup(&self, node: Node<'a>, depth: usize) -> Option<Node<'a>> {
        if depth > MAX_ALIAS_DEPTH {
            return None;
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'a>> = node.named_children(&mut cursor).collect();
        let [object, index] = children.as_slice() else {
            return None;
        };
        let key = literal_key(self.text(*index))?;

        let base = if object.kind() == "lookup_type" {
            self.resolve_lookup(*object, depth + 1)?
        } else {
            *object
        };

        let shape = self.shape_of(base, depth + 1)?;
        self.object_fields(shape, depth + 1)
            .into_iter()
            .find(|f| f.key == key)
            .and_then(|f| f.type_node)
    }

    /// The first literal key of a lookup chain: `Scalars['String']['input']` → `String`.
    fn lookup_fallback(&self, node: Node<'a>) -> Option<String> {
        let mut current = node;
        loop {
            let object = first_named_child(current)?;
            if object.kind() == "lookup_type" {
                current = object;
                continue;
            }
            let index = current.named_child(1)?;
            return literal_key(self.text(index));
        }
    }

    // ─── Enums ─────────────────────────────────────────────────────

    /// Members of `enum Name { .. }`.
    fn enum_declaration_values(&self, name: &str) -> Option<Vec<EnumValue>> {
        let body = self.decls.enums.get(name)?.child_by_field_name("body")?;
        let mut values = Vec::new();
        let mut next_auto = 0.0;
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "enum_assignment" => {
                    let Some(key) = member.child_by_field_name("name") else {
                        continue;
                    };
                    let literal = member
                        .child_by_field_name("value")
                        .map(|v| self.literal(v))
                        .unwrap_or(EnumLiteral::Num(next_auto));
                    if let EnumLiteral::Num(n) = literal {
                        next_auto = n + 1.0;
                    }
                    values.push(EnumValue::new(property_key(self.text(key)), literal));
                }
                "property_identifier" | "string" | "identifier" => {
                    values.push(EnumValue::new(property_key(self.text(member)), next_auto));
                    next_auto += 1.0;
                }
                _ => {}
            }
        }
        Some(values)
    }

    /// Members of the const-object pattern:
    /// `const Name = {..} as const; type Name = typeof Name[keyof typeof Name];`
    fn const_enum_values(&self, name: &str) -> Option<Vec<EnumValue>> {
        let alias_value = self
            .decls
            .type_aliases
            .get(name)?
            .child_by_field_name("value")?;
        let compact: String = self
            .text(alias_value)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let plain = format!("typeof{name}[keyoftypeof{name}]");
        let parenthesised = format!("(typeof{name})[keyoftypeof{name}]");
        if compact != plain && compact != parenthesised {
            return None;
        }

        let object = self
            .decls
            .constants
            .get(name)?
            .child_by_field_name("value")
            .map(unwrap_expression)
            .filter(|v| v.kind() == "object")?;

        let mut values = Vec::new();
        let mut cursor = object.walk();
        for pair in object.named_children(&mut cursor) {
            if pair.kind() != "pair" {
                continue;
            }
            let (Some(key), Some(value)) = (
                pair.child_by_field_name("key"),
                pair.child_by_field_name("value"),
            ) else {
                continue;
            };
            values.push(EnumValue::new(property_key(self.text(key)), self.literal(value)));
        }
        Some(values)
    }

    /// Members of a literal union alias: `type Role = 'ADMIN' | 'USER';`
    fn literal_union_values(&self, name: &str) -> Option<Vec<EnumValue>> {
        let value = self
            .decls
            .type_aliases
            .get(name)?
            .child_by_field_name("value")?;
        if value.kind() != "union_type" {
            return None;
        }
        self.literal_members(value)
    }

    /// Members of a union made only of string/number literals (plus
    /// `null`/`undefined`, which are skipped).
    fn literal_members(&self, union: Node<'a>) -> Option<Vec<EnumValue>> {
        let mut members = Vec::new();
        flatten_union(union, &mut members);

        let mut values = Vec::new();
        for member in members {
            if matches!(self.text(member).trim(), "null" | "undefined") {
                continue;
            }
            if member.kind() != "literal_type" {
                return None;
            }
            let literal_node = first_named_child(member)?;
            match literal_node.kind() {
                "string" | "number" => {
                    let literal = self.literal(literal_node);
                    values.push(EnumValue::new(literal.to_string(), literal));
                }
                "null" | "undefined" => {}
                _ => return None,
            }
        }
        (!values.is_empty()).then_some(values)
    }

    /// Literal value of an initializer: `'ADMIN'`, `2`, `-1`.
    fn literal(&self, node: Node<'a>) -> EnumLiteral {
        let text = self.text(node).trim();
        match node.kind() {
            "string" | "template_string" => EnumLiteral::Str(strip_quotes(text).to_string()),
            "number" | "unary_expression" => text
                .parse::<f64>()
                .map(EnumLiteral::Num)
                .unwrap_or_else(|_| EnumLiteral::Str(text.to_string())),
            _ => EnumLiteral::Str(strip_quotes(text).to_string()),
        }
    }
}

// ─── Helper Functions ───────────────────────────────────────────

fn push_signature<'a>(
    signatures: &mut Vec<OperationSignature<'a>>,
    name: String,
    parameters: Node<'a>,
) {
    match signatures.iter_mut().find(|s| s.name == name) {
        // Overloads add call signatures to the same operation.
        Some(existing) => existing.parameter_lists.push(parameters),
        None => signatures.push(OperationSignature {
            name,
            parameter_lists: vec![parameters],
        }),
    }
}

fn first_named_child(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let first = node
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment");
    first
}

/// Peel `(expr)`, `expr as const` and `expr satisfies T` down to `expr`.
fn unwrap_expression(node: Node<'_>) -> Node<'_> {
    match node.kind() {
        "parenthesized_expression" | "as_expression" | "satisfies_expression" => {
            first_named_child(node).map(unwrap_expression).unwrap_or(node)
        }
        _ => node,
    }
}

fn flatten_union<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>) {
    let mut cursor = node.walk();
    for member in node.named_children(&mut cursor) {
        if member.kind() == "union_type" {
            flatten_union(member, out);
        } else {
            out.push(member);
        }
    }
}

/// Normalize a property name: drop quotes, optional markers and whitespace.
fn property_key(raw: &str) -> String {
    strip_quotes(raw.trim())
        .chars()
        .filter(|c| *c != '?' && !c.is_whitespace())
        .collect()
}

/// Key of a quoted literal index type: `'String'` → `String`.
fn literal_key(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let unquoted = strip_quotes(trimmed);
    (unquoted.len() != trimmed.len()).then(|| unquoted.to_string())
}

fn strip_quotes(s: &str) -> &str {
    for quote in ['\'', '"', '`'] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|r| r.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Vec<OperationSchema> {
        extract_operations_schema_from_source(Path::new("sdk.ts"), source, DEFAULT_SDK_FUNCTION)
            .unwrap()
    }

    const PRELUDE: &str = r#"
export type Maybe<T> = T | null;
export type InputMaybe<T> = Maybe<T>;
export type Exact<T extends { [key: string]: unknown }> = { [K in keyof T]: T[K] };
export type Scalars = {
  ID: { input: string; output: string; }
  String: { input: string; output: string; }
  Int: { input: number; output: number; }
  DateTime: { input: any; output: any; }
};
"#;

    #[test]
    fn test_is_type_custom() {
        assert!(!is_type_custom("string"));
        assert!(!is_type_custom("ID"));
        assert!(!is_type_custom("JSONObject"));
        assert!(!is_type_custom("Never"));
        assert!(is_type_custom("UserFilter"));
        assert!(is_type_custom("any"));
    }

    #[test]
    fn test_scalar_lookup_resolves_to_primitive() {
        let source = format!(
            "{PRELUDE}
export type UserQueryVariables = Exact<{{
  id: Scalars['ID']['input'];
  take?: InputMaybe<Scalars['Int']['input']>;
}}>;
export function getSdk(requester: any) {{
  return {{
    user(variables: UserQueryVariables, options?: C): Promise<any> {{ return requester(); }}
  }};
}}"
        );
        let ops = extract(&source);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name, "user");
        assert_eq!(
            ops[0].input_params,
            vec![
                ParsedParameter::primitive("id", "string"),
                ParsedParameter::primitive("take", "number"),
            ]
        );
    }

    #[test]
    fn test_unknown_scalar_falls_back_to_lookup_key() {
        let source = r#"
export type V = { at: Scalars['Date']['input'] };
export function getSdk() { return { events(variables: V) { return 1; } }; }
"#;
        let ops = extract(source);
        assert_eq!(ops[0].input_params, vec![ParsedParameter::primitive("at", "Date")]);
    }

    #[test]
    fn test_never_index_signature_yields_no_params() {
        let source = format!(
            "{PRELUDE}
export type GroupsQueryVariables = Exact<{{ [key: string]: never; }}>;
export function getSdk(requester: any) {{
  return {{
    groups(variables?: GroupsQueryVariables, options?: C) {{ return requester(); }}
  }};
}}"
        );
        let ops = extract(&source);
        assert_eq!(ops[0].name, "groups");
        assert!(ops[0].input_params.is_empty());
    }

    #[test]
    fn test_never_fields_are_dropped() {
        let source = r#"
export type V = { keep: string; drop?: never };
export function getSdk() { return { op(variables: V) { return 1; } }; }
"#;
        let ops = extract(source);
        assert_eq!(ops[0].input_params, vec![ParsedParameter::primitive("keep", "string")]);
    }

    #[test]
    fn test_nested_custom_types_and_enums() {
        let source = format!(
            "{PRELUDE}
export enum SortOrder {{
  Asc = 'asc',
  Desc = 'desc'
}}
export type UserSort = {{
  field: Scalars['String']['input'];
  order?: InputMaybe<SortOrder>;
}};
export type UserFilter = {{
  name?: InputMaybe<Scalars['String']['input']>;
  sort?: InputMaybe<Array<UserSort>>;
}};
export type UsersQueryVariables = Exact<{{
  filter?: InputMaybe<UserFilter>;
}}>;
export function getSdk(requester: any) {{
  return {{
    users(variables?: UsersQueryVariables, options?: C) {{ return requester(); }}
  }};
}}"
        );
        let ops = extract(&source);
        let expected = ParsedParameter::structured(
            "filter",
            "UserFilter",
            vec![
                ParsedParameter::primitive("name", "string"),
                ParsedParameter::structured(
                    "sort",
                    "UserSort",
                    vec![
                        ParsedParameter::primitive("field", "string"),
                        ParsedParameter::enumeration(
                            "order",
                            "SortOrder",
                            vec![EnumValue::new("Asc", "asc"), EnumValue::new("Desc", "desc")],
                        ),
                    ],
                ),
            ],
        );
        assert_eq!(ops[0].input_params, vec![expected]);
    }

    #[test]
    fn test_enum_and_const_enum_parse_equally() {
        let with_enum = r#"
export enum Role { ADMIN = 'ADMIN', USER = 'USER' }
export type V = { role?: InputMaybe<Role> };
export function getSdk() { return { users(variables?: V, options?: C) { return 1; } }; }
"#;
        let with_const = r#"
export const Role = {
    ADMIN: 'ADMIN',
    USER: 'USER'
} as const;
export type Role = typeof Role[keyof typeof Role];
export type V = { role?: InputMaybe<Role> };
export function getSdk() { return { users(variables?: V, options?: C) { return 1; } }; }
"#;
        let a = extract(with_enum);
        let b = extract(with_const);
        assert_eq!(a, b);
        let role = &a[0].input_params[0];
        assert_eq!(role.enum_values.as_ref().unwrap().len(), 2);
        assert!(role.sub_params.is_none());
    }

    #[test]
    fn test_literal_union_enum() {
        let source = r#"
export type Role = 'ADMIN' | 'USER' | 'GUEST';
export type V = { role: Role };
export function getSdk() { return { users(variables: V) { return 1; } }; }
"#;
        let ops = extract(source);
        let values = ops[0].input_params[0].enum_values.as_ref().unwrap();
        let keys: Vec<&str> = values.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(keys, vec!["ADMIN", "USER", "GUEST"]);
    }

    #[test]
    fn test_numeric_enum_auto_increment() {
        let source = r#"
enum Level { Low, Mid = 5, High }
export type V = { level: Level };
export function getSdk() { return { op(variables: V) { return 1; } }; }
"#;
        let ops = extract(source);
        let values = ops[0].input_params[0].enum_values.clone().unwrap();
        assert_eq!(
            values,
            vec![
                EnumValue::new("Low", 0.0),
                EnumValue::new("Mid", 5.0),
                EnumValue::new("High", 6.0),
            ]
        );
    }

    #[test]
    fn test_interface_and_intersection_shapes() {
        let source = r#"
interface Paging { take: number; skip?: number; }
export type Search = Paging & { term: string };
export type V = { search: Search };
export function getSdk() { return { find(variables: V) { return 1; } }; }
"#;
        let ops = extract(source);
        let search = &ops[0].input_params[0];
        let keys: Vec<&str> = search
            .sub_params
            .as_ref()
            .unwrap()
            .iter()
            .map(|p| p.key.as_str())
            .collect();
        assert_eq!(keys, vec!["take", "skip", "term"]);
    }

    #[test]
    fn test_explicit_return_type_annotation() {
        let source = r#"
export type V = { id: string };
export type Sdk = {
  user(variables: V, options?: RequestOptions): Promise<unknown>;
  ping: () => Promise<unknown>;
};
export function getSdk(requester: any): Sdk { return build(requester); }
"#;
        let ops = extract(source);
        let names: Vec<&str> = ops.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["user", "ping"]);
        assert_eq!(ops[0].input_params, vec![ParsedParameter::primitive("id", "string")]);
        assert!(ops[1].input_params.is_empty());
    }

    #[test]
    fn test_arrow_function_members() {
        let source = r#"
export type V = { id: string };
export function getSdk(requester: any) {
  return {
    user: (variables: V, options?: C) => requester(variables),
  };
}
"#;
        let ops = extract(source);
        assert_eq!(ops[0].name, "user");
        assert_eq!(ops[0].input_params.len(), 1);
    }

    #[test]
    fn test_inline_object_parameter() {
        let source = r#"
export function getSdk() { return { op(variables: { a: string; nested: { b?: number } }) { return 1; } }; }
"#;
        let ops = extract(source);
        assert_eq!(ops[0].input_params[0], ParsedParameter::primitive("a", "string"));
        let nested = &ops[0].input_params[1];
        assert_eq!(nested.type_name, "object");
        assert_eq!(
            nested.sub_params.as_deref(),
            Some(&[ParsedParameter::primitive("b", "number")][..])
        );
    }

    #[test]
    fn test_cyclic_type_fails_fast() {
        let source = r#"
export type Filter = { and?: InputMaybe<Array<Filter>>; name?: string };
export type V = { where?: InputMaybe<Filter> };
export function getSdk() { return { op(variables: V) { return 1; } }; }
"#;
        let result =
            extract_operations_schema_from_source(Path::new("sdk.ts"), source, DEFAULT_SDK_FUNCTION);
        assert!(matches!(result, Err(CoverageError::CyclicType(ref t)) if t == "Filter"));
    }

    #[test]
    fn test_missing_factory_function() {
        let result = extract_operations_schema_from_source(
            Path::new("sdk.ts"),
            "export function other() { return {}; }",
            DEFAULT_SDK_FUNCTION,
        );
        match result {
            Err(CoverageError::FunctionNotFound { function, .. }) => assert_eq!(function, "getSdk"),
            other => panic!("expected FunctionNotFound, got {:?}", other.map(|o| o.len())),
        }
    }

    #[test]
    fn test_unresolvable_return_type() {
        let result = extract_operations_schema_from_source(
            Path::new("sdk.ts"),
            "export function getSdk() { doSomething(); }",
            DEFAULT_SDK_FUNCTION,
        );
        assert!(matches!(result, Err(CoverageError::ReturnTypeUnresolved(_))));
    }

    #[test]
    fn test_custom_factory_name() {
        let source = "export function makeClient() { return { ping() { return 1; } }; }";
        let ops =
            extract_operations_schema_from_source(Path::new("sdk.ts"), source, "makeClient").unwrap();
        assert_eq!(ops.len(), 1);
        assert!(ops[0].input_params.is_empty());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let source = r#"
export type V = { id: string; role: 'A' | 'B' };
export function getSdk() { return { op(variables: V) { return 1; } }; }
"#;
        assert_eq!(extract(source), extract(source));
    }

    #[test]
    fn test_inline_literal_union_is_enum() {
        let source = r#"
export type Maybe<T> = T | null;
export type V = { role: 'A' | 'B'; level?: Maybe<1 | 2 | null>; name: string | null };
export function getSdk() { return { op(variables: V) { return 1; } }; }
"#;
        let ops = extract(source);
        assert_eq!(
            ops[0].input_params,
            vec![
                ParsedParameter::enumeration(
                    "role",
                    "'A' | 'B'",
                    vec![EnumValue::new("A", "A"), EnumValue::new("B", "B")],
                ),
                ParsedParameter::enumeration(
                    "level",
                    "1 | 2 | null",
                    vec![EnumValue::new("1", 1.0), EnumValue::new("2", 2.0)],
                ),
                ParsedParameter::primitive("name", "string"),
            ]
        );
    }

    #[test]
    fn test_property_key_normalization() {
        assert_eq!(property_key("name?"), "name");
        assert_eq!(property_key("'quoted-key'"), "quoted-key");
        assert_eq!(literal_key("'String'"), Some("String".to_string()));
        assert_eq!(literal_key("String"), None);
    }
}
