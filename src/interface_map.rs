//! Extracts the public API surface of Unity C# scripts.
//!
//! Parsing is regex-based and deliberately shallow: it reads declarations,
//! never method bodies, and tolerates code it does not understand.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::Result;

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)//.*?$").expect("valid regex"));
static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));
static USING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*using\s+([\w.]+)\s*;").expect("valid regex"));
static NAMESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*namespace\s+([\w.]+)").expect("valid regex"));

static TYPE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?P<access>public|private|protected|internal)?\s*",
        r"(?P<abstract>abstract\s+)?",
        r"(?P<static>static\s+)?",
        r"(?P<partial>partial\s+)?",
        r"\b(?P<kind>class|struct|interface)\s+",
        r"(?P<name>\w+)",
        r"(?:<[^>]+>)?",
        r"(?:\s*:\s*(?P<bases>[^{]+?))?",
        r"\s*\{",
    ))
    .expect("valid regex")
});

static ENUM_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?P<access>public|private|protected|internal)?\s*",
        r"\benum\s+(?P<name>\w+)\s*(?::\s*\w+\s*)?\{",
    ))
    .expect("valid regex")
});

static FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?m)^\s*",
        r#"(?P<attrs>(?:\[[\w\s,()="\.]+\]\s*)*)"#,
        r"(?P<access>public|private|protected|internal)\s+",
        r"(?P<static>static\s+)?",
        r"(?P<readonly>readonly\s+)?",
        r"(?P<type>[\w<>\[\],\s\?\.]+?)\s+",
        r"(?P<name>\w+)\s*",
        r"(?:=\s*(?P<default>[^;]+))?\s*;",
    ))
    .expect("valid regex")
});

static PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?m)^\s*",
        r"(?P<access>public|private|protected|internal)\s+",
        r"(?P<static>static\s+)?",
        r"(?P<type>[\w<>\[\],\s\?\.]+?)\s+",
        r"(?P<name>\w+)\s*\{",
    ))
    .expect("valid regex")
});

static METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?m)^\s*",
        r#"(?P<attrs>(?:\[[\w\s,()="\.]+\]\s*)*)"#,
        r"(?P<access>public|private|protected|internal)\s+",
        r"(?P<static>static\s+)?",
        r"(?P<virtual>virtual\s+)?",
        r"(?P<override>override\s+)?",
        r"(?P<abstract>abstract\s+)?",
        r"(?P<async>async\s+)?",
        r"(?P<ret>[\w<>\[\],\s\?\.]+?)\s+",
        r"(?P<name>\w+)\s*",
        r"(?:<[^>]+>)?\s*",
        r"\((?P<params>[^)]*)\)",
    ))
    .expect("valid regex")
});

static ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[[\w\s,()="\.]+\]\s*"#).expect("valid regex"));
static GETTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bget\b").expect("valid regex"));
static SETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:set|init)\b").expect("valid regex"));
static HIDDEN_GETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:private|protected)\s+get\b").expect("valid regex"));
static HIDDEN_SETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:private|protected)\s+(?:set|init)\b").expect("valid regex"));
static GENERIC_ARGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.*>").expect("valid regex"));
static WHERE_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+where\s+").expect("valid regex"));

/// Words that show a regex hit is a statement or a type declaration, not a member.
const NOT_A_TYPE: &[&str] = &[
    "return",
    "yield",
    "var",
    "throw",
    "new",
    "class",
    "enum",
    "struct",
    "interface",
    "event",
    "delegate",
    "const",
];

const UNITY_LIFECYCLE: &[&str] = &[
    "Awake",
    "Start",
    "Update",
    "FixedUpdate",
    "LateUpdate",
    "OnEnable",
    "OnDisable",
    "OnDestroy",
    "OnGUI",
    "OnTriggerEnter",
    "OnTriggerExit",
    "OnTriggerStay",
    "OnTriggerEnter2D",
    "OnTriggerExit2D",
    "OnTriggerStay2D",
    "OnCollisionEnter",
    "OnCollisionExit",
    "OnCollisionStay",
    "OnCollisionEnter2D",
    "OnCollisionExit2D",
    "OnCollisionStay2D",
    "OnMouseDown",
    "OnMouseUp",
    "OnMouseEnter",
    "OnMouseExit",
    "OnMouseOver",
    "OnMouseDrag",
    "OnBecameVisible",
    "OnBecameInvisible",
    "OnApplicationPause",
    "OnApplicationQuit",
    "OnApplicationFocus",
    "OnDrawGizmos",
    "OnDrawGizmosSelected",
    "OnValidate",
    "Reset",
    "OnAnimatorMove",
    "OnAnimatorIK",
    "OnRenderObject",
    "OnWillRenderObject",
    "OnPreRender",
    "OnPostRender",
    "OnRenderImage",
];

/// Base classes whose methods get Unity lifecycle treatment.
const UNITY_BASES: &[&str] = &[
    "MonoBehaviour",
    "NetworkBehaviour",
    "ScriptableObject",
    "Editor",
    "EditorWindow",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumInfo {
    pub name: String,
    pub access: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    pub name: String,
    pub type_name: String,
    pub access: String,
    pub is_static: bool,
    pub is_readonly: bool,
    /// Private field exposed to the Unity inspector via `[SerializeField]`.
    pub is_serialized: bool,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyInfo {
    pub name: String,
    pub type_name: String,
    pub has_getter: bool,
    pub has_setter: bool,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterInfo {
    pub name: String,
    pub type_name: String,
    pub default_value: Option<String>,
}

impl ParameterInfo {
    pub fn signature(&self) -> String {
        match &self.default_value {
            Some(default) => format!("{} {} = {}", self.type_name, self.name, default),
            None => format!("{} {}", self.type_name, self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodInfo {
    pub name: String,
    pub return_type: String,
    pub access: String,
    pub parameters: Vec<ParameterInfo>,
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_abstract: bool,
    pub is_async: bool,
    pub is_coroutine: bool,
}

impl MethodInfo {
    /// `ReturnType Name(params)`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.parameters.iter().map(ParameterInfo::signature).collect();
        format!("{} {}({})", self.return_type, self.name, params.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
}

impl TypeKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Interface => "interface",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassInfo {
    pub name: String,
    pub access: String,
    pub kind: TypeKind,
    pub base_classes: Vec<String>,
    pub is_abstract: bool,
    pub is_static: bool,
    pub is_partial: bool,
    pub fields: Vec<FieldInfo>,
    pub properties: Vec<PropertyInfo>,
    pub methods: Vec<MethodInfo>,
    pub enums: Vec<EnumInfo>,
}

impl ClassInfo {
    /// Derives from a Unity base whose callbacks the engine invokes.
    pub fn is_unity_class(&self) -> bool {
        self.base_classes
            .iter()
            .any(|b| UNITY_BASES.contains(&b.trim()))
    }

    /// Engine callbacks, only for Unity-derived classes.
    pub fn lifecycle_methods(&self) -> impl Iterator<Item = &MethodInfo> {
        let unity = self.is_unity_class();
        self.methods
            .iter()
            .filter(move |m| unity && is_unity_lifecycle(&m.name))
    }

    /// Public methods other than engine callbacks.
    pub fn public_methods(&self) -> impl Iterator<Item = &MethodInfo> {
        let unity = self.is_unity_class();
        self.methods
            .iter()
            .filter(move |m| m.access == "public" && !(unity && is_unity_lifecycle(&m.name)))
    }

    /// Protected or internal virtual/abstract methods a subclass can override.
    pub fn overridable_methods(&self) -> impl Iterator<Item = &MethodInfo> {
        self.methods.iter().filter(|m| {
            (m.access == "protected" || m.access == "internal") && (m.is_virtual || m.is_abstract)
        })
    }
}

/// Interface surface of one `.cs` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub filename: String,
    pub namespace: Option<String>,
    pub usings: Vec<String>,
    pub classes: Vec<ClassInfo>,
    pub top_level_enums: Vec<EnumInfo>,
    /// Other scanned scripts this file references, sorted.
    pub dependencies: Vec<String>,
}

impl FileInfo {
    /// File name without the `.cs` extension.
    pub fn stem(&self) -> &str {
        self.filename
            .strip_suffix(".cs")
            .unwrap_or(&self.filename)
    }

    /// Output file name for the interface map.
    pub fn map_name(&self) -> String {
        format!("{}.md", self.stem())
    }
}

pub fn is_unity_lifecycle(name: &str) -> bool {
    UNITY_LIFECYCLE.contains(&name)
}

/// Removes `//` and `/* */` comments.
pub fn strip_comments(src: &str) -> String {
    let without_lines = LINE_COMMENT.replace_all(src, "");
    BLOCK_COMMENT.replace_all(&without_lines, "").into_owned()
}

/// Text from the `{` at `start` through its matching `}`, or to the end when unbalanced.
fn brace_block(src: &str, start: usize) -> &str {
    let mut depth = 0usize;
    for (offset, byte) in src.as_bytes()[start..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return &src[start..start + offset + 1];
                }
            }
            _ => {}
        }
    }
    &src[start..]
}

/// Content between the outer braces of a block.
fn block_inner(block: &str) -> &str {
    let inner = block.strip_prefix('{').unwrap_or(block);
    inner.strip_suffix('}').unwrap_or(inner)
}

/// Splits on top-level commas, ignoring commas nested inside `open`/`close` pairs.
fn split_top_level(text: &str, open: &[char], close: &[char]) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for ch in text.chars() {
        if open.contains(&ch) {
            depth += 1;
        } else if close.contains(&ch) {
            depth -= 1;
        } else if ch == ',' && depth == 0 {
            let part = current.trim();
            if !part.is_empty() {
                parts.push(part.to_string());
            }
            current.clear();
            continue;
        }
        current.push(ch);
    }
    let part = current.trim();
    if !part.is_empty() {
        parts.push(part.to_string());
    }
    parts
}

fn enum_values(block: &str) -> Vec<String> {
    block_inner(block)
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.split('=').next().unwrap_or(v).trim().to_string())
        .collect()
}

/// Base types of a declaration, with generic arguments kept and `where` clauses dropped.
pub fn parse_bases(raw: &str) -> Vec<String> {
    let before_where = WHERE_CLAUSE.split(raw).next().unwrap_or(raw);
    split_top_level(before_where, &['<'], &['>'])
        .into_iter()
        .filter(|b| !b.starts_with("where"))
        .collect()
}

/// Parses a parameter list, dropping attributes and `ref`/`out`/`in`/`params`/`this`.
pub fn parse_parameters(params: &str) -> Vec<ParameterInfo> {
    split_top_level(params.trim(), &['<', '('], &['>', ')'])
        .into_iter()
        .filter_map(|raw| {
            let mut param = ATTRIBUTE.replace_all(&raw, "").trim().to_string();
            for modifier in ["ref ", "out ", "in ", "params ", "this "] {
                if let Some(rest) = param.strip_prefix(modifier) {
                    param = rest.trim_start().to_string();
                }
            }

            let (declaration, default_value) = match param.rsplit_once('=') {
                Some((decl, default)) => (decl.trim(), Some(default.trim().to_string())),
                None => (param.trim(), None),
            };

            match declaration.rsplit_once(char::is_whitespace) {
                Some((type_name, name)) => Some(ParameterInfo {
                    name: name.to_string(),
                    type_name: type_name.trim().to_string(),
                    default_value,
                }),
                None if !declaration.is_empty() => Some(ParameterInfo {
                    name: declaration.to_string(),
                    type_name: "?".to_string(),
                    default_value,
                }),
                None => None,
            }
        })
        .collect()
}

fn is_declaration_type(type_name: &str) -> bool {
    type_name
        .split_whitespace()
        .any(|word| NOT_A_TYPE.contains(&word))
}

fn parse_enum(src: &str, caps: &regex::Captures<'_>, end: usize) -> EnumInfo {
    let block = brace_block(src, end - 1);
    EnumInfo {
        name: caps["name"].to_string(),
        access: caps
            .name("access")
            .map_or("internal", |m| m.as_str())
            .to_string(),
        values: enum_values(block),
    }
}

fn parse_fields(inner: &str) -> Vec<FieldInfo> {
    FIELD
        .captures_iter(inner)
        .filter_map(|caps| {
            let access = &caps["access"];
            let is_serialized = caps
                .name("attrs")
                .is_some_and(|a| a.as_str().contains("[SerializeField]"));
            if access != "public" && !is_serialized {
                return None;
            }
            let type_name = caps["type"].trim().to_string();
            if is_declaration_type(&type_name) {
                return None;
            }
            Some(FieldInfo {
                name: caps["name"].to_string(),
                type_name,
                access: access.to_string(),
                is_static: caps.name("static").is_some(),
                is_readonly: caps.name("readonly").is_some(),
                is_serialized,
                default_value: caps.name("default").map(|d| d.as_str().trim().to_string()),
            })
        })
        .collect()
}

fn parse_properties(inner: &str, enums: &[EnumInfo]) -> Vec<PropertyInfo> {
    PROPERTY
        .captures_iter(inner)
        .filter_map(|caps| {
            if &caps["access"] != "public" {
                return None;
            }
            let name = caps["name"].to_string();
            let type_name = caps["type"].trim().to_string();
            if is_declaration_type(&type_name) || enums.iter().any(|e| e.name == name) {
                return None;
            }

            let whole = caps.get(0)?;
            let accessors = brace_block(inner, whole.end() - 1);
            Some(PropertyInfo {
                name,
                type_name,
                has_getter: GETTER.is_match(accessors) && !HIDDEN_GETTER.is_match(accessors),
                has_setter: SETTER.is_match(accessors) && !HIDDEN_SETTER.is_match(accessors),
                is_static: caps.name("static").is_some(),
            })
        })
        .collect()
}

fn parse_methods(inner: &str) -> Vec<MethodInfo> {
    METHOD
        .captures_iter(inner)
        .filter_map(|caps| {
            let access = caps["access"].to_string();
            let is_virtual = caps.name("virtual").is_some();
            let is_override = caps.name("override").is_some();
            let is_abstract = caps.name("abstract").is_some();

            let exposed = match access.as_str() {
                "public" => true,
                "protected" | "internal" => is_virtual || is_override || is_abstract,
                _ => false,
            };
            let return_type = caps["ret"].trim().to_string();
            if !exposed || is_declaration_type(&return_type) {
                return None;
            }

            Some(MethodInfo {
                name: caps["name"].to_string(),
                is_coroutine: return_type == "IEnumerator",
                return_type,
                access,
                parameters: parse_parameters(&caps["params"]),
                is_static: caps.name("static").is_some(),
                is_virtual,
                is_override,
                is_abstract,
                is_async: caps.name("async").is_some(),
            })
        })
        .collect()
}

fn parse_nested_enums(inner: &str) -> Vec<EnumInfo> {
    ENUM_DECL
        .captures_iter(inner)
        .filter_map(|caps| {
            let end = caps.get(0)?.end();
            let info = parse_enum(inner, &caps, end);
            matches!(info.access.as_str(), "public" | "internal").then_some(info)
        })
        .collect()
}

/// Parses C# source text. `filename` is recorded as-is.
pub fn parse_source(filename: &str, raw: &str) -> FileInfo {
    let src = strip_comments(raw.trim_start_matches('\u{feff}'));

    let usings = USING
        .captures_iter(&src)
        .map(|c| c[1].to_string())
        .collect();
    let namespace = NAMESPACE.captures(&src).map(|c| c[1].to_string());

    // Enums declared before the first type are top-level.
    let boundary = TYPE_DECL.find(&src).map_or(src.len(), |m| m.start());
    let top_level_enums = ENUM_DECL
        .captures_iter(&src)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            (whole.start() < boundary).then(|| parse_enum(&src, &caps, whole.end()))
        })
        .collect();

    let classes = TYPE_DECL
        .captures_iter(&src)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let inner = block_inner(brace_block(&src, whole.end() - 1));
            let kind = match &caps["kind"] {
                "struct" => TypeKind::Struct,
                "interface" => TypeKind::Interface,
                _ => TypeKind::Class,
            };
            let enums = parse_nested_enums(inner);
            Some(ClassInfo {
                name: caps["name"].to_string(),
                access: caps
                    .name("access")
                    .map_or("internal", |m| m.as_str())
                    .to_string(),
                kind,
                base_classes: caps
                    .name("bases")
                    .map(|b| parse_bases(b.as_str()))
                    .unwrap_or_default(),
                is_abstract: caps.name("abstract").is_some(),
                is_static: caps.name("static").is_some(),
                is_partial: caps.name("partial").is_some(),
                fields: parse_fields(inner),
                properties: parse_properties(inner, &enums),
                methods: parse_methods(inner),
                enums,
            })
        })
        .collect();

    FileInfo {
        filename: filename.to_string(),
        namespace,
        usings,
        classes,
        top_level_enums,
        dependencies: Vec::new(),
    }
}

/// Reads and parses one script. Invalid UTF-8 is replaced, not rejected.
pub fn parse_file(path: &Path) -> Result<FileInfo> {
    let bytes = fs::read(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(parse_source(&filename, &String::from_utf8_lossy(&bytes)))
}

/// Type names referenced by a declared type.
fn type_tokens(type_name: &str) -> impl Iterator<Item = &str> {
    type_name
        .split(|c: char| matches!(c, '[' | ']' | '<' | '>' | ',' | '?') || c.is_whitespace())
        .filter(|t| !t.is_empty())
}

/// Scanned scripts, by stem, that `file` refers to through bases, members or signatures.
pub fn project_dependencies(file: &FileInfo, stems: &BTreeSet<String>) -> Vec<String> {
    let own = file.stem();
    let mut deps = BTreeSet::new();
    let mut consider = |token: &str| {
        if token != own && stems.contains(token) {
            deps.insert(token.to_string());
        }
    };

    for class in &file.classes {
        for base in &class.base_classes {
            consider(GENERIC_ARGS.replace_all(base, "").trim());
        }
        let member_types = class
            .fields
            .iter()
            .map(|f| f.type_name.as_str())
            .chain(class.properties.iter().map(|p| p.type_name.as_str()))
            .chain(class.methods.iter().flat_map(|m| {
                std::iter::once(m.return_type.as_str())
                    .chain(m.parameters.iter().map(|p| p.type_name.as_str()))
            }));
        for type_name in member_types {
            type_tokens(type_name).for_each(&mut consider);
        }
    }

    deps.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER: &str = r#"
using UnityEngine;
using System.Collections;

namespace Game.Actors
{
    public enum Stance { Idle, Guard = 2, Parry }

    /* Handles input and combat. */
    public class PlayerController : MonoBehaviour, IDamageable
    {
        public enum Mode { Walk, Run }

        [SerializeField] private float speed = 5f;
        [Header("Combat")]
        public int maxHealth = 100;
        private int secret;
        public static readonly string Tag = "Player";

        public int Health { get; private set; }
        public Weapon Current { get { return weapon; } set { weapon = value; } }

        void Awake() { }
        public void Start() { }
        public void TakeDamage(int amount, DamageType type = DamageType.Blunt) { }
        public IEnumerator Flash(float seconds) { yield return null; }
        public static async Task<bool> SaveAsync(ref SaveSlot slot, params string[] tags) { return true; }
        protected virtual void OnParry(Enemy attacker) { }
        protected void Helper() { }
        private void Hidden() { }
        // public void Commented() { }
    }
}
"#;

    fn player() -> FileInfo {
        parse_source("PlayerController.cs", PLAYER)
    }

    #[test]
    fn test_strip_comments() {
        let src = "int a; // trailing\n/* block\n spans */int b;";
        assert_eq!(strip_comments(src), "int a; \nint b;");
    }

    #[test]
    fn test_usings_and_namespace() {
        let info = player();
        assert_eq!(info.usings, vec!["UnityEngine", "System.Collections"]);
        assert_eq!(info.namespace.as_deref(), Some("Game.Actors"));
    }

    #[test]
    fn test_top_level_enum() {
        let info = player();
        assert_eq!(info.top_level_enums.len(), 1);
        assert_eq!(info.top_level_enums[0].name, "Stance");
        assert_eq!(info.top_level_enums[0].values, vec!["Idle", "Guard", "Parry"]);
    }

    #[test]
    fn test_class_header_and_bases() {
        let info = player();
        assert_eq!(info.classes.len(), 1);
        let class = &info.classes[0];
        assert_eq!(class.name, "PlayerController");
        assert_eq!(class.access, "public");
        assert_eq!(class.kind, TypeKind::Class);
        assert_eq!(class.base_classes, vec!["MonoBehaviour", "IDamageable"]);
        assert!(class.is_unity_class());
        assert_eq!(class.enums.len(), 1);
        assert_eq!(class.enums[0].values, vec!["Walk", "Run"]);
    }

    #[test]
    fn test_fields() {
        let class = &player().classes[0];
        let names: Vec<_> = class.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["speed", "maxHealth", "Tag"]);

        let speed = &class.fields[0];
        assert!(speed.is_serialized);
        assert_eq!(speed.access, "private");
        assert_eq!(speed.default_value.as_deref(), Some("5f"));

        let tag = &class.fields[2];
        assert!(tag.is_static);
        assert!(tag.is_readonly);
        assert_eq!(tag.type_name, "string");
    }

    #[test]
    fn test_properties() {
        let class = &player().classes[0];
        assert_eq!(class.properties.len(), 2);
        let health = &class.properties[0];
        assert_eq!(health.name, "Health");
        assert!(health.has_getter);
        assert!(!health.has_setter);
        let current = &class.properties[1];
        assert_eq!(current.type_name, "Weapon");
        assert!(current.has_getter && current.has_setter);
    }

    #[test]
    fn test_methods() {
        let class = &player().classes[0];
        let names: Vec<_> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Start", "TakeDamage", "Flash", "SaveAsync", "OnParry"]
        );

        let flash = &class.methods[2];
        assert!(flash.is_coroutine);

        let save = &class.methods[3];
        assert!(save.is_static && save.is_async);
        assert_eq!(save.return_type, "Task<bool>");
        assert_eq!(save.parameters[0].type_name, "SaveSlot");
        assert_eq!(save.parameters[1].type_name, "string[]");

        let lifecycle: Vec<_> = class.lifecycle_methods().map(|m| m.name.as_str()).collect();
        assert_eq!(lifecycle, vec!["Start"]);
        let public: Vec<_> = class.public_methods().map(|m| m.name.as_str()).collect();
        assert_eq!(public, vec!["TakeDamage", "Flash", "SaveAsync"]);
        let overridable: Vec<_> = class.overridable_methods().map(|m| m.name.as_str()).collect();
        assert_eq!(overridable, vec!["OnParry"]);
    }

    #[test]
    fn test_parse_parameters() {
        let params = parse_parameters(
            "Dictionary<string, int> scores, [CanBeNull] out Enemy target, float scale = 1.5f, this Transform t",
        );
        assert_eq!(params.len(), 4);
        assert_eq!(params[0].type_name, "Dictionary<string, int>");
        assert_eq!(params[0].name, "scores");
        assert_eq!(params[1].type_name, "Enemy");
        assert_eq!(params[2].default_value.as_deref(), Some("1.5f"));
        assert_eq!(params[2].signature(), "float scale = 1.5f");
        assert_eq!(params[3].type_name, "Transform");
        assert!(parse_parameters("  ").is_empty());
    }

    #[test]
    fn test_parse_bases_with_generics_and_where() {
        assert_eq!(
            parse_bases("Singleton<GameManager, int>, IService where T : class"),
            vec!["Singleton<GameManager, int>", "IService"]
        );
    }

    #[test]
    fn test_struct_and_interface_kinds() {
        let info = parse_source(
            "Types.cs",
            "public struct Hit { public int damage; }\ninternal interface IPoolable { void Reset(); }",
        );
        assert_eq!(info.classes[0].kind, TypeKind::Struct);
        assert_eq!(info.classes[0].fields[0].name, "damage");
        assert_eq!(info.classes[1].kind, TypeKind::Interface);
        assert_eq!(info.classes[1].access, "internal");
    }

    #[test]
    fn test_project_dependencies() {
        let stems: BTreeSet<String> = ["PlayerController", "Weapon", "Enemy", "SaveSlot", "Unused"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let deps = project_dependencies(&player(), &stems);
        assert_eq!(deps, vec!["Enemy", "SaveSlot", "Weapon"]);
    }

    #[test]
    fn test_parse_file_handles_bom_and_invalid_utf8() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("Bomb.cs");
        let mut bytes = "\u{feff}public class Bomb { public int fuse; }".as_bytes().to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        fs::write(&path, bytes).unwrap();

        let info = parse_file(&path).unwrap();
        assert_eq!(info.filename, "Bomb.cs");
        assert_eq!(info.map_name(), "Bomb.md");
        assert_eq!(info.classes[0].name, "Bomb");
    }
}
