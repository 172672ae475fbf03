//! The predeclared scope: basic types, built-in pseudo-functions, and the
//! `true`/`false`/`nil`/`iota` constants ambient to every package scope.
//!
//! Installed into each run's own [`SymbolTable`], never shared between runs,
//! so resolution is reentrant and tests can run in parallel.

use smol_str::SmolStr;

use super::symbol_table::{ArrayLen, ChanDir, ScopeId, Symbol, SymbolId, SymbolKind, SymbolTable};

/// Predeclared basic type names.
pub const BASIC_TYPES: &[&str] = &[
    "bool",
    "byte",
    "rune",
    "string",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
    "float32",
    "float64",
    "complex64",
    "complex128",
];

/// Built-in pseudo-functions. `make`, `new`, `complex`, `real`, `imag` and
/// `append` carry empty signatures here; the expression engine computes
/// their results per call site.
pub const BUILTIN_FUNCTIONS: &[&str] = &[
    "append", "cap", "close", "complex", "copy", "delete", "imag", "len", "make", "new", "panic",
    "print", "println", "real", "recover",
];

const INTEGER_TYPES: &[&str] = &[
    "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16", "uint32", "uint64",
    "uintptr", "byte", "rune",
];
const FLOAT_TYPES: &[&str] = &["float32", "float64"];
const COMPLEX_TYPES: &[&str] = &["complex64", "complex128"];

pub fn is_integer_type(name: &str) -> bool {
    INTEGER_TYPES.contains(&name)
}

pub fn is_float_type(name: &str) -> bool {
    FLOAT_TYPES.contains(&name)
}

pub fn is_complex_type(name: &str) -> bool {
    COMPLEX_TYPES.contains(&name)
}

/// Populate the universe scope of a fresh table.
pub(crate) fn install(table: &mut SymbolTable) {
    let universe = table.universe();

    for &name in BASIC_TYPES {
        let id = table.alloc(Symbol::new(name, SymbolKind::Basic));
        table
            .add_symbol(universe, id)
            .expect("fresh universe scope cannot hold duplicates");
        table.register_basic(SmolStr::new(name), id);
    }

    let bool_ty = table.basic("bool").expect("bool is predeclared");
    let int_ty = table.basic("int").expect("int is predeclared");
    let empty_iface = table.alloc(Symbol::new("", SymbolKind::Interface));

    install_const(table, universe, "true", bool_ty);
    install_const(table, universe, "false", bool_ty);
    install_const(table, universe, "nil", empty_iface);
    install_const(table, universe, "iota", int_ty);

    for &name in BUILTIN_FUNCTIONS {
        let ty = builtin_signature(table, name, int_ty, empty_iface);
        let locals = table.new_scope(None);
        let func = table.alloc(Symbol::new(
            name,
            SymbolKind::Func {
                ty,
                locals,
                is_interface_method: false,
            },
        ));
        table
            .add_symbol(universe, func)
            .expect("fresh universe scope cannot hold duplicates");
    }
}

fn install_const(table: &mut SymbolTable, universe: ScopeId, name: &str, ty: SymbolId) {
    let id = table.alloc(Symbol::new(
        name,
        SymbolKind::Variable {
            ty,
            is_type_switch: false,
        },
    ));
    table
        .add_symbol(universe, id)
        .expect("fresh universe scope cannot hold duplicates");
}

/// Declared signature of a builtin. Only the result list matters to the
/// engine; parameters are illustrative.
fn builtin_signature(
    table: &mut SymbolTable,
    name: &str,
    int_ty: SymbolId,
    empty_iface: SymbolId,
) -> SymbolId {
    let params = table.new_scope(None);
    let results = table.new_scope(None);

    let param = |table: &mut SymbolTable, name: &str, ty: SymbolId| {
        let v = table.alloc(Symbol::new(
            name,
            SymbolKind::Variable {
                ty,
                is_type_switch: false,
            },
        ));
        let _ = table.add_symbol(params, v);
    };
    let result = |table: &mut SymbolTable, ty: SymbolId| {
        let v = table.alloc(Symbol::new(
            "_",
            SymbolKind::Variable {
                ty,
                is_type_switch: false,
            },
        ));
        let _ = table.add_symbol(results, v);
    };

    match name {
        "len" | "cap" => {
            param(table, "v", empty_iface);
            result(table, int_ty);
        }
        "copy" => {
            let slice = table.alloc(Symbol::new(
                "",
                SymbolKind::Array {
                    elem: empty_iface,
                    len: ArrayLen::Slice,
                },
            ));
            param(table, "dst", slice);
            param(table, "src", slice);
            result(table, int_ty);
        }
        "close" => {
            let chan = table.alloc(Symbol::new(
                "",
                SymbolKind::Chan {
                    value: empty_iface,
                    dir: ChanDir::Both,
                },
            ));
            param(table, "c", chan);
        }
        "panic" => {
            param(table, "v", empty_iface);
        }
        "recover" => {
            result(table, empty_iface);
        }
        "delete" => {
            let map = table.alloc(Symbol::new(
                "",
                SymbolKind::Map {
                    key: empty_iface,
                    value: empty_iface,
                },
            ));
            param(table, "m", map);
            param(table, "k", empty_iface);
        }
        // print, println, and the engine-special-cased builtins declare no
        // results here
        _ => {}
    }

    table.alloc(Symbol::new(
        "",
        SymbolKind::Function {
            params,
            results,
            receiver: None,
        },
    ))
}
