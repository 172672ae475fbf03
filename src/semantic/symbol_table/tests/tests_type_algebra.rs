#![allow(clippy::unwrap_used)]
use smol_str::SmolStr;

use crate::semantic::symbol_table::{
    ArrayLen, ChanDir, ScopeId, Symbol, SymbolId, SymbolKind, SymbolTable,
};

fn field(table: &mut SymbolTable, scope: ScopeId, name: &str, ty: SymbolId) {
    let v = table.alloc(Symbol::new(
        name,
        SymbolKind::Variable {
            ty,
            is_type_switch: false,
        },
    ));
    table.add_symbol(scope, v).unwrap();
}

/// An anonymous struct with the given ordered (name, type) fields.
fn anon_struct(table: &mut SymbolTable, fields: &[(&str, SymbolId)]) -> SymbolId {
    let scope = table.new_scope(None);
    for (name, ty) in fields {
        field(table, scope, name, *ty);
    }
    table.alloc(Symbol::new("", SymbolKind::Struct { fields: scope }))
}

#[test]
fn base_type_of_a_base_type_is_itself() {
    let table = SymbolTable::new();
    let int = table.basic("int").unwrap();
    assert_eq!(table.base_type(int).unwrap(), int);
}

#[test]
fn base_type_unwraps_alias_and_pointer_chains() {
    let mut table = SymbolTable::new();
    let pkg = table.add_package("src/demo".into(), SmolStr::new("demo"));
    let int = table.basic("int").unwrap();
    let alias = table.alloc(Symbol::new("MyInt", SymbolKind::Alias { base: int }));
    let ptr = table.intern_pointer(pkg, alias);
    let deep = table.intern_pointer(pkg, ptr);

    assert_eq!(table.base_type(alias).unwrap(), int);
    assert_eq!(table.base_type(ptr).unwrap(), int);
    assert_eq!(table.base_type(deep).unwrap(), int);
}

#[test]
fn alias_cycle_is_detected_not_recursed() {
    let mut table = SymbolTable::new();
    let int = table.basic("int").unwrap();
    let a = table.alloc(Symbol::new("A", SymbolKind::Alias { base: int }));
    let b = table.alloc(Symbol::new("B", SymbolKind::Alias { base: a }));
    // close the loop: A -> B -> A
    if let SymbolKind::Alias { base } = &mut table.symbol_mut(a).kind {
        *base = b;
    }

    let err = table.base_type(a).unwrap_err();
    assert_eq!(err.name, "A");
}

#[test]
fn anonymous_nodes_are_excluded_from_cycle_tracking() {
    // a deep chain of unnamed aliases over the same base must not trip the
    // name-keyed visited set
    let mut table = SymbolTable::new();
    let int = table.basic("int").unwrap();
    let mut chain = int;
    for _ in 0..8 {
        chain = table.alloc(Symbol::new("", SymbolKind::Alias { base: chain }));
    }
    assert_eq!(table.base_type(chain).unwrap(), int);
}

#[test]
fn struct_pointer_to_itself_is_not_a_cycle() {
    let mut table = SymbolTable::new();
    let pkg = table.add_package("src/demo".into(), SmolStr::new("demo"));
    let fields = table.new_scope(Some(pkg));
    let node = table.alloc(Symbol::new("Node", SymbolKind::Struct { fields }));
    let ptr = table.intern_pointer(pkg, node);
    field(&mut table, fields, "next", ptr);

    assert_eq!(table.base_type(ptr).unwrap(), node);
}

#[test]
fn pointer_interning_is_identity_stable() {
    let mut table = SymbolTable::new();
    let pkg = table.add_package("src/demo".into(), SmolStr::new("demo"));
    let named = table.alloc(Symbol::new("T", SymbolKind::Interface));

    let p1 = table.intern_pointer(pkg, named);
    let p2 = table.intern_pointer(pkg, named);
    assert_eq!(p1, p2);

    let pp1 = table.intern_pointer(pkg, p1);
    let pp2 = table.intern_pointer(pkg, p2);
    assert_eq!(pp1, pp2);
    assert_ne!(p1, pp1);

    assert_eq!(table.pointer_depth(p1), 1);
    assert_eq!(table.pointer_depth(pp1), 2);
    assert_eq!(table.symbol(pp1).name, "**T");
    assert_eq!(table.pointer_root_name(pp1), "T");
}

#[test]
fn equals_is_reflexive_and_symmetric_for_anonymous_structs() {
    let mut table = SymbolTable::new();
    let int = table.basic("int").unwrap();
    let s = table.basic("string").unwrap();

    let a = anon_struct(&mut table, &[("x", int), ("y", s)]);
    let b = anon_struct(&mut table, &[("x", int), ("y", s)]);

    assert!(table.equals(a, a));
    assert!(table.equals(a, b));
    assert!(table.equals(b, a));
}

#[test]
fn reordering_struct_fields_breaks_equality() {
    let mut table = SymbolTable::new();
    let int = table.basic("int").unwrap();
    let s = table.basic("string").unwrap();

    let a = anon_struct(&mut table, &[("x", int), ("y", s)]);
    let b = anon_struct(&mut table, &[("y", s), ("x", int)]);
    assert!(!table.equals(a, b));
}

#[test]
fn named_types_compare_by_identity_only() {
    let mut table = SymbolTable::new();
    let int = table.basic("int").unwrap();
    let a = table.alloc(Symbol::new("A", SymbolKind::Alias { base: int }));
    let b = table.alloc(Symbol::new("A", SymbolKind::Alias { base: int }));

    assert!(table.equals(a, a));
    assert!(!table.equals(a, b));
}

#[test]
fn structural_equality_of_maps_and_channels() {
    let mut table = SymbolTable::new();
    let int = table.basic("int").unwrap();
    let s = table.basic("string").unwrap();

    let m1 = table.alloc(Symbol::new("", SymbolKind::Map { key: s, value: int }));
    let m2 = table.alloc(Symbol::new("", SymbolKind::Map { key: s, value: int }));
    let m3 = table.alloc(Symbol::new("", SymbolKind::Map { key: int, value: int }));
    assert!(table.equals(m1, m2));
    assert!(!table.equals(m1, m3));

    let c1 = table.alloc(Symbol::new(
        "",
        SymbolKind::Chan {
            value: int,
            dir: ChanDir::Both,
        },
    ));
    let c2 = table.alloc(Symbol::new(
        "",
        SymbolKind::Chan {
            value: int,
            dir: ChanDir::Recv,
        },
    ));
    assert!(!table.equals(c1, c2));
}

#[test]
fn slice_and_fixed_array_are_not_equal() {
    let mut table = SymbolTable::new();
    let int = table.basic("int").unwrap();
    let slice = table.alloc(Symbol::new(
        "",
        SymbolKind::Array {
            elem: int,
            len: ArrayLen::Slice,
        },
    ));
    let fixed = table.alloc(Symbol::new(
        "",
        SymbolKind::Array {
            elem: int,
            len: ArrayLen::Fixed(4),
        },
    ));
    let slice2 = table.alloc(Symbol::new(
        "",
        SymbolKind::Array {
            elem: int,
            len: ArrayLen::Slice,
        },
    ));
    assert!(!table.equals(slice, fixed));
    assert!(table.equals(slice, slice2));
}
