#![allow(clippy::unwrap_used)]
use parking_lot::RwLock;
use rstest::rstest;
use smol_str::SmolStr;

use crate::parser::parse_expression;
use crate::semantic::symbol_table::{
    ArrayLen, ChanDir, PackageId, ScopeId, Symbol, SymbolId, SymbolKind, SymbolTable,
};
use crate::syntax::NodeIdGen;

use super::{ExprEngine, TypedExpr};

struct Fixture {
    table: RwLock<SymbolTable>,
    pkg: PackageId,
    top: ScopeId,
    ids: NodeIdGen,
}

impl Fixture {
    fn new() -> Self {
        let mut table = SymbolTable::new();
        let pkg = table.add_package("src/demo".into(), SmolStr::new("demo"));
        let top = table.package(pkg).top;
        let universe = table.universe();
        table.open_scope(top, universe);
        Self {
            table: RwLock::new(table),
            pkg,
            top,
            ids: NodeIdGen::new(),
        }
    }

    fn add_var(&self, name: &str, ty: SymbolId) -> SymbolId {
        let mut t = self.table.write();
        let v = t.alloc(Symbol::new(
            name,
            SymbolKind::Variable {
                ty,
                is_type_switch: false,
            },
        ));
        t.add_symbol(self.top, v).unwrap();
        v
    }

    fn add_type(&self, name: &str, kind: SymbolKind) -> SymbolId {
        let mut t = self.table.write();
        let id = t.alloc(Symbol::new(name, kind).with_package(Some(self.pkg)));
        t.add_symbol(self.top, id).unwrap();
        id
    }

    fn basic(&self, name: &str) -> SymbolId {
        self.table.read().basic(name).unwrap()
    }

    fn type_of(&mut self, src: &str) -> TypedExpr {
        let expr = parse_expression(src, &mut self.ids).unwrap();
        let mut engine = ExprEngine::new(&self.table, self.pkg, SmolStr::new("test.go"), self.top);
        engine.type_of(&expr).unwrap()
    }

    fn name_of(&self, id: SymbolId) -> SmolStr {
        self.table.read().symbol(id).name.clone()
    }
}

#[rstest]
#[case("1", "int")]
#[case("0x1F", "int")]
#[case("1.5", "float64")]
#[case("'a'", "byte")]
#[case("\"hi\"", "string")]
#[case("3i", "complex128")]
fn literals_map_to_predeclared_basics(#[case] src: &str, #[case] expected: &str) {
    let mut fx = Fixture::new();
    let typed = fx.type_of(src);
    assert_eq!(typed.first().unwrap(), fx.basic(expected));
}

#[test]
fn untyped_literal_unifies_to_the_named_operand_type() {
    let mut fx = Fixture::new();
    let float32 = fx.basic("float32");
    let my_float = fx.add_type("MyFloat", SymbolKind::Alias { base: float32 });
    fx.add_var("f", my_float);

    // the named type wins over the literal's default on either side
    assert_eq!(fx.type_of("f + 1").first().unwrap(), my_float);
    assert_eq!(fx.type_of("1 + f").first().unwrap(), my_float);
    assert_eq!(fx.type_of("1 + 2").first().unwrap(), fx.basic("int"));
}

#[test]
fn both_named_operands_prefer_the_left() {
    let mut fx = Fixture::new();
    let int = fx.basic("int");
    let a = fx.add_type("A", SymbolKind::Alias { base: int });
    let b = fx.add_type("B", SymbolKind::Alias { base: int });
    fx.add_var("x", a);
    fx.add_var("y", b);
    assert_eq!(fx.type_of("x + y").first().unwrap(), a);
    let _ = b;
}

#[test]
fn comparisons_yield_bool() {
    let mut fx = Fixture::new();
    let int = fx.basic("int");
    fx.add_var("a", int);
    fx.add_var("b", int);
    assert_eq!(fx.type_of("a == b").first().unwrap(), fx.basic("bool"));
    assert_eq!(fx.type_of("a < 3").first().unwrap(), fx.basic("bool"));
}

#[test]
fn address_of_interns_one_pointer_level() {
    let mut fx = Fixture::new();
    let int = fx.basic("int");
    let named = fx.add_type("T", SymbolKind::Alias { base: int });
    fx.add_var("x", named);

    let p1 = fx.type_of("&x").first().unwrap();
    let p2 = fx.type_of("&x").first().unwrap();
    assert_eq!(p1, p2);
    assert_eq!(fx.name_of(p1), "*T");
}

#[test]
fn channel_receive_yields_value_then_bool() {
    let mut fx = Fixture::new();
    let int = fx.basic("int");
    let chan = {
        let mut t = fx.table.write();
        t.alloc(Symbol::new(
            "",
            SymbolKind::Chan {
                value: int,
                dir: ChanDir::Both,
            },
        ))
    };
    fx.add_var("ch", chan);

    let typed = fx.type_of("<-ch");
    assert_eq!(typed.types, vec![int, fx.basic("bool")]);
}

#[test]
fn deref_through_pointer_and_alias() {
    let mut fx = Fixture::new();
    let int = fx.basic("int");
    let named = fx.add_type("T", SymbolKind::Alias { base: int });
    let ptr = {
        let mut t = fx.table.write();
        t.intern_pointer(fx.pkg, named)
    };
    fx.add_var("p", ptr);

    assert_eq!(fx.type_of("*p").first().unwrap(), named);
}

#[test]
fn map_index_yields_exactly_value_then_bool() {
    let mut fx = Fixture::new();
    let int = fx.basic("int");
    let string = fx.basic("string");
    let map = {
        let mut t = fx.table.write();
        t.alloc(Symbol::new(
            "",
            SymbolKind::Map {
                key: string,
                value: int,
            },
        ))
    };
    fx.add_var("m", map);

    let typed = fx.type_of("m[\"k\"]");
    assert_eq!(typed.types, vec![int, fx.basic("bool")]);
}

#[test]
fn array_index_yields_the_element_type() {
    let mut fx = Fixture::new();
    let int = fx.basic("int");
    let slice = {
        let mut t = fx.table.write();
        t.alloc(Symbol::new(
            "",
            SymbolKind::Array {
                elem: int,
                len: ArrayLen::Slice,
            },
        ))
    };
    fx.add_var("xs", slice);
    assert_eq!(fx.type_of("xs[0]").first().unwrap(), int);
}

#[test]
fn string_index_yields_byte() {
    let mut fx = Fixture::new();
    fx.add_var("s", fx.basic("string"));
    assert_eq!(fx.type_of("s[1]").first().unwrap(), fx.basic("byte"));
}

#[test]
fn ellipsis_array_length_counts_the_maximum_surfaced_index() {
    let mut fx = Fixture::new();
    let typed = fx.type_of("[...]int{1, 2, 5: 9}");
    let arr = typed.first().unwrap();
    let t = fx.table.read();
    match t.kind(arr) {
        SymbolKind::Array { len, .. } => assert_eq!(*len, ArrayLen::Fixed(10)),
        other => panic!("expected array type, got {other:?}"),
    }
}

#[test]
fn empty_ellipsis_literal_has_length_zero() {
    let mut fx = Fixture::new();
    let typed = fx.type_of("[...]int{}");
    let arr = typed.first().unwrap();
    let t = fx.table.read();
    match t.kind(arr) {
        SymbolKind::Array { len, .. } => assert_eq!(*len, ArrayLen::Fixed(0)),
        other => panic!("expected array type, got {other:?}"),
    }
}

#[test]
fn keyed_struct_literal_resolves_keys_in_the_field_scope() {
    let mut fx = Fixture::new();
    let int = fx.basic("int");
    let fields = {
        let mut t = fx.table.write();
        let fields = t.new_scope(Some(fx.pkg));
        let f = t.alloc(Symbol::new(
            "count",
            SymbolKind::Variable {
                ty: int,
                is_type_switch: false,
            },
        ));
        t.add_symbol(fields, f).unwrap();
        fields
    };
    let s = fx.add_type("S", SymbolKind::Struct { fields });

    let typed = fx.type_of("S{count: 3}");
    assert_eq!(typed.first().unwrap(), s);

    // the key bound to the field, not to a package-level name
    let t = fx.table.read();
    let field = t.lookup(fields, "count", None).unwrap();
    assert!(!t.symbol(field).idents.is_empty());
}

#[test]
fn new_yields_an_interned_pointer_one_level_deeper() {
    let mut fx = Fixture::new();
    let int = fx.basic("int");
    fx.add_type("T", SymbolKind::Alias { base: int });

    let p = fx.type_of("new(T)").first().unwrap();
    assert_eq!(fx.name_of(p), "*T");

    // new(*T) goes one deeper through the existing chain
    let pp = fx.type_of("new(*T)").first().unwrap();
    assert_eq!(fx.name_of(pp), "**T");
    let t = fx.table.read();
    assert_eq!(t.pointer_depth(pp), 2);
}

#[test]
fn make_yields_the_named_argument_type() {
    let mut fx = Fixture::new();
    let typed = fx.type_of("make(map[string]int)");
    let t = fx.table.read();
    assert!(matches!(t.kind(typed.first().unwrap()), SymbolKind::Map { .. }));
}

#[rstest]
#[case("real(complex64)", "float32")]
#[case("real(complex128)", "float64")]
#[case("imag(complex128)", "float64")]
#[case("complex(float32, float32)", "complex64")]
#[case("complex(float64, float32)", "complex128")]
fn complex_builtins_follow_the_numeric_kind_table(#[case] src: &str, #[case] expected: &str) {
    let mut fx = Fixture::new();
    let typed = fx.type_of(src);
    assert_eq!(typed.first().unwrap(), fx.basic(expected));
}

#[test]
fn append_yields_the_first_argument_type() {
    let mut fx = Fixture::new();
    let int = fx.basic("int");
    let slice = {
        let mut t = fx.table.write();
        t.alloc(Symbol::new(
            "",
            SymbolKind::Array {
                elem: int,
                len: ArrayLen::Slice,
            },
        ))
    };
    fx.add_var("xs", slice);
    assert_eq!(fx.type_of("append(xs, 1)").first().unwrap(), slice);
}

#[test]
fn len_resolves_through_its_declared_universe_signature() {
    let mut fx = Fixture::new();
    fx.add_var("s", fx.basic("string"));
    assert_eq!(fx.type_of("len(s)").first().unwrap(), fx.basic("int"));
}

#[test]
fn ordinary_calls_yield_the_declared_result_list() {
    let mut fx = Fixture::new();
    let int = fx.basic("int");
    let string = fx.basic("string");
    let func = {
        let mut t = fx.table.write();
        let params = t.new_scope(Some(fx.pkg));
        let results = t.new_scope(Some(fx.pkg));
        for (name, ty) in [("a", int), ("b", string)] {
            let v = t.alloc(Symbol::new(
                name,
                SymbolKind::Variable {
                    ty,
                    is_type_switch: false,
                },
            ));
            t.add_symbol(results, v).unwrap();
        }
        let ty = t.alloc(Symbol::new(
            "",
            SymbolKind::Function {
                params,
                results,
                receiver: None,
            },
        ));
        let locals = t.new_scope(Some(fx.pkg));
        let f = t.alloc(Symbol::new(
            "f",
            SymbolKind::Func {
                ty,
                locals,
                is_interface_method: false,
            },
        ));
        t.add_symbol(fx.top, f).unwrap();
        f
    };
    let _ = func;

    let typed = fx.type_of("f()");
    assert_eq!(typed.types, vec![int, string]);
}

#[test]
fn conversion_syntax_propagates_the_callee_type() {
    let mut fx = Fixture::new();
    let int = fx.basic("int");
    let named = fx.add_type("Celsius", SymbolKind::Alias { base: int });
    assert_eq!(fx.type_of("Celsius(3)").first().unwrap(), named);
}

#[test]
fn selector_finds_struct_fields_through_pointers() {
    let mut fx = Fixture::new();
    let int = fx.basic("int");
    let fields = {
        let mut t = fx.table.write();
        let fields = t.new_scope(Some(fx.pkg));
        let f = t.alloc(Symbol::new(
            "x",
            SymbolKind::Variable {
                ty: int,
                is_type_switch: false,
            },
        ));
        t.add_symbol(fields, f).unwrap();
        fields
    };
    let s = fx.add_type("S", SymbolKind::Struct { fields });
    let ptr = {
        let mut t = fx.table.write();
        t.intern_pointer(fx.pkg, s)
    };
    fx.add_var("v", s);
    fx.add_var("p", ptr);

    assert_eq!(fx.type_of("v.x").first().unwrap(), int);
    assert_eq!(fx.type_of("p.x").first().unwrap(), int);
}

#[test]
fn method_use_versus_method_expression() {
    let mut fx = Fixture::new();
    let int = fx.basic("int");
    let string = fx.basic("string");
    let named = fx.add_type("T", SymbolKind::Alias { base: int });

    {
        let mut t = fx.table.write();
        let receiver = t.new_scope(Some(fx.pkg));
        let recv = t.alloc(Symbol::new(
            "r",
            SymbolKind::Variable {
                ty: named,
                is_type_switch: false,
            },
        ));
        t.add_symbol(receiver, recv).unwrap();

        let params = t.new_scope(Some(fx.pkg));
        let p = t.alloc(Symbol::new(
            "n",
            SymbolKind::Variable {
                ty: int,
                is_type_switch: false,
            },
        ));
        t.add_symbol(params, p).unwrap();

        let results = t.new_scope(Some(fx.pkg));
        let r = t.alloc(Symbol::new(
            "_",
            SymbolKind::Variable {
                ty: string,
                is_type_switch: false,
            },
        ));
        t.add_symbol(results, r).unwrap();

        let ty = t.alloc(Symbol::new(
            "",
            SymbolKind::Function {
                params,
                results,
                receiver: Some(receiver),
            },
        ));
        let locals = t.new_scope(Some(fx.pkg));
        let m = t.alloc(Symbol::new(
            "M",
            SymbolKind::Func {
                ty,
                locals,
                is_interface_method: false,
            },
        ));
        t.add_method(named, m).unwrap();
    }
    fx.add_var("t", named);

    // value use: the declared signature, one parameter
    let value_use = fx.type_of("t.M").first().unwrap();
    {
        let t = fx.table.read();
        match t.kind(value_use) {
            SymbolKind::Function { params, receiver, .. } => {
                assert_eq!(t.scope(*params).len(), 1);
                assert!(receiver.is_some());
            }
            other => panic!("expected function type, got {other:?}"),
        }
    }

    // method expression: receiver flattened into the parameter list
    let expr_use = fx.type_of("T.M").first().unwrap();
    let t = fx.table.read();
    match t.kind(expr_use) {
        SymbolKind::Function { params, receiver, .. } => {
            assert_eq!(t.scope(*params).len(), 2);
            assert!(receiver.is_none());
        }
        other => panic!("expected function type, got {other:?}"),
    }
}

#[test]
fn slicing_an_array_copies_to_a_slice() {
    let mut fx = Fixture::new();
    let int = fx.basic("int");
    let arr = {
        let mut t = fx.table.write();
        t.alloc(Symbol::new(
            "",
            SymbolKind::Array {
                elem: int,
                len: ArrayLen::Fixed(4),
            },
        ))
    };
    fx.add_var("a", arr);

    let sliced = fx.type_of("a[1:3]").first().unwrap();
    assert_ne!(sliced, arr);
    let t = fx.table.read();
    assert!(matches!(
        t.kind(sliced),
        SymbolKind::Array {
            len: ArrayLen::Slice,
            ..
        }
    ));
    // the original stays fixed-length
    assert!(matches!(
        t.kind(arr),
        SymbolKind::Array {
            len: ArrayLen::Fixed(4),
            ..
        }
    ));
}

#[test]
fn slicing_a_slice_passes_the_type_through() {
    let mut fx = Fixture::new();
    let int = fx.basic("int");
    let slice = {
        let mut t = fx.table.write();
        t.alloc(Symbol::new(
            "",
            SymbolKind::Array {
                elem: int,
                len: ArrayLen::Slice,
            },
        ))
    };
    fx.add_var("xs", slice);
    assert_eq!(fx.type_of("xs[1:]").first().unwrap(), slice);
}

#[test]
fn type_assertion_yields_asserted_type_then_bool() {
    let mut fx = Fixture::new();
    let int = fx.basic("int");
    let named = fx.add_type("T", SymbolKind::Alias { base: int });
    fx.add_var("v", named);

    let typed = fx.type_of("v.(T)");
    assert_eq!(typed.types, vec![named, fx.basic("bool")]);
}

#[test]
fn unknown_identifier_becomes_a_placeholder_never_a_default() {
    let mut fx = Fixture::new();
    let typed = fx.type_of("mystery");
    let id = typed.first().unwrap();
    let t = fx.table.read();
    assert!(matches!(t.kind(id), SymbolKind::Unresolved { .. }));
    assert_eq!(t.package(fx.pkg).unresolved, vec![id]);
    assert_eq!(t.symbol(id).name, "mystery");
}
