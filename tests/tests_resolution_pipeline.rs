mod helpers;

use gofactor::semantic::{ArrayLen, Phase, SymbolKind};
use gofactor::{LoadConfig, Program, ResolveError};
use helpers::write_tree;

fn load(files: &[(&str, &str)]) -> Program {
    let dir = write_tree(files);
    let config = LoadConfig::new(dir.path());
    Program::load(&config).expect("program resolves")
}

/// Look up a top-level symbol of a package by file name.
fn top_symbol(program: &Program, file: &str, name: &str) -> gofactor::SymbolId {
    let (pkg, _) = program.find_package_and_file(file).expect("file known");
    let top = program.table().package(pkg).top;
    program
        .table()
        .lookup(top, name, None)
        .unwrap_or_else(|| panic!("'{name}' not found in {file}"))
}

#[test]
fn forward_reference_within_one_package_resolves_after_fixing() {
    let program = load(&[(
        "data/order.go",
        "package data\n\nvar a = b\n\nvar b = 5\n",
    )]);

    let a = top_symbol(&program, "order.go", "a");
    let table = program.table();
    let SymbolKind::Variable { ty, .. } = table.kind(a) else {
        panic!("a should be a variable");
    };
    // healed to the integer basic type, never left Unresolved
    assert_eq!(*ty, table.basic("int").expect("universe installed"));
    assert!(program.diagnostics().is_empty());
}

#[test]
fn cross_package_references_resolve_through_imports() {
    let program = load(&[
        (
            "lib/lib.go",
            r#"package lib

type Thing struct {
	Count int
}

var Magic = 42

func NewThing() *Thing {
	return &Thing{}
}
"#,
        ),
        (
            "app/app.go",
            r#"package app

import "lib"

var Answer = lib.Magic

var Created = lib.NewThing()
"#,
        ),
    ]);

    let table = program.table();

    let answer = top_symbol(&program, "app.go", "Answer");
    let SymbolKind::Variable { ty, .. } = table.kind(answer) else {
        panic!("Answer should be a variable");
    };
    assert_eq!(*ty, table.basic("int").expect("universe installed"));

    let created = top_symbol(&program, "app.go", "Created");
    let SymbolKind::Variable { ty, .. } = table.kind(created) else {
        panic!("Created should be a variable");
    };
    assert_eq!(table.symbol(*ty).name, "*Thing");
    assert!(program.diagnostics().is_empty());
}

#[test]
fn every_fixing_phase_starts_after_every_globals_phase_completes() {
    let program = load(&[
        ("one/a.go", "package one\n\nvar X = 1\n"),
        ("two/b.go", "package two\n\nvar Y = 2\n"),
        ("three/c.go", "package three\n\nvar Z = 3\n"),
    ]);

    let trace = program.phase_trace();
    let globals_end = trace
        .iter()
        .filter(|e| e.phase == Phase::Globals)
        .map(|e| e.finished)
        .max()
        .expect("globals ran");
    let fixing_start = trace
        .iter()
        .filter(|e| e.phase == Phase::Fixing)
        .map(|e| e.started)
        .min()
        .expect("fixing ran");
    assert!(
        fixing_start >= globals_end,
        "a worker entered fixing before all workers finished globals"
    );
}

#[test]
fn methods_attach_to_their_receiver_base_type() {
    let program = load(&[(
        "geo/geo.go",
        r#"package geo

type Point struct {
	X int
	Y int
}

func (p *Point) Norm() int {
	return p.X
}

var Origin = Point{}

var N = Origin.Norm()
"#,
    )]);

    let table = program.table();
    let n = top_symbol(&program, "geo.go", "N");
    let SymbolKind::Variable { ty, .. } = table.kind(n) else {
        panic!("N should be a variable");
    };
    assert_eq!(*ty, table.basic("int").expect("universe installed"));

    let point = top_symbol(&program, "geo.go", "Point");
    let methods = table.symbol(point).methods.expect("Point has methods");
    assert!(table.scope(methods).get("Norm").is_some());
}

#[test]
fn ellipsis_array_lengths_settle_during_globals() {
    let program = load(&[(
        "data/arr.go",
        "package data\n\nvar Arr = [...]int{1, 2, 5: 9}\n",
    )]);

    let table = program.table();
    let arr = top_symbol(&program, "arr.go", "Arr");
    let SymbolKind::Variable { ty, .. } = table.kind(arr) else {
        panic!("Arr should be a variable");
    };
    let SymbolKind::Array { len, .. } = table.kind(*ty) else {
        panic!("Arr should have an array type");
    };
    assert_eq!(*len, ArrayLen::Fixed(10));
}

#[test]
fn auto_incrementing_const_groups_inherit_the_group_type() {
    let program = load(&[(
        "colors/colors.go",
        r#"package colors

type Color int

const (
	Red Color = iota
	Green
	Blue
)
"#,
    )]);

    let table = program.table();
    let color = top_symbol(&program, "colors.go", "Color");
    for name in ["Red", "Green", "Blue"] {
        let sym = top_symbol(&program, "colors.go", name);
        let SymbolKind::Variable { ty, .. } = table.kind(sym) else {
            panic!("{name} should be a constant variable");
        };
        assert_eq!(*ty, color, "{name} should carry the group type");
    }
}

#[test]
fn dangling_references_become_diagnostics_not_crashes() {
    let program = load(&[(
        "broken/broken.go",
        "package broken\n\nvar x = missingName\n",
    )]);

    let diags = program.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].name, "missingName");
    assert_eq!(diags[0].file, "broken.go");
    assert_eq!(diags[0].pos.line, 3);
}

#[test]
fn a_failing_worker_aborts_the_run_without_deadlocking() {
    let dir = write_tree(&[(
        "dup/dup.go",
        "package dup\n\nvar x = 1\n\nvar x = 2\n",
    )]);
    let config = LoadConfig::new(dir.path());
    // the duplicate surfaces after the phase join; the coordinator returns
    let err = Program::load(&config).expect_err("duplicate must fail the run");
    assert!(matches!(err, ResolveError::DuplicateSymbol { .. }));
}

#[test]
fn parse_errors_are_fatal_for_the_run() {
    let dir = write_tree(&[("bad/bad.go", "package bad\n\nfunc (((\n")]);
    let config = LoadConfig::new(dir.path());
    let err = Program::load(&config).expect_err("parse error must fail the run");
    assert!(matches!(err, ResolveError::Parse { .. }));
}

#[test]
fn missing_sidecar_config_is_a_configuration_error() {
    let dir = write_tree(&[("pkg/pkg.go", "package pkg\n\nvar X = 1\n")]);
    let mut config = LoadConfig::new(dir.path());
    config.special_packages.push("pkg".to_owned());
    let err = Program::load(&config).expect_err("missing sidecar must fail");
    assert!(matches!(err, ResolveError::Config { .. }));
}

#[test]
fn sidecar_config_restricts_a_package_to_listed_files() {
    let dir = write_tree(&[
        ("huge/a.go", "package huge\n\nvar InA = 1\n"),
        ("huge/b.go", "package huge\n\nvar OnlyInB = 2\n"),
        ("huge.cfg", "a.go\n"),
    ]);
    let mut config = LoadConfig::new(dir.path());
    config.special_packages.push("huge".to_owned());
    let program = Program::load(&config).expect("restricted package resolves");

    let (pkg, _) = program.find_package_and_file("a.go").expect("a.go known");
    let top = program.table().package(pkg).top;
    assert!(program.table().lookup(top, "InA", None).is_some());
    assert!(program.table().lookup(top, "OnlyInB", None).is_none());
    assert!(program.find_package_and_file("b.go").is_err());
}

#[test]
fn imports_resolve_from_library_roots_and_mark_packages_external() {
    let lib = write_tree(&[(
        "fmt/fmt.go",
        "package fmt\n\nfunc Println(v string) int {\n\treturn 0\n}\n",
    )]);
    let dir = write_tree(&[(
        "app/app.go",
        "package app\n\nimport \"fmt\"\n\nvar R = fmt.Println(\"hi\")\n",
    )]);

    let mut config = LoadConfig::new(dir.path());
    config.library_roots.push(lib.path().to_owned());
    let program = Program::load(&config).expect("library import resolves");

    let table = program.table();
    let (fmt_pkg, _) = program.find_package_and_file("fmt.go").expect("fmt loaded");
    assert!(table.package(fmt_pkg).is_external);

    let r = top_symbol(&program, "app.go", "R");
    let SymbolKind::Variable { ty, .. } = table.kind(r) else {
        panic!("R should be a variable");
    };
    assert_eq!(*ty, table.basic("int").expect("universe installed"));
    assert!(program.diagnostics().is_empty());
}

#[test]
fn imports_are_visible_only_in_their_declaring_file() {
    let program = load(&[
        ("lib/lib.go", "package lib\n\nvar Magic = 42\n"),
        (
            "app/uses.go",
            "package app\n\nimport \"lib\"\n\nvar A = lib.Magic\n",
        ),
        ("app/other.go", "package app\n\nvar B = 1\n"),
    ]);

    let (pkg, _) = program.find_package_and_file("uses.go").expect("known");
    let table = program.table();
    let top = table.package(pkg).top;
    assert!(table.lookup(top, "lib", Some("uses.go")).is_some());
    assert!(table.lookup(top, "lib", Some("other.go")).is_none());
}
