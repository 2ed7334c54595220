//! Integration tests for the handoff pipeline.
//!
//! Tests validate:
//! - Loading a binary fixture (built with `wasm-encoder`) into `wasmi`,
//!   linking host imports and calling exports
//! - Each failure surfaces at the right [`Stage`]
//! - The toolchain writes the text file and invokes the compiler once
//! - A full generator → wat2wasm → wasmi run, when wat2wasm is installed

use std::path::Path;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use wasm_encoder::{
    CodeSection, ConstExpr, DataSection, EntityType, ExportKind, ExportSection, Function,
    FunctionSection, ImportSection, Instruction, MemorySection, MemoryType, Module, TypeSection,
    ValType,
};
use watgen_codegen::{FuncDecl, Generator};
use watgen_runner::{
    compile_and_run, HandoffError, ImportTable, Runtime, Stage, Toolchain, ToolchainConfig,
};
use watgen_types::ValueType::Int;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

/// A module importing `console.log(i32)` and exporting `add(i32, i32) -> i32`
/// (which logs its result) plus a one-page `memory` holding `"hi\0"`.
fn fixture() -> Vec<u8> {
    let mut module = Module::new();

    let mut types = TypeSection::new();
    types.ty().function(vec![ValType::I32], vec![]);
    types
        .ty()
        .function(vec![ValType::I32, ValType::I32], vec![ValType::I32]);
    module.section(&types);

    let mut imports = ImportSection::new();
    imports.import("console", "log", EntityType::Function(0));
    module.section(&imports);

    let mut functions = FunctionSection::new();
    functions.function(1);
    module.section(&functions);

    let mut memory = MemorySection::new();
    memory.memory(MemoryType {
        minimum: 1,
        maximum: None,
        memory64: false,
        shared: false,
        page_size_log2: None,
    });
    module.section(&memory);

    let mut exports = ExportSection::new();
    exports.export("add", ExportKind::Func, 1);
    exports.export("memory", ExportKind::Memory, 0);
    module.section(&exports);

    let mut code = CodeSection::new();
    let mut f = Function::new(vec![(1, ValType::I32)]);
    f.instruction(&Instruction::LocalGet(0));
    f.instruction(&Instruction::LocalGet(1));
    f.instruction(&Instruction::I32Add);
    f.instruction(&Instruction::LocalTee(2));
    f.instruction(&Instruction::Call(0));
    f.instruction(&Instruction::LocalGet(2));
    f.instruction(&Instruction::End);
    code.function(&f);
    module.section(&code);

    let mut data = DataSection::new();
    data.active(0, &ConstExpr::i32_const(0), b"hi\0".to_vec());
    module.section(&data);

    let wasm = module.finish();
    assert!(wasmparser::validate(&wasm).is_ok(), "fixture must be valid");
    wasm
}

/// An import table providing `console.log`, recording the last value.
fn logging_imports() -> (ImportTable, Arc<AtomicI32>) {
    let logged = Arc::new(AtomicI32::new(0));
    let sink = Arc::clone(&logged);
    let imports = ImportTable::new().func(
        "console",
        "log",
        move |_: wasmi::Caller<'_, ()>, value: i32| {
            sink.store(value, Ordering::SeqCst);
        },
    );
    (imports, logged)
}

fn write_fixture(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("fixture.wasm");
    std::fs::write(&path, fixture()).unwrap();
    path
}

fn add_generator(location: &Path) -> Generator {
    let mut gen = Generator::new(location.to_string_lossy());
    gen.module(|g| {
        let decl = FuncDecl::new("add")
            .param("a", Int)
            .param("b", Int)
            .result(Int);
        vec![g.func(
            decl,
            vec![g.return_value(g.add(Int, g.get("a"), g.get("b")))],
        )]
    });
    gen
}

fn wat2wasm_available() -> bool {
    std::process::Command::new("wat2wasm")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

// ══════════════════════════════════════════════════════════════════════════════
// Runtime
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn loaded_module_calls_exports_and_host_imports() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path());
    let (imports, logged) = logging_imports();

    let mut loaded = Runtime::new().load(&path, imports).unwrap();
    let sum: i32 = loaded.call("add", (2, 3)).unwrap();

    assert_eq!(sum, 5);
    assert_eq!(logged.load(Ordering::SeqCst), 5);
    assert_eq!(loaded.exports(), vec!["add".to_string(), "memory".to_string()]);
    assert_eq!(&loaded.memory().unwrap()[..3], b"hi\0");
}

#[test]
fn digest_is_stable_hex_sha256() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path());

    let first = Runtime::new().load(&path, logging_imports().0).unwrap();
    let second = Runtime::new().load(&path, logging_imports().0).unwrap();

    assert_eq!(first.digest().len(), 64);
    assert!(first.digest().chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(first.digest(), second.digest());
}

#[test]
fn typed_func_with_wrong_signature_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path());
    let loaded = Runtime::new().load(&path, logging_imports().0).unwrap();
    assert!(loaded.typed_func::<(), i32>("add").is_err());
}

#[test]
fn missing_binary_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Runtime::new()
        .load(&dir.path().join("absent.wasm"), ImportTable::new())
        .unwrap_err();
    assert_eq!(err.stage(), Stage::Load);
    assert!(matches!(err, HandoffError::Load { .. }));
}

#[test]
fn garbage_binary_is_rejected_before_instantiation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.wasm");
    std::fs::write(&path, b"\0asm\x01\0\0\0\xff\xff").unwrap();

    let err = Runtime::new().load(&path, ImportTable::new()).unwrap_err();
    assert_eq!(err.stage(), Stage::Load);
    assert!(matches!(err, HandoffError::Invalid { .. }));
}

#[test]
fn unsatisfied_import_fails_instantiation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path());
    let err = Runtime::new().load(&path, ImportTable::new()).unwrap_err();
    assert_eq!(err.stage(), Stage::Instantiate);
}

// ══════════════════════════════════════════════════════════════════════════════
// Toolchain
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn write_into_missing_directory_fails_at_write() {
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().join("no/such/dir/out");
    let err = Toolchain::default()
        .compile(&location.to_string_lossy(), "(module)\n")
        .unwrap_err();
    assert_eq!(err.stage(), Stage::Write);
}

#[test]
fn missing_compiler_fails_to_launch() {
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().join("out");
    let config = ToolchainConfig::default().with_compiler("watgen-no-such-compiler");
    let err = Toolchain::new(config)
        .compile(&location.to_string_lossy(), "(module)\n")
        .unwrap_err();
    assert_eq!(err.stage(), Stage::Compile);
    assert!(matches!(err, HandoffError::Launch { .. }));
}

#[cfg(unix)]
#[test]
fn successful_compiler_leaves_text_file_behind() {
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().join("out");
    let config = ToolchainConfig::default().with_compiler("true");
    let artifact = Toolchain::new(config)
        .compile(&location.to_string_lossy(), "(module)\n")
        .unwrap();

    assert_eq!(artifact.text_path, dir.path().join("out.wat"));
    assert_eq!(artifact.binary_path, dir.path().join("out.wasm"));
    assert_eq!(std::fs::read_to_string(&artifact.text_path).unwrap(), "(module)\n");
}

#[cfg(unix)]
#[test]
fn failing_compiler_is_an_exit_error() {
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().join("out");
    let config = ToolchainConfig::default().with_compiler("false");
    let err = Toolchain::new(config)
        .compile(&location.to_string_lossy(), "(module)\n")
        .unwrap_err();
    assert_eq!(err.stage(), Stage::Compile);
    assert!(matches!(err, HandoffError::Exit { .. }));
}

#[cfg(unix)]
#[test]
fn stderr_output_counts_as_failure() {
    // `sh <input> -o <output>` runs the written text as a script.
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().join("noisy");
    let config = ToolchainConfig::default().with_compiler("sh");
    let err = Toolchain::new(config)
        .compile(&location.to_string_lossy(), "echo 'warning: unused' >&2\n")
        .unwrap_err();
    match err {
        HandoffError::Diagnostics { stderr, .. } => assert_eq!(stderr, "warning: unused"),
        other => panic!("expected diagnostics error, got {other:?}"),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// compile_and_run
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn symbol_errors_stop_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().join("broken");
    let mut gen = Generator::new(location.to_string_lossy());
    gen.module(|g| vec![g.func(FuncDecl::new("f"), vec![g.drop(g.get("nope"))])]);

    let err = compile_and_run(&gen, ToolchainConfig::default(), ImportTable::new()).unwrap_err();
    assert_eq!(err.stage(), Stage::Check);
    assert!(!dir.path().join("broken.wat").exists());
}

#[cfg(unix)]
#[test]
fn compiler_that_writes_nothing_fails_at_load() {
    let dir = tempfile::tempdir().unwrap();
    let gen = add_generator(&dir.path().join("add"));
    let config = ToolchainConfig::default().with_compiler("true");

    let err = compile_and_run(&gen, config, ImportTable::new()).unwrap_err();
    assert_eq!(err.stage(), Stage::Load);
    assert!(dir.path().join("add.wat").exists());
}

#[test]
fn generated_module_runs_under_wat2wasm() {
    if !wat2wasm_available() {
        eprintln!("wat2wasm not installed, skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let gen = add_generator(&dir.path().join("add"));

    let mut loaded = compile_and_run(&gen, ToolchainConfig::default(), ImportTable::new()).unwrap();
    let sum: i32 = loaded.call("add", (40, 2)).unwrap();
    assert_eq!(sum, 42);
}
