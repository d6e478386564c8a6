//! Performance benchmarks for the OPLang checking and code generation pipeline.
//!
//! Programs are built as trees so only the semantic passes are measured:
//! - Size-based: a growing number of classes with methods and loops
//! - Phase-specific: checking alone versus checking plus generation

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oplang::ast::{
    Attribute, AttributeDecl, BinaryOp, Block, ClassDecl, Expr, ForDirection, MethodDecl, Param,
    Program, Stmt, VariableDecl,
};
use oplang::{Compiler, Modifiers, Type};
use std::hint::black_box;

/// A class with a counter attribute and a method summing a range.
fn worker_class(index: usize) -> ClassDecl {
    let name = format!("Worker{index}");
    let sum = MethodDecl::new(
        false,
        Type::INT,
        "sum",
        vec![Param::new("n", Type::INT)],
        Block::new(
            vec![
                VariableDecl::single(Type::INT, "i", None),
                VariableDecl::single(Type::INT, "acc", Some(Expr::int(0))),
            ],
            vec![
                Stmt::for_loop(
                    "i",
                    Expr::int(1),
                    ForDirection::Up,
                    Expr::ident("n"),
                    Stmt::assign(
                        "acc",
                        Expr::binary(Expr::ident("acc"), BinaryOp::Add, Expr::ident("i")),
                    ),
                ),
                Stmt::if_else(
                    Expr::binary(Expr::ident("acc"), BinaryOp::Greater, Expr::int(100)),
                    Stmt::ret(Some(Expr::binary(
                        Expr::ident("acc"),
                        BinaryOp::Mod,
                        Expr::int(100),
                    ))),
                    None,
                ),
                Stmt::ret(Some(Expr::ident("acc"))),
            ],
        ),
    );
    ClassDecl::new(name, None)
        .with_attribute(AttributeDecl::new(
            Modifiers::STATIC,
            Type::INT,
            vec![Attribute::new("count", Some(Expr::int(0)))],
        ))
        .with_method(sum)
}

/// `n` worker classes and a `Main` calling each of them.
fn program(n: usize) -> Program {
    let mut classes: Vec<ClassDecl> = (0..n).map(worker_class).collect();
    let calls = (0..n)
        .map(|i| {
            let worker = Expr::new_object(format!("Worker{i}"), vec![]);
            let sum = Expr::call(worker, "sum", vec![Expr::int(10)]);
            Stmt::invoke(Expr::call(Expr::ident("io"), "writeIntLn", vec![sum]))
        })
        .collect();
    classes.push(ClassDecl::new("Main", None).with_method(MethodDecl::main(Block::of(calls))));
    Program::new(classes)
}

fn bench_program_sizes(c: &mut Criterion) {
    let compiler = Compiler::default();
    let mut group = c.benchmark_group("compile/classes");

    for n in [1, 10, 100, 500] {
        let program = program(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &program, |b, program| {
            b.iter(|| {
                let units = compiler.compile(black_box(program)).expect("compiles");
                black_box(units);
            });
        });
    }

    group.finish();
}

fn bench_phases(c: &mut Criterion) {
    let compiler = Compiler::default();
    let program = program(100);
    let mut group = c.benchmark_group("compile/phases");

    group.bench_function("check_only", |b| {
        b.iter(|| {
            let table = compiler.check(black_box(&program)).expect("checks");
            black_box(table);
        });
    });

    group.bench_function("check_and_generate", |b| {
        b.iter(|| {
            let units = compiler.compile(black_box(&program)).expect("compiles");
            black_box(units);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_program_sizes, bench_phases);
criterion_main!(benches);
