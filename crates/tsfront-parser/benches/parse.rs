//! Parser benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tsfront_parser::{parse, transform, Lexer, ParserOptions, TokenKind, TransformOptions};

const SAMPLE_SOURCE: &str = r#"
import { readFile } from "fs";
import type { Stats } from "fs";

export interface Options<T = unknown> {
    root: string;
    filter?: (value: T) => boolean;
}

export enum Level { Debug, Info = 10, Warn = Info + 10, Error = Warn << 1 }

export namespace Geometry {
    export const origin = { x: 0, y: 0 };
    export function distance(a: Point, b: Point): number {
        return Math.hypot(a.x - b.x, a.y - b.y);
    }
    export interface Point { x: number; y: number }
    export namespace Shapes {
        export class Circle {
            constructor(public center: Point, private readonly radius = 1) {}
            area(): number { return Math.PI * this.radius ** 2; }
        }
    }
}

function identity<T extends object>(value: T): T {
    return value as T;
}

const cache = new Map<string, Array<number>>();
const compare = <T,>(a: T, b: T): a is T => a === b;
const stat = (s: Stats | undefined) => s?.size ?? 0;

export default class Loader<K extends keyof Options> {
    private pending: Promise<void>[] = [];
    async load(path: string, level: Level = Level.Info): Promise<string> {
        const data = await readFile(path);
        return identity<object>(data) ? String(data) : "";
    }
}
"#;

fn sample(copies: usize) -> String {
    // Wrap each copy in its own namespace so declarations do not collide
    let body = SAMPLE_SOURCE
        .replace("export default ", "export ")
        .replace("import ", "// import ");
    (0..copies)
        .map(|i| format!("namespace Copy{i} {{\n{body}\n}}\n"))
        .collect()
}

fn bench_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");
    group.throughput(Throughput::Bytes(SAMPLE_SOURCE.len() as u64));

    group.bench_function("sample", |b| {
        b.iter(|| {
            let mut lexer = Lexer::new(black_box(SAMPLE_SOURCE));
            while let Ok(token) = lexer.next_token() {
                if token.kind == TokenKind::Eof {
                    break;
                }
            }
        });
    });

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let source = sample(50);
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("typescript", |b| {
        b.iter(|| parse(black_box(&source), &ParserOptions::default()));
    });
    group.bench_function("transform", |b| {
        b.iter(|| transform(black_box(&source), &TransformOptions::default()));
    });

    group.finish();
}

criterion_group!(benches, bench_lexer, bench_parse);
criterion_main!(benches);
