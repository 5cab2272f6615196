// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pkgmatrix::{Matrix, mangle};

fn sample_matrix() -> &'static str
{
    r"
debian:
  codenames: [bookworm, bullseye, trixie]
  arch: [amd64, arm64, armhf]
  vars:
    exclude: [bullseye]
ubuntu:
  codenames: [focal, jammy, noble]
  arch: [amd64, arm64]
  vars:
    min_version: 20.04 LTS
fedora:
  codenames: ['39', '40']
  arch: [x86_64, aarch64]
  disabled: true
"
}

fn benchmark_parse_matrix(c: &mut Criterion,)
{
    let yaml = sample_matrix();

    c.bench_function("parse_matrix_small", |b| {
        b.iter(|| Matrix::parse(black_box(yaml,),).expect("parse failed",),)
    },);
}

fn benchmark_target_expansion(c: &mut Criterion,)
{
    let matrix = Matrix::parse(sample_matrix(),).expect("parse failed",);

    c.bench_function("expand_enabled_target_names", |b| {
        b.iter(|| {
            let names = black_box(&matrix,).without_disabled().target_names();
            black_box(names.len(),)
        },)
    },);
}

fn benchmark_large_matrix(c: &mut Criterion,)
{
    let mut yaml = String::new();
    for i in 0..50 {
        yaml.push_str(&format!(
            "dist{i}:\n  codenames: [a{i}, b{i}, c{i}, d{i}]\n  arch: [amd64, arm64, i386]\n"
        ),);
    }
    let matrix = Matrix::parse(&yaml,).expect("parse failed",);

    c.bench_function("expand_600_targets", |b| {
        b.iter(|| black_box(&matrix,).targets(),)
    },);
}

fn benchmark_render(c: &mut Criterion,)
{
    let matrix = Matrix::parse(sample_matrix(),).expect("parse failed",);

    c.bench_function("render_matrix_yaml", |b| {
        b.iter(|| black_box(&matrix,).to_yaml().expect("render failed",),)
    },);
}

fn benchmark_mangle(c: &mut Criterion,)
{
    c.bench_function("mangle_version", |b| {
        b.iter(|| mangle(black_box("2:1.18.0~rc1-1..lock.",),),)
    },);
}

criterion_group!(
    benches,
    benchmark_parse_matrix,
    benchmark_target_expansion,
    benchmark_large_matrix,
    benchmark_render,
    benchmark_mangle
);
criterion_main!(benches);
