// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use liquidseam::{resize, Context, EnergyUpdate, PixelBuffer, ResizeConfiguration, Rgba};

fn picture(width: u32, height: u32) -> PixelBuffer<u8> {
    let mut state = 0x1234_5678_u32;
    PixelBuffer::from_fn(width, height, |x, y| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let v = ((x * 3 + y * 5) % 200) as u8 + (state & 0x1f) as u8;
        Rgba([v, v / 2, 255 - v, 255])
    })
}

fn energy_maintenance(c: &mut Criterion) {
    let source = picture(96, 64);
    let mut group = c.benchmark_group("shrink 96x64 to 64x48");
    for update in [EnergyUpdate::Full, EnergyUpdate::Incremental] {
        let config = ResizeConfiguration {
            energy_update: update,
            ..ResizeConfiguration::default()
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", update)),
            &config,
            |b, config| {
                b.iter(|| resize(black_box(&source), 64, 48, config, None, &Context::new()))
            },
        );
    }
    group.finish();
}

fn enlargement(c: &mut Criterion) {
    let source = picture(64, 48);
    let config = ResizeConfiguration::default();
    c.bench_function("grow 64x48 to 96x48", |b| {
        b.iter(|| resize(black_box(&source), 96, 48, &config, None, &Context::new()))
    });
}

criterion_group!(benches, energy_maintenance, enlargement);
criterion_main!(benches);
