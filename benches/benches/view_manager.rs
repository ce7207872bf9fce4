// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::Point;
use understory_view_manager::{
    CameraState, ControllerConfig, Extent, ProjectOptions, View, ViewManager, ViewManagerProps,
    ViewStates,
};

/// Tiles the canvas with a `side` x `side` grid of pan/zoom views.
fn grid_views(side: u32) -> Vec<View> {
    let pct = 100.0 / f64::from(side);
    (0..side * side)
        .map(|i| {
            let (col, row) = (i % side, i / side);
            View::new(format!("view-{i}"))
                .with_x(Extent::Percent(pct * f64::from(col)))
                .with_y(Extent::Percent(pct * f64::from(row)))
                .with_width(Extent::Percent(pct))
                .with_height(Extent::Percent(pct))
                .with_controller(ControllerConfig::pan_zoom())
        })
        .collect()
}

fn build_manager(side: u32) -> ViewManager {
    ViewManager::new(
        ViewManagerProps::new()
            .size(1920.0, 1080.0)
            .views(grid_views(side))
            .view_state(ViewStates::shared(CameraState::default())),
    )
}

fn bench_view_manager(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_view_manager");
    group.sample_size(50);

    for &side in &[1_u32, 4, 16] {
        let n = side * side;

        group.bench_function(format!("noop_set_props(n={n})"), |b| {
            let views = grid_views(side);
            let mut manager = build_manager(side);
            b.iter(|| {
                manager.set_props(
                    ViewManagerProps::new()
                        .size(1920.0, 1080.0)
                        .views(views.clone()),
                );
                black_box(manager.needs_update());
            });
        });

        group.bench_function(format!("resize_rebuild(n={n})"), |b| {
            b.iter_batched(
                || build_manager(side),
                |mut manager| {
                    manager.set_props(ViewManagerProps::new().size(1280.0, 720.0));
                    black_box(manager);
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_function(format!("unproject(n={n})"), |b| {
            let manager = build_manager(side);
            b.iter(|| {
                black_box(manager.unproject(
                    black_box(Point::new(1900.0, 1070.0)),
                    ProjectOptions::default(),
                ))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_view_manager);
criterion_main!(benches);
