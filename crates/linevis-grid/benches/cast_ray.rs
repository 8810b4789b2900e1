use std::f64::consts::PI;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use linevis_grid::{build, GridSettings, OccluderGrid};
use linevis_math::{Point3, Vec3};

/// UV sphere of radius 1 as a flat triangle mesh.
fn sphere(rings: u32, segments: u32) -> (Vec<f64>, Vec<u32>) {
    let mut vertices = Vec::new();
    for r in 0..=rings {
        let phi = PI * r as f64 / rings as f64;
        for s in 0..=segments {
            let theta = 2.0 * PI * s as f64 / segments as f64;
            vertices.extend_from_slice(&[
                phi.sin() * theta.cos(),
                phi.sin() * theta.sin(),
                phi.cos(),
            ]);
        }
    }
    let stride = segments + 1;
    let mut indices = Vec::new();
    for r in 0..rings {
        for s in 0..segments {
            let a = r * stride + s;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    (vertices, indices)
}

/// Rays from a ring of eye points aimed through the sphere.
fn rays(count: usize) -> Vec<(Point3, Point3)> {
    (0..count)
        .map(|i| {
            let a = 2.0 * PI * i as f64 / count as f64;
            let eye = Point3::new(3.0 * a.cos(), 3.0 * a.sin(), 0.7 * (3.0 * a).sin());
            let target = Point3::new(0.3 * (5.0 * a).cos(), 0.3 * (7.0 * a).sin(), 0.0);
            (eye, target)
        })
        .collect()
}

fn build_grid(target_cell_count: u32) -> OccluderGrid {
    let (vertices, indices) = sphere(48, 96);
    let settings = GridSettings {
        target_cell_count: Some(target_cell_count),
        ..Default::default()
    };
    build::grid_from_mesh(&vertices, &indices, &settings).unwrap()
}

pub fn cast_ray_cell_sweep(c: &mut Criterion) {
    let rays = &rays(256);
    let mut group = c.benchmark_group("cast_ray vs cell count (sphere 48x96)");
    for target in [512, 4096, 32768] {
        let grid = &build_grid(target);
        group.bench_function(BenchmarkId::new("all_occluders", target), move |b| {
            b.iter(|| {
                for (eye, target) in rays {
                    black_box(grid.cast_ray(eye, target));
                }
            })
        });
        group.bench_function(BenchmarkId::new("first_intersection", target), move |b| {
            b.iter(|| {
                for (eye, target) in rays {
                    let dir: Vec3 = target - eye;
                    black_box(grid.cast_ray_to_find_first_intersection(eye, &dir));
                }
            })
        });
    }
}

pub fn grid_build(c: &mut Criterion) {
    let (vertices, indices) = sphere(48, 96);
    c.bench_function("grid_from_mesh (sphere 48x96)", |b| {
        b.iter(|| {
            black_box(build::grid_from_mesh(&vertices, &indices, &GridSettings::default()).unwrap())
        })
    });
}

criterion_group!(benches, cast_ray_cell_sweep, grid_build);
criterion_main!(benches);
