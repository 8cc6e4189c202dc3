//! The indexed mesh query must agree with testing every triangle.

use ember_core::MeshData;
use ember_renderer::{MeshSurface, Ray, Vec3, LEAF_CAPACITY};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_vec(rng: &mut StdRng, extent: f64) -> Vec3 {
    Vec3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}

/// `count` small triangles scattered through a cube of side 2.
fn random_mesh(rng: &mut StdRng, count: usize) -> MeshData {
    let mut positions = Vec::with_capacity(count * 3);
    let mut triangles = Vec::with_capacity(count);
    for i in 0..count {
        let center = random_vec(rng, 1.0);
        positions.push(center + random_vec(rng, 0.2));
        positions.push(center + random_vec(rng, 0.2));
        positions.push(center + random_vec(rng, 0.2));
        triangles.push([3 * i, 3 * i + 1, 3 * i + 2]);
    }
    MeshData::new(positions, triangles)
}

#[test]
fn indexed_query_matches_exhaustive_search() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mesh = MeshSurface::new(random_mesh(&mut rng, 1000));

    let mut hits = 0;
    for _ in 0..100 {
        // From a shell around the cube toward a point inside it
        let origin = random_vec(&mut rng, 1.0).normalize() * 3.0;
        let target = random_vec(&mut rng, 0.8);
        let ray = Ray::new(origin, (target - origin).normalize());

        let indexed = mesh.nearest_triangle(&ray);
        let exhaustive = mesh.intersect_exhaustive(&ray);

        match (indexed, exhaustive) {
            (Some(a), Some(b)) => {
                assert_eq!(a.triangle, b.triangle);
                assert!((a.t - b.t).abs() < 1e-9);
                hits += 1;
            }
            (None, None) => {}
            (a, b) => panic!("indexed {:?} vs exhaustive {:?}", a, b),
        }
    }

    // Rays aimed into the cloud mostly hit something
    assert!(hits > 50, "only {} hits", hits);
}

#[test]
fn rays_from_inside_the_cloud_agree() {
    let mut rng = StdRng::seed_from_u64(99);
    let mesh = MeshSurface::new(random_mesh(&mut rng, 500));

    for _ in 0..200 {
        let origin = random_vec(&mut rng, 0.5);
        let direction = random_vec(&mut rng, 1.0).normalize();
        let ray = Ray::new(origin, direction);

        let indexed = mesh.nearest_triangle(&ray).map(|h| (h.triangle, h.t));
        let exhaustive = mesh.intersect_exhaustive(&ray).map(|h| (h.triangle, h.t));
        assert_eq!(indexed, exhaustive);
    }
}

#[test]
fn leaves_partition_every_triangle() {
    let mut rng = StdRng::seed_from_u64(3);
    let mesh = MeshSurface::new(random_mesh(&mut rng, 321));

    let mut seen: Vec<usize> = mesh
        .tree()
        .leaves()
        .into_iter()
        .inspect(|leaf| assert!(!leaf.is_empty() && leaf.len() <= LEAF_CAPACITY))
        .flat_map(|leaf| leaf.iter().copied())
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..321).collect::<Vec<_>>());
}
