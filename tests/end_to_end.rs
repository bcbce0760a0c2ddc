//! Headless frames through the full update order on the CPU backend

use glam::{IVec3, UVec3, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;

use voxgi::core::camera_controller::CameraController;
use voxgi::core::input::InputState;
use voxgi::frame::{FrameDriver, spawn_camera};
use voxgi::lighting::{CpuLighting, GridConfig, LightingPipeline, ReadIndex};
use voxgi::render::ShaderLibrary;
use voxgi::voxel::{CHUNK_SIZE, Chunk, SceneKind, SceneParams};

const NEIGHBOURS: [IVec3; 6] = [
    IVec3::X,
    IVec3::NEG_X,
    IVec3::Y,
    IVec3::NEG_Y,
    IVec3::Z,
    IVec3::NEG_Z,
];

fn cornell(size: u32, seed: u64) -> Chunk {
    let mut rng = StdRng::seed_from_u64(seed);
    Chunk::generate(size, SceneKind::CornellBox, &SceneParams::default(), &mut rng)
}

fn driver(chunk: Chunk, seed: u64) -> FrameDriver<CpuLighting> {
    let grid = GridConfig::with_chunk_size(chunk.size());
    FrameDriver::new(
        spawn_camera(grid.chunk_size, 640, 480),
        CameraController::default(),
        LightingPipeline::new(grid, seed).unwrap(),
        CpuLighting::new(chunk, grid).unwrap(),
    )
}

/// Solid, non-emissive voxels touching an emitter
fn lit_neighbours(chunk: &Chunk) -> Vec<UVec3> {
    (0..chunk.len())
        .map(|i| chunk.coord(i))
        .filter(|&p| {
            let voxel = &chunk.voxels()[chunk.index(p)];
            voxel.exists()
                && !voxel.is_emissive()
                && NEIGHBOURS.iter().any(|&d| {
                    chunk
                        .get_cell(p.as_ivec3() + d)
                        .is_some_and(|n| n.is_emissive())
                })
        })
        .collect()
}

fn current_colors(chunk: &Chunk, points: &[UVec3], read_index: ReadIndex) -> Vec<Vec3> {
    points
        .iter()
        .map(|&p| chunk.voxels()[chunk.index(p)].color(read_index.slot()))
        .collect()
}

#[test]
fn cornell_box_landmarks() {
    let chunk = cornell(CHUNK_SIZE, 0);
    let at = |x, y, z| chunk.get(UVec3::new(x, y, z)).copied().unwrap();

    let red = at(0, 16, 16);
    assert!(red.exists());
    assert_eq!(red.diffuse(), Vec3::new(1.0, 0.0, 0.0));

    let green = at(31, 16, 16);
    assert!(green.exists());
    assert_eq!(green.diffuse(), Vec3::new(0.0, 1.0, 0.0));

    let light = at(16, 31, 16);
    assert!(light.is_emissive());
    assert_eq!(light.emission(), Vec3::splat(5.0));
    assert_eq!(light.diffuse(), Vec3::ZERO);
}

#[test]
fn light_propagates_without_input() {
    let mut driver = driver(cornell(16, 1), 1);
    let input = InputState::new();
    let camera = driver.camera().clone();

    let watched = lit_neighbours(driver.backend().chunk());
    assert!(!watched.is_empty());

    let mut read_index = ReadIndex::ZERO;
    let mut first = Vec::new();
    for expected in 0..10u32 {
        let frame = driver.update(&input, 1.0 / 30.0).unwrap();
        assert_eq!(frame.frame_number, expected);
        assert_eq!(frame.read_index, read_index.toggled());
        read_index = frame.read_index;

        if expected == 0 {
            first = current_colors(driver.backend().chunk(), &watched, read_index);
        }
    }

    let last = current_colors(driver.backend().chunk(), &watched, read_index);
    assert!(
        first.iter().zip(&last).any(|(a, b)| a != b),
        "no voxel next to an emitter changed between frame 1 and frame 10"
    );
    assert!(last.iter().all(|c| c.is_finite() && c.min_element() >= 0.0));

    assert_eq!(driver.camera(), &camera);
    assert_eq!(driver.backend().dispatches(), 10);
    assert_eq!(driver.lighting().frame_number(), 10);
}

#[test]
fn render_slot_is_the_slot_just_written() {
    let mut driver = driver(cornell(8, 2), 2);
    let input = InputState::new();

    for _ in 0..3 {
        let before = driver.backend().chunk().voxels().to_vec();
        let frame = driver.update(&input, 1.0 / 30.0).unwrap();
        let stale = frame.read_index.toggled().slot();
        // The slot the dispatch read from is left untouched
        for (old, new) in before.iter().zip(driver.backend().chunk().voxels()) {
            assert_eq!(old.color(stale), new.color(stale));
        }
    }
}

#[test]
fn bundled_shaders_match_every_valid_grid() {
    for size in [8, 16, 32, 64] {
        let grid = GridConfig::with_chunk_size(size);
        grid.validate().unwrap();
        let program = ShaderLibrary::bundled(&grid).compile("light_update").unwrap();
        program
            .expect_workgroup_size("main", [grid.workgroup_size; 3])
            .unwrap();
        assert!(program.source().contains(&format!("const CHUNK_SIZE: u32 = {size}u;")));
    }
}
